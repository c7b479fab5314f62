mod common;

use common::TestEnv;
use predicates::str::contains;
use serde_json::Value;
use std::fs;

fn status_of<'a>(report: &'a Value, id: &str) -> &'a str {
    report["ordered_results"]
        .as_array()
        .expect("ordered_results array")
        .iter()
        .find(|r| r["subsystem_id"] == id)
        .and_then(|r| r["status"].as_str())
        .unwrap_or_else(|| panic!("no result for {id}"))
}

#[test]
fn fleet_run_reports_standby_and_audits() {
    let env = TestEnv::new();
    let v = env.run_json_fleet(&["run", "--timestamp", "42"]);
    assert_eq!(v["ok"], true);

    let report = &v["data"];
    assert_eq!(report["timestamp"], 42);
    assert_eq!(report["overall_status"], "STANDBY");
    assert_eq!(status_of(report, "apdn"), "STANDBY");
    assert_eq!(status_of(report, "ew_array"), "OPERATIONAL");
    assert_eq!(status_of(report, "qrcm"), "OPERATIONAL");

    let order: Vec<&str> = report["order"]
        .as_array()
        .unwrap()
        .iter()
        .map(|x| x.as_str().unwrap())
        .collect();
    let apdn = order.iter().position(|x| *x == "apdn").unwrap();
    let ew = order.iter().position(|x| *x == "ew_array").unwrap();
    assert!(apdn < ew);

    let domains = &report["domains"];
    assert_eq!(domains["POWER"]["overall_status"], "STANDBY");
    assert_eq!(domains["EW"]["overall_status"], "OPERATIONAL");
    assert_eq!(domains["CRYPTO"]["subsystems"], 1);
    assert!(domains.get("EXOTIC").is_none());

    let audit = env.audit_lines();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0]["action"], "run");
    assert_eq!(audit[0]["data"]["overall"], "STANDBY");
    assert_eq!(audit[0]["data"]["digest"], report["registry_digest"]);
}

#[test]
fn forced_failure_skips_dependents_and_exits_nonzero() {
    let env = TestEnv::new();
    let out = env
        .cmd()
        .args(["--json", "--registry", env.fleet_arg()])
        .args(["run", "--force-fail", "apdn", "--timestamp", "7"])
        .assert()
        .code(1)
        .get_output()
        .stdout
        .clone();
    let v: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["ok"], false);

    let report = &v["data"];
    assert_eq!(report["overall_status"], "FAILED");
    assert_eq!(report["failed_ids"], serde_json::json!(["apdn"]));
    assert_eq!(report["skipped_ids"], serde_json::json!(["ew_array"]));
    assert_eq!(status_of(report, "qrcm"), "OPERATIONAL");
    assert_eq!(report["domains"]["POWER"]["overall_status"], "FAILED");
    assert_eq!(report["domains"]["EW"]["overall_status"], "SKIPPED");
    assert_eq!(report["domains"]["EW"]["summary"]["skipped"], 1);
}

#[test]
fn run_is_reproducible_with_fixed_timestamp() {
    let env = TestEnv::new();
    let a = env.run_json_fleet(&["run", "--timestamp", "100"]);
    let b = env.run_json_fleet(&["run", "--timestamp", "100", "--parallel"]);
    assert_eq!(a, b);
}

#[test]
fn run_writes_report_file() {
    let env = TestEnv::new();
    let out = env.home.join("reports/run.json");
    env.run_json_fleet(&["run", "--timestamp", "5", "--out", out.to_str().unwrap()]);

    let saved: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert!(saved.get("ok").is_none());
    assert_eq!(saved["timestamp"], 5);
    assert_eq!(saved["overall_status"], "STANDBY");
}

#[test]
fn policy_fail_on_standby_trips_run() {
    let env = TestEnv::new();
    env.write_policy("[general]\nfail_on = \"standby\"\n");
    env.cmd()
        .args(["--registry", env.fleet_arg(), "run", "--timestamp", "1"])
        .assert()
        .code(1)
        .stdout(contains("overall: STANDBY"));
}

#[test]
fn policy_bounds_degrade_subsystem() {
    let env = TestEnv::new();
    env.write_policy("[bounds.EW]\nsuppression_db = { min = 40.0 }\n");
    let v = env.run_json_fleet(&["run", "--timestamp", "1"]);
    let report = &v["data"];
    assert_eq!(status_of(report, "ew_array"), "DEGRADED");
    assert_eq!(report["overall_status"], "DEGRADED");
    let reason = report["ordered_results"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["subsystem_id"] == "ew_array")
        .and_then(|r| r["reason"].as_str())
        .unwrap()
        .to_string();
    assert!(reason.contains("suppression_db"));
}

#[test]
fn explicit_missing_policy_is_an_error() {
    let env = TestEnv::new();
    let missing = env.home.join("nope.toml");
    env.cmd()
        .args(["--registry", env.fleet_arg()])
        .args(["--policy", missing.to_str().unwrap(), "run"])
        .assert()
        .failure();
}

#[test]
fn order_and_validate_agree_with_registry() {
    let env = TestEnv::new();
    let order = env.run_json_fleet(&["order"]);
    let items = order["data"].as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["position"], 1);
    let ew = items.iter().find(|i| i["id"] == "ew_array").unwrap();
    assert_eq!(ew["dependencies"], serde_json::json!(["apdn"]));

    let valid = env.run_json_fleet(&["validate"]);
    assert_eq!(valid["data"]["registry"], "fixture-fleet");
    assert_eq!(valid["data"]["subsystems"], 3);
    assert_eq!(valid["data"]["digest"].as_str().unwrap().len(), 64);
}

#[test]
fn cyclic_registry_fails_validate_and_check() {
    let env = TestEnv::new();
    let file = env.home.join("cycle.json");
    let doc = serde_json::json!({
        "subsystems": [
            {"id": "a", "domain": "POWER", "trl": 8, "power_draw_kw": 1, "dependencies": ["b"]},
            {"id": "b", "domain": "POWER", "trl": 8, "power_draw_kw": 1, "dependencies": ["a"]}
        ]
    });
    fs::write(&file, doc.to_string()).unwrap();
    let src = file.to_str().unwrap();

    env.cmd()
        .args(["--registry", src, "validate"])
        .assert()
        .failure()
        .stderr(contains("cyclic dependency"));

    let check = env.run_json(&["--registry", src, "check"]);
    assert_eq!(check["ok"], false);
    assert_eq!(check["data"]["overall"], "needs_attention");
    let acyclic = check["data"]["checks"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "graph_acyclic")
        .unwrap();
    assert!(acyclic["status"].as_str().unwrap().starts_with("failed"));
}

#[test]
fn registry_authoring_flow() {
    let env = TestEnv::new();
    let work = env.home.join("work");
    fs::create_dir_all(&work).unwrap();
    let path = work.to_str().unwrap();

    let init = env.run_json(&["registry", "init", "--path", path]);
    assert_eq!(init["ok"], true);
    assert!(work.join(".preflight/registry.json").exists());

    env.run_json(&[
        "registry", "add", "apdn", "--name", "APDN", "--domain", "POWER", "--trl", "8",
        "--power-draw-kw", "700", "--path", path,
    ]);
    env.run_json(&[
        "registry", "add", "ew", "--name", "EW", "--domain", "ew", "--trl", "7",
        "--power-draw-kw", "45", "--depends-on", "apdn", "--param", "active_elements=64",
        "--path", path,
    ]);
    env.run_json(&[
        "registry", "add", "lens", "--name", "Lens", "--domain", "EXOTIC", "--trl", "0",
        "--path", path,
    ]);

    env.cmd()
        .args(["registry", "add", "ghost", "--name", "Ghost", "--domain", "EW", "--trl", "7"])
        .args(["--power-draw-kw", "1", "--depends-on", "missing", "--path", path])
        .assert()
        .failure()
        .stderr(contains("unknown dependency"));

    env.cmd()
        .args(["registry", "add", "beam", "--name", "Beam", "--domain", "EXOTIC"])
        .args(["--trl", "1", "--power-draw-kw", "inf", "--path", path])
        .assert()
        .failure()
        .stderr(contains("power draw must be finite"));

    env.cmd()
        .args(["registry", "add", "coil", "--name", "Coil", "--domain", "POWER"])
        .args(["--trl", "8", "--power-draw-kw", "10", "--param", "efficiency=nan"])
        .args(["--path", path])
        .assert()
        .failure()
        .stderr(contains("parameter efficiency must be finite"));

    env.cmd()
        .args(["registry", "remove", "apdn", "--path", path])
        .assert()
        .failure()
        .stderr(contains("required by ew"));

    let run = env.run_json(&["--registry", path, "run", "--timestamp", "3"]);
    let report = &run["data"];
    assert_eq!(status_of(report, "apdn"), "OPERATIONAL");
    assert_eq!(status_of(report, "ew"), "OPERATIONAL");
    assert_eq!(status_of(report, "lens"), "THEORETICAL");

    env.run_json(&["registry", "remove", "ew", "--path", path]);
    let listed = env.run_json(&["--registry", path, "list"]);
    let ids: Vec<&str> = listed["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["apdn", "lens"]);
}
