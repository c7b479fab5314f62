#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct TestEnv {
    _tmp: TempDir,
    pub home: PathBuf,
    pub fleet: PathBuf,
    cargo_home: PathBuf,
    rustup_home: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let home = tmp.path().join("home");
        fs::create_dir_all(&home).expect("create isolated home");

        let fleet = make_fixture_registry(tmp.path());

        let orig_home = std::env::var("HOME").unwrap_or_default();
        let cargo_home = PathBuf::from(&orig_home).join(".cargo");
        let rustup_home = PathBuf::from(&orig_home).join(".rustup");

        Self {
            _tmp: tmp,
            home,
            fleet,
            cargo_home,
            rustup_home,
        }
    }

    pub fn fleet_arg(&self) -> &str {
        self.fleet.to_str().expect("fleet path utf8")
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("preflight");
        cmd.env("HOME", &self.home)
            .env("CARGO_HOME", &self.cargo_home)
            .env("RUSTUP_HOME", &self.rustup_home)
            .env_remove("PREFLIGHT_LOG");
        cmd
    }

    pub fn write_policy(&self, body: &str) {
        let dir = self.home.join(".config/preflight");
        fs::create_dir_all(&dir).expect("create config dir");
        fs::write(dir.join("policy.toml"), body).expect("write policy");
    }

    pub fn audit_lines(&self) -> Vec<Value> {
        let path = self.home.join(".config/preflight/audit.jsonl");
        fs::read_to_string(path)
            .unwrap_or_default()
            .lines()
            .map(|l| serde_json::from_str(l).expect("audit line is json"))
            .collect()
    }

    pub fn run_json(&self, args: &[&str]) -> Value {
        let mut cmd = self.cmd();
        let out = cmd
            .arg("--json")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }

    pub fn run_json_fleet(&self, args: &[&str]) -> Value {
        let mut cmd = self.cmd();
        let out = cmd
            .arg("--json")
            .arg("--registry")
            .arg(self.fleet_arg())
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }
}

/// apdn (POWER, TRL 6) feeds ew_array (EW, TRL 7); qrcm stands alone.
fn make_fixture_registry(base: &Path) -> PathBuf {
    let fleet = base.join("fleet");
    fs::create_dir_all(fleet.join(".preflight")).expect("create .preflight");

    let registry = serde_json::json!({
        "name": "fixture-fleet",
        "subsystems": [
            {
                "id": "apdn",
                "name": "Adaptive Power Distribution Network",
                "domain": "POWER",
                "trl": 6,
                "power_draw_kw": 850
            },
            {
                "id": "ew_array",
                "name": "Null-steering EW array",
                "domain": "EW",
                "trl": 7,
                "power_draw_kw": 120,
                "dependencies": ["apdn"]
            },
            {
                "id": "qrcm",
                "name": "Quantum-Resistant Crypto Module",
                "domain": "CRYPTO",
                "trl": 8,
                "power_draw_kw": 0.5,
                "parameters": {"lattice_dimension": 256}
            }
        ]
    });
    fs::write(
        fleet.join(".preflight/registry.json"),
        serde_json::to_string_pretty(&registry).expect("serialize registry"),
    )
    .expect("write registry");

    fleet
}
