mod common;

use common::TestEnv;
use predicates::prelude::*;
use predicates::str::contains;

#[test]
fn validate_registry() {
    let env = TestEnv::new();
    env.cmd()
        .args(["--registry", env.fleet_arg(), "validate"])
        .assert()
        .success()
        .stdout(contains("registry valid"));
}

#[test]
fn list_filters_by_domain() {
    let env = TestEnv::new();
    env.cmd()
        .args(["--registry", env.fleet_arg(), "list", "--domain", "power"])
        .assert()
        .success()
        .stdout(contains("apdn"))
        .stdout(contains("ew_array").not());
}

#[test]
fn show_builtin_exotic_prints_unbounded_draw() {
    let env = TestEnv::new();
    env.cmd()
        .args(["show", "wormhole_initiator"])
        .assert()
        .success()
        .stdout(contains("power_draw_kw: unbounded"));
}

#[test]
fn run_text_lists_totals_and_domains() {
    let env = TestEnv::new();
    env.cmd()
        .args(["--registry", env.fleet_arg(), "run", "--timestamp", "1"])
        .assert()
        .success()
        .stdout(contains("overall: STANDBY"))
        .stdout(contains("score: "))
        .stdout(contains("domain POWER: STANDBY"))
        .stdout(contains("domain EXOTIC").not());
}

#[test]
fn unknown_subsystem_is_an_error() {
    let env = TestEnv::new();
    env.cmd()
        .args(["--registry", env.fleet_arg(), "show", "nope"])
        .assert()
        .failure()
        .stderr(contains("nope"));
}

#[test]
fn unknown_domain_filter_is_rejected() {
    let env = TestEnv::new();
    env.cmd()
        .args(["list", "--domain", "sonar"])
        .assert()
        .failure()
        .stderr(contains("sonar"));
}
