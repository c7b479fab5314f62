use crate::domain::models::{Domain, Status};

/// Registry source used when `--registry` is not given.
pub const DEFAULT_REGISTRY_SOURCE: &str = "builtin";

/// Directory looked up inside a registry directory source.
pub const REGISTRY_DIR: &str = ".preflight";
pub const REGISTRY_JSON: &str = "registry.json";
pub const REGISTRY_TOML: &str = "registry.toml";

/// Per-user configuration directory, relative to `$HOME`.
pub const CONFIG_DIR: &str = ".config/preflight";
pub const POLICY_FILE: &str = "policy.toml";
pub const AUDIT_FILE: &str = "audit.jsonl";

/// Env var holding the tracing filter directive.
pub const LOG_ENV: &str = "PREFLIGHT_LOG";

pub const ILLUSTRATIVE_MARKER: &str = "illustrative=true";

/// Highest technology readiness level accepted by the loader.
pub const MAX_TRL: u8 = 9;

/// Contribution of one result to the readiness score.
pub fn status_score(status: Status) -> f64 {
    match status {
        Status::Operational => 1.0,
        Status::Degraded => 0.6,
        Status::Standby => 0.4,
        Status::Theoretical => 0.1,
        Status::Failed | Status::Skipped => 0.0,
    }
}

pub fn default_criticality(domain: Domain) -> f64 {
    match domain {
        Domain::Power | Domain::Propulsion => 5.0,
        Domain::Crypto | Domain::Avionics => 4.0,
        Domain::Ew => 3.0,
        Domain::DirectedEnergy => 2.0,
        Domain::Exotic => 1.0,
    }
}
