use crate::domain::constants::POLICY_FILE;
use crate::domain::models::{Domain, MetricBound, PolicyFile};
use crate::services::orchestrator::RunOptions;
use crate::services::storage::config_dir;
use anyhow::Context;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub fn default_policy_path() -> anyhow::Result<PathBuf> {
    Ok(config_dir()?.join(POLICY_FILE))
}

/// Loads the policy file. The default location may be absent (defaults apply);
/// an explicitly named file must exist.
pub fn load_policy(path: Option<&str>) -> anyhow::Result<PolicyFile> {
    let path = match path {
        Some(p) => {
            let p = PathBuf::from(p);
            if !p.exists() {
                anyhow::bail!("policy file not found: {}", p.display());
            }
            p
        }
        None => default_policy_path()?,
    };
    if !path.exists() {
        return Ok(PolicyFile::default());
    }
    let raw = std::fs::read_to_string(&path)?;
    parse_policy(&raw).with_context(|| format!("invalid policy file {}", path.display()))
}

pub fn parse_policy(raw: &str) -> anyhow::Result<PolicyFile> {
    let policy: PolicyFile = toml::from_str(raw)?;
    policy_bounds(&policy)?;
    policy_criticality(&policy)?;
    Ok(policy)
}

pub fn policy_bounds(policy: &PolicyFile) -> anyhow::Result<BTreeMap<Domain, Vec<MetricBound>>> {
    let mut out = BTreeMap::new();
    for (domain, metrics) in &policy.bounds {
        let domain: Domain = domain.parse()?;
        let bounds = metrics
            .iter()
            .map(|(metric, limits)| {
                if limits.min.is_none() && limits.max.is_none() {
                    anyhow::bail!("bound {domain}.{metric} needs min or max");
                }
                let nan = |v: Option<f64>| v.map_or(false, f64::is_nan);
                if nan(limits.min) || nan(limits.max) {
                    anyhow::bail!("bound {domain}.{metric} is not a number");
                }
                Ok(MetricBound {
                    metric: metric.clone(),
                    min: limits.min,
                    max: limits.max,
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        out.insert(domain, bounds);
    }
    Ok(out)
}

pub fn policy_criticality(policy: &PolicyFile) -> anyhow::Result<BTreeMap<Domain, f64>> {
    let mut out = BTreeMap::new();
    for (domain, weight) in &policy.criticality {
        let domain: Domain = domain.parse()?;
        if !weight.is_finite() || *weight < 0.0 {
            anyhow::bail!("criticality for {domain} must be a non-negative number");
        }
        out.insert(domain, *weight);
    }
    Ok(out)
}

/// Run options seeded from policy; the CLI layers its flags on top.
pub fn run_options(policy: &PolicyFile) -> anyhow::Result<RunOptions> {
    Ok(RunOptions {
        parallel: policy.general.parallel,
        bounds: policy_bounds(policy)?,
        criticality: policy_criticality(policy)?,
        ..RunOptions::default()
    })
}
