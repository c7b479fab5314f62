use crate::domain::constants::DEFAULT_REGISTRY_SOURCE;
use crate::domain::models::{CheckItem, CheckReport, Domain};
use crate::loader::{self, RegistryDocument};
use crate::services::catalog;
use crate::services::evaluator::EvaluatorTable;
use crate::services::policy::load_policy;
use crate::services::registry::SubsystemRegistry;
use crate::services::resolver;
use std::collections::HashSet;

fn item(name: &str, status: impl Into<String>) -> CheckItem {
    CheckItem {
        name: name.to_string(),
        status: status.into(),
    }
}

fn read_document(source: &str) -> anyhow::Result<RegistryDocument> {
    if source == DEFAULT_REGISTRY_SOURCE {
        return Ok(serde_json::from_value(catalog::builtin_document())?);
    }
    let file = loader::resolve_registry_file(source);
    let raw = std::fs::read_to_string(&file)
        .map_err(|e| anyhow::anyhow!("{}: {}", file.display(), e))?;
    Ok(loader::parse_document(&raw, &file)?)
}

/// Configuration doctor: each stage is reported separately so one problem
/// does not hide the next.
pub fn build_check_report(source: &str, policy_path: Option<&str>) -> CheckReport {
    let mut checks = Vec::new();
    let mut recommendations = Vec::new();
    let mut count = 0;

    match read_document(source) {
        Err(e) => {
            checks.push(item("registry_parses", format!("failed: {e}")));
            recommendations.push(format!(
                "Run `preflight registry init` or pass a valid --registry (tried {source})."
            ));
        }
        Ok(doc) => {
            checks.push(item("registry_parses", "ok"));
            count = doc.subsystems.len();

            let mut seen = HashSet::new();
            let dups: Vec<&str> = doc
                .subsystems
                .iter()
                .filter(|e| !seen.insert(e.id.as_str()))
                .map(|e| e.id.as_str())
                .collect();
            if dups.is_empty() {
                checks.push(item("ids_unique", "ok"));
            } else {
                checks.push(item("ids_unique", format!("failed: {}", dups.join(","))));
                recommendations.push("Rename or remove duplicated subsystem ids.".to_string());
            }

            let table = EvaluatorTable::standard();
            let unsupported: Vec<&str> = doc
                .subsystems
                .iter()
                .filter(|e| {
                    e.domain
                        .parse::<Domain>()
                        .map(|d| !table.supports(d))
                        .unwrap_or(true)
                })
                .map(|e| e.domain.as_str())
                .collect();
            if unsupported.is_empty() {
                checks.push(item("domains_supported", "ok"));
            } else {
                checks.push(item(
                    "domains_supported",
                    format!("failed: {}", unsupported.join(",")),
                ));
                let known: Vec<&str> = Domain::ALL.iter().map(|d| d.as_str()).collect();
                let known = known.join(", ");
                recommendations.push(format!("Use one of the known domains: {known}."));
            }

            let mut registry = SubsystemRegistry::new(doc.name.as_deref().unwrap_or(source));
            let mut invalid = Vec::new();
            for entry in doc.subsystems {
                let id = entry.id.clone();
                match entry.into_spec() {
                    Ok(spec) => {
                        // duplicates are already reported above
                        let _ = registry.register(spec);
                    }
                    Err(e) => invalid.push(format!("{id}: {e}")),
                }
            }
            if invalid.is_empty() {
                checks.push(item("entries_valid", "ok"));
            } else {
                checks.push(item(
                    "entries_valid",
                    format!("failed: {}", invalid.join("; ")),
                ));
                let hint = "Fix TRL (0-9) and power_draw_kw values on the listed entries.";
                recommendations.push(hint.to_string());
            }

            match resolver::resolve(&registry) {
                Ok(_) => checks.push(item("graph_acyclic", "ok")),
                Err(e) => {
                    checks.push(item("graph_acyclic", format!("failed: {e}")));
                    recommendations.push(
                        "Break the dependency cycle or declare the missing subsystem.".to_string(),
                    );
                }
            }
        }
    }

    match load_policy(policy_path) {
        Ok(_) => checks.push(item("policy_parses", "ok")),
        Err(e) => {
            checks.push(item("policy_parses", format!("failed: {e:#}")));
            recommendations.push("Fix or remove the policy file.".to_string());
        }
    }

    let overall = if checks.iter().all(|c| c.status == "ok") {
        "ok"
    } else {
        "needs_attention"
    }
    .to_string();

    CheckReport {
        overall,
        registry: source.to_string(),
        subsystem_count: count,
        checks,
        recommendations,
    }
}
