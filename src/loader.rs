use crate::domain::constants::{
    DEFAULT_REGISTRY_SOURCE, MAX_TRL, REGISTRY_DIR, REGISTRY_JSON, REGISTRY_TOML,
};
use crate::domain::errors::EngineError;
use crate::domain::models::{Domain, MetricBound, SubsystemSpec};
use crate::services::catalog;
use crate::services::registry::SubsystemRegistry;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("registry not found: {0}")]
    NotFound(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid registry json {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
    #[error("invalid registry toml {path}: {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("subsystem {id}: {message}")]
    Invalid { id: String, message: String },
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl LoadError {
    fn invalid(id: &str, message: impl Into<String>) -> Self {
        LoadError::Invalid {
            id: id.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegistryDocument {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub subsystems: Vec<SubsystemEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PowerDraw {
    Kw(f64),
    Text(String),
}

/// On-disk shape of one subsystem, before validation.
#[derive(Debug, Deserialize)]
pub struct SubsystemEntry {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub domain: String,
    pub trl: u8,
    #[serde(default)]
    pub power_draw_kw: Option<PowerDraw>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub parameters: BTreeMap<String, f64>,
    #[serde(default)]
    pub bounds: Vec<MetricBound>,
    #[serde(default)]
    pub description: Option<String>,
}

impl SubsystemEntry {
    pub fn into_spec(self) -> Result<SubsystemSpec, LoadError> {
        let domain: Domain = self.domain.parse()?;
        if self.id.trim().is_empty() {
            return Err(LoadError::invalid(&self.id, "empty id"));
        }
        if self.trl > MAX_TRL {
            return Err(LoadError::invalid(
                &self.id,
                format!("trl {} outside 0..={MAX_TRL}", self.trl),
            ));
        }
        let draw = match self.power_draw_kw {
            Some(PowerDraw::Kw(kw)) if kw.is_nan() || kw < 0.0 => {
                return Err(LoadError::invalid(
                    &self.id,
                    format!("power_draw_kw must be non-negative, got {kw}"),
                ))
            }
            Some(PowerDraw::Kw(kw)) => kw,
            Some(PowerDraw::Text(t)) if t.trim().eq_ignore_ascii_case("unbounded") => f64::INFINITY,
            Some(PowerDraw::Text(t)) => {
                return Err(LoadError::invalid(
                    &self.id,
                    format!("power_draw_kw must be a number or \"unbounded\", got {t:?}"),
                ))
            }
            None if domain == Domain::Exotic => f64::INFINITY,
            None => return Err(LoadError::invalid(&self.id, "power_draw_kw is required")),
        };
        if let Some((k, _)) = self.parameters.iter().find(|(_, v)| v.is_nan()) {
            return Err(LoadError::invalid(&self.id, format!("parameter {k} is NaN")));
        }
        for b in &self.bounds {
            if b.min.map_or(false, f64::is_nan) || b.max.map_or(false, f64::is_nan) {
                return Err(LoadError::invalid(
                    &self.id,
                    format!("bound on {} is NaN", b.metric),
                ));
            }
        }

        let mut spec = SubsystemSpec::new(
            &self.id,
            self.name.as_deref().unwrap_or(&self.id),
            domain,
            self.trl,
            draw,
        );
        spec.dependencies = self.dependencies.into_iter().collect();
        spec.parameters = self.parameters;
        spec.bounds = self.bounds;
        spec.description = self.description;
        Ok(spec)
    }
}

/// A directory source resolves to `<dir>/.preflight/registry.json`, falling
/// back to `registry.toml`. Anything else is taken as the file itself.
pub fn resolve_registry_file(source: &str) -> PathBuf {
    let p = Path::new(source);
    if p.is_dir() {
        let base = p.join(REGISTRY_DIR);
        let json = base.join(REGISTRY_JSON);
        let toml = base.join(REGISTRY_TOML);
        if !json.exists() && toml.exists() {
            toml
        } else {
            json
        }
    } else {
        p.to_path_buf()
    }
}

pub fn parse_document(raw: &str, path: &Path) -> Result<RegistryDocument, LoadError> {
    let shown = path.display().to_string();
    let is_toml = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("toml"))
        .unwrap_or(false);
    if is_toml {
        toml::from_str(raw).map_err(|source| LoadError::Toml {
            path: shown,
            source,
        })
    } else {
        serde_json::from_str(raw).map_err(|source| LoadError::Json {
            path: shown,
            source,
        })
    }
}

pub fn build_registry(
    doc: RegistryDocument,
    fallback_name: &str,
) -> Result<SubsystemRegistry, LoadError> {
    let mut registry = SubsystemRegistry::new(doc.name.as_deref().unwrap_or(fallback_name));
    for entry in doc.subsystems {
        registry.register(entry.into_spec()?)?;
    }
    Ok(registry)
}

pub fn load_registry(source: &str) -> Result<SubsystemRegistry, LoadError> {
    if source == DEFAULT_REGISTRY_SOURCE {
        return Ok(catalog::builtin()?);
    }
    let file = resolve_registry_file(source);
    if !file.exists() {
        return Err(LoadError::NotFound(file.display().to_string()));
    }
    let raw = std::fs::read_to_string(&file).map_err(|source| LoadError::Io {
        path: file.display().to_string(),
        source,
    })?;
    let doc = parse_document(&raw, &file)?;
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "registry".to_string());
    build_registry(doc, &stem)
}

#[cfg(test)]
mod tests {
    use super::{build_registry, load_registry, parse_document, LoadError};
    use crate::domain::errors::EngineError;
    use crate::domain::models::Domain;
    use std::path::Path;

    fn from_json(raw: &str) -> Result<crate::services::registry::SubsystemRegistry, LoadError> {
        build_registry(parse_document(raw, Path::new("r.json"))?, "r")
    }

    #[test]
    fn parses_json_document() {
        let reg = from_json(
            r#"{"name":"fixture","subsystems":[
                {"id":"apdn","name":"APDN","domain":"POWER","trl":6,"power_draw_kw":850},
                {"id":"ew_array","domain":"ew","trl":7,"power_draw_kw":120,"dependencies":["apdn"],
                 "bounds":[{"metric":"suppression_db","min":25}]}
            ]}"#,
        )
        .unwrap();
        assert_eq!(reg.name(), "fixture");
        let ew = reg.get("ew_array").unwrap();
        assert_eq!(ew.domain, Domain::Ew);
        assert_eq!(ew.name, "ew_array");
        assert!(ew.dependencies.contains("apdn"));
        assert_eq!(ew.bounds[0].min, Some(25.0));
    }

    #[test]
    fn parses_toml_document_with_unbounded_draw() {
        let raw = r#"
name = "toml-fixture"

[[subsystems]]
id = "wormhole"
domain = "exotic"
trl = 0
power_draw_kw = "unbounded"

[[subsystems]]
id = "lens"
domain = "EXOTIC"
trl = 1
"#;
        let doc = parse_document(raw, Path::new("r.toml")).unwrap();
        let reg = build_registry(doc, "r").unwrap();
        assert!(reg.get("wormhole").unwrap().power_unbounded());
        assert!(reg.get("lens").unwrap().power_unbounded());
    }

    #[test]
    fn domain_strings_accept_dashes() {
        let reg = from_json(
            r#"{"subsystems":[
                {"id":"hel","domain":"directed-energy","trl":7,"power_draw_kw":150}]}"#,
        )
        .unwrap();
        assert_eq!(reg.get("hel").unwrap().domain, Domain::DirectedEnergy);
        assert_eq!(reg.name(), "r");
    }

    #[test]
    fn unknown_domain_is_unsupported() {
        let raw = r#"{"subsystems":[{"id":"x","domain":"SONAR","trl":7,"power_draw_kw":1}]}"#;
        let err = from_json(raw).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Engine(EngineError::UnsupportedDomain(ref d)) if d == "SONAR"
        ));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = from_json(
            r#"{"subsystems":[
                {"id":"x","domain":"CRYPTO","trl":7,"power_draw_kw":1},
                {"id":"x","domain":"CRYPTO","trl":7,"power_draw_kw":1}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::Engine(EngineError::DuplicateId(_))));
    }

    #[test]
    fn malformed_entries_are_rejected() {
        for raw in [
            r#"{"subsystems":[{"id":"x","domain":"CRYPTO","trl":10,"power_draw_kw":1}]}"#,
            r#"{"subsystems":[{"id":"x","domain":"CRYPTO","trl":7,"power_draw_kw":-1}]}"#,
            r#"{"subsystems":[{"id":"x","domain":"CRYPTO","trl":7,"power_draw_kw":"lots"}]}"#,
            r#"{"subsystems":[{"id":"x","domain":"CRYPTO","trl":7}]}"#,
        ] {
            assert!(matches!(from_json(raw), Err(LoadError::Invalid { .. })), "{raw}");
        }
        assert!(matches!(from_json("{not json"), Err(LoadError::Json { .. })));
        let negative = r#"{"subsystems":[{"id":"x","domain":"CRYPTO","trl":-1}]}"#;
        assert!(matches!(from_json(negative), Err(LoadError::Json { .. })));
    }

    #[test]
    fn nan_is_rejected_from_toml() {
        let raw = r#"
[[subsystems]]
id = "x"
domain = "POWER"
trl = 7
power_draw_kw = nan
"#;
        let doc = parse_document(raw, Path::new("r.toml")).unwrap();
        let err = build_registry(doc, "r").unwrap_err();
        assert!(matches!(err, LoadError::Invalid { .. }));
    }

    #[test]
    fn directory_source_resolves_to_registry_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = tmp.path().join(".preflight");
        std::fs::create_dir_all(&dir).unwrap();
        let raw = r#"
name = "dir"

[[subsystems]]
id = "qrcm"
domain = "CRYPTO"
trl = 8
power_draw_kw = 0.5
"#;
        std::fs::write(dir.join("registry.toml"), raw).unwrap();
        let reg = load_registry(tmp.path().to_str().unwrap()).unwrap();
        assert_eq!(reg.name(), "dir");
        assert!(reg.contains("qrcm"));
    }

    #[test]
    fn missing_file_is_not_found() {
        assert!(matches!(
            load_registry("/definitely/not/here.json"),
            Err(LoadError::NotFound(_))
        ));
    }

    #[test]
    fn builtin_source_serves_catalogue() {
        let reg = load_registry("builtin").unwrap();
        assert!(reg.contains("apdn"));
    }
}
