use crate::domain::constants::{MAX_TRL, REGISTRY_DIR, REGISTRY_JSON};
use crate::domain::models::Domain;
use crate::loader::{build_registry, RegistryDocument};
use crate::services::catalog;
use crate::services::resolver;
use crate::services::storage::write_json;
use std::path::{Path, PathBuf};

/// New subsystem as given on the command line.
#[derive(Debug, Clone)]
pub struct NewSubsystem {
    pub id: String,
    pub name: String,
    pub domain: String,
    pub trl: u8,
    /// Kilowatts, or `unbounded`.
    pub power_draw_kw: Option<String>,
    pub depends_on: Vec<String>,
    pub params: Vec<(String, f64)>,
}

/// JSON registry file named by `path`: the file itself when it ends in
/// `.json`, else `<path>/.preflight/registry.json`.
pub fn registry_file(path: &str) -> anyhow::Result<PathBuf> {
    let p = Path::new(path);
    match p.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(p.to_path_buf()),
        Some(ext) if ext.eq_ignore_ascii_case("toml") => {
            anyhow::bail!("registry editing supports JSON files only: {}", p.display())
        }
        _ => Ok(p.join(REGISTRY_DIR).join(REGISTRY_JSON)),
    }
}

fn load_registry_value(file: &Path) -> anyhow::Result<serde_json::Value> {
    if !file.exists() {
        anyhow::bail!(
            "registry not found: {} (run `preflight registry init`)",
            file.display()
        );
    }
    Ok(serde_json::from_str(&std::fs::read_to_string(file)?)?)
}

fn subsystems_mut(v: &mut serde_json::Value) -> anyhow::Result<&mut Vec<serde_json::Value>> {
    if v.get("subsystems").is_none() {
        v["subsystems"] = serde_json::Value::Array(vec![]);
    }
    v.get_mut("subsystems")
        .and_then(|x| x.as_array_mut())
        .ok_or_else(|| anyhow::anyhow!("invalid subsystems array"))
}

fn entry_id(entry: &serde_json::Value) -> Option<&str> {
    entry.get("id").and_then(|x| x.as_str())
}

fn depends_on(entry: &serde_json::Value, id: &str) -> bool {
    entry
        .get("dependencies")
        .and_then(|d| d.as_array())
        .map(|deps| deps.iter().any(|d| d.as_str() == Some(id)))
        .unwrap_or(false)
}

/// Re-reads the edited document through the loader and resolver before it is saved.
fn check_document(v: &serde_json::Value) -> anyhow::Result<()> {
    let doc: RegistryDocument = serde_json::from_value(v.clone())?;
    let registry = build_registry(doc, "registry")?;
    resolver::resolve(&registry)?;
    Ok(())
}

pub fn registry_init(path: &str, from_builtin: bool) -> anyhow::Result<PathBuf> {
    let file = registry_file(path)?;
    if file.exists() {
        anyhow::bail!("registry exists: {}", file.display());
    }
    let doc = if from_builtin {
        catalog::builtin_document()
    } else {
        let name = Path::new(path)
            .canonicalize()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
            .unwrap_or_else(|| "registry".to_string());
        serde_json::json!({"name": name, "subsystems": []})
    };
    write_json(&file, &doc)?;
    Ok(file)
}

pub fn registry_add(path: &str, new: &NewSubsystem) -> anyhow::Result<()> {
    let file = registry_file(path)?;
    let mut v = load_registry_value(&file)?;
    let domain: Domain = new.domain.parse()?;
    if new.trl > MAX_TRL {
        anyhow::bail!("trl {} outside 0..={}", new.trl, MAX_TRL);
    }

    let arr = subsystems_mut(&mut v)?;
    if arr.iter().any(|e| entry_id(e) == Some(new.id.as_str())) {
        anyhow::bail!("subsystem exists: {}", new.id);
    }
    for dep in &new.depends_on {
        if !arr.iter().any(|e| entry_id(e) == Some(dep.as_str())) {
            anyhow::bail!("unknown dependency: {}", dep);
        }
    }

    let mut entry = serde_json::json!({
        "id": new.id,
        "name": new.name,
        "domain": domain.as_str(),
        "trl": new.trl,
        "dependencies": new.depends_on,
        "parameters": {},
    });
    match new.power_draw_kw.as_deref() {
        None => {}
        Some(raw) if raw.trim().eq_ignore_ascii_case("unbounded") => {
            entry["power_draw_kw"] = serde_json::Value::String("unbounded".to_string());
        }
        Some(raw) => {
            let kw: f64 = raw
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid power draw: {}", raw))?;
            if !kw.is_finite() {
                anyhow::bail!("power draw must be finite or 'unbounded', got {}", raw);
            }
            entry["power_draw_kw"] = serde_json::json!(kw);
        }
    }
    for (k, val) in &new.params {
        if !val.is_finite() {
            anyhow::bail!("parameter {} must be finite, got {}", k, val);
        }
        entry["parameters"][k.as_str()] = serde_json::json!(val);
    }
    arr.push(entry);

    check_document(&v)?;
    write_json(&file, &v)
}

pub fn registry_remove(path: &str, id: &str) -> anyhow::Result<()> {
    let file = registry_file(path)?;
    let mut v = load_registry_value(&file)?;
    let arr = subsystems_mut(&mut v)?;
    if !arr.iter().any(|e| entry_id(e) == Some(id)) {
        anyhow::bail!("subsystem not found: {}", id);
    }
    let dependents: Vec<&str> = arr
        .iter()
        .filter(|e| depends_on(e, id))
        .filter_map(entry_id)
        .collect();
    if !dependents.is_empty() {
        let users = dependents.join(", ");
        anyhow::bail!("cannot remove {id}: required by {users}");
    }
    arr.retain(|e| entry_id(e) != Some(id));
    write_json(&file, &v)
}
