use crate::domain::constants::{AUDIT_FILE, CONFIG_DIR};
use crate::domain::models::RunReport;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

pub fn config_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")?;
    Ok(PathBuf::from(home).join(CONFIG_DIR))
}

/// Appends one event to the audit log. Best effort: errors are dropped.
pub fn audit(action: &str, data: serde_json::Value) {
    let path = match config_dir() {
        Ok(dir) => dir.join(AUDIT_FILE),
        Err(_) => return,
    };
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let event = serde_json::json!({
        "ts": unix_now(),
        "action": action,
        "data": data
    });
    let line = format!("{}\n", event);
    let _ = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .and_then(|mut f| std::io::Write::write_all(&mut f, line.as_bytes()));
}

/// Wall-clock seconds since the epoch; 0 if the clock is before it.
pub fn unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn unix_now() -> String {
    unix_secs().to_string()
}

pub fn audit_run(report: &RunReport) {
    audit(
        "run",
        serde_json::json!({
            "overall": report.overall_status,
            "digest": report.registry_digest,
            "failed": report.failed_ids,
            "skipped": report.skipped_ids,
        }),
    );
}

/// Writes the bare report (no output envelope) as pretty JSON.
pub fn write_report(path: &Path, report: &RunReport) -> anyhow::Result<()> {
    write_json(path, &serde_json::to_value(report)?)
}

pub fn write_json(path: &Path, value: &serde_json::Value) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}
