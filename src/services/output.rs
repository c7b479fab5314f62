use crate::domain::models::{JsonOut, RunReport};
use serde::Serialize;
use std::collections::BTreeSet;

pub fn print_out<T: Serialize>(
    json: bool,
    data: &[T],
    row: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut { ok: true, data })?
        );
    } else {
        for d in data {
            println!("{}", row(d));
        }
    }
    Ok(())
}

pub fn print_one<T: Serialize>(
    json: bool,
    data: T,
    row: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    print_verdict(json, true, data, row)
}

/// Like `print_one`, with the envelope's `ok` set by the caller.
pub fn print_verdict<T: Serialize>(
    json: bool,
    ok: bool,
    data: T,
    row: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&JsonOut { ok, data })?);
    } else {
        println!("{}", row(&data));
    }
    Ok(())
}

fn id_list(ids: &BTreeSet<String>) -> String {
    if ids.is_empty() {
        "-".to_string()
    } else {
        ids.iter().cloned().collect::<Vec<_>>().join(",")
    }
}

pub fn render_report(report: &RunReport) -> String {
    let mut lines: Vec<String> = report
        .ordered_results
        .iter()
        .map(|r| {
            format!(
                "{}\t{}\t{}",
                r.subsystem_id,
                r.status,
                r.reason.as_deref().unwrap_or("-")
            )
        })
        .collect();
    lines.push(format!("overall: {}", report.overall_status));
    lines.push(format!("failed: {}", id_list(&report.failed_ids)));
    lines.push(format!("skipped: {}", id_list(&report.skipped_ids)));
    lines.push(format!("score: {:.4}", report.readiness_score));
    for (domain, rollup) in &report.domains {
        lines.push(format!(
            "domain {}: {} score {:.4} ({})",
            domain, rollup.overall_status, rollup.readiness_score, rollup.subsystems
        ));
    }
    lines.join("\n")
}
