use crate::domain::constants::ILLUSTRATIVE_MARKER;
use crate::domain::models::{EvaluationResult, MetricBound, Metrics, Status, SubsystemSpec};
use crate::services::evaluator::EvalOutcome;

/// Merges bound layers by metric name. Later layers win: domain defaults,
/// then policy overrides, then the subsystem's own bounds.
pub fn effective_bounds(layers: &[&[MetricBound]]) -> Vec<MetricBound> {
    let mut merged: Vec<MetricBound> = Vec::new();
    for layer in layers {
        for bound in layer.iter() {
            match merged.iter_mut().find(|b| b.metric == bound.metric) {
                Some(existing) => *existing = bound.clone(),
                None => merged.push(bound.clone()),
            }
        }
    }
    merged
}

/// Violations of `bounds` by `metrics`. Bounds on metrics the model did not
/// produce are ignored.
pub fn violations(metrics: &Metrics, bounds: &[MetricBound]) -> Vec<String> {
    bounds
        .iter()
        .filter_map(|b| metrics.get(&b.metric).and_then(|v| b.violation(*v)))
        .collect()
}

/// Result for a subsystem whose dependencies did not all evaluate.
pub fn skipped(spec: &SubsystemSpec, blockers: &[&EvaluationResult]) -> EvaluationResult {
    let names: Vec<String> = blockers
        .iter()
        .map(|r| format!("{} ({})", r.subsystem_id, r.status))
        .collect();
    EvaluationResult {
        subsystem_id: spec.id.clone(),
        domain: spec.domain,
        trl: spec.trl,
        metrics: Metrics::new(),
        status: Status::Skipped,
        reason: Some(format!("blocked by upstream {}", names.join(", "))),
        illustrative: false,
    }
}

pub fn classify(
    spec: &SubsystemSpec,
    outcome: EvalOutcome,
    bounds: &[MetricBound],
) -> EvaluationResult {
    let (metrics, status, reason) = match outcome {
        Err(err) => (Metrics::new(), Status::Failed, Some(err.to_string())),
        Ok(metrics) => {
            let (status, reason) = band(spec.trl, &metrics, bounds);
            (metrics, status, reason)
        }
    };
    EvaluationResult {
        subsystem_id: spec.id.clone(),
        domain: spec.domain,
        trl: spec.trl,
        metrics,
        status,
        reason,
        illustrative: spec.trl == 0 && status == Status::Theoretical,
    }
}

fn band(trl: u8, metrics: &Metrics, bounds: &[MetricBound]) -> (Status, Option<String>) {
    match trl {
        7..=u8::MAX => {
            let out = violations(metrics, bounds);
            if out.is_empty() {
                (Status::Operational, None)
            } else {
                (Status::Degraded, Some(format!("out of bounds: {}", out.join("; "))))
            }
        }
        4..=6 => (
            Status::Standby,
            Some(format!("TRL {trl}: prototype, held in standby")),
        ),
        1..=3 => (
            Status::Theoretical,
            Some(format!("TRL {trl}: concept only")),
        ),
        0 => (
            Status::Theoretical,
            Some(format!("TRL 0: {ILLUSTRATIVE_MARKER}")),
        ),
    }
}
