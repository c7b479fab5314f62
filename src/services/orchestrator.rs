//! Single-pass simulation run over a registry.
//!
//! Resolve the order, evaluate each subsystem once its dependencies are
//! settled, classify, then fold the results into a [`RunReport`]. A failed
//! subsystem blocks everything downstream of it; nothing is retried.

use crate::domain::constants::{default_criticality, status_score};
use crate::domain::errors::{EngineError, EngineResult, InvalidOperatingPoint};
use crate::domain::models::{
    Domain, DomainSummary, EvaluationResult, MetricBound, RunReport, Status, StatusSummary,
    SubsystemSpec,
};
use crate::services::classifier::{classify, effective_bounds, skipped};
use crate::services::evaluator::EvaluatorTable;
use crate::services::registry::SubsystemRegistry;
use crate::services::resolver;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Subsystems driven into an invalid operating point without evaluating.
    pub forced_failures: BTreeSet<String>,
    /// Evaluate each dependency level concurrently.
    pub parallel: bool,
    /// Report timestamp, stamped as given. Unset reports carry 0; the CLI
    /// passes the wall clock unless `--timestamp` is given.
    pub timestamp: Option<u64>,
    /// Checked before each subsystem starts; once set the run aborts.
    pub cancel: Option<Arc<AtomicBool>>,
    /// Per-domain overrides of the models' nominal bounds.
    pub bounds: BTreeMap<Domain, Vec<MetricBound>>,
    /// Per-domain weights for the readiness score.
    pub criticality: BTreeMap<Domain, f64>,
}

impl RunOptions {
    pub fn force_fail(mut self, id: &str) -> Self {
        self.forced_failures.insert(id.to_string());
        self
    }

    pub fn at(mut self, timestamp: u64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn parallel(mut self, on: bool) -> Self {
        self.parallel = on;
        self
    }

    pub fn cancel_with(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|flag| flag.load(Ordering::Relaxed))
            .unwrap_or(false)
    }
}

/// Runs every registered subsystem with the standard models and default
/// options. The report is stamped 0, so equal registries give equal bytes.
pub fn run(registry: &SubsystemRegistry) -> EngineResult<RunReport> {
    Orchestrator::new(registry).run(&RunOptions::default())
}

pub struct Orchestrator<'a> {
    registry: &'a SubsystemRegistry,
    table: EvaluatorTable,
}

impl<'a> Orchestrator<'a> {
    pub fn new(registry: &'a SubsystemRegistry) -> Self {
        Self::with_table(registry, EvaluatorTable::standard())
    }

    pub fn with_table(registry: &'a SubsystemRegistry, table: EvaluatorTable) -> Self {
        Self { registry, table }
    }

    /// Checks that would abort a run, without evaluating anything.
    pub fn preflight(&self, options: &RunOptions) -> EngineResult<Vec<String>> {
        for spec in self.registry.all() {
            if !self.table.supports(spec.domain) {
                return Err(EngineError::UnsupportedDomain(spec.domain.to_string()));
            }
        }
        for id in &options.forced_failures {
            self.registry.get(id)?;
        }
        resolver::resolve(self.registry)
    }

    pub fn run(&self, options: &RunOptions) -> EngineResult<RunReport> {
        let order = self.preflight(options)?;
        info!(
            target: "preflight.run",
            registry = self.registry.name(),
            subsystems = order.len(),
            parallel = options.parallel,
            "run started"
        );

        let mut results = if options.parallel {
            self.evaluate_levels(&order, options)?
        } else {
            self.evaluate_sequential(&order, options)?
        };

        let ordered: Vec<EvaluationResult> = order
            .iter()
            .filter_map(|id| results.remove(id))
            .collect();
        let report = assemble(
            self.registry,
            order,
            ordered,
            options.timestamp.unwrap_or(0),
            &options.criticality,
        );
        info!(
            target: "preflight.run",
            overall = %report.overall_status,
            failed = report.failed_ids.len(),
            skipped = report.skipped_ids.len(),
            score = report.readiness_score,
            "run finished"
        );
        Ok(report)
    }

    fn evaluate_sequential(
        &self,
        order: &[String],
        options: &RunOptions,
    ) -> EngineResult<BTreeMap<String, EvaluationResult>> {
        let mut results = BTreeMap::new();
        for (completed, id) in order.iter().enumerate() {
            if options.cancelled() {
                return Err(EngineError::Cancelled { completed });
            }
            let result = self.step(id, &results, options)?;
            results.insert(id.clone(), result);
        }
        Ok(results)
    }

    #[cfg(feature = "parallel")]
    fn evaluate_levels(
        &self,
        order: &[String],
        options: &RunOptions,
    ) -> EngineResult<BTreeMap<String, EvaluationResult>> {
        use rayon::prelude::*;

        let mut results = BTreeMap::new();
        for level in resolver::levels(self.registry, order)? {
            let completed = results.len();
            let settled = &results;
            let batch = level
                .par_iter()
                .map(|id| {
                    if options.cancelled() {
                        return Err(EngineError::Cancelled { completed });
                    }
                    self.step(id, settled, options).map(|r| (id.clone(), r))
                })
                .collect::<EngineResult<Vec<_>>>()?;
            results.extend(batch);
        }
        Ok(results)
    }

    #[cfg(not(feature = "parallel"))]
    fn evaluate_levels(
        &self,
        order: &[String],
        options: &RunOptions,
    ) -> EngineResult<BTreeMap<String, EvaluationResult>> {
        debug!(
            target: "preflight.run",
            "built without the parallel feature; evaluating sequentially"
        );
        self.evaluate_sequential(order, options)
    }

    fn step(
        &self,
        id: &str,
        settled: &BTreeMap<String, EvaluationResult>,
        options: &RunOptions,
    ) -> EngineResult<EvaluationResult> {
        let spec = self.registry.get(id)?;
        let upstream = spec
            .dependencies
            .iter()
            .map(|dep| {
                settled
                    .get(dep)
                    .ok_or_else(|| EngineError::UnknownSubsystem(dep.clone()))
            })
            .collect::<EngineResult<Vec<_>>>()?;

        let blockers: Vec<&EvaluationResult> = upstream
            .iter()
            .copied()
            .filter(|r| matches!(r.status, Status::Failed | Status::Skipped))
            .collect();
        if !blockers.is_empty() {
            let result = skipped(spec, &blockers);
            debug!(
                target: "preflight.eval",
                id,
                reason = result.reason.as_deref(),
                "subsystem skipped"
            );
            return Ok(result);
        }

        let outcome = if options.forced_failures.contains(id) {
            warn!(target: "preflight.eval", id, "forced failure");
            Err(InvalidOperatingPoint("forced failure".to_string()))
        } else {
            let outcome = self.table.evaluate(spec, &upstream)?;
            if let Err(err) = &outcome {
                warn!(target: "preflight.eval", id, detail = %err.0, "invalid operating point");
            }
            outcome
        };

        let result = classify(spec, outcome, &self.bounds_for(spec, options)?);
        debug!(
            target: "preflight.eval",
            id,
            status = %result.status,
            metrics = result.metrics.len(),
            "subsystem evaluated"
        );
        Ok(result)
    }

    fn bounds_for(
        &self,
        spec: &SubsystemSpec,
        options: &RunOptions,
    ) -> EngineResult<Vec<MetricBound>> {
        let defaults = self.table.model(spec.domain)?.nominal_bounds();
        let policy = options
            .bounds
            .get(&spec.domain)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        Ok(effective_bounds(&[&defaults[..], policy, &spec.bounds[..]]))
    }
}

/// Worst non-skipped status; OPERATIONAL when there is none.
pub fn overall_status<'r>(results: impl IntoIterator<Item = &'r EvaluationResult>) -> Status {
    results
        .into_iter()
        .filter_map(|r| r.status.severity().map(|s| (s, r.status)))
        .max_by_key(|(s, _)| *s)
        .map(|(_, status)| status)
        .unwrap_or(Status::Operational)
}

/// Criticality-weighted mean of per-status scores, rounded to 4 places.
pub fn readiness_score<'r>(
    results: impl IntoIterator<Item = &'r EvaluationResult>,
    criticality: &BTreeMap<Domain, f64>,
) -> f64 {
    let (total, earned) = results.into_iter().fold((0.0, 0.0), |(total, earned), r| {
        let w = criticality
            .get(&r.domain)
            .copied()
            .unwrap_or_else(|| default_criticality(r.domain));
        (total + w, earned + w * status_score(r.status))
    });
    if total <= 0.0 {
        return 1.0;
    }
    (earned / total * 10_000.0).round() / 10_000.0
}

fn summarize<'r>(results: impl IntoIterator<Item = &'r EvaluationResult>) -> StatusSummary {
    let mut summary = StatusSummary::default();
    for r in results {
        summary.record(r.status);
    }
    summary
}

/// Status, score and counts per domain present in the run. A domain whose
/// members were all skipped reports SKIPPED.
pub fn domain_rollup(
    results: &[EvaluationResult],
    criticality: &BTreeMap<Domain, f64>,
) -> BTreeMap<Domain, DomainSummary> {
    let mut grouped: BTreeMap<Domain, Vec<&EvaluationResult>> = BTreeMap::new();
    for r in results {
        grouped.entry(r.domain).or_default().push(r);
    }
    grouped
        .into_iter()
        .map(|(domain, members)| {
            let summary = summarize(members.iter().copied());
            let status = if summary.skipped == members.len() {
                Status::Skipped
            } else {
                overall_status(members.iter().copied())
            };
            let rollup = DomainSummary {
                subsystems: members.len(),
                overall_status: status,
                readiness_score: readiness_score(members.iter().copied(), criticality),
                summary,
            };
            (domain, rollup)
        })
        .collect()
}

fn assemble(
    registry: &SubsystemRegistry,
    order: Vec<String>,
    ordered_results: Vec<EvaluationResult>,
    timestamp: u64,
    criticality: &BTreeMap<Domain, f64>,
) -> RunReport {
    let mut failed_ids = BTreeSet::new();
    let mut skipped_ids = BTreeSet::new();
    for r in &ordered_results {
        match r.status {
            Status::Failed => {
                failed_ids.insert(r.subsystem_id.clone());
            }
            Status::Skipped => {
                skipped_ids.insert(r.subsystem_id.clone());
            }
            _ => {}
        }
    }
    RunReport {
        timestamp,
        registry_digest: registry.digest(),
        overall_status: overall_status(&ordered_results),
        readiness_score: readiness_score(&ordered_results, criticality),
        summary: summarize(&ordered_results),
        domains: domain_rollup(&ordered_results, criticality),
        order,
        ordered_results,
        failed_ids,
        skipped_ids,
    }
}
