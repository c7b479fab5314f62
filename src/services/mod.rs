//! Service layer: the readiness engine plus side-effect helpers.
//!
//! ## Service map
//! - `registry.rs`: subsystem specs keyed by id, registry digest.
//! - `resolver.rs`: dependency order and depth levels.
//! - `evaluator.rs`: per-domain metric models.
//! - `classifier.rs`: TRL banding and bound checks.
//! - `orchestrator.rs`: the run itself and report assembly.
//! - `catalog.rs`: built-in reference registry.
//! - `authoring.rs`: registry file mutations (init/add/remove).
//! - `check.rs`: configuration doctor report.
//! - `policy.rs`: policy file loading and run options.
//! - `storage.rs`: config paths, audit log, report files.
//! - `output.rs`: JSON/text output helpers.
//!
//! ## Conventions
//! - The engine modules are pure; only `storage`, `authoring` and `policy` touch disk.
//! - Keep command handlers thin; delegate to services.

pub mod authoring;
pub mod catalog;
pub mod check;
pub mod classifier;
pub mod evaluator;
pub mod orchestrator;
pub mod output;
pub mod policy;
pub mod registry;
pub mod resolver;
pub mod storage;
