//! Shared data model layer (structs/constants only).
//!
//! ## Purpose
//! - Keep subsystem specs, evaluation results and report structs in one place.
//! - Avoid cyclic imports between the engine services and the command layer.
//! - Make JSON output schema changes explicit and reviewable.
//!
//! ## Files
//! - `models.rs`: specs, results, run report, policy and check structs.
//! - `errors.rs`: configuration-time engine errors and the operating-point error.
//! - `constants.rs`: stable constants (paths, markers, scoring tables).
//!
//! ## Rule of thumb
//! Domain types should be data-only: no filesystem side effects.
//!
//! ## Compatibility note
//! Changes in these structs can affect `--json` outputs and integration contracts.
//! Keep schema-impacting changes explicit and synchronized with `docs/contracts/*`.

pub mod constants;
pub mod errors;
pub mod models;
