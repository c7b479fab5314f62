//! Command handler layer.
//!
//! This module owns CLI-oriented orchestration and output wiring.
//!
//! ## Files
//! - `admin.rs`: registry authoring (init/add/remove).
//! - `runtime.rs`: run/order/validate/show/list/check.
//!
//! ## Principles
//! - Parse/match CLI inputs here.
//! - Delegate engine and file work to `services/*` and `loader`.
//! - Keep output schema stable; `docs/contracts/` pins the JSON shapes.

pub mod admin;
pub mod runtime;

pub use admin::handle_registry_commands;
pub use runtime::handle_runtime_commands;
