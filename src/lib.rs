//! Multi-domain subsystem readiness simulation.
//!
//! `load_registry` builds a [`SubsystemRegistry`], [`run`] evaluates it once
//! in dependency order and [`render_report`] turns the resulting
//! [`RunReport`] into text. The `preflight` binary wraps the same calls.

pub mod cli;
pub mod commands;
pub mod domain;
pub mod loader;
pub mod services;

pub use cli::*;
pub use commands::{handle_registry_commands, handle_runtime_commands};
pub use domain::constants::LOG_ENV;
pub use domain::errors::*;
pub use domain::models::*;
pub use loader::{load_registry, LoadError};
pub use services::authoring::{registry_add, registry_init, registry_remove, NewSubsystem};
pub use services::check::build_check_report;
pub use services::orchestrator::{run, Orchestrator, RunOptions};
pub use services::output::{print_one, print_out, print_verdict, render_report};
pub use services::policy::{load_policy, run_options};
pub use services::registry::SubsystemRegistry;
pub use services::storage::{audit_run, unix_secs, write_report};
