use crate::domain::constants::DEFAULT_REGISTRY_SOURCE;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "preflight",
    version,
    about = "Multi-domain subsystem readiness simulation"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(
        long,
        global = true,
        default_value = DEFAULT_REGISTRY_SOURCE,
        help = "Registry source: builtin, a .json/.toml file, or a directory holding .preflight/"
    )]
    pub registry: String,
    #[arg(
        long,
        global = true,
        help = "Policy file (default ~/.config/preflight/policy.toml)"
    )]
    pub policy: Option<String>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate every subsystem and report readiness
    Run {
        #[arg(long = "force-fail", value_name = "ID")]
        force_fail: Vec<String>,
        #[arg(long, default_value_t = false)]
        parallel: bool,
        #[arg(long, value_name = "SECS")]
        timestamp: Option<u64>,
        #[arg(long, value_name = "FILE")]
        out: Option<String>,
    },
    /// Print the resolved evaluation order
    Order,
    Validate,
    Show { id: String },
    List {
        #[arg(long)]
        domain: Option<String>,
    },
    /// Check registry and policy configuration
    Check,
    Registry {
        #[command(subcommand)]
        command: RegistryCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum RegistryCommands {
    Init {
        #[arg(long, default_value = ".")]
        path: String,
        #[arg(long, default_value_t = false)]
        from_builtin: bool,
    },
    Add {
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        domain: String,
        #[arg(long)]
        trl: u8,
        #[arg(long, value_name = "KW|unbounded")]
        power_draw_kw: Option<String>,
        #[arg(long = "depends-on", value_name = "ID")]
        depends_on: Vec<String>,
        #[arg(
            long = "param",
            value_name = "KEY=VALUE",
            value_parser = parse_param
        )]
        params: Vec<(String, f64)>,
        #[arg(long, default_value = ".")]
        path: String,
    },
    Remove {
        id: String,
        #[arg(long, default_value = ".")]
        path: String,
    },
}

fn parse_param(raw: &str) -> Result<(String, f64), String> {
    let (k, v) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {raw}"))?;
    let value: f64 = v
        .trim()
        .parse()
        .map_err(|_| format!("parameter {k} is not a number: {v}"))?;
    if !value.is_finite() {
        return Err(format!("parameter {k} must be finite, got {v}"));
    }
    Ok((k.trim().to_string(), value))
}
