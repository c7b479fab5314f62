use crate::*;
use anyhow::Context;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub fn handle_runtime_commands(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Run {
            force_fail,
            parallel,
            timestamp,
            out,
        } => {
            let registry = load_registry(&cli.registry)?;
            let policy = load_policy(cli.policy.as_deref())?;
            let mut options = run_options(&policy)?;
            options.forced_failures.extend(force_fail.iter().cloned());
            options.parallel |= *parallel;
            options.timestamp = Some(timestamp.unwrap_or_else(unix_secs));

            let cancel = Arc::new(AtomicBool::new(false));
            let flag = cancel.clone();
            ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
                .context("installing Ctrl-C handler")?;
            options.cancel = Some(cancel);

            let report = Orchestrator::new(&registry).run(&options)?;
            audit_run(&report);
            if let Some(path) = out {
                write_report(Path::new(path), &report)?;
            }

            let tripped = policy.general.fail_on.trips(report.overall_status);
            print_verdict(cli.json, !tripped, &report, |r| render_report(r))?;
            if tripped {
                std::process::exit(1);
            }
        }
        Commands::Order => {
            let registry = load_registry(&cli.registry)?;
            let order = Orchestrator::new(&registry).preflight(&RunOptions::default())?;
            let items = order
                .iter()
                .enumerate()
                .map(|(i, id)| {
                    let spec = registry.get(id)?;
                    Ok(OrderItem {
                        position: i + 1,
                        id: id.clone(),
                        domain: spec.domain,
                        dependencies: spec.dependencies.iter().cloned().collect(),
                    })
                })
                .collect::<EngineResult<Vec<_>>>()?;
            print_out(cli.json, &items, |o| {
                format!("{}\t{}\t{}", o.position, o.id, o.domain)
            })?;
        }
        Commands::Validate => {
            let registry = load_registry(&cli.registry)?;
            Orchestrator::new(&registry).preflight(&RunOptions::default())?;
            let data = serde_json::json!({
                "registry": registry.name(),
                "subsystems": registry.len(),
                "digest": registry.digest(),
            });
            print_one(cli.json, data, |_| "registry valid".to_string())?;
        }
        Commands::Show { id } => {
            let registry = load_registry(&cli.registry)?;
            let spec = registry.get(id)?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&JsonOut {
                        ok: true,
                        data: spec
                    })?
                );
            } else {
                println!("id: {}", spec.id);
                println!("name: {}", spec.name);
                println!("domain: {}", spec.domain);
                println!("trl: {}", spec.trl);
                if spec.power_unbounded() {
                    println!("power_draw_kw: unbounded");
                } else {
                    println!("power_draw_kw: {}", spec.power_draw_kw);
                }
                if !spec.dependencies.is_empty() {
                    let deps: Vec<&str> = spec.dependencies.iter().map(String::as_str).collect();
                    println!("dependencies: {}", deps.join(", "));
                }
                for (k, v) in &spec.parameters {
                    println!("param {}={}", k, v);
                }
                if let Some(d) = &spec.description {
                    println!("description: {}", d);
                }
            }
        }
        Commands::List { domain } => {
            let registry = load_registry(&cli.registry)?;
            let specs: Vec<&SubsystemSpec> = match domain {
                Some(d) => registry.by_domain(d.parse()?),
                None => registry.all().collect(),
            };
            print_out(cli.json, &specs, |s| {
                format!("{}\t{}\tTRL {}\t{}", s.id, s.domain, s.trl, s.name)
            })?;
        }
        Commands::Check => {
            let report = build_check_report(&cli.registry, cli.policy.as_deref());
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&JsonOut {
                        ok: report.overall == "ok",
                        data: report
                    })?
                );
            } else {
                println!("check: {}", report.overall);
                for c in &report.checks {
                    println!("{}\t{}", c.name, c.status);
                }
                for r in &report.recommendations {
                    println!("- {}", r);
                }
            }
        }
        Commands::Registry { .. } => {}
    }
    Ok(())
}
