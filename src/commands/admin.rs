use crate::*;

pub fn handle_registry_commands(cli: &Cli) -> anyhow::Result<bool> {
    let Commands::Registry { command } = &cli.command else {
        return Ok(false);
    };

    match command {
        RegistryCommands::Init { path, from_builtin } => {
            let file = registry_init(path, *from_builtin)?;
            let shown = file.to_string_lossy().to_string();
            print_one(cli.json, shown, |f| format!("registry initialized at {f}"))?;
        }
        RegistryCommands::Add {
            id,
            name,
            domain,
            trl,
            power_draw_kw,
            depends_on,
            params,
            path,
        } => {
            let new = NewSubsystem {
                id: id.clone(),
                name: name.clone(),
                domain: domain.clone(),
                trl: *trl,
                power_draw_kw: power_draw_kw.clone(),
                depends_on: depends_on.clone(),
                params: params.clone(),
            };
            registry_add(path, &new)?;
            print_one(cli.json, "added", |_| format!("subsystem {id} added"))?;
        }
        RegistryCommands::Remove { id, path } => {
            registry_remove(path, id)?;
            print_one(cli.json, "removed", |_| format!("subsystem {id} removed"))?;
        }
    }

    Ok(true)
}
