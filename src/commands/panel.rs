use crate::*;

pub fn handle_panel_commands(cli: &Cli, file: &PanelFile) -> anyhow::Result<bool> {
    let needs_panel = matches!(
        cli.command,
        Commands::Render { .. } | Commands::Tool | Commands::Validate
    );
    if !needs_panel {
        return Ok(false);
    }

    let panel = Panel::new(
        file,
        live_deps(&file.settings, Arc::new(OnlineDirectory::default()))?,
    )?;

    match &cli.command {
        Commands::Render { page } => {
            let rendered = panel.render(*page);
            print_page(cli.json, &rendered)?;
        }
        Commands::Tool => {
            let Some(tile) = panel.tool_tile() else {
                anyhow::bail!("panel file defines no tool entry");
            };
            print_one(cli.json, tile, |t| format!("tool: {}", t.display_name()))?;
        }
        Commands::Validate => {
            let menu = panel.menu();
            let report = ValidateReport {
                entries: menu.entry_count(),
                pages: menu.last_page(),
                capacity: menu.capacity(),
                has_tool: menu.tool().is_some(),
            };
            print_one(cli.json, report, |r| {
                format!(
                    "panel valid: {} entries on {} pages",
                    r.entries, r.pages
                )
            })?;
        }
        _ => return Ok(false),
    }

    Ok(true)
}
