use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod domain;
mod services;

pub use cli::{BlobSource, Cli, Commands};
pub use commands::{handle_lookup_commands, handle_panel_commands, handle_session_command, http_client, live_deps};
pub use domain::models::{
    Identity, ResolveReport, SelectionOutcome, Tile, UserId, ValidateReport,
};
pub use services::config::{load_panel, resolve_panel_path, PanelFile, PanelSettings};
pub use services::icon::IconBuilder;
pub use services::output::{print_one, print_page, write_line};
pub use services::panel::Panel;
pub use services::profile::{OnlineDirectory, ProfileResolver};
pub use services::texture::{
    decode_texture_url, decode_texture_url_from, TextureResolver, TextureSource,
};
pub use std::sync::Arc;

fn init_logging(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "warn" }));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Decoding is pure and never needs the panel file.
    if matches!(cli.command, Commands::Decode { .. }) {
        init_logging(cli.debug);
        handle_lookup_commands(&cli, &PanelSettings::default())?;
        return Ok(());
    }

    let path = resolve_panel_path(cli.config.as_deref())?;
    if matches!(cli.command, Commands::Resolve { .. }) {
        let settings = if path.exists() {
            load_panel(&path)?.settings
        } else {
            PanelSettings::default()
        };
        init_logging(cli.debug || settings.debug);
        handle_lookup_commands(&cli, &settings)?;
        return Ok(());
    }

    let file = load_panel(&path)?;
    init_logging(cli.debug || file.settings.debug);

    if handle_panel_commands(&cli, &file)? {
        return Ok(());
    }
    handle_session_command(&cli, &path, &file)?;

    Ok(())
}
