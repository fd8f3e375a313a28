use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "aac", version, about = "AAC selection panel")]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(
        long,
        global = true,
        help = "Panel file (defaults to ~/.config/aac/panel.toml)"
    )]
    pub config: Option<PathBuf>,
    #[arg(long, global = true, help = "Verbose logging to stderr")]
    pub debug: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render one page of the panel.
    Render {
        #[arg(long, default_value_t = 1, allow_hyphen_values = true)]
        page: i64,
    },
    /// Print the tile that opens the panel.
    Tool,
    /// Load and check the panel file.
    Validate,
    /// Resolve a player name to an identity and skin URL.
    Resolve { name: String },
    /// Decode a base64 texture value to its skin URL.
    Decode {
        blob: String,
        #[arg(long, value_enum, default_value_t = BlobSource::Auto)]
        source: BlobSource,
    },
    /// Serve host events as JSON lines on stdin/stdout.
    Session,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum BlobSource {
    Auto,
    Api,
    Config,
}
