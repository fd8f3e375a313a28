use crate::domain::constants::{
    DEFAULT_GRID_CAPACITY, DEFAULT_HTTP_BACKOFF_MS, DEFAULT_HTTP_RETRIES, DEFAULT_HTTP_TIMEOUT_MS,
    DEFAULT_PROFILE_API_BASE, DEFAULT_SESSION_API_BASE, DEFAULT_TITLE,
};
use crate::domain::errors::ConfigError;
use crate::domain::models::{IconSpec, MenuEntryDefinition};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}
fn default_capacity() -> usize {
    DEFAULT_GRID_CAPACITY
}
fn default_timeout() -> u64 {
    DEFAULT_HTTP_TIMEOUT_MS
}
fn default_retries() -> u32 {
    DEFAULT_HTTP_RETRIES
}
fn default_backoff() -> u64 {
    DEFAULT_HTTP_BACKOFF_MS
}
fn default_profile_api() -> String {
    DEFAULT_PROFILE_API_BASE.to_string()
}
fn default_session_api() -> String {
    DEFAULT_SESSION_API_BASE.to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct PanelSettings {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub cooldown_in_seconds: u64,
    #[serde(default)]
    pub debug: bool,
    #[serde(default = "default_capacity")]
    pub grid_capacity: usize,
    #[serde(default = "default_timeout")]
    pub http_timeout_ms: u64,
    #[serde(default = "default_retries")]
    pub http_retries: u32,
    #[serde(default = "default_backoff")]
    pub http_backoff_ms: u64,
    #[serde(default = "default_profile_api")]
    pub profile_api_base: String,
    #[serde(default = "default_session_api")]
    pub session_api_base: String,
    #[serde(default)]
    pub helptext: String,
    #[serde(default)]
    pub reloadtext: String,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            title: default_title(),
            cooldown_in_seconds: 0,
            debug: false,
            grid_capacity: default_capacity(),
            http_timeout_ms: default_timeout(),
            http_retries: default_retries(),
            http_backoff_ms: default_backoff(),
            profile_api_base: default_profile_api(),
            session_api_base: default_session_api(),
            helptext: String::new(),
            reloadtext: String::new(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PanelEntryRaw {
    pub id: String,
    pub icon: Option<String>,
    pub player: Option<String>,
    pub texture: Option<String>,
    pub name: String,
    #[serde(default)]
    pub lore: Vec<String>,
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub tool: bool,
}

impl PanelEntryRaw {
    pub fn into_definition(self) -> Result<MenuEntryDefinition, ConfigError> {
        let icon = match (self.icon, self.player, self.texture) {
            (Some(icon), None, None) => IconSpec::Static { icon },
            (None, Some(name), None) => IconSpec::Player { name },
            (None, None, Some(value)) => IconSpec::Texture { value },
            _ => return Err(ConfigError::AmbiguousIcon(self.id)),
        };
        Ok(MenuEntryDefinition {
            id: self.id,
            icon,
            display_name: self.name,
            description_lines: self.lore,
            output_payload: self.output,
            is_tool_marker: self.tool,
        })
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct PanelFile {
    #[serde(default)]
    pub settings: PanelSettings,
    #[serde(default)]
    pub strings: HashMap<String, String>,
    #[serde(default)]
    pub entries: Vec<PanelEntryRaw>,
}

impl PanelFile {
    pub fn definitions(&self) -> Result<Vec<MenuEntryDefinition>, ConfigError> {
        self.entries
            .iter()
            .cloned()
            .map(PanelEntryRaw::into_definition)
            .collect()
    }
}

pub fn default_panel_path() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")?;
    Ok(PathBuf::from(home).join(".config/aac/panel.toml"))
}

pub fn resolve_panel_path(explicit: Option<&Path>) -> anyhow::Result<PathBuf> {
    match explicit {
        Some(p) => Ok(p.to_path_buf()),
        None => default_panel_path(),
    }
}

pub fn load_panel(path: &Path) -> anyhow::Result<PanelFile> {
    if !path.exists() {
        anyhow::bail!("panel file not found: {}", path.display());
    }
    let raw = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&raw)?)
}
