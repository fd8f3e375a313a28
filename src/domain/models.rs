use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

/// Opaque host-side user reference (the connected player's UUID in practice).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable account identity in canonical 8-4-4-4-12 hyphenated form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Accepts either the compact 32-hex form returned by the name lookup
    /// endpoint or an already hyphenated id.
    pub fn parse(raw: &str) -> Option<Self> {
        let compact: String = raw.trim().chars().filter(|c| *c != '-').collect();
        if compact.len() != 32 || hex::decode(&compact).is_err() {
            return None;
        }
        let c = compact.to_ascii_lowercase();
        Some(Self(format!(
            "{}-{}-{}-{}-{}",
            &c[0..8],
            &c[8..12],
            &c[12..16],
            &c[16..20],
            &c[20..32]
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a menu entry gets its visual.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IconSpec {
    /// A named static icon, rendered without any lookup.
    Static { icon: String },
    /// Resolve the named account's skin through the profile services.
    Player { name: String },
    /// A pre-encoded texture value pasted into the panel file.
    Texture { value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuEntryDefinition {
    pub id: String,
    pub icon: IconSpec,
    pub display_name: String,
    #[serde(default)]
    pub description_lines: Vec<String>,
    #[serde(default)]
    pub output_payload: String,
    #[serde(default)]
    pub is_tool_marker: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub page_number: u32,
    pub last_page: u32,
    pub entries: Vec<MenuEntryDefinition>,
    pub has_previous: bool,
    pub has_next: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TileIcon {
    Static { icon: String },
    Skin {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        owner: Option<Identity>,
    },
}

/// One renderable grid unit. Fields are private so a tile cannot be altered
/// once built; the host hands tiles back exactly as it received them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    icon: TileIcon,
    display_name: String,
    #[serde(default)]
    description_lines: Vec<String>,
    #[serde(default)]
    metadata: BTreeMap<String, String>,
}

impl Tile {
    pub fn new(
        icon: TileIcon,
        display_name: impl Into<String>,
        description_lines: Vec<String>,
        metadata: BTreeMap<String, String>,
    ) -> Self {
        Self {
            icon,
            display_name: display_name.into(),
            description_lines,
            metadata,
        }
    }

    pub fn icon(&self) -> &TileIcon {
        &self.icon
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn description_lines(&self) -> &[String] {
        &self.description_lines
    }

    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacedTile {
    pub slot: usize,
    pub tile: Tile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedPage {
    pub title: String,
    pub page_number: u32,
    pub last_page: u32,
    pub capacity: usize,
    pub tiles: Vec<PlacedTile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTexture {
    pub identity: Identity,
    pub direct_image_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Previous,
    Next,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Previous => "previous",
            Direction::Next => "next",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "previous" => Some(Direction::Previous),
            "next" => Some(Direction::Next),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileClass {
    Navigation { direction: Direction, target_page: u32 },
    Content { payload: String },
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Emitted,
    Throttled { remaining_seconds: u64 },
    Failed { reason: String },
}

/// What the host should do after a selection event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SelectionOutcome {
    Navigate { page: RenderedPage },
    Emit { payload: String },
    Throttled { seconds: u64, message: String },
    Denied { message: String },
    /// The payload could not be written to the output channel.
    Failed { message: String },
    Ignored,
}

/// Result of handing the tool tile to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ToolGrant {
    Given {
        user: UserId,
        tile: Tile,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Denied {
        message: String,
    },
    Failed {
        message: String,
    },
}

#[derive(Debug, Serialize)]
pub struct ResolveReport {
    pub name: String,
    pub identity: Identity,
    pub texture_url: String,
}

#[derive(Debug, Serialize)]
pub struct ValidateReport {
    pub entries: usize,
    pub pages: u32,
    pub capacity: usize,
    pub has_tool: bool,
}
