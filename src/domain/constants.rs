pub const DEFAULT_TITLE: &str = "AAC";
pub const DEFAULT_GRID_CAPACITY: usize = 54;
/// One content slot plus both navigation slots.
pub const MIN_GRID_CAPACITY: usize = 3;

pub const DEFAULT_PROFILE_API_BASE: &str = "https://api.mojang.com";
pub const DEFAULT_SESSION_API_BASE: &str = "https://sessionserver.mojang.com";
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 3000;
pub const DEFAULT_HTTP_RETRIES: u32 = 2;
pub const DEFAULT_HTTP_BACKOFF_MS: u64 = 200;

/// Icon shown when an entry's visual cannot be resolved.
pub const FALLBACK_ICON: &str = "PLAYER_HEAD";

// Tile metadata keys.
pub const META_OUTPUT: &str = "aac:output";
pub const META_ROLE: &str = "aac:role";
pub const META_TARGET_PAGE: &str = "aac:target_page";
pub const META_TOOL: &str = "aac:panel_tool";

/// Untagged blobs longer than this are taken to be API-fetched profile values.
pub const LONG_TEXTURE_BLOB_THRESHOLD: usize = 200;
/// Fixed wrapper around short config literals once base64-decoded:
/// `{"textures":{"SKIN":{"url":"` ... `"}}}`.
pub const SKIN_WRAPPER_PREFIX: &str = r#"{"textures":{"SKIN":{"url":""#;
pub const SKIN_WRAPPER_SUFFIX: &str = r#""}}}"#;
