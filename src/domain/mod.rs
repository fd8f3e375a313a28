//! Shared data model layer (structs/constants/errors only).
//!
//! ## Files
//! - `models.rs` — menu definitions, tiles, pages, outcomes, report structs.
//! - `constants.rs` — endpoints, defaults, tile metadata keys.
//! - `errors.rs` — typed failure taxonomy of the resolver and menu layers.
//!
//! ## Rule of thumb
//! Domain types should be data-only: no filesystem/network side effects.
//!
//! ## Compatibility note
//! Tile metadata keys and `--json` outputs are read back by hosts.
//! Keep schema-impacting changes explicit and synchronized with `docs/contracts/*`.

pub mod constants;
pub mod errors;
pub mod models;
