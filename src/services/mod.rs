//! Service layer containing business logic and side-effect helpers.
//!
//! ## Service map
//! - `panel.rs` — facade the host talks to: render/open/select/reload.
//! - `menu.rs` — definition snapshot, page boundaries, clamping.
//! - `pagination.rs` — self-describing navigation tiles and tile classification.
//! - `icon.rs` — tile visuals, with fallback when a lookup fails.
//! - `profile.rs` — name → identity (live directory first, then HTTP).
//! - `texture.rs` — identity → textures property → skin URL.
//! - `http.rs` — blocking transport with timeout and bounded retry.
//! - `cooldown.rs` — per-user expiry gate.
//! - `dispatch.rs` — cooldown-gated emission to the output channel.
//! - `config.rs` — panel file loading.
//! - `strings.rs` — message table with placeholder substitution.
//! - `output.rs` — JSON/text output helpers.
//!
//! ## Conventions
//! - Prefer pure helpers where possible.
//! - Side effects should be explicit and localized.
//! - Keep command handlers thin; delegate to services.

pub mod config;
pub mod cooldown;
pub mod dispatch;
pub mod http;
pub mod icon;
pub mod menu;
pub mod output;
pub mod pagination;
pub mod panel;
pub mod profile;
pub mod strings;
pub mod texture;
