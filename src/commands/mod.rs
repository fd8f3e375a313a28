//! Command handler layer.
//!
//! This module owns CLI-oriented orchestration and output wiring.
//!
//! ## Files
//! - `panel.rs` — render/tool/validate.
//! - `lookup.rs` — resolve/decode against the profile services.
//! - `session.rs` — long-lived JSON-lines host session.
//!
//! ## Principles
//! - Parse/match CLI inputs here.
//! - Delegate business logic to `services/*`.
//! - Keep behavior and output schema stable.

pub mod lookup;
pub mod panel;
pub mod session;

pub use lookup::handle_lookup_commands;
pub use panel::handle_panel_commands;
pub use session::handle_session_command;

use crate::services::config::PanelSettings;
use crate::services::cooldown::SystemClock;
use crate::services::dispatch::StdoutChannel;
use crate::services::http::{HttpGet, ReqwestTransport, RetryPolicy, RetryingClient};
use crate::services::panel::PanelDeps;
use crate::services::profile::PlayerDirectory;
use std::sync::Arc;
use std::time::Duration;

pub fn http_client(settings: &PanelSettings) -> anyhow::Result<Arc<dyn HttpGet>> {
    let transport = ReqwestTransport::new(settings.http_timeout_ms)?;
    let policy = RetryPolicy {
        retries: settings.http_retries,
        backoff: Duration::from_millis(settings.http_backoff_ms),
    };
    Ok(Arc::new(RetryingClient::new(transport, policy)))
}

pub fn live_deps(
    settings: &PanelSettings,
    directory: Arc<dyn PlayerDirectory>,
) -> anyhow::Result<PanelDeps> {
    Ok(PanelDeps {
        directory,
        http: http_client(settings)?,
        clock: Box::new(SystemClock),
        channel: Arc::new(StdoutChannel),
    })
}
