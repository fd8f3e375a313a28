use crate::domain::models::{DispatchOutcome, UserId};
use crate::services::cooldown::CooldownGate;
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Shared output the selected payloads are sent to (the chat, in the host).
pub trait OutputChannel: Send + Sync {
    fn emit(&self, user: &UserId, payload: &str) -> anyhow::Result<()>;
}

/// Writes one `{"event":"chat",...}` JSON line per emission to stdout.
pub struct StdoutChannel;

impl OutputChannel for StdoutChannel {
    fn emit(&self, user: &UserId, payload: &str) -> anyhow::Result<()> {
        let line = serde_json::json!({
            "event": "chat",
            "user": user,
            "message": payload,
        });
        let mut out = std::io::stdout().lock();
        writeln!(out, "{}", line)?;
        out.flush()?;
        Ok(())
    }
}

pub struct Dispatcher {
    gate: Arc<CooldownGate>,
    channel: Arc<dyn OutputChannel>,
}

impl Dispatcher {
    pub fn new(gate: Arc<CooldownGate>, channel: Arc<dyn OutputChannel>) -> Self {
        Self { gate, channel }
    }

    pub fn try_dispatch(&self, user: &UserId, payload: &str) -> DispatchOutcome {
        match self.gate.try_acquire(user) {
            Ok(()) => {
                info!("{} is using AAC to generate the following text in chat:", user);
                info!(%user, payload, "chat output");
                match self.channel.emit(user, payload) {
                    Ok(()) => DispatchOutcome::Emitted,
                    Err(e) => {
                        // Nothing reached the chat, so the user may try again.
                        warn!(%user, error = %e, "chat output failed");
                        self.gate.release(user);
                        DispatchOutcome::Failed {
                            reason: e.to_string(),
                        }
                    }
                }
            }
            Err(remaining_seconds) => {
                debug!(%user, remaining_seconds, "dispatch throttled");
                DispatchOutcome::Throttled { remaining_seconds }
            }
        }
    }

    pub fn gate(&self) -> &CooldownGate {
        &self.gate
    }
}
