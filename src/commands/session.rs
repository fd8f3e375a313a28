use crate::*;
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use std::path::Path;
use tracing::{info, warn};

fn first_page() -> i64 {
    1
}

fn allowed() -> bool {
    true
}

/// Events the host feeds the panel, one JSON object per line.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum HostEvent {
    Join {
        user: UserId,
        name: String,
        #[serde(default)]
        identity: Option<String>,
    },
    Leave {
        user: UserId,
    },
    Open {
        user: UserId,
        #[serde(default = "first_page")]
        page: i64,
        #[serde(default = "allowed")]
        allowed: bool,
    },
    Select {
        user: UserId,
        tile: Tile,
    },
    UseTool {
        user: UserId,
        tile: Tile,
        #[serde(default = "allowed")]
        allowed: bool,
    },
    /// A user (or the console, with no user) asks for the tool.
    Get {
        #[serde(default)]
        user: Option<UserId>,
        #[serde(default = "allowed")]
        allowed: bool,
    },
    /// Hand the tool to an online user, named case-insensitively.
    Give {
        #[serde(default)]
        target: Option<String>,
        #[serde(default = "allowed")]
        allowed: bool,
    },
    Reload {
        #[serde(default = "allowed")]
        allowed: bool,
    },
    Help,
}

fn reply<T: Serialize>(user: Option<&UserId>, outcome: &T) -> anyhow::Result<serde_json::Value> {
    let mut value = serde_json::to_value(outcome)?;
    value["event"] = "outcome".into();
    if let Some(user) = user {
        value["user"] = serde_json::to_value(user)?;
    }
    Ok(value)
}

fn ack(event: &str, detail: serde_json::Value) -> serde_json::Value {
    serde_json::json!({ "event": event, "detail": detail })
}

pub fn handle_session_command(cli: &Cli, path: &Path, file: &PanelFile) -> anyhow::Result<bool> {
    let Commands::Session = &cli.command else {
        return Ok(false);
    };

    let directory = Arc::new(OnlineDirectory::default());
    let panel = Panel::new(file, live_deps(&file.settings, directory.clone())?)?;
    info!(path = %path.display(), "session started");

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let response = match serde_json::from_str::<HostEvent>(&line) {
            Ok(event) => handle_event(&panel, &directory, path, event)?,
            Err(e) => {
                warn!(error = %e, "unreadable host event");
                ack("error", serde_json::json!(e.to_string()))
            }
        };
        write_line(&mut std::io::stdout().lock(), &response)?;
    }

    panel.clear_cooldowns();
    info!("session closed");
    Ok(true)
}

fn handle_event(
    panel: &Panel,
    directory: &OnlineDirectory,
    path: &Path,
    event: HostEvent,
) -> anyhow::Result<serde_json::Value> {
    match event {
        HostEvent::Join {
            user,
            name,
            identity,
        } => {
            let parsed = identity
                .as_deref()
                .and_then(Identity::parse)
                .or_else(|| Identity::parse(&user.0));
            match parsed {
                Some(id) => {
                    directory.join(user.clone(), &name, id);
                    Ok(ack(
                        "joined",
                        serde_json::json!({ "user": user, "name": name, "online": directory.len() }),
                    ))
                }
                None => {
                    warn!(%user, name = %name, "join without a usable identity; not listed");
                    Ok(ack("error", serde_json::json!("join requires a uuid identity")))
                }
            }
        }
        HostEvent::Leave { user } => {
            directory.leave(&user);
            let purged = panel.purge_cooldowns();
            Ok(ack("left", serde_json::json!({ "user": user, "purged": purged })))
        }
        HostEvent::Open {
            user,
            page,
            allowed,
        } => reply(Some(&user), &panel.open(&user, page, allowed)),
        HostEvent::Select { user, tile } => reply(Some(&user), &panel.select(&user, &tile)),
        HostEvent::UseTool {
            user,
            tile,
            allowed,
        } => reply(Some(&user), &panel.use_tool(&user, &tile, allowed)),
        HostEvent::Get { user, allowed } => {
            reply(user.as_ref(), &panel.get_tool(user.as_ref(), allowed))
        }
        HostEvent::Give { target, allowed } => {
            reply(None, &panel.give_tool(target.as_deref(), allowed))
        }
        HostEvent::Help => Ok(ack("help", serde_json::json!(panel.help()))),
        HostEvent::Reload { allowed } => {
            if !allowed {
                let denied = SelectionOutcome::Denied {
                    message: panel.string("error_no_permission"),
                };
                return reply(None, &denied);
            }
            match load_panel(path).and_then(|file| panel.reload(&file)) {
                Ok(text) => Ok(ack("reloaded", serde_json::json!(text))),
                Err(e) => {
                    warn!(error = %e, "reload failed; keeping current panel");
                    Ok(ack("error", serde_json::json!(e.to_string())))
                }
            }
        }
    }
}
