use crate::domain::constants::{META_OUTPUT, META_TOOL};
use crate::domain::models::{
    Direction, DispatchOutcome, IconSpec, MenuEntryDefinition, PlacedTile, RenderedPage,
    SelectionOutcome, Tile, TileClass, ToolGrant, UserId,
};
use crate::services::config::{PanelFile, PanelSettings};
use crate::services::cooldown::{Clock, CooldownGate};
use crate::services::dispatch::{Dispatcher, OutputChannel};
use crate::services::http::HttpGet;
use crate::services::icon::IconBuilder;
use crate::services::menu::MenuModel;
use crate::services::pagination::{classify, is_tool_tile, NavigationStyle, Pagination};
use crate::services::profile::{PlayerDirectory, ProfileResolver};
use crate::services::strings::StringTable;
use crate::services::texture::TextureResolver;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, warn};

/// Collaborators supplied by the host.
pub struct PanelDeps {
    pub directory: Arc<dyn PlayerDirectory>,
    pub http: Arc<dyn HttpGet>,
    pub clock: Box<dyn Clock>,
    pub channel: Arc<dyn OutputChannel>,
}

/// Title, messages and navigation labels; swapped together on reload.
struct PanelText {
    title: String,
    help: String,
    strings: StringTable,
    pagination: Pagination,
}

impl PanelText {
    fn from_file(file: &PanelFile) -> Self {
        let strings = StringTable::new(file.strings.clone());
        let defaults = NavigationStyle::default();
        let style = NavigationStyle {
            icon: strings.get_or("button_icon", &defaults.icon),
            previous_label: strings.get_or("button_previous", &defaults.previous_label),
            next_label: strings.get_or("button_next", &defaults.next_label),
        };
        Self {
            title: file.settings.title.clone(),
            help: file.settings.helptext.clone(),
            strings,
            pagination: Pagination::new(style),
        }
    }
}

pub struct Panel {
    /// Settings read once at startup; a reload cannot change them.
    fixed: PanelSettings,
    menu: MenuModel,
    directory: Arc<dyn PlayerDirectory>,
    icons: IconBuilder,
    dispatcher: Dispatcher,
    text: RwLock<Arc<PanelText>>,
}

impl Panel {
    pub fn new(file: &PanelFile, deps: PanelDeps) -> anyhow::Result<Self> {
        let settings = &file.settings;
        let menu = MenuModel::new(settings.grid_capacity, file.definitions()?)?;
        let icons = IconBuilder::new(
            ProfileResolver::new(
                deps.directory.clone(),
                deps.http.clone(),
                &settings.profile_api_base,
            ),
            TextureResolver::new(deps.http, &settings.session_api_base),
        );
        let gate = Arc::new(CooldownGate::new(settings.cooldown_in_seconds, deps.clock));
        Ok(Self {
            fixed: settings.clone(),
            menu,
            directory: deps.directory,
            icons,
            dispatcher: Dispatcher::new(gate, deps.channel),
            text: RwLock::new(Arc::new(PanelText::from_file(file))),
        })
    }

    fn text(&self) -> Arc<PanelText> {
        self.text.read().clone()
    }

    pub fn menu(&self) -> &MenuModel {
        &self.menu
    }

    pub fn string(&self, key: &str) -> String {
        self.text().strings.get(key)
    }

    pub fn help(&self) -> String {
        self.text().help.clone()
    }

    /// Content tiles in order from slot 0; "next" takes the last slot and
    /// "previous" the one before it, or the last slot on the final page.
    pub fn render(&self, page_number: i64) -> RenderedPage {
        let page = self.menu.get_page(page_number);
        let text = self.text();
        let capacity = self.menu.capacity();
        let mut tiles = self.content_tiles(&page.entries);
        if page.has_previous {
            let slot = if page.has_next { capacity - 2 } else { capacity - 1 };
            tiles.push(PlacedTile {
                slot,
                tile: text
                    .pagination
                    .build_navigation_tile(Direction::Previous, page.page_number - 1),
            });
        }
        if page.has_next {
            tiles.push(PlacedTile {
                slot: capacity - 1,
                tile: text
                    .pagination
                    .build_navigation_tile(Direction::Next, page.page_number + 1),
            });
        }
        debug!(page = page.page_number, tiles = tiles.len(), "rendered page");
        RenderedPage {
            title: text.title.clone(),
            page_number: page.page_number,
            last_page: page.last_page,
            capacity,
            tiles,
        }
    }

    /// Entries whose visual needs a profile lookup resolve on their own
    /// scoped threads, so one slow lookup does not hold up the rest.
    fn content_tiles(&self, entries: &[MenuEntryDefinition]) -> Vec<PlacedTile> {
        let icons = &self.icons;
        thread::scope(|scope| {
            let pending: Vec<_> = entries
                .iter()
                .map(|entry| {
                    let lookup = matches!(entry.icon, IconSpec::Player { .. })
                        .then(|| scope.spawn(move || content_tile(icons, entry)));
                    (entry, lookup)
                })
                .collect();
            pending
                .into_iter()
                .enumerate()
                .map(|(slot, (entry, lookup))| {
                    let tile = match lookup {
                        Some(handle) => handle.join().unwrap_or_else(|_| {
                            warn!(entry = %entry.id, "icon lookup thread panicked");
                            icons.fallback_tile(
                                &entry.display_name,
                                &entry.description_lines,
                                content_metadata(entry),
                            )
                        }),
                        None => content_tile(icons, entry),
                    };
                    PlacedTile { slot, tile }
                })
                .collect()
        })
    }

    pub fn tool_tile(&self) -> Option<Tile> {
        let tool = self.menu.tool()?;
        let mut metadata = BTreeMap::new();
        metadata.insert(META_TOOL.to_string(), "true".to_string());
        Some(self.icons.build_or_fallback(
            &tool.icon,
            &tool.display_name,
            &tool.description_lines,
            metadata,
        ))
    }

    /// The requesting user receives the tool. A request with no user behind
    /// it (the console) is refused with `error_no_console`.
    pub fn get_tool(&self, user: Option<&UserId>, allowed: bool) -> ToolGrant {
        if !allowed {
            return ToolGrant::Denied {
                message: self.string("error_no_permission"),
            };
        }
        let Some(user) = user else {
            return ToolGrant::Failed {
                message: self.string("error_no_console"),
            };
        };
        self.grant_tool(user.clone(), None)
    }

    /// Hand the tool to a connected user, looked up by display name.
    pub fn give_tool(&self, target: Option<&str>, allowed: bool) -> ToolGrant {
        if !allowed {
            return ToolGrant::Denied {
                message: self.string("error_no_permission"),
            };
        }
        let Some(target) = target.map(str::trim).filter(|t| !t.is_empty()) else {
            return ToolGrant::Failed {
                message: self.string("error_player_not_provided"),
            };
        };
        let Some(user) = self.directory.find_user(target) else {
            debug!(target, "give target is not online");
            return ToolGrant::Failed {
                message: self.string("error_player_not_online"),
            };
        };
        self.grant_tool(user, Some(self.string("success_tool_given_to_player")))
    }

    fn grant_tool(&self, user: UserId, message: Option<String>) -> ToolGrant {
        match self.tool_tile() {
            Some(tile) => {
                debug!(%user, "gave AAC tool");
                ToolGrant::Given {
                    user,
                    tile,
                    message,
                }
            }
            None => ToolGrant::Failed {
                message: "panel file defines no tool entry".to_string(),
            },
        }
    }

    /// Render request. `allowed` is the host's "may invoke" verdict.
    pub fn open(&self, user: &UserId, page_number: i64, allowed: bool) -> SelectionOutcome {
        if !allowed {
            return SelectionOutcome::Denied {
                message: self.string("error_no_permission"),
            };
        }
        debug!(%user, page_number, "opening panel");
        SelectionOutcome::Navigate {
            page: self.render(page_number),
        }
    }

    pub fn use_tool(&self, user: &UserId, tile: &Tile, allowed: bool) -> SelectionOutcome {
        if !is_tool_tile(tile) {
            return SelectionOutcome::Ignored;
        }
        self.open(user, 1, allowed)
    }

    pub fn select(&self, user: &UserId, tile: &Tile) -> SelectionOutcome {
        match classify(tile) {
            TileClass::Navigation { target_page, .. } => SelectionOutcome::Navigate {
                page: self.render(i64::from(target_page)),
            },
            TileClass::Content { payload } => match self.dispatcher.try_dispatch(user, &payload) {
                DispatchOutcome::Emitted => SelectionOutcome::Emit { payload },
                DispatchOutcome::Failed { reason } => SelectionOutcome::Failed { message: reason },
                DispatchOutcome::Throttled { remaining_seconds } => {
                    let mut replacements = BTreeMap::new();
                    replacements.insert("{SECONDS}", remaining_seconds.to_string());
                    SelectionOutcome::Throttled {
                        seconds: remaining_seconds,
                        message: self
                            .text()
                            .strings
                            .render("error_player_in_cooldown", &replacements),
                    }
                }
            },
            TileClass::Unknown => {
                debug!(%user, "ignoring selection without panel metadata");
                SelectionOutcome::Ignored
            }
        }
    }

    /// Install a freshly loaded panel file. The grid capacity is fixed for the
    /// panel's lifetime; definitions, messages and cooldown are replaced and
    /// all running cooldowns are cleared.
    pub fn reload(&self, file: &PanelFile) -> anyhow::Result<String> {
        let ignored = fixed_setting_changes(&self.fixed, &file.settings);
        if !ignored.is_empty() {
            warn!(
                settings = ignored.join(", "),
                "reload ignores changed settings; restart to apply them"
            );
        }
        self.menu.reload(file.definitions()?)?;
        *self.text.write() = Arc::new(PanelText::from_file(file));
        let gate = self.dispatcher.gate();
        gate.set_cooldown_seconds(file.settings.cooldown_in_seconds);
        gate.clear();
        info!(entries = self.menu.entry_count(), "panel reloaded");
        Ok(file.settings.reloadtext.clone())
    }

    pub fn purge_cooldowns(&self) -> usize {
        let gate = self.dispatcher.gate();
        let purged = gate.purge_expired();
        debug!(purged, tracked = gate.tracked(), "purged expired cooldowns");
        purged
    }

    /// End-of-session teardown of the cooldown state.
    pub fn clear_cooldowns(&self) {
        self.dispatcher.gate().clear();
    }
}

fn content_metadata(entry: &MenuEntryDefinition) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::new();
    metadata.insert(META_OUTPUT.to_string(), entry.output_payload.clone());
    metadata
}

fn content_tile(icons: &IconBuilder, entry: &MenuEntryDefinition) -> Tile {
    icons.build_or_fallback(
        &entry.icon,
        &entry.display_name,
        &entry.description_lines,
        content_metadata(entry),
    )
}

/// Names of the startup-only settings that differ in `loaded`.
fn fixed_setting_changes(running: &PanelSettings, loaded: &PanelSettings) -> Vec<&'static str> {
    let checks = [
        ("grid_capacity", running.grid_capacity != loaded.grid_capacity),
        ("http_timeout_ms", running.http_timeout_ms != loaded.http_timeout_ms),
        ("http_retries", running.http_retries != loaded.http_retries),
        ("http_backoff_ms", running.http_backoff_ms != loaded.http_backoff_ms),
        ("profile_api_base", running.profile_api_base != loaded.profile_api_base),
        ("session_api_base", running.session_api_base != loaded.session_api_base),
    ];
    checks
        .into_iter()
        .filter(|(_, changed)| *changed)
        .map(|(name, _)| name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::constants::FALLBACK_ICON;
    use crate::domain::models::{Identity, TileIcon};
    use crate::services::cooldown::testing::ManualClock;
    use crate::services::dispatch::testing::RecordingChannel;
    use crate::services::http::fake::FakeHttp;
    use crate::services::http::HttpResponse;
    use crate::services::profile::OnlineDirectory;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn panel_file(entries: usize, extra: &str) -> PanelFile {
        let mut raw = String::from(
            r#"
            [settings]
            cooldown_in_seconds = 5
            grid_capacity = 9
            reloadtext = "reloaded"
            helptext = "Right click the book to talk"

            [strings]
            error_player_in_cooldown = "Wait {SECONDS} more seconds"
            error_no_permission = "No permission"
            error_no_console = "Only players can do that"
            error_player_not_provided = "Name a player"
            error_player_not_online = "Player is not online"
            success_tool_given_to_player = "Tool given"
            "#,
        );
        for i in 0..entries {
            raw.push_str(&format!(
                "\n[[entries]]\nid = \"e{i}\"\nicon = \"PAPER\"\nname = \"E{i}\"\noutput = \"say {i}\"\n"
            ));
        }
        raw.push_str(extra);
        toml::from_str(&raw).unwrap()
    }

    fn panel(file: &PanelFile) -> (Panel, ManualClock, Arc<RecordingChannel>) {
        panel_with(
            file,
            Arc::new(OnlineDirectory::default()),
            Arc::new(FakeHttp::default()),
        )
    }

    fn panel_with(
        file: &PanelFile,
        directory: Arc<OnlineDirectory>,
        http: Arc<dyn HttpGet>,
    ) -> (Panel, ManualClock, Arc<RecordingChannel>) {
        let clock = ManualClock::new();
        let channel = Arc::new(RecordingChannel::default());
        let p = Panel::new(
            file,
            PanelDeps {
                directory,
                http,
                clock: Box::new(clock.clone()),
                channel: channel.clone(),
            },
        )
        .unwrap();
        (p, clock, channel)
    }

    /// Fails every request after a short delay, recording the peak number
    /// of requests in flight at once.
    #[derive(Default)]
    struct SlowHttp {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl HttpGet for SlowHttp {
        fn get(&self, url: &str) -> anyhow::Result<HttpResponse> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(100));
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            anyhow::bail!("timed out: {}", url)
        }
    }

    fn nav(page: &RenderedPage, direction: Direction) -> Option<&PlacedTile> {
        page.tiles.iter().find(|t| {
            matches!(classify(&t.tile), TileClass::Navigation { direction: d, .. } if d == direction)
        })
    }

    #[test]
    fn navigation_follows_tiles_without_session_state() {
        let (p, _, _) = panel(&panel_file(20, ""));
        let first = p.render(1);
        assert!(nav(&first, Direction::Previous).is_none());
        let next = nav(&first, Direction::Next).unwrap();
        assert_eq!(next.slot, 8);

        let SelectionOutcome::Navigate { page: second } = p.select(&UserId::new("u"), &next.tile)
        else {
            panic!("expected navigation");
        };
        assert_eq!(second.page_number, 2);
        assert_eq!(nav(&second, Direction::Previous).unwrap().slot, 7);

        let last = p.render(99);
        assert_eq!(last.page_number, 3);
        assert!(nav(&last, Direction::Next).is_none());
        assert_eq!(nav(&last, Direction::Previous).unwrap().slot, 8);
        assert_eq!(p.render(2), second);
    }

    #[test]
    fn content_selection_respects_cooldown() {
        let (p, clock, channel) = panel(&panel_file(3, ""));
        let user = UserId::new("u");
        let tile = p.render(1).tiles[0].tile.clone();
        assert_eq!(
            p.select(&user, &tile),
            SelectionOutcome::Emit {
                payload: "say 0".into()
            }
        );
        assert_eq!(
            p.select(&user, &tile),
            SelectionOutcome::Throttled {
                seconds: 5,
                message: "Wait 5 more seconds".into()
            }
        );
        clock.advance(Duration::from_secs(6));
        assert!(matches!(p.select(&user, &tile), SelectionOutcome::Emit { .. }));
        assert_eq!(channel.sent.lock().len(), 2);
    }

    #[test]
    fn broken_icon_keeps_rest_of_page() {
        let extra = "\n[[entries]]\nid = \"ghost\"\nplayer = \"NoSuchPlayer\"\nname = \"Ghost\"\noutput = \"boo\"\n";
        let (p, _, _) = panel(&panel_file(2, extra));
        let page = p.render(1);
        assert_eq!(page.tiles.len(), 3);
        assert_eq!(
            page.tiles[2].tile.icon(),
            &TileIcon::Static {
                icon: FALLBACK_ICON.into()
            }
        );
        assert_eq!(page.tiles[2].tile.display_name(), "Ghost");
        assert_eq!(
            page.tiles[0].tile.icon(),
            &TileIcon::Static {
                icon: "PAPER".into()
            }
        );
    }

    #[test]
    fn denied_open_and_tool_flow() {
        let extra = "\n[[entries]]\nid = \"book\"\nicon = \"BOOK\"\nname = \"AAC\"\ntool = true\n";
        let (p, _, _) = panel(&panel_file(1, extra));
        let user = UserId::new("u");
        assert_eq!(
            p.open(&user, 1, false),
            SelectionOutcome::Denied {
                message: "No permission".into()
            }
        );
        let tool = p.tool_tile().unwrap();
        assert_eq!(p.select(&user, &tool), SelectionOutcome::Ignored);
        let SelectionOutcome::Navigate { page } = p.use_tool(&user, &tool, true) else {
            panic!("tool should open the panel");
        };
        assert_eq!(page.tiles.len(), 1);
    }

    #[test]
    fn reload_replaces_entries_and_clears_cooldowns() {
        let (p, _, _) = panel(&panel_file(3, ""));
        let user = UserId::new("u");
        let tile = p.render(1).tiles[0].tile.clone();
        p.select(&user, &tile);
        assert_eq!(p.help(), "Right click the book to talk");
        assert_eq!(p.reload(&panel_file(12, "")).unwrap(), "reloaded");
        assert_eq!(p.menu().last_page(), 2);
        assert!(matches!(p.select(&user, &tile), SelectionOutcome::Emit { .. }));
    }

    #[test]
    fn cooldown_beyond_clock_range_keeps_throttling() {
        let mut file = panel_file(2, "");
        file.settings.cooldown_in_seconds = i64::MAX as u64;
        let (p, _, _) = panel(&file);
        let user = UserId::new("u");
        let tile = p.render(1).tiles[0].tile.clone();
        assert!(matches!(p.select(&user, &tile), SelectionOutcome::Emit { .. }));
        assert!(matches!(
            p.select(&user, &tile),
            SelectionOutcome::Throttled { seconds, .. } if seconds == i64::MAX as u64
        ));
    }

    #[test]
    fn reload_keeps_startup_only_settings() {
        let (p, _, _) = panel(&panel_file(3, ""));
        let mut changed = panel_file(3, "");
        changed.settings.grid_capacity = 18;
        changed.settings.profile_api_base = "http://elsewhere.test".into();
        assert_eq!(
            fixed_setting_changes(&p.fixed, &changed.settings),
            vec!["grid_capacity", "profile_api_base"]
        );
        p.reload(&changed).unwrap();
        assert_eq!(p.menu().capacity(), 9);
        assert!(fixed_setting_changes(&p.fixed, &panel_file(5, "").settings).is_empty());
    }

    #[test]
    fn player_icons_on_a_page_resolve_concurrently() {
        let extra: String = (0..4)
            .map(|i| {
                format!("\n[[entries]]\nid = \"p{i}\"\nplayer = \"Player{i}\"\nname = \"P{i}\"\noutput = \"hi\"\n")
            })
            .collect();
        let http = Arc::new(SlowHttp::default());
        let (p, _, _) = panel_with(
            &panel_file(1, &extra),
            Arc::new(OnlineDirectory::default()),
            http.clone(),
        );
        let page = p.render(1);
        assert_eq!(page.tiles.len(), 5);
        let names: Vec<&str> = page.tiles.iter().map(|t| t.tile.display_name()).collect();
        assert_eq!(names, ["E0", "P0", "P1", "P2", "P3"]);
        assert!(page.tiles[1..].iter().all(|t| t.tile.icon()
            == &TileIcon::Static {
                icon: FALLBACK_ICON.into()
            }));
        assert!(http.peak.load(Ordering::SeqCst) > 1);
    }

    #[test]
    fn give_and_get_hand_out_the_tool() {
        let extra = "\n[[entries]]\nid = \"book\"\nicon = \"BOOK\"\nname = \"AAC\"\ntool = true\n";
        let directory = Arc::new(OnlineDirectory::default());
        let alex = UserId::new("u-alex");
        directory.join(
            alex.clone(),
            "Alex",
            Identity::parse("069a79f444e94726a5befca90e38aaf5").unwrap(),
        );
        let (p, _, _) = panel_with(
            &panel_file(1, extra),
            directory,
            Arc::new(FakeHttp::default()),
        );
        let tool = p.tool_tile().unwrap();

        assert_eq!(
            p.give_tool(Some("aLeX"), true),
            ToolGrant::Given {
                user: alex.clone(),
                tile: tool.clone(),
                message: Some("Tool given".into())
            }
        );
        assert_eq!(
            p.give_tool(Some("Steve"), true),
            ToolGrant::Failed {
                message: "Player is not online".into()
            }
        );
        assert_eq!(
            p.give_tool(Some("  "), true),
            ToolGrant::Failed {
                message: "Name a player".into()
            }
        );
        assert_eq!(
            p.give_tool(Some("Alex"), false),
            ToolGrant::Denied {
                message: "No permission".into()
            }
        );

        assert_eq!(
            p.get_tool(Some(&alex), true),
            ToolGrant::Given {
                user: alex.clone(),
                tile: tool,
                message: None
            }
        );
        assert_eq!(
            p.get_tool(None, true),
            ToolGrant::Failed {
                message: "Only players can do that".into()
            }
        );
    }
}
