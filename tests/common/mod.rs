#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const SKIN_LITERAL: &str = "eyJ0ZXh0dXJlcyI6eyJTS0lOIjp7InVybCI6Imh0dHA6Ly90ZXh0dXJlcy5taW5lY3JhZnQubmV0L3RleHR1cmUvYWJjMTIzIn19fQ==";
pub const SKIN_URL: &str = "http://textures.minecraft.net/texture/abc123";

pub struct TestEnv {
    _tmp: TempDir,
    pub home: PathBuf,
    pub panel: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let home = tmp.path().join("home");
        fs::create_dir_all(&home).expect("create isolated home");
        let panel = write_fixture_panel(&home);
        Self {
            _tmp: tmp,
            home,
            panel,
        }
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("aac");
        cmd.env("HOME", &self.home).env_remove("RUST_LOG");
        cmd
    }

    pub fn run_json(&self, args: &[&str]) -> Value {
        let out = self
            .cmd()
            .arg("--json")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }

    /// Feed events to `aac session`, returning every stdout line parsed.
    pub fn session(&self, events: &[Value]) -> Vec<Value> {
        let input: String = events.iter().map(|e| format!("{}\n", e)).collect();
        let out = self
            .cmd()
            .arg("session")
            .write_stdin(input)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        String::from_utf8(out)
            .expect("utf8 stdout")
            .lines()
            .map(|l| serde_json::from_str(l).expect("json line"))
            .collect()
    }

    pub fn rewrite_panel(&self, extra_entries: usize) {
        fs::write(&self.panel, fixture_panel(extra_entries)).expect("rewrite panel");
    }
}

/// Capacity 9 with 12 placeable entries: page 1 holds 8 plus "next", page 2
/// holds the remaining 4 plus "previous".
pub fn fixture_panel(extra_entries: usize) -> String {
    let mut raw = String::from(
        r#"[settings]
title = "AAC"
cooldown_in_seconds = 5
grid_capacity = 9
http_timeout_ms = 500
http_retries = 0
profile_api_base = "http://127.0.0.1:9"
session_api_base = "http://127.0.0.1:9"
reloadtext = "AAC panel reloaded"
helptext = "Use the book to open the panel."

[strings]
error_no_permission = "You do not have permission to do that."
error_player_in_cooldown = "Please wait {SECONDS} seconds before sending another message."
error_no_console = "Only players can use this command."
error_player_not_provided = "Please provide a player name."
error_player_not_online = "That player is not online."
success_tool_given_to_player = "Gave the AAC tool."

[[entries]]
id = "book"
icon = "KNOWLEDGE_BOOK"
name = "AAC"
lore = ["Right click to open"]
tool = true
"#,
    );
    for i in 0..(10 + extra_entries) {
        raw.push_str(&format!(
            "\n[[entries]]\nid = \"phrase{i}\"\nicon = \"PAPER\"\nname = \"Phrase {i}\"\nlore = [\"Says phrase {i}\"]\noutput = \"Phrase number {i}\"\n"
        ));
    }
    raw.push_str(&format!(
        "\n[[entries]]\nid = \"skin\"\ntexture = \"{}\"\nname = \"Happy\"\noutput = \"I am happy\"\n",
        SKIN_LITERAL
    ));
    raw.push_str(
        "\n[[entries]]\nid = \"ghost\"\nplayer = \"NoSuchPlayer\"\nname = \"Ghost\"\noutput = \"Boo\"\n",
    );
    raw
}

fn write_fixture_panel(home: &Path) -> PathBuf {
    let dir = home.join(".config/aac");
    fs::create_dir_all(&dir).expect("create config dir");
    let path = dir.join("panel.toml");
    fs::write(&path, fixture_panel(0)).expect("write panel");
    path
}

pub fn tiles(page: &Value) -> &Vec<Value> {
    page["tiles"].as_array().expect("tiles array")
}

pub fn nav_tile<'a>(page: &'a Value, role: &str) -> Option<&'a Value> {
    tiles(page)
        .iter()
        .find(|t| t["tile"]["metadata"]["aac:role"] == role)
}
