//! Stateless paging: a navigation tile carries its own target page in its
//! metadata, so handling a click needs nothing but the clicked tile.

use crate::domain::constants::{META_OUTPUT, META_ROLE, META_TARGET_PAGE, META_TOOL};
use crate::domain::models::{Direction, Tile, TileClass, TileIcon};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationStyle {
    pub icon: String,
    pub previous_label: String,
    pub next_label: String,
}

impl Default for NavigationStyle {
    fn default() -> Self {
        Self {
            icon: "ARROW".to_string(),
            previous_label: "Previous Page".to_string(),
            next_label: "Next Page".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Pagination {
    style: NavigationStyle,
}

impl Pagination {
    pub fn new(style: NavigationStyle) -> Self {
        Self { style }
    }

    /// `target_page` is raised to 1 if given as 0.
    pub fn build_navigation_tile(&self, direction: Direction, target_page: u32) -> Tile {
        let label = match direction {
            Direction::Previous => &self.style.previous_label,
            Direction::Next => &self.style.next_label,
        };
        let mut metadata = BTreeMap::new();
        metadata.insert(META_ROLE.to_string(), direction.as_str().to_string());
        metadata.insert(
            META_TARGET_PAGE.to_string(),
            target_page.max(1).to_string(),
        );
        Tile::new(
            TileIcon::Static {
                icon: self.style.icon.clone(),
            },
            label.clone(),
            Vec::new(),
            metadata,
        )
    }
}

pub fn classify(tile: &Tile) -> TileClass {
    if let (Some(role), Some(target)) = (tile.metadata(META_ROLE), tile.metadata(META_TARGET_PAGE))
    {
        return match (Direction::parse(role), target.parse::<u32>()) {
            (Some(direction), Ok(target_page)) if target_page >= 1 => TileClass::Navigation {
                direction,
                target_page,
            },
            _ => TileClass::Unknown,
        };
    }
    match tile.metadata(META_OUTPUT) {
        Some(payload) if !payload.is_empty() => TileClass::Content {
            payload: payload.to_string(),
        },
        _ => TileClass::Unknown,
    }
}

pub fn is_tool_tile(tile: &Tile) -> bool {
    tile.metadata(META_TOOL) == Some("true")
}
