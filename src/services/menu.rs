use crate::domain::constants::MIN_GRID_CAPACITY;
use crate::domain::errors::MenuError;
use crate::domain::models::{MenuEntryDefinition, Page};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::ops::Range;
use std::sync::Arc;

/// Immutable definition set plus its precomputed page boundaries.
#[derive(Debug)]
struct MenuSnapshot {
    entries: Vec<MenuEntryDefinition>,
    tool: Option<MenuEntryDefinition>,
    pages: Vec<Range<usize>>,
}

impl MenuSnapshot {
    fn build(definitions: Vec<MenuEntryDefinition>, capacity: usize) -> Result<Self, MenuError> {
        let mut seen = HashSet::new();
        let mut tool: Option<MenuEntryDefinition> = None;
        let mut entries = Vec::with_capacity(definitions.len());
        for def in definitions {
            if !seen.insert(def.id.clone()) {
                return Err(MenuError::DuplicateEntry(def.id));
            }
            if def.is_tool_marker {
                if let Some(existing) = &tool {
                    return Err(MenuError::MultipleTools(existing.id.clone(), def.id));
                }
                tool = Some(def);
            } else {
                entries.push(def);
            }
        }
        let pages = page_ranges(entries.len(), capacity);
        Ok(Self {
            entries,
            tool,
            pages,
        })
    }
}

/// Split `total` entries into pages. A page reserves one slot for "previous"
/// unless it is the first, and one for "next" unless the rest fits.
fn page_ranges(total: usize, capacity: usize) -> Vec<Range<usize>> {
    let mut pages = Vec::new();
    let mut start = 0;
    loop {
        let has_previous = !pages.is_empty();
        let slots = capacity - usize::from(has_previous);
        let remaining = total - start;
        if remaining <= slots {
            pages.push(start..total);
            return pages;
        }
        let end = start + slots - 1;
        pages.push(start..end);
        start = end;
    }
}

/// Owns the menu definition set. Reads take a snapshot `Arc`, reloads swap
/// the whole snapshot, so a reader never sees a partially replaced menu.
pub struct MenuModel {
    capacity: usize,
    snapshot: RwLock<Arc<MenuSnapshot>>,
}

impl MenuModel {
    pub fn new(capacity: usize, definitions: Vec<MenuEntryDefinition>) -> Result<Self, MenuError> {
        if capacity < MIN_GRID_CAPACITY {
            return Err(MenuError::CapacityTooSmall(capacity, MIN_GRID_CAPACITY));
        }
        let snapshot = MenuSnapshot::build(definitions, capacity)?;
        Ok(Self {
            capacity,
            snapshot: RwLock::new(Arc::new(snapshot)),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Validate and atomically install a new definition set. On error the
    /// current set stays in place.
    pub fn reload(&self, definitions: Vec<MenuEntryDefinition>) -> Result<(), MenuError> {
        let next = Arc::new(MenuSnapshot::build(definitions, self.capacity)?);
        *self.snapshot.write() = next;
        Ok(())
    }

    fn current(&self) -> Arc<MenuSnapshot> {
        self.snapshot.read().clone()
    }

    pub fn last_page(&self) -> u32 {
        self.current().pages.len() as u32
    }

    pub fn entry_count(&self) -> usize {
        self.current().entries.len()
    }

    pub fn tool(&self) -> Option<MenuEntryDefinition> {
        self.current().tool.clone()
    }

    /// Out-of-range page numbers are clamped to the nearest valid page.
    pub fn get_page(&self, page_number: i64) -> Page {
        let snap = self.current();
        let last = snap.pages.len() as i64;
        let n = page_number.clamp(1, last);
        let range = snap.pages[(n - 1) as usize].clone();
        Page {
            page_number: n as u32,
            last_page: last as u32,
            entries: snap.entries[range].to_vec(),
            has_previous: n > 1,
            has_next: n < last,
        }
    }
}
