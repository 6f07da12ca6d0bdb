// SPDX-License-Identifier: MIT OR Apache-2.0
//! Flattened playback list built from the assembly hierarchy.

use crate::item::{AssemblyHierarchy, ItemId};
use serde::{Deserialize, Serialize};

/// Per-station metadata for progress display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationSummary {
    /// Station display name
    pub name: String,
    /// Number of playback entries contributed by this station
    pub child_count: usize,
    /// Number of playback entries that come before this station
    pub previous_items: usize,
}

impl StationSummary {
    /// Whether a list index falls inside this station
    pub fn contains(&self, index: usize) -> bool {
        index >= self.previous_items && index < self.previous_items + self.child_count
    }
}

/// Ordered, frozen sequence of playable items.
///
/// Built once on every entry to cinema mode and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct PlaybackList {
    items: Vec<ItemId>,
}

impl PlaybackList {
    /// Create a list from already-ordered items
    pub fn from_items(items: Vec<ItemId>) -> Self {
        Self { items }
    }

    /// Walk every station depth-first and collect the playable entries
    pub fn build(hierarchy: &impl AssemblyHierarchy) -> (Self, Vec<StationSummary>) {
        let mut items = Vec::new();
        let mut stations = Vec::new();

        for station in hierarchy.stations() {
            let previous_items = items.len();
            collect(hierarchy, station, &mut items);
            stations.push(StationSummary {
                name: hierarchy.display_name(station),
                child_count: items.len() - previous_items,
                previous_items,
            });
        }

        tracing::debug!(
            "Built playback list: {} items in {} stations",
            items.len(),
            stations.len()
        );

        (Self { items }, stations)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list has no entries
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Highest valid index, `-1` for an empty list
    pub fn last_index(&self) -> isize {
        self.items.len() as isize - 1
    }

    /// Item at a signed index, `None` outside `[0, len)`
    pub fn get(&self, index: isize) -> Option<ItemId> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.items.get(i))
            .copied()
    }

    /// All entries in playback order
    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    /// Iterate over entries
    pub fn iter(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.items.iter().copied()
    }
}

/// Find the station that contains a list index
pub fn station_at(stations: &[StationSummary], index: isize) -> Option<usize> {
    let index = usize::try_from(index).ok()?;
    stations.iter().position(|s| s.contains(index))
}

fn collect(hierarchy: &impl AssemblyHierarchy, parent: ItemId, items: &mut Vec<ItemId>) {
    for child in hierarchy.children(parent) {
        if hierarchy.kind(child).is_playable() {
            items.push(child);
        } else {
            collect(hierarchy, child, items);
        }
    }
}
