// SPDX-License-Identifier: MIT OR Apache-2.0
//! In-memory collaborators for unit tests.

use crate::item::{AssemblyHierarchy, ItemId, NodeKind, VisibilitySink};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Sink that remembers the last opacity written for every item
#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    pub opacity: HashMap<ItemId, f32>,
    pub writes: Vec<(ItemId, f32)>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last written opacity, `None` if the item was never touched
    pub fn get(&self, item: ItemId) -> Option<f32> {
        self.opacity.get(&item).copied()
    }

    pub fn opacities(&self, items: &[ItemId]) -> Vec<f32> {
        items.iter().map(|id| self.get(*id).unwrap_or(-1.0)).collect()
    }
}

impl VisibilitySink for RecordingSink {
    fn set_opacity(&mut self, item: ItemId, opacity: f32) {
        self.opacity.insert(item, opacity);
        self.writes.push((item, opacity));
    }
}

struct TestNode {
    name: String,
    kind: NodeKind,
    children: Vec<ItemId>,
}

/// Hierarchy built by hand in tests
#[derive(Default)]
pub(crate) struct TestHierarchy {
    stations: Vec<ItemId>,
    nodes: IndexMap<ItemId, TestNode>,
}

impl TestHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn station(&mut self, name: &str) -> ItemId {
        let id = self.node(name, NodeKind::ContainerGroup);
        self.stations.push(id);
        id
    }

    pub fn child(&mut self, parent: ItemId, name: &str, kind: NodeKind) -> ItemId {
        let id = self.node(name, kind);
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(id);
        }
        id
    }

    fn node(&mut self, name: &str, kind: NodeKind) -> ItemId {
        let id = ItemId::new();
        self.nodes.insert(
            id,
            TestNode {
                name: name.to_string(),
                kind,
                children: Vec::new(),
            },
        );
        id
    }

    /// One station holding `count` leaves
    pub fn flat(count: usize) -> (Self, Vec<ItemId>) {
        let mut hierarchy = Self::new();
        let station = hierarchy.station("Station");
        let leaves = (0..count)
            .map(|i| hierarchy.child(station, &format!("Part {i}"), NodeKind::Leaf))
            .collect();
        (hierarchy, leaves)
    }
}

impl AssemblyHierarchy for TestHierarchy {
    fn stations(&self) -> Vec<ItemId> {
        self.stations.clone()
    }

    fn children(&self, id: ItemId) -> Vec<ItemId> {
        self.nodes
            .get(&id)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn kind(&self, id: ItemId) -> NodeKind {
        self.nodes.get(&id).map_or(NodeKind::Leaf, |n| n.kind)
    }

    fn display_name(&self, id: ItemId) -> String {
        self.nodes
            .get(&id)
            .map(|n| n.name.clone())
            .unwrap_or_default()
    }
}
