// SPDX-License-Identifier: MIT OR Apache-2.0
//! Assembly scene state.
//!
//! The scene is a tree of stations, groups and parts. It is the external
//! collaborator of cinema mode: it classifies nodes for the playback list
//! and applies opacity to parts.

use assembly_editor_cinema::{AssemblyHierarchy, ItemId, NodeKind, VisibilitySink};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Kind of scene node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    /// Top-level work station
    Station,
    /// Group of parts; fused groups are revealed as one unit
    Group {
        /// Whether the group is fused
        fused: bool,
    },
    /// Single part with a renderer
    Part,
}

/// Entity data stored in the scene
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityData {
    /// Entity name
    pub name: String,
    /// Node kind
    pub kind: EntityKind,
    /// Whether the entity is active
    pub active: bool,
    /// Material alpha
    pub opacity: f32,
    /// Parent entity (if any)
    pub parent: Option<ItemId>,
    /// Child entities
    pub children: Vec<ItemId>,
}

impl EntityData {
    /// Create a new visible entity with the given name
    pub fn new(name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            name: name.into(),
            kind,
            active: true,
            opacity: 1.0,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// Scene data containing all entities
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneData {
    /// All entities in the scene
    pub entities: IndexMap<ItemId, EntityData>,
}

impl SceneData {
    /// Create a new empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a station at the top level
    pub fn add_station(&mut self, name: impl Into<String>) -> ItemId {
        let id = ItemId::new();
        self.entities.insert(id, EntityData::new(name, EntityKind::Station));
        id
    }

    /// Add an entity below a parent
    pub fn add_child(&mut self, parent: ItemId, data: EntityData) -> ItemId {
        let id = ItemId::new();
        self.entities.insert(
            id,
            EntityData {
                parent: Some(parent),
                ..data
            },
        );
        if let Some(parent) = self.entities.get_mut(&parent) {
            parent.children.push(id);
        }
        id
    }

    /// Get an entity by ID
    pub fn get(&self, id: &ItemId) -> Option<&EntityData> {
        self.entities.get(id)
    }

    /// Get all root entities (no parent)
    pub fn root_entities(&self) -> Vec<ItemId> {
        self.entities
            .iter()
            .filter(|(_, data)| data.parent.is_none())
            .map(|(id, _)| *id)
            .collect()
    }

    /// Number of parts currently rendered
    pub fn visible_parts(&self) -> usize {
        self.entities
            .values()
            .filter(|e| e.kind == EntityKind::Part && e.active)
            .count()
    }

    /// Set opacity on an entity and everything below it
    pub fn apply_opacity(&mut self, id: ItemId, opacity: f32) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(entity) = self.entities.get_mut(&current) else {
                continue;
            };
            entity.opacity = opacity;
            entity.active = opacity != 0.0;
            stack.extend(entity.children.iter().copied());
        }
    }

    /// Demo assembly used when no scene is supplied
    pub fn demo() -> Self {
        let mut scene = Self::new();

        let frame = scene.add_station("Frame");
        for name in ["Base plate", "Left rail", "Right rail"] {
            scene.add_child(frame, EntityData::new(name, EntityKind::Part));
        }

        let drive = scene.add_station("Drive");
        let motor = scene.add_child(drive, EntityData::new("Motor", EntityKind::Group { fused: true }));
        scene.add_child(motor, EntityData::new("Stator", EntityKind::Part));
        scene.add_child(motor, EntityData::new("Rotor", EntityKind::Part));
        let belt = scene.add_child(drive, EntityData::new("Belt drive", EntityKind::Group { fused: false }));
        for name in ["Pulley", "Belt", "Tensioner"] {
            scene.add_child(belt, EntityData::new(name, EntityKind::Part));
        }

        let cover = scene.add_station("Cover");
        scene.add_child(cover, EntityData::new("Lid", EntityKind::Part));

        scene
    }
}

impl AssemblyHierarchy for SceneData {
    fn stations(&self) -> Vec<ItemId> {
        self.root_entities()
    }

    fn children(&self, id: ItemId) -> Vec<ItemId> {
        self.get(&id).map(|e| e.children.clone()).unwrap_or_default()
    }

    fn kind(&self, id: ItemId) -> NodeKind {
        match self.get(&id).map(|e| e.kind) {
            Some(EntityKind::Group { fused: true }) => NodeKind::FusedGroup,
            Some(EntityKind::Group { fused: false } | EntityKind::Station) => NodeKind::ContainerGroup,
            Some(EntityKind::Part) | None => NodeKind::Leaf,
        }
    }

    fn display_name(&self, id: ItemId) -> String {
        self.get(&id).map(|e| e.name.clone()).unwrap_or_default()
    }
}

impl VisibilitySink for SceneData {
    fn set_opacity(&mut self, item: ItemId, opacity: f32) {
        self.apply_opacity(item, opacity.clamp(0.0, 1.0));
    }
}
