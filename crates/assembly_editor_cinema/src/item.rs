// SPDX-License-Identifier: MIT OR Apache-2.0
//! Playable item handles and the seams to the external scene.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque, non-owning handle to a visual element in the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub Uuid);

impl ItemId {
    /// Create a new random item ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

/// How the scene classifies a node of the assembly hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// A single component
    Leaf,
    /// A group that is revealed as one unit
    FusedGroup,
    /// A group whose children are revealed individually
    ContainerGroup,
}

impl NodeKind {
    /// Whether a node of this kind becomes a single playback entry
    pub fn is_playable(&self) -> bool {
        matches!(self, Self::Leaf | Self::FusedGroup)
    }
}

/// Read access to the assembly hierarchy, provided by the scene.
///
/// The top level consists of stations. Every station is walked depth-first
/// when a playback list is built.
pub trait AssemblyHierarchy {
    /// Stations in display order
    fn stations(&self) -> Vec<ItemId>;

    /// Direct children of a node in display order
    fn children(&self, id: ItemId) -> Vec<ItemId>;

    /// Classification of a node
    fn kind(&self, id: ItemId) -> NodeKind;

    /// Human-readable name of a node
    fn display_name(&self, id: ItemId) -> String;
}

/// Applies visibility to scene items.
///
/// An opacity of `0.0` must also deactivate the element so hidden items do
/// not take part in picking or rendering.
pub trait VisibilitySink {
    /// Set the opacity of an item (and its visual sub-parts) to a value in `[0, 1]`
    fn set_opacity(&mut self, item: ItemId, opacity: f32);

    /// Make an item fully visible
    fn show(&mut self, item: ItemId) {
        self.set_opacity(item, 1.0);
    }

    /// Make an item fully hidden
    fn hide(&mut self, item: ItemId) {
        self.set_opacity(item, 0.0);
    }
}
