//! The contract between the editing session and whatever draws the tree.
//!
//! The session pushes complete snapshots; the canvas owns layout, diffing,
//! and hit testing.

use kin_core::id::PersonId;
use kin_core::model::{FamilyGraph, Gender, Relation};
use serde::Serialize;

/// Capabilities the session needs from a canvas.
pub trait CanvasAdapter {
    /// Replace everything on screen with `snapshot`.
    fn render(&mut self, snapshot: &RenderSnapshot);

    /// Swap a single node's image without a full resync or relayout.
    fn update_node_icon(&mut self, id: PersonId, image: Option<&str>);
}

/// A canvas that draws nothing. Useful for headless sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCanvas;

impl CanvasAdapter for NullCanvas {
    fn render(&mut self, _snapshot: &RenderSnapshot) {}

    fn update_node_icon(&mut self, _id: PersonId, _image: Option<&str>) {}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderNode {
    pub id: PersonId,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub gender: Gender,
}

/// The loose end of an edge being drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EdgeEnd {
    /// Still attached to its source (no pointer movement yet).
    Node { id: PersonId },
    /// Following the pointer.
    Point { x: f32, y: f32 },
}

/// A visual-only edge shown while an add-relation gesture is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProvisionalEdge {
    pub source: PersonId,
    pub end: EdgeEnd,
}

/// Everything the canvas needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSnapshot {
    pub nodes: Vec<RenderNode>,
    pub edges: Vec<Relation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisional: Option<ProvisionalEdge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<PersonId>,
}

impl RenderSnapshot {
    /// Snapshot the committed graph. `default_image` stands in for people
    /// without a photo.
    pub fn of_graph(graph: &FamilyGraph, default_image: Option<&str>) -> Self {
        let nodes = graph
            .people()
            .map(|person| RenderNode {
                id: person.id,
                label: person.name.clone(),
                image: person
                    .photo
                    .clone()
                    .or_else(|| default_image.map(str::to_string)),
                gender: person.gender,
            })
            .collect();
        Self {
            nodes,
            edges: graph.relations().collect(),
            provisional: None,
            selected: None,
        }
    }

    pub fn node(&self, id: PersonId) -> Option<&RenderNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}
