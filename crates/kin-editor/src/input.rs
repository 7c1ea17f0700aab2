//! Input abstraction layer.
//!
//! The canvas host does its own hit testing and reports what was under the
//! pointer; tools only ever see these normalized events.

use kin_core::id::PersonId;

/// What a click landed on, as resolved by the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Node(PersonId),
    Edge { source: PersonId, target: PersonId },
    Empty,
}

/// A normalized pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer clicked at canvas coordinates `(x, y)`.
    Click { hit: Hit, x: f32, y: f32 },

    /// Pointer moved; only the provisional edge cares.
    PointerMove { x: f32, y: f32 },
}

impl InputEvent {
    pub fn click_node(id: PersonId, x: f32, y: f32) -> Self {
        Self::Click {
            hit: Hit::Node(id),
            x,
            y,
        }
    }

    pub fn click_edge(source: PersonId, target: PersonId, x: f32, y: f32) -> Self {
        Self::Click {
            hit: Hit::Edge { source, target },
            x,
            y,
        }
    }

    pub fn click_empty(x: f32, y: f32) -> Self {
        Self::Click {
            hit: Hit::Empty,
            x,
            y,
        }
    }

    pub fn pointer_move(x: f32, y: f32) -> Self {
        Self::PointerMove { x, y }
    }

    /// Pointer position carried by the event.
    pub fn position(&self) -> (f32, f32) {
        match self {
            Self::Click { x, y, .. } | Self::PointerMove { x, y } => (*x, *y),
        }
    }
}
