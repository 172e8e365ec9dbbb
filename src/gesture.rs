//! Gesture model: pointer positions, keys, session identity, and the single
//! active gesture tracked between pointer-down and pointer-up.
//!
//! Only one gesture runs at a time. Every session carries a [`SessionId`];
//! events tagged with any other id are stale and ignored by the engine.

#[cfg(test)]
#[path = "gesture_test.rs"]
mod gesture_test;

use uuid::Uuid;

use crate::drag::DragSession;
use crate::item::ItemId;
use crate::resize::ResizeSession;

/// Identity of one drag or resize gesture.
pub type SessionId = Uuid;

/// A pointer position in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A keyboard key as reported by the host (e.g. `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn is_escape(&self) -> bool {
        self.0 == "Escape" || self.0 == "Esc"
    }
}

/// Why a gesture ended without changing the layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Released outside any drop target.
    Outside,
    /// Cancelled by Escape or by the host.
    Cancelled,
    /// Replaced by a newer gesture or a structural change.
    Superseded,
    /// The new footprint lands on another item.
    Collision(ItemId),
    /// The new footprint covers a reserved slot.
    Reserved,
    /// A cascade ran out of pages.
    NoFitFound,
    /// The target cannot hold this item (e.g. a widget over the dock).
    InvalidTarget,
}

/// The gesture currently in progress.
#[derive(Debug, Clone, Default)]
pub enum GestureState {
    /// Waiting for the next gesture.
    #[default]
    Idle,
    Dragging(DragSession),
    Resizing(ResizeSession),
}

impl GestureState {
    /// Session id of the active gesture, if any.
    #[must_use]
    pub fn session(&self) -> Option<SessionId> {
        match self {
            Self::Idle => None,
            Self::Dragging(drag) => Some(drag.id),
            Self::Resizing(resize) => Some(resize.id),
        }
    }

    /// Id of the item under the active gesture, if any.
    #[must_use]
    pub fn item_id(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Dragging(drag) => Some(&drag.item_id),
            Self::Resizing(resize) => Some(&resize.item_id),
        }
    }
}
