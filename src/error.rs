//! Error taxonomy and invariant violations.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use crate::item::ItemId;

/// Errors produced by the slot engine.
///
/// None of these are fatal: gestures roll back on `NoFitFound`, loads repair
/// `OverflowOnLoad` silently, and `InvalidGeometry` only guards hand-built grids.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// A cascade ran past its page bound without finding room.
    #[error("no fit found for item {id}")]
    NoFitFound { id: ItemId },
    /// A grid was built with zero columns or rows.
    #[error("invalid geometry: {columns} columns x {rows} rows")]
    InvalidGeometry { columns: usize, rows: usize },
    /// A persisted slot implies a footprint crossing a page boundary.
    #[error("item {id} at slot {slot} overflows its page")]
    OverflowOnLoad { id: ItemId, slot: usize },
    /// Persisted item records could not be decoded.
    #[error("failed to decode item records: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A breach of one of the layout invariants, reported by
/// [`crate::occupancy::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Two items claim the same slot.
    Overlap { slot: usize, first: ItemId, second: ItemId },
    /// An item's footprint is clipped by its page edge.
    PageOverflow { id: ItemId },
    /// Two items claim the same dock position.
    DockConflict { index: usize, first: ItemId, second: ItemId },
    /// Dock index outside the dock.
    DockOutOfRange { id: ItemId, index: usize },
    /// Docked item on a layout without a dock, or a docked widget.
    DockNotAllowed { id: ItemId },
    /// Item has both a slot and a dock index.
    DockAndSlot { id: ItemId },
    /// Item has neither a slot nor a dock index.
    Unplaced { id: ItemId },
    /// Widget size falls outside the layout's allowed range.
    BadSize { id: ItemId },
    /// Item sits on a reserved leading slot.
    Reserved { id: ItemId, slot: usize },
}
