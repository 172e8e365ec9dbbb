//! Widget resize gesture (spacious layouts only).
//!
//! While the pointer moves, the session tracks a free pixel proposal that is
//! not yet snapped to the grid. On release the proposal snaps to whole cells,
//! the anchor is corrected so the edge opposite the dragged handle stays put,
//! and the new footprint is validated: commit when it is on its page and
//! clear, cascade onto later pages when it runs off its page, roll back when
//! it lands on another item.

#[cfg(test)]
#[path = "resize_test.rs"]
mod resize_test;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cascade::{CascadeMove, relocate};
use crate::geometry::{GridGeometry, LayoutMode};
use crate::gesture::{Point, RejectReason, SessionId};
use crate::item::{CellSize, ItemId, ItemKind, ItemList};
use crate::occupancy::{Occupancy, fits_page, footprint};

/// Which handle is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeEdge {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl ResizeEdge {
    #[must_use]
    pub fn moves_north(self) -> bool {
        matches!(self, Self::N | Self::Ne | Self::Nw)
    }

    #[must_use]
    pub fn moves_south(self) -> bool {
        matches!(self, Self::S | Self::Se | Self::Sw)
    }

    #[must_use]
    pub fn moves_east(self) -> bool {
        matches!(self, Self::E | Self::Ne | Self::Se)
    }

    #[must_use]
    pub fn moves_west(self) -> bool {
        matches!(self, Self::W | Self::Nw | Self::Sw)
    }

    /// Whether resizing from this handle moves the anchor (top-left) cell.
    #[must_use]
    pub fn shifts_anchor(self) -> bool {
        self.moves_north() || self.moves_west()
    }
}

/// An unsnapped size proposal in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelSize {
    pub width: f64,
    pub height: f64,
}

/// Anchor `(row, col)` after resizing from `edge`, keeping the opposite edge fixed.
///
/// West handles keep the right edge: `col' = col + old_width - new_width`.
/// North handles keep the bottom edge likewise. Corners combine both axes.
/// Results are clamped at zero.
#[must_use]
pub fn corrected_anchor(edge: ResizeEdge, (row, col): (usize, usize), old: CellSize, new: CellSize) -> (usize, usize) {
    if !edge.shifts_anchor() {
        return (row, col);
    }
    let col = if edge.moves_west() { (col + old.width).saturating_sub(new.width) } else { col };
    let row = if edge.moves_north() { (row + old.height).saturating_sub(new.height) } else { row };
    (row, col)
}

/// How a resize ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResizeOutcome {
    Committed {
        items: ItemList,
        size: CellSize,
        slot: usize,
        /// Items cascaded to later pages, in application order.
        moves: Vec<CascadeMove>,
    },
    /// The list as it was before the gesture.
    RolledBack { items: ItemList, reason: RejectReason },
}

/// An active resize.
#[derive(Debug, Clone)]
pub struct ResizeSession {
    pub id: SessionId,
    pub item_id: ItemId,
    pub edge: ResizeEdge,
    pub anchor_slot: usize,
    pub start_size: CellSize,
    pub start_pointer: Point,
    start_px: PixelSize,
    proposal: PixelSize,
    mode: LayoutMode,
    snapshot: ItemList,
}

impl ResizeSession {
    /// Start resizing a gridded widget. Returns `None` on compact layouts and
    /// for apps, docked or unplaced items, or unknown ids.
    #[must_use]
    pub fn begin(
        id: SessionId,
        items: &ItemList,
        mode: &LayoutMode,
        item_id: &str,
        edge: ResizeEdge,
        pointer: Point,
    ) -> Option<Self> {
        if mode.is_compact() {
            debug!(item_id, "resize disabled on compact layouts");
            return None;
        }
        let item = items.get(item_id)?;
        if item.kind != ItemKind::Widget {
            return None;
        }
        let anchor_slot = item.slot?;
        let grid = mode.grid();
        let start_px = PixelSize { width: grid.span_px(item.size.width), height: grid.span_px(item.size.height) };
        Some(Self {
            id,
            item_id: item.id.clone(),
            edge,
            anchor_slot,
            start_size: item.size,
            start_pointer: pointer,
            start_px,
            proposal: start_px,
            mode: *mode,
            snapshot: items.clone(),
        })
    }

    /// Grow or shrink the proposal by the pointer delta along the active edges.
    /// Each axis is held to at least half a cell.
    pub fn on_move(&mut self, pointer: Point) -> PixelSize {
        let dx = pointer.x - self.start_pointer.x;
        let dy = pointer.y - self.start_pointer.y;
        let mut width = self.start_px.width;
        let mut height = self.start_px.height;
        if self.edge.moves_east() {
            width += dx;
        }
        if self.edge.moves_west() {
            width -= dx;
        }
        if self.edge.moves_south() {
            height += dy;
        }
        if self.edge.moves_north() {
            height -= dy;
        }

        let floor = self.mode.grid().cell_size() / 2.0;
        self.proposal = PixelSize { width: width.max(floor), height: height.max(floor) };
        self.proposal
    }

    /// The proposal snapped to whole cells within the mode's widget bounds.
    #[must_use]
    pub fn snapped_size(&self) -> CellSize {
        let grid = self.mode.grid();
        let (min, max) = self.mode.widget_bounds();
        CellSize::new(snap_cells(self.proposal.width, grid), snap_cells(self.proposal.height, grid)).clamp(min, max)
    }

    /// Finish the gesture against the current list.
    #[must_use]
    pub fn release(self, items: &ItemList, max_pages: usize) -> ResizeOutcome {
        let Some(item) = items.get(&self.item_id) else {
            return self.roll_back(RejectReason::InvalidTarget);
        };
        let grid = *self.mode.grid();
        let size = self.snapped_size();
        let page = grid.page_of(self.anchor_slot);
        let (row, col) = corrected_anchor(self.edge, grid.local(self.anchor_slot), self.start_size, size);
        let slot = grid.slot_at(page, row.min(grid.rows() - 1), col.min(grid.columns() - 1));

        if size == self.start_size && slot == self.anchor_slot {
            return ResizeOutcome::Committed { items: items.clone(), size, slot, moves: Vec::new() };
        }

        let mut resized = item.clone().at_slot(slot);
        resized.size = size;

        if !fits_page(slot, size, &grid) {
            debug!(id = %self.item_id, slot, width = size.width, height = size.height, "resize overflows page; cascading");
            return match relocate(&resized, page, items, &self.mode, &BTreeSet::new(), max_pages) {
                Ok(insertion) => {
                    let slot = insertion.items.get(&self.item_id).and_then(|item| item.slot).unwrap_or(slot);
                    let mut moves = insertion.moves;
                    moves.retain(|m| m.id != self.item_id);
                    ResizeOutcome::Committed { items: insertion.items, size, slot, moves }
                }
                Err(e) => {
                    debug!(error = %e, "resize cascade failed; rolling back");
                    self.roll_back(RejectReason::NoFitFound)
                }
            };
        }

        let cells = footprint(slot, size, &grid);
        let occupancy = Occupancy::from_items(&self.mode, items, |other| other.id != self.item_id);
        if occupancy.touches_reserved(&cells) {
            return self.roll_back(RejectReason::Reserved);
        }
        if let Some(other) = occupancy.colliding_items(&cells).into_iter().next() {
            debug!(id = %self.item_id, with = %other, "resize collides; rolling back");
            return self.roll_back(RejectReason::Collision(other));
        }

        ResizeOutcome::Committed { items: items.with_item(resized), size, slot, moves: Vec::new() }
    }

    /// Abandon the gesture, restoring the list it started from.
    #[must_use]
    pub fn cancel(self) -> ResizeOutcome {
        self.roll_back(RejectReason::Cancelled)
    }

    fn roll_back(self, reason: RejectReason) -> ResizeOutcome {
        ResizeOutcome::RolledBack { items: self.snapshot, reason }
    }
}

/// Nearest whole number of cells spanning `px`, counting inter-cell gaps.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn snap_cells(px: f64, grid: &GridGeometry) -> usize {
    let stride = grid.cell_size() + grid.gap();
    if stride <= 0.0 || !px.is_finite() {
        return 1;
    }
    ((px + grid.gap()) / stride).round().max(1.0) as usize
}
