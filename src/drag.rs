//! Drag-and-drop gesture: resolve a drop target into a move, a swap, a
//! displacement with cascade, or a rejection.

#[cfg(test)]
#[path = "drag_test.rs"]
mod drag_test;

use std::collections::BTreeSet;

use tracing::debug;

use crate::cascade::{CascadeMove, insert_at, relocate};
use crate::error::LayoutError;
use crate::geometry::LayoutMode;
use crate::gesture::{RejectReason, SessionId};
use crate::item::{Item, ItemId, ItemKind, ItemList};
use crate::occupancy::{Occupancy, fits_page, footprint};

/// Where the pointer was released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// An empty slot placeholder (global slot index).
    EmptySlot(usize),
    /// Another item.
    Item(ItemId),
    /// A dock position on compact layouts.
    DockSlot(usize),
    /// Nothing droppable.
    Outside,
}

/// How a drag ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    /// Placed directly at the target.
    Moved { items: ItemList },
    /// Exchanged positions with another item.
    Swapped { items: ItemList, with: ItemId },
    /// Placed after pushing other items onward.
    Displaced { items: ItemList, moves: Vec<CascadeMove> },
    /// The list as it was before the gesture.
    Rejected { items: ItemList, reason: RejectReason },
}

impl DragOutcome {
    /// The resulting list, whatever the outcome.
    #[must_use]
    pub fn items(&self) -> &ItemList {
        match self {
            Self::Moved { items }
            | Self::Swapped { items, .. }
            | Self::Displaced { items, .. }
            | Self::Rejected { items, .. } => items,
        }
    }
}

/// An active drag.
#[derive(Debug, Clone)]
pub struct DragSession {
    pub id: SessionId,
    pub item_id: ItemId,
    mode: LayoutMode,
    snapshot: ItemList,
}

impl DragSession {
    /// Start dragging a placed item. Returns `None` for unknown or unplaced items.
    #[must_use]
    pub fn begin(id: SessionId, items: &ItemList, mode: &LayoutMode, item_id: &str) -> Option<Self> {
        let item = items.get(item_id)?;
        if !item.is_placed() {
            return None;
        }
        Some(Self { id, item_id: item.id.clone(), mode: *mode, snapshot: items.clone() })
    }

    /// Resolve the drop against the current list.
    #[must_use]
    pub fn drop_on(self, target: DropTarget, items: &ItemList, max_pages: usize) -> DragOutcome {
        let Some(item) = items.get(&self.item_id).cloned() else {
            return self.reject(RejectReason::InvalidTarget);
        };
        let result = match target {
            DropTarget::Outside => return self.reject(RejectReason::Outside),
            DropTarget::EmptySlot(slot) => self.onto_slot(&item, slot, items, max_pages),
            DropTarget::DockSlot(index) => self.onto_dock(&item, index, items),
            DropTarget::Item(other_id) => match items.get(&other_id) {
                Some(other) if other.id == item.id => Ok(DragOutcome::Moved { items: items.clone() }),
                Some(other) => match (other.slot, other.dock) {
                    (_, Some(index)) => self.onto_dock(&item, index, items),
                    (Some(_), None) => self.onto_item(&item, other, items, max_pages),
                    (None, None) => Err(RejectReason::InvalidTarget),
                },
                None => Err(RejectReason::InvalidTarget),
            },
        };
        match result {
            Ok(outcome) => outcome,
            Err(reason) => {
                debug!(id = %self.item_id, ?reason, "drop rejected");
                self.reject(reason)
            }
        }
    }

    /// Abandon the gesture, restoring the list it started from.
    #[must_use]
    pub fn cancel(self) -> DragOutcome {
        self.reject(RejectReason::Cancelled)
    }

    fn reject(self, reason: RejectReason) -> DragOutcome {
        DragOutcome::Rejected { items: self.snapshot, reason }
    }

    /// Drop on an empty placeholder: direct placement when clear, displacement
    /// when the footprint covers other items, a push onto later pages when
    /// the footprint runs off its page.
    fn onto_slot(&self, item: &Item, slot: usize, items: &ItemList, max_pages: usize) -> Result<DragOutcome, RejectReason> {
        if item.slot == Some(slot) {
            return Ok(DragOutcome::Moved { items: items.clone() });
        }
        let grid = *self.mode.grid();
        if !grid.addressable(slot) {
            return Err(RejectReason::InvalidTarget);
        }
        let size = item.footprint();
        let moving = item.clone().at_slot(slot);

        if !fits_page(slot, size, &grid) {
            let insertion = relocate(&moving, grid.page_of(slot), items, &self.mode, &BTreeSet::new(), max_pages)
                .map_err(no_fit)?;
            return Ok(DragOutcome::Displaced { items: insertion.items, moves: insertion.moves });
        }

        let cells = footprint(slot, size, &grid);
        let occupancy = Occupancy::from_items(&self.mode, items, |other| other.id != item.id);
        if occupancy.touches_reserved(&cells) {
            return Err(RejectReason::Reserved);
        }
        if occupancy.is_free(&cells) {
            return Ok(DragOutcome::Moved { items: items.with_item(moving) });
        }
        let insertion = insert_at(item, slot, items, &self.mode, &BTreeSet::new(), max_pages).map_err(no_fit)?;
        Ok(DragOutcome::Displaced { items: insertion.items, moves: insertion.moves })
    }

    /// Drop on a dock position. Only apps dock. An occupant is swapped into
    /// the dragged app's old place (dock or grid).
    fn onto_dock(&self, item: &Item, index: usize, items: &ItemList) -> Result<DragOutcome, RejectReason> {
        if item.kind != ItemKind::App || index >= self.mode.dock_slots() {
            return Err(RejectReason::InvalidTarget);
        }
        if item.dock == Some(index) {
            return Ok(DragOutcome::Moved { items: items.clone() });
        }
        let docked = item.clone().in_dock(index);
        let Some(occupant) = items.iter().find(|other| other.dock == Some(index) && other.id != item.id) else {
            return Ok(DragOutcome::Moved { items: items.with_item(docked) });
        };

        let mut displaced = occupant.clone();
        displaced.slot = item.slot;
        displaced.dock = item.dock;
        Ok(DragOutcome::Swapped { items: items.with_item(docked).with_item(displaced), with: occupant.id.clone() })
    }

    /// Drop on a gridded item: swap anchors when both fit cleanly, otherwise
    /// place the dragged item at the target and push whichever side does not
    /// fit onto later pages.
    fn onto_item(&self, item: &Item, other: &Item, items: &ItemList, max_pages: usize) -> Result<DragOutcome, RejectReason> {
        let grid = *self.mode.grid();
        let Some(target) = other.slot else {
            return Err(RejectReason::InvalidTarget);
        };

        if let Some(origin) = item.slot {
            if let Some(swapped) = self.clean_swap(item, origin, other, target, items) {
                return Ok(DragOutcome::Swapped { items: swapped, with: other.id.clone() });
            }
        }

        // The target item leaves the grid while the dragged item lands.
        let mut current = items.with_item(other.clone().unplaced());
        let mut moved: BTreeSet<ItemId> = BTreeSet::from([other.id.clone()]);
        let mut moves = Vec::new();

        let landing = if fits_page(target, item.footprint(), &grid) {
            insert_at(item, target, &current, &self.mode, &moved, max_pages)
        } else {
            relocate(&item.clone().at_slot(target), grid.page_of(target), &current, &self.mode, &moved, max_pages)
        }
        .map_err(no_fit)?;
        moved.insert(item.id.clone());
        moved.extend(landing.moves.iter().map(|m| m.id.clone()));
        moves.extend(landing.moves);
        current = landing.items;

        // The target item takes the dragged item's old place when it can.
        let home = match (item.slot, item.dock) {
            (_, Some(index)) if other.kind == ItemKind::App => Some(other.clone().in_dock(index)),
            (Some(origin), _) => {
                let occupancy = Occupancy::from_items(&self.mode, &current, |o| o.id != other.id);
                occupancy.window_free(origin, other.footprint()).then(|| other.clone().at_slot(origin))
            }
            _ => None,
        };
        match home {
            Some(placed) => current = current.with_item(placed),
            None => {
                let from = item.slot.map_or_else(|| grid.page_of(target), |origin| grid.page_of(origin));
                let pushed = relocate(other, from, &current, &self.mode, &moved, max_pages).map_err(no_fit)?;
                moves.extend(pushed.moves);
                current = pushed.items;
            }
        }
        Ok(DragOutcome::Displaced { items: current, moves })
    }

    /// Exchange anchors when both footprints stay on their pages and clear of
    /// every other item and of each other.
    fn clean_swap(&self, item: &Item, origin: usize, other: &Item, target: usize, items: &ItemList) -> Option<ItemList> {
        let grid = *self.mode.grid();
        if !fits_page(target, item.footprint(), &grid) || !fits_page(origin, other.footprint(), &grid) {
            return None;
        }
        let item_cells = footprint(target, item.footprint(), &grid);
        let other_cells = footprint(origin, other.footprint(), &grid);
        if !item_cells.is_disjoint(&other_cells) {
            return None;
        }
        let occupancy = Occupancy::from_items(&self.mode, items, |o| o.id != item.id && o.id != other.id);
        if !occupancy.is_free(&item_cells) || !occupancy.is_free(&other_cells) {
            return None;
        }
        Some(items.with_item(item.clone().at_slot(target)).with_item(other.clone().at_slot(origin)))
    }
}

fn no_fit(e: LayoutError) -> RejectReason {
    debug!(error = %e, "drop cascade failed");
    RejectReason::NoFitFound
}
