//! First-fit placement: assigning unplaced items and repairing untrusted
//! slot indices.
//!
//! Both passes scan global slots in ascending order and take the first window
//! whose cells are on one page and unheld. On compact layouts the dock is
//! settled before the grid: apps holding a valid, unclaimed dock index keep it,
//! and an app losing a contested dock index falls through to the grid.

#[cfg(test)]
#[path = "placement_test.rs"]
mod placement_test;

use tracing::{debug, warn};

use crate::error::LayoutError;
use crate::geometry::LayoutMode;
use crate::item::{Item, ItemKind, ItemList};
use crate::occupancy::{Occupancy, fits_page, footprint, occupied_slots};

/// Place every item that has neither a slot nor a dock index.
///
/// Items already on the grid stay where they are. Unplaced widgets are placed
/// before unplaced apps, each group in input order, so large footprints claim
/// contiguous space before single cells fragment it.
#[must_use]
pub fn assign(items: &ItemList, mode: &LayoutMode) -> ItemList {
    let mut items = settle_dock(items.normalized(mode).into_vec(), mode);
    let mut occupancy = Occupancy::new(mode);
    for item in items.iter().filter(|item| item.slot.is_some()) {
        let cells = occupied_slots(item, occupancy.grid());
        occupancy.claim(&item.id, &cells);
    }

    let mut order = Vec::new();
    for kind in [ItemKind::Widget, ItemKind::App] {
        order.extend(
            items
                .iter()
                .enumerate()
                .filter(|(_, item)| item.kind == kind && !item.is_placed())
                .map(|(i, _)| i),
        );
    }

    for i in order {
        items[i].slot = place_first_fit(&mut occupancy, &items[i]);
    }
    ItemList::new(items)
}

/// Rebuild a collision-free arrangement from possibly conflicting or stale
/// slot indices (e.g. persisted state loaded after a geometry change).
///
/// Items are visited in ascending slot order, unplaced last, ties in input
/// order. Each keeps its slot when the window is still on one page and free;
/// otherwise it moves to the first free window from slot 0. Output keeps
/// input order.
#[must_use]
pub fn repair(items: &ItemList, mode: &LayoutMode) -> ItemList {
    let mut items = settle_dock(items.normalized(mode).into_vec(), mode);
    let mut occupancy = Occupancy::new(mode);

    for i in slot_order(&items) {
        let size = items[i].footprint();
        let kept = items[i].slot.filter(|anchor| occupancy.window_free(*anchor, size));
        if kept.is_none() {
            if let Some(slot) = items[i].slot {
                if fits_page(slot, size, occupancy.grid()) {
                    debug!(id = %items[i].id, slot, "slot contested; re-placing");
                } else {
                    let overflow = LayoutError::OverflowOnLoad { id: items[i].id.clone(), slot };
                    debug!(error = %overflow, "re-placing");
                }
            }
        }

        items[i].slot = match kept {
            Some(anchor) => {
                let cells = footprint(anchor, size, occupancy.grid());
                occupancy.claim(&items[i].id, &cells);
                Some(anchor)
            }
            None => place_first_fit(&mut occupancy, &items[i]),
        };
    }
    ItemList::new(items)
}

/// Indices of gridded candidates (everything not docked) in ascending slot
/// order, unplaced last; the sort is stable so ties keep input order.
pub(crate) fn slot_order(items: &[Item]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..items.len()).filter(|i| items[*i].dock.is_none()).collect();
    order.sort_by_key(|i| (items[*i].slot.is_none(), items[*i].slot));
    order
}

/// Settle dock claims in input order. The first app naming a dock index keeps
/// it; later claimants are undocked and left unplaced.
pub(crate) fn settle_dock(mut items: Vec<Item>, mode: &LayoutMode) -> Vec<Item> {
    let mut taken = vec![false; mode.dock_slots()];
    for item in &mut items {
        let Some(index) = item.dock else {
            continue;
        };
        match taken.get_mut(index) {
            Some(slot_taken) if !*slot_taken => *slot_taken = true,
            _ => {
                debug!(id = %item.id, index, "dock index contested; undocking");
                item.dock = None;
                item.slot = None;
            }
        }
    }
    items
}

/// Claim the first free window from slot 0 for `item`.
pub(crate) fn place_first_fit(occupancy: &mut Occupancy, item: &Item) -> Option<usize> {
    let size = item.footprint();
    let Some(anchor) = occupancy.first_fit(size, 0) else {
        warn!(id = %item.id, width = size.width, height = size.height, "no window holds item");
        return None;
    };
    let cells = footprint(anchor, size, occupancy.grid());
    occupancy.claim(&item.id, &cells);
    Some(anchor)
}
