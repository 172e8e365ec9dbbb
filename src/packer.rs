//! Full re-flow of a compact layout after a structural change.

#[cfg(test)]
#[path = "packer_test.rs"]
mod packer_test;

use crate::geometry::LayoutMode;
use crate::item::ItemList;
use crate::occupancy::{Occupancy, footprint};
use crate::placement::{settle_dock, slot_order};

/// Re-flow the dock and grid into a collision-free arrangement.
///
/// Items are visited in ascending slot order (unplaced last, ties in input
/// order). Each searches its own page from its prior slot, or from the running
/// cursor when it has none, and falls back to a scan from slot 0 when that
/// page has no room. Packing an already packed list returns it unchanged.
#[must_use]
pub fn pack(items: &ItemList, mode: &LayoutMode) -> ItemList {
    let mut items = settle_dock(items.normalized(mode).into_vec(), mode);
    let mut occupancy = Occupancy::new(mode);
    let grid = *mode.grid();
    let mut cursor = mode.reserved_leading();

    for i in slot_order(&items) {
        let size = items[i].footprint();
        let preferred = items[i].slot.unwrap_or(cursor);
        let page_end = grid.page_end(grid.page_of(preferred));
        let anchor = occupancy
            .first_fit_in(size, preferred, page_end)
            .or_else(|| occupancy.first_fit(size, 0));

        if let Some(anchor) = anchor {
            occupancy.claim(&items[i].id, &footprint(anchor, size, &grid));
            cursor = anchor.saturating_add(1);
        }
        items[i].slot = anchor;
    }
    ItemList::new(items)
}
