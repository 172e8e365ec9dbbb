//! Occupancy: which global slots an item covers, and a slot → owner map used
//! by every placement pass.
//!
//! Footprints are clipped to the anchor's page. A footprint with fewer cells
//! than `width * height` has run off its page; that shortfall is how overflow
//! is detected everywhere in the crate.

#[cfg(test)]
#[path = "occupancy_test.rs"]
mod occupancy_test;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::Violation;
use crate::geometry::{GridGeometry, LayoutMode};
use crate::item::{CellSize, Item, ItemId, ItemKind, ItemList};

/// Cells covered by a `size` footprint anchored at `anchor`, clipped to the
/// anchor's page. Cells past the page's last row or column are omitted,
/// never wrapped.
#[must_use]
pub fn footprint(anchor: usize, size: CellSize, grid: &GridGeometry) -> BTreeSet<usize> {
    let page = grid.page_of(anchor);
    let (row, col) = grid.local(anchor);
    let mut cells = BTreeSet::new();
    for r in row..row + size.height {
        if r >= grid.rows() {
            break;
        }
        for c in col..col + size.width {
            if c >= grid.columns() {
                break;
            }
            cells.insert(grid.slot_at(page, r, c));
        }
    }
    cells
}

/// Slots occupied by an item on the grid. Docked and unplaced items occupy none.
#[must_use]
pub fn occupied_slots(item: &Item, grid: &GridGeometry) -> BTreeSet<usize> {
    item.slot
        .map_or_else(BTreeSet::new, |anchor| footprint(anchor, item.footprint(), grid))
}

/// Whether a footprint anchored at `anchor` stays entirely on its page.
#[must_use]
pub fn fits_page(anchor: usize, size: CellSize, grid: &GridGeometry) -> bool {
    let (row, col) = grid.local(anchor);
    grid.addressable(anchor)
        && size.width >= 1
        && size.height >= 1
        && row + size.height <= grid.rows()
        && col + size.width <= grid.columns()
}

/// Who holds a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Owner {
    /// Held by the layout itself (fixed leading tile).
    Reserved,
    Item(ItemId),
}

/// Slot → owner map over the unbounded page sequence.
#[derive(Debug, Clone)]
pub struct Occupancy {
    grid: GridGeometry,
    cells: BTreeMap<usize, Owner>,
}

impl Occupancy {
    /// Empty map with the mode's reserved leading slots held.
    #[must_use]
    pub fn new(mode: &LayoutMode) -> Self {
        let mut cells = BTreeMap::new();
        for slot in 0..mode.reserved_leading() {
            cells.insert(slot, Owner::Reserved);
        }
        Self { grid: *mode.grid(), cells }
    }

    /// Map holding every gridded item for which `keep` returns true.
    ///
    /// Later items overwrite earlier ones on shared cells; callers feed this
    /// lists that are already collision-free.
    #[must_use]
    pub fn from_items<F>(mode: &LayoutMode, items: &ItemList, keep: F) -> Self
    where
        F: Fn(&Item) -> bool,
    {
        let mut occupancy = Self::new(mode);
        for item in items.iter().filter(|item| keep(item)) {
            let cells = occupied_slots(item, &occupancy.grid);
            occupancy.claim(&item.id, &cells);
        }
        occupancy
    }

    #[must_use]
    pub fn grid(&self) -> &GridGeometry {
        &self.grid
    }

    #[must_use]
    pub fn owner(&self, slot: usize) -> Option<&Owner> {
        self.cells.get(&slot)
    }

    /// Whether none of `cells` is held.
    #[must_use]
    pub fn is_free(&self, cells: &BTreeSet<usize>) -> bool {
        cells.iter().all(|slot| self.owner(*slot).is_none())
    }

    /// Items holding any of `cells`.
    #[must_use]
    pub fn colliding_items(&self, cells: &BTreeSet<usize>) -> BTreeSet<ItemId> {
        cells
            .iter()
            .filter_map(|slot| match self.owner(*slot) {
                Some(Owner::Item(id)) => Some(id.clone()),
                _ => None,
            })
            .collect()
    }

    /// Whether any of `cells` is a reserved slot.
    #[must_use]
    pub fn touches_reserved(&self, cells: &BTreeSet<usize>) -> bool {
        cells.iter().any(|slot| self.owner(*slot) == Some(&Owner::Reserved))
    }

    pub fn claim(&mut self, id: &str, cells: &BTreeSet<usize>) {
        for slot in cells {
            self.cells.insert(*slot, Owner::Item(id.to_string()));
        }
    }

    /// Release the cells among `cells` held by `id`.
    pub fn release(&mut self, id: &str, cells: &BTreeSet<usize>) {
        for slot in cells {
            if matches!(self.cells.get(slot), Some(Owner::Item(owner)) if owner == id) {
                self.cells.remove(slot);
            }
        }
    }

    /// Whether a `size` footprint at `anchor` stays on its page and is free.
    #[must_use]
    pub fn window_free(&self, anchor: usize, size: CellSize) -> bool {
        fits_page(anchor, size, &self.grid) && self.is_free(&footprint(anchor, size, &self.grid))
    }

    /// Last page holding anything, if any.
    #[must_use]
    pub fn last_page(&self) -> Option<usize> {
        self.cells.keys().next_back().map(|slot| self.grid.page_of(*slot))
    }

    /// First free window at or after `from` in ascending slot order.
    ///
    /// The scan runs one page past the last occupied page, which is always
    /// empty, so any size the grid can hold is found.
    #[must_use]
    pub fn first_fit(&self, size: CellSize, from: usize) -> Option<usize> {
        if !self.grid.holds(size) {
            return None;
        }
        let bound = self.last_page().unwrap_or(0).max(self.grid.page_of(from)).saturating_add(1);
        self.first_fit_in(size, from, self.grid.page_end(bound))
    }

    /// First free window with its anchor in `[from, to)`.
    #[must_use]
    pub fn first_fit_in(&self, size: CellSize, from: usize, to: usize) -> Option<usize> {
        if !self.grid.holds(size) {
            return None;
        }
        (from..to).find(|anchor| self.window_free(*anchor, size))
    }

    /// First free window on a single page.
    #[must_use]
    pub fn first_fit_on_page(&self, size: CellSize, page: usize) -> Option<usize> {
        self.first_fit_in(size, self.grid.page_start(page), self.grid.page_end(page))
    }
}

/// Check every layout invariant. An empty result means the list is valid.
#[must_use]
pub fn validate(items: &ItemList, mode: &LayoutMode) -> Vec<Violation> {
    let grid = mode.grid();
    let (min, max) = mode.widget_bounds();
    let mut violations = Vec::new();
    let mut slots: HashMap<usize, &str> = HashMap::new();
    let mut docks: HashMap<usize, &str> = HashMap::new();

    for item in items {
        let id = item.id.clone();
        if item.kind == ItemKind::Widget && item.size != item.size.clamp(min, max) {
            violations.push(Violation::BadSize { id: id.clone() });
        }
        match (item.slot, item.dock) {
            (None, None) => violations.push(Violation::Unplaced { id }),
            (Some(_), Some(_)) => violations.push(Violation::DockAndSlot { id }),
            (None, Some(index)) => {
                if item.kind == ItemKind::Widget || !mode.is_compact() {
                    violations.push(Violation::DockNotAllowed { id });
                } else if index >= mode.dock_slots() {
                    violations.push(Violation::DockOutOfRange { id, index });
                } else if let Some(first) = docks.get(&index) {
                    violations.push(Violation::DockConflict { index, first: (*first).to_string(), second: id });
                } else {
                    docks.insert(index, &item.id);
                }
            }
            (Some(_), None) => {
                let cells = occupied_slots(item, grid);
                if cells.len() != item.footprint().area() {
                    violations.push(Violation::PageOverflow { id: id.clone() });
                }
                for slot in cells {
                    if slot < mode.reserved_leading() {
                        violations.push(Violation::Reserved { id: id.clone(), slot });
                    } else if let Some(first) = slots.get(&slot) {
                        violations.push(Violation::Overlap { slot, first: (*first).to_string(), second: id.clone() });
                    } else {
                        slots.insert(slot, &item.id);
                    }
                }
            }
        }
    }
    violations
}
