//! Cascading relocation onto later pages.
//!
//! DESIGN
//! ======
//! When an item cannot be placed on its target page, it is pushed to the
//! next page with a free window. A page with no window gives up its
//! bottom-most item (lowest row, then highest slot) to the page after it,
//! and the search retries on the partially vacated page.
//!
//! The chain is resolved as an iterative sweep over pages rather than
//! recursion: items evicted from page `p` are carried to page `p + 1`, and so
//! on, up to a fixed page bound. Every moved item is recorded in a visited
//! set and is never chosen for eviction again, which bounds the work by the
//! number of items even on pathological layouts.
//!
//! ATOMICITY
//! =========
//! Nothing here mutates caller state. A cascade either returns the complete
//! set of moves or `None`/`NoFitFound`; callers apply all moves or none.

#[cfg(test)]
#[path = "cascade_test.rs"]
mod cascade_test;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::debug;

use crate::error::LayoutError;
use crate::geometry::{GridGeometry, LayoutMode};
use crate::item::{CellSize, Item, ItemId, ItemList};
use crate::occupancy::{Occupancy, fits_page, footprint};

/// One relocation performed by a cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeMove {
    pub id: ItemId,
    /// New global anchor slot.
    pub slot: usize,
    /// Page containing `slot`.
    pub page: usize,
}

/// Result of pushing one item onto a later page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeOutcome {
    /// Where the pushed item lands.
    pub slot: usize,
    pub page: usize,
    /// Items evicted to make room, deepest first, so applying them in order
    /// only ever moves an item onto cells already vacated.
    pub moves: Vec<CascadeMove>,
}

impl CascadeOutcome {
    /// Apply every move plus the pushed item's own placement.
    ///
    /// `item` is added to the list if it is not already in it.
    #[must_use]
    pub fn apply(&self, items: &ItemList, item: &Item) -> ItemList {
        let slots: HashMap<&str, usize> = self.moves.iter().map(|m| (m.id.as_str(), m.slot)).collect();
        let moved: ItemList = items
            .iter()
            .map(|existing| match slots.get(existing.id.as_str()) {
                Some(slot) => existing.clone().at_slot(*slot),
                None => existing.clone(),
            })
            .collect();
        moved.with_item(item.clone().at_slot(self.slot))
    }
}

/// A finished multi-item rearrangement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    pub items: ItemList,
    /// Every cascaded relocation, in application order.
    pub moves: Vec<CascadeMove>,
}

/// Push `item` onto the first page after `from_page` that can hold it,
/// evicting bottom-most items onward as needed.
///
/// `item` may or may not already be in `items`; its current cells, if any,
/// are treated as vacated. Items in `already_moved` are never evicted.
/// Returns `None` when `max_pages` pages past `from_page` cannot absorb the
/// chain, in which case nothing may be applied.
#[must_use]
pub fn move_to_next_page(
    item: &Item,
    from_page: usize,
    items: &ItemList,
    mode: &LayoutMode,
    already_moved: &BTreeSet<ItemId>,
    max_pages: usize,
) -> Option<CascadeOutcome> {
    let grid = *mode.grid();
    let size = item.footprint();
    if !grid.holds(size) {
        debug!(id = %item.id, "item larger than a page; cannot cascade");
        return None;
    }

    let mut sweep = Sweep {
        grid,
        occupancy: Occupancy::from_items(mode, items, |other| other.id != item.id),
        anchors: items
            .iter()
            .filter(|other| other.id != item.id)
            .filter_map(|other| other.slot.map(|slot| (other.id.clone(), (slot, other.footprint()))))
            .collect(),
        visited: already_moved.clone(),
    };
    sweep.visited.insert(item.id.clone());

    let mut pending = vec![(item.id.clone(), size)];
    let mut placed: Vec<CascadeMove> = Vec::new();
    for page in from_page + 1..=from_page.saturating_add(max_pages) {
        let mut carry = Vec::new();
        for (id, size) in pending {
            match sweep.place_on_page(&id, size, page) {
                Some((slot, evicted)) => {
                    placed.push(CascadeMove { id, slot, page });
                    carry.extend(evicted);
                }
                None => carry.push((id, size)),
            }
        }
        pending = carry;
        if pending.is_empty() {
            break;
        }
    }

    if !pending.is_empty() {
        debug!(id = %item.id, from_page, max_pages, stranded = pending.len(), "cascade exhausted page bound");
        return None;
    }

    let own = placed.iter().position(|m| m.id == item.id)?;
    let own = placed.remove(own);
    placed.reverse();
    debug!(id = %item.id, page = own.page, slot = own.slot, cascaded = placed.len(), "cascade resolved");
    Some(CascadeOutcome { slot: own.slot, page: own.page, moves: placed })
}

/// Push `item` past `from_page` and return the rearranged list.
///
/// # Errors
///
/// Returns [`LayoutError::NoFitFound`] when the cascade exhausts its bound.
pub fn relocate(
    item: &Item,
    from_page: usize,
    items: &ItemList,
    mode: &LayoutMode,
    already_moved: &BTreeSet<ItemId>,
    max_pages: usize,
) -> Result<Insertion, LayoutError> {
    let outcome = move_to_next_page(item, from_page, items, mode, already_moved, max_pages)
        .ok_or_else(|| LayoutError::NoFitFound { id: item.id.clone() })?;
    let mut moves = outcome.moves.clone();
    moves.push(CascadeMove { id: item.id.clone(), slot: outcome.slot, page: outcome.page });
    Ok(Insertion { items: outcome.apply(items, item), moves })
}

/// Place `item` with its anchor at `anchor`, pushing every item it lands on
/// to later pages.
///
/// Items in `already_moved` are never evicted by the onward cascades.
///
/// # Errors
///
/// Returns [`LayoutError::NoFitFound`] for `item` when the footprint leaves
/// its page or covers a reserved slot, and for the displaced item when one
/// finds no room within `max_pages`. The input list is never modified.
pub fn insert_at(
    item: &Item,
    anchor: usize,
    items: &ItemList,
    mode: &LayoutMode,
    already_moved: &BTreeSet<ItemId>,
    max_pages: usize,
) -> Result<Insertion, LayoutError> {
    let grid = *mode.grid();
    let size = item.footprint();
    let no_fit = || LayoutError::NoFitFound { id: item.id.clone() };
    if !fits_page(anchor, size, &grid) {
        return Err(no_fit());
    }

    let cells = footprint(anchor, size, &grid);
    let occupancy = Occupancy::from_items(mode, items, |other| other.id != item.id);
    if occupancy.touches_reserved(&cells) {
        return Err(no_fit());
    }
    let victims = victims_in_slot_order(&occupancy.colliding_items(&cells), items);

    let page = grid.page_of(anchor);
    let mut current = items.with_item(item.clone().at_slot(anchor));
    let mut moved = already_moved.clone();
    moved.insert(item.id.clone());
    let mut moves = Vec::new();

    for victim in victims {
        let step = relocate(&victim, page, &current, mode, &moved, max_pages).inspect_err(|e| {
            debug!(error = %e, id = %item.id, anchor, "insert cascade stranded an item");
        })?;
        moved.extend(step.moves.iter().map(|m| m.id.clone()));
        moves.extend(step.moves);
        current = step.items;
    }
    Ok(Insertion { items: current, moves })
}

fn victims_in_slot_order(ids: &BTreeSet<ItemId>, items: &ItemList) -> Vec<Item> {
    let mut victims: Vec<Item> = items.iter().filter(|item| ids.contains(&item.id)).cloned().collect();
    victims.sort_by_key(|item| item.slot);
    victims
}

/// Working state of one cascade.
struct Sweep {
    grid: GridGeometry,
    occupancy: Occupancy,
    /// Current anchor and footprint of every gridded item not in flight.
    anchors: BTreeMap<ItemId, (usize, CellSize)>,
    visited: BTreeSet<ItemId>,
}

impl Sweep {
    /// Fit `id` on `page`, evicting bottom-most items until a window opens.
    ///
    /// On success returns the anchor and the evicted items. On failure every
    /// eviction made for this attempt is undone.
    fn place_on_page(&mut self, id: &str, size: CellSize, page: usize) -> Option<(usize, Vec<(ItemId, CellSize)>)> {
        let mut evicted: Vec<(ItemId, usize, CellSize)> = Vec::new();
        loop {
            if let Some(slot) = self.occupancy.first_fit_on_page(size, page) {
                self.occupancy.claim(id, &footprint(slot, size, &self.grid));
                self.anchors.insert(id.to_string(), (slot, size));
                let carried = evicted.into_iter().map(|(victim, _, size)| (victim, size)).collect();
                return Some((slot, carried));
            }
            let Some(victim) = self.bottom_most(page) else {
                break;
            };
            let Some((anchor, victim_size)) = self.anchors.remove(&victim) else {
                break;
            };
            self.occupancy.release(&victim, &footprint(anchor, victim_size, &self.grid));
            self.visited.insert(victim.clone());
            evicted.push((victim, anchor, victim_size));
        }

        for (victim, anchor, victim_size) in evicted.into_iter().rev() {
            self.occupancy.claim(&victim, &footprint(anchor, victim_size, &self.grid));
            self.visited.remove(&victim);
            self.anchors.insert(victim, (anchor, victim_size));
        }
        None
    }

    /// Lowest unvisited item on `page`: greatest bottom row, then greatest anchor slot.
    fn bottom_most(&self, page: usize) -> Option<ItemId> {
        self.anchors
            .iter()
            .filter(|(id, (slot, _))| self.grid.page_of(*slot) == page && !self.visited.contains(*id))
            .max_by_key(|(_, (slot, size))| {
                let (row, _) = self.grid.local(*slot);
                (row + size.height.max(1) - 1, *slot)
            })
            .map(|(id, _)| id.clone())
    }
}
