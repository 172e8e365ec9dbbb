use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;
use crate::geometry::GridGeometry;
use crate::item::CellSize;
use crate::occupancy::validate;

fn grid(columns: usize, rows: usize) -> GridGeometry {
    GridGeometry::new(columns, rows, 100.0, 10.0).unwrap()
}

fn slot_of(list: &ItemList, id: &str) -> Option<usize> {
    list.get(id).and_then(|item| item.slot)
}

fn random_items(rng: &mut StdRng, count: usize, max_slot: usize) -> ItemList {
    (0..count)
        .map(|i| {
            let item = if rng.random_bool(0.3) {
                Item::widget(format!("w{i}"), CellSize::new(rng.random_range(1..=4), rng.random_range(1..=3)))
            } else {
                Item::app(format!("a{i}"))
            };
            match rng.random_range(0..4) {
                0 => item,
                1 => item.in_dock(rng.random_range(0..6)),
                _ => item.at_slot(rng.random_range(0..max_slot)),
            }
        })
        .collect()
}

// =============================================================
// assign
// =============================================================

#[test]
fn assign_places_widget_before_apps() {
    let mode = LayoutMode::spacious(grid(3, 3));
    let mut items: Vec<Item> = (1..=5).map(|i| Item::app(format!("a{i}"))).collect();
    items.push(Item::widget("w", CellSize::new(2, 2)));

    let placed = assign(&ItemList::new(items), &mode);

    assert_eq!(slot_of(&placed, "w"), Some(0));
    let apps: Vec<Option<usize>> = (1..=5).map(|i| slot_of(&placed, &format!("a{i}"))).collect();
    assert_eq!(apps, vec![Some(2), Some(5), Some(6), Some(7), Some(8)]);
    assert!(validate(&placed, &mode).is_empty());
}

#[test]
fn assign_keeps_existing_positions() {
    let mode = LayoutMode::spacious(grid(3, 3));
    let items = ItemList::new(vec![Item::app("x").at_slot(0), Item::app("y")]);
    let placed = assign(&items, &mode);
    assert_eq!(slot_of(&placed, "x"), Some(0));
    assert_eq!(slot_of(&placed, "y"), Some(1));
}

#[test]
fn assign_skips_reserved_leading_slot() {
    let mode = LayoutMode::Spacious { grid: grid(3, 3), reserved_leading: 1 };
    let placed = assign(&ItemList::new(vec![Item::app("a"), Item::app("b")]), &mode);
    assert_eq!(slot_of(&placed, "a"), Some(1));
    assert_eq!(slot_of(&placed, "b"), Some(2));
}

#[test]
fn assign_spills_onto_next_page() {
    let mode = LayoutMode::spacious(grid(2, 2));
    let items: ItemList = (0..5).map(|i| Item::app(format!("a{i}"))).collect();
    let placed = assign(&items, &mode);
    assert_eq!(slot_of(&placed, "a4"), Some(4));
    assert!(validate(&placed, &mode).is_empty());
}

#[test]
fn assign_settles_dock_before_grid() {
    let mode = LayoutMode::compact(grid(4, 6));
    let items = ItemList::new(vec![Item::app("a").in_dock(0), Item::app("b").in_dock(0), Item::app("c")]);

    let placed = assign(&items, &mode);

    assert_eq!(placed.get("a").unwrap().dock, Some(0));
    assert_eq!(placed.get("b").unwrap().dock, None);
    assert_eq!(slot_of(&placed, "b"), Some(0));
    assert_eq!(slot_of(&placed, "c"), Some(1));
    assert!(validate(&placed, &mode).is_empty());
}

// =============================================================
// repair
// =============================================================

#[test]
fn repair_relocates_page_overflow() {
    let mode = LayoutMode::spacious(grid(3, 3));
    let items = ItemList::new(vec![Item::app("a").at_slot(0), Item::widget("w", CellSize::new(2, 2)).at_slot(7)]);

    let repaired = repair(&items, &mode);

    assert_eq!(slot_of(&repaired, "a"), Some(0));
    assert_eq!(slot_of(&repaired, "w"), Some(1));
    assert!(validate(&repaired, &mode).is_empty());
}

#[test]
fn repair_contested_slot_goes_to_earlier_item() {
    let mode = LayoutMode::spacious(grid(3, 3));
    let items = ItemList::new(vec![Item::app("a").at_slot(3), Item::app("b").at_slot(3)]);

    let repaired = repair(&items, &mode);

    assert_eq!(slot_of(&repaired, "a"), Some(3));
    assert_eq!(slot_of(&repaired, "b"), Some(0));
}

#[test]
fn repair_keeps_input_order() {
    let mode = LayoutMode::spacious(grid(3, 3));
    let items = ItemList::new(vec![Item::app("b").at_slot(5), Item::app("a").at_slot(1), Item::app("c")]);
    let repaired = repair(&items, &mode);
    let ids: Vec<&str> = repaired.iter().map(|item| item.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a", "c"]);
    assert_eq!(slot_of(&repaired, "c"), Some(0));
}

#[test]
fn repair_moves_item_off_reserved_slot() {
    let mode = LayoutMode::Spacious { grid: grid(3, 3), reserved_leading: 1 };
    let repaired = repair(&ItemList::new(vec![Item::app("a").at_slot(0)]), &mode);
    assert_eq!(slot_of(&repaired, "a"), Some(1));
}

#[test]
fn repair_of_valid_layout_is_unchanged() {
    let mode = LayoutMode::spacious(grid(3, 3));
    let items = ItemList::new(vec![
        Item::widget("w", CellSize::new(2, 2)).at_slot(0),
        Item::app("a").at_slot(2),
        Item::app("b").at_slot(12),
    ]);
    assert_eq!(repair(&items, &mode), items);
}

#[test]
fn repair_treats_unaddressable_slot_as_unplaced() {
    let mode = LayoutMode::Spacious { grid: grid(4, 4), reserved_leading: 1 };
    let items = ItemList::new(vec![Item::app("a").at_slot(usize::MAX), Item::app("b")]);
    let repaired = repair(&items, &mode);
    assert_eq!(slot_of(&repaired, "a"), Some(1));
    assert_eq!(slot_of(&repaired, "b"), Some(2));
    assert_eq!(validate(&repaired, &mode), Vec::new());
}

#[test]
fn repair_always_yields_valid_spacious_layout() {
    let mode = LayoutMode::Spacious { grid: grid(4, 3), reserved_leading: 1 };
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..200 {
        let items = random_items(&mut rng, 24, 40);
        let repaired = repair(&items, &mode);
        assert_eq!(validate(&repaired, &mode), Vec::new(), "input: {items:?}");
        assert_eq!(repair(&repaired, &mode), repaired);
    }
}

#[test]
fn repair_always_yields_valid_compact_layout() {
    let mode = LayoutMode::compact(grid(4, 5));
    let mut rng = StdRng::seed_from_u64(29);
    for _ in 0..200 {
        let items = random_items(&mut rng, 20, 50);
        let repaired = repair(&items, &mode);
        assert_eq!(validate(&repaired, &mode), Vec::new(), "input: {items:?}");
    }
}
