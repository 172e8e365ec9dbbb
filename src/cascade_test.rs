use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;
use crate::occupancy::validate;
use crate::placement::repair;

fn spacious(columns: usize, rows: usize) -> LayoutMode {
    LayoutMode::spacious(GridGeometry::new(columns, rows, 100.0, 10.0).unwrap())
}

fn apps_at(slots: &[usize]) -> Vec<Item> {
    slots.iter().map(|slot| Item::app(format!("s{slot}")).at_slot(*slot)).collect()
}

fn mv(id: &str, slot: usize, page: usize) -> CascadeMove {
    CascadeMove { id: id.into(), slot, page }
}

fn none_moved() -> BTreeSet<ItemId> {
    BTreeSet::new()
}

// =============================================================
// move_to_next_page
// =============================================================

#[test]
fn empty_next_page_takes_item_directly() {
    let mode = spacious(3, 3);
    let items = ItemList::new(apps_at(&[0, 1, 2]));
    let item = Item::app("x").at_slot(0);

    let outcome = move_to_next_page(&item, 0, &items, &mode, &none_moved(), 10).unwrap();

    assert_eq!(outcome.slot, 9);
    assert_eq!(outcome.page, 1);
    assert!(outcome.moves.is_empty());
}

#[test]
fn full_page_gives_up_bottom_right_item() {
    let mode = spacious(2, 2);
    let items = ItemList::new(apps_at(&[4, 5, 6, 7]));
    let item = Item::app("x");

    let outcome = move_to_next_page(&item, 0, &items, &mode, &none_moved(), 10).unwrap();

    assert_eq!(outcome.slot, 7);
    assert_eq!(outcome.page, 1);
    assert_eq!(outcome.moves, vec![mv("s7", 8, 2)]);
}

#[test]
fn chained_evictions_are_listed_deepest_first() {
    let mode = spacious(2, 2);
    let items = ItemList::new(apps_at(&[4, 5, 6, 7, 8, 9, 10, 11]));
    let item = Item::app("x");

    let outcome = move_to_next_page(&item, 0, &items, &mode, &none_moved(), 10).unwrap();

    assert_eq!(outcome.slot, 7);
    assert_eq!(outcome.moves, vec![mv("s11", 12, 3), mv("s7", 11, 2)]);

    let applied = outcome.apply(&items, &item);
    assert!(validate(&applied, &mode).is_empty());
    assert_eq!(applied.get("x").unwrap().slot, Some(7));
}

#[test]
fn already_moved_items_are_never_evicted() {
    let mode = spacious(2, 2);
    let items = ItemList::new(apps_at(&[4, 5, 6, 7]));
    let moved: BTreeSet<ItemId> = ["s4", "s5", "s6", "s7"].iter().map(|id| (*id).to_string()).collect();

    let outcome = move_to_next_page(&Item::app("x"), 0, &items, &mode, &moved, 10).unwrap();

    assert_eq!(outcome.slot, 8);
    assert_eq!(outcome.page, 2);
    assert!(outcome.moves.is_empty());
}

#[test]
fn failed_page_restores_its_evictions() {
    let mode = spacious(2, 2);
    let items = ItemList::new(apps_at(&[4, 5, 6, 7]));
    let moved: BTreeSet<ItemId> = BTreeSet::from(["s5".to_string()]);
    let widget = Item::widget("w", CellSize::new(2, 2));

    let outcome = move_to_next_page(&widget, 0, &items, &mode, &moved, 10).unwrap();

    assert_eq!(outcome.slot, 8);
    assert!(outcome.moves.is_empty());
    let applied = outcome.apply(&items, &widget);
    assert!(validate(&applied, &mode).is_empty());
}

#[test]
fn page_bound_exhaustion_returns_none() {
    let mode = spacious(2, 2);
    let items = ItemList::new(vec![Item::widget("big", CellSize::new(2, 2)).at_slot(4)]);
    let item = Item::app("x");

    assert!(move_to_next_page(&item, 0, &items, &mode, &none_moved(), 1).is_none());
    assert!(move_to_next_page(&item, 0, &items, &mode, &none_moved(), 2).is_some());
}

#[test]
fn zero_page_bound_never_moves() {
    let mode = spacious(3, 3);
    assert!(move_to_next_page(&Item::app("x"), 0, &ItemList::default(), &mode, &none_moved(), 0).is_none());
}

#[test]
fn footprint_larger_than_page_cannot_cascade() {
    let mode = spacious(2, 2);
    let item = Item::widget("huge", CellSize::new(3, 1));
    assert!(move_to_next_page(&item, 0, &ItemList::default(), &mode, &none_moved(), 10).is_none());
}

#[test]
fn item_own_cells_count_as_vacated() {
    let mode = spacious(2, 2);
    let items = ItemList::new(apps_at(&[4, 5, 6]));
    let item = Item::app("s6");

    let outcome = move_to_next_page(&item, 0, &items, &mode, &none_moved(), 10).unwrap();

    assert_eq!(outcome.slot, 6);
    assert!(outcome.moves.is_empty());
}

#[test]
fn cascades_on_random_layouts_stay_valid() {
    let mode = LayoutMode::Spacious { grid: GridGeometry::new(3, 3, 100.0, 10.0).unwrap(), reserved_leading: 1 };
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..200 {
        let raw: ItemList = (0..30)
            .map(|i| {
                let item = if rng.random_bool(0.3) {
                    Item::widget(format!("w{i}"), CellSize::new(rng.random_range(1..=3), rng.random_range(1..=3)))
                } else {
                    Item::app(format!("a{i}"))
                };
                item.at_slot(rng.random_range(0..45))
            })
            .collect();
        let items = repair(&raw, &mode);
        let pick = items.as_slice()[rng.random_range(0..items.len())].clone();
        let from_page = mode.grid().page_of(pick.slot.unwrap());

        if let Some(outcome) = move_to_next_page(&pick, from_page, &items, &mode, &none_moved(), 3) {
            assert!(outcome.page > from_page);
            let applied = outcome.apply(&items, &pick);
            assert_eq!(validate(&applied, &mode), Vec::new(), "items: {items:?}, pick: {}", pick.id);
        }
    }
}

// =============================================================
// relocate / insert_at
// =============================================================

#[test]
fn relocate_reports_every_move_in_order() {
    let mode = spacious(2, 2);
    let items = ItemList::new(apps_at(&[0, 4, 5, 6, 7]));
    let item = items.get("s0").unwrap().clone();

    let insertion = relocate(&item, 0, &items, &mode, &none_moved(), 10).unwrap();

    assert_eq!(insertion.moves, vec![mv("s7", 8, 2), mv("s0", 7, 1)]);
    assert_eq!(insertion.items.get("s0").unwrap().slot, Some(7));
    assert!(validate(&insertion.items, &mode).is_empty());
}

#[test]
fn relocate_failure_is_no_fit_found() {
    let mode = spacious(2, 2);
    let items = ItemList::new(vec![Item::widget("big", CellSize::new(2, 2)).at_slot(4)]);
    let err = relocate(&Item::app("x"), 0, &items, &mode, &none_moved(), 1).unwrap_err();
    assert!(matches!(err, LayoutError::NoFitFound { id } if id == "x"));
}

#[test]
fn insert_pushes_bottom_right_app_to_next_page() {
    let mode = spacious(3, 3);
    let items = ItemList::new(apps_at(&[0, 1, 2, 3, 6, 8]));
    let widget = Item::widget("w", CellSize::new(2, 2));

    let insertion = insert_at(&widget, 4, &items, &mode, &none_moved(), 10).unwrap();

    assert_eq!(insertion.moves, vec![mv("s8", 9, 1)]);
    assert_eq!(insertion.items.get("w").unwrap().slot, Some(4));
    assert_eq!(insertion.items.get("s8").unwrap().slot, Some(9));
    assert!(validate(&insertion.items, &mode).is_empty());
}

#[test]
fn insert_into_full_page_moves_every_covered_item() {
    let mode = spacious(3, 3);
    let items = ItemList::new(apps_at(&[0, 1, 2, 3, 4, 5, 6, 7, 8]));
    let widget = Item::widget("w", CellSize::new(2, 2));

    let insertion = insert_at(&widget, 4, &items, &mode, &none_moved(), 10).unwrap();

    assert_eq!(
        insertion.moves,
        vec![mv("s4", 9, 1), mv("s5", 10, 1), mv("s7", 11, 1), mv("s8", 12, 1)]
    );
    assert!(validate(&insertion.items, &mode).is_empty());
}

#[test]
fn insert_into_free_window_moves_nothing() {
    let mode = spacious(3, 3);
    let items = ItemList::new(apps_at(&[0]));
    let insertion = insert_at(&Item::app("x"), 4, &items, &mode, &none_moved(), 10).unwrap();
    assert!(insertion.moves.is_empty());
    assert_eq!(insertion.items.get("x").unwrap().slot, Some(4));
}

#[test]
fn insert_rejects_footprint_leaving_page() {
    let mode = spacious(3, 3);
    let err = insert_at(&Item::widget("w", CellSize::new(2, 2)), 7, &ItemList::default(), &mode, &none_moved(), 10)
        .unwrap_err();
    assert!(matches!(err, LayoutError::NoFitFound { .. }));
}

#[test]
fn insert_rejects_reserved_slot() {
    let mode = LayoutMode::Spacious { grid: GridGeometry::new(3, 3, 100.0, 10.0).unwrap(), reserved_leading: 1 };
    let result = insert_at(&Item::app("x"), 0, &ItemList::default(), &mode, &none_moved(), 10);
    assert!(result.is_err());
}

#[test]
fn insert_with_exhausted_cascade_names_stranded_item() {
    let mode = spacious(3, 3);
    let items = ItemList::new(apps_at(&[0, 1, 2, 3, 4, 5, 6, 7, 8]));
    let err = insert_at(&Item::widget("w", CellSize::new(2, 2)), 4, &items, &mode, &none_moved(), 0).unwrap_err();
    assert!(matches!(err, LayoutError::NoFitFound { id } if id == "s4"));
}

#[test]
fn insert_rejects_unaddressable_anchor() {
    let mode = spacious(3, 3);
    let err = insert_at(&Item::app("x"), usize::MAX, &ItemList::default(), &mode, &none_moved(), 10).unwrap_err();
    assert!(matches!(err, LayoutError::NoFitFound { id } if id == "x"));
}

#[test]
fn apply_adds_missing_item() {
    let outcome = CascadeOutcome { slot: 9, page: 1, moves: vec![mv("a", 10, 1)] };
    let items = ItemList::new(vec![Item::app("a").at_slot(9)]);
    let applied = outcome.apply(&items, &Item::app("x"));
    assert_eq!(applied.get("a").unwrap().slot, Some(10));
    assert_eq!(applied.get("x").unwrap().slot, Some(9));
}
