//! Item model: launcher apps and widgets, the immutable item list, and the
//! persisted record shape.
//!
//! The engine never mutates a list in place. Every operation takes an
//! [`ItemList`] and hands back a new one, so a gesture can always be rolled
//! back by keeping the list it started from.
//!
//! Persisted records come from an untrusted store. [`ItemRecord`] decodes
//! leniently: any field that is missing or malformed becomes `None` and the
//! item is treated as unplaced until a repair pass assigns it.

#[cfg(test)]
#[path = "item_test.rs"]
mod item_test;

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::consts::DEFAULT_WIDGET_SIZE;
use crate::error::LayoutError;
use crate::geometry::LayoutMode;

/// Stable unique identifier of an item.
pub type ItemId = String;

/// Launcher icon or widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Fixed 1×1 launcher icon; may live in the dock on compact layouts.
    App,
    /// Resizable tile; never docked.
    Widget,
}

/// Footprint in whole grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellSize {
    pub width: usize,
    pub height: usize,
}

impl CellSize {
    pub const ONE: Self = Self { width: 1, height: 1 };

    #[must_use]
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Number of cells covered.
    #[must_use]
    pub fn area(self) -> usize {
        self.width * self.height
    }

    /// Clamp each axis into `[min, max]`. `max` wins when the bounds cross.
    #[must_use]
    pub fn clamp(self, min: Self, max: Self) -> Self {
        Self {
            width: self.width.max(min.width).min(max.width),
            height: self.height.max(min.height).min(max.height),
        }
    }
}

/// A launcher icon or widget with its current placement.
///
/// `slot` and `dock` are mutually exclusive once a layout pass has run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    pub kind: ItemKind,
    pub size: CellSize,
    /// Global anchor slot; `None` means unplaced.
    pub slot: Option<usize>,
    /// Dock position on compact layouts.
    pub dock: Option<usize>,
}

impl Item {
    /// An unplaced 1×1 app.
    #[must_use]
    pub fn app(id: impl Into<ItemId>) -> Self {
        Self { id: id.into(), kind: ItemKind::App, size: CellSize::ONE, slot: None, dock: None }
    }

    /// An unplaced widget of the given size.
    #[must_use]
    pub fn widget(id: impl Into<ItemId>, size: CellSize) -> Self {
        Self { id: id.into(), kind: ItemKind::Widget, size, slot: None, dock: None }
    }

    /// Same item anchored at `slot` and out of the dock.
    #[must_use]
    pub fn at_slot(mut self, slot: usize) -> Self {
        self.slot = Some(slot);
        self.dock = None;
        self
    }

    /// Same item in dock position `index` and off the grid.
    #[must_use]
    pub fn in_dock(mut self, index: usize) -> Self {
        self.dock = Some(index);
        self.slot = None;
        self
    }

    /// Same item with no placement.
    #[must_use]
    pub fn unplaced(mut self) -> Self {
        self.slot = None;
        self.dock = None;
        self
    }

    /// Grid footprint; apps are always 1×1 regardless of the stored size.
    #[must_use]
    pub fn footprint(&self) -> CellSize {
        match self.kind {
            ItemKind::App => CellSize::ONE,
            ItemKind::Widget => self.size,
        }
    }

    #[must_use]
    pub fn is_placed(&self) -> bool {
        self.slot.is_some() || self.dock.is_some()
    }

    /// Renormalize this item for a layout mode.
    ///
    /// Apps become 1×1. Widget sizes are clamped to the mode's bounds and lose
    /// any dock index. Dock indices are dropped on layouts without a dock and
    /// when out of range; a valid dock index clears the slot.
    #[must_use]
    pub fn normalized(&self, mode: &LayoutMode) -> Self {
        let mut item = self.clone();
        match item.kind {
            ItemKind::App => item.size = CellSize::ONE,
            ItemKind::Widget => {
                let (min, max) = mode.widget_bounds();
                item.size = item.size.clamp(min, max);
                item.dock = None;
            }
        }
        if item.dock.is_some_and(|index| index >= mode.dock_slots()) {
            item.dock = None;
        }
        if item.dock.is_some() || item.slot.is_some_and(|slot| !mode.grid().addressable(slot)) {
            item.slot = None;
        }
        item
    }
}

/// Ordered, immutable list of items. Order is input order and is preserved
/// by every layout pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemList {
    items: Vec<Item>,
}

impl ItemList {
    #[must_use]
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Item] {
        &self.items
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Item> {
        self.items
    }

    /// Look up an item by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Copy with `item` replacing the entry of the same id, or appended.
    #[must_use]
    pub fn with_item(&self, item: Item) -> Self {
        let mut items = self.items.clone();
        match items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => *existing = item,
            None => items.push(item),
        }
        Self { items }
    }

    /// Copy without the item of the given id.
    #[must_use]
    pub fn without(&self, id: &str) -> Self {
        Self { items: self.items.iter().filter(|item| item.id != id).cloned().collect() }
    }

    /// Copy with every item renormalized for `mode`.
    #[must_use]
    pub fn normalized(&self, mode: &LayoutMode) -> Self {
        self.items.iter().map(|item| item.normalized(mode)).collect()
    }

    /// Build from persisted records. Later records repeating an id are dropped.
    #[must_use]
    pub fn from_records(records: Vec<ItemRecord>) -> Self {
        let mut seen = HashSet::new();
        let mut items = Vec::with_capacity(records.len());
        for record in records {
            if !seen.insert(record.id.clone()) {
                warn!(id = %record.id, "duplicate item record dropped");
                continue;
            }
            items.push(record.into_item());
        }
        Self { items }
    }

    /// Decode a JSON array of persisted records.
    ///
    /// Array elements that are not records (e.g. missing `id`) are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Decode`] when the input is not a JSON array.
    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        let raw: Vec<serde_json::Value> = serde_json::from_str(json)?;
        let mut records = Vec::with_capacity(raw.len());
        for value in raw {
            match serde_json::from_value::<ItemRecord>(value) {
                Ok(record) => records.push(record),
                Err(e) => warn!(error = %e, "unreadable item record skipped"),
            }
        }
        Ok(Self::from_records(records))
    }

    /// Records for the persistence collaborator.
    #[must_use]
    pub fn to_records(&self) -> Vec<ItemRecord> {
        self.items.iter().map(ItemRecord::from).collect()
    }

    /// Encode as a JSON array of records.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Decode`] if serialization fails.
    pub fn to_json(&self) -> Result<String, LayoutError> {
        Ok(serde_json::to_string(&self.to_records())?)
    }
}

impl FromIterator<Item> for ItemList {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        Self { items: iter.into_iter().collect() }
    }
}

impl<'a> IntoIterator for &'a ItemList {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// An item as stored by the persistence collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub id: ItemId,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ItemKind>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub slot_index: Option<usize>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub dock_index: Option<usize>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub size: Option<CellSize>,
}

impl ItemRecord {
    /// Convert to an item. A missing kind is inferred from the presence of a size.
    #[must_use]
    pub fn into_item(self) -> Item {
        let kind = self
            .kind
            .unwrap_or(if self.size.is_some() { ItemKind::Widget } else { ItemKind::App });
        let size = match kind {
            ItemKind::App => CellSize::ONE,
            ItemKind::Widget => self.size.unwrap_or(DEFAULT_WIDGET_SIZE),
        };
        Item { id: self.id, kind, size, slot: self.slot_index, dock: self.dock_index }
    }
}

impl From<&Item> for ItemRecord {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id.clone(),
            kind: Some(item.kind),
            slot_index: item.slot,
            dock_index: item.dock,
            size: match item.kind {
                ItemKind::App => None,
                ItemKind::Widget => Some(item.size),
            },
        }
    }
}

/// Decode a field, mapping any malformed value to `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match serde_json::from_value(value) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(_) => Ok(None),
    }
}
