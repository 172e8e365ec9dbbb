use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::cascade::insert_at;
use crate::config::EngineConfig;
use crate::drag::{DragOutcome, DragSession, DropTarget};
use crate::error::LayoutError;
use crate::geometry::{DeviceClass, LayoutMode, Viewport};
use crate::gesture::{GestureState, Key, Point, RejectReason, SessionId};
use crate::item::{Item, ItemId, ItemList, ItemRecord};
use crate::occupancy::validate;
use crate::packer::pack;
use crate::placement::{assign, repair};
use crate::resize::{ResizeEdge, ResizeOutcome, ResizeSession};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from engine inputs for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The arrangement changed; render and persist this list.
    ItemsChanged(ItemList),
    /// A gesture started.
    GestureStarted { session: SessionId, id: ItemId },
    /// Unsnapped resize proposal to draw under the pointer.
    ResizePreview { id: ItemId, width: f64, height: f64 },
    /// A gesture ended without changing the arrangement.
    GestureRejected { id: ItemId, reason: RejectReason },
    RenderNeeded,
}

/// Slot engine state: the current layout, the item list, and the single
/// active gesture.
///
/// The item list is replaced wholesale on every change and is never touched
/// while a gesture is active, so rolling back is restoring the gesture's
/// starting list.
pub struct Engine {
    pub config: EngineConfig,
    pub viewport: Viewport,
    pub device: DeviceClass,
    mode: LayoutMode,
    items: ItemList,
    gesture: GestureState,
}

impl Engine {
    #[must_use]
    pub fn new(config: EngineConfig, viewport: Viewport, device: DeviceClass) -> Self {
        let mode = config.resolver().resolve(viewport, device);
        Self { config, viewport, device, mode, items: ItemList::default(), gesture: GestureState::Idle }
    }

    // --- Data inputs ---

    /// Replace the item list with persisted records, repairing every index.
    pub fn load_records(&mut self, records: Vec<ItemRecord>) -> Vec<Action> {
        self.load_items(ItemList::from_records(records))
    }

    /// Replace the item list from a persisted JSON array.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Decode`] when `json` is not an array; the
    /// current list is kept.
    pub fn load_json(&mut self, json: &str) -> Result<Vec<Action>, LayoutError> {
        let items = ItemList::from_json(json)?;
        Ok(self.load_items(items))
    }

    /// Replace the item list, repairing every index.
    pub fn load_items(&mut self, items: ItemList) -> Vec<Action> {
        let mut actions = self.abort_gesture(RejectReason::Superseded);
        self.items = self.settle(&items);
        info!(count = self.items.len(), compact = self.mode.is_compact(), "items loaded");
        actions.extend(self.changed());
        actions
    }

    /// Recompute geometry. A changed layout cancels any gesture and re-runs
    /// the full repair (spacious) or pack (compact) pass.
    pub fn set_viewport(&mut self, viewport: Viewport, device: DeviceClass) -> Vec<Action> {
        self.viewport = viewport;
        self.device = device;
        let mode = self.config.resolver().resolve(viewport, device);
        if mode == self.mode {
            return Vec::new();
        }

        let mut actions = self.abort_gesture(RejectReason::Superseded);
        let grid = mode.grid();
        info!(
            columns = grid.columns(),
            rows = grid.rows(),
            compact = mode.is_compact(),
            "layout geometry changed"
        );
        self.mode = mode;
        self.items = self.settle(&self.items);
        actions.extend(self.changed());
        actions
    }

    /// Add an item at the first free window (or its dock index on compact
    /// layouts). Ids already present are ignored.
    pub fn add_item(&mut self, item: Item) -> Vec<Action> {
        if self.items.contains(&item.id) {
            warn!(id = %item.id, "item already present; add ignored");
            return Vec::new();
        }
        let mut actions = self.abort_gesture(RejectReason::Superseded);
        let assigned = assign(&self.items.with_item(item), &self.mode);
        actions.extend(self.commit(assigned));
        actions
    }

    /// Add or move an item to a requested anchor, pushing whatever it lands
    /// on to later pages.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::NoFitFound`] when the footprint cannot sit at
    /// `slot` or the cascade runs out of pages; nothing changes.
    pub fn add_item_at(&mut self, item: Item, slot: usize) -> Result<Vec<Action>, LayoutError> {
        let item = item.normalized(&self.mode);
        let insertion =
            insert_at(&item, slot, &self.items, &self.mode, &BTreeSet::new(), self.config.max_cascade_pages)?;
        debug!(id = %item.id, slot, cascaded = insertion.moves.len(), "item inserted");
        let mut actions = self.abort_gesture(RejectReason::Superseded);
        actions.extend(self.commit(insertion.items));
        Ok(actions)
    }

    /// Remove an item. Unknown ids are ignored.
    pub fn remove_item(&mut self, id: &str) -> Vec<Action> {
        if !self.items.contains(id) {
            return Vec::new();
        }
        let mut actions = self.abort_gesture(RejectReason::Superseded);
        let remaining = self.items.without(id);
        actions.extend(self.commit(remaining));
        actions
    }

    // --- Gestures ---

    /// Start dragging an item, superseding any active gesture.
    pub fn begin_drag(&mut self, item_id: &str) -> Vec<Action> {
        let mut actions = self.abort_gesture(RejectReason::Superseded);
        let session = SessionId::new_v4();
        match DragSession::begin(session, &self.items, &self.mode, item_id) {
            Some(drag) => {
                actions.push(Action::GestureStarted { session, id: drag.item_id.clone() });
                self.gesture = GestureState::Dragging(drag);
            }
            None => debug!(item_id, "drag not started"),
        }
        actions
    }

    /// Finish a drag on `target`.
    pub fn end_drag(&mut self, session: SessionId, target: DropTarget) -> Vec<Action> {
        let Some(state) = self.claim_session(session) else {
            return Vec::new();
        };
        let GestureState::Dragging(drag) = state else {
            self.gesture = state;
            return Vec::new();
        };

        let id = drag.item_id.clone();
        match drag.drop_on(target, &self.items, self.config.max_cascade_pages) {
            DragOutcome::Rejected { items, reason } => self.roll_back(id, items, reason),
            outcome => {
                debug!(%id, ?outcome, "drop resolved");
                let items = outcome.items().clone();
                self.commit(items)
            }
        }
    }

    /// Start resizing a widget from `edge`, superseding any active gesture.
    /// Compact layouts never start a resize.
    pub fn begin_resize(&mut self, item_id: &str, edge: ResizeEdge, pointer: Point) -> Vec<Action> {
        let mut actions = self.abort_gesture(RejectReason::Superseded);
        let session = SessionId::new_v4();
        match ResizeSession::begin(session, &self.items, &self.mode, item_id, edge, pointer) {
            Some(resize) => {
                actions.push(Action::GestureStarted { session, id: resize.item_id.clone() });
                self.gesture = GestureState::Resizing(resize);
            }
            None => debug!(item_id, "resize not started"),
        }
        actions
    }

    /// Track the pointer during a resize.
    pub fn resize_move(&mut self, session: SessionId, pointer: Point) -> Vec<Action> {
        if self.gesture.session() != Some(session) {
            debug!(%session, "stale resize move ignored");
            return Vec::new();
        }
        let GestureState::Resizing(resize) = &mut self.gesture else {
            return Vec::new();
        };
        let proposal = resize.on_move(pointer);
        vec![
            Action::ResizePreview { id: resize.item_id.clone(), width: proposal.width, height: proposal.height },
            Action::RenderNeeded,
        ]
    }

    /// Finish a resize: commit, cascade, or roll back.
    pub fn resize_release(&mut self, session: SessionId) -> Vec<Action> {
        let Some(state) = self.claim_session(session) else {
            return Vec::new();
        };
        let GestureState::Resizing(resize) = state else {
            self.gesture = state;
            return Vec::new();
        };

        let id = resize.item_id.clone();
        match resize.release(&self.items, self.config.max_cascade_pages) {
            ResizeOutcome::Committed { items, size, slot, moves } => {
                debug!(%id, width = size.width, height = size.height, slot, cascaded = moves.len(), "resize committed");
                self.commit(items)
            }
            ResizeOutcome::RolledBack { items, reason } => self.roll_back(id, items, reason),
        }
    }

    /// Cancel a gesture by session id.
    pub fn cancel(&mut self, session: SessionId) -> Vec<Action> {
        if self.gesture.session() != Some(session) {
            return Vec::new();
        }
        debug!(%session, item = ?self.gesture.item_id(), "gesture cancelled");
        self.abort_gesture(RejectReason::Cancelled)
    }

    /// Keyboard input. Escape cancels the active gesture.
    pub fn on_key_down(&mut self, key: &Key) -> Vec<Action> {
        if key.is_escape() {
            return self.abort_gesture(RejectReason::Cancelled);
        }
        Vec::new()
    }

    // --- Queries ---

    #[must_use]
    pub fn items(&self) -> &ItemList {
        &self.items
    }

    #[must_use]
    pub fn mode(&self) -> &LayoutMode {
        &self.mode
    }

    #[must_use]
    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.get(id)
    }

    /// Session id of the active gesture, if any.
    #[must_use]
    pub fn active_session(&self) -> Option<SessionId> {
        self.gesture.session()
    }

    /// Records for the persistence collaborator.
    #[must_use]
    pub fn records(&self) -> Vec<ItemRecord> {
        self.items.to_records()
    }

    // --- Internals ---

    fn settle(&self, items: &ItemList) -> ItemList {
        match self.mode {
            LayoutMode::Compact { .. } => pack(items, &self.mode),
            LayoutMode::Spacious { .. } => repair(items, &self.mode),
        }
    }

    /// Install a new list. Compact layouts are re-packed; a list that still
    /// breaks an invariant is repaired before it is kept.
    fn commit(&mut self, items: ItemList) -> Vec<Action> {
        let items = match self.mode {
            LayoutMode::Compact { .. } => pack(&items, &self.mode),
            LayoutMode::Spacious { .. } => items,
        };
        let violations = validate(&items, &self.mode);
        self.items = if violations.is_empty() {
            items
        } else {
            warn!(?violations, "layout invariants violated; repairing");
            repair(&items, &self.mode)
        };
        self.changed()
    }

    fn changed(&self) -> Vec<Action> {
        vec![Action::ItemsChanged(self.items.clone()), Action::RenderNeeded]
    }

    fn roll_back(&mut self, id: ItemId, items: ItemList, reason: RejectReason) -> Vec<Action> {
        debug!(%id, ?reason, "gesture rolled back");
        self.items = items;
        vec![Action::GestureRejected { id, reason }, Action::RenderNeeded]
    }

    /// Take the active gesture if `session` matches it.
    fn claim_session(&mut self, session: SessionId) -> Option<GestureState> {
        if self.gesture.session() != Some(session) {
            debug!(%session, "stale gesture event ignored");
            return None;
        }
        Some(std::mem::take(&mut self.gesture))
    }

    /// End the active gesture, if any, restoring its starting list.
    fn abort_gesture(&mut self, reason: RejectReason) -> Vec<Action> {
        match std::mem::take(&mut self.gesture) {
            GestureState::Idle => Vec::new(),
            GestureState::Dragging(drag) => {
                let id = drag.item_id.clone();
                let items = drag.cancel().items().clone();
                self.roll_back(id, items, reason)
            }
            GestureState::Resizing(resize) => {
                let id = resize.item_id.clone();
                match resize.cancel() {
                    ResizeOutcome::RolledBack { items, .. } | ResizeOutcome::Committed { items, .. } => {
                        self.roll_back(id, items, reason)
                    }
                }
            }
        }
    }
}
