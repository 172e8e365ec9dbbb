//! Slot allocation engine for a paginated launcher grid.
//!
//! The crate decides where launcher apps and resizable widgets live on a grid
//! of fixed-size cells split into pages, and how that arrangement changes when
//! the viewport changes, items are added or removed, or the user drags or
//! resizes something. It has no rendering, storage, or DOM code: the host
//! feeds viewport changes, item lists, and pointer/keyboard gestures into
//! [`engine::Engine`] and applies the resulting [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level [`engine::Engine`] wiring inputs to layout passes |
//! | [`geometry`] | Viewport → grid geometry and the two layout modes |
//! | [`item`] | Item model, immutable item list, persisted records |
//! | [`occupancy`] | Footprints, slot → owner map, invariant checks |
//! | [`placement`] | First-fit assignment and repair of stale indices |
//! | [`packer`] | Full compact re-flow after structural changes |
//! | [`cascade`] | Bounded push of items onto later pages |
//! | [`drag`] | Drop target resolution: move, swap, displace, reject |
//! | [`resize`] | Widget resize with snap, anchor correction, rollback |
//! | [`gesture`] | Pointer/key types and the active-gesture state |
//! | [`config`] | Tunables loaded from the environment |
//! | [`error`] | Error taxonomy and invariant violations |
//! | [`consts`] | Shared numeric constants (dock size, widget bounds, etc.) |

pub mod cascade;
pub mod config;
pub mod consts;
pub mod drag;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod item;
pub mod occupancy;
pub mod packer;
pub mod placement;
pub mod resize;
