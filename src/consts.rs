//! Shared numeric constants for the slot engine.

use crate::item::CellSize;

// ── Dock ────────────────────────────────────────────────────────

/// Number of dock positions on compact layouts.
pub const DOCK_SLOTS: usize = 4;

// ── Widget sizing ───────────────────────────────────────────────

/// Smallest widget footprint allowed on compact (mobile/tablet) layouts.
pub const COMPACT_MIN_WIDGET: CellSize = CellSize { width: 4, height: 2 };

/// Size given to persisted widgets that arrive without one.
pub const DEFAULT_WIDGET_SIZE: CellSize = CellSize { width: 2, height: 2 };

/// Smallest footprint of anything on spacious layouts.
pub const SPACIOUS_MIN_WIDGET: CellSize = CellSize { width: 1, height: 1 };

// ── Cascade ─────────────────────────────────────────────────────

/// Pages past the origin page a cascade may spill into before giving up.
pub const MAX_CASCADE_PAGES: usize = 10;

// ── Addressing ──────────────────────────────────────────────────

/// Pages a slot index may address. Persisted slots past the last of them
/// are treated as unplaced, which keeps page arithmetic far from overflow.
pub const MAX_PAGES: usize = 1024;

// ── Desktop geometry ────────────────────────────────────────────

/// Minimum desktop cell edge in CSS pixels; drives the column/row count.
pub const DESKTOP_MIN_CELL_PX: f64 = 160.0;

/// Gap between desktop cells in CSS pixels.
pub const DESKTOP_GAP_PX: f64 = 16.0;

/// Desktop column count bounds (inclusive).
pub const DESKTOP_MIN_COLUMNS: usize = 2;
pub const DESKTOP_MAX_COLUMNS: usize = 4;

/// Desktop row count bounds (inclusive).
pub const DESKTOP_MIN_ROWS: usize = 2;
pub const DESKTOP_MAX_ROWS: usize = 4;

/// Leading desktop slots held by the fixed launcher tile.
pub const DESKTOP_LEADING_SLOTS: usize = 1;

// ── Compact geometry ────────────────────────────────────────────

/// Fixed column count on phones.
pub const MOBILE_COLUMNS: usize = 4;

/// Tablet column count below the wide breakpoint.
pub const TABLET_COLUMNS: usize = 6;

/// Tablet column count at or above the wide breakpoint.
pub const TABLET_WIDE_COLUMNS: usize = 8;

/// Viewport width at which tablets switch to the wide column count.
pub const TABLET_WIDE_BREAKPOINT_PX: f64 = 1024.0;

/// Gap between compact cells in CSS pixels.
pub const COMPACT_GAP_PX: f64 = 12.0;

/// Horizontal padding on each side of the compact grid.
pub const COMPACT_PADDING_PX: f64 = 16.0;

/// Vertical space held back for the header and dock row.
pub const COMPACT_RESERVED_HEIGHT_PX: f64 = 180.0;
