//! Grid geometry: viewport → columns/rows/cell size, and the two layout modes.
//!
//! A page is never materialized. Page `p` owns global slots
//! `[p * items_per_page, (p + 1) * items_per_page)`, laid out row-major with
//! `columns` slots per row. Everything else in the crate addresses cells by
//! global slot index and asks [`GridGeometry`] for page/row/column.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::{Deserialize, Serialize};

use crate::consts::{
    COMPACT_GAP_PX, COMPACT_MIN_WIDGET, COMPACT_PADDING_PX, COMPACT_RESERVED_HEIGHT_PX, DESKTOP_GAP_PX,
    DESKTOP_LEADING_SLOTS, DESKTOP_MAX_COLUMNS, DESKTOP_MAX_ROWS, DESKTOP_MIN_CELL_PX, DESKTOP_MIN_COLUMNS,
    DESKTOP_MIN_ROWS, DOCK_SLOTS, MAX_PAGES, MOBILE_COLUMNS, SPACIOUS_MIN_WIDGET, TABLET_COLUMNS, TABLET_WIDE_BREAKPOINT_PX,
    TABLET_WIDE_COLUMNS,
};
use crate::error::LayoutError;
use crate::item::CellSize;

/// Device class reported by the viewport collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Mobile,
    Tablet,
    Desktop,
}

impl DeviceClass {
    /// Whether this class uses the dock + grid layout.
    #[must_use]
    pub fn is_compact(self) -> bool {
        matches!(self, Self::Mobile | Self::Tablet)
    }
}

/// Viewport size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Per-device grid geometry. Recomputed on every viewport change.
///
/// Columns and rows are always at least 1, so slot arithmetic never divides
/// by zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridGeometry {
    columns: usize,
    rows: usize,
    items_per_page: usize,
    cell_size: f64,
    gap: f64,
}

impl GridGeometry {
    /// Build a grid from explicit dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidGeometry`] when `columns` or `rows` is zero.
    pub fn new(columns: usize, rows: usize, cell_size: f64, gap: f64) -> Result<Self, LayoutError> {
        if columns == 0 || rows == 0 {
            return Err(LayoutError::InvalidGeometry { columns, rows });
        }
        Ok(Self::clamped(columns, rows, cell_size, gap))
    }

    fn clamped(columns: usize, rows: usize, cell_size: f64, gap: f64) -> Self {
        let columns = columns.max(1);
        let rows = rows.max(1);
        Self {
            columns,
            rows,
            items_per_page: columns * rows,
            cell_size: finite_or_zero(cell_size),
            gap: finite_or_zero(gap),
        }
    }

    #[must_use]
    pub fn columns(&self) -> usize {
        self.columns
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    /// Cell edge in CSS pixels.
    #[must_use]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Gap between cells in CSS pixels.
    #[must_use]
    pub fn gap(&self) -> f64 {
        self.gap
    }

    /// Page containing a global slot.
    #[must_use]
    pub fn page_of(&self, slot: usize) -> usize {
        slot / self.items_per_page
    }

    /// First global slot of a page. Saturates for pages past addressing.
    #[must_use]
    pub fn page_start(&self, page: usize) -> usize {
        page.saturating_mul(self.items_per_page)
    }

    /// One past the last global slot of a page.
    #[must_use]
    pub fn page_end(&self, page: usize) -> usize {
        self.page_start(page.saturating_add(1))
    }

    /// Whether `slot` lies on one of the first [`MAX_PAGES`] pages.
    #[must_use]
    pub fn addressable(&self, slot: usize) -> bool {
        self.page_of(slot) < MAX_PAGES
    }

    /// Local `(row, col)` of a global slot within its page.
    #[must_use]
    pub fn local(&self, slot: usize) -> (usize, usize) {
        let offset = slot % self.items_per_page;
        (offset / self.columns, offset % self.columns)
    }

    /// Global slot of a local `(row, col)` on a page.
    #[must_use]
    pub fn slot_at(&self, page: usize, row: usize, col: usize) -> usize {
        self.page_start(page) + row * self.columns + col
    }

    /// Whether a footprint of this size can fit on a page at all.
    #[must_use]
    pub fn holds(&self, size: CellSize) -> bool {
        size.width >= 1 && size.height >= 1 && size.width <= self.columns && size.height <= self.rows
    }

    /// Pixel extent of a run of `cells` cells including the gaps between them.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn span_px(&self, cells: usize) -> f64 {
        if cells == 0 {
            return 0.0;
        }
        cells as f64 * self.cell_size + (cells - 1) as f64 * self.gap
    }
}

/// The fixed dock row on compact layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dock {
    pub slots: usize,
}

impl Default for Dock {
    fn default() -> Self {
        Self { slots: DOCK_SLOTS }
    }
}

/// The two layout families. Each carries the invariants of its mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum LayoutMode {
    /// Mobile/tablet: paginated grid plus a fixed dock, widgets at least 4×2.
    Compact { grid: GridGeometry, dock: Dock },
    /// Desktop: paginated grid only; the first `reserved_leading` slots of
    /// page 0 belong to a fixed tile and are never assigned.
    Spacious { grid: GridGeometry, reserved_leading: usize },
}

impl LayoutMode {
    /// Compact layout with the standard dock.
    #[must_use]
    pub fn compact(grid: GridGeometry) -> Self {
        Self::Compact { grid, dock: Dock::default() }
    }

    /// Spacious layout with no reserved slots.
    #[must_use]
    pub fn spacious(grid: GridGeometry) -> Self {
        Self::Spacious { grid, reserved_leading: 0 }
    }

    #[must_use]
    pub fn grid(&self) -> &GridGeometry {
        match self {
            Self::Compact { grid, .. } | Self::Spacious { grid, .. } => grid,
        }
    }

    #[must_use]
    pub fn is_compact(&self) -> bool {
        matches!(self, Self::Compact { .. })
    }

    /// Dock positions available; zero on spacious layouts.
    #[must_use]
    pub fn dock_slots(&self) -> usize {
        match self {
            Self::Compact { dock, .. } => dock.slots,
            Self::Spacious { .. } => 0,
        }
    }

    /// Leading global slots that no item may occupy.
    #[must_use]
    pub fn reserved_leading(&self) -> usize {
        match self {
            Self::Compact { .. } => 0,
            Self::Spacious { reserved_leading, .. } => (*reserved_leading).min(self.grid().items_per_page()),
        }
    }

    /// Inclusive `(min, max)` widget footprint for this mode.
    ///
    /// The compact minimum is capped by the grid so a tiny viewport still
    /// yields a placeable widget.
    #[must_use]
    pub fn widget_bounds(&self) -> (CellSize, CellSize) {
        let grid = self.grid();
        let max = CellSize::new(grid.columns(), grid.rows());
        let min = match self {
            Self::Compact { .. } => COMPACT_MIN_WIDGET,
            Self::Spacious { .. } => SPACIOUS_MIN_WIDGET,
        };
        (CellSize::new(min.width.min(max.width), min.height.min(max.height)), max)
    }
}

/// Derives a [`LayoutMode`] from viewport size and device class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryResolver {
    pub desktop_min_cell_px: f64,
    pub desktop_gap_px: f64,
    pub desktop_leading_slots: usize,
    pub compact_gap_px: f64,
    pub compact_padding_px: f64,
    pub compact_reserved_height_px: f64,
    pub tablet_wide_breakpoint_px: f64,
}

impl Default for GeometryResolver {
    fn default() -> Self {
        Self {
            desktop_min_cell_px: DESKTOP_MIN_CELL_PX,
            desktop_gap_px: DESKTOP_GAP_PX,
            desktop_leading_slots: DESKTOP_LEADING_SLOTS,
            compact_gap_px: COMPACT_GAP_PX,
            compact_padding_px: COMPACT_PADDING_PX,
            compact_reserved_height_px: COMPACT_RESERVED_HEIGHT_PX,
            tablet_wide_breakpoint_px: TABLET_WIDE_BREAKPOINT_PX,
        }
    }
}

impl GeometryResolver {
    /// Resolve the layout for a viewport. Always returns a usable grid.
    #[must_use]
    pub fn resolve(&self, viewport: Viewport, device: DeviceClass) -> LayoutMode {
        let width = finite_or_zero(viewport.width);
        let height = finite_or_zero(viewport.height);
        match device {
            DeviceClass::Desktop => self.resolve_desktop(width, height),
            DeviceClass::Mobile => self.resolve_compact(width, height, MOBILE_COLUMNS),
            DeviceClass::Tablet => {
                let columns =
                    if width >= self.tablet_wide_breakpoint_px { TABLET_WIDE_COLUMNS } else { TABLET_COLUMNS };
                self.resolve_compact(width, height, columns)
            }
        }
    }

    fn resolve_desktop(&self, width: f64, height: f64) -> LayoutMode {
        let gap = finite_or_zero(self.desktop_gap_px);
        let min_cell = finite_or_zero(self.desktop_min_cell_px).max(1.0);

        let columns = count_fitting(width, min_cell, gap).clamp(DESKTOP_MIN_COLUMNS, DESKTOP_MAX_COLUMNS);
        let rows = count_fitting(height, min_cell, gap).clamp(DESKTOP_MIN_ROWS, DESKTOP_MAX_ROWS);
        let cell_size = fit_cell(width, columns, gap).min(fit_cell(height, rows, gap));

        LayoutMode::Spacious {
            grid: GridGeometry::clamped(columns, rows, cell_size, gap),
            reserved_leading: self.desktop_leading_slots,
        }
    }

    fn resolve_compact(&self, width: f64, height: f64, columns: usize) -> LayoutMode {
        let gap = finite_or_zero(self.compact_gap_px);
        let inner_width = (width - 2.0 * finite_or_zero(self.compact_padding_px)).max(0.0);
        let cell_size = fit_cell(inner_width, columns, gap);

        let available = (height - finite_or_zero(self.compact_reserved_height_px)).max(0.0);
        let rows = if cell_size > 0.0 { count_fitting(available, cell_size, gap).max(1) } else { 1 };

        LayoutMode::compact(GridGeometry::clamped(columns, rows, cell_size, gap))
    }
}

/// Number of `cell`-sized cells separated by `gap` that fit in `extent`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn count_fitting(extent: f64, cell: f64, gap: f64) -> usize {
    let stride = cell + gap;
    if stride <= 0.0 {
        return 0;
    }
    ((extent + gap) / stride).floor().max(0.0) as usize
}

/// Cell edge that divides `extent` into `count` cells with `gap` between them.
#[allow(clippy::cast_precision_loss)]
fn fit_cell(extent: f64, count: usize, gap: f64) -> f64 {
    let count = count.max(1);
    ((extent - gap * (count - 1) as f64) / count as f64).max(0.0)
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}
