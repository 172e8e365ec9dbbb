//! Engine configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use crate::consts::{
    COMPACT_GAP_PX, COMPACT_PADDING_PX, COMPACT_RESERVED_HEIGHT_PX, DESKTOP_GAP_PX, DESKTOP_LEADING_SLOTS,
    DESKTOP_MIN_CELL_PX, MAX_CASCADE_PAGES, TABLET_WIDE_BREAKPOINT_PX,
};
use crate::geometry::GeometryResolver;

/// Tunables for geometry resolution and cascading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Pages past the origin a cascade may spill into.
    pub max_cascade_pages: usize,
    /// Minimum desktop cell edge in CSS pixels.
    pub desktop_min_cell_px: f64,
    /// Gap between desktop cells.
    pub desktop_gap_px: f64,
    /// Leading desktop slots held by the fixed launcher tile.
    pub desktop_leading_slots: usize,
    /// Gap between compact cells.
    pub compact_gap_px: f64,
    /// Horizontal padding on each side of the compact grid.
    pub compact_padding_px: f64,
    /// Vertical space held back for header and dock on compact layouts.
    pub compact_reserved_height_px: f64,
    /// Tablet width at which the wide column count applies.
    pub tablet_wide_breakpoint_px: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_cascade_pages: MAX_CASCADE_PAGES,
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

impl EngineConfig {
    /// Build config from environment variables. Every variable is optional;
    /// missing or unparsable values fall back to the defaults.
    ///
    /// - `QUICKDOCK_MAX_CASCADE_PAGES`: default 10
    /// - `QUICKDOCK_DESKTOP_MIN_CELL_PX`: default 160
    /// - `QUICKDOCK_DESKTOP_GAP_PX`: default 16
    /// - `QUICKDOCK_DESKTOP_LEADING_SLOTS`: default 1
    /// - `QUICKDOCK_COMPACT_GAP_PX`: default 12
    /// - `QUICKDOCK_COMPACT_PADDING_PX`: default 16
    /// - `QUICKDOCK_COMPACT_RESERVED_HEIGHT_PX`: default 180
    /// - `QUICKDOCK_TABLET_WIDE_BREAKPOINT_PX`: default 1024
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            max_cascade_pages: env_parse("QUICKDOCK_MAX_CASCADE_PAGES", MAX_CASCADE_PAGES),
            desktop_min_cell_px: env_parse("QUICKDOCK_DESKTOP_MIN_CELL_PX", DESKTOP_MIN_CELL_PX),
            desktop_gap_px: env_parse("QUICKDOCK_DESKTOP_GAP_PX", DESKTOP_GAP_PX),
            desktop_leading_slots: env_parse("QUICKDOCK_DESKTOP_LEADING_SLOTS", DESKTOP_LEADING_SLOTS),
            compact_gap_px: env_parse("QUICKDOCK_COMPACT_GAP_PX", COMPACT_GAP_PX),
            compact_padding_px: env_parse("QUICKDOCK_COMPACT_PADDING_PX", COMPACT_PADDING_PX),
            compact_reserved_height_px: env_parse("QUICKDOCK_COMPACT_RESERVED_HEIGHT_PX", COMPACT_RESERVED_HEIGHT_PX),
            tablet_wide_breakpoint_px: env_parse("QUICKDOCK_TABLET_WIDE_BREAKPOINT_PX", TABLET_WIDE_BREAKPOINT_PX),
        }
    }

    /// Geometry resolver carrying this config's geometry tunables.
    #[must_use]
    pub fn resolver(&self) -> GeometryResolver {
        GeometryResolver {
            desktop_min_cell_px: self.desktop_min_cell_px,
            desktop_gap_px: self.desktop_gap_px,
            desktop_leading_slots: self.desktop_leading_slots,
            compact_gap_px: self.compact_gap_px,
            compact_padding_px: self.compact_padding_px,
            compact_reserved_height_px: self.compact_reserved_height_px,
            tablet_wide_breakpoint_px: self.tablet_wide_breakpoint_px,
        }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
