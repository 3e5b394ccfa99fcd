//! All coordinate math in one place: cell-space rectangles, grid bounds with
//! the clamping rule, and pixel <-> cell conversion. Three coordinate spaces
//! exist (screen pixels, coarse cells, fine virtual cells); every conversion
//! between them goes through this module.

use serde::{Deserialize, Serialize};
use static_assertions::const_assert;

/// A cell coordinate (top-left of a cell). Negative coordinates are the
/// "unspecified" sentinel in placement probes.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CellPoint {
    pub x: i32,
    pub y: i32,
}

impl CellPoint {
    pub const UNSPECIFIED: CellPoint = CellPoint::new(-1, -1);

    pub const fn new(x: i32, y: i32) -> Self { Self { x, y } }

    /// Probe convention: a negative coordinate on either axis means "scan
    /// for any free origin" rather than "test this exact cell".
    pub fn is_unspecified(&self) -> bool { self.x < 0 || self.y < 0 }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellSize {
    pub width: i32,
    pub height: i32,
}

impl CellSize {
    pub const fn new(width: i32, height: i32) -> Self { Self { width, height } }
}

/// Axis-aligned rectangle in cell units, half-open on both axes.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRect {
    pub origin: CellPoint,
    pub size: CellSize,
}

impl CellRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            origin: CellPoint::new(x, y),
            size: CellSize::new(width, height),
        }
    }

    pub fn right(&self) -> i32 { self.origin.x + self.size.width }

    pub fn bottom(&self) -> i32 { self.origin.y + self.size.height }

    /// True when the rectangles share at least one cell. Containment in
    /// either direction counts as intersection.
    pub fn intersects(&self, other: &CellRect) -> bool {
        !(self.right() <= other.origin.x
            || other.right() <= self.origin.x
            || self.bottom() <= other.origin.y
            || other.bottom() <= self.origin.y)
    }

    pub fn contains_rect(&self, other: &CellRect) -> bool {
        self.origin.x <= other.origin.x
            && self.origin.y <= other.origin.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    pub fn contains_cell(&self, cell: CellPoint) -> bool {
        (self.origin.x..self.right()).contains(&cell.x)
            && (self.origin.y..self.bottom()).contains(&cell.y)
    }

    pub fn with_origin(&self, origin: CellPoint) -> CellRect {
        CellRect {
            origin,
            size: self.size,
        }
    }

    pub fn translated(&self, dx: i32, dy: i32) -> CellRect {
        self.with_origin(CellPoint::new(self.origin.x + dx, self.origin.y + dy))
    }
}

/// Grid resolution of a page. Two resolutions coexist: the coarse cluster
/// grid for icon pages and a fine virtual grid for the widget panel.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(deny_unknown_fields)]
pub struct GridSpec {
    pub columns: i32,
    pub rows: i32,
}

impl GridSpec {
    pub const CLUSTER: GridSpec = GridSpec::new(4, 4);
    pub const WIDGET_PANEL: GridSpec = GridSpec::new(16, 20);

    pub const fn new(columns: i32, rows: i32) -> Self { Self { columns, rows } }

    pub fn bounds(&self) -> CellRect { CellRect::new(0, 0, self.columns, self.rows) }

    pub fn contains_rect(&self, rect: &CellRect) -> bool {
        rect.origin.x >= 0
            && rect.origin.y >= 0
            && rect.right() <= self.columns
            && rect.bottom() <= self.rows
    }

    /// Clamping rule shared by pointer placement and displacement: push the
    /// rectangle back inside the grid instead of rejecting it. Oversized
    /// rectangles pin to the top-left corner.
    pub fn clamp_rect(&self, rect: CellRect) -> CellRect {
        let max_x = (self.columns - rect.size.width).max(0);
        let max_y = (self.rows - rect.size.height).max(0);
        rect.with_origin(CellPoint::new(
            rect.origin.x.clamp(0, max_x),
            rect.origin.y.clamp(0, max_y),
        ))
    }
}

const_assert!(GridSpec::CLUSTER.columns > 0 && GridSpec::CLUSTER.rows > 0);
const_assert!(GridSpec::WIDGET_PANEL.columns > 0 && GridSpec::WIDGET_PANEL.rows > 0);

/// On-screen geometry of one page's grid, supplied by the shell with every
/// pointer event. The engine never caches it; rotation or resize just shows
/// up as different numbers on the next event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelGeometry {
    pub origin_x: f64,
    pub origin_y: f64,
    pub cell_width: f64,
    pub cell_height: f64,
}

impl PixelGeometry {
    pub fn new(origin_x: f64, origin_y: f64, cell_width: f64, cell_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            cell_width,
            cell_height,
        }
    }

    /// Nearest cell origin to a pixel position; used to snap a dragged
    /// item's top-left corner. May land outside the grid, so callers clamp
    /// the resulting rectangle through `GridSpec::clamp_rect`.
    pub fn nearest_cell(&self, px: f64, py: f64) -> CellPoint {
        CellPoint::new(
            ((px - self.origin_x) / self.cell_width).round() as i32,
            ((py - self.origin_y) / self.cell_height).round() as i32,
        )
    }

    /// Cell under a pixel position (floor, not round); used for hit-testing
    /// which item a press landed on.
    pub fn cell_containing(&self, px: f64, py: f64) -> CellPoint {
        CellPoint::new(
            ((px - self.origin_x) / self.cell_width).floor() as i32,
            ((py - self.origin_y) / self.cell_height).floor() as i32,
        )
    }

    pub fn cell_to_pixel(&self, cell: CellPoint) -> (f64, f64) {
        (
            self.origin_x + cell.x as f64 * self.cell_width,
            self.origin_y + cell.y as f64 * self.cell_height,
        )
    }

    /// Pixel width of the whole grid, for edge-zone tests.
    pub fn grid_width(&self, spec: &GridSpec) -> f64 { spec.columns as f64 * self.cell_width }
}
