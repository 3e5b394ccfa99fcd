//! Paged-grid placement and reposition engine for a mobile launcher shell.
//!
//! The shell owns windowing, rendering, and persistence; this crate owns the
//! occupancy model (pages of grid cells), empty-space search, the
//! drag-to-reposition state machine, and the "make space" displacement
//! algorithm that pushes residents aside when an item is dropped on them.

pub mod common;
pub mod grid_engine;
pub mod model;

pub use grid_engine::{GridEngine, ShellHooks};
pub use model::{
    CellPoint, CellRect, CellSize, GridError, GridPage, GridSpec, ItemFootprint, ItemId, PagePanel,
    PixelGeometry, PlacedItem, SizeClass,
};
