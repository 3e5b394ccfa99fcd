pub mod geometry;
pub mod page;
pub mod panel;

use thiserror::Error;

pub use geometry::{CellPoint, CellRect, CellSize, GridSpec, PixelGeometry};
pub use page::{GridPage, ItemFootprint, ItemId, PlacedItem, SizeClass};
pub use panel::{ItemMove, PageDirection, PagePanel, PageRemoval, RemovedItemPolicy};

/// Failure taxonomy of the placement engine. All of these are synchronous
/// return values; nothing here crosses a gesture boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridError {
    /// No empty region of the requested size exists. Recoverable; the caller
    /// decides whether to create a page or surface a notice.
    #[error("no empty space for a {width}x{height} item")]
    NotFound { width: i32, height: i32 },
    /// The page-count cap was reached. Surfaced to the user, never retried.
    #[error("panel already holds the maximum of {max_pages} pages")]
    PanelFull { max_pages: usize },
    /// A placement that fails its own pre-condition. Programming error:
    /// callers are expected to validate through `check_empty_space` first.
    #[error("invalid placement of {item:?} at {origin:?}")]
    InvalidPlacement { item: ItemId, origin: CellPoint },
    /// `begin()` while another reposition gesture is active. Programming
    /// error; the prior session keeps running.
    #[error("a reposition session is already active")]
    SessionConflict,
    /// An operation referenced a page index the panel does not have.
    #[error("no page at index {index}")]
    PageNotFound { index: usize },
    /// An operation referenced an item the engine does not know.
    #[error("unknown item {item:?}")]
    UnknownItem { item: ItemId },
}
