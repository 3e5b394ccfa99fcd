//! The ordered collection of pages, the page-count cap, and page add/remove
//! with reindexing. Space search across pages lives in `grid_engine::space`;
//! the panel only offers the primitives it needs.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::GridError;
use super::geometry::{CellPoint, GridSpec};
use super::page::{GridPage, ItemFootprint, ItemId};

/// What to do with items still placed on a page being removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovedItemPolicy {
    /// Drop the placements; the shell deletes the backing widgets.
    Delete,
    /// Re-place each item on the first page with room, in panel order.
    /// Items that fit nowhere are dropped and reported.
    Relocate,
}

/// Direction of a page step while dragging near a boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDirection {
    Left,
    Right,
}

/// An item that ended up on a new page/cell as part of a panel operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemMove {
    pub id: ItemId,
    pub page: usize,
    pub origin: CellPoint,
}

/// Outcome of `remove_page`: what moved, what was dropped, and the new page
/// count. Persisted page indices of every item on a later page have shifted
/// down by one; the shell rewrites them from this report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRemoval {
    pub relocated: Vec<ItemMove>,
    pub dropped: Vec<ItemId>,
    pub page_count: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PagePanel {
    max_pages: usize,
    current_page: usize,
    default_spec: GridSpec,
    pages: Vec<GridPage>,
}

impl PagePanel {
    /// A panel starts with one empty page; a launcher never shows zero.
    pub fn new(default_spec: GridSpec, max_pages: usize) -> Self {
        let max_pages = max_pages.max(1);
        Self {
            max_pages,
            current_page: 0,
            default_spec,
            pages: vec![GridPage::new(default_spec, 0)],
        }
    }

    #[inline]
    pub fn page_count(&self) -> usize { self.pages.len() }

    #[inline]
    pub fn max_pages(&self) -> usize { self.max_pages }

    #[inline]
    pub fn is_full(&self) -> bool { self.pages.len() >= self.max_pages }

    #[inline]
    pub fn current_page(&self) -> usize { self.current_page }

    #[inline]
    pub fn default_spec(&self) -> &GridSpec { &self.default_spec }

    pub fn pages(&self) -> impl Iterator<Item = &GridPage> + '_ { self.pages.iter() }

    pub fn page(&self, index: usize) -> Option<&GridPage> { self.pages.get(index) }

    pub(crate) fn page_mut(&mut self, index: usize) -> Option<&mut GridPage> {
        self.pages.get_mut(index)
    }

    /// Index of the page holding `id`, if any page does.
    pub fn page_of(&self, id: ItemId) -> Option<usize> {
        self.pages.iter().position(|page| page.item(id).is_some())
    }

    pub fn set_current_page(&mut self, index: usize) -> Result<(), GridError> {
        if index >= self.pages.len() {
            return Err(GridError::PageNotFound { index });
        }
        self.current_page = index;
        Ok(())
    }

    /// Steps the current page for drop targeting. Never wraps: a drag must
    /// not jump from the last page back to the first. The shell's display
    /// scroller may wrap, but that is its own affair.
    pub fn step_current(&mut self, direction: PageDirection) -> Option<usize> {
        let next = match direction {
            PageDirection::Left => self.current_page.checked_sub(1)?,
            PageDirection::Right => {
                let next = self.current_page + 1;
                if next >= self.pages.len() {
                    return None;
                }
                next
            }
        };
        self.current_page = next;
        Some(next)
    }

    /// Appends an empty page with the panel's default grid.
    pub fn add_page(&mut self) -> Result<usize, GridError> {
        self.add_page_with_spec(self.default_spec)
    }

    /// Appends an empty page with an explicit grid, e.g. the fine virtual
    /// grid of a widget panel page.
    pub fn add_page_with_spec(&mut self, spec: GridSpec) -> Result<usize, GridError> {
        if self.is_full() {
            warn!("refusing to add page: panel already holds {} pages", self.pages.len());
            return Err(GridError::PanelFull { max_pages: self.max_pages });
        }
        let index = self.pages.len();
        self.pages.push(GridPage::new(spec, index));
        debug!("added page {}", index);
        Ok(index)
    }

    /// Removes a page, applying `policy` to whatever is still placed on it,
    /// and reindexes the remaining pages contiguously. Removing the only
    /// page leaves a fresh empty one behind.
    pub fn remove_page(
        &mut self,
        index: usize,
        policy: RemovedItemPolicy,
    ) -> Result<PageRemoval, GridError> {
        if index >= self.pages.len() {
            return Err(GridError::PageNotFound { index });
        }

        let removed = self.pages.remove(index);
        if self.pages.is_empty() {
            self.pages.push(GridPage::new(self.default_spec, 0));
        }
        for (i, page) in self.pages.iter_mut().enumerate() {
            page.set_index(i);
        }
        if self.current_page >= self.pages.len() {
            self.current_page = self.pages.len() - 1;
        }

        let mut relocated = Vec::new();
        let mut dropped = Vec::new();
        for item in removed.items() {
            let footprint = ItemFootprint::new(item.rect.size.width, item.rect.size.height);
            match policy {
                RemovedItemPolicy::Delete => dropped.push(item.id),
                RemovedItemPolicy::Relocate => {
                    match self.place_first_fit(item.id, footprint) {
                        Some(target) => relocated.push(target),
                        None => {
                            warn!("no room to relocate {:?} from removed page {}", item.id, index);
                            dropped.push(item.id);
                        }
                    }
                }
            }
        }

        debug!(
            "removed page {}: {} relocated, {} dropped, {} pages remain",
            index,
            relocated.len(),
            dropped.len(),
            self.pages.len()
        );
        Ok(PageRemoval {
            relocated,
            dropped,
            page_count: self.pages.len(),
        })
    }

    fn place_first_fit(&mut self, id: ItemId, footprint: ItemFootprint) -> Option<ItemMove> {
        for page_index in 0..self.pages.len() {
            let page = &mut self.pages[page_index];
            if let Some(origin) = page.check_empty_space(footprint, CellPoint::UNSPECIFIED)
                && page.place(id, footprint, origin).is_ok()
            {
                return Some(ItemMove {
                    id,
                    page: page_index,
                    origin,
                });
            }
        }
        None
    }
}
