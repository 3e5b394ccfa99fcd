//! One drag-and-drop reposition gesture, from pick-up to commit or revert.
//!
//! The session detaches the dragged item from its page's occupancy, so
//! every probe sees the grid as it will look if the item lands elsewhere.
//! A probe over the item's own pre-drag cells therefore reads as free space
//! and the preview snaps back to the original cell, which is exactly the
//! launcher behavior when the pointer has not really moved.

use tracing::{debug, warn};

use super::space::{self, DisplacementPlan};
use crate::model::{
    CellPoint, GridError, ItemFootprint, ItemId, PagePanel, PixelGeometry,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    PickedUp,
    Dragging,
}

/// What the latest pointer position means for a drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The candidate rectangle is free; preview it there.
    Valid { page: usize, origin: CellPoint },
    /// Occupied, but displacing the residents makes it fit; preview it.
    MadeSpace { page: usize, origin: CellPoint },
    /// No room even after displacement. Hide the preview; the floating
    /// visual keeps following the pointer and the gesture continues.
    Blocked,
}

/// A drop position that would succeed, remembered between probes so release
/// commits whatever the last probe established.
#[derive(Debug, Clone)]
struct ValidDrop {
    page: usize,
    origin: CellPoint,
    plan: Option<DisplacementPlan>,
}

/// Final report of a gesture. On a revert, `page`/`origin` are the pre-drag
/// position and `displaced` is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEnd {
    pub committed: bool,
    pub item: ItemId,
    pub page: usize,
    pub origin: CellPoint,
    pub displaced: Vec<(ItemId, CellPoint)>,
}

/// State machine for one reposition gesture. Transient: constructed at
/// pick-up, consumed by `end`/`cancel`, no identity beyond the gesture.
#[derive(Debug, Clone)]
pub struct RepositionSession {
    item: ItemId,
    footprint: ItemFootprint,
    origin_page: usize,
    origin_cell: CellPoint,
    current_page: usize,
    pointer_offset: (f64, f64),
    phase: SessionPhase,
    last_valid: Option<ValidDrop>,
}

impl RepositionSession {
    /// Picks `item` up: captures the pointer-to-origin offset and the
    /// pre-drag position for a possible revert, then detaches the item from
    /// its page so it floats for the rest of the gesture.
    pub fn begin(
        panel: &mut PagePanel,
        item: ItemId,
        pointer: (f64, f64),
        geometry: &PixelGeometry,
    ) -> Result<Self, GridError> {
        let origin_page = panel.page_of(item).ok_or(GridError::UnknownItem { item })?;
        let page = panel
            .page_mut(origin_page)
            .ok_or(GridError::PageNotFound { index: origin_page })?;
        let placed = *page.item(item).ok_or(GridError::UnknownItem { item })?;

        let (anchor_x, anchor_y) = geometry.cell_to_pixel(placed.rect.origin);
        page.remove(item);
        panel.set_current_page(origin_page)?;

        debug!("picked up {:?} from page {} at {:?}", item, origin_page, placed.rect.origin);
        Ok(Self {
            item,
            footprint: ItemFootprint::new(placed.rect.size.width, placed.rect.size.height),
            origin_page,
            origin_cell: placed.rect.origin,
            current_page: origin_page,
            pointer_offset: (pointer.0 - anchor_x, pointer.1 - anchor_y),
            phase: SessionPhase::PickedUp,
            // Releasing without moving must keep the item where it was.
            last_valid: Some(ValidDrop {
                page: origin_page,
                origin: placed.rect.origin,
                plan: None,
            }),
        })
    }

    #[inline]
    pub fn item(&self) -> ItemId { self.item }

    #[inline]
    pub fn footprint(&self) -> ItemFootprint { self.footprint }

    #[inline]
    pub fn origin_page(&self) -> usize { self.origin_page }

    #[inline]
    pub fn current_page(&self) -> usize { self.current_page }

    #[inline]
    pub fn phase(&self) -> SessionPhase { self.phase }

    /// Top-left pixel position of the floating visual for a pointer
    /// position, keeping the drag anchored where it was grabbed.
    pub fn floating_origin(&self, pointer: (f64, f64)) -> (f64, f64) {
        (pointer.0 - self.pointer_offset.0, pointer.1 - self.pointer_offset.1)
    }

    /// Re-targets the drag after an auto page-scroll. The next probe runs
    /// against the new page's occupancy.
    pub fn retarget_page(&mut self, page: usize) {
        if page != self.current_page {
            debug!("drag re-targeted from page {} to page {}", self.current_page, page);
            self.current_page = page;
        }
    }

    /// Re-evaluates the drop candidate for a pointer position. The
    /// candidate rectangle is the pointer minus the grab offset, snapped to
    /// the nearest cell and clamped inside the grid. Displacement is
    /// recomputed from scratch on every call.
    pub fn probe(
        &mut self,
        panel: &PagePanel,
        geometry: &PixelGeometry,
        px: f64,
        py: f64,
    ) -> ProbeOutcome {
        self.phase = SessionPhase::Dragging;

        let Some(page) = panel.page(self.current_page) else {
            warn!("probe against missing page {}", self.current_page);
            self.last_valid = None;
            return ProbeOutcome::Blocked;
        };

        let (anchor_x, anchor_y) = self.floating_origin((px, py));
        let cell = geometry.nearest_cell(anchor_x, anchor_y);
        let rect = page.spec().clamp_rect(self.footprint.rect_at(cell));

        if page.conflicts(&rect).is_empty() {
            self.last_valid = Some(ValidDrop {
                page: self.current_page,
                origin: rect.origin,
                plan: None,
            });
            return ProbeOutcome::Valid {
                page: self.current_page,
                origin: rect.origin,
            };
        }

        match space::make_space(page, &rect) {
            Some(plan) => {
                let origin = rect.origin;
                self.last_valid = Some(ValidDrop {
                    page: self.current_page,
                    origin,
                    plan: Some(plan),
                });
                ProbeOutcome::MadeSpace {
                    page: self.current_page,
                    origin,
                }
            }
            None => {
                self.last_valid = None;
                ProbeOutcome::Blocked
            }
        }
    }

    /// Ends the gesture: commits at the last valid probe, or reverts to the
    /// exact pre-drag position when the last probe was blocked. Either way
    /// the session is consumed and nothing partially-applied remains.
    pub fn end(self, panel: &mut PagePanel) -> Result<SessionEnd, GridError> {
        match self.last_valid {
            Some(drop) => {
                let page = panel
                    .page_mut(drop.page)
                    .ok_or(GridError::PageNotFound { index: drop.page })?;
                let displaced = match &drop.plan {
                    Some(plan) => {
                        space::apply_plan(page, plan);
                        plan.moves().to_vec()
                    }
                    None => Vec::new(),
                };
                page.place(self.item, self.footprint, drop.origin)?;
                debug!("committed {:?} to page {} at {:?}", self.item, drop.page, drop.origin);
                Ok(SessionEnd {
                    committed: true,
                    item: self.item,
                    page: drop.page,
                    origin: drop.origin,
                    displaced,
                })
            }
            None => self.revert(panel),
        }
    }

    /// Aborts the gesture unconditionally, restoring the pre-drag position.
    pub fn cancel(self, panel: &mut PagePanel) -> Result<SessionEnd, GridError> {
        self.revert(panel)
    }

    fn revert(self, panel: &mut PagePanel) -> Result<SessionEnd, GridError> {
        let page = panel
            .page_mut(self.origin_page)
            .ok_or(GridError::PageNotFound { index: self.origin_page })?;
        page.place(self.item, self.footprint, self.origin_cell)?;
        debug!("reverted {:?} to page {} at {:?}", self.item, self.origin_page, self.origin_cell);
        Ok(SessionEnd {
            committed: false,
            item: self.item,
            page: self.origin_page,
            origin: self.origin_cell,
            displaced: Vec::new(),
        })
    }
}
