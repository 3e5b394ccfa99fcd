//! Empty-space search across the panel and the "make space" displacement
//! algorithm that pushes residents aside when a dragged item lands on them.

use tracing::{debug, trace};

use crate::model::{CellPoint, CellRect, GridError, GridPage, ItemFootprint, ItemId, PagePanel};

/// The relocations that would make a dragged rectangle fit. Applied all at
/// once or not at all; a plan is only ever built against an unmutated page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DisplacementPlan {
    moves: Vec<(ItemId, CellPoint)>,
}

impl DisplacementPlan {
    pub fn is_empty(&self) -> bool { self.moves.is_empty() }

    pub fn moves(&self) -> &[(ItemId, CellPoint)] { &self.moves }
}

/// Finds a free origin for `footprint` somewhere in the panel: the current
/// page first (new items should land near what the user is looking at),
/// then the remaining pages in panel order. Never creates a page; that is a
/// capacity decision the panel owner makes.
pub fn find_space_in_panel(
    panel: &PagePanel,
    footprint: ItemFootprint,
) -> Option<(usize, CellPoint)> {
    let current = panel.current_page();
    if let Some(page) = panel.page(current)
        && let Some(origin) = page.check_empty_space(footprint, CellPoint::UNSPECIFIED)
    {
        return Some((current, origin));
    }

    for (index, page) in panel.pages().enumerate() {
        if index == current {
            continue;
        }
        if let Some(origin) = page.check_empty_space(footprint, CellPoint::UNSPECIFIED) {
            return Some((index, origin));
        }
    }
    None
}

/// Like `find_space_in_panel`, but appends a fresh page when every existing
/// page is full and capacity remains. Propagates `PanelFull` at the cap
/// without touching any page.
pub fn find_or_create_space(
    panel: &mut PagePanel,
    footprint: ItemFootprint,
) -> Result<(usize, CellPoint), GridError> {
    if let Some(hit) = find_space_in_panel(panel, footprint) {
        return Ok(hit);
    }

    let index = panel.add_page()?;
    debug!("created page {} for a {}x{} item", index, footprint.width, footprint.height);
    let page = panel.page(index).ok_or(GridError::PageNotFound { index })?;
    page.check_empty_space(footprint, CellPoint::new(0, 0))
        .map(|origin| (index, origin))
        .ok_or(GridError::NotFound {
            width: footprint.width,
            height: footprint.height,
        })
}

/// Computes relocations for every resident conflicting with `dragged`.
///
/// Each conflicting item is shifted vertically by its own height, upward
/// when that stays in bounds, else downward, then clamped by the shared
/// clamping rule. The whole plan is rejected if any relocation still hits
/// the dragged rectangle or any other resident, checked against the current
/// (unmutated) item set. No horizontal shifts and no recursive displacement
/// of second-order conflicts; that limited policy is the launcher's
/// documented behavior, not an oversight.
///
/// Runs on every pointer move; nothing is cached between calls.
pub fn make_space(page: &GridPage, dragged: &CellRect) -> Option<DisplacementPlan> {
    let mut moves = Vec::new();

    for conflict in page.conflicts(dragged) {
        let item = page.item(conflict)?;
        let height = item.rect.size.height;

        let shifted_up = item.rect.translated(0, -height);
        let candidate = if page.spec().contains_rect(&shifted_up) {
            shifted_up
        } else {
            page.spec().clamp_rect(item.rect.translated(0, height))
        };

        if candidate.intersects(dragged) {
            trace!("displacement of {:?} to {:?} still hits the drag rect", conflict, candidate);
            return None;
        }
        if page
            .items()
            .any(|other| other.id != conflict && candidate.intersects(&other.rect))
        {
            trace!("displacement of {:?} to {:?} hits another resident", conflict, candidate);
            return None;
        }

        moves.push((conflict, candidate.origin));
    }

    Some(DisplacementPlan { moves })
}

/// Applies a plan built by `make_space` against this page's current state.
pub fn apply_plan(page: &mut GridPage, plan: &DisplacementPlan) {
    for &(id, origin) in &plan.moves {
        page.relocate(id, origin);
    }
    debug_assert!(page.check_invariants().is_ok());
}
