//! A single launcher page: a fixed-resolution grid and the items placed on
//! it. The page owns only placement records; the visual objects and the
//! persisted rows belong to the shell.

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use tracing::warn;

use super::GridError;
use super::geometry::{CellPoint, CellRect, CellSize, GridSpec};
use crate::common::collections::HashSet;

new_key_type! {
    /// Opaque handle tying a placement record to the shell's item (app icon,
    /// folder, or widget). Allocated by the engine's registry.
    pub struct ItemId;
}

/// Size classes the launcher offers. Footprints are axis-aligned and never
/// rotated.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SizeClass {
    Icon1x1,
    Wide2x1,
    Tile2x2,
    Wide4x2,
    Full4x4,
}

impl SizeClass {
    pub fn footprint(&self) -> ItemFootprint {
        match self {
            SizeClass::Icon1x1 => ItemFootprint::new(1, 1),
            SizeClass::Wide2x1 => ItemFootprint::new(2, 1),
            SizeClass::Tile2x2 => ItemFootprint::new(2, 2),
            SizeClass::Wide4x2 => ItemFootprint::new(4, 2),
            SizeClass::Full4x4 => ItemFootprint::new(4, 4),
        }
    }
}

/// Rectangle an item occupies, in grid cells. Both dimensions are positive.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemFootprint {
    pub width: i32,
    pub height: i32,
}

impl ItemFootprint {
    pub const fn new(width: i32, height: i32) -> Self { Self { width, height } }

    pub fn rect_at(&self, origin: CellPoint) -> CellRect {
        CellRect {
            origin,
            size: CellSize::new(self.width, self.height),
        }
    }

    pub fn fits_within(&self, spec: &GridSpec) -> bool {
        self.width > 0 && self.height > 0 && self.width <= spec.columns && self.height <= spec.rows
    }
}

/// One placement record. The id is the only link to the shell's world.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedItem {
    pub id: ItemId,
    pub rect: CellRect,
}

/// Occupancy grid of one page. The item sequence doubles as the occupancy
/// representation; pages hold at most `columns * rows` items, so linear
/// scans are cheap enough to run per pointer-move.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GridPage {
    index: usize,
    spec: GridSpec,
    items: Vec<PlacedItem>,
}

impl GridPage {
    pub fn new(spec: GridSpec, index: usize) -> Self {
        Self {
            index,
            spec,
            items: Vec::new(),
        }
    }

    #[inline]
    pub fn spec(&self) -> &GridSpec { &self.spec }

    #[inline]
    pub fn index(&self) -> usize { self.index }

    pub(crate) fn set_index(&mut self, index: usize) { self.index = index; }

    #[inline]
    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    #[inline]
    pub fn item_count(&self) -> usize { self.items.len() }

    pub fn items(&self) -> impl Iterator<Item = &PlacedItem> + '_ { self.items.iter() }

    pub fn item(&self, id: ItemId) -> Option<&PlacedItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Ids of placed items whose rectangles intersect `rect`.
    pub fn conflicts(&self, rect: &CellRect) -> Vec<ItemId> {
        self.items
            .iter()
            .filter(|item| item.rect.intersects(rect))
            .map(|item| item.id)
            .collect()
    }

    /// True when `rect` lies within bounds and overlaps no placed item.
    pub fn fits(&self, rect: &CellRect) -> bool {
        self.spec.contains_rect(rect) && self.items.iter().all(|item| !item.rect.intersects(rect))
    }

    /// Finds a free origin for `footprint`. With a concrete `preferred`
    /// origin only that exact cell is probed; with the unspecified sentinel
    /// the valid range is scanned row-major (y outer, x inner) and the first
    /// fit wins, so results are deterministic for a given occupancy.
    pub fn check_empty_space(
        &self,
        footprint: ItemFootprint,
        preferred: CellPoint,
    ) -> Option<CellPoint> {
        if !footprint.fits_within(&self.spec) {
            return None;
        }

        if !preferred.is_unspecified() {
            let rect = footprint.rect_at(preferred);
            return self.fits(&rect).then_some(preferred);
        }

        for y in 0..=(self.spec.rows - footprint.height) {
            for x in 0..=(self.spec.columns - footprint.width) {
                let origin = CellPoint::new(x, y);
                if self.fits(&footprint.rect_at(origin)) {
                    return Some(origin);
                }
            }
        }
        None
    }

    /// Inserts a placement. Callers validate through `check_empty_space`
    /// first; a failing pre-condition here is a programming error and is
    /// reported instead of silently corrected, so layout bugs stay visible.
    pub fn place(
        &mut self,
        id: ItemId,
        footprint: ItemFootprint,
        origin: CellPoint,
    ) -> Result<(), GridError> {
        let rect = footprint.rect_at(origin);
        if !self.fits(&rect) {
            warn!(
                "rejecting placement of {:?} at {:?} on page {}: out of bounds or occupied",
                id, origin, self.index
            );
            return Err(GridError::InvalidPlacement { item: id, origin });
        }

        self.items.push(PlacedItem { id, rect });
        debug_assert!(self.check_invariants().is_ok());
        Ok(())
    }

    /// Clears the item's occupancy. Deliberately a no-op when the item is
    /// not on this page; callers must not rely on an error signal.
    pub fn remove(&mut self, id: ItemId) { self.items.retain(|item| item.id != id); }

    /// Moves an already-placed item within this page without going through
    /// remove + place, used when a displacement plan is applied.
    pub(crate) fn relocate(&mut self, id: ItemId, origin: CellPoint) {
        if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
            item.rect = item.rect.with_origin(origin);
        }
    }

    /// Non-overlap and bounds invariants, checked by debug assertions and
    /// tests after every mutation. Walks cell coverage so overlaps are
    /// reported with the exact cell that is claimed twice.
    pub fn check_invariants(&self) -> Result<(), String> {
        let mut covered: HashSet<(i32, i32)> = HashSet::default();
        for item in &self.items {
            if !self.spec.contains_rect(&item.rect) {
                return Err(format!("{:?} out of bounds: {:?}", item.id, item.rect));
            }
            for y in item.rect.origin.y..item.rect.bottom() {
                for x in item.rect.origin.x..item.rect.right() {
                    if !covered.insert((x, y)) {
                        return Err(format!("cell ({}, {}) claimed twice ({:?})", x, y, item.id));
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use slotmap::SlotMap;

    use super::*;

    fn ids(n: usize) -> Vec<ItemId> {
        let mut arena: SlotMap<ItemId, ()> = SlotMap::with_key();
        (0..n).map(|_| arena.insert(())).collect()
    }

    fn page() -> GridPage { GridPage::new(GridSpec::CLUSTER, 0) }

    #[test]
    fn scan_returns_first_fit_in_row_major_order() {
        let id = ids(1)[0];
        let mut page = page();
        page.place(id, ItemFootprint::new(2, 2), CellPoint::new(0, 0)).unwrap();

        let origin = page.check_empty_space(ItemFootprint::new(1, 1), CellPoint::UNSPECIFIED);
        assert_eq!(origin, Some(CellPoint::new(2, 0)));
    }

    #[test]
    fn preferred_origin_probes_only_that_cell() {
        let id = ids(1)[0];
        let mut page = page();
        page.place(id, ItemFootprint::new(2, 2), CellPoint::new(0, 0)).unwrap();

        let fp = ItemFootprint::new(1, 1);
        assert_eq!(page.check_empty_space(fp, CellPoint::new(1, 1)), None);
        assert_eq!(
            page.check_empty_space(fp, CellPoint::new(3, 3)),
            Some(CellPoint::new(3, 3))
        );
    }

    #[test]
    fn wide_item_leaves_only_lower_half_free() {
        // Spec scenario: 4x2 at (0,0) leaves exactly (0,2) for another 4x2,
        // and no room at all for a 4x4.
        let id = ids(1)[0];
        let mut page = page();
        page.place(id, ItemFootprint::new(4, 2), CellPoint::new(0, 0)).unwrap();

        assert_eq!(
            page.check_empty_space(ItemFootprint::new(4, 2), CellPoint::UNSPECIFIED),
            Some(CellPoint::new(0, 2))
        );
        assert_eq!(
            page.check_empty_space(ItemFootprint::new(4, 4), CellPoint::UNSPECIFIED),
            None
        );
    }

    #[test]
    fn oversized_footprint_never_fits() {
        let page = page();
        assert_eq!(
            page.check_empty_space(ItemFootprint::new(5, 1), CellPoint::UNSPECIFIED),
            None
        );
    }

    #[test]
    fn place_rejects_overlap_and_leaves_page_untouched() {
        let ids = ids(2);
        let mut page = page();
        page.place(ids[0], ItemFootprint::new(2, 2), CellPoint::new(1, 1)).unwrap();

        let err = page.place(ids[1], ItemFootprint::new(2, 2), CellPoint::new(2, 2));
        assert_eq!(
            err,
            Err(GridError::InvalidPlacement {
                item: ids[1],
                origin: CellPoint::new(2, 2)
            })
        );
        assert_eq!(page.item_count(), 1);
        page.check_invariants().unwrap();
    }

    #[test]
    fn place_rejects_out_of_bounds() {
        let id = ids(1)[0];
        let mut page = page();
        assert!(page.place(id, ItemFootprint::new(2, 2), CellPoint::new(3, 3)).is_err());
        assert!(page.is_empty());
    }

    #[test]
    fn remove_is_silent_for_absent_items() {
        let ids = ids(2);
        let mut page = page();
        page.place(ids[0], ItemFootprint::new(1, 1), CellPoint::new(0, 0)).unwrap();

        page.remove(ids[1]);
        assert_eq!(page.item_count(), 1);

        page.remove(ids[0]);
        assert!(page.is_empty());
        // Freed cells are reusable immediately.
        assert_eq!(
            page.check_empty_space(ItemFootprint::new(1, 1), CellPoint::new(0, 0)),
            Some(CellPoint::new(0, 0))
        );
    }

    #[test]
    fn invariants_hold_across_mutations() {
        let ids = ids(3);
        let mut page = page();
        page.place(ids[0], ItemFootprint::new(2, 1), CellPoint::new(0, 0)).unwrap();
        page.place(ids[1], ItemFootprint::new(2, 2), CellPoint::new(2, 0)).unwrap();
        page.place(ids[2], ItemFootprint::new(1, 1), CellPoint::new(0, 1)).unwrap();
        page.check_invariants().unwrap();

        page.remove(ids[1]);
        page.check_invariants().unwrap();
    }
}
