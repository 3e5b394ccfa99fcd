//! The facade a launcher shell drives. Owns the panel, the item registry,
//! at most one reposition session, and the deadline state for long-press
//! pick-up and edge auto-scroll. Everything runs on the shell's UI thread
//! in response to pointer callbacks and `tick`; nothing here blocks or
//! performs I/O.

use std::time::{Duration, Instant};

use slotmap::SlotMap;
use tracing::{debug, warn};

use super::session::{ProbeOutcome, RepositionSession, SessionEnd};
use super::space;
use crate::common::config::GridSettings;
use crate::model::{
    CellPoint, CellRect, GridError, GridSpec, ItemId, PageDirection, PagePanel, PageRemoval,
    PixelGeometry, RemovedItemPolicy, SizeClass,
};

/// Side-effect sinks the engine drives. The engine owns no visual object
/// and no persisted row; it only reports what changed. Every method has a
/// no-op default so shells implement just what they render.
pub trait ShellHooks {
    /// An item's stored position is now `(page, cell)`; persist it.
    /// Fired for the dragged item and for every resident a drop displaced.
    fn on_item_committed(&mut self, _item: ItemId, _page: usize, _cell: CellPoint) {}
    fn on_page_count_changed(&mut self, _new_count: usize) {}
    /// The visible page changed under an active drag; scroll the pager.
    fn on_page_changed(&mut self, _index: usize) {}
    fn show_preview(&mut self, _page: usize, _rect: CellRect) {}
    fn hide_preview(&mut self) {}
    fn move_floating_visual(&mut self, _x: f64, _y: f64) {}
    /// `add_page`/`find_or_create_space` hit the page cap; show a blocking
    /// notice, do not retry.
    fn notify_panel_full(&mut self) {}
}

/// Sink that ignores everything, for shells that poll engine state instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHooks;

impl ShellHooks for NullHooks {}

/// What the engine knows about an item beyond its placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemRecord {
    pub size_class: SizeClass,
}

#[derive(Debug, Clone, Copy)]
struct PendingPress {
    item: ItemId,
    x: f64,
    y: f64,
    deadline: Instant,
}

#[derive(Debug, Clone, Copy)]
struct EdgeDwell {
    direction: PageDirection,
    deadline: Instant,
}

pub struct GridEngine {
    settings: GridSettings,
    panel: PagePanel,
    items: SlotMap<ItemId, ItemRecord>,
    session: Option<RepositionSession>,
    pending_press: Option<PendingPress>,
    edge_dwell: Option<EdgeDwell>,
    last_pointer: Option<(f64, f64)>,
}

impl Default for GridEngine {
    fn default() -> Self { Self::new(GridSettings::default()) }
}

impl GridEngine {
    pub fn new(settings: GridSettings) -> Self {
        let panel = PagePanel::new(settings.cluster_grid, settings.max_pages);
        Self {
            settings,
            panel,
            items: SlotMap::with_key(),
            session: None,
            pending_press: None,
            edge_dwell: None,
            last_pointer: None,
        }
    }

    #[inline]
    pub fn panel(&self) -> &PagePanel { &self.panel }

    #[inline]
    pub fn settings(&self) -> &GridSettings { &self.settings }

    #[inline]
    pub fn session_active(&self) -> bool { self.session.is_some() }

    pub fn item(&self, id: ItemId) -> Option<&ItemRecord> { self.items.get(id) }

    // ---- item and page management (no gesture involved) ----

    /// Initial-load placement: the shell replays persisted `(page, cell,
    /// size class)` rows through this before any gesture starts.
    pub fn load_item(
        &mut self,
        size_class: SizeClass,
        page: usize,
        origin: CellPoint,
    ) -> Result<ItemId, GridError> {
        let footprint = size_class.footprint();
        let id = self.items.insert(ItemRecord { size_class });
        let placed = match self.panel.page_mut(page) {
            None => Err(GridError::PageNotFound { index: page }),
            Some(target) => target.place(id, footprint, origin),
        };
        if let Err(err) = placed {
            self.items.remove(id);
            return Err(err);
        }
        Ok(id)
    }

    /// Places a new item wherever room exists, creating a page if the panel
    /// has capacity. The commit and any page-count change are reported
    /// through `hooks`.
    pub fn add_item(
        &mut self,
        size_class: SizeClass,
        hooks: &mut dyn ShellHooks,
    ) -> Result<(ItemId, usize, CellPoint), GridError> {
        let footprint = size_class.footprint();
        let pages_before = self.panel.page_count();

        let (page, origin) = match space::find_or_create_space(&mut self.panel, footprint) {
            Ok(hit) => hit,
            Err(err @ GridError::PanelFull { .. }) => {
                hooks.notify_panel_full();
                return Err(err);
            }
            Err(err) => return Err(err),
        };

        let id = self.items.insert(ItemRecord { size_class });
        let placed = match self.panel.page_mut(page) {
            None => Err(GridError::PageNotFound { index: page }),
            Some(target) => target.place(id, footprint, origin),
        };
        if let Err(err) = placed {
            self.items.remove(id);
            return Err(err);
        }

        if self.panel.page_count() != pages_before {
            hooks.on_page_count_changed(self.panel.page_count());
        }
        hooks.on_item_committed(id, page, origin);
        Ok((id, page, origin))
    }

    /// Deletes an item (uninstall, folder dissolve). Rejected while the
    /// item is mid-drag; the session must finish first.
    pub fn remove_item(&mut self, id: ItemId) -> Result<(), GridError> {
        if self.session.as_ref().is_some_and(|s| s.item() == id) {
            warn!("refusing to remove {:?} while it is being dragged", id);
            return Err(GridError::SessionConflict);
        }
        self.items.remove(id).ok_or(GridError::UnknownItem { item: id })?;
        if let Some(page_index) = self.panel.page_of(id)
            && let Some(page) = self.panel.page_mut(page_index)
        {
            page.remove(id);
        }
        Ok(())
    }

    /// Administrative relocation ("move to page N" menu action): validated
    /// like any placement, reverts to the old position if the target cell
    /// is not actually free.
    pub fn move_item(
        &mut self,
        id: ItemId,
        page: usize,
        origin: CellPoint,
        hooks: &mut dyn ShellHooks,
    ) -> Result<(), GridError> {
        if self.session.is_some() {
            return Err(GridError::SessionConflict);
        }
        let record = *self.items.get(id).ok_or(GridError::UnknownItem { item: id })?;
        let footprint = record.size_class.footprint();
        let from_page = self.panel.page_of(id).ok_or(GridError::UnknownItem { item: id })?;
        let from_origin = self
            .panel
            .page(from_page)
            .and_then(|p| p.item(id))
            .map(|placed| placed.rect.origin)
            .ok_or(GridError::UnknownItem { item: id })?;

        if let Some(source) = self.panel.page_mut(from_page) {
            source.remove(id);
        }
        let placed = match self.panel.page_mut(page) {
            None => Err(GridError::PageNotFound { index: page }),
            Some(target) => target.place(id, footprint, origin),
        };
        if let Err(err) = placed {
            // Put it back exactly where it was.
            if let Some(source) = self.panel.page_mut(from_page) {
                source.place(id, footprint, from_origin)?;
            }
            return Err(err);
        }

        hooks.on_item_committed(id, page, origin);
        Ok(())
    }

    pub fn add_page(&mut self, hooks: &mut dyn ShellHooks) -> Result<usize, GridError> {
        self.add_page_with_spec(*self.panel.default_spec(), hooks)
    }

    /// Appends a page with an explicit grid resolution, e.g. the fine
    /// virtual grid of a widget panel page.
    pub fn add_page_with_spec(
        &mut self,
        spec: GridSpec,
        hooks: &mut dyn ShellHooks,
    ) -> Result<usize, GridError> {
        match self.panel.add_page_with_spec(spec) {
            Ok(index) => {
                hooks.on_page_count_changed(self.panel.page_count());
                Ok(index)
            }
            Err(err @ GridError::PanelFull { .. }) => {
                hooks.notify_panel_full();
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Removes a page; dropped items leave the registry, relocated items
    /// are re-committed through `hooks` so persisted positions follow the
    /// reindex. Rejected while a drag is active.
    pub fn remove_page(
        &mut self,
        index: usize,
        policy: RemovedItemPolicy,
        hooks: &mut dyn ShellHooks,
    ) -> Result<PageRemoval, GridError> {
        if self.session.is_some() {
            return Err(GridError::SessionConflict);
        }
        let removal = self.panel.remove_page(index, policy)?;
        for &id in &removal.dropped {
            self.items.remove(id);
        }
        for moved in &removal.relocated {
            hooks.on_item_committed(moved.id, moved.page, moved.origin);
        }
        hooks.on_page_count_changed(removal.page_count);
        Ok(removal)
    }

    // ---- gesture surface ----

    /// Press landed at `(x, y)` on the current page. If it hit an item, a
    /// long-press deadline is armed; `tick` past that deadline picks the
    /// item up.
    pub fn pointer_down(&mut self, x: f64, y: f64, geometry: &PixelGeometry, now: Instant) {
        if self.session.is_some() {
            // Second touch mid-gesture; the active drag keeps the pointer.
            return;
        }
        let cell = geometry.cell_containing(x, y);
        let hit = self
            .panel
            .page(self.panel.current_page())
            .and_then(|page| page.items().find(|item| item.rect.contains_cell(cell)))
            .map(|item| item.id);
        if let Some(item) = hit {
            self.pending_press = Some(PendingPress {
                item,
                x,
                y,
                deadline: now + Duration::from_millis(self.settings.long_press_ms),
            });
        }
    }

    /// Starts a reposition gesture immediately. `SessionConflict` (logged,
    /// prior session unaffected) when one is already active.
    pub fn begin_reposition(
        &mut self,
        item: ItemId,
        x: f64,
        y: f64,
        geometry: &PixelGeometry,
    ) -> Result<(), GridError> {
        if self.session.is_some() {
            warn!("rejecting begin_reposition for {:?}: a session is already active", item);
            return Err(GridError::SessionConflict);
        }
        if !self.items.contains_key(item) {
            return Err(GridError::UnknownItem { item });
        }
        let session = RepositionSession::begin(&mut self.panel, item, (x, y), geometry)?;
        self.session = Some(session);
        self.last_pointer = Some((x, y));
        self.pending_press = None;
        Ok(())
    }

    /// Drives the deadline timers. Call on every frame or timer tick while
    /// a press or drag is live. Deadlines that outlived their gesture are
    /// guarded no-ops.
    pub fn tick(&mut self, geometry: &PixelGeometry, now: Instant, hooks: &mut dyn ShellHooks) {
        if let Some(press) = self.pending_press
            && now >= press.deadline
        {
            self.pending_press = None;
            // Guard: the item may have been removed while the press was
            // pending, and a session may have started through other means.
            if self.session.is_none() && self.items.contains_key(press.item) {
                match self.begin_reposition(press.item, press.x, press.y, geometry) {
                    Ok(()) => {
                        let (fx, fy) = self
                            .session
                            .as_ref()
                            .map(|s| s.floating_origin((press.x, press.y)))
                            .unwrap_or((press.x, press.y));
                        hooks.move_floating_visual(fx, fy);
                        self.probe_and_preview(geometry, hooks);
                    }
                    Err(err) => warn!("long-press pick-up failed: {}", err),
                }
            }
        }

        if let Some(dwell) = self.edge_dwell
            && now >= dwell.deadline
        {
            if self.session.is_none() {
                // Stale timer from a gesture that already ended.
                self.edge_dwell = None;
                return;
            }
            match self.panel.step_current(dwell.direction) {
                Some(index) => {
                    if let Some(session) = self.session.as_mut() {
                        session.retarget_page(index);
                    }
                    hooks.on_page_changed(index);
                    // Re-arm so holding the pointer in the zone keeps
                    // scrolling page by page.
                    self.edge_dwell = Some(EdgeDwell {
                        direction: dwell.direction,
                        deadline: now + Duration::from_millis(self.settings.edge_scroll.dwell_ms),
                    });
                    self.probe_and_preview(geometry, hooks);
                }
                None => {
                    // First or last page; nothing further in this direction.
                    self.edge_dwell = None;
                }
            }
        }
    }

    /// Pointer moved. Before pick-up this only watches the slop radius;
    /// during a drag it moves the floating visual, maintains the edge-zone
    /// dwell, and re-probes the drop candidate.
    pub fn pointer_move(
        &mut self,
        x: f64,
        y: f64,
        geometry: &PixelGeometry,
        now: Instant,
        hooks: &mut dyn ShellHooks,
    ) {
        if self.session.is_none() {
            if let Some(press) = self.pending_press
                && f64::hypot(x - press.x, y - press.y) > self.settings.press_slop_px
            {
                // A swipe, not a pick-up; the shell scrolls the pager.
                self.pending_press = None;
            }
            return;
        }

        self.last_pointer = Some((x, y));
        if let Some(session) = self.session.as_ref() {
            let (fx, fy) = session.floating_origin((x, y));
            hooks.move_floating_visual(fx, fy);
        }
        self.update_edge_zone(x, geometry, now);
        self.probe_and_preview(geometry, hooks);
    }

    /// Pointer released: a pending press dissolves into a tap (the shell
    /// handles launch), an active drag commits at the last valid probe or
    /// reverts. All timers die with the gesture.
    pub fn pointer_up(
        &mut self,
        x: f64,
        y: f64,
        geometry: &PixelGeometry,
        hooks: &mut dyn ShellHooks,
    ) -> Result<Option<SessionEnd>, GridError> {
        self.pending_press = None;
        let Some(mut session) = self.session.take() else {
            return Ok(None);
        };
        self.edge_dwell = None;
        self.last_pointer = None;

        session.probe(&self.panel, geometry, x, y);
        hooks.hide_preview();

        let end = session.end(&mut self.panel)?;
        if end.committed {
            hooks.on_item_committed(end.item, end.page, end.origin);
            for &(id, origin) in &end.displaced {
                hooks.on_item_committed(id, end.page, origin);
            }
        }
        debug!(
            "gesture ended for {:?}: {} at page {} {:?}",
            end.item,
            if end.committed { "committed" } else { "reverted" },
            end.page,
            end.origin
        );
        Ok(Some(end))
    }

    /// Aborts an active gesture (incoming call, app switch): the item goes
    /// back to its exact pre-drag page and cell no matter how far the drag
    /// traveled.
    pub fn cancel_gesture(
        &mut self,
        hooks: &mut dyn ShellHooks,
    ) -> Result<Option<SessionEnd>, GridError> {
        self.pending_press = None;
        self.edge_dwell = None;
        self.last_pointer = None;
        let Some(session) = self.session.take() else {
            return Ok(None);
        };
        hooks.hide_preview();
        let end = session.cancel(&mut self.panel)?;
        Ok(Some(end))
    }

    fn update_edge_zone(&mut self, x: f64, geometry: &PixelGeometry, now: Instant) {
        let Some(spec) = self.panel.page(self.panel.current_page()).map(|p| *p.spec()) else {
            return;
        };
        let threshold = self.settings.edge_scroll.threshold_px;
        let left_edge = geometry.origin_x + threshold;
        let right_edge = geometry.origin_x + geometry.grid_width(&spec) - threshold;

        let zone = if x <= left_edge {
            Some(PageDirection::Left)
        } else if x >= right_edge {
            Some(PageDirection::Right)
        } else {
            None
        };

        match (zone, self.edge_dwell) {
            (None, _) => self.edge_dwell = None,
            // Same zone: keep the running deadline so dwelling works.
            (Some(dir), Some(dwell)) if dwell.direction == dir => {}
            (Some(dir), _) => {
                self.edge_dwell = Some(EdgeDwell {
                    direction: dir,
                    deadline: now + Duration::from_millis(self.settings.edge_scroll.dwell_ms),
                });
            }
        }
    }

    fn probe_and_preview(&mut self, geometry: &PixelGeometry, hooks: &mut dyn ShellHooks) {
        let Some((x, y)) = self.last_pointer else { return };
        let Some(session) = self.session.as_mut() else { return };
        let footprint = session.footprint();
        match session.probe(&self.panel, geometry, x, y) {
            ProbeOutcome::Valid { page, origin } | ProbeOutcome::MadeSpace { page, origin } => {
                hooks.show_preview(page, footprint.rect_at(origin));
            }
            ProbeOutcome::Blocked => hooks.hide_preview(),
        }
    }
}
