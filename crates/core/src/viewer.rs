//! The interactive viewer: view state, event handling and frame output.
//!
//! Hosts forward raw input (`on_wheel`, `on_click`, `on_pointer_move`,
//! `on_resize`) and call [`ProfileViewer::frame`] once per display refresh
//! while [`ProfileViewer::needs_frame`] is true. Input handlers mutate view
//! state synchronously; drawing is deferred to the next frame and coalesced
//! per event kind.

use icicle_protocol::{Point, RenderCommand, Viewport};

use crate::config::ViewerConfig;
use crate::error::ViewerError;
use crate::hit::find_node_at;
use crate::layout::{Geometry, LayoutParams};
use crate::metrics::{FontMetrics, row_height};
use crate::model::{CallTree, CallTreeNode, NodeId, ProfileForest};
use crate::render::{Overlay, RenderMetrics, Tooltip, TooltipPlacement, render_base, render_hover};
use crate::schedule::{FrameScheduler, HoverRequest, PointerSample, SurfaceSize};
use crate::style::{StyleLease, StyleRegistry, Stylesheet};

/// Called with the node under a Ctrl/Cmd-click.
pub type CtrlClickHandler = Box<dyn FnMut(&CallTreeNode)>;
/// Called with the new key after the user switched selections.
pub type SelectionHandler = Box<dyn FnMut(&str)>;

const DESTROYED: &str = "This profile viewer is destroyed.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    /// Cmd on macOS.
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        meta: false,
    };
    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        meta: false,
    };

    fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// A pointer click in canvas-relative CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Click {
    pub x: f64,
    pub y: f64,
    pub modifiers: Modifiers,
    /// 1 for a single click, 2 for the second click of a double click.
    pub count: u32,
}

impl Click {
    pub fn single(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            modifiers: Modifiers::NONE,
            count: 1,
        }
    }

    pub fn double(x: f64, y: f64) -> Self {
        Self {
            count: 2,
            ..Self::single(x, y)
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// What a click did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickAction {
    Ignored,
    /// Ctrl/Cmd-click on a node; the handler (if any) was called.
    Inspected(NodeId),
    ZoomedIn(NodeId),
    Reset,
}

/// Everything the host has to repaint after one frame tick. `None` fields
/// are unchanged since the previous tick.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameOutput {
    /// New backing-store size for both layers.
    pub canvas: Option<Viewport>,
    /// Full replacement of the base layer.
    pub base: Option<Vec<RenderCommand>>,
    /// Full replacement of the hover layer.
    pub overlay: Option<Overlay>,
}

impl FrameOutput {
    pub fn is_empty(&self) -> bool {
        self.canvas.is_none() && self.base.is_none() && self.overlay.is_none()
    }
}

pub struct ProfileViewer {
    config: ViewerConfig,
    metrics: Box<dyn FontMetrics>,
    viewport: Viewport,
    row_height: f64,

    forest: Option<ProfileForest>,
    selection: Option<usize>,
    active: Option<NodeId>,
    scroll: f64,
    geometry: Geometry,

    scheduler: FrameScheduler,
    style: Option<StyleLease>,
    ctrl_click: Option<CtrlClickHandler>,
    on_selection: Option<SelectionHandler>,
    destroyed: bool,
}

impl ProfileViewer {
    /// Attach a viewer to a surface of `surface.css_width × css_height` CSS
    /// pixels. Fails when the surface cannot be drawn on.
    pub fn new(
        surface: SurfaceSize,
        styles: &StyleRegistry,
        config: ViewerConfig,
        metrics: Box<dyn FontMetrics>,
    ) -> Result<Self, ViewerError> {
        validate_surface(surface)?;
        let row_height = row_height(
            metrics.as_ref(),
            config.font_size,
            config.border_width,
            config.padding,
            surface.dpr,
        );
        let mut scheduler = FrameScheduler::new();
        scheduler.resize(surface);

        Ok(Self {
            viewport: Viewport::from_css(surface.css_width, surface.css_height, surface.dpr),
            row_height,
            config,
            metrics,
            forest: None,
            selection: None,
            active: None,
            scroll: 0.0,
            geometry: Geometry::new(),
            scheduler,
            style: Some(styles.acquire()),
            ctrl_click: None,
            on_selection: None,
            destroyed: false,
        })
    }

    fn refuse(&self) -> bool {
        if self.destroyed {
            log::error!("{DESTROYED}");
        }
        self.destroyed
    }

    // ── data & selection ───────────────────────────────────────────────

    /// Replace the whole forest and reset the view to the first selection.
    /// `None` clears the viewer.
    pub fn set_data(&mut self, data: Option<ProfileForest>) {
        if self.refuse() {
            return;
        }
        let Some(forest) = data else {
            self.clear();
            return;
        };
        log::info!(
            "profile data set: {} selection(s), nodes: {}",
            forest.len(),
            forest
                .selections()
                .iter()
                .map(|s| s.tree.len())
                .sum::<usize>()
        );
        self.selection = (!forest.is_empty()).then_some(0);
        self.forest = Some(forest);
        self.active = self.tree().map(CallTree::root);
        self.scroll = 0.0;
        self.restructure();
    }

    /// Drop the data and blank both layers. The viewer stays usable.
    pub fn clear(&mut self) {
        if self.refuse() {
            return;
        }
        self.forest = None;
        self.selection = None;
        self.active = None;
        self.scroll = 0.0;
        self.restructure();
    }

    /// Selection keys, `"all"` first.
    pub fn selections(&self) -> Vec<&str> {
        self.forest
            .as_ref()
            .map(|f| f.keys().collect())
            .unwrap_or_default()
    }

    pub fn current_selection(&self) -> Option<&str> {
        let forest = self.forest.as_ref()?;
        forest
            .selections()
            .get(self.selection?)
            .map(|s| s.key.as_str())
    }

    /// Switch to another selection, reset the view and notify the selection
    /// handler.
    pub fn select(&mut self, key: &str) -> Result<(), ViewerError> {
        if self.refuse() {
            return Ok(());
        }
        let index = self
            .forest
            .as_ref()
            .and_then(|f| f.selections().iter().position(|s| s.key == key));
        let Some(index) = index else {
            log::warn!("unknown selection {key:?}");
            return Err(ViewerError::UnknownSelection(key.to_string()));
        };
        log::info!("selection changed to {key:?}");
        self.selection = Some(index);
        self.reset_view();
        if let Some(handler) = self.on_selection.as_mut() {
            handler(key);
        }
        Ok(())
    }

    /// Zoom back out to the selection root and scroll to the top.
    pub fn reset_view(&mut self) {
        if self.refuse() {
            return;
        }
        self.active = self.tree().map(CallTree::root);
        self.scroll = 0.0;
        self.restructure();
    }

    pub fn set_selector_label(&mut self, label: impl Into<String>) {
        self.config.selector_label = label.into();
    }

    pub fn selector_label(&self) -> &str {
        &self.config.selector_label
    }

    /// Install (or with `None`, remove) the Ctrl/Cmd-click handler,
    /// replacing any previous one.
    pub fn register_ctrl_click_handler(&mut self, handler: Option<CtrlClickHandler>) {
        self.ctrl_click = handler;
    }

    /// Install (or with `None`, remove) the selection handler, replacing any
    /// previous one.
    pub fn register_selection_handler(&mut self, handler: Option<SelectionHandler>) {
        self.on_selection = handler;
    }

    #[deprecated(note = "use `register_selection_handler`")]
    pub fn register_thread_selector_handler(&mut self, handler: Option<SelectionHandler>) {
        self.register_selection_handler(handler);
    }

    pub fn has_ctrl_click_handler(&self) -> bool {
        self.ctrl_click.is_some()
    }

    // ── lifecycle ──────────────────────────────────────────────────────

    /// Release the stylesheet reference, handlers and data. Further calls
    /// log an error and do nothing; destroying twice is a no-op.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.scheduler.cancel_all();
        self.ctrl_click = None;
        self.on_selection = None;
        self.style = None;
        self.forest = None;
        self.selection = None;
        self.active = None;
        self.geometry = Geometry::new();
        log::debug!("profile viewer destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    // ── input ──────────────────────────────────────────────────────────

    /// Vertical wheel input in device pixels. Returns whether the event was
    /// consumed (the host should then suppress its default scrolling).
    pub fn on_wheel(&mut self, delta_y: f64) -> bool {
        if self.refuse() || !delta_y.is_finite() {
            return false;
        }
        let Some(active) = self.active else {
            return false;
        };
        if delta_y > 0.0 && !self.can_scroll_down() {
            return false;
        }

        if delta_y < 0.0 && self.scroll == 0.0 && -delta_y > self.row_height {
            let parent = self
                .tree()
                .and_then(|tree| tree.find_parent(active, tree.root()));
            if let Some(parent) = parent {
                log::debug!("zoom out {active} -> {parent}");
                self.active = Some(parent);
                self.restructure();
            }
            return parent.is_some();
        }

        self.scroll = (self.scroll - delta_y).min(0.0);
        self.geometry.invalidate();
        self.scheduler.wheel();
        true
    }

    pub fn on_click(&mut self, click: Click) -> ClickAction {
        if self.refuse() || self.active.is_none() {
            return ClickAction::Ignored;
        }
        let hit = self.node_at(click.x, click.y);

        if click.modifiers.command() {
            let Some(id) = hit else {
                return ClickAction::Ignored;
            };
            let node = current_tree(&self.forest, self.selection).and_then(|t| t.node(id));
            if let (Some(handler), Some(node)) = (self.ctrl_click.as_mut(), node) {
                handler(node);
            }
            return ClickAction::Inspected(id);
        }

        match hit {
            Some(id) => {
                log::debug!("zoom in to {id}");
                self.active = Some(id);
                self.scroll = 0.0;
                self.restructure();
                ClickAction::ZoomedIn(id)
            }
            None if click.count == 2 => {
                self.reset_view();
                ClickAction::Reset
            }
            None => ClickAction::Ignored,
        }
    }

    /// Pointer motion in canvas-relative CSS pixels.
    pub fn on_pointer_move(&mut self, x: f64, y: f64) {
        if self.refuse() || self.active.is_none() {
            return;
        }
        self.scheduler
            .hover(HoverRequest::At(PointerSample { x, y }));
    }

    pub fn on_pointer_leave(&mut self) {
        if self.refuse() {
            return;
        }
        self.scheduler.hover(HoverRequest::Leave);
    }

    /// New CSS size or pixel ratio of the drawing surface. Invalid sizes are
    /// ignored.
    pub fn on_resize(&mut self, css_width: f64, css_height: f64, dpr: f64) {
        if self.refuse() {
            return;
        }
        let size = SurfaceSize {
            css_width,
            css_height,
            dpr,
        };
        if let Err(e) = validate_surface(size) {
            log::warn!("ignoring resize: {e}");
            return;
        }
        self.scheduler.resize(size);
    }

    // ── frames ─────────────────────────────────────────────────────────

    pub fn needs_frame(&self) -> bool {
        !self.destroyed && self.scheduler.has_work()
    }

    /// Run one frame tick: apply the pending resize, then repaint whichever
    /// layers have pending work.
    pub fn frame(&mut self) -> FrameOutput {
        if self.refuse() {
            return FrameOutput::default();
        }
        let work = self.scheduler.take();
        let mut out = FrameOutput::default();

        if let Some(size) = work.resize {
            self.apply_resize(size);
            out.canvas = Some(self.viewport);
        }
        if work.redraw || out.canvas.is_some() {
            out.base = Some(self.render_base_layer());
            out.overlay = Some(Overlay::cleared());
        }
        if let Some(request) = work.hover {
            out.overlay = Some(self.render_overlay(request));
        }
        out
    }

    fn apply_resize(&mut self, size: SurfaceSize) {
        if size.dpr != self.viewport.dpr {
            self.row_height = row_height(
                self.metrics.as_ref(),
                self.config.font_size,
                self.config.border_width,
                self.config.padding,
                size.dpr,
            );
            log::debug!("pixel ratio {} -> row height {}", size.dpr, self.row_height);
        }
        self.viewport = Viewport::from_css(size.css_width, size.css_height, size.dpr);
        self.geometry.invalidate();
    }

    fn render_metrics(&self) -> RenderMetrics {
        RenderMetrics::new(&self.config, self.row_height, self.viewport.dpr)
    }

    fn render_base_layer(&mut self) -> Vec<RenderCommand> {
        self.ensure_layout();
        let m = self.render_metrics();
        match current_tree(&self.forest, self.selection) {
            Some(tree) if self.active.is_some() => render_base(tree, &self.geometry, &m),
            _ => Vec::new(),
        }
    }

    fn render_overlay(&mut self, request: HoverRequest) -> Overlay {
        let HoverRequest::At(pointer) = request else {
            return Overlay::cleared();
        };
        let Some(id) = self.node_at(pointer.x, pointer.y) else {
            return Overlay::cleared();
        };
        let (Some(tree), Some(rect)) = (
            current_tree(&self.forest, self.selection),
            self.geometry.rect(id),
        ) else {
            return Overlay::cleared();
        };
        let placement = TooltipPlacement::near(
            Point::new(pointer.x, pointer.y),
            &self.viewport,
            self.config.tooltip_offset,
        );
        Overlay {
            commands: render_hover(rect, &self.render_metrics()),
            tooltip: Tooltip::build(tree, id, self.ctrl_click.is_some(), placement),
        }
    }

    // ── layout ─────────────────────────────────────────────────────────

    fn restructure(&mut self) {
        self.geometry.invalidate();
        self.scheduler.redraw();
    }

    fn layout_params(&self) -> LayoutParams {
        LayoutParams {
            width: self.viewport.width,
            height: self.viewport.height,
            row_height: self.row_height,
            scroll: self.scroll,
        }
    }

    /// Bring the geometry cache in line with the current view state.
    fn ensure_layout(&mut self) -> &Geometry {
        let params = self.layout_params();
        let Some(active) = self.active else {
            self.geometry.invalidate();
            return &self.geometry;
        };
        if self.geometry.root() == Some(active) && self.geometry.params() == Some(params) {
            return &self.geometry;
        }
        match current_tree(&self.forest, self.selection) {
            Some(tree) => self.geometry.relayout(tree, active, params),
            None => self.geometry.invalidate(),
        }
        &self.geometry
    }

    /// Current geometry, laid out on demand.
    pub fn layout(&mut self) -> &Geometry {
        self.ensure_layout()
    }

    /// Node under a canvas-relative CSS pixel position.
    pub fn node_at(&mut self, css_x: f64, css_y: f64) -> Option<NodeId> {
        let active = self.active?;
        self.ensure_layout();
        let tree = current_tree(&self.forest, self.selection)?;
        let dpr = self.viewport.dpr;
        find_node_at(tree, &self.geometry, active, css_x * dpr, css_y * dpr)
    }

    /// Whether the current layout stops at the bottom edge with content left.
    pub fn can_scroll_down(&mut self) -> bool {
        self.ensure_layout().more_below()
    }

    // ── accessors ──────────────────────────────────────────────────────

    /// Tree of the current selection.
    pub fn tree(&self) -> Option<&CallTree> {
        current_tree(&self.forest, self.selection)
    }

    pub fn active_node(&self) -> Option<NodeId> {
        self.active
    }

    pub fn scroll_position(&self) -> f64 {
        self.scroll
    }

    pub fn row_height(&self) -> f64 {
        self.row_height
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn stylesheet(&self) -> Option<Stylesheet> {
        self.style.as_ref().map(StyleLease::stylesheet)
    }
}

fn current_tree(forest: &Option<ProfileForest>, selection: Option<usize>) -> Option<&CallTree> {
    forest
        .as_ref()?
        .selections()
        .get(selection?)
        .map(|s| &s.tree)
}

fn validate_surface(size: SurfaceSize) -> Result<(), ViewerError> {
    let ok_len = |v: f64| v.is_finite() && v >= 0.0;
    if ok_len(size.css_width) && ok_len(size.css_height) && size.dpr.is_finite() && size.dpr > 0.0
    {
        Ok(())
    } else {
        Err(ViewerError::InvalidSurface {
            width: size.css_width,
            height: size.css_height,
            dpr: size.dpr,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::metrics::ProportionalMetrics;
    use crate::model::ProfileNode;

    const ROW: f64 = 20.0;

    fn surface(w: f64, h: f64) -> SurfaceSize {
        SurfaceSize {
            css_width: w,
            css_height: h,
            dpr: 1.0,
        }
    }

    fn forest() -> ProfileForest {
        ProfileForest::from_roots([
            (
                "all",
                ProfileNode::new("root", "", 0, 100.0).with_children(vec![
                    ProfileNode::new("A", "a.rs", 1, 60.0).with_children(vec![
                        ProfileNode::new("A1", "a.rs", 10, 30.0),
                        ProfileNode::new("A2", "a.rs", 20, 30.0),
                    ]),
                    ProfileNode::new("B", "b.rs", 2, 40.0),
                ]),
            ),
            ("1", ProfileNode::new("thread-1", "t.rs", 1, 5.0)),
        ])
    }

    fn viewer_with(registry: &StyleRegistry, w: f64, h: f64) -> ProfileViewer {
        let mut v = ProfileViewer::new(
            surface(w, h),
            registry,
            ViewerConfig::default(),
            Box::new(ProportionalMetrics::SANS),
        )
        .expect("valid surface");
        v.set_data(Some(forest()));
        v
    }

    fn viewer() -> ProfileViewer {
        viewer_with(&StyleRegistry::default(), 200.0, 600.0)
    }

    fn func(v: &ProfileViewer, id: Option<NodeId>) -> Option<String> {
        let tree = v.tree()?;
        tree.node(id?).map(|n| n.func.clone())
    }

    #[test]
    fn rejects_unusable_surfaces() {
        let registry = StyleRegistry::default();
        for bad in [
            surface(-1.0, 10.0),
            surface(f64::NAN, 10.0),
            SurfaceSize {
                css_width: 10.0,
                css_height: 10.0,
                dpr: 0.0,
            },
        ] {
            let result = ProfileViewer::new(
                bad,
                &registry,
                ViewerConfig::default(),
                Box::new(ProportionalMetrics::SANS),
            );
            assert!(matches!(result, Err(ViewerError::InvalidSurface { .. })));
        }
        assert!(!registry.is_installed());
    }

    #[test]
    fn first_frame_sizes_canvas_and_draws() {
        let mut v = viewer();
        assert_eq!(v.row_height(), ROW);
        assert!(v.needs_frame());
        let out = v.frame();
        assert_eq!(out.canvas, Some(Viewport::from_css(200.0, 600.0, 1.0)));
        assert!(out.base.is_some_and(|b| !b.is_empty()));
        assert!(!v.needs_frame());
        assert!(v.frame().is_empty());
    }

    #[test]
    fn click_zooms_in_and_resets_scroll() {
        let mut v = viewer();
        v.frame();
        let action = v.on_click(Click::single(150.0, ROW + 5.0));
        let ClickAction::ZoomedIn(id) = action else {
            panic!("expected zoom, got {action:?}");
        };
        assert_eq!(func(&v, Some(id)).as_deref(), Some("B"));
        assert_eq!(v.active_node(), Some(id));
        assert!(v.needs_frame());
    }

    #[test]
    fn double_click_on_empty_space_resets() {
        let mut v = viewer();
        v.on_click(Click::single(10.0, ROW + 5.0));
        assert_eq!(func(&v, v.active_node()).as_deref(), Some("A"));
        // Far below the last row.
        assert_eq!(v.on_click(Click::single(10.0, 500.0)), ClickAction::Ignored);
        assert_eq!(v.on_click(Click::double(10.0, 500.0)), ClickAction::Reset);
        assert_eq!(func(&v, v.active_node()).as_deref(), Some("root"));
    }

    #[test]
    fn ctrl_click_calls_handler_without_zooming() {
        let mut v = viewer();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        v.register_ctrl_click_handler(Some(Box::new(move |node: &CallTreeNode| {
            sink.borrow_mut().push(node.func.clone());
        })));
        let action = v.on_click(Click::single(150.0, ROW + 5.0).with_modifiers(Modifiers::CTRL));
        assert!(matches!(action, ClickAction::Inspected(_)));
        assert_eq!(*seen.borrow(), vec!["B".to_string()]);
        assert_eq!(func(&v, v.active_node()).as_deref(), Some("root"));
    }

    #[test]
    fn wheel_up_at_top_zooms_out_only_on_large_delta() {
        let mut v = viewer();
        v.on_click(Click::single(10.0, 2.0 * ROW + 5.0));
        assert_eq!(func(&v, v.active_node()).as_deref(), Some("A1"));

        assert!(v.on_wheel(-ROW));
        assert_eq!(func(&v, v.active_node()).as_deref(), Some("A1"));
        assert_eq!(v.scroll_position(), 0.0);

        assert!(v.on_wheel(-(ROW + 1.0)));
        assert_eq!(func(&v, v.active_node()).as_deref(), Some("A"));
        assert!(v.on_wheel(-100.0));
        assert_eq!(func(&v, v.active_node()).as_deref(), Some("root"));
        // Already at the selection root.
        assert!(!v.on_wheel(-100.0));
    }

    #[test]
    fn wheel_down_needs_content_below() {
        let mut v = viewer();
        assert!(!v.on_wheel(30.0));
        assert_eq!(v.scroll_position(), 0.0);

        let mut short = viewer_with(&StyleRegistry::default(), 200.0, 30.0);
        assert!(short.can_scroll_down());
        assert!(short.on_wheel(15.0));
        assert!(short.on_wheel(15.0));
        assert_eq!(short.scroll_position(), -30.0);
        assert!(short.on_wheel(-100.0));
        assert_eq!(short.scroll_position(), 0.0);
    }

    #[test]
    fn wheel_redraws_are_coalesced() {
        let mut v = viewer_with(&StyleRegistry::default(), 200.0, 30.0);
        v.frame();
        v.on_wheel(5.0);
        v.on_wheel(5.0);
        v.on_wheel(5.0);
        let out = v.frame();
        assert!(out.base.is_some());
        assert_eq!(v.scroll_position(), -15.0);
        assert!(v.frame().is_empty());
    }

    #[test]
    fn hover_produces_overlay_and_tooltip() {
        let mut v = viewer();
        v.frame();
        v.on_pointer_move(190.0, ROW + 5.0);
        v.on_pointer_move(150.0, ROW + 5.0);
        let out = v.frame();
        assert!(out.base.is_none());
        let overlay = out.overlay.expect("overlay");
        let tip = overlay.tooltip.expect("tooltip");
        assert_eq!(tip.function, "B");
        assert_eq!(tip.percentage, 40.0);
        assert_eq!(tip.hint, None);
        assert_eq!(tip.placement.right, Some(60.0));

        v.on_pointer_leave();
        assert_eq!(v.frame().overlay, Some(Overlay::cleared()));
    }

    #[test]
    fn selection_switch_resets_and_notifies() {
        let mut v = viewer();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        v.register_selection_handler(Some(Box::new(move |key: &str| {
            sink.borrow_mut().push(key.to_string());
        })));
        assert_eq!(v.selections(), vec!["all", "1"]);
        v.on_click(Click::single(10.0, ROW + 5.0));
        v.select("1").expect("known key");
        assert_eq!(v.current_selection(), Some("1"));
        assert_eq!(func(&v, v.active_node()).as_deref(), Some("thread-1"));
        assert_eq!(*seen.borrow(), vec!["1".to_string()]);
        assert!(matches!(
            v.select("nope"),
            Err(ViewerError::UnknownSelection(_))
        ));
    }

    #[test]
    fn resize_with_new_dpr_rescales_rows() {
        let mut v = viewer();
        v.frame();
        v.on_resize(100.0, 100.0, 2.0);
        v.on_resize(f64::INFINITY, 100.0, 2.0);
        let out = v.frame();
        assert_eq!(out.canvas, Some(Viewport::from_css(100.0, 100.0, 2.0)));
        assert_eq!(v.row_height(), 2.0 * ROW);
        assert_eq!(out.overlay, Some(Overlay::cleared()));
    }

    #[test]
    fn clear_blanks_both_layers() {
        let mut v = viewer();
        v.frame();
        v.set_data(None);
        assert_eq!(v.active_node(), None);
        assert!(v.selections().is_empty());
        let out = v.frame();
        assert_eq!(out.base, Some(Vec::new()));
        assert_eq!(out.overlay, Some(Overlay::cleared()));
    }

    #[test]
    fn destroy_releases_stylesheet_once() {
        let registry = StyleRegistry::default();
        let mut a = viewer_with(&registry, 100.0, 100.0);
        let mut b = viewer_with(&registry, 100.0, 100.0);
        assert_eq!(registry.references(), 2);
        a.destroy();
        a.destroy();
        assert_eq!(registry.references(), 1);
        assert!(registry.is_installed());
        b.destroy();
        assert!(!registry.is_installed());

        // Calls after destroy are inert.
        a.set_data(Some(forest()));
        assert_eq!(a.active_node(), None);
        assert_eq!(a.on_click(Click::single(1.0, 1.0)), ClickAction::Ignored);
        assert!(!a.needs_frame());
        assert!(a.frame().is_empty());
    }
}
