use std::cell::RefCell;
use std::rc::Rc;

use icicle_core::{
    Click, FontMetrics, Modifiers, Overlay, ProfileForest, ProfileViewer, StyleRegistry,
    SurfaceSize, ThemeMode, Tooltip, ViewerConfig, parse_auto,
};
use icicle_protocol::RenderCommand;

use crate::renderer::{Placement, render_commands};
use crate::theme;

/// Label font metrics measured from egui's proportional font.
///
/// egui reports a single row height per font; it is split into ascent and
/// descent at the usual 4:1 ratio.
#[derive(Debug, Clone, Copy)]
pub struct EguiFontMetrics {
    /// Row height of a 1pt font.
    row_per_point: f64,
}

impl EguiFontMetrics {
    const PROBE_SIZE: f32 = 100.0;

    /// Needs fonts, so only valid once the first frame has started.
    pub fn measure(painter: &egui::Painter) -> Self {
        let galley = painter.layout_no_wrap(
            "Mg".to_string(),
            egui::FontId::proportional(Self::PROBE_SIZE),
            egui::Color32::WHITE,
        );
        Self {
            row_per_point: f64::from(galley.size().y / Self::PROBE_SIZE),
        }
    }
}

impl FontMetrics for EguiFontMetrics {
    fn vertical_metrics(&self, font_size: f64) -> (f64, f64) {
        let row = self.row_per_point * font_size;
        (row * 0.8, row * 0.2)
    }
}

/// Startup options handed over from the command line.
#[derive(Debug, Default)]
pub struct Launch {
    pub config: ViewerConfig,
    pub forest: Option<ProfileForest>,
    pub selection: Option<String>,
    pub label: Option<String>,
}

pub struct IcicleApp {
    styles: StyleRegistry,
    theme_mode: ThemeMode,
    config: ViewerConfig,
    /// Created on the first frame: the viewer needs the canvas size and
    /// egui's fonts.
    viewer: Option<ProfileViewer>,
    launch_data: Option<ProfileForest>,
    launch_selection: Option<String>,

    base: Vec<RenderCommand>,
    overlay: Overlay,
    canvas: Option<(egui::Vec2, f32)>,
    pointer_inside: bool,

    /// Source path of the last ctrl-clicked node, opened on the next update.
    open_request: Rc<RefCell<Option<String>>>,
    error: Option<String>,
}

impl IcicleApp {
    pub fn new(cc: &eframe::CreationContext<'_>, launch: Launch) -> Self {
        let mut config = launch.config;
        if let Some(label) = launch.label {
            config.selector_label = label;
        }
        cc.egui_ctx.set_visuals(theme::visuals(config.theme));
        Self {
            styles: StyleRegistry::new(config.theme),
            theme_mode: config.theme,
            config,
            viewer: None,
            launch_data: launch.forest,
            launch_selection: launch.selection,
            base: Vec::new(),
            overlay: Overlay::cleared(),
            canvas: None,
            pointer_inside: false,
            open_request: Rc::new(RefCell::new(None)),
            error: None,
        }
    }

    fn load_profile(&mut self, data: &[u8]) {
        match parse_auto(data) {
            Ok(forest) => {
                self.error = None;
                match self.viewer.as_mut() {
                    Some(viewer) => viewer.set_data(Some(forest)),
                    None => self.launch_data = Some(forest),
                }
            }
            Err(e) => {
                log::warn!("profile rejected: {e}");
                self.error = Some(format!("Failed to load profile: {e}"));
            }
        }
    }

    fn open_viewer(&mut self, painter: &egui::Painter, size: egui::Vec2, ppp: f32) {
        let surface = SurfaceSize {
            css_width: f64::from(size.x),
            css_height: f64::from(size.y),
            dpr: f64::from(ppp),
        };
        let metrics = EguiFontMetrics::measure(painter);
        let mut viewer =
            match ProfileViewer::new(surface, &self.styles, self.config.clone(), Box::new(metrics)) {
                Ok(viewer) => viewer,
                Err(e) => {
                    log::debug!("canvas not ready: {e}");
                    return;
                }
            };

        let sink = Rc::clone(&self.open_request);
        viewer.register_ctrl_click_handler(Some(Box::new(move |node| {
            *sink.borrow_mut() = Some(node.path.clone());
        })));
        viewer.register_selection_handler(Some(Box::new(|key| {
            log::info!("switched to {key}");
        })));

        if let Some(forest) = self.launch_data.take() {
            viewer.set_data(Some(forest));
        }
        if let Some(key) = self.launch_selection.take()
            && let Err(e) = viewer.select(&key)
        {
            self.error = Some(e.to_string());
        }
        self.viewer = Some(viewer);
        self.canvas = Some((size, ppp));
    }

    fn toolbar(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if let Some(viewer) = self.viewer.as_mut() {
                let keys: Vec<String> = viewer.selections().into_iter().map(str::to_owned).collect();
                if !keys.is_empty() {
                    ui.label(format!("{}:", viewer.selector_label()));
                    let current = viewer.current_selection().unwrap_or_default().to_owned();
                    let mut chosen = current.clone();
                    egui::ComboBox::from_id_salt("selection")
                        .selected_text(current.as_str())
                        .show_ui(ui, |ui| {
                            for key in &keys {
                                ui.selectable_value(&mut chosen, key.clone(), key.as_str());
                            }
                        });
                    if chosen != current
                        && let Err(e) = viewer.select(&chosen)
                    {
                        self.error = Some(e.to_string());
                    }
                }
                if ui.button("reset view").clicked() {
                    viewer.reset_view();
                }
                ui.separator();
            }

            #[cfg(not(target_arch = "wasm32"))]
            if ui.button("Open").clicked()
                && let Some(path) = rfd::FileDialog::new()
                    .add_filter("Profile", &["json", "txt", "folded", "collapsed"])
                    .pick_file()
            {
                match std::fs::read(&path) {
                    Ok(data) => self.load_profile(&data),
                    Err(e) => self.error = Some(format!("Failed to read file: {e}")),
                }
            }

            let theme_label = match self.theme_mode {
                ThemeMode::Dark => "Dark",
                ThemeMode::Light => "Light",
            };
            if ui.button(theme_label).clicked() {
                self.theme_mode = match self.theme_mode {
                    ThemeMode::Dark => ThemeMode::Light,
                    ThemeMode::Light => ThemeMode::Dark,
                };
                ctx.set_visuals(theme::visuals(self.theme_mode));
                self.styles.restyle(self.theme_mode);
            }
        });
    }

    /// Forward this frame's pointer and wheel input to the viewer.
    fn forward_input(
        viewer: &mut ProfileViewer,
        ui: &egui::Ui,
        response: &egui::Response,
        origin: egui::Pos2,
        pointer_inside: &mut bool,
    ) {
        let ppp = ui.ctx().pixels_per_point();

        if response.hovered() {
            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                // egui scrolls content down for positive y; the viewer
                // expects DOM-style deltas in device pixels.
                viewer.on_wheel(f64::from(-scroll * ppp));
            }
        }

        match response.hover_pos() {
            Some(pos) => {
                let local = pos - origin;
                viewer.on_pointer_move(f64::from(local.x), f64::from(local.y));
                *pointer_inside = true;
            }
            None if *pointer_inside => {
                viewer.on_pointer_leave();
                *pointer_inside = false;
            }
            None => {}
        }

        if response.clicked()
            && let Some(pos) = response.interact_pointer_pos()
        {
            let local = pos - origin;
            let mods = ui.input(|i| i.modifiers);
            let mut click = Click::single(f64::from(local.x), f64::from(local.y)).with_modifiers(
                Modifiers {
                    ctrl: mods.ctrl,
                    meta: mods.mac_cmd,
                },
            );
            if response.double_clicked() {
                click.count = 2;
            }
            viewer.on_click(click);
        }
    }

    fn show_tooltip(ctx: &egui::Context, canvas: egui::Rect, tooltip: &Tooltip) {
        let p = tooltip.placement;
        let x = match (p.left, p.right) {
            (Some(left), _) => canvas.left() + left as f32,
            (None, Some(right)) => canvas.right() - right as f32,
            (None, None) => canvas.left(),
        };
        let y = match (p.top, p.bottom) {
            (Some(top), _) => canvas.top() + top as f32,
            (None, Some(bottom)) => canvas.bottom() - bottom as f32,
            (None, None) => canvas.top(),
        };
        let pivot = match (p.right.is_some(), p.bottom.is_some()) {
            (false, false) => egui::Align2::LEFT_TOP,
            (true, false) => egui::Align2::RIGHT_TOP,
            (false, true) => egui::Align2::LEFT_BOTTOM,
            (true, true) => egui::Align2::RIGHT_BOTTOM,
        };
        egui::Area::new(egui::Id::new("icicle_tooltip"))
            .order(egui::Order::Tooltip)
            .fixed_pos(egui::pos2(x, y))
            .pivot(pivot)
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    for (i, line) in tooltip.lines().iter().enumerate() {
                        if i == 0 {
                            ui.strong(line);
                        } else {
                            ui.label(line);
                        }
                    }
                });
            });
    }
}

impl eframe::App for IcicleApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| self.toolbar(ctx, ui));

        if let Some(err) = &self.error {
            egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
                ui.colored_label(ui.visuals().error_fg_color, err);
            });
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let available = ui.available_rect_before_wrap();
                let response = ui.allocate_rect(available, egui::Sense::click());
                let mut painter = ui.painter_at(available);
                let ppp = ctx.pixels_per_point();
                let size = available.size();

                if self.viewer.is_none() {
                    self.open_viewer(&painter, size, ppp);
                }
                let Some(viewer) = self.viewer.as_mut() else {
                    return;
                };
                if self.canvas != Some((size, ppp)) {
                    viewer.on_resize(f64::from(size.x), f64::from(size.y), f64::from(ppp));
                    self.canvas = Some((size, ppp));
                }

                Self::forward_input(
                    viewer,
                    ui,
                    &response,
                    available.min,
                    &mut self.pointer_inside,
                );

                if viewer.needs_frame() {
                    let out = viewer.frame();
                    if let Some(base) = out.base {
                        self.base = base;
                    }
                    if let Some(overlay) = out.overlay {
                        self.overlay = overlay;
                    }
                }

                let Some(sheet) = viewer.stylesheet() else {
                    return;
                };
                painter.rect_filled(
                    available,
                    egui::CornerRadius::ZERO,
                    theme::token_color(icicle_protocol::ThemeToken::Background, &sheet),
                );
                let placement = Placement::new(available.min, ppp);
                render_commands(&mut painter, &self.base, placement, &sheet);
                render_commands(&mut painter, &self.overlay.commands, placement, &sheet);
                if let Some(tooltip) = &self.overlay.tooltip {
                    Self::show_tooltip(ctx, available, tooltip);
                }
            });

        if let Some(path) = self.open_request.borrow_mut().take() {
            log::info!("opening {path}");
            ctx.open_url(egui::OpenUrl::new_tab(format!("file://{path}")));
        }

        let dropped: Option<Vec<u8>> = ctx.input(|i| {
            let file = i.raw.dropped_files.first()?;
            match (&file.bytes, &file.path) {
                (Some(bytes), _) => Some(bytes.to_vec()),
                #[cfg(not(target_arch = "wasm32"))]
                (None, Some(path)) => std::fs::read(path).ok(),
                _ => None,
            }
        });
        if let Some(data) = dropped {
            self.load_profile(&data);
        }

        // Loads and drops queue work after the canvas was painted.
        if frame_pending(self.viewer.as_ref()) {
            ctx.request_repaint();
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Some(viewer) = self.viewer.as_mut() {
            viewer.destroy();
        }
    }
}

fn frame_pending(viewer: Option<&ProfileViewer>) -> bool {
    viewer.is_some_and(ProfileViewer::needs_frame)
}
