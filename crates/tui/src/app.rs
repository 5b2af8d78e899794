//! Terminal event handling around a [`ProfileViewer`].

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use icicle_core::{
    CellMetrics, Click, Modifiers, Overlay, ProfileForest, ProfileViewer, StyleRegistry,
    SurfaceSize, ThemeMode, ViewerConfig, ViewerError,
};
use icicle_protocol::{RenderCommand, ThemeToken};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph};

use crate::renderer::{paint_base, paint_overlay};

const DOUBLE_CLICK: Duration = Duration::from_millis(400);
/// Wheel notch in cells; more than one row so that scrolling up at the top
/// zooms out.
const WHEEL_STEP: f64 = 3.0;

/// Rows taken by the header and the status line.
const CHROME_ROWS: u16 = 2;

pub enum Flow {
    Continue,
    Quit,
}

pub struct TerminalApp {
    viewer: ProfileViewer,
    styles: StyleRegistry,
    theme: ThemeMode,
    base: Vec<RenderCommand>,
    overlay: Overlay,
    last_click: Option<(Instant, u16, u16)>,
    /// Source location of the last ctrl-clicked node.
    opened: Rc<RefCell<Option<String>>>,
    message: Option<String>,
}

impl TerminalApp {
    pub fn new(
        columns: u16,
        rows: u16,
        config: ViewerConfig,
        forest: Option<ProfileForest>,
    ) -> Result<Self, ViewerError> {
        let styles = StyleRegistry::new(config.theme);
        let theme = config.theme;
        let mut viewer = ProfileViewer::new(
            canvas_surface(columns, rows),
            &styles,
            config,
            Box::new(CellMetrics),
        )?;
        let opened = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&opened);
        viewer.register_ctrl_click_handler(Some(Box::new(move |node| {
            let location = if node.path.is_empty() {
                node.location().unwrap_or_else(|| node.func.clone())
            } else {
                format!("{}:{}", node.path, node.line)
            };
            *sink.borrow_mut() = Some(location);
        })));
        viewer.set_data(forest);
        Ok(Self {
            viewer,
            styles,
            theme,
            base: Vec::new(),
            overlay: Overlay::cleared(),
            last_click: None,
            opened,
            message: None,
        })
    }

    pub fn viewer_mut(&mut self) -> &mut ProfileViewer {
        &mut self.viewer
    }

    pub fn handle(&mut self, event: &Event) -> Flow {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => return self.on_key(key),
            Event::Mouse(mouse) => self.on_mouse(mouse),
            Event::Resize(columns, rows) => {
                let s = canvas_surface(*columns, *rows);
                self.viewer.on_resize(s.css_width, s.css_height, s.dpr);
            }
            _ => {}
        }
        Flow::Continue
    }

    fn on_key(&mut self, key: &KeyEvent) -> Flow {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Flow::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Flow::Quit;
            }
            KeyCode::Char('r') => self.viewer.reset_view(),
            KeyCode::Tab => self.cycle_selection(1),
            KeyCode::BackTab => self.cycle_selection(-1),
            KeyCode::Char('t') => {
                self.theme = match self.theme {
                    ThemeMode::Dark => ThemeMode::Light,
                    ThemeMode::Light => ThemeMode::Dark,
                };
                self.styles.restyle(self.theme);
            }
            KeyCode::Up => {
                self.viewer.on_wheel(-WHEEL_STEP);
            }
            KeyCode::Down => {
                self.viewer.on_wheel(WHEEL_STEP);
            }
            _ => {}
        }
        Flow::Continue
    }

    fn cycle_selection(&mut self, step: isize) {
        let keys: Vec<String> = self.viewer.selections().into_iter().map(str::to_owned).collect();
        if keys.is_empty() {
            return;
        }
        let current = self
            .viewer
            .current_selection()
            .and_then(|c| keys.iter().position(|k| k == c))
            .unwrap_or(0);
        let next = (current as isize + step).rem_euclid(keys.len() as isize) as usize;
        if let Err(e) = self.viewer.select(&keys[next]) {
            self.message = Some(e.to_string());
        }
    }

    fn on_mouse(&mut self, mouse: &MouseEvent) {
        // Row 0 is the header; the canvas starts below it.
        let Some(row) = mouse.row.checked_sub(1) else {
            self.viewer.on_pointer_leave();
            return;
        };
        // Aim at the middle of the cell so that row edges never decide.
        let (x, y) = (f64::from(mouse.column) + 0.5, f64::from(row) + 0.5);
        match mouse.kind {
            MouseEventKind::ScrollDown => {
                self.viewer.on_wheel(WHEEL_STEP);
            }
            MouseEventKind::ScrollUp => {
                self.viewer.on_wheel(-WHEEL_STEP);
            }
            MouseEventKind::Moved => self.viewer.on_pointer_move(x, y),
            MouseEventKind::Down(MouseButton::Left) => {
                let now = Instant::now();
                let double = self.last_click.is_some_and(|(at, c, r)| {
                    now.duration_since(at) < DOUBLE_CLICK && c == mouse.column && r == row
                });
                self.last_click = (!double).then_some((now, mouse.column, row));
                let mut click = Click::single(x, y).with_modifiers(Modifiers {
                    ctrl: mouse.modifiers.contains(KeyModifiers::CONTROL),
                    meta: mouse.modifiers.contains(KeyModifiers::SUPER),
                });
                if double {
                    click.count = 2;
                }
                self.viewer.on_click(click);
                if let Some(location) = self.opened.borrow_mut().take() {
                    self.message = Some(format!("source: {location}"));
                }
            }
            _ => {}
        }
    }

    /// Pull the next frame from the viewer. Returns whether anything changed.
    pub fn tick(&mut self) -> bool {
        if !self.viewer.needs_frame() {
            return false;
        }
        let out = self.viewer.frame();
        let changed = !out.is_empty();
        if let Some(base) = out.base {
            self.base = base;
        }
        if let Some(overlay) = out.overlay {
            self.overlay = overlay;
        }
        changed
    }

    pub fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let header_area = Rect::new(area.x, area.y, area.width, 1.min(area.height));
        let canvas = Rect::new(
            area.x,
            area.y + 1,
            area.width,
            area.height.saturating_sub(CHROME_ROWS),
        );
        let status_area = Rect::new(
            area.x,
            area.bottom().saturating_sub(1),
            area.width,
            1.min(area.height),
        );

        let selection = self.viewer.current_selection().unwrap_or("-");
        let header = Paragraph::new(Line::from(format!(
            " {}: {selection} | Tab switch | r reset | t theme | q quit ",
            self.viewer.selector_label()
        )))
        .style(Style::default().fg(Color::White).bg(Color::DarkGray));
        frame.render_widget(header, header_area);

        let Some(sheet) = self.viewer.stylesheet() else {
            return;
        };
        let [r, g, b, _] = sheet.resolve(ThemeToken::Background).to_rgba8();
        frame.render_widget(
            Block::default().style(Style::default().bg(Color::Rgb(r, g, b))),
            canvas,
        );
        paint_base(frame.buffer_mut(), canvas, &self.base, &sheet);
        paint_overlay(frame.buffer_mut(), canvas, &self.overlay.commands);

        let status = match (&self.overlay.tooltip, &self.message) {
            (Some(tooltip), _) => tooltip.lines().join(" | "),
            (None, Some(message)) => message.clone(),
            (None, None) => String::new(),
        };
        frame.render_widget(
            Paragraph::new(Line::from(status))
                .style(Style::default().fg(Color::White).bg(Color::DarkGray)),
            status_area,
        );
    }
}

/// The canvas is the terminal minus the chrome rows, one cell per pixel.
fn canvas_surface(columns: u16, rows: u16) -> SurfaceSize {
    SurfaceSize {
        css_width: f64::from(columns),
        css_height: f64::from(rows.saturating_sub(CHROME_ROWS)),
        dpr: 1.0,
    }
}
