//! Paints render commands onto a ratatui buffer, one cell per device pixel.

use icicle_core::Stylesheet;
use icicle_protocol::{Color, Paint, RenderCommand, ThemeToken};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color as CellColor, Modifier};

/// Blend `color` over an opaque `under` by its alpha.
fn flatten(color: Color, under: Color) -> CellColor {
    let a = color.a.clamp(0.0, 1.0);
    let mix = |top: f32, bottom: f32| (top * a + bottom * (1.0 - a)).round().clamp(0.0, 255.0) as u8;
    CellColor::Rgb(
        mix(color.r, under.r),
        mix(color.g, under.g),
        mix(color.b, under.b),
    )
}

fn resolve(paint: Paint, sheet: &Stylesheet) -> Color {
    match paint {
        Paint::Solid(color) => color,
        Paint::Theme(token) => sheet.resolve(token),
    }
}

/// Cell columns or rows covered by the span `[start, start + len)`. Every
/// span covers at least one cell.
fn cells(start: f64, len: f64) -> (i64, i64) {
    let first = start.round() as i64;
    let end = ((start + len).round() as i64).max(first + 1);
    (first, end)
}

/// A clip region in canvas cells, half-open.
#[derive(Debug, Clone, Copy)]
struct Clip {
    x0: i64,
    y0: i64,
    x1: i64,
    y1: i64,
}

impl Clip {
    fn of(area: Rect) -> Self {
        Self {
            x0: 0,
            y0: 0,
            x1: i64::from(area.width),
            y1: i64::from(area.height),
        }
    }

    fn intersect(self, r: &icicle_protocol::Rect) -> Self {
        let (x0, x1) = cells(r.x, r.w);
        let (y0, y1) = cells(r.y, r.h);
        Self {
            x0: self.x0.max(x0),
            y0: self.y0.max(y0),
            x1: self.x1.min(x1),
            y1: self.y1.min(y1),
        }
    }

    fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }
}

/// Paint the base layer into `area`.
pub fn paint_base(buf: &mut Buffer, area: Rect, commands: &[RenderCommand], sheet: &Stylesheet) {
    let background = sheet.resolve(ThemeToken::Background);
    let full = Clip::of(area);
    let mut clip_stack: Vec<Clip> = Vec::new();
    let mut fills: Vec<Color> = vec![background; usize::from(area.width) * usize::from(area.height)];

    for cmd in commands {
        let clip = clip_stack.last().copied().unwrap_or(full);
        match cmd {
            RenderCommand::DrawRect { rect, color, .. } => {
                let fill = resolve(*color, sheet);
                let (x0, x1) = cells(rect.x, rect.w);
                let (y0, y1) = cells(rect.y, rect.h);
                for y in y0..y1 {
                    for x in x0..x1 {
                        if !clip.contains(x, y) {
                            continue;
                        }
                        let i = (y * i64::from(area.width) + x) as usize;
                        let under = fills[i];
                        let cell_color = flatten(fill, under);
                        if let CellColor::Rgb(r, g, b) = cell_color {
                            fills[i] = Color::rgb(f32::from(r), f32::from(g), f32::from(b));
                        }
                        if let Some(cell) = buf.cell_mut((area.x + x as u16, area.y + y as u16)) {
                            cell.set_char(' ').set_bg(cell_color);
                        }
                    }
                }
            }
            RenderCommand::DrawText {
                position,
                text,
                color,
                ..
            } => {
                let y = position.y.floor() as i64;
                let x0 = position.x.round() as i64;
                let paint = resolve(*color, sheet);
                for (offset, ch) in text.chars().enumerate() {
                    let x = x0 + offset as i64;
                    if !clip.contains(x, y) {
                        continue;
                    }
                    let under = fills[(y * i64::from(area.width) + x) as usize];
                    if let Some(cell) = buf.cell_mut((area.x + x as u16, area.y + y as u16)) {
                        cell.set_char(ch).set_fg(flatten(paint, under));
                    }
                }
            }
            RenderCommand::SetClip { rect } => clip_stack.push(clip.intersect(rect)),
            RenderCommand::ClearClip => {
                clip_stack.pop();
            }
            RenderCommand::ClearRect { .. }
            | RenderCommand::BeginGroup { .. }
            | RenderCommand::EndGroup => {}
        }
    }
}

/// Paint the hover layer on top of an already painted base.
///
/// A cell grid has no partial coverage to outline with, so every cell an
/// overlay rectangle touches is shown in reverse video and cleared regions
/// are left alone.
pub fn paint_overlay(buf: &mut Buffer, area: Rect, commands: &[RenderCommand]) {
    let full = Clip::of(area);
    for cmd in commands {
        if let RenderCommand::DrawRect { rect, .. } = cmd {
            let (x0, x1) = cells(rect.x, rect.w);
            let (y0, y1) = cells(rect.y, rect.h);
            for y in y0..y1 {
                for x in x0..x1 {
                    if !full.contains(x, y) {
                        continue;
                    }
                    if let Some(cell) = buf.cell_mut((area.x + x as u16, area.y + y as u16)) {
                        cell.modifier.insert(Modifier::REVERSED);
                    }
                }
            }
        }
    }
}
