use egui::{Align2, CornerRadius, FontId, Pos2, Rect};
use icicle_core::Stylesheet;
use icicle_protocol::{RenderCommand, TextAlign};

use crate::theme;

/// Maps device pixels onto egui points at a fixed origin.
#[derive(Debug, Clone, Copy)]
pub struct Placement {
    pub origin: Pos2,
    /// Points per device pixel (`1 / pixels_per_point`).
    pub scale: f32,
}

impl Placement {
    pub fn new(origin: Pos2, pixels_per_point: f32) -> Self {
        Self {
            origin,
            scale: 1.0 / pixels_per_point.max(f32::EPSILON),
        }
    }

    fn pos(&self, x: f64, y: f64) -> Pos2 {
        Pos2::new(
            self.origin.x + x as f32 * self.scale,
            self.origin.y + y as f32 * self.scale,
        )
    }

    fn rect(&self, r: &icicle_protocol::Rect) -> Rect {
        Rect::from_min_size(
            self.pos(r.x, r.y),
            egui::vec2(r.w as f32 * self.scale, r.h as f32 * self.scale),
        )
    }
}

/// The parts of `outer` not covered by `inner`: top, bottom, left and right
/// bands. egui cannot erase what is already painted, so a fill followed by
/// a clear inside it is drawn as this ring instead.
pub fn ring(outer: Rect, inner: Rect) -> [Rect; 4] {
    let inner = inner.intersect(outer);
    [
        Rect::from_min_max(outer.min, Pos2::new(outer.max.x, inner.min.y)),
        Rect::from_min_max(Pos2::new(outer.min.x, inner.max.y), outer.max),
        Rect::from_min_max(
            Pos2::new(outer.min.x, inner.min.y),
            Pos2::new(inner.min.x, inner.max.y),
        ),
        Rect::from_min_max(
            Pos2::new(inner.max.x, inner.min.y),
            Pos2::new(outer.max.x, inner.max.y),
        ),
    ]
}

/// Render one layer of `RenderCommand`s into an egui `Painter`.
pub fn render_commands(
    painter: &mut egui::Painter,
    commands: &[RenderCommand],
    placement: Placement,
    sheet: &Stylesheet,
) {
    let mut clip_stack: Vec<Rect> = Vec::new();
    // Held back one command so that a following ClearRect can cut it.
    let mut pending: Option<(Rect, egui::Color32)> = None;

    for cmd in commands {
        if let RenderCommand::ClearRect { rect } = cmd {
            if let Some((outer, fill)) = pending.take() {
                for band in ring(outer, placement.rect(rect)) {
                    if band.is_positive() {
                        painter.rect_filled(band, CornerRadius::ZERO, fill);
                    }
                }
            }
            continue;
        }
        if let Some((rect, fill)) = pending.take() {
            painter.rect_filled(rect, CornerRadius::ZERO, fill);
        }

        match cmd {
            RenderCommand::DrawRect { rect, color, .. } => {
                let egui_rect = placement.rect(rect);
                // Cull off-screen
                if !painter.clip_rect().intersects(egui_rect) {
                    continue;
                }
                pending = Some((egui_rect, theme::paint(*color, sheet)));
            }

            RenderCommand::DrawText {
                position,
                text,
                color,
                font_size,
                align,
            } => {
                let size = *font_size as f32 * placement.scale;
                if size < 1.0 {
                    continue;
                }
                let anchor = match align {
                    TextAlign::Left => Align2::LEFT_CENTER,
                    TextAlign::Center => Align2::CENTER_CENTER,
                    TextAlign::Right => Align2::RIGHT_CENTER,
                };
                painter.text(
                    placement.pos(position.x, position.y),
                    anchor,
                    text,
                    FontId::proportional(size),
                    theme::paint(*color, sheet),
                );
            }

            RenderCommand::SetClip { rect } => {
                clip_stack.push(painter.clip_rect());
                let intersected = painter.clip_rect().intersect(placement.rect(rect));
                painter.set_clip_rect(intersected);
            }

            RenderCommand::ClearClip => {
                if let Some(prev) = clip_stack.pop() {
                    painter.set_clip_rect(prev);
                }
            }

            RenderCommand::ClearRect { .. }
            | RenderCommand::BeginGroup { .. }
            | RenderCommand::EndGroup => {}
        }
    }

    if let Some((rect, fill)) = pending {
        painter.rect_filled(rect, CornerRadius::ZERO, fill);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_pixels_become_points() {
        let p = Placement::new(Pos2::new(10.0, 40.0), 2.0);
        let r = p.rect(&icicle_protocol::Rect::new(20.0, 4.0, 100.0, 40.0));
        assert_eq!(r.min, Pos2::new(20.0, 42.0));
        assert_eq!(r.size(), egui::vec2(50.0, 20.0));
    }

    #[test]
    fn ring_leaves_the_inside_open() {
        let outer = Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(100.0, 20.0));
        let inner = Rect::from_min_max(Pos2::new(2.0, 4.0), Pos2::new(98.0, 18.0));
        let [top, bottom, left, right] = ring(outer, inner);
        assert_eq!(top.height(), 4.0);
        assert_eq!(bottom.height(), 2.0);
        assert_eq!(left.width(), 2.0);
        assert_eq!(right.width(), 2.0);
        assert_eq!(left.height(), 14.0);
        let covered: f32 = [top, bottom, left, right].iter().map(|r| r.area()).sum();
        assert_eq!(covered, outer.area() - inner.area());
    }
}
