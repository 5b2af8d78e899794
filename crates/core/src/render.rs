//! Command emission for the two draw layers.
//!
//! The base layer carries every visible node and is rebuilt on structural
//! changes. The overlay carries only the hover outline and tooltip, so
//! pointer motion never repaints the tree.

use icicle_protocol::{Paint, Point, Rect, RenderCommand, TextAlign, ThemeToken, Viewport};
use serde::Serialize;

use crate::color::color_of;
use crate::config::ViewerConfig;
use crate::layout::Geometry;
use crate::model::{CallTree, NodeId};

/// Pixel quantities shared by both layers, in device pixels unless noted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderMetrics {
    pub row_height: f64,
    pub border_width: f64,
    pub padding: f64,
    /// Label font size, device pixels.
    pub font_size: f64,
    pub min_label_width: f64,
    pub dpr: f64,
}

impl RenderMetrics {
    pub fn new(config: &ViewerConfig, row_height: f64, dpr: f64) -> Self {
        Self {
            row_height,
            border_width: config.border_width,
            padding: config.padding,
            font_size: config.font_size * dpr,
            min_label_width: config.min_label_width,
            dpr,
        }
    }
}

/// Base layer: one filled bar per visible node, with a clipped label where
/// it fits.
pub fn render_base(tree: &CallTree, geometry: &Geometry, m: &RenderMetrics) -> Vec<RenderCommand> {
    let mut out = Vec::with_capacity(geometry.placed().len() * 4 + 2);
    out.push(RenderCommand::BeginGroup {
        id: "icicle".into(),
        label: None,
    });

    let (b, p) = (m.border_width, m.padding);
    for &id in geometry.placed() {
        let (Some(node), Some(rect)) = (tree.node(id), geometry.rect(id)) else {
            continue;
        };
        // Above the top edge: keeps its geometry, is not drawn.
        if rect.y + m.row_height < 0.0 {
            continue;
        }
        let colors = color_of(node);

        out.push(RenderCommand::DrawRect {
            rect: Rect::new(rect.x, rect.y + b, rect.w.max(1.0), m.row_height - b),
            color: Paint::Solid(colors.fill),
            frame_id: Some(id.into()),
        });

        let text_width = rect.w.max(1.0) - 2.0 * p - 2.0 * b;
        if text_width > m.min_label_width {
            out.push(RenderCommand::SetClip {
                rect: Rect::new(
                    rect.x + b + p,
                    rect.y + b + p,
                    text_width,
                    m.row_height - b - 2.0 * p,
                ),
            });
            out.push(RenderCommand::DrawText {
                position: Point::new(rect.x + b + p, rect.y + m.row_height / 2.0 + b),
                text: node.func.clone(),
                color: Paint::Solid(colors.text),
                font_size: m.font_size,
                align: TextAlign::Left,
            });
            out.push(RenderCommand::ClearClip);
        }
    }

    out.push(RenderCommand::EndGroup);
    log::debug!("base layer: {} commands", out.len());
    out
}

/// Overlay outline around a hovered node's rectangle.
pub fn render_hover(rect: Rect, m: &RenderMetrics) -> Vec<RenderCommand> {
    let b = m.border_width;
    let mut out = vec![
        RenderCommand::BeginGroup {
            id: "hover".into(),
            label: None,
        },
        RenderCommand::DrawRect {
            rect: Rect::new(rect.x, rect.y + b, rect.w.max(1.0), rect.h - b),
            color: Paint::Theme(ThemeToken::HoverBorder),
            frame_id: None,
        },
    ];
    let inner = rect.w - 2.0 * b * m.dpr;
    if inner > 1.0 {
        out.push(RenderCommand::ClearRect {
            rect: Rect::new(
                rect.x + b * m.dpr,
                rect.y + 2.0 * b * m.dpr,
                inner,
                rect.h - 3.0 * b * m.dpr,
            ),
        });
    }
    out.push(RenderCommand::EndGroup);
    out
}

/// CSS-style anchor offsets of the tooltip box relative to the canvas, in
/// CSS pixels. Exactly one of `left`/`right` and one of `top`/`bottom` is
/// set.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TooltipPlacement {
    pub left: Option<f64>,
    pub right: Option<f64>,
    pub top: Option<f64>,
    pub bottom: Option<f64>,
}

impl TooltipPlacement {
    /// Place the box `offset` away from the pointer, on the side facing the
    /// larger part of the canvas.
    pub fn near(pointer: Point, viewport: &Viewport, offset: f64) -> Self {
        let (w, h) = (viewport.css_width(), viewport.css_height());
        let mut placement = Self::default();
        if pointer.x > w / 2.0 {
            placement.right = Some(w - pointer.x + offset);
        } else {
            placement.left = Some(pointer.x + offset);
        }
        if pointer.y > h / 2.0 {
            placement.bottom = Some(h - pointer.y + offset);
        } else {
            placement.top = Some(pointer.y + offset);
        }
        placement
    }
}

pub const CTRL_CLICK_HINT: &str = "Ctrl/Cmd+Click to open this file";

/// Tooltip content for the hovered node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tooltip {
    pub node: NodeId,
    pub function: String,
    /// `file:line`, absent for frames without a location.
    pub location: Option<String>,
    pub count: String,
    /// Share of the selection root's count, rounded to a whole percent.
    pub percentage: f64,
    pub flags: Vec<&'static str>,
    pub hint: Option<&'static str>,
    pub placement: TooltipPlacement,
}

impl Tooltip {
    pub fn build(
        tree: &CallTree,
        node: NodeId,
        with_hint: bool,
        placement: TooltipPlacement,
    ) -> Option<Self> {
        let frame = tree.node(node)?;
        let total = tree.node(tree.root())?.count;
        Some(Self {
            node,
            function: frame.func.clone(),
            location: frame.location(),
            count: frame.count_text(),
            percentage: (100.0 * frame.count / total).round(),
            flags: frame.flags.names(),
            hint: with_hint.then_some(CTRL_CLICK_HINT),
            placement,
        })
    }

    /// Rendered text rows: headline, location, flags, hint.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "{} ({}%) {}",
            self.count, self.percentage, self.function
        )];
        if let Some(location) = &self.location {
            lines.push(location.clone());
        }
        if !self.flags.is_empty() {
            lines.push(format!("Flags: {}", self.flags.join(", ")));
        }
        if let Some(hint) = self.hint {
            lines.push(hint.to_string());
        }
        lines
    }
}

/// The hover layer of one frame.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Overlay {
    pub commands: Vec<RenderCommand>,
    pub tooltip: Option<Tooltip>,
}

impl Overlay {
    /// An empty overlay: clears any previous hover.
    pub fn cleared() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.tooltip.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutParams;
    use crate::model::{FrameFlags, ProfileNode};

    const ROW: f64 = 20.0;

    fn metrics() -> RenderMetrics {
        RenderMetrics::new(&ViewerConfig::default(), ROW, 1.0)
    }

    fn tree() -> CallTree {
        CallTree::new(
            ProfileNode::new("root", "", 0, 100.0).with_children(vec![
                ProfileNode::new("wide", "w.rs", 1, 90.0),
                ProfileNode::new("thin", "t.rs", 2, 10.0).with_flags(FrameFlags::GC),
            ]),
        )
    }

    fn layout(tree: &CallTree, scroll: f64) -> Geometry {
        Geometry::compute(
            tree,
            tree.root(),
            LayoutParams {
                width: 100.0,
                height: 200.0,
                row_height: ROW,
                scroll,
            },
        )
    }

    fn texts(cmds: &[RenderCommand]) -> Vec<&str> {
        cmds.iter()
            .filter_map(|c| match c {
                RenderCommand::DrawText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn thin_nodes_have_no_label() {
        let tree = tree();
        let cmds = render_base(&tree, &layout(&tree, 0.0), &metrics());
        // thin is 10px wide: 10 - 4 - 4 = 2 <= 10
        assert_eq!(texts(&cmds), vec!["root", "wide"]);
        let rects = cmds
            .iter()
            .filter(|c| matches!(c, RenderCommand::DrawRect { .. }))
            .count();
        assert_eq!(rects, 3);
    }

    #[test]
    fn bar_and_label_geometry() {
        let tree = tree();
        let cmds = render_base(&tree, &layout(&tree, 0.0), &metrics());
        let RenderCommand::DrawRect { rect, frame_id, .. } = &cmds[1] else {
            panic!("expected root bar, got {:?}", cmds[1]);
        };
        assert_eq!(*rect, Rect::new(0.0, 2.0, 100.0, 18.0));
        assert_eq!(*frame_id, Some(0));
        let RenderCommand::SetClip { rect } = &cmds[2] else {
            panic!("expected clip");
        };
        assert_eq!(*rect, Rect::new(4.0, 4.0, 92.0, 14.0));
        let RenderCommand::DrawText { position, font_size, .. } = &cmds[3] else {
            panic!("expected label");
        };
        assert_eq!(*position, Point::new(4.0, 12.0));
        assert_eq!(*font_size, 12.0);
    }

    #[test]
    fn rows_above_the_top_are_culled() {
        let tree = tree();
        let cmds = render_base(&tree, &layout(&tree, -25.0), &metrics());
        assert_eq!(texts(&cmds), vec!["wide"]);
    }

    #[test]
    fn hover_outline_has_hole() {
        let cmds = render_hover(Rect::new(10.0, 20.0, 50.0, ROW), &metrics());
        assert!(matches!(
            cmds[1],
            RenderCommand::DrawRect {
                rect,
                color: Paint::Theme(ThemeToken::HoverBorder),
                ..
            } if rect == Rect::new(10.0, 22.0, 50.0, 18.0)
        ));
        assert!(matches!(
            cmds[2],
            RenderCommand::ClearRect { rect } if rect == Rect::new(12.0, 24.0, 46.0, 14.0)
        ));
    }

    #[test]
    fn narrow_hover_is_solid() {
        let cmds = render_hover(Rect::new(0.0, 0.0, 4.0, ROW), &metrics());
        assert!(!cmds.iter().any(|c| matches!(c, RenderCommand::ClearRect { .. })));
    }

    #[test]
    fn placement_flips_past_the_middle() {
        let vp = Viewport::from_css(400.0, 300.0, 2.0);
        let p = TooltipPlacement::near(Point::new(50.0, 250.0), &vp, 10.0);
        assert_eq!(p.left, Some(60.0));
        assert_eq!(p.right, None);
        assert_eq!(p.bottom, Some(60.0));
        assert_eq!(p.top, None);
        let p = TooltipPlacement::near(Point::new(350.0, 20.0), &vp, 10.0);
        assert_eq!(p.right, Some(60.0));
        assert_eq!(p.top, Some(30.0));
    }

    #[test]
    fn tooltip_content() {
        let tree = tree();
        let (id, _) = tree.iter().find(|(_, n)| n.func == "thin").expect("thin");
        let tip = Tooltip::build(&tree, id, true, TooltipPlacement::default()).expect("tooltip");
        assert_eq!(tip.function, "thin");
        assert_eq!(tip.location.as_deref(), Some("t.rs:2"));
        assert_eq!(tip.percentage, 10.0);
        assert_eq!(
            tip.lines(),
            vec![
                "10 (10%) thin".to_string(),
                "t.rs:2".to_string(),
                "Flags: GC".to_string(),
                CTRL_CLICK_HINT.to_string(),
            ]
        );
        let plain = Tooltip::build(&tree, tree.root(), false, TooltipPlacement::default())
            .expect("tooltip");
        assert_eq!(plain.lines(), vec!["100 (100%) root".to_string()]);
    }
}
