//! Icicle layout: proportional-width subdivision, one fixed-height row per
//! depth level, growing downward from the active node.

use icicle_protocol::Rect;

use crate::model::{CallTree, NodeId};

/// Inputs of one layout pass, all in device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    pub width: f64,
    pub height: f64,
    pub row_height: f64,
    /// Vertical scroll offset, `<= 0`.
    pub scroll: f64,
}

/// Render cache of node rectangles produced by the most recent layout pass.
///
/// Indexed by [`NodeId`]; nodes the pass did not reach have no rectangle.
/// The cache is rebuilt in place on every pass and must not be consulted
/// after the tree, root, viewport or scroll offset changed.
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    rects: Vec<Option<Rect>>,
    placed: Vec<NodeId>,
    root: Option<NodeId>,
    params: Option<LayoutParams>,
    more_below: bool,
}

impl Geometry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lay out the subtree of `root` into a fresh cache.
    pub fn compute(tree: &CallTree, root: NodeId, params: LayoutParams) -> Self {
        let mut geometry = Self::new();
        geometry.relayout(tree, root, params);
        geometry
    }

    /// Lay out the subtree of `root`, replacing the previous pass.
    pub fn relayout(&mut self, tree: &CallTree, root: NodeId, params: LayoutParams) {
        self.invalidate();
        if self.rects.len() != tree.len() {
            self.rects = vec![None; tree.len()];
        }
        self.root = Some(root);
        self.params = Some(params);
        self.place(tree, root, &params);
        log::debug!(
            "layout: {} nodes placed from {root}, more below: {}",
            self.placed.len(),
            self.more_below
        );
    }

    /// Drop every rectangle of the last pass.
    pub fn invalidate(&mut self) {
        for id in self.placed.drain(..) {
            if let Some(slot) = self.rects.get_mut(id.index()) {
                *slot = None;
            }
        }
        self.root = None;
        self.params = None;
        self.more_below = false;
    }

    /// Pre-order walk from `root` with an explicit stack.
    fn place(&mut self, tree: &CallTree, root: NodeId, params: &LayoutParams) {
        let mut stack: Vec<(NodeId, f64, f64, f64)> = vec![(root, 0.0, params.scroll, params.width)];
        let mut row: Vec<(NodeId, f64, f64)> = Vec::new();

        while let Some((id, x, y, width)) = stack.pop() {
            let Some(node) = tree.node(id) else {
                continue;
            };
            if let Some(slot) = self.rects.get_mut(id.index()) {
                *slot = Some(Rect::new(x, y, width, params.row_height));
                self.placed.push(id);
            }

            if y + params.row_height > params.height {
                self.more_below = true;
                continue;
            }
            row.clear();
            let mut cursor = x;
            for &child_id in node.children() {
                let Some(child) = tree.node(child_id) else {
                    continue;
                };
                let w = width * tree.width_ratio(node, child);
                row.push((child_id, cursor, w));
                cursor += w;
            }
            // Reversed so the leftmost child is placed next.
            for &(child_id, cx, w) in row.iter().rev() {
                stack.push((child_id, cx, y + params.row_height, w));
            }
        }
    }

    pub fn rect(&self, id: NodeId) -> Option<Rect> {
        self.rects.get(id.index()).copied().flatten()
    }

    /// Nodes placed by the last pass, in pre-order.
    pub fn placed(&self) -> &[NodeId] {
        &self.placed
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn params(&self) -> Option<LayoutParams> {
        self.params
    }

    /// Whether the last pass stopped at the bottom edge with content left.
    pub fn more_below(&self) -> bool {
        self.more_below
    }

    pub fn is_empty(&self) -> bool {
        self.placed.is_empty()
    }
}
