use crate::layout::Geometry;
use crate::model::{CallTree, NodeId};

/// Find the node under `(x, y)` (device pixels) in the subtree of `root`.
///
/// Visits nodes in the same pre-order as layout: a node's horizontal span is
/// widened to whole pixels, and descent continues into children only while
/// `y` lies below the node's row. Where widened spans of siblings overlap the
/// leftmost sibling is tried first. Nodes the last layout pass did not place
/// are never hit.
pub fn find_node_at(
    tree: &CallTree,
    geometry: &Geometry,
    root: NodeId,
    x: f64,
    y: f64,
) -> Option<NodeId> {
    let mut pending = vec![root];
    while let Some(id) = pending.pop() {
        let Some(rect) = geometry.rect(id) else {
            continue;
        };
        if x < rect.x.floor() || x > rect.right().ceil() || y < rect.y {
            continue;
        }
        if y <= rect.bottom() {
            return Some(id);
        }
        if let Some(node) = tree.node(id) {
            pending.extend(node.children().iter().rev().copied());
        }
    }
    None
}
