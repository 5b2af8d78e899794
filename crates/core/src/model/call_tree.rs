use std::fmt;

use serde::{Deserialize, Serialize};

use super::node::{CountLabel, FrameFlags, ProfileNode};

/// Stable index of a node inside one [`CallTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<NodeId> for u64 {
    fn from(id: NodeId) -> u64 {
        u64::from(id.0)
    }
}

/// A frame in the arena, with its parent and ordered children as indices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallTreeNode {
    pub func: String,
    pub file: String,
    pub path: String,
    pub line: i64,
    pub count: f64,
    pub fraction: Option<f64>,
    pub count_label: Option<CountLabel>,
    pub flags: FrameFlags,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl CallTreeNode {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// The text shown in place of the sample count.
    pub fn count_text(&self) -> String {
        match &self.count_label {
            Some(label) => label.to_string(),
            None => self.count.to_string(),
        }
    }

    /// `file:line`, or `None` when the frame carries no location.
    pub fn location(&self) -> Option<String> {
        (!self.file.is_empty() || self.line > 0).then(|| format!("{}:{}", self.file, self.line))
    }
}

/// A weighted call tree flattened into an arena.
///
/// Node `0` is the root. Ids are assigned in pre-order, so every node's id
/// is greater than its parent's and a subtree occupies ids in visiting
/// order. Parent links live in the arena rather than on the input tree,
/// which keeps [`ProfileNode`] input immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallTree {
    nodes: Vec<CallTreeNode>,
}

impl CallTree {
    /// Flatten `root`, consuming it.
    pub fn new(root: ProfileNode) -> Self {
        let mut nodes: Vec<CallTreeNode> = Vec::new();
        let mut stack: Vec<(ProfileNode, Option<NodeId>)> = vec![(root, None)];

        while let Some((mut frame, parent)) = stack.pop() {
            let id = NodeId(nodes.len() as u32);
            let children = std::mem::take(&mut frame.children);
            // Reversed so that popping visits children in source order.
            for child in children.into_iter().rev() {
                stack.push((child, Some(id)));
            }
            if let Some(pid) = parent {
                nodes[pid.index()].children.push(id);
            }
            nodes.push(CallTreeNode {
                func: frame.func,
                file: frame.file,
                path: frame.path,
                line: frame.line,
                count: frame.count,
                fraction: frame.fraction,
                count_label: frame.count_label,
                flags: frame.flags,
                parent,
                children: Vec::new(),
            });
        }

        Self { nodes }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn node(&self, id: NodeId) -> Option<&CallTreeNode> {
        self.nodes.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &CallTreeNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i as u32), n))
    }

    /// Whether `node` lies in the subtree rooted at `ancestor` (inclusive).
    pub fn is_within(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(id) = cur {
            if id == ancestor {
                return true;
            }
            // Pre-order ids: nothing below `ancestor` can have a smaller id.
            if id < ancestor {
                return false;
            }
            cur = self.node(id).and_then(CallTreeNode::parent);
        }
        false
    }

    /// Immediate parent of `target` within the subtree rooted at `within`.
    ///
    /// `None` when `target` is `within` itself, lies outside that subtree, or
    /// is not a node of this tree.
    pub fn find_parent(&self, target: NodeId, within: NodeId) -> Option<NodeId> {
        let parent = self.node(target)?.parent?;
        self.is_within(parent, within).then_some(parent)
    }

    /// Ratio of the child's width to its parent's width.
    ///
    /// Uses the explicit fraction when present, else `count / parent.count`.
    /// Non-finite ratios collapse to zero width.
    pub fn width_ratio(&self, parent: &CallTreeNode, child: &CallTreeNode) -> f64 {
        let ratio = child.fraction.unwrap_or(child.count / parent.count);
        if ratio.is_finite() { ratio } else { 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CallTree {
        CallTree::new(
            ProfileNode::new("root", "", 0, 100.0).with_children(vec![
                ProfileNode::new("A", "a.rs", 1, 60.0).with_children(vec![
                    ProfileNode::new("A1", "a.rs", 10, 30.0),
                    ProfileNode::new("A2", "a.rs", 20, 30.0),
                ]),
                ProfileNode::new("B", "b.rs", 2, 40.0),
            ]),
        )
    }

    fn id_of(tree: &CallTree, name: &str) -> NodeId {
        tree.iter()
            .find(|(_, n)| n.func == name)
            .map(|(id, _)| id)
            .unwrap_or(NodeId::ROOT)
    }

    #[test]
    fn flattens_in_pre_order() {
        let tree = sample();
        let names: Vec<_> = tree.iter().map(|(_, n)| n.func.as_str()).collect();
        assert_eq!(names, vec!["root", "A", "A1", "A2", "B"]);
        let root_children: Vec<_> = tree
            .node(tree.root())
            .map(|n| n.children().to_vec())
            .unwrap_or_default();
        assert_eq!(root_children, vec![id_of(&tree, "A"), id_of(&tree, "B")]);
    }

    #[test]
    fn find_parent_within_selection_root() {
        let tree = sample();
        let a = id_of(&tree, "A");
        let a2 = id_of(&tree, "A2");
        assert_eq!(tree.find_parent(a2, tree.root()), Some(a));
        assert_eq!(tree.find_parent(a, tree.root()), Some(tree.root()));
        assert_eq!(tree.find_parent(tree.root(), tree.root()), None);
    }

    #[test]
    fn find_parent_outside_subtree() {
        let tree = sample();
        let a = id_of(&tree, "A");
        let b = id_of(&tree, "B");
        // B's parent is the root, which is not inside A's subtree.
        assert_eq!(tree.find_parent(b, a), None);
        // A itself is the subtree root.
        assert_eq!(tree.find_parent(a, a), None);
    }

    #[test]
    fn find_parent_of_unknown_node() {
        let tree = sample();
        assert_eq!(tree.find_parent(NodeId(99), tree.root()), None);
    }

    #[test]
    fn width_ratio_prefers_fraction() {
        let tree = sample();
        let root = tree.node(tree.root()).expect("root");
        let mut child = tree.node(id_of(&tree, "B")).expect("B").clone();
        assert!((tree.width_ratio(root, &child) - 0.4).abs() < 1e-12);
        child.fraction = Some(0.25);
        assert!((tree.width_ratio(root, &child) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn zero_parent_count_collapses_width() {
        let tree = CallTree::new(
            ProfileNode::new("root", "", 0, 0.0)
                .with_children(vec![ProfileNode::new("c", "", 0, 5.0)]),
        );
        let root = tree.node(NodeId(0)).expect("root");
        let child = tree.node(NodeId(1)).expect("child");
        assert_eq!(tree.width_ratio(root, child), 0.0);
    }

    #[test]
    fn location_text() {
        let tree = sample();
        let a1 = tree.node(id_of(&tree, "A1")).and_then(CallTreeNode::location);
        assert_eq!(a1.as_deref(), Some("a.rs:10"));
        assert_eq!(tree.node(tree.root()).and_then(CallTreeNode::location), None);
    }
}
