pub mod call_tree;
pub mod forest;
pub mod node;

pub use call_tree::{CallTree, CallTreeNode, NodeId};
pub use forest::{ALL_SELECTION, ProfileForest, Selection};
pub use node::{CountLabel, FrameFlags, ProfileNode};
