use std::collections::HashMap;

use serde::Deserialize;

use super::call_tree::CallTree;
use super::node::ProfileNode;

/// Selection key that always sorts first.
pub const ALL_SELECTION: &str = "all";

/// One top-level root of the forest, e.g. one thread.
#[derive(Debug, Clone)]
pub struct Selection {
    pub key: String,
    pub tree: CallTree,
}

/// Call trees keyed by selection (thread id, `"all"`, ...).
///
/// Keys are kept sorted: `"all"` first, the rest lexicographically.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "HashMap<String, ProfileNode>")]
pub struct ProfileForest {
    selections: Vec<Selection>,
}

impl ProfileForest {
    pub fn from_roots<I, K>(roots: I) -> Self
    where
        I: IntoIterator<Item = (K, ProfileNode)>,
        K: Into<String>,
    {
        let mut selections: Vec<Selection> = roots
            .into_iter()
            .map(|(key, root)| Selection {
                key: key.into(),
                tree: CallTree::new(root),
            })
            .collect();
        selections.sort_by(|a, b| selection_order(&a.key, &b.key));
        Self { selections }
    }

    /// Parse the `{ selectionKey: ProfileNode }` wire format.
    pub fn from_json(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.selections.iter().map(|s| s.key.as_str())
    }

    pub fn first_key(&self) -> Option<&str> {
        self.selections.first().map(|s| s.key.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&CallTree> {
        self.selections
            .iter()
            .find(|s| s.key == key)
            .map(|s| &s.tree)
    }

    pub fn selections(&self) -> &[Selection] {
        &self.selections
    }

    pub fn len(&self) -> usize {
        self.selections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }
}

impl From<HashMap<String, ProfileNode>> for ProfileForest {
    fn from(map: HashMap<String, ProfileNode>) -> Self {
        Self::from_roots(map)
    }
}

fn selection_order(a: &str, b: &str) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a == ALL_SELECTION, b == ALL_SELECTION) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.cmp(b),
    }
}
