use std::collections::HashMap;

use thiserror::Error;

use crate::model::{ALL_SELECTION, ProfileForest, ProfileNode};

#[derive(Debug, Error)]
pub enum CollapsedParseError {
    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("no valid stack lines found")]
    Empty,
}

/// Parse Brendan Gregg's collapsed/folded stack format into a single
/// `"all"` call tree.
///
/// Each line has the format: `stack_frame;stack_frame;... count`
/// where frames are separated by `;` and the count is the last whitespace-separated token.
/// Identical prefixes merge; children keep the order they were first seen in.
///
/// Used by: `perf script | stackcollapse-perf.pl`, dtrace, py-spy, FlameGraph tools.
pub fn parse_collapsed(data: &[u8]) -> Result<ProfileForest, CollapsedParseError> {
    let text = std::str::from_utf8(data)?;

    let mut nodes = vec![ProfileNode::new(ALL_SELECTION, "", 0, 0.0)];
    let mut children: Vec<Vec<usize>> = vec![Vec::new()];
    let mut index: HashMap<(usize, &str), usize> = HashMap::new();
    let mut samples = 0usize;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Split into stack and count: "a;b;c 42"
        let (stack_str, count) = match line.rfind(' ') {
            Some(pos) => {
                let count: f64 = line[pos + 1..].trim().parse().unwrap_or(1.0);
                (line[..pos].trim(), count)
            }
            None => continue,
        };
        if stack_str.is_empty() {
            continue;
        }

        samples += 1;
        nodes[0].count += count;
        let mut parent = 0;
        for token in stack_str.split(';').map(str::trim).filter(|t| !t.is_empty()) {
            let id = *index.entry((parent, token)).or_insert_with(|| {
                let (func, file, line) = split_location(token);
                nodes.push(ProfileNode::new(func, file, line, 0.0));
                children.push(Vec::new());
                children[parent].push(nodes.len() - 1);
                nodes.len() - 1
            });
            nodes[id].count += count;
            parent = id;
        }
    }

    if samples == 0 {
        return Err(CollapsedParseError::Empty);
    }

    // Children always come after their parent, so a reverse sweep finds
    // every subtree complete before it is attached.
    let mut built: Vec<Option<ProfileNode>> = nodes.into_iter().map(Some).collect();
    for id in (0..built.len()).rev() {
        let kids: Vec<ProfileNode> = children[id]
            .iter()
            .filter_map(|&c| built[c].take())
            .collect();
        if let Some(node) = built[id].as_mut() {
            node.children = kids;
        }
    }

    let root = built
        .into_iter()
        .next()
        .flatten()
        .ok_or(CollapsedParseError::Empty)?;
    log::debug!("collapsed: {samples} stacks");
    Ok(ProfileForest::from_roots([(ALL_SELECTION, root)]))
}

/// `name (file:line)` as written by py-spy; anything else is a bare name.
fn split_location(token: &str) -> (&str, &str, i64) {
    let parsed = token
        .strip_suffix(')')
        .and_then(|rest| rest.rsplit_once(" ("))
        .and_then(|(name, loc)| {
            let (file, line) = loc.rsplit_once(':')?;
            Some((name, file, line.parse().ok()?))
        });
    parsed.unwrap_or((token, "", 0))
}
