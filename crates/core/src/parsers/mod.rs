pub mod collapsed;

use std::path::Path;

use thiserror::Error;

use crate::model::ProfileForest;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("collapsed: {0}")]
    Collapsed(#[from] collapsed::CollapsedParseError),
}

/// Detect the input format and parse it into a forest.
///
/// Detection strategy:
/// 1. A JSON object is the `{ selectionKey: ProfileNode }` wire format.
/// 2. Anything else is treated as collapsed stacks.
pub fn parse_auto(data: &[u8]) -> Result<ProfileForest, LoadError> {
    let first = data.iter().find(|b| !b.is_ascii_whitespace());
    if first == Some(&b'{') {
        return Ok(ProfileForest::from_json(data)?);
    }
    Ok(collapsed::parse_collapsed(data)?)
}

/// Read and parse a profile file.
pub fn load_forest(path: impl AsRef<Path>) -> Result<ProfileForest, LoadError> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let forest = parse_auto(&data)?;
    log::info!(
        "loaded {} ({} selection(s))",
        path.display(),
        forest.len()
    );
    Ok(forest)
}
