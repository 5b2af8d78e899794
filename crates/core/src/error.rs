use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewerError {
    /// The draw surface cannot host a viewer: negative or non-finite size,
    /// or a pixel ratio that is not a positive number.
    #[error("invalid surface: {width}x{height} at dpr {dpr}")]
    InvalidSurface { width: f64, height: f64, dpr: f64 },
    #[error("unknown selection {0:?}")]
    UnknownSelection(String),
}
