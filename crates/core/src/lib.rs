pub mod color;
pub mod config;
pub mod error;
pub mod hit;
pub mod layout;
pub mod metrics;
pub mod model;
pub mod parsers;
pub mod render;
pub mod schedule;
pub mod style;
pub mod viewer;

pub use config::{ConfigError, ViewerConfig};
pub use error::ViewerError;
pub use metrics::{CellMetrics, FontMetrics, ProportionalMetrics};
pub use model::{CallTree, CallTreeNode, FrameFlags, NodeId, ProfileForest, ProfileNode};
pub use parsers::{LoadError, load_forest, parse_auto};
pub use render::{Overlay, Tooltip, TooltipPlacement};
pub use schedule::SurfaceSize;
pub use style::{StyleRegistry, Stylesheet, ThemeMode};
pub use viewer::{Click, ClickAction, FrameOutput, Modifiers, ProfileViewer};
