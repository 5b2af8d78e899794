use serde::{Deserialize, Serialize};

use crate::theme::Paint;
use crate::types::{Point, Rect};

/// A single, stateless render instruction in device pixels.
///
/// The core emits one `Vec<RenderCommand>` per layer (base and hover
/// overlay). Renderers consume each list sequentially; every command carries
/// all the data it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Fill a rectangle. `frame_id` names the tree node it belongs to, if any.
    DrawRect {
        rect: Rect,
        color: Paint,
        frame_id: Option<u64>,
    },

    /// Reset a rectangle to fully transparent.
    ClearRect { rect: Rect },

    /// Draw a single line of text. `position.y` is the vertical center.
    DrawText {
        position: Point,
        text: String,
        color: Paint,
        font_size: f64,
        align: TextAlign,
    },

    /// Restrict subsequent drawing to a rectangular region.
    SetClip { rect: Rect },

    /// Remove the active clip region.
    ClearClip,

    /// Begin a logical group. Renderers may use this for batching or
    /// accessibility; it has no visual effect.
    BeginGroup { id: String, label: Option<String> },

    /// End the current group.
    EndGroup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}
