use serde::{Deserialize, Serialize};

use crate::types::Color;

/// Semantic color tokens resolved by the host's active stylesheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeToken {
    Background,
    /// Outline drawn around the hovered node.
    HoverBorder,

    TextPrimary,
    TextMuted,

    TooltipBackground,
    TooltipBorder,
    TooltipText,

    ToolbarBackground,
    ToolbarText,
    ToolbarBorder,
}

/// Fill or stroke source for a render command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Paint {
    /// A concrete color computed by the core (per-node hash colors).
    Solid(Color),
    /// A chrome color left to the host's theme.
    Theme(ThemeToken),
}

impl From<Color> for Paint {
    fn from(c: Color) -> Self {
        Paint::Solid(c)
    }
}

impl From<ThemeToken> for Paint {
    fn from(t: ThemeToken) -> Self {
        Paint::Theme(t)
    }
}
