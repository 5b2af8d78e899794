//! Row geometry derived from font metrics.

/// Source of the label font's vertical metrics.
///
/// Hosts implement this against their text stack; values are CSS pixels
/// for a font of `font_size` CSS pixels.
pub trait FontMetrics {
    /// `(ascent, descent)` of the label font.
    fn vertical_metrics(&self, font_size: f64) -> (f64, f64);
}

/// Fixed-ratio metrics for hosts without a font stack (tests, terminals).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProportionalMetrics {
    pub ascent: f64,
    pub descent: f64,
}

impl ProportionalMetrics {
    /// Typical sans-serif proportions.
    pub const SANS: ProportionalMetrics = ProportionalMetrics {
        ascent: 0.75,
        descent: 0.25,
    };
}

impl FontMetrics for ProportionalMetrics {
    fn vertical_metrics(&self, font_size: f64) -> (f64, f64) {
        (self.ascent * font_size, self.descent * font_size)
    }
}

/// One unit tall regardless of font size: a terminal cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct CellMetrics;

impl FontMetrics for CellMetrics {
    fn vertical_metrics(&self, _font_size: f64) -> (f64, f64) {
        (1.0, 0.0)
    }
}

/// Height of one icicle row in device pixels.
///
/// `ceil((ascent + descent + 2·border + 2·padding) · dpr)`.
pub fn row_height(
    metrics: &dyn FontMetrics,
    font_size: f64,
    border_width: f64,
    padding: f64,
    dpr: f64,
) -> f64 {
    let (ascent, descent) = metrics.vertical_metrics(font_size);
    ((ascent + descent + 2.0 * border_width + 2.0 * padding) * dpr).ceil()
}
