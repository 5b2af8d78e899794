use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

/// An RGBA color with CSS semantics: `r`, `g`, `b` in `0..=255` (fractional
/// values are allowed and preserved), `a` in `0..=1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255.0, 255.0, 255.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Scale the color channels, keeping alpha.
    pub fn scaled(self, factor: f32) -> Self {
        Self {
            r: self.r * factor,
            g: self.g * factor,
            b: self.b * factor,
            a: self.a,
        }
    }

    /// Channels rounded to bytes, alpha mapped onto `0..=255`.
    pub fn to_rgba8(self) -> [u8; 4] {
        let byte = |v: f32| v.round().clamp(0.0, 255.0) as u8;
        [
            byte(self.r),
            byte(self.g),
            byte(self.b),
            byte(self.a * 255.0),
        ]
    }

    /// CSS `rgba(...)` notation.
    pub fn to_css(self) -> String {
        format!("rgba({},{},{},{})", self.r, self.g, self.b, self.a)
    }
}

/// Pixel dimensions of a draw target.
///
/// `width` and `height` are device pixels (CSS size × `dpr`, rounded).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub dpr: f64,
}

impl Viewport {
    /// Derive device-pixel dimensions from a CSS box.
    pub fn from_css(css_width: f64, css_height: f64, dpr: f64) -> Self {
        Self {
            width: (css_width * dpr).round(),
            height: (css_height * dpr).round(),
            dpr,
        }
    }

    pub fn css_width(&self) -> f64 {
        self.width / self.dpr
    }

    pub fn css_height(&self) -> f64 {
        self.height / self.dpr
    }
}
