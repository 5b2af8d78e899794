//! Deterministic per-call-site colors.
//!
//! The color of a node depends only on its `(file, line)` pair and flags, so
//! the same call site keeps its hue across redraws, zooms and trees.

use icicle_protocol::Color;

use crate::model::{CallTreeNode, FrameFlags};

/// Fill, stroke and label colors of one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeColors {
    pub fill: Color,
    pub stroke: Color,
    pub text: Color,
}

/// 32-bit string hash of `file` followed by the decimal `line`.
///
/// `hash = hash * 31 + unit` over UTF-16 code units, wrapping.
pub fn site_hash(file: &str, line: i64) -> i32 {
    let line = line.to_string();
    file.encode_utf16()
        .chain(line.encode_utf16())
        .fold(0i32, |hash, unit| {
            (hash << 5).wrapping_sub(hash).wrapping_add(i32::from(unit))
        })
}

/// Mulberry32 generator yielding floats in `[0, 1)`.
#[derive(Debug, Clone)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub fn next_f64(&mut self) -> f64 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        f64::from(t ^ (t >> 14)) / 4_294_967_296.0
    }
}

/// Perturb `base` by up to `±range/2` per channel, seeded by `hash`.
///
/// Gray bases move all channels together so they stay achromatic.
fn jitter(base: (f64, f64, f64), hash: i32, range: f64) -> (f64, f64, f64) {
    let mut rng = Mulberry32::new(hash as u32);
    let mut shift = |v: f64| (v + (rng.next_f64() - 0.5) * range).clamp(0.0, 255.0);
    let (r, g, b) = base;
    if r == g && g == b {
        let v = shift(r);
        (v, v, v)
    } else {
        let r = shift(r);
        let g = shift(g);
        let b = shift(b);
        (r, g, b)
    }
}

/// Colors for a call site with the given flags.
pub fn colors_for(file: &str, line: i64, flags: FrameFlags) -> NodeColors {
    let hash = site_hash(file, line);
    let (r, g, b) = if flags.contains(FrameFlags::RUNTIME_DISPATCH) {
        jitter((204.0, 103.0, 103.0), hash, 20.0)
    } else if flags.contains(FrameFlags::GC) {
        jitter((204.0, 153.0, 68.0), hash, 20.0)
    } else if flags.contains(FrameFlags::COMPILATION) {
        jitter((100.0, 100.0, 100.0), hash, 60.0)
    } else {
        jitter((64.0, 99.0, 221.0), hash, 70.0)
    };
    let alpha = if flags.contains(FrameFlags::FOREIGN) {
        0.5
    } else {
        1.0
    };

    let fill = Color::rgba(r as f32, g as f32, b as f32, alpha);
    NodeColors {
        fill,
        stroke: fill.scaled(0.8),
        text: Color::rgba(255.0, 255.0, 255.0, alpha.max(0.6)),
    }
}

/// Colors of a tree node.
pub fn color_of(node: &CallTreeNode) -> NodeColors {
    colors_for(&node.file, node.line, node.flags)
}
