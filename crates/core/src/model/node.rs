use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

bitflags! {
    /// Classification of a sampled frame. Several flags may be set at once.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FrameFlags: u32 {
        const RUNTIME_DISPATCH = 0x01;
        const GC = 0x02;
        const COMPILATION = 0x08;
        /// Native (C/foreign) frame.
        const FOREIGN = 0x10;
    }
}

impl FrameFlags {
    /// Display names of the set flags, in bit order.
    pub fn names(self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.contains(Self::RUNTIME_DISPATCH) {
            names.push("runtime-dispatch");
        }
        if self.contains(Self::GC) {
            names.push("GC");
        }
        if self.contains(Self::COMPILATION) {
            names.push("compilation");
        }
        if self.contains(Self::FOREIGN) {
            names.push("foreign");
        }
        names
    }
}

impl Default for FrameFlags {
    fn default() -> Self {
        Self::empty()
    }
}

// Serialized as the raw bitmask so unknown bits survive a round trip.
impl Serialize for FrameFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.bits())
    }
}

impl<'de> Deserialize<'de> for FrameFlags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits = u32::deserialize(deserializer)?;
        Ok(Self::from_bits_retain(bits))
    }
}

/// Replacement text for a node's sample count in the tooltip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CountLabel {
    Number(f64),
    Text(String),
}

impl fmt::Display for CountLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// One frame of an externally supplied call tree, as it arrives on the wire.
///
/// The viewer consumes these on `set_data` and flattens them into a
/// [`CallTree`](super::CallTree); it never mutates them in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileNode {
    /// Function name.
    pub func: String,
    /// Display file name. Together with `line` this seeds the node color.
    #[serde(default)]
    pub file: String,
    /// Full source path, handed to the ctrl-click handler.
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub line: i64,
    /// Sample count (weight).
    pub count: f64,
    /// Width as a fraction of the parent; defaults to `count / parent.count`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fraction: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count_label: Option<CountLabel>,
    #[serde(default)]
    pub flags: FrameFlags,
    #[serde(default)]
    pub children: Vec<ProfileNode>,
}

impl ProfileNode {
    pub fn new(func: impl Into<String>, file: impl Into<String>, line: i64, count: f64) -> Self {
        let file = file.into();
        Self {
            func: func.into(),
            path: file.clone(),
            file,
            line,
            count,
            fraction: None,
            count_label: None,
            flags: FrameFlags::empty(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<ProfileNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_flags(mut self, flags: FrameFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_fraction(mut self, fraction: f64) -> Self {
        self.fraction = Some(fraction);
        self
    }

    pub fn with_count_label(mut self, label: CountLabel) -> Self {
        self.count_label = Some(label);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_wire_format() {
        let json = r#"{
            "func": "eval",
            "file": "boot.jl",
            "path": "/usr/share/julia/base/boot.jl",
            "line": 373,
            "count": 42,
            "countLabel": "42 ms",
            "flags": 3,
            "children": [{ "func": "inner", "count": 10 }]
        }"#;
        let node: ProfileNode = serde_json::from_str(json).expect("parse");
        assert_eq!(node.func, "eval");
        assert_eq!(node.line, 373);
        assert_eq!(node.count_label, Some(CountLabel::Text("42 ms".into())));
        assert_eq!(node.flags, FrameFlags::RUNTIME_DISPATCH | FrameFlags::GC);
        assert_eq!(node.children.len(), 1);
        assert_eq!(node.children[0].file, "");
        assert_eq!(node.children[0].fraction, None);
    }

    #[test]
    fn unknown_flag_bits_are_retained() {
        let node: ProfileNode =
            serde_json::from_str(r#"{ "func": "f", "count": 1, "flags": 68 }"#).expect("parse");
        assert_eq!(node.flags.bits(), 68);
        assert!(node.flags.contains(FrameFlags::from_bits_retain(0x40)));
        let json = serde_json::to_string(&node.flags).expect("serialize");
        assert_eq!(json, "68");
    }

    #[test]
    fn numeric_count_label() {
        let node: ProfileNode =
            serde_json::from_str(r#"{ "func": "f", "count": 1, "countLabel": 7 }"#)
                .expect("parse");
        assert_eq!(node.count_label.map(|l| l.to_string()), Some("7".into()));
    }

    #[test]
    fn flag_names_in_bit_order() {
        let flags = FrameFlags::FOREIGN | FrameFlags::GC | FrameFlags::COMPILATION;
        assert_eq!(flags.names(), vec!["GC", "compilation", "foreign"]);
        assert!(FrameFlags::empty().names().is_empty());
    }
}
