//! Sidebar shape catalog.

use crate::state::{NodeConfig, ShapeKind};

/// One sidebar button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeSpec {
    pub name: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
    /// Clicking this entry groups the selection instead of adding a node.
    pub is_group: bool,
}

const fn shape(name: &'static str, icon: &'static str, color: &'static str) -> ShapeSpec {
    ShapeSpec {
        name,
        icon,
        color,
        is_group: false,
    }
}

pub const MASTER_SHAPES: &[ShapeSpec] = &[
    shape("Actor", "👤", "#ffd100"),
    shape("Action", "⚡", "#36b4ff"),
    shape("Read Model", "📄", "#66cc66"),
    shape("Consistent Business Rule", "✅", "#aa55ff"),
    shape("Domain Event", "📢", "#ff8e50"),
];

pub const SUPPORT_SHAPES: &[ShapeSpec] = &[
    shape("External System", "🌐", "#98b0fe"),
    shape("Hotspot", "🔥", "#ff5050"),
    shape("Opportunity", "💡", "#fce588"),
    shape("UI", "🖥️", "#8ce8ff"),
    shape("Eventually Consistent Business Rule", "⏳", "#d0a8ff"),
];

pub const OTHER_SHAPES: &[ShapeSpec] = &[
    ShapeSpec {
        name: "Behavior (Group Node)",
        icon: "🗂️",
        color: "#e0e0e0",
        is_group: true,
    },
    shape("Pivotal Event", "⭐", "#ffdd88"),
    shape("Arrow", "➡️", "#888888"),
];

/// Every palette entry, in sidebar order.
pub fn all_shapes() -> impl Iterator<Item = &'static ShapeSpec> {
    MASTER_SHAPES
        .iter()
        .chain(SUPPORT_SHAPES)
        .chain(OTHER_SHAPES)
}

pub fn find_shape(name: &str) -> Option<&'static ShapeSpec> {
    all_shapes().find(|s| s.name.eq_ignore_ascii_case(name))
}

/// Parse `#rrggbb` (leading `#` optional).
pub fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Black or white text, whichever reads better on `background`.
///
/// Uses YIQ brightness; unparseable colors get black text.
pub fn contrast_color(background: &str) -> &'static str {
    let Some((r, g, b)) = parse_hex_color(background) else {
        return "#000000";
    };
    let yiq = (u32::from(r) * 299 + u32::from(g) * 587 + u32::from(b) * 114) / 1000;
    if yiq >= 128 {
        "#000000"
    } else {
        "#ffffff"
    }
}

impl NodeConfig {
    /// Config for adding `shape` to the canvas.
    pub fn from_shape(shape: &ShapeSpec) -> Self {
        Self {
            name: shape.name.to_string(),
            icon: shape.icon.to_string(),
            color: shape.color.to_string(),
            text_color: contrast_color(shape.color).to_string(),
            node_type: Some(ShapeKind::from_name(shape.name)),
        }
    }
}
