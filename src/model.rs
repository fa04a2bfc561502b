/// One submitted form field, in submission order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldEntry {
    pub label: String,
    pub value: String,
}

impl FieldEntry {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    /// Label as printed on a card: underscores become spaces, then upper-cased.
    pub fn display_label(&self) -> String {
        self.label.replace('_', " ").to_uppercase()
    }
}

/// Identifier and date printed in the header subtitle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BriefingStamp {
    pub id: String,
    pub date: String,
}

/// Everything the card renderer needs for one document.
#[derive(Clone, Debug)]
pub struct Briefing {
    pub title: Option<String>,
    pub entries: Vec<FieldEntry>,
    pub stamp: BriefingStamp,
}

pub type Color = [u8; 3]; // RGB

pub(crate) const fn rgb(hex: u32) -> Color {
    [(hex >> 16) as u8, (hex >> 8) as u8, hex as u8]
}

pub mod palette {
    use super::{Color, rgb};

    pub const BACKGROUND: Color = rgb(0x0f172a);
    pub const CARD: Color = rgb(0x1e293b);
    pub const TEXT: Color = rgb(0xe2e8f0);
    pub const ACCENT: Color = rgb(0x3b82f6);
    pub const GOLD: Color = rgb(0xf59e0b);
    pub const BORDER: Color = rgb(0x334155);
    pub const SUBTITLE: Color = rgb(0x94a3b8);
    pub const FOOTER: Color = rgb(0x64748b);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontStyle {
    Regular,
    Bold,
}

/// What a text op is for. Lets consumers find header, cards and footer
/// without inspecting coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextRole {
    Title,
    Subtitle,
    Label,
    Value,
    Footer,
}

/// A single drawing instruction. Coordinates are in points with the origin
/// at the top-left corner of the page and `y` growing downward.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
    },
    RoundedRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        radius: f32,
        color: Color,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        width: f32,
        color: Color,
    },
    Text {
        content: String,
        x: f32,
        y: f32, // top of the first line
        width: Option<f32>,
        align: Alignment,
        font: FontStyle,
        size: f32,
        color: Color,
        role: TextRole,
    },
}

impl DrawOp {
    pub fn text_role(&self) -> Option<TextRole> {
        match self {
            DrawOp::Text { role, .. } => Some(*role),
            _ => None,
        }
    }

    pub fn text_content(&self) -> Option<&str> {
        match self {
            DrawOp::Text { content, .. } => Some(content),
            _ => None,
        }
    }
}

/// Drawing instructions for one physical page, in paint order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    pub fn texts(&self, role: TextRole) -> impl Iterator<Item = &DrawOp> {
        self.ops
            .iter()
            .filter(move |op| op.text_role() == Some(role))
    }

    /// Number of entry cards drawn on this page.
    pub fn card_count(&self) -> usize {
        self.texts(TextRole::Label).count()
    }
}
