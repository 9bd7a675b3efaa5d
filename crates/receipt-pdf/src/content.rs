//! Page content stream emission.
//!
//! Draw operations are translated one-to-one into content stream operators.
//! The operator language is stateful: a colour set applies to every later
//! draw until the next set, so operation order is preserved exactly.
//!
//! ```text
//! 0.09 0.13 0.24 rg            fill colour
//! 0 745.89 595.28 96 re f      filled rectangle
//! BT /F2 20 Tf 48 797.89 Td (Payout Receipt) Tj ET
//! 0.5 w 48 690 m 547.28 690 l S
//! ```

use crate::sanitize::escape;

/// An RGB colour with components in 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f64, pub f64, pub f64);

/// Font resources declared on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontRef {
    Regular,
    Bold,
}

impl FontRef {
    /// Resource name under the page's `/Font` dictionary
    pub fn resource_name(&self) -> &'static str {
        match self {
            FontRef::Regular => "F1",
            FontRef::Bold => "F2",
        }
    }

    /// Standard 14 base font backing this resource
    pub fn base_font(&self) -> &'static str {
        match self {
            FontRef::Regular => "Helvetica",
            FontRef::Bold => "Helvetica-Bold",
        }
    }
}

/// A positioned drawing instruction in page space (origin bottom-left)
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    FillColor(Rgb),
    StrokeColor(Rgb),
    /// Sanitized, unescaped text with its baseline origin
    Text {
        text: String,
        x: f64,
        y: f64,
        size: f64,
        font: FontRef,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        width: f64,
    },
    Rect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
    },
}

/// Accumulates content stream tokens in emission order
#[derive(Debug, Default)]
pub struct ContentStream {
    tokens: Vec<String>,
}

impl ContentStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fill_color(&mut self, color: Rgb) -> &mut Self {
        self.tokens
            .push(format!("{} {} {} rg", color.0, color.1, color.2));
        self
    }

    pub fn set_stroke_color(&mut self, color: Rgb) -> &mut Self {
        self.tokens
            .push(format!("{} {} {} RG", color.0, color.1, color.2));
        self
    }

    /// Show `text` at (x, y). The text is escaped here; it must already be
    /// sanitized.
    pub fn draw_text(&mut self, text: &str, x: f64, y: f64, size: f64, font: FontRef) -> &mut Self {
        self.tokens.push("BT".to_string());
        self.tokens
            .push(format!("/{} {} Tf", font.resource_name(), size));
        self.tokens.push(format!("{} {} Td", x, y));
        self.tokens.push(format!("({}) Tj", escape(text)));
        self.tokens.push("ET".to_string());
        self
    }

    pub fn stroke_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, width: f64) -> &mut Self {
        self.tokens.push(format!("{} w", width));
        self.tokens
            .push(format!("{} {} m {} {} l S", x1, y1, x2, y2));
        self
    }

    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) -> &mut Self {
        self.tokens.push(format!("{} {} {} {} re f", x, y, w, h));
        self
    }

    /// Append one draw operation
    pub fn push(&mut self, op: &DrawOp) -> &mut Self {
        match op {
            DrawOp::FillColor(color) => self.set_fill_color(*color),
            DrawOp::StrokeColor(color) => self.set_stroke_color(*color),
            DrawOp::Text {
                text,
                x,
                y,
                size,
                font,
            } => self.draw_text(text, *x, *y, *size, *font),
            DrawOp::Line {
                x1,
                y1,
                x2,
                y2,
                width,
            } => self.stroke_line(*x1, *y1, *x2, *y2, *width),
            DrawOp::Rect { x, y, w, h } => self.fill_rect(*x, *y, *w, *h),
        }
    }

    /// Newline-joined stream body
    pub fn finish(self) -> String {
        self.tokens.join("\n")
    }
}

/// Translate a full list of draw operations into a content stream body
pub fn emit(ops: &[DrawOp]) -> String {
    let mut stream = ContentStream::new();
    for op in ops {
        stream.push(op);
    }
    stream.finish()
}
