//! SVG document builder.
//!
//! Appends elements to an in-memory document and serializes it in one go.
//! Coordinates are rounded to two decimals to keep output compact.

use std::fmt::{self, Write};

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const GREEN: Color = Color::rgb(0, 128, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const GRAY: Color = Color::rgb(128, 128, 128);
    pub const LIGHT_GRAY: Color = Color::rgb(221, 221, 221);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Escape text for use in element content and attribute values.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Round to two decimals for output.
fn n(v: f64) -> f64 {
    let r = (v * 100.0).round() / 100.0;
    // Avoid "-0" in the output.
    if r == 0.0 {
        0.0
    } else {
        r
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    fn as_str(self) -> &'static str {
        match self {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
            Anchor::End => "end",
        }
    }
}

/// Text element options.
#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    pub size: f64,
    pub anchor: Anchor,
    /// Rotation in degrees around the text origin.
    pub rotate: f64,
    pub bold: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 12.0,
            anchor: Anchor::Start,
            rotate: 0.0,
            bold: false,
        }
    }
}

/// SVG document under construction.
#[derive(Debug)]
pub struct SvgDocument {
    width: u32,
    height: u32,
    title: Option<String>,
    body: String,
}

impl SvgDocument {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            title: None,
            body: String::new(),
        }
    }

    /// Accessible title (`<title>` element).
    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Rectangle with optional fill and stroke.
    pub fn rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Option<Color>,
        stroke: Option<(Color, f64)>,
    ) {
        let _ = write!(
            self.body,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"",
            n(x),
            n(y),
            n(width.max(0.0)),
            n(height.max(0.0))
        );
        match fill {
            Some(c) => {
                let _ = write!(self.body, " fill=\"{}\"", c);
            }
            None => self.body.push_str(" fill=\"none\""),
        }
        if let Some((c, w)) = stroke {
            let _ = write!(self.body, " stroke=\"{}\" stroke-width=\"{}\"", c, n(w));
        }
        self.body.push_str("/>");
    }

    /// Straight line segment.
    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: Color, width: f64) {
        let _ = write!(
            self.body,
            "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{}\" stroke-width=\"{}\"/>",
            n(x1),
            n(y1),
            n(x2),
            n(y2),
            stroke,
            n(width)
        );
    }

    /// Open path through `points`. Fewer than two points draws nothing.
    pub fn polyline(&mut self, points: &[(f64, f64)], stroke: Color, width: f64) {
        if points.len() < 2 {
            return;
        }
        let mut d = String::new();
        for (i, (x, y)) in points.iter().enumerate() {
            let cmd = if i == 0 { 'M' } else { 'L' };
            let _ = write!(d, "{}{} {} ", cmd, n(*x), n(*y));
        }
        let _ = write!(
            self.body,
            "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\" stroke-linejoin=\"round\"/>",
            d.trim_end(),
            stroke,
            n(width)
        );
    }

    /// Filled circle.
    pub fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: Color) {
        let _ = write!(
            self.body,
            "<circle cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"{}\"/>",
            n(cx),
            n(cy),
            n(r),
            fill
        );
    }

    /// Text at `(x, y)` (baseline), escaped.
    pub fn text(&mut self, x: f64, y: f64, content: &str, style: TextStyle) {
        let _ = write!(
            self.body,
            "<text x=\"{}\" y=\"{}\" font-size=\"{}\" text-anchor=\"{}\"",
            n(x),
            n(y),
            n(style.size),
            style.anchor.as_str()
        );
        if style.bold {
            self.body.push_str(" font-weight=\"bold\"");
        }
        if style.rotate != 0.0 {
            let _ = write!(
                self.body,
                " transform=\"rotate({} {} {})\"",
                n(style.rotate),
                n(x),
                n(y)
            );
        }
        let _ = write!(self.body, ">{}</text>", escape_xml(content));
    }

    /// Serialize the document.
    pub fn finish(self) -> String {
        let mut out = String::with_capacity(self.body.len() + 256);
        let _ = write!(
            out,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" font-family=\"DejaVu Sans, Helvetica, Arial, sans-serif\">",
            w = self.width,
            h = self.height
        );
        if let Some(title) = &self.title {
            let _ = write!(out, "<title>{}</title>", escape_xml(title));
        }
        out.push_str(&self.body);
        out.push_str("</svg>");
        out
    }
}
