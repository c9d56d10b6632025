//! In-memory deck: page geometry, rendered slides and their shapes.
//!
//! Coordinates are EMUs (English Metric Units, 914400 EMU = 1 inch), the
//! unit the package format stores.

use crate::error::Result;
use crate::pptx::PptxWriter;
use slidegen_common::FontFamily;
use std::path::Path;

pub const EMU_PER_INCH: f64 = 914_400.0;

/// Convert inches to EMUs, rounding to the nearest unit.
pub fn inches(value: f64) -> i64 {
    (value * EMU_PER_INCH).round() as i64
}

/// An axis-aligned box on the page, in EMUs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl Rect {
    pub fn from_inches(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x: inches(x),
            y: inches(y),
            width: inches(width),
            height: inches(height),
        }
    }

    pub fn right(&self) -> i64 {
        self.x + self.width
    }
}

/// Document-wide page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageGeometry {
    pub width: i64,
    pub height: i64,
}

impl PageGeometry {
    pub fn width_in(&self) -> f64 {
        self.width as f64 / EMU_PER_INCH
    }

    pub fn height_in(&self) -> f64 {
        self.height as f64 / EMU_PER_INCH
    }
}

impl Default for PageGeometry {
    /// 10" x 7.5", the blank 4:3 template.
    fn default() -> Self {
        Self {
            width: 9_144_000,
            height: 6_858_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);

    pub fn hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunStyle {
    pub font: FontFamily,
    pub size_pt: f64,
    pub bold: bool,
    pub color: Option<Rgb>,
}

impl RunStyle {
    pub fn new(font: FontFamily, size_pt: f64) -> Self {
        Self {
            font,
            size_pt,
            bold: false,
            color: None,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn color(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub text: String,
    pub style: RunStyle,
    pub align: Align,
    pub bullet: bool,
    pub space_before_pt: Option<f64>,
}

impl Paragraph {
    pub fn new(text: impl Into<String>, style: RunStyle) -> Self {
        Self {
            text: text.into(),
            style,
            align: Align::Left,
            bullet: false,
            space_before_pt: None,
        }
    }

    pub fn centered(mut self) -> Self {
        self.align = Align::Center;
        self
    }

    pub fn bulleted(mut self) -> Self {
        self.bullet = true;
        self
    }

    pub fn space_before(mut self, pt: f64) -> Self {
        self.space_before_pt = Some(pt);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub frame: Rect,
    pub paragraphs: Vec<Paragraph>,
    pub word_wrap: bool,
}

/// Raster formats the package can embed as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
}

impl ImageKind {
    pub fn extension(self) -> &'static str {
        match self {
            ImageKind::Png => "png",
            ImageKind::Jpeg => "jpeg",
            ImageKind::Gif => "gif",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ImageKind::Png => "image/png",
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Gif => "image/gif",
        }
    }
}

/// Fetched image bytes, already in an embeddable format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub bytes: Vec<u8>,
    pub kind: ImageKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Picture {
    pub frame: Rect,
    pub image: ImageData,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Text(TextBox),
    Picture(Picture),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedSlide {
    pub layout: &'static str,
    pub title: String,
    pub shapes: Vec<Shape>,
}

impl RenderedSlide {
    pub fn pictures(&self) -> impl Iterator<Item = &Picture> {
        self.shapes.iter().filter_map(|s| match s {
            Shape::Picture(p) => Some(p),
            Shape::Text(_) => None,
        })
    }

    pub fn text_boxes(&self) -> impl Iterator<Item = &TextBox> {
        self.shapes.iter().filter_map(|s| match s {
            Shape::Text(t) => Some(t),
            Shape::Picture(_) => None,
        })
    }
}

/// The growing presentation: appended to slide by slide, then saved once.
#[derive(Debug, Clone, Default)]
pub struct Deck {
    pub title: String,
    pub geometry: PageGeometry,
    slides: Vec<RenderedSlide>,
}

impl Deck {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            geometry: PageGeometry::default(),
            slides: Vec::new(),
        }
    }

    pub fn push(&mut self, slide: RenderedSlide) {
        self.slides.push(slide);
    }

    pub fn slides(&self) -> &[RenderedSlide] {
        &self.slides
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        PptxWriter::to_bytes(self)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        PptxWriter::write(path, self)
    }
}
