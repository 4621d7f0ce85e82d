use crate::core::models::document::TextStyle;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::from_u8(0, 0, 0);
    pub const LIGHT_GRAY: Rgb = Rgb::from_u8(192, 192, 192);
    pub const DARK_GRAY: Rgb = Rgb::from_u8(64, 64, 64);
    pub const GREEN: Rgb = Rgb::from_u8(0, 102, 0);

    pub const fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Parses `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::from_u8(channel(0)?, channel(2)?, channel(4)?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontFamily {
    #[default]
    Times,
    Helvetica,
    Courier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFace {
    Regular,
    Bold,
    Italic,
}

impl FontFace {
    pub const ALL: [FontFace; 3] = [FontFace::Regular, FontFace::Bold, FontFace::Italic];

    pub(crate) fn resource_name(&self) -> &'static str {
        match self {
            Self::Regular => "F1",
            Self::Bold => "F2",
            Self::Italic => "F3",
        }
    }
}

impl FontFamily {
    /// Name of the standard Type1 font for `face`.
    pub fn base_font(&self, face: FontFace) -> &'static str {
        match (self, face) {
            (Self::Times, FontFace::Regular) => "Times-Roman",
            (Self::Times, FontFace::Bold) => "Times-Bold",
            (Self::Times, FontFace::Italic) => "Times-Italic",
            (Self::Helvetica, FontFace::Regular) => "Helvetica",
            (Self::Helvetica, FontFace::Bold) => "Helvetica-Bold",
            (Self::Helvetica, FontFace::Italic) => "Helvetica-Oblique",
            (Self::Courier, FontFace::Regular) => "Courier",
            (Self::Courier, FontFace::Bold) => "Courier-Bold",
            (Self::Courier, FontFace::Italic) => "Courier-Oblique",
        }
    }
}

impl FromStr for FontFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "times" | "serif" => Ok(Self::Times),
            "helvetica" | "sans-serif" => Ok(Self::Helvetica),
            "courier" | "monospace" => Ok(Self::Courier),
            other => Err(format!("unknown font family '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    pub face: FontFace,
    pub size: f32,
    pub color: Rgb,
    /// Baseline shift in points; negative values lower the text.
    pub rise: f32,
}

impl FontSpec {
    const fn new(face: FontFace, size: f32, color: Rgb) -> Self {
        Self {
            face,
            size,
            color,
            rise: 0.0,
        }
    }
}

/// Presentation constants of a report. Passed by reference into every build.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub family: FontFamily,
    pub title: FontSpec,
    pub byline: FontSpec,
    pub abstract_text: FontSpec,
    pub heading: FontSpec,
    pub label: FontSpec,
    pub normal: FontSpec,
    pub subscript: FontSpec,
    pub rule_color: Rgb,
    pub rule_width: f32,
    pub image_padding: f32,
    pub margin: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            family: FontFamily::Times,
            title: FontSpec::new(FontFace::Bold, 24.0, Rgb::GREEN),
            byline: FontSpec::new(FontFace::Bold, 12.0, Rgb::LIGHT_GRAY),
            abstract_text: FontSpec::new(FontFace::Italic, 16.0, Rgb::DARK_GRAY),
            heading: FontSpec::new(FontFace::Bold, 16.0, Rgb::GREEN),
            label: FontSpec::new(FontFace::Bold, 12.0, Rgb::BLACK),
            normal: FontSpec::new(FontFace::Regular, 12.0, Rgb::BLACK),
            subscript: FontSpec {
                rise: -2.0,
                ..FontSpec::new(FontFace::Regular, 7.0, Rgb::BLACK)
            },
            rule_color: Rgb::LIGHT_GRAY,
            rule_width: 0.5,
            image_padding: 10.0,
            margin: 36.0,
        }
    }
}

impl Theme {
    pub fn font(&self, style: TextStyle) -> &FontSpec {
        match style {
            TextStyle::Title => &self.title,
            TextStyle::Byline => &self.byline,
            TextStyle::Abstract => &self.abstract_text,
            TextStyle::Heading => &self.heading,
            TextStyle::Label => &self.label,
            TextStyle::Normal => &self.normal,
            TextStyle::Subscript => &self.subscript,
        }
    }

    /// Recolors the title and section headings.
    pub fn with_accent(mut self, accent: Rgb) -> Self {
        self.title.color = accent;
        self.heading.color = accent;
        self
    }

    pub fn with_family(mut self, family: FontFamily) -> Self {
        self.family = family;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageFormat {
    #[default]
    A4,
    Letter,
}

impl PageFormat {
    /// Width and height in points.
    pub fn size(&self) -> (f32, f32) {
        match self {
            Self::A4 => (595.28, 841.89),
            Self::Letter => (612.0, 792.0),
        }
    }
}

impl FromStr for PageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a4" => Ok(Self::A4),
            "letter" => Ok(Self::Letter),
            other => Err(format!("unknown page format '{other}' (expected a4 or letter)")),
        }
    }
}
