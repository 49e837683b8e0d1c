//! Cell styling: colors, text flags, borders and the styles applied to
//! header, data and error cells.

mod rules;

pub use rules::{StylingLookup, StylingRule};

use crate::error::SheetResult;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

//==============================================================================
// Colors
//==============================================================================

/// RGBA color; an alpha of 0 means "no color"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const TRANSPARENT: Rgba = Rgba::new(255, 255, 255, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// 0xRRGGBB, alpha dropped
    pub fn to_rgb_u32(&self) -> u32 {
        (u32::from(self.r) << 16) | (u32::from(self.g) << 8) | u32::from(self.b)
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA`
    pub fn parse_hex(text: &str) -> Option<Self> {
        let hex = text.trim().strip_prefix('#').unwrap_or(text.trim());
        if !hex.is_ascii() {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            6 => Some(Rgba::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Rgba::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

impl TryFrom<String> for Rgba {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgba::parse_hex(&value).ok_or_else(|| format!("invalid color '{}'", value))
    }
}

impl From<Rgba> for String {
    fn from(value: Rgba) -> Self {
        value.to_string()
    }
}

//==============================================================================
// Text style and borders
//==============================================================================

bitflags! {
    /// Font decorations
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct TextStyle: u8 {
        const BOLD = 0b001;
        const ITALIC = 0b010;
        const UNDERLINE = 0b100;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderStyle {
    #[default]
    None,
    DashDot,
    DashDotDot,
    Dashed,
    Dotted,
    Double,
    Hair,
    Medium,
    MediumDashDot,
    MediumDashDotDot,
    MediumDashed,
    SlantDashDot,
    Thick,
    Thin,
}

/// Border style per cell edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Borders {
    pub top: BorderStyle,
    pub bottom: BorderStyle,
    pub left: BorderStyle,
    pub right: BorderStyle,
}

impl Borders {
    pub const NONE: Borders = Borders {
        top: BorderStyle::None,
        bottom: BorderStyle::None,
        left: BorderStyle::None,
        right: BorderStyle::None,
    };

    /// Header cells get a thick bottom edge
    pub const HEADER: Borders = Borders {
        bottom: BorderStyle::Thick,
        ..Borders::NONE
    };

    pub fn all(style: BorderStyle) -> Self {
        Self {
            top: style,
            bottom: style,
            left: style,
            right: style,
        }
    }
}

//==============================================================================
// Cell style
//==============================================================================

/// The complete style of one cell. Styles replace each other wholesale;
/// attributes are never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellStyle {
    pub text_color: Option<Rgba>,
    pub background_color: Option<Rgba>,
    pub font_size: Option<f64>,
    pub text_style: TextStyle,
    pub row_height: Option<f64>,
    pub borders: Borders,
}

impl Default for CellStyle {
    fn default() -> Self {
        Self::default_data()
    }
}

impl CellStyle {
    pub fn new(text_color: Rgba, background_color: Rgba, text_style: TextStyle) -> Self {
        Self {
            text_color: Some(text_color),
            background_color: Some(background_color),
            font_size: None,
            text_style,
            row_height: None,
            borders: Borders::NONE,
        }
    }

    pub fn default_header() -> Self {
        Self::new(Rgba::BLACK, Rgba::TRANSPARENT, TextStyle::BOLD).with_borders(Borders::HEADER)
    }

    pub fn default_data() -> Self {
        Self::new(Rgba::BLACK, Rgba::TRANSPARENT, TextStyle::empty())
    }

    pub fn default_error() -> Self {
        Self::new(Rgba::rgb(80, 40, 40), Rgba::rgb(255, 150, 150), TextStyle::empty())
    }

    pub fn with_text_color(self, color: Rgba) -> Self {
        Self {
            text_color: Some(color),
            ..self
        }
    }

    pub fn with_background_color(self, color: Rgba) -> Self {
        Self {
            background_color: Some(color),
            ..self
        }
    }

    pub fn with_text_style(self, text_style: TextStyle) -> Self {
        Self { text_style, ..self }
    }

    pub fn with_font_size(self, size: f64) -> Self {
        Self {
            font_size: Some(size),
            ..self
        }
    }

    pub fn with_row_height(self, height: f64) -> Self {
        Self {
            row_height: Some(height),
            ..self
        }
    }

    pub fn with_borders(self, borders: Borders) -> Self {
        Self { borders, ..self }
    }
}

/// The three default styles, loadable from YAML. Each section only
/// overrides the attributes it names; the rest keep that section's preset.
///
/// ```yaml
/// header:
///   font_size: 14
///   borders: { bottom: double }
/// error:
///   text_color: "#FF6464"
///   background_color: "#FF646446"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StyleSheetPatch")]
pub struct StyleSheet {
    pub header: CellStyle,
    pub data: CellStyle,
    pub error: CellStyle,
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self {
            header: CellStyle::default_header(),
            data: CellStyle::default_data(),
            error: CellStyle::default_error(),
        }
    }
}

/// Deserialize a field that may be explicitly `null`: absent gives `None`,
/// `null` gives `Some(None)`
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BordersPatch {
    top: Option<BorderStyle>,
    bottom: Option<BorderStyle>,
    left: Option<BorderStyle>,
    right: Option<BorderStyle>,
}

/// The attributes a YAML style section sets
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CellStylePatch {
    #[serde(deserialize_with = "present")]
    text_color: Option<Option<Rgba>>,
    #[serde(deserialize_with = "present")]
    background_color: Option<Option<Rgba>>,
    #[serde(deserialize_with = "present")]
    font_size: Option<Option<f64>>,
    text_style: Option<TextStyle>,
    #[serde(deserialize_with = "present")]
    row_height: Option<Option<f64>>,
    borders: Option<BordersPatch>,
}

impl CellStylePatch {
    fn apply(self, base: CellStyle) -> CellStyle {
        let borders = match self.borders {
            Some(patch) => Borders {
                top: patch.top.unwrap_or(base.borders.top),
                bottom: patch.bottom.unwrap_or(base.borders.bottom),
                left: patch.left.unwrap_or(base.borders.left),
                right: patch.right.unwrap_or(base.borders.right),
            },
            None => base.borders,
        };
        CellStyle {
            text_color: self.text_color.unwrap_or(base.text_color),
            background_color: self.background_color.unwrap_or(base.background_color),
            font_size: self.font_size.unwrap_or(base.font_size),
            text_style: self.text_style.unwrap_or(base.text_style),
            row_height: self.row_height.unwrap_or(base.row_height),
            borders,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StyleSheetPatch {
    header: CellStylePatch,
    data: CellStylePatch,
    error: CellStylePatch,
}

impl From<StyleSheetPatch> for StyleSheet {
    fn from(patch: StyleSheetPatch) -> Self {
        Self {
            header: patch.header.apply(CellStyle::default_header()),
            data: patch.data.apply(CellStyle::default_data()),
            error: patch.error.apply(CellStyle::default_error()),
        }
    }
}

impl StyleSheet {
    pub fn from_yaml_str(yaml: &str) -> SheetResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_path(path: &Path) -> SheetResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }
}
