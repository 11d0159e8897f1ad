//! Sheet configuration: paper and photo sizes, spacing, border and guides.
//!
//! All lengths are millimetres. A [`LayoutConfig`] is a plain `Copy` value;
//! changing a setting means building a new one, never mutating the one a
//! render is using.

use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::SheetError;

/// Physical sheet size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaperSpec {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl PaperSpec {
    pub const fn new(width_mm: f64, height_mm: f64) -> Self {
        Self {
            width_mm,
            height_mm,
        }
    }
}

/// Footprint of one printed photo
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhotoSpec {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl PhotoSpec {
    pub const fn new(width_mm: f64, height_mm: f64) -> Self {
        Self {
            width_mm,
            height_mm,
        }
    }

    /// Width over height, or 0 for a degenerate photo
    pub fn aspect_ratio(&self) -> f64 {
        if self.width_mm > 0.0 && self.height_mm > 0.0 {
            self.width_mm / self.height_mm
        } else {
            0.0
        }
    }
}

const PAPER_PRESETS: [(&str, PaperSpec); 6] = [
    ("A3", PaperSpec::new(297.0, 420.0)),
    ("A4", PaperSpec::new(210.0, 297.0)),
    ("A5", PaperSpec::new(148.0, 210.0)),
    ("A6", PaperSpec::new(105.0, 148.0)),
    ("Letter", PaperSpec::new(215.9, 279.4)),
    ("Legal", PaperSpec::new(215.9, 355.6)),
];

const PHOTO_PRESETS: [(&str, PhotoSpec); 5] = [
    ("2x3", PhotoSpec::new(20.0, 30.0)),
    ("3x4", PhotoSpec::new(30.0, 40.0)),
    ("4x6", PhotoSpec::new(40.0, 60.0)),
    ("2.5x3.5", PhotoSpec::new(25.0, 35.0)),
    ("3.5x4.5", PhotoSpec::new(35.0, 45.0)),
];

/// Named paper presets, in display order
pub fn paper_presets() -> &'static [(&'static str, PaperSpec)] {
    &PAPER_PRESETS
}

/// Named photo presets (centimetres in the name, millimetres in the value)
pub fn photo_presets() -> &'static [(&'static str, PhotoSpec)] {
    &PHOTO_PRESETS
}

/// Comma-separated preset names, for error messages
fn preset_names<T>(presets: &[(&str, T)]) -> String {
    presets
        .iter()
        .map(|(label, _)| *label)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse "<w>x<h>" into two numbers
fn parse_dimensions(s: &str) -> Option<(f64, f64)> {
    let (w, h) = s.split_once(['x', 'X', '×'])?;
    let w: f64 = w.trim().parse().ok()?;
    let h: f64 = h.trim().parse().ok()?;
    Some((w, h))
}

impl FromStr for PaperSpec {
    type Err = SheetError;

    /// Accepts a preset name ("a4", "Letter") or a custom "210x297" in mm.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if let Some((_, spec)) = paper_presets()
            .iter()
            .find(|(label, _)| label.eq_ignore_ascii_case(name))
        {
            return Ok(*spec);
        }
        parse_dimensions(name)
            .map(|(w, h)| PaperSpec::new(w, h))
            .ok_or_else(|| SheetError::UnknownPreset {
                kind: "paper",
                name: name.to_string(),
                expected: format!("{} or WxH in mm", preset_names(paper_presets())),
            })
    }
}

impl FromStr for PhotoSpec {
    type Err = SheetError;

    /// Accepts a preset name in centimetres ("3x4") or "<w>mm x <h>mm" given
    /// as "30x40mm".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let unknown = || SheetError::UnknownPreset {
            kind: "photo",
            name: name.to_string(),
            expected: format!("{} (cm) or WxHmm", preset_names(photo_presets())),
        };
        if let Some(mm) = name.strip_suffix("mm") {
            return parse_dimensions(mm)
                .map(|(w, h)| PhotoSpec::new(w, h))
                .ok_or_else(unknown);
        }
        let (w, h) = parse_dimensions(name).ok_or_else(unknown)?;
        photo_presets()
            .iter()
            .map(|(_, spec)| *spec)
            .find(|spec| spec.width_mm == w * 10.0 && spec.height_mm == h * 10.0)
            .ok_or_else(unknown)
    }
}

/// An opaque RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb`, `rrggbb` or `#rgb`
    pub fn from_hex(s: &str) -> Result<Self, SheetError> {
        let invalid = || SheetError::InvalidColor(s.to_string());
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |i: usize, len: usize| u8::from_str_radix(&hex[i..i + len], 16);
        match hex.len() {
            6 => Ok(Color::rgb(
                channel(0, 2).map_err(|_| invalid())?,
                channel(2, 2).map_err(|_| invalid())?,
                channel(4, 2).map_err(|_| invalid())?,
            )),
            3 => {
                let short = |i| channel(i, 1).map(|v| v * 17).map_err(|_| invalid());
                Ok(Color::rgb(short(0)?, short(1)?, short(2)?))
            }
            _ => Err(invalid()),
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn to_rgba(&self) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, 255])
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = SheetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::from_hex(s)
    }
}

impl TryFrom<String> for Color {
    type Error = SheetError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// Which cut guides to draw over the sheet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuideMode {
    #[default]
    None,
    /// Corner ticks on the outer edges of each block of photos
    Cutter,
    /// A full outline around every photo
    Scissor,
}

impl FromStr for GuideMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(GuideMode::None),
            "cutter" => Ok(GuideMode::Cutter),
            "scissor" => Ok(GuideMode::Scissor),
            other => Err(format!(
                "unknown guide mode '{}', expected none, cutter or scissor",
                other
            )),
        }
    }
}

/// Everything the layout and rasterizer need to know about a sheet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub paper: PaperSpec,
    pub photo: PhotoSpec,
    pub margin_mm: f64,
    pub gutter_mm: f64,
    pub border_mm: f64,
    pub border_color: Color,
    pub guide_mode: GuideMode,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            paper: PAPER_PRESETS[1].1,
            photo: PHOTO_PRESETS[1].1,
            margin_mm: 5.0,
            gutter_mm: 0.0,
            border_mm: 0.0,
            border_color: Color::WHITE,
            guide_mode: GuideMode::None,
        }
    }
}

/// Negative, NaN and infinite lengths become zero
fn clamp_length(name: &str, value: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        warn!("{} of {} mm is not a usable length, using 0", name, value);
        0.0
    }
}

impl LayoutConfig {
    /// Copy with every length clamped to a finite, non-negative value.
    pub fn sanitized(&self) -> Self {
        Self {
            paper: PaperSpec::new(
                clamp_length("paper width", self.paper.width_mm),
                clamp_length("paper height", self.paper.height_mm),
            ),
            photo: PhotoSpec::new(
                clamp_length("photo width", self.photo.width_mm),
                clamp_length("photo height", self.photo.height_mm),
            ),
            margin_mm: clamp_length("margin", self.margin_mm),
            gutter_mm: clamp_length("gutter", self.gutter_mm),
            border_mm: clamp_length("border", self.border_mm),
            border_color: self.border_color,
            guide_mode: self.guide_mode,
        }
    }
}

pub const DEFAULT_DPI: f64 = 300.0;

fn default_paper() -> String {
    "A4".to_string()
}

fn default_photo() -> String {
    "3x4".to_string()
}

fn default_margin() -> f64 {
    5.0
}

fn default_border_color() -> String {
    "#ffffff".to_string()
}

fn default_dpi() -> f64 {
    DEFAULT_DPI
}

/// On-disk sheet settings (JSON). Every field is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetConfig {
    #[serde(default = "default_paper")]
    pub paper: String,
    #[serde(default = "default_photo")]
    pub photo: String,
    #[serde(default = "default_margin")]
    pub margin_mm: f64,
    #[serde(default)]
    pub gutter_mm: f64,
    #[serde(default)]
    pub border_mm: f64,
    #[serde(default = "default_border_color")]
    pub border_color: String,
    #[serde(default)]
    pub guides: GuideMode,
    #[serde(default = "default_dpi")]
    pub dpi: f64,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            paper: default_paper(),
            photo: default_photo(),
            margin_mm: default_margin(),
            gutter_mm: 0.0,
            border_mm: 0.0,
            border_color: default_border_color(),
            guides: GuideMode::None,
            dpi: default_dpi(),
        }
    }
}

impl SheetConfig {
    pub fn from_json(content: &str) -> Result<Self, SheetError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, SheetError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Resolve preset names and colours into a layout config
    pub fn layout_config(&self) -> Result<LayoutConfig, SheetError> {
        Ok(LayoutConfig {
            paper: self.paper.parse()?,
            photo: self.photo.parse()?,
            margin_mm: self.margin_mm,
            gutter_mm: self.gutter_mm,
            border_mm: self.border_mm,
            border_color: Color::from_hex(&self.border_color)?,
            guide_mode: self.guides,
        })
    }
}
