use std::str::FromStr;

use image::{ImageFormat, Rgb};
use serde::Deserialize;
use tracing::debug;

use super::drawers::{self, ModuleDrawer};

/// RGB triple as sent on the wire, each channel 0–255.
pub type RgbTriple = (u8, u8, u8);

const BLACK: RgbTriple = (0, 0, 0);
const WHITE: RgbTriple = (255, 255, 255);
// Stand-in for a pure black background, see `ResolvedStyle::resolve`.
const NEAR_BLACK: RgbTriple = (1, 1, 1);

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct StyleConfig {
    pub logo_url: Option<String>,
    #[serde(alias = "module_style")]
    pub style: Option<String>,
    #[serde(alias = "eye_style")]
    pub eyes_style: Option<String>,
    pub main_color: RgbTriple,
    pub bg_color: RgbTriple,
    pub inner_eye_color: RgbTriple,
    pub outer_eye_color: RgbTriple,
    pub output_format: OutputFormat,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            logo_url: None,
            style: None,
            eyes_style: None,
            main_color: BLACK,
            bg_color: WHITE,
            inner_eye_color: BLACK,
            outer_eye_color: BLACK,
            output_format: OutputFormat::default(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    #[serde(alias = "PNG")]
    Png,
    #[serde(alias = "JPEG", alias = "jpg", alias = "JPG")]
    Jpeg,
    #[serde(alias = "BMP")]
    Bmp,
    #[serde(alias = "TIFF")]
    Tiff,
}

impl OutputFormat {
    pub fn image_format(self) -> ImageFormat {
        match self {
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::Bmp => ImageFormat::Bmp,
            OutputFormat::Tiff => ImageFormat::Tiff,
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Bmp => "image/bmp",
            OutputFormat::Tiff => "image/tiff",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleStyle {
    Square,
    GappedSquare,
    Rounded,
    Circle,
    VerticalBars,
    HorizontalBars,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unsupported style `{0}`")]
pub struct UnsupportedStyle(pub String);

impl FromStr for ModuleStyle {
    type Err = UnsupportedStyle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "square" => Ok(ModuleStyle::Square),
            "gapped_square" => Ok(ModuleStyle::GappedSquare),
            "rounded" => Ok(ModuleStyle::Rounded),
            "circle" => Ok(ModuleStyle::Circle),
            "vertical_bars" => Ok(ModuleStyle::VerticalBars),
            "horizontal_bars" => Ok(ModuleStyle::HorizontalBars),
            other => Err(UnsupportedStyle(other.to_string())),
        }
    }
}

impl ModuleStyle {
    /// Immutable style → drawer table.
    pub fn drawer(self) -> &'static dyn ModuleDrawer {
        match self {
            ModuleStyle::Square => &drawers::SQUARE,
            ModuleStyle::GappedSquare => &drawers::GAPPED_SQUARE,
            ModuleStyle::Rounded => &drawers::ROUNDED,
            ModuleStyle::Circle => &drawers::CIRCLE,
            ModuleStyle::VerticalBars => &drawers::VERTICAL_BARS,
            ModuleStyle::HorizontalBars => &drawers::HORIZONTAL_BARS,
        }
    }

    /// Parses an optional style name, degrading to `Square` for anything unknown.
    pub fn resolve(name: Option<&str>) -> Self {
        match name.map(str::parse::<ModuleStyle>) {
            Some(Ok(style)) => style,
            Some(Err(err)) => {
                debug!(%err, "falling back to square drawer");
                ModuleStyle::Square
            }
            None => ModuleStyle::Square,
        }
    }
}

/// Drawers and colors ready for rendering.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedStyle {
    pub module: ModuleStyle,
    pub eyes: ModuleStyle,
    pub main: Rgb<u8>,
    pub background: Rgb<u8>,
    pub inner_eye: Rgb<u8>,
    pub outer_eye: Rgb<u8>,
}

impl ResolvedStyle {
    pub fn resolve(config: &StyleConfig) -> Self {
        // A pure black background collapses against black foreground regions when
        // compositing, so it is nudged to (1,1,1).
        let background = if config.bg_color == BLACK { NEAR_BLACK } else { config.bg_color };
        Self {
            module: ModuleStyle::resolve(config.style.as_deref()),
            eyes: ModuleStyle::resolve(config.eyes_style.as_deref()),
            main: rgb(config.main_color),
            background: rgb(background),
            inner_eye: rgb(config.inner_eye_color),
            outer_eye: rgb(config.outer_eye_color),
        }
    }
}

fn rgb((r, g, b): RgbTriple) -> Rgb<u8> {
    Rgb([r, g, b])
}
