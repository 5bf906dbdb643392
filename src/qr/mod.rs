//! Styled QR code compositor.
//!
//! The symbol is rasterized once into a coverage map, colored three times (body, inner
//! eyes, outer eyes) and the eye colors are layered over the body through masks cut
//! around the finder patterns. Inner eyes are composited first and the outer mask
//! excludes them, so the outer pass never repaints an inner eye.

pub mod drawers;
pub mod logo;
pub mod mask;
pub mod matrix;
pub mod render;
pub mod style;

use std::io::Cursor;

use image::{DynamicImage, RgbImage, RgbaImage};
use tracing::debug;

pub use matrix::QrMatrix;
pub use style::{OutputFormat, ResolvedStyle, StyleConfig};

use crate::fetch::Fetcher;
use render::Geometry;

#[derive(thiserror::Error, Debug)]
pub enum ComposeError {
    #[error("cannot encode payload: {0}")]
    Encoding(String),
    #[error("layer sizes differ: top {top:?}, bottom {bottom:?}, mask {mask:?}")]
    GeometryMismatch {
        top: (u32, u32),
        bottom: (u32, u32),
        mask: (u32, u32),
    },
    #[error("logo is not a readable image: {0}")]
    LogoDecode(String),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error("render task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Final image in its output encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
}

/// The three colored renders of one symbol.
pub struct Variants {
    pub main: RgbImage,
    pub inner_eye: RgbImage,
    pub outer_eye: RgbImage,
}

pub fn render_variants(
    matrix: &QrMatrix,
    style: &ResolvedStyle,
    logo: Option<&RgbaImage>,
) -> (Geometry, Variants) {
    let geometry = Geometry::for_matrix(matrix);
    let coverage = render::rasterize(matrix, geometry, style.module.drawer(), style.eyes.drawer());

    let mut main = render::colorize(&coverage, style.main, style.background);
    if let Some(logo) = logo {
        let (offset, side) = render::logo_placement(geometry);
        let fitted = logo::fit_logo(logo, side);
        render::paste_logo(&mut main, &fitted, offset, offset);
    }
    let inner_eye = render::colorize(&coverage, style.inner_eye, style.background);
    let outer_eye = render::colorize(&coverage, style.outer_eye, style.background);

    (geometry, Variants { main, inner_eye, outer_eye })
}

/// Renders and layers the styled symbol without encoding it.
pub fn compose(payload: &str, config: &StyleConfig, logo: Option<&RgbaImage>) -> Result<RgbImage, ComposeError> {
    let style = ResolvedStyle::resolve(config);
    let matrix = QrMatrix::encode(payload)?;
    let (geometry, variants) = render_variants(&matrix, &style, logo);

    let inner_mask = mask::inner_eye_mask(geometry);
    let outer_mask = mask::outer_eye_mask(geometry);
    let intermediate = mask::composite(&variants.inner_eye, &variants.main, &inner_mask)?;
    let composed = mask::composite(&variants.outer_eye, &intermediate, &outer_mask)?;

    debug!(
        modules = matrix.width(),
        side = geometry.side(),
        module_style = ?style.module,
        eye_style = ?style.eyes,
        logo = logo.is_some(),
        "qr composed"
    );
    Ok(composed)
}

pub fn encode(image: RgbImage, format: OutputFormat) -> Result<EncodedImage, ComposeError> {
    let (width, height) = image.dimensions();
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image).write_to(&mut Cursor::new(&mut bytes), format.image_format())?;
    Ok(EncodedImage { bytes, format, width, height })
}

/// Composes and encodes the styled symbol with an already prepared logo.
pub fn build_image(payload: &str, config: &StyleConfig, logo: Option<&RgbaImage>) -> Result<EncodedImage, ComposeError> {
    let composed = compose(payload, config, logo)?;
    encode(composed, config.output_format)
}

/// Fetches the configured logo, then composes and encodes on the blocking pool.
pub async fn build_image_remote(
    http: &Fetcher,
    payload: String,
    config: StyleConfig,
) -> Result<EncodedImage, ComposeError> {
    let logo = logo::fetch_logo(http, config.logo_url.as_deref()).await?;
    tokio::task::spawn_blocking(move || build_image(&payload, &config, logo.as_ref())).await?
}
