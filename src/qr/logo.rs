use image::{imageops::FilterType, RgbaImage};
use tracing::{debug, warn};

use super::ComposeError;
use crate::fetch::Fetcher;

/// Corner radius applied to logos, in the logo's own pixels.
pub const CORNER_RADIUS: u32 = 100;

/// Downloads and prepares the logo for embedding.
///
/// Failing to download is not an error: the QR code is rendered without a logo.
/// A successful download that does not decode as an image is.
pub async fn fetch_logo(
    http: &Fetcher,
    logo_url: Option<&str>,
) -> Result<Option<RgbaImage>, ComposeError> {
    let Some(url) = logo_url else {
        return Ok(None);
    };
    let bytes = match http.fetch_bytes(url).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(%url, %err, "skipping logo");
            return Ok(None);
        }
    };
    let logo = decode_logo(&bytes)?;
    debug!(%url, width = logo.width(), height = logo.height(), "logo fetched");
    Ok(Some(logo))
}

pub fn decode_logo(bytes: &[u8]) -> Result<RgbaImage, ComposeError> {
    let logo = image::load_from_memory(bytes)
        .map_err(|e| ComposeError::LogoDecode(e.to_string()))?
        .to_rgba8();
    Ok(round_corners(logo, CORNER_RADIUS))
}

/// Clears alpha outside quarter circles of radius `radius` at each corner.
pub fn round_corners(mut logo: RgbaImage, radius: u32) -> RgbaImage {
    let (w, h) = logo.dimensions();
    let r = radius.min(w / 2).min(h / 2);
    if r == 0 {
        return logo;
    }
    let rf = r as f32;
    for y in 0..h {
        for x in 0..w {
            let cx = if x < r { rf } else if x >= w - r { (w - r) as f32 } else { continue };
            let cy = if y < r { rf } else if y >= h - r { (h - r) as f32 } else { continue };
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            if dx * dx + dy * dy > rf * rf {
                logo.get_pixel_mut(x, y).0[3] = 0;
            }
        }
    }
    logo
}

pub fn fit_logo(logo: &RgbaImage, side: u32) -> RgbaImage {
    image::imageops::resize(logo, side, side, FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn corners_become_transparent() {
        let logo = RgbaImage::from_pixel(300, 200, Rgba([10, 20, 30, 255]));
        let rounded = round_corners(logo, CORNER_RADIUS);
        assert_eq!(rounded.get_pixel(0, 0).0[3], 0);
        assert_eq!(rounded.get_pixel(299, 199).0[3], 0);
        assert_eq!(rounded.get_pixel(150, 100).0[3], 255);
        assert_eq!(rounded.get_pixel(150, 0).0[3], 255);
    }

    #[test]
    fn radius_is_clamped_for_small_logos() {
        let logo = RgbaImage::from_pixel(20, 20, Rgba([0, 0, 0, 255]));
        let rounded = round_corners(logo, CORNER_RADIUS);
        assert_eq!(rounded.get_pixel(0, 0).0[3], 0);
        assert_eq!(rounded.get_pixel(10, 10).0[3], 255);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(matches!(decode_logo(b"not an image"), Err(ComposeError::LogoDecode(_))));
    }

    #[tokio::test]
    async fn absent_url_means_no_logo() {
        let http = Fetcher::new(&crate::config::Config::default()).unwrap();
        assert!(fetch_logo(&http, None).await.unwrap().is_none());
    }
}
