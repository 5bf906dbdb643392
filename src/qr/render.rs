use image::{GrayImage, Luma, Rgb, RgbImage, RgbaImage};

use super::drawers::ModuleDrawer;
use super::matrix::QrMatrix;

/// Pixels per module.
pub const BOX_SIZE: u32 = 10;
/// Quiet zone width in modules.
pub const BORDER: u32 = 4;

const SUPERSAMPLE: u32 = 4;

/// Pixel layout of a rendered symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub modules: u32,
    pub box_size: u32,
    pub border: u32,
}

impl Geometry {
    pub fn for_matrix(matrix: &QrMatrix) -> Self {
        Self { modules: matrix.width() as u32, box_size: BOX_SIZE, border: BORDER }
    }

    /// Side of the square image in pixels.
    pub fn side(&self) -> u32 {
        (self.modules + 2 * self.border) * self.box_size
    }

    /// Top-left pixel of the module at (`x`, `y`).
    pub fn module_origin(&self, x: u32, y: u32) -> (u32, u32) {
        ((x + self.border) * self.box_size, (y + self.border) * self.box_size)
    }
}

/// Rasterizes the matrix into a coverage map: 255 where a shape fully covers a pixel,
/// 0 where nothing does, partial values on anti-aliased edges.
pub fn rasterize(
    matrix: &QrMatrix,
    geometry: Geometry,
    module_drawer: &dyn ModuleDrawer,
    eye_drawer: &dyn ModuleDrawer,
) -> GrayImage {
    let side = geometry.side();
    let mut coverage = GrayImage::new(side, side);
    let width = matrix.width();
    let bs = geometry.box_size;

    for y in 0..width {
        for x in 0..width {
            if !matrix.is_dark(x as isize, y as isize) {
                continue;
            }
            let drawer = if matrix.is_eye(x, y) { eye_drawer } else { module_drawer };
            let neighbors = matrix.neighbors(x, y);
            let (px, py) = geometry.module_origin(x as u32, y as u32);

            for dy in 0..bs {
                for dx in 0..bs {
                    let value = if drawer.is_rectilinear() {
                        let u = (dx as f32 + 0.5) / bs as f32;
                        let v = (dy as f32 + 0.5) / bs as f32;
                        if drawer.covers(u, v, neighbors) { 255 } else { 0 }
                    } else {
                        let mut hits = 0u32;
                        for sy in 0..SUPERSAMPLE {
                            for sx in 0..SUPERSAMPLE {
                                let u = (dx as f32 + (sx as f32 + 0.5) / SUPERSAMPLE as f32) / bs as f32;
                                let v = (dy as f32 + (sy as f32 + 0.5) / SUPERSAMPLE as f32) / bs as f32;
                                if drawer.covers(u, v, neighbors) {
                                    hits += 1;
                                }
                            }
                        }
                        let samples = SUPERSAMPLE * SUPERSAMPLE;
                        ((hits * 255 + samples / 2) / samples) as u8
                    };
                    coverage.put_pixel(px + dx, py + dy, Luma([value]));
                }
            }
        }
    }
    coverage
}

/// Paints `front` over `back` weighted by the coverage map.
pub fn colorize(coverage: &GrayImage, front: Rgb<u8>, back: Rgb<u8>) -> RgbImage {
    RgbImage::from_fn(coverage.width(), coverage.height(), |x, y| {
        let Luma([alpha]) = *coverage.get_pixel(x, y);
        blend(front, back, alpha)
    })
}

pub(crate) fn blend(top: Rgb<u8>, bottom: Rgb<u8>, alpha: u8) -> Rgb<u8> {
    match alpha {
        255 => top,
        0 => bottom,
        a => {
            let a = a as u32;
            let mix = |t: u8, b: u8| ((t as u32 * a + b as u32 * (255 - a) + 127) / 255) as u8;
            Rgb([mix(top[0], bottom[0]), mix(top[1], bottom[1]), mix(top[2], bottom[2])])
        }
    }
}

/// Where the logo lands: a square whose offset is snapped to the module grid.
pub fn logo_placement(geometry: Geometry) -> (u32, u32) {
    let side = geometry.side();
    let approx = side / 4;
    let offset = (side / 2 - approx / 2) / geometry.box_size * geometry.box_size;
    (offset, side - 2 * offset)
}

/// Alpha-blends an already resized logo onto the image at (`x`, `y`).
pub fn paste_logo(image: &mut RgbImage, logo: &RgbaImage, x: u32, y: u32) {
    for (lx, ly, pixel) in logo.enumerate_pixels() {
        let (tx, ty) = (x + lx, y + ly);
        if tx >= image.width() || ty >= image.height() {
            continue;
        }
        let [r, g, b, a] = pixel.0;
        let under = *image.get_pixel(tx, ty);
        image.put_pixel(tx, ty, blend(Rgb([r, g, b]), under, a));
    }
}
