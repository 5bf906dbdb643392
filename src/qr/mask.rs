use image::{GrayImage, Luma, RgbImage};

use super::matrix::FINDER_SIZE;
use super::render::Geometry;
use super::ComposeError;

const OPAQUE: Luma<u8> = Luma([255]);
const CLEAR: Luma<u8> = Luma([0]);

/// Inset of the 3x3 inner eye from the finder pattern's corner, in modules.
const INNER_INSET: u32 = 2;
const INNER_SIZE: u32 = 3;

/// Half-open pixel rectangle `[x0, x1) × [y0, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

/// Finder patterns in top-left, top-right, bottom-left order, as module coordinates.
fn finder_origins(geometry: Geometry) -> [(u32, u32); 3] {
    let far = geometry.modules - FINDER_SIZE as u32;
    [(0, 0), (far, 0), (0, far)]
}

fn module_rect(geometry: Geometry, mx: u32, my: u32, size: u32) -> PixelRect {
    let (x0, y0) = geometry.module_origin(mx, my);
    let extent = size * geometry.box_size;
    PixelRect { x0, y0, x1: x0 + extent, y1: y0 + extent }
}

/// Whole 7x7 finder squares.
pub fn outer_eye_rects(geometry: Geometry) -> [PixelRect; 3] {
    finder_origins(geometry).map(|(mx, my)| module_rect(geometry, mx, my, FINDER_SIZE as u32))
}

/// The 3x3 centers of the finder patterns.
pub fn inner_eye_rects(geometry: Geometry) -> [PixelRect; 3] {
    finder_origins(geometry)
        .map(|(mx, my)| module_rect(geometry, mx + INNER_INSET, my + INNER_INSET, INNER_SIZE))
}

fn fill(mask: &mut GrayImage, rect: PixelRect, value: Luma<u8>) {
    for y in rect.y0..rect.y1 {
        for x in rect.x0..rect.x1 {
            mask.put_pixel(x, y, value);
        }
    }
}

pub fn inner_eye_mask(geometry: Geometry) -> GrayImage {
    let side = geometry.side();
    let mut mask = GrayImage::new(side, side);
    for rect in inner_eye_rects(geometry) {
        fill(&mut mask, rect, OPAQUE);
    }
    mask
}

/// Finder squares with the inner eyes cut out, leaving the rings.
pub fn outer_eye_mask(geometry: Geometry) -> GrayImage {
    let side = geometry.side();
    let mut mask = GrayImage::new(side, side);
    for rect in outer_eye_rects(geometry) {
        fill(&mut mask, rect, OPAQUE);
    }
    for rect in inner_eye_rects(geometry) {
        fill(&mut mask, rect, CLEAR);
    }
    mask
}

/// Takes `top` where the mask is opaque and `bottom` where it is clear, blending in between.
pub fn composite(top: &RgbImage, bottom: &RgbImage, mask: &GrayImage) -> Result<RgbImage, ComposeError> {
    if top.dimensions() != bottom.dimensions() || top.dimensions() != mask.dimensions() {
        return Err(ComposeError::GeometryMismatch {
            top: top.dimensions(),
            bottom: bottom.dimensions(),
            mask: mask.dimensions(),
        });
    }
    Ok(RgbImage::from_fn(top.width(), top.height(), |x, y| {
        let Luma([alpha]) = *mask.get_pixel(x, y);
        super::render::blend(*top.get_pixel(x, y), *bottom.get_pixel(x, y), alpha)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn version_one() -> Geometry {
        Geometry { modules: 21, box_size: 10, border: 4 }
    }

    #[test]
    fn default_geometry_reproduces_pixel_offsets() {
        let g = version_one();
        let side = g.side();
        assert_eq!(
            inner_eye_rects(g),
            [
                PixelRect { x0: 60, y0: 60, x1: 90, y1: 90 },
                PixelRect { x0: side - 90, y0: 60, x1: side - 60, y1: 90 },
                PixelRect { x0: 60, y0: side - 90, x1: 90, y1: side - 60 },
            ]
        );
        assert_eq!(outer_eye_rects(g)[0], PixelRect { x0: 40, y0: 40, x1: 110, y1: 110 });
        assert_eq!(
            outer_eye_rects(g)[1],
            PixelRect { x0: side - 110, y0: 40, x1: side - 40, y1: 110 }
        );
    }

    #[test]
    fn masks_are_disjoint() {
        for modules in [21, 25, 57] {
            let g = Geometry { modules, box_size: 10, border: 4 };
            let inner = inner_eye_mask(g);
            let outer = outer_eye_mask(g);
            assert!(inner
                .pixels()
                .zip(outer.pixels())
                .all(|(i, o)| i.0[0] == 0 || o.0[0] == 0));
        }
    }

    #[test]
    fn outer_mask_is_a_ring() {
        let outer = outer_eye_mask(version_one());
        assert_eq!(outer.get_pixel(45, 45).0[0], 255);
        assert_eq!(outer.get_pixel(75, 75).0[0], 0);
        assert_eq!(outer.get_pixel(110, 110).0[0], 0);
        // no eye in the bottom-right corner
        assert_eq!(outer.get_pixel(245, 245).0[0], 0);
    }

    #[test]
    fn composite_selects_by_mask() {
        let g = version_one();
        let red = RgbImage::from_pixel(g.side(), g.side(), Rgb([255, 0, 0]));
        let blue = RgbImage::from_pixel(g.side(), g.side(), Rgb([0, 0, 255]));
        let out = composite(&red, &blue, &inner_eye_mask(g)).unwrap();
        assert_eq!(*out.get_pixel(75, 75), Rgb([255, 0, 0]));
        assert_eq!(*out.get_pixel(45, 45), Rgb([0, 0, 255]));
    }

    #[test]
    fn composite_rejects_mismatched_sizes() {
        let a = RgbImage::new(290, 290);
        let b = RgbImage::new(330, 330);
        let mask = GrayImage::new(290, 290);
        assert!(matches!(composite(&a, &b, &mask), Err(ComposeError::GeometryMismatch { .. })));
    }
}
