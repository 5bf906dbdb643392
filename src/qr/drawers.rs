//! Module shapes.
//!
//! A drawer answers whether a point in module-local coordinates (`u`, `v` in `[0, 1)`,
//! origin at the module's top-left corner) is covered by the dark module's shape.
//! Neighbour-aware drawers use [`Neighbors`] to merge with adjacent dark modules.

/// Dark/light state of the four orthogonal neighbours of a module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Neighbors {
    pub north: bool,
    pub east: bool,
    pub south: bool,
    pub west: bool,
}

pub trait ModuleDrawer: Sync {
    fn covers(&self, u: f32, v: f32, neighbors: Neighbors) -> bool;

    /// Shapes with straight axis-aligned edges on the pixel grid need no supersampling.
    fn is_rectilinear(&self) -> bool {
        false
    }
}

pub struct Square;
pub struct GappedSquare {
    pub size_ratio: f32,
}
pub struct Circle;
pub struct Rounded {
    pub radius_ratio: f32,
}
pub struct VerticalBars {
    pub shrink: f32,
}
pub struct HorizontalBars {
    pub shrink: f32,
}

pub static SQUARE: Square = Square;
pub static GAPPED_SQUARE: GappedSquare = GappedSquare { size_ratio: 0.8 };
pub static CIRCLE: Circle = Circle;
pub static ROUNDED: Rounded = Rounded { radius_ratio: 1.0 };
pub static VERTICAL_BARS: VerticalBars = VerticalBars { shrink: 0.8 };
pub static HORIZONTAL_BARS: HorizontalBars = HorizontalBars { shrink: 0.8 };

#[inline]
fn within(p: (f32, f32), center: (f32, f32), radius: f32) -> bool {
    let dx = p.0 - center.0;
    let dy = p.1 - center.1;
    dx * dx + dy * dy <= radius * radius
}

impl ModuleDrawer for Square {
    fn covers(&self, _u: f32, _v: f32, _neighbors: Neighbors) -> bool {
        true
    }

    fn is_rectilinear(&self) -> bool {
        true
    }
}

impl ModuleDrawer for GappedSquare {
    fn covers(&self, u: f32, v: f32, _neighbors: Neighbors) -> bool {
        let margin = (1.0 - self.size_ratio) / 2.0;
        let far = 1.0 - margin;
        (margin..far).contains(&u) && (margin..far).contains(&v)
    }
}

impl ModuleDrawer for Circle {
    fn covers(&self, u: f32, v: f32, _neighbors: Neighbors) -> bool {
        within((u, v), (0.5, 0.5), 0.5)
    }
}

impl ModuleDrawer for Rounded {
    fn covers(&self, u: f32, v: f32, n: Neighbors) -> bool {
        let r = self.radius_ratio / 2.0;
        // A corner is rounded only when both sides meeting there face light modules.
        let corners = [
            (!n.north && !n.west, u < r && v < r, (r, r)),
            (!n.north && !n.east, u > 1.0 - r && v < r, (1.0 - r, r)),
            (!n.south && !n.west, u < r && v > 1.0 - r, (r, 1.0 - r)),
            (!n.south && !n.east, u > 1.0 - r && v > 1.0 - r, (1.0 - r, 1.0 - r)),
        ];
        corners
            .iter()
            .all(|&(rounded, in_corner, center)| !(rounded && in_corner) || within((u, v), center, r))
    }
}

/// Bar drawn along the `along` axis: `across` is clipped to the shrunk width and the
/// ends are capped with half discs when there is no neighbour to connect to.
fn bar_covers(shrink: f32, across: f32, along: f32, joins_start: bool, joins_end: bool) -> bool {
    let margin = (1.0 - shrink) / 2.0;
    if !(margin..1.0 - margin).contains(&across) {
        return false;
    }
    let r = shrink / 2.0;
    if !joins_start && along < r {
        return within((across, along), (0.5, r), r);
    }
    if !joins_end && along > 1.0 - r {
        return within((across, along), (0.5, 1.0 - r), r);
    }
    true
}

impl ModuleDrawer for VerticalBars {
    fn covers(&self, u: f32, v: f32, n: Neighbors) -> bool {
        bar_covers(self.shrink, u, v, n.north, n.south)
    }
}

impl ModuleDrawer for HorizontalBars {
    fn covers(&self, u: f32, v: f32, n: Neighbors) -> bool {
        bar_covers(self.shrink, v, u, n.west, n.east)
    }
}
