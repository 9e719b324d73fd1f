//! Backend-neutral draw operations emitted by the visualizer core
//!
//! Coordinates are in logical canvas units with the origin at the top left.
//! The host decides how a unit maps onto its own pixels.

use crate::palette::Rgba;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Point at `distance` from `self` in direction `angle` (radians)
    pub fn polar(self, angle: f32, distance: f32) -> Self {
        Self {
            x: self.x + angle.cos() * distance,
            y: self.y + angle.sin() * distance,
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A single drawing primitive
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// Replace the whole canvas with an opaque color
    Clear(Rgba),
    /// Blend a color over the whole canvas (trail fade)
    Fill(Rgba),
    Line {
        from: Point,
        to: Point,
        width: f32,
        color: Rgba,
    },
    Polyline {
        points: Vec<Point>,
        closed: bool,
        width: f32,
        color: Rgba,
    },
    /// Filled circle; `diameter` matches the ellipse size convention
    Circle {
        center: Point,
        diameter: f32,
        color: Rgba,
    },
}

impl DrawOp {
    /// Every coordinate and size in the op, for finiteness checks
    #[cfg(test)]
    pub fn scalars(&self) -> Vec<f32> {
        match self {
            DrawOp::Clear(_) | DrawOp::Fill(_) => Vec::new(),
            DrawOp::Line { from, to, width, .. } => vec![from.x, from.y, to.x, to.y, *width],
            DrawOp::Polyline { points, width, .. } => points
                .iter()
                .flat_map(|p| [p.x, p.y])
                .chain(std::iter::once(*width))
                .collect(),
            DrawOp::Circle { center, diameter, .. } => vec![center.x, center.y, *diameter],
        }
    }
}

/// Ordered list of draw ops for one frame
pub type DrawList = Vec<DrawOp>;

/// Linear map of `value` from [in_lo, in_hi] to [out_lo, out_hi], clamped to
/// the output range. Non-finite input and a zero-width input range both map
/// to `out_lo`.
pub fn map_range(value: f32, in_lo: f32, in_hi: f32, out_lo: f32, out_hi: f32) -> f32 {
    let span = in_hi - in_lo;
    if !value.is_finite() || span == 0.0 || !span.is_finite() {
        return out_lo;
    }
    let t = ((value - in_lo) / span).clamp(0.0, 1.0);
    out_lo + (out_hi - out_lo) * t
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// One coordinate of a cubic Bezier curve at parameter `t`
pub fn bezier_point(a: f32, b: f32, c: f32, d: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    u * u * u * a + 3.0 * u * u * t * b + 3.0 * u * t * t * c + t * t * t * d
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_range_is_linear_inside_bounds() {
        assert_eq!(map_range(0.0, 0.0, 255.0, 50.0, 200.0), 50.0);
        assert_eq!(map_range(255.0, 0.0, 255.0, 50.0, 200.0), 200.0);
        assert!((map_range(127.5, 0.0, 255.0, 50.0, 200.0) - 125.0).abs() < 1e-4);
    }

    #[test]
    fn map_range_clamps_and_rejects_non_finite() {
        assert_eq!(map_range(2.0, 0.0, 1.0, 10.0, 50.0), 50.0);
        assert_eq!(map_range(-1.0, 0.0, 1.0, 10.0, 50.0), 10.0);
        assert_eq!(map_range(f32::NAN, 0.0, 1.0, 10.0, 50.0), 10.0);
        assert_eq!(map_range(0.5, 1.0, 1.0, 10.0, 50.0), 10.0);
    }

    #[test]
    fn bezier_hits_endpoints() {
        assert_eq!(bezier_point(1.0, 5.0, 7.0, 9.0, 0.0), 1.0);
        assert!((bezier_point(1.0, 5.0, 7.0, 9.0, 1.0) - 9.0).abs() < 1e-6);
    }

    #[test]
    fn polar_moves_along_angle() {
        let p = Point::new(10.0, 10.0).polar(0.0, 5.0);
        assert!((p.x - 15.0).abs() < 1e-6);
        assert!((p.y - 10.0).abs() < 1e-6);
    }
}
