//! Spore mold pattern: drives the growth simulation

use super::PatternInput;
use crate::draw::{DrawList, Point};
use crate::growth::GrowthSimulation;
use rand::Rng;

/// Chance per frame of seeding a new spore system
const SPAWN_CHANCE: f64 = 0.05;

pub fn render<R: Rng + ?Sized>(
    input: &PatternInput,
    growth: &mut GrowthSimulation,
    rng: &mut R,
) -> DrawList {
    if rng.gen_bool(SPAWN_CHANCE) {
        let origin = random_point(input.width, input.height, rng);
        if growth.spawn_unit(origin) {
            tracing::trace!(x = origin.x, y = origin.y, "spore seeded");
        }
    }

    growth.advance(input.spectrum, rng);
    let ops = growth.render();

    if let Some(unit) = growth.evict() {
        tracing::trace!(id = unit.id(), "spore evicted");
    }
    ops
}

/// Uniform point on the canvas; degenerate extents collapse to 0
pub fn random_point<R: Rng + ?Sized>(width: f32, height: f32, rng: &mut R) -> Point {
    let axis = |extent: f32, rng: &mut R| {
        if extent.is_finite() && extent > 0.0 {
            rng.gen_range(0.0..extent)
        } else {
            0.0
        }
    };
    let x = axis(width, rng);
    let y = axis(height, rng);
    Point::new(x, y)
}
