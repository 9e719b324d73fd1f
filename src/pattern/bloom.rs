//! Radial blossom pattern
//!
//! Eight slowly turning petals around the canvas center. Each petal samples
//! one spectrum bin for its radius and is traced as a three-lobed rose curve
//! in five passes, warm to cool, fading with every pass.

use super::PatternInput;
use crate::draw::{map_range, DrawList, DrawOp, Point};
use crate::palette;
use std::f32::consts::TAU;

const PETALS: usize = 8;
const PASSES: usize = 5;
/// Bin stride between petals
const BIN_STRIDE: usize = 10;
const ANGLE_STEP: f32 = 0.1;
const ROTATION_SPEED: f32 = 0.001;
const PULSE_SPEED: f32 = 0.02;
const LOBES: f32 = 3.0;
const STROKE: f32 = 0.5;

pub fn render(input: &PatternInput) -> DrawList {
    let center = input.center();
    let t = input.time();
    let mut ops = Vec::with_capacity(PETALS * PASSES);

    for i in 0..PETALS {
        let rotation = TAU * i as f32 / PETALS as f32 + t * ROTATION_SPEED;
        let energy = input.spectrum.bin(i * BIN_STRIDE);
        let radius = map_range(energy, 0.0, 255.0, 50.0, 200.0);
        let outline = petal_outline(center, rotation, radius, t);

        for j in 0..PASSES {
            let color = palette::sunset(j)
                .lerp(palette::CYBER[0], j as f32 / PASSES as f32)
                .with_alpha((100 - 20 * j) as u8);
            ops.push(DrawOp::Polyline {
                points: outline.clone(),
                closed: true,
                width: STROKE,
                color,
            });
        }
    }
    ops
}

/// Rose curve r = radius * (0.5 + 0.5 sin(3θ + pulse)), rotated about `center`
fn petal_outline(center: Point, rotation: f32, radius: f32, t: f32) -> Vec<Point> {
    let steps = (TAU / ANGLE_STEP).ceil() as usize;
    (0..steps)
        .map(|k| k as f32 * ANGLE_STEP)
        .take_while(|&angle| angle < TAU)
        .map(|angle| {
            let r = radius * (0.5 + 0.5 * (angle * LOBES + t * PULSE_SPEED).sin());
            center.polar(angle + rotation, r)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::SpectrumFrame;
    use crate::pattern::test_support::{assert_all_finite, input};

    #[test]
    fn draws_five_passes_per_petal() {
        let spectrum = SpectrumFrame::silent(512);
        let ops = render(&input(&spectrum, 0.0, 0));
        assert_eq!(ops.len(), PETALS * PASSES);
        assert_all_finite(&ops);
    }

    #[test]
    fn alpha_fades_per_pass() {
        let spectrum = SpectrumFrame::silent(512);
        let ops = render(&input(&spectrum, 0.0, 3));
        let alphas: Vec<u8> = ops[..PASSES]
            .iter()
            .map(|op| match op {
                DrawOp::Polyline { color, closed, .. } => {
                    assert!(closed);
                    color.a
                }
                other => panic!("unexpected op {other:?}"),
            })
            .collect();
        assert_eq!(alphas, vec![100, 80, 60, 40, 20]);
    }

    #[test]
    fn radius_tracks_petal_bin() {
        let mut bins = vec![0u8; 512];
        bins[0] = 255;
        let spectrum = SpectrumFrame::from_bins(bins);
        let ops = render(&input(&spectrum, 0.5, 0));
        let reach = |op: &DrawOp| match op {
            DrawOp::Polyline { points, .. } => points
                .iter()
                .map(|p| ((p.x - 700.0).powi(2) + (p.y - 450.0).powi(2)).sqrt())
                .fold(0.0f32, f32::max),
            other => panic!("unexpected op {other:?}"),
        };
        // petal 0 reads bin 0, petal 1 reads bin 10
        assert!((reach(&ops[0]) - 200.0).abs() < 1.0);
        assert!((reach(&ops[PASSES]) - 50.0).abs() < 1.0);
    }

    #[test]
    fn short_spectrum_is_not_an_error() {
        let spectrum = SpectrumFrame::from_bins(vec![200; 3]);
        let ops = render(&input(&spectrum, 1.0, 42));
        assert_eq!(ops.len(), PETALS * PASSES);
        assert_all_finite(&ops);
    }
}
