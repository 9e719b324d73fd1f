//! Snowflake pattern
//!
//! Six crystal arms radiate from the center. Each arm is a chain of segments
//! whose lengths follow the spectrum; every third segment grows a pair of
//! side ticks.

use super::PatternInput;
use crate::draw::{map_range, DrawList, DrawOp};
use crate::palette;
use std::f32::consts::{FRAC_PI_4, TAU};

const ARMS: usize = 6;
const MAX_SEGMENTS: usize = 20;
const BIN_STRIDE: usize = 10;
const ROTATION_SPEED: f32 = 0.002;
const STROKE: f32 = 2.0;

/// Segments per arm: one per 10 bins (rounded up), at most 20
fn segment_count(bins: usize) -> usize {
    bins.div_ceil(BIN_STRIDE).min(MAX_SEGMENTS)
}

pub fn render(input: &PatternInput) -> DrawList {
    let center = input.center();
    let spin = input.time() * ROTATION_SPEED;
    let spacing = map_range(input.level(), 0.0, 1.0, 10.0, 50.0);
    let segments = segment_count(input.spectrum.len());
    let mut ops = Vec::with_capacity(ARMS * segments * 2);

    for i in 0..ARMS {
        let heading = spin + TAU * i as f32 / ARMS as f32;

        for j in 0..segments {
            let energy = input.spectrum.bin(j * BIN_STRIDE);
            let len = map_range(energy, 0.0, 255.0, 5.0, spacing);
            let color = palette::cyber(j)
                .lerp(palette::SUNSET[0], energy / 255.0)
                .with_alpha((200 - 5 * j) as u8);

            let start = center.polar(heading, j as f32 * spacing);
            ops.push(DrawOp::Line {
                from: start,
                to: start.polar(heading, len),
                width: STROKE,
                color,
            });

            if j % 3 == 0 {
                for tick in [FRAC_PI_4, -FRAC_PI_4] {
                    ops.push(DrawOp::Line {
                        from: start,
                        to: start.polar(heading + tick, len / 2.0),
                        width: STROKE,
                        color,
                    });
                }
            }
        }
    }
    ops
}
