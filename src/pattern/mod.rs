//! Pattern renderers
//!
//! Each pattern turns one frame of analysis into draw ops. Only the spores
//! pattern keeps state between frames, and that state lives in the
//! [`GrowthSimulation`](crate::growth::GrowthSimulation) it is handed.

pub mod bloom;
pub mod flow;
pub mod snowflake;
pub mod spores;

use crate::analyzer::SpectrumFrame;
use crate::draw::Point;

/// Everything a pattern needs for one frame
#[derive(Clone, Copy)]
pub struct PatternInput<'a> {
    pub spectrum: &'a SpectrumFrame,
    pub level: f32,
    /// Monotonic frame counter
    pub frame: u64,
    pub width: f32,
    pub height: f32,
}

impl PatternInput<'_> {
    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Frame counter as a float for animation phases
    pub fn time(&self) -> f32 {
        // wrap to keep f32 phases precise on long sessions
        (self.frame % 10_000_000) as f32
    }

    /// Loudness with non-finite values treated as silence
    pub fn level(&self) -> f32 {
        if self.level.is_finite() {
            self.level
        } else {
            0.0
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::PatternInput;
    use crate::analyzer::SpectrumFrame;
    use crate::draw::DrawOp;

    pub fn input(spectrum: &SpectrumFrame, level: f32, frame: u64) -> PatternInput<'_> {
        PatternInput {
            spectrum,
            level,
            frame,
            width: 1400.0,
            height: 900.0,
        }
    }

    pub fn assert_all_finite(ops: &[DrawOp]) {
        for op in ops {
            for v in op.scalars() {
                assert!(v.is_finite(), "non-finite value in {op:?}");
            }
        }
    }
}
