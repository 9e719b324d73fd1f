//! Frame orchestrator
//!
//! `VisualizerState::advance` is the whole per-frame step: fade, dispatch to
//! the active pattern, feed the particle field. It owns every piece of
//! simulation state, so independent instances never interfere.

use crate::analyzer::Analysis;
use crate::draw::{DrawList, DrawOp};
use crate::growth::GrowthSimulation;
use crate::mode::{Mode, ModeController};
use crate::palette;
use crate::particles::{ParticleField, MAX_PARTICLES, SPAWN_LEVEL};
use crate::pattern::{self, spores::random_point, PatternInput};
use rand::Rng;

/// Alpha of the background overlay drawn every frame (0x15 of 255)
pub const FADE_ALPHA: u8 = 0x15;

/// Host-supplied inputs for one frame
#[derive(Clone, Debug, Default)]
pub struct FrameInputs {
    pub width: f32,
    pub height: f32,
    /// `None` while the audio source is not enabled
    pub analysis: Option<Analysis>,
}

pub struct VisualizerState {
    modes: ModeController,
    particles: ParticleField,
    growth: GrowthSimulation,
    frame: u64,
    pending_clear: bool,
}

impl Default for VisualizerState {
    fn default() -> Self {
        Self::new(Mode::default())
    }
}

impl VisualizerState {
    pub fn new(initial: Mode) -> Self {
        Self {
            modes: ModeController::new(initial),
            particles: ParticleField::new(),
            growth: GrowthSimulation::new(),
            frame: 0,
            pending_clear: true,
        }
    }

    pub fn mode(&self) -> Mode {
        self.modes.mode()
    }

    /// Switch to the next pattern. The canvas is cleared on the next frame;
    /// particles and spores carry over.
    pub fn switch_mode(&mut self) -> Mode {
        let mode = self.modes.advance();
        tracing::info!(%mode, "mode switched");
        self.pending_clear = true;
        mode
    }

    /// Canvas size changed: clear on the next frame. Positions are kept as-is.
    pub fn resized(&mut self) {
        self.pending_clear = true;
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    #[cfg(test)]
    pub fn particles(&self) -> &ParticleField {
        &self.particles
    }

    #[cfg(test)]
    pub fn growth(&self) -> &GrowthSimulation {
        &self.growth
    }

    /// Run one frame and return what to draw
    pub fn advance<R: Rng + ?Sized>(&mut self, inputs: &FrameInputs, rng: &mut R) -> DrawList {
        let mut ops = Vec::new();

        if self.pending_clear {
            ops.push(DrawOp::Clear(palette::BACKGROUND));
            self.pending_clear = false;
        }
        ops.push(DrawOp::Fill(palette::BACKGROUND.with_alpha(FADE_ALPHA)));

        if let Some(analysis) = &inputs.analysis {
            let input = PatternInput {
                spectrum: &analysis.spectrum,
                level: analysis.level,
                frame: self.frame,
                width: inputs.width,
                height: inputs.height,
            };
            ops.extend(self.dispatch(&input, rng));

            let level = input.level();
            if level > SPAWN_LEVEL && self.particles.len() < MAX_PARTICLES {
                let pos = random_point(inputs.width, inputs.height, rng);
                self.particles.spawn(pos, rng);
            }

            self.particles.advance(level, inputs.width, inputs.height);
            ops.extend(self.particles.render());
            self.particles.prune();
        }

        self.frame += 1;
        ops
    }

    fn dispatch<R: Rng + ?Sized>(&mut self, input: &PatternInput, rng: &mut R) -> DrawList {
        match self.modes.mode() {
            Mode::Bloom => pattern::bloom::render(input),
            Mode::Snowflake => pattern::snowflake::render(input),
            Mode::Spores => pattern::spores::render(input, &mut self.growth, rng),
            Mode::Flow => pattern::flow::render(input),
        }
    }
}
