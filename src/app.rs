//! Terminal host for the visualizer
//!
//! Owns the frame loop: polls keys and audio readiness, runs one
//! `VisualizerState::advance` per frame and rasterizes the result.

use crate::analyzer::SpectralAnalyzer;
use crate::canvas::Canvas;
use crate::capture::{Acquisition, Source};
use crate::config::VisualizerConfig;
use crate::controls::{Action, Controls};
use crate::help::{render_help_overlay, HELP};
use crate::mode::Mode;
use crate::palette;
use crate::terminal::Terminal;
use crate::visualizer::{FrameInputs, VisualizerState};
use rand::prelude::*;
use std::io;

/// Minimum frame time to cap at ~120fps (seconds)
const MIN_FRAME_TIME: f32 = 0.008;
/// Sleep interval while paused (seconds)
const PAUSE_POLL_INTERVAL: f32 = 0.1;

/// Audio readiness as shown in the status line
#[derive(Clone, Debug, PartialEq)]
enum AudioStatus {
    Waiting,
    Live(String),
    Unavailable,
    Off,
}

impl AudioStatus {
    fn label(&self) -> String {
        match self {
            AudioStatus::Waiting => "waiting for audio".to_string(),
            AudioStatus::Live(device) => format!("live: {}", device),
            AudioStatus::Unavailable => "audio unavailable (idle)".to_string(),
            AudioStatus::Off => "audio off".to_string(),
        }
    }
}

fn status_line(mode: Mode, audio: &AudioStatus) -> String {
    format!(" {} · {} · [?] help ", mode, audio.label())
}

/// Run the visualizer until the user quits
pub fn run(config: VisualizerConfig) -> io::Result<()> {
    let seed = config.seed.unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0) // Fallback seed for misconfigured system clocks
    });
    tracing::info!(seed, source = %config.source, mode = %config.mode, "starting");

    let mut rng = StdRng::seed_from_u64(seed);
    let mut acquisition = Acquisition::start(config.source);
    let mut analyzer = SpectralAnalyzer::new();
    let mut audio = match config.source {
        Source::None => AudioStatus::Off,
        _ => AudioStatus::Waiting,
    };

    let mut term = Terminal::new(true)?;
    term.clear_screen()?;

    let (init_w, init_h) = term.size();
    let mut prev_w = init_w;
    let mut prev_h = init_h;
    let mut canvas = Canvas::new(init_w, init_h, config.scale);
    let mut state = VisualizerState::new(config.mode);
    let mut controls = Controls::new(config.time_step);

    loop {
        let (width, height) = crossterm::terminal::size().unwrap_or(term.size());

        if width != prev_w || height != prev_h {
            term.resize(width, height);
            term.clear_screen()?;
            canvas.resize(width, height);
            state.resized();
            prev_w = width;
            prev_h = height;
            tracing::debug!(width, height, "resized");
        }

        if let Some((code, mods)) = term.check_key()? {
            match controls.handle_key(code, mods) {
                Action::Quit => break,
                Action::NextMode => {
                    state.switch_mode();
                }
                Action::None => {}
            }
        }

        match acquisition.poll() {
            Some(Ok(ready)) => {
                analyzer.attach(ready.window, ready.sample_rate);
                audio = AudioStatus::Live(ready.description);
            }
            Some(Err(e)) => {
                tracing::warn!("running idle: {}", e);
                audio = AudioStatus::Unavailable;
            }
            None => {}
        }

        if controls.paused {
            term.sleep(PAUSE_POLL_INTERVAL);
            continue;
        }

        // Guard against zero-size terminal
        if width == 0 || height == 0 {
            term.sleep(PAUSE_POLL_INTERVAL);
            continue;
        }

        let (logical_w, logical_h) = canvas.logical_size();
        let inputs = FrameInputs {
            width: logical_w,
            height: logical_h,
            analysis: analyzer.frame(),
        };
        let ops = state.advance(&inputs, &mut rng);
        canvas.apply(&ops);

        term.clear();
        canvas.render(&mut term);

        let label = status_line(state.mode(), &audio);
        let label_color = palette::DARK[3].lerp(palette::CYBER[1], 0.5).to_color();
        term.set_str(1, height as i32 - 1, &label, Some(label_color));

        if controls.show_help {
            render_help_overlay(&mut term, width, height, HELP);
        }

        term.present()?;
        term.sleep(controls.speed.max(MIN_FRAME_TIME));
    }

    tracing::info!(frames = state.frame_count(), "stopped");
    Ok(())
}
