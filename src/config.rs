use crate::capture::Source;
use crate::mode::Mode;
use crate::settings::VisualizerSettings;

/// Default seconds per frame (~60 fps)
pub const DEFAULT_TIME_STEP: f32 = 0.016;
/// Default braille dots per logical canvas unit
pub const DEFAULT_SCALE: f32 = 0.35;

/// Configuration for the visualizer run
#[derive(Clone, Debug, PartialEq)]
pub struct VisualizerConfig {
    pub source: Source,
    pub mode: Mode,
    pub time_step: f32,
    pub scale: f32,
    pub seed: Option<u64>,
    pub debug: bool,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            source: Source::default(),
            mode: Mode::default(),
            time_step: DEFAULT_TIME_STEP,
            scale: DEFAULT_SCALE,
            seed: None,
            debug: false,
        }
    }
}

/// Values given on the command line; `None` means "not given"
#[derive(Clone, Debug, Default)]
pub struct CliOverrides {
    pub source: Option<Source>,
    pub mode: Option<Mode>,
    pub time_step: Option<f32>,
    pub scale: Option<f32>,
    pub seed: Option<u64>,
    pub debug: bool,
}

impl VisualizerConfig {
    /// CLI beats settings file beats defaults. Unparseable or out-of-range
    /// settings values are skipped with a warning.
    pub fn resolve(cli: CliOverrides, settings: &VisualizerSettings) -> Self {
        let defaults = Self::default();

        let from_file_source = settings.source.as_deref().and_then(|s| {
            s.parse::<Source>()
                .map_err(|e| tracing::warn!("settings: {}", e))
                .ok()
        });
        let from_file_mode = settings.mode.as_deref().and_then(|s| {
            s.parse::<Mode>()
                .map_err(|e| tracing::warn!("settings: {}", e))
                .ok()
        });

        Self {
            source: cli.source.or(from_file_source).unwrap_or(defaults.source),
            mode: cli.mode.or(from_file_mode).unwrap_or(defaults.mode),
            time_step: cli
                .time_step
                .or(settings.time_step)
                .filter(|t| t.is_finite() && *t >= 0.0)
                .map(|t| t.min(1.0))
                .unwrap_or(defaults.time_step),
            scale: cli
                .scale
                .or(settings.scale)
                .filter(|s| s.is_finite() && *s > 0.0)
                .map(|s| s.clamp(0.05, 4.0))
                .unwrap_or(defaults.scale),
            seed: cli.seed,
            debug: cli.debug,
        }
    }
}
