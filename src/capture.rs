//! Audio acquisition
//!
//! Opens the requested source on a background thread and reports back once
//! over a channel. Until that report arrives (or if it is an error) the
//! visualizer simply runs idle. The capture stream lives on the background
//! thread until the [`Acquisition`] is dropped.
//!
//! For system audio on Linux, a PulseAudio/PipeWire monitor of the default
//! sink is selected temporarily via `pactl` and the previous default input is
//! restored on shutdown. Without `pactl` this falls back to the default input.

use crate::analyzer::{SampleWindow, SharedWindow};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use std::fmt;
use std::fs::OpenOptions;
use std::os::unix::io::AsRawFd;
use std::str::FromStr;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;

/// Sample rate of the built-in test signal
const SYNTH_SAMPLE_RATE: u32 = 44_100;
/// Samples generated per synth tick (one 60 Hz frame)
const SYNTH_CHUNK: usize = 735;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio input device found")]
    NoDevice,
    #[error("no supported input config: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),
    #[error("audio device reported 0 channels")]
    NoChannels,
    #[error("unsupported sample format {0:?}")]
    SampleFormat(cpal::SampleFormat),
    #[error("failed to build input stream: {0}")]
    Build(#[from] cpal::BuildStreamError),
    #[error("failed to start audio: {0}")]
    Play(#[from] cpal::PlayStreamError),
    #[error("audio thread exited before reporting")]
    Disconnected,
}

/// Where samples come from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Source {
    /// Monitor of the default output, falling back to the default input
    #[default]
    System,
    /// Default input device
    Mic,
    /// Built-in test signal, no hardware needed
    Synth,
    /// Never attach; the visualizer stays idle
    None,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Source::System => "system",
            Source::Mic => "mic",
            Source::Synth => "synth",
            Source::None => "none",
        })
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "system" | "desktop" | "monitor" => Ok(Source::System),
            "mic" | "microphone" | "input" => Ok(Source::Mic),
            "synth" | "demo" | "test" => Ok(Source::Synth),
            "none" | "off" => Ok(Source::None),
            other => Err(format!(
                "unknown source '{}' (expected system, mic, synth or none)",
                other
            )),
        }
    }
}

/// A source that is delivering samples
pub struct Ready {
    pub window: SharedWindow,
    pub sample_rate: u32,
    pub description: String,
}

/// Handle to the background acquisition thread
pub struct Acquisition {
    rx: Option<Receiver<Result<Ready, AudioError>>>,
    shutdown: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Acquisition {
    /// Begin acquiring `source`. Returns immediately.
    pub fn start(source: Source) -> Self {
        if source == Source::None {
            return Self {
                rx: None,
                shutdown: None,
                handle: None,
            };
        }

        let (tx, rx) = mpsc::channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("audio-capture".into())
            .spawn(move || acquire(source, tx, shutdown_rx));

        // A failed spawn drops `tx`, so the first poll reports Disconnected
        let handle = match handle {
            Ok(h) => Some(h),
            Err(e) => {
                tracing::error!("could not spawn capture thread: {}", e);
                None
            }
        };

        Self {
            rx: Some(rx),
            shutdown: Some(shutdown_tx),
            handle,
        }
    }

    /// Non-blocking check for the one-time outcome. Yields it at most once.
    pub fn poll(&mut self) -> Option<Result<Ready, AudioError>> {
        let rx = self.rx.as_ref()?;
        let outcome = match rx.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(AudioError::Disconnected),
        };
        self.rx = None;
        Some(outcome)
    }
}

impl Drop for Acquisition {
    fn drop(&mut self) {
        // Disconnecting the channel wakes the capture thread
        self.shutdown.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Capture thread body
fn acquire(source: Source, tx: Sender<Result<Ready, AudioError>>, shutdown: Receiver<()>) {
    let window: SharedWindow = Arc::new(Mutex::new(SampleWindow::new()));

    if source == Source::Synth {
        let ready = Ready {
            window: Arc::clone(&window),
            sample_rate: SYNTH_SAMPLE_RATE,
            description: "built-in test signal".to_string(),
        };
        if tx.send(Ok(ready)).is_ok() {
            run_synth(&window, &shutdown);
        }
        return;
    }

    match open_device(source, &window) {
        Ok(live) => {
            tracing::info!(device = %live.description, rate = live.sample_rate, "audio capture started");
            let ready = Ready {
                window,
                sample_rate: live.sample_rate,
                description: live.description.clone(),
            };
            if tx.send(Ok(ready)).is_ok() {
                // Park until the owner hangs up; `live` keeps the stream open
                let _ = shutdown.recv();
            }
            drop(live);
            tracing::debug!("audio capture stopped");
        }
        Err(e) => {
            tracing::warn!("audio capture unavailable: {}", e);
            let _ = tx.send(Err(e));
        }
    }
}

/// An open input stream plus whatever must be undone when it closes
struct LiveStream {
    _stream: cpal::Stream,
    _monitor: Option<MonitorSourceGuard>,
    sample_rate: u32,
    description: String,
}

fn open_device(source: Source, window: &SharedWindow) -> Result<LiveStream, AudioError> {
    // ALSA prints enumeration noise straight onto the terminal
    let quiet = quiet_stderr();

    let host = cpal::default_host();
    tracing::debug!(host = ?host.id(), "audio host");

    let monitor = if source == Source::System {
        let (original, monitor_set) = detect_and_set_monitor_source();
        tracing::debug!(?original, monitor_set, "monitor source detection");
        Some(MonitorSourceGuard::new(original, monitor_set))
    } else {
        None
    };

    let device = host.default_input_device().ok_or(AudioError::NoDevice)?;
    let description = device.name().unwrap_or_else(|_| "Unknown".to_string());

    let supported = device.default_input_config()?;
    let channels = supported.channels();
    if channels == 0 {
        return Err(AudioError::NoChannels);
    }
    let sample_rate = supported.sample_rate().0;
    tracing::debug!(sample_rate, channels, format = ?supported.sample_format(), "input config");

    let config = cpal::StreamConfig {
        channels,
        sample_rate: cpal::SampleRate(sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };

    let stream = match supported.sample_format() {
        cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, Arc::clone(window))?,
        cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, Arc::clone(window))?,
        cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, Arc::clone(window))?,
        cpal::SampleFormat::I32 => build_stream::<i32>(&device, &config, Arc::clone(window))?,
        other => return Err(AudioError::SampleFormat(other)),
    };
    stream.play()?;
    drop(quiet);

    Ok(LiveStream {
        _stream: stream,
        _monitor: monitor,
        sample_rate,
        description,
    })
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    window: SharedWindow,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let channels = config.channels as usize;
    let mut converted: Vec<f32> = Vec::new();
    device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            converted.clear();
            converted.extend(data.iter().map(|&s| s.to_sample::<f32>()));
            if let Ok(mut window) = window.lock() {
                window.push_interleaved(&converted, channels);
            }
        },
        |err| tracing::error!("audio stream error: {}", err),
        None,
    )
}

/// Test signal: a slow chord with a pulsing beat and a sweeping lead
pub fn synth_chunk(start: u64, len: usize, sample_rate: u32) -> Vec<f32> {
    use std::f32::consts::TAU;
    let rate = sample_rate as f32;
    (0..len as u64)
        .map(|i| {
            let t = ((start + i) % (sample_rate as u64 * 3600)) as f32 / rate;
            let beat = (t * 2.0).fract();
            let envelope = (-beat * 6.0).exp();
            let kick = (TAU * 55.0 * t).sin() * envelope * 0.5;
            let chord = [220.0, 277.2, 329.6]
                .iter()
                .map(|f| (TAU * f * t).sin())
                .sum::<f32>()
                * 0.08
                * (0.6 + 0.4 * (TAU * 0.1 * t).sin());
            let sweep_freq = 600.0 + 2400.0 * (0.5 + 0.5 * (TAU * 0.05 * t).sin());
            let lead = (TAU * sweep_freq * t).sin() * 0.1;
            kick + chord + lead
        })
        .collect()
}

fn run_synth(window: &SharedWindow, shutdown: &Receiver<()>) {
    let tick = Duration::from_secs_f32(SYNTH_CHUNK as f32 / SYNTH_SAMPLE_RATE as f32);
    let mut position: u64 = 0;
    loop {
        let chunk = synth_chunk(position, SYNTH_CHUNK, SYNTH_SAMPLE_RATE);
        position += SYNTH_CHUNK as u64;
        if let Ok(mut w) = window.lock() {
            w.push_mono_samples(&chunk);
        }
        match shutdown.recv_timeout(tick) {
            Err(RecvTimeoutError::Timeout) => continue,
            _ => break,
        }
    }
}

/// Points fd 2 at /dev/null until dropped, then puts the old stderr back
struct QuietStderr {
    saved: libc::c_int,
}

fn quiet_stderr() -> Option<QuietStderr> {
    let null = OpenOptions::new().write(true).open("/dev/null").ok()?;
    // SAFETY: plain fd calls; `saved` is closed exactly once, in drop or on
    // the failure path below. `null` may close after dup2 copies it.
    let saved = unsafe { libc::dup(libc::STDERR_FILENO) };
    if saved < 0 {
        return None;
    }
    if unsafe { libc::dup2(null.as_raw_fd(), libc::STDERR_FILENO) } < 0 {
        unsafe { libc::close(saved) };
        return None;
    }
    Some(QuietStderr { saved })
}

impl Drop for QuietStderr {
    fn drop(&mut self) {
        unsafe {
            libc::dup2(self.saved, libc::STDERR_FILENO);
            libc::close(self.saved);
        }
    }
}

/// Valid PulseAudio source names: alphanumeric, dots, dashes, underscores,
/// colons, at-signs (e.g. "alsa_output.pci-0000_03_00.1.hdmi-stereo.monitor")
fn is_valid_source_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ':' | '@'))
}

fn pactl(args: &[&str]) -> Option<String> {
    std::process::Command::new("pactl")
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
}

/// Pick the monitor for `sink` from `pactl list sources short` output,
/// falling back to any monitor source
fn pick_monitor(sources: &str, sink: Option<&str>) -> Option<String> {
    let names: Vec<&str> = sources
        .lines()
        .filter_map(|line| line.split('\t').nth(1))
        .filter(|name| is_valid_source_name(name))
        .collect();

    if let Some(sink) = sink {
        let expected = format!("{}.monitor", sink);
        if let Some(name) = names.iter().find(|n| **n == expected) {
            return Some(name.to_string());
        }
    }
    names
        .iter()
        .find(|n| n.contains(".monitor"))
        .map(|n| n.to_string())
}

/// Temporarily make a monitor of the default sink the default input.
/// Returns `(original_source, monitor_was_set)`.
fn detect_and_set_monitor_source() -> (Option<String>, bool) {
    let original = pactl(&["get-default-source"]).filter(|s| is_valid_source_name(s));
    let sink = pactl(&["get-default-sink"]).filter(|s| is_valid_source_name(s));

    let monitor = pactl(&["list", "sources", "short"])
        .and_then(|sources| pick_monitor(&sources, sink.as_deref()));

    match monitor {
        Some(name) => {
            let set = pactl(&["set-default-source", &name]).is_some();
            tracing::debug!(monitor = %name, set, "monitor source");
            (original, set)
        }
        None => (original, false),
    }
}

/// Restores the original default source on drop
struct MonitorSourceGuard {
    original_source: Option<String>,
    should_restore: bool,
}

impl MonitorSourceGuard {
    fn new(original_source: Option<String>, should_restore: bool) -> Self {
        Self {
            original_source,
            should_restore,
        }
    }
}

impl Drop for MonitorSourceGuard {
    fn drop(&mut self) {
        if !self.should_restore {
            return;
        }
        if let Some(ref orig) = self.original_source {
            let _ = pactl(&["set-default-source", orig]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::rms_level;
    use std::os::unix::fs::MetadataExt;
    use std::time::Instant;

    #[test]
    fn source_names_parse() {
        assert_eq!("System".parse::<Source>(), Ok(Source::System));
        assert_eq!("microphone".parse::<Source>(), Ok(Source::Mic));
        assert_eq!("demo".parse::<Source>(), Ok(Source::Synth));
        assert_eq!("off".parse::<Source>(), Ok(Source::None));
        assert!("speaker".parse::<Source>().is_err());
        assert_eq!(Source::Synth.to_string(), "synth");
    }

    #[test]
    fn rejects_unsafe_source_names() {
        assert!(is_valid_source_name("alsa_output.pci-0000_03_00.1.hdmi-stereo.monitor"));
        assert!(is_valid_source_name("@DEFAULT_SINK@"));
        assert!(!is_valid_source_name(""));
        assert!(!is_valid_source_name("foo; rm -rf /"));
    }

    #[test]
    fn prefers_monitor_of_default_sink() {
        let listing = "1\talsa_input.usb-mic\tmodule\n\
                       2\talsa_output.hdmi.monitor\tmodule\n\
                       3\talsa_output.speakers.monitor\tmodule\n";
        assert_eq!(
            pick_monitor(listing, Some("alsa_output.speakers")).as_deref(),
            Some("alsa_output.speakers.monitor")
        );
        assert_eq!(
            pick_monitor(listing, Some("bluetooth")).as_deref(),
            Some("alsa_output.hdmi.monitor")
        );
        assert_eq!(pick_monitor("1\talsa_input.usb-mic\tx\n", None), None);
    }

    fn stderr_identity() -> (u64, u64) {
        let mut stat: libc::stat = unsafe { std::mem::zeroed() };
        assert_eq!(unsafe { libc::fstat(libc::STDERR_FILENO, &mut stat) }, 0);
        (stat.st_dev as u64, stat.st_ino as u64)
    }

    #[test]
    fn quiet_stderr_restores_the_original_stream() {
        let before = stderr_identity();
        {
            let _quiet = quiet_stderr().expect("/dev/null is writable");
            let null = std::fs::metadata("/dev/null").unwrap();
            assert_eq!(stderr_identity(), (null.dev(), null.ino()));
        }
        assert_eq!(stderr_identity(), before);
    }

    #[test]
    fn synth_signal_is_audible_and_bounded() {
        let chunk = synth_chunk(0, 4096, SYNTH_SAMPLE_RATE);
        assert!(chunk.iter().all(|s| s.is_finite() && s.abs() <= 1.0));
        assert!(rms_level(&chunk) > 0.05);
    }

    #[test]
    fn no_source_never_reports() {
        let mut acq = Acquisition::start(Source::None);
        assert!(acq.poll().is_none());
    }

    #[test]
    fn synth_source_reports_ready_once() {
        let mut acq = Acquisition::start(Source::Synth);
        let deadline = Instant::now() + Duration::from_secs(5);
        let ready = loop {
            if let Some(outcome) = acq.poll() {
                break outcome.expect("synth never fails");
            }
            assert!(Instant::now() < deadline, "synth source never became ready");
            thread::sleep(Duration::from_millis(5));
        };
        assert_eq!(ready.sample_rate, SYNTH_SAMPLE_RATE);
        assert!(acq.poll().is_none());

        thread::sleep(Duration::from_millis(100));
        let mut samples = vec![0.0; crate::analyzer::WINDOW_SIZE];
        ready.window.lock().unwrap().copy_samples(&mut samples);
        assert!(rms_level(&samples) > 0.0);
    }
}
