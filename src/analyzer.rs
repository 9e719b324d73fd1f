//! Spectral analysis of the live sample window
//!
//! Produces, once per frame, a byte-scaled magnitude spectrum and an RMS
//! loudness level. Nothing is carried over between frames.

use crate::draw::map_range;
use spectrum_analyzer::scaling::divide_by_N;
use spectrum_analyzer::windows::hann_window;
use spectrum_analyzer::{samples_fft_to_spectrum, FrequencyLimit};
use std::sync::{Arc, Mutex};

/// Samples per analysis window (power of two for the FFT)
pub const WINDOW_SIZE: usize = 1024;
/// Bins reported per spectrum frame (half the window)
pub const SPECTRUM_BINS: usize = WINDOW_SIZE / 2;

/// Decibel range mapped onto 0..=255
const MIN_DECIBELS: f32 = -100.0;
const MAX_DECIBELS: f32 = -30.0;

/// Magnitude snapshot for one frame, one byte per frequency bin
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpectrumFrame {
    bins: Vec<u8>,
}

impl SpectrumFrame {
    pub fn from_bins(bins: Vec<u8>) -> Self {
        Self { bins }
    }

    /// All-zero spectrum of the given length
    pub fn silent(len: usize) -> Self {
        Self { bins: vec![0; len] }
    }

    /// Energy of bin `i`; bins past the end read as 0
    pub fn bin(&self, i: usize) -> f32 {
        self.bins.get(i).copied().unwrap_or(0) as f32
    }

    /// Mean energy over `[start, end)`, missing bins counted as 0
    pub fn band_mean(&self, start: usize, end: usize) -> f32 {
        if end <= start {
            return 0.0;
        }
        let sum: f32 = (start..end).map(|i| self.bin(i)).sum();
        sum / (end - start) as f32
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }
}

/// Analysis results handed to the renderers each frame
#[derive(Clone, Debug, Default)]
pub struct Analysis {
    pub spectrum: SpectrumFrame,
    pub level: f32,
}

/// Mono ring buffer filled by the capture callback and read by the frame loop
pub struct SampleWindow {
    samples: Vec<f32>,
    write_pos: usize,
}

impl Default for SampleWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleWindow {
    pub fn new() -> Self {
        Self {
            samples: vec![0.0; WINDOW_SIZE],
            write_pos: 0,
        }
    }

    pub fn push_mono_samples(&mut self, samples: &[f32]) {
        for &sample in samples {
            self.samples[self.write_pos] = sample;
            self.write_pos = (self.write_pos + 1) % WINDOW_SIZE;
        }
    }

    /// Push interleaved multi-channel frames, averaging channels down to mono
    pub fn push_interleaved(&mut self, data: &[f32], channels: usize) {
        if channels <= 1 {
            self.push_mono_samples(data);
            return;
        }
        for frame in data.chunks(channels) {
            let mixed = frame.iter().sum::<f32>() / frame.len() as f32;
            self.samples[self.write_pos] = mixed;
            self.write_pos = (self.write_pos + 1) % WINDOW_SIZE;
        }
    }

    /// Copy samples into a preallocated buffer (oldest to newest order)
    pub fn copy_samples(&self, out: &mut [f32]) {
        for (i, slot) in out.iter_mut().enumerate().take(WINDOW_SIZE) {
            *slot = self.samples[(self.write_pos + i) % WINDOW_SIZE];
        }
    }
}

/// Shared handle to an attached sample window
pub type SharedWindow = Arc<Mutex<SampleWindow>>;

struct AttachedSource {
    window: SharedWindow,
    sample_rate: u32,
}

/// Wraps the audio sample window. Reports `enabled() == false` until a
/// source is attached; callers must check before consuming.
pub struct SpectralAnalyzer {
    source: Option<AttachedSource>,
    scratch: Vec<f32>,
}

impl Default for SpectralAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectralAnalyzer {
    pub fn new() -> Self {
        Self {
            source: None,
            scratch: vec![0.0; WINDOW_SIZE],
        }
    }

    pub fn attach(&mut self, window: SharedWindow, sample_rate: u32) {
        tracing::debug!(sample_rate, "analyzer attached");
        self.source = Some(AttachedSource { window, sample_rate });
    }

    pub fn enabled(&self) -> bool {
        self.source.is_some()
    }

    /// Copy the current window into scratch; a poisoned lock reads as silence
    fn snapshot(&mut self) -> bool {
        let Some(source) = self.source.as_ref() else {
            return false;
        };
        match source.window.lock() {
            Ok(window) => window.copy_samples(&mut self.scratch),
            Err(_) => self.scratch.fill(0.0),
        }
        true
    }

    /// Byte-scaled magnitude spectrum of the last snapshot
    pub fn analyze(&self) -> SpectrumFrame {
        match &self.source {
            Some(source) => spectrum_of(&self.scratch, source.sample_rate),
            None => SpectrumFrame::silent(SPECTRUM_BINS),
        }
    }

    /// RMS loudness of the last snapshot in [0, 1]
    pub fn level(&self) -> f32 {
        if self.enabled() {
            rms_level(&self.scratch)
        } else {
            0.0
        }
    }

    /// Snapshot the window once and analyze it, or `None` while no source
    /// is attached. Spectrum and level always describe the same samples.
    pub fn frame(&mut self) -> Option<Analysis> {
        if !self.snapshot() {
            return None;
        }
        Some(Analysis {
            spectrum: self.analyze(),
            level: self.level(),
        })
    }
}

/// Hann-windowed FFT mapped from [-100 dB, -30 dB] onto 0..=255
pub fn spectrum_of(samples: &[f32], sample_rate: u32) -> SpectrumFrame {
    if samples.iter().any(|s| !s.is_finite()) {
        return SpectrumFrame::silent(SPECTRUM_BINS);
    }
    let windowed = hann_window(samples);
    let spectrum = match samples_fft_to_spectrum(
        &windowed,
        sample_rate,
        FrequencyLimit::All,
        Some(&divide_by_N),
    ) {
        Ok(s) => s,
        Err(e) => {
            tracing::trace!("fft failed: {:?}", e);
            return SpectrumFrame::silent(SPECTRUM_BINS);
        }
    };

    let bins = spectrum
        .data()
        .iter()
        .take(SPECTRUM_BINS)
        .map(|(_, magnitude)| {
            let db = 20.0 * magnitude.val().log10();
            map_range(db, MIN_DECIBELS, MAX_DECIBELS, 0.0, 255.0) as u8
        })
        .collect();
    SpectrumFrame::from_bins(bins)
}

/// Root mean square of the samples, clamped to [0, 1]
pub fn rms_level(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    let rms = (sum_sq / samples.len() as f32).sqrt();
    if rms.is_finite() {
        rms.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, amp: f32, sample_rate: u32) -> Vec<f32> {
        (0..WINDOW_SIZE)
            .map(|i| amp * (std::f32::consts::TAU * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn out_of_range_bins_read_zero() {
        let frame = SpectrumFrame::from_bins(vec![10, 20, 30]);
        assert_eq!(frame.bin(2), 30.0);
        assert_eq!(frame.bin(3), 0.0);
        assert_eq!(frame.bin(10_000), 0.0);
        // half the band lies past the end
        assert_eq!(frame.band_mean(2, 4), 15.0);
        assert_eq!(frame.band_mean(5, 5), 0.0);
    }

    #[test]
    fn silence_gives_zero_spectrum_and_level() {
        let silent = vec![0.0; WINDOW_SIZE];
        let frame = spectrum_of(&silent, 44_100);
        assert_eq!(frame.len(), SPECTRUM_BINS);
        assert!((0..frame.len()).all(|i| frame.bin(i) == 0.0));
        assert_eq!(rms_level(&silent), 0.0);
    }

    #[test]
    fn sine_peaks_near_its_bin() {
        let sample_rate = 44_100;
        let samples = sine(1000.0, 0.8, sample_rate);
        let frame = spectrum_of(&samples, sample_rate);
        let peak = (0..frame.len())
            .max_by(|&a, &b| frame.bin(a).total_cmp(&frame.bin(b)))
            .unwrap();
        let expected = (1000.0 * WINDOW_SIZE as f32 / sample_rate as f32).round() as usize;
        assert!(peak.abs_diff(expected) <= 1, "peak at {peak}, expected ~{expected}");
        assert!(frame.bin(peak) > 200.0);
    }

    #[test]
    fn rms_of_sine_is_amplitude_over_root_two() {
        let samples = sine(441.0, 0.5, 44_100);
        let level = rms_level(&samples);
        assert!((level - 0.5 / 2f32.sqrt()).abs() < 0.01);
    }

    #[test]
    fn rms_is_clamped() {
        assert_eq!(rms_level(&[4.0; 16]), 1.0);
        assert_eq!(rms_level(&[]), 0.0);
    }

    #[test]
    fn analyzer_is_disabled_until_attached() {
        let mut analyzer = SpectralAnalyzer::new();
        assert!(!analyzer.enabled());
        assert!(analyzer.frame().is_none());
        assert_eq!(analyzer.level(), 0.0);

        let window = Arc::new(Mutex::new(SampleWindow::new()));
        window.lock().unwrap().push_mono_samples(&sine(1000.0, 0.5, 48_000));
        analyzer.attach(Arc::clone(&window), 48_000);
        let analysis = analyzer.frame().expect("attached analyzer reports a frame");
        assert_eq!(analysis.spectrum.len(), SPECTRUM_BINS);
        assert!(analysis.level > 0.3);
    }

    #[test]
    fn frame_analyzes_a_single_snapshot() {
        let window = Arc::new(Mutex::new(SampleWindow::new()));
        window.lock().unwrap().push_mono_samples(&sine(2000.0, 0.4, 44_100));
        let mut analyzer = SpectralAnalyzer::new();
        analyzer.attach(Arc::clone(&window), 44_100);
        let analysis = analyzer.frame().unwrap();

        // writes after the snapshot do not leak into either value
        window.lock().unwrap().push_mono_samples(&[0.0; WINDOW_SIZE]);
        assert!(analyzer.level() > 0.2);
        assert_eq!(analyzer.level(), analysis.level);
        assert_eq!(analyzer.analyze(), analysis.spectrum);

        let mut copy = vec![0.0; WINDOW_SIZE];
        window.lock().unwrap().copy_samples(&mut copy);
        assert_eq!(rms_level(&copy), 0.0);
        assert_eq!(analyzer.frame().unwrap().level, 0.0);
    }

    #[test]
    fn interleaved_stereo_is_averaged() {
        let mut window = SampleWindow::new();
        window.push_interleaved(&[1.0, 0.0, 0.5, 0.5], 2);
        let mut out = vec![0.0; WINDOW_SIZE];
        window.copy_samples(&mut out);
        assert_eq!(out[WINDOW_SIZE - 2], 0.5);
        assert_eq!(out[WINDOW_SIZE - 1], 0.5);
    }
}
