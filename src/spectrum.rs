//! Frame analysis: oscilloscope trace, single-sided magnitude spectrum and peak search
//!
//! Each frame is analysed on its own. There is no smoothing or averaging
//! between frames, and no window is applied unless one is configured.
//!
//! Magnitudes are taken in 8-bit-equivalent units (the sample divided by
//! `2^(bits - 8)`, like the scope trace) and scaled by `2 / (divisor * N)`.
//! With the default divisor of 256 a full-scale sine of any sample format
//! reads 0.5 on the spectrum axis.

use crate::config::{SampleFormat, SourceConfig, SpectrumConfig, Window};
use crate::error::ProcessingError;
use crate::source::AudioFrame;
use spectrum_analyzer::scaling::{SpectrumDataStats, SpectrumScalingFunction};
use spectrum_analyzer::windows::{hamming_window, hann_window};
use spectrum_analyzer::{samples_fft_to_spectrum, FrequencyLimit};

/// Offset added to the 8-bit scope level so silence sits mid-screen
const SCOPE_OFFSET: f32 = 128.0;

/// Bin frequencies of the single-sided spectrum: N/2 points from 0 Hz to Nyquist inclusive
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyGrid {
    hz: Vec<f32>,
}

impl FrequencyGrid {
    pub fn new(sample_rate: u32, chunk_size: usize) -> Self {
        let bins = chunk_size / 2;
        let nyquist = sample_rate as f64 / 2.0;
        let denom = bins.saturating_sub(1).max(1) as f64;
        let hz = (0..bins)
            .map(|k| (k as f64 * nyquist / denom) as f32)
            .collect();
        Self { hz }
    }

    pub fn len(&self) -> usize {
        self.hz.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hz.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.hz
    }

    /// Frequency of a bin, 0 Hz for bins past the end
    pub fn frequency(&self, bin: usize) -> f32 {
        self.hz.get(bin).copied().unwrap_or(0.0)
    }

    /// Largest bin whose frequency is <= `hz`.
    ///
    /// Targets below the first bin (and NaN) clamp to bin 0; targets above
    /// Nyquist resolve to the last bin.
    pub fn floor_bin(&self, hz: f32) -> usize {
        match self.hz.first() {
            Some(&first) if hz >= first => self.hz.partition_point(|&g| g <= hz) - 1,
            _ => 0,
        }
    }
}

/// Oscilloscope view of a frame: (seconds, level) pairs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeTrace {
    pub points: Vec<(f32, f32)>,
}

/// Single-sided magnitude spectrum: (Hz, magnitude) pairs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrequencyTrace {
    pub points: Vec<(f32, f32)>,
}

impl FrequencyTrace {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Magnitude at `bin`, 0 when the bin does not exist
    pub fn magnitude(&self, bin: usize) -> f32 {
        self.points.get(bin).map_or(0.0, |&(_, mag)| mag)
    }
}

/// Strongest bin outside the DC exclusion band
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PeakReading {
    pub bin: usize,
    pub frequency_hz: f32,
    pub magnitude: f32,
}

/// Everything derived from one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Traces {
    pub time: TimeTrace,
    pub spectrum: FrequencyTrace,
    pub peak: PeakReading,
}

pub struct SpectrumEngine {
    sample_rate: u32,
    chunk_size: usize,
    config: SpectrumConfig,
    grid: FrequencyGrid,
}

impl SpectrumEngine {
    pub fn new(source: &SourceConfig, config: &SpectrumConfig) -> Self {
        Self {
            sample_rate: source.sample_rate,
            chunk_size: source.chunk_size,
            config: config.clone(),
            grid: FrequencyGrid::new(source.sample_rate, source.chunk_size),
        }
    }

    pub fn grid(&self) -> &FrequencyGrid {
        &self.grid
    }

    pub fn process(&self, frame: &AudioFrame) -> Result<Traces, ProcessingError> {
        if frame.len() != self.chunk_size {
            return Err(ProcessingError::FrameLength {
                expected: self.chunk_size,
                actual: frame.len(),
            });
        }

        let time = self.time_trace(frame);
        let spectrum = self.frequency_trace(frame)?;
        let peak = self.find_peak(&spectrum);

        Ok(Traces { time, spectrum, peak })
    }

    fn time_trace(&self, frame: &AudioFrame) -> TimeTrace {
        let rate = self.sample_rate as f32;
        let points = frame
            .samples()
            .iter()
            .enumerate()
            .map(|(i, &sample)| (i as f32 / rate, scope_level(sample, frame.format())))
            .collect();
        TimeTrace { points }
    }

    fn frequency_trace(&self, frame: &AudioFrame) -> Result<FrequencyTrace, ProcessingError> {
        let samples: Vec<f32> = frame.samples().iter().map(|&s| s as f32).collect();
        let windowed = match self.config.window {
            Window::None => samples,
            Window::Hann => hann_window(&samples),
            Window::Hamming => hamming_window(&samples),
        };

        let scale = 2.0
            / (self.config.normalization_divisor * format_width(frame.format()) * self.chunk_size as f32);
        let scaling: &SpectrumScalingFunction =
            &move |val: f32, _stats: &SpectrumDataStats| val * scale;

        let spectrum = samples_fft_to_spectrum(&windowed, self.sample_rate, FrequencyLimit::All, Some(scaling))
            .map_err(|e| ProcessingError::Transform(format!("{:?}", e)))?;

        let half = self.grid.len();
        let data = spectrum.data();
        if data.len() < half {
            return Err(ProcessingError::Transform(format!(
                "spectrum has {} bins, expected at least {}",
                data.len(),
                half
            )));
        }

        let points = self
            .grid
            .as_slice()
            .iter()
            .zip(data.iter())
            .map(|(&hz, (_, val))| (hz, val.val()))
            .collect();
        Ok(FrequencyTrace { points })
    }

    /// First maximum at or after the exclusion band. An empty search range
    /// yields the zero reading.
    fn find_peak(&self, spectrum: &FrequencyTrace) -> PeakReading {
        spectrum
            .points
            .iter()
            .enumerate()
            .skip(self.config.dc_exclusion_bins)
            .fold(None, |best: Option<PeakReading>, (bin, &(hz, mag))| match best {
                Some(b) if b.magnitude >= mag => Some(b),
                _ => Some(PeakReading { bin, frequency_hz: hz, magnitude: mag }),
            })
            .unwrap_or_default()
    }
}

/// Sample units per 8-bit-equivalent step
fn format_width(format: SampleFormat) -> f32 {
    (1u32 << (format.bits() - 8)) as f32
}

/// 8-bit-equivalent level of a sample, offset into 0..=255
fn scope_level(sample: i32, format: SampleFormat) -> f32 {
    let shift = format.bits() - 8;
    (sample >> shift).clamp(i8::MIN as i32, i8::MAX as i32) as f32 + SCOPE_OFFSET
}
