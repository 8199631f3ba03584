use serde::Deserialize;
use thiserror::Error;

/// Signed PCM sample format delivered by a sample source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    I8,
    I16,
    I32,
}

impl SampleFormat {
    pub fn bits(self) -> u32 {
        match self {
            SampleFormat::I8 => 8,
            SampleFormat::I16 => 16,
            SampleFormat::I32 => 32,
        }
    }

    /// Largest positive sample value
    pub fn full_scale(self) -> i32 {
        match self {
            SampleFormat::I8 => i8::MAX as i32,
            SampleFormat::I16 => i16::MAX as i32,
            SampleFormat::I32 => i32::MAX,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i8" | "s8" | "int8" => Some(SampleFormat::I8),
            "i16" | "s16" | "int16" => Some(SampleFormat::I16),
            "i32" | "s32" | "int32" => Some(SampleFormat::I32),
            _ => None,
        }
    }
}

/// Window applied to a frame before the transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Window {
    None,
    Hann,
    Hamming,
}

impl Window {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" | "off" | "rect" => Some(Window::None),
            "hann" | "hanning" => Some(Window::Hann),
            "hamming" => Some(Window::Hamming),
            _ => None,
        }
    }
}

/// Audio acquisition settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub sample_rate: u32,
    pub channels: u16,
    /// Samples per frame (power of two)
    pub chunk_size: usize,
    pub sample_format: SampleFormat,
    /// Input device name, `None` for the host default
    pub device: Option<String>,
    /// Longest wait for a frame before the stream is considered stalled
    pub read_timeout_ms: u64,
    /// Captured frames allowed to pile up before reporting an overflow
    pub max_backlog_frames: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            channels: 1,
            chunk_size: 8192,
            sample_format: SampleFormat::I16,
            device: None,
            read_timeout_ms: 2000,
            max_backlog_frames: 4,
        }
    }
}

/// Transform settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpectrumConfig {
    pub window: Window,
    /// Leading bins skipped by the peak search
    pub dc_exclusion_bins: usize,
    /// Magnitudes, in 8-bit-equivalent units, are scaled by 2 / (divisor * N)
    pub normalization_divisor: f32,
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self {
            window: Window::None,
            dc_exclusion_bins: 4,
            normalization_divisor: 256.0,
        }
    }
}

/// Plot ranges and refresh timing
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub tick_interval_ms: u64,
    pub freq_min_hz: f32,
    pub freq_max_hz: f32,
    pub spectrum_level_max: f32,
    pub scope_level_min: f32,
    pub scope_level_max: f32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 30,
            freq_min_hz: 50.0,
            freq_max_hz: 10000.0,
            spectrum_level_max: 1.0,
            scope_level_min: -127.0,
            scope_level_max: 300.0,
        }
    }
}

/// Synthetic test signal
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToneConfig {
    pub frequency_hz: f32,
    /// Peak amplitude relative to full scale (0.0-1.0)
    pub amplitude: f32,
    /// White noise level relative to full scale (0.0-1.0)
    pub noise: f32,
    pub seed: Option<u64>,
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 1000.0,
            amplitude: 0.5,
            noise: 0.0,
            seed: None,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("sample rate must be positive")]
    SampleRate,
    #[error("channel count must be at least 1")]
    Channels,
    #[error("chunk size {0} must be a power of two and at least 8")]
    ChunkSize(usize),
    #[error("normalization divisor must be a positive number, got {0}")]
    Divisor(f32),
    #[error("frequency axis {min}..{max} Hz is empty")]
    FrequencyAxis { min: f32, max: f32 },
    #[error("scope axis {min}..{max} is empty")]
    ScopeAxis { min: f32, max: f32 },
    #[error("spectrum level maximum must be positive, got {0}")]
    SpectrumLevel(f32),
    #[error("tick interval must be at least 1 ms")]
    TickInterval,
    #[error("tone {0} Hz is outside 0..Nyquist")]
    ToneFrequency(f32),
}

impl SourceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::SampleRate);
        }
        if self.channels == 0 {
            return Err(ConfigError::Channels);
        }
        if self.chunk_size < 8 || !self.chunk_size.is_power_of_two() {
            return Err(ConfigError::ChunkSize(self.chunk_size));
        }
        Ok(())
    }
}

impl SpectrumConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.normalization_divisor.is_finite() && self.normalization_divisor > 0.0) {
            return Err(ConfigError::Divisor(self.normalization_divisor));
        }
        Ok(())
    }
}

impl DisplayConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::TickInterval);
        }
        if !(self.freq_max_hz > self.freq_min_hz) {
            return Err(ConfigError::FrequencyAxis { min: self.freq_min_hz, max: self.freq_max_hz });
        }
        if !(self.scope_level_max > self.scope_level_min) {
            return Err(ConfigError::ScopeAxis { min: self.scope_level_min, max: self.scope_level_max });
        }
        if !(self.spectrum_level_max > 0.0) {
            return Err(ConfigError::SpectrumLevel(self.spectrum_level_max));
        }
        Ok(())
    }
}

impl ToneConfig {
    pub fn validate(&self, sample_rate: u32) -> Result<(), ConfigError> {
        let nyquist = sample_rate as f32 / 2.0;
        if !(self.frequency_hz >= 0.0 && self.frequency_hz <= nyquist) {
            return Err(ConfigError::ToneFrequency(self.frequency_hz));
        }
        Ok(())
    }
}
