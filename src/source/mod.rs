//! Sample sources
//!
//! A source hands out one fixed-size frame per call. `read_frame` blocks
//! until a full frame has been captured; nothing is queued on the caller's
//! side, so a slow reader simply sees fewer frames.

pub mod device;
pub mod tone;

use crate::config::SampleFormat;
use crate::error::StreamError;

pub use device::DeviceSource;
pub use tone::ToneSource;

/// One chunk of single-channel signed samples
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFrame {
    samples: Vec<i32>,
    format: SampleFormat,
}

impl AudioFrame {
    pub fn new(samples: Vec<i32>, format: SampleFormat) -> Self {
        Self { samples, format }
    }

    pub fn samples(&self) -> &[i32] {
        &self.samples
    }

    pub fn format(&self) -> SampleFormat {
        self.format
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

pub trait SampleSource {
    /// Block until a full frame is available
    fn read_frame(&mut self) -> Result<AudioFrame, StreamError>;

    /// Stop acquiring while the display is frozen
    fn suspend(&mut self) {}

    /// Restart acquisition; samples captured before the call are discarded
    fn resume(&mut self) -> Result<(), StreamError> {
        Ok(())
    }
}

/// Convert a normalized sample (-1.0..=1.0) to an integer sample of `format`
pub fn quantize(sample: f32, format: SampleFormat) -> i32 {
    let full_scale = format.full_scale() as f64;
    (sample.clamp(-1.0, 1.0) as f64 * full_scale).round() as i32
}
