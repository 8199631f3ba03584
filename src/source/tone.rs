//! Synthetic input: a sine tone with optional white noise
//!
//! Paced sources sleep so frames arrive at the rate a real device would
//! deliver them. Unpaced sources return immediately, which is what the
//! headless mode and the tests use.

use super::{quantize, AudioFrame, SampleSource};
use crate::config::{SampleFormat, SourceConfig, ToneConfig};
use crate::error::StreamError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;
use std::time::{Duration, Instant};

pub struct ToneSource {
    sample_rate: u32,
    chunk_size: usize,
    format: SampleFormat,
    tone: ToneConfig,
    phase: f64,
    rng: StdRng,
    paced: bool,
    next_due: Option<Instant>,
}

impl ToneSource {
    pub fn new(source: &SourceConfig, tone: &ToneConfig) -> Self {
        let rng = match tone.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            sample_rate: source.sample_rate,
            chunk_size: source.chunk_size,
            format: source.sample_format,
            tone: tone.clone(),
            phase: 0.0,
            rng,
            paced: false,
            next_due: None,
        }
    }

    /// Deliver frames no faster than a device running at the configured rate
    pub fn paced(mut self, paced: bool) -> Self {
        self.paced = paced;
        self
    }

    fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(self.chunk_size as f64 / self.sample_rate as f64)
    }

    fn wait_for_frame(&mut self) {
        let frame_time = self.frame_duration();
        let now = Instant::now();
        let due = match self.next_due {
            // Fell more than a frame behind: restart the clock instead of bursting
            Some(due) if now.saturating_duration_since(due) < frame_time => due,
            _ => now,
        };
        if due > now {
            std::thread::sleep(due - now);
        }
        self.next_due = Some(due + frame_time);
    }
}

impl SampleSource for ToneSource {
    fn read_frame(&mut self) -> Result<AudioFrame, StreamError> {
        if self.paced {
            self.wait_for_frame();
        }

        let step = TAU * self.tone.frequency_hz as f64 / self.sample_rate as f64;
        let amplitude = self.tone.amplitude.clamp(0.0, 1.0);
        let noise = self.tone.noise.clamp(0.0, 1.0);

        let mut samples = Vec::with_capacity(self.chunk_size);
        for _ in 0..self.chunk_size {
            let mut value = amplitude * self.phase.sin() as f32;
            if noise > 0.0 {
                value += noise * self.rng.gen_range(-1.0f32..=1.0);
            }
            samples.push(quantize(value, self.format));
            self.phase = (self.phase + step) % TAU;
        }

        Ok(AudioFrame::new(samples, self.format))
    }

    fn suspend(&mut self) {
        self.next_due = None;
    }

    fn resume(&mut self) -> Result<(), StreamError> {
        self.next_due = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(chunk_size: usize, tone: ToneConfig) -> ToneSource {
        let config = SourceConfig { sample_rate: 8000, chunk_size, ..SourceConfig::default() };
        ToneSource::new(&config, &tone)
    }

    #[test]
    fn frames_have_configured_length_and_format() {
        let mut tone = source(256, ToneConfig::default());
        let frame = tone.read_frame().unwrap();
        assert_eq!(frame.len(), 256);
        assert_eq!(frame.format(), SampleFormat::I16);
    }

    #[test]
    fn amplitude_bounds_samples() {
        let tone = ToneConfig { amplitude: 0.25, ..ToneConfig::default() };
        let mut src = source(1024, tone);
        let frame = src.read_frame().unwrap();
        let limit = (0.25 * 32767.0f32).ceil() as i32;
        assert!(frame.samples().iter().all(|s| s.abs() <= limit));
        assert!(frame.samples().iter().any(|s| s.abs() > limit / 2));
    }

    #[test]
    fn phase_continues_across_frames() {
        let tone = ToneConfig { frequency_hz: 100.0, ..ToneConfig::default() };
        let mut split = source(64, tone.clone());
        let mut whole = source(128, tone);
        let mut joined = split.read_frame().unwrap().samples().to_vec();
        joined.extend_from_slice(split.read_frame().unwrap().samples());
        let reference = whole.read_frame().unwrap();
        for (a, b) in joined.iter().zip(reference.samples()) {
            assert!((a - b).abs() <= 1);
        }
    }

    #[test]
    fn seeded_noise_is_reproducible() {
        let tone = ToneConfig { amplitude: 0.0, noise: 0.5, seed: Some(42), ..ToneConfig::default() };
        let a = source(64, tone.clone()).read_frame().unwrap();
        let b = source(64, tone).read_frame().unwrap();
        assert_eq!(a, b);
        assert!(a.samples().iter().any(|&s| s != 0));
    }

    #[test]
    fn paced_source_waits_between_frames() {
        // 400 samples at 8kHz = 50ms per frame
        let mut src = source(400, ToneConfig::default()).paced(true);
        let start = Instant::now();
        src.read_frame().unwrap();
        src.read_frame().unwrap();
        assert!(start.elapsed() >= Duration::from_millis(45));
    }
}
