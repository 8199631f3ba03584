use crate::spectrum::{FrequencyGrid, FrequencyTrace};

/// Marker position and the spectrum level under it
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MarkerReading {
    /// Pointer frequency, not snapped to the bin grid
    pub frequency_hz: f32,
    pub bin: usize,
    pub magnitude: f32,
}

/// Follows the pointer across the frequency axis
pub struct MarkerTracker {
    grid: FrequencyGrid,
    target_hz: f32,
    bin: usize,
}

impl MarkerTracker {
    pub fn new(grid: FrequencyGrid) -> Self {
        Self { grid, target_hz: 0.0, bin: 0 }
    }

    pub fn on_pointer_move(&mut self, x: f32) {
        self.target_hz = x;
        self.bin = self.grid.floor_bin(x);
    }

    #[cfg(test)]
    pub fn bin(&self) -> usize {
        self.bin
    }

    /// Reading against whichever trace is on screen
    pub fn current_reading(&self, trace: &FrequencyTrace) -> MarkerReading {
        MarkerReading {
            frequency_hz: self.target_hz,
            bin: self.bin,
            magnitude: trace.magnitude(self.bin),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(grid: &FrequencyGrid, magnitudes: &[f32]) -> FrequencyTrace {
        FrequencyTrace {
            points: grid.as_slice().iter().copied().zip(magnitudes.iter().copied()).collect(),
        }
    }

    #[test]
    fn starts_at_first_bin() {
        let grid = FrequencyGrid::new(44100, 8);
        let tracker = MarkerTracker::new(grid.clone());
        let reading = tracker.current_reading(&trace(&grid, &[0.5, 0.1, 0.2, 0.3]));
        assert_eq!(reading, MarkerReading { frequency_hz: 0.0, bin: 0, magnitude: 0.5 });
    }

    #[test]
    fn reading_uses_floor_bin_but_keeps_pointer_frequency() {
        let grid = FrequencyGrid::new(44100, 8);
        let mut tracker = MarkerTracker::new(grid.clone());
        tracker.on_pointer_move(10000.0);
        let reading = tracker.current_reading(&trace(&grid, &[0.5, 0.1, 0.2, 0.3]));
        assert_eq!(reading.frequency_hz, 10000.0);
        assert_eq!(reading.bin, 1);
        assert_eq!(reading.magnitude, 0.1);
    }

    #[test]
    fn below_grid_clamps_to_first_bin() {
        let grid = FrequencyGrid::new(44100, 8);
        let mut tracker = MarkerTracker::new(grid.clone());
        tracker.on_pointer_move(-5.0);
        let reading = tracker.current_reading(&trace(&grid, &[0.5, 0.1, 0.2, 0.3]));
        assert_eq!(reading.bin, 0);
        assert_eq!(reading.frequency_hz, -5.0);
        assert_eq!(reading.magnitude, 0.5);
    }

    #[test]
    fn empty_trace_reads_zero() {
        let grid = FrequencyGrid::new(44100, 8);
        let mut tracker = MarkerTracker::new(grid);
        tracker.on_pointer_move(20000.0);
        assert_eq!(tracker.current_reading(&FrequencyTrace::default()).magnitude, 0.0);
    }

    #[test]
    fn reading_is_idempotent() {
        let grid = FrequencyGrid::new(44100, 64);
        let magnitudes: Vec<f32> = (0..32).map(|i| i as f32 / 32.0).collect();
        let spectrum = trace(&grid, &magnitudes);
        let mut tracker = MarkerTracker::new(grid);
        tracker.on_pointer_move(3210.0);
        assert_eq!(tracker.current_reading(&spectrum), tracker.current_reading(&spectrum));
    }

    #[test]
    fn resolved_bin_is_monotonic() {
        let grid = FrequencyGrid::new(48000, 512);
        let mut tracker = MarkerTracker::new(grid);
        let mut last = 0;
        for step in 0..600 {
            tracker.on_pointer_move(step as f32 * 41.3 - 200.0);
            assert!(tracker.bin() >= last);
            last = tracker.bin();
        }
    }
}
