//! Run/freeze state machine
//!
//! RUNNING: every tick replaces the current traces.
//! FROZEN: traces are held, the marker keeps following the pointer and the
//! frozen annotation moves with it.

use crate::marker::{MarkerReading, MarkerTracker};
use crate::spectrum::{FrequencyGrid, Traces};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    Running,
    Frozen,
}

impl DisplayMode {
    pub fn label(self) -> &'static str {
        match self {
            DisplayMode::Running => "RUNNING",
            DisplayMode::Frozen => "FROZEN",
        }
    }
}

pub struct DisplayState {
    mode: DisplayMode,
    traces: Option<Traces>,
    marker: MarkerTracker,
    annotation: Option<MarkerReading>,
}

impl DisplayState {
    pub fn new(grid: FrequencyGrid) -> Self {
        Self {
            mode: DisplayMode::Running,
            traces: None,
            marker: MarkerTracker::new(grid),
            annotation: None,
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Traces currently on screen; `None` until the first successful tick
    pub fn traces(&self) -> Option<&Traces> {
        self.traces.as_ref()
    }

    /// Annotation pinned by the last freeze, following the pointer while frozen
    pub fn annotation(&self) -> Option<MarkerReading> {
        self.annotation
    }

    pub fn marker_reading(&self) -> Option<MarkerReading> {
        self.traces
            .as_ref()
            .map(|t| self.marker.current_reading(&t.spectrum))
    }

    /// Flip the mode, returning the new one
    pub fn trigger(&mut self) -> DisplayMode {
        self.mode = match self.mode {
            DisplayMode::Running => {
                self.annotation = self.marker_reading();
                DisplayMode::Frozen
            }
            DisplayMode::Frozen => {
                self.annotation = None;
                DisplayMode::Running
            }
        };
        self.mode
    }

    pub fn pointer_move(&mut self, x: f32) {
        self.marker.on_pointer_move(x);
        if self.mode == DisplayMode::Frozen {
            self.annotation = self.marker_reading();
        }
    }

    /// Install freshly computed traces. Ignored while frozen.
    pub fn apply(&mut self, traces: Traces) -> bool {
        if self.mode == DisplayMode::Frozen {
            return false;
        }
        self.traces = Some(traces);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum::{FrequencyTrace, PeakReading, TimeTrace};

    fn grid() -> FrequencyGrid {
        FrequencyGrid::new(44100, 8)
    }

    fn traces(magnitudes: [f32; 4]) -> Traces {
        let grid = grid();
        Traces {
            time: TimeTrace { points: vec![(0.0, 128.0); 8] },
            spectrum: FrequencyTrace {
                points: grid.as_slice().iter().copied().zip(magnitudes).collect(),
            },
            peak: PeakReading::default(),
        }
    }

    #[test]
    fn starts_running_without_traces() {
        let state = DisplayState::new(grid());
        assert_eq!(state.mode(), DisplayMode::Running);
        assert!(state.traces().is_none());
        assert!(state.marker_reading().is_none());
        assert!(state.annotation().is_none());
    }

    #[test]
    fn trigger_flips_and_double_trigger_restores() {
        let mut state = DisplayState::new(grid());
        assert_eq!(state.trigger(), DisplayMode::Frozen);
        assert_eq!(state.trigger(), DisplayMode::Running);
        assert_eq!(state.mode(), DisplayMode::Running);
    }

    #[test]
    fn pointer_move_never_changes_mode() {
        let mut state = DisplayState::new(grid());
        state.pointer_move(500.0);
        assert_eq!(state.mode(), DisplayMode::Running);
        state.trigger();
        state.pointer_move(900.0);
        assert_eq!(state.mode(), DisplayMode::Frozen);
    }

    #[test]
    fn freeze_captures_annotation_and_holds_traces() {
        let mut state = DisplayState::new(grid());
        assert!(state.apply(traces([0.1, 0.2, 0.3, 0.4])));
        state.pointer_move(8000.0);
        state.trigger();

        let pinned = state.annotation().unwrap();
        assert_eq!(pinned.bin, 1);
        assert_eq!(pinned.magnitude, 0.2);

        assert!(!state.apply(traces([0.9, 0.9, 0.9, 0.9])));
        assert_eq!(state.traces().unwrap().spectrum.magnitude(1), 0.2);
    }

    #[test]
    fn frozen_pointer_move_updates_marker_against_held_trace() {
        let mut state = DisplayState::new(grid());
        state.apply(traces([0.1, 0.2, 0.3, 0.4]));
        state.trigger();
        let before = state.traces().unwrap().spectrum.clone();

        state.pointer_move(1000.0);
        let reading = state.marker_reading().unwrap();
        assert_eq!(reading.frequency_hz, 1000.0);
        assert_eq!(reading.magnitude, 0.1);
        assert_eq!(state.annotation(), Some(reading));
        assert_eq!(state.traces().unwrap().spectrum, before);

        state.pointer_move(15000.0);
        assert_eq!(state.annotation().unwrap().magnitude, 0.3);
    }

    #[test]
    fn resume_clears_annotation_and_accepts_ticks() {
        let mut state = DisplayState::new(grid());
        state.apply(traces([0.1, 0.2, 0.3, 0.4]));
        state.trigger();
        state.trigger();
        assert!(state.annotation().is_none());
        assert!(state.apply(traces([0.5, 0.5, 0.5, 0.5])));
        assert_eq!(state.marker_reading().unwrap().magnitude, 0.5);
    }
}
