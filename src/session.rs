//! The tick loop
//!
//! One thread does everything: each tick reads a frame (unless frozen),
//! analyses it, updates the display state and redraws. Input events are
//! polled in the gap before the next tick and handled one at a time, so an
//! event never sees a half-updated trace.

use crate::display::{DisplayMode, DisplayState};
use crate::error::{SessionError, StreamError};
use crate::render::{InputEvent, RenderAdapter, View};
use crate::source::SampleSource;
use crate::spectrum::SpectrumEngine;
use std::time::{Duration, Instant};

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// New traces are on screen
    Updated,
    /// The frame could not be analysed; previous traces stay up
    Skipped,
    /// Frozen, no frame was read
    Held,
}

pub struct Session<S: SampleSource> {
    source: S,
    engine: SpectrumEngine,
    state: DisplayState,
    tick_interval: Duration,
}

impl<S: SampleSource> Session<S> {
    pub fn new(source: S, engine: SpectrumEngine, tick_interval: Duration) -> Self {
        let state = DisplayState::new(engine.grid().clone());
        Self {
            source,
            engine,
            state,
            tick_interval,
        }
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    #[cfg(test)]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Acquire, analyse and publish one frame
    pub fn tick(&mut self) -> Result<TickOutcome, StreamError> {
        if self.state.mode() == DisplayMode::Frozen {
            return Ok(TickOutcome::Held);
        }

        let frame = self.source.read_frame()?;
        match self.engine.process(&frame) {
            Ok(traces) => {
                self.state.apply(traces);
                Ok(TickOutcome::Updated)
            }
            Err(e) => {
                log::warn!("Skipping frame: {}", e);
                Ok(TickOutcome::Skipped)
            }
        }
    }

    /// Apply one input event. Returns `false` when the session should end.
    pub fn handle_event(&mut self, event: InputEvent) -> Result<bool, StreamError> {
        match event {
            InputEvent::Trigger => match self.state.trigger() {
                DisplayMode::Frozen => {
                    log::info!("Display frozen");
                    self.source.suspend();
                }
                DisplayMode::Running => {
                    log::info!("Display resumed");
                    self.source.resume()?;
                }
            },
            InputEvent::PointerMove { x, .. } => self.state.pointer_move(x),
            InputEvent::Quit => return Ok(false),
        }
        Ok(true)
    }

    /// Run until the renderer reports `Quit` or the stream fails
    pub fn run<R: RenderAdapter>(&mut self, renderer: &mut R) -> Result<(), SessionError> {
        let mut next_tick = Instant::now();
        loop {
            self.tick()?;
            renderer.draw(&View::from_state(&self.state))?;

            // Missed ticks are dropped rather than replayed
            next_tick = (next_tick + self.tick_interval).max(Instant::now());

            loop {
                let remaining = next_tick.saturating_duration_since(Instant::now());
                match renderer.poll_event(remaining)? {
                    Some(event) => {
                        if !self.handle_event(event)? {
                            log::info!("Session ended");
                            return Ok(());
                        }
                    }
                    None if Instant::now() >= next_tick => break,
                    None => {}
                }
            }
        }
    }
}
