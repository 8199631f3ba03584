//! Presentation side of the analyzer
//!
//! Renderers receive a read-only [`View`] of the display state every tick and
//! report input back as [`InputEvent`]s in data coordinates. All formatting of
//! readings lives here.

pub mod headless;
pub mod plot;
pub mod readout;
pub mod tui;

use crate::display::{DisplayMode, DisplayState};
use crate::marker::MarkerReading;
use crate::spectrum::Traces;
use std::io;
use std::time::Duration;

pub use headless::HeadlessRenderer;
pub use tui::TerminalRenderer;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer over the spectrum plot, in Hz and spectrum level
    PointerMove { x: f32, y: f32 },
    /// Freeze or resume
    Trigger,
    Quit,
}

/// Snapshot handed to a renderer for one redraw
#[derive(Debug, Clone, Copy)]
pub struct View<'a> {
    pub mode: DisplayMode,
    pub traces: Option<&'a Traces>,
    pub marker: Option<MarkerReading>,
    pub annotation: Option<MarkerReading>,
}

impl<'a> View<'a> {
    pub fn from_state(state: &'a DisplayState) -> Self {
        Self {
            mode: state.mode(),
            traces: state.traces(),
            marker: state.marker_reading(),
            annotation: state.annotation(),
        }
    }
}

pub trait RenderAdapter {
    fn draw(&mut self, view: &View) -> io::Result<()>;

    /// Wait up to `timeout` for input. Events the core does not care about
    /// (resizes, pointer motion outside the spectrum) are absorbed here.
    fn poll_event(&mut self, timeout: Duration) -> io::Result<Option<InputEvent>>;
}
