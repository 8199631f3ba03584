//! Line-per-tick renderer for scripts and terminals without mouse support

use super::readout::{marker_label, peak_label};
use super::{InputEvent, RenderAdapter, View};
use std::io::{self, Write};
use std::time::Duration;

/// Prints the readings of each tick and quits after a fixed number of ticks
pub struct HeadlessRenderer<W: Write> {
    out: W,
    remaining: usize,
    drawn: usize,
}

impl<W: Write> HeadlessRenderer<W> {
    pub fn new(out: W, ticks: usize) -> Self {
        Self { out, remaining: ticks, drawn: 0 }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderAdapter for HeadlessRenderer<W> {
    fn draw(&mut self, view: &View) -> io::Result<()> {
        self.drawn += 1;
        let mut line = format!("{:>4} [{}]", self.drawn, view.mode.label());
        match view.traces {
            Some(traces) => {
                line.push(' ');
                line.push_str(&peak_label(&traces.peak));
                if let Some(marker) = view.marker {
                    line.push_str(" | ");
                    line.push_str(&marker_label(&marker));
                }
            }
            None => line.push_str(" waiting for audio"),
        }
        writeln!(self.out, "{}", line)?;
        self.out.flush()?;
        self.remaining = self.remaining.saturating_sub(1);
        Ok(())
    }

    fn poll_event(&mut self, timeout: Duration) -> io::Result<Option<InputEvent>> {
        if self.remaining == 0 {
            return Ok(Some(InputEvent::Quit));
        }
        std::thread::sleep(timeout);
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DisplayMode;
    use crate::marker::MarkerReading;
    use crate::spectrum::{PeakReading, Traces};

    #[test]
    fn prints_one_line_per_draw_then_quits() {
        let traces = Traces {
            peak: PeakReading { bin: 23, frequency_hz: 1000.0, magnitude: 0.5 },
            ..Traces::default()
        };
        let marker = MarkerReading { frequency_hz: 440.0, bin: 10, magnitude: 0.25 };
        let mut renderer = HeadlessRenderer::new(Vec::new(), 2);

        let waiting = View { mode: DisplayMode::Running, traces: None, marker: None, annotation: None };
        renderer.draw(&waiting).unwrap();
        assert_eq!(renderer.poll_event(Duration::ZERO).unwrap(), None);

        let frozen = View { mode: DisplayMode::Frozen, traces: Some(&traces), marker: Some(marker), annotation: Some(marker) };
        renderer.draw(&frozen).unwrap();
        assert_eq!(renderer.poll_event(Duration::ZERO).unwrap(), Some(InputEvent::Quit));

        let text = String::from_utf8(renderer.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "   1 [RUNNING] waiting for audio");
        assert_eq!(lines[1], "   2 [FROZEN] Peak: 1000.00Hz, 0.5000V | Marker: 440.00Hz, 0.25V");
    }
}
