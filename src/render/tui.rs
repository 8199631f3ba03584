//! Full-screen terminal renderer
//!
//! Oscilloscope on top, spectrum below, status line at the bottom. Both
//! traces are drawn with braille dots. Mouse motion over the spectrum is
//! reported as a pointer move in Hz; everything else on screen is ignored.

use super::plot::{Axis, BrailleCanvas, Panel, Rect};
use super::readout::{axis_label, marker_label, peak_label};
use super::{InputEvent, RenderAdapter, View};
use crate::config::DisplayConfig;
use crate::display::DisplayMode;
use crate::help::{render_help_overlay, HELP};
use crate::spectrum::Traces;
use crate::terminal::Terminal;
use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind};
use crossterm::style::Color;
use std::io;
use std::time::{Duration, Instant};

/// Columns reserved left of the plots for level labels
const LABEL_WIDTH: u16 = 6;
const MIN_WIDTH: u16 = 40;
const MIN_HEIGHT: u16 = 12;
/// Rows taken by titles, axis labels and the status line
const CHROME_ROWS: u16 = 5;

const SCOPE_COLOR: Color = Color::Cyan;
const SPECTRUM_COLOR: Color = Color::Green;
const PEAK_COLOR: Color = Color::Yellow;
const MARKER_COLOR: Color = Color::Magenta;
const TEXT_COLOR: Color = Color::Grey;
const FROZEN_COLOR: Color = Color::Red;

/// Screen areas for one terminal size
#[derive(Debug, Clone, Copy, PartialEq)]
struct Layout {
    scope: Rect,
    spectrum: Rect,
    status_row: u16,
}

impl Layout {
    fn new(width: u16, height: u16) -> Option<Self> {
        if width < MIN_WIDTH || height < MIN_HEIGHT {
            return None;
        }
        let plot_width = width - LABEL_WIDTH - 1;
        let available = height - CHROME_ROWS;
        let scope_height = available / 2;
        let spectrum_height = available - scope_height;

        let scope = Rect { x: LABEL_WIDTH, y: 1, width: plot_width, height: scope_height };
        let spectrum = Rect {
            x: LABEL_WIDTH,
            y: scope.y + scope_height + 2,
            width: plot_width,
            height: spectrum_height,
        };
        Some(Self { scope, spectrum, status_row: height - 1 })
    }
}

pub struct TerminalRenderer {
    term: Terminal,
    config: DisplayConfig,
    layout: Option<Layout>,
    show_help: bool,
}

impl TerminalRenderer {
    pub fn new(config: DisplayConfig) -> io::Result<Self> {
        let term = Terminal::new(true)?;
        term.clear_screen()?;
        let (width, height) = term.size();
        Ok(Self {
            term,
            config,
            layout: Layout::new(width, height),
            show_help: false,
        })
    }

    fn spectrum_panel(&self, rect: Rect) -> Panel {
        Panel::new(
            rect,
            Axis::new(self.config.freq_min_hz, self.config.freq_max_hz),
            Axis::new(0.0, self.config.spectrum_level_max),
        )
    }

    fn scope_panel(&self, rect: Rect, traces: Option<&Traces>) -> Panel {
        let t_max = traces
            .and_then(|t| t.time.points.last())
            .map(|&(t, _)| t)
            .filter(|&t| t > 0.0)
            .unwrap_or(1.0);
        Panel::new(
            rect,
            Axis::new(0.0, t_max),
            Axis::new(self.config.scope_level_min, self.config.scope_level_max),
        )
    }

    fn blit(&mut self, panel: &Panel, canvas: &BrailleCanvas, color: Color) {
        for (col, row, ch) in canvas.glyphs() {
            self.term.set(
                panel.rect.x as i32 + col as i32,
                panel.rect.y as i32 + row as i32,
                ch,
                Some(color),
                false,
            );
        }
    }

    fn draw_level_labels(&mut self, panel: &Panel) {
        let top = axis_label(panel.y_axis.max);
        let bottom = axis_label(panel.y_axis.min);
        let bottom_row = (panel.rect.y + panel.rect.height - 1) as i32;
        self.term.set_str(0, panel.rect.y as i32, &top, Some(TEXT_COLOR), false);
        self.term.set_str(0, bottom_row, &bottom, Some(TEXT_COLOR), false);
    }

    fn draw_scope(&mut self, rect: Rect, view: &View) {
        let panel = self.scope_panel(rect, view.traces);
        self.term.set_str(rect.x as i32, 0, "Oscilloscope", Some(Color::White), true);
        self.draw_level_labels(&panel);

        if let Some(traces) = view.traces {
            let mut canvas = BrailleCanvas::new(rect.width, rect.height);
            canvas.plot_series(&panel, &traces.time.points);
            self.blit(&panel, &canvas, SCOPE_COLOR);
        }

        let axis_row = (rect.y + rect.height) as i32;
        let end = format!("{:.3}s", panel.x_axis.max);
        let end_x = (rect.x + rect.width) as i32 - end.chars().count() as i32;
        self.term.set_str(rect.x as i32, axis_row, "0s", Some(TEXT_COLOR), false);
        self.term.set_str(end_x, axis_row, &end, Some(TEXT_COLOR), false);
    }

    fn draw_spectrum(&mut self, rect: Rect, view: &View) {
        let panel = self.spectrum_panel(rect);
        let title_row = rect.y as i32 - 1;
        self.term.set_str(rect.x as i32, title_row, "Spectrum Analyzer", Some(Color::White), true);
        self.draw_level_labels(&panel);

        let axis_row = (rect.y + rect.height) as i32;
        let ticks = [
            panel.x_axis.min,
            (panel.x_axis.min + panel.x_axis.max) / 2.0,
            panel.x_axis.max,
        ];
        for (i, hz) in ticks.iter().enumerate() {
            let label = format!("{}Hz", axis_label(*hz));
            let len = label.chars().count() as i32;
            let x = match i {
                0 => rect.x as i32,
                1 => (rect.x + rect.width / 2) as i32 - len / 2,
                _ => (rect.x + rect.width) as i32 - len,
            };
            self.term.set_str(x, axis_row, &label, Some(TEXT_COLOR), false);
        }

        let Some(traces) = view.traces else {
            return;
        };

        let mut canvas = BrailleCanvas::new(rect.width, rect.height);
        canvas.plot_series(&panel, &traces.spectrum.points);
        self.blit(&panel, &canvas, SPECTRUM_COLOR);

        let peak = traces.peak;
        let peak_text = peak_label(&peak);
        let peak_cell = panel.cell_at(peak.frequency_hz, peak.magnitude);
        if let Some((x, y)) = peak_cell {
            self.term.set(x, y, '◆', Some(PEAK_COLOR), true);
        }

        let marker_cell = view
            .marker
            .and_then(|m| panel.cell_at(m.frequency_hz, m.magnitude));
        if let Some((x, y)) = marker_cell {
            self.term.set(x, y, '●', Some(MARKER_COLOR), true);
        }

        match view.mode {
            DisplayMode::Running => {
                // Readouts in the title row
                let mut x = rect.x as i32 + 20;
                self.term.set_str(x, title_row, &peak_text, Some(PEAK_COLOR), false);
                x += peak_text.chars().count() as i32 + 3;
                if let Some(marker) = view.marker {
                    self.term.set_str(x, title_row, &marker_label(&marker), Some(MARKER_COLOR), false);
                }
            }
            DisplayMode::Frozen => {
                // Readouts pinned next to their points
                if let Some((x, y)) = peak_cell {
                    self.term.set_str(x + 2, (y - 1).max(rect.y as i32), &peak_text, Some(PEAK_COLOR), true);
                }
                let annotation = view.annotation.or(view.marker);
                let pinned = annotation.and_then(|a| panel.cell_at(a.frequency_hz, a.magnitude).map(|c| (a, c)));
                if let Some((reading, (x, y))) = pinned {
                    self.term.set_str(x + 2, (y - 1).max(rect.y as i32), &marker_label(&reading), Some(MARKER_COLOR), true);
                }
            }
        }
    }

    fn draw_status(&mut self, row: u16, view: &View) {
        let (label, color, hint) = match view.mode {
            DisplayMode::Running => ("RUNNING", Color::Green, "any key: freeze"),
            DisplayMode::Frozen => ("FROZEN", FROZEN_COLOR, "any key: resume"),
        };
        self.term.set_str(0, row as i32, &format!("[{}]", label), Some(color), true);
        let waiting = if view.traces.is_none() { "  waiting for audio..." } else { "" };
        let text = format!(" {} | ?: help | q: quit{}", hint, waiting);
        self.term.set_str(label.len() as i32 + 2, row as i32, &text, Some(TEXT_COLOR), false);
    }

    fn translate(&mut self, event: Event) -> Option<InputEvent> {
        let panel = self.layout.map(|l| self.spectrum_panel(l.spectrum));
        match map_event(&event, panel.as_ref()) {
            Action::Input(input) => Some(input),
            Action::ToggleHelp => {
                self.show_help = !self.show_help;
                None
            }
            Action::Resize(width, height) => {
                self.term.resize(width, height);
                self.layout = Layout::new(width, height);
                None
            }
            Action::Ignore => None,
        }
    }
}

/// What a terminal event means to the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
enum Action {
    Input(InputEvent),
    ToggleHelp,
    Resize(u16, u16),
    Ignore,
}

/// Keys: q/Esc/Ctrl-C quit, `?` toggles help, any other press is the trigger.
/// Mouse motion counts only over the spectrum plot.
fn map_event(event: &Event, spectrum: Option<&Panel>) -> Action {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Input(InputEvent::Quit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Action::Input(InputEvent::Quit)
            }
            KeyCode::Char('?') => Action::ToggleHelp,
            _ => Action::Input(InputEvent::Trigger),
        },
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) | MouseEventKind::Down(_) => spectrum
                .and_then(|panel| panel.data_at(mouse.column, mouse.row))
                .map(|(x, y)| Action::Input(InputEvent::PointerMove { x, y }))
                .unwrap_or(Action::Ignore),
            _ => Action::Ignore,
        },
        Event::Resize(width, height) => Action::Resize(*width, *height),
        _ => Action::Ignore,
    }
}

impl RenderAdapter for TerminalRenderer {
    fn draw(&mut self, view: &View) -> io::Result<()> {
        if let Ok((width, height)) = crossterm::terminal::size() {
            if (width, height) != self.term.size() {
                self.term.resize(width, height);
                self.term.clear_screen()?;
            }
        }

        self.term.clear();
        let (width, height) = self.term.size();
        let layout = Layout::new(width, height);
        self.layout = layout;

        match layout {
            Some(layout) => {
                self.draw_scope(layout.scope, view);
                self.draw_spectrum(layout.spectrum, view);
                self.draw_status(layout.status_row, view);
            }
            None => {
                let msg = format!("Terminal too small (need {}x{})", MIN_WIDTH, MIN_HEIGHT);
                self.term.set_str(0, 0, &msg, Some(TEXT_COLOR), false);
            }
        }

        if self.show_help {
            render_help_overlay(&mut self.term, HELP);
        }
        self.term.present()
    }

    fn poll_event(&mut self, timeout: Duration) -> io::Result<Option<InputEvent>> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let Some(event) = self.term.poll_event(remaining)? else {
                return Ok(None);
            };
            if let Some(input) = self.translate(event) {
                return Ok(Some(input));
            }
            if remaining.is_zero() {
                return Ok(None);
            }
        }
    }
}
