//! Braille plotting and data-to-screen coordinate mapping
//!
//! Each terminal cell holds a 2x4 grid of braille dots, so a panel of
//! `w x h` cells has `2w x 4h` dots of resolution.

// Braille constants (2x4 dot grid per character)
const BRAILLE_BASE: u32 = 0x2800;
const DOTS_X: usize = 2;
const DOTS_Y: usize = 4;

// Bit for dot [row][col]:
// 0 3
// 1 4
// 2 5
// 6 7
const DOT_BITS: [[u8; DOTS_X]; DOTS_Y] = [[0x01, 0x08], [0x02, 0x10], [0x04, 0x20], [0x40, 0x80]];

/// Cell rectangle on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub fn contains(&self, col: u16, row: u16) -> bool {
        col >= self.x && col < self.x + self.width && row >= self.y && row < self.y + self.height
    }
}

/// Visible data range along one axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axis {
    pub min: f32,
    pub max: f32,
}

impl Axis {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    fn span(&self) -> f32 {
        self.max - self.min
    }

    fn contains(&self, v: f32) -> bool {
        v >= self.min && v <= self.max
    }
}

/// A plot area with its data ranges
#[derive(Debug, Clone, Copy)]
pub struct Panel {
    pub rect: Rect,
    pub x_axis: Axis,
    pub y_axis: Axis,
}

impl Panel {
    pub fn new(rect: Rect, x_axis: Axis, y_axis: Axis) -> Self {
        Self { rect, x_axis, y_axis }
    }

    /// Data coordinates under a terminal cell, `None` outside the panel
    pub fn data_at(&self, col: u16, row: u16) -> Option<(f32, f32)> {
        if !self.rect.contains(col, row) {
            return None;
        }
        let fx = ((col - self.rect.x) as f32 + 0.5) / self.rect.width as f32;
        let fy = ((row - self.rect.y) as f32 + 0.5) / self.rect.height as f32;
        Some((
            self.x_axis.min + fx * self.x_axis.span(),
            self.y_axis.max - fy * self.y_axis.span(),
        ))
    }

    /// Screen cell for a data point. `None` when x is off the axis; y clamps to the panel edge.
    pub fn cell_at(&self, x: f32, y: f32) -> Option<(i32, i32)> {
        let (dx, dy) = self.dot_at(x, y)?;
        Some((self.rect.x as i32 + dx / DOTS_X as i32, self.rect.y as i32 + dy / DOTS_Y as i32))
    }

    fn dot_at(&self, x: f32, y: f32) -> Option<(i32, i32)> {
        if !self.x_axis.contains(x) || !y.is_finite() {
            return None;
        }
        let w = (self.rect.width as usize * DOTS_X) as f32;
        let h = (self.rect.height as usize * DOTS_Y) as f32;
        let fx = (x - self.x_axis.min) / self.x_axis.span();
        let fy = ((self.y_axis.max - y) / self.y_axis.span()).clamp(0.0, 1.0);
        let dx = ((fx * w) as i32).min(w as i32 - 1);
        let dy = ((fy * h) as i32).min(h as i32 - 1);
        Some((dx, dy))
    }
}

/// Dot buffer covering one panel
pub struct BrailleCanvas {
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

impl BrailleCanvas {
    pub fn new(width_cells: u16, height_cells: u16) -> Self {
        let width = width_cells as usize;
        let height = height_cells as usize;
        Self { width, height, cells: vec![0; width * height] }
    }

    pub fn set_dot(&mut self, dx: i32, dy: i32) {
        if dx < 0 || dy < 0 {
            return;
        }
        let (col, row) = (dx as usize / DOTS_X, dy as usize / DOTS_Y);
        if col >= self.width || row >= self.height {
            return;
        }
        self.cells[row * self.width + col] |= DOT_BITS[dy as usize % DOTS_Y][dx as usize % DOTS_X];
    }

    /// Bresenham line between two dots
    pub fn line(&mut self, (x0, y0): (i32, i32), (x1, y1): (i32, i32)) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let (mut x, mut y) = (x0, y0);
        let mut err = dx + dy;
        loop {
            self.set_dot(x, y);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Connect consecutive points; a point off the x axis breaks the line
    pub fn plot_series(&mut self, panel: &Panel, points: &[(f32, f32)]) {
        let mut prev: Option<(i32, i32)> = None;
        for &(x, y) in points {
            let dot = panel.dot_at(x, y);
            match (prev, dot) {
                (Some(a), Some(b)) => self.line(a, b),
                (None, Some(b)) => self.set_dot(b.0, b.1),
                _ => {}
            }
            prev = dot;
        }
    }

    /// Non-empty cells as (col, row, glyph) relative to the panel origin
    pub fn glyphs(&self) -> impl Iterator<Item = (usize, usize, char)> + '_ {
        self.cells.iter().enumerate().filter(|(_, bits)| **bits != 0).map(move |(i, &bits)| {
            (i % self.width, i / self.width, char::from_u32(BRAILLE_BASE + bits as u32).unwrap_or(' '))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel() -> Panel {
        Panel::new(
            Rect { x: 10, y: 5, width: 20, height: 10 },
            Axis::new(0.0, 1000.0),
            Axis::new(0.0, 1.0),
        )
    }

    #[test]
    fn pointer_outside_panel_maps_to_nothing() {
        let p = panel();
        assert!(p.data_at(9, 6).is_none());
        assert!(p.data_at(30, 6).is_none());
        assert!(p.data_at(12, 15).is_none());
    }

    #[test]
    fn pointer_maps_to_cell_centre() {
        let p = panel();
        let (x, y) = p.data_at(10, 5).unwrap();
        assert!((x - 25.0).abs() < 1e-3);
        assert!((y - 0.95).abs() < 1e-4);
        let (x, _) = p.data_at(29, 14).unwrap();
        assert!((x - 975.0).abs() < 1e-3);
    }

    #[test]
    fn points_map_back_into_their_cell() {
        let p = panel();
        let (x, y) = p.data_at(17, 9).unwrap();
        assert_eq!(p.cell_at(x, y), Some((17, 9)));
        assert_eq!(p.cell_at(2000.0, 0.5), None);
        // y clamps to the panel edges
        assert_eq!(p.cell_at(0.0, 5.0), Some((10, 5)));
        assert_eq!(p.cell_at(1000.0, -1.0), Some((29, 14)));
    }

    #[test]
    fn single_dot_glyph() {
        let mut canvas = BrailleCanvas::new(2, 1);
        canvas.set_dot(3, 3);
        let glyphs: Vec<_> = canvas.glyphs().collect();
        assert_eq!(glyphs, vec![(1, 0, '\u{2880}')]);
    }

    #[test]
    fn horizontal_line_fills_top_row() {
        let mut canvas = BrailleCanvas::new(2, 1);
        canvas.line((0, 0), (3, 0));
        let glyphs: Vec<_> = canvas.glyphs().collect();
        assert_eq!(glyphs, vec![(0, 0, '\u{2809}'), (1, 0, '\u{2809}')]);
    }

    #[test]
    fn dots_off_canvas_are_ignored() {
        let mut canvas = BrailleCanvas::new(1, 1);
        canvas.set_dot(-1, 0);
        canvas.set_dot(2, 0);
        canvas.set_dot(0, 4);
        assert_eq!(canvas.glyphs().count(), 0);
    }

    #[test]
    fn series_breaks_outside_axis() {
        let p = Panel::new(Rect { x: 0, y: 0, width: 4, height: 1 }, Axis::new(0.0, 4.0), Axis::new(0.0, 1.0));
        let mut canvas = BrailleCanvas::new(4, 1);
        canvas.plot_series(&p, &[(0.0, 1.0), (9.0, 1.0), (3.9, 1.0)]);
        // only two isolated dots, no line across the gap
        let glyphs: Vec<_> = canvas.glyphs().collect();
        assert_eq!(glyphs.len(), 2);
    }
}
