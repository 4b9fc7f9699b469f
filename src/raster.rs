use crate::arc::{sweep_angle, TAU};
use crate::state::Direction;
use crate::surface::{Font, LineCap, Pen, Rgba, Surface};
use log::debug;

type Matrix = [[f64; 3]; 3];

/// Glyph cells per character, columns by rows.
const GLYPH_COLUMNS: usize = 5;
const GLYPH_ROWS: usize = 7;

/// A software [`Surface`] backed by an RGBA8 pixel buffer.
///
/// Coverage is tested per pixel centre without antialiasing, so identical
/// draw calls always produce identical buffers.
pub struct PixelSurface {
    width: usize,
    height: usize,
    logical_size: (f64, f64),
    pixel_data: Vec<u8>,
    transform: Matrix,
    stack: Vec<Matrix>,
}

impl PixelSurface {
    pub fn new(width: usize, height: usize) -> Self {
        PixelSurface::with_logical_size(width, height, width as f64, height as f64)
    }

    /// A `width` x `height` buffer that draws as if it were `logical_width` x
    /// `logical_height` units.
    pub fn with_logical_size(
        width: usize,
        height: usize,
        logical_width: f64,
        logical_height: f64,
    ) -> Self {
        let base = [
            [width as f64 / logical_width, 0.0, 0.0],
            [0.0, height as f64 / logical_height, 0.0],
            [0.0, 0.0, 1.0],
        ];
        PixelSurface {
            width,
            height,
            logical_size: (logical_width, logical_height),
            pixel_data: vec![0u8; width * height * 4],
            transform: base,
            stack: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw RGBA bytes, row-major.
    pub fn pixel_data(&self) -> &[u8] {
        &self.pixel_data
    }

    pub fn pixel(&self, x: usize, y: usize) -> Rgba {
        let offset = (y * self.width + x) * 4;
        let p = &self.pixel_data[offset..offset + 4];
        Rgba::new(p[0], p[1], p[2], p[3])
    }

    /// Number of saved transforms not yet restored.
    pub fn save_depth(&self) -> usize {
        self.stack.len()
    }

    fn concat(&mut self, m: Matrix) {
        self.transform = multiply_matrices(&self.transform, &m);
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: Rgba) {
        let offset = (y * self.width + x) * 4;
        let (r, g, b, a) = color.as_rgba8();
        self.pixel_data[offset] = r;
        self.pixel_data[offset + 1] = g;
        self.pixel_data[offset + 2] = b;
        self.pixel_data[offset + 3] = a;
    }

    /// Paints every pixel whose centre, mapped back into local space, lies in
    /// `covered`. Only the device bounding box of the local rectangle
    /// `[x0, x1] x [y0, y1]` is visited.
    fn fill_local<F>(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, color: Rgba, covered: F)
    where
        F: Fn(f64, f64) -> bool,
    {
        let Some(inverse) = invert(&self.transform) else {
            debug!("degenerate transform, nothing drawn");
            return;
        };

        let corners = [[x0, y0], [x1, y0], [x1, y1], [x0, y1]]
            .map(|[x, y]| multiply_matrix_vector(&self.transform, &[x, y, 1.0]));
        let min_x = corners.iter().map(|c| c[0]).fold(f64::INFINITY, f64::min);
        let max_x = corners.iter().map(|c| c[0]).fold(f64::NEG_INFINITY, f64::max);
        let min_y = corners.iter().map(|c| c[1]).fold(f64::INFINITY, f64::min);
        let max_y = corners.iter().map(|c| c[1]).fold(f64::NEG_INFINITY, f64::max);

        if max_x < 0.0 || max_y < 0.0 || self.width == 0 || self.height == 0 {
            return;
        }
        let min_x = min_x.floor().max(0.0) as usize;
        let max_x = max_x.ceil().min(self.width as f64 - 1.0) as usize;
        let min_y = min_y.floor().max(0.0) as usize;
        let max_y = max_y.ceil().min(self.height as f64 - 1.0) as usize;

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let local =
                    multiply_matrix_vector(&inverse, &[x as f64 + 0.5, y as f64 + 0.5, 1.0]);
                if covered(local[0], local[1]) {
                    self.set_pixel(x, y, color);
                }
            }
        }
    }
}

impl Surface for PixelSurface {
    fn size(&self) -> (f64, f64) {
        self.logical_size
    }

    fn save(&mut self) {
        self.stack.push(self.transform);
    }

    fn restore(&mut self) {
        match self.stack.pop() {
            Some(transform) => self.transform = transform,
            None => debug!("restore without matching save ignored"),
        }
    }

    fn clear(&mut self) {
        self.pixel_data.fill(0);
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.concat([[1.0, 0.0, dx], [0.0, 1.0, dy], [0.0, 0.0, 1.0]]);
    }

    fn scale(&mut self, factor: f64) {
        self.concat([[factor, 0.0, 0.0], [0.0, factor, 0.0], [0.0, 0.0, 1.0]]);
    }

    fn rotate(&mut self, angle: f64) {
        let (sin_a, cos_a) = angle.sin_cos();
        self.concat([[cos_a, -sin_a, 0.0], [sin_a, cos_a, 0.0], [0.0, 0.0, 1.0]]);
    }

    fn stroke_arc(&mut self, radius: f64, start: f64, end: f64, direction: Direction, pen: &Pen) {
        let sweep = sweep_angle(start, end, direction);
        let half = pen.width / 2.0;
        let extent = radius + half;
        let (sin_s, cos_s) = start.sin_cos();
        let (sin_e, cos_e) = (start + sweep).sin_cos();
        let caps = [
            [radius * cos_s, radius * sin_s],
            [radius * cos_e, radius * sin_e],
        ];
        let pen = *pen;

        self.fill_local(-extent, -extent, extent, extent, pen.color, |x, y| {
            if pen.cap == LineCap::Round
                && caps
                    .iter()
                    .any(|c| (x - c[0]).hypot(y - c[1]) <= half)
            {
                return true;
            }
            if (x.hypot(y) - radius).abs() > half {
                return false;
            }
            // Angle travelled from the start along the sweep direction.
            let theta = y.atan2(x);
            let travelled = if sweep >= 0.0 {
                (theta - start).rem_euclid(TAU)
            } else {
                (start - theta).rem_euclid(TAU)
            };
            if travelled > sweep.abs() {
                return false;
            }
            match pen.dash {
                Some(pattern) => dash_is_on(pattern, travelled * radius),
                None => true,
            }
        });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, font: &Font, color: Rgba) {
        // The built-in face is bold at every weight.
        let cell = font.size / 9.0;
        let top = y - GLYPH_ROWS as f64 * cell;
        let mut left = x;

        for ch in text.chars() {
            if let Some(rows) = glyph(ch) {
                let right = left + GLYPH_COLUMNS as f64 * cell;
                let origin = left;
                self.fill_local(origin, top, right, y, color, |lx, ly| {
                    let column = ((lx - origin) / cell).floor();
                    let row = ((ly - top) / cell).floor();
                    if column < 0.0 || row < 0.0 {
                        return false;
                    }
                    let (column, row) = (column as usize, row as usize);
                    column < GLYPH_COLUMNS
                        && row < GLYPH_ROWS
                        && (rows[row] >> (GLYPH_COLUMNS - 1 - column)) & 1 == 1
                });
            } else {
                debug!("no glyph for {:?}", ch);
            }
            left += (GLYPH_COLUMNS + 1) as f64 * cell;
        }
    }
}

/// Whether `distance` along a path falls on an "on" segment of `pattern`.
fn dash_is_on(pattern: &[f64], distance: f64) -> bool {
    let period: f64 = pattern.iter().sum();
    if period <= 0.0 {
        return true;
    }
    let mut phase = distance % period;
    for (i, &length) in pattern.iter().enumerate() {
        if phase < length {
            return i % 2 == 0;
        }
        phase -= length;
    }
    true
}

/// Bitmap rows for the label glyphs, most significant bit on the left.
fn glyph(ch: char) -> Option<[u8; GLYPH_ROWS]> {
    match ch {
        'S' => Some([
            0b01110, 0b10001, 0b10000, 0b01110, 0b00001, 0b10001, 0b01110,
        ]),
        'E' => Some([
            0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111,
        ]),
        _ => None,
    }
}

/// Multiplies a 3x3 matrix by a 3-dimensional vector
fn multiply_matrix_vector(matrix: &Matrix, vector: &[f64; 3]) -> [f64; 3] {
    let mut result = [0.0; 3];
    for i in 0..3 {
        for j in 0..3 {
            result[i] += matrix[i][j] * vector[j];
        }
    }
    result
}

/// Multiplies two 3x3 matrices
fn multiply_matrices(a: &Matrix, b: &Matrix) -> Matrix {
    let mut result = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            for k in 0..3 {
                result[i][j] += a[i][k] * b[k][j];
            }
        }
    }
    result
}

/// Inverts an affine matrix (last row `0 0 1`).
fn invert(m: &Matrix) -> Option<Matrix> {
    let det = m[0][0] * m[1][1] - m[0][1] * m[1][0];
    if det.abs() < f64::EPSILON {
        return None;
    }
    let a = m[1][1] / det;
    let b = -m[0][1] / det;
    let c = -m[1][0] / det;
    let d = m[0][0] / det;
    Some([
        [a, b, -(a * m[0][2] + b * m[1][2])],
        [c, d, -(c * m[0][2] + d * m[1][2])],
        [0.0, 0.0, 1.0],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::redraw;
    use crate::state::AngleState;
    use crate::surface::{ARC_COLOR, LABEL_COLOR};

    const IDENTITY: Matrix = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

    fn point_on_circle(surface: &PixelSurface, angle: f64) -> (usize, usize) {
        let (w, h) = (surface.width() as f64, surface.height() as f64);
        let radius = w.min(h) * 0.5 * 0.95;
        let x = w / 2.0 + radius * angle.cos();
        let y = h / 2.0 + radius * angle.sin();
        (x as usize, y as usize)
    }

    fn count(surface: &PixelSurface, color: Rgba) -> usize {
        surface
            .pixel_data()
            .chunks_exact(4)
            .filter(|p| (p[0], p[1], p[2], p[3]) == color.as_rgba8())
            .count()
    }

    #[test]
    fn inverse_undoes_transform() {
        let mut surface = PixelSurface::new(10, 10);
        surface.translate(3.0, 4.0);
        surface.rotate(0.7);
        surface.scale(2.5);
        let inverse = invert(&surface.transform).unwrap();
        let product = multiply_matrices(&surface.transform, &inverse);
        for i in 0..3 {
            for j in 0..3 {
                assert!((product[i][j] - IDENTITY[i][j]).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn dash_phases() {
        let pattern = [15.0, 10.0];
        assert!(dash_is_on(&pattern, 0.0));
        assert!(dash_is_on(&pattern, 14.9));
        assert!(!dash_is_on(&pattern, 15.0));
        assert!(!dash_is_on(&pattern, 24.9));
        assert!(dash_is_on(&pattern, 25.0));
        assert!(dash_is_on(&[], 3.0));
    }

    #[test]
    fn restore_without_save_is_ignored() {
        let mut surface = PixelSurface::new(4, 4);
        surface.translate(1.0, 1.0);
        surface.restore();
        assert_eq!(surface.transform[0][2], 1.0);
        assert_eq!(surface.save_depth(), 0);
    }

    #[test]
    fn clear_makes_everything_transparent() {
        let mut surface = PixelSurface::new(50, 50);
        redraw(Some(&mut surface), &AngleState::default());
        assert!(surface.pixel_data().iter().any(|&b| b != 0));
        surface.clear();
        assert!(surface.pixel_data().iter().all(|&b| b == 0));
    }

    #[test]
    fn arc_covers_its_sweep() {
        let mut surface = PixelSurface::new(500, 500);
        redraw(Some(&mut surface), &AngleState::default());

        let (x, y) = point_on_circle(&surface, 0.4);
        assert_eq!(surface.pixel(x, y), ARC_COLOR);
        let (x, y) = point_on_circle(&surface, std::f64::consts::PI);
        assert_ne!(surface.pixel(x, y), ARC_COLOR);
        assert_eq!(surface.save_depth(), 0);
    }

    #[test]
    fn reverse_arc_takes_the_long_way() {
        let mut surface = PixelSurface::new(500, 500);
        let state = AngleState::new(0.0, 0.79, Direction::Reverse);
        redraw(Some(&mut surface), &state);

        let (x, y) = point_on_circle(&surface, std::f64::consts::PI);
        assert_eq!(surface.pixel(x, y), ARC_COLOR);
        let (x, y) = point_on_circle(&surface, 0.4);
        assert_ne!(surface.pixel(x, y), ARC_COLOR);
    }

    #[test]
    fn labels_follow_the_threshold() {
        let mut surface = PixelSurface::new(500, 500);
        redraw(Some(&mut surface), &AngleState::default());
        assert!(count(&surface, LABEL_COLOR) > 0);

        let full = AngleState::new(0.0, TAU, Direction::Unspecified);
        redraw(Some(&mut surface), &full);
        assert_eq!(count(&surface, LABEL_COLOR), 0);
    }

    #[test]
    fn unknown_glyphs_are_skipped() {
        let mut surface = PixelSurface::new(40, 40);
        let font = Font {
            size: 18.0,
            bold: true,
        };
        surface.fill_text("?", 5.0, 30.0, &font, LABEL_COLOR);
        assert_eq!(count(&surface, LABEL_COLOR), 0);
        surface.fill_text("E", 5.0, 30.0, &font, LABEL_COLOR);
        assert!(count(&surface, LABEL_COLOR) > 0);
    }

    #[test]
    fn logical_size_scales_the_drawing() {
        let mut surface = PixelSurface::with_logical_size(100, 100, 500.0, 500.0);
        assert_eq!(surface.size(), (500.0, 500.0));
        redraw(Some(&mut surface), &AngleState::default());

        let (x, y) = point_on_circle(&surface, 0.4);
        assert_eq!(surface.pixel(x, y), ARC_COLOR);
    }
}
