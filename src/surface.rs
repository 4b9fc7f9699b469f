use crate::state::Direction;
use std::ops::{Deref, DerefMut};

/// An 8-bit RGBA color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Rgba { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Rgba::new(r, g, b, 255)
    }

    pub fn as_rgba8(self) -> (u8, u8, u8, u8) {
        (self.r, self.g, self.b, self.a)
    }
}

/// `#ccc`
pub const GUIDE_COLOR: Rgba = Rgba::rgb(0xcc, 0xcc, 0xcc);
/// `#008`
pub const ARC_COLOR: Rgba = Rgba::rgb(0x00, 0x00, 0x88);
/// `#333`
pub const LABEL_COLOR: Rgba = Rgba::rgb(0x33, 0x33, 0x33);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
}

/// Stroke style for a single draw call
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pen {
    pub color: Rgba,
    pub width: f64,
    /// Alternating on and off lengths; `None` strokes solid.
    pub dash: Option<&'static [f64]>,
    pub cap: LineCap,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Font {
    pub size: f64,
    pub bold: bool,
}

/// A 2D drawing context in the manner of the canvas API.
///
/// Transforms compose onto the current matrix and are saved and restored as
/// a stack. Coordinates are y-down, so positive angles turn clockwise.
pub trait Surface {
    /// Width and height in logical units.
    fn size(&self) -> (f64, f64);
    fn save(&mut self);
    /// Pops the most recent `save`; does nothing when the stack is empty.
    fn restore(&mut self);
    /// Clears the whole surface, ignoring the current transform.
    fn clear(&mut self);
    fn translate(&mut self, dx: f64, dy: f64);
    fn scale(&mut self, factor: f64);
    fn rotate(&mut self, angle: f64);
    /// Strokes an arc of `radius` around the local origin.
    fn stroke_arc(&mut self, radius: f64, start: f64, end: f64, direction: Direction, pen: &Pen);
    /// Fills `text` with its alphabetic baseline starting at `(x, y)`.
    fn fill_text(&mut self, text: &str, x: f64, y: f64, font: &Font, color: Rgba);
}

/// Saves the surface on creation and restores it when dropped.
pub struct Scoped<'a, S: Surface + ?Sized> {
    surface: &'a mut S,
}

impl<'a, S: Surface + ?Sized> Scoped<'a, S> {
    pub fn new(surface: &'a mut S) -> Self {
        surface.save();
        Scoped { surface }
    }
}

impl<S: Surface + ?Sized> Deref for Scoped<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        &*self.surface
    }
}

impl<S: Surface + ?Sized> DerefMut for Scoped<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut *self.surface
    }
}

impl<S: Surface + ?Sized> Drop for Scoped<'_, S> {
    fn drop(&mut self) {
        self.surface.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        depth: usize,
        saves: usize,
    }

    impl Surface for Counter {
        fn size(&self) -> (f64, f64) {
            (1.0, 1.0)
        }
        fn save(&mut self) {
            self.depth += 1;
            self.saves += 1;
        }
        fn restore(&mut self) {
            self.depth = self.depth.saturating_sub(1);
        }
        fn clear(&mut self) {}
        fn translate(&mut self, _: f64, _: f64) {}
        fn scale(&mut self, _: f64) {}
        fn rotate(&mut self, _: f64) {}
        fn stroke_arc(&mut self, _: f64, _: f64, _: f64, _: Direction, _: &Pen) {}
        fn fill_text(&mut self, _: &str, _: f64, _: f64, _: &Font, _: Rgba) {}
    }

    fn scoped_early_return(surface: &mut Counter, bail: bool) -> Option<()> {
        let mut scoped = Scoped::new(surface);
        scoped.rotate(1.0);
        if bail {
            return None;
        }
        scoped.scale(2.0);
        Some(())
    }

    #[test]
    fn scoped_restores_on_every_exit() {
        let mut surface = Counter::default();
        assert!(scoped_early_return(&mut surface, true).is_none());
        assert!(scoped_early_return(&mut surface, false).is_some());
        assert_eq!(surface.depth, 0);
        assert_eq!(surface.saves, 2);
    }

    #[test]
    fn palette_matches_css_shorthand() {
        assert_eq!(GUIDE_COLOR.as_rgba8(), (204, 204, 204, 255));
        assert_eq!(ARC_COLOR.as_rgba8(), (0, 0, 136, 255));
        assert_eq!(LABEL_COLOR.as_rgba8(), (51, 51, 51, 255));
    }
}
