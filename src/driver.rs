//! Pixel output: the boundary between the engine and the strip hardware.
//!
//! The engine only ever talks to a `PixelDriver`. On a microcontroller this
//! would wrap a WS2812 peripheral; on a host, `MemoryStrip` keeps the pixel
//! buffer and the last latched frame in memory so the effects can be
//! observed and tested.

use crate::Color;

/// Buffered access to an addressable strip.
///
/// Writes go to an in-memory buffer and only become visible on `show`.
pub trait PixelDriver {
    /// Number of pixels in the buffer.
    fn len(&self) -> u16;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Set one pixel in the buffer. Out-of-range indices are ignored.
    fn set_pixel(&mut self, index: u16, color: Color);

    /// Read one pixel back from the buffer. Out-of-range indices read black.
    fn get_pixel(&self, index: u16) -> Color;

    /// Latch the buffer to the physical output.
    fn show(&mut self);
}

/// Type-erased driver, as held by the server.
pub type BoxedDriver = Box<dyn PixelDriver + Send>;

impl<T: PixelDriver + ?Sized> PixelDriver for Box<T> {
    fn len(&self) -> u16 {
        (**self).len()
    }

    fn set_pixel(&mut self, index: u16, color: Color) {
        (**self).set_pixel(index, color);
    }

    fn get_pixel(&self, index: u16) -> Color {
        (**self).get_pixel(index)
    }

    fn show(&mut self) {
        (**self).show();
    }
}

// ── MemoryStrip ──────────────────────────────────────────────────────

/// Simulated strip: a write buffer plus the frame that was last latched.
#[derive(Clone, Debug)]
pub struct MemoryStrip {
    buffer: Vec<Color>,
    latched: Vec<Color>,
    latch_count: u64,
}

impl MemoryStrip {
    /// A strip of `len` pixels, all black.
    pub fn new(len: u16) -> Self {
        Self {
            buffer: vec![Color::BLACK; usize::from(len)],
            latched: vec![Color::BLACK; usize::from(len)],
            latch_count: 0,
        }
    }

    /// The frame currently visible on the strip.
    pub fn latched(&self) -> &[Color] {
        &self.latched
    }

    /// How many times the buffer has been latched.
    pub fn latch_count(&self) -> u64 {
        self.latch_count
    }
}

impl PixelDriver for MemoryStrip {
    fn len(&self) -> u16 {
        // The constructor takes a u16 length, so this never truncates.
        self.buffer.len() as u16
    }

    fn set_pixel(&mut self, index: u16, color: Color) {
        if let Some(pixel) = self.buffer.get_mut(usize::from(index)) {
            *pixel = color;
        }
    }

    fn get_pixel(&self, index: u16) -> Color {
        self.buffer
            .get(usize::from(index))
            .copied()
            .unwrap_or(Color::BLACK)
    }

    fn show(&mut self) {
        self.latched.copy_from_slice(&self.buffer);
        self.latch_count += 1;
        tracing::trace!(latches = self.latch_count, "strip latched");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn new_strip_is_dark_and_unlatched() {
        let strip = MemoryStrip::new(8);
        assert_eq!(strip.len(), 8);
        assert!(!strip.is_empty());
        assert!(strip.latched().iter().all(|c| *c == Color::BLACK));
        assert_eq!(strip.latch_count(), 0);
    }

    #[test]
    fn writes_are_invisible_until_shown() {
        let mut strip = MemoryStrip::new(4);
        strip.set_pixel(2, Color::new(1, 2, 3));

        assert_eq!(strip.get_pixel(2), Color::new(1, 2, 3));
        assert_eq!(strip.latched()[2], Color::BLACK);

        strip.show();
        assert_eq!(strip.latched()[2], Color::new(1, 2, 3));
        assert_eq!(strip.latch_count(), 1);
    }

    #[test]
    fn out_of_range_access_is_harmless() {
        let mut strip = MemoryStrip::new(2);
        strip.set_pixel(5, Color::new(9, 9, 9));
        assert_eq!(strip.get_pixel(5), Color::BLACK);
        assert_eq!(strip.get_pixel(0), Color::BLACK);
    }

    #[test]
    fn boxed_driver_forwards_calls() {
        let mut strip: BoxedDriver = Box::new(MemoryStrip::new(3));
        strip.set_pixel(1, Color::new(4, 5, 6));
        strip.show();
        assert_eq!(strip.len(), 3);
        assert_eq!(strip.get_pixel(1), Color::new(4, 5, 6));
    }
}
