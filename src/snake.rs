//! Snake mode: a short comet of the solid color running along the strip.

use crate::driver::PixelDriver;
use crate::render::{apply_brightness, write_active_pixels};
use crate::scheduler::IntervalTimer;
use crate::state::StripState;
use crate::{Color, StripConfig};
use std::time::Instant;

/// Animation cursor for the snake.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SnakeEffectState {
    /// Index of the brightest pixel; wraps at the active pixel count.
    pub head: u16,
    timer: IntervalTimer,
    segment_length: u16,
}

impl SnakeEffectState {
    pub fn new(config: &StripConfig) -> Self {
        Self {
            head: 0,
            timer: IntervalTimer::new(config.snake_step),
            segment_length: config.snake_segment_length.max(1),
        }
    }

    /// Rewind to the start; the next tick steps immediately.
    pub fn reset(&mut self) {
        self.head = 0;
        self.timer.reset();
    }

    /// Rewind and blank the strip. Used when the snake is (re)entered or
    /// anything it draws with has changed.
    pub fn restart<D: PixelDriver + ?Sized>(&mut self, driver: &mut D, state: &StripState) {
        tracing::debug!(count = state.pixel_count(), "snake restarted");
        self.reset();
        write_active_pixels(driver, state, Color::BLACK);
        driver.show();
    }

    /// Draw one step if the step interval has passed. Returns whether a
    /// frame was drawn.
    pub fn tick<D: PixelDriver + ?Sized>(
        &mut self,
        now: Instant,
        state: &StripState,
        driver: &mut D,
    ) -> bool {
        if !self.timer.poll(now) {
            return false;
        }

        let count = state.pixel_count();
        let base = apply_brightness(state, state.solid_color());

        write_active_pixels(driver, state, Color::BLACK);
        for offset in 0..self.segment_length {
            let pixel = u32::from(self.head) + u32::from(offset);
            if pixel >= u32::from(count) {
                break;
            }
            driver.set_pixel(pixel as u16, base.scale(self.falloff(offset)));
        }
        driver.show();

        self.head = (self.head + 1) % count;
        true
    }

    /// Intensity of the pixel `offset` places behind the head.
    pub fn falloff(&self, offset: u16) -> f32 {
        1.0 - f32::from(offset) / f32::from(self.segment_length)
    }
}
