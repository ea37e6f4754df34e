//! Render driver: turns strip state into pixel values, plus the render thread.
//!
//! The pixel buffer is always written whole: active pixels get the effect's
//! color, everything from the active count up to the buffer limit is forced
//! black, so shrinking the count never leaves stale pixels lit.
//!
//! ## Rust concepts
//! - Generic functions over a trait (`D: PixelDriver + ?Sized`)
//! - `Arc<Mutex<T>>` shared between the render thread and the HTTP handlers
//! - Deriving dirtiness by comparing values instead of tracking flags

use crate::driver::PixelDriver;
use crate::engine::{SharedEngine, lock_engine};
use crate::state::{Effect, StripState};
use crate::{Color, is_running};
use std::sync::atomic::AtomicBool;
use std::thread;
use std::time::{Duration, Instant};

// ── Pixel writes ─────────────────────────────────────────────────────

/// Scale a color by the current brightness curve.
pub fn apply_brightness(state: &StripState, color: Color) -> Color {
    color.scale(state.brightness_scale())
}

/// Fill `[0, pixel_count)` with `color` and `[pixel_count, max_pixel_count)`
/// with black. Does not latch.
pub fn write_active_pixels<D: PixelDriver + ?Sized>(
    driver: &mut D,
    state: &StripState,
    color: Color,
) {
    for pixel in 0..state.pixel_count() {
        driver.set_pixel(pixel, color);
    }
    for pixel in state.pixel_count()..state.max_pixel_count() {
        driver.set_pixel(pixel, Color::BLACK);
    }
}

/// Draw and latch the brightness-scaled solid color.
pub fn apply_solid_color<D: PixelDriver + ?Sized>(driver: &mut D, state: &StripState) {
    write_active_pixels(driver, state, apply_brightness(state, state.solid_color()));
    driver.show();
}

/// Blank and latch the strip.
pub fn turn_off<D: PixelDriver + ?Sized>(driver: &mut D, state: &StripState) {
    write_active_pixels(driver, state, Color::BLACK);
    driver.show();
}

// ── Dirty tracking ───────────────────────────────────────────────────

/// The inputs a rendered frame depended on.
///
/// Two frames with equal keys look the same, so a mode only needs a redraw
/// when the key of the current state differs from the last one drawn.
/// `Off` leaves out color and brightness: black looks the same at any level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderKey {
    Fade,
    Solid {
        color: Color,
        brightness: u8,
        count: u16,
    },
    Snake {
        color: Color,
        brightness: u8,
        count: u16,
    },
    Off {
        count: u16,
    },
}

impl RenderKey {
    pub fn for_effect(effect: Effect, state: &StripState) -> Self {
        match effect {
            Effect::Fade => Self::Fade,
            Effect::Solid => Self::Solid {
                color: state.solid_color(),
                brightness: state.brightness(),
                count: state.pixel_count(),
            },
            Effect::Snake => Self::Snake {
                color: state.solid_color(),
                brightness: state.brightness(),
                count: state.pixel_count(),
            },
            Effect::Off => Self::Off {
                count: state.pixel_count(),
            },
        }
    }
}

/// Remembers what was drawn last.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderTracker {
    last: Option<RenderKey>,
}

impl RenderTracker {
    /// Whether `effect` would draw something different from the last frame.
    /// Fade animates continuously and is always dirty.
    pub fn is_dirty(&self, effect: Effect, state: &StripState) -> bool {
        match effect {
            Effect::Fade => true,
            _ => self.last != Some(RenderKey::for_effect(effect, state)),
        }
    }

    pub fn mark_rendered(&mut self, effect: Effect, state: &StripState) {
        self.last = Some(RenderKey::for_effect(effect, state));
    }
}

// ── Render loop ──────────────────────────────────────────────────────

/// Main render loop: runs on a dedicated thread until `running` goes false.
///
/// Each iteration locks the engine for one dispatch tick and then yields
/// for `idle`. The lock is never held across the sleep, so HTTP handlers
/// get in between every tick.
pub fn render_loop<D: PixelDriver>(engine: SharedEngine<D>, running: &AtomicBool, idle: Duration) {
    tracing::info!("Render thread started");

    while is_running(running) {
        lock_engine(&engine).tick(Instant::now());
        thread::sleep(idle);
    }

    tracing::info!("Render thread: shutdown requested, stopping.");
}
