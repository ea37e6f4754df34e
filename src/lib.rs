//! Effect engine for an addressable LED strip, plus the pieces the HTTP
//! control server is built from.
//!
//! This module provides the shared building blocks:
//! - Strip configuration (pixel limits, animation timing)
//! - The `Color` type with HSL construction, scaling and blending
//! - Signal handling for clean shutdown
//!
//! The engine itself lives in `engine`, with one module per effect and the
//! render driver in `render`. The binary wires it to `server`.

pub mod control;
pub mod driver;
pub mod engine;
pub mod fade;
pub mod network;
pub mod render;
pub mod scheduler;
pub mod server;
pub mod snake;
pub mod state;

use serde::Serialize;
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Upper bound on the number of physically addressable pixels.
pub const MAX_PIXEL_COUNT: u16 = 144;

/// Active pixel count used until a client changes it.
pub const DEFAULT_PIXEL_COUNT: u16 = 12;

// ── Strip configuration ────────────────────────────────────────────

/// Fixed limits and timing for one strip.
///
/// # Rust concept: derive macros
/// `Clone` lets the server and the render thread each hold their own copy.
/// Nothing in here changes after startup, so there is no shared mutable state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StripConfig {
    /// Length of the pixel buffer; pixels past the active count stay black.
    pub max_pixel_count: u16,
    /// Active pixel count at startup.
    pub pixel_count: u16,
    /// Number of lit pixels in the snake, head included.
    pub snake_segment_length: u16,
    /// Time between two snake steps.
    pub snake_step: Duration,
    /// Range the duration of each fade cycle is drawn from.
    pub fade_duration_ms: RangeInclusive<u64>,
}

impl StripConfig {
    pub fn new(max_pixel_count: u16, pixel_count: u16) -> Self {
        let max_pixel_count = max_pixel_count.max(1);
        Self {
            max_pixel_count,
            pixel_count: pixel_count.clamp(1, max_pixel_count),
            ..Self::default()
        }
    }

    /// Clamp a requested active count into `1..=max_pixel_count`.
    pub fn clamp_pixel_count(&self, count: u16) -> u16 {
        count.clamp(1, self.max_pixel_count)
    }
}

impl Default for StripConfig {
    fn default() -> Self {
        Self {
            max_pixel_count: MAX_PIXEL_COUNT,
            pixel_count: DEFAULT_PIXEL_COUNT,
            snake_segment_length: 5,
            snake_step: Duration::from_millis(80),
            fade_duration_ms: 2000..=4000,
        }
    }
}

// ── Color ──────────────────────────────────────────────────────────

/// RGB color, 8 bits per channel.
///
/// This is the only color type the engine deals in. Drivers convert it to
/// whatever byte order their hardware wants at the boundary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Self = Self::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create a color from hue, saturation and lightness, each in `0.0..=1.0`.
    ///
    /// Lightness 0.5 at full saturation is the pure hue; lower values
    /// darken towards black.
    pub fn from_hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let h = hue.rem_euclid(1.0);
        let s = saturation.clamp(0.0, 1.0);
        let l = lightness.clamp(0.0, 1.0);

        if s == 0.0 {
            let v = channel_from_unit(l);
            return Self::new(v, v, v);
        }

        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;

        Self::new(
            channel_from_unit(hue_to_channel(p, q, h + 1.0 / 3.0)),
            channel_from_unit(hue_to_channel(p, q, h)),
            channel_from_unit(hue_to_channel(p, q, h - 1.0 / 3.0)),
        )
    }

    /// Multiply every channel by `scale`, clamped to `0.0..=1.0`.
    pub fn scale(self, scale: f32) -> Self {
        let scale = scale.clamp(0.0, 1.0);
        Self {
            r: (f32::from(self.r) * scale) as u8,
            g: (f32::from(self.g) * scale) as u8,
            b: (f32::from(self.b) * scale) as u8,
        }
    }

    /// Linear interpolation from `from` (progress 0) to `to` (progress 1).
    pub fn linear_blend(from: Self, to: Self, progress: f32) -> Self {
        let t = progress.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| {
            let a = f32::from(a);
            (a + (f32::from(b) - a) * t).round() as u8
        };
        Self {
            r: mix(from.r, to.r),
            g: mix(from.g, to.g),
            b: mix(from.b, to.b),
        }
    }
}

fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn channel_from_unit(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

// ── Signal handling ────────────────────────────────────────────────

/// Set up a Ctrl+C handler that sets the returned flag to false.
///
/// # Rust concept: Arc and AtomicBool
/// The render thread and the HTTP server both watch the same flag. `Arc`
/// shares ownership, `AtomicBool` makes the flag safe to flip from the
/// signal handler without a mutex.
pub fn setup_signal_handler() -> Result<Arc<AtomicBool>, ctrlc::Error> {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    Ok(running)
}

/// Check if the main loop should keep running.
pub fn is_running(running: &AtomicBool) -> bool {
    running.load(Ordering::SeqCst)
}

// ── Tests ──────────────────────────────────────────────────────────
