//! The effect engine: strip state, control surface and mode dispatch.
//!
//! `Engine` owns everything the strip's appearance depends on. Control
//! requests mutate it through the `set_*` methods; the render thread calls
//! `tick` once per loop iteration, which dispatches to exactly one effect.
//!
//! ## Rust concepts
//! - A single owner for all mutable state, shared through `Arc<Mutex<T>>`
//! - Generic over the pixel driver so tests can use `MemoryStrip`
//! - Seedable randomness (`StdRng`) for reproducible fades

use crate::driver::PixelDriver;
use crate::fade::FadeAnimator;
use crate::render::{RenderTracker, apply_solid_color, turn_off};
use crate::snake::SnakeEffectState;
use crate::state::{Effect, StripState};
use crate::{Color, StripConfig};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// Engine shared between the render thread and the HTTP handlers.
pub type SharedEngine<D> = Arc<Mutex<Engine<D>>>;

/// Lock the shared engine.
///
/// Every mutator leaves the engine consistent, so a panic while the lock was
/// held cannot have left a torn state behind; poisoning is ignored.
pub fn lock_engine<D>(engine: &SharedEngine<D>) -> MutexGuard<'_, Engine<D>> {
    engine.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct Engine<D> {
    config: StripConfig,
    state: StripState,
    driver: D,
    fade: FadeAnimator,
    snake: SnakeEffectState,
    rendered: RenderTracker,
    rng: StdRng,
}

impl<D: PixelDriver> Engine<D> {
    /// Engine with entropy-seeded fades.
    pub fn new(driver: D, config: StripConfig) -> Self {
        Self::with_rng(driver, config, StdRng::from_entropy())
    }

    /// Engine whose fade sequence is fully determined by `seed`.
    pub fn with_seed(driver: D, config: StripConfig, seed: u64) -> Self {
        Self::with_rng(driver, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(driver: D, mut config: StripConfig, rng: StdRng) -> Self {
        if driver.len() < config.max_pixel_count {
            tracing::warn!(
                "Driver has {} pixels, limiting max pixel count from {}",
                driver.len(),
                config.max_pixel_count
            );
            config.max_pixel_count = driver.len().max(1);
            config.pixel_count = config.clamp_pixel_count(config.pixel_count);
        }

        Self {
            state: StripState::new(&config),
            snake: SnakeEffectState::new(&config),
            fade: FadeAnimator::new(),
            rendered: RenderTracker::default(),
            config,
            driver,
            rng,
        }
    }

    pub fn state(&self) -> &StripState {
        &self.state
    }

    pub fn config(&self) -> &StripConfig {
        &self.config
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn fade(&self) -> &FadeAnimator {
        &self.fade
    }

    pub fn snake(&self) -> &SnakeEffectState {
        &self.snake
    }

    /// Whether `effect` would redraw on its next tick.
    pub fn needs_redraw(&self, effect: Effect) -> bool {
        self.rendered.is_dirty(effect, &self.state)
    }

    // ── Control surface ──────────────────────────────────────────────

    /// Switch effect by name (`fade`, `solid`, `snake`, `off`, any case).
    /// Unknown names and the current mode are no-ops.
    pub fn set_mode(&mut self, token: &str) -> bool {
        let Some(effect) = Effect::parse(token) else {
            tracing::debug!("Ignoring unknown mode {:?}", token);
            return false;
        };
        self.set_effect(effect)
    }

    pub fn set_effect(&mut self, effect: Effect) -> bool {
        let previous = self.state.effect();
        if !self.state.set_effect(effect) {
            return false;
        }
        self.fade.halt();
        self.snake.reset();
        tracing::info!("Effect changed: {} -> {}", previous, effect);
        true
    }

    pub fn set_solid_color(&mut self, r: u8, g: u8, b: u8) -> bool {
        self.state.set_solid_color(Color::new(r, g, b))
    }

    pub fn set_brightness(&mut self, brightness: u8) -> bool {
        if !self.state.set_brightness(brightness) {
            return false;
        }
        self.fade.halt();
        true
    }

    /// Set the number of active pixels, clamped to `1..=max_pixel_count`.
    pub fn set_pixel_count(&mut self, count: u16) -> bool {
        if !self.state.set_pixel_count(count) {
            return false;
        }
        self.fade.halt();
        self.snake.reset();
        true
    }

    // ── Dispatch ─────────────────────────────────────────────────────

    /// Run one iteration of the render loop.
    pub fn tick(&mut self, now: Instant) {
        let effect = self.state.effect();
        if effect != Effect::Fade && self.fade.is_animating() {
            self.fade.halt();
        }

        match effect {
            Effect::Fade => {
                self.fade.tick(
                    now,
                    &self.state,
                    &self.config,
                    &mut self.driver,
                    &mut self.rng,
                );
                self.rendered.mark_rendered(Effect::Fade, &self.state);
            }
            Effect::Solid => {
                if self.needs_redraw(Effect::Solid) {
                    apply_solid_color(&mut self.driver, &self.state);
                    self.rendered.mark_rendered(Effect::Solid, &self.state);
                }
            }
            Effect::Snake => {
                if self.needs_redraw(Effect::Snake) {
                    self.snake.restart(&mut self.driver, &self.state);
                    self.rendered.mark_rendered(Effect::Snake, &self.state);
                }
                self.snake.tick(now, &self.state, &mut self.driver);
            }
            Effect::Off => {
                if self.needs_redraw(Effect::Off) {
                    turn_off(&mut self.driver, &self.state);
                    self.rendered.mark_rendered(Effect::Off, &self.state);
                }
            }
        }
    }
}
