//! Fade mode: an endless chain of linear blends between random hues.
//!
//! The animator is either idle or blending. Polling it while idle starts a
//! new cycle towards a random fully saturated hue, with a lightness derived
//! from brightness and a random duration. A cycle starts where the previous
//! one ended; the first cycle after activation starts from whatever the
//! strip is currently showing, so there is never a visible jump.

use crate::driver::PixelDriver;
use crate::render::write_active_pixels;
use crate::scheduler::TimedAnimation;
use crate::state::{Effect, StripState};
use crate::{Color, StripConfig};
use rand::Rng;
use std::time::{Duration, Instant};

/// Endpoints of the blend in progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FadeChannelState {
    pub starting: Color,
    pub ending: Color,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FadePhase {
    Idle,
    Blending {
        channel: FadeChannelState,
        animation: TimedAnimation,
    },
}

#[derive(Clone, Debug)]
pub struct FadeAnimator {
    phase: FadePhase,
    /// Target of the last cycle that ran to completion.
    previous_target: Option<Color>,
}

impl Default for FadeAnimator {
    fn default() -> Self {
        Self::new()
    }
}

impl FadeAnimator {
    pub fn new() -> Self {
        Self {
            phase: FadePhase::Idle,
            previous_target: None,
        }
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.phase, FadePhase::Blending { .. })
    }

    /// Endpoints of the running blend, if any.
    pub fn channel(&self) -> Option<FadeChannelState> {
        match self.phase {
            FadePhase::Blending { channel, .. } => Some(channel),
            FadePhase::Idle => None,
        }
    }

    /// Duration of the running blend, if any.
    pub fn cycle_duration(&self) -> Option<Duration> {
        match self.phase {
            FadePhase::Blending { animation, .. } => Some(animation.duration()),
            FadePhase::Idle => None,
        }
    }

    /// Stop the running blend. The next cycle reads its start color back
    /// from the strip instead of chaining from a stale target.
    pub fn halt(&mut self) {
        if self.is_animating() {
            tracing::debug!("fade animation halted");
        }
        self.phase = FadePhase::Idle;
        self.previous_target = None;
    }

    /// Advance the fade by one render tick, starting a new cycle if idle.
    pub fn tick<D, R>(
        &mut self,
        now: Instant,
        state: &StripState,
        config: &StripConfig,
        driver: &mut D,
        rng: &mut R,
    ) where
        D: PixelDriver + ?Sized,
        R: Rng,
    {
        if !self.is_animating() {
            self.start_cycle(now, state, config, driver, rng);
        }

        let FadePhase::Blending { channel, animation } = self.phase else {
            return;
        };

        let progress = animation.progress(now);
        let color = Color::linear_blend(channel.starting, channel.ending, progress);

        // A tick that lands after a mode switch must not paint over the new mode.
        if state.effect() == Effect::Fade {
            write_active_pixels(driver, state, color);
            driver.show();
        }

        if animation.is_complete(now) {
            self.previous_target = Some(channel.ending);
            self.phase = FadePhase::Idle;
        }
    }

    fn start_cycle<D, R>(
        &mut self,
        now: Instant,
        state: &StripState,
        config: &StripConfig,
        driver: &D,
        rng: &mut R,
    ) where
        D: PixelDriver + ?Sized,
        R: Rng,
    {
        let luminance = state.fade_luminance();
        let ending = random_target(rng, luminance);
        let duration = Duration::from_millis(rng.gen_range(config.fade_duration_ms.clone()));

        let previous = self.previous_target.take();
        let starting = if luminance == 0.0 {
            Color::BLACK
        } else {
            previous.unwrap_or_else(|| driver.get_pixel(0))
        };

        tracing::debug!(
            ?starting,
            ?ending,
            duration_ms = duration.as_millis() as u64,
            "fade cycle started"
        );

        self.phase = FadePhase::Blending {
            channel: FadeChannelState { starting, ending },
            animation: TimedAnimation::start(now, duration),
        };
    }
}

/// Fully saturated color of random hue at the given HSL lightness.
pub fn random_target<R: Rng>(rng: &mut R, luminance: f32) -> Color {
    let hue = f32::from(rng.gen_range(0u16..360)) / 360.0;
    Color::from_hsl(hue, 1.0, luminance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::MemoryStrip;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    struct Rig {
        fade: FadeAnimator,
        state: StripState,
        config: StripConfig,
        strip: MemoryStrip,
        rng: StdRng,
        t0: Instant,
    }

    impl Rig {
        fn new() -> Self {
            let config = StripConfig::default();
            Self {
                fade: FadeAnimator::new(),
                state: StripState::new(&config),
                strip: MemoryStrip::new(config.max_pixel_count),
                config,
                rng: StdRng::seed_from_u64(42),
                t0: Instant::now(),
            }
        }

        fn tick_at(&mut self, ms: u64) {
            let now = self.t0 + Duration::from_millis(ms);
            self.fade
                .tick(now, &self.state, &self.config, &mut self.strip, &mut self.rng);
        }
    }

    #[test]
    fn first_cycle_starts_from_displayed_color() {
        let mut rig = Rig::new();
        rig.strip.set_pixel(0, Color::new(12, 34, 56));

        rig.tick_at(0);

        let channel = rig.fade.channel().unwrap();
        assert_eq!(channel.starting, Color::new(12, 34, 56));
        assert_eq!(rig.strip.latched()[0], Color::new(12, 34, 56));
    }

    #[test]
    fn next_cycle_starts_at_previous_target() {
        let mut rig = Rig::new();
        rig.tick_at(0);
        let first = rig.fade.channel().unwrap();
        let duration = rig.fade.cycle_duration().unwrap().as_millis() as u64;

        rig.tick_at(duration);
        assert!(!rig.fade.is_animating());
        assert_eq!(rig.strip.latched()[0], first.ending);

        rig.tick_at(duration + 1);
        let second = rig.fade.channel().unwrap();
        assert_eq!(second.starting, first.ending);
    }

    #[test]
    fn cycles_chain_without_jumps() {
        let mut rig = Rig::new();
        let mut now = 0;
        let mut previous_end: Option<Color> = None;
        for _ in 0..20 {
            rig.tick_at(now);
            let channel = rig.fade.channel().unwrap();
            if let Some(end) = previous_end {
                assert_eq!(channel.starting, end);
            }
            previous_end = Some(channel.ending);
            now += rig.fade.cycle_duration().unwrap().as_millis() as u64;
            rig.tick_at(now);
        }
    }

    #[test]
    fn halt_restarts_from_the_strip() {
        let mut rig = Rig::new();
        rig.tick_at(0);
        rig.tick_at(1000);
        let shown = rig.strip.get_pixel(0);

        rig.fade.halt();
        assert!(!rig.fade.is_animating());

        rig.tick_at(1001);
        assert_eq!(rig.fade.channel().unwrap().starting, shown);
    }

    #[test]
    fn durations_stay_in_range() {
        let mut rig = Rig::new();
        let mut now = 0;
        for _ in 0..100 {
            rig.tick_at(now);
            let ms = rig.fade.cycle_duration().unwrap().as_millis() as u64;
            assert!((2000..=4000).contains(&ms), "duration {ms}");
            now += ms;
            rig.tick_at(now);
        }
    }

    #[test]
    fn blend_is_written_to_active_pixels_only() {
        let mut rig = Rig::new();
        rig.state.set_pixel_count(3);
        rig.tick_at(0);
        let channel = rig.fade.channel().unwrap();
        let half = rig.fade.cycle_duration().unwrap().as_millis() as u64 / 2;

        rig.tick_at(half);

        let latched = rig.strip.latched();
        let shown = latched[0];
        assert!(latched[..3].iter().all(|c| *c == shown));
        assert!(latched[3..].iter().all(|c| *c == Color::BLACK));

        let between = |a: u8, b: u8, x: u8| a.min(b) <= x && x <= a.max(b);
        assert!(between(channel.starting.r, channel.ending.r, shown.r));
        assert!(between(channel.starting.g, channel.ending.g, shown.g));
        assert!(between(channel.starting.b, channel.ending.b, shown.b));
    }

    #[test]
    fn late_tick_after_mode_switch_leaves_pixels_alone() {
        let mut rig = Rig::new();
        rig.state.set_mode("solid");
        rig.strip.set_pixel(0, Color::new(1, 1, 1));

        rig.tick_at(0);

        assert_eq!(rig.strip.get_pixel(0), Color::new(1, 1, 1));
        assert_eq!(rig.strip.latch_count(), 0);
    }

    #[test]
    fn zero_brightness_fades_nothing_but_black() {
        let mut rig = Rig::new();
        rig.strip.set_pixel(0, Color::new(200, 200, 200));
        rig.state.set_brightness(0);

        rig.tick_at(0);
        let channel = rig.fade.channel().unwrap();
        assert_eq!(channel.starting, Color::BLACK);
        assert_eq!(channel.ending, Color::BLACK);
        assert!(rig.strip.latched().iter().all(|c| *c == Color::BLACK));
    }

    #[test]
    fn full_brightness_targets_are_fully_saturated() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let c = random_target(&mut rng, 0.5);
            assert_eq!(c.r.max(c.g).max(c.b), 255);
            assert_eq!(c.r.min(c.g).min(c.b), 0);
        }
    }

    #[test]
    fn dimmest_targets_are_not_black() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..50 {
            assert_ne!(random_target(&mut rng, crate::state::MIN_FADE_LUMINANCE), Color::BLACK);
        }
    }
}
