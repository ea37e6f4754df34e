//! Strip state: the single source of truth for what the strip should show.
//!
//! Every mutator either changes exactly one field and reports `true`, or
//! leaves the state untouched and reports `false`. Out-of-range numbers are
//! clamped and unknown mode names are ignored; nothing here can fail.

use crate::{Color, StripConfig};
use serde::Serialize;
use std::fmt;
use std::net::Ipv4Addr;

// ── Effect ───────────────────────────────────────────────────────────

/// The four mutually exclusive rendering modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    /// Endless random-hue color fade
    Fade,
    /// Every active pixel shows the solid color
    Solid,
    /// A short comet of the solid color running along the strip
    Snake,
    /// All pixels dark
    Off,
}

impl Effect {
    pub const ALL: [Self; 4] = [Self::Fade, Self::Solid, Self::Snake, Self::Off];

    /// Parse a mode token, ignoring ASCII case. Anything else is `None`.
    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|effect| token.eq_ignore_ascii_case(effect.as_str()))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fade => "fade",
            Self::Solid => "solid",
            Self::Snake => "snake",
            Self::Off => "off",
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── StripState ───────────────────────────────────────────────────────

/// Desired mode, color, brightness and active pixel count.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StripState {
    effect: Effect,
    solid_color: Color,
    brightness: u8,
    pixel_count: u16,
    max_pixel_count: u16,
}

impl StripState {
    /// Startup defaults: fading, warm orange, mid brightness.
    pub fn new(config: &StripConfig) -> Self {
        Self {
            effect: Effect::Fade,
            solid_color: Color::new(255, 80, 10),
            brightness: 160,
            pixel_count: config.clamp_pixel_count(config.pixel_count),
            max_pixel_count: config.max_pixel_count,
        }
    }

    pub fn effect(&self) -> Effect {
        self.effect
    }

    pub fn solid_color(&self) -> Color {
        self.solid_color
    }

    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    pub fn pixel_count(&self) -> u16 {
        self.pixel_count
    }

    pub fn max_pixel_count(&self) -> u16 {
        self.max_pixel_count
    }

    pub fn set_effect(&mut self, effect: Effect) -> bool {
        if self.effect == effect {
            return false;
        }
        self.effect = effect;
        true
    }

    /// Switch mode by name. Unknown names are a no-op.
    pub fn set_mode(&mut self, token: &str) -> bool {
        match Effect::parse(token) {
            Some(effect) => self.set_effect(effect),
            None => false,
        }
    }

    pub fn set_solid_color(&mut self, color: Color) -> bool {
        if self.solid_color == color {
            return false;
        }
        self.solid_color = color;
        true
    }

    pub fn set_brightness(&mut self, brightness: u8) -> bool {
        if self.brightness == brightness {
            return false;
        }
        self.brightness = brightness;
        true
    }

    /// Set the active pixel count, clamped to `1..=max_pixel_count`.
    pub fn set_pixel_count(&mut self, count: u16) -> bool {
        let count = count.clamp(1, self.max_pixel_count);
        if self.pixel_count == count {
            return false;
        }
        self.pixel_count = count;
        true
    }

    /// Brightness as a `0.0..=1.0` factor on a quadratic curve, so low
    /// settings are visibly dimmer than a linear ramp would make them.
    pub fn brightness_scale(&self) -> f32 {
        let percent = f32::from(self.brightness) / 255.0;
        (percent * percent).clamp(0.0, 1.0)
    }

    /// HSL lightness for fade targets. Never zero unless brightness is zero.
    pub fn fade_luminance(&self) -> f32 {
        if self.brightness == 0 {
            return 0.0;
        }
        (self.brightness_scale() * 0.5).max(MIN_FADE_LUMINANCE)
    }

    /// Structured view of the state for the query endpoint.
    pub fn snapshot(&self, ip: Ipv4Addr) -> StateSnapshot {
        StateSnapshot {
            mode: self.effect,
            brightness: self.brightness,
            color: self.solid_color,
            count: self.pixel_count,
            ip: ip.to_string(),
        }
    }
}

/// Dimmest lightness a fade target may have at non-zero brightness.
pub const MIN_FADE_LUMINANCE: f32 = 0.002;

// ── Snapshot ─────────────────────────────────────────────────────────

/// Response body of the state query and control endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct StateSnapshot {
    /// Active effect
    #[schema(example = "fade")]
    pub mode: Effect,
    /// Brightness (0-255)
    #[schema(example = 160)]
    pub brightness: u8,
    /// Solid color used by the solid and snake effects
    pub color: Color,
    /// Number of active pixels
    #[schema(example = 12)]
    pub count: u16,
    /// Address the controller is reachable at
    #[schema(example = "192.168.4.1")]
    pub ip: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn state() -> StripState {
        StripState::new(&StripConfig::default())
    }

    #[test]
    fn defaults_are_fade_orange_mid_brightness() {
        let s = state();
        assert_eq!(s.effect(), Effect::Fade);
        assert_eq!(s.solid_color(), Color::new(255, 80, 10));
        assert_eq!(s.brightness(), 160);
        assert_eq!(s.pixel_count(), 12);
        assert_eq!(s.max_pixel_count(), 144);
    }

    #[rstest]
    #[case("fade", Some(Effect::Fade))]
    #[case("SOLID", Some(Effect::Solid))]
    #[case("Snake", Some(Effect::Snake))]
    #[case("oFF", Some(Effect::Off))]
    #[case("purple", None)]
    #[case("", None)]
    #[case(" solid", None)]
    fn test_effect_parse(#[case] token: &str, #[case] expected: Option<Effect>) {
        assert_eq!(Effect::parse(token), expected);
    }

    #[test]
    fn effect_round_trips_through_its_name() {
        for effect in Effect::ALL {
            assert_eq!(Effect::parse(&effect.to_string()), Some(effect));
        }
    }

    #[test]
    fn set_mode_reports_change_once() {
        let mut s = state();
        assert!(s.set_mode("solid"));
        assert!(!s.set_mode("Solid"));
        assert_eq!(s.effect(), Effect::Solid);
    }

    #[test]
    fn set_mode_ignores_unknown_token() {
        let mut s = state();
        let before = s.clone();
        assert!(!s.set_mode("purple"));
        assert_eq!(s, before);
    }

    #[test]
    fn setters_are_no_ops_on_equal_values() {
        let mut s = state();
        let before = s.clone();
        assert!(!s.set_solid_color(Color::new(255, 80, 10)));
        assert!(!s.set_brightness(160));
        assert!(!s.set_pixel_count(12));
        assert_eq!(s, before);
    }

    #[rstest]
    #[case(0, 1)]
    #[case(1, 1)]
    #[case(144, 144)]
    #[case(u16::MAX, 144)]
    fn set_pixel_count_clamps(#[case] requested: u16, #[case] expected: u16) {
        let mut s = state();
        s.set_pixel_count(requested);
        assert_eq!(s.pixel_count(), expected);
    }

    #[test]
    fn clamped_pixel_count_equal_to_current_is_no_change() {
        let mut s = state();
        assert!(s.set_pixel_count(500));
        assert!(!s.set_pixel_count(144));
        assert!(!s.set_pixel_count(u16::MAX));
    }

    #[test]
    fn brightness_scale_is_quadratic_and_monotonic() {
        let mut s = state();
        let mut previous = -1.0;
        for b in 0..=255u8 {
            s.set_brightness(b);
            let scale = s.brightness_scale();
            assert!(scale >= previous, "scale dropped at brightness {b}");
            assert!((0.0..=1.0).contains(&scale));
            previous = scale;
        }
        s.set_brightness(0);
        assert_eq!(s.brightness_scale(), 0.0);
        s.set_brightness(255);
        assert_eq!(s.brightness_scale(), 1.0);
    }

    #[rstest]
    #[case(0, 0.0)]
    #[case(1, MIN_FADE_LUMINANCE)]
    #[case(255, 0.5)]
    fn test_fade_luminance(#[case] brightness: u8, #[case] expected: f32) {
        let mut s = state();
        s.set_brightness(brightness);
        assert!((s.fade_luminance() - expected).abs() < 1e-6);
    }

    #[test]
    fn snapshot_reports_every_field() {
        let mut s = state();
        s.set_mode("solid");
        s.set_solid_color(Color::new(255, 0, 0));
        s.set_brightness(255);

        let snapshot = s.snapshot(Ipv4Addr::new(192, 168, 4, 1));
        assert_eq!(
            snapshot,
            StateSnapshot {
                mode: Effect::Solid,
                brightness: 255,
                color: Color::new(255, 0, 0),
                count: 12,
                ip: "192.168.4.1".to_string(),
            }
        );
    }

    #[test]
    fn snapshot_serializes_to_control_panel_shape() {
        let json = serde_json::to_value(state().snapshot(Ipv4Addr::LOCALHOST)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "mode": "fade",
                "brightness": 160,
                "color": { "r": 255, "g": 80, "b": 10 },
                "count": 12,
                "ip": "127.0.0.1",
            })
        );
    }
}
