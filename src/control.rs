//! Control intents: turning loosely typed request parameters into engine calls.
//!
//! Clients send everything as strings. Anything that does not parse is
//! dropped, numbers out of range are clamped, and a color needs all three
//! channels. A request never fails; it just changes less.

use crate::Color;
use crate::driver::PixelDriver;
use crate::engine::Engine;

/// Raw query parameters of a control request.
///
/// Built from the decoded key/value pairs rather than deserialized, so a
/// repeated or unknown key can never make the request fail.
#[derive(Clone, Debug, Default, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ControlQuery {
    /// Effect: fade, solid, snake or off (case-insensitive)
    #[param(example = "solid")]
    pub mode: Option<String>,
    /// Brightness, clamped to 0-255
    #[param(example = "200")]
    pub brightness: Option<String>,
    /// Active pixel count, clamped to 1 through the strip length
    #[param(example = "60")]
    pub count: Option<String>,
    /// Red channel (0-255); ignored unless g and b are also given
    pub r: Option<String>,
    /// Green channel (0-255)
    pub g: Option<String>,
    /// Blue channel (0-255)
    pub b: Option<String>,
}

impl ControlQuery {
    /// Collect the known keys from decoded query pairs. The first
    /// occurrence of a key wins; unknown keys are skipped.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "mode" => &mut query.mode,
                "brightness" => &mut query.brightness,
                "count" => &mut query.count,
                "r" => &mut query.r,
                "g" => &mut query.g,
                "b" => &mut query.b,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into());
            }
        }
        query
    }
}

/// A validated control request. `None` fields leave the state alone.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ControlIntent {
    pub mode: Option<String>,
    pub brightness: Option<u8>,
    pub count: Option<u16>,
    pub color: Option<Color>,
}

impl ControlIntent {
    pub fn from_query(query: &ControlQuery) -> Self {
        let channel = |value: &Option<String>| parse_clamped(value.as_deref(), 0, 255);

        let color = match (channel(&query.r), channel(&query.g), channel(&query.b)) {
            (Some(r), Some(g), Some(b)) => Some(Color::new(r as u8, g as u8, b as u8)),
            _ => None,
        };

        Self {
            mode: query.mode.clone(),
            brightness: parse_clamped(query.brightness.as_deref(), 0, 255).map(|v| v as u8),
            // The engine clamps further to the strip's own length.
            count: parse_clamped(query.count.as_deref(), 1, i64::from(u16::MAX))
                .map(|v| v as u16),
            color,
        }
    }

    /// Apply in order mode, brightness, count, color. Returns whether
    /// anything changed.
    pub fn apply<D: PixelDriver>(&self, engine: &mut Engine<D>) -> bool {
        let mut changed = false;

        if let Some(mode) = &self.mode {
            changed |= engine.set_mode(mode);
        }
        if let Some(brightness) = self.brightness {
            changed |= engine.set_brightness(brightness);
        }
        if let Some(count) = self.count {
            changed |= engine.set_pixel_count(count);
        }
        if let Some(color) = self.color {
            changed |= engine.set_solid_color(color.r, color.g, color.b);
        }

        changed
    }
}

/// Parse an integer and clamp it into `min..=max`. Unparsable input is `None`.
fn parse_clamped(value: Option<&str>, min: i64, max: i64) -> Option<i64> {
    let value = value?.trim().parse::<i64>().ok()?;
    Some(value.clamp(min, max))
}
