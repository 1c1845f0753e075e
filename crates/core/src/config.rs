//! Per-instance configuration parsed from the root's `data-options` blob.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: &'static str,
    },
}

/// Image track transition effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Effect {
    #[default]
    Fade,
    Slide,
    Cube,
    Coverflow,
    Flip,
    Creative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaginationType {
    #[default]
    Bullets,
    Fraction,
    Progressbar,
}

/// Options as authored in the page builder, with defaults for every key.
///
/// Keys are camelCase. Booleans also accept the page builder's switcher
/// values (`"yes"` / `""`), and numbers may arrive as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CarouselOptions {
    pub effect: Effect,
    /// Image track transition speed in ms.
    #[serde(deserialize_with = "lenient_u32")]
    pub speed: u32,
    #[serde(alias = "loop", deserialize_with = "lenient_bool")]
    pub infinite: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub autoplay: bool,
    #[serde(deserialize_with = "lenient_u32")]
    pub autoplay_speed: u32,
    #[serde(deserialize_with = "lenient_bool")]
    pub pause_on_hover: bool,
    pub pagination_type: PaginationType,
    #[serde(deserialize_with = "lenient_bool")]
    pub enable_gsap_animations: bool,
    /// Base reveal duration in seconds.
    #[serde(deserialize_with = "lenient_f64")]
    pub animation_duration: f64,
    /// Replay the reveal every time a slide becomes active, not only the
    /// first time.
    #[serde(deserialize_with = "lenient_bool")]
    pub replay_animations: bool,
}

impl Default for CarouselOptions {
    fn default() -> Self {
        Self {
            effect: Effect::Fade,
            speed: 500,
            infinite: true,
            autoplay: false,
            autoplay_speed: 5000,
            pause_on_hover: false,
            pagination_type: PaginationType::Bullets,
            enable_gsap_animations: true,
            animation_duration: 0.7,
            replay_animations: true,
        }
    }
}

impl CarouselOptions {
    /// Reveal duration in whole milliseconds.
    pub fn animation_duration_ms(&self) -> u32 {
        (self.animation_duration * 1000.0).round() as u32
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if !self.animation_duration.is_finite() || self.animation_duration < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "animationDuration",
                reason: "must be a finite, non-negative number of seconds",
            });
        }
        if self.autoplay && self.autoplay_speed == 0 {
            return Err(ConfigError::InvalidValue {
                field: "autoplaySpeed",
                reason: "must be positive when autoplay is enabled",
            });
        }
        Ok(self)
    }
}

/// Parse a `data-options` string.
pub fn parse_options(raw: &str) -> Result<CarouselOptions, ConfigError> {
    let options: CarouselOptions = serde_json::from_str(raw)?;
    options.validate()
}

/// Parse a `data-options` string, falling back to defaults on any error.
///
/// A missing or blank attribute is not an error. A malformed one is logged
/// and returned alongside the defaults so the caller can surface it.
pub fn resolve_options(
    raw: Option<&str>,
    instance: &str,
) -> (CarouselOptions, Option<ConfigError>) {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return (CarouselOptions::default(), None);
    };
    match parse_options(raw) {
        Ok(options) => (options, None),
        Err(err) => {
            tracing::warn!(instance, error = %err, "malformed data-options, using defaults");
            (CarouselOptions::default(), Some(err))
        }
    }
}

/// Autoplay policy of the image track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Autoplay {
    pub delay_ms: u32,
    pub pause_on_hover: bool,
}

/// Reveal choreography settings. Absent when animations are disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Animations {
    pub duration_ms: u32,
    pub replay: bool,
}

/// Settings an instance runs with after device adaptation.
///
/// Built once per instance and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveConfig {
    pub effect: Effect,
    pub speed_ms: u32,
    pub infinite: bool,
    pub autoplay: Option<Autoplay>,
    pub pagination: PaginationType,
    pub animations: Option<Animations>,
    /// Whether the host may watch the root for DOM mutations.
    pub observe_mutations: bool,
    /// Delay before the first initialization attempt.
    pub init_delay_ms: u32,
}

/// Looping is only meaningful with more than one slide.
pub fn loop_enabled(slide_count: usize, infinite: bool) -> bool {
    slide_count > 1 && infinite
}

fn lenient_bool<'de, D: Deserializer<'de>>(de: D) -> Result<bool, D::Error> {
    use serde::de::Error;
    match serde_json::Value::deserialize(de)? {
        serde_json::Value::Bool(b) => Ok(b),
        serde_json::Value::Null => Ok(false),
        serde_json::Value::Number(n) => Ok(n.as_f64().is_some_and(|v| v != 0.0)),
        serde_json::Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "true" | "1" | "on" => Ok(true),
            "" | "no" | "false" | "0" | "off" => Ok(false),
            _ => Err(D::Error::custom(format!("expected a boolean, got {s:?}"))),
        },
        other => Err(D::Error::custom(format!("expected a boolean, got {other}"))),
    }
}

fn lenient_f64<'de, D: Deserializer<'de>>(de: D) -> Result<f64, D::Error> {
    use serde::de::Error;
    match serde_json::Value::deserialize(de)? {
        serde_json::Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| D::Error::custom("number out of range")),
        serde_json::Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("expected a number, got {s:?}"))),
        other => Err(D::Error::custom(format!("expected a number, got {other}"))),
    }
}

fn lenient_u32<'de, D: Deserializer<'de>>(de: D) -> Result<u32, D::Error> {
    use serde::de::Error;
    let value = lenient_f64(de)?;
    if !(0.0..=f64::from(u32::MAX)).contains(&value) {
        return Err(D::Error::custom(format!("{value} is not a valid duration")));
    }
    Ok(value.round() as u32)
}
