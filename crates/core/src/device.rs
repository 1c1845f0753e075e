//! Runtime classification and configuration degradation for weak devices.

use serde::Deserialize;

use crate::config::{Animations, Autoplay, CarouselOptions, Effect, EffectiveConfig};

const CONSTRAINED_VIEWPORT_PX: f64 = 768.0;
const CONSTRAINED_CONCURRENCY: u32 = 2;
const CONSTRAINED_MEMORY_GB: f64 = 4.0;
/// Android releases below this major version count as legacy.
const LEGACY_ANDROID_MAJOR: u32 = 7;
/// iOS releases below this major version count as legacy.
const LEGACY_IOS_MAJOR: u32 = 12;

const CONSTRAINED_MIN_SPEED_MS: u32 = 300;
const FULL_INIT_DELAY_MS: u32 = 100;
const CONSTRAINED_INIT_DELAY_MS: u32 = 300;

/// What the host reports about the runtime environment.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceProfile {
    pub viewport_width: f64,
    /// `navigator.hardwareConcurrency`, when exposed.
    pub hardware_concurrency: Option<u32>,
    /// `navigator.deviceMemory`, when exposed.
    pub device_memory_gb: Option<f64>,
    pub user_agent: String,
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self {
            viewport_width: 1920.0,
            hardware_concurrency: None,
            device_memory_gb: None,
            user_agent: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceTier {
    Full,
    Constrained,
}

pub fn classify(profile: &DeviceProfile) -> PerformanceTier {
    let narrow = profile.viewport_width <= CONSTRAINED_VIEWPORT_PX;
    let few_cores = profile
        .hardware_concurrency
        .is_some_and(|n| n <= CONSTRAINED_CONCURRENCY);
    let low_memory = profile
        .device_memory_gb
        .is_some_and(|gb| gb <= CONSTRAINED_MEMORY_GB);

    if narrow || few_cores || low_memory || is_legacy_mobile(&profile.user_agent) {
        PerformanceTier::Constrained
    } else {
        PerformanceTier::Full
    }
}

/// Resolve the settings an instance runs with on a device of `tier`.
pub fn adapt(options: &CarouselOptions, tier: PerformanceTier) -> EffectiveConfig {
    let autoplay = options.autoplay.then_some(Autoplay {
        delay_ms: options.autoplay_speed,
        pause_on_hover: options.pause_on_hover,
    });
    let animations = options.enable_gsap_animations.then_some(Animations {
        duration_ms: options.animation_duration_ms(),
        replay: options.replay_animations,
    });

    let mut config = EffectiveConfig {
        effect: options.effect,
        speed_ms: options.speed,
        infinite: options.infinite,
        autoplay,
        pagination: options.pagination_type,
        animations,
        observe_mutations: true,
        init_delay_ms: FULL_INIT_DELAY_MS,
    };

    if tier == PerformanceTier::Constrained {
        config.speed_ms = config.speed_ms.max(CONSTRAINED_MIN_SPEED_MS);
        config.animations = None;
        config.effect = Effect::Slide;
        config.observe_mutations = false;
        config.init_delay_ms = CONSTRAINED_INIT_DELAY_MS;
    }
    config
}

fn is_legacy_mobile(user_agent: &str) -> bool {
    if let Some(major) = version_after(user_agent, "Android ", '.') {
        return major < LEGACY_ANDROID_MAJOR;
    }
    // iPhone: "iPhone OS 11_4 like Mac OS X"; iPad: "CPU OS 11_4 like Mac OS X"
    ["iPhone OS ", "CPU OS "]
        .iter()
        .find_map(|marker| version_after(user_agent, marker, '_'))
        .is_some_and(|major| major < LEGACY_IOS_MAJOR)
}

/// Major version number directly following `marker`.
fn version_after(haystack: &str, marker: &str, separator: char) -> Option<u32> {
    let start = haystack.find(marker)? + marker.len();
    let rest = &haystack[start..];
    let end = rest
        .find(|c: char| c == separator || !c.is_ascii_digit())
        .unwrap_or(rest.len());
    rest[..end].parse().ok()
}
