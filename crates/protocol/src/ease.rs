use serde::{Deserialize, Serialize};

/// Easing curves, serialized under the names GSAP-style tween engines use.
///
/// Hosts without a tween engine can sample the curve with [`Ease::sample`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ease {
    #[serde(rename = "none")]
    Linear,
    /// Cubic deceleration into rest.
    #[serde(rename = "power2.out")]
    Power2Out,
    /// Quartic deceleration into rest.
    #[serde(rename = "power3.out")]
    Power3Out,
}

impl Ease {
    /// Progress at normalized time `t` (clamped to `0.0..=1.0`).
    pub fn sample(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::Power2Out => 1.0 - (1.0 - t).powi(3),
            Ease::Power3Out => 1.0 - (1.0 - t).powi(4),
        }
    }
}
