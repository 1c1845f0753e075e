//! The seams between the engine and the page it runs on.
//!
//! The host adapter scans markup into a [`MarkupRoot`], wraps the third-party
//! slide engine behind [`SlideEngine`], and measures layout on request via
//! [`LayoutProbe`]. Everything the engine wants changed comes back as
//! `StyleCommand`s.

use serde::Deserialize;
use slidesync_protocol::{ElementRole, Rect, TrackKind};
use thiserror::Error;

use crate::sync::TrackSpec;

/// One carousel mount point as found in the page.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkupRoot {
    /// Stable element id, unique per page.
    pub id: String,
    /// Raw `data-options` attribute.
    #[serde(default)]
    pub options: Option<String>,
    /// Slide nodes in the image track, or `None` when the track is missing.
    #[serde(default)]
    pub image_slides: Option<usize>,
    /// Content slides in document order, or `None` when the track is missing.
    #[serde(default)]
    pub content_slides: Option<Vec<SlideMarkup>>,
    /// Prev/next controls are present; keyboard navigation is bound only
    /// when they are.
    #[serde(default)]
    pub has_navigation: bool,
    #[serde(default)]
    pub has_pagination: bool,
    /// Whether a trailing spacer already follows the root.
    #[serde(default)]
    pub has_spacer: bool,
}

/// Which animatable elements one content slide actually contains.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SlideMarkup {
    pub roles: Vec<ElementRole>,
}

impl SlideMarkup {
    pub fn with_roles(roles: impl IntoIterator<Item = ElementRole>) -> Self {
        Self {
            roles: roles.into_iter().collect(),
        }
    }

    pub fn has(&self, role: ElementRole) -> bool {
        self.roles.contains(&role)
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("slide engine failed to construct the {track:?} track: {message}")]
    Construct { track: TrackKind, message: String },
}

/// The third-party carousel engine as seen from the synchronizer.
///
/// Implementations must not start the engine's own autoplay. Autoplay is
/// driven by the registry's timers and arrives as ordinary `SlideTo`
/// commands, so a second driver would advance the image track twice.
pub trait SlideEngine {
    /// Whether the engine library has finished loading.
    fn is_loaded(&self) -> bool;

    /// Build one track of `instance`.
    fn construct(&mut self, instance: &str, spec: &TrackSpec) -> Result<(), EngineError>;

    /// Tear down a previously constructed track.
    fn destroy(&mut self, instance: &str, track: TrackKind);
}

/// Vertical anchoring of an overlay relative to the carousel box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Anchor {
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    Center,
    CenterRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl Anchor {
    pub fn is_bottom(self) -> bool {
        matches!(
            self,
            Anchor::BottomLeft | Anchor::BottomCenter | Anchor::BottomRight
        )
    }
}

/// A decorative element positioned over the carousel.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overlay {
    pub rect: Rect,
    /// Flagged as allowed to extend past the carousel box.
    pub extends_beyond: bool,
    pub anchor: Anchor,
}

/// Bounding boxes of one instance at a point in time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSnapshot {
    pub viewport_width: f64,
    pub carousel: Rect,
    #[serde(default)]
    pub overlays: Vec<Overlay>,
}

pub trait LayoutProbe {
    /// Measure `instance`, or `None` if it is not in the page.
    fn measure(&self, instance: &str) -> Option<LayoutSnapshot>;
}

/// Everything the registry needs from the page.
pub trait Host: SlideEngine + LayoutProbe {}

impl<T: SlideEngine + LayoutProbe> Host for T {}
