use serde::{Deserialize, Serialize};

use crate::ease::Ease;
use crate::element::{ElementRole, ElementStyle};

/// Which of the two tracks of an instance a command addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrackKind {
    /// Visual backdrop. Authority for the logical slide index.
    Image,
    /// Text and buttons. Mirrors the image track with zero-duration jumps.
    Content,
}

/// State class the host toggles on the instance root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LifecycleClass {
    Initializing,
    Ready,
    Transitioning,
}

/// Pagination projection for the active slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum Pagination {
    Bullets { active: usize },
    Fraction { label: String },
    Progress { fraction: f64 },
}

/// A single, stateless style instruction for the host adapter.
///
/// The engine emits a `Vec<StyleCommand>` for every input it handles. Hosts
/// apply them in order; each command carries all the data it needs. Slide
/// indices on `SlideTo` are *internal* track indices (loop copies
/// included); every other slide index is logical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "op")]
pub enum StyleCommand {
    /// Move a track to an internal index over `speed_ms` (0 = jump).
    SlideTo {
        track: TrackKind,
        index: usize,
        speed_ms: u32,
    },

    /// Change a track's default transition speed.
    SetSpeed { track: TrackKind, speed_ms: u32 },

    /// Allow or block swiping a track by touch or drag. Only the image
    /// track is ever draggable; the content track is built without drag.
    SetInteraction { track: TrackKind, enabled: bool },

    /// Allow or block clicks on a track's slides (`pointer-events`), so
    /// buttons cannot be hit mid-transition.
    SetPointerEvents { track: TrackKind, enabled: bool },

    /// Whether the host may watch the instance root for DOM mutations.
    /// Sent once when the instance is registered.
    ObserveMutations { enabled: bool },

    /// Start or stop the image track's autoplay timer display.
    SetAutoplay { running: bool },

    /// Swap the lifecycle class on the instance root.
    SetLifecycle { class: LifecycleClass },

    /// Show or hide the inner container of a content slide.
    SetContainerVisible { slide: usize, visible: bool },

    /// Set an element's style immediately.
    SetElement {
        slide: usize,
        role: ElementRole,
        style: ElementStyle,
    },

    /// Animate an element from `from` to `to`, starting `delay_ms` after
    /// the command is applied.
    Tween {
        slide: usize,
        role: ElementRole,
        from: ElementStyle,
        to: ElementStyle,
        delay_ms: u32,
        duration_ms: u32,
        ease: Ease,
    },

    /// Kill every in-flight tween on a content slide's elements.
    KillTweens { slide: usize },

    /// Update the pagination widget.
    SetPagination(Pagination),

    /// Insert the trailing spacer after the instance root.
    CreateSpacer,

    /// Resize the trailing spacer.
    SetSpacerHeight { height: f64 },
}

impl StyleCommand {
    pub fn is_tween(&self) -> bool {
        matches!(self, StyleCommand::Tween { .. })
    }
}
