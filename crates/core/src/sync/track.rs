use serde::Serialize;
use slidesync_protocol::TrackKind;

use crate::config::{Effect, EffectiveConfig};

/// Construction parameters handed to the host's slide engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSpec {
    pub kind: TrackKind,
    pub slide_count: usize,
    pub effect: Effect,
    pub cross_fade: bool,
    pub speed_ms: u32,
    pub looped: bool,
    /// Slides duplicated on each side of the real ones in loop mode.
    pub looped_slides: usize,
    pub allow_touch_move: bool,
    /// Internal index to start on.
    pub initial_index: usize,
}

/// Index bookkeeping for one carousel track.
///
/// In loop mode the engine renders three copies of the slide list so it can
/// wrap seamlessly; the real slides are the middle copy. Internal indices
/// address rendered slides, logical indices address real ones.
#[derive(Debug, Clone)]
pub struct Track {
    kind: TrackKind,
    slide_count: usize,
    looped: bool,
    internal: usize,
}

impl Track {
    pub fn new(kind: TrackKind, slide_count: usize, looped: bool) -> Self {
        let mut track = Self {
            kind,
            slide_count,
            looped,
            internal: 0,
        };
        track.internal = track.internal_for(0);
        track
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn slide_count(&self) -> usize {
        self.slide_count
    }

    pub fn looped(&self) -> bool {
        self.looped
    }

    pub fn internal_index(&self) -> usize {
        self.internal
    }

    /// Number of slide nodes the engine renders.
    pub fn rendered_len(&self) -> usize {
        if self.looped {
            self.slide_count * 3
        } else {
            self.slide_count
        }
    }

    /// Map a rendered index to the real slide it shows.
    pub fn logical_of(&self, internal: usize) -> usize {
        if self.slide_count == 0 {
            return 0;
        }
        if self.looped {
            internal % (self.rendered_len() / 3)
        } else {
            internal.min(self.slide_count - 1)
        }
    }

    /// Rendered index of a real slide, choosing the middle copy when looping.
    pub fn internal_for(&self, logical: usize) -> usize {
        if self.looped {
            self.slide_count + logical
        } else {
            logical
        }
    }

    /// The real slide currently shown, or `None` for an empty track.
    pub fn logical_index(&self) -> Option<usize> {
        (self.slide_count > 0).then(|| self.logical_of(self.internal))
    }

    /// Internal index one step away, or `None` at a non-looping edge.
    pub fn step_target(&self, forward: bool) -> Option<usize> {
        if self.slide_count < 2 {
            return None;
        }
        if forward {
            let next = self.internal + 1;
            (next < self.rendered_len()).then_some(next)
        } else {
            self.internal.checked_sub(1)
        }
    }

    /// Internal index that reaches `logical` with the shortest move.
    pub fn target_for(&self, logical: usize) -> usize {
        if !self.looped {
            return logical.min(self.slide_count.saturating_sub(1));
        }
        let n = self.slide_count as isize;
        let current = self.internal as isize;
        let mut delta = logical as isize - self.logical_of(self.internal) as isize;
        if delta > n / 2 {
            delta -= n;
        } else if delta < -(n / 2) {
            delta += n;
        }
        (current + delta).clamp(0, 3 * n - 1) as usize
    }

    pub fn set_internal(&mut self, internal: usize) {
        self.internal = internal.min(self.rendered_len().saturating_sub(1));
    }

    /// When a looped track came to rest on a duplicate, the internal index
    /// of the real slide it should silently jump back to.
    pub fn recentre(&mut self) -> Option<usize> {
        if !self.looped {
            return None;
        }
        let home = self.internal_for(self.logical_of(self.internal));
        if home == self.internal {
            return None;
        }
        self.internal = home;
        Some(home)
    }

    pub fn spec(&self, config: &EffectiveConfig) -> TrackSpec {
        let (effect, cross_fade, speed_ms, allow_touch_move) = match self.kind {
            TrackKind::Image => (config.effect, false, config.speed_ms, self.slide_count > 1),
            TrackKind::Content => (Effect::Fade, true, 0, false),
        };
        TrackSpec {
            kind: self.kind,
            slide_count: self.slide_count,
            effect,
            cross_fade,
            speed_ms,
            looped: self.looped,
            looped_slides: if self.looped { self.slide_count } else { 0 },
            allow_touch_move,
            initial_index: self.internal,
        }
    }
}
