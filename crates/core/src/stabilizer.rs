//! Trailing spacer sizing for decorations that overflow the carousel box.

use slidesync_protocol::StyleCommand;

use crate::host::LayoutSnapshot;

/// Spacer height when nothing overflows. Non-zero so border rounding does
/// not open a hairline gap.
pub const MIN_SPACER_PX: f64 = 1.0;
/// Delay after a slide change before overlays are measured.
pub const SETTLE_DELAY_MS: u64 = 120;
/// Quiet period before a resize is acted on.
pub const RESIZE_DEBOUNCE_MS: u64 = 200;

/// How far flagged, bottom-anchored overlays reach below the carousel.
pub fn max_extension(snapshot: &LayoutSnapshot) -> f64 {
    let bottom = snapshot.carousel.bottom();
    snapshot
        .overlays
        .iter()
        .filter(|o| o.extends_beyond && o.anchor.is_bottom())
        .map(|o| o.rect.bottom() - bottom)
        .fold(0.0_f64, f64::max)
}

pub fn spacer_height(snapshot: &LayoutSnapshot) -> f64 {
    let extension = max_extension(snapshot);
    if extension > 0.0 {
        extension.ceil()
    } else {
        MIN_SPACER_PX
    }
}

/// Keeps one spacer after an instance sized to its overflow.
#[derive(Debug)]
pub struct LayoutStabilizer {
    spacer_present: bool,
    viewport_width: Option<f64>,
    height: Option<f64>,
}

impl LayoutStabilizer {
    pub fn new(spacer_present: bool) -> Self {
        Self {
            spacer_present,
            viewport_width: None,
            height: None,
        }
    }

    pub fn height(&self) -> Option<f64> {
        self.height
    }

    /// Create the spacer unless one already exists.
    pub fn ensure_spacer(&mut self) -> Option<StyleCommand> {
        if self.spacer_present {
            return None;
        }
        self.spacer_present = true;
        Some(StyleCommand::CreateSpacer)
    }

    /// Whether a resize to `width` warrants a recompute. Height-only
    /// resizes (on-screen keyboards, collapsing toolbars) do not.
    pub fn width_changed(&self, width: f64) -> bool {
        self.viewport_width
            .is_none_or(|last| (last - width).abs() >= 0.5)
    }

    /// Resize the spacer from a fresh measurement. Emits nothing when the
    /// instance could not be measured or the height is unchanged.
    pub fn recompute(&mut self, snapshot: Option<&LayoutSnapshot>) -> Vec<StyleCommand> {
        let mut commands: Vec<StyleCommand> = self.ensure_spacer().into_iter().collect();
        let Some(snapshot) = snapshot else {
            return commands;
        };
        self.viewport_width = Some(snapshot.viewport_width);
        let height = spacer_height(snapshot);
        if self.height != Some(height) {
            self.height = Some(height);
            commands.push(StyleCommand::SetSpacerHeight { height });
        }
        commands
    }
}
