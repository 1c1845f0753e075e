use std::collections::VecDeque;

use anyhow::{Result, bail};
use slidesync_core::host::{Anchor, EngineError, Overlay};
use slidesync_core::sync::TrackSpec;
use slidesync_core::{
    CarouselInstance, DeviceProfile, LayoutProbe, LayoutSnapshot, MarkupRoot, MountOutcome, Nav,
    Registry, Scene, SlideEngine, SlideMarkup,
};
use slidesync_protocol::{ElementRole, Millis, Rect, StyleCommand, TrackKind};

pub const INSTANCE: &str = "playground";

/// Terminal cells are mapped onto a nominal page at this scale.
pub const PX_PER_COL: f64 = 8.0;
const CAROUSEL_HEIGHT_PX: f64 = 480.0;
const OVERFLOW_STEPS_PX: [f64; 3] = [0.0, 24.0, 40.0];
const LOG_LINES: usize = 200;

/// Stands in for both the slide engine and the page layout.
#[derive(Debug)]
pub struct TerminalHost {
    pub width_px: f64,
    pub overflow_px: f64,
    /// Make content track construction fail, to watch the instance stay static.
    pub fail_content: bool,
}

impl SlideEngine for TerminalHost {
    fn is_loaded(&self) -> bool {
        true
    }

    fn construct(&mut self, instance: &str, spec: &TrackSpec) -> Result<(), EngineError> {
        if self.fail_content && spec.kind == TrackKind::Content {
            return Err(EngineError::Construct {
                track: spec.kind,
                message: "--fail-engine".into(),
            });
        }
        tracing::debug!(instance, ?spec, "track constructed");
        Ok(())
    }

    fn destroy(&mut self, instance: &str, track: TrackKind) {
        tracing::debug!(instance, ?track, "track destroyed");
    }
}

impl LayoutProbe for TerminalHost {
    fn measure(&self, _instance: &str) -> Option<LayoutSnapshot> {
        let badge = Rect::new(
            self.width_px - 160.0,
            CAROUSEL_HEIGHT_PX - 60.0 + self.overflow_px,
            120.0,
            60.0,
        );
        Some(LayoutSnapshot {
            viewport_width: self.width_px,
            carousel: Rect::new(0.0, 0.0, self.width_px, CAROUSEL_HEIGHT_PX),
            overlays: vec![Overlay {
                rect: badge,
                extends_beyond: true,
                anchor: Anchor::BottomRight,
            }],
        })
    }
}

pub fn markup(options: Option<String>, slides: usize) -> MarkupRoot {
    MarkupRoot {
        id: INSTANCE.to_owned(),
        options,
        image_slides: Some(slides),
        content_slides: Some(vec![SlideMarkup::with_roles(ElementRole::ALL); slides]),
        has_navigation: true,
        has_pagination: true,
        has_spacer: false,
    }
}

/// One instance plus the simulated page around it.
pub struct Playground {
    registry: Registry,
    host: TerminalHost,
    root: MarkupRoot,
    scene: Scene,
    /// When the simulated engine will report the image track at rest.
    moving_until: Option<Millis>,
    hovered: bool,
    log: VecDeque<String>,
}

impl Playground {
    pub fn new(
        root: MarkupRoot,
        device: &DeviceProfile,
        host: TerminalHost,
        now: Millis,
    ) -> Result<Self> {
        let mut playground = Self {
            registry: Registry::new(device),
            host,
            scene: Scene::new(0, false),
            root,
            moving_until: None,
            hovered: false,
            log: VecDeque::new(),
        };
        let outcome = playground.registry.mount(playground.root.clone(), now)?;
        playground.adopt(outcome, now)?;
        Ok(playground)
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn instance(&self) -> Option<&CarouselInstance> {
        self.registry.get(INSTANCE)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn host(&self) -> &TerminalHost {
        &self.host
    }

    pub fn hovered(&self) -> bool {
        self.hovered
    }

    pub fn log(&self) -> impl DoubleEndedIterator<Item = &String> {
        self.log.iter()
    }

    /// Advance the simulated engine and fire due timers.
    pub fn tick(&mut self, now: Millis) {
        if self.moving_until.is_some_and(|until| now >= until) {
            self.moving_until = None;
            let commands = self.registry.transition_end(INSTANCE, now, &mut self.host);
            self.apply(&commands, now);
        }
        for batch in self.registry.tick(now, &mut self.host) {
            self.apply(&batch.commands, now);
        }
    }

    pub fn navigate(&mut self, nav: Nav, now: Millis) {
        let commands = self.registry.navigate(INSTANCE, nav, now, &mut self.host);
        if commands.is_empty() {
            self.note(format!("{nav:?} dropped"));
        }
        self.apply(&commands, now);
    }

    /// A DOM key name pressed with focus on the carousel.
    pub fn key(&mut self, key: &str, now: Millis) {
        let commands = self.registry.key(INSTANCE, key, now, &mut self.host);
        self.apply(&commands, now);
    }

    pub fn toggle_hover(&mut self, now: Millis) {
        self.hovered = !self.hovered;
        let commands = if self.hovered {
            self.registry.pointer_enter(INSTANCE, now)
        } else {
            self.registry.pointer_leave(INSTANCE, now)
        };
        self.apply(&commands, now);
    }

    pub fn resize(&mut self, width_px: f64, now: Millis) {
        self.host.width_px = width_px;
        self.registry.resize(width_px, now);
    }

    /// Step the decoration's overflow and re-measure as a late image load
    /// would.
    pub fn cycle_overflow(&mut self, now: Millis) {
        let next = OVERFLOW_STEPS_PX
            .iter()
            .position(|&px| px == self.host.overflow_px)
            .map_or(0, |i| (i + 1) % OVERFLOW_STEPS_PX.len());
        self.host.overflow_px = OVERFLOW_STEPS_PX[next];
        for batch in self.registry.window_loaded(&mut self.host) {
            self.apply(&batch.commands, now);
        }
    }

    pub fn reinit(&mut self, now: Millis) -> Result<()> {
        self.moving_until = None;
        self.hovered = false;
        let outcome = self
            .registry
            .reinit(self.root.clone(), now, &mut self.host)?;
        self.note("reinit".into());
        self.adopt(outcome, now)
    }

    pub fn shutdown(&mut self) {
        self.registry.destroy_all(&mut self.host);
    }

    fn adopt(&mut self, outcome: MountOutcome, now: Millis) -> Result<()> {
        let MountOutcome::Mounted(batch) = outcome else {
            bail!("{INSTANCE} was already mounted");
        };
        if let Some(instance) = self.registry.get(INSTANCE) {
            self.scene = Scene::new(instance.slide_count(), instance.looped());
        }
        self.apply(&batch.commands, now);
        Ok(())
    }

    fn apply(&mut self, commands: &[StyleCommand], now: Millis) {
        for command in commands {
            if let StyleCommand::SlideTo {
                track: TrackKind::Image,
                speed_ms,
                ..
            } = command
                && *speed_ms > 0
            {
                self.moving_until = Some(now + u64::from(*speed_ms));
            }
            if !matches!(
                command,
                StyleCommand::SetElement { .. } | StyleCommand::KillTweens { .. }
            ) {
                self.note(format!("{now:>6} {command:?}"));
            }
        }
        self.scene.apply(commands, now);
    }

    fn note(&mut self, line: String) {
        if self.log.len() == LOG_LINES {
            self.log.pop_front();
        }
        self.log.push_back(line);
    }
}
