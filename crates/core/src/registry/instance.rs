use slidesync_protocol::{LifecycleClass, Millis, Pagination, StyleCommand};

use crate::config::{EffectiveConfig, PaginationType, loop_enabled, resolve_options};
use crate::device::{PerformanceTier, adapt};
use crate::director::AnimationDirector;
use crate::host::{Host, MarkupRoot};
use crate::registry::MountError;
use crate::registry::timer::{Timer, Timers};
use crate::stabilizer::{LayoutStabilizer, RESIZE_DEBOUNCE_MS, SETTLE_DELAY_MS};
use crate::sync::{LifecycleState, Nav, Step, SyncController, SyncEvent};

/// Interval between checks for the slide engine library.
pub const ENGINE_POLL_INTERVAL_MS: u64 = 100;
/// Checks before an instance gives up and stays static.
pub const MAX_ENGINE_POLLS: u32 = 50;
/// Added to the reveal duration before interaction is re-enabled.
const UNLOCK_SETTLE_MS: u64 = 100;
/// Grace period past the transition speed before the watchdog fires.
const WATCHDOG_MARGIN_MS: u64 = 300;

/// One carousel on the page: controller, director, stabilizer, and the
/// timers that drive them.
#[derive(Debug)]
pub struct CarouselInstance {
    id: String,
    config: EffectiveConfig,
    options_error: Option<String>,
    has_navigation: bool,
    has_pagination: bool,
    sync: SyncController,
    director: Option<AnimationDirector>,
    stabilizer: LayoutStabilizer,
    timers: Timers,
    engine_polls: u32,
    hovered: bool,
    autoplay_running: bool,
}

impl CarouselInstance {
    pub(crate) fn new(
        markup: MarkupRoot,
        tier: PerformanceTier,
        now: Millis,
    ) -> Result<(Self, Vec<StyleCommand>), MountError> {
        let image_slides = markup.image_slides.ok_or(MountError::MissingImageTrack)?;
        let content_slides = markup
            .content_slides
            .ok_or(MountError::MissingContentTrack)?;
        if content_slides.len() != image_slides {
            return Err(MountError::SlideCountMismatch {
                image: image_slides,
                content: content_slides.len(),
            });
        }

        let (options, options_error) = resolve_options(markup.options.as_deref(), &markup.id);
        let config = adapt(&options, tier);
        let looped = loop_enabled(image_slides, config.infinite);

        let mut sync = SyncController::new(image_slides, looped, config.speed_ms);
        sync.begin_init();
        let director = config
            .animations
            .map(|animations| AnimationDirector::new(content_slides, animations));

        let mut timers = Timers::default();
        timers.arm(Timer::Init, now + u64::from(config.init_delay_ms));

        tracing::info!(
            instance = %markup.id,
            slides = image_slides,
            looped,
            ?tier,
            "carousel registered"
        );

        let instance = Self {
            id: markup.id,
            config,
            options_error: options_error.map(|e| e.to_string()),
            has_navigation: markup.has_navigation,
            has_pagination: markup.has_pagination,
            sync,
            director,
            stabilizer: LayoutStabilizer::new(markup.has_spacer),
            timers,
            engine_polls: 0,
            hovered: false,
            autoplay_running: false,
        };
        let commands = vec![
            StyleCommand::SetLifecycle {
                class: LifecycleClass::Initializing,
            },
            StyleCommand::ObserveMutations {
                enabled: instance.config.observe_mutations,
            },
        ];
        Ok((instance, commands))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> LifecycleState {
        self.sync.state()
    }

    /// The slide both tracks show at rest.
    pub fn active_index(&self) -> Option<usize> {
        self.sync.active_index()
    }

    pub fn slide_count(&self) -> usize {
        self.sync.slide_count()
    }

    pub fn looped(&self) -> bool {
        self.sync.looped()
    }

    pub fn config(&self) -> &EffectiveConfig {
        &self.config
    }

    /// The diagnostic from a malformed `data-options`, if any.
    pub fn options_error(&self) -> Option<&str> {
        self.options_error.as_deref()
    }

    pub fn controller(&self) -> &SyncController {
        &self.sync
    }

    pub fn spacer_height(&self) -> Option<f64> {
        self.stabilizer.height()
    }

    pub fn next_deadline(&self) -> Option<Millis> {
        self.timers.next_due()
    }

    pub fn is_autoplaying(&self) -> bool {
        self.autoplay_running
    }

    /// Whether the host should watch the root for re-rendered markup.
    pub fn observes_mutations(&self) -> bool {
        self.config.observe_mutations
    }

    pub(crate) fn tick<H: Host>(&mut self, now: Millis, host: &mut H) -> Vec<StyleCommand> {
        let mut out = Vec::new();
        while let Some(timer) = self.timers.take_due(now) {
            self.fire(timer, now, host, &mut out);
        }
        out
    }

    pub(crate) fn navigate<H: Host>(
        &mut self,
        nav: Nav,
        now: Millis,
        host: &mut H,
    ) -> Vec<StyleCommand> {
        let mut out = Vec::new();
        match self.sync.navigate(nav) {
            Some(step) => self.apply(step, now, host, &mut out),
            None => tracing::debug!(
                instance = %self.id,
                ?nav,
                state = ?self.state(),
                "navigation dropped"
            ),
        }
        out
    }

    /// Keyboard input, honoured only when the markup carries navigation
    /// controls.
    pub(crate) fn key<H: Host>(
        &mut self,
        key: &str,
        now: Millis,
        host: &mut H,
    ) -> Vec<StyleCommand> {
        if !self.has_navigation {
            return Vec::new();
        }
        match Nav::from_key(key) {
            Some(nav) => self.navigate(nav, now, host),
            None => Vec::new(),
        }
    }

    pub(crate) fn transition_start<H: Host>(
        &mut self,
        internal: usize,
        now: Millis,
        host: &mut H,
    ) -> Vec<StyleCommand> {
        let mut out = Vec::new();
        let step = self.sync.transition_start(internal);
        self.apply(step, now, host, &mut out);
        out
    }

    pub(crate) fn transition_end<H: Host>(
        &mut self,
        now: Millis,
        host: &mut H,
    ) -> Vec<StyleCommand> {
        let mut out = Vec::new();
        let step = self.sync.transition_end();
        self.apply(step, now, host, &mut out);
        out
    }

    pub(crate) fn pointer(&mut self, inside: bool, now: Millis) -> Vec<StyleCommand> {
        self.hovered = inside;
        let pauses = self.config.autoplay.is_some_and(|a| a.pause_on_hover);
        if !pauses {
            return Vec::new();
        }
        if inside {
            self.timers.cancel(Timer::Autoplay);
            if !self.autoplay_running {
                return Vec::new();
            }
            self.autoplay_running = false;
            vec![StyleCommand::SetAutoplay { running: false }]
        } else if self.state() == LifecycleState::Ready {
            let mut out = Vec::new();
            self.schedule_autoplay(now, &mut out);
            out
        } else {
            Vec::new()
        }
    }

    pub(crate) fn resize(&mut self, viewport_width: f64, now: Millis) {
        if self.stabilizer.width_changed(viewport_width) {
            self.timers.arm(Timer::Resize, now + RESIZE_DEBOUNCE_MS);
        }
    }

    pub(crate) fn window_loaded<H: Host>(&mut self, host: &mut H) -> Vec<StyleCommand> {
        if !self.is_running() {
            return Vec::new();
        }
        self.stabilizer.recompute(host.measure(&self.id).as_ref())
    }

    pub(crate) fn destroy<H: Host>(&mut self, host: &mut H) {
        self.timers.clear();
        self.autoplay_running = false;
        self.sync.destroy(&self.id, host);
        if let Some(director) = &mut self.director {
            director.reset();
        }
        tracing::info!(instance = %self.id, "carousel destroyed");
    }

    fn is_running(&self) -> bool {
        matches!(
            self.state(),
            LifecycleState::Ready | LifecycleState::Transitioning
        )
    }

    fn fire<H: Host>(
        &mut self,
        timer: Timer,
        now: Millis,
        host: &mut H,
        out: &mut Vec<StyleCommand>,
    ) {
        match timer {
            Timer::Init => self.try_construct(now, host, out),
            Timer::Autoplay => {
                if self.state() != LifecycleState::Ready {
                    return;
                }
                let at_end = !self.looped()
                    && self.active_index() == Some(self.slide_count().saturating_sub(1));
                let nav = if at_end { Nav::To(0) } else { Nav::Next };
                match self.sync.navigate(nav) {
                    Some(step) => self.apply(step, now, host, out),
                    None => self.schedule_autoplay(now, out),
                }
            }
            Timer::Unlock => out.extend(self.sync.unlock_interaction()),
            Timer::Watchdog => {
                tracing::debug!(instance = %self.id, "engine never reported transition end");
                let step = self.sync.transition_end();
                self.apply(step, now, host, out);
            }
            Timer::Settle | Timer::Resize => {
                if self.is_running() {
                    out.extend(self.stabilizer.recompute(host.measure(&self.id).as_ref()));
                }
            }
        }
    }

    fn try_construct<H: Host>(
        &mut self,
        now: Millis,
        host: &mut H,
        out: &mut Vec<StyleCommand>,
    ) {
        if self.state() != LifecycleState::Initializing {
            return;
        }
        if !host.is_loaded() {
            self.engine_polls += 1;
            if self.engine_polls >= MAX_ENGINE_POLLS {
                tracing::warn!(
                    instance = %self.id,
                    polls = self.engine_polls,
                    "slide engine never loaded, leaving carousel static"
                );
                self.sync.abort_init();
            } else {
                self.timers.arm(Timer::Init, now + ENGINE_POLL_INTERVAL_MS);
            }
            return;
        }
        match self.sync.construct(&self.id, &self.config, host) {
            Ok(step) => self.apply(step, now, host, out),
            Err(err) => {
                tracing::warn!(instance = %self.id, error = %err, "carousel initialization failed");
            }
        }
    }

    fn apply<H: Host>(
        &mut self,
        step: Step,
        now: Millis,
        host: &mut H,
        out: &mut Vec<StyleCommand>,
    ) {
        out.extend(step.commands);
        for event in step.events {
            tracing::debug!(instance = %self.id, ?event, "sync event");
            match event {
                SyncEvent::Ready { active } => {
                    if let Some(director) = &mut self.director {
                        out.extend(director.pre_initialize(active));
                        if let Some(active) = active {
                            out.extend(director.slide_did_change(active));
                        }
                    }
                    out.extend(self.pagination(active));
                    out.extend(self.stabilizer.recompute(host.measure(&self.id).as_ref()));
                    self.schedule_autoplay(now, out);
                }
                SyncEvent::WillChange { to, .. } => {
                    self.timers.cancel(Timer::Autoplay);
                    self.timers.cancel(Timer::Unlock);
                    self.timers.arm(
                        Timer::Watchdog,
                        now + u64::from(self.config.speed_ms) + WATCHDOG_MARGIN_MS,
                    );
                    if let Some(director) = &mut self.director {
                        out.extend(director.slide_will_change(to));
                    }
                    out.extend(self.pagination(Some(to)));
                }
                SyncEvent::DidChange { active } => {
                    self.timers.cancel(Timer::Watchdog);
                    if let Some(director) = &mut self.director {
                        out.extend(director.slide_did_change(active));
                    }
                    self.timers.arm(Timer::Unlock, now + self.unlock_delay_ms());
                    self.timers.arm(Timer::Settle, now + SETTLE_DELAY_MS);
                    self.schedule_autoplay(now, out);
                }
            }
        }
    }

    fn unlock_delay_ms(&self) -> u64 {
        let reveal = self.config.animations.map_or(0, |a| a.duration_ms);
        u64::from(reveal) + UNLOCK_SETTLE_MS
    }

    fn schedule_autoplay(&mut self, now: Millis, out: &mut Vec<StyleCommand>) {
        let Some(autoplay) = self.config.autoplay else {
            return;
        };
        if self.slide_count() < 2 || (autoplay.pause_on_hover && self.hovered) {
            return;
        }
        self.timers
            .arm(Timer::Autoplay, now + u64::from(autoplay.delay_ms));
        if !self.autoplay_running {
            self.autoplay_running = true;
            out.push(StyleCommand::SetAutoplay { running: true });
        }
    }

    fn pagination(&self, active: Option<usize>) -> Option<StyleCommand> {
        if !self.has_pagination {
            return None;
        }
        let active = active?;
        let total = self.slide_count();
        let pagination = match self.config.pagination {
            PaginationType::Bullets => Pagination::Bullets { active },
            PaginationType::Fraction => Pagination::Fraction {
                label: format!("{} / {}", active + 1, total),
            },
            PaginationType::Progressbar => Pagination::Progress {
                fraction: (active + 1) as f64 / total as f64,
            },
        };
        Some(StyleCommand::SetPagination(pagination))
    }
}
