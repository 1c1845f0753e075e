use serde::Serialize;
use slidesync_protocol::{LifecycleClass, StyleCommand, TrackKind};

use crate::config::EffectiveConfig;
use crate::host::{EngineError, SlideEngine};
use crate::sync::track::Track;

/// Lifecycle of one carousel instance.
///
/// ```text
/// Uninitialized ─begin_init─▶ Initializing ─construct─▶ Ready ◀─┐
///       ▲                          │                      │      │
///       └────────abort_init────────┘           transition_start  transition_end
///                                                          ▼      │
///                                                    Transitioning┘
/// any ─destroy─▶ Destroyed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LifecycleState {
    Uninitialized,
    Initializing,
    Ready,
    Transitioning,
    Destroyed,
}

/// A navigation request from controls, keyboard, pagination, or autoplay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    Next,
    Prev,
    To(usize),
}

impl Nav {
    /// Map a `KeyboardEvent.key` value.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowRight" | "Right" | "PageDown" => Some(Nav::Next),
            "ArrowLeft" | "Left" | "PageUp" => Some(Nav::Prev),
            _ => None,
        }
    }
}

/// Lifecycle notifications consumed by the director and the stabilizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncEvent {
    /// Both tracks are built and aligned on `active`.
    Ready { active: Option<usize> },
    /// The image track started moving; the content track already shows `to`.
    WillChange { from: Option<usize>, to: usize },
    /// The image track came to rest on `active`.
    DidChange { active: usize },
}

/// Output of one controller transition.
#[derive(Debug, Default)]
pub struct Step {
    pub commands: Vec<StyleCommand>,
    pub events: Vec<SyncEvent>,
}

impl Step {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.events.is_empty()
    }
}

/// Owns both tracks of an instance and keeps them on the same slide.
///
/// The image track is the authority. The content track follows with
/// zero-duration jumps issued in the same step as the image track's
/// transition start, so the two never disagree outside that step.
#[derive(Debug)]
pub struct SyncController {
    state: LifecycleState,
    image: Track,
    content: Track,
    speed_ms: u32,
    /// Slide shown at rest.
    active: Option<usize>,
    /// Slide being moved to while transitioning.
    pending: Option<usize>,
    constructed: bool,
}

impl SyncController {
    pub fn new(slide_count: usize, looped: bool, speed_ms: u32) -> Self {
        Self {
            state: LifecycleState::Uninitialized,
            image: Track::new(TrackKind::Image, slide_count, looped),
            content: Track::new(TrackKind::Content, slide_count, looped),
            speed_ms,
            active: (slide_count > 0).then_some(0),
            pending: None,
            constructed: false,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn pending_index(&self) -> Option<usize> {
        self.pending
    }

    pub fn slide_count(&self) -> usize {
        self.image.slide_count()
    }

    pub fn looped(&self) -> bool {
        self.image.looped()
    }

    pub fn image(&self) -> &Track {
        &self.image
    }

    pub fn content(&self) -> &Track {
        &self.content
    }

    pub fn begin_init(&mut self) -> bool {
        if self.state != LifecycleState::Uninitialized {
            return false;
        }
        self.state = LifecycleState::Initializing;
        true
    }

    /// Give up on initialization; the markup stays a static block.
    pub fn abort_init(&mut self) {
        if self.state == LifecycleState::Initializing {
            self.state = LifecycleState::Uninitialized;
        }
    }

    /// Build both tracks on the engine and align the content track.
    ///
    /// On failure any track already built is torn down again and the
    /// controller falls back to `Uninitialized`.
    pub fn construct(
        &mut self,
        instance: &str,
        config: &EffectiveConfig,
        engine: &mut dyn SlideEngine,
    ) -> Result<Step, EngineError> {
        if self.state != LifecycleState::Initializing {
            return Ok(Step::default());
        }

        if let Err(err) = engine.construct(instance, &self.image.spec(config)) {
            self.state = LifecycleState::Uninitialized;
            return Err(err);
        }
        if let Err(err) = engine.construct(instance, &self.content.spec(config)) {
            engine.destroy(instance, TrackKind::Image);
            self.state = LifecycleState::Uninitialized;
            return Err(err);
        }
        self.constructed = true;
        self.state = LifecycleState::Ready;

        let mut step = Step::default();
        if let Some(real) = self.image.logical_index() {
            let target = self.content.internal_for(real);
            self.content.set_internal(target);
            // Raise the speed for the initial jump only, so the fade
            // engine does not flash an intermediate cross-fade.
            step.commands.extend([
                StyleCommand::SetSpeed {
                    track: TrackKind::Content,
                    speed_ms: self.speed_ms,
                },
                StyleCommand::SlideTo {
                    track: TrackKind::Content,
                    index: target,
                    speed_ms: 0,
                },
                StyleCommand::SetSpeed {
                    track: TrackKind::Content,
                    speed_ms: 0,
                },
            ]);
        }
        step.commands.extend(self.interaction(true));
        step.commands.push(StyleCommand::SetLifecycle {
            class: LifecycleClass::Ready,
        });
        step.events.push(SyncEvent::Ready {
            active: self.active,
        });
        tracing::debug!(instance, active = ?self.active, "tracks constructed");
        Ok(step)
    }

    /// Move the image track. Dropped unless the controller is at rest.
    pub fn navigate(&mut self, nav: Nav) -> Option<Step> {
        if self.state != LifecycleState::Ready {
            return None;
        }
        let target = match nav {
            Nav::Next => self.image.step_target(true)?,
            Nav::Prev => self.image.step_target(false)?,
            Nav::To(logical) => {
                if logical >= self.slide_count() || Some(logical) == self.active {
                    return None;
                }
                self.image.target_for(logical)
            }
        };
        let mut step = Step {
            commands: vec![StyleCommand::SlideTo {
                track: TrackKind::Image,
                index: target,
                speed_ms: self.speed_ms,
            }],
            events: Vec::new(),
        };
        let start = self.transition_start(target);
        step.commands.extend(start.commands);
        step.events.extend(start.events);
        Some(step)
    }

    /// The image track began moving towards rendered slide `internal`.
    ///
    /// Engine-originated starts (swipes, the engine's own autoplay) and the
    /// echo of a programmatic [`navigate`](Self::navigate) both arrive here;
    /// the echo is recognised and ignored.
    pub fn transition_start(&mut self, internal: usize) -> Step {
        let target = self.image.logical_of(internal);
        match self.state {
            LifecycleState::Ready => {}
            LifecycleState::Transitioning => {
                if self.pending != Some(target) {
                    tracing::debug!(
                        slide = target,
                        pending = ?self.pending,
                        "transition start dropped mid-transition"
                    );
                }
                return Step::default();
            }
            _ => return Step::default(),
        }
        if self.slide_count() < 2 {
            return Step::default();
        }
        self.image.set_internal(internal);
        if Some(target) == self.active {
            // Snap-back after an abandoned drag.
            return Step::default();
        }

        self.state = LifecycleState::Transitioning;
        self.pending = Some(target);
        let content_target = self.content.target_for(target);
        self.content.set_internal(content_target);

        let mut step = Step::default();
        step.commands.push(StyleCommand::SetLifecycle {
            class: LifecycleClass::Transitioning,
        });
        step.commands.extend(self.interaction(false));
        step.commands.push(StyleCommand::SlideTo {
            track: TrackKind::Content,
            index: content_target,
            speed_ms: 0,
        });
        step.events.push(SyncEvent::WillChange {
            from: self.active,
            to: target,
        });
        step
    }

    /// The image track came to rest.
    ///
    /// Interaction stays disabled; the caller re-enables it with
    /// [`unlock_interaction`](Self::unlock_interaction) once the reveal
    /// has settled.
    pub fn transition_end(&mut self) -> Step {
        if self.state != LifecycleState::Transitioning {
            return Step::default();
        }
        self.state = LifecycleState::Ready;
        let active = self.image.logical_index().unwrap_or_default();
        self.active = Some(active);
        self.pending = None;

        let mut step = Step::default();
        for track in [&mut self.image, &mut self.content] {
            if let Some(home) = track.recentre() {
                step.commands.push(StyleCommand::SlideTo {
                    track: track.kind(),
                    index: home,
                    speed_ms: 0,
                });
            }
        }
        step.commands.push(StyleCommand::SetLifecycle {
            class: LifecycleClass::Ready,
        });
        step.events.push(SyncEvent::DidChange { active });
        step
    }

    pub fn unlock_interaction(&mut self) -> Vec<StyleCommand> {
        if self.state != LifecycleState::Ready {
            return Vec::new();
        }
        self.interaction(true)
    }

    pub fn destroy(&mut self, instance: &str, engine: &mut dyn SlideEngine) {
        if self.constructed {
            engine.destroy(instance, TrackKind::Content);
            engine.destroy(instance, TrackKind::Image);
            self.constructed = false;
        }
        self.pending = None;
        self.state = LifecycleState::Destroyed;
    }

    /// Swiping is an image track concern; the content track is never
    /// draggable and only has its clicks locked.
    fn interaction(&self, enabled: bool) -> Vec<StyleCommand> {
        vec![
            StyleCommand::SetInteraction {
                track: TrackKind::Image,
                enabled: enabled && self.slide_count() > 1,
            },
            StyleCommand::SetPointerEvents {
                track: TrackKind::Content,
                enabled,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CarouselOptions;
    use crate::device::{PerformanceTier, adapt};

    #[derive(Default)]
    struct Engine {
        fail_on: Option<TrackKind>,
        built: Vec<TrackKind>,
        destroyed: Vec<TrackKind>,
    }

    impl SlideEngine for Engine {
        fn is_loaded(&self) -> bool {
            true
        }

        fn construct(
            &mut self,
            _: &str,
            spec: &crate::sync::TrackSpec,
        ) -> Result<(), EngineError> {
            if self.fail_on == Some(spec.kind) {
                return Err(EngineError::Construct {
                    track: spec.kind,
                    message: "boom".into(),
                });
            }
            self.built.push(spec.kind);
            Ok(())
        }

        fn destroy(&mut self, _: &str, track: TrackKind) {
            self.destroyed.push(track);
        }
    }

    fn ready(slide_count: usize, looped: bool) -> SyncController {
        let config = adapt(&CarouselOptions::default(), PerformanceTier::Full);
        let mut ctl = SyncController::new(slide_count, looped, config.speed_ms);
        assert!(ctl.begin_init());
        ctl.construct("c", &config, &mut Engine::default()).unwrap();
        ctl
    }

    #[test]
    fn construct_aligns_content_with_a_momentary_speed_bump() {
        let config = adapt(&CarouselOptions::default(), PerformanceTier::Full);
        let mut ctl = SyncController::new(3, true, config.speed_ms);
        ctl.begin_init();
        let step = ctl.construct("c", &config, &mut Engine::default()).unwrap();
        assert_eq!(
            &step.commands[..3],
            &[
                StyleCommand::SetSpeed {
                    track: TrackKind::Content,
                    speed_ms: 500
                },
                StyleCommand::SlideTo {
                    track: TrackKind::Content,
                    index: 3,
                    speed_ms: 0
                },
                StyleCommand::SetSpeed {
                    track: TrackKind::Content,
                    speed_ms: 0
                },
            ]
        );
        assert_eq!(step.events, vec![SyncEvent::Ready { active: Some(0) }]);
        assert_eq!(ctl.state(), LifecycleState::Ready);
    }

    #[test]
    fn content_failure_tears_down_image_track() {
        let config = adapt(&CarouselOptions::default(), PerformanceTier::Full);
        let mut ctl = SyncController::new(3, true, config.speed_ms);
        ctl.begin_init();
        let mut engine = Engine {
            fail_on: Some(TrackKind::Content),
            ..Engine::default()
        };
        assert!(ctl.construct("c", &config, &mut engine).is_err());
        assert_eq!(ctl.state(), LifecycleState::Uninitialized);
        assert_eq!(engine.built, vec![TrackKind::Image]);
        assert_eq!(engine.destroyed, vec![TrackKind::Image]);
    }

    #[test]
    fn transition_start_jumps_content_in_the_same_step() {
        let mut ctl = ready(3, true);
        let step = ctl.navigate(Nav::Next).unwrap();
        assert_eq!(ctl.state(), LifecycleState::Transitioning);
        assert!(step.commands.contains(&StyleCommand::SlideTo {
            track: TrackKind::Content,
            index: 4,
            speed_ms: 0
        }));
        assert_eq!(ctl.content().logical_index(), Some(1));
        assert_eq!(
            step.events,
            vec![SyncEvent::WillChange {
                from: Some(0),
                to: 1
            }]
        );
    }

    #[test]
    fn navigation_is_dropped_while_transitioning() {
        let mut ctl = ready(3, true);
        ctl.navigate(Nav::Next).unwrap();
        assert!(ctl.navigate(Nav::Next).is_none());
        assert!(ctl.navigate(Nav::Prev).is_none());
        assert_eq!(ctl.pending_index(), Some(1));
    }

    #[test]
    fn echoed_start_is_ignored() {
        let mut ctl = ready(3, true);
        ctl.navigate(Nav::Next).unwrap();
        assert!(ctl.transition_start(4).is_empty());
    }

    #[test]
    fn end_recentres_both_tracks_after_wrap() {
        let mut ctl = ready(3, true);
        ctl.navigate(Nav::Prev).unwrap();
        let step = ctl.transition_end();
        assert_eq!(ctl.active_index(), Some(2));
        assert_eq!(ctl.image().internal_index(), 5);
        assert_eq!(ctl.content().internal_index(), 5);
        assert!(step.commands.contains(&StyleCommand::SlideTo {
            track: TrackKind::Image,
            index: 5,
            speed_ms: 0
        }));
        assert_eq!(step.events, vec![SyncEvent::DidChange { active: 2 }]);
    }

    #[test]
    fn interaction_waits_for_unlock() {
        let mut ctl = ready(3, true);
        ctl.navigate(Nav::Next).unwrap();
        let end = ctl.transition_end();
        assert!(!end.commands.iter().any(|c| matches!(
            c,
            StyleCommand::SetInteraction { enabled: true, .. }
        )));
        let unlock = ctl.unlock_interaction();
        assert_eq!(
            unlock,
            vec![
                StyleCommand::SetInteraction {
                    track: TrackKind::Image,
                    enabled: true
                },
                StyleCommand::SetPointerEvents {
                    track: TrackKind::Content,
                    enabled: true
                },
            ]
        );
    }

    #[test]
    fn content_track_is_never_made_draggable() {
        let mut ctl = ready(3, true);
        let mut commands = ctl.navigate(Nav::Next).unwrap().commands;
        commands.extend(ctl.transition_end().commands);
        commands.extend(ctl.unlock_interaction());
        assert!(!commands.iter().any(|c| matches!(
            c,
            StyleCommand::SetInteraction {
                track: TrackKind::Content,
                ..
            }
        )));
        assert!(commands.contains(&StyleCommand::SetPointerEvents {
            track: TrackKind::Content,
            enabled: false
        }));
    }

    #[test]
    fn goto_current_slide_is_a_no_op() {
        let mut ctl = ready(4, false);
        assert!(ctl.navigate(Nav::To(0)).is_none());
        assert!(ctl.navigate(Nav::To(9)).is_none());
        assert!(ctl.navigate(Nav::To(3)).is_some());
    }

    #[test]
    fn single_slide_never_transitions() {
        let mut ctl = ready(1, false);
        assert!(ctl.navigate(Nav::Next).is_none());
        assert!(ctl.navigate(Nav::Prev).is_none());
        assert!(ctl.transition_start(0).is_empty());
        assert_eq!(ctl.state(), LifecycleState::Ready);
    }

    #[test]
    fn snap_back_does_not_transition() {
        let mut ctl = ready(3, false);
        assert!(ctl.transition_start(0).is_empty());
        assert_eq!(ctl.state(), LifecycleState::Ready);
    }

    #[test]
    fn destroy_releases_engine_tracks_once() {
        let config = adapt(&CarouselOptions::default(), PerformanceTier::Full);
        let mut engine = Engine::default();
        let mut ctl = SyncController::new(2, true, config.speed_ms);
        ctl.begin_init();
        ctl.construct("c", &config, &mut engine).unwrap();
        ctl.destroy("c", &mut engine);
        ctl.destroy("c", &mut engine);
        assert_eq!(engine.destroyed.len(), 2);
        assert_eq!(ctl.state(), LifecycleState::Destroyed);
    }

    #[test]
    fn key_mapping() {
        assert_eq!(Nav::from_key("ArrowRight"), Some(Nav::Next));
        assert_eq!(Nav::from_key("ArrowLeft"), Some(Nav::Prev));
        assert_eq!(Nav::from_key("Enter"), None);
    }
}
