//! A reference projection of style commands onto element state.
//!
//! Browser hosts apply commands to real elements; `Scene` applies them to
//! plain data so the synchronizer can be exercised without a DOM.

use std::collections::BTreeMap;

use slidesync_protocol::{
    Ease, ElementRole, ElementStyle, LifecycleClass, Millis, Pagination, StyleCommand, TrackKind,
};

use crate::sync::Track;

#[derive(Debug, Clone, Copy)]
struct Tween {
    from: ElementStyle,
    to: ElementStyle,
    start: Millis,
    duration_ms: u32,
    ease: Ease,
}

impl Tween {
    fn sample(&self, now: Millis) -> ElementStyle {
        if now < self.start {
            return self.from;
        }
        if self.duration_ms == 0 {
            return self.to;
        }
        let t = (now - self.start) as f64 / f64::from(self.duration_ms);
        self.from.lerp(self.to, self.ease.sample(t))
    }

    fn finished(&self, now: Millis) -> bool {
        now >= self.start + u64::from(self.duration_ms)
    }
}

#[derive(Debug, Clone, Copy)]
struct Element {
    style: ElementStyle,
    tween: Option<Tween>,
}

#[derive(Debug, Clone)]
struct TrackView {
    track: Track,
    speed_ms: u32,
    interactive: bool,
    clickable: bool,
}

/// Element state of one instance as the host would render it.
///
/// Elements never touched by a command keep their authored, fully visible
/// style, like markup without any script applied.
#[derive(Debug, Clone)]
pub struct Scene {
    image: TrackView,
    content: TrackView,
    containers: Vec<bool>,
    elements: BTreeMap<(usize, ElementRole), Element>,
    lifecycle: Option<LifecycleClass>,
    pagination: Option<Pagination>,
    autoplay: bool,
    observe_mutations: Option<bool>,
    spacers: usize,
    spacer_height: Option<f64>,
    tweens_started: usize,
}

impl Scene {
    pub fn new(slide_count: usize, looped: bool) -> Self {
        let view = |kind| TrackView {
            track: Track::new(kind, slide_count, looped),
            speed_ms: 0,
            interactive: false,
            clickable: true,
        };
        Self {
            image: view(TrackKind::Image),
            content: view(TrackKind::Content),
            containers: vec![true; slide_count],
            elements: BTreeMap::new(),
            lifecycle: None,
            pagination: None,
            autoplay: false,
            observe_mutations: None,
            spacers: 0,
            spacer_height: None,
            tweens_started: 0,
        }
    }

    /// Apply `commands` in order at host time `now`.
    pub fn apply(&mut self, commands: &[StyleCommand], now: Millis) {
        for command in commands {
            self.apply_one(command, now);
        }
    }

    fn apply_one(&mut self, command: &StyleCommand, now: Millis) {
        match command {
            StyleCommand::SlideTo { track, index, .. } => {
                self.track_mut(*track).track.set_internal(*index);
            }
            StyleCommand::SetSpeed { track, speed_ms } => {
                self.track_mut(*track).speed_ms = *speed_ms;
            }
            StyleCommand::SetInteraction { track, enabled } => {
                self.track_mut(*track).interactive = *enabled;
            }
            StyleCommand::SetPointerEvents { track, enabled } => {
                self.track_mut(*track).clickable = *enabled;
            }
            StyleCommand::ObserveMutations { enabled } => self.observe_mutations = Some(*enabled),
            StyleCommand::SetAutoplay { running } => self.autoplay = *running,
            StyleCommand::SetLifecycle { class } => self.lifecycle = Some(*class),
            StyleCommand::SetContainerVisible { slide, visible } => {
                if let Some(container) = self.containers.get_mut(*slide) {
                    *container = *visible;
                }
            }
            StyleCommand::SetElement { slide, role, style } => {
                let element = self.element_mut(*slide, *role);
                element.style = *style;
                element.tween = None;
            }
            StyleCommand::Tween {
                slide,
                role,
                from,
                to,
                delay_ms,
                duration_ms,
                ease,
            } => {
                let element = self.element_mut(*slide, *role);
                element.style = *from;
                element.tween = Some(Tween {
                    from: *from,
                    to: *to,
                    start: now + u64::from(*delay_ms),
                    duration_ms: *duration_ms,
                    ease: *ease,
                });
                self.tweens_started += 1;
            }
            StyleCommand::KillTweens { slide } => {
                // A killed tween freezes wherever it had got to.
                for ((s, _), element) in self.elements.iter_mut() {
                    if *s == *slide
                        && let Some(tween) = element.tween.take()
                    {
                        element.style = tween.sample(now);
                    }
                }
            }
            StyleCommand::SetPagination(pagination) => self.pagination = Some(pagination.clone()),
            StyleCommand::CreateSpacer => self.spacers += 1,
            StyleCommand::SetSpacerHeight { height } => self.spacer_height = Some(*height),
        }
    }

    fn track_mut(&mut self, kind: TrackKind) -> &mut TrackView {
        match kind {
            TrackKind::Image => &mut self.image,
            TrackKind::Content => &mut self.content,
        }
    }

    fn element_mut(&mut self, slide: usize, role: ElementRole) -> &mut Element {
        self.elements.entry((slide, role)).or_insert(Element {
            style: ElementStyle::SHOWN,
            tween: None,
        })
    }

    /// Logical slide the image track shows.
    pub fn image_slide(&self) -> Option<usize> {
        self.image.track.logical_index()
    }

    /// Logical slide the content track shows.
    pub fn content_slide(&self) -> Option<usize> {
        self.content.track.logical_index()
    }

    pub fn image_internal(&self) -> usize {
        self.image.track.internal_index()
    }

    pub fn speed(&self, track: TrackKind) -> u32 {
        match track {
            TrackKind::Image => self.image.speed_ms,
            TrackKind::Content => self.content.speed_ms,
        }
    }

    pub fn interactive(&self, track: TrackKind) -> bool {
        match track {
            TrackKind::Image => self.image.interactive,
            TrackKind::Content => self.content.interactive,
        }
    }

    /// Whether a track's slides accept clicks.
    pub fn clickable(&self, track: TrackKind) -> bool {
        match track {
            TrackKind::Image => self.image.clickable,
            TrackKind::Content => self.content.clickable,
        }
    }

    pub fn observe_mutations(&self) -> Option<bool> {
        self.observe_mutations
    }

    pub fn container_visible(&self, slide: usize) -> bool {
        self.containers.get(slide).copied().unwrap_or(false)
    }

    /// Content slides a viewer can see: the content track's current slide,
    /// provided its container is shown.
    pub fn visible_content_slides(&self) -> Vec<usize> {
        self.content_slide()
            .filter(|&slide| self.container_visible(slide))
            .into_iter()
            .collect()
    }

    pub fn visible_containers(&self) -> Vec<usize> {
        (0..self.containers.len())
            .filter(|&slide| self.containers[slide])
            .collect()
    }

    /// Sampled style of an element at `now`.
    pub fn element(&self, slide: usize, role: ElementRole, now: Millis) -> ElementStyle {
        self.elements
            .get(&(slide, role))
            .map_or(ElementStyle::SHOWN, |element| match element.tween {
                Some(tween) => tween.sample(now),
                None => element.style,
            })
    }

    /// Whether any element of `slide` is still moving at `now`.
    pub fn animating(&self, slide: usize, now: Millis) -> bool {
        self.elements
            .iter()
            .any(|((s, _), e)| *s == slide && e.tween.is_some_and(|t| !t.finished(now)))
    }

    pub fn lifecycle(&self) -> Option<LifecycleClass> {
        self.lifecycle
    }

    pub fn pagination(&self) -> Option<&Pagination> {
        self.pagination.as_ref()
    }

    pub fn autoplay(&self) -> bool {
        self.autoplay
    }

    /// How many spacers were created.
    pub fn spacers(&self) -> usize {
        self.spacers
    }

    pub fn spacer_height(&self) -> Option<f64> {
        self.spacer_height
    }

    pub fn tweens_started(&self) -> usize {
        self.tweens_started
    }
}
