//! Entrance choreography for content slides.

use slidesync_protocol::{Ease, ElementRole, ElementStyle, Point, StyleCommand};

use crate::config::Animations;
use crate::host::SlideMarkup;

/// Block-axis offset of headings, body copy, and controls while hidden.
const BLOCK_OFFSET_PX: f64 = 20.0;
const BREADCRUMB_OFFSET_PX: f64 = 15.0;
const BACK_LINK_OFFSET_PX: f64 = 15.0;
/// Breadcrumbs animate over a fraction of the base duration.
const SHORT_STEP_FACTOR: f64 = 0.6;
/// Each step starts this fraction of the base duration before the
/// previous one ends.
const STEP_OVERLAP_FACTOR: f64 = 0.5;
const REVEAL_EASE: Ease = Ease::Power2Out;

/// Where an element of `role` waits before its reveal.
pub fn hidden_style(role: ElementRole) -> ElementStyle {
    let offset = match role {
        ElementRole::BreadcrumbAbove => Point::new(0.0, -BREADCRUMB_OFFSET_PX),
        ElementRole::BreadcrumbBelow => Point::new(0.0, BREADCRUMB_OFFSET_PX),
        ElementRole::BackLink => Point::new(-BACK_LINK_OFFSET_PX, 0.0),
        ElementRole::Heading
        | ElementRole::Description
        | ElementRole::PublicationDate
        | ElementRole::Buttons
        | ElementRole::Navigation => Point::new(0.0, BLOCK_OFFSET_PX),
    };
    ElementStyle::hidden_at(offset)
}

fn duration_factor(role: ElementRole) -> f64 {
    match role {
        ElementRole::BreadcrumbAbove | ElementRole::BreadcrumbBelow => SHORT_STEP_FACTOR,
        _ => 1.0,
    }
}

/// One tween of a reveal timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineStep {
    pub role: ElementRole,
    pub delay_ms: u32,
    pub duration_ms: u32,
}

impl TimelineStep {
    pub fn end_ms(&self) -> u32 {
        self.delay_ms + self.duration_ms
    }
}

/// Hides, resets, and reveals the sub-elements of content slides.
///
/// Only ever invoked when animations are enabled; otherwise content keeps
/// its authored, fully visible state.
#[derive(Debug)]
pub struct AnimationDirector {
    slides: Vec<SlideMarkup>,
    duration_ms: u32,
    replay: bool,
    /// Slides that have played their reveal at least once.
    seen: Vec<bool>,
    containers: Vec<bool>,
}

impl AnimationDirector {
    pub fn new(slides: Vec<SlideMarkup>, animations: Animations) -> Self {
        let count = slides.len();
        Self {
            slides,
            duration_ms: animations.duration_ms,
            replay: animations.replay,
            seen: vec![false; count],
            containers: vec![true; count],
        }
    }

    pub fn has_seen(&self, slide: usize) -> bool {
        self.seen.get(slide).copied().unwrap_or(false)
    }

    /// Hide every animatable element and show only the active container.
    pub fn pre_initialize(&mut self, active: Option<usize>) -> Vec<StyleCommand> {
        let mut commands = Vec::new();
        for slide in 0..self.slides.len() {
            self.push_reset(slide, &mut commands);
            self.push_container(slide, Some(slide) == active, &mut commands);
        }
        commands
    }

    /// Reset every slide and pre-reveal `target`'s container with its
    /// children still hidden. The outgoing container stays up until
    /// [`slide_did_change`](Self::slide_did_change).
    pub fn slide_will_change(&mut self, target: usize) -> Vec<StyleCommand> {
        let mut commands = Vec::new();
        for slide in 0..self.slides.len() {
            self.push_reset(slide, &mut commands);
        }
        self.push_container(target, true, &mut commands);
        commands
    }

    /// Reveal `active` and hide every other container.
    pub fn slide_did_change(&mut self, active: usize) -> Vec<StyleCommand> {
        let mut commands = Vec::new();
        if active >= self.slides.len() {
            return commands;
        }
        for slide in 0..self.slides.len() {
            self.push_container(slide, slide == active, &mut commands);
        }
        commands.push(StyleCommand::KillTweens { slide: active });

        if self.seen[active] && !self.replay {
            for &role in &self.slides[active].roles {
                commands.push(StyleCommand::SetElement {
                    slide: active,
                    role,
                    style: ElementStyle::SHOWN,
                });
            }
        } else {
            for step in self.timeline(active) {
                commands.push(StyleCommand::Tween {
                    slide: active,
                    role: step.role,
                    from: hidden_style(step.role),
                    to: ElementStyle::SHOWN,
                    delay_ms: step.delay_ms,
                    duration_ms: step.duration_ms,
                    ease: REVEAL_EASE,
                });
            }
        }
        self.seen[active] = true;
        commands
    }

    /// The cascading reveal for `slide`, skipping roles it does not have.
    pub fn timeline(&self, slide: usize) -> Vec<TimelineStep> {
        let Some(markup) = self.slides.get(slide) else {
            return Vec::new();
        };
        let base = f64::from(self.duration_ms);
        let overlap = base * STEP_OVERLAP_FACTOR;

        let mut steps: Vec<TimelineStep> = Vec::new();
        let mut previous: Option<(f64, f64)> = None;
        for role in ElementRole::ALL {
            if !markup.has(role) {
                continue;
            }
            let duration = base * duration_factor(role);
            let start = match previous {
                None => 0.0,
                Some((start, end)) => (end - overlap).max(start),
            };
            previous = Some((start, start + duration));
            steps.push(TimelineStep {
                role,
                delay_ms: start.round() as u32,
                duration_ms: duration.round() as u32,
            });
        }
        steps
    }

    /// Forget which slides were seen. Called on teardown.
    pub fn reset(&mut self) {
        self.seen.fill(false);
    }

    fn push_reset(&self, slide: usize, commands: &mut Vec<StyleCommand>) {
        commands.push(StyleCommand::KillTweens { slide });
        for &role in &self.slides[slide].roles {
            commands.push(StyleCommand::SetElement {
                slide,
                role,
                style: hidden_style(role),
            });
        }
    }

    fn push_container(&mut self, slide: usize, visible: bool, commands: &mut Vec<StyleCommand>) {
        if let Some(current) = self.containers.get_mut(slide)
            && *current != visible
        {
            *current = visible;
            commands.push(StyleCommand::SetContainerVisible { slide, visible });
        }
    }
}
