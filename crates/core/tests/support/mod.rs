//! Fake host and a clock-driven harness shared by the scenario tests.

#![allow(dead_code)]

use std::collections::BTreeMap;

use slidesync_core::host::{Anchor, EngineError, Overlay};
use slidesync_core::sync::TrackSpec;
use slidesync_core::{
    Batch, DeviceProfile, LayoutProbe, LayoutSnapshot, MarkupRoot, MountError, MountOutcome, Nav,
    Registry, Scene, SlideEngine, SlideMarkup,
};
use slidesync_protocol::{ElementRole, Millis, Rect, StyleCommand, TrackKind};

#[derive(Debug, Default)]
pub struct FakeHost {
    pub loaded: bool,
    /// Instance whose content track construction throws.
    pub fail_for: Option<String>,
    pub constructed: Vec<(String, TrackSpec)>,
    pub destroyed: Vec<(String, TrackKind)>,
    pub layouts: BTreeMap<String, LayoutSnapshot>,
}

impl SlideEngine for FakeHost {
    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn construct(&mut self, instance: &str, spec: &TrackSpec) -> Result<(), EngineError> {
        if self.fail_for.as_deref() == Some(instance) && spec.kind == TrackKind::Content {
            return Err(EngineError::Construct {
                track: spec.kind,
                message: "effect module missing".into(),
            });
        }
        self.constructed.push((instance.to_owned(), spec.clone()));
        Ok(())
    }

    fn destroy(&mut self, instance: &str, track: TrackKind) {
        self.destroyed.push((instance.to_owned(), track));
    }
}

impl LayoutProbe for FakeHost {
    fn measure(&self, instance: &str) -> Option<LayoutSnapshot> {
        self.layouts.get(instance).cloned()
    }
}

/// A carousel 600px tall at the top of a `width`-wide page, with one
/// bottom-centred overlay reaching `overflow` px past its bottom edge.
pub fn layout(width: f64, overflow: f64) -> LayoutSnapshot {
    LayoutSnapshot {
        viewport_width: width,
        carousel: Rect::new(0.0, 0.0, width, 600.0),
        overlays: vec![Overlay {
            rect: Rect::new(width / 2.0 - 60.0, 520.0 + overflow, 120.0, 80.0),
            extends_beyond: true,
            anchor: Anchor::BottomCenter,
        }],
    }
}

pub fn root(id: &str, slides: usize, options: Option<&str>) -> MarkupRoot {
    MarkupRoot {
        id: id.to_owned(),
        options: options.map(str::to_owned),
        image_slides: Some(slides),
        content_slides: Some(vec![SlideMarkup::with_roles(ElementRole::ALL); slides]),
        has_navigation: true,
        has_pagination: true,
        has_spacer: false,
    }
}

/// Drives a registry with a fake clock and projects every batch onto a
/// per-instance [`Scene`].
pub struct Harness {
    pub registry: Registry,
    pub host: FakeHost,
    pub scenes: BTreeMap<String, Scene>,
    pub log: Vec<Batch>,
    pub now: Millis,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_device(&DeviceProfile::default())
    }

    pub fn with_device(device: &DeviceProfile) -> Self {
        Self {
            registry: Registry::new(device),
            host: FakeHost {
                loaded: true,
                ..FakeHost::default()
            },
            scenes: BTreeMap::new(),
            log: Vec::new(),
            now: 0,
        }
    }

    pub fn mount(&mut self, root: MarkupRoot) -> Result<MountOutcome, MountError> {
        let outcome = self.registry.mount(root, self.now)?;
        if let MountOutcome::Mounted(batch) = &outcome {
            let instance = self.registry.get(&batch.instance).unwrap();
            self.scenes
                .entry(batch.instance.clone())
                .or_insert_with(|| Scene::new(instance.slide_count(), instance.looped()));
            self.apply(batch.clone());
        }
        Ok(outcome)
    }

    /// Mount and run until the instance is ready.
    pub fn mount_ready(&mut self, root: MarkupRoot) {
        self.mount(root).unwrap();
        self.advance(300);
    }

    pub fn apply(&mut self, batch: Batch) {
        if let Some(scene) = self.scenes.get_mut(&batch.instance) {
            scene.apply(&batch.commands, self.now);
        }
        self.log.push(batch);
    }

    fn apply_commands(&mut self, id: &str, commands: Vec<StyleCommand>) -> Vec<StyleCommand> {
        self.apply(Batch {
            instance: id.to_owned(),
            commands: commands.clone(),
        });
        commands
    }

    /// Move the clock forward in small steps, firing timers as they fall due.
    pub fn advance(&mut self, ms: Millis) {
        let end = self.now + ms;
        while self.now < end {
            self.now = (self.now + 10).min(end);
            for batch in self.registry.tick(self.now, &mut self.host) {
                self.apply(batch);
            }
        }
    }

    pub fn nav(&mut self, id: &str, nav: Nav) -> Vec<StyleCommand> {
        let commands = self.registry.navigate(id, nav, self.now, &mut self.host);
        self.apply_commands(id, commands)
    }

    pub fn key(&mut self, id: &str, key: &str) -> Vec<StyleCommand> {
        let commands = self.registry.key(id, key, self.now, &mut self.host);
        self.apply_commands(id, commands)
    }

    /// The engine reports the image transition finished.
    pub fn end(&mut self, id: &str) -> Vec<StyleCommand> {
        let commands = self.registry.transition_end(id, self.now, &mut self.host);
        self.apply_commands(id, commands)
    }

    pub fn swipe(&mut self, id: &str, internal: usize) -> Vec<StyleCommand> {
        let commands = self
            .registry
            .transition_start(id, internal, self.now, &mut self.host);
        self.apply_commands(id, commands)
    }

    pub fn hover(&mut self, id: &str, inside: bool) -> Vec<StyleCommand> {
        let commands = if inside {
            self.registry.pointer_enter(id, self.now)
        } else {
            self.registry.pointer_leave(id, self.now)
        };
        self.apply_commands(id, commands)
    }

    pub fn scene(&self, id: &str) -> &Scene {
        &self.scenes[id]
    }

    pub fn all_commands(&self, id: &str) -> impl Iterator<Item = &StyleCommand> {
        self.log
            .iter()
            .filter(move |b| b.instance == id)
            .flat_map(|b| b.commands.iter())
    }
}
