//! Every carousel on a page, keyed by root id.
//!
//! The registry is the only owner of instance state. Host adapters create
//! one, forward DOM and engine events into it, call [`Registry::tick`] when
//! [`Registry::next_deadline`] passes, and apply the returned batches.

pub mod instance;
pub mod timer;

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use slidesync_protocol::{Millis, StyleCommand};
use thiserror::Error;

use crate::device::{DeviceProfile, PerformanceTier, classify};
use crate::host::{Host, MarkupRoot};
use crate::sync::Nav;

pub use instance::CarouselInstance;

#[derive(Debug, Error)]
pub enum MountError {
    #[error("image track not found")]
    MissingImageTrack,
    #[error("content track not found")]
    MissingContentTrack,
    #[error("image track has {image} slides but content track has {content}")]
    SlideCountMismatch { image: usize, content: usize },
}

/// Commands for one instance, in application order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Batch {
    pub instance: String,
    pub commands: Vec<StyleCommand>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MountOutcome {
    Mounted(Batch),
    /// The root was already registered; nothing changed.
    AlreadyMounted,
}

#[derive(Debug)]
pub struct Registry {
    instances: BTreeMap<String, CarouselInstance>,
    tier: PerformanceTier,
}

impl Registry {
    pub fn new(device: &DeviceProfile) -> Self {
        Self {
            instances: BTreeMap::new(),
            tier: classify(device),
        }
    }

    pub fn tier(&self) -> PerformanceTier {
        self.tier
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&CarouselInstance> {
        self.instances.get(id)
    }

    pub fn instances(&self) -> impl Iterator<Item = &CarouselInstance> {
        self.instances.values()
    }

    /// Register a root. Re-mounting a registered root is a no-op.
    ///
    /// Initialization itself is deferred to a timer, so the engine library
    /// may still be loading when this is called.
    pub fn mount(&mut self, markup: MarkupRoot, now: Millis) -> Result<MountOutcome, MountError> {
        if self.instances.contains_key(&markup.id) {
            return Ok(MountOutcome::AlreadyMounted);
        }
        let id = markup.id.clone();
        let (instance, commands) = CarouselInstance::new(markup, self.tier, now).inspect_err(
            |err| tracing::warn!(instance = %id, error = %err, "carousel not mounted"),
        )?;
        self.instances.insert(id.clone(), instance);
        Ok(MountOutcome::Mounted(Batch {
            instance: id,
            commands,
        }))
    }

    /// Tear down and mount again, e.g. after the page builder re-rendered
    /// the root.
    pub fn reinit<H: Host>(
        &mut self,
        markup: MarkupRoot,
        now: Millis,
        host: &mut H,
    ) -> Result<MountOutcome, MountError> {
        self.destroy(&markup.id, host);
        self.mount(markup, now)
    }

    /// Reconcile with the roots currently in the page: mount new ones and
    /// destroy instances whose root disappeared.
    pub fn refresh<H: Host>(
        &mut self,
        roots: Vec<MarkupRoot>,
        now: Millis,
        host: &mut H,
    ) -> Vec<Batch> {
        let present: BTreeSet<&str> = roots.iter().map(|r| r.id.as_str()).collect();
        let gone: Vec<String> = self
            .instances
            .keys()
            .filter(|id| !present.contains(id.as_str()))
            .cloned()
            .collect();
        for id in gone {
            self.destroy(&id, host);
        }

        roots
            .into_iter()
            .filter_map(|root| match self.mount(root, now) {
                Ok(MountOutcome::Mounted(batch)) => Some(batch),
                Ok(MountOutcome::AlreadyMounted) | Err(_) => None,
            })
            .collect()
    }

    pub fn destroy<H: Host>(&mut self, id: &str, host: &mut H) -> bool {
        match self.instances.remove(id) {
            Some(mut instance) => {
                instance.destroy(host);
                true
            }
            None => false,
        }
    }

    pub fn destroy_all<H: Host>(&mut self, host: &mut H) {
        for (_, mut instance) in std::mem::take(&mut self.instances) {
            instance.destroy(host);
        }
    }

    pub fn navigate<H: Host>(
        &mut self,
        id: &str,
        nav: Nav,
        now: Millis,
        host: &mut H,
    ) -> Vec<StyleCommand> {
        self.instances
            .get_mut(id)
            .map(|instance| instance.navigate(nav, now, host))
            .unwrap_or_default()
    }

    /// A key pressed while focus is inside instance `id`.
    pub fn key<H: Host>(
        &mut self,
        id: &str,
        key: &str,
        now: Millis,
        host: &mut H,
    ) -> Vec<StyleCommand> {
        self.instances
            .get_mut(id)
            .map(|instance| instance.key(key, now, host))
            .unwrap_or_default()
    }

    /// The engine reports the image track started moving to `internal`.
    pub fn transition_start<H: Host>(
        &mut self,
        id: &str,
        internal: usize,
        now: Millis,
        host: &mut H,
    ) -> Vec<StyleCommand> {
        self.instances
            .get_mut(id)
            .map(|instance| instance.transition_start(internal, now, host))
            .unwrap_or_default()
    }

    /// The engine reports the image track came to rest.
    pub fn transition_end<H: Host>(
        &mut self,
        id: &str,
        now: Millis,
        host: &mut H,
    ) -> Vec<StyleCommand> {
        self.instances
            .get_mut(id)
            .map(|instance| instance.transition_end(now, host))
            .unwrap_or_default()
    }

    pub fn pointer_enter(&mut self, id: &str, now: Millis) -> Vec<StyleCommand> {
        self.instances
            .get_mut(id)
            .map(|instance| instance.pointer(true, now))
            .unwrap_or_default()
    }

    pub fn pointer_leave(&mut self, id: &str, now: Millis) -> Vec<StyleCommand> {
        self.instances
            .get_mut(id)
            .map(|instance| instance.pointer(false, now))
            .unwrap_or_default()
    }

    /// The window was resized. Work happens on the debounced tick.
    pub fn resize(&mut self, viewport_width: f64, now: Millis) {
        for instance in self.instances.values_mut() {
            instance.resize(viewport_width, now);
        }
    }

    /// The window `load` event fired; late images may have moved overlays.
    pub fn window_loaded<H: Host>(&mut self, host: &mut H) -> Vec<Batch> {
        self.collect(|instance| instance.window_loaded(host))
    }

    /// Fire every timer due at `now`.
    pub fn tick<H: Host>(&mut self, now: Millis, host: &mut H) -> Vec<Batch> {
        self.collect(|instance| instance.tick(now, host))
    }

    /// Earliest pending timer across all instances.
    pub fn next_deadline(&self) -> Option<Millis> {
        self.instances
            .values()
            .filter_map(CarouselInstance::next_deadline)
            .min()
    }

    fn collect(
        &mut self,
        mut f: impl FnMut(&mut CarouselInstance) -> Vec<StyleCommand>,
    ) -> Vec<Batch> {
        self.instances
            .iter_mut()
            .filter_map(|(id, instance)| {
                let commands = f(instance);
                (!commands.is_empty()).then(|| Batch {
                    instance: id.clone(),
                    commands,
                })
            })
            .collect()
    }
}
