//! Browser bridge. The page owns the slide engine and the DOM; this crate
//! owns every carousel's state. Each call takes the host object described
//! in `host::JsHost` where the engine or layout may be consulted, and
//! returns style command batches as JSON.

mod console;
mod host;

use std::sync::Mutex;

use serde::Serialize;
use slidesync_core::{
    Batch, DeviceProfile, LifecycleState, MarkupRoot, MountOutcome, Nav, Registry,
};
use slidesync_protocol::{Millis, StyleCommand};
use wasm_bindgen::prelude::*;

use crate::host::JsHost;

static REGISTRY: Mutex<Option<Registry>> = Mutex::new(None);

fn js_err(e: impl std::fmt::Display) -> JsError {
    JsError::new(&e.to_string())
}

fn with_registry<T>(f: impl FnOnce(&mut Registry) -> Result<T, JsError>) -> Result<T, JsError> {
    let mut guard = REGISTRY
        .lock()
        .map_err(|_| JsError::new("carousel registry poisoned"))?;
    let registry = guard
        .as_mut()
        .ok_or_else(|| JsError::new("init() has not been called"))?;
    f(registry)
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(js_err)
}

fn millis(now: f64) -> Millis {
    now.max(0.0) as Millis
}

fn single(instance: &str, commands: Vec<StyleCommand>) -> Vec<Batch> {
    if commands.is_empty() {
        return Vec::new();
    }
    vec![Batch {
        instance: instance.to_owned(),
        commands,
    }]
}

/// Set up the registry for this page. `device_json` is a `DeviceProfile`
/// (`{"viewportWidth":…, "hardwareConcurrency":…, …}`); missing fields take
/// desktop defaults. Calling again drops every instance.
#[wasm_bindgen]
pub fn init(device_json: &str, debug: bool) -> Result<(), JsError> {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    console::init(debug);

    let device: DeviceProfile = if device_json.trim().is_empty() {
        DeviceProfile::default()
    } else {
        serde_json::from_str(device_json).map_err(js_err)?
    };
    let registry = Registry::new(&device);
    tracing::info!(tier = ?registry.tier(), "slidesync ready");
    *REGISTRY
        .lock()
        .map_err(|_| JsError::new("carousel registry poisoned"))? = Some(registry);
    Ok(())
}

/// Toggle debug-level console logging.
#[wasm_bindgen]
pub fn set_debug(enabled: bool) {
    console::set_debug(enabled);
}

/// Register a root scanned by the page. Returns a batch array; empty when
/// the root was already mounted.
#[wasm_bindgen]
pub fn mount(root_json: &str, now: f64) -> Result<String, JsError> {
    let root: MarkupRoot = serde_json::from_str(root_json).map_err(js_err)?;
    with_registry(|registry| match registry.mount(root, millis(now)).map_err(js_err)? {
        MountOutcome::Mounted(batch) => to_json(&[batch]),
        MountOutcome::AlreadyMounted => to_json(&[] as &[Batch]),
    })
}

/// Destroy and mount a root again after the page builder re-rendered it.
#[wasm_bindgen]
pub fn reinit(root_json: &str, now: f64, host: &JsValue) -> Result<String, JsError> {
    let root: MarkupRoot = serde_json::from_str(root_json).map_err(js_err)?;
    let mut host = JsHost::new(host);
    with_registry(|registry| {
        match registry
            .reinit(root, millis(now), &mut host)
            .map_err(js_err)?
        {
            MountOutcome::Mounted(batch) => to_json(&[batch]),
            MountOutcome::AlreadyMounted => to_json(&[] as &[Batch]),
        }
    })
}

/// Reconcile with every root currently in the page (editor re-render).
#[wasm_bindgen]
pub fn refresh(roots_json: &str, now: f64, host: &JsValue) -> Result<String, JsError> {
    let roots: Vec<MarkupRoot> = serde_json::from_str(roots_json).map_err(js_err)?;
    let mut host = JsHost::new(host);
    with_registry(|registry| to_json(&registry.refresh(roots, millis(now), &mut host)))
}

#[wasm_bindgen]
pub fn destroy(id: &str, host: &JsValue) -> Result<bool, JsError> {
    let mut host = JsHost::new(host);
    with_registry(|registry| Ok(registry.destroy(id, &mut host)))
}

/// Navigate an instance. `direction` is `"next"` or `"prev"`.
#[wasm_bindgen]
pub fn navigate(id: &str, direction: &str, now: f64, host: &JsValue) -> Result<String, JsError> {
    let nav = match direction {
        "next" => Nav::Next,
        "prev" => Nav::Prev,
        _ => return Err(JsError::new(&format!("unknown direction: {direction}"))),
    };
    dispatch_nav(id, nav, now, host)
}

/// Jump to a logical slide, e.g. from a pagination bullet.
#[wasm_bindgen]
pub fn go_to(id: &str, index: usize, now: f64, host: &JsValue) -> Result<String, JsError> {
    dispatch_nav(id, Nav::To(index), now, host)
}

/// Forward a `keydown` on the root. Unmapped keys, and roots without
/// navigation controls, produce nothing.
#[wasm_bindgen]
pub fn key(id: &str, key: &str, now: f64, host: &JsValue) -> Result<String, JsError> {
    let mut host = JsHost::new(host);
    with_registry(|registry| {
        let commands = registry.key(id, key, millis(now), &mut host);
        to_json(&single(id, commands))
    })
}

fn dispatch_nav(id: &str, nav: Nav, now: f64, host: &JsValue) -> Result<String, JsError> {
    let mut host = JsHost::new(host);
    with_registry(|registry| {
        let commands = registry.navigate(id, nav, millis(now), &mut host);
        to_json(&single(id, commands))
    })
}

/// The image track's engine fired its transition-start event.
#[wasm_bindgen]
pub fn transition_start(
    id: &str,
    internal_index: usize,
    now: f64,
    host: &JsValue,
) -> Result<String, JsError> {
    let mut host = JsHost::new(host);
    with_registry(|registry| {
        let commands = registry.transition_start(id, internal_index, millis(now), &mut host);
        to_json(&single(id, commands))
    })
}

/// The image track's engine fired its transition-end event.
#[wasm_bindgen]
pub fn transition_end(id: &str, now: f64, host: &JsValue) -> Result<String, JsError> {
    let mut host = JsHost::new(host);
    with_registry(|registry| {
        let commands = registry.transition_end(id, millis(now), &mut host);
        to_json(&single(id, commands))
    })
}

#[wasm_bindgen]
pub fn pointer(id: &str, inside: bool, now: f64) -> Result<String, JsError> {
    with_registry(|registry| {
        let commands = if inside {
            registry.pointer_enter(id, millis(now))
        } else {
            registry.pointer_leave(id, millis(now))
        };
        to_json(&single(id, commands))
    })
}

#[wasm_bindgen]
pub fn resize(viewport_width: f64, now: f64) -> Result<(), JsError> {
    with_registry(|registry| {
        registry.resize(viewport_width, millis(now));
        Ok(())
    })
}

#[wasm_bindgen]
pub fn window_loaded(host: &JsValue) -> Result<String, JsError> {
    let mut host = JsHost::new(host);
    with_registry(|registry| to_json(&registry.window_loaded(&mut host)))
}

/// Fire due timers. Call when [`next_deadline`] passes.
#[wasm_bindgen]
pub fn tick(now: f64, host: &JsValue) -> Result<String, JsError> {
    let mut host = JsHost::new(host);
    with_registry(|registry| to_json(&registry.tick(millis(now), &mut host)))
}

/// Earliest pending timer in host milliseconds, if any.
#[wasm_bindgen]
pub fn next_deadline() -> Result<Option<f64>, JsError> {
    with_registry(|registry| Ok(registry.next_deadline().map(|ms| ms as f64)))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InstanceStatus<'a> {
    id: &'a str,
    state: LifecycleState,
    active_index: Option<usize>,
    slide_count: usize,
    looped: bool,
    autoplaying: bool,
    observe_mutations: bool,
    spacer_height: Option<f64>,
    options_error: Option<&'a str>,
}

/// Status of every mounted instance, for devtools and debugging.
#[wasm_bindgen]
pub fn status() -> Result<String, JsError> {
    with_registry(|registry| {
        let statuses: Vec<InstanceStatus<'_>> = registry
            .instances()
            .map(|instance| InstanceStatus {
                id: instance.id(),
                state: instance.state(),
                active_index: instance.active_index(),
                slide_count: instance.slide_count(),
                looped: instance.looped(),
                autoplaying: instance.is_autoplaying(),
                observe_mutations: instance.observes_mutations(),
                spacer_height: instance.spacer_height(),
                options_error: instance.options_error(),
            })
            .collect();
        to_json(&statuses)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_batch_list_serializes() {
        assert!(matches!(to_json(&[] as &[Batch]), Ok(json) if json == "[]"));
        assert!(matches!(to_json(&single("hero", Vec::new())), Ok(json) if json == "[]"));
    }
}
