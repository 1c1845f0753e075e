use js_sys::{Function, Reflect};
use slidesync_core::host::EngineError;
use slidesync_core::sync::TrackSpec;
use slidesync_core::{LayoutProbe, LayoutSnapshot, SlideEngine};
use slidesync_protocol::TrackKind;
use wasm_bindgen::{JsCast, JsValue};

/// The page's slide engine and layout, reached through a plain JS object:
///
/// ```js
/// {
///   isLoaded()                    // -> boolean
///   construct(instance, specJson) // throws on failure
///   destroy(instance, track)      // track is "image" | "content"
///   measure(instance)             // -> LayoutSnapshot JSON, or null
/// }
/// ```
pub(crate) struct JsHost<'a> {
    object: &'a JsValue,
}

impl<'a> JsHost<'a> {
    pub(crate) fn new(object: &'a JsValue) -> Self {
        Self { object }
    }

    fn method(&self, name: &str) -> Option<Function> {
        Reflect::get(self.object, &name.into())
            .ok()?
            .dyn_into::<Function>()
            .ok()
    }
}

fn track_name(track: TrackKind) -> &'static str {
    match track {
        TrackKind::Image => "image",
        TrackKind::Content => "content",
    }
}

fn describe(err: &JsValue) -> String {
    err.as_string()
        .or_else(|| {
            Reflect::get(err, &"message".into())
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{err:?}"))
}

impl SlideEngine for JsHost<'_> {
    fn is_loaded(&self) -> bool {
        self.method("isLoaded")
            .and_then(|f| f.call0(self.object).ok())
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    fn construct(&mut self, instance: &str, spec: &TrackSpec) -> Result<(), EngineError> {
        let failed = |message: String| EngineError::Construct {
            track: spec.kind,
            message,
        };
        let construct = self
            .method("construct")
            .ok_or_else(|| failed("host has no construct()".into()))?;
        let spec_json = serde_json::to_string(spec).map_err(|e| failed(e.to_string()))?;
        construct
            .call2(self.object, &instance.into(), &spec_json.into())
            .map_err(|e| failed(describe(&e)))?;
        Ok(())
    }

    fn destroy(&mut self, instance: &str, track: TrackKind) {
        let track_arg = JsValue::from(track_name(track));
        if let Some(destroy) = self.method("destroy")
            && let Err(err) = destroy.call2(self.object, &instance.into(), &track_arg)
        {
            tracing::warn!(instance, ?track, error = %describe(&err), "engine destroy threw");
        }
    }
}

impl LayoutProbe for JsHost<'_> {
    fn measure(&self, instance: &str) -> Option<LayoutSnapshot> {
        let json = self
            .method("measure")?
            .call1(self.object, &instance.into())
            .ok()?
            .as_string()?;
        serde_json::from_str(&json)
            .inspect_err(|e| tracing::warn!(instance, error = %e, "unreadable layout snapshot"))
            .ok()
    }
}
