//! Dual-track carousel synchronization.
//!
//! An *image* track and a *content* track are built independently on a
//! host slide engine and kept on the same logical slide. On top of that
//! sits a reveal choreography for the content and a spacer that absorbs
//! decorations overflowing the carousel box.
//!
//! ```text
//!   DeviceProfile ─▶ device::adapt ─┐
//!   data-options  ─▶ config ────────┴▶ EffectiveConfig
//!                                          │
//!   engine events ─▶ Registry ─▶ SyncController ─▶ SyncEvent ─┬▶ AnimationDirector
//!   timers (tick) ─▶    │                                     └▶ LayoutStabilizer
//!                       ▼
//!                 Vec<Batch> of StyleCommand ─▶ host adapter (DOM, Scene, terminal)
//! ```

pub mod config;
pub mod device;
pub mod director;
pub mod host;
pub mod registry;
pub mod scene;
pub mod stabilizer;
pub mod sync;

pub use config::{CarouselOptions, ConfigError, EffectiveConfig};
pub use device::{DeviceProfile, PerformanceTier};
pub use host::{Host, LayoutProbe, LayoutSnapshot, MarkupRoot, SlideEngine, SlideMarkup};
pub use registry::{Batch, CarouselInstance, MountError, MountOutcome, Registry};
pub use scene::Scene;
pub use sync::{LifecycleState, Nav};
