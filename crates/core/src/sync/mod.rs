pub mod controller;
pub mod track;

pub use controller::{LifecycleState, Nav, Step, SyncController, SyncEvent};
pub use track::{Track, TrackSpec};
