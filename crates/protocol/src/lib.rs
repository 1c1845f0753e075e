pub mod commands;
pub mod ease;
pub mod element;
pub mod types;

pub use commands::{LifecycleClass, Pagination, StyleCommand, TrackKind};
pub use ease::Ease;
pub use element::{ElementRole, ElementStyle};
pub use types::{Millis, Point, Rect};
