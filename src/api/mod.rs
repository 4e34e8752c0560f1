//! Host-facing timeline surface: configuration plus the controller that turns
//! scroll, resize and zoom input into window snapshots.

mod config;
mod controller;

pub use config::{ScrollOrientation, TimelineConfig};
pub use controller::{ResizeInput, ScrollInput, TimelineController};
