//! timeline-rs: time-axis virtualization engine for scheduling timelines.
//!
//! A fixed time range is mapped onto a long scrollable pixel axis. Every
//! scroll tick publishes a [`core::WindowSnapshot`]; series renderers walk
//! their datasource across the visible window and bind only the intersecting
//! items to a bounded pool of recycled views.

pub mod api;
pub mod core;
pub mod datasource;
pub mod error;
pub mod events;
pub mod render;
pub mod renderer;
pub mod telemetry;
pub mod view;

pub use api::{ScrollInput, TimelineConfig, TimelineController};
pub use error::{TimelineError, TimelineResult};
