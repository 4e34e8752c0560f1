mod background;
mod frame;
mod null_renderer;
mod primitives;

pub use background::{GridBackground, GridBackgroundConfig};
pub use frame::RenderFrame;
pub use null_renderer::NullRenderer;
pub use primitives::{Color, LinePrimitive};

use crate::error::TimelineResult;

/// Contract implemented by any drawing backend.
///
/// Backends receive a fully materialized `RenderFrame`, so drawing code stays
/// isolated from axis math and scroll handling.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame) -> TimelineResult<()>;
}
