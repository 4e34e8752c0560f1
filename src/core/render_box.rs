use serde::{Deserialize, Serialize};

/// Pixel geometry of a time interval along the scroll axis.
///
/// `clip_start`/`clip_end` are the parts of the box hidden outside the
/// visible window; `visible_size` is what remains. Both are zero for boxes
/// that are fully visible or fully hidden.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderBox {
    pub start_offset: f64,
    pub end_offset: f64,
    pub size: f64,
    pub visible_size: f64,
    pub clip_start: f64,
    pub clip_end: f64,
}

impl RenderBox {
    pub const EMPTY: RenderBox = RenderBox {
        start_offset: 0.0,
        end_offset: 0.0,
        size: 0.0,
        visible_size: 0.0,
        clip_start: 0.0,
        clip_end: 0.0,
    };

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size <= 0.0
    }
}

impl Default for RenderBox {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Rounds to a fixed number of decimals, keeping layout values stable.
#[must_use]
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
