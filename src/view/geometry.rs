use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ViewVisibility {
    #[default]
    Visible,
    Hidden,
}

/// Partial view geometry. `None` fields leave the staged value untouched.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewBox {
    pub top: Option<f64>,
    pub left: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub visibility: Option<ViewVisibility>,
}

impl ViewBox {
    #[must_use]
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top: Some(top),
            left: Some(left),
            width: Some(width),
            height: Some(height),
            visibility: None,
        }
    }

    #[must_use]
    pub fn with_visibility(mut self, visibility: ViewVisibility) -> Self {
        self.visibility = Some(visibility);
        self
    }
}

/// Pixel layout actually written to a host element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewLayout {
    Hidden,
    Visible {
        top: Option<i64>,
        left: Option<i64>,
        width: Option<i64>,
        height: Option<i64>,
    },
}

/// Dirty-tracked view geometry.
///
/// Patches are merged into the staged box. [`ViewGeometry::take_layout`]
/// yields a layout only when the rounded pixels differ from the last write,
/// so unchanged geometry never costs a layout pass.
#[derive(Debug, Clone, Default)]
pub struct ViewGeometry {
    staged: ViewBox,
    dirty: bool,
    written: Option<ViewLayout>,
}

impl ViewGeometry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges `patch` into the staged box. Returns `true` when anything changed.
    pub fn stage(&mut self, patch: &ViewBox) -> bool {
        let mut changed = false;
        for (slot, value) in [
            (&mut self.staged.top, patch.top),
            (&mut self.staged.left, patch.left),
            (&mut self.staged.width, patch.width),
            (&mut self.staged.height, patch.height),
        ] {
            if value.is_some() && *slot != value {
                *slot = value;
                changed = true;
            }
        }
        if patch.visibility.is_some() && self.staged.visibility != patch.visibility {
            self.staged.visibility = patch.visibility;
            changed = true;
        }
        self.dirty |= changed;
        changed
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[must_use]
    pub fn staged(&self) -> ViewBox {
        self.staged
    }

    #[must_use]
    pub fn written(&self) -> Option<ViewLayout> {
        self.written
    }

    /// Clears the dirty flag and returns the layout to write, if it changed.
    pub fn take_layout(&mut self) -> Option<ViewLayout> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;

        let layout = match self.staged.visibility.unwrap_or_default() {
            ViewVisibility::Hidden => ViewLayout::Hidden,
            ViewVisibility::Visible => ViewLayout::Visible {
                top: pixels(self.staged.top),
                left: pixels(self.staged.left),
                width: pixels(self.staged.width),
                height: pixels(self.staged.height),
            },
        };
        if self.written == Some(layout) {
            return None;
        }
        self.written = Some(layout);
        Some(layout)
    }

    /// Forgets the last write so the next refresh writes again.
    pub fn invalidate_written(&mut self) {
        self.written = None;
        self.dirty = true;
    }
}

fn pixels(value: Option<f64>) -> Option<i64> {
    value.filter(|value| value.is_finite()).map(|value| value.round() as i64)
}
