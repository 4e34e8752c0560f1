//! Series renderers: the virtualization engine between window snapshots,
//! datasources and pooled views.

mod config;
mod label;
mod pool;
mod series;
mod strategy;
mod traversal;

pub use config::{RenderAxis, RenderAxisConfig};
pub use label::LabelRenderer;
pub use pool::{ViewKey, ViewPool};
pub use series::{
    DatasourceEdge, DatasourceEdges, LoadResult, RendererState, SeriesRenderer,
};
pub use strategy::{
    BoundaryContext, BoundaryRefresh, ClipBoundaryRefresh, FixedWidthMeasurer,
    NoBoundaryRefresh, StickyLabelRefresh, TextMeasurer, UpdateStrategy,
};
