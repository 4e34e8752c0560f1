use thiserror::Error;

pub type TimelineResult<T> = Result<T, TimelineError>;

#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("invalid time range: start={start}, end={end}")]
    InvalidRange { start: i64, end: i64 },

    /// A collaborator (datasource or view) broke an ordering or geometry
    /// contract. The engine never repairs these.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}
