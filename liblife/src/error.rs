use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("position ({x}, {y}) is outside the {cols}x{rows} board")]
    OutOfRange {
        x: usize,
        y: usize,
        cols: usize,
        rows: usize,
    },

    /// A rule mentioned a neighbor count no Moore neighborhood can have.
    #[error("neighbor count {0} is outside 0..=8")]
    InvalidRule(usize),

    #[error("unknown rule preset: {0}")]
    UnknownPreset(String),

    #[error("malformed notation: {0}")]
    InvalidNotation(String),

    #[error("board dimensions must be positive, got {cols}x{rows}")]
    InvalidDimensions { cols: usize, rows: usize },

    #[error("density {0} is outside 0.0..=1.0")]
    InvalidDensity(f64),

    #[error("unknown pattern: {0}")]
    UnknownPattern(String),
}
