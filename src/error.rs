use thiserror::Error;

/// Result alias used by every fallible operation in the crate.
pub type Result<T> = std::result::Result<T, NnError>;

#[derive(Error, Debug)]
pub enum NnError {
    /// Shape mismatch between operands, malformed construction, or a call
    /// made out of protocol order (e.g. `backward` before `forward`).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Element index outside `[0, rows) x [0, cols)`.
    #[error("index ({row}, {col}) out of range for {rows}x{cols} matrix")]
    OutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl NnError {
    pub(crate) fn shape_mismatch(
        context: &str,
        expected: (usize, usize),
        actual: (usize, usize),
    ) -> NnError {
        NnError::InvalidArgument(format!(
            "{context}: expected {}x{}, got {}x{}",
            expected.0, expected.1, actual.0, actual.1
        ))
    }
}
