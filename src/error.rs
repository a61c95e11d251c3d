use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid filter specification: {0}")]
    InvalidSpec(String),

    #[error(
        "Remez exchange did not converge after {iterations} iterations (best weighted error {weighted_error:.3e})"
    )]
    DesignNonConvergence {
        iterations: usize,
        weighted_error: f64,
    },

    #[error("Coefficient I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed coefficient on line {line}: {text:?}")]
    Parse { line: usize, text: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, FilterError>;
