pub mod analysis;
pub mod coefficients;
pub mod config;
pub mod constants;
pub mod design;
pub mod error;
pub mod export;
pub mod output;

pub use analysis::{FrequencyResponse, freqz};
pub use coefficients::FilterCoefficients;
pub use config::RequestFile;
pub use error::{FilterError, Result};
