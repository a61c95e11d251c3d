pub mod frequency_response;
pub mod verification;

pub use frequency_response::{
    FrequencyResponse, ResponsePoint, freqz, freqz_raw, magnitude_to_db, response_at,
};
pub use verification::{BandRange, BandStats, VerificationReport, VerificationTargets, verify};
