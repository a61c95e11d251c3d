pub mod bessel;
pub mod butterworth;
pub mod kaiser;
pub mod remez;
pub mod tap_estimator;

pub use bessel::bessel_i0;
pub use butterworth::{ButterworthDesign, ButterworthSpec, FilterKind};
pub use kaiser::{KaiserCutoff, KaiserSpec, kaiser_beta, kaiser_window};
pub use remez::{Band, RemezDesign, RemezOptions, RemezSpec, equiripple};
pub use tap_estimator::{estimate_taps, estimated_tap_count};
