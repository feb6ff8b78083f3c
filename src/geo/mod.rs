//! Solar event calculations for schedule resolution.

pub mod solar;

pub use solar::SolarPhase;
