//! Delta frame kinematic parameters
//!
//! The calibration engine corrects these values; the geometry service owns
//! them and derives the full kinematic transform from them.

pub mod params;

pub use params::{KinematicParameters, Tower, TOWERS};
