//! Delta auto-calibration (G33)
//!
//! Probes the bed in a pattern chosen by the density level and iteratively
//! corrects endstops, frame radius, frame height and tower angles until the
//! height error stops improving.
//!
//! Flow: validate → home/deploy → loop { probe → statistic → solve or roll
//! back → normalize → recompute → report → re-home } → cleanup.

pub mod args;
pub mod engine;
pub mod error;
pub mod pattern;
pub mod report;
pub mod sample;
pub mod solver;
pub mod state;

pub use args::{CalibrationConfig, DensityLevel, G33Args, Verbosity};
pub use engine::{CalibrationReport, Calibrator};
pub use error::{ArgumentError, CalibrationError};
pub use pattern::{ProbePattern, ProbePoint};
pub use sample::{rms_statistic, SampleVector, SAMPLE_SLOTS};
pub use solver::{corrections, Corrections, SolverFactors};
pub use state::{IterationState, Outcome, Phase, PhaseEvent, MAX_ITERATIONS};
