//! Calibration error types

use crate::traits::HomingError;

/// Invocation argument that failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ArgumentError {
    /// Probe point density outside 0-7
    Points,
    /// Verbosity outside 0-2
    Verbose,
    /// Negative calibration precision
    Precision,
    /// Forced iteration count outside 0-30
    ForceIterations,
}

impl ArgumentError {
    /// Diagnostic line for the host console
    pub const fn message(self) -> &'static str {
        match self {
            ArgumentError::Points => "?(P)oints is implausible (0-7).",
            ArgumentError::Verbose => "?(V)erbose Level is implausible (0-2).",
            ArgumentError::Precision => "?(C)alibration precision is implausible (>0).",
            ArgumentError::ForceIterations => "?(F)orce iteration is implausible (0-30).",
        }
    }

    /// Argument letter
    pub const fn key(self) -> char {
        match self {
            ArgumentError::Points => 'P',
            ArgumentError::Verbose => 'V',
            ArgumentError::Precision => 'C',
            ArgumentError::ForceIterations => 'F',
        }
    }
}

/// Errors that abort a calibration run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationError {
    /// Out-of-range argument; nothing was moved
    InvalidArgument(ArgumentError),
    /// Probe ring unreachable; nothing was moved
    GeometryError,
    /// Probe failed at a sample slot; cleanup has run
    ProbeFailure {
        /// Sample vector slot being probed
        slot: u8,
    },
    /// Homing failed; the run stopped without cleanup
    HomingFailure(HomingError),
}

impl From<ArgumentError> for CalibrationError {
    fn from(e: ArgumentError) -> Self {
        CalibrationError::InvalidArgument(e)
    }
}

impl From<HomingError> for CalibrationError {
    fn from(e: HomingError) -> Self {
        CalibrationError::HomingFailure(e)
    }
}

/// Diagnostic for an unreachable probe ring
pub const GEOMETRY_MESSAGE: &str = "?(M666 P)robe radius is implausible.";
