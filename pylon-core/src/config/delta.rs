//! Delta machine configuration

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::kinematics::KinematicParameters;

/// Bed probe mounting and calibration pattern configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProbeConfig {
    /// Radius of the calibration probe ring in mm
    pub radius: f32,
    /// Probe X offset from the nozzle in mm
    pub x_offset: f32,
    /// Probe Y offset from the nozzle in mm
    pub y_offset: f32,
    /// Probing is performed by hand (paper test) instead of a sensor
    pub manual: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            radius: 80.0,
            x_offset: 0.0,
            y_offset: 0.0,
            manual: false,
        }
    }
}

/// Delta frame configuration
///
/// Holds the machine constants plus the initial calibratable values.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeltaConfig {
    /// Frame radius in mm
    pub radius: f32,
    /// Diagonal rod length in mm
    pub diagonal_rod: f32,
    /// Frame height in mm
    pub height: f32,
    /// Radius the nozzle can reach in mm
    pub printable_radius: f32,
    /// Endstop adjustments in mm
    pub endstop_adj: [f32; 3],
    /// Tower angle adjustments in degrees
    pub tower_angle_adj: [f32; 3],
    /// Height the effector is raised to when calibration ends
    pub clip_start_height: f32,
    /// Raise to `clip_start_height` during cleanup
    pub home_to_safe_zone: bool,
    /// Probe configuration
    pub probe: ProbeConfig,
}

impl Default for DeltaConfig {
    fn default() -> Self {
        Self {
            radius: 105.0,
            diagonal_rod: 215.0,
            height: 250.0,
            printable_radius: 90.0,
            endstop_adj: [0.0; 3],
            tower_angle_adj: [0.0; 3],
            clip_start_height: 25.0,
            home_to_safe_zone: true,
            probe: ProbeConfig::default(),
        }
    }
}

impl DeltaConfig {
    /// Initial kinematic parameters from this configuration
    pub fn kinematics(&self) -> KinematicParameters {
        KinematicParameters {
            endstop_adj: self.endstop_adj,
            radius: self.radius,
            height: self.height,
            tower_angle_adj: self.tower_angle_adj,
        }
    }

    /// Sanity check of the machine constants
    pub fn is_valid(&self) -> bool {
        self.radius > 0.0
            && self.diagonal_rod > self.radius
            && self.height > 0.0
            && self.printable_radius > 0.0
            && self.probe.radius > 0.0
            && self.probe.radius <= self.printable_radius
            && self.kinematics().is_finite()
    }
}
