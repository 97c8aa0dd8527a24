//! Correction formulas
//!
//! A fixed linear combination of sample slots per density level, mapping
//! height errors to endstop, radius and tower angle deltas. Pure function,
//! no machine access.

use super::args::DensityLevel;
use super::sample::SampleVector;
use crate::kinematics::KinematicParameters;

/// Weight of the tower angle cross term fed back into the endstops
const ANGLE_CROSS_DIVISOR: f32 = 4.5;

/// Scale factors derived from the current geometry
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SolverFactors {
    /// Endstop (height) factor
    pub h: f32,
    /// Radius factor
    pub r: f32,
    /// Tower angle factor
    pub a: f32,
}

impl SolverFactors {
    /// Factors for a frame radius, probe radius and iteration
    ///
    /// Angle corrections are damped on the first iteration, when the other
    /// errors still dominate.
    pub fn new(delta_radius: f32, probe_radius: f32, first_iteration: bool) -> Self {
        let r_diff = delta_radius - probe_radius;
        Self {
            // 1.02 for r_diff = 20mm
            h: (1.00 + r_diff * 0.001) / 6.0,
            // 2.25 for r_diff = 20mm
            r: -(1.75 + 0.005 * r_diff + 0.001 * r_diff * r_diff) / 6.0,
            // 0.83 for probe radius = 80mm
            a: (66.66 / probe_radius) / if first_iteration { 16.0 } else { 2.0 },
        }
    }
}

/// Deltas to add to the kinematic parameters
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Corrections {
    /// Per-tower endstop deltas
    pub endstop: [f32; 3],
    /// Frame radius delta
    pub radius: f32,
    /// Per-tower angle deltas
    pub angle: [f32; 3],
}

impl Corrections {
    /// Add these deltas to a parameter tuple
    pub fn apply_to(&self, params: &mut KinematicParameters) {
        for (adj, delta) in params.endstop_adj.iter_mut().zip(self.endstop) {
            *adj += delta;
        }
        params.radius += self.radius;
        for (adj, delta) in params.tower_angle_adj.iter_mut().zip(self.angle) {
            *adj += delta;
        }
    }
}

/// Compute corrections for a probed sample vector
///
/// `towers` selects the tower points at level 2 and enables tower angle
/// correction at levels 3-7.
pub fn corrections(
    density: DensityLevel,
    towers: bool,
    samples: &SampleVector,
    factors: SolverFactors,
) -> Corrections {
    let z = |slot: usize| samples.get(slot);
    let SolverFactors { h, r, a } = factors;
    let mut out = Corrections::default();

    match density {
        DensityLevel::None => {}

        DensityLevel::Center => {
            out.endstop = [z(0); 3];
        }

        DensityLevel::Towers if towers => {
            out.endstop = [
                (6.0 * z(0) + 4.0 * z(1) - 2.0 * z(5) - 2.0 * z(9)) * h,
                (6.0 * z(0) - 2.0 * z(1) + 4.0 * z(5) - 2.0 * z(9)) * h,
                (6.0 * z(0) - 2.0 * z(1) - 2.0 * z(5) + 4.0 * z(9)) * h,
            ];
            out.radius = (6.0 * z(0) - 2.0 * z(1) - 2.0 * z(5) - 2.0 * z(9)) * r;
        }

        DensityLevel::Towers => {
            out.endstop = [
                (6.0 * z(0) - 4.0 * z(7) + 2.0 * z(11) + 2.0 * z(3)) * h,
                (6.0 * z(0) + 2.0 * z(7) - 4.0 * z(11) + 2.0 * z(3)) * h,
                (6.0 * z(0) + 2.0 * z(7) + 2.0 * z(11) - 4.0 * z(3)) * h,
            ];
            out.radius = (6.0 * z(0) - 2.0 * z(7) - 2.0 * z(11) - 2.0 * z(3)) * r;
        }

        _ => {
            out.endstop = [
                (6.0 * z(0) + 2.0 * z(1) - z(5) - z(9) - 2.0 * z(7) + z(11) + z(3)) * h,
                (6.0 * z(0) - z(1) + 2.0 * z(5) - z(9) + z(7) - 2.0 * z(11) + z(3)) * h,
                (6.0 * z(0) - z(1) - z(5) + 2.0 * z(9) + z(7) + z(11) - 2.0 * z(3)) * h,
            ];
            out.radius = (6.0 * z(0) - z(1) - z(5) - z(9) - z(7) - z(11) - z(3)) * r;

            if towers {
                let t = [
                    (-2.0 * z(5) + 2.0 * z(9) - 2.0 * z(11) + 2.0 * z(3)) * a,
                    (2.0 * z(1) - 2.0 * z(9) + 2.0 * z(7) - 2.0 * z(3)) * a,
                    (-2.0 * z(1) + 2.0 * z(5) - 2.0 * z(7) + 2.0 * z(11)) * a,
                ];
                out.endstop[0] += (t[1] - t[2]) / ANGLE_CROSS_DIVISOR;
                out.endstop[1] += (t[2] - t[0]) / ANGLE_CROSS_DIVISOR;
                out.endstop[2] += (t[0] - t[1]) / ANGLE_CROSS_DIVISOR;
                out.angle = t;
            }
        }
    }

    out
}
