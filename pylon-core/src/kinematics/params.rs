//! Kinematic parameter tuple for a three-tower delta frame

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One of the three towers of a delta frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Tower {
    /// Front left tower
    X,
    /// Front right tower
    Y,
    /// Rear tower
    Z,
}

/// All towers in index order
pub const TOWERS: [Tower; 3] = [Tower::X, Tower::Y, Tower::Z];

impl Tower {
    /// Array index of this tower
    pub const fn index(self) -> usize {
        match self {
            Tower::X => 0,
            Tower::Y => 1,
            Tower::Z => 2,
        }
    }

    /// Nominal tower angle in degrees, before angle adjustment
    pub const fn base_angle_deg(self) -> f32 {
        match self {
            Tower::X => 210.0,
            Tower::Y => 330.0,
            Tower::Z => 90.0,
        }
    }
}

/// Calibratable delta geometry
///
/// Always replaced as a whole tuple so motion planning never observes a
/// half-applied correction.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KinematicParameters {
    /// Per-tower endstop adjustment (mm, max is 0 after normalization)
    pub endstop_adj: [f32; 3],
    /// Frame radius (mm)
    pub radius: f32,
    /// Frame height (mm)
    pub height: f32,
    /// Per-tower angle adjustment (degrees, zero mean after normalization)
    pub tower_angle_adj: [f32; 3],
}

impl Default for KinematicParameters {
    fn default() -> Self {
        Self {
            endstop_adj: [0.0; 3],
            radius: 105.0,
            height: 250.0,
            tower_angle_adj: [0.0; 3],
        }
    }
}

impl KinematicParameters {
    /// Angle adjustment for a tower
    pub fn tower_angle(&self, tower: Tower) -> f32 {
        self.tower_angle_adj[tower.index()]
    }

    /// Largest of the three endstop adjustments
    pub fn max_endstop(&self) -> f32 {
        self.endstop_adj
            .iter()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max)
    }

    /// Mean of the three tower angle adjustments
    pub fn mean_tower_angle(&self) -> f32 {
        self.tower_angle_adj.iter().sum::<f32>() / 3.0
    }

    /// Re-center the tower angles on zero, then let the tallest tower
    /// define zero by moving its adjustment into the frame height.
    pub fn normalize(&mut self) {
        let mean = self.mean_tower_angle();
        for angle in &mut self.tower_angle_adj {
            *angle -= mean;
        }

        let z_max = self.max_endstop();
        self.height -= z_max;
        for adj in &mut self.endstop_adj {
            *adj -= z_max;
        }
    }

    /// Check that every value is finite
    pub fn is_finite(&self) -> bool {
        self.endstop_adj.iter().all(|v| v.is_finite())
            && self.tower_angle_adj.iter().all(|v| v.is_finite())
            && self.radius.is_finite()
            && self.height.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_tower_order() {
        for (i, tower) in TOWERS.iter().enumerate() {
            assert_eq!(tower.index(), i);
        }
        assert_eq!(Tower::Z.base_angle_deg(), 90.0);
    }

    #[test]
    fn test_normalize_moves_tallest_tower_into_height() {
        let mut params = KinematicParameters {
            endstop_adj: [-0.5, 0.25, -1.0],
            radius: 100.0,
            height: 250.0,
            tower_angle_adj: [0.3, -0.1, 0.1],
        };
        params.normalize();

        assert_eq!(params.max_endstop(), 0.0);
        assert!((params.endstop_adj[0] + 0.75).abs() < 1e-6);
        assert!((params.endstop_adj[2] + 1.25).abs() < 1e-6);
        assert!((params.height - 249.75).abs() < 1e-4);
        assert!(params.mean_tower_angle().abs() < 1e-6);
        assert_eq!(params.radius, 100.0);
    }

    #[test]
    fn test_normalize_is_identity_when_normalized() {
        let mut params = KinematicParameters::default();
        let before = params;
        params.normalize();
        assert_eq!(params, before);
    }

    proptest! {
        #[test]
        fn prop_normalize_invariants(
            e in prop::array::uniform3(-5.0f32..5.0),
            t in prop::array::uniform3(-2.0f32..2.0),
            height in 200.0f32..300.0,
        ) {
            let mut params = KinematicParameters {
                endstop_adj: e,
                radius: 105.0,
                height,
                tower_angle_adj: t,
            };
            params.normalize();

            prop_assert_eq!(params.max_endstop(), 0.0);
            prop_assert!(params.mean_tower_angle().abs() < 1e-5);
        }
    }
}
