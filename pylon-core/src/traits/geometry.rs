//! Geometry-recompute service trait

use crate::kinematics::KinematicParameters;

/// Trait for the owner of the kinematic parameters
///
/// The geometry service holds the live [`KinematicParameters`] used by
/// motion planning and derives the kinematic transform from them.
pub trait GeometryService {
    /// Current parameter tuple
    fn parameters(&self) -> KinematicParameters;

    /// Replace the parameter tuple and recompute derived constants
    ///
    /// Must be idempotent: applying the same tuple twice yields the same
    /// derived geometry.
    fn apply(&mut self, params: KinematicParameters);

    /// Diagonal rod length in mm (reported, not calibrated)
    fn diagonal_rod(&self) -> f32;
}

impl<T: GeometryService + ?Sized> GeometryService for &mut T {
    fn parameters(&self) -> KinematicParameters {
        (**self).parameters()
    }

    fn apply(&mut self, params: KinematicParameters) {
        (**self).apply(params)
    }

    fn diagonal_rod(&self) -> f32 {
        (**self).diagonal_rod()
    }
}
