//! Motion and homing service trait

/// Errors that can occur while homing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HomingError {
    /// A tower endstop did not trigger within travel
    EndstopNotTriggered,
    /// Carriage stalled before reaching the endstop
    StallDetected,
    /// Motion system refused the move (e.g. killed or not enabled)
    NotReady,
}

/// Trait for the motion subsystem
///
/// All calls block until the requested motion has completed.
pub trait MotionService {
    /// Block until the motion queue is empty
    fn synchronize(&mut self);

    /// Home all towers
    fn home_all(&mut self) -> Result<(), HomingError>;

    /// Check whether the probe can reach a position
    ///
    /// Both the nozzle and the probe (nozzle minus probe offset) must lie
    /// inside the printable radius.
    fn is_reachable_by_probe(&self, x: f32, y: f32) -> bool;

    /// Move the effector to an absolute Z height
    fn move_to_z(&mut self, z: f32);

    /// Save feedrate and motion state before endstop or probe moves
    fn setup_probe_move(&mut self) {}

    /// Restore the state saved by [`MotionService::setup_probe_move`]
    fn finish_probe_move(&mut self) {}
}

impl<T: MotionService + ?Sized> MotionService for &mut T {
    fn synchronize(&mut self) {
        (**self).synchronize()
    }

    fn home_all(&mut self) -> Result<(), HomingError> {
        (**self).home_all()
    }

    fn is_reachable_by_probe(&self, x: f32, y: f32) -> bool {
        (**self).is_reachable_by_probe(x, y)
    }

    fn move_to_z(&mut self, z: f32) {
        (**self).move_to_z(z)
    }

    fn setup_probe_move(&mut self) {
        (**self).setup_probe_move()
    }

    fn finish_probe_move(&mut self) {
        (**self).finish_probe_move()
    }
}
