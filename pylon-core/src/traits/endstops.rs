//! Endstop arbitration trait

/// Trait for endstop arbitration
pub trait EndstopService {
    /// Enable or disable endstop checking for subsequent moves
    fn enable(&mut self, enabled: bool);

    /// Leave homing mode, restoring the configured endstop state
    fn not_homing(&mut self);
}

impl<T: EndstopService + ?Sized> EndstopService for &mut T {
    fn enable(&mut self, enabled: bool) {
        (**self).enable(enabled)
    }

    fn not_homing(&mut self) {
        (**self).not_homing()
    }
}
