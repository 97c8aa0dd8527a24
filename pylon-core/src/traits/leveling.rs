//! Bed leveling service trait

/// Trait for bed leveling subsystems
pub trait LevelingService {
    /// Discard leveling data
    ///
    /// Called before recalibration; old mesh data no longer matches the
    /// corrected geometry.
    fn reset(&mut self);
}

impl<T: LevelingService + ?Sized> LevelingService for &mut T {
    fn reset(&mut self) {
        (**self).reset()
    }
}

/// Leveling service for machines without bed leveling
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLeveling;

impl LevelingService for NoLeveling {
    fn reset(&mut self) {}
}
