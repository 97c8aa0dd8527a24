//! Bed probe service trait

/// Errors that can occur while probing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProbeError {
    /// Probe did not trigger within the allowed travel
    NotTriggered,
    /// Probe was already triggered before the move
    AlreadyTriggered,
    /// Requested point is outside the probe's reach
    OutOfRange,
    /// Probe returned a non-numeric reading
    InvalidReading,
}

/// Trait for bed probes
///
/// Implementations handle the physical probe type (inductive, BLTouch,
/// FSR, manual paper test, ...). Hardware timeouts are the
/// implementation's responsibility and surface as [`ProbeError`].
pub trait ProbeService {
    /// Deploy the probe
    fn deploy(&mut self);

    /// Stow the probe
    fn stow(&mut self);

    /// Probe at a position and return the signed height error in mm
    ///
    /// `repeat` readings are taken and averaged by the probe. With
    /// `stow_after` set the probe is stowed after the reading.
    /// Some probes return `Ok(NaN)` on failure; callers treat that the
    /// same as an error.
    fn sample_at(&mut self, x: f32, y: f32, stow_after: bool, repeat: u8)
        -> Result<f32, ProbeError>;
}

impl<T: ProbeService + ?Sized> ProbeService for &mut T {
    fn deploy(&mut self) {
        (**self).deploy()
    }

    fn stow(&mut self) {
        (**self).stow()
    }

    fn sample_at(
        &mut self,
        x: f32,
        y: f32,
        stow_after: bool,
        repeat: u8,
    ) -> Result<f32, ProbeError> {
        (**self).sample_at(x, y, stow_after, repeat)
    }
}
