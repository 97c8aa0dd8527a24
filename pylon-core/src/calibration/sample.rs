//! Height-error sample vector and RMS statistic

/// Number of sample slots: center plus twelve ring positions
pub const SAMPLE_SLOTS: usize = 13;

/// Offset added after rounding so equal statistics never tie at zero
pub const RMS_EPSILON: f32 = 0.00001;

/// Height errors indexed by pattern position
///
/// Slot 0 is the center, slot `i` (1-12) lies at `180° + 30°·i`. Odd slots
/// are the towers (1, 5, 9) and their opposites (7, 11, 3).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SampleVector {
    z: [f32; SAMPLE_SLOTS],
}

impl SampleVector {
    /// All slots zero
    pub const fn new() -> Self {
        Self {
            z: [0.0; SAMPLE_SLOTS],
        }
    }

    /// Build from explicit slot values
    pub const fn from_slots(z: [f32; SAMPLE_SLOTS]) -> Self {
        Self { z }
    }

    /// Value of a slot
    pub fn get(&self, slot: usize) -> f32 {
        self.z[slot]
    }

    /// Overwrite a slot
    pub fn set(&mut self, slot: usize, value: f32) {
        self.z[slot] = value;
    }

    /// Add a reading to a slot
    pub fn accumulate(&mut self, slot: usize, value: f32) {
        self.z[slot] += value;
    }

    /// Divide a slot by its sample count
    pub fn average(&mut self, slot: usize, count: f32) {
        self.z[slot] /= count;
    }

    /// Blend every odd ring slot with the mean of its two even neighbours
    ///
    /// Only even slots are read, so the pass is not recursive.
    pub fn smooth_intermediates(&mut self) {
        for slot in (1..SAMPLE_SLOTS).step_by(2) {
            let next = self.z[slot + 1];
            let prev = self.z[(slot + 10) % 12 + 1];
            self.z[slot] = (self.z[slot] + (next + prev) / 2.0) / 2.0;
        }
    }
}

/// Root-mean-square of height errors, rounded to 3 decimals plus epsilon
///
/// An empty set of readings yields exactly 0.0.
pub fn rms_statistic<I>(values: I) -> f32
where
    I: IntoIterator<Item = f32>,
{
    let mut sum_sq = 0.0f32;
    let mut count = 0u16;
    for v in values {
        sum_sq += v * v;
        count += 1;
    }

    if count == 0 {
        return 0.0;
    }

    libm::roundf(libm::sqrtf(sum_sq / count as f32) * 1000.0) / 1000.0 + RMS_EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rms_known_vector() {
        let rms = rms_statistic([0.10, 0.05, 0.00, -0.05, 0.10]);
        // sqrt(0.025 / 5) = 0.0707 -> 0.071
        assert!((rms - (0.071 + RMS_EPSILON)).abs() < 1e-6);

        let shuffled = rms_statistic([-0.05, 0.10, 0.00, 0.10, 0.05]);
        assert_eq!(rms, shuffled);
    }

    #[test]
    fn test_rms_empty_is_zero() {
        assert_eq!(rms_statistic(core::iter::empty()), 0.0);
    }

    #[test]
    fn test_rms_all_zero_readings() {
        assert_eq!(rms_statistic([0.0; 7]), RMS_EPSILON);
    }

    #[test]
    fn test_smooth_intermediates() {
        let mut z = [0.0f32; SAMPLE_SLOTS];
        z[1] = 0.4;
        z[2] = 0.2;
        z[12] = 0.0;
        let mut samples = SampleVector::from_slots(z);
        samples.smooth_intermediates();

        // (0.4 + (0.2 + 0.0) / 2) / 2
        assert!((samples.get(1) - 0.25).abs() < 1e-6);
        // Slot 3 reads slots 4 and 2; slot 2 is unchanged by the pass
        assert!((samples.get(3) - 0.05).abs() < 1e-6);
        assert_eq!(samples.get(2), 0.2);
    }

    #[test]
    fn test_smooth_leaves_center_alone() {
        let mut samples = SampleVector::new();
        samples.set(0, 1.0);
        samples.smooth_intermediates();
        assert_eq!(samples.get(0), 1.0);
    }

    proptest! {
        #[test]
        fn prop_rms_independent_of_order(
            mut values in prop::collection::vec(-1.0f32..1.0, 1..13),
        ) {
            let forward = rms_statistic(values.iter().copied());
            values.reverse();
            let reversed = rms_statistic(values.iter().copied());
            values.rotate_left(1);
            let rotated = rms_statistic(values.iter().copied());

            prop_assert!((forward - reversed).abs() <= 0.001 + 1e-6);
            prop_assert!((forward - rotated).abs() <= 0.001 + 1e-6);
        }

        #[test]
        fn prop_rms_non_negative(values in prop::collection::vec(-5.0f32..5.0, 0..13)) {
            prop_assert!(rms_statistic(values) >= 0.0);
        }
    }
}
