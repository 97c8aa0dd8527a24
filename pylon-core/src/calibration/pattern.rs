//! Probe-pattern planner
//!
//! Decides which sample slots a density level populates, where each
//! physical probe point lies, and how repeated readings fold into a slot.

use heapless::Vec;

use super::args::{CalibrationConfig, DensityLevel};
use super::sample::{SampleVector, SAMPLE_SLOTS};
use crate::config::ProbeConfig;
use crate::traits::{ProbeError, ProbeService};

/// Largest number of physical probe points in one pass (level 7)
pub const MAX_PROBE_POINTS: usize = 49;

/// Radius of the near-center sub-samples, relative to the probe radius
const CENTER_RING_FACTOR: f32 = 0.1;

/// Radial step between zig-zag rings, relative to the probe radius
const CIRCLE_STEP: f32 = 0.1;

/// Angle of a ring slot in radians
pub fn slot_angle(slot: u8) -> f32 {
    (180.0 + 30.0 * slot as f32).to_radians()
}

/// One physical probe position and the slot its reading feeds
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProbePoint {
    /// Sample slot (0 = center)
    pub slot: u8,
    /// Nozzle X in mm
    pub x: f32,
    /// Nozzle Y in mm
    pub y: f32,
}

/// Probe pattern for one density level
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProbePattern {
    density: DensityLevel,
    opposites: bool,
    radius: f32,
    x_offset: f32,
    y_offset: f32,
}

impl ProbePattern {
    /// Pattern for a validated configuration and probe geometry
    pub fn new(config: &CalibrationConfig, probe: &ProbeConfig) -> Self {
        Self {
            density: config.density,
            opposites: config.uses_opposites(),
            radius: probe.radius,
            x_offset: probe.x_offset,
            y_offset: probe.y_offset,
        }
    }

    /// Whether the true center point is probed
    ///
    /// Half and triple circle patterns substitute the near-center ring.
    pub fn probes_center(&self) -> bool {
        self.density.probes()
            && !matches!(
                self.density,
                DensityLevel::HalfCircle | DensityLevel::TripleCircle
            )
    }

    /// Slots of the near-center sub-samples
    fn center_ring_slots(&self) -> impl Iterator<Item = u8> {
        let (first, step) = if self.density.is_multi_circle() {
            (11u8, 2usize)
        } else {
            (9u8, 4usize)
        };
        let active = self.density.probes() && self.density >= DensityLevel::HalfCircle;
        (1..=first)
            .rev()
            .step_by(step)
            .filter(move |_| active)
    }

    /// Divisor applied to the accumulated center slot
    fn center_divisor(&self) -> Option<f32> {
        if !self.density.probes() || self.density < DensityLevel::HalfCircle {
            return None;
        }
        Some(match self.density {
            DensityLevel::DoubleCircle => 7.0,
            level => level.as_u8() as f32,
        })
    }

    /// First ring slot and step between ring slots
    fn ring_walk(&self) -> (u8, usize) {
        let start = if self.opposites { 3 } else { 1 };
        let step = match self.density {
            DensityLevel::Towers => 4,
            DensityLevel::HalfCircle => 2,
            _ => 1,
        };
        (start, step)
    }

    /// Slots of the probed ring positions, in probing order
    pub fn ring_slots(&self) -> impl Iterator<Item = u8> {
        let (start, step) = self.ring_walk();
        let active = self.density.probes() && self.density != DensityLevel::Center;
        (start..SAMPLE_SLOTS as u8)
            .step_by(step)
            .filter(move |_| active)
    }

    /// Half-width (in circle steps) of the radii a ring slot is probed on
    ///
    /// Zig positions get an extra half step outward.
    fn offset_circles(&self, zig: bool) -> f32 {
        let zigadd = if zig { 0.5 } else { 0.0 };
        match self.density {
            DensityLevel::QuadrupleCircle => zigadd + 1.0,
            DensityLevel::TripleCircle => zigadd + 0.5,
            DensityLevel::DoubleCircle => zigadd,
            _ => 0.0,
        }
    }

    /// Whether odd ring slots are blended with their neighbours
    pub fn smooths_intermediates(&self) -> bool {
        self.density >= DensityLevel::Full
    }

    /// Slots that feed the RMS statistic
    pub fn statistic_slots(&self) -> impl Iterator<Item = u8> {
        let probes = self.density.probes();
        let rings = probes && self.density != DensityLevel::Center;
        let start = if self.opposites { 3 } else { 1 };
        let step = if self.density == DensityLevel::Towers { 4 } else { 2 };

        core::iter::once(0u8)
            .filter(move |_| probes)
            .chain(
                (start..SAMPLE_SLOTS as u8)
                    .step_by(step)
                    .filter(move |_| rings),
            )
    }

    /// Slots populated by a probing pass
    pub fn populated_slots(&self) -> impl Iterator<Item = u8> {
        let center = self.density.probes();
        core::iter::once(0u8)
            .filter(move |_| center)
            .chain(self.ring_slots())
    }

    fn point(&self, slot: u8, angle_slot: u8, r: f32) -> ProbePoint {
        let a = slot_angle(angle_slot);
        ProbePoint {
            slot,
            x: libm::cosf(a) * r + self.x_offset,
            y: libm::sinf(a) * r + self.y_offset,
        }
    }

    /// Ring points for one slot with its zig-zag state
    fn ring_points(&self, slot: u8, zig: bool) -> impl Iterator<Item = ProbePoint> + '_ {
        let offset = self.offset_circles(zig);
        let direction = if zig { CIRCLE_STEP } else { -CIRCLE_STEP };
        let count = (2.0 * offset) as u8 + 1;
        (0..count).map(move |i| {
            let circles = -offset + i as f32;
            self.point(slot, slot, self.radius * (1.0 + circles * direction))
        })
    }

    /// Every physical probe point of one pass, in probing order
    pub fn points(&self) -> Vec<ProbePoint, MAX_PROBE_POINTS> {
        let mut out = Vec::new();

        if self.probes_center() {
            let _ = out.push(ProbePoint {
                slot: 0,
                x: self.x_offset,
                y: self.y_offset,
            });
        }
        for angle_slot in self.center_ring_slots() {
            let _ = out.push(self.point(0, angle_slot, self.radius * CENTER_RING_FACTOR));
        }

        let mut zig = true;
        for slot in self.ring_slots() {
            for point in self.ring_points(slot, zig) {
                let _ = out.push(point);
            }
            zig = !zig;
        }

        out
    }

    /// Number of readings averaged into a ring slot
    fn ring_divisor(&self, zig: bool) -> f32 {
        2.0 * self.offset_circles(zig) + 1.0
    }

    /// Probe every point of the pattern and fold readings into slots
    ///
    /// Stops at the first failed or non-finite reading and reports its slot.
    pub fn probe<P: ProbeService>(
        &self,
        probe: &mut P,
        stow_each: bool,
    ) -> Result<SampleVector, (u8, ProbeError)> {
        let mut samples = SampleVector::new();
        if !self.density.probes() {
            return Ok(samples);
        }

        let points = self.points();
        for point in &points {
            let z = match probe.sample_at(point.x, point.y, stow_each, 1) {
                Ok(z) if !z.is_finite() => Err(ProbeError::InvalidReading),
                other => other,
            }
            .map_err(|e| (point.slot, e))?;
            samples.accumulate(point.slot as usize, z);
        }

        if let Some(divisor) = self.center_divisor() {
            samples.average(0, divisor);
        }

        let mut zig = true;
        for slot in self.ring_slots() {
            samples.average(slot as usize, self.ring_divisor(zig));
            zig = !zig;
        }

        if self.smooths_intermediates() {
            samples.smooth_intermediates();
        }

        trace!("Probed {} points", points.len());
        Ok(samples)
    }

    /// Positions on the outermost ring, for the reachability pre-check
    pub fn outer_ring(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        let r = (1.0 + self.density.outer_circles() * CIRCLE_STEP) * self.radius;
        (1..SAMPLE_SLOTS as u8).map(move |slot| {
            let p = self.point(slot, slot, r);
            (p.x, p.y)
        })
    }
}
