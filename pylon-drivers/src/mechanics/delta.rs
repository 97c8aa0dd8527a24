//! Linear delta mechanics
//!
//! Owns the kinematic parameters and the tower positions derived from
//! them. Every parameter change goes through [`GeometryService::apply`],
//! which replaces the whole tuple and recomputes the towers in one step.

use pylon_core::config::DeltaConfig;
use pylon_core::kinematics::{KinematicParameters, TOWERS};
use pylon_core::traits::GeometryService;

/// Cartesian point outside the reach of at least one rod
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Unreachable;

/// Three-tower linear delta
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeltaMechanics {
    config: DeltaConfig,
    params: KinematicParameters,
    /// Tower XY positions
    towers: [[f32; 2]; 3],
    rod_sq: f32,
}

impl DeltaMechanics {
    /// Create from machine configuration
    pub fn new(config: DeltaConfig) -> Self {
        let mut mechanics = Self {
            config,
            params: config.kinematics(),
            towers: [[0.0; 2]; 3],
            rod_sq: config.diagonal_rod * config.diagonal_rod,
        };
        mechanics.recalc();
        mechanics
    }

    /// XY position of each tower
    pub fn towers(&self) -> &[[f32; 2]; 3] {
        &self.towers
    }

    fn recalc(&mut self) {
        for tower in TOWERS {
            let angle =
                (tower.base_angle_deg() + self.params.tower_angle(tower)).to_radians();
            self.towers[tower.index()] = [
                libm::cosf(angle) * self.params.radius,
                libm::sinf(angle) * self.params.radius,
            ];
        }
        debug!(
            "Delta recalc: radius {} height {}",
            self.params.radius, self.params.height
        );
    }

    /// Carriage height above the effector for each tower at a point
    pub fn inverse(&self, x: f32, y: f32, z: f32) -> Result<[f32; 3], Unreachable> {
        let mut carriages = [0.0; 3];
        for (carriage, [tx, ty]) in carriages.iter_mut().zip(self.towers) {
            let dx = tx - x;
            let dy = ty - y;
            let h_sq = self.rod_sq - dx * dx - dy * dy;
            if h_sq < 0.0 {
                return Err(Unreachable);
            }
            *carriage = libm::sqrtf(h_sq) + z;
        }
        Ok(carriages)
    }

    /// Effector position for three carriage heights
    ///
    /// Trilateration of the three rod spheres; the lower intersection is
    /// returned.
    pub fn forward(&self, carriages: [f32; 3]) -> Result<[f32; 3], Unreachable> {
        let p = |i: usize| [self.towers[i][0], self.towers[i][1], carriages[i]];
        let (p1, p2, p3) = (p(0), p(1), p(2));

        let p12 = sub(p2, p1);
        let d = norm(p12);
        if d == 0.0 {
            return Err(Unreachable);
        }
        let ex = scale(p12, 1.0 / d);

        let p13 = sub(p3, p1);
        let i = dot(ex, p13);
        let ey_raw = sub(p13, scale(ex, i));
        let j = norm(ey_raw);
        if j == 0.0 {
            return Err(Unreachable);
        }
        let ey = scale(ey_raw, 1.0 / j);
        let ez = cross(ex, ey);

        // Equal sphere radii simplify the usual trilateration terms
        let x_new = d / 2.0;
        let y_new = ((i * i + j * j) / 2.0 - i * x_new) / j;
        let z_sq = self.rod_sq - x_new * x_new - y_new * y_new;
        if z_sq < 0.0 {
            return Err(Unreachable);
        }
        let z_new = libm::sqrtf(z_sq);

        Ok([
            p1[0] + ex[0] * x_new + ey[0] * y_new - ez[0] * z_new,
            p1[1] + ex[1] * x_new + ey[1] * y_new - ez[1] * z_new,
            p1[2] + ex[2] * x_new + ey[2] * y_new - ez[2] * z_new,
        ])
    }

    /// Whether the nozzle can reach a point
    pub fn is_reachable(&self, x: f32, y: f32) -> bool {
        x * x + y * y <= self.config.printable_radius * self.config.printable_radius
    }

    /// Whether the probe can be placed over a point
    ///
    /// Both the nozzle and the offset probe must stay inside the printable
    /// radius.
    pub fn is_reachable_by_probe(&self, x: f32, y: f32) -> bool {
        self.is_reachable(x, y)
            && self.is_reachable(x - self.config.probe.x_offset, y - self.config.probe.y_offset)
    }
}

impl GeometryService for DeltaMechanics {
    fn parameters(&self) -> KinematicParameters {
        self.params
    }

    fn apply(&mut self, params: KinematicParameters) {
        self.params = params;
        self.recalc();
    }

    fn diagonal_rod(&self) -> f32 {
        self.config.diagonal_rod
    }
}

fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn scale(a: [f32; 3], k: f32) -> [f32; 3] {
    [a[0] * k, a[1] * k, a[2] * k]
}

fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn norm(a: [f32; 3]) -> f32 {
    libm::sqrtf(dot(a, a))
}
