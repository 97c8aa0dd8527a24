//! G33 invocation arguments and validation

use super::error::ArgumentError;

/// Maximum forced iteration floor (`F`)
pub const MAX_FORCE_ITERATIONS: u8 = 30;

/// Probe point density (`P`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DensityLevel {
    /// No probing; normalize and report only
    None = 0,
    /// Center only; sets height
    Center = 1,
    /// Center and towers (or opposites); sets height, endstops, radius
    Towers = 2,
    /// Half circle; sets everything including tower angles
    HalfCircle = 3,
    /// Full circle with averaged center
    Full = 4,
    /// Full circle, ring points on two radii
    DoubleCircle = 5,
    /// Full circle, ring points on three radii
    TripleCircle = 6,
    /// Full circle, ring points on four radii
    QuadrupleCircle = 7,
}

impl DensityLevel {
    /// Convert from a `P` argument value
    pub fn from_points(points: i32) -> Option<Self> {
        match points {
            0 => Some(DensityLevel::None),
            1 => Some(DensityLevel::Center),
            2 => Some(DensityLevel::Towers),
            3 => Some(DensityLevel::HalfCircle),
            4 => Some(DensityLevel::Full),
            5 => Some(DensityLevel::DoubleCircle),
            6 => Some(DensityLevel::TripleCircle),
            7 => Some(DensityLevel::QuadrupleCircle),
            _ => None,
        }
    }

    /// Numeric level
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Whether this level moves the probe at all
    pub const fn probes(self) -> bool {
        !matches!(self, DensityLevel::None)
    }

    /// Whether ring points are probed on more than one radius
    pub const fn is_multi_circle(self) -> bool {
        matches!(
            self,
            DensityLevel::DoubleCircle | DensityLevel::TripleCircle | DensityLevel::QuadrupleCircle
        )
    }

    /// Whether the full pattern formulas apply (level 0 and 3-7)
    ///
    /// Level 0 counts as full so normalize-only runs report every value.
    pub const fn is_full_pattern(self) -> bool {
        !matches!(self, DensityLevel::Center | DensityLevel::Towers)
    }

    /// Number of extra radii rings are probed on, relative to the probe radius
    ///
    /// Used for the reachability pre-check: the outermost ring sits at
    /// `1 + circles * 0.1` times the probe radius.
    pub const fn outer_circles(self) -> f32 {
        match self {
            DensityLevel::QuadrupleCircle => 1.5,
            DensityLevel::TripleCircle => 1.0,
            DensityLevel::DoubleCircle => 0.5,
            _ => 0.0,
        }
    }
}

/// Verbosity (`V`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Verbosity {
    /// Report settings and probe results, calibrate nothing
    DryRun = 0,
    /// Report settings
    Settings = 1,
    /// Report settings and probe results
    Detailed = 2,
}

impl Verbosity {
    /// Convert from a `V` argument value
    pub fn from_level(level: i32) -> Option<Self> {
        match level {
            0 => Some(Verbosity::DryRun),
            1 => Some(Verbosity::Settings),
            2 => Some(Verbosity::Detailed),
            _ => None,
        }
    }

    /// Whether per-point probe values are reported
    pub const fn reports_points(self) -> bool {
        !matches!(self, Verbosity::Settings)
    }
}

/// Raw G33 arguments as handed over by the command dispatcher
///
/// `None` means the word was absent and the default applies.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct G33Args {
    /// `P`: probe point density (default 4)
    pub points: Option<i32>,
    /// `T`: tower angle correction (default on)
    pub tower_angles: Option<bool>,
    /// `C`: calibration precision in mm (default 0)
    pub precision: Option<f32>,
    /// `F`: forced iteration floor (default 0)
    pub force_iterations: Option<i32>,
    /// `V`: verbosity (default 1)
    pub verbose: Option<i32>,
    /// `E`: stow the probe after each point (default off)
    pub stow_each: Option<bool>,
}

/// Validated configuration for one calibration run
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationConfig {
    /// Probe pattern density
    pub density: DensityLevel,
    /// Output verbosity; `DryRun` disables all corrections
    pub verbosity: Verbosity,
    /// Stop once the RMS statistic is at or below this (mm)
    pub precision: f32,
    /// Run at least this many iterations
    pub force_iterations: u8,
    /// Correct tower angles (full patterns only)
    pub tower_angles: bool,
    /// Stow the probe after every point
    pub stow_each: bool,
    /// Manual probing suppresses the single-pass floor of levels 0 and 1
    pub manual_probing: bool,
}

impl CalibrationConfig {
    /// Validate raw arguments
    ///
    /// Checks run in `P`, `V`, `C`, `F` order; the first failure is returned.
    pub fn from_args(args: &G33Args, manual_probing: bool) -> Result<Self, ArgumentError> {
        let density =
            DensityLevel::from_points(args.points.unwrap_or(4)).ok_or(ArgumentError::Points)?;

        let verbosity =
            Verbosity::from_level(args.verbose.unwrap_or(1)).ok_or(ArgumentError::Verbose)?;

        let precision = args.precision.unwrap_or(0.0);
        // NaN fails the comparison and is rejected too
        if !(precision >= 0.0) {
            return Err(ArgumentError::Precision);
        }

        let force_iterations = args.force_iterations.unwrap_or(0);
        if !(0..=MAX_FORCE_ITERATIONS as i32).contains(&force_iterations) {
            return Err(ArgumentError::ForceIterations);
        }

        Ok(Self {
            density,
            verbosity,
            precision,
            force_iterations: force_iterations as u8,
            tower_angles: args.tower_angles.unwrap_or(true),
            stow_each: args.stow_each.unwrap_or(false),
            manual_probing,
        })
    }

    /// Verbosity 0: probe and report, never correct
    pub fn is_dry_run(&self) -> bool {
        self.verbosity == Verbosity::DryRun
    }

    /// Level 2 using the opposite-tower points instead of the towers
    pub fn uses_opposites(&self) -> bool {
        self.density == DensityLevel::Towers && !self.tower_angles
    }

    /// Whether endstops and radius are calibrated and reported
    pub fn sets_endstops(&self) -> bool {
        self.density != DensityLevel::Center
    }

    /// Whether tower angles are calibrated and reported
    pub fn sets_tower_angles(&self) -> bool {
        self.density.is_full_pattern() && self.tower_angles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CalibrationConfig::from_args(&G33Args::default(), false).unwrap();
        assert_eq!(config.density, DensityLevel::Full);
        assert_eq!(config.verbosity, Verbosity::Settings);
        assert_eq!(config.precision, 0.0);
        assert_eq!(config.force_iterations, 0);
        assert!(config.tower_angles);
        assert!(!config.stow_each);
        assert!(!config.manual_probing);
        assert!(config.sets_tower_angles());
    }

    #[test]
    fn test_each_field_range() {
        let cases = [
            (G33Args { points: Some(8), ..Default::default() }, ArgumentError::Points),
            (G33Args { points: Some(-1), ..Default::default() }, ArgumentError::Points),
            (G33Args { verbose: Some(3), ..Default::default() }, ArgumentError::Verbose),
            (G33Args { precision: Some(-0.01), ..Default::default() }, ArgumentError::Precision),
            (G33Args { precision: Some(f32::NAN), ..Default::default() }, ArgumentError::Precision),
            (
                G33Args { force_iterations: Some(31), ..Default::default() },
                ArgumentError::ForceIterations,
            ),
            (
                G33Args { force_iterations: Some(-2), ..Default::default() },
                ArgumentError::ForceIterations,
            ),
        ];

        for (args, expected) in cases {
            assert_eq!(CalibrationConfig::from_args(&args, false), Err(expected));
        }
    }

    #[test]
    fn test_points_checked_before_verbose() {
        let args = G33Args {
            points: Some(9),
            verbose: Some(9),
            ..Default::default()
        };
        assert_eq!(
            CalibrationConfig::from_args(&args, false),
            Err(ArgumentError::Points)
        );
    }

    #[test]
    fn test_bounds_accepted() {
        let args = G33Args {
            points: Some(7),
            verbose: Some(2),
            precision: Some(0.0),
            force_iterations: Some(30),
            tower_angles: Some(false),
            stow_each: Some(true),
        };
        let config = CalibrationConfig::from_args(&args, true).unwrap();
        assert_eq!(config.density, DensityLevel::QuadrupleCircle);
        assert_eq!(config.force_iterations, 30);
        assert!(config.stow_each);
        assert!(config.manual_probing);
        assert!(!config.sets_tower_angles());
    }

    #[test]
    fn test_opposites_only_at_level_two() {
        let mut args = G33Args {
            points: Some(2),
            tower_angles: Some(false),
            ..Default::default()
        };
        assert!(CalibrationConfig::from_args(&args, false)
            .unwrap()
            .uses_opposites());

        args.points = Some(4);
        assert!(!CalibrationConfig::from_args(&args, false)
            .unwrap()
            .uses_opposites());
    }

    #[test]
    fn test_messages_name_their_key() {
        for e in [
            ArgumentError::Points,
            ArgumentError::Verbose,
            ArgumentError::Precision,
            ArgumentError::ForceIterations,
        ] {
            let mut tag = [0u8; 4];
            let key = e.key().encode_utf8(&mut tag);
            assert!(e.message().contains(&*key));
        }
    }
}
