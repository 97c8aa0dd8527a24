//! Service traits
//!
//! These traits define the interface between the calibration engine and
//! the machine subsystems it coordinates. Every trait is also implemented
//! for `&mut T` so callers can lend a service for the duration of a run.

pub mod endstops;
pub mod geometry;
pub mod leveling;
pub mod motion;
pub mod probe;
pub mod status;
pub mod tools;

pub use endstops::EndstopService;
pub use geometry::GeometryService;
pub use leveling::{LevelingService, NoLeveling};
pub use motion::{HomingError, MotionService};
pub use probe::{ProbeError, ProbeService};
pub use status::StatusSink;
pub use tools::{SingleTool, ToolService};
