//! Calibration report lines
//!
//! Console lines go to `StatusSink::message`, short LCD lines to
//! `StatusSink::set_status`. Nothing here touches the machine.

use heapless::String;

use super::args::{CalibrationConfig, DensityLevel};
use super::sample::SampleVector;
use crate::kinematics::KinematicParameters;
use crate::traits::StatusSink;

/// Longest console line
pub const LINE_CAPACITY: usize = 96;

/// Longest LCD status line
pub const STATUS_CAPACITY: usize = 21;

/// Console line buffer
pub type Line = String<LINE_CAPACITY>;

/// Status line buffer
pub type StatusLine = String<STATUS_CAPACITY>;

/// Header emitted once arguments are accepted
pub const HEADER: &str = "G33 Auto Calibrate";

/// Emitted before the first pass
pub const CHECKING: &str = "Checking... ";

/// Persistence reminder after a successful run
pub const SAVE_REMINDER: &str = "Save with M500 and/or copy to configuration";

/// Which values a run prints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReportLayout {
    /// Per-point readings are printed
    pub points: bool,
    /// Tower readings `x y z`
    pub towers: bool,
    /// Opposite readings `yz zx xy`
    pub opposites: bool,
    /// Opposites continue a second line under the towers
    pub two_rows: bool,
    /// Endstops and radius are printed
    pub endstops: bool,
    /// Tower angles and rod length are printed
    pub tower_angles: bool,
}

impl ReportLayout {
    /// Layout for a validated configuration
    pub fn new(config: &CalibrationConfig) -> Self {
        let full = config.density.is_full_pattern();
        let level_two = config.density == DensityLevel::Towers;
        let opposites = config.uses_opposites();
        Self {
            points: config.verbosity.reports_points(),
            towers: (level_two && !opposites) || full,
            opposites: opposites || full,
            two_rows: full,
            endstops: config.sets_endstops(),
            tower_angles: config.sets_tower_angles(),
        }
    }
}

fn write_to_string<const N: usize>(
    s: &mut String<N>,
    args: core::fmt::Arguments<'_>,
) -> core::fmt::Result {
    use core::fmt::Write;
    s.write_fmt(args)
}

/// Append `  label:+0.00`
fn signed<const N: usize>(s: &mut String<N>, label: &str, value: f32) {
    let _ = write_to_string(s, format_args!("  {}:{:+.2}", label, value));
}

/// Statistic as a five-character LCD field (`0.012` or `003.x`)
fn short_rms(s: &mut StatusLine, rms: f32) {
    if rms < 1.0 {
        let _ = write_to_string(s, format_args!("0.{:03}", libm::roundf(rms * 1000.0) as i32));
    } else {
        let _ = write_to_string(s, format_args!("{:03}.x", libm::roundf(rms) as i32));
    }
}

/// `Checking... ` line and status
pub fn checking<S: StatusSink>(sink: &mut S, dry_run: bool) {
    let mut line = Line::new();
    let _ = line.push_str(CHECKING);
    if dry_run {
        let _ = line.push_str(" (DRY-RUN)");
    }
    sink.message(&line);
    sink.set_status(CHECKING.trim_end());
}

/// Current kinematic settings
pub fn settings<S: StatusSink>(
    sink: &mut S,
    layout: &ReportLayout,
    params: &KinematicParameters,
    diagonal_rod: f32,
) {
    let mut line = Line::new();
    let _ = write_to_string(&mut line, format_args!(".Height:{:.2}", params.height));
    if layout.endstops {
        signed(&mut line, "  Ex", params.endstop_adj[0]);
        signed(&mut line, "Ey", params.endstop_adj[1]);
        signed(&mut line, "Ez", params.endstop_adj[2]);
        let _ = write_to_string(&mut line, format_args!("    Radius:{:.2}", params.radius));
    }
    sink.message(&line);

    if layout.tower_angles {
        let mut line = Line::new();
        let _ = line.push_str(".Tower angle :  ");
        signed(&mut line, "Tx", params.tower_angle_adj[0]);
        signed(&mut line, "Ty", params.tower_angle_adj[1]);
        signed(&mut line, "Tz", params.tower_angle_adj[2]);
        let _ = write_to_string(&mut line, format_args!("       Rod:{:.2}", diagonal_rod));
        sink.message(&line);
    }
}

/// Probed readings of one pass
pub fn points<S: StatusSink>(sink: &mut S, layout: &ReportLayout, samples: &SampleVector) {
    if !layout.points {
        return;
    }

    let mut line = Line::new();
    let _ = line.push_str(".    ");
    signed(&mut line, "c", samples.get(0));
    if layout.towers {
        signed(&mut line, "   x", samples.get(1));
        signed(&mut line, " y", samples.get(5));
        signed(&mut line, " z", samples.get(9));
    }

    if layout.opposites {
        if layout.two_rows {
            sink.message(&line);
            line.clear();
            let _ = write_to_string(&mut line, format_args!(".{:13}", ""));
        }
        signed(&mut line, "  yz", samples.get(7));
        signed(&mut line, "zx", samples.get(11));
        signed(&mut line, "xy", samples.get(3));
    }
    sink.message(&line);
}

/// Progress after a pass that does not end the run
///
/// `exhausted` marks the pass that hit the iteration bound.
pub fn progress<S: StatusSink>(sink: &mut S, iteration: u8, rms: f32, exhausted: bool) {
    let mut status = StatusLine::new();
    if exhausted {
        let _ = status.push_str("No convergence");
    } else {
        let _ = write_to_string(&mut status, format_args!(".Iteration: {:02}", iteration));
    }

    let mut line = Line::new();
    let _ = write_to_string(
        &mut line,
        format_args!("{}{:36}std dev:{:.3}", status, "", rms),
    );
    sink.message(&line);
    sink.set_status(&status);
}

/// Final lines of a calibrating run
pub fn finished<S: StatusSink>(sink: &mut S, rms: f32, best_rms: f32, rolling_back: bool) {
    let mut line = Line::new();
    let _ = write_to_string(&mut line, format_args!("Calibration OK{:36}", ""));
    if rolling_back {
        let _ = line.push_str("rolling back.");
    } else {
        let _ = write_to_string(&mut line, format_args!("std dev:{:.3}", rms));
    }
    sink.message(&line);

    let mut status = StatusLine::new();
    let _ = status.push_str("Calibration sd:");
    short_rms(&mut status, best_rms);
    sink.set_status(&status);
}

/// Final lines of a dry run
pub fn dry_run_end<S: StatusSink>(sink: &mut S, rms: f32) {
    let mut line = Line::new();
    let _ = write_to_string(&mut line, format_args!("End DRY-RUN{:39}std dev:{:.3}", "", rms));
    sink.message(&line);

    let mut status = StatusLine::new();
    let _ = status.push_str("End DRY-RUN sd:");
    short_rms(&mut status, rms);
    sink.set_status(&status);
}
