//! G33 calibration engine
//!
//! Coordinates the machine services through one run: validation,
//! homing and probe deployment, the probe/solve loop and cleanup.

use super::args::{CalibrationConfig, DensityLevel, G33Args};
use super::error::{CalibrationError, GEOMETRY_MESSAGE};
use super::pattern::ProbePattern;
use super::report::{self, ReportLayout};
use super::sample::rms_statistic;
use super::solver::{corrections, SolverFactors};
use super::state::{IterationState, Outcome, Phase, PhaseEvent};
use crate::config::DeltaConfig;
use crate::kinematics::KinematicParameters;
use crate::traits::{
    EndstopService, GeometryService, LevelingService, MotionService, ProbeService, StatusSink,
    ToolService,
};

/// Machine services borrowed by a calibration run
#[derive(Debug)]
pub struct Machine<M, P, E, L, T, G> {
    /// Motion and homing
    pub motion: M,
    /// Bed probe
    pub probe: P,
    /// Endstop arbitration
    pub endstops: E,
    /// Bed leveling data
    pub leveling: L,
    /// Tool changer
    pub tools: T,
    /// Kinematic parameter owner
    pub geometry: G,
}

/// Result of a completed run
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationReport {
    /// How the run ended
    pub outcome: Outcome,
    /// Number of probe/solve passes
    pub iterations: u8,
    /// Statistic of the last pass
    pub final_rms: f32,
    /// Lowest statistic of the run
    pub best_rms: f32,
    /// Parameters left in the geometry service
    pub params: KinematicParameters,
}

/// Delta auto-calibration (G33)
pub struct Calibrator<M, P, E, L, T, G, S> {
    config: DeltaConfig,
    machine: Machine<M, P, E, L, T, G>,
    status: S,
}

impl<M, P, E, L, T, G, S> Calibrator<M, P, E, L, T, G, S>
where
    M: MotionService,
    P: ProbeService,
    E: EndstopService,
    L: LevelingService,
    T: ToolService,
    G: GeometryService,
    S: StatusSink,
{
    /// Create a calibrator over a machine and status output
    pub fn new(config: DeltaConfig, machine: Machine<M, P, E, L, T, G>, status: S) -> Self {
        Self {
            config,
            machine,
            status,
        }
    }

    /// Give the services back
    pub fn into_parts(self) -> (Machine<M, P, E, L, T, G>, S) {
        (self.machine, self.status)
    }

    /// Run one calibration
    ///
    /// Argument and geometry errors return before anything moves. Homing
    /// failures return immediately. Probe failures run cleanup first.
    pub fn run(&mut self, args: &G33Args) -> Result<CalibrationReport, CalibrationError> {
        let config = match CalibrationConfig::from_args(args, self.config.probe.manual) {
            Ok(config) => config,
            Err(e) => {
                warn!("G33 rejected: {}", e);
                self.status.message(e.message());
                return Err(e.into());
            }
        };

        let pattern = ProbePattern::new(&config, &self.config.probe);
        if config.density > DensityLevel::Center {
            let motion = &self.machine.motion;
            if !pattern
                .outer_ring()
                .all(|(x, y)| motion.is_reachable_by_probe(x, y))
            {
                warn!("G33 probe ring unreachable");
                self.status.message(GEOMETRY_MESSAGE);
                return Err(CalibrationError::GeometryError);
            }
        }

        self.status.message(report::HEADER);
        info!(
            "G33 P{} V{} F{}",
            config.density.as_u8(),
            config.verbosity as u8,
            config.force_iterations
        );

        let m = &mut self.machine;
        m.motion.synchronize();
        m.leveling.reset();
        let previous_tool = if m.tools.count() > 1 {
            Some(m.tools.change_to(0))
        } else {
            None
        };

        m.motion.setup_probe_move();
        m.endstops.enable(true);
        if config.density.probes() {
            self.home()?;
            self.machine.probe.deploy();
        }

        report::checking(&mut self.status, config.is_dry_run());

        let result = self.iterate(&config, &pattern);
        match result {
            Err(CalibrationError::HomingFailure(_)) => {}
            _ => self.cleanup(previous_tool),
        }

        if let Ok(report) = &result {
            info!(
                "G33 done after {} iterations, sd {}",
                report.iterations, report.best_rms
            );
        }
        result
    }

    /// Home all towers with endstops enabled for homing
    fn home(&mut self) -> Result<(), CalibrationError> {
        let m = &mut self.machine;
        m.endstops.enable(true);
        m.motion.home_all().map_err(|e| {
            error!("G33 homing failed: {}", e);
            CalibrationError::from(e)
        })?;
        m.endstops.not_homing();
        Ok(())
    }

    /// Probe/solve loop
    fn iterate(
        &mut self,
        config: &CalibrationConfig,
        pattern: &ProbePattern,
    ) -> Result<CalibrationReport, CalibrationError> {
        let layout = ReportLayout::new(config);
        let rod = self.machine.geometry.diagonal_rod();
        let mut params = self.machine.geometry.parameters();
        report::settings(&mut self.status, &layout, &params, rod);

        let mut state = IterationState::new(params, config.is_dry_run());
        let mut phase = Phase::Probing;

        loop {
            let mut target = state.begin();

            let samples = pattern
                .probe(&mut self.machine.probe, config.stow_each)
                .map_err(|(slot, e)| {
                    error!("G33 probe failed at slot {}: {}", slot, e);
                    CalibrationError::ProbeFailure { slot }
                })?;
            phase = phase.transition(PhaseEvent::Probed);

            let rms = rms_statistic(
                pattern
                    .statistic_slots()
                    .map(|slot| samples.get(slot as usize)),
            );
            state.record(rms);
            phase = phase.transition(state.judge(rms, target, config));

            let mut single_pass = false;
            match phase {
                Phase::Accepting => {
                    if state.is_best(rms) {
                        state.snapshot(params);
                    }
                    let factors = SolverFactors::new(
                        params.radius,
                        self.config.probe.radius,
                        state.iteration() == 1,
                    );
                    corrections(config.density, config.tower_angles, &samples, factors)
                        .apply_to(&mut params);

                    if config.density <= DensityLevel::Center && !config.manual_probing {
                        target = 0.0;
                        single_pass = true;
                    }
                }
                Phase::RollingBack => params = *state.best(),
                _ => {}
            }
            phase = phase.transition(PhaseEvent::Stepped);

            if !state.is_dry_run() {
                params.normalize();
            }
            self.machine.geometry.apply(params);
            phase = phase.transition(PhaseEvent::Normalized);
            state.track_min(rms);

            debug!(
                "G33 iteration {} sd {} target {}",
                state.iteration(),
                rms,
                target
            );
            report::points(&mut self.status, &layout, &samples);

            let outcome = state.outcome(rms, target, single_pass, config);
            let best_rms = state.best_rms().unwrap_or(rms);
            match outcome {
                None => {
                    report::progress(&mut self.status, state.iteration(), rms, false);
                    report::settings(&mut self.status, &layout, &params, rod);
                }
                Some(Outcome::NonConvergence { .. }) => {
                    params = *state.best();
                    self.machine.geometry.apply(params);
                    report::progress(&mut self.status, state.iteration(), rms, true);
                    report::settings(&mut self.status, &layout, &params, rod);
                }
                Some(Outcome::DryRun { rms }) => report::dry_run_end(&mut self.status, rms),
                Some(o) => {
                    let rolling_back = matches!(o, Outcome::RolledBack { .. })
                        && config.density != DensityLevel::Center
                        && !config.manual_probing;
                    report::finished(&mut self.status, rms, best_rms, rolling_back);
                    report::settings(&mut self.status, &layout, &params, rod);
                    self.status.message(report::SAVE_REMINDER);
                }
            }

            if config.density.probes() {
                self.home()?;
            }

            match outcome {
                Some(outcome) => {
                    phase = phase.transition(PhaseEvent::Finish(outcome));
                    debug!("G33 phase {}", phase);
                    return Ok(CalibrationReport {
                        outcome,
                        iterations: state.iteration(),
                        final_rms: rms,
                        best_rms,
                        params,
                    });
                }
                None => phase = phase.transition(PhaseEvent::Continue),
            }
        }
    }

    /// Leave the machine in a safe state
    fn cleanup(&mut self, previous_tool: Option<u8>) {
        let m = &mut self.machine;
        if self.config.home_to_safe_zone {
            m.motion.move_to_z(self.config.clip_start_height);
        }
        m.probe.stow();
        m.motion.finish_probe_move();
        if let Some(tool) = previous_tool {
            m.tools.change_to(tool);
        }
    }
}
