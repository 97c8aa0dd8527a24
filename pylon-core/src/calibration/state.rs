//! Iteration state machine
//!
//! Each pass of the solver loop walks `Probing → Solving → {Accepting,
//! RollingBack, Holding} → Normalizing → Reporting` and then either starts
//! another pass or terminates with an outcome.

use super::args::CalibrationConfig;
use crate::kinematics::KinematicParameters;

/// Hard bound on solver passes
pub const MAX_ITERATIONS: u8 = 30;

/// How a calibration run ended
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// Statistic reached the requested precision, or a single-pass level
    /// finished
    Converged {
        /// Final RMS statistic
        rms: f32,
    },
    /// The last pass regressed and the best parameters were restored
    RolledBack {
        /// Lowest RMS seen during the run
        best_rms: f32,
    },
    /// Iteration bound reached while still improving; best parameters
    /// restored
    NonConvergence {
        /// Lowest RMS seen during the run
        best_rms: f32,
    },
    /// Verbosity 0; nothing was changed
    DryRun {
        /// Measured RMS statistic
        rms: f32,
    },
}

/// Solver loop phases
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Running the probe pattern
    Probing,
    /// Computing the statistic and choosing a step
    Solving,
    /// Applying corrections
    Accepting,
    /// Restoring the best snapshot
    RollingBack,
    /// Leaving parameters unchanged
    Holding,
    /// Re-centering angles and endstops
    Normalizing,
    /// Emitting the iteration report
    Reporting,
    /// Run finished
    Terminated(Outcome),
}

/// Events driving the solver loop
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PhaseEvent {
    /// Sample vector is complete
    Probed,
    /// Statistic improved (or iterations are forced)
    Accept,
    /// Statistic regressed
    RollBack,
    /// Statistic is within precision, or dry run
    Hold,
    /// Step has been applied to the working parameters
    Stepped,
    /// Normalization done (or skipped in dry run)
    Normalized,
    /// Another pass is needed
    Continue,
    /// Loop ends with an outcome
    Finish(Outcome),
}

impl Phase {
    /// Check if the run has finished
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Terminated(_))
    }

    /// Process an event and return the next phase
    pub fn transition(self, event: PhaseEvent) -> Self {
        use Phase::*;
        use PhaseEvent::*;

        match (self, event) {
            (Probing, Probed) => Solving,

            (Solving, Accept) => Accepting,
            (Solving, RollBack) => RollingBack,
            (Solving, Hold) => Holding,

            (Accepting, Stepped) | (RollingBack, Stepped) | (Holding, Stepped) => Normalizing,

            (Normalizing, Normalized) => Reporting,

            (Reporting, Continue) => Probing,
            (Reporting, Finish(outcome)) => Terminated(outcome),

            _ => self,
        }
    }
}

/// Statistic history and rollback snapshot across passes
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IterationState {
    iteration: u8,
    rms: Option<f32>,
    prev_rms: Option<f32>,
    min_rms: Option<f32>,
    best: KinematicParameters,
    dry_run: bool,
}

impl IterationState {
    /// Fresh state; `initial` is the rollback target until a better pass
    pub fn new(initial: KinematicParameters, dry_run: bool) -> Self {
        Self {
            iteration: 0,
            rms: None,
            prev_rms: None,
            min_rms: None,
            best: initial,
            dry_run,
        }
    }

    /// Number of the current pass (1-based once started)
    pub fn iteration(&self) -> u8 {
        self.iteration
    }

    /// Whether this run only measures
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Lowest statistic recorded so far
    pub fn best_rms(&self) -> Option<f32> {
        self.min_rms
    }

    /// Rollback snapshot
    pub fn best(&self) -> &KinematicParameters {
        &self.best
    }

    /// Threshold the next statistic must beat to count as improvement
    ///
    /// Unbounded before the first pass, the first statistic on the second
    /// pass, the midpoint of the last two afterwards.
    pub fn target_precision(&self) -> f32 {
        match (self.rms, self.prev_rms) {
            (None, _) => f32::INFINITY,
            (Some(rms), None) => rms,
            (Some(rms), Some(prev)) => (rms + prev) / 2.0,
        }
    }

    /// Start a pass, returning the target precision it is judged against
    pub fn begin(&mut self) -> f32 {
        let target = self.target_precision();
        self.iteration = self.iteration.saturating_add(1);
        target
    }

    /// Record the statistic of the current pass
    pub fn record(&mut self, rms: f32) {
        self.prev_rms = self.rms;
        self.rms = Some(rms);
    }

    /// Whether `rms` beats every statistic recorded so far
    pub fn is_best(&self, rms: f32) -> bool {
        self.min_rms.map_or(true, |min| rms < min)
    }

    /// Save the parameters a pass was probed with
    pub fn snapshot(&mut self, params: KinematicParameters) {
        self.best = params;
    }

    /// Fold the current statistic into the running minimum
    pub fn track_min(&mut self, rms: f32) {
        self.min_rms = Some(self.min_rms.map_or(rms, |min| min.min(rms)));
    }

    /// Choose the step for a pass
    pub fn judge(&self, rms: f32, target: f32, config: &CalibrationConfig) -> PhaseEvent {
        if self.dry_run {
            PhaseEvent::Hold
        } else if (rms < target || self.iteration <= config.force_iterations)
            && rms > config.precision
        {
            PhaseEvent::Accept
        } else if rms >= target {
            PhaseEvent::RollBack
        } else {
            PhaseEvent::Hold
        }
    }

    /// Decide whether the loop ends after this pass
    ///
    /// `target` is the precision the pass was judged against, forced to
    /// zero by single-pass levels; `single_pass` marks that forcing.
    pub fn outcome(
        &self,
        rms: f32,
        target: f32,
        single_pass: bool,
        config: &CalibrationConfig,
    ) -> Option<Outcome> {
        let best_rms = self.min_rms.unwrap_or(rms);

        if self.dry_run {
            Some(Outcome::DryRun { rms })
        } else if rms <= config.precision {
            Some(Outcome::Converged { rms })
        } else if rms >= target && self.iteration > config.force_iterations {
            if single_pass {
                Some(Outcome::Converged { rms })
            } else {
                Some(Outcome::RolledBack { best_rms })
            }
        } else if self.iteration >= MAX_ITERATIONS {
            Some(Outcome::NonConvergence { best_rms })
        } else {
            None
        }
    }
}
