//! Branch orchestration
//!
//! Runs the steps of one branch strictly in order, stops installing after the
//! first critical failure, and always finishes by seeding the configuration
//! document.

use crate::config::InstallerConfig;
use crate::locator::Locator;

use super::branch::{Branch, UnknownBranch};
use super::poll::RetryPolicy;
use super::progress::{Progress, StepPhase};
use super::provisioner::{Provisioner, SystemProvisioner};
use super::seed::{self, SeedError, SeedOutcome};
use super::spec::{Component, DependencySpec};
use super::step::{StepReport, run_step};

/// Progress step name of the configuration seeder.
pub const SEED_STEP: &str = "configuration";

/// Aggregate result of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Only optional steps failed.
    SuccessWithWarnings,
    Failure,
}

impl Outcome {
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Success | Self::SuccessWithWarnings => 0,
            Self::Failure => 1,
        }
    }
}

#[derive(Debug)]
pub struct RunSummary {
    pub branch: Branch,
    /// Reports of the steps that ran, in order.
    pub steps: Vec<StepReport>,
    /// Steps not attempted after a critical failure.
    pub skipped: Vec<Component>,
    pub seed: Result<SeedOutcome, SeedError>,
}

impl RunSummary {
    pub fn outcome(&self) -> Outcome {
        if self.seed.is_err() || self.steps.iter().any(StepReport::is_failure) {
            Outcome::Failure
        } else if self.steps.iter().any(|step| step.warning().is_some()) {
            Outcome::SuccessWithWarnings
        } else {
            Outcome::Success
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.outcome().exit_code()
    }

    /// The step that stopped the branch, if any.
    pub fn critical_failure(&self) -> Option<&StepReport> {
        self.steps.iter().find(|step| step.is_failure())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &StepReport> {
        self.steps.iter().filter(|step| step.warning().is_some())
    }
}

/// Drives one branch against a [`Provisioner`].
pub struct Orchestrator<P = SystemProvisioner> {
    provisioner: P,
    locator: Locator,
    config: InstallerConfig,
    progress: Progress,
}

impl Orchestrator {
    /// Orchestrator acting on the real machine.
    pub fn system(locator: Locator, config: InstallerConfig) -> Self {
        Self::new(SystemProvisioner::new(config.clone()), locator, config)
    }
}

impl<P: Provisioner> Orchestrator<P> {
    pub fn new(provisioner: P, locator: Locator, config: InstallerConfig) -> Self {
        Self {
            provisioner,
            locator,
            config,
            progress: Progress::silent(),
        }
    }

    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    pub fn provisioner(&self) -> &P {
        &self.provisioner
    }

    /// Parse `selector` and run the matching branch.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownBranch`] before touching anything if `selector` names
    /// no branch.
    pub async fn run_selector(&self, selector: &str) -> Result<RunSummary, UnknownBranch> {
        let branch = selector.parse::<Branch>()?;
        Ok(self.run(branch).await)
    }

    pub async fn run(&self, branch: Branch) -> RunSummary {
        let steps = branch.steps(&self.locator, &self.config);
        self.run_steps(branch, &steps).await
    }

    /// Run an explicit step table, then seed the configuration document.
    pub async fn run_steps(&self, branch: Branch, steps: &[DependencySpec]) -> RunSummary {
        log::info!("Running {branch} branch from {}", self.locator.root().display());
        let policy = RetryPolicy::from_config(&self.config);

        let mut reports = Vec::with_capacity(steps.len());
        let mut skipped = Vec::new();
        let mut halted = false;

        for spec in steps {
            if halted {
                self.progress
                    .emit(spec.component.name(), StepPhase::Skipped, "skipped after critical failure")
                    .await;
                skipped.push(spec.component);
                continue;
            }

            let report = run_step(&self.provisioner, spec, policy, &self.progress).await;
            halted = report.is_failure();
            reports.push(report);
        }

        let seed = self.seed().await;

        RunSummary {
            branch,
            steps: reports,
            skipped,
            seed,
        }
    }

    async fn seed(&self) -> Result<SeedOutcome, SeedError> {
        let path = self.locator.config_file();
        let result = seed::ensure(&path);

        match &result {
            Ok(SeedOutcome::Created) => {
                self.progress
                    .emit(SEED_STEP, StepPhase::Seeded, format!("created {}", path.display()))
                    .await
            }
            Ok(SeedOutcome::AlreadyPresent) => {
                self.progress
                    .emit(SEED_STEP, StepPhase::AlreadyPresent, format!("kept {}", path.display()))
                    .await
            }
            Err(error) => {
                self.progress
                    .emit(SEED_STEP, StepPhase::Failed, error.to_string())
                    .await
            }
        }
        result
    }
}
