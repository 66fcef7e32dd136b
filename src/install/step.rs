//! Probe → Install → Verify for a single dependency

use super::error::InstallError;
use super::poll::{RetryPolicy, poll_until};
use super::progress::{Progress, StepPhase};
use super::provisioner::Provisioner;
use super::spec::{Component, Criticality, DependencySpec};

/// Lifecycle of one step.
///
/// ```text
/// NotStarted → Probing → AlreadyPresent
///                      → Installing → Verifying → Succeeded
///                                   ↘           ↘ Failed
///                                     Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    NotStarted,
    Probing,
    AlreadyPresent,
    Installing,
    Verifying,
    Succeeded,
    Failed,
}

impl StepState {
    pub fn can_advance_to(self, next: Self) -> bool {
        use StepState::*;

        matches!(
            (self, next),
            (NotStarted, Probing)
                | (Probing, AlreadyPresent | Installing)
                | (Installing, Verifying | Failed)
                | (Verifying, Succeeded | Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::AlreadyPresent | Self::Succeeded | Self::Failed)
    }
}

/// Tracks a step's state and refuses illegal transitions.
#[derive(Debug)]
struct Tracker {
    component: Component,
    state: StepState,
}

impl Tracker {
    fn new(component: Component) -> Self {
        Self {
            component,
            state: StepState::NotStarted,
        }
    }

    fn advance(&mut self, next: StepState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "{}: illegal transition {:?} -> {next:?}",
            self.component,
            self.state
        );
        log::trace!("{}: {:?} -> {next:?}", self.component, self.state);
        self.state = next;
    }
}

/// Final result of one step.
#[derive(Debug)]
pub enum StepResult {
    AlreadyPresent,
    InstalledSuccessfully,
    /// An optional step failed; the branch continued.
    InstalledWithWarning(InstallError),
    Failed(InstallError),
}

#[derive(Debug)]
pub struct StepReport {
    pub component: Component,
    pub criticality: Criticality,
    pub result: StepResult,
}

impl StepReport {
    pub fn is_failure(&self) -> bool {
        matches!(self.result, StepResult::Failed(_))
    }

    pub fn warning(&self) -> Option<&InstallError> {
        match &self.result {
            StepResult::InstalledWithWarning(error) => Some(error),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&InstallError> {
        match &self.result {
            StepResult::InstalledWithWarning(error) | StepResult::Failed(error) => Some(error),
            _ => None,
        }
    }
}

/// Run one dependency through probe, install and verify.
///
/// Never returns an error: every failure is classified into the report.
pub async fn run_step<P: Provisioner>(
    provisioner: &P,
    spec: &DependencySpec,
    policy: RetryPolicy,
    progress: &Progress,
) -> StepReport {
    let name = spec.component.name();
    let mut tracker = Tracker::new(spec.component);

    tracker.advance(StepState::Probing);
    progress.emit(name, StepPhase::Probing, "checking").await;
    if provisioner.present(spec).await {
        tracker.advance(StepState::AlreadyPresent);
        progress.emit(name, StepPhase::AlreadyPresent, "already present").await;
        return report(spec, StepResult::AlreadyPresent);
    }

    tracker.advance(StepState::Installing);
    progress.emit(name, StepPhase::Installing, "installing").await;
    let outcome = install_and_verify(provisioner, spec, policy, progress, &mut tracker).await;

    let result = match outcome {
        Ok(()) => {
            tracker.advance(StepState::Succeeded);
            progress.emit(name, StepPhase::Installed, "installed").await;
            StepResult::InstalledSuccessfully
        }
        Err(error) => {
            tracker.advance(StepState::Failed);
            let message = error.to_string();
            if spec.is_critical() {
                progress.emit(name, StepPhase::Failed, message).await;
                StepResult::Failed(error)
            } else {
                progress.emit(name, StepPhase::Warning, message).await;
                StepResult::InstalledWithWarning(error)
            }
        }
    };
    debug_assert!(tracker.state.is_terminal());
    report(spec, result)
}

async fn install_and_verify<P: Provisioner>(
    provisioner: &P,
    spec: &DependencySpec,
    policy: RetryPolicy,
    progress: &Progress,
    tracker: &mut Tracker,
) -> Result<(), InstallError> {
    if let Some(artifact) = spec.install.artifact() {
        if !artifact.is_file() {
            return Err(InstallError::MissingArtifact(artifact.to_path_buf()));
        }
    }

    provisioner.install(spec).await?;

    tracker.advance(StepState::Verifying);
    progress.emit(spec.component.name(), StepPhase::Verifying, "verifying").await;
    match poll_until(policy, move || provisioner.present(spec)).await {
        Some(attempt) => {
            log::debug!("{} confirmed on check {attempt}", spec.component);
            Ok(())
        }
        None => Err(InstallError::unverified(
            spec.component,
            policy.attempts,
            spec.target.as_deref(),
        )),
    }
}

fn report(spec: &DependencySpec, result: StepResult) -> StepReport {
    StepReport {
        component: spec.component,
        criticality: spec.criticality,
        result,
    }
}
