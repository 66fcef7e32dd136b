//! Dependency installation
//!
//! A branch is an ordered table of [`DependencySpec`]s. The [`Orchestrator`]
//! walks the table, running each dependency through probe, install and
//! verify, and finishes by seeding the configuration document. Re-running is
//! always safe: anything already present is only probed.

pub mod artifacts;
mod branch;
mod detection;
mod error;
mod extract;
mod mechanism;
mod orchestration;
mod poll;
mod process;
mod progress;
mod provisioner;
pub mod runners;
mod seed;
mod spec;
mod step;

#[cfg(test)]
mod testing;

pub use branch::{Branch, UnknownBranch};
pub use detection::{find_executable, locate_runtime, parse_version, present};
pub use error::InstallError;
pub use orchestration::{Orchestrator, Outcome, RunSummary, SEED_STEP};
pub use poll::{RetryPolicy, poll_until};
pub use progress::{InstallProgress, Progress, StepPhase};
pub use provisioner::{Provisioner, SystemProvisioner};
pub use seed::{SeedError, SeedOutcome, ensure as ensure_configuration};
pub use spec::{
    Component, Criticality, DependencySpec, InstallMethod, InstallerArg, PackageManager, ProbeKind,
    RuntimeLookup, RuntimeRequirement,
};
pub use step::{StepReport, StepResult, StepState, run_step};
