//! Seam between the orchestrator and the machine it changes

use crate::config::InstallerConfig;

use super::detection;
use super::error::InstallError;
use super::mechanism;
use super::spec::DependencySpec;

/// Probes and installs dependencies.
///
/// [`SystemProvisioner`] talks to the real machine; tests drive the
/// orchestrator with scripted implementations instead.
#[allow(async_fn_in_trait)]
pub trait Provisioner {
    /// Whether the dependency is usable right now. Must not change anything.
    async fn present(&self, spec: &DependencySpec) -> bool;

    /// Attempt the install mechanism once.
    async fn install(&self, spec: &DependencySpec) -> Result<(), InstallError>;
}

/// Provisioner backed by real probes and child processes.
#[derive(Debug, Clone, Default)]
pub struct SystemProvisioner {
    config: InstallerConfig,
}

impl SystemProvisioner {
    pub fn new(config: InstallerConfig) -> Self {
        Self { config }
    }
}

impl Provisioner for SystemProvisioner {
    async fn present(&self, spec: &DependencySpec) -> bool {
        detection::present(&spec.probe, self.config.query_timeout).await
    }

    async fn install(&self, spec: &DependencySpec) -> Result<(), InstallError> {
        mechanism::perform(spec, self.config.query_timeout).await
    }
}
