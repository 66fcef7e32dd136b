//! Install mechanisms
//!
//! One function per [`InstallMethod`]. Each one only *attempts* the install;
//! whether it worked is decided afterwards by re-probing.

use std::path::Path;
use std::time::Duration;

use super::detection;
use super::error::InstallError;
use super::extract;
use super::process;
use super::spec::{DependencySpec, InstallMethod, InstallerArg, PackageManager, RuntimeLookup};
use tokio::process::Command;

/// Carry out the install mechanism of `spec`.
///
/// # Errors
///
/// Returns the classified failure of the mechanism; a successful return only
/// means the mechanism itself did not report an error.
pub async fn perform(spec: &DependencySpec, query_timeout: Duration) -> Result<(), InstallError> {
    match &spec.install {
        InstallMethod::SilentInstaller { artifact, args } => {
            let mut command = process::command(artifact);
            push_installer_args(&mut command, args);
            process::run(command, &process::program_name(artifact), spec.timeout)
                .await?
                .require_success()?;
            Ok(())
        }
        InstallMethod::ExtractArchive {
            artifact,
            destination,
        } => extract::extract_zip(artifact, destination).await,
        InstallMethod::OfflineWheel { artifact, runtime } => {
            install_wheel(spec, artifact, runtime, query_timeout).await
        }
        InstallMethod::SystemPackages { packages } => {
            install_system_package(packages, spec.timeout).await
        }
    }
}

fn push_installer_args(command: &mut Command, args: &[InstallerArg]) {
    for arg in args {
        match arg {
            #[cfg(windows)]
            InstallerArg::Verbatim(raw) => {
                command.raw_arg(raw);
            }
            _ => {
                command.arg(arg.as_os_str());
            }
        }
    }
}

async fn install_wheel(
    spec: &DependencySpec,
    wheel: &Path,
    runtime: &RuntimeLookup,
    query_timeout: Duration,
) -> Result<(), InstallError> {
    let interpreter = detection::locate_runtime(runtime, query_timeout)
        .await
        .ok_or(InstallError::RuntimeUnavailable(spec.component))?;

    let mut command = process::command(&interpreter);
    command
        .args(["-m", "pip", "install", "--no-index", "--no-deps", "--disable-pip-version-check"])
        .arg(wheel);

    process::run(command, "pip", spec.timeout)
        .await?
        .require_success()?;
    Ok(())
}

/// First supported package manager available on this system.
pub fn detect_package_manager<'a>(
    packages: &'a [(PackageManager, &'static str)],
) -> Option<&'a (PackageManager, &'static str)> {
    packages
        .iter()
        .find(|(manager, _)| which::which(manager.program()).is_ok())
}

async fn install_system_package(
    packages: &[(PackageManager, &'static str)],
    budget: Duration,
) -> Result<(), InstallError> {
    let Some(&(manager, package)) = detect_package_manager(packages) else {
        return Err(InstallError::NoPackageManager {
            hints: manual_hints(packages),
        });
    };

    log::info!("Installing {package} with {}", manager.program());

    let mut command = process::command(manager.program());
    command.args(manager.install_args(package));
    if manager == PackageManager::Apt {
        command.env("DEBIAN_FRONTEND", "noninteractive");
    }

    let result = process::run(command, manager.program(), budget)
        .await
        .and_then(process::CommandOutput::require_success);
    match result {
        Ok(_) => Ok(()),
        Err(InstallError::ExitStatus {
            program,
            status,
            detail,
        }) => Err(InstallError::ExitStatus {
            program,
            status,
            detail: format!("{detail}; install by hand with `{}`", manager.hint(package)),
        }),
        Err(error) => {
            log::warn!("To install by hand: {}", manager.hint(package));
            Err(error)
        }
    }
}

fn manual_hints(packages: &[(PackageManager, &'static str)]) -> String {
    packages
        .iter()
        .map(|(manager, package)| format!("\n  {}", manager.hint(package)))
        .collect()
}
