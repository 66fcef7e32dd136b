//! Platform branches and their ordered dependency tables
//!
//! Both branches install the same four components in the same order; only the
//! probes and install mechanisms differ. Keeping the order in one place stops
//! the two branches from drifting apart.

use std::ffi::OsString;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::str::FromStr;

use super::artifacts;
use super::spec::{
    Component, Criticality, DependencySpec, InstallMethod, InstallerArg, PackageManager,
    ProbeKind, RuntimeLookup, RuntimeRequirement,
};
use crate::config::InstallerConfig;
use crate::locator::Locator;

/// GTK major version the editor is written against.
const TOOLKIT_MAJOR: u32 = 3;

/// Platform branch selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    /// Windows-style: everything comes from bundled artifacts, fully offline.
    Offline,
    /// Linux-style: the system package manager provides every component.
    SystemPackages,
}

impl Branch {
    /// Command-line token selecting this branch.
    pub const fn token(self) -> &'static str {
        match self {
            Self::Offline => "windows",
            Self::SystemPackages => "linux",
        }
    }

    /// Ordered dependency table for this branch.
    ///
    /// Order is normative: runtime, toolkit, converter, bindings. The bindings
    /// need both the runtime and the toolkit in place before they can import.
    pub fn steps(self, locator: &Locator, config: &InstallerConfig) -> Vec<DependencySpec> {
        match self {
            Self::Offline => offline_steps(locator, config),
            Self::SystemPackages => system_steps(locator, config),
        }
    }
}

impl Display for Branch {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.token())
    }
}

impl FromStr for Branch {
    type Err = UnknownBranch;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "windows" => Ok(Self::Offline),
            "linux" => Ok(Self::SystemPackages),
            other => Err(UnknownBranch(other.to_string())),
        }
    }
}

/// Unrecognized platform selector.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported platform: {0:?} (expected `windows` or `linux`)")]
pub struct UnknownBranch(pub String);

fn offline_runtime(locator: &Locator) -> RuntimeLookup {
    let mut system = vec![
        PathBuf::from(r"C:\Python311\python.exe"),
        PathBuf::from(r"C:\Program Files\Python311\python.exe"),
    ];
    if let Some(local_data) = dirs::data_local_dir() {
        system.push(local_data.join(r"Programs\Python\Python311\python.exe"));
    }

    RuntimeLookup {
        local: vec![locator.runtime_dir().join("python.exe")],
        system,
        names: vec!["python"],
        requirement: RuntimeRequirement::exactly(3, 11),
    }
}

fn offline_steps(locator: &Locator, config: &InstallerConfig) -> Vec<DependencySpec> {
    let runtime = offline_runtime(locator);
    let runtime_dir = locator.runtime_dir();
    let toolkit_dir = locator.toolkit_dir();
    let installed_dir = locator.installed_dir();

    vec![
        DependencySpec {
            component: Component::Runtime,
            criticality: Criticality::Critical,
            probe: ProbeKind::Runtime(runtime.clone()),
            install: InstallMethod::SilentInstaller {
                artifact: locator.package(artifacts::RUNTIME_INSTALLER),
                args: [
                    "/quiet",
                    "InstallAllUsers=0",
                    "Include_pip=1",
                    "Include_launcher=0",
                    "PrependPath=0",
                    "Shortcuts=0",
                ]
                .into_iter()
                .map(InstallerArg::from)
                .chain(std::iter::once(InstallerArg::Plain(target_arg(
                    "TargetDir=",
                    &runtime_dir,
                ))))
                .collect(),
            },
            timeout: config.runtime_install_timeout,
            target: Some(runtime_dir),
        },
        DependencySpec {
            component: Component::Toolkit,
            criticality: Criticality::Critical,
            probe: ProbeKind::VendorLibrary {
                dir: toolkit_dir.clone(),
                library: PathBuf::from(artifacts::TOOLKIT_LIBRARY),
            },
            install: InstallMethod::SilentInstaller {
                artifact: locator.package(artifacts::TOOLKIT_INSTALLER),
                // INVARIANT: NSIS requires /D to be the last argument, unquoted.
                args: vec![
                    "/S".into(),
                    InstallerArg::Verbatim(target_arg("/D=", &toolkit_dir)),
                ],
            },
            timeout: config.install_timeout,
            target: Some(toolkit_dir.clone()),
        },
        DependencySpec {
            component: Component::Converter,
            criticality: Criticality::Optional,
            probe: ProbeKind::Executable {
                names: vec!["nconvert"],
                extra_dirs: vec![installed_dir.join("NConvert"), installed_dir.clone()],
            },
            install: InstallMethod::ExtractArchive {
                artifact: locator.package(artifacts::CONVERTER_ARCHIVE),
                destination: installed_dir.clone(),
            },
            timeout: config.install_timeout,
            target: Some(installed_dir),
        },
        DependencySpec {
            component: Component::Bindings,
            criticality: Criticality::Critical,
            probe: ProbeKind::Bindings {
                runtime: runtime.clone(),
                toolkit_major: TOOLKIT_MAJOR,
                library_dirs: vec![toolkit_dir.join("bin")],
            },
            install: InstallMethod::OfflineWheel {
                artifact: locator.package(artifacts::BINDINGS_WHEEL),
                runtime,
            },
            timeout: config.install_timeout,
            target: Some(locator.runtime_dir().join("Lib").join("site-packages")),
        },
    ]
}

fn system_runtime(locator: &Locator) -> RuntimeLookup {
    RuntimeLookup {
        local: vec![locator.runtime_dir().join("bin").join("python3")],
        system: vec![
            PathBuf::from("/usr/bin/python3"),
            PathBuf::from("/usr/local/bin/python3"),
        ],
        names: vec!["python3"],
        requirement: RuntimeRequirement::at_least(3, 8),
    }
}

fn system_steps(locator: &Locator, config: &InstallerConfig) -> Vec<DependencySpec> {
    use PackageManager::{Apt, Dnf, Pacman, Yum, Zypper};

    let runtime = system_runtime(locator);

    vec![
        DependencySpec {
            component: Component::Runtime,
            criticality: Criticality::Critical,
            probe: ProbeKind::Runtime(runtime.clone()),
            install: InstallMethod::SystemPackages {
                packages: vec![
                    (Apt, "python3"),
                    (Dnf, "python3"),
                    (Yum, "python3"),
                    (Pacman, "python"),
                    (Zypper, "python3"),
                ],
            },
            timeout: config.runtime_install_timeout,
            target: None,
        },
        DependencySpec {
            component: Component::Toolkit,
            criticality: Criticality::Critical,
            probe: ProbeKind::PkgConfig { module: "gtk+-3.0" },
            install: InstallMethod::SystemPackages {
                packages: vec![
                    (Apt, "libgtk-3-dev"),
                    (Dnf, "gtk3-devel"),
                    (Yum, "gtk3-devel"),
                    (Pacman, "gtk3"),
                    (Zypper, "gtk3-devel"),
                ],
            },
            timeout: config.install_timeout,
            target: None,
        },
        DependencySpec {
            component: Component::Converter,
            criticality: Criticality::Optional,
            probe: ProbeKind::Executable {
                names: vec!["magick", "convert"],
                extra_dirs: Vec::new(),
            },
            install: InstallMethod::SystemPackages {
                packages: vec![
                    (Apt, "imagemagick"),
                    (Dnf, "ImageMagick"),
                    (Yum, "ImageMagick"),
                    (Pacman, "imagemagick"),
                    (Zypper, "ImageMagick"),
                ],
            },
            timeout: config.install_timeout,
            target: None,
        },
        DependencySpec {
            component: Component::Bindings,
            criticality: Criticality::Critical,
            probe: ProbeKind::Bindings {
                runtime,
                toolkit_major: TOOLKIT_MAJOR,
                library_dirs: Vec::new(),
            },
            install: InstallMethod::SystemPackages {
                packages: vec![
                    (Apt, "python3-gi"),
                    (Dnf, "python3-gobject"),
                    (Yum, "python3-gobject"),
                    (Pacman, "python-gobject"),
                    (Zypper, "python3-gobject"),
                ],
            },
            timeout: config.install_timeout,
            target: None,
        },
    ]
}

fn target_arg(prefix: &str, dir: &std::path::Path) -> OsString {
    let mut arg = OsString::from(prefix);
    arg.push(dir.as_os_str());
    arg
}
