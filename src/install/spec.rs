//! Declarative description of one installable dependency
//!
//! A branch is nothing more than an ordered list of [`DependencySpec`] values.
//! Each spec says how to tell whether the dependency is present
//! ([`ProbeKind`]), how to install it ([`InstallMethod`]) and whether a
//! failure aborts the branch ([`Criticality`]).

use std::ffi::{OsStr, OsString};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Logical dependency names, in the order they depend on each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Component {
    Runtime,
    Toolkit,
    Bindings,
    Converter,
}

impl Component {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Runtime => "runtime",
            Self::Toolkit => "windowing-toolkit",
            Self::Bindings => "toolkit-bindings",
            Self::Converter => "converter-tool",
        }
    }
}

impl Display for Component {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criticality {
    /// Failure aborts the remaining steps of the branch.
    Critical,
    /// Failure is downgraded to a warning.
    Optional,
}

/// Acceptable runtime versions: same major, minor within bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeRequirement {
    pub major: u32,
    pub min_minor: u32,
    pub max_minor: Option<u32>,
}

impl RuntimeRequirement {
    pub const fn at_least(major: u32, min_minor: u32) -> Self {
        Self {
            major,
            min_minor,
            max_minor: None,
        }
    }

    pub const fn exactly(major: u32, minor: u32) -> Self {
        Self {
            major,
            min_minor: minor,
            max_minor: Some(minor),
        }
    }

    pub fn accepts(&self, (major, minor): (u32, u32)) -> bool {
        major == self.major
            && minor >= self.min_minor
            && self.max_minor.is_none_or(|max| minor <= max)
    }
}

impl Display for RuntimeRequirement {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self.max_minor {
            Some(max) if max == self.min_minor => write!(fmt, "{}.{}", self.major, max),
            Some(max) => write!(fmt, "{}.{}-{}.{}", self.major, self.min_minor, self.major, max),
            None => write!(fmt, ">={}.{}", self.major, self.min_minor),
        }
    }
}

/// Where to look for the language runtime, in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeLookup {
    /// Executables inside the project's own runtime directory.
    pub local: Vec<PathBuf>,
    /// Well-known system install locations.
    pub system: Vec<PathBuf>,
    /// Names searched on the executable search path.
    pub names: Vec<&'static str>,
    pub requirement: RuntimeRequirement,
}

/// Presence check for one dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeKind {
    /// A runtime executable reporting a compatible version.
    Runtime(RuntimeLookup),

    /// A vendored toolkit directory containing a specific shared library.
    VendorLibrary { dir: PathBuf, library: PathBuf },

    /// A system package reporting its version through `pkg-config`.
    PkgConfig { module: &'static str },

    /// Bindings importable from the runtime with an acceptable toolkit version.
    Bindings {
        runtime: RuntimeLookup,
        toolkit_major: u32,
        /// Directories prepended to the search path while importing.
        library_dirs: Vec<PathBuf>,
    },

    /// An executable found on the search path or in extra directories.
    Executable {
        names: Vec<&'static str>,
        extra_dirs: Vec<PathBuf>,
    },
}

/// Supported system package managers, in detection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Apt,
    Dnf,
    Yum,
    Pacman,
    Zypper,
}

impl PackageManager {
    pub const fn program(self) -> &'static str {
        match self {
            Self::Apt => "apt-get",
            Self::Dnf => "dnf",
            Self::Yum => "yum",
            Self::Pacman => "pacman",
            Self::Zypper => "zypper",
        }
    }

    /// Non-interactive install arguments for `package`.
    pub fn install_args(self, package: &str) -> Vec<String> {
        let args: &[&str] = match self {
            Self::Apt => &["install", "-y"],
            Self::Dnf | Self::Yum => &["install", "-y"],
            Self::Pacman => &["-S", "--noconfirm", "--needed"],
            Self::Zypper => &["--non-interactive", "install"],
        };
        args.iter()
            .map(ToString::to_string)
            .chain(std::iter::once(package.to_string()))
            .collect()
    }

    /// Command line an operator can run by hand.
    pub fn hint(self, package: &str) -> String {
        format!("sudo {} {}", self.program(), self.install_args(package).join(" "))
    }
}

/// One command-line argument of a bundled installer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallerArg {
    /// Quoted by the platform as needed.
    Plain(OsString),
    /// Appended to the Windows command line exactly as written, never quoted.
    /// NSIS parses `/D=` up to the end of the line and rejects quotes.
    Verbatim(OsString),
}

impl InstallerArg {
    pub fn as_os_str(&self) -> &OsStr {
        match self {
            Self::Plain(arg) | Self::Verbatim(arg) => arg,
        }
    }
}

impl From<&str> for InstallerArg {
    fn from(arg: &str) -> Self {
        Self::Plain(arg.into())
    }
}

/// How a dependency gets installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallMethod {
    /// Run a bundled installer executable with unattended flags.
    SilentInstaller {
        artifact: PathBuf,
        args: Vec<InstallerArg>,
    },

    /// Unpack a bundled zip archive into `destination`.
    ExtractArchive { artifact: PathBuf, destination: PathBuf },

    /// Install a bundled wheel into the runtime without network access.
    OfflineWheel { artifact: PathBuf, runtime: RuntimeLookup },

    /// Ask the first available package manager for its package name.
    SystemPackages { packages: Vec<(PackageManager, &'static str)> },
}

impl InstallMethod {
    /// The bundled file this method consumes, if any.
    pub fn artifact(&self) -> Option<&Path> {
        match self {
            Self::SilentInstaller { artifact, .. }
            | Self::ExtractArchive { artifact, .. }
            | Self::OfflineWheel { artifact, .. } => Some(artifact),
            Self::SystemPackages { .. } => None,
        }
    }
}

/// One installable unit of a branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySpec {
    pub component: Component,
    pub criticality: Criticality,
    pub probe: ProbeKind,
    pub install: InstallMethod,
    /// Budget for the install mechanism's child process.
    pub timeout: Duration,
    /// Directory expected to hold the installed files, listed on verification failure.
    pub target: Option<PathBuf>,
}

impl DependencySpec {
    pub fn is_critical(&self) -> bool {
        self.criticality == Criticality::Critical
    }
}
