//! Project path resolution
//!
//! Every path the installer touches hangs off a single project root. The root
//! is the parent of the directory holding the installer executable, so a
//! layout of `<root>/bin/treedoc-install` resolves to `<root>`.

use std::path::{Path, PathBuf};

/// Environment variable that overrides the discovered project root.
pub const ROOT_ENV: &str = "TREEDOC_ROOT";

/// Resolves installation targets and bundled artifacts relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    root: PathBuf,
}

impl Locator {
    /// Build a locator for an explicit project root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Derive the project root from the installer's own path.
    ///
    /// The root is one level above the directory containing the installer.
    /// An installer sitting directly in a filesystem root uses that directory.
    pub fn from_installer_path(installer: &Path) -> Option<Self> {
        let dir = installer.parent()?;
        let root = dir.parent().unwrap_or(dir);
        Some(Self::new(root))
    }

    /// Discover the project root for the running process.
    ///
    /// `TREEDOC_ROOT` wins when set and non-empty, otherwise the current
    /// executable's location is used.
    ///
    /// # Errors
    ///
    /// - Return [`LocatorError::CurrentExe`] if the executable path is unavailable.
    /// - Return [`LocatorError::NoParent`] if the executable has no parent directory.
    pub fn discover() -> Result<Self> {
        if let Some(root) = std::env::var_os(ROOT_ENV).filter(|v| !v.is_empty()) {
            log::debug!("project root taken from {ROOT_ENV}");
            return Ok(Self::new(root));
        }

        let exe = std::env::current_exe().map_err(LocatorError::CurrentExe)?;
        let exe = exe.canonicalize().unwrap_or(exe);
        Self::from_installer_path(&exe).ok_or(LocatorError::NoParent(exe))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Join arbitrary segments onto the project root.
    pub fn project_path<I, S>(&self, segments: I) -> PathBuf
    where
        I: IntoIterator<Item = S>,
        S: AsRef<Path>,
    {
        segments
            .into_iter()
            .fold(self.root.clone(), |path, segment| path.join(segment))
    }

    pub fn data_dir(&self) -> PathBuf {
        self.project_path(["data"])
    }

    /// Directory holding bundled third-party installer artifacts.
    pub fn packages_dir(&self) -> PathBuf {
        self.project_path(["data", "packages"])
    }

    /// Path of a bundled artifact by its fixed filename.
    pub fn package(&self, file_name: &str) -> PathBuf {
        self.packages_dir().join(file_name)
    }

    pub fn vendor_dir(&self) -> PathBuf {
        self.project_path(["vendor"])
    }

    /// Directory receiving the offline GTK runtime.
    pub fn toolkit_dir(&self) -> PathBuf {
        self.project_path(["vendor", "gtk-windows"])
    }

    /// Directory receiving the extracted runtime and converter tool.
    pub fn installed_dir(&self) -> PathBuf {
        self.project_path(["data", "installed"])
    }

    pub fn runtime_dir(&self) -> PathBuf {
        self.installed_dir().join("python")
    }

    /// The editor's persisted configuration document.
    pub fn config_file(&self) -> PathBuf {
        self.project_path(["data", "configuration.json"])
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LocatorError {
    #[error("cannot determine installer location: {0}")]
    CurrentExe(#[source] std::io::Error),

    #[error("installer path {0:?} has no parent directory")]
    NoParent(PathBuf),
}

type Result<T, E = LocatorError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn root_is_one_level_above_installer_dir() {
        let locator = Locator::from_installer_path(Path::new("/opt/treedoc/bin/treedoc-install"))
            .expect("installer path has a parent");

        assert_eq!(locator.root(), Path::new("/opt/treedoc"));
    }

    #[test]
    fn derived_paths_hang_off_root() {
        let locator = Locator::new("/srv/app");

        assert_eq!(locator.packages_dir(), PathBuf::from("/srv/app/data/packages"));
        assert_eq!(
            locator.package("NConvert-win64.zip"),
            PathBuf::from("/srv/app/data/packages/NConvert-win64.zip")
        );
        assert_eq!(locator.toolkit_dir(), PathBuf::from("/srv/app/vendor/gtk-windows"));
        assert_eq!(locator.installed_dir(), PathBuf::from("/srv/app/data/installed"));
        assert_eq!(locator.runtime_dir(), PathBuf::from("/srv/app/data/installed/python"));
        assert_eq!(
            locator.config_file(),
            PathBuf::from("/srv/app/data/configuration.json")
        );
    }

    #[test]
    fn resolution_is_deterministic() {
        let a = Locator::from_installer_path(Path::new("/x/scripts/install"));
        let b = Locator::from_installer_path(Path::new("/x/scripts/install"));

        assert_eq!(a, b);
    }
}
