//! Classified installer failures
//!
//! Every failure a step can hit is mapped onto one of these variants before it
//! reaches the orchestrator; raw subprocess or I/O errors never escape a step.

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::spec::Component;

/// Longest listing printed for an unverified installation target.
const LISTING_LIMIT: usize = 40;

#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    /// The bundled artifact is not where the branch table expects it.
    #[error("missing bundled artifact: expected {}", .0.display())]
    MissingArtifact(PathBuf),

    /// The install mechanism could not be started.
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The install mechanism did not finish within its budget.
    #[error("{program} did not finish within {}s", .after.as_secs())]
    Timeout { program: String, after: Duration },

    /// The install mechanism exited unsuccessfully.
    #[error("{program} exited with {status}{detail}")]
    ExitStatus {
        program: String,
        status: String,
        detail: String,
    },

    #[error("cannot extract {}: {reason}", .archive.display())]
    Extract { archive: PathBuf, reason: String },

    /// Nothing to install the component into.
    #[error("no usable runtime found to install {0} into")]
    RuntimeUnavailable(Component),

    #[error("no supported package manager found; install manually:{hints}")]
    NoPackageManager { hints: String },

    /// The mechanism reported success but the component never showed up.
    #[error(
        "installer reported success but {component} is still absent after {attempts} checks; {}",
        describe_target(.target.as_deref(), .contents)
    )]
    Unverified {
        component: Component,
        attempts: u32,
        target: Option<PathBuf>,
        contents: Vec<String>,
    },
}

impl InstallError {
    /// Build an [`InstallError::Unverified`] with a snapshot of `target`.
    pub fn unverified(component: Component, attempts: u32, target: Option<&Path>) -> Self {
        Self::Unverified {
            component,
            attempts,
            target: target.map(Path::to_path_buf),
            contents: target.map(list_dir).unwrap_or_default(),
        }
    }
}

/// Sorted entry names of `dir`, or a single marker line if it cannot be read.
pub(crate) fn list_dir(dir: &Path) -> Vec<String> {
    match std::fs::read_dir(dir) {
        Ok(entries) => {
            let mut names = entries
                .filter_map(|entry| entry.ok())
                .map(|entry| {
                    let name = entry.file_name().to_string_lossy().into_owned();
                    match entry.file_type() {
                        Ok(kind) if kind.is_dir() => format!("{name}/"),
                        _ => name,
                    }
                })
                .collect::<Vec<_>>();
            names.sort();
            names
        }
        Err(error) => vec![format!("<unreadable: {error}>")],
    }
}

fn describe_target(target: Option<&Path>, contents: &[String]) -> String {
    let Some(target) = target else {
        return "no installation target to inspect".to_string();
    };

    if contents.is_empty() {
        return format!("{} is empty", target.display());
    }

    let mut shown = contents
        .iter()
        .take(LISTING_LIMIT)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if contents.len() > LISTING_LIMIT {
        shown.push_str(&format!(", … ({} more)", contents.len() - LISTING_LIMIT));
    }
    format!("{} contains: {shown}", target.display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn unverified_lists_target_contents() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("readme.txt"), "x").expect("write");
        fs::create_dir(dir.path().join("bin")).expect("mkdir");

        let error = InstallError::unverified(Component::Toolkit, 3, Some(dir.path()));
        let message = error.to_string();

        assert!(message.contains("after 3 checks"), "{message}");
        assert!(message.contains("bin/, readme.txt"), "{message}");
    }

    #[test]
    fn unverified_reports_missing_target() {
        let dir = tempfile::tempdir().expect("tempdir");
        let error = InstallError::unverified(Component::Runtime, 1, Some(&dir.path().join("gone")));

        assert!(error.to_string().contains("<unreadable"));
    }
}
