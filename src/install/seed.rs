//! First-run configuration document

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::document::{ConfigurationDocument, DocumentError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Created,
    /// A document was already there and was left byte-for-byte untouched.
    AlreadyPresent,
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("{} exists but is not a file", .0.display())]
    NotAFile(PathBuf),

    #[error("cannot write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Render(#[from] DocumentError),
}

type Result<T, E = SeedError> = std::result::Result<T, E>;

/// Make sure a configuration document exists at `path`.
///
/// An existing file is never opened for writing. The default document is
/// written with create-new semantics, so a file that appears between the
/// check and the write wins.
///
/// # Errors
///
/// - Return [`SeedError::NotAFile`] if something other than a file occupies `path`.
/// - Return [`SeedError::Io`] if the directories or the file cannot be written.
pub fn ensure(path: &Path) -> Result<SeedOutcome> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => return Err(SeedError::NotAFile(path.to_path_buf())),
        Ok(_) => {
            log::info!("Keeping existing configuration at {}", path.display());
            return Ok(SeedOutcome::AlreadyPresent);
        }
        Err(error) if error.kind() == ErrorKind::NotFound => {}
        Err(source) => {
            return Err(SeedError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| SeedError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let contents = ConfigurationDocument::default().to_pretty_json()?;
    let io_error = |source| SeedError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(error) if error.kind() == ErrorKind::AlreadyExists => {
            log::info!("Configuration appeared at {} meanwhile, keeping it", path.display());
            return Ok(SeedOutcome::AlreadyPresent);
        }
        Err(source) => return Err(io_error(source)),
    };
    file.write_all(contents.as_bytes()).map_err(io_error)?;
    file.sync_all().map_err(io_error)?;

    log::info!("Created default configuration at {}", path.display());
    Ok(SeedOutcome::Created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document;
    use crate::tree;
    use pretty_assertions::assert_eq;

    #[test]
    fn creates_default_document_and_parents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data").join("configuration.json");

        assert_eq!(ensure(&path).expect("seed"), SeedOutcome::Created);

        let document = ConfigurationDocument::load(&path).expect("load");
        assert_eq!(document, ConfigurationDocument::default());
        assert_eq!(document::load_tree(&path).expect("tree"), tree::example_forest());

        let raw = fs::read_to_string(&path).expect("read");
        assert!(raw.contains("\n    \"settings\""), "{raw}");
    }

    #[test]
    fn existing_document_is_byte_identical() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("configuration.json");
        let original = b"{\"tree\":[],\"settings\":{\"theme\":\"dark\"}}   \n\n";
        fs::write(&path, original).expect("write");

        assert_eq!(ensure(&path).expect("seed"), SeedOutcome::AlreadyPresent);
        assert_eq!(ensure(&path).expect("seed again"), SeedOutcome::AlreadyPresent);
        assert_eq!(fs::read(&path).expect("read"), original);
    }

    #[test]
    fn even_invalid_json_is_left_alone() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("configuration.json");
        fs::write(&path, "not json").expect("write");

        assert_eq!(ensure(&path).expect("seed"), SeedOutcome::AlreadyPresent);
        assert_eq!(fs::read_to_string(&path).expect("read"), "not json");
    }

    #[test]
    fn directory_in_the_way_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("configuration.json");
        fs::create_dir(&path).expect("mkdir");

        assert!(matches!(ensure(&path), Err(SeedError::NotAFile(_))));
    }
}
