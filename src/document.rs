//! Persisted configuration document
//!
//! The editor keeps its state in one JSON file:
//!
//! ```json
//! { "tree": [ { "text": "Root", "children": [] } ],
//!   "settings": { "theme": "default" } }
//! ```
//!
//! Saving the tree rewrites only the `"tree"` key of whatever document is
//! already on disk; `"settings"` and any other keys survive untouched.

use crate::tree::{self, TreeNode, TreeShapeError};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, ser::PrettyFormatter};
use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;

const TREE_KEY: &str = "tree";

/// Application state persisted by the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationDocument {
    #[serde(default)]
    pub tree: Vec<TreeNode>,
    #[serde(default)]
    pub settings: Map<String, Value>,
}

impl Default for ConfigurationDocument {
    fn default() -> Self {
        let mut settings = Map::new();
        settings.insert("theme".into(), Value::String("default".into()));

        Self {
            tree: tree::example_forest(),
            settings,
        }
    }
}

impl ConfigurationDocument {
    /// Render as 4-space indented JSON.
    ///
    /// # Errors
    ///
    /// - Return [`DocumentError::Json`] if serialization fails.
    pub fn to_pretty_json(&self) -> Result<String> {
        to_pretty_json(self)
    }

    /// Read a whole document from disk.
    ///
    /// # Errors
    ///
    /// - Return [`DocumentError::Io`] if the file cannot be read.
    /// - Return [`DocumentError::Json`] if it is not a valid document.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&data)?)
    }
}

/// Load the `"tree"` entry of the document at `path`.
///
/// A missing file or a document without `"tree"` yields an empty forest.
///
/// # Errors
///
/// - Return [`DocumentError::Io`] if the file exists but cannot be read.
/// - Return [`DocumentError::Json`] if the file is not valid JSON.
/// - Return [`DocumentError::Shape`] if `"tree"` has the wrong structure.
pub fn load_tree(path: impl AsRef<Path>) -> Result<Vec<TreeNode>> {
    let path = path.as_ref();
    let Some(document) = read_value(path)? else {
        return Ok(Vec::new());
    };

    match document.get(TREE_KEY) {
        Some(value) => Ok(tree::forest_from_value(value)?),
        None => Ok(Vec::new()),
    }
}

/// Replace only the `"tree"` entry of the document at `path`.
///
/// The existing document is read first so every other key is preserved. When
/// no document exists yet, a default one carrying `forest` is written.
///
/// # Errors
///
/// - Return [`DocumentError::Io`] on read/write failures.
/// - Return [`DocumentError::Json`] if the existing file is not valid JSON.
/// - Return [`DocumentError::NotAnObject`] if the existing document is not a JSON object.
pub fn save_tree(path: impl AsRef<Path>, forest: &[TreeNode]) -> Result<()> {
    let path = path.as_ref();
    let document = match read_value(path)? {
        Some(Value::Object(mut object)) => {
            object.insert(TREE_KEY.into(), tree::forest_to_value(forest));
            Value::Object(object)
        }
        Some(_) => return Err(DocumentError::NotAnObject(path.to_path_buf())),
        None => {
            let fresh = ConfigurationDocument {
                tree: forest.to_vec(),
                ..ConfigurationDocument::default()
            };
            serde_json::to_value(fresh)?
        }
    };

    let rendered = to_pretty_json(&document)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let io_error = |source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    };

    fs::create_dir_all(dir).map_err(|source| DocumentError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    // Write beside the target and rename over it so readers never see a
    // truncated document.
    let mut staged = NamedTempFile::new_in(dir).map_err(io_error)?;
    staged.write_all(rendered.as_bytes()).map_err(io_error)?;
    staged.as_file().sync_all().map_err(io_error)?;
    staged.persist(path).map_err(|error| io_error(error.error))?;
    Ok(())
}

fn read_value(path: &Path) -> Result<Option<Value>> {
    match fs::read_to_string(path) {
        Ok(data) => Ok(Some(serde_json::from_str(&data)?)),
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(DocumentError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

pub(crate) fn to_pretty_json(value: &impl Serialize) -> Result<String> {
    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;
    buffer.push(b'\n');

    // serde_json only ever emits UTF-8.
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("cannot access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Shape(#[from] TreeShapeError),

    #[error("document at {0:?} is not a JSON object")]
    NotAnObject(PathBuf),
}

type Result<T, E = DocumentError> = std::result::Result<T, E>;
