//! Tree document model
//!
//! A document is a forest: an ordered list of root nodes, each carrying a
//! text label and an ordered list of children. Nodes are addressed by index
//! paths, `[0, 2]` being the third child of the first root.
//!
//! The JSON node shape is `{"text": "<label>", "children": [...]}` with
//! `"children"` optional on read.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Label given to nodes created through [`Forest::append`] without a name.
pub const NEW_NODE_LABEL: &str = "New Node";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub text: String,
    #[serde(default)]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn leaf(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(text: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            text: text.into(),
            children,
        }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(TreeNode::subtree_len).sum::<usize>()
    }
}

/// The sample tree seeded into a fresh configuration document.
pub fn example_forest() -> Vec<TreeNode> {
    vec![TreeNode::with_children(
        "Root",
        vec![
            TreeNode::with_children("Child 1", vec![TreeNode::leaf("Grandchild 1")]),
            TreeNode::leaf("Child 2"),
        ],
    )]
}

/// Map a forest onto its JSON node shape.
pub fn forest_to_value(forest: &[TreeNode]) -> Value {
    Value::Array(forest.iter().map(node_to_value).collect())
}

fn node_to_value(node: &TreeNode) -> Value {
    let mut object = Map::new();
    object.insert("text".into(), Value::String(node.text.clone()));
    object.insert("children".into(), forest_to_value(&node.children));
    Value::Object(object)
}

/// Rebuild a forest from its JSON node shape.
///
/// Only the structure is validated: an array of objects with a string
/// `"text"` and, when present, an array `"children"`. Unknown keys are ignored.
///
/// # Errors
///
/// - Return [`TreeShapeError`] naming the offending location on a shape mismatch.
pub fn forest_from_value(value: &Value) -> Result<Vec<TreeNode>, TreeShapeError> {
    forest_at(value, "tree")
}

fn forest_at(value: &Value, location: &str) -> Result<Vec<TreeNode>, TreeShapeError> {
    let items = value.as_array().ok_or_else(|| TreeShapeError {
        location: location.to_string(),
        expected: "an array of nodes",
    })?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| node_at(item, &format!("{location}[{index}]")))
        .collect()
}

fn node_at(value: &Value, location: &str) -> Result<TreeNode, TreeShapeError> {
    let object = value.as_object().ok_or_else(|| TreeShapeError {
        location: location.to_string(),
        expected: "a node object",
    })?;

    let text = object
        .get("text")
        .and_then(Value::as_str)
        .ok_or_else(|| TreeShapeError {
            location: format!("{location}.text"),
            expected: "a string label",
        })?;

    let children = match object.get("children") {
        None | Some(Value::Null) => Vec::new(),
        Some(children) => forest_at(children, &format!("{location}.children"))?,
    };

    Ok(TreeNode::with_children(text, children))
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed tree at {location}: expected {expected}")]
pub struct TreeShapeError {
    pub location: String,
    pub expected: &'static str,
}

/// Editable forest addressed by index paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Forest {
    roots: Vec<TreeNode>,
}

impl Forest {
    pub fn new(roots: Vec<TreeNode>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[TreeNode] {
        &self.roots
    }

    pub fn into_roots(self) -> Vec<TreeNode> {
        self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total number of nodes across all roots.
    pub fn len(&self) -> usize {
        self.roots.iter().map(TreeNode::subtree_len).sum()
    }

    pub fn get(&self, path: &[usize]) -> Option<&TreeNode> {
        let (first, rest) = path.split_first()?;
        rest.iter()
            .try_fold(self.roots.get(*first)?, |node, index| node.children.get(*index))
    }

    pub fn get_mut(&mut self, path: &[usize]) -> Option<&mut TreeNode> {
        let (first, rest) = path.split_first()?;
        let mut node = self.roots.get_mut(*first)?;
        for index in rest {
            node = node.children.get_mut(*index)?;
        }
        Some(node)
    }

    /// Append a node under `parent`, or as a new root when `parent` is `None`.
    ///
    /// Returns the path of the inserted node, or `None` if `parent` does not
    /// address an existing node.
    pub fn append(&mut self, parent: Option<&[usize]>, text: impl Into<String>) -> Option<Vec<usize>> {
        let node = TreeNode::leaf(text);
        match parent {
            None => {
                self.roots.push(node);
                Some(vec![self.roots.len() - 1])
            }
            Some(path) => {
                let target = self.get_mut(path)?;
                target.children.push(node);
                let mut inserted = path.to_vec();
                inserted.push(target.children.len() - 1);
                Some(inserted)
            }
        }
    }

    /// Detach and return the subtree at `path`.
    pub fn remove(&mut self, path: &[usize]) -> Option<TreeNode> {
        let (last, parent) = path.split_last()?;
        let siblings = if parent.is_empty() {
            &mut self.roots
        } else {
            &mut self.get_mut(parent)?.children
        };

        (*last < siblings.len()).then(|| siblings.remove(*last))
    }

    /// Replace the label at `path`; returns `false` if nothing is there.
    pub fn relabel(&mut self, path: &[usize], text: impl Into<String>) -> bool {
        match self.get_mut(path) {
            Some(node) => {
                node.text = text.into();
                true
            }
            None => false,
        }
    }
}

impl From<Vec<TreeNode>> for Forest {
    fn from(roots: Vec<TreeNode>) -> Self {
        Self::new(roots)
    }
}
