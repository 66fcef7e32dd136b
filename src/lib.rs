//! Tree document editor bootstrap library
//!
//! Provisions the editor's runtime stack (language runtime, GTK, GTK bindings
//! and an optional image converter) in dependency order, and owns the
//! persisted tree document the editor loads and saves.

pub mod config;
pub mod document;
pub mod install;
pub mod locator;
pub mod tree;

pub use config::InstallerConfig;
pub use install::{Branch, Orchestrator, RunSummary, SystemProvisioner, UnknownBranch};
pub use locator::Locator;
