//! Configuration module for acc
//!
//! This module provides:
//! - Repository path resolution (flat and project layout)
//! - The `acc.yaml` main configuration

pub mod paths;
pub mod settings;

pub use paths::{folder_name, RepositoryPaths, CONFIG_FILE_NAME, REPOSITORY_ENV};
pub use settings::{AccConfig, FileSet};
