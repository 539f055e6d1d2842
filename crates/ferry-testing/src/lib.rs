//! Testing utilities and fixtures for ferry
//!
//! This crate provides a scriptable transfer client, a recording diagnostic
//! sink, option fixtures and assertions for testing code built on
//! `ferry-core`.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub mod assertions;
pub mod fixtures;
pub mod helpers;

pub use helpers::{init_test_logging, Call, RecordingSink, ScriptedTransfer};

/// Temporary directory holding adapter config files, removed on drop
pub struct ConfigDir {
    dir: TempDir,
}

impl ConfigDir {
    /// Creates a new temporary config directory
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: TempDir::new()?,
        })
    }

    /// Returns the path to the temporary directory
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes a config file with the given name and TOML content
    pub fn write(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents)?;
        Ok(path)
    }
}
