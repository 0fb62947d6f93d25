//! Test support utilities for pipeseal integration tests.
//!
//! Provides an isolated working directory, in-memory stand-ins for the
//! GitHub and CloudFront seams, and command helpers for the binary.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;
pub mod fixtures;
pub mod github_server;
pub mod mocks;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use commands::*;
#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use github_server::*;
#[allow(unused_imports)]
pub use mocks::*;

use std::path::PathBuf;
use tempfile::TempDir;

/// Test environment with an isolated working directory.
///
/// Child processes run with `.current_dir()` set to the temp dir, so the
/// manifest discovery never sees the repository's own files.
pub struct Test {
    pub dir: TempDir,
}

impl Test {
    /// Create an empty working directory.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        Self { dir }
    }

    /// Create a working directory holding `pipeseal.toml`.
    pub fn with_manifest(contents: &str) -> Self {
        let t = Self::new();
        t.write_manifest(contents);
        t
    }

    /// Write `pipeseal.toml` into the working directory.
    pub fn write_manifest(&self, contents: &str) -> PathBuf {
        let path = self.dir.path().join("pipeseal.toml");
        std::fs::write(&path, contents).expect("failed to write manifest");
        path
    }
}
