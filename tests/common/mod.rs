// tests/common/mod.rs

//! Shared fixtures for integration tests.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tempfile::TempDir;

static SPAWN_LOCK: Mutex<()> = Mutex::new(());

/// Serialize tests that write and then exec scripts.
///
/// A fork from a parallel test can briefly hold a script open for writing,
/// and exec then fails with ETXTBSY.
pub fn serial() -> MutexGuard<'static, ()> {
    SPAWN_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

/// A recipes directory and a data directory under one temp dir.
///
/// Keep the value alive for the duration of the test to prevent cleanup.
pub struct Workspace {
    _temp: TempDir,
    pub recipes: PathBuf,
    pub data: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let temp = tempfile::tempdir().unwrap();
        let recipes = temp.path().join("recipes");
        let data = temp.path().join("data");
        fs::create_dir(&recipes).unwrap();
        fs::create_dir(&data).unwrap();
        Self {
            _temp: temp,
            recipes,
            data,
        }
    }

    /// Write an executable `/bin/sh` recipe with the given body.
    pub fn recipe(&self, name: &str, body: &str) -> PathBuf {
        let path = self.recipes.join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// Recipe that appends its own name to `trace` in the data directory.
    pub fn tracing_recipe(&self, name: &str, status: i32) -> PathBuf {
        self.recipe(name, &format!("echo {} >> trace\nexit {}", name, status))
    }

    /// Lines of the trace file, empty if no recipe wrote to it.
    pub fn trace(&self) -> Vec<String> {
        read_lines(&self.data.join("trace"))
    }
}

pub fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .map(|s| s.lines().map(str::to_string).collect())
        .unwrap_or_default()
}
