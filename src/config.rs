// src/config.rs

//! Invocation configuration
//!
//! Built once from the command line and never mutated afterwards. All
//! validation happens here, before any namespace or mount is created.

use crate::error::{Error, Result};
use crate::recipe::RecipeName;
use std::path::{Path, PathBuf};

/// Default sandbox mount point, available on any system
pub const DEFAULT_ROOT: &str = "/mnt";

/// Immutable configuration for one launcher run
#[derive(Debug, Clone)]
pub struct InvocationConfig {
    log: Option<PathBuf>,
    app: PathBuf,
    data: PathBuf,
    toolchain: PathBuf,
    root: PathBuf,
    recipes: Vec<RecipeName>,
}

impl InvocationConfig {
    /// Validate raw options into a configuration
    ///
    /// Fails on an empty recipe list or the first recipe name that is not
    /// allowed.
    pub fn new(
        log: Option<PathBuf>,
        app: PathBuf,
        data: PathBuf,
        toolchain: PathBuf,
        recipes: &[String],
    ) -> Result<Self> {
        if recipes.is_empty() {
            return Err(Error::NoRecipes);
        }

        let recipes = recipes
            .iter()
            .map(|name| RecipeName::parse(name))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            log,
            app,
            data,
            toolchain,
            root: PathBuf::from(DEFAULT_ROOT),
            recipes,
        })
    }

    /// Use a different sandbox mount point
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn log(&self) -> Option<&Path> {
        self.log.as_deref()
    }

    pub fn app(&self) -> &Path {
        &self.app
    }

    pub fn data(&self) -> &Path {
        &self.data
    }

    pub fn toolchain(&self) -> &Path {
        &self.toolchain
    }

    /// Host path where the sandbox root is assembled
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn recipes(&self) -> &[RecipeName] {
        &self.recipes
    }
}
