// src/recipe.rs

//! Recipe orchestration
//!
//! Recipes are executables found directly in the application directory.
//! They run one at a time, in the order given, and the first failure stops
//! the whole list. Later recipes depend on what earlier ones left in the
//! data directory, so there is no retry and no parallelism.

use crate::environ::Environment;
use crate::error::{Error, Result};
use std::fmt;
use std::io::{self, Write};
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use tracing::{debug, info};

/// Directory holding the recipe executables, inside the sandbox
pub const RECIPES_DIR: &str = "/app";

/// A validated recipe name
///
/// Never contains a path separator and never starts with `.`, so it can
/// only name an entry directly inside the recipes directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecipeName(String);

impl RecipeName {
    pub fn parse(name: &str) -> Result<Self> {
        if name.is_empty() || name.contains('/') || name.starts_with('.') {
            return Err(Error::InvalidRecipeName(name.to_string()));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecipeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle of a single recipe in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeState {
    Pending,
    Running,
    Succeeded,
    Failed,
}

/// How a recipe child terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Exited(i32),
    Signaled(i32),
    Unknown,
}

impl From<ExitStatus> for Termination {
    fn from(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            Termination::Exited(code)
        } else if let Some(signal) = status.signal() {
            Termination::Signaled(signal)
        } else {
            Termination::Unknown
        }
    }
}

impl Termination {
    /// Turn a termination into the outcome for `recipe`
    pub fn into_result(self, recipe: &RecipeName) -> Result<()> {
        match self {
            Termination::Exited(0) => Ok(()),
            Termination::Exited(status) => Err(Error::RecipeFailed {
                recipe: recipe.to_string(),
                status,
            }),
            Termination::Signaled(signal) => Err(Error::RecipeSignaled {
                recipe: recipe.to_string(),
                signal,
            }),
            Termination::Unknown => Err(Error::RecipeUnknown {
                recipe: recipe.to_string(),
            }),
        }
    }
}

/// Runs recipes in order, stopping at the first failure
#[derive(Debug)]
pub struct Orchestrator {
    recipes_dir: PathBuf,
    workdir: PathBuf,
    env: Environment,
    recipes: Vec<(RecipeName, RecipeState)>,
}

impl Orchestrator {
    /// Orchestrator for the sandbox layout: recipes in `/app`, run in `/data`
    pub fn new(recipes: &[RecipeName], env: Environment) -> Self {
        Self {
            recipes_dir: PathBuf::from(RECIPES_DIR),
            workdir: PathBuf::from(crate::root::DATA_DIR),
            env,
            recipes: recipes
                .iter()
                .map(|name| (name.clone(), RecipeState::Pending))
                .collect(),
        }
    }

    /// Look up recipe executables somewhere other than `/app`
    pub fn with_recipes_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.recipes_dir = dir.into();
        self
    }

    /// Run recipes somewhere other than `/data`
    pub fn with_workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = dir.into();
        self
    }

    /// Path of the executable for `recipe`
    pub fn recipe_path(&self, recipe: &RecipeName) -> PathBuf {
        self.recipes_dir.join(recipe.as_str())
    }

    /// Current state of every recipe, in run order
    pub fn states(&self) -> &[(RecipeName, RecipeState)] {
        &self.recipes
    }

    /// Run every recipe in order, reporting progress on stdout
    ///
    /// Returns the first failure. Recipes after it stay `Pending`.
    pub fn run(&mut self) -> Result<()> {
        self.run_with_output(&mut io::stdout())
    }

    /// Run every recipe in order, reporting progress to `out`
    ///
    /// `out` is flushed before each recipe starts so its lines come ahead
    /// of anything the recipe prints on a shared descriptor.
    pub fn run_with_output<W: Write>(&mut self, out: &mut W) -> Result<()> {
        for index in 0..self.recipes.len() {
            let recipe = self.recipes[index].0.clone();
            let path = self.recipe_path(&recipe);

            writeln!(out, "Starting recipe {} at {}", recipe, path.display())
                .and_then(|()| out.flush())
                .map_err(Error::Progress)?;
            self.recipes[index].1 = RecipeState::Running;

            let outcome = self.run_one(&recipe, &path);
            self.recipes[index].1 = match outcome {
                Ok(()) => RecipeState::Succeeded,
                Err(_) => RecipeState::Failed,
            };
            outcome?;

            writeln!(out, "Recipe {} completed successfully", recipe)
                .and_then(|()| out.flush())
                .map_err(Error::Progress)?;
            info!("Recipe {} completed", recipe);
        }

        Ok(())
    }

    fn run_one(&self, recipe: &RecipeName, path: &Path) -> Result<()> {
        let status = Command::new(path)
            .arg0(recipe.as_str())
            .env_clear()
            .envs(self.env.iter())
            .current_dir(&self.workdir)
            .status()
            .map_err(|source| Error::Spawn {
                path: path.to_path_buf(),
                source,
            })?;

        let termination = Termination::from(status);
        debug!("Recipe {} terminated: {:?}", recipe, termination);
        termination.into_result(recipe)
    }
}
