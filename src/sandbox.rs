// src/sandbox.rs

//! Linux sandbox construction
//!
//! Ties identity isolation, mount assembly and the root transition together
//! behind [`build_sandbox`]. Every step is a strict prerequisite of the
//! next, and a failure leaves the process in a state that cannot be reused,
//! so the caller is expected to exit on error.

use crate::config::InvocationConfig;
use crate::environ::{ENVIRON_PATH, Environment};
use crate::error::Result;
use crate::identity::{IdentitySnapshot, isolate};
use crate::mounts;
use crate::recipe::{Orchestrator, RecipeName};
use crate::root;
use std::path::{Path, PathBuf};
use tracing::info;

/// Handle on a fully built sandbox
///
/// The process is already inside it. There is nothing to tear down: the
/// mount namespace disappears with the process tree.
#[derive(Debug)]
pub struct Sandbox {
    root: PathBuf,
    identity: IdentitySnapshot,
    recipes: Vec<RecipeName>,
}

impl Sandbox {
    /// Host path the sandbox root was assembled at
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Host identity mapped to root inside the sandbox
    pub fn identity(&self) -> IdentitySnapshot {
        self.identity
    }

    /// Load the recipe environment from the application directory
    pub fn environment(&self) -> Result<Environment> {
        Environment::load(Path::new(ENVIRON_PATH))
    }

    /// Orchestrator for the recipes this sandbox was built for
    pub fn orchestrator(&self, env: Environment) -> Orchestrator {
        Orchestrator::new(&self.recipes, env)
    }
}

/// Isolate the process and move it into a freshly assembled root
///
/// `identity` must have been captured before anything else touched
/// namespaces.
pub fn build_sandbox(config: &InvocationConfig, identity: IdentitySnapshot) -> Result<Sandbox> {
    isolate(identity)?;

    mounts::make_private()?;
    let plan = mounts::mount_plan(config);
    mounts::assemble(config.root(), &plan)?;
    info!("Assembled sandbox root at {}", config.root().display());

    root::enter(config.root())?;

    Ok(Sandbox {
        root: config.root().to_path_buf(),
        identity,
        recipes: config.recipes().to_vec(),
    })
}
