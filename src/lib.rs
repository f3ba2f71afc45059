// src/lib.rs

//! pkgen: single-use sandbox launcher for package build recipes
//!
//! One invocation builds one throwaway sandbox and runs a list of recipes
//! in it:
//!
//! 1. `identity` - new user and mount namespace, caller mapped to root
//! 2. `mounts` - tmpfs root populated with the fixed bind mount template
//! 3. `root` - chroot into it, `/bin` and `/lib` symlinks, chdir `/data`
//! 4. `environ` - recipe environment from `/app/environ`
//! 5. `recipe` - recipes run one by one, first failure stops the run
//!
//! Steps 1 to 3 are Linux-specific and grouped in [`sandbox::build_sandbox`].

pub mod cli;
pub mod config;
pub mod environ;
mod error;
pub mod identity;
pub mod launch;
pub mod mounts;
pub mod recipe;
pub mod root;
pub mod sandbox;

pub use config::InvocationConfig;
pub use environ::{Environment, EnvironmentEntry};
pub use error::{Error, ErrorClass, Result};
pub use launch::run;
pub use mounts::{MountKind, MountPoint};
pub use recipe::{Orchestrator, RecipeName, RecipeState, Termination};
pub use sandbox::{Sandbox, build_sandbox};
