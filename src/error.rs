// src/error.rs

//! Error types for the sandbox launcher
//!
//! Errors fall into three classes, see [`ErrorClass`]. Every variant names
//! the operation and the path or recipe it failed on.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Broad category of a failure, used to pick the exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Bad invocation, detected before any namespace or mount is touched
    Config,
    /// Namespace, mount, root or environment setup failed
    Setup,
    /// A recipe ran and did not succeed
    Recipe,
}

/// Errors that can occur while building the sandbox or running recipes
#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing app recipes")]
    NoRecipes,

    #[error("Invalid recipe name {0}")]
    InvalidRecipeName(String),

    #[error("Unable to redirect output to log file {path}: {source}")]
    Log {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unshare: {0}")]
    Namespace(#[source] nix::Error),

    #[error("Unable to map {kind} id {id} to zero: {source}")]
    IdMap {
        kind: &'static str,
        id: u32,
        #[source]
        source: io::Error,
    },

    #[error("mount {origin} {target}: {source}")]
    Mount {
        origin: String,
        target: PathBuf,
        #[source]
        source: nix::Error,
    },

    #[error("umount {path}: {source}")]
    Unmount {
        path: PathBuf,
        #[source]
        source: nix::Error,
    },

    #[error("mkdir {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("chroot {path}: {source}")]
    Chroot {
        path: PathBuf,
        #[source]
        source: nix::Error,
    },

    #[error("symlink {link} -> {target}: {source}")]
    Symlink {
        link: PathBuf,
        target: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("chdir {path}: {source}")]
    Chdir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unable to load app environment {path}: {source}")]
    Environment {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid environment entry at line {line}: {reason}")]
    EnvironmentEntry { line: usize, reason: String },

    #[error("Unable to report recipe progress: {0}")]
    Progress(#[source] io::Error),

    #[error("execv {path}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Recipe {recipe} failed with status {status}")]
    RecipeFailed { recipe: String, status: i32 },

    #[error("Recipe {recipe} terminated by signal {signal}")]
    RecipeSignaled { recipe: String, signal: i32 },

    #[error("Unknown condition at termination of recipe {recipe}")]
    RecipeUnknown { recipe: String },
}

impl Error {
    /// Which class of failure this is
    pub fn class(&self) -> ErrorClass {
        match self {
            Error::NoRecipes | Error::InvalidRecipeName(_) => ErrorClass::Config,
            Error::Spawn { .. }
            | Error::RecipeFailed { .. }
            | Error::RecipeSignaled { .. }
            | Error::RecipeUnknown { .. } => ErrorClass::Recipe,
            _ => ErrorClass::Setup,
        }
    }

    /// Process exit code for this failure
    ///
    /// Configuration errors share the usage exit code clap uses.
    pub fn exit_code(&self) -> u8 {
        match self.class() {
            ErrorClass::Config => 2,
            ErrorClass::Setup | ErrorClass::Recipe => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_failure_display() {
        let err = Error::RecipeFailed {
            recipe: "build".to_string(),
            status: 2,
        };
        assert_eq!(err.to_string(), "Recipe build failed with status 2");
        assert_eq!(err.class(), ErrorClass::Recipe);
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_signal_display() {
        let err = Error::RecipeSignaled {
            recipe: "test".to_string(),
            signal: 9,
        };
        assert_eq!(err.to_string(), "Recipe test terminated by signal 9");
    }

    #[test]
    fn test_config_errors_use_usage_code() {
        let err = Error::InvalidRecipeName("../escape".to_string());
        assert_eq!(err.class(), ErrorClass::Config);
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("../escape"));

        assert_eq!(Error::NoRecipes.exit_code(), 2);
    }

    #[test]
    fn test_setup_error_names_mount_point() {
        let err = Error::Mount {
            origin: "/srv/app".to_string(),
            target: PathBuf::from("/mnt/app"),
            source: nix::Error::EPERM,
        };
        assert_eq!(err.class(), ErrorClass::Setup);
        let msg = err.to_string();
        assert!(msg.contains("/srv/app"));
        assert!(msg.contains("/mnt/app"));
    }

    #[test]
    fn test_environment_error_is_setup() {
        let err = Error::Environment {
            path: PathBuf::from("/app/environ"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.class(), ErrorClass::Setup);
        assert_eq!(err.exit_code(), 1);
    }
}
