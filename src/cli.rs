// src/cli.rs

//! Command-line interface definition

use crate::config::{DEFAULT_ROOT, InvocationConfig};
use crate::error::Result;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pkgen")]
#[command(author, version)]
#[command(about = "Run package build recipes inside a throwaway sandbox", long_about = None)]
pub struct Cli {
    /// Redirect standard output and error to this file
    #[arg(short, long, value_name = "PATH")]
    pub log: Option<PathBuf>,

    /// Application recipes directory, mounted read-only at /app
    #[arg(short, long, value_name = "DIR")]
    pub app: PathBuf,

    /// Data directory, mounted writable at /data
    #[arg(short, long, value_name = "DIR")]
    pub data: PathBuf,

    /// Toolchain directory, mounted read-only at /usr
    #[arg(short, long, value_name = "DIR")]
    pub toolchain: PathBuf,

    /// Host mount point the sandbox root is assembled at
    #[arg(short, long, value_name = "DIR", default_value = DEFAULT_ROOT)]
    pub root: PathBuf,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Recipes to run, in order
    #[arg(value_name = "RECIPE", required = true, num_args = 1..)]
    pub recipes: Vec<String>,
}

impl Cli {
    /// Validate into an [`InvocationConfig`]
    pub fn into_config(self) -> Result<InvocationConfig> {
        Ok(
            InvocationConfig::new(self.log, self.app, self.data, self.toolchain, &self.recipes)?
                .with_root(self.root),
        )
    }

    /// Default tracing filter for the requested verbosity
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
