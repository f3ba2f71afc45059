// src/environ.rs

//! Recipe environment loading
//!
//! The environment file is plain text with one `NAME=VALUE` per line.
//! Blank lines and lines starting with `#` are skipped, the first `=` splits
//! name from value and later definitions override earlier ones.
//!
//! Recipes never inherit the launcher's own environment; they see exactly
//! what this module loads.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

/// Location of the environment file inside the sandbox
pub const ENVIRON_PATH: &str = "/app/environ";

/// One `NAME=VALUE` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentEntry {
    pub name: String,
    pub value: String,
}

impl EnvironmentEntry {
    /// Parse a single line, `None` for lines that carry no entry
    ///
    /// `line_number` is only used for diagnostics.
    pub fn parse_line(line: &str, line_number: usize) -> Result<Option<Self>> {
        let line = line.strip_suffix('\r').unwrap_or(line);

        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let Some((name, value)) = line.split_once('=') else {
            return Ok(None);
        };

        if name.is_empty() {
            return Err(Error::EnvironmentEntry {
                line: line_number,
                reason: "empty variable name".to_string(),
            });
        }

        // Entries end up in execve as C strings
        if name.contains('\0') || value.contains('\0') {
            return Err(Error::EnvironmentEntry {
                line: line_number,
                reason: format!("NUL byte in {}", name.replace('\0', "\\0")),
            });
        }

        Ok(Some(Self {
            name: name.to_string(),
            value: value.to_string(),
        }))
    }
}

/// Explicit environment handed to every recipe
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the environment file at `path`
    ///
    /// A missing file means no customization. Any other failure to open or
    /// read it is fatal.
    pub fn load(path: &Path) -> Result<Self> {
        let load_error = |source| Error::Environment {
            path: path.to_path_buf(),
            source,
        };

        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("No environment file at {}, recipes get an empty environment", path.display());
                return Ok(Self::new());
            }
            Err(e) => return Err(load_error(e)),
        };

        let mut env = Self::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(load_error)?;
            if let Some(entry) = EnvironmentEntry::parse_line(&line, index + 1)? {
                env.apply(entry);
            }
        }

        debug!("Loaded {} environment variables from {}", env.len(), path.display());
        Ok(env)
    }

    /// Parse environment text already in memory
    pub fn parse(content: &str) -> Result<Self> {
        let mut env = Self::new();
        for (index, line) in content.lines().enumerate() {
            if let Some(entry) = EnvironmentEntry::parse_line(line, index + 1)? {
                env.apply(entry);
            }
        }
        Ok(env)
    }

    /// Set an entry, replacing any previous value of the same name
    pub fn apply(&mut self, entry: EnvironmentEntry) {
        self.vars.insert(entry.name, entry.value);
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
