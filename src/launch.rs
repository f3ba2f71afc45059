// src/launch.rs

//! Top-level run of the launcher

use crate::config::InvocationConfig;
use crate::error::{Error, Result};
use crate::identity::IdentitySnapshot;
use crate::sandbox::build_sandbox;
use nix::sys::stat::{Mode, umask};
use nix::unistd::dup2;
use std::fs::OpenOptions;
use std::io;
use std::os::fd::AsRawFd;
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;
use tracing::debug;

/// File creation mask applied to every build
pub const BUILD_UMASK: u32 = 0o022;

/// Mode for a newly created log file, before umask
const LOG_MODE: u32 = 0o666;

/// Build the sandbox and run every recipe of `config`
pub fn run(config: &InvocationConfig) -> Result<()> {
    let identity = IdentitySnapshot::capture();

    umask(Mode::from_bits_truncate(BUILD_UMASK));

    if let Some(log) = config.log() {
        redirect_output(log)?;
    }

    let sandbox = build_sandbox(config, identity)?;
    let host = sandbox.identity();
    debug!(
        "Running as root in sandbox at {} (host uid {}, gid {})",
        sandbox.root().display(),
        host.uid,
        host.gid
    );

    let env = sandbox.environment()?;
    sandbox.orchestrator(env).run()
}

/// Point stdout and stderr at `path`, truncating it
pub fn redirect_output(path: &Path) -> Result<()> {
    let log_error = |source| Error::Log {
        path: path.to_path_buf(),
        source,
    };

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(LOG_MODE)
        .open(path)
        .map_err(log_error)?;

    for fd in [io::stdout().as_raw_fd(), io::stderr().as_raw_fd()] {
        dup2(file.as_raw_fd(), fd).map_err(|e| log_error(io::Error::from(e)))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_to_unwritable_path() {
        let err = redirect_output(Path::new("/nonexistent/pkgen/build.log")).unwrap_err();
        assert!(matches!(err, Error::Log { .. }));
        assert!(err.to_string().contains("/nonexistent/pkgen/build.log"));
    }
}
