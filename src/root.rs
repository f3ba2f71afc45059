// src/root.rs

//! Transition into the assembled sandbox root

use crate::error::{Error, Result};
use nix::unistd::chroot;
use std::os::unix::fs::symlink;
use std::path::Path;
use tracing::debug;

/// Working directory for every recipe, inside the sandbox
pub const DATA_DIR: &str = "/data";

/// Convenience links created at the new root, as (link, target)
///
/// Targets are relative so they resolve into the `/usr` toolchain mount.
pub const ROOT_SYMLINKS: &[(&str, &str)] = &[("/bin", "usr/bin"), ("/lib", "usr/lib")];

/// chroot into `root`, create the conventional symlinks and chdir to `/data`
pub fn enter(root: &Path) -> Result<()> {
    chroot(root).map_err(|source| Error::Chroot {
        path: root.to_path_buf(),
        source,
    })?;
    chdir(Path::new("/"))?;
    debug!("Changed root to {}", root.display());

    for &(link, target) in ROOT_SYMLINKS {
        symlink(target, link).map_err(|source| Error::Symlink {
            link: link.into(),
            target: target.into(),
            source,
        })?;
    }

    chdir(Path::new(DATA_DIR))
}

fn chdir(path: &Path) -> Result<()> {
    std::env::set_current_dir(path).map_err(|source| Error::Chdir {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symlinks_point_into_usr() {
        for (link, target) in ROOT_SYMLINKS {
            assert!(link.starts_with('/'));
            assert!(target.starts_with("usr/"));
            assert_eq!(link.trim_start_matches('/'), target.trim_start_matches("usr/"));
        }
    }

    #[test]
    fn test_chdir_failure_names_path() {
        let err = chdir(Path::new("/nonexistent/pkgen/data")).unwrap_err();
        assert!(err.to_string().starts_with("chdir /nonexistent/pkgen/data"));
    }
}
