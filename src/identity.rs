// src/identity.rs

//! User and mount namespace creation with root identity mapping
//!
//! The invoking user becomes uid/gid 0 inside the new user namespace, which
//! is what allows the unprivileged mounts and chroot that follow.

use crate::error::{Error, Result};
use nix::sched::{CloneFlags, unshare};
use nix::unistd::{getgid, getuid};
use std::fs;
use std::path::Path;
use tracing::debug;

const UID_MAP: &str = "/proc/self/uid_map";
const GID_MAP: &str = "/proc/self/gid_map";
const SETGROUPS: &str = "/proc/self/setgroups";

/// Real user and group ids of the invoking process
///
/// Must be captured before [`isolate`]: once the user namespace exists,
/// unmapped ids resolve to the overflow id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentitySnapshot {
    pub uid: u32,
    pub gid: u32,
}

impl IdentitySnapshot {
    pub fn capture() -> Self {
        Self {
            uid: getuid().as_raw(),
            gid: getgid().as_raw(),
        }
    }
}

/// Single-entry id map line: namespace id 0 maps to `id`, range length 1
pub fn id_map_line(id: u32) -> String {
    format!("0 {} 1\n", id)
}

/// Create the user+mount namespace and map `identity` to root inside it
pub fn isolate(identity: IdentitySnapshot) -> Result<()> {
    unshare(CloneFlags::CLONE_NEWUSER | CloneFlags::CLONE_NEWNS).map_err(Error::Namespace)?;
    debug!("Entered new user and mount namespace");

    write_id_map(Path::new(UID_MAP), "user", identity.uid)?;

    // gid_map is refused until setgroups is denied
    fs::write(SETGROUPS, "deny").map_err(|source| Error::IdMap {
        kind: "group",
        id: identity.gid,
        source,
    })?;
    write_id_map(Path::new(GID_MAP), "group", identity.gid)?;

    debug!(
        "Mapped uid {} and gid {} to root",
        identity.uid, identity.gid
    );
    Ok(())
}

fn write_id_map(path: &Path, kind: &'static str, id: u32) -> Result<()> {
    fs::write(path, id_map_line(id)).map_err(|source| Error::IdMap { kind, id, source })
}
