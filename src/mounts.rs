// src/mounts.rs

//! Sandbox root assembly
//!
//! The sandbox root is a fresh tmpfs mounted over the configured mount
//! point, populated with a fixed, ordered list of bind mounts:
//!
//! | origin      | target  | kind           |
//! |-------------|---------|----------------|
//! | `/dev`      | `/dev`  | recursive bind |
//! | `/sys`      | `/sys`  | recursive bind |
//! | `/proc`     | `/proc` | recursive bind |
//! | app dir     | `/app`  | read-only bind |
//! | data dir    | `/data` | writable bind  |
//! | toolchain   | `/usr`  | read-only bind |
//!
//! There is no rollback on failure. The whole mount namespace goes away
//! with the process.

use crate::config::InvocationConfig;
use crate::error::{Error, Result};
use nix::errno::Errno;
use nix::mount::{MsFlags, mount, umount};
use nix::sys::statvfs::{FsFlags, statvfs};
use std::fs::DirBuilder;
use std::os::unix::fs::DirBuilderExt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Mode for mount target directories, before umask
const TARGET_DIR_MODE: u32 = 0o777;

/// How an origin is attached to the sandbox
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountKind {
    /// Bind the whole subtree, nested mounts included
    RecursiveBind,
    /// Bind, then remount read-only
    ReadOnlyBind,
    /// Plain writable bind
    Bind,
}

impl MountKind {
    /// Flags for the initial bind
    pub fn bind_flags(self) -> MsFlags {
        match self {
            MountKind::RecursiveBind => MsFlags::MS_BIND | MsFlags::MS_REC,
            MountKind::ReadOnlyBind | MountKind::Bind => MsFlags::MS_BIND,
        }
    }

    pub fn is_read_only(self) -> bool {
        matches!(self, MountKind::ReadOnlyBind)
    }
}

/// One entry of the mount template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountPoint {
    /// Host path
    pub origin: PathBuf,
    /// Path inside the sandbox, absolute
    pub target: PathBuf,
    pub kind: MountKind,
}

impl MountPoint {
    pub fn new(origin: impl Into<PathBuf>, target: impl Into<PathBuf>, kind: MountKind) -> Self {
        Self {
            origin: origin.into(),
            target: target.into(),
            kind,
        }
    }

    /// Host path of the target under `root`
    pub fn host_target(&self, root: &Path) -> PathBuf {
        root.join(self.target.strip_prefix("/").unwrap_or(&self.target))
    }
}

/// The ordered mount template for a run
pub fn mount_plan(config: &InvocationConfig) -> Vec<MountPoint> {
    vec![
        MountPoint::new("/dev", "/dev", MountKind::RecursiveBind),
        MountPoint::new("/sys", "/sys", MountKind::RecursiveBind),
        MountPoint::new("/proc", "/proc", MountKind::RecursiveBind),
        MountPoint::new(config.app(), "/app", MountKind::ReadOnlyBind),
        MountPoint::new(config.data(), "/data", MountKind::Bind),
        MountPoint::new(config.toolchain(), "/usr", MountKind::ReadOnlyBind),
    ]
}

/// Stop mount events from propagating back to the host namespace
pub fn make_private() -> Result<()> {
    mount::<str, str, str, str>(
        None,
        "/",
        None,
        MsFlags::MS_PRIVATE | MsFlags::MS_REC,
        None,
    )
    .map_err(|source| Error::Mount {
        origin: "none".to_string(),
        target: PathBuf::from("/"),
        source,
    })
}

/// Build the sandbox filesystem at `root` from `plan`
pub fn assemble(root: &Path, plan: &[MountPoint]) -> Result<()> {
    unmount_stale(root)?;
    mount_tmpfs(root)?;

    for point in plan {
        apply(root, point)?;
    }

    Ok(())
}

/// Unmount `root` if a previous run left it mounted
fn unmount_stale(root: &Path) -> Result<()> {
    match umount(root) {
        Ok(()) => {
            debug!("Unmounted stale sandbox root {}", root.display());
            Ok(())
        }
        Err(Errno::EINVAL) => Ok(()),
        Err(source) => Err(Error::Unmount {
            path: root.to_path_buf(),
            source,
        }),
    }
}

fn mount_tmpfs(root: &Path) -> Result<()> {
    mount::<str, Path, str, str>(Some("tmpfs"), root, Some("tmpfs"), MsFlags::empty(), None)
        .map_err(|source| Error::Mount {
            origin: "tmpfs".to_string(),
            target: root.to_path_buf(),
            source,
        })?;
    debug!("Mounted tmpfs at {}", root.display());
    Ok(())
}

fn apply(root: &Path, point: &MountPoint) -> Result<()> {
    let target = point.host_target(root);

    DirBuilder::new()
        .mode(TARGET_DIR_MODE)
        .create(&target)
        .map_err(|source| Error::CreateDir {
            path: target.clone(),
            source,
        })?;

    let mount_error = |source| Error::Mount {
        origin: point.origin.display().to_string(),
        target: target.clone(),
        source,
    };

    mount::<Path, Path, str, str>(
        Some(&point.origin),
        &target,
        None,
        point.kind.bind_flags(),
        None,
    )
    .map_err(mount_error)?;

    // MS_RDONLY is ignored on the initial bind, it needs a remount
    if point.kind.is_read_only() {
        let locked = locked_flags(&point.origin).map_err(mount_error)?;
        mount::<str, Path, str, str>(
            None,
            &target,
            None,
            MsFlags::MS_REMOUNT | MsFlags::MS_BIND | MsFlags::MS_RDONLY | locked,
            None,
        )
        .map_err(mount_error)?;
    }

    debug!(
        "Mounted {} at {} ({:?})",
        point.origin.display(),
        target.display(),
        point.kind
    );
    Ok(())
}

/// Per-mount flags of `path` that a user namespace may not clear on remount
fn locked_flags(path: &Path) -> nix::Result<MsFlags> {
    let stat = statvfs(path)?;
    Ok(remount_flags(stat.flags()))
}

fn remount_flags(fs: FsFlags) -> MsFlags {
    const MAPPING: &[(FsFlags, MsFlags)] = &[
        (FsFlags::ST_NOSUID, MsFlags::MS_NOSUID),
        (FsFlags::ST_NODEV, MsFlags::MS_NODEV),
        (FsFlags::ST_NOEXEC, MsFlags::MS_NOEXEC),
        (FsFlags::ST_NOATIME, MsFlags::MS_NOATIME),
        (FsFlags::ST_NODIRATIME, MsFlags::MS_NODIRATIME),
        (FsFlags::ST_RELATIME, MsFlags::MS_RELATIME),
    ];

    MAPPING
        .iter()
        .filter(|(st, _)| fs.contains(*st))
        .fold(MsFlags::empty(), |acc, (_, ms)| acc | *ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> InvocationConfig {
        InvocationConfig::new(
            None,
            "/recipes".into(),
            "/work".into(),
            "/opt/tc".into(),
            &["fetch".to_string()],
        )
        .unwrap()
    }

    #[test]
    fn test_plan_order_and_targets() {
        let plan = mount_plan(&config());
        let targets: Vec<_> = plan.iter().map(|p| p.target.to_str().unwrap()).collect();
        assert_eq!(targets, vec!["/dev", "/sys", "/proc", "/app", "/data", "/usr"]);
    }

    #[test]
    fn test_plan_kinds() {
        let plan = mount_plan(&config());

        for point in &plan[..3] {
            assert_eq!(point.kind, MountKind::RecursiveBind);
            assert_eq!(point.origin, point.target);
        }

        assert_eq!(plan[3], MountPoint::new("/recipes", "/app", MountKind::ReadOnlyBind));
        assert_eq!(plan[4], MountPoint::new("/work", "/data", MountKind::Bind));
        assert_eq!(plan[5], MountPoint::new("/opt/tc", "/usr", MountKind::ReadOnlyBind));
    }

    #[test]
    fn test_bind_flags() {
        assert_eq!(
            MountKind::RecursiveBind.bind_flags(),
            MsFlags::MS_BIND | MsFlags::MS_REC
        );
        assert_eq!(MountKind::Bind.bind_flags(), MsFlags::MS_BIND);
        assert_eq!(MountKind::ReadOnlyBind.bind_flags(), MsFlags::MS_BIND);
        assert!(MountKind::ReadOnlyBind.is_read_only());
        assert!(!MountKind::Bind.is_read_only());
        assert!(!MountKind::RecursiveBind.is_read_only());
    }

    #[test]
    fn test_host_target() {
        let point = MountPoint::new("/opt/tc", "/usr", MountKind::ReadOnlyBind);
        assert_eq!(point.host_target(Path::new("/mnt")), PathBuf::from("/mnt/usr"));
    }

    #[test]
    fn test_remount_flags_carry_locked_bits() {
        let flags = remount_flags(FsFlags::ST_NOSUID | FsFlags::ST_NODEV | FsFlags::ST_RDONLY);
        assert_eq!(flags, MsFlags::MS_NOSUID | MsFlags::MS_NODEV);
        assert_eq!(remount_flags(FsFlags::empty()), MsFlags::empty());
    }

    #[test]
    fn test_locked_flags_of_existing_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(locked_flags(dir.path()).is_ok());
    }
}
