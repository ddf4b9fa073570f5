//! Filesystem snapshots for transactional installs.
//!
//! Before mutating the live system, basalt snapshots the target filesystem so
//! a failed transaction can be rolled back. Only btrfs and zfs are supported;
//! both are driven through their command-line tools.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{debug, info};

/// Errors from snapshot operations.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The configured filesystem type has no snapshot support.
    #[error("unsupported filesystem type: {fs_type}")]
    UnsupportedFs {
        /// The offending `--fs-type` value.
        fs_type: String,
    },

    /// No zfs dataset is mounted at or above the target path.
    #[error("no zfs dataset found for {path}")]
    DatasetNotFound {
        /// The snapshot target.
        path: String,
    },

    /// The snapshot tool exited unsuccessfully.
    #[error("{command} exited with {status}")]
    CommandFailed {
        /// The invoked tool.
        command: String,
        /// Its exit status.
        status: String,
    },

    /// Spawning the snapshot tool failed.
    #[error("failed to run snapshot tool: {0}")]
    Io(#[from] std::io::Error),
}

/// Filesystems with snapshot support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FsKind {
    Btrfs,
    Zfs,
}

impl FsKind {
    fn parse(fs_type: &str) -> Result<Self, SnapshotError> {
        match fs_type {
            "btrfs" => Ok(Self::Btrfs),
            "zfs" => Ok(Self::Zfs),
            other => Err(SnapshotError::UnsupportedFs {
                fs_type: other.to_string(),
            }),
        }
    }
}

/// Creates and rolls back filesystem snapshots.
#[derive(Debug)]
pub struct SnapshotManager {
    snapshot_dir: PathBuf,
    fs_type: String,
}

impl SnapshotManager {
    /// Create a manager writing snapshots under `snapshot_dir`.
    ///
    /// The filesystem type is validated lazily, when the first operation
    /// runs.
    pub fn new(snapshot_dir: impl Into<PathBuf>, fs_type: impl Into<String>) -> Self {
        Self {
            snapshot_dir: snapshot_dir.into(),
            fs_type: fs_type.into(),
        }
    }

    /// Snapshot `target` and return the new snapshot id.
    ///
    /// Ids are `snapshot-<unix-nanos>`, monotonic per clock.
    pub fn create_snapshot(&self, target: &Path) -> Result<String, SnapshotError> {
        let kind = FsKind::parse(&self.fs_type)?;
        let snapshot_id = format!("snapshot-{}", unix_nanos());

        match kind {
            FsKind::Btrfs => {
                let snapshot_path = self.snapshot_dir.join(&snapshot_id);
                run(Command::new("btrfs")
                    .arg("subvolume")
                    .arg("snapshot")
                    .arg(target)
                    .arg(&snapshot_path))?;
            }
            FsKind::Zfs => {
                let dataset = find_dataset(target)?;
                debug!(%dataset, "snapshotting zfs dataset");
                run(Command::new("zfs")
                    .arg("snapshot")
                    .arg(format!("{dataset}@{snapshot_id}")))?;
            }
        }

        info!(id = %snapshot_id, target = %target.display(), "snapshot created");
        Ok(snapshot_id)
    }

    /// Restore the system to a previously created snapshot.
    pub fn rollback_snapshot(&self, snapshot_id: &str) -> Result<(), SnapshotError> {
        match FsKind::parse(&self.fs_type)? {
            FsKind::Btrfs => {
                let snapshot_path = self.snapshot_dir.join(snapshot_id);
                run(Command::new("btrfs")
                    .arg("subvolume")
                    .arg("set-default")
                    .arg(&snapshot_path))?;
            }
            FsKind::Zfs => {
                run(Command::new("zfs").arg("rollback").arg(snapshot_id))?;
            }
        }

        info!(id = %snapshot_id, "snapshot rolled back");
        Ok(())
    }
}

fn unix_nanos() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default()
}

/// Find the zfs dataset whose mountpoint contains `path`.
///
/// The deepest (longest) matching mountpoint wins.
fn find_dataset(path: &Path) -> Result<String, SnapshotError> {
    let output = Command::new("zfs")
        .args(["list", "-H", "-o", "name,mountpoint"])
        .output()?;
    if !output.status.success() {
        return Err(SnapshotError::CommandFailed {
            command: "zfs list".to_string(),
            status: output.status.to_string(),
        });
    }

    let listing = String::from_utf8_lossy(&output.stdout);
    let mut best: Option<(String, usize)> = None;
    for line in listing.lines() {
        let mut fields = line.split('\t');
        let (Some(name), Some(mountpoint)) = (fields.next(), fields.next()) else {
            continue;
        };
        if mountpoint == "-" || mountpoint == "none" {
            continue;
        }
        if path.starts_with(mountpoint)
            && best.as_ref().is_none_or(|(_, len)| mountpoint.len() > *len)
        {
            best = Some((name.to_string(), mountpoint.len()));
        }
    }

    best.map(|(name, _)| name)
        .ok_or_else(|| SnapshotError::DatasetNotFound {
            path: path.display().to_string(),
        })
}

fn run(command: &mut Command) -> Result<(), SnapshotError> {
    debug!(?command, "running snapshot tool");
    let status = command.status()?;
    if !status.success() {
        return Err(SnapshotError::CommandFailed {
            command: format!("{command:?}"),
            status: status.to_string(),
        });
    }
    Ok(())
}
