//! Advisory `session.lock` protocol.
//!
//! The lock file holds the millisecond timestamp of the most recent holder
//! as decimal text. Acquiring writes a fresh value, which silently revokes
//! whoever held the lock before. A holder checks that the file still holds
//! its value before touching the world.

use std::fs;
use std::path::Path;

use chrono::Utc;
use tracing::debug;

use crate::error::WorldResult;

/// Proof of having acquired a world's session lock at some point.
///
/// The token does not keep the lock; another process can take it over at any
/// time. Check with [`crate::World::is_held`] before relying on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionLock {
    stamp: i64,
}

impl SessionLock {
    /// The value this lock wrote into the lock file.
    pub fn timestamp(&self) -> i64 {
        self.stamp
    }
}

/// Write a new stamp into `path`, creating parent directories.
///
/// The stamp is always different from the one currently on disk, even when
/// two acquisitions land in the same millisecond.
pub(crate) fn acquire(path: &Path) -> WorldResult<SessionLock> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut stamp = Utc::now().timestamp_millis();
    if let Some(previous) = read_stamp(path) {
        if previous >= stamp {
            stamp = previous.checked_add(1).unwrap_or(0);
        }
    }
    fs::write(path, stamp.to_string())?;
    debug!(path = %path.display(), stamp, "acquired session lock");
    Ok(SessionLock { stamp })
}

/// Whether `path` still holds `lock`'s stamp. An unreadable or malformed
/// file counts as not held.
pub(crate) fn is_held(path: &Path, lock: &SessionLock) -> bool {
    read_stamp(path) == Some(lock.stamp)
}

fn read_stamp(path: &Path) -> Option<i64> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_writes_decimal_stamp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("w").join("session.lock");
        let lock = acquire(&path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, lock.timestamp().to_string());
        assert!(is_held(&path, &lock));
    }

    #[test]
    fn second_acquire_revokes_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.lock");
        let first = acquire(&path).unwrap();
        let second = acquire(&path).unwrap();
        assert_ne!(first, second);
        assert!(!is_held(&path, &first));
        assert!(is_held(&path, &second));
    }

    #[test]
    fn future_stamp_on_disk_is_still_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.lock");
        fs::write(&path, (i64::MAX / 2).to_string()).unwrap();
        let lock = acquire(&path).unwrap();
        assert_eq!(lock.timestamp(), i64::MAX / 2 + 1);
    }

    #[test]
    fn garbage_or_missing_file_is_not_held() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.lock");
        let lock = acquire(&path).unwrap();
        fs::write(&path, "not a number").unwrap();
        assert!(!is_held(&path, &lock));
        fs::remove_file(&path).unwrap();
        assert!(!is_held(&path, &lock));
    }
}
