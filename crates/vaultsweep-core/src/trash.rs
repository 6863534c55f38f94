/// Purging old entries from the host's own trash folder.
use crate::age::find_stale;
use crate::cleanup::{CleanupReport, DeletionFailure};
use crate::host::{Storage, StorageError};
use crate::settings::{DeletionDestination, Settings};
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// Permanently delete host-trash entries older than
/// `host_trash_cleanup_age_days`. Does nothing when the setting is unset.
pub fn purge_host_trash(
    storage: &dyn Storage,
    settings: &Settings,
    now: SystemTime,
) -> Result<CleanupReport, StorageError> {
    let mut report = CleanupReport::default();
    let Some(days) = settings.host_trash_cleanup_age_days else {
        debug!("host trash purge disabled");
        return Ok(report);
    };

    let entries = storage.list_host_trash()?;
    let total = entries.len();
    let stale = find_stale(entries, |entry| entry.modified, u64::from(days), now);

    for item in stale {
        let path = item.item.path;
        match storage.delete(&path, DeletionDestination::Permanent) {
            Ok(()) => {
                debug!(path = %path, age_days = item.age_days, "purged");
                report.deleted.push(path);
            }
            Err(error) => {
                warn!(path = %path, "could not purge: {error}");
                report.failures.push(DeletionFailure { path, error });
            }
        }
    }

    info!(
        entries = total,
        purged = report.deleted.len(),
        failed = report.failures.len(),
        "host trash purged"
    );
    Ok(report)
}
