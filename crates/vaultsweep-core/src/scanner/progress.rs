/// Scan progress reporting: lightweight messages sent from the scan
/// thread to the front end via a crossbeam channel.
use super::ScanWarning;
use std::fmt;
use std::time::Duration;

/// The four phases of a scan, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    /// Reading notes and boards for embedded references.
    Extracting,
    /// Deciding keep/delete for every file in scope.
    Classifying,
    /// Tallying folders deepest-first.
    Folders,
    /// Dropping folders that would orphan a retained subfolder.
    Cascade,
}

impl fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Extracting => "extracting references",
            Self::Classifying => "classifying files",
            Self::Folders => "tallying folders",
            Self::Cascade => "settling folder cascade",
        })
    }
}

/// Progress updates sent from the scan thread.
///
/// The finished result is returned by `ScanHandle::join`; these messages
/// carry only counters and status.
#[derive(Debug)]
pub enum ScanProgress {
    /// A new phase has started.
    Phase(ScanPhase),
    /// Periodic update within the current phase.
    Update {
        phase: ScanPhase,
        done: usize,
        total: usize,
    },
    /// A non-fatal problem with one file.
    Warning(ScanWarning),
    /// Scanning completed successfully.
    Complete {
        duration: Duration,
        files_to_remove: usize,
        folders_to_remove: usize,
        warning_count: usize,
    },
    /// Scan was cancelled before it finished.
    Cancelled,
}
