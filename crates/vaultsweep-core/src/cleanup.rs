/// Executing a scan result through the host's delete contract.
///
/// Files go first, then folders deepest-first, one request per path. A
/// failure is recorded against its path and never rolls back what was
/// already removed.
use crate::classify::Classifier;
use crate::host::{Storage, StorageError, VaultContext};
use crate::in_use::{InUseSet, LinkIndex};
use crate::model::{FileEntry, FolderEntry};
use crate::scanner::ScanResult;
use crate::settings::{CompiledSettings, DeletionDestination, Settings};
use std::collections::HashSet;
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// What the user is asked to approve.
#[derive(Debug, Clone)]
pub struct DeletionPlan {
    pub files: Vec<FileEntry>,
    pub folders: Vec<FolderEntry>,
    pub destination: DeletionDestination,
}

impl DeletionPlan {
    pub fn from_result(result: &ScanResult, destination: DeletionDestination) -> Self {
        Self {
            files: result.files_to_remove.clone(),
            folders: result.folders_to_remove.clone(),
            destination,
        }
    }

    /// Every path in the plan: files first, then folders deepest-first.
    pub fn paths(&self) -> impl Iterator<Item = &str> + '_ {
        self.files
            .iter()
            .map(|f| f.path.as_str())
            .chain(self.folders.iter().map(|f| f.path.as_str()))
    }

    pub fn len(&self) -> usize {
        self.files.len() + self.folders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.folders.is_empty()
    }

    /// Narrow the plan to `selected`. A folder survives only if nothing
    /// beneath it was deselected.
    pub fn retain_selected(&mut self, selected: &[String]) {
        let selected: HashSet<&str> = selected.iter().map(String::as_str).collect();
        let deselected: Vec<String> = self
            .paths()
            .filter(|path| !selected.contains(path))
            .map(|path| format!("{path}/"))
            .collect();

        self.files.retain(|f| selected.contains(f.path.as_str()));
        self.folders.retain(|folder| {
            let prefix = format!("{}/", folder.path);
            selected.contains(folder.path.as_str())
                && !deselected.iter().any(|d| d.starts_with(&prefix))
        });
    }
}

/// The user's answer to a [`DeletionPlan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    /// Delete these paths (all of the plan, or a subset).
    Proceed(Vec<String>),
    Abort,
}

/// Interactive confirmation, supplied by the front end.
pub trait ConfirmDeletion {
    fn confirm(&mut self, plan: &DeletionPlan) -> Confirmation;
}

impl<F> ConfirmDeletion for F
where
    F: FnMut(&DeletionPlan) -> Confirmation,
{
    fn confirm(&mut self, plan: &DeletionPlan) -> Confirmation {
        self(plan)
    }
}

/// Approves every plan unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproveAll;

impl ConfirmDeletion for ApproveAll {
    fn confirm(&mut self, plan: &DeletionPlan) -> Confirmation {
        Confirmation::Proceed(plan.paths().map(str::to_owned).collect())
    }
}

#[derive(Debug)]
pub struct DeletionFailure {
    pub path: String,
    pub error: StorageError,
}

#[derive(Debug, Default)]
pub struct CleanupReport {
    /// Paths removed, in request order.
    pub deleted: Vec<String>,
    pub failures: Vec<DeletionFailure>,
}

impl CleanupReport {
    fn delete(&mut self, storage: &dyn Storage, path: &str, destination: DeletionDestination) {
        match storage.delete(path, destination) {
            Ok(()) => {
                debug!(path, ?destination, "removed");
                self.deleted.push(path.to_owned());
            }
            Err(error) => {
                warn!(path, "could not remove: {error}");
                self.failures.push(DeletionFailure {
                    path: path.to_owned(),
                    error,
                });
            }
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug)]
pub enum CleanupOutcome {
    /// The scan found nothing. Informational, not an error.
    NothingToClean,
    /// The user declined.
    Aborted,
    Completed(CleanupReport),
}

/// Remove everything in `result`, asking `confirm` first when the settings
/// require it.
pub fn cleanup(
    result: &ScanResult,
    settings: &Settings,
    storage: &dyn Storage,
    confirm: &mut dyn ConfirmDeletion,
) -> CleanupOutcome {
    let mut plan = DeletionPlan::from_result(result, settings.deletion_destination);
    if plan.is_empty() {
        info!("nothing to clean");
        return CleanupOutcome::NothingToClean;
    }

    if settings.deletion_confirmation {
        match confirm.confirm(&plan) {
            Confirmation::Abort => {
                info!("cleanup aborted");
                return CleanupOutcome::Aborted;
            }
            Confirmation::Proceed(selected) => plan.retain_selected(&selected),
        }
        if plan.is_empty() {
            info!("nothing selected");
            return CleanupOutcome::Aborted;
        }
    }

    CleanupOutcome::Completed(execute(&plan, storage))
}

/// Issue one delete per path: files, then folders deepest-first. A folder
/// holding a file that failed to delete is not attempted.
pub fn execute(plan: &DeletionPlan, storage: &dyn Storage) -> CleanupReport {
    let mut report = CleanupReport::default();
    for file in &plan.files {
        report.delete(storage, &file.path, plan.destination);
    }

    for folder in &plan.folders {
        let prefix = format!("{}/", folder.path);
        if let Some(blocker) = report.failures.iter().find(|f| f.path.starts_with(&prefix)) {
            let reason = format!("{} could not be removed", blocker.path);
            warn!(path = %folder.path, "skipping folder: {reason}");
            report.failures.push(DeletionFailure {
                path: folder.path.clone(),
                error: StorageError::Rejected {
                    path: folder.path.clone(),
                    reason,
                },
            });
            continue;
        }
        report.delete(storage, &folder.path, plan.destination);
    }

    info!(
        deleted = report.deleted.len(),
        failed = report.failures.len(),
        destination = plan.destination.label(),
        "cleanup finished"
    );
    report
}

/// Delete notes that were open in `previous` and are gone from `current`,
/// if they are empty by the empty-note rule.
///
/// Does nothing unless `delete_empty_note_on_close` is set.
pub fn sweep_closed_notes(
    previous: &[String],
    current: &[String],
    ctx: VaultContext<'_>,
    settings: &CompiledSettings,
) -> CleanupReport {
    let mut report = CleanupReport::default();
    if !settings.raw.delete_empty_note_on_close {
        return report;
    }

    let still_open: HashSet<&str> = current.iter().map(String::as_str).collect();
    let links = LinkIndex::from_resolved(&ctx.metadata.resolved_links());
    let in_use = InUseSet::default();
    let classifier = Classifier::new(ctx, settings, &in_use, &links, SystemTime::now());

    for path in previous.iter().filter(|p| !still_open.contains(p.as_str())) {
        let Some(file) = ctx.tree.find(path).and_then(|idx| ctx.tree.file(idx)) else {
            continue;
        };
        let classification = classifier.classify_closed_note(file);
        if classification.verdict.is_delete() {
            report.delete(ctx.storage, path, settings.raw.deletion_destination);
        } else {
            debug!(path = %path, verdict = ?classification.verdict, "closed note kept");
        }
    }
    report
}
