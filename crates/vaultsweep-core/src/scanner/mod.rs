/// Scanner module: orchestrates a full pass over the vault.
///
/// A scan runs in four phases:
/// 1. **Extract** references from every note and board in parallel (rayon).
/// 2. **Classify** every direct file of every in-scope folder in parallel,
///    against the in-use set built from phase 1 and the host's link index.
/// 3. **Tally** folders deepest-first ([`tree_scan`]).
/// 4. **Settle** the folder cascade to a fixed point ([`cascade`]).
///
/// Nothing is deleted here. [`start_scan`] moves the same work onto a
/// background thread and reports progress through a bounded channel.
pub mod cascade;
pub mod progress;
pub mod tree_scan;

use crate::classify::{Classifier, DeleteReason, Verdict};
use crate::extract::{extract_references, Extraction};
use crate::host::{Vault, VaultContext};
use crate::in_use::{build_in_use_set, LinkIndex};
use crate::model::{FileEntry, FolderEntry, NodeIndex};
use crate::settings::CompiledSettings;
pub use progress::{ScanPhase, ScanProgress};

use crossbeam_channel::{Receiver, Sender};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant, SystemTime};
use thiserror::Error;
use tracing::{debug, info};

/// Maximum number of progress messages that may queue up in the channel.
///
/// Updates are throttled, so a front end that drains the channel even
/// occasionally never makes the scanner wait.
pub const PROGRESS_CHANNEL_CAPACITY: usize = 4_096;

/// Send an `Update` every this many files.
const UPDATE_EVERY: usize = 256;

/// A non-fatal problem with one file. The scan carries on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanWarning {
    pub path: String,
    pub message: String,
}

impl ScanWarning {
    pub fn new(path: impl Into<String>, error: impl fmt::Display) -> Self {
        Self {
            path: path.into(),
            message: error.to_string(),
        }
    }
}

impl fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub files_total: usize,
    pub documents_extracted: usize,
    pub files_classified: usize,
    pub folders_in_scope: usize,
    /// Size of the in-use set.
    pub referenced: usize,
    pub duration: Duration,
}

/// Everything a scan decided. Files are grouped by folder, folders are
/// deepest first, so children always precede their parents.
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    pub files_to_remove: Vec<FileEntry>,
    pub folders_to_remove: Vec<FolderEntry>,
    /// Why each file in `files_to_remove` was selected, by path.
    pub reasons: BTreeMap<String, DeleteReason>,
    pub warnings: Vec<ScanWarning>,
    pub stats: ScanStats,
}

impl ScanResult {
    pub fn is_empty(&self) -> bool {
        self.files_to_remove.is_empty() && self.folders_to_remove.is_empty()
    }

    pub fn total(&self) -> usize {
        self.files_to_remove.len() + self.folders_to_remove.len()
    }

    pub fn reason(&self, path: &str) -> Option<DeleteReason> {
        self.reasons.get(path).copied()
    }

    pub fn bytes_to_free(&self) -> u64 {
        self.files_to_remove.iter().map(|f| f.size).sum()
    }
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("scan cancelled")]
    Cancelled,
    #[error("scanner thread panicked")]
    Panicked,
}

/// Cooperative cancellation token, polled between files.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the scan to stop as soon as possible.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Optional progress sink. Updates are best-effort; phase changes and
/// warnings block until there is room.
#[derive(Clone, Copy)]
struct Reporter<'a>(Option<&'a Sender<ScanProgress>>);

impl Reporter<'_> {
    fn send(&self, message: ScanProgress) {
        if let Some(tx) = self.0 {
            let _ = tx.send(message);
        }
    }

    fn update(&self, phase: ScanPhase, done: usize, total: usize) {
        if let Some(tx) = self.0 {
            let _ = tx.try_send(ScanProgress::Update { phase, done, total });
        }
    }

    fn phase(&self, phase: ScanPhase) {
        info!("{phase}");
        self.send(ScanProgress::Phase(phase));
    }
}

/// Run `work` over `items` in parallel, stopping early on cancellation and
/// reporting throttled progress.
fn par_map_cancellable<T, R>(
    items: &[T],
    phase: ScanPhase,
    cancel: &CancelFlag,
    reporter: Reporter<'_>,
    work: impl Fn(&T) -> R + Sync + Send,
) -> Result<Vec<R>, ScanError>
where
    T: Sync,
    R: Send,
{
    let done = AtomicUsize::new(0);
    let total = items.len();
    items
        .par_iter()
        .map(|item| {
            if cancel.is_cancelled() {
                return None;
            }
            let result = work(item);
            let n = done.fetch_add(1, Ordering::Relaxed) + 1;
            if n % UPDATE_EVERY == 0 || n == total {
                reporter.update(phase, n, total);
            }
            Some(result)
        })
        .collect::<Option<Vec<R>>>()
        .ok_or(ScanError::Cancelled)
}

/// Scan the vault synchronously. Nothing is deleted.
pub fn scan(
    ctx: VaultContext<'_>,
    settings: &CompiledSettings,
    cancel: &CancelFlag,
) -> Result<ScanResult, ScanError> {
    run_scan(ctx, settings, cancel, Reporter(None))
}

fn run_scan(
    ctx: VaultContext<'_>,
    settings: &CompiledSettings,
    cancel: &CancelFlag,
    reporter: Reporter<'_>,
) -> Result<ScanResult, ScanError> {
    let start = Instant::now();
    let tree = ctx.tree;
    let mut stats = ScanStats {
        files_total: tree.files().count(),
        ..ScanStats::default()
    };

    // ── Phase 1: extraction ─────────────────────────────────────────────
    reporter.phase(ScanPhase::Extracting);
    let phase_start = Instant::now();
    let documents: Vec<&FileEntry> = tree
        .files()
        .map(|(_, file)| file)
        .filter(|file| file.is_note() || file.is_board())
        .collect();
    let extractions: Vec<Extraction> =
        par_map_cancellable(&documents, ScanPhase::Extracting, cancel, reporter, |file| {
            extract_references(&ctx, settings, file)
        })?;
    stats.documents_extracted = documents.len();

    let mut warnings: Vec<ScanWarning> = Vec::new();
    for extraction in &extractions {
        for warning in &extraction.warnings {
            reporter.send(ScanProgress::Warning(warning.clone()));
            warnings.push(warning.clone());
        }
    }

    let links = LinkIndex::from_resolved(&ctx.metadata.resolved_links());
    let in_use = build_in_use_set(&links, &extractions, ctx.metadata);
    stats.referenced = in_use.len();
    info!(
        documents = documents.len(),
        referenced = in_use.len(),
        elapsed_ms = phase_start.elapsed().as_millis() as u64,
        "reference extraction finished"
    );

    if cancel.is_cancelled() {
        return Err(ScanError::Cancelled);
    }

    // ── Phase 2: classification ─────────────────────────────────────────
    reporter.phase(ScanPhase::Classifying);
    let phase_start = Instant::now();
    let work = tree_scan::files_in_scope(tree, settings);
    let classifier = Classifier::new(ctx, settings, &in_use, &links, SystemTime::now());
    let classified = par_map_cancellable(&work, ScanPhase::Classifying, cancel, reporter, |idx| {
        tree.file(*idx).map(|file| {
            let classification = classifier.classify(file);
            debug!(path = %file.path, verdict = ?classification.verdict, "classified");
            classification
        })
    })?;
    stats.files_classified = work.len();

    let mut verdicts: HashMap<NodeIndex, Verdict> = HashMap::with_capacity(work.len());
    for (idx, classification) in work.iter().zip(classified) {
        let Some(classification) = classification else {
            continue;
        };
        if let Some(warning) = classification.warning {
            reporter.send(ScanProgress::Warning(warning.clone()));
            warnings.push(warning);
        }
        verdicts.insert(*idx, classification.verdict);
    }
    info!(
        files = work.len(),
        elapsed_ms = phase_start.elapsed().as_millis() as u64,
        "classification finished"
    );

    if cancel.is_cancelled() {
        return Err(ScanError::Cancelled);
    }

    // ── Phase 3: folder tally ───────────────────────────────────────────
    reporter.phase(ScanPhase::Folders);
    let tally = tree_scan::tally_folders(tree, settings, &verdicts);
    stats.folders_in_scope = tally.folders_in_scope;

    // ── Phase 4: cascade ────────────────────────────────────────────────
    reporter.phase(ScanPhase::Cascade);
    let folders = cascade::settle(tree, &tally.candidates);
    debug!(
        candidates = tally.candidates.len(),
        kept = tally.candidates.len() - folders.len(),
        "cascade settled"
    );

    let mut reasons = BTreeMap::new();
    let mut files_to_remove: Vec<FileEntry> = Vec::with_capacity(tally.files.len());
    for idx in &tally.files {
        let Some(file) = tree.file(*idx) else {
            continue;
        };
        if let Some(Verdict::Delete(reason)) = verdicts.get(idx) {
            reasons.insert(file.path.clone(), *reason);
        }
        files_to_remove.push(file.clone());
    }
    let folders_to_remove: Vec<FolderEntry> = folders
        .iter()
        .filter_map(|idx| tree.folder(*idx))
        .cloned()
        .collect();

    stats.duration = start.elapsed();
    info!(
        files = files_to_remove.len(),
        folders = folders_to_remove.len(),
        warnings = warnings.len(),
        elapsed_ms = stats.duration.as_millis() as u64,
        "scan complete"
    );

    Ok(ScanResult {
        files_to_remove,
        folders_to_remove,
        reasons,
        warnings,
        stats,
    })
}

/// Handle to a running or completed background scan.
pub struct ScanHandle {
    /// Receiver for progress updates from the scan thread.
    pub progress_rx: Receiver<ScanProgress>,
    cancel_flag: CancelFlag,
    thread: thread::JoinHandle<Result<ScanResult, ScanError>>,
}

impl ScanHandle {
    /// Request the scan to stop as soon as possible.
    pub fn cancel(&self) {
        self.cancel_flag.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_flag.is_cancelled()
    }

    /// Wait for the scan to finish.
    pub fn join(self) -> Result<ScanResult, ScanError> {
        self.thread.join().map_err(|_| ScanError::Panicked)?
    }
}

/// Start a new scan on a background thread.
pub fn start_scan(vault: Arc<dyn Vault>, settings: CompiledSettings) -> ScanHandle {
    let (progress_tx, progress_rx) =
        crossbeam_channel::bounded::<ScanProgress>(PROGRESS_CHANNEL_CAPACITY);
    let cancel_flag = CancelFlag::new();
    let cancel_clone = cancel_flag.clone();

    let thread = thread::Builder::new()
        .name("vaultsweep-scanner".into())
        .spawn(move || {
            let ctx = VaultContext::from_vault(&*vault);
            let result = run_scan(ctx, &settings, &cancel_clone, Reporter(Some(&progress_tx)));
            match &result {
                Ok(result) => {
                    let _ = progress_tx.send(ScanProgress::Complete {
                        duration: result.stats.duration,
                        files_to_remove: result.files_to_remove.len(),
                        folders_to_remove: result.folders_to_remove.len(),
                        warning_count: result.warnings.len(),
                    });
                }
                Err(ScanError::Cancelled) => {
                    info!("scan cancelled");
                    let _ = progress_tx.send(ScanProgress::Cancelled);
                }
                Err(ScanError::Panicked) => {}
            }
            result
        })
        .expect("failed to spawn scanner thread");

    ScanHandle {
        progress_rx,
        cancel_flag,
        thread,
    }
}
