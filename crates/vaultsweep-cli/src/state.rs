/// Front-end view of a background scan.
///
/// The scan thread talks through its progress channel; [`ScanState::apply`]
/// folds each message into counters the terminal can show.
use std::time::Duration;
use tracing::{debug, info};
use vaultsweep_core::scanner::{ScanHandle, ScanPhase, ScanProgress, ScanWarning};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepPhase {
    Scanning,
    /// The scan finished and its result can be joined.
    Results,
    Cancelled,
}

#[derive(Debug)]
pub struct ScanState {
    pub phase: SweepPhase,
    pub scan_phase: Option<ScanPhase>,
    pub done: usize,
    pub total: usize,
    pub warnings: Vec<ScanWarning>,
    pub duration: Option<Duration>,
    pub files_to_remove: usize,
    pub folders_to_remove: usize,
}

impl Default for ScanState {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanState {
    pub fn new() -> Self {
        Self {
            phase: SweepPhase::Scanning,
            scan_phase: None,
            done: 0,
            total: 0,
            warnings: Vec::new(),
            duration: None,
            files_to_remove: 0,
            folders_to_remove: 0,
        }
    }

    /// Fold one progress message into the state.
    pub fn apply(&mut self, message: ScanProgress) {
        match message {
            ScanProgress::Phase(phase) => {
                info!("{phase}...");
                self.scan_phase = Some(phase);
                self.done = 0;
                self.total = 0;
            }
            ScanProgress::Update { phase, done, total } => {
                debug!(%phase, done, total, "progress");
                self.scan_phase = Some(phase);
                self.done = done;
                self.total = total;
            }
            ScanProgress::Warning(warning) => self.warnings.push(warning),
            ScanProgress::Complete {
                duration,
                files_to_remove,
                folders_to_remove,
                ..
            } => {
                self.phase = SweepPhase::Results;
                self.duration = Some(duration);
                self.files_to_remove = files_to_remove;
                self.folders_to_remove = folders_to_remove;
            }
            ScanProgress::Cancelled => self.phase = SweepPhase::Cancelled,
        }
    }

    /// Block until the scan sends its last message or drops the channel.
    pub fn drain(&mut self, handle: &ScanHandle) {
        while self.phase == SweepPhase::Scanning {
            match handle.progress_rx.recv() {
                Ok(message) => self.apply(message),
                Err(_) => break,
            }
        }
    }
}
