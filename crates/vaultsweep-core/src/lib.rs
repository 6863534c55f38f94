/// Vaultsweep Core: finding and removing unused files in a note vault.
///
/// This crate contains the whole engine with no UI dependencies. A host
/// (the bundled [`local::LocalVault`], or anything else implementing the
/// [`host`] traits) supplies the tree, metadata and storage.
///
/// # Modules
///
/// - [`model`]: arena-allocated vault tree and link resolution.
/// - [`settings`]: persisted settings and their compiled form.
/// - [`host`]: the contracts a host implements.
/// - [`extract`]: per-file-type reference extractors.
/// - [`in_use`]: the in-use set and backlink counts.
/// - [`classify`]: the per-file keep/delete decision.
/// - [`scanner`]: the four-phase scan, in the foreground or on a thread.
/// - [`cleanup`]: confirmation and deletion of a scan result.
/// - [`trash`]: purging old entries from the vault trash.
/// - [`local`]: a vault backed by a directory on disk.
pub mod age;
pub mod classify;
pub mod cleanup;
pub mod extract;
pub mod folder_filter;
pub mod host;
pub mod in_use;
pub mod local;
pub mod markdown;
pub mod model;
pub mod scanner;
pub mod settings;
pub mod trash;

#[cfg(test)]
pub(crate) mod test_support;

pub use local::LocalVault;
pub use scanner::{scan, start_scan, ScanHandle, ScanProgress, ScanResult};
pub use settings::{CompiledSettings, DeletionDestination, FilterMode, Settings};
