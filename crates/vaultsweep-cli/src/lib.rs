/// Vaultsweep command-line front end.
///
/// This crate contains all terminal code. The engine lives in
/// `vaultsweep-core`.
pub mod app;
pub mod cli;
pub mod config;
pub mod prompt;
pub mod report;
pub mod state;

pub use app::{run, App};
pub use cli::{Cli, Commands};
