//! Created Histories application layer.
//!
//! Wires the core and storage crates into a usable program: TOML config,
//! tracing setup, JSON record snapshots, the command-driven [`session::Session`]
//! and the sub-commands of the `histories` binary.

pub mod cli;
pub mod config;
pub mod error;
pub mod session;
pub mod snapshot;
pub mod telemetry;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use session::{Command, CommandOutcome, Dashboard, FilteredView, Session, SheetSummary};
