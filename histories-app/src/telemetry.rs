//! Tracing subscriber setup.

use crate::error::{AppError, AppResult};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_LOG_FILTER: &str = "histories_app=info,histories_storage=info,warn";

/// Install the global subscriber. `RUST_LOG` wins over `configured`, which
/// wins over [`DEFAULT_LOG_FILTER`]. Logs go to stderr so stdout stays JSON.
pub fn init_tracing(configured: Option<&str>) -> AppResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(configured.unwrap_or(DEFAULT_LOG_FILTER)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| AppError::Telemetry(e.to_string()))?;

    Ok(())
}
