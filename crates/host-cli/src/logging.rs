//! Log subscriber setup

use std::io::IsTerminal;
use tracing_subscriber::{fmt, EnvFilter};

/// Install a compact stderr subscriber
///
/// `RUST_LOG` wins over `level` when set.
pub fn init_logging(level: &str) {
    let use_ansi = std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = fmt::fmt()
        .with_env_filter(filter)
        .with_ansi(use_ansi)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .compact()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
