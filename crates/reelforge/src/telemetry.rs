use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub use tracing_subscriber::util::TryInitError;

/// Install a console subscriber.
///
/// `RUST_LOG` wins when set. Otherwise logs at `info`, with Reelforge's own
/// crates at `debug` when `verbose` is set.
pub fn init_tracing(verbose: bool) -> Result<(), TryInitError> {
    let default = if verbose { "info,reelforge=debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    install(env_filter)
}

/// Install a console subscriber with an explicit filter, ignoring `RUST_LOG`.
///
/// Invalid directives in `filter` are skipped.
pub fn init_tracing_with_filter(filter: &str) -> Result<(), TryInitError> {
    install(EnvFilter::new(filter))
}

fn install(env_filter: EnvFilter) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    debug!("Tracing initialized");
    Ok(())
}
