use taskdeck_core::config::LOG_ENV;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber, writing to stderr.
///
/// `TASKDECK_LOG` takes tracing filter directives; without it the level
/// from `config.toml` applies.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
