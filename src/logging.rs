use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

/// Initializes the global tracing subscriber. `RUST_LOG` wins over the
/// configured level; JSON output is used outside development so log
/// pipelines get structured records.
pub fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if config.environment == "development" {
        builder.init();
    } else {
        builder.json().init();
    }
}
