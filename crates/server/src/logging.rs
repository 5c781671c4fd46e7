//! Tracing subscriber setup shared by both binaries

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use voice_assistant_config::ObservabilityConfig;

/// Install the global subscriber
///
/// `RUST_LOG` wins over the configured level. Logs go to stderr so the CLI
/// keeps stdout for the conversation. Calling this twice is a no-op.
pub fn init_tracing(config: &ObservabilityConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("voice_assistant={},tower_http=info", config.log_level).into()
    });

    let fmt_layer = if config.log_json {
        tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        tracing_subscriber::fmt::layer().with_writer(std::io::stderr).boxed()
    };

    if let Err(e) = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
    {
        eprintln!("Tracing already initialized: {}", e);
    }
}
