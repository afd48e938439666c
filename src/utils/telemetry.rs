use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

use crate::utils::config::AppEnvironment;

/// Installs the global tracing subscriber.
///
/// Production emits bunyan-formatted JSON lines; development uses the
/// human-readable fmt layer. `RUST_LOG` overrides the default filter.
pub fn init(environment: AppEnvironment) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "glowtrust=info".into());

    match environment {
        AppEnvironment::Production => {
            let formatting_layer = BunyanFormattingLayer::new("glowtrust".into(), std::io::stdout);
            Registry::default()
                .with(env_filter)
                .with(JsonStorageLayer)
                .with(formatting_layer)
                .init();
        }
        AppEnvironment::Development => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}
