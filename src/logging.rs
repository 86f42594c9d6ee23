use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_FILTER: &str = "lecturehall_api=info,tower_http=info,sqlx=warn";

/// Installs the console subscriber
///
/// The filter comes from `RUST_LOG` when set, otherwise the crate logs at
/// `info` and noisy dependencies are held at `warn`.
pub fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let console_layer = fmt::layer()
        .compact()
        .with_target(true)
        .with_line_number(true)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(console_layer).init();
}
