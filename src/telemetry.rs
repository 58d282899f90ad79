use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging for the wizard.
///
/// Operator-facing text goes to stdout via plain prints; tracing carries the
/// diagnostic trail (phase transitions, retry attempts) and is tuned with
/// `RUST_LOG`. Targets are suppressed to keep the stream readable next to the
/// interactive prompts.
pub fn init_telemetry() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    Ok(())
}
