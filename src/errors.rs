use thiserror::Error;

/// Everything that can abort a provisioning run.
///
/// Every variant is terminal: the wizard surfaces the message to the operator
/// and exits without writing any output. The only condition that is ever
/// swallowed is a "not ready yet" response inside the bounded polling loops.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("invalid input: {0}")]
    InputValidation(String),

    #[error("relay service unavailable: {0}")]
    RelayUnavailable(String),

    #[error("malformed response from {service}: {detail}")]
    MalformedResponse { service: &'static str, detail: String },

    #[error("no exchange code received from the relay after {attempts} attempts")]
    ExchangeTimeout { attempts: u32 },

    #[error("app manifest conversion failed: {0}")]
    ConversionFailed(String),

    #[error("setup cancelled before completion")]
    Cancelled,
}
