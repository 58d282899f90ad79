// arc-setup library - GitHub App manifest-flow provisioning
// This exposes the core components for testing and integration

pub mod config;
pub mod conversion;
pub mod errors;
pub mod manifest;
pub mod output;
pub mod prompt;
pub mod relay;
pub mod retry;
pub mod sources;
pub mod telemetry;
pub mod wizard;

// Re-export key types for easy access
pub use config::SetupConfig;
pub use conversion::{AppCredentials, ConversionClient};
pub use errors::SetupError;
pub use manifest::{build_session_payload, random_app_name, AppManifest, SessionPayload};
pub use output::{persist_result, OutputPaths, SetupRecord};
pub use prompt::{AnswerSource, ScriptedAnswers, TerminalAnswers};
pub use relay::{ExchangeCode, RelayClient, RelaySession};
pub use retry::RetryPolicy;
pub use telemetry::init_telemetry;
pub use wizard::{ProvisioningResult, SetupParams, SetupPhase, SetupWizard};
