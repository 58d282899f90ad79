use std::collections::BTreeMap;

use tracing::info;

use crate::conversion::{AppCredentials, ConversionClient};
use crate::errors::SetupError;
use crate::manifest::build_session_payload;
use crate::prompt::AnswerSource;
use crate::relay::RelayClient;

/// Phases of the provisioning run, in order. The flow is strictly linear with
/// two suspend points: `AwaitingOperator` (browser step) and
/// `AwaitingInstallation` (final answers).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupPhase {
    Start,
    ManifestBuilt,
    SessionOpened,
    AwaitingOperator,
    CodeReceived,
    CredentialsConverted,
    AwaitingInstallation,
    Complete,
}

/// Final aggregate of a successful run. Only ever constructed in the
/// `Complete` phase; an abort at any earlier phase returns an error instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningResult {
    pub organization: String,
    pub github_host: String,
    pub enterprise: bool,
    pub credentials: AppCredentials,
    pub installation_id: String,
    pub runner_group: String,
}

/// Inputs resolved before the wizard starts.
#[derive(Debug, Clone)]
pub struct SetupParams {
    /// Organization login -> numeric id, admin-and-active memberships only.
    pub organizations: BTreeMap<String, u64>,
    pub github_host: String,
    pub webhook_url: String,
    pub app_name: String,
    pub enterprise: bool,
}

/// Drives the manifest flow end to end: build manifest, open a relay session,
/// hand the operator the browser URL, poll for the exchange code, convert it
/// into credentials, and collect the installation details.
pub struct SetupWizard<'a, A: AnswerSource> {
    answers: &'a mut A,
    relay: &'a RelayClient,
    conversion: &'a ConversionClient,
    params: SetupParams,
    phase: SetupPhase,
}

impl<'a, A: AnswerSource> SetupWizard<'a, A> {
    pub fn new(
        answers: &'a mut A,
        relay: &'a RelayClient,
        conversion: &'a ConversionClient,
        params: SetupParams,
    ) -> Self {
        Self {
            answers,
            relay,
            conversion,
            params,
            phase: SetupPhase::Start,
        }
    }

    fn advance(&mut self, to: SetupPhase) {
        info!(from = ?self.phase, to = ?to, "setup phase transition");
        self.phase = to;
    }

    pub async fn run(mut self) -> Result<ProvisioningResult, SetupError> {
        let org_names: Vec<String> = self.params.organizations.keys().cloned().collect();
        if org_names.is_empty() {
            return Err(SetupError::InputValidation(
                "no organizations with active admin membership were found".to_string(),
            ));
        }
        let organization = self
            .answers
            .ask_select(
                "Which GitHub organization should Actions Runner Controller be installed on?",
                &org_names,
            )
            .await?;
        let org_id = *self
            .params
            .organizations
            .get(&organization)
            .ok_or_else(|| SetupError::InputValidation(format!("unknown organization '{organization}'")))?;

        let payload = build_session_payload(
            &self.params.app_name,
            &organization,
            &self.params.github_host,
            &self.params.webhook_url,
        );
        self.advance(SetupPhase::ManifestBuilt);

        let session = self.relay.open_session(&payload).await?;
        self.advance(SetupPhase::SessionOpened);

        println!(
            "ℹ Continue to this URL to create a new GitHub App for Actions Runner Controller: {}",
            session.operator_url
        );
        self.advance(SetupPhase::AwaitingOperator);
        self.answers
            .wait_for_ack("ℹ Press the enter key once you have finished creating the application.")
            .await?;

        println!("ℹ Polling for completion of app creation...");
        let code = self.relay.poll_for_code(&session).await?;
        self.advance(SetupPhase::CodeReceived);

        println!("ℹ Converting manifest into an app...");
        let credentials = self.conversion.convert(code).await?;
        self.advance(SetupPhase::CredentialsConverted);
        println!("✅ App created: {} (id {})", credentials.slug, credentials.id);

        let base_url = format!("https://{}", self.params.github_host);
        let apps_url = if self.params.enterprise {
            format!("{base_url}/github-apps")
        } else {
            format!("{base_url}/apps")
        };
        println!(
            "ℹ Install the app on {} here: {}/{}/installations/new/permissions?target_id={}",
            organization, apps_url, credentials.slug, org_id
        );
        println!(
            "ℹ After installation you are redirected to {base_url}/organizations/{organization}/settings/installations/{{id}}. Enter that {{id}} below."
        );
        self.advance(SetupPhase::AwaitingInstallation);

        let installation_id = self
            .answers
            .ask_required("GitHub App installation ID:")
            .await?;

        println!(
            "ℹ Runner groups can be viewed and created at {base_url}/organizations/{organization}/settings/actions/runners"
        );
        let runner_group = self
            .answers
            .ask_with_default(
                "Which runner group should Actions Runner Controller manage?",
                "Default",
            )
            .await?;

        self.advance(SetupPhase::Complete);
        Ok(ProvisioningResult {
            organization,
            github_host: self.params.github_host.clone(),
            enterprise: self.params.enterprise,
            credentials,
            installation_id,
            runner_group,
        })
    }
}
