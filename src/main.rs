use anyhow::Result;
use clap::Parser;

use arc_setup::config::SetupConfig;
use arc_setup::conversion::ConversionClient;
use arc_setup::errors::SetupError;
use arc_setup::manifest::random_app_name;
use arc_setup::output::{persist_result, OutputPaths};
use arc_setup::prompt::TerminalAnswers;
use arc_setup::relay::RelayClient;
use arc_setup::sources::{load_github_host, load_organizations, GITHUB_DOTCOM_HOST};
use arc_setup::telemetry::init_telemetry;
use arc_setup::wizard::{SetupParams, SetupWizard};

#[derive(Parser)]
#[command(name = "arc-setup")]
#[command(about = "Provision a GitHub App for Actions Runner Controller via the manifest flow")]
#[command(
    long_about = "arc-setup walks an operator through GitHub's manifest flow to create and \
                  install a GitHub App for Actions Runner Controller. It opens a relay session, \
                  hands the operator a browser URL, waits for the app to be created, converts \
                  the resulting exchange code into credentials, and writes them out for the \
                  deployment tooling."
)]
struct Cli {
    /// Relay service base URL (overrides config and CODESPACE_NAME derivation)
    #[arg(long)]
    relay_url: Option<String>,

    /// Webhook callback URL registered in the app manifest
    #[arg(long)]
    webhook_url: Option<String>,

    /// File naming the target GitHub host
    #[arg(long)]
    host_file: Option<String>,

    /// File holding the operator's organization memberships as JSON
    #[arg(long)]
    orgs_file: Option<String>,

    /// Path for the resulting setup record
    #[arg(long)]
    output: Option<String>,
}

fn main() {
    let cli = Cli::parse();
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to start runtime: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(cli)) {
        eprintln!("error: {e:#}");
        let code = match e.downcast_ref::<SetupError>() {
            Some(SetupError::Cancelled) => 130,
            _ => 1,
        };
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    dotenvy::dotenv().ok();
    init_telemetry()?;

    let mut config = SetupConfig::load()?;
    if cli.relay_url.is_some() {
        config.relay.base_url = cli.relay_url;
    }
    if cli.webhook_url.is_some() {
        config.relay.webhook_url = cli.webhook_url;
    }
    if let Some(host_file) = cli.host_file {
        config.github.host_file = host_file;
    }
    if let Some(orgs_file) = cli.orgs_file {
        config.github.orgs_file = orgs_file;
    }
    if let Some(output) = cli.output {
        config.output.result_file = output;
    }

    provision(&config).await
}

async fn provision(config: &SetupConfig) -> Result<()> {
    let github_host = load_github_host(&config.github.host_file)?;
    let organizations = load_organizations(&config.github.orgs_file)?;
    let enterprise = github_host != GITHUB_DOTCOM_HOST;

    let policy = config.retry.policy();
    let relay = RelayClient::new(config.relay_base_url()?, policy.clone());
    let conversion = ConversionClient::for_host(&github_host, enterprise, policy);

    let mut answers = TerminalAnswers::new(config.ack_timeout());
    let params = SetupParams {
        organizations,
        github_host,
        webhook_url: config.webhook_url()?,
        app_name: random_app_name("arc-setup"),
        enterprise,
    };

    let result = SetupWizard::new(&mut answers, &relay, &conversion, params)
        .run()
        .await?;

    let paths = OutputPaths {
        result_file: config.output.result_file.clone().into(),
        key_file: config.output.key_file.clone().into(),
    };
    let record = persist_result(&result, &paths)?;

    println!(
        "✅ Setup complete. App '{}' (id {}) is installed on {}; configuration written to {}.",
        record.app_slug,
        record.app_id,
        record.organization,
        paths.result_file.display()
    );
    Ok(())
}
