mod commands;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use commands::auth::{self, AuthCommand};
use commands::search::{self, FilterArgs, SearchRequest};
use jira_search_api::{ClientConfig, JiraClient};
use jira_search_auth::{password_key, CredentialStore};
use jira_search_config::Config;
use jira_search_output::{OutputFormat, OutputRenderer};
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

pub(crate) const APP_NAME: &str = "jira-search";

#[derive(Parser, Debug)]
#[command(name = "jira-search", version, about = "Search Jira issues from the command line", long_about = None)]
struct Cli {
    /// Profile to use from config file
    #[arg(short, long, global = true)]
    profile: Option<String>,

    /// Path to config file (defaults to ~/.jira-search/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format for command results
    #[arg(long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    output: OutputFormat,

    /// Enable verbose logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: JiraSearchCommand,
}

#[derive(Subcommand, Debug, Clone)]
enum JiraSearchCommand {
    /// Search issues by status, user and priority
    Search(FilterArgs),
    /// Open issues assigned to the logged-in user
    Assigned,
    /// Open issues reported by the logged-in user
    Reported,
    /// Print the search URL without sending it
    Query(FilterArgs),
    /// Authentication commands
    #[command(subcommand)]
    Auth(AuthCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug)?;

    let config_path = cli.config.clone();
    let mut config = Config::load(config_path.as_ref())?;
    let renderer = OutputRenderer::new(cli.output);

    match cli.command {
        JiraSearchCommand::Auth(command) => {
            auth::handle(
                command,
                &mut config,
                config_path.as_deref(),
                cli.profile.as_deref(),
                &CredentialStore::new(APP_NAME)?,
                &renderer,
            )
            .await?
        }
        JiraSearchCommand::Query(args) => {
            let profile = resolve_active_profile(&config, cli.profile.as_deref())?;
            let client = JiraClient::new(profile.client_config()?)?;
            println!("{}", client.build_search_uri(&args.to_filters()));
        }
        JiraSearchCommand::Search(args) => {
            let client = connect(&config, cli.profile.as_deref()).await?;
            search::execute(SearchRequest::Filters(args.to_filters()), &client, &renderer).await?
        }
        JiraSearchCommand::Assigned => {
            let client = connect(&config, cli.profile.as_deref()).await?;
            search::execute(SearchRequest::AssignedToMe, &client, &renderer).await?
        }
        JiraSearchCommand::Reported => {
            let client = connect(&config, cli.profile.as_deref()).await?;
            search::execute(SearchRequest::ReportedByMe, &client, &renderer).await?
        }
    }

    Ok(())
}

fn init_tracing(debug: bool) -> Result<()> {
    let default = if debug {
        "info,jira_search=debug,jira_search_api=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!("failed to initialize logger: {err}"))
}

pub(crate) struct ActiveProfile {
    name: String,
    base_url: String,
    user: String,
    api_version: String,
    verify: bool,
}

impl ActiveProfile {
    pub(crate) fn client_config(&self) -> Result<ClientConfig> {
        let config = ClientConfig::new(&self.base_url)
            .with_context(|| format!("Profile '{}' has an invalid base_url", self.name))?;
        Ok(config
            .with_api_version(self.api_version.clone())
            .with_verify(self.verify))
    }
}

pub(crate) fn resolve_active_profile(
    config: &Config,
    requested: Option<&str>,
) -> Result<ActiveProfile> {
    let (name, profile) = config
        .resolve_profile(requested)
        .ok_or_else(|| anyhow!("No profile configured. Run `jira-search auth login` first."))?;

    let base_url = profile
        .base_url
        .clone()
        .ok_or_else(|| anyhow!("Profile '{name}' is missing a base_url."))?;
    let user = profile
        .user
        .clone()
        .ok_or_else(|| anyhow!("Profile '{name}' is missing a user."))?;

    Ok(ActiveProfile {
        name: name.to_string(),
        base_url,
        user,
        api_version: profile.api_version().to_string(),
        verify: profile.verify(),
    })
}

/// Password lookup: profile env var, generic env var, then the credential store.
pub(crate) fn resolve_password(profile: &ActiveProfile, store: &CredentialStore) -> Result<String> {
    let profile_env_var = format!(
        "JIRA_SEARCH_PASSWORD_{}",
        profile.name.to_uppercase().replace('-', "_")
    );

    let from_env = std::env::var(&profile_env_var)
        .ok()
        .filter(|p| !p.is_empty())
        .or_else(|| {
            std::env::var("JIRA_SEARCH_PASSWORD")
                .ok()
                .filter(|p| !p.is_empty())
        });

    if let Some(password) = from_env {
        return Ok(password);
    }

    store
        .get_secret(&password_key(&profile.base_url, &profile.name))?
        .ok_or_else(|| {
            anyhow!(
                "No password found for profile '{}'. Set {} or run `jira-search auth login --name {}`",
                profile.name,
                profile_env_var,
                profile.name
            )
        })
}

async fn connect(config: &Config, requested: Option<&str>) -> Result<JiraClient> {
    let profile = resolve_active_profile(config, requested)?;
    let password = resolve_password(&profile, &CredentialStore::new(APP_NAME)?)?;

    let client = JiraClient::login_basic_auth(profile.client_config()?, &profile.user, &password)
        .await
        .with_context(|| format!("Unable to reach {}", profile.base_url))?;

    if !client.is_authenticated() {
        warn!(
            profile = %profile.name,
            "Login was rejected, searching without a session"
        );
    }

    Ok(client)
}
