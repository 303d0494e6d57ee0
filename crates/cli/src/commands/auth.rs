use std::path::Path;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Subcommand};
use jira_search_api::{ClientConfig, JiraClient};
use jira_search_auth::{password_key, CredentialStore};
use jira_search_config::Config;
use jira_search_output::OutputRenderer;
use serde::Serialize;

use crate::{resolve_active_profile, resolve_password};

#[derive(Subcommand, Debug, Clone)]
pub enum AuthCommand {
    /// Add or update a profile and store its password
    Login(LoginArgs),
    /// Remove the stored password (and optionally the profile)
    Logout(LogoutArgs),
    /// List configured profiles
    List,
    /// Open a session to check the stored credentials
    Test,
}

#[derive(Args, Debug, Clone)]
pub struct LoginArgs {
    /// Profile name to create or update.
    #[arg(long = "name")]
    pub name: String,
    /// Jira base URL (e.g. https://jira.example.com).
    #[arg(long)]
    pub base_url: String,
    /// Jira user name.
    #[arg(long)]
    pub user: String,
    /// Password to store (falls back to JIRA_SEARCH_PASSWORD env or interactive prompt).
    #[arg(long, env = "JIRA_SEARCH_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
    /// REST API version used for searches.
    #[arg(long)]
    pub api_version: Option<String>,
    /// Skip TLS certificate verification.
    #[arg(long)]
    pub insecure: bool,
    /// Mark this profile as the default one.
    #[arg(long)]
    pub default: bool,
}

#[derive(Args, Debug, Clone)]
pub struct LogoutArgs {
    /// Profile to remove the password for.
    #[arg(long = "name")]
    pub name: String,
    /// Remove the profile from config entirely (not just the stored password).
    #[arg(long)]
    pub remove_profile: bool,
}

pub async fn handle(
    command: AuthCommand,
    config: &mut Config,
    config_path: Option<&Path>,
    requested: Option<&str>,
    store: &CredentialStore,
    renderer: &OutputRenderer,
) -> Result<()> {
    match command {
        AuthCommand::Login(args) => login(args, config, config_path, store),
        AuthCommand::Logout(args) => logout(args, config, config_path, store),
        AuthCommand::List => list_profiles(config, store, renderer),
        AuthCommand::Test => test_auth(config, requested, store).await,
    }
}

fn login(
    args: LoginArgs,
    config: &mut Config,
    config_path: Option<&Path>,
    store: &CredentialStore,
) -> Result<()> {
    if args.name.trim().is_empty() {
        return Err(anyhow!("Profile name cannot be empty"));
    }

    let client_config = ClientConfig::new(&args.base_url)
        .with_context(|| format!("Invalid Jira base URL: {}", args.base_url))?;

    let password = match args.password {
        Some(password) if !password.is_empty() => password,
        _ => rpassword::prompt_password("Password: ").context("Failed to read password")?,
    };
    if password.is_empty() {
        return Err(anyhow!("Password cannot be empty"));
    }

    let profile_entry = config.profiles.entry(args.name.clone()).or_default();
    profile_entry.base_url = Some(client_config.base_url().to_string());
    profile_entry.user = Some(args.user.clone());
    profile_entry.api_version = args.api_version.clone();
    profile_entry.verify = args.insecure.then_some(false);

    if args.default || config.default_profile.is_none() {
        config.default_profile = Some(args.name.clone());
    }

    let secret_key = password_key(client_config.base_url(), &args.name);
    store
        .set_secret(&secret_key, &password)
        .context("Failed to store password")?;

    config
        .save(config_path)
        .context("Unable to persist configuration file")?;

    tracing::info!(
        profile = %args.name,
        base_url = %client_config.base_url(),
        "Profile saved and password stored"
    );
    Ok(())
}

fn logout(
    args: LogoutArgs,
    config: &mut Config,
    config_path: Option<&Path>,
    store: &CredentialStore,
) -> Result<()> {
    let profile = config
        .profiles
        .get(&args.name)
        .ok_or_else(|| anyhow!("Profile '{}' does not exist", args.name))?;

    let base_url = profile
        .base_url
        .as_deref()
        .ok_or_else(|| anyhow!("Profile '{}' is missing a base_url", args.name))?;

    store
        .delete_secret(&password_key(base_url, &args.name))
        .context("Failed to delete stored password")?;

    if args.remove_profile {
        config.profiles.remove(&args.name);
        if config.default_profile.as_deref() == Some(args.name.as_str()) {
            config.default_profile = config.profiles.keys().next().cloned();
        }
    }

    config
        .save(config_path)
        .context("Unable to persist configuration file")?;
    tracing::info!(profile = %args.name, "Credentials removed");
    Ok(())
}

fn list_profiles(config: &Config, store: &CredentialStore, renderer: &OutputRenderer) -> Result<()> {
    #[derive(Serialize)]
    struct Row<'a> {
        name: &'a str,
        base_url: &'a str,
        user: &'a str,
        api_version: &'a str,
        verify: bool,
        has_password: bool,
        is_default: bool,
    }

    let mut rows = Vec::new();
    for (name, profile) in &config.profiles {
        let base_url = profile.base_url.as_deref().unwrap_or("");
        let has_password = store.get_secret(&password_key(base_url, name))?.is_some();
        rows.push(Row {
            name,
            base_url,
            user: profile.user.as_deref().unwrap_or(""),
            api_version: profile.api_version(),
            verify: profile.verify(),
            has_password,
            is_default: config.default_profile.as_deref() == Some(name.as_str()),
        });
    }

    if rows.is_empty() {
        tracing::warn!("No profiles configured yet. Use `jira-search auth login` to add one.");
    }

    renderer.render(&rows)
}

async fn test_auth(
    config: &Config,
    requested: Option<&str>,
    store: &CredentialStore,
) -> Result<()> {
    let profile = resolve_active_profile(config, requested)?;
    let password = resolve_password(&profile, store)?;

    let client = JiraClient::login_basic_auth(profile.client_config()?, &profile.user, &password)
        .await
        .context("Authentication test failed")?;

    if client.is_authenticated() {
        println!("Session established for {}", profile.user);
        Ok(())
    } else {
        Err(anyhow!("Login rejected for {}", profile.user))
    }
}
