use anyhow::{Context, Result};
use clap::Args;
use jira_search_api::{JiraClient, SearchFilters, DEFAULT_STATUS};
use jira_search_output::OutputRenderer;
use tracing::warn;

#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    /// Issue status to match
    #[arg(long, default_value = DEFAULT_STATUS)]
    pub status: String,
    /// User value, e.g. a username or currentUser()
    #[arg(long, requires = "search_type")]
    pub user: Option<String>,
    /// Field the user is matched against (assignee, reporter, ...)
    #[arg(long, requires = "user")]
    pub search_type: Option<String>,
    /// Issue priority to match
    #[arg(long)]
    pub priority: Option<String>,
}

impl FilterArgs {
    pub fn to_filters(&self) -> SearchFilters {
        SearchFilters {
            status: self.status.clone(),
            user: self.user.clone(),
            search_type: self.search_type.clone(),
            priority: self.priority.clone(),
        }
    }
}

pub enum SearchRequest {
    Filters(SearchFilters),
    AssignedToMe,
    ReportedByMe,
}

pub async fn execute(
    request: SearchRequest,
    client: &JiraClient,
    renderer: &OutputRenderer,
) -> Result<()> {
    let result = match &request {
        SearchRequest::Filters(filters) => client.search(filters).await,
        SearchRequest::AssignedToMe => client.assigned_to_me().await,
        SearchRequest::ReportedByMe => client.reported_by_me().await,
    };

    let response = match result {
        Ok(response) => response,
        Err(err) => {
            if let Some(hint) = err.suggestion() {
                warn!("{hint}");
            }
            return Err(err).context("Search request failed");
        }
    };

    renderer.render_search(&response)
}
