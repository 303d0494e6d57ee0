pub mod client;
pub mod credentials;
pub mod error;
pub mod query;

pub use client::{ClientConfig, DEFAULT_API_VERSION};
pub use credentials::BasicAuth;
pub use error::{ApiError, Result};
pub use query::{SearchFilters, CURRENT_USER, DEFAULT_STATUS};

use reqwest::header::COOKIE;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

/// Client for the Jira search API.
///
/// A client is either unauthenticated or carries the session cookies of
/// the login that created it. It never changes state afterwards.
#[derive(Clone, Debug)]
pub struct JiraClient {
    client: Client,
    config: ClientConfig,
    credentials: Option<BasicAuth>,
}

impl JiraClient {
    /// Unauthenticated client. Searches are sent without cookies.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = config.http_client()?;
        Ok(Self {
            client,
            config,
            credentials: None,
        })
    }

    /// Log in against `{base}/rest/auth/latest/session` with basic auth.
    ///
    /// A rejected login is not an error: the returned client is simply
    /// unauthenticated. Only transport failures are reported.
    pub async fn login_basic_auth(
        config: ClientConfig,
        user: &str,
        password: &str,
    ) -> Result<Self> {
        let client = config.http_client()?;
        let session_url = config.session_url()?;

        debug!(url = %session_url, user, "Authenticating");

        let response = client
            .get(session_url)
            .basic_auth(user, Some(password))
            .send()
            .await
            .map_err(ApiError::RequestFailed)?;

        let status = response.status();
        let credentials = if status.is_success() {
            let auth = BasicAuth::from_response(&response);
            info!(user, cookies = auth.cookies().len(), "Session established");
            Some(auth)
        } else {
            warn!(
                user,
                status = status.as_u16(),
                "Login rejected, continuing unauthenticated"
            );
            None
        };

        Ok(Self {
            client,
            config,
            credentials,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn credentials(&self) -> Option<&BasicAuth> {
        self.credentials.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    pub fn build_search_uri(&self, filters: &SearchFilters) -> String {
        query::search_uri(self.config.base_url(), self.config.api_version(), filters)
    }

    /// Run a jql search and parse the response body as JSON.
    ///
    /// The HTTP status is not inspected; error bodies are parsed and
    /// returned like any other.
    pub async fn search(&self, filters: &SearchFilters) -> Result<Value> {
        let url = Url::parse(&self.build_search_uri(filters)).map_err(ApiError::InvalidUrl)?;

        debug!(
            url = %url,
            authenticated = self.is_authenticated(),
            "Sending search request"
        );

        let mut request = self.client.get(url);
        if let Some(cookie) = self.credentials.as_ref().and_then(BasicAuth::cookie_header) {
            request = request.header(COOKIE, cookie);
        }

        let response = request.send().await.map_err(ApiError::RequestFailed)?;
        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "Search returned a non-success status");
        }

        let body = response.bytes().await.map_err(ApiError::RequestFailed)?;
        serde_json::from_slice(&body).map_err(ApiError::JsonError)
    }

    pub async fn assigned_to_me(&self) -> Result<Value> {
        self.search(&SearchFilters::assigned_to_me()).await
    }

    pub async fn reported_by_me(&self) -> Result<Value> {
        self.search(&SearchFilters::reported_by_me()).await
    }
}
