use reqwest::Client;
use url::Url;

use crate::error::{ApiError, Result};

pub const DEFAULT_API_VERSION: &str = "latest";

/// Connection settings shared by the login and search requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    api_version: String,
    verify: bool,
}

impl ClientConfig {
    /// Validates `base_url` as an absolute http(s) URL without query or
    /// fragment. A trailing `/` is dropped so endpoint paths can be appended
    /// directly.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let raw = base_url.as_ref().trim();
        let parsed = Url::parse(raw).map_err(ApiError::InvalidUrl)?;

        let reason = if !matches!(parsed.scheme(), "http" | "https") {
            Some("scheme must be http or https")
        } else if parsed.query().is_some() {
            Some("query strings are not allowed")
        } else if parsed.fragment().is_some() {
            Some("fragments are not allowed")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(ApiError::InvalidBaseUrl {
                url: raw.to_string(),
                reason: reason.to_string(),
            });
        }

        Ok(Self {
            base_url: raw.trim_end_matches('/').to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            verify: true,
        })
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Disable TLS certificate verification when `verify` is false.
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn verify(&self) -> bool {
        self.verify
    }

    pub(crate) fn session_url(&self) -> Result<Url> {
        Url::parse(&format!("{}/rest/auth/latest/session", self.base_url))
            .map_err(ApiError::InvalidUrl)
    }

    pub(crate) fn http_client(&self) -> Result<Client> {
        Client::builder()
            .user_agent(format!("jira-search/{}", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(!self.verify)
            .build()
            .map_err(ApiError::RequestFailed)
    }
}
