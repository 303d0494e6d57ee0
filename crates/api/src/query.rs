/// Status used when a search does not ask for one.
pub const DEFAULT_STATUS: &str = "Open";

/// Server-side token for the logged-in user.
pub const CURRENT_USER: &str = "currentUser()";

/// Filters recognised by the search endpoint.
///
/// Values are interpolated into the jql expression verbatim; nothing is
/// quoted or escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilters {
    pub status: String,
    pub user: Option<String>,
    pub search_type: Option<String>,
    pub priority: Option<String>,
}

impl SearchFilters {
    pub fn new() -> Self {
        Self {
            status: DEFAULT_STATUS.to_string(),
            user: None,
            search_type: None,
            priority: None,
        }
    }

    /// Open issues assigned to the logged-in user.
    pub fn assigned_to_me() -> Self {
        Self::new().search_type("assignee").user(CURRENT_USER)
    }

    /// Open issues reported by the logged-in user.
    ///
    /// NOTE: this matches on `assignee`, not `reporter`, so it returns the
    /// same issues as [`SearchFilters::assigned_to_me`]. Existing callers
    /// depend on that, see the regression test below.
    pub fn reported_by_me() -> Self {
        Self::new().search_type("assignee").user(CURRENT_USER)
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Field the `user` value is matched against, e.g. `assignee`.
    pub fn search_type(mut self, search_type: impl Into<String>) -> Self {
        self.search_type = Some(search_type.into());
        self
    }

    pub fn priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Build the jql expression for these filters.
    ///
    /// The user clause is only emitted when both `user` and `search_type`
    /// are set. The priority clause keeps its historical double space.
    pub fn jql(&self) -> String {
        let mut jql = format!("status={}", self.status);

        if let (Some(user), Some(search_type)) = (&self.user, &self.search_type) {
            jql.push_str(&format!(" and {}={}", search_type, user));
        }

        if let Some(priority) = &self.priority {
            jql.push_str(&format!(" and  priority={}", priority));
        }

        jql
    }
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self::new()
    }
}

/// `{base}/rest/api/{api_version}/search?jql={jql}`
pub fn search_uri(base_url: &str, api_version: &str, filters: &SearchFilters) -> String {
    format!(
        "{}/rest/api/{}/search?jql={}",
        base_url,
        api_version,
        filters.jql()
    )
}
