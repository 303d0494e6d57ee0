use std::collections::BTreeMap;
use std::fmt;

/// Session cookies handed out by a successful basic-auth login.
///
/// Only names and values are kept. `Domain`, `Path`, `Secure` and expiry
/// attributes are dropped, and every cookie is sent with each search to the
/// base URL the login was made against.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    cookies: BTreeMap<String, String>,
}

impl BasicAuth {
    pub fn new(cookies: BTreeMap<String, String>) -> Self {
        Self { cookies }
    }

    /// Collect the cookies set by a session response, ignoring their
    /// attributes.
    pub fn from_response(response: &reqwest::Response) -> Self {
        let cookies = response
            .cookies()
            .map(|cookie| (cookie.name().to_string(), cookie.value().to_string()))
            .collect();
        Self { cookies }
    }

    pub fn cookies(&self) -> &BTreeMap<String, String> {
        &self.cookies
    }

    /// Value for a `Cookie` request header, or `None` when the jar is empty.
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }

        let pairs: Vec<String> = self
            .cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        Some(pairs.join("; "))
    }
}

// Cookie values are session secrets.
impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("cookies", &self.cookies.keys().collect::<Vec<_>>())
            .finish()
    }
}
