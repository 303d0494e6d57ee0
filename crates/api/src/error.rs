use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ApiError {
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            ApiError::RequestFailed(err) if err.is_connect() => {
                Some("Check the base URL and your network connection")
            }
            ApiError::InvalidUrl(_) | ApiError::InvalidBaseUrl { .. } => {
                Some("Use an absolute URL such as https://jira.example.com")
            }
            ApiError::JsonError(_) => {
                Some("The server did not return JSON; check the base URL and API version")
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_suggestion() {
        let err = ApiError::from(url::Url::parse("not a url").unwrap_err());
        assert!(err.to_string().starts_with("Invalid URL"));
        assert!(err.suggestion().unwrap().contains("absolute URL"));
    }

    #[test]
    fn test_invalid_base_url_suggestion() {
        let err = ApiError::InvalidBaseUrl {
            url: "ftp://jira.example.com".to_string(),
            reason: "scheme must be http or https".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid base URL ftp://jira.example.com: scheme must be http or https"
        );
        assert!(err.suggestion().unwrap().contains("absolute URL"));
    }

    #[test]
    fn test_json_error_suggestion() {
        let err = ApiError::from(serde_json::from_str::<serde_json::Value>("<html>").unwrap_err());
        assert!(err.to_string().starts_with("JSON parsing error"));
        assert!(err.suggestion().is_some());
    }
}
