use crate::error::{invalid_request, FeedResult};
use std::fmt;
use url::Url;

/// Basic-authentication credentials for a feed
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: Option<String>,
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

impl BasicAuth {
    /// Credentials are only sent when a non-empty username was given
    pub fn from_parts(username: Option<String>, password: Option<String>) -> Option<Self> {
        username
            .filter(|name| !name.is_empty())
            .map(|username| Self { username, password })
    }
}

/// A single feed download
#[derive(Debug, Clone)]
pub struct FeedRequest {
    pub url: Url,
    pub auth: Option<BasicAuth>,
}

impl FeedRequest {
    /// Validate the feed address; only http and https are fetched
    pub fn parse(url: &str, auth: Option<BasicAuth>) -> FeedResult<Self> {
        let url = Url::parse(url.trim())
            .map_err(|e| invalid_request(&format!("Invalid feed URL: {}", e)))?;

        match url.scheme() {
            "http" | "https" => Ok(Self { url, auth }),
            scheme => Err(invalid_request(&format!("Unsupported URL scheme: {}", scheme))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_feed_url() {
        let request = FeedRequest::parse("https://example.com/cal.ics", None).unwrap();
        assert_eq!(request.url.host_str(), Some("example.com"));

        assert!(FeedRequest::parse("webcal://example.com/cal.ics", None).is_err());
        assert!(FeedRequest::parse("file:///etc/passwd", None).is_err());
        assert!(FeedRequest::parse("not a url", None).is_err());
    }

    #[test]
    fn test_basic_auth_needs_username() {
        assert!(BasicAuth::from_parts(None, Some("secret".to_string())).is_none());
        assert!(BasicAuth::from_parts(Some(String::new()), None).is_none());

        let auth = BasicAuth::from_parts(Some("alice".to_string()), Some("secret".to_string())).unwrap();
        assert_eq!(auth.username, "alice");
        assert!(!format!("{:?}", auth).contains("secret"));
    }
}
