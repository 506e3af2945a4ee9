//! Storage key normalization
//!
//! A cached token is keyed by the host of the login endpoint plus the user
//! name. The host is taken from the URL authority only, so
//! `https://acct.example.com:443/session?x=1` and `https://acct.example.com`
//! share an entry.

use tracing::error;
use url::Url;

use crate::error::{CacheError, Result};

/// Extract the host component from a fully qualified server URL.
pub fn extract_host(server_url: &str) -> Result<String> {
    let url = Url::parse(server_url).map_err(|e| {
        error!("Invalid server url for retrieving host name");
        CacheError::InvalidServerUrl(e.to_string())
    })?;

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(host.to_string()),
        _ => {
            error!("Server url has no host component");
            Err(CacheError::InvalidServerUrl(format!(
                "no host in url with scheme '{}'",
                url.scheme()
            )))
        }
    }
}

/// Case-fold one part of a storage key.
///
/// Every backend stores keys in this form so `Alice` and `alice` share a token.
pub fn fold_key_part(part: &str) -> String {
    part.to_uppercase()
}

/// (host, user) pair identifying one cached token
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CredentialKey {
    pub host: String,
    pub user: String,
}

impl CredentialKey {
    pub fn new(host: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            user: user.into(),
        }
    }

    /// Build a key from a full server URL and a user name
    pub fn from_server_url(server_url: &str, user: &str) -> Result<Self> {
        Ok(Self::new(extract_host(server_url)?, user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_host_drops_port_path_and_query() {
        let host = extract_host("https://acct.snowflakecomputing.com:443/session/v1?request_id=1")
            .unwrap();
        assert_eq!(host, "acct.snowflakecomputing.com");
    }

    #[test]
    fn test_extract_host_is_stable() {
        let a = extract_host("https://acct.snowflakecomputing.com:443/").unwrap();
        let b = extract_host("https://acct.snowflakecomputing.com").unwrap();
        let c = extract_host("http://acct.snowflakecomputing.com:8080/x#frag").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_extract_host_ip_literals() {
        assert_eq!(extract_host("https://10.0.0.1:8443/").unwrap(), "10.0.0.1");
        assert_eq!(extract_host("https://[::1]:8443/").unwrap(), "[::1]");
    }

    #[test]
    fn test_malformed_url_is_error() {
        let err = extract_host("not a url").unwrap_err();
        assert!(err.is_internal());

        assert!(extract_host("").is_err());
        assert!(extract_host("https://").is_err());
    }

    #[test]
    fn test_url_without_host_is_error() {
        assert!(matches!(
            extract_host("mailto:alice@example.com"),
            Err(CacheError::InvalidServerUrl(_))
        ));
        assert!(extract_host("file:///tmp/token").is_err());
    }

    #[test]
    fn test_fold_key_part() {
        assert_eq!(fold_key_part("Acct.Example.com"), "ACCT.EXAMPLE.COM");
        assert_eq!(fold_key_part("alice"), fold_key_part("ALICE"));
    }

    #[test]
    fn test_credential_key_from_server_url() {
        let key = CredentialKey::from_server_url("https://acct.example.com:443/", "alice").unwrap();
        assert_eq!(key, CredentialKey::new("acct.example.com", "alice"));
    }
}
