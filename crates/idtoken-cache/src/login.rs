//! Token and login type definitions

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Cached id token - automatically zeroed when dropped
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct IdToken {
    value: String,
}

impl IdToken {
    /// Wrap a raw token value
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Get the token value (use carefully)
    pub fn expose(&self) -> &str {
        &self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Consume and return the inner value
    pub fn into_inner(mut self) -> String {
        std::mem::take(&mut self.value)
    }
}

impl From<String> for IdToken {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for IdToken {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Debug for IdToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdToken")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// Inputs of a login attempt that the cache reads from and fills in
#[derive(Debug, Clone, Default)]
pub struct LoginInput {
    /// Full endpoint URL, e.g. `https://acct.example.com:443/`
    pub server_url: String,
    pub user_name: String,
    /// Cached token attached before authenticating, if any
    pub id_token: Option<IdToken>,
}

impl LoginInput {
    pub fn new(server_url: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            user_name: user_name.into(),
            id_token: None,
        }
    }
}

/// Outputs of a successful login
#[derive(Debug, Clone, Default)]
pub struct LoginOutput {
    /// Token issued by the server; may be absent or empty
    pub id_token: Option<IdToken>,
}

impl LoginOutput {
    pub fn with_id_token(token: impl Into<IdToken>) -> Self {
        Self {
            id_token: Some(token.into()),
        }
    }
}
