// # Token Credential Trait
//
// Pre-resolved credential handed to providers that authenticate with bearer
// tokens. How the credential was obtained (managed identity, CLI login,
// service principal) is outside this crate; zones only ask it for a token,
// once, during lazy initialization.
//
// ## Security
//
// - Token values NEVER appear in `Debug` output or logs

use async_trait::async_trait;
use std::fmt;

/// Bearer token returned by a credential
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    secret: String,
}

impl AccessToken {
    /// Wrap a raw token value
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// The raw token value
    /// ⚠️ NEVER log this value
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"<REDACTED>")
            .finish()
    }
}

/// Trait for credentials that issue bearer tokens
#[async_trait]
pub trait TokenCredential: Send + Sync + fmt::Debug {
    /// Get a token for a resource scope
    ///
    /// # Parameters
    ///
    /// - `scope`: OAuth scope (e.g., "https://management.azure.com/.default")
    async fn get_token(&self, scope: &str) -> Result<AccessToken, crate::Error>;
}

/// Credential holding a token that was acquired elsewhere
#[derive(Clone)]
pub struct StaticTokenCredential {
    token: AccessToken,
}

impl StaticTokenCredential {
    /// Create a credential from a raw token value
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: AccessToken::new(token),
        }
    }
}

impl fmt::Debug for StaticTokenCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticTokenCredential")
            .field("token", &self.token)
            .finish()
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn get_token(&self, _scope: &str) -> Result<AccessToken, crate::Error> {
        if self.token.secret().is_empty() {
            return Err(crate::Error::auth("static token is empty"));
        }
        Ok(self.token.clone())
    }
}
