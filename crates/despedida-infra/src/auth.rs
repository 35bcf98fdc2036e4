//! Static-secret admin authenticator.
//!
//! The shared secret comes from the environment; a bearer token is simply
//! the base64 of that secret. Verification decodes the presented token and
//! compares it against the configured value.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use despedida_core::auth::Authenticator;
use despedida_types::error::AuthError;

/// Environment variable holding the shared admin secret.
pub const ADMIN_PASSWORD_ENV: &str = "DESPEDIDA_ADMIN_PASSWORD";

/// Authenticator comparing a base64 bearer token against a configured secret.
pub struct StaticTokenAuthenticator {
    secret: String,
}

impl StaticTokenAuthenticator {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Read the shared secret from `DESPEDIDA_ADMIN_PASSWORD`.
    pub fn from_env() -> anyhow::Result<Self> {
        match std::env::var(ADMIN_PASSWORD_ENV) {
            Ok(secret) if !secret.is_empty() => Ok(Self::new(secret)),
            _ => anyhow::bail!("{ADMIN_PASSWORD_ENV} must be set to a non-empty admin secret"),
        }
    }
}

impl Authenticator for StaticTokenAuthenticator {
    fn verify_token(&self, token: &str) -> bool {
        match BASE64.decode(token.trim()) {
            Ok(decoded) => decoded == self.secret.as_bytes(),
            Err(_) => false,
        }
    }

    fn issue_token(&self, password: &str) -> Result<String, AuthError> {
        if password == self.secret {
            Ok(BASE64.encode(&self.secret))
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issued_token_verifies() {
        let auth = StaticTokenAuthenticator::new("secreto");
        let token = auth.issue_token("secreto").unwrap();
        assert!(auth.verify_token(&token));
    }

    #[test]
    fn test_wrong_password_rejected() {
        let auth = StaticTokenAuthenticator::new("secreto");
        assert!(matches!(
            auth.issue_token("otra"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_bad_tokens_fail_verification() {
        let auth = StaticTokenAuthenticator::new("secreto");
        // Valid base64 of the wrong secret
        assert!(!auth.verify_token(&BASE64.encode("otra")));
        // Not base64 at all
        assert!(!auth.verify_token("%%% no es base64 %%%"));
        assert!(!auth.verify_token(""));
    }
}
