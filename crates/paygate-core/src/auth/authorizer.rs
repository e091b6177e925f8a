//! Token authorization gate.
//!
//! Flow:
//! 1. Token present (an optional `Bearer ` prefix is stripped)
//! 2. Signing secret resolvable (fail closed otherwise)
//! 3. Signature and structure verified under the pinned algorithm, then
//!    the `iat`, `nbf` and `exp` claims against the clock
//! 4. `scope` equals the required scope
//! 5. Allow

use std::sync::Arc;

use super::config::{PrincipalMode, TokenPolicy};
use super::decision::AuthorizationDecision;
use super::error::AuthError;
use super::gateway::{AuthorizerRequest, AuthorizerResponse};
use super::validation::{Claims, TokenVerifier};
use crate::secrets::{SecretSource, SecretValue};

/// Stateless per-request authorizer. Safe to share across concurrent requests.
pub struct Authorizer {
    secrets: Arc<dyn SecretSource>,
    policy: TokenPolicy,
    verifier: TokenVerifier,
}

impl Authorizer {
    pub fn new(secrets: Arc<dyn SecretSource>, policy: TokenPolicy) -> Self {
        let verifier = TokenVerifier::new(&policy);
        Self {
            secrets,
            policy,
            verifier,
        }
    }

    /// Decide Allow/Deny for `token` against `resource`. Never fails: every
    /// error becomes a Deny carrying its reason.
    pub fn authorize(&self, token: Option<&str>, resource: &str) -> AuthorizationDecision {
        match self.evaluate(token) {
            Ok(claims) => {
                let principal = match &self.policy.principal {
                    PrincipalMode::Subject => claims.sub,
                    PrincipalMode::Fixed { principal_id } => principal_id.clone(),
                };
                tracing::info!(resource, principal = %principal, "authorization allowed");
                AuthorizationDecision::allow(principal, resource)
            }
            Err(reason) => {
                tracing::warn!(resource, reason = reason.code(), "authorization denied");
                AuthorizationDecision::deny(self.policy.fallback_principal(), resource, reason)
            }
        }
    }

    /// Gateway-facing entry point.
    pub fn handle(&self, request: &AuthorizerRequest) -> AuthorizerResponse {
        self.authorize(request.authorization_token.as_deref(), &request.method_arn)
            .into()
    }

    fn evaluate(&self, token: Option<&str>) -> Result<Claims, AuthError> {
        let token = token
            .map(strip_bearer)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;

        let secret = self.signing_secret()?;
        let claims = self.verifier.verify(token, &secret)?;

        if !claims.has_scope(&self.policy.required_scope) {
            return Err(AuthError::InvalidScope);
        }
        Ok(claims)
    }

    fn signing_secret(&self) -> Result<SecretValue, AuthError> {
        match self.secrets.resolve_non_empty(&self.policy.signing_secret) {
            Ok(Some(secret)) => Ok(secret),
            Ok(None) => Err(AuthError::MissingSecret),
            Err(e) => {
                tracing::error!(error = %e, "signing secret lookup failed");
                Err(AuthError::MissingSecret)
            }
        }
    }
}

fn strip_bearer(token: &str) -> &str {
    let token = token.trim();
    match token.get(..6) {
        Some(scheme) if scheme.eq_ignore_ascii_case("bearer") => {
            let rest = &token[6..];
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                rest.trim_start()
            } else {
                token
            }
        }
        _ => token,
    }
}

#[cfg(test)]
mod tests {
    use super::strip_bearer;

    #[test]
    fn test_strip_bearer() {
        assert_eq!(strip_bearer("Bearer abc.def.ghi"), "abc.def.ghi");
        assert_eq!(strip_bearer("bearer\tabc"), "abc");
        assert_eq!(strip_bearer("  BEARER   abc  "), "abc");
        assert_eq!(strip_bearer("Bearer "), "");
        assert_eq!(strip_bearer("Bearer"), "");
        assert_eq!(strip_bearer("Bearerabc"), "Bearerabc");
        assert_eq!(strip_bearer("abc.def.ghi"), "abc.def.ghi");
        assert_eq!(strip_bearer("ééé"), "ééé");
    }
}
