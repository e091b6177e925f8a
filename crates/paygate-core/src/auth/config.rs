use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Scope a token must carry to invoke the payment-processing endpoint.
pub const PAYMENT_PROCESS_SCOPE: &str = "payment:process";

/// Principal reported to the gateway when no subject-derived principal applies.
pub const DEFAULT_PRINCIPAL_ID: &str = "user";

/// Default name of the token-signing secret.
pub const DEFAULT_SIGNING_SECRET: &str = "JWT_SECRET_KEY";

/// How the `principalId` of a decision is chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum PrincipalMode {
    /// Same identifier for every decision.
    Fixed {
        #[serde(default = "default_principal_id")]
        principal_id: String,
    },
    /// Verified `sub` claim on Allow; the default identifier on Deny.
    Subject,
}

fn default_principal_id() -> String {
    DEFAULT_PRINCIPAL_ID.to_string()
}

impl Default for PrincipalMode {
    fn default() -> Self {
        Self::Fixed {
            principal_id: default_principal_id(),
        }
    }
}

/// Token verification policy.
///
/// The signature algorithm is pinned here and never read from the token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPolicy {
    /// Name of the signing secret in the secret source.
    pub signing_secret: String,
    pub required_scope: String,
    /// Clock skew tolerated on `iat`, `nbf` and `exp`.
    pub leeway: Duration,
    pub principal: PrincipalMode,
}

impl TokenPolicy {
    pub const ALGORITHM: Algorithm = Algorithm::HS256;

    /// Principal used on Deny, and on Allow in fixed mode.
    pub fn fallback_principal(&self) -> &str {
        match &self.principal {
            PrincipalMode::Fixed { principal_id } => principal_id,
            PrincipalMode::Subject => DEFAULT_PRINCIPAL_ID,
        }
    }
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self {
            signing_secret: DEFAULT_SIGNING_SECRET.to_string(),
            required_scope: PAYMENT_PROCESS_SCOPE.to_string(),
            leeway: Duration::ZERO,
            principal: PrincipalMode::default(),
        }
    }
}
