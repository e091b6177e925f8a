use serde::{Deserialize, Serialize};

use super::error::AuthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// Outcome of one authorization request. Built fresh per call, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationDecision {
    pub principal: String,
    pub effect: Effect,
    pub resource: String,
    /// Set exactly when `effect` is `Deny`.
    pub reason: Option<AuthError>,
}

impl AuthorizationDecision {
    pub fn allow(principal: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            principal: principal.into(),
            effect: Effect::Allow,
            resource: resource.into(),
            reason: None,
        }
    }

    pub fn deny(
        principal: impl Into<String>,
        resource: impl Into<String>,
        reason: AuthError,
    ) -> Self {
        Self {
            principal: principal.into(),
            effect: Effect::Deny,
            resource: resource.into(),
            reason: Some(reason),
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.effect == Effect::Allow
    }

    pub fn message(&self) -> Option<String> {
        self.reason.map(|r| r.to_string())
    }
}
