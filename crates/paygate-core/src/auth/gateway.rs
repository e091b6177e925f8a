//! Wire types exchanged with the API gateway.
//!
//! ```json
//! { "principalId": "user",
//!   "policyDocument": { "Version": "2012-10-17",
//!     "Statement": [{ "Action": "execute-api:Invoke", "Effect": "Deny", "Resource": "arn:..." }] },
//!   "message": "Invalid scope" }
//! ```

use serde::{Deserialize, Deserializer, Serialize};

use super::decision::{AuthorizationDecision, Effect};

pub const POLICY_VERSION: &str = "2012-10-17";
pub const INVOKE_ACTION: &str = "execute-api:Invoke";

/// Token-authorizer event delivered by the gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerRequest {
    /// A non-string token is kept as its JSON text. That text is never a
    /// compact JWS, so it is denied as an invalid token rather than
    /// rejecting the whole event.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "token_text"
    )]
    pub authorization_token: Option<String>,
    #[serde(default)]
    pub method_arn: String,
}

fn token_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerResponse {
    pub principal_id: String,
    pub policy_document: PolicyDocument,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<PolicyStatement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    pub action: String,
    pub effect: Effect,
    pub resource: String,
}

impl AuthorizerResponse {
    /// True only if every statement allows.
    pub fn is_allowed(&self) -> bool {
        !self.policy_document.statement.is_empty()
            && self
                .policy_document
                .statement
                .iter()
                .all(|s| s.effect == Effect::Allow)
    }
}

impl From<&AuthorizationDecision> for AuthorizerResponse {
    fn from(decision: &AuthorizationDecision) -> Self {
        Self {
            principal_id: decision.principal.clone(),
            policy_document: PolicyDocument {
                version: POLICY_VERSION.to_string(),
                statement: vec![PolicyStatement {
                    action: INVOKE_ACTION.to_string(),
                    effect: decision.effect,
                    resource: decision.resource.clone(),
                }],
            },
            message: decision.message(),
        }
    }
}

impl From<AuthorizationDecision> for AuthorizerResponse {
    fn from(decision: AuthorizationDecision) -> Self {
        Self::from(&decision)
    }
}
