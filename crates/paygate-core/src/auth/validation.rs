use std::time::{SystemTime, UNIX_EPOCH};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde_json::{Map, Value};

use super::config::TokenPolicy;
use super::error::AuthError;
use crate::secrets::SecretValue;

/// Header fields that point key resolution at attacker-controlled material,
/// or demand extensions this verifier does not implement.
const REJECTED_HEADER_FIELDS: [&str; 5] = ["crit", "jku", "jwk", "x5u", "x5c"];

/// Registered claims after verification.
///
/// Time claims are NumericDate values and may be fractional; comparisons
/// use the whole-second part.
#[derive(Debug, Clone)]
pub struct Claims {
    pub sub: String,
    pub exp: f64,
    pub iat: Option<f64>,
    pub nbf: Option<f64>,
    /// Kept untyped so a non-string scope is a scope failure, not a parse failure.
    pub scope: Option<Value>,
}

impl Claims {
    pub fn scope_str(&self) -> Option<&str> {
        self.scope.as_ref().and_then(|v| v.as_str())
    }

    pub fn has_scope(&self, required: &str) -> bool {
        self.scope_str() == Some(required)
    }

    /// Check the payload against the clock, in order: required claims,
    /// `iat`, `nbf`, `exp`, `aud`. Only a past `exp` is `ExpiredToken`.
    fn from_payload(
        payload: Map<String, Value>,
        now: i64,
        leeway: i64,
    ) -> Result<Self, AuthError> {
        let exp = required(&payload, "exp")?;
        let sub = required(&payload, "sub")?;

        let exp = numeric_date(exp, "exp")?;
        let sub = match sub {
            Value::String(s) => s.clone(),
            _ => {
                tracing::debug!(claim = "sub", "claim has wrong type");
                return Err(AuthError::InvalidToken);
            }
        };
        let iat = optional_numeric_date(&payload, "iat")?;
        let nbf = optional_numeric_date(&payload, "nbf")?;

        let not_before_limit = (now + leeway) as f64;
        if iat.is_some_and(|iat| iat.trunc() > not_before_limit) {
            tracing::debug!(claim = "iat", "token issued in the future");
            return Err(AuthError::InvalidToken);
        }
        if nbf.is_some_and(|nbf| nbf.trunc() > not_before_limit) {
            tracing::debug!(claim = "nbf", "token not yet valid");
            return Err(AuthError::InvalidToken);
        }
        if exp.trunc() <= (now - leeway) as f64 {
            return Err(AuthError::ExpiredToken);
        }

        // No audience is configured, so any non-empty `aud` is for someone else.
        if payload.get("aud").is_some_and(has_audience) {
            tracing::debug!(claim = "aud", "unexpected audience");
            return Err(AuthError::InvalidToken);
        }

        Ok(Self {
            sub,
            exp,
            iat,
            nbf,
            scope: payload.get("scope").cloned(),
        })
    }
}

fn required<'a>(
    payload: &'a Map<String, Value>,
    claim: &'static str,
) -> Result<&'a Value, AuthError> {
    match payload.get(claim) {
        Some(Value::Null) | None => {
            tracing::debug!(claim, "required claim missing");
            Err(AuthError::InvalidToken)
        }
        Some(v) => Ok(v),
    }
}

fn numeric_date(value: &Value, claim: &'static str) -> Result<f64, AuthError> {
    value.as_f64().ok_or_else(|| {
        tracing::debug!(claim, "claim is not a NumericDate");
        AuthError::InvalidToken
    })
}

fn optional_numeric_date(
    payload: &Map<String, Value>,
    claim: &'static str,
) -> Result<Option<f64>, AuthError> {
    match payload.get(claim) {
        Some(Value::Null) | None => Ok(None),
        Some(v) => numeric_date(v, claim).map(Some),
    }
}

fn has_audience(aud: &Value) -> bool {
    match aud {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        _ => true,
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// HS256 token verifier with a pinned algorithm.
///
/// jsonwebtoken checks the signature and structure; the registered time
/// claims are checked here so fractional NumericDate values are accepted.
pub struct TokenVerifier {
    validation: Validation,
    leeway: i64,
}

impl TokenVerifier {
    pub fn new(policy: &TokenPolicy) -> Self {
        let mut validation = Validation::new(TokenPolicy::ALGORITHM);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            validation,
            leeway: i64::try_from(policy.leeway.as_secs()).unwrap_or(i64::MAX / 2),
        }
    }

    /// Verify signature, structure and time claims. Scope is checked by the caller.
    pub fn verify(&self, token: &str, secret: &SecretValue) -> Result<Claims, AuthError> {
        self.verify_at(token, secret, unix_now())
    }

    /// [`verify`](Self::verify) against a fixed clock, in Unix seconds.
    pub fn verify_at(
        &self,
        token: &str,
        secret: &SecretValue,
        now: i64,
    ) -> Result<Claims, AuthError> {
        check_header(token)?;

        let key = DecodingKey::from_secret(secret.expose().as_bytes());
        let data = decode::<Map<String, Value>>(token, &key, &self.validation).map_err(|e| {
            tracing::debug!(kind = ?e.kind(), "token verification failed");
            AuthError::from(e)
        })?;

        Claims::from_payload(data.claims, now, self.leeway)
    }
}

/// Structural header check ahead of signature verification.
fn check_header(token: &str) -> Result<(), AuthError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(AuthError::InvalidToken);
    }

    let header_json = URL_SAFE_NO_PAD
        .decode(parts[0])
        .map_err(|_| AuthError::InvalidToken)?;
    let header: Value =
        serde_json::from_slice(&header_json).map_err(|_| AuthError::InvalidToken)?;

    let obj = header.as_object().ok_or(AuthError::InvalidToken)?;
    if let Some(field) = REJECTED_HEADER_FIELDS
        .iter()
        .find(|f| obj.contains_key(**f))
    {
        tracing::warn!(reason = "W_AUTH_HEADER", field = *field, "token header rejected");
        return Err(AuthError::InvalidToken);
    }

    Ok(())
}
