//! Session tokens and the untrusted claims hint.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde_json::{Map, Value};

/// Cookie name holding the short-lived access token
pub const ACCESS_TOKEN_COOKIE: &str = "access_token_cookie";

/// Cookie name holding the long-lived refresh token
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token_cookie";

/// Claim keys checked, in order, when looking for the user identity
const IDENTITY_CLAIMS: [&str; 3] = ["identity", "sub", "username"];

/// Access/refresh token pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Claims decoded from the payload segment of an access token.
///
/// The signature is NOT verified. Values read from here are a local display
/// hint (e.g. marking our own messages) and must never be used as a trusted
/// identity; the server enforces authentication on every request.
#[derive(Debug, Clone, PartialEq)]
pub struct UnverifiedClaims {
    payload: Map<String, Value>,
}

impl UnverifiedClaims {
    /// Decode the second segment of a JWT-shaped token.
    ///
    /// Returns `None` when the token does not have exactly three segments or
    /// the payload is not a base64url-encoded JSON object.
    pub fn decode(token: &str) -> Option<Self> {
        let mut segments = token.split('.');
        let (Some(_header), Some(payload), Some(_signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return None;
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .ok()?;
        match serde_json::from_slice::<Value>(&bytes).ok()? {
            Value::Object(payload) => Some(Self { payload }),
            _ => None,
        }
    }

    /// User identity claimed by the token (`identity`, `sub` or `username`)
    pub fn identity_hint(&self) -> Option<String> {
        IDENTITY_CLAIMS
            .iter()
            .find_map(|key| match self.payload.get(*key) {
                Some(Value::String(s)) => Some(s.clone()),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            })
    }
}

#[cfg(test)]
pub(crate) fn make_test_token(payload: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{}.{}.signature", header, body)
}
