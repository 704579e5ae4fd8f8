//! Cookie records and `Set-Cookie` parsing.

use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// Options accepted by `SessionStore::set`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieOptions {
    /// Path scope; `None` means `/`
    pub path: Option<String>,
    /// Lifetime in seconds from now; `None` keeps the cookie until cleared.
    /// Zero or negative values expire the cookie immediately.
    pub expires_seconds: Option<i64>,
    /// Only send over secure transports
    pub secure: bool,
}

impl CookieOptions {
    /// Cookie visible on every path of the origin
    pub fn site_wide() -> Self {
        Self {
            path: Some("/".to_string()),
            ..Self::default()
        }
    }

    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.expires_seconds = Some(seconds);
        self
    }

    pub fn secure(mut self) -> Self {
        self.secure = true;
        self
    }
}

/// A cookie as persisted by the session store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    pub path: String,
    /// Unix milliseconds after which the cookie is gone
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub secure: bool,
}

impl StoredCookie {
    pub fn is_live(&self, now_millis: i64) -> bool {
        self.expires_at.is_none_or(|expires_at| expires_at > now_millis)
    }

    /// RFC 6265 path matching
    pub fn matches_path(&self, request_path: &str) -> bool {
        if self.path == "/" || self.path == request_path {
            return true;
        }
        request_path.starts_with(&self.path)
            && (self.path.ends_with('/') || request_path[self.path.len()..].starts_with('/'))
    }
}

/// A parsed `Set-Cookie` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    pub name: String,
    pub value: String,
    pub options: CookieOptions,
}

/// Parse a `Set-Cookie` header value.
///
/// `Max-Age` wins over `Expires`; `HttpOnly`, `SameSite` and `Domain` are
/// accepted and ignored since the store is already scoped to one origin.
pub fn parse_set_cookie(header: &str, now_millis: i64) -> Option<SetCookie> {
    let mut parts = header.split(';');
    let (name, value) = parts.next()?.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let value = value.trim().trim_matches('"');

    let mut options = CookieOptions::default();
    let mut max_age = None;
    let mut expires = None;

    for attribute in parts {
        let (key, attr_value) = match attribute.split_once('=') {
            Some((k, v)) => (k.trim(), v.trim()),
            None => (attribute.trim(), ""),
        };
        match key.to_ascii_lowercase().as_str() {
            "max-age" => max_age = attr_value.parse::<i64>().ok(),
            "expires" => {
                expires = DateTime::parse_from_rfc2822(attr_value)
                    .ok()
                    .map(|dt| (dt.timestamp_millis() - now_millis).div_euclid(1000))
            }
            "path" if attr_value.starts_with('/') => options.path = Some(attr_value.to_string()),
            "secure" => options.secure = true,
            _ => {}
        }
    }
    options.expires_seconds = max_age.or(expires);

    Some(SetCookie {
        name: name.to_string(),
        value: value.to_string(),
        options,
    })
}
