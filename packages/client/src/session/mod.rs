//! Session Store: the access/refresh token pair kept as origin-scoped cookies.
//!
//! Reads never fail; an absent or expired cookie is simply `None`. Writes go
//! through to the configured `CookieStorage` so the session survives restarts.

mod cookie;
mod storage;

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use chatlink_shared::time::{Clock, SystemClock};

use crate::domain::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE, TokenPair, UnverifiedClaims};

pub use cookie::{CookieOptions, SetCookie, StoredCookie, parse_set_cookie};
pub use storage::{CookieStorage, FileCookieStorage, MemoryCookieStorage, StorageError};

/// Origin-scoped cookie store holding the session tokens
pub struct SessionStore {
    storage: Box<dyn CookieStorage>,
    clock: Arc<dyn Clock>,
    cookies: Mutex<HashMap<String, StoredCookie>>,
}

impl SessionStore {
    /// Open a store backed by `storage`, dropping cookies that already expired
    pub fn open(
        storage: Box<dyn CookieStorage>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StorageError> {
        let now = clock.now_millis();
        let cookies = storage
            .load()?
            .into_iter()
            .filter(|c| c.is_live(now))
            .map(|c| (c.name.clone(), c))
            .collect();

        Ok(Self {
            storage,
            clock,
            cookies: Mutex::new(cookies),
        })
    }

    /// A process-local store using the system clock
    pub fn in_memory() -> Self {
        Self {
            storage: Box::new(MemoryCookieStorage::default()),
            clock: Arc::new(SystemClock),
            cookies: Mutex::new(HashMap::new()),
        }
    }

    /// Value of the named cookie, or `None` if absent, empty or expired
    pub fn get(&self, name: &str) -> Option<String> {
        let now = self.clock.now_millis();
        self.lock()
            .get(name)
            .filter(|c| c.is_live(now) && !c.value.is_empty())
            .map(|c| c.value.clone())
    }

    /// Store a cookie; an expiry at or before now removes it instead
    pub fn set(
        &self,
        name: &str,
        value: &str,
        options: &CookieOptions,
    ) -> Result<(), StorageError> {
        let now = self.clock.now_millis();
        let expires_at = options
            .expires_seconds
            .map(|secs| now.saturating_add(secs.saturating_mul(1000)));

        let mut cookies = self.lock();
        if expires_at.is_some_and(|t| t <= now) {
            cookies.remove(name);
            tracing::debug!("Cookie '{}' expired on write", name);
        } else {
            cookies.insert(
                name.to_string(),
                StoredCookie {
                    name: name.to_string(),
                    value: value.to_string(),
                    path: options.path.clone().unwrap_or_else(|| "/".to_string()),
                    expires_at,
                    secure: options.secure,
                },
            );
            tracing::debug!("Cookie '{}' stored", name);
        }
        self.persist(&cookies, now)
    }

    /// Invalidate the named cookie immediately by giving it a past expiry
    pub fn clear(&self, name: &str) -> Result<(), StorageError> {
        self.set(name, "", &CookieOptions::site_wide().expires_in(-1))
    }

    pub fn access_token(&self) -> Option<String> {
        self.get(ACCESS_TOKEN_COOKIE)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.get(REFRESH_TOKEN_COOKIE)
    }

    /// Replace the access token, visible on every path
    pub fn store_access_token(&self, token: &str) -> Result<(), StorageError> {
        self.set(ACCESS_TOKEN_COOKIE, token, &CookieOptions::site_wide())
    }

    pub fn store_tokens(&self, tokens: &TokenPair) -> Result<(), StorageError> {
        self.store_access_token(&tokens.access_token)?;
        self.set(
            REFRESH_TOKEN_COOKIE,
            &tokens.refresh_token,
            &CookieOptions::site_wide(),
        )
    }

    /// Forget both session tokens (logout)
    pub fn clear_tokens(&self) -> Result<(), StorageError> {
        self.clear(ACCESS_TOKEN_COOKIE)?;
        self.clear(REFRESH_TOKEN_COOKIE)
    }

    /// Untrusted identity hint decoded from the current access token
    pub fn identity_hint(&self) -> Option<String> {
        self.access_token()
            .as_deref()
            .and_then(UnverifiedClaims::decode)
            .and_then(|claims| claims.identity_hint())
    }

    /// Apply a `Set-Cookie` response header; returns whether it was understood
    pub fn apply_set_cookie(&self, header: &str) -> Result<bool, StorageError> {
        match parse_set_cookie(header, self.clock.now_millis()) {
            Some(cookie) => {
                self.set(&cookie.name, &cookie.value, &cookie.options)?;
                Ok(true)
            }
            None => {
                tracing::debug!("Ignoring malformed Set-Cookie header");
                Ok(false)
            }
        }
    }

    /// `Cookie` request header for `request_path`, if any cookie applies
    pub fn cookie_header(&self, request_path: &str, secure_transport: bool) -> Option<String> {
        let now = self.clock.now_millis();
        let cookies = self.lock();
        let mut applicable: Vec<&StoredCookie> = cookies
            .values()
            .filter(|c| c.is_live(now) && c.matches_path(request_path))
            .filter(|c| secure_transport || !c.secure)
            .collect();
        if applicable.is_empty() {
            return None;
        }

        // Longer paths first, as browsers do
        applicable.sort_by(|a, b| b.path.len().cmp(&a.path.len()).then(a.name.cmp(&b.name)));
        Some(
            applicable
                .iter()
                .map(|c| format!("{}={}", c.name, c.value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, StoredCookie>> {
        self.cookies.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(
        &self,
        cookies: &HashMap<String, StoredCookie>,
        now: i64,
    ) -> Result<(), StorageError> {
        let mut live: Vec<StoredCookie> = cookies
            .values()
            .filter(|c| c.is_live(now))
            .cloned()
            .collect();
        live.sort_by(|a, b| a.name.cmp(&b.name));
        self.storage.save(&live)
    }
}
