//! Cookie-backed session storage.
//!
//! Each browser gets an opaque random token in the `claimdesk_session`
//! cookie; the token keys a server-side string map implementing the
//! core `SessionStore` contract. Sessions live in process memory and do
//! not survive a restart, which also serves as the only expiry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::http::{header, HeaderMap};
use uuid::Uuid;

use claimdesk_core::session::SessionStore;

pub const SESSION_COOKIE: &str = "claimdesk_session";

type SessionMap = HashMap<String, HashMap<String, String>>;

#[derive(Clone, Default)]
pub struct SessionManager {
    sessions: Arc<Mutex<SessionMap>>,
}

impl SessionManager {
    /// Resolves the session for a request. A missing or unknown token gets
    /// a fresh token with no stored values; nothing is allocated in the map
    /// until a value is actually set.
    pub fn attach(&self, token: Option<&str>) -> SessionHandle {
        let token = token
            .filter(|token| self.lock().contains_key(*token))
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        SessionHandle { manager: self.clone(), token }
    }

    /// Drops a session outright. A login that replaces an existing cookie
    /// discards the old token here so abandoned sessions do not accumulate.
    pub fn discard(&self, token: &str) {
        self.lock().remove(token);
    }

    fn lock(&self) -> MutexGuard<'_, SessionMap> {
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// One request's view of its session. Cheap to construct per request.
pub struct SessionHandle {
    manager: SessionManager,
    token: String,
}

impl SessionHandle {
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl SessionStore for SessionHandle {
    fn get(&self, key: &str) -> Option<String> {
        self.manager.lock().get(&self.token).and_then(|values| values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) {
        self.manager
            .lock()
            .entry(self.token.clone())
            .or_default()
            .insert(key.to_string(), value.to_string());
    }

    fn clear(&self) {
        self.manager.lock().remove(&self.token);
    }
}

/// Extracts the session token from the request's `Cookie` header, if any.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value that installs the session token.
pub fn set_cookie_value(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}

/// `Set-Cookie` value that expires the session cookie.
pub fn clear_cookie_value() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}
