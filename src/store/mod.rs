//! Key/value credential persistence with dual storage backends
//!
//! One contract regardless of execution environment: a durable backend when
//! the host provides one, and a cookie representation that is written
//! alongside it (or exclusively, when no durable backend exists, as in
//! server-rendered execution).

mod cookie;

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Duration;

use cookie::CookieJar;

/// Expiry horizon applied to every credential cookie.
const COOKIE_TTL_DAYS: i64 = 7;

/// Durable string key/value storage selected once at client construction.
///
/// Backends are assumed available once selected; there is no retry layer, and
/// a backend that cannot operate is expected to panic rather than be worked
/// around here.
pub trait DurableStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
    fn keys(&self) -> Vec<String>;
    fn clear(&self);
}

/// Process-local durable backend
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DurableStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.write().unwrap().remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.entries.read().unwrap().keys().cloned().collect()
    }

    fn clear(&self) {
        self.entries.write().unwrap().clear();
    }
}

/// Credential persistence with an identical contract across environments.
///
/// Callers never branch on where a value lives; backend selection happens
/// once, in the constructor.
pub struct CredentialStore {
    durable: Option<Box<dyn DurableStore>>,
    jar: RwLock<CookieJar>,
}

impl CredentialStore {
    /// Store backed by durable storage, with cookies written alongside.
    pub fn durable(backend: impl DurableStore + 'static) -> Self {
        Self {
            durable: Some(Box::new(backend)),
            jar: RwLock::new(CookieJar::new()),
        }
    }

    /// Cookie-only store for execution without durable storage. An external
    /// `Cookie` request header may seed the jar.
    pub fn cookie_only(initial_cookies: Option<&str>) -> Self {
        let jar = match initial_cookies {
            Some(header) => CookieJar::from_header(header),
            None => CookieJar::new(),
        };
        Self {
            durable: None,
            jar: RwLock::new(jar),
        }
    }

    fn ttl() -> Duration {
        Duration::days(COOKIE_TTL_DAYS)
    }

    /// Write a value under `key` in every selected representation.
    pub fn set(&self, key: &str, value: &str) {
        if let Some(durable) = &self.durable {
            durable.set(key, value);
        }
        // HttpOnly only applies when the cookie is the sole representation
        let http_only = self.durable.is_none();
        self.jar
            .write()
            .unwrap()
            .set(key, value, Self::ttl(), http_only);
    }

    /// Read `key`, preferring durable storage and falling back to the jar.
    pub fn get(&self, key: &str) -> Option<String> {
        if let Some(durable) = &self.durable {
            if let Some(value) = durable.get(key) {
                return Some(value);
            }
        }
        self.jar.read().unwrap().get(key)
    }

    /// Remove `key` from both representations.
    pub fn remove(&self, key: &str) {
        if let Some(durable) = &self.durable {
            durable.remove(key);
        }
        self.jar.write().unwrap().remove(key);
    }

    /// Clear every durable key and every cookie name currently in the jar.
    pub fn clear(&self) {
        if let Some(durable) = &self.durable {
            durable.clear();
        }
        let mut jar = self.jar.write().unwrap();
        for name in jar.names() {
            jar.remove(&name);
        }
    }

    /// Current jar rendered as a `Cookie` request header.
    pub fn cookie_header(&self) -> Option<String> {
        self.jar.read().unwrap().to_header()
    }

    /// Current jar rendered as `Set-Cookie`-style strings, for a
    /// server-rendered host to flush onto its response.
    pub fn set_cookie_headers(&self) -> Vec<String> {
        self.jar.read().unwrap().to_set_cookie_headers()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durable_mode_round_trips_and_removes() {
        let store = CredentialStore::durable(MemoryStore::new());
        store.set("access_token", "abc");
        assert_eq!(store.get("access_token"), Some("abc".to_string()));

        store.remove("access_token");
        assert_eq!(store.get("access_token"), None);
        assert_eq!(store.cookie_header(), None);
    }

    #[test]
    fn cookie_mirrors_durable_writes() {
        let store = CredentialStore::durable(MemoryStore::new());
        store.set("refresh_token", "r1");
        assert_eq!(
            store.cookie_header(),
            Some("refresh_token=r1".to_string())
        );
        // Mirrored cookies are readable, not HttpOnly
        assert!(store.set_cookie_headers()[0].ends_with("SameSite=Strict"));
    }

    #[test]
    fn get_falls_back_to_jar_when_durable_misses() {
        let backend = MemoryStore::new();
        let store = CredentialStore::durable(backend);
        store.set("access_token", "abc");
        // Simulate the durable entry vanishing independently of the cookie
        if let Some(durable) = &store.durable {
            durable.remove("access_token");
        }
        assert_eq!(store.get("access_token"), Some("abc".to_string()));
    }

    #[test]
    fn cookie_only_mode_reads_external_header_and_marks_http_only() {
        let store = CredentialStore::cookie_only(Some("access_token=tok; other=x"));
        assert_eq!(store.get("access_token"), Some("tok".to_string()));

        store.set("refresh_token", "r1");
        let rendered = store.set_cookie_headers();
        let refresh = rendered
            .iter()
            .find(|c| c.starts_with("refresh_token="))
            .unwrap();
        assert!(refresh.ends_with("; HttpOnly"));
    }

    #[test]
    fn clear_empties_both_representations() {
        let store = CredentialStore::durable(MemoryStore::new());
        store.set("access_token", "a");
        store.set("refresh_token", "b");
        store.clear();
        assert_eq!(store.get("access_token"), None);
        assert_eq!(store.get("refresh_token"), None);
        assert_eq!(store.cookie_header(), None);
        assert!(store.set_cookie_headers().is_empty());
    }

    #[test]
    fn clear_removes_externally_seeded_cookies_too() {
        let store = CredentialStore::cookie_only(Some("a=1; b=2; c=3"));
        store.clear();
        assert_eq!(store.get("a"), None);
        assert_eq!(store.get("b"), None);
        assert_eq!(store.get("c"), None);
    }
}
