//! Cookie jar backing the credential store's fallback representation

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

/// A single named cookie with the attributes the store cares about
#[derive(Debug, Clone)]
pub(crate) struct CookieEntry {
    value: String,
    /// Entries parsed from an external header carry no expiry
    expires: Option<DateTime<Utc>>,
    http_only: bool,
}

/// Name-addressed cookie storage
#[derive(Debug, Default)]
pub(crate) struct CookieJar {
    entries: BTreeMap<String, CookieEntry>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `Cookie` request header (`a=b; c=d`) into a jar.
    pub fn from_header(header: &str) -> Self {
        let mut jar = Self::new();
        for pair in header.split(';') {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }
            if let Some((name, value)) = pair.split_once('=') {
                let value = urlencoding::decode(value)
                    .map(|v| v.into_owned())
                    .unwrap_or_else(|_| value.to_string());
                jar.entries.insert(
                    name.trim().to_string(),
                    CookieEntry {
                        value,
                        expires: None,
                        http_only: false,
                    },
                );
            }
        }
        jar
    }

    /// Look up a cookie by name. Expired entries are misses.
    pub fn get(&self, name: &str) -> Option<String> {
        let entry = self.entries.get(name)?;
        if let Some(expires) = entry.expires {
            if expires <= Utc::now() {
                return None;
            }
        }
        Some(entry.value.clone())
    }

    pub fn set(&mut self, name: &str, value: &str, max_age: Duration, http_only: bool) {
        self.entries.insert(
            name.to_string(),
            CookieEntry {
                value: value.to_string(),
                expires: Some(Utc::now() + max_age),
                http_only,
            },
        );
    }

    pub fn remove(&mut self, name: &str) {
        self.entries.remove(name);
    }

    /// Names of every cookie currently held, expired ones included.
    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Render the jar as a `Cookie` request header, skipping expired entries.
    pub fn to_header(&self) -> Option<String> {
        let now = Utc::now();
        let pairs: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.expires.map(|at| at > now).unwrap_or(true))
            .map(|(name, entry)| format!("{}={}", name, urlencoding::encode(&entry.value)))
            .collect();
        if pairs.is_empty() {
            None
        } else {
            Some(pairs.join("; "))
        }
    }

    /// Render each entry as a `Set-Cookie`-style string so a server-rendered
    /// host can flush them onto its response.
    pub fn to_set_cookie_headers(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(name, entry)| {
                format_set_cookie(name, &entry.value, entry.expires, entry.http_only)
            })
            .collect()
    }
}

/// `name=urlencoded-value; expires=<http-date>; path=/; SameSite=Strict`
/// with `HttpOnly` appended when requested.
pub(crate) fn format_set_cookie(
    name: &str,
    value: &str,
    expires: Option<DateTime<Utc>>,
    http_only: bool,
) -> String {
    let mut cookie = format!("{}={}", name, urlencoding::encode(value));
    if let Some(expires) = expires {
        cookie.push_str(&format!(
            "; expires={}",
            expires.format("%a, %d %b %Y %H:%M:%S GMT")
        ));
    }
    cookie.push_str("; path=/; SameSite=Strict");
    if http_only {
        cookie.push_str("; HttpOnly");
    }
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_values() {
        let mut jar = CookieJar::new();
        jar.set("access_token", "abc.def.ghi", Duration::days(7), false);
        assert_eq!(jar.get("access_token"), Some("abc.def.ghi".to_string()));

        jar.remove("access_token");
        assert_eq!(jar.get("access_token"), None);
    }

    #[test]
    fn expired_entries_are_misses_but_still_enumerable() {
        let mut jar = CookieJar::new();
        jar.set("stale", "x", Duration::seconds(-10), false);
        assert_eq!(jar.get("stale"), None);
        assert_eq!(jar.names(), vec!["stale".to_string()]);
        assert_eq!(jar.to_header(), None);
    }

    #[test]
    fn parses_external_header() {
        let jar = CookieJar::from_header("access_token=tok%20en; auth_user=%7B%22id%22%3A%221%22%7D");
        assert_eq!(jar.get("access_token"), Some("tok en".to_string()));
        assert_eq!(jar.get("auth_user"), Some(r#"{"id":"1"}"#.to_string()));
        assert_eq!(jar.get("missing"), None);
    }

    #[test]
    fn header_rendering_encodes_values() {
        let mut jar = CookieJar::new();
        jar.set("auth_user", r#"{"id":"1"}"#, Duration::days(7), false);
        let header = jar.to_header().unwrap();
        assert_eq!(header, "auth_user=%7B%22id%22%3A%221%22%7D");
    }

    #[test]
    fn set_cookie_format_carries_fixed_attributes() {
        let expires = Utc::now() + Duration::days(7);
        let cookie = format_set_cookie("refresh_token", "a b", Some(expires), false);
        assert!(cookie.starts_with("refresh_token=a%20b; expires="));
        assert!(cookie.ends_with("GMT; path=/; SameSite=Strict"));

        let cookie = format_set_cookie("refresh_token", "v", Some(expires), true);
        assert!(cookie.ends_with("; HttpOnly"));
    }
}
