//! Per-host cookie jar.
//!
//! Fed from `Set-Cookie` response headers and read back when building request
//! headers, which is how the CSRF cookie ends up mirrored into its header.
//! Cookies never cross hosts.

use std::collections::HashMap;

use indexmap::IndexMap;

#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    hosts: HashMap<String, IndexMap<String, String>>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, host: &str, name: &str, value: &str) {
        self.hosts
            .entry(host.to_ascii_lowercase())
            .or_default()
            .insert(name.to_string(), value.to_string());
    }

    pub fn remove(&mut self, host: &str, name: &str) {
        if let Some(cookies) = self.hosts.get_mut(&host.to_ascii_lowercase()) {
            cookies.shift_remove(name);
        }
    }

    pub fn get(&self, host: &str, name: &str) -> Option<&str> {
        self.hosts
            .get(&host.to_ascii_lowercase())
            .and_then(|c| c.get(name))
            .map(String::as_str)
    }

    /// `Cookie` header value for `host` (`a=1; b=2`), or `None` when nothing is stored.
    pub fn header_for(&self, host: &str) -> Option<String> {
        let cookies = self.hosts.get(&host.to_ascii_lowercase())?;
        if cookies.is_empty() {
            return None;
        }
        Some(
            cookies
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Applies one `Set-Cookie` header value received from `host`.
    /// Returns false when the value is not a cookie at all.
    pub fn store_set_cookie(&mut self, host: &str, raw: &str) -> bool {
        match parse_set_cookie(raw) {
            Some(SetCookie::Set { name, value }) => self.set(host, name, value),
            Some(SetCookie::Delete { name }) => self.remove(host, name),
            None => return false,
        }
        true
    }
}

#[derive(Debug, PartialEq, Eq)]
enum SetCookie<'a> {
    Set { name: &'a str, value: &'a str },
    Delete { name: &'a str },
}

/// Parses a `Set-Cookie` value: `name=value` then attributes. Only `Max-Age=0`
/// among the attributes matters here (deletion); an empty value deletes too.
fn parse_set_cookie(raw: &str) -> Option<SetCookie<'_>> {
    let mut pieces = raw.split(';');
    let (name, value) = pieces.next()?.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let value = value.trim().trim_matches('"');
    let expired = pieces.any(|attr| {
        attr.split_once('=').is_some_and(|(k, v)| {
            k.trim().eq_ignore_ascii_case("max-age") && v.trim().parse::<i64>().is_ok_and(|n| n <= 0)
        })
    });
    if expired || value.is_empty() {
        Some(SetCookie::Delete { name })
    } else {
        Some(SetCookie::Set { name, value })
    }
}
