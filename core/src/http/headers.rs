/*
 * headers.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Fuel, an HTTP client engine.
 *
 * Fuel is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Fuel is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Fuel.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Case-insensitive, order-preserving header multimap.

use std::fmt;

pub const ACCEPT: &str = "Accept";
pub const ACCEPT_ENCODING: &str = "Accept-Encoding";
pub const ACCEPT_TRANSFER_ENCODING: &str = "TE";
pub const AUTHORIZATION: &str = "Authorization";
pub const CACHE_CONTROL: &str = "Cache-Control";
pub const CONNECTION: &str = "Connection";
pub const CONTENT_DISPOSITION: &str = "Content-Disposition";
pub const CONTENT_ENCODING: &str = "Content-Encoding";
pub const CONTENT_LENGTH: &str = "Content-Length";
pub const CONTENT_LOCATION: &str = "Content-Location";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const COOKIE: &str = "Cookie";
pub const HOST: &str = "Host";
pub const LOCATION: &str = "Location";
pub const METHOD_OVERRIDE: &str = "X-HTTP-Method-Override";
pub const SET_COOKIE: &str = "Set-Cookie";
pub const TRANSFER_ENCODING: &str = "Transfer-Encoding";
pub const USER_AGENT: &str = "User-Agent";

/// Headers where only the last value counts; `append` replaces.
const SINGLE_VALUE: &[&str] = &[
    AUTHORIZATION,
    CONTENT_DISPOSITION,
    CONTENT_LENGTH,
    CONTENT_LOCATION,
    CONTENT_TYPE,
    HOST,
    LOCATION,
    USER_AGENT,
];

fn is_single_value(name: &str) -> bool {
    SINGLE_VALUE.iter().any(|h| h.eq_ignore_ascii_case(name))
}

/// Header map. Names compare case-insensitively; the casing first used for a
/// name is kept. Entries keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, Vec<String>)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(n, _)| n.eq_ignore_ascii_case(name))
    }

    /// All values for `name`; empty when absent.
    pub fn get(&self, name: &str) -> &[String] {
        match self.position(name) {
            Some(i) => &self.entries[i].1,
            None => &[],
        }
    }

    /// Last value for `name`.
    pub fn last(&self, name: &str) -> Option<&str> {
        self.get(name).last().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Replace all values of `name`.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(i) => self.entries[i].1 = vec![value],
            None => self.entries.push((name, vec![value])),
        }
    }

    /// Add a value. Single-value headers are replaced instead.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        if is_single_value(&name) {
            self.set(name, value);
            return;
        }
        let value = value.into();
        match self.position(&name) {
            Some(i) => self.entries[i].1.push(value),
            None => self.entries.push((name, vec![value])),
        }
    }

    /// Set `name` only if absent.
    pub fn set_if_absent(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        if !self.contains(&name) {
            self.set(name, value);
        }
    }

    pub fn remove(&mut self, name: &str) -> Vec<String> {
        match self.position(name) {
            Some(i) => self.entries.remove(i).1,
            None => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    /// Copy entries from `defaults` whose names are absent here.
    pub fn merge_defaults(&mut self, defaults: &Headers) {
        for (name, values) in &defaults.entries {
            if !self.contains(name) {
                self.entries.push((name.clone(), values.clone()));
            }
        }
    }

    /// Lines as sent: `Set-Cookie` one line per value, `Cookie` joined with
    /// `"; "`, everything else joined with `", "`.
    pub fn wire_lines(&self) -> Vec<(String, String)> {
        let mut lines = Vec::with_capacity(self.entries.len());
        for (name, values) in &self.entries {
            if name.eq_ignore_ascii_case(SET_COOKIE) {
                for v in values {
                    lines.push((name.clone(), v.clone()));
                }
            } else if name.eq_ignore_ascii_case(COOKIE) {
                lines.push((name.clone(), values.join("; ")));
            } else {
                lines.push((name.clone(), values.join(", ")));
            }
        }
        lines
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (k, v) in iter {
            headers.append(k, v);
        }
        headers
    }
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.wire_lines() {
            writeln!(f, "{} : {}", name, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive_and_keeps_first_casing() {
        let mut h = Headers::new();
        h.append("X-Foo", "1");
        h.append("x-foo", "2");
        assert_eq!(h.get("X-FOO"), &["1".to_string(), "2".to_string()]);
        assert_eq!(h.iter().next().unwrap().0, "X-Foo");
        assert_eq!(h.len(), 1);
    }

    #[test]
    fn single_value_headers_replace_on_append() {
        let mut h = Headers::new();
        h.append(CONTENT_TYPE, "text/plain");
        h.append("content-type", "application/json");
        assert_eq!(h.get(CONTENT_TYPE), &["application/json".to_string()]);
    }

    #[test]
    fn wire_lines_collapse_per_header_kind() {
        let h: Headers = vec![
            ("Set-Cookie", "a=1"),
            ("Set-Cookie", "b=2"),
            ("Cookie", "c=3"),
            ("Cookie", "d=4"),
            ("Accept", "text/html"),
            ("Accept", "application/json"),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            h.wire_lines(),
            vec![
                ("Set-Cookie".to_string(), "a=1".to_string()),
                ("Set-Cookie".to_string(), "b=2".to_string()),
                ("Cookie".to_string(), "c=3; d=4".to_string()),
                ("Accept".to_string(), "text/html, application/json".to_string()),
            ]
        );
    }

    #[test]
    fn defaults_do_not_override() {
        let mut h = Headers::new();
        h.set("User-Agent", "mine");
        let defaults: Headers = vec![("user-agent", "base"), ("X-Base", "1")].into_iter().collect();
        h.merge_defaults(&defaults);
        assert_eq!(h.last(USER_AGENT), Some("mine"));
        assert_eq!(h.last("x-base"), Some("1"));
        assert_eq!(h.remove("X-BASE"), vec!["1".to_string()]);
        assert!(!h.contains("X-Base"));
    }
}
