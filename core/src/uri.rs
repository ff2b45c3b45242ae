/*
 * uri.rs
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

//! Query-string and form encoding for request parameters, and URL joining.
//! Keys and values are percent-encoded; list values use the `name[]` key form,
//! and the `[]` suffix itself is left unencoded.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

use crate::http::{ParamValue, Parameters};

/// Component set: encode everything except unreserved (RFC 3986 section 2.3).
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode a single key or value.
pub fn encode_component(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT).to_string()
}

/// Encode parameters as `k=v&k2=v2`. `Null` values become a bare key; list
/// values repeat the key as `k[]=` once per element, in order.
pub fn encode_parameters(parameters: &Parameters) -> String {
    let mut pairs: Vec<String> = Vec::with_capacity(parameters.len());
    for (key, value) in parameters {
        let key = encode_component(key);
        match value {
            ParamValue::Value(v) => pairs.push(format!("{}={}", key, encode_component(v))),
            ParamValue::Null => pairs.push(key),
            ParamValue::List(items) => {
                for item in items {
                    pairs.push(format!("{}[]={}", key, encode_component(item)));
                }
            }
        }
    }
    pairs.join("&")
}

/// Append an encoded query to the URL, joining with `&` when it already has one.
pub fn append_query(url: &Url, query: &str) -> Url {
    let mut url = url.clone();
    if query.is_empty() {
        return url;
    }
    let combined = match url.query() {
        Some(existing) if !existing.is_empty() => format!("{}&{}", existing, query),
        _ => query.to_string(),
    };
    url.set_query(Some(&combined));
    url
}

/// Resolve `path` against an optional base. Absolute URLs are used as-is; a
/// relative path is appended to the base path (a missing trailing slash on
/// the base is supplied, so `http://h/api` + `users` is `http://h/api/users`).
pub fn resolve(base: Option<&Url>, path: &str) -> Result<Url, url::ParseError> {
    match Url::parse(path) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => match base {
            Some(base) => {
                let mut base = base.clone();
                if !base.path().ends_with('/') {
                    let p = format!("{}/", base.path());
                    base.set_path(&p);
                }
                base.join(path.trim_start_matches('/'))
            }
            None => Err(url::ParseError::RelativeUrlWithoutBase),
        },
        Err(e) => Err(e),
    }
}
