/*
 * content_type.rs
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

//! Content-Type header (RFC 2045 syntax, RFC 9110 semantics).

use std::collections::HashMap;

use super::{is_token, is_valid_boundary};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    primary_type: String,
    sub_type: String,
    parameter_map: HashMap<String, String>,
}

impl ContentType {
    pub fn new(
        primary_type: impl Into<String>,
        sub_type: impl Into<String>,
        parameters: Vec<(String, String)>,
    ) -> Self {
        let parameter_map = parameters
            .into_iter()
            .map(|(name, value)| (name.to_lowercase(), value))
            .collect();
        Self {
            primary_type: primary_type.into(),
            sub_type: sub_type.into(),
            parameter_map,
        }
    }

    pub fn primary_type(&self) -> &str {
        &self.primary_type
    }

    pub fn sub_type(&self) -> &str {
        &self.sub_type
    }

    /// `type/subtype` without parameters, lowercased.
    pub fn essence(&self) -> String {
        format!("{}/{}", self.primary_type, self.sub_type).to_ascii_lowercase()
    }

    pub fn is_primary_type(&self, t: &str) -> bool {
        self.primary_type.eq_ignore_ascii_case(t)
    }

    pub fn is_sub_type(&self, t: &str) -> bool {
        self.sub_type.eq_ignore_ascii_case(t)
    }

    pub fn is_mime_type(&self, primary: &str, sub: &str) -> bool {
        self.is_primary_type(primary) && self.is_sub_type(sub)
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameter_map.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameter_map.contains_key(&name.to_lowercase())
    }

    pub fn charset(&self) -> Option<&str> {
        self.parameter("charset").filter(|c| !c.is_empty())
    }

    /// Whether a body of this type is rendered as text: `text/*`, the common
    /// structured application types, `+xml`/`+json`/`+yaml` suffixes, or any
    /// type that declares a charset.
    pub fn is_textual(&self) -> bool {
        if self.is_primary_type("text") || self.charset().is_some() {
            return true;
        }
        let sub = self.sub_type.to_ascii_lowercase();
        if sub.ends_with("+xml") || sub.ends_with("+json") || sub.ends_with("+yaml") {
            return true;
        }
        self.is_primary_type("application")
            && matches!(
                sub.as_str(),
                "csv"
                    | "javascript"
                    | "ecmascript"
                    | "json"
                    | "typescript"
                    | "xml"
                    | "yaml"
                    | "x-yaml"
                    | "x-www-form-urlencoded"
                    | "vnd.coffeescript"
            )
    }
}

/// Parse Content-Type header value.
pub fn parse_content_type(value: &str) -> Option<ContentType> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let (type_part, params_part) = match value.find(';') {
        Some(i) => {
            let (a, b) = value.split_at(i);
            (a.trim(), b[1..].trim())
        }
        None => (value, ""),
    };
    let slash = type_part.find('/')?;
    let primary = type_part[..slash].trim();
    let sub = type_part[slash + 1..].trim();
    if !is_token(primary) || !is_token(sub) {
        return None;
    }
    Some(ContentType::new(primary, sub, parse_parameter_list(params_part)))
}

/// Parse semicolon-separated parameter list (name=value; name="value").
/// Malformed entries are skipped.
pub fn parse_parameter_list(params_part: &str) -> Vec<(String, String)> {
    let mut parameters = Vec::new();
    let bytes = params_part.as_bytes();
    let len = bytes.len();
    let mut pos = 0;

    while pos < len {
        while pos < len && (bytes[pos] == b';' || bytes[pos].is_ascii_whitespace()) {
            pos += 1;
        }
        if pos >= len {
            break;
        }
        let Some(eq) = bytes[pos..].iter().position(|&b| b == b'=') else {
            break;
        };
        let eq_abs = pos + eq;
        let name = String::from_utf8_lossy(&bytes[pos..eq_abs]).trim().to_string();
        if !is_token(&name) {
            match bytes[pos..].iter().position(|&b| b == b';') {
                Some(semi) => {
                    pos += semi + 1;
                    continue;
                }
                None => break,
            }
        }
        pos = eq_abs + 1;
        let value = if pos < len && bytes[pos] == b'"' {
            pos += 1;
            let mut v = Vec::new();
            while pos < len {
                let c = bytes[pos];
                if c == b'\\' && pos + 1 < len {
                    v.push(bytes[pos + 1]);
                    pos += 2;
                } else if c == b'"' {
                    pos += 1;
                    break;
                } else {
                    v.push(c);
                    pos += 1;
                }
            }
            String::from_utf8_lossy(&v).into_owned()
        } else {
            let end = bytes[pos..]
                .iter()
                .position(|&b| b == b';')
                .map(|i| pos + i)
                .unwrap_or(len);
            let v = String::from_utf8_lossy(&bytes[pos..end]).trim().to_string();
            pos = end;
            v
        };
        parameters.push((name, value));
    }
    parameters
}

/// The boundary of a `multipart/form-data` content type, if present and valid.
pub fn form_data_boundary(value: &str) -> Option<String> {
    let ct = parse_content_type(value)?;
    if !ct.is_mime_type("multipart", "form-data") {
        return None;
    }
    ct.parameter("boundary")
        .filter(|b| is_valid_boundary(b))
        .map(str::to_string)
}

/// Decode bytes as text using the charset declared by `content_type`
/// (UTF-8 when absent or unknown). Malformed input is replaced, not rejected.
pub fn decode_text(bytes: &[u8], content_type: Option<&str>) -> String {
    let charset = content_type
        .and_then(parse_content_type)
        .and_then(|ct| ct.charset().map(str::to_ascii_lowercase));
    decode_with_charset(bytes, charset.as_deref())
}

pub fn decode_with_charset(bytes: &[u8], charset: Option<&str>) -> String {
    match charset {
        Some("iso-8859-1") | Some("latin1") | Some("us-ascii") | Some("ascii") => {
            bytes.iter().map(|&b| b as char).collect()
        }
        Some("utf-16be") => decode_utf16(bytes, u16::from_be_bytes),
        Some("utf-16le") => decode_utf16(bytes, u16::from_le_bytes),
        Some("utf-16") => match bytes {
            [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, u16::from_le_bytes),
            [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, u16::from_be_bytes),
            _ => decode_utf16(bytes, u16::from_be_bytes),
        },
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> String {
    let units = bytes.chunks_exact(2).map(|c| unit([c[0], c[1]]));
    char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_type_and_parameters() {
        let ct = parse_content_type("Multipart/Form-Data; boundary=\"a b\"; charset=utf-8").unwrap();
        assert!(ct.is_mime_type("multipart", "form-data"));
        assert_eq!(ct.parameter("BOUNDARY"), Some("a b"));
        assert_eq!(ct.charset(), Some("utf-8"));
        assert_eq!(ct.essence(), "multipart/form-data");
        assert!(parse_content_type("nonsense").is_none());
        assert!(parse_content_type("").is_none());
    }

    #[test]
    fn textual_types() {
        for t in [
            "text/plain",
            "text/yaml",
            "application/json",
            "application/xml",
            "application/x-yaml",
            "application/xhtml+xml",
            "application/vnd.fuel.test+xml",
            "image/svg+xml",
            "application/javascript",
            "application/typescript",
            "application/vnd.coffeescript",
            "application/csv",
            "application/octet-stream; charset=utf-8",
        ] {
            assert!(parse_content_type(t).unwrap().is_textual(), "{}", t);
        }
        for t in ["application/octet-stream", "image/png", "application/zip"] {
            assert!(!parse_content_type(t).unwrap().is_textual(), "{}", t);
        }
    }

    #[test]
    fn boundary_requires_form_data_and_valid_chars() {
        assert_eq!(
            form_data_boundary("multipart/form-data; boundary=160f77ec3eff").as_deref(),
            Some("160f77ec3eff")
        );
        assert!(form_data_boundary("multipart/form-data").is_none());
        assert!(form_data_boundary("multipart/mixed; boundary=abc").is_none());
        let long = format!("multipart/form-data; boundary={}", "x".repeat(71));
        assert!(form_data_boundary(&long).is_none());
    }

    #[test]
    fn decodes_declared_charsets() {
        let utf16: Vec<u8> = "hello,world!".encode_utf16().flat_map(u16::to_be_bytes).collect();
        assert_eq!(
            decode_text(&utf16, Some("application/csv; charset=utf-16be")),
            "hello,world!"
        );
        assert_eq!(decode_text(&[0xE9], Some("text/plain; charset=ISO-8859-1")), "é");
        assert_eq!(decode_text("héllo".as_bytes(), None), "héllo");
    }
}
