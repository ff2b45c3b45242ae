/*
 * mod.rs
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

//! MIME helpers: Content-Type parsing, text decoding, content-type guessing
//! for files, and the `multipart/form-data` writer.

mod content_type;
mod multipart;

use std::path::Path;

pub use content_type::{
    decode_text, decode_with_charset, form_data_boundary, parse_content_type,
    parse_parameter_list, ContentType,
};
pub use multipart::{form_disposition as multipart_disposition, MultipartBody, FORM_PARAMETER_CONTENT_TYPE};

/// Checks if a character is valid in an RFC 2045 token.
#[inline]
pub fn is_token_char(c: u8) -> bool {
    matches!(c,
        b'0'..=b'9' | b'A'..=b'Z' | b'a'..=b'z' |
        b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' |
        b'^' | b'_' | b'`' | b'{' | b'|' | b'}' | b'~'
    )
}

/// Checks if the string is a valid RFC 2045 token (1+ token chars).
pub fn is_token(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(is_token_char)
}

/// Checks if a character is valid in a MIME boundary (RFC 2046).
#[inline]
pub fn is_boundary_char(c: u8) -> bool {
    matches!(c,
        b'0'..=b'9' | b'A'..=b'Z' | b'a'..=b'z' |
        b'\'' | b'(' | b')' | b'+' | b'_' | b',' | b'-' | b'.' |
        b'/' | b':' | b'=' | b'?'
    )
}

/// Validates a boundary: 1-70 chars from the boundary set (RFC 2046).
pub fn is_valid_boundary(boundary: &str) -> bool {
    let b = boundary.as_bytes();
    (1..=70).contains(&b.len()) && b.iter().copied().all(is_boundary_char)
}

/// Whether a raw Content-Type value denotes a textual body.
pub fn is_textual(content_type: &str) -> bool {
    parse_content_type(content_type).is_some_and(|ct| ct.is_textual())
}

/// Guess a content type from a file extension; `application/octet-stream` otherwise.
pub fn guess_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("txt") | Some("text") => "text/plain",
        Some("html") | Some("htm") => "text/html",
        Some("css") => "text/css",
        Some("csv") => "text/csv",
        Some("js") | Some("mjs") => "application/javascript",
        Some("json") => "application/json",
        Some("xml") => "application/xml",
        Some("yaml") | Some("yml") => "application/x-yaml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        Some("gz") => "application/gzip",
        Some("mp3") => "audio/mpeg",
        Some("mp4") => "video/mp4",
        _ => "application/octet-stream",
    }
}

/// Random boundary: 32 lowercase hex digits.
pub fn random_boundary() -> String {
    format!("{:032x}", rand::random::<u128>())
}
