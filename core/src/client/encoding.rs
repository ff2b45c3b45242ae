/*
 * encoding.rs
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

//! Undo stacked Transfer-Encoding and Content-Encoding around a response stream.

use std::io::{self, Cursor, Read};

use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};

use crate::http::headers::{CONTENT_ENCODING, CONTENT_LENGTH, TRANSFER_ENCODING};
use crate::http::Headers;

#[derive(Debug, Clone, thiserror::Error)]
#[error("unsupported encoding: {0}")]
pub struct UnsupportedEncoding(pub String);

fn tokens(headers: &Headers, name: &str) -> Vec<String> {
    headers
        .get(name)
        .iter()
        .flat_map(|v| v.split(','))
        .map(|t| t.split(';').next().unwrap_or_default().trim().to_ascii_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Tokens to undo, outermost first: Transfer-Encoding right to left
/// (`chunked` is framing and already removed), then Content-Encoding right to left.
pub fn decode_order(headers: &Headers) -> Vec<String> {
    let mut order: Vec<String> = tokens(headers, TRANSFER_ENCODING)
        .into_iter()
        .filter(|t| t != "chunked")
        .rev()
        .collect();
    order.extend(tokens(headers, CONTENT_ENCODING).into_iter().rev());
    order
}

/// `deflate` decoder: zlib-wrapped data, or raw deflate when the first two
/// bytes are not a zlib header. The choice is made on the first read.
enum Inflate {
    Pending(Option<Box<dyn Read + Send>>),
    Ready(Box<dyn Read + Send>),
}

fn is_zlib_header(prefix: &[u8]) -> bool {
    match prefix {
        [cmf, flg] => (cmf & 0x0f) == 8 && ((u16::from(*cmf) << 8) | u16::from(*flg)) % 31 == 0,
        _ => false,
    }
}

impl Read for Inflate {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let Inflate::Pending(slot) = self {
            let Some(mut inner) = slot.take() else {
                return Ok(0);
            };
            let mut prefix = Vec::with_capacity(2);
            (&mut inner).take(2).read_to_end(&mut prefix)?;
            let zlib = is_zlib_header(&prefix);
            let joined = Cursor::new(prefix).chain(inner);
            *self = Inflate::Ready(if zlib {
                Box::new(ZlibDecoder::new(joined))
            } else {
                Box::new(DeflateDecoder::new(joined))
            });
        }
        match self {
            Inflate::Ready(stream) => stream.read(buf),
            Inflate::Pending(_) => Ok(0),
        }
    }
}

/// Wrap `stream` in one decoder per token. Returns the decoded stream and
/// whether anything other than identity was undone; in that case the
/// Content-Encoding and Content-Length headers are removed since they
/// describe the wire bytes.
pub fn decode(
    stream: Box<dyn Read + Send>,
    headers: &mut Headers,
) -> Result<(Box<dyn Read + Send>, bool), UnsupportedEncoding> {
    let mut stream = stream;
    let mut decoded = false;
    for token in decode_order(headers) {
        stream = match token.as_str() {
            "identity" => stream,
            "gzip" | "x-gzip" => Box::new(GzDecoder::new(stream)),
            "deflate" => Box::new(Inflate::Pending(Some(stream))),
            other => return Err(UnsupportedEncoding(other.to_string())),
        };
        if token != "identity" {
            tracing::debug!(encoding = %token, "decoding response stream");
            decoded = true;
        }
    }
    if decoded {
        headers.remove(CONTENT_ENCODING);
        headers.remove(CONTENT_LENGTH);
    }
    Ok((stream, decoded))
}
