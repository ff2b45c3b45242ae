/*
 * h1.rs
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

//! HTTP/1.1 response reader: status line, headers, then a body reader for
//! Content-Length, chunked, or read-until-close framing. Bytes are pulled
//! from the socket into a `BytesMut` and parsed line by line.

use std::io::{self, Read, Write};

use bytes::{Buf, BytesMut};

use crate::http::headers::{CONTENT_LENGTH, TRANSFER_ENCODING};
use crate::http::{Headers, Method};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    Idle,
    Body,
    UntilClose,
    ChunkSize,
    ChunkData,
    ChunkTrailer,
}

/// Status line and headers of a response.
#[derive(Debug, Clone)]
pub struct ResponseHead {
    pub code: u16,
    pub reason: String,
    pub headers: Headers,
}

/// Body framing chosen from the request method, status and headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyMode {
    Empty,
    Length(u64),
    Chunked,
    UntilClose,
}

/// Framing per RFC 9112 section 6.3.
pub fn body_mode(method: Method, code: u16, headers: &Headers) -> BodyMode {
    if method == Method::Head || code == 204 || code == 304 || (100..200).contains(&code) {
        return BodyMode::Empty;
    }
    let codings: Vec<&str> = headers
        .get(TRANSFER_ENCODING)
        .iter()
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();
    match codings.last() {
        Some(last) if last.eq_ignore_ascii_case("chunked") => return BodyMode::Chunked,
        // A transfer coding not ending in chunked is delimited by close.
        Some(_) => return BodyMode::UntilClose,
        None => {}
    }
    match headers.last(CONTENT_LENGTH).and_then(|v| v.trim().parse::<u64>().ok()) {
        Some(0) => BodyMode::Empty,
        Some(n) => BodyMode::Length(n),
        None => BodyMode::UntilClose,
    }
}

/// Find CRLF in buf; return the offset of CR.
fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

fn invalid(msg: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.to_string())
}

/// Reads a response head from `stream`, buffering what arrives past it.
pub struct H1Reader<S> {
    stream: S,
    read_buf: BytesMut,
    buffer_size: usize,
}

impl<S: Read> H1Reader<S> {
    pub fn new(stream: S, buffer_size: usize) -> Self {
        let buffer_size = buffer_size.max(512);
        Self {
            stream,
            read_buf: BytesMut::with_capacity(buffer_size),
            buffer_size,
        }
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    fn fill(&mut self) -> io::Result<usize> {
        fill(&mut self.stream, &mut self.read_buf, self.buffer_size)
    }

    fn read_line(&mut self) -> io::Result<String> {
        loop {
            if let Some(end) = find_crlf(&self.read_buf) {
                let line = self.read_buf.split_to(end + 2);
                return std::str::from_utf8(&line[..end])
                    .map(str::to_string)
                    .map_err(|_| invalid("invalid header UTF-8"));
            }
            if self.fill()? == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed before response head",
                ));
            }
        }
    }

    /// Read status line and headers, skipping interim 1xx responses.
    pub fn read_head(&mut self) -> io::Result<ResponseHead> {
        loop {
            let status = self.read_line()?;
            // HTTP/1.1 200 OK or HTTP/1.1 200
            let parts: Vec<&str> = status.splitn(3, ' ').collect();
            if !parts.first().is_some_and(|v| v.starts_with("HTTP/")) {
                return Err(invalid("invalid status line"));
            }
            let code = parts
                .get(1)
                .and_then(|s| s.parse::<u16>().ok())
                .ok_or_else(|| invalid("invalid status code"))?;
            let reason = parts.get(2).map(|s| s.trim().to_string()).unwrap_or_default();
            let mut headers = Headers::new();
            loop {
                let line = self.read_line()?;
                if line.is_empty() {
                    break;
                }
                if let Some(colon) = line.find(':') {
                    headers.append(line[..colon].trim(), line[colon + 1..].trim());
                }
            }
            if (100..200).contains(&code) && code != 101 {
                continue;
            }
            return Ok(ResponseHead { code, reason, headers });
        }
    }

    /// Reader over the body with the given framing. Owns the stream.
    pub fn into_body(self, mode: BodyMode) -> BodyReader<S> {
        let (state, remaining) = match mode {
            BodyMode::Empty => (ParseState::Idle, 0),
            BodyMode::Length(n) => (ParseState::Body, n),
            BodyMode::Chunked => (ParseState::ChunkSize, 0),
            BodyMode::UntilClose => (ParseState::UntilClose, 0),
        };
        BodyReader {
            stream: self.stream,
            read_buf: self.read_buf,
            buffer_size: self.buffer_size,
            state,
            remaining,
        }
    }
}

fn fill<S: Read>(stream: &mut S, read_buf: &mut BytesMut, buffer_size: usize) -> io::Result<usize> {
    let mut chunk = vec![0u8; buffer_size];
    let n = loop {
        match stream.read(&mut chunk) {
            Ok(n) => break n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    };
    read_buf.extend_from_slice(&chunk[..n]);
    Ok(n)
}

/// Body bytes with framing removed. Ends at the framed end of the body;
/// a premature close is `UnexpectedEof`.
pub struct BodyReader<S> {
    stream: S,
    read_buf: BytesMut,
    buffer_size: usize,
    state: ParseState,
    /// Bytes left in the body (Content-Length) or in the current chunk.
    remaining: u64,
}

impl<S: Read> BodyReader<S> {
    fn fill(&mut self) -> io::Result<usize> {
        fill(&mut self.stream, &mut self.read_buf, self.buffer_size)
    }

    fn fill_or_eof(&mut self, what: &str) -> io::Result<()> {
        if self.fill()? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("connection closed in {}", what),
            ));
        }
        Ok(())
    }

    fn copy_out(&mut self, buf: &mut [u8], limit: u64) -> usize {
        let n = (limit.min(buf.len() as u64) as usize).min(self.read_buf.len());
        buf[..n].copy_from_slice(&self.read_buf[..n]);
        self.read_buf.advance(n);
        n
    }

    fn line(&mut self, what: &str) -> io::Result<String> {
        loop {
            if let Some(end) = find_crlf(&self.read_buf) {
                let line = self.read_buf.split_to(end + 2);
                return Ok(String::from_utf8_lossy(&line[..end]).into_owned());
            }
            self.fill_or_eof(what)?;
        }
    }
}

impl<S: Read> Read for BodyReader<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            match self.state {
                ParseState::Idle => return Ok(0),
                ParseState::Body => {
                    if self.remaining == 0 {
                        self.state = ParseState::Idle;
                        continue;
                    }
                    if self.read_buf.is_empty() {
                        self.fill_or_eof("body")?;
                    }
                    let n = self.copy_out(buf, self.remaining);
                    self.remaining -= n as u64;
                    return Ok(n);
                }
                ParseState::UntilClose => {
                    if self.read_buf.is_empty() && self.fill()? == 0 {
                        self.state = ParseState::Idle;
                        return Ok(0);
                    }
                    return Ok(self.copy_out(buf, u64::MAX));
                }
                ParseState::ChunkSize => {
                    let line = self.line("chunk size")?;
                    let hex_part = line.split(';').next().unwrap_or_default().trim();
                    self.remaining =
                        u64::from_str_radix(hex_part, 16).map_err(|_| invalid("invalid chunk size"))?;
                    self.state = if self.remaining == 0 {
                        ParseState::ChunkTrailer
                    } else {
                        ParseState::ChunkData
                    };
                }
                ParseState::ChunkData => {
                    if self.remaining == 0 {
                        // Trailing CRLF after chunk data
                        while self.read_buf.len() < 2 {
                            self.fill_or_eof("chunk")?;
                        }
                        self.read_buf.advance(2);
                        self.state = ParseState::ChunkSize;
                        continue;
                    }
                    if self.read_buf.is_empty() {
                        self.fill_or_eof("chunk")?;
                    }
                    let n = self.copy_out(buf, self.remaining);
                    self.remaining -= n as u64;
                    return Ok(n);
                }
                ParseState::ChunkTrailer => {
                    if self.line("trailer")?.is_empty() {
                        self.state = ParseState::Idle;
                    }
                }
            }
        }
    }
}

/// Chunked transfer coding writer; `finish` writes the last-chunk.
pub struct ChunkedWriter<W: Write> {
    inner: W,
}

impl<W: Write> ChunkedWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.inner.write_all(b"0\r\n\r\n")?;
        Ok(self.inner)
    }
}

impl<W: Write> Write for ChunkedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        write!(self.inner, "{:x}\r\n", buf.len())?;
        self.inner.write_all(buf)?;
        self.inner.write_all(b"\r\n")?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
