/*
 * body.rs
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

//! Request and response bodies.
//!
//! A body is backed by nothing, by bytes in memory, by a one-shot reader, by a
//! stream factory, or by a multipart generator. One-shot bodies can be read
//! once; a second full read fails with an I/O error. A repeatable body buffers
//! its stream on first use and serves every later read from that buffer.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Cursor, Read, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;

use crate::mime::{self, MultipartBody};

/// Opens a fresh stream on each call.
pub type StreamFactory = Arc<dyn Fn() -> io::Result<Box<dyn Read + Send>> + Send + Sync>;

/// Owned reader that can live inside `Sync` values.
pub struct ByteStream(Mutex<Box<dyn Read + Send>>);

impl ByteStream {
    pub fn new(reader: impl Read + Send + 'static) -> Self {
        Self(Mutex::new(Box::new(reader)))
    }

    pub fn into_inner(self) -> Box<dyn Read + Send> {
        self.0.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Read for ByteStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .read(buf)
    }
}

enum Source {
    Empty,
    Bytes(Bytes),
    Stream(Option<ByteStream>),
    Factory(StreamFactory),
    Multipart(Box<MultipartBody>),
    /// Placeholder until the request's upload parts are assembled.
    PendingMultipart,
}

pub struct Body {
    source: Source,
    length: Option<u64>,
    repeatable: bool,
    consumed: bool,
}

fn consumed_error() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "body has already been consumed")
}

fn not_prepared_error() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "multipart body has not been assembled")
}

impl Body {
    fn with_source(source: Source, length: Option<u64>) -> Self {
        Self {
            source,
            length,
            repeatable: false,
            consumed: false,
        }
    }

    pub fn empty() -> Self {
        Self::with_source(Source::Empty, Some(0))
    }

    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        let len = bytes.len() as u64;
        Self::with_source(Source::Bytes(bytes), Some(len))
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self::from_bytes(Bytes::from(s.into()))
    }

    /// One-shot reader with an optional known length.
    pub fn from_reader(reader: impl Read + Send + 'static, length: Option<u64>) -> Self {
        Self::with_source(Source::Stream(Some(ByteStream::new(reader))), length)
    }

    /// Stream factory; invoked once unless the body is made repeatable.
    pub fn from_factory<F>(factory: F, length: Option<u64>) -> Self
    where
        F: Fn() -> io::Result<Box<dyn Read + Send>> + Send + Sync + 'static,
    {
        Self::with_source(Source::Factory(Arc::new(factory)), length)
    }

    /// File contents, reopened on every read. Length comes from file metadata;
    /// a missing file fails when the body is read.
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let length = fs::metadata(&path).ok().map(|m| m.len());
        let factory: StreamFactory = Arc::new(move || {
            let file = File::open(&path)?;
            Ok(Box::new(file) as Box<dyn Read + Send>)
        });
        let mut body = Self::with_source(Source::Factory(factory), length);
        body.repeatable = true;
        body
    }

    pub(crate) fn pending_multipart() -> Self {
        Self::with_source(Source::PendingMultipart, None)
    }

    pub(crate) fn multipart(multipart: MultipartBody, length: Option<u64>) -> Self {
        Self::with_source(Source::Multipart(Box::new(multipart)), length)
    }

    /// Make later reads replay the same content.
    pub fn as_repeatable(mut self) -> Self {
        self.repeatable = true;
        self
    }

    pub fn is_repeatable(&self) -> bool {
        matches!(self.source, Source::Empty | Source::Bytes(_)) || self.repeatable
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// True when the body is known to hold no bytes.
    pub fn is_empty(&self) -> bool {
        match &self.source {
            Source::Empty => true,
            Source::Bytes(b) => b.is_empty(),
            Source::Stream(_) | Source::Factory(_) => self.length == Some(0),
            Source::Multipart(_) | Source::PendingMultipart => false,
        }
    }

    pub(crate) fn is_multipart(&self) -> bool {
        matches!(self.source, Source::Multipart(_) | Source::PendingMultipart)
    }

    /// Length in bytes when known.
    pub fn length(&self) -> Option<u64> {
        match &self.source {
            Source::Empty => Some(0),
            Source::Bytes(b) => Some(b.len() as u64),
            _ => self.length,
        }
    }

    /// Open the body for reading. One-shot bodies fail on the second call.
    pub fn to_stream(&mut self) -> io::Result<Box<dyn Read + Send>> {
        match &self.source {
            Source::Empty => return Ok(Box::new(io::empty())),
            Source::Bytes(b) => return Ok(Box::new(Cursor::new(b.clone()))),
            Source::PendingMultipart => return Err(not_prepared_error()),
            Source::Factory(f) if self.repeatable => return f(),
            _ => {}
        }
        if self.repeatable {
            let bytes = self.to_bytes()?;
            return Ok(Box::new(Cursor::new(bytes)));
        }
        self.take_stream()
    }

    fn take_stream(&mut self) -> io::Result<Box<dyn Read + Send>> {
        if self.consumed {
            return Err(consumed_error());
        }
        self.consumed = true;
        match &mut self.source {
            Source::Empty => Ok(Box::new(io::empty())),
            Source::Bytes(b) => Ok(Box::new(Cursor::new(b.clone()))),
            Source::Stream(slot) => slot
                .take()
                .map(|s| Box::new(s) as Box<dyn Read + Send>)
                .ok_or_else(consumed_error),
            Source::Factory(f) => f(),
            Source::Multipart(m) => {
                let mut out = Vec::new();
                m.write_to(&mut out)?;
                Ok(Box::new(Cursor::new(out)))
            }
            Source::PendingMultipart => Err(not_prepared_error()),
        }
    }

    /// Read the whole body into memory. The bytes replace the stream, so later
    /// reads are served from memory.
    pub fn to_bytes(&mut self) -> io::Result<Bytes> {
        match &self.source {
            Source::Empty => return Ok(Bytes::new()),
            Source::Bytes(b) => return Ok(b.clone()),
            _ => {}
        }
        let mut stream = self.take_stream()?;
        let mut buf = Vec::with_capacity(self.length.unwrap_or(0).min(1 << 20) as usize);
        stream.read_to_end(&mut buf)?;
        let bytes = Bytes::from(buf);
        self.length = Some(bytes.len() as u64);
        self.source = Source::Bytes(bytes.clone());
        self.consumed = false;
        Ok(bytes)
    }

    /// Write the body to `sink`, returning the number of bytes written.
    pub fn write_to(&mut self, sink: &mut dyn Write) -> io::Result<u64> {
        if let Source::Bytes(b) = &self.source {
            sink.write_all(b)?;
            return Ok(b.len() as u64);
        }
        if matches!(self.source, Source::Multipart(_)) && !self.repeatable {
            if self.consumed {
                return Err(consumed_error());
            }
            self.consumed = true;
            if let Source::Multipart(m) = &mut self.source {
                return m.write_to(sink);
            }
        }
        let mut stream = self.to_stream()?;
        io::copy(&mut stream, sink)
    }

    /// Like [`Body::write_to`], but `sink` receives the bytes in
    /// `buffer_size` pieces, so progress tracking follows the buffer size.
    pub fn write_to_buffered(&mut self, sink: &mut dyn Write, buffer_size: usize) -> io::Result<u64> {
        let size = buffer_size.max(1);
        let mut out = BufWriter::with_capacity(size, Rechunk { inner: sink, size });
        match self.write_to(&mut out) {
            Ok(written) => {
                out.flush()?;
                Ok(written)
            }
            Err(e) => {
                let _ = out.into_parts();
                Err(e)
            }
        }
    }

    /// Read the body and render it for display.
    pub fn as_string(&mut self, content_type: Option<&str>) -> String {
        match self.to_bytes() {
            Ok(bytes) => render(&bytes, content_type),
            Err(e) => format!("(error reading body: {})", e),
        }
    }

    /// Render without reading: in-memory bodies are shown like [`as_string`],
    /// streamed bodies by their length and content type.
    ///
    /// [`as_string`]: Body::as_string
    pub fn describe(&self, content_type: Option<&str>) -> String {
        match &self.source {
            Source::Empty => render(&[], content_type),
            Source::Bytes(b) => render(b, content_type),
            _ if self.length == Some(0) => render(&[], content_type),
            _ => format!(
                "({} bytes of {})",
                self.length.map(|n| n.to_string()).unwrap_or_else(|| "unknown".to_string()),
                display_type(content_type)
            ),
        }
    }

    /// Copy for error reporting: in-memory and re-openable bodies are kept,
    /// one-shot streams are not.
    pub(crate) fn snapshot(&self) -> Body {
        match &self.source {
            Source::Bytes(b) => Body::from_bytes(b.clone()),
            Source::Factory(f) if self.repeatable => Body {
                source: Source::Factory(f.clone()),
                length: self.length,
                repeatable: true,
                consumed: false,
            },
            _ => Body::empty(),
        }
    }
}

/// Passes at most `size` bytes per write to `inner`.
struct Rechunk<'a> {
    inner: &'a mut dyn Write,
    size: usize,
}

impl Write for Rechunk<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let end = buf.len().min(self.size);
        self.inner.write(&buf[..end])
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

fn display_type(content_type: Option<&str>) -> &str {
    content_type
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or("(unknown)")
}

fn render(bytes: &[u8], content_type: Option<&str>) -> String {
    if bytes.is_empty() {
        return "(empty)".to_string();
    }
    match content_type.map(str::trim).filter(|c| !c.is_empty()) {
        Some(ct) if mime::is_textual(ct) => mime::decode_text(bytes, Some(ct)),
        _ => format!("({} bytes of {})", bytes.len(), display_type(content_type)),
    }
}

impl Default for Body {
    fn default() -> Self {
        Body::empty()
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.source {
            Source::Empty => "empty",
            Source::Bytes(_) => "bytes",
            Source::Stream(_) => "stream",
            Source::Factory(_) => "factory",
            Source::Multipart(_) | Source::PendingMultipart => "multipart",
        };
        f.debug_struct("Body")
            .field("kind", &kind)
            .field("length", &self.length())
            .field("repeatable", &self.is_repeatable())
            .field("consumed", &self.consumed)
            .finish()
    }
}

impl From<Bytes> for Body {
    fn from(b: Bytes) -> Self {
        Body::from_bytes(b)
    }
}

impl From<Vec<u8>> for Body {
    fn from(b: Vec<u8>) -> Self {
        Body::from_bytes(b)
    }
}

impl From<&'static [u8]> for Body {
    fn from(b: &'static [u8]) -> Self {
        Body::from_bytes(Bytes::from_static(b))
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Body::from_string(s)
    }
}

impl From<&str> for Body {
    fn from(s: &str) -> Self {
        Body::from_string(s.to_string())
    }
}
