/*
 * response.rs
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

//! Response value: URL, status, reason phrase, headers and a body that owns
//! the connection until read or dropped.

use std::fmt;
use std::io;

use bytes::Bytes;
use url::Url;

use super::headers::{Headers, CONTENT_LENGTH, CONTENT_TYPE};
use super::Body;

#[derive(Debug)]
pub struct Response {
    url: Url,
    status_code: Option<u16>,
    response_message: String,
    headers: Headers,
    body: Body,
}

impl Response {
    pub fn new(
        url: Url,
        status_code: Option<u16>,
        response_message: impl Into<String>,
        headers: Headers,
        body: Body,
    ) -> Self {
        Self {
            url,
            status_code,
            response_message: response_message.into(),
            headers,
            body,
        }
    }

    /// Placeholder for failures before a status line was read.
    pub fn error(url: Url) -> Self {
        Self::new(url, None, "", Headers::new(), Body::empty())
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Status code; `None` when no status line was received.
    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    pub fn response_message(&self) -> &str {
        &self.response_message
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// All values of a header.
    pub fn header(&self, name: &str) -> &[String] {
        self.headers.get(name)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.last(CONTENT_TYPE)
    }

    /// Content-Length header value, else the body length when known.
    pub fn content_length(&self) -> Option<u64> {
        self.headers
            .last(CONTENT_LENGTH)
            .and_then(|v| v.trim().parse().ok())
            .or_else(|| self.body.length())
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    pub fn set_body(&mut self, body: Body) {
        self.body = body;
    }

    pub fn into_body(self) -> Body {
        self.body
    }

    /// Read the whole body.
    pub fn data(&mut self) -> io::Result<Bytes> {
        self.body.to_bytes()
    }

    fn in_range(&self, lo: u16, hi: u16) -> bool {
        self.status_code.is_some_and(|c| (lo..=hi).contains(&c))
    }

    pub fn is_informational(&self) -> bool {
        self.in_range(100, 199)
    }

    pub fn is_successful(&self) -> bool {
        self.in_range(200, 299)
    }

    pub fn is_redirect(&self) -> bool {
        self.in_range(300, 399)
    }

    pub fn is_client_error(&self) -> bool {
        self.in_range(400, 499)
    }

    pub fn is_server_error(&self) -> bool {
        self.in_range(500, 599)
    }

    /// Head plus any in-memory body; one-shot stream bodies are dropped.
    pub fn snapshot(&self) -> Response {
        Response {
            url: self.url.clone(),
            status_code: self.status_code,
            response_message: self.response_message.clone(),
            headers: self.headers.clone(),
            body: self.body.snapshot(),
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = self
            .status_code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-1".to_string());
        writeln!(f, "<-- {} {}", status, self.url)?;
        writeln!(f, "Response : {}", self.response_message)?;
        match self.content_length() {
            Some(n) => writeln!(f, "Length : {}", n)?,
            None => writeln!(f, "Length : unknown")?,
        }
        writeln!(f, "Body : {}", self.body.describe(self.content_type()))?;
        writeln!(f, "Headers : ({})", self.headers.len())?;
        write!(f, "{}", self.headers)
    }
}
