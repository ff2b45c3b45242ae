/*
 * error.rs
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

//! Errors crossing the public surface.
//!
//! # Design
//! Every failure (transport, validation, deserialization, encoding, local
//! resource, cancellation) is wrapped at its origin into a single
//! [`FuelError`]. The error keeps the response known at failure time, which
//! may be head-only or a placeholder with no status when nothing was read, and
//! the raw error body bytes when they were read.

use std::error::Error as StdError;
use std::fmt;
use std::io;

use bytes::Bytes;

use crate::http::Response;

/// Boxed cause stored inside a [`FuelError`].
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, FuelError>;

/// Classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Connection or I/O failure before or during the exchange.
    Transport,
    /// The exchange completed but the status failed the response validator.
    Validation,
    /// An adapter failed or produced no value.
    Deserialization,
    /// Malformed Content-Encoding/Transfer-Encoding chain or multipart boundary.
    Encoding,
    /// Local resource failure: missing upload file, unwritable destination.
    Resource,
    /// The call was cancelled before or during execution.
    Cancelled,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Transport => "transport error",
            ErrorKind::Validation => "validation error",
            ErrorKind::Deserialization => "deserialization error",
            ErrorKind::Encoding => "encoding error",
            ErrorKind::Resource => "resource error",
            ErrorKind::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Unified failure: cause plus the best-known response.
#[derive(Debug, thiserror::Error)]
#[error("{kind}: {source}")]
pub struct FuelError {
    kind: ErrorKind,
    #[source]
    source: BoxError,
    response: Response,
    error_data: Bytes,
}

impl FuelError {
    pub fn new(kind: ErrorKind, cause: impl Into<BoxError>, response: Response) -> Self {
        Self {
            kind,
            source: cause.into(),
            response,
            error_data: Bytes::new(),
        }
    }

    /// Wrap any error. An existing `FuelError` is returned as-is so that the
    /// original classification and response survive re-wrapping.
    pub fn wrap(error: BoxError, kind: ErrorKind, response: Response) -> Self {
        match error.downcast::<FuelError>() {
            Ok(fuel) => *fuel,
            Err(other) => Self::new(kind, other, response),
        }
    }

    pub fn transport(error: io::Error, response: Response) -> Self {
        Self::new(ErrorKind::Transport, error, response)
    }

    pub fn resource(error: io::Error, response: Response) -> Self {
        Self::new(ErrorKind::Resource, error, response)
    }

    pub fn encoding(cause: impl Into<BoxError>, response: Response) -> Self {
        Self::new(ErrorKind::Encoding, cause, response)
    }

    pub fn deserialization(cause: impl Into<BoxError>, response: Response) -> Self {
        Self::new(ErrorKind::Deserialization, cause, response)
    }

    pub fn cancelled(response: Response) -> Self {
        Self::new(ErrorKind::Cancelled, CancelledError, response)
    }

    /// Attach the raw error body bytes.
    pub fn with_error_data(mut self, data: Bytes) -> Self {
        self.error_data = data;
        self
    }

    /// Reclassify, keeping cause and response.
    pub(crate) fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn is_kind(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }

    /// The underlying cause.
    pub fn cause(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.source.as_ref()
    }

    /// The cause as an I/O error, when it is one.
    pub fn io_error(&self) -> Option<&io::Error> {
        self.source.downcast_ref::<io::Error>()
    }

    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn into_response(self) -> Response {
        self.response
    }

    /// Raw error body bytes; empty when none were read.
    pub fn error_data(&self) -> &Bytes {
        &self.error_data
    }
}

/// Cause of a [`ErrorKind::Validation`] failure.
#[derive(Debug, Clone, thiserror::Error)]
#[error("HTTP Exception {status} {message}")]
pub struct HttpStatusError {
    pub status: u16,
    pub message: String,
}

/// Cause when an adapter implements no deserialize attempt, or none produced a value.
#[derive(Debug, Clone, thiserror::Error)]
#[error("no deserialize method implemented: {0}")]
pub struct NoDeserializerError(pub &'static str);

/// Cause of a [`ErrorKind::Cancelled`] failure.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("request was cancelled")]
pub struct CancelledError;

/// Cause of an [`ErrorKind::Encoding`] failure for multipart bodies.
#[derive(Debug, Clone, thiserror::Error)]
#[error("illegal argument: {0}")]
pub struct IllegalArgumentError(pub String);
