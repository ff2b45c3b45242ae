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

//! Transport seam: the [`Client`] trait executes one prepared request; the
//! default [`HttpClient`] is a blocking HTTP/1.1 implementation with a
//! [`Hook`] for observing the connection lifecycle.

pub mod encoding;
pub mod h1;
mod http_client;

use std::io::{self, Read};

use crate::error::FuelError;
use crate::http::{Request, Response};

pub use http_client::{HttpClient, MAX_REDIRECTS};

/// Executes a fully built request and returns the response with its body
/// still streaming. Implementations may block.
pub trait Client: Send + Sync {
    fn execute_request(&self, request: &mut Request) -> Result<Response, FuelError>;
}

/// Lifecycle callbacks around a transport exchange. All methods default to no-ops.
pub trait Hook: Send + Sync {
    fn pre_connect(&self, _request: &Request) {}

    fn post_connect(&self, _request: &Request) {}

    /// Called for every successful connect with the raw body stream, before
    /// content decoding. The returned stream replaces it.
    fn interpret_response_stream(
        &self,
        _request: &Request,
        stream: Box<dyn Read + Send>,
    ) -> Box<dyn Read + Send> {
        stream
    }

    fn http_exchange_failed(&self, _request: &Request, _error: &io::Error) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHook;

impl Hook for DefaultHook {}
