/*
 * options.rs
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

//! Per-request execution options.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use super::interceptor::{validator_response_interceptor, RequestTransformer, ResponseTransformer};
use super::{Request, Response};
use crate::client::{Client, HttpClient};
use crate::error::FuelError;
use crate::progress::Progress;
use crate::task::CancelHandle;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(15_000);
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

pub type ResponseValidator = Arc<dyn Fn(&Response) -> bool + Send + Sync>;

/// Default validator: fails 4xx and 5xx.
pub fn default_validator() -> ResponseValidator {
    Arc::new(|r: &Response| !(r.is_client_error() || r.is_server_error()))
}

#[derive(Clone)]
pub struct ExecutionOptions {
    pub client: Arc<dyn Client>,
    /// TLS configuration; the shared default (platform roots) when `None`.
    pub tls_config: Option<Arc<rustls::ClientConfig>>,
    pub request_transformer: RequestTransformer,
    pub response_transformer: ResponseTransformer,
    pub request_progress: Progress,
    pub response_progress: Progress,
    /// Connect timeout.
    pub timeout: Duration,
    /// Read and write timeout.
    pub timeout_read: Duration,
    /// `None` means the client default (decode).
    pub decode_content: Option<bool>,
    /// `None` means the client default (follow).
    pub allow_redirects: Option<bool>,
    /// `None` means the client default (cache allowed).
    pub use_http_cache: Option<bool>,
    pub response_validator: ResponseValidator,
    pub buffer_size: usize,
    pub cancel: CancelHandle,
    pub(crate) permits: Option<Arc<Semaphore>>,
}

impl ExecutionOptions {
    /// Append a response transformer; it runs after the existing one.
    pub fn add_response_transformer<F>(&mut self, transformer: F)
    where
        F: Fn(&Request, Response) -> Result<Response, FuelError> + Send + Sync + 'static,
    {
        let previous = self.response_transformer.clone();
        self.response_transformer = Arc::new(move |request: &Request, response: Response| {
            let response = previous(request, response)?;
            transformer(request, response)
        });
    }
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            client: Arc::new(HttpClient::default()),
            tls_config: None,
            request_transformer: Arc::new(|request: Request| Ok(request)),
            response_transformer: validator_response_interceptor()(Arc::new(
                |_: &Request, response: Response| Ok(response),
            )),
            request_progress: Progress::new(),
            response_progress: Progress::new(),
            timeout: DEFAULT_TIMEOUT,
            timeout_read: DEFAULT_TIMEOUT,
            decode_content: None,
            allow_redirects: None,
            use_http_cache: None,
            response_validator: default_validator(),
            buffer_size: DEFAULT_BUFFER_SIZE,
            cancel: CancelHandle::new(),
            permits: None,
        }
    }
}

impl fmt::Debug for ExecutionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionOptions")
            .field("timeout", &self.timeout)
            .field("timeout_read", &self.timeout_read)
            .field("decode_content", &self.decode_content)
            .field("allow_redirects", &self.allow_redirects)
            .field("use_http_cache", &self.use_http_cache)
            .field("buffer_size", &self.buffer_size)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Body, Headers};
    use url::Url;

    #[test]
    fn defaults() {
        let o = ExecutionOptions::default();
        assert_eq!(o.timeout, Duration::from_millis(15_000));
        assert_eq!(o.timeout_read, Duration::from_millis(15_000));
        assert_eq!(o.buffer_size, 8192);
        let url = Url::parse("http://h/").unwrap();
        let mk = |c| Response::new(url.clone(), Some(c), "", Headers::new(), Body::empty());
        assert!((o.response_validator)(&mk(200)));
        assert!((o.response_validator)(&mk(399)));
        assert!(!(o.response_validator)(&mk(400)));
        assert!(!(o.response_validator)(&mk(599)));
    }

    #[test]
    fn default_transformer_validates() {
        let o = ExecutionOptions::default();
        let url = Url::parse("http://h/").unwrap();
        let request = Request::new(crate::http::Method::Get, url.clone());
        let response = Response::new(url, Some(500), "Oops", Headers::new(), Body::from("boom"));
        let err = (o.response_transformer)(&request, response).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Validation);
        assert_eq!(&err.error_data()[..], b"boom");
    }

    #[test]
    fn appended_transformers_run_in_order() {
        let mut o = ExecutionOptions::default();
        o.add_response_transformer(|_, mut r| {
            r.headers_mut().append("X-Order", "1");
            Ok(r)
        });
        o.add_response_transformer(|_, mut r| {
            r.headers_mut().append("X-Order", "2");
            Ok(r)
        });
        let url = Url::parse("http://h/").unwrap();
        let request = Request::new(crate::http::Method::Get, url.clone());
        let response = Response::new(url, Some(200), "OK", Headers::new(), Body::empty());
        let out = (o.response_transformer)(&request, response).unwrap();
        assert_eq!(out.header("X-Order"), &["1".to_string(), "2".to_string()]);
    }
}
