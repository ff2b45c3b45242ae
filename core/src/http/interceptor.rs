/*
 * interceptor.rs
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

//! Interceptor chains.
//!
//! A transformer maps a request (or request plus response) to a new value.
//! A foldable interceptor takes the next transformer and returns a wrapped
//! one. Chains are folded right to left over a terminal transformer, so the
//! first-added interceptor runs outermost and may short-circuit the rest by
//! not calling `next`.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;

use super::{Request, Response};
use crate::error::{ErrorKind, FuelError, HttpStatusError};

pub type RequestTransformer = Arc<dyn Fn(Request) -> Result<Request, FuelError> + Send + Sync>;
pub type ResponseTransformer =
    Arc<dyn Fn(&Request, Response) -> Result<Response, FuelError> + Send + Sync>;

pub type RequestInterceptorFn = dyn Fn(RequestTransformer) -> RequestTransformer + Send + Sync;
pub type ResponseInterceptorFn = dyn Fn(ResponseTransformer) -> ResponseTransformer + Send + Sync;

pub type FoldableRequestInterceptor = Arc<RequestInterceptorFn>;
pub type FoldableResponseInterceptor = Arc<ResponseInterceptorFn>;

/// Wrap a closure as a request interceptor.
pub fn request_interceptor<F>(f: F) -> FoldableRequestInterceptor
where
    F: Fn(RequestTransformer) -> RequestTransformer + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Wrap a closure as a response interceptor.
pub fn response_interceptor<F>(f: F) -> FoldableResponseInterceptor
where
    F: Fn(ResponseTransformer) -> ResponseTransformer + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Ordered, mutable interceptor list. Removal is by identity.
pub struct InterceptorChain<T: ?Sized> {
    interceptors: Mutex<Vec<Arc<T>>>,
}

impl<T: ?Sized> Default for InterceptorChain<T> {
    fn default() -> Self {
        Self {
            interceptors: Mutex::new(Vec::new()),
        }
    }
}

impl<T: ?Sized> InterceptorChain<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, interceptor: Arc<T>) {
        self.lock().push(interceptor);
    }

    /// Remove the first entry that is the same `Arc` as `interceptor`.
    pub fn remove(&self, interceptor: &Arc<T>) -> bool {
        let mut list = self.lock();
        match list.iter().position(|i| Arc::ptr_eq(i, interceptor)) {
            Some(pos) => {
                list.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn snapshot(&self) -> Vec<Arc<T>> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Arc<T>>> {
        self.interceptors.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: ?Sized> fmt::Debug for InterceptorChain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InterceptorChain({})", self.len())
    }
}

impl InterceptorChain<RequestInterceptorFn> {
    /// Fold over `terminal`; the first-added interceptor is outermost.
    pub fn fold(&self, terminal: RequestTransformer) -> RequestTransformer {
        fold_request(&self.snapshot(), terminal)
    }
}

impl InterceptorChain<ResponseInterceptorFn> {
    /// Fold over `terminal`; the first-added interceptor is outermost.
    pub fn fold(&self, terminal: ResponseTransformer) -> ResponseTransformer {
        fold_response(&self.snapshot(), terminal)
    }
}

pub fn fold_request(
    interceptors: &[FoldableRequestInterceptor],
    terminal: RequestTransformer,
) -> RequestTransformer {
    interceptors.iter().rev().fold(terminal, |next, i| i(next))
}

pub fn fold_response(
    interceptors: &[FoldableResponseInterceptor],
    terminal: ResponseTransformer,
) -> ResponseTransformer {
    interceptors.iter().rev().fold(terminal, |next, i| i(next))
}

/// Fails responses rejected by the request's validator, before any later
/// transformer sees them. The error carries the body bytes.
pub fn validator_response_interceptor() -> FoldableResponseInterceptor {
    response_interceptor(|next: ResponseTransformer| -> ResponseTransformer {
        Arc::new(move |request: &Request, mut response: Response| {
            if (request.options().response_validator)(&response) {
                return next(request, response);
            }
            tracing::warn!(
                status = ?response.status_code(),
                url = %response.url(),
                "response failed validation"
            );
            let data = match response.body_mut().to_bytes() {
                Ok(data) => data,
                Err(e) => {
                    tracing::warn!(url = %response.url(), error = %e, "error body could not be read");
                    Bytes::new()
                }
            };
            let cause = HttpStatusError {
                status: response.status_code().unwrap_or(0),
                message: response.response_message().to_string(),
            };
            Err(FuelError::new(ErrorKind::Validation, cause, response).with_error_data(data))
        })
    })
}
