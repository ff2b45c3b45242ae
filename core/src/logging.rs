/*
 * logging.rs
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

//! Interceptors that log requests and responses through `tracing`.

use std::sync::Arc;

use crate::http::{
    request_interceptor, response_interceptor, FoldableRequestInterceptor,
    FoldableResponseInterceptor, Request, RequestTransformer, Response, ResponseTransformer,
};

pub fn log_request_interceptor() -> FoldableRequestInterceptor {
    request_interceptor(|next: RequestTransformer| -> RequestTransformer {
        Arc::new(move |request: Request| {
            tracing::info!("{}", request);
            next(request)
        })
    })
}

pub fn log_request_as_curl_interceptor() -> FoldableRequestInterceptor {
    request_interceptor(|next: RequestTransformer| -> RequestTransformer {
        Arc::new(move |request: Request| {
            tracing::info!("{}", request.curl_string());
            next(request)
        })
    })
}

pub fn log_response_interceptor() -> FoldableResponseInterceptor {
    response_interceptor(|next: ResponseTransformer| -> ResponseTransformer {
        Arc::new(move |request: &Request, response: Response| {
            tracing::info!("{}", response);
            next(request, response)
        })
    })
}
