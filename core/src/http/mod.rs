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

//! HTTP value model: methods, headers, parameters, bodies, requests,
//! responses, execution options, interceptor chains and parameter encoding.

mod body;
pub mod encoder;
pub mod headers;
pub mod interceptor;
mod options;
mod parameters;
mod request;
mod response;

pub use body::{Body, ByteStream, StreamFactory};
pub use headers::Headers;
pub use interceptor::{
    request_interceptor, response_interceptor, validator_response_interceptor,
    FoldableRequestInterceptor, FoldableResponseInterceptor, InterceptorChain,
    RequestInterceptorFn, RequestTransformer, ResponseInterceptorFn, ResponseTransformer,
};
pub use options::{
    default_validator, ExecutionOptions, ResponseValidator, DEFAULT_BUFFER_SIZE, DEFAULT_TIMEOUT,
};
pub use parameters::{param, ParamValue, Parameters};
pub use request::{Method, Request};
pub use response::Response;
