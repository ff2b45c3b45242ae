/*
 * lib.rs
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

//! Fuel core: an HTTP client engine.
//!
//! # Overview
//! A caller builds a [`Request`] (usually through a [`Manager`]), the parameter
//! encoder folds its parameters into the URL or body, request interceptors run,
//! and the request is handed to a [`Client`] on a background worker. The
//! default client is a blocking HTTP/1.1 transport ([`HttpClient`]) that
//! undoes Transfer-/Content-Encoding stacks on the way in. Response
//! interceptors (validation by default) run next, and a [`Deserializable`]
//! adapter reduces the [`Response`] body to a typed value.
//!
//! # Design
//! - Every boundary returns `Result<_, FuelError>`; [`FuelError`] carries the
//!   best-known response and any error body bytes.
//! - Bodies own their streams. Dropping a [`Response`] releases its socket.
//! - Upload and download are explicit optional state on the request
//!   (`Request::upload`, `Request::download`), not wrapper types.
//! - No global manager: callers own a [`Manager`] and pass it around.

pub mod auth;
pub mod client;
pub mod deserializable;
pub mod error;
pub mod http;
pub mod logging;
pub mod manager;
pub mod mime;
pub mod net;
pub mod progress;
pub mod requests;
pub mod routing;
pub mod task;
pub mod uri;

pub use client::{Client, DefaultHook, Hook, HttpClient};
pub use deserializable::{
    Attempt, BytesDeserializer, Deserializable, EmptyDeserializer, StringDeserializer,
};
pub use error::{ErrorKind, FuelError, Result};
pub use http::{
    Body, ExecutionOptions, Headers, Method, ParamValue, Parameters, Request, Response,
};
pub use manager::{Manager, ManagerBuilder};
pub use progress::{Progress, ProgressCallback};
pub use requests::DataPart;
pub use routing::Routing;
pub use task::{CancelHandle, CancellableRequest, ResponseResultOf, TaskState};

pub use url::Url;
