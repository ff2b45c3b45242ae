/*
 * manager.rs
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

//! Long-lived request context.
//!
//! A [`Manager`] owns the transport, defaults applied to every request it
//! builds (base path, headers, parameters, timeouts, TLS configuration), the
//! interceptor chains, and the semaphore bounding concurrent executions. It is
//! passed around explicitly; nothing in the crate reaches for a global one.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use url::Url;

use crate::client::{Client, HttpClient};
use crate::http::{
    default_validator, validator_response_interceptor, ExecutionOptions, FoldableRequestInterceptor,
    FoldableResponseInterceptor, Headers, InterceptorChain, Method, Parameters, Request,
    RequestInterceptorFn, RequestTransformer, Response, ResponseInterceptorFn, ResponseTransformer,
    ResponseValidator, DEFAULT_BUFFER_SIZE, DEFAULT_TIMEOUT,
};
use crate::routing::Routing;
use crate::uri;

pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 64;

pub struct Manager {
    client: Arc<dyn Client>,
    base_path: Option<Url>,
    base_headers: Headers,
    base_params: Parameters,
    timeout: Duration,
    read_timeout: Duration,
    tls_config: Option<Arc<rustls::ClientConfig>>,
    buffer_size: usize,
    response_validator: ResponseValidator,
    permits: Arc<Semaphore>,
    request_interceptors: InterceptorChain<RequestInterceptorFn>,
    response_interceptors: InterceptorChain<ResponseInterceptorFn>,
}

impl Manager {
    pub fn builder() -> ManagerBuilder {
        ManagerBuilder::default()
    }

    pub fn base_path(&self) -> Option<&Url> {
        self.base_path.as_ref()
    }

    pub fn base_headers(&self) -> &Headers {
        &self.base_headers
    }

    pub fn base_params(&self) -> &Parameters {
        &self.base_params
    }

    /// Build a request. `path` is joined onto the base path unless it is an
    /// absolute URL. Base headers fill in names the request does not set;
    /// base parameters follow `params`.
    pub fn request(
        &self,
        method: Method,
        path: &str,
        params: Parameters,
    ) -> Result<Request, url::ParseError> {
        let url = uri::resolve(self.base_path.as_ref(), path)?;
        Ok(self.build(method, url, params, None))
    }

    pub fn get(&self, path: &str) -> Result<Request, url::ParseError> {
        self.request(Method::Get, path, Vec::new())
    }

    pub fn post(&self, path: &str) -> Result<Request, url::ParseError> {
        self.request(Method::Post, path, Vec::new())
    }

    pub fn put(&self, path: &str) -> Result<Request, url::ParseError> {
        self.request(Method::Put, path, Vec::new())
    }

    pub fn patch(&self, path: &str) -> Result<Request, url::ParseError> {
        self.request(Method::Patch, path, Vec::new())
    }

    pub fn delete(&self, path: &str) -> Result<Request, url::ParseError> {
        self.request(Method::Delete, path, Vec::new())
    }

    pub fn head(&self, path: &str) -> Result<Request, url::ParseError> {
        self.request(Method::Head, path, Vec::new())
    }

    /// Multipart upload, POST by default.
    pub fn upload(&self, path: &str) -> Result<Request, url::ParseError> {
        self.upload_with(Method::Post, path, Vec::new())
    }

    pub fn upload_with(
        &self,
        method: Method,
        path: &str,
        params: Parameters,
    ) -> Result<Request, url::ParseError> {
        Ok(self.request(method, path, params)?.upload())
    }

    /// Download, GET by default. Set the destination on the returned request.
    pub fn download(&self, path: &str) -> Result<Request, url::ParseError> {
        self.download_with(Method::Get, path, Vec::new())
    }

    pub fn download_with(
        &self,
        method: Method,
        path: &str,
        params: Parameters,
    ) -> Result<Request, url::ParseError> {
        Ok(self.request(method, path, params)?.download())
    }

    /// Build a request from a route. The route's base path replaces the
    /// manager's.
    pub fn request_routing(&self, route: &dyn Routing) -> Result<Request, url::ParseError> {
        let base = Url::parse(route.base_path())?;
        let url = uri::resolve(Some(&base), &route.path())?;
        let mut request = self.build(route.method(), url, route.params(), route.headers());
        if let Some(bytes) = route.body() {
            request = request.body(bytes);
        }
        Ok(request)
    }

    fn build(&self, method: Method, url: Url, params: Parameters, headers: Option<Headers>) -> Request {
        let mut request = Request::with_options(method, url, self.options()).with_parameters(params);
        if let Some(headers) = headers {
            request.headers = headers;
        }
        request.headers.merge_defaults(&self.base_headers);
        request.parameters.extend(self.base_params.iter().cloned());
        request
    }

    /// Options for a new request. Interceptor chains are folded now, so later
    /// changes do not affect requests already built.
    fn options(&self) -> ExecutionOptions {
        let identity: RequestTransformer = Arc::new(|request: Request| Ok(request));
        let passthrough: ResponseTransformer = Arc::new(|_: &Request, response: Response| Ok(response));
        ExecutionOptions {
            client: self.client.clone(),
            tls_config: self.tls_config.clone(),
            request_transformer: self.request_interceptors.fold(identity),
            response_transformer: self.response_interceptors.fold(passthrough),
            timeout: self.timeout,
            timeout_read: self.read_timeout,
            response_validator: self.response_validator.clone(),
            buffer_size: self.buffer_size,
            permits: Some(self.permits.clone()),
            ..ExecutionOptions::default()
        }
    }

    pub fn add_request_interceptor(&self, interceptor: FoldableRequestInterceptor) {
        self.request_interceptors.add(interceptor);
    }

    pub fn add_response_interceptor(&self, interceptor: FoldableResponseInterceptor) {
        self.response_interceptors.add(interceptor);
    }

    pub fn remove_request_interceptor(&self, interceptor: &FoldableRequestInterceptor) -> bool {
        self.request_interceptors.remove(interceptor)
    }

    pub fn remove_response_interceptor(&self, interceptor: &FoldableResponseInterceptor) -> bool {
        self.response_interceptors.remove(interceptor)
    }

    pub fn remove_all_request_interceptors(&self) {
        self.request_interceptors.clear();
    }

    /// Also removes the default validation interceptor.
    pub fn remove_all_response_interceptors(&self) {
        self.response_interceptors.clear();
    }

    pub fn request_interceptor_count(&self) -> usize {
        self.request_interceptors.len()
    }

    pub fn response_interceptor_count(&self) -> usize {
        self.response_interceptors.len()
    }
}

impl Default for Manager {
    fn default() -> Self {
        ManagerBuilder::default().build()
    }
}

impl fmt::Debug for Manager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager")
            .field("base_path", &self.base_path.as_ref().map(Url::as_str))
            .field("base_headers", &self.base_headers)
            .field("timeout", &self.timeout)
            .field("read_timeout", &self.read_timeout)
            .field("request_interceptors", &self.request_interceptors)
            .field("response_interceptors", &self.response_interceptors)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
pub struct ManagerBuilder {
    client: Option<Arc<dyn Client>>,
    base_path: Option<Url>,
    base_headers: Headers,
    base_params: Parameters,
    timeout: Option<Duration>,
    read_timeout: Option<Duration>,
    tls_config: Option<Arc<rustls::ClientConfig>>,
    buffer_size: Option<usize>,
    max_concurrent_requests: Option<usize>,
    response_validator: Option<ResponseValidator>,
}

impl ManagerBuilder {
    /// Transport; [`HttpClient`] by default.
    pub fn client(mut self, client: Arc<dyn Client>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn base_path(mut self, base_path: Url) -> Self {
        self.base_path = Some(base_path);
        self
    }

    pub fn base_headers(mut self, headers: Headers) -> Self {
        self.base_headers = headers;
        self
    }

    pub fn base_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.base_headers.append(name, value);
        self
    }

    pub fn base_params(mut self, params: Parameters) -> Self {
        self.base_params = params;
        self
    }

    /// Connect timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    pub fn tls_config(mut self, config: Arc<rustls::ClientConfig>) -> Self {
        self.tls_config = Some(config);
        self
    }

    pub fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = Some(size);
        self
    }

    pub fn max_concurrent_requests(mut self, n: usize) -> Self {
        self.max_concurrent_requests = Some(n);
        self
    }

    pub fn response_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&Response) -> bool + Send + Sync + 'static,
    {
        self.response_validator = Some(Arc::new(validator));
        self
    }

    pub fn build(self) -> Manager {
        let response_interceptors = InterceptorChain::new();
        response_interceptors.add(validator_response_interceptor());
        Manager {
            client: self.client.unwrap_or_else(|| Arc::new(HttpClient::default())),
            base_path: self.base_path,
            base_headers: self.base_headers,
            base_params: self.base_params,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            read_timeout: self.read_timeout.unwrap_or(DEFAULT_TIMEOUT),
            tls_config: self.tls_config,
            buffer_size: self.buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE).max(1),
            response_validator: self.response_validator.unwrap_or_else(default_validator),
            permits: Arc::new(Semaphore::new(
                self.max_concurrent_requests
                    .unwrap_or(DEFAULT_MAX_CONCURRENT_REQUESTS)
                    .max(1),
            )),
            request_interceptors: InterceptorChain::new(),
            response_interceptors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, FuelError};
    use crate::http::{param, request_interceptor, Body, ParamValue};
    use std::sync::Mutex;

    /// Records requests and answers with a fixed status.
    struct Recording {
        status: u16,
        seen: Mutex<Vec<String>>,
    }

    impl Client for Recording {
        fn execute_request(&self, request: &mut Request) -> Result<Response, FuelError> {
            self.seen.lock().unwrap().push(request.url().to_string());
            Ok(Response::new(
                request.url().clone(),
                Some(self.status),
                "",
                Headers::new(),
                Body::from("ok"),
            ))
        }
    }

    fn manager(status: u16) -> (Manager, Arc<Recording>) {
        let client = Arc::new(Recording { status, seen: Mutex::new(Vec::new()) });
        let manager = Manager::builder()
            .client(client.clone())
            .base_path(Url::parse("http://example.test/api").unwrap())
            .base_header("X-Base", "1")
            .base_params(vec![param("key", "k")])
            .build();
        (manager, client)
    }

    #[test]
    fn applies_base_path_headers_and_params() {
        let (m, _) = manager(200);
        let r = m
            .request(Method::Get, "users", vec![param("page", 2)])
            .unwrap()
            .header("X-Base", "override");
        assert_eq!(r.url().as_str(), "http://example.test/api/users");
        assert_eq!(r.headers().last("x-base"), Some("override"));
        assert_eq!(
            r.parameters(),
            &vec![
                ("page".to_string(), ParamValue::from("2")),
                ("key".to_string(), ParamValue::from("k")),
            ]
        );
    }

    #[test]
    fn encodes_params_and_validates() {
        let (m, client) = manager(200);
        let response = m.get("users").unwrap().parameter("q", "a b").execute().unwrap();
        assert_eq!(response.status_code(), Some(200));
        assert_eq!(
            *client.seen.lock().unwrap(),
            vec!["http://example.test/api/users?q=a%20b&key=k".to_string()]
        );

        let (m, _) = manager(404);
        let err = m.get("missing").unwrap().execute().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.response().status_code(), Some(404));

        m.remove_all_response_interceptors();
        assert_eq!(m.get("missing").unwrap().execute().unwrap().status_code(), Some(404));
    }

    #[test]
    fn interceptors_snapshot_at_build_time() {
        let (m, _) = manager(200);
        let tag = request_interceptor(|next: RequestTransformer| -> RequestTransformer {
            Arc::new(move |r: Request| next(r.header("X-Tag", "yes")))
        });
        m.add_request_interceptor(tag.clone());
        let before = m.get("a").unwrap();
        assert!(m.remove_request_interceptor(&tag));
        assert!(!m.remove_request_interceptor(&tag));
        let transform = before.options().request_transformer.clone();
        let transformed = transform(before).unwrap();
        assert_eq!(transformed.headers().last("X-Tag"), Some("yes"));
        let after = m.get("a").unwrap();
        let transform = after.options().request_transformer.clone();
        let transformed = transform(after).unwrap();
        assert!(!transformed.headers().contains("X-Tag"));
    }

    struct UserRoute(u32);

    impl Routing for UserRoute {
        fn base_path(&self) -> &str {
            "http://routes.test/v1"
        }

        fn method(&self) -> Method {
            Method::Put
        }

        fn path(&self) -> String {
            format!("users/{}", self.0)
        }

        fn body(&self) -> Option<Vec<u8>> {
            Some(b"{}".to_vec())
        }
    }

    #[test]
    fn routing_overrides_base_path() {
        let (m, _) = manager(200);
        let r = m.request_routing(&UserRoute(7)).unwrap();
        assert_eq!(r.method(), Method::Put);
        assert_eq!(r.url().as_str(), "http://routes.test/v1/users/7");
        assert_eq!(r.get_body().length(), Some(2));
        assert_eq!(r.headers().last("X-Base"), Some("1"));
    }

    #[test]
    fn default_manager_has_validator() {
        let m = Manager::default();
        assert_eq!(m.response_interceptor_count(), 1);
        assert_eq!(m.request_interceptor_count(), 0);
    }
}
