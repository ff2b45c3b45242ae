/*
 * request.rs
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

//! Request value and its builder methods.

use std::fmt;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use super::headers::{Headers, CONTENT_TYPE};
use super::{Body, ExecutionOptions, ParamValue, Parameters, Response};
use crate::error::{FuelError, IllegalArgumentError};
use crate::mime::{self, MultipartBody};
use crate::requests::{Download, Upload};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    Trace,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Trace => "TRACE",
        }
    }

    /// Whether the method's semantics allow a request body.
    pub fn allows_body(&self) -> bool {
        matches!(self, Method::Post | Method::Put | Method::Patch)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Method {
    type Err = IllegalArgumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            "HEAD" => Ok(Method::Head),
            "OPTIONS" => Ok(Method::Options),
            "TRACE" => Ok(Method::Trace),
            other => Err(IllegalArgumentError(format!("unknown method {}", other))),
        }
    }
}

/// An HTTP request. Built with consuming setters; executed once.
#[derive(Debug)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) url: Url,
    pub(crate) headers: Headers,
    pub(crate) parameters: Parameters,
    pub(crate) body: Body,
    pub(crate) options: ExecutionOptions,
    pub(crate) upload: Option<Upload>,
    pub(crate) download: Option<Download>,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self::with_options(method, url, ExecutionOptions::default())
    }

    pub fn with_options(method: Method, url: Url, options: ExecutionOptions) -> Self {
        Self {
            method,
            url,
            headers: Headers::new(),
            parameters: Vec::new(),
            body: Body::empty(),
            options,
            upload: None,
            download: None,
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn set_url(&mut self, url: Url) {
        self.url = url;
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.parameters
    }

    pub fn get_body(&self) -> &Body {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    pub fn options(&self) -> &ExecutionOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut ExecutionOptions {
        &mut self.options
    }

    pub fn is_upload(&self) -> bool {
        self.upload.is_some()
    }

    pub fn is_download(&self) -> bool {
        self.download.is_some()
    }

    /// Set a header, replacing existing values.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Add a header value.
    pub fn append_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn parameter(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.parameters.push((key.into(), value.into()));
        self
    }

    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters.extend(parameters);
        self
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    /// String body; `text/plain; charset=utf-8` unless a Content-Type is set.
    pub fn body_string(mut self, body: impl Into<String>) -> Self {
        self.headers.set_if_absent(CONTENT_TYPE, "text/plain; charset=utf-8");
        self.body = Body::from_string(body);
        self
    }

    pub fn body_file(mut self, path: impl AsRef<Path>) -> Self {
        self.body = Body::from_file(path);
        self
    }

    pub fn body_reader(mut self, reader: impl Read + Send + 'static, length: Option<u64>) -> Self {
        self.body = Body::from_reader(reader, length);
        self
    }

    /// JSON text body with `Content-Type: application/json`.
    pub fn json_body(mut self, json: impl Into<String>) -> Self {
        self.headers.set(CONTENT_TYPE, "application/json");
        self.body = Body::from_string(json);
        self
    }

    /// Connect timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    /// Read and write timeout.
    pub fn timeout_read(mut self, timeout: Duration) -> Self {
        self.options.timeout_read = timeout;
        self
    }

    pub fn allow_redirects(mut self, allow: bool) -> Self {
        self.options.allow_redirects = Some(allow);
        self
    }

    pub fn use_http_cache(mut self, use_cache: bool) -> Self {
        self.options.use_http_cache = Some(use_cache);
        self
    }

    pub fn decode_content(mut self, decode: bool) -> Self {
        self.options.decode_content = Some(decode);
        self
    }

    pub fn buffer_size(mut self, size: usize) -> Self {
        self.options.buffer_size = size.max(1);
        self
    }

    pub fn tls_config(mut self, config: Arc<rustls::ClientConfig>) -> Self {
        self.options.tls_config = Some(config);
        self
    }

    /// Replace the response validator.
    pub fn validate<F>(mut self, validator: F) -> Self
    where
        F: Fn(&Response) -> bool + Send + Sync + 'static,
    {
        self.options.response_validator = Arc::new(validator);
        self
    }

    pub fn request_progress<F>(mut self, handler: F) -> Self
    where
        F: Fn(u64, u64) + Send + Sync + 'static,
    {
        self.options.request_progress.add(handler);
        self
    }

    pub fn response_progress<F>(mut self, handler: F) -> Self
    where
        F: Fn(u64, u64) + Send + Sync + 'static,
    {
        self.options.response_progress.add(handler);
        self
    }

    /// Build the multipart body from the upload parts. Runs at execution
    /// time so missing files and bad boundaries fail the call, not the build.
    pub(crate) fn prepare_body(&mut self) -> Result<(), FuelError> {
        let Some(upload) = self.upload.as_ref() else {
            return Ok(());
        };
        let content_type = self.headers.last(CONTENT_TYPE).unwrap_or_default().to_string();
        let Some(boundary) = mime::form_data_boundary(&content_type) else {
            let cause = IllegalArgumentError(format!(
                "Content-Type must be multipart/form-data with a valid boundary, got {:?}",
                content_type
            ));
            return Err(FuelError::encoding(cause, Response::error(self.url.clone())));
        };
        let parameters = self
            .parameters
            .iter()
            .flat_map(|(k, v)| ParamValue::flatten(k, v))
            .collect();
        let mut multipart = MultipartBody::new(boundary, parameters, upload.parts().to_vec());
        let length = multipart
            .length()
            .map_err(|e| FuelError::resource(e, Response::error(self.url.clone())))?;
        self.body = Body::multipart(multipart, length);
        Ok(())
    }

    /// Equivalent `curl` command line.
    pub fn curl_string(&self) -> String {
        let mut s = String::from("curl -i");
        if self.method != Method::Get {
            s.push_str(" -X ");
            s.push_str(self.method.as_str());
        }
        if !self.body.is_empty() {
            let body = self.body.describe(self.headers.last(CONTENT_TYPE));
            s.push_str(&format!(" -d \"{}\"", body.replace('"', "\\\"")));
        }
        for (name, value) in self.headers.wire_lines() {
            s.push_str(&format!(" -H \"{}:{}\"", name, value.replace('"', "\\\"")));
        }
        s.push_str(&format!(" \"{}\"", self.url));
        s
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--> {} {}", self.method, self.url)?;
        writeln!(f, "Body : {}", self.body.describe(self.headers.last(CONTENT_TYPE)))?;
        writeln!(f, "Headers : ({})", self.headers.len())?;
        write!(f, "{}", self.headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(url: &str) -> Request {
        Request::new(Method::Get, Url::parse(url).unwrap())
    }

    #[test]
    fn body_semantics_by_method() {
        for m in [Method::Get, Method::Delete, Method::Head, Method::Options, Method::Trace] {
            assert!(!m.allows_body(), "{}", m);
        }
        for m in [Method::Post, Method::Put, Method::Patch] {
            assert!(m.allows_body(), "{}", m);
        }
        assert_eq!("patch".parse::<Method>().unwrap(), Method::Patch);
        assert!("BREW".parse::<Method>().is_err());
    }

    #[test]
    fn builder_sets_headers_and_options() {
        let r = get("http://h/")
            .header("Accept", "text/html")
            .append_header("Accept", "application/json")
            .timeout(Duration::from_secs(1))
            .allow_redirects(false)
            .body_string("hi");
        assert_eq!(r.headers().get("accept").len(), 2);
        assert_eq!(r.headers().last("content-type"), Some("text/plain; charset=utf-8"));
        assert_eq!(r.options().timeout, Duration::from_secs(1));
        assert_eq!(r.options().allow_redirects, Some(false));
        assert_eq!(r.get_body().length(), Some(2));
    }

    #[test]
    fn display_and_curl() {
        let r = Request::new(Method::Post, Url::parse("http://h/post").unwrap())
            .json_body("{\"a\":\"b\"}")
            .header("X-Foo", "bar");
        let shown = r.to_string();
        assert!(shown.starts_with("--> POST http://h/post\n"));
        assert!(shown.contains("Body : {\"a\":\"b\"}"));
        assert!(shown.contains("Headers : (2)"));
        assert_eq!(
            r.curl_string(),
            "curl -i -X POST -d \"{\\\"a\\\":\\\"b\\\"}\" -H \"Content-Type:application/json\" -H \"X-Foo:bar\" \"http://h/post\""
        );
        assert_eq!(get("http://h/").curl_string(), "curl -i \"http://h/\"");
    }

    #[test]
    fn display_of_repeatable_body_does_not_consume() {
        let r = get("http://h/").body(Body::from_string("abc").as_repeatable());
        let _ = r.to_string();
        assert!(!r.get_body().is_consumed());
    }
}
