/*
 * http_client.rs
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

//! Blocking HTTP/1.1 client. One connection per exchange (`Connection: close`),
//! redirects followed here, response body left streaming on the socket.

use std::fmt;
use std::io::{self, BufWriter, Read, Write};
use std::sync::Arc;

use url::Url;

use super::encoding;
use super::h1::{self, BodyMode, ChunkedWriter, H1Reader};
use super::{Client, DefaultHook, Hook};
use crate::error::FuelError;
use crate::http::headers::{
    ACCEPT_ENCODING, ACCEPT_TRANSFER_ENCODING, AUTHORIZATION, CACHE_CONTROL, CONNECTION,
    CONTENT_LENGTH, CONTENT_TYPE, COOKIE, HOST, LOCATION, METHOD_OVERRIDE, TRANSFER_ENCODING,
};
use crate::http::{Body, ExecutionOptions, Method, Request, Response};
use crate::net::{self, HttpStream};
use crate::progress::{Progress, ProgressReader, ProgressWriter};
use crate::task::CancelHandle;

pub const MAX_REDIRECTS: usize = 20;

pub struct HttpClient {
    hook: Arc<dyn Hook>,
    method_override: bool,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self {
            hook: Arc::new(DefaultHook),
            method_override: true,
        }
    }
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("method_override", &self.method_override)
            .finish_non_exhaustive()
    }
}

/// Where a request write failed: reading the local body, or the socket.
enum WriteError {
    Body(io::Error),
    Socket(io::Error),
}

/// Records whether an error came from the wrapped writer.
struct TrackedSink<W> {
    inner: W,
    failed: bool,
}

impl<W: Write> Write for TrackedSink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf).inspect_err(|_| self.failed = true)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush().inspect_err(|_| self.failed = true)
    }
}

/// Fails reads once the call is cancelled. A shutdown socket reports EOF,
/// so an empty read after cancellation is an abort too.
struct CancelAwareReader<R> {
    inner: R,
    cancel: CancelHandle,
}

fn cancelled_read() -> io::Error {
    io::Error::new(io::ErrorKind::ConnectionAborted, "request was cancelled")
}

impl<R: Read> Read for CancelAwareReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.cancel.is_cancelled() {
            return Err(cancelled_read());
        }
        match self.inner.read(buf)? {
            0 if !buf.is_empty() && self.cancel.is_cancelled() => Err(cancelled_read()),
            n => Ok(n),
        }
    }
}

fn request_target(url: &Url) -> String {
    let mut target = url.path().to_string();
    if target.is_empty() {
        target.push('/');
    }
    if let Some(q) = url.query() {
        target.push('?');
        target.push_str(q);
    }
    target
}

fn host_header(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

fn write_body<W: Write>(
    body: &mut Body,
    sink: W,
    progress: Progress,
    total: Option<u64>,
    buffer_size: usize,
) -> Result<W, WriteError> {
    let mut tracked = TrackedSink { inner: sink, failed: false };
    let result = {
        let mut writer = ProgressWriter::new(&mut tracked, progress, total);
        match body.write_to_buffered(&mut writer, buffer_size) {
            Ok(_) => writer.finish().map(|_| ()),
            Err(e) => Err(e),
        }
    };
    match result {
        Ok(()) => Ok(tracked.inner),
        Err(e) if tracked.failed => Err(WriteError::Socket(e)),
        Err(e) => Err(WriteError::Body(e)),
    }
}

impl HttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hook(hook: impl Hook + 'static) -> Self {
        Self {
            hook: Arc::new(hook),
            ..Self::default()
        }
    }

    /// Send PATCH as POST with `X-HTTP-Method-Override: PATCH` (on by default).
    pub fn method_override(mut self, enabled: bool) -> Self {
        self.method_override = enabled;
        self
    }

    fn failed(&self, request: &Request, url: &Url, error: io::Error) -> FuelError {
        tracing::warn!(url = %url, error = %error, "HTTP exchange failed");
        self.hook.http_exchange_failed(request, &error);
        FuelError::transport(error, Response::error(url.clone()))
    }

    fn write_request(
        &self,
        stream: &mut HttpStream,
        request: &mut Request,
        url: &Url,
        method: Method,
        with_body: bool,
        options: &ExecutionOptions,
    ) -> Result<(), WriteError> {
        let decode = options.decode_content.unwrap_or(true);
        let (wire_method, overridden) = if method == Method::Patch && self.method_override {
            (Method::Post, Some(method))
        } else {
            (method, None)
        };
        let send = with_body
            && (method.allows_body()
                || (method == Method::Delete && !request.get_body().is_empty()));
        let mut headers = request.headers().clone();
        headers.remove(CONTENT_LENGTH);
        headers.remove(TRANSFER_ENCODING);
        headers.set_if_absent(HOST, host_header(url));
        headers.set(CONNECTION, if decode { "TE, close" } else { "close" });
        if let Some(m) = overridden {
            headers.set(METHOD_OVERRIDE, m.as_str());
        }
        if options.use_http_cache == Some(false) {
            headers.set_if_absent(CACHE_CONTROL, "no-cache");
        }
        if decode {
            headers.set_if_absent(ACCEPT_TRANSFER_ENCODING, "gzip, deflate; q=0.5");
            headers.set_if_absent(ACCEPT_ENCODING, "gzip, deflate");
        }
        if !send {
            headers.remove(CONTENT_TYPE);
        }

        let body = request.body_mut();
        let length = if body.is_empty() { Some(0) } else { body.length() };
        if send {
            match length {
                Some(n) => headers.set(CONTENT_LENGTH, n.to_string()),
                None => headers.set(TRANSFER_ENCODING, "chunked"),
            }
        }

        let mut head = format!("{} {} HTTP/1.1\r\n", wire_method, request_target(url));
        for (name, value) in headers.wire_lines() {
            head.push_str(&format!("{}: {}\r\n", name, value));
        }
        head.push_str("\r\n");
        tracing::debug!(method = %wire_method, url = %url, length = ?length, "writing request");

        let mut out = BufWriter::with_capacity(options.buffer_size, stream);
        out.write_all(head.as_bytes()).map_err(WriteError::Socket)?;
        if send && !body.is_empty() {
            let progress = options.request_progress.clone();
            if length.is_some() {
                write_body(body, &mut out, progress, length, options.buffer_size)?;
            } else {
                let chunked = write_body(
                    body,
                    ChunkedWriter::new(&mut out),
                    progress,
                    None,
                    options.buffer_size,
                )?;
                chunked.finish().map_err(WriteError::Socket)?;
            }
        }
        out.flush().map_err(WriteError::Socket)?;
        Ok(())
    }

    fn exchange(
        &self,
        request: &mut Request,
        url: &Url,
        method: Method,
        with_body: bool,
    ) -> Result<Response, FuelError> {
        let options = request.options().clone();
        self.hook.pre_connect(request);
        tracing::debug!(url = %url, "connecting");
        let mut stream = net::connect(url, options.timeout, options.timeout_read, options.tls_config.clone())
            .map_err(|e| self.failed(request, url, e))?;
        options.cancel.register(stream.tcp());
        self.hook.post_connect(request);

        match self.write_request(&mut stream, request, url, method, with_body, &options) {
            Ok(()) => {}
            Err(WriteError::Body(e)) => {
                tracing::warn!(url = %url, error = %e, "reading request body failed");
                return Err(FuelError::resource(e, Response::error(url.clone())));
            }
            Err(WriteError::Socket(e)) => return Err(self.failed(request, url, e)),
        }

        let mut reader = H1Reader::new(stream, options.buffer_size);
        let head = reader.read_head().map_err(|e| self.failed(request, url, e))?;
        let mut headers = head.headers;
        let mode = h1::body_mode(method, head.code, &headers);
        let raw: Box<dyn Read + Send> = Box::new(reader.into_body(mode));
        let raw = self.hook.interpret_response_stream(request, raw);

        let (stream, decoded) = if options.decode_content.unwrap_or(true) {
            match encoding::decode(raw, &mut headers) {
                Ok(pair) => pair,
                Err(e) => {
                    let response = Response::new(url.clone(), Some(head.code), head.reason, headers, Body::empty());
                    return Err(FuelError::encoding(e, response));
                }
            }
        } else {
            (raw, false)
        };
        let length = match mode {
            _ if decoded => None,
            BodyMode::Empty => Some(0),
            BodyMode::Length(n) => Some(n),
            BodyMode::Chunked | BodyMode::UntilClose => None,
        };
        let stream = CancelAwareReader { inner: stream, cancel: options.cancel.clone() };
        let stream = ProgressReader::new(stream, options.response_progress.clone(), length);
        tracing::debug!(status = head.code, url = %url, "response head received");
        Ok(Response::new(url.clone(), Some(head.code), head.reason, headers, Body::from_reader(stream, length)))
    }
}

impl Client for HttpClient {
    fn execute_request(&self, request: &mut Request) -> Result<Response, FuelError> {
        let follow = request.options().allow_redirects.unwrap_or(true);
        let mut url = request.url().clone();
        let mut method = request.method();
        let mut with_body = true;
        for _ in 0..=MAX_REDIRECTS {
            let response = self.exchange(request, &url, method, with_body)?;
            if !follow {
                return Ok(response);
            }
            let target = match (response.status_code(), response.headers().last(LOCATION)) {
                (Some(code @ (301 | 302 | 303 | 307 | 308)), Some(location)) => {
                    url.join(location).ok().map(|next| (code, next))
                }
                _ => None,
            };
            let Some((code, next)) = target else {
                return Ok(response);
            };
            if code == 307 || code == 308 {
                let body = request.get_body();
                if with_body && !body.is_empty() && !body.is_repeatable() {
                    return Ok(response);
                }
            } else if method != Method::Head {
                method = Method::Get;
                with_body = false;
            }
            if next.origin() != url.origin() {
                let headers = request.headers_mut();
                headers.remove(AUTHORIZATION);
                headers.remove(COOKIE);
            }
            tracing::debug!(status = code, from = %url, to = %next, "following redirect");
            drop(response);
            url = next;
        }
        let error = io::Error::new(
            io::ErrorKind::Other,
            format!("too many redirects (max {})", MAX_REDIRECTS),
        );
        Err(self.failed(request, &url, error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader};
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    /// Serves one canned response; yields the request head it read.
    fn one_shot(response: &'static str) -> (Url, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = Url::parse(&format!("http://{}/path?q=1", listener.local_addr().unwrap())).unwrap();
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut head = String::new();
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                    break;
                }
                head.push_str(&line);
            }
            let length = head
                .lines()
                .find_map(|l| l.strip_prefix("Content-Length: "))
                .map_or(0, |n| n.trim().parse::<usize>().unwrap());
            let mut body = vec![0u8; length];
            reader.read_exact(&mut body).unwrap();
            (&stream).write_all(response.as_bytes()).unwrap();
            head
        });
        (url, handle)
    }

    #[derive(Default)]
    struct Counters {
        connects: AtomicUsize,
        interpreted: AtomicUsize,
    }

    struct CountingHook(Arc<Counters>);

    impl Hook for CountingHook {
        fn post_connect(&self, _request: &Request) {
            self.0.connects.fetch_add(1, Ordering::SeqCst);
        }

        fn interpret_response_stream(
            &self,
            _request: &Request,
            stream: Box<dyn Read + Send>,
        ) -> Box<dyn Read + Send> {
            self.0.interpreted.fetch_add(1, Ordering::SeqCst);
            stream
        }
    }

    #[test]
    fn target_and_host() {
        let url = Url::parse("http://example.test:8080").unwrap();
        assert_eq!(request_target(&url), "/");
        assert_eq!(host_header(&url), "example.test:8080");
        let url = Url::parse("https://example.test/a/b?x=1&y").unwrap();
        assert_eq!(request_target(&url), "/a/b?x=1&y");
        assert_eq!(host_header(&url), "example.test");
    }

    #[test]
    fn hook_sees_exchange_and_override_can_be_disabled() {
        let (url, server) = one_shot("HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok");
        let counters = Arc::new(Counters::default());
        let client = HttpClient::with_hook(CountingHook(counters.clone())).method_override(false);
        let mut request = Request::new(Method::Patch, url);
        let mut response = client.execute_request(&mut request).unwrap();
        assert_eq!(&response.data().unwrap()[..], b"ok");

        let head = server.join().unwrap();
        assert!(head.starts_with("PATCH /path?q=1 HTTP/1.1\r\n"), "{}", head);
        assert!(head.contains("Content-Length: 0\r\n"));
        assert!(!head.contains("X-HTTP-Method-Override"));
        assert_eq!(counters.connects.load(Ordering::SeqCst), 1);
        assert_eq!(counters.interpreted.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn head_only_failure_keeps_url() {
        let (url, server) = one_shot("not http at all\r\n\r\n");
        let mut request = Request::new(Method::Get, url.clone());
        let err = HttpClient::default().execute_request(&mut request).unwrap_err();
        server.join().unwrap();
        assert_eq!(err.kind(), crate::error::ErrorKind::Transport);
        assert_eq!(err.response().url(), &url);
        assert_eq!(err.response().status_code(), None);
    }

    #[test]
    fn empty_read_after_cancel_is_an_abort() {
        let cancel = CancelHandle::new();
        let mut reader = CancelAwareReader { inner: io::empty(), cancel: cancel.clone() };
        let mut buf = [0u8; 16];
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
        cancel.cancel();
        let err = reader.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionAborted);
    }

    #[test]
    fn get_never_carries_a_body() {
        let (url, server) = one_shot("HTTP/1.1 204 No Content\r\n\r\n");
        let mut request = Request::new(Method::Get, url).body_string("secret-body");
        HttpClient::default().execute_request(&mut request).unwrap();
        let head = server.join().unwrap();
        assert!(head.starts_with("GET "), "{}", head);
        assert!(!head.contains("Content-Length"), "{}", head);
        assert!(!head.contains("Content-Type"), "{}", head);
        assert!(!head.contains("Transfer-Encoding"), "{}", head);
    }

    #[test]
    fn delete_sends_an_explicit_body() {
        let (url, server) = one_shot("HTTP/1.1 204 No Content\r\n\r\n");
        let mut request = Request::new(Method::Delete, url).body_string("gone");
        HttpClient::default().execute_request(&mut request).unwrap();
        let head = server.join().unwrap();
        assert!(head.starts_with("DELETE "), "{}", head);
        assert!(head.contains("Content-Length: 4\r\n"), "{}", head);
    }

    #[test]
    fn cross_origin_redirect_drops_credentials() {
        let (target, second) = one_shot("HTTP/1.1 204 No Content\r\n\r\n");
        let reply = format!("HTTP/1.1 302 Found\r\nLocation: {}\r\nContent-Length: 0\r\n\r\n", target);
        let (url, first) = one_shot(Box::leak(reply.into_boxed_str()));
        let mut request = Request::new(Method::Get, url)
            .header(AUTHORIZATION, "Bearer t0ken")
            .header(COOKIE, "session=1");
        let response = HttpClient::default().execute_request(&mut request).unwrap();
        assert_eq!(response.status_code(), Some(204));
        let first = first.join().unwrap();
        assert!(first.contains("Authorization: Bearer t0ken\r\n"), "{}", first);
        let second = second.join().unwrap();
        assert!(!second.contains("Authorization"), "{}", second);
        assert!(!second.contains("Cookie"), "{}", second);
    }
}
