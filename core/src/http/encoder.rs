/*
 * encoder.rs
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

//! Parameter placement. Runs on every executed request, ahead of the request
//! transformer, and is not part of the removable interceptor list.

use super::headers::CONTENT_TYPE;
use super::{Body, Request};
use crate::uri;

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Move parameters into the URL query or a form body.
///
/// - Upload requests keep their parameters; the multipart writer emits them.
/// - A body-allowing method with an empty body, and no Content-Type other
///   than form-urlencoded, gets an `application/x-www-form-urlencoded` body.
/// - Anything else has the parameters appended to the URL query.
///
/// The parameter list is empty afterward, except for uploads.
pub fn encode_parameters(mut request: Request) -> Request {
    let content_type = request.headers.last(CONTENT_TYPE).unwrap_or_default().to_string();
    if request.upload.is_some() || content_type.starts_with("multipart/form-data") {
        return request;
    }
    if request.parameters.is_empty() {
        return request;
    }
    let encoded = uri::encode_parameters(&request.parameters);
    request.parameters.clear();
    let form_compatible = content_type.trim().is_empty() || content_type.starts_with(FORM_URLENCODED);
    if request.method.allows_body() && request.body.is_empty() && form_compatible {
        request.headers.set(CONTENT_TYPE, FORM_URLENCODED);
        request.body = Body::from_string(encoded);
    } else {
        request.url = uri::append_query(&request.url, &encoded);
    }
    request
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Method, ParamValue};
    use url::Url;

    fn request(method: Method) -> Request {
        Request::new(method, Url::parse("http://h/p").unwrap()).parameter("foo", "bar")
    }

    #[test]
    fn get_parameters_go_to_query() {
        let r = encode_parameters(request(Method::Get).parameter("ids", vec!["1", "2"]));
        assert_eq!(r.url().as_str(), "http://h/p?foo=bar&ids[]=1&ids[]=2");
        assert!(r.parameters().is_empty());
        assert!(r.get_body().is_empty());
    }

    #[test]
    fn post_without_body_gets_form_body() {
        let mut r = encode_parameters(request(Method::Post));
        assert_eq!(r.url().as_str(), "http://h/p");
        assert_eq!(r.headers().last("Content-Type"), Some(FORM_URLENCODED));
        assert_eq!(&r.body_mut().to_bytes().unwrap()[..], b"foo=bar");
        assert!(r.parameters().is_empty());
    }

    #[test]
    fn post_with_body_uses_query() {
        let mut r = encode_parameters(request(Method::Put).body_string("payload"));
        assert_eq!(r.url().as_str(), "http://h/p?foo=bar");
        assert_eq!(&r.body_mut().to_bytes().unwrap()[..], b"payload");
    }

    #[test]
    fn post_with_other_content_type_uses_query() {
        let r = encode_parameters(request(Method::Post).header("Content-Type", "application/json"));
        assert_eq!(r.url().as_str(), "http://h/p?foo=bar");
        assert!(r.get_body().is_empty());
    }

    #[test]
    fn existing_query_is_extended() {
        let r = Request::new(Method::Get, Url::parse("http://h/p?a=1").unwrap())
            .parameter("flag", ParamValue::Null)
            .parameter("e", "");
        assert_eq!(encode_parameters(r).url().as_str(), "http://h/p?a=1&flag&e=");
    }

    #[test]
    fn multipart_parameters_are_untouched() {
        let r = request(Method::Post).header("Content-Type", "multipart/form-data; boundary=x");
        let r = encode_parameters(r);
        assert_eq!(r.parameters().len(), 1);
        assert_eq!(r.url().as_str(), "http://h/p");
    }
}
