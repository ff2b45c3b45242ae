/*
 * deserializable.rs
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

//! Reducing a response body to a typed value.
//!
//! An adapter lists the representations it can consume, in order of
//! preference. Streaming attempts (raw stream, buffered reader) share one
//! reader over the body; the first to return a value wins. If none does, the
//! rest of the stream becomes the body again and the buffered attempts (bytes,
//! decoded text) run against it.

use std::any::type_name;
use std::io::{BufRead, BufReader, Read};

use crate::error::{BoxError, ErrorKind, FuelError, NoDeserializerError};
use crate::http::{Body, Response};
use crate::mime;

type Produced<T> = Result<Option<T>, BoxError>;

/// One way of producing a value. `Ok(None)` passes to the next attempt.
pub enum Attempt<'a, T> {
    Stream(Box<dyn FnOnce(&mut dyn Read) -> Produced<T> + 'a>),
    Reader(Box<dyn FnOnce(&mut dyn BufRead) -> Produced<T> + 'a>),
    Bytes(Box<dyn FnOnce(&[u8]) -> Produced<T> + 'a>),
    Text(Box<dyn FnOnce(&str) -> Produced<T> + 'a>),
}

impl<'a, T> Attempt<'a, T> {
    pub fn stream(f: impl FnOnce(&mut dyn Read) -> Produced<T> + 'a) -> Self {
        Attempt::Stream(Box::new(f))
    }

    pub fn reader(f: impl FnOnce(&mut dyn BufRead) -> Produced<T> + 'a) -> Self {
        Attempt::Reader(Box::new(f))
    }

    pub fn bytes(f: impl FnOnce(&[u8]) -> Produced<T> + 'a) -> Self {
        Attempt::Bytes(Box::new(f))
    }

    pub fn text(f: impl FnOnce(&str) -> Produced<T> + 'a) -> Self {
        Attempt::Text(Box::new(f))
    }

    fn is_streaming(&self) -> bool {
        matches!(self, Attempt::Stream(_) | Attempt::Reader(_))
    }
}

/// A response adapter.
pub trait Deserializable {
    type Output;

    /// Attempts in order of preference. An empty list fails every call.
    fn attempts(&self) -> Vec<Attempt<'_, Self::Output>>;
}

/// Run `deserializer` against the response body.
pub fn deserialize<D>(deserializer: &D, mut response: Response) -> Result<(Response, D::Output), FuelError>
where
    D: Deserializable + ?Sized,
{
    let attempts = deserializer.attempts();
    if attempts.is_empty() {
        return Err(FuelError::deserialization(
            NoDeserializerError(type_name::<D>()),
            response,
        ));
    }
    let (streaming, buffered): (Vec<_>, Vec<_>) =
        attempts.into_iter().partition(Attempt::is_streaming);

    if !streaming.is_empty() {
        let stream = match response.body_mut().to_stream() {
            Ok(stream) => stream,
            Err(e) => return Err(FuelError::transport(e, response)),
        };
        let mut reader = BufReader::new(stream);
        for attempt in streaming {
            let produced = match attempt {
                Attempt::Stream(f) => f(&mut reader),
                Attempt::Reader(f) => f(&mut reader),
                Attempt::Bytes(_) | Attempt::Text(_) => Ok(None),
            };
            match produced {
                Ok(Some(value)) => {
                    response.set_body(Body::from_reader(reader, None));
                    return Ok((response, value));
                }
                Ok(None) => {}
                Err(e) => return Err(FuelError::wrap(e, ErrorKind::Deserialization, response)),
            }
        }
        response.set_body(Body::from_reader(reader, None));
    }

    if !buffered.is_empty() {
        let bytes = match response.data() {
            Ok(bytes) => bytes,
            Err(e) => return Err(FuelError::transport(e, response)),
        };
        let mut text: Option<String> = None;
        for attempt in buffered {
            let produced = match attempt {
                Attempt::Bytes(f) => f(&bytes),
                Attempt::Text(f) => {
                    let text = text
                        .get_or_insert_with(|| mime::decode_text(&bytes, response.content_type()));
                    f(text)
                }
                Attempt::Stream(_) | Attempt::Reader(_) => Ok(None),
            };
            match produced {
                Ok(Some(value)) => return Ok((response, value)),
                Ok(None) => {}
                Err(e) => return Err(FuelError::wrap(e, ErrorKind::Deserialization, response)),
            }
        }
    }

    Err(FuelError::deserialization(
        NoDeserializerError(type_name::<D>()),
        response,
    ))
}

/// The raw body bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesDeserializer;

impl Deserializable for BytesDeserializer {
    type Output = Vec<u8>;

    fn attempts(&self) -> Vec<Attempt<'_, Vec<u8>>> {
        vec![Attempt::bytes(|b| Ok(Some(b.to_vec())))]
    }
}

/// The body as text. The charset comes from the Content-Type unless one is
/// forced; UTF-8 otherwise.
#[derive(Debug, Clone, Default)]
pub struct StringDeserializer {
    charset: Option<String>,
}

impl StringDeserializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_charset(charset: impl Into<String>) -> Self {
        Self { charset: Some(charset.into()) }
    }
}

impl Deserializable for StringDeserializer {
    type Output = String;

    fn attempts(&self) -> Vec<Attempt<'_, String>> {
        match &self.charset {
            Some(charset) => vec![Attempt::bytes(move |b| {
                Ok(Some(mime::decode_with_charset(b, Some(charset.as_str()))))
            })],
            None => vec![Attempt::text(|s| Ok(Some(s.to_string())))],
        }
    }
}

/// Produces `()` without reading; the body stays available on the response.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyDeserializer;

impl Deserializable for EmptyDeserializer {
    type Output = ();

    fn attempts(&self) -> Vec<Attempt<'_, ()>> {
        vec![Attempt::stream(|_| Ok(Some(())))]
    }
}
