/*
 * upload.rs
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

//! Multipart upload state attached to a request.

use std::fmt;
use std::io;

use super::data_part::{DataPart, LazyDataPart};
use crate::http::headers::{Headers, CONTENT_TYPE};
use crate::http::{Body, Request};
use crate::mime;

/// Queued parts of a multipart upload. Parts are produced at write time.
#[derive(Default)]
pub struct Upload {
    parts: Vec<LazyDataPart>,
}

impl Upload {
    /// Attach upload state to `request`, or return the state already there.
    ///
    /// Attaching replaces the body with a multipart generator and makes sure
    /// the Content-Type is `multipart/form-data` with a boundary.
    pub fn enable_for(request: &mut Request) -> &mut Upload {
        if request.upload.is_none() {
            request.body = Body::pending_multipart();
            ensure_boundary(&mut request.headers);
            tracing::debug!(url = %request.url, "request promoted to upload");
        }
        request.upload.get_or_insert_with(Upload::default)
    }

    pub fn parts(&self) -> &[LazyDataPart] {
        &self.parts
    }

    pub fn add(&mut self, part: DataPart) -> &mut Self {
        self.parts.push(part.into_lazy());
        self
    }

    /// Queue a part produced only when the body is written.
    pub fn add_lazy<F>(&mut self, part: F) -> &mut Self
    where
        F: Fn() -> io::Result<DataPart> + Send + Sync + 'static,
    {
        self.parts.push(std::sync::Arc::new(part));
        self
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl fmt::Debug for Upload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Upload").field("parts", &self.parts.len()).finish()
    }
}

/// Replace the Content-Type unless it is already form-data with a boundary.
/// A boundary that is present but malformed is kept and rejected at write time.
fn ensure_boundary(headers: &mut Headers) {
    let keep = headers
        .last(CONTENT_TYPE)
        .and_then(mime::parse_content_type)
        .is_some_and(|ct| ct.is_mime_type("multipart", "form-data") && ct.has_parameter("boundary"));
    if !keep {
        headers.set(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", mime::random_boundary()),
        );
    }
}

impl Request {
    /// Promote to a multipart upload. Calling it again is a no-op.
    pub fn upload(mut self) -> Self {
        Upload::enable_for(&mut self);
        self
    }

    pub fn add_data_part(mut self, part: DataPart) -> Self {
        Upload::enable_for(&mut self).add(part);
        self
    }

    pub fn add_data_parts(mut self, parts: impl IntoIterator<Item = DataPart>) -> Self {
        let upload = Upload::enable_for(&mut self);
        for part in parts {
            upload.add(part);
        }
        self
    }

    /// Queue a part whose source is resolved at write time, so a file that
    /// does not exist yet is only looked up when the request executes.
    pub fn add_lazy_data_part<F>(mut self, part: F) -> Self
    where
        F: Fn() -> io::Result<DataPart> + Send + Sync + 'static,
    {
        Upload::enable_for(&mut self).add_lazy(part);
        self
    }

    pub fn upload_progress<F>(self, handler: F) -> Self
    where
        F: Fn(u64, u64) + Send + Sync + 'static,
    {
        self.request_progress(handler)
    }
}
