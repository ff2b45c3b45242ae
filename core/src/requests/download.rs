/*
 * download.rs
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

//! Streaming a response body to a file or a caller-provided sink.
//!
//! The destination is resolved once the response head is known, so it can be
//! derived from headers. Copying runs as the last response transformer: a
//! response rejected by the validator never reaches the destination. On
//! success the response body is replaced by one that re-reads the written
//! content.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

use url::Url;

use crate::error::FuelError;
use crate::http::{Body, Request, Response, StreamFactory};

pub type FileDestination = Arc<dyn Fn(&Response, &Url) -> PathBuf + Send + Sync>;
pub type StreamDestination =
    Arc<dyn Fn(&Response, &Url) -> io::Result<(Box<dyn Write + Send>, StreamFactory)> + Send + Sync>;

#[derive(Clone)]
pub enum Destination {
    File(FileDestination),
    /// A sink to write to, plus a factory re-opening the written content.
    Stream(StreamDestination),
}

/// Download state attached to a request.
#[derive(Default)]
pub struct Download {
    destination: Option<Destination>,
}

impl Download {
    /// Attach download state to `request`, or return the state already there.
    pub fn enable_for(request: &mut Request) -> &mut Download {
        if request.download.is_none() {
            request.options.add_response_transformer(transfer);
        }
        request.download.get_or_insert_with(Download::default)
    }

    pub fn destination(&self) -> Option<&Destination> {
        self.destination.as_ref()
    }

    pub fn set_destination(&mut self, destination: Destination) -> &mut Self {
        self.destination = Some(destination);
        self
    }
}

impl fmt::Debug for Download {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let destination = match &self.destination {
            Some(Destination::File(_)) => "file",
            Some(Destination::Stream(_)) => "stream",
            None => "none",
        };
        f.debug_struct("Download").field("destination", &destination).finish()
    }
}

enum Reopen {
    File(PathBuf),
    Factory(StreamFactory),
}

fn transfer(request: &Request, mut response: Response) -> Result<Response, FuelError> {
    let Some(destination) = request.download.as_ref().and_then(|d| d.destination.clone()) else {
        return Ok(response);
    };
    let url = response.url().clone();
    let (mut sink, reopen): (Box<dyn Write + Send>, Reopen) = match destination {
        Destination::File(resolve) => {
            let path = resolve(&response, &url);
            match File::create(&path) {
                Ok(file) => (Box::new(file), Reopen::File(path)),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "cannot open download destination");
                    return Err(FuelError::resource(e, response.snapshot()));
                }
            }
        }
        Destination::Stream(open) => match open(&response, &url) {
            Ok((sink, factory)) => (sink, Reopen::Factory(factory)),
            Err(e) => return Err(FuelError::resource(e, response.snapshot())),
        },
    };

    let options = request.options();
    let copied = copy(response.body_mut(), &mut sink, options.buffer_size.max(1));
    drop(sink);
    let written = match copied {
        Ok(n) => n,
        Err(Failure::Read(e)) => {
            if let Reopen::File(path) = &reopen {
                if options.cancel.is_cancelled() {
                    let _ = fs::remove_file(path);
                }
            }
            return Err(FuelError::transport(e, response.snapshot()));
        }
        Err(Failure::Write(e)) => return Err(FuelError::resource(e, response.snapshot())),
    };
    tracing::debug!(url = %url, bytes = written, "download complete");

    let body = match reopen {
        Reopen::File(path) => Body::from_file(path),
        Reopen::Factory(factory) => {
            Body::from_factory(move || factory(), Some(written)).as_repeatable()
        }
    };
    response.set_body(body);
    Ok(response)
}

enum Failure {
    Read(io::Error),
    Write(io::Error),
}

fn copy(body: &mut Body, sink: &mut dyn Write, buffer_size: usize) -> Result<u64, Failure> {
    let mut stream = body.to_stream().map_err(Failure::Read)?;
    let mut buf = vec![0u8; buffer_size];
    let mut total = 0u64;
    loop {
        let n = match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Failure::Read(e)),
        };
        sink.write_all(&buf[..n]).map_err(Failure::Write)?;
        total += n as u64;
    }
    sink.flush().map_err(Failure::Write)?;
    Ok(total)
}

impl Request {
    /// Turn into a download. Calling it again is a no-op.
    pub fn download(mut self) -> Self {
        Download::enable_for(&mut self);
        self
    }

    /// Write the body to the file returned by `destination`.
    pub fn file_destination<F>(mut self, destination: F) -> Self
    where
        F: Fn(&Response, &Url) -> PathBuf + Send + Sync + 'static,
    {
        Download::enable_for(&mut self).set_destination(Destination::File(Arc::new(destination)));
        self
    }

    /// Write the body to a caller-provided sink. The returned factory
    /// re-opens what was written and backs the response body afterwards.
    pub fn stream_destination<F>(mut self, destination: F) -> Self
    where
        F: Fn(&Response, &Url) -> io::Result<(Box<dyn Write + Send>, StreamFactory)>
            + Send
            + Sync
            + 'static,
    {
        Download::enable_for(&mut self).set_destination(Destination::Stream(Arc::new(destination)));
        self
    }

    pub fn download_progress<F>(self, handler: F) -> Self
    where
        F: Fn(u64, u64) + Send + Sync + 'static,
    {
        self.response_progress(handler)
    }
}
