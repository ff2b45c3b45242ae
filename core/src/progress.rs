/*
 * progress.rs
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

//! Transfer progress: callbacks receive `(transferred, total)` after every
//! chunk and once more at end of stream. `total` is 0 when unknown.

use std::fmt;
use std::io::{self, Read, Write};
use std::sync::Arc;

pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

#[derive(Clone, Default)]
pub struct Progress {
    handlers: Vec<ProgressCallback>,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<F>(&mut self, handler: F)
    where
        F: Fn(u64, u64) + Send + Sync + 'static,
    {
        self.handlers.push(Arc::new(handler));
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn invoke(&self, transferred: u64, total: u64) {
        for h in &self.handlers {
            h(transferred, total);
        }
    }
}

impl fmt::Debug for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Progress({} handlers)", self.handlers.len())
    }
}

/// Reader that reports progress. The final callback fires at EOF with
/// `transferred == total` whenever the length was known and fully read.
pub struct ProgressReader<R> {
    inner: R,
    progress: Progress,
    total: u64,
    transferred: u64,
    finished: bool,
}

impl<R: Read> ProgressReader<R> {
    pub fn new(inner: R, progress: Progress, total: Option<u64>) -> Self {
        Self {
            inner,
            progress,
            total: total.unwrap_or(0),
            transferred: 0,
            finished: false,
        }
    }
}

impl<R: Read> Read for ProgressReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n == 0 {
            if !self.finished && !buf.is_empty() {
                self.finished = true;
                tracing::trace!(transferred = self.transferred, total = self.total, "stream finished");
                self.progress.invoke(self.transferred, self.total);
            }
        } else {
            self.transferred += n as u64;
            self.progress.invoke(self.transferred, self.total);
        }
        Ok(n)
    }
}

/// Writer that reports progress; call [`ProgressWriter::finish`] once the
/// last byte has been written.
pub struct ProgressWriter<W> {
    inner: W,
    progress: Progress,
    total: u64,
    transferred: u64,
}

impl<W: Write> ProgressWriter<W> {
    pub fn new(inner: W, progress: Progress, total: Option<u64>) -> Self {
        Self {
            inner,
            progress,
            total: total.unwrap_or(0),
            transferred: 0,
        }
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.inner.flush()?;
        self.progress.invoke(self.transferred, self.total);
        Ok(self.inner)
    }
}

impl<W: Write> Write for ProgressWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        if n > 0 {
            self.transferred += n as u64;
            self.progress.invoke(self.transferred, self.total);
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
