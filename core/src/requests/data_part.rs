/*
 * data_part.rs
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

//! Upload parts: a file on disk, an arbitrary byte stream, or inline text.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::http::ByteStream;
use crate::mime::{self, multipart_disposition};

/// Deferred part: invoked when the multipart body is generated, so a missing
/// file surfaces at execution time.
pub type LazyDataPart = Arc<dyn Fn() -> io::Result<DataPart> + Send + Sync>;

pub enum DataPart {
    File {
        path: PathBuf,
        name: String,
        filename: Option<String>,
        content_type: String,
    },
    Blob {
        stream: ByteStream,
        name: String,
        filename: Option<String>,
        content_type: String,
        length: Option<u64>,
    },
    Inline {
        content: String,
        name: String,
        filename: Option<String>,
        content_type: String,
    },
}

impl DataPart {
    /// File part named after the file stem, with the file name as filename
    /// and a content type guessed from the extension.
    pub fn file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let filename = path.file_name().map(|s| s.to_string_lossy().into_owned());
        let content_type = mime::guess_content_type(&path).to_string();
        DataPart::File {
            path,
            name,
            filename,
            content_type,
        }
    }

    pub fn blob(stream: impl Read + Send + 'static, name: impl Into<String>, length: Option<u64>) -> Self {
        DataPart::Blob {
            stream: ByteStream::new(stream),
            name: name.into(),
            filename: None,
            content_type: "application/octet-stream".to_string(),
            length,
        }
    }

    pub fn inline(content: impl Into<String>, name: impl Into<String>) -> Self {
        DataPart::Inline {
            content: content.into(),
            name: name.into(),
            filename: None,
            content_type: "text/plain".to_string(),
        }
    }

    pub fn with_name(mut self, value: impl Into<String>) -> Self {
        *self.name_mut() = value.into();
        self
    }

    pub fn with_filename(mut self, value: impl Into<String>) -> Self {
        match &mut self {
            DataPart::File { filename, .. }
            | DataPart::Blob { filename, .. }
            | DataPart::Inline { filename, .. } => *filename = Some(value.into()),
        }
        self
    }

    pub fn with_content_type(mut self, value: impl Into<String>) -> Self {
        match &mut self {
            DataPart::File { content_type, .. }
            | DataPart::Blob { content_type, .. }
            | DataPart::Inline { content_type, .. } => *content_type = value.into(),
        }
        self
    }

    fn name_mut(&mut self) -> &mut String {
        match self {
            DataPart::File { name, .. } | DataPart::Blob { name, .. } | DataPart::Inline { name, .. } => name,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            DataPart::File { name, .. } | DataPart::Blob { name, .. } | DataPart::Inline { name, .. } => name,
        }
    }

    pub fn filename(&self) -> Option<&str> {
        match self {
            DataPart::File { filename, .. }
            | DataPart::Blob { filename, .. }
            | DataPart::Inline { filename, .. } => filename.as_deref(),
        }
    }

    pub fn content_type(&self) -> &str {
        match self {
            DataPart::File { content_type, .. }
            | DataPart::Blob { content_type, .. }
            | DataPart::Inline { content_type, .. } => content_type,
        }
    }

    pub fn content_disposition(&self) -> String {
        multipart_disposition(self.name(), self.filename())
    }

    /// Byte length when known. Fails for a file that cannot be inspected.
    pub fn length(&self) -> io::Result<Option<u64>> {
        match self {
            DataPart::File { path, .. } => Ok(Some(fs::metadata(path)?.len())),
            DataPart::Blob { length, .. } => Ok(*length),
            DataPart::Inline { content, .. } => Ok(Some(content.len() as u64)),
        }
    }

    pub fn write_to(&mut self, sink: &mut dyn Write) -> io::Result<u64> {
        match self {
            DataPart::File { path, .. } => {
                let mut file = File::open(path)?;
                io::copy(&mut file, sink)
            }
            DataPart::Blob { stream, .. } => io::copy(stream, sink),
            DataPart::Inline { content, .. } => {
                sink.write_all(content.as_bytes())?;
                Ok(content.len() as u64)
            }
        }
    }

    /// Wrap an eager part for the lazy list. A blob can be yielded once.
    pub(crate) fn into_lazy(self) -> LazyDataPart {
        let slot = Mutex::new(Some(self));
        Arc::new(move || {
            let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
            let part = guard
                .take()
                .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "data part already consumed"))?;
            match part.shallow_copy() {
                Some(copy) => {
                    *guard = Some(part);
                    Ok(copy)
                }
                None => Ok(part),
            }
        })
    }

    fn shallow_copy(&self) -> Option<DataPart> {
        match self {
            DataPart::File { path, name, filename, content_type } => Some(DataPart::File {
                path: path.clone(),
                name: name.clone(),
                filename: filename.clone(),
                content_type: content_type.clone(),
            }),
            DataPart::Inline { content, name, filename, content_type } => Some(DataPart::Inline {
                content: content.clone(),
                name: name.clone(),
                filename: filename.clone(),
                content_type: content_type.clone(),
            }),
            DataPart::Blob { .. } => None,
        }
    }
}

impl std::fmt::Debug for DataPart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataPart")
            .field("name", &self.name())
            .field("filename", &self.filename())
            .field("content_type", &self.content_type())
            .finish()
    }
}
