/*
 * multipart.rs
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

//! `multipart/form-data` writer (RFC 7578). Form parameters are written first,
//! one part each, then the data parts in insertion order, then the closing
//! delimiter. Data parts are resolved once per body; the byte length is known
//! up front when every part reports a length.

use std::io::{self, Write};

use crate::requests::{DataPart, LazyDataPart};

/// Content type of parts produced from form parameters.
pub const FORM_PARAMETER_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

pub struct MultipartBody {
    boundary: String,
    parameters: Vec<(String, String)>,
    parts: Vec<LazyDataPart>,
    resolved: Option<Vec<DataPart>>,
}

impl MultipartBody {
    pub fn new(
        boundary: impl Into<String>,
        parameters: Vec<(String, String)>,
        parts: Vec<LazyDataPart>,
    ) -> Self {
        Self {
            boundary: boundary.into(),
            parameters,
            parts,
            resolved: None,
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    fn resolve(&mut self) -> io::Result<&mut Vec<DataPart>> {
        if self.resolved.is_none() {
            let parts = self
                .parts
                .iter()
                .map(|lazy| lazy())
                .collect::<io::Result<Vec<_>>>()?;
            self.resolved = Some(parts);
        }
        Ok(self.resolved.get_or_insert_with(Vec::new))
    }

    /// Total encoded length, or `None` when some part length is unknown.
    /// Resolves the data parts, so a missing file fails here.
    pub fn length(&mut self) -> io::Result<Option<u64>> {
        let boundary = self.boundary.clone();
        let mut total: u64 = self
            .parameters
            .iter()
            .map(|(name, value)| {
                (part_header(&boundary, &form_disposition(name, None), FORM_PARAMETER_CONTENT_TYPE)
                    .len()
                    + value.len()
                    + 2) as u64
            })
            .sum();
        for part in self.resolve()?.iter() {
            let Some(len) = part.length()? else {
                return Ok(None);
            };
            let header = part_header(&boundary, &part.content_disposition(), part.content_type());
            total += header.len() as u64 + len + 2;
        }
        total += closing(&boundary).len() as u64;
        Ok(Some(total))
    }

    /// Write the whole body. Parts are consumed; a second write resolves the
    /// lazy parts again.
    pub fn write_to(&mut self, sink: &mut dyn Write) -> io::Result<u64> {
        let boundary = self.boundary.clone();
        let mut written = 0u64;
        for (name, value) in &self.parameters {
            let header = part_header(&boundary, &form_disposition(name, None), FORM_PARAMETER_CONTENT_TYPE);
            sink.write_all(header.as_bytes())?;
            sink.write_all(value.as_bytes())?;
            sink.write_all(b"\r\n")?;
            written += (header.len() + value.len() + 2) as u64;
        }
        self.resolve()?;
        let parts = self.resolved.take().unwrap_or_default();
        for mut part in parts {
            let header = part_header(&boundary, &part.content_disposition(), part.content_type());
            sink.write_all(header.as_bytes())?;
            written += header.len() as u64;
            written += part.write_to(sink)?;
            sink.write_all(b"\r\n")?;
            written += 2;
        }
        let end = closing(&boundary);
        sink.write_all(end.as_bytes())?;
        written += end.len() as u64;
        Ok(written)
    }
}

/// `form-data; name="..."[; filename="..."]` with quotes and backslashes escaped.
pub fn form_disposition(name: &str, filename: Option<&str>) -> String {
    let mut s = format!("form-data; name=\"{}\"", escape_quoted(name));
    if let Some(f) = filename {
        s.push_str(&format!("; filename=\"{}\"", escape_quoted(f)));
    }
    s
}

fn escape_quoted(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn part_header(boundary: &str, disposition: &str, content_type: &str) -> String {
    format!(
        "--{}\r\nContent-Disposition: {}\r\nContent-Type: {}\r\n\r\n",
        boundary, disposition, content_type
    )
}

fn closing(boundary: &str) -> String {
    format!("--{}--\r\n", boundary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requests::DataPart;
    use std::io::Cursor;
    use std::sync::Arc;

    fn inline(content: &'static str, name: &'static str) -> LazyDataPart {
        Arc::new(move || Ok(DataPart::inline(content, name)))
    }

    #[test]
    fn writes_parameters_then_parts_then_closing() {
        let mut body = MultipartBody::new(
            "xyz",
            vec![("foo".into(), "bar".into())],
            vec![inline("hello", "greeting")],
        );
        let expected_len = body.length().unwrap().unwrap();
        let mut out = Vec::new();
        let written = body.write_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(written, expected_len);
        assert_eq!(text.len() as u64, written);
        assert_eq!(
            text,
            "--xyz\r\nContent-Disposition: form-data; name=\"foo\"\r\n\
             Content-Type: text/plain; charset=utf-8\r\n\r\nbar\r\n\
             --xyz\r\nContent-Disposition: form-data; name=\"greeting\"\r\n\
             Content-Type: text/plain\r\n\r\nhello\r\n\
             --xyz--\r\n"
        );
    }

    #[test]
    fn unknown_part_length_gives_unknown_total() {
        let blob: LazyDataPart = Arc::new(|| {
            Ok(DataPart::blob(Cursor::new(b"abc".to_vec()), "b", None))
        });
        let mut body = MultipartBody::new("b", Vec::new(), vec![blob]);
        assert_eq!(body.length().unwrap(), None);
        let mut out = Vec::new();
        body.write_to(&mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().ends_with("abc\r\n--b--\r\n"));
    }

    #[test]
    fn disposition_escapes_quotes() {
        assert_eq!(
            form_disposition("a\"b", Some("f.txt")),
            "form-data; name=\"a\\\"b\"; filename=\"f.txt\""
        );
    }
}
