/*
 * upload_download.rs
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

mod common;

use std::fs;
use std::io::{self, Cursor, Read, Write};
use std::sync::{Arc, Mutex};

use common::{json, MockServer, Reply};
use fuel_core::http::StreamFactory;
use fuel_core::{BytesDeserializer, DataPart, ErrorKind, Manager, StringDeserializer};

fn payload(n: usize) -> Vec<u8> {
    (0..n).map(|i| (i % 251) as u8).collect()
}

fn file_server(size: usize) -> MockServer {
    let data = payload(size);
    MockServer::start(move |r| match r.path.as_str() {
        "/missing" => Reply::not_found().body("no such file"),
        "/file" => Reply::ok()
            .header("Content-Type", "application/octet-stream")
            .body(data.clone()),
        _ => Reply::reflect(r),
    })
}

fn manager(server: &MockServer) -> Manager {
    Manager::builder().base_path(server.base()).build()
}

#[tokio::test]
async fn multipart_with_repeated_field_names() {
    let server = MockServer::reflecting();
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("lorem.txt");
    let second = dir.path().join("ipsum.txt");
    fs::write(&first, "first file").unwrap();
    fs::write(&second, "second file").unwrap();

    let text = manager(&server)
        .upload("upload")
        .unwrap()
        .parameter("title", "two files")
        .add_data_part(DataPart::file(&first).with_name("file"))
        .add_data_part(DataPart::file(&second).with_name("file"))
        .await_object(StringDeserializer::new())
        .await
        .unwrap();
    let echo = json(&text);
    let body = echo["body"].as_str().unwrap();
    assert_eq!(body.matches("Content-Disposition: form-data; name=\"file\"").count(), 2);
    assert!(body.contains("filename=\"lorem.txt\""));
    assert!(body.contains("filename=\"ipsum.txt\""));
    assert!(body.contains("Content-Disposition: form-data; name=\"title\""));
    assert!(!body.contains("multipart/mixed"));
    assert!(body.contains("first file") && body.contains("second file"));

    let content_type = echo["headers"]["content-type"].as_str().unwrap();
    assert!(content_type.starts_with("multipart/form-data; boundary="));
    let boundary = content_type.split("boundary=").nth(1).unwrap();
    assert!(body.ends_with(&format!("--{}--\r\n", boundary)));
    assert_eq!(
        echo["headers"]["content-length"].as_str().unwrap(),
        body.len().to_string()
    );
}

#[tokio::test]
async fn missing_upload_file_is_resource_error() {
    let server = MockServer::reflecting();
    let dir = tempfile::tempdir().unwrap();
    let (response, result) = manager(&server)
        .upload("upload")
        .unwrap()
        .add_data_part(DataPart::file(dir.path().join("not-there.txt")))
        .response_string()
        .await;
    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Resource);
    assert_eq!(err.io_error().unwrap().kind(), io::ErrorKind::NotFound);
    assert_eq!(response.status_code(), None);
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn lazy_part_is_resolved_at_execution() {
    let server = MockServer::reflecting();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("later.csv");
    let part_path = path.clone();
    let request = manager(&server)
        .upload("upload")
        .unwrap()
        .add_lazy_data_part(move || Ok(DataPart::file(&part_path)));
    fs::write(&path, "a,b\n1,2\n").unwrap();
    let text = request.await_object(StringDeserializer::new()).await.unwrap();
    let body = json(&text)["body"].as_str().unwrap().to_string();
    assert!(body.contains("name=\"later\"; filename=\"later.csv\""));
    assert!(body.contains("Content-Type: text/csv"));
    assert!(body.contains("a,b\n1,2\n"));
}

#[tokio::test]
async fn blob_and_inline_parts_with_progress() {
    let server = MockServer::reflecting();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let progress = seen.clone();
    let text = manager(&server)
        .upload("upload")
        .unwrap()
        .add_data_part(DataPart::blob(Cursor::new(b"blob bytes".to_vec()), "blob", Some(10)))
        .add_data_part(DataPart::inline("inline text", "note"))
        .upload_progress(move |n, total| progress.lock().unwrap().push((n, total)))
        .await_object(StringDeserializer::new())
        .await
        .unwrap();
    let body = json(&text)["body"].as_str().unwrap().to_string();
    assert!(body.contains("name=\"blob\"\r\nContent-Type: application/octet-stream\r\n\r\nblob bytes\r\n"));
    assert!(body.contains("name=\"note\"\r\nContent-Type: text/plain\r\n\r\ninline text\r\n"));

    let seen = seen.lock().unwrap();
    let &(last, total) = seen.last().unwrap();
    assert_eq!(last, total);
    assert_eq!(total, body.len() as u64);
}

#[tokio::test]
async fn download_to_file_with_progress() {
    let size = 100_000;
    let server = file_server(size);
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("download.bin");
    let path = target.clone();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let progress = seen.clone();

    let (response, result) = manager(&server)
        .download("file")
        .unwrap()
        .file_destination(move |_, _| path.clone())
        .download_progress(move |n, total| progress.lock().unwrap().push((n, total)))
        .response_bytes()
        .await;
    assert_eq!(response.status_code(), Some(200));
    assert_eq!(result.unwrap(), payload(size));
    assert_eq!(fs::read(&target).unwrap(), payload(size));

    let seen = seen.lock().unwrap();
    assert!(seen.len() > 1);
    assert_eq!(*seen.last().unwrap(), (size as u64, size as u64));
    assert!(seen.windows(2).all(|w| w[0].0 <= w[1].0));
}

#[tokio::test]
async fn download_destination_from_headers() {
    let server = file_server(10);
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_path_buf();
    manager(&server)
        .download("file")
        .unwrap()
        .file_destination(move |response, url| {
            let ext = match response.content_type() {
                Some("application/octet-stream") => "bin",
                _ => "dat",
            };
            let name = url.path_segments().and_then(|s| s.last()).unwrap_or("x");
            root.join(format!("{}.{}", name, ext))
        })
        .response()
        .await
        .unwrap();
    assert_eq!(fs::read(dir.path().join("file.bin")).unwrap(), payload(10));
}

#[tokio::test]
async fn download_not_found_writes_nothing() {
    let server = file_server(10);
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("never.bin");
    let path = target.clone();
    let (response, result) = manager(&server)
        .download("missing")
        .unwrap()
        .file_destination(move |_, _| path.clone())
        .response_bytes()
        .await;
    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(response.status_code(), Some(404));
    assert_eq!(&err.error_data()[..], b"no such file");
    assert!(!target.exists());
}

#[tokio::test]
async fn download_to_invalid_destination() {
    let server = file_server(10);
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("no").join("such").join("dir.bin");
    let (response, result) = manager(&server)
        .download("file")
        .unwrap()
        .file_destination(move |_, _| target.clone())
        .response_bytes()
        .await;
    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Resource);
    assert!(err.io_error().is_some());
    assert_eq!(response.status_code(), Some(200));
}

struct SharedSink(Arc<Mutex<Vec<u8>>>);

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn download_to_stream() {
    let server = file_server(4096);
    let store = Arc::new(Mutex::new(Vec::new()));
    let sink_store = store.clone();
    let (_, result) = manager(&server)
        .download("file")
        .unwrap()
        .stream_destination(move |_, _| {
            let reopen = sink_store.clone();
            let factory: StreamFactory = Arc::new(move || {
                let data = reopen.lock().unwrap().clone();
                Ok(Box::new(Cursor::new(data)) as Box<dyn Read + Send>)
            });
            Ok((Box::new(SharedSink(sink_store.clone())) as Box<dyn Write + Send>, factory))
        })
        .response_object(BytesDeserializer)
        .await;
    assert_eq!(result.unwrap(), payload(4096));
    assert_eq!(*store.lock().unwrap(), payload(4096));
}
