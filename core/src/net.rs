/*
 * net.rs
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

//! Socket and TLS helpers for the blocking transport: a connection is plain
//! TCP or rustls over TCP, and both present `Read + Write`.

use std::io::{self, Read, Write};
use std::net::{IpAddr, Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use rustls::pki_types::ServerName;
use rustls::{ClientConfig, ClientConnection, RootCertStore, StreamOwned};
use url::{Host, Url};

/// Build a root certificate store: platform native certs first, then webpki-roots as fallback.
fn build_root_store() -> RootCertStore {
    let mut root_store = RootCertStore::empty();
    if let Ok(certs) = rustls_native_certs::load_native_certs() {
        for cert in certs {
            let _ = root_store.add(cert);
        }
    }
    if root_store.is_empty() {
        root_store.roots = webpki_roots::TLS_SERVER_ROOTS.iter().cloned().collect();
    }
    root_store
}

static DEFAULT_CONFIG: OnceLock<Arc<ClientConfig>> = OnceLock::new();

/// Shared TLS client config (native + Mozilla roots, no client auth, ALPN http/1.1).
pub fn default_client_config() -> Arc<ClientConfig> {
    DEFAULT_CONFIG
        .get_or_init(|| {
            let mut config = ClientConfig::builder()
                .with_root_certificates(build_root_store())
                .with_no_client_auth();
            config.alpn_protocols = vec![b"http/1.1".to_vec()];
            Arc::new(config)
        })
        .clone()
}

/// Plain or TLS connection.
pub enum HttpStream {
    Plain(TcpStream),
    Tls(Box<StreamOwned<ClientConnection, TcpStream>>),
}

impl HttpStream {
    /// The underlying socket.
    pub fn tcp(&self) -> &TcpStream {
        match self {
            HttpStream::Plain(s) => s,
            HttpStream::Tls(s) => &s.sock,
        }
    }

    pub fn is_secure(&self) -> bool {
        matches!(self, HttpStream::Tls(_))
    }

    pub fn shutdown(&self) -> io::Result<()> {
        self.tcp().shutdown(Shutdown::Both)
    }
}

impl Read for HttpStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            HttpStream::Plain(s) => s.read(buf),
            HttpStream::Tls(s) => s.read(buf),
        }
    }
}

impl Write for HttpStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            HttpStream::Plain(s) => s.write(buf),
            HttpStream::Tls(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            HttpStream::Plain(s) => s.flush(),
            HttpStream::Tls(s) => s.flush(),
        }
    }
}

/// Host and port of an `http`/`https` URL.
pub fn host_and_port(url: &Url) -> io::Result<(String, u16)> {
    let host = match url.host() {
        Some(Host::Domain(d)) => d.to_string(),
        Some(Host::Ipv4(a)) => a.to_string(),
        Some(Host::Ipv6(a)) => a.to_string(),
        None => return Err(io::Error::new(io::ErrorKind::InvalidInput, "URL has no host")),
    };
    let port = url
        .port_or_known_default()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "URL has no port"))?;
    Ok((host, port))
}

fn optional(timeout: Duration) -> Option<Duration> {
    if timeout.is_zero() {
        None
    } else {
        Some(timeout)
    }
}

/// TCP connect trying each resolved address in turn.
pub fn connect_tcp(host: &str, port: u16, timeout: Duration) -> io::Result<TcpStream> {
    let addrs: Vec<SocketAddr> = match host.parse::<IpAddr>() {
        Ok(ip) => vec![SocketAddr::new(ip, port)],
        Err(_) => (host, port).to_socket_addrs()?.collect(),
    };
    let mut last_err = io::Error::new(io::ErrorKind::NotFound, format!("no addresses for {}", host));
    for addr in addrs {
        let attempt = match optional(timeout) {
            Some(t) => TcpStream::connect_timeout(&addr, t),
            None => TcpStream::connect(addr),
        };
        match attempt {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = e,
        }
    }
    Err(last_err)
}

/// Connect to the URL's origin, with TLS for `https`. Read and write
/// timeouts are applied to the socket.
pub fn connect(
    url: &Url,
    connect_timeout: Duration,
    io_timeout: Duration,
    tls_config: Option<Arc<ClientConfig>>,
) -> io::Result<HttpStream> {
    let secure = match url.scheme() {
        "http" => false,
        "https" => true,
        other => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unsupported scheme {}", other),
            ))
        }
    };
    let (host, port) = host_and_port(url)?;
    let tcp = connect_tcp(&host, port, connect_timeout)?;
    tcp.set_read_timeout(optional(io_timeout))?;
    tcp.set_write_timeout(optional(io_timeout))?;
    let _ = tcp.set_nodelay(true);
    if !secure {
        return Ok(HttpStream::Plain(tcp));
    }
    let server_name = ServerName::try_from(host)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "invalid host name"))?;
    let config = tls_config.unwrap_or_else(default_client_config);
    let conn = ClientConnection::new(config, server_name)
        .map_err(|e| io::Error::new(io::ErrorKind::ConnectionRefused, e))?;
    let mut tls = StreamOwned::new(conn, tcp);
    while tls.conn.is_handshaking() {
        tls.conn.complete_io(&mut tls.sock)?;
    }
    Ok(HttpStream::Tls(Box::new(tls)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn host_and_port_defaults() {
        let u = Url::parse("https://example.com/x").unwrap();
        assert_eq!(host_and_port(&u).unwrap(), ("example.com".to_string(), 443));
        let v6 = Url::parse("http://[::1]:8080/").unwrap();
        assert_eq!(host_and_port(&v6).unwrap(), ("::1".to_string(), 8080));
    }

    #[test]
    fn rejects_unknown_scheme() {
        let u = Url::parse("ftp://example.com/").unwrap();
        let err = connect(&u, Duration::from_secs(1), Duration::from_secs(1), None).err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn connects_plain() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let u = Url::parse(&format!("http://127.0.0.1:{}/", port)).unwrap();
        let stream = connect(&u, Duration::from_secs(1), Duration::from_secs(1), None).unwrap();
        assert!(!stream.is_secure());
        stream.shutdown().unwrap();
    }
}
