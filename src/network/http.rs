use std::fs::{File, OpenOptions};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;

use super::dns::NameServerResolver;
use super::NetworkError;

/// Default timeout for HTTP requests in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 3000;

#[derive(Debug, Clone)]
pub struct HttpOptions {
    pub timeout: Duration,
    /// Sent as `User-Agent` when set; otherwise reqwest sends none.
    pub user_agent: Option<String>,
    /// Nameserver for hostname lookups; the system resolver when unset.
    pub dns: Option<SocketAddr>,
}

impl Default for HttpOptions {
    fn default() -> Self {
        HttpOptions {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            user_agent: None,
            dns: None,
        }
    }
}

fn fetch(url: &str, options: &HttpOptions) -> Result<Response, NetworkError> {
    let mut builder = Client::builder().timeout(options.timeout);
    if let Some(user_agent) = options.user_agent.as_deref().filter(|ua| !ua.is_empty()) {
        builder = builder.user_agent(user_agent);
    }
    if let Some(server) = options.dns {
        debug!("resolving through {}", server);
        builder = builder.dns_resolver(Arc::new(NameServerResolver::new(server, options.timeout)));
    }
    let client = builder.build().map_err(NetworkError::Client)?;

    debug!("GET {}", url);
    let response = client.get(url).send().map_err(|source| NetworkError::Request {
        url: url.to_string(),
        source,
    })?;
    if response.status() != StatusCode::OK {
        return Err(NetworkError::Status {
            url: url.to_string(),
            status: response.status(),
        });
    }
    Ok(response)
}

/// Download `url` into `path`, truncating any existing file
pub fn download_file(path: &Path, url: &str, options: &HttpOptions) -> Result<(), NetworkError> {
    let mut response = fetch(url, options)?;
    let io_error = |source: std::io::Error| NetworkError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file: File = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(io_error)?;
    let written = response.copy_to(&mut file).map_err(|source| NetworkError::Request {
        url: url.to_string(),
        source,
    })?;
    file.sync_all().map_err(io_error)?;

    info!("saved {} bytes from {} to {}", written, url, path.display());
    Ok(())
}

/// Fetch the raw body of `url`
pub fn get_raw_data(url: &str, options: &HttpOptions) -> Result<Vec<u8>, NetworkError> {
    let response = fetch(url, options)?;
    let body = response.bytes().map_err(|source| NetworkError::Request {
        url: url.to_string(),
        source,
    })?;
    Ok(body.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::{TcpListener, UdpSocket};
    use std::thread;

    /// Serves one request with `status` and `body`, returning the request's
    /// User-Agent header.
    fn serve_once(status: &'static str, body: &'static str) -> (String, thread::JoinHandle<Option<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/sub", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut user_agent = None;
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("user-agent") {
                        user_agent = Some(value.trim().to_string());
                    }
                }
            }
            write!(
                stream,
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            )
            .unwrap();
            user_agent
        });
        (url, handle)
    }

    #[test]
    fn test_get_raw_data_sends_user_agent() {
        let (url, handle) = serve_once("200 OK", "trojan://pw@a.com:443");
        let options = HttpOptions {
            user_agent: Some("shareurl-test".to_string()),
            ..Default::default()
        };
        let body = get_raw_data(&url, &options).unwrap();
        assert_eq!(body, b"trojan://pw@a.com:443");
        assert_eq!(handle.join().unwrap().as_deref(), Some("shareurl-test"));
    }

    #[test]
    fn test_download_file_rejects_bad_status() {
        let (url, handle) = serve_once("404 Not Found", "gone");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub.txt");
        let err = download_file(&path, &url, &HttpOptions::default()).unwrap_err();
        assert!(matches!(err, NetworkError::Status { status, .. } if status == StatusCode::NOT_FOUND));
        assert!(!path.exists());
        handle.join().unwrap();
    }

    #[test]
    fn test_download_file_writes_body() {
        let (url, handle) = serve_once("200 OK", "c3M6Ly8=");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub.txt");
        download_file(&path, &url, &HttpOptions::default()).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "c3M6Ly8=");
        handle.join().unwrap();
    }

    /// Answers `A` queries with 127.0.0.1 and any other query with no records,
    /// until it has been idle for a few seconds.
    fn serve_dns() -> SocketAddr {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        let addr = socket.local_addr().unwrap();
        socket.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        thread::spawn(move || {
            let mut buf = [0u8; 512];
            while let Ok((len, peer)) = socket.recv_from(&mut buf) {
                let query = &buf[..len];
                let mut end = 12;
                while query[end] != 0 {
                    end += query[end] as usize + 1;
                }
                let is_a = query[end + 1..end + 3] == [0, 1];
                end += 5;

                let mut reply = query[..2].to_vec();
                reply.extend_from_slice(&[0x81, 0x80, 0, 1, 0, u8::from(is_a), 0, 0, 0, 0]);
                reply.extend_from_slice(&query[12..end]);
                if is_a {
                    reply.extend_from_slice(&[0xc0, 0x0c, 0, 1, 0, 1, 0, 0, 0, 60, 0, 4, 127, 0, 0, 1]);
                }
                socket.send_to(&reply, peer).unwrap();
            }
        });
        addr
    }

    #[test]
    fn test_get_raw_data_resolves_through_nameserver() {
        let dns = serve_dns();
        let (url, handle) = serve_once("200 OK", "hy2://pw@a.com");
        let url = url.replace("127.0.0.1", "sub.shareurl.test");
        let options = HttpOptions {
            dns: Some(dns),
            ..Default::default()
        };
        assert_eq!(get_raw_data(&url, &options).unwrap(), b"hy2://pw@a.com");
        handle.join().unwrap();
    }
}
