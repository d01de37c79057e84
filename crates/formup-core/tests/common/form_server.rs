//! Minimal HTTP/1.1 server that records requests and decodes multipart bodies
//! for integration tests.
//!
//! Answers every request with a fixed status, optionally setting a cookie.
//! Paths listed in `redirects` answer 302 instead.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// `from` answers `302 Found` with `Location: to`, plus an optional `Set-Cookie`.
#[derive(Debug, Clone)]
pub struct Redirect {
    pub from: String,
    pub to: String,
    pub set_cookie: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FormServerOptions {
    pub status: u16,
    /// Raw `Set-Cookie` value added to every non-redirect response.
    pub set_cookie: Option<String>,
    pub redirects: Vec<Redirect>,
}

impl Default for FormServerOptions {
    fn default() -> Self {
        Self {
            status: 200,
            set_cookie: None,
            redirects: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedPart {
    pub name: String,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub parts: Vec<CapturedPart>,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn part_names(&self) -> Vec<&str> {
        self.parts.iter().map(|p| p.name.as_str()).collect()
    }
}

pub struct FormServer {
    /// Base URL, e.g. "http://127.0.0.1:12345/".
    pub url: String,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl FormServer {
    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.captured.lock().unwrap().clone()
    }
}

/// Starts a server answering 200 to everything.
pub fn start() -> FormServer {
    start_with_options(FormServerOptions::default())
}

/// Starts a server in a background thread. It runs until the process exits.
pub fn start_with_options(opts: FormServerOptions) -> FormServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let captured = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&captured);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let sink = Arc::clone(&sink);
            let opts = opts.clone();
            thread::spawn(move || handle(stream, &sink, &opts));
        }
    });
    FormServer {
        url: format!("http://127.0.0.1:{}/", port),
        captured,
    }
}

/// A URL on a port nothing listens on.
pub fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/upload/", port)
}

fn handle(mut stream: TcpStream, sink: &Mutex<Vec<CapturedRequest>>, opts: &FormServerOptions) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));

    let Some(request) = read_request(&mut stream) else {
        return;
    };
    let redirect = opts.redirects.iter().find(|r| r.from == request.path);
    sink.lock().unwrap().push(request);

    let body = b"ok";
    let (status, set_cookie, location) = match redirect {
        Some(r) => (
            302,
            r.set_cookie.as_ref(),
            format!("Location: {}\r\n", r.to),
        ),
        None => (opts.status, opts.set_cookie.as_ref(), String::new()),
    };
    let cookie = set_cookie
        .map(|c| format!("Set-Cookie: {}\r\n", c))
        .unwrap_or_default();
    let response = format!(
        "HTTP/1.1 {} Status\r\nContent-Length: {}\r\nConnection: close\r\n{}{}\r\n",
        status,
        body.len(),
        location,
        cookie
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(body);
}

fn read_request(stream: &mut TcpStream) -> Option<CapturedRequest> {
    let mut data = Vec::new();
    let mut buf = [0u8; 8192];
    let header_end = loop {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buf[..n]);
        if let Some(i) = find(&data, b"\r\n\r\n", 0) {
            break i;
        }
    };

    let head = std::str::from_utf8(&data[..header_end]).ok()?.to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    let body_start = header_end + 4;
    while data.len() < body_start + content_length {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
    }
    let body = &data[body_start..data.len().min(body_start + content_length)];

    let parts = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-type"))
        .and_then(|(_, ct)| parse_multipart(ct, body))
        .unwrap_or_default();

    Some(CapturedRequest {
        method,
        path,
        headers,
        parts,
    })
}

/// Splits a `multipart/form-data` body on its boundary.
fn parse_multipart(content_type: &str, body: &[u8]) -> Option<Vec<CapturedPart>> {
    let boundary = content_type
        .split(';')
        .find_map(|p| p.trim().strip_prefix("boundary="))?
        .trim_matches('"');
    let delim = format!("--{}", boundary).into_bytes();

    let mut parts = Vec::new();
    let mut pos = find(body, &delim, 0)? + delim.len();
    loop {
        if body[pos..].starts_with(b"--") {
            break;
        }
        pos += 2; // CRLF after the delimiter
        let next = find(body, &delim, pos)?;
        let section = &body[pos..next - 2];
        let split = find(section, b"\r\n\r\n", 0)?;
        let head = std::str::from_utf8(&section[..split]).ok()?;
        let content = section[split + 4..].to_vec();

        let mut name = None;
        let mut filename = None;
        let mut content_type = None;
        for line in head.split("\r\n") {
            let Some((k, v)) = line.split_once(':') else {
                continue;
            };
            if k.trim().eq_ignore_ascii_case("content-disposition") {
                for attr in v.split(';') {
                    if let Some((ak, av)) = attr.trim().split_once('=') {
                        let av = av.trim_matches('"').to_string();
                        match ak {
                            "name" => name = Some(av),
                            "filename" => filename = Some(av),
                            _ => {}
                        }
                    }
                }
            } else if k.trim().eq_ignore_ascii_case("content-type") {
                content_type = Some(v.trim().to_string());
            }
        }
        parts.push(CapturedPart {
            name: name?,
            filename,
            content_type,
            content,
        });
        pos = next + delim.len();
    }
    Some(parts)
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from > haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| i + from)
}
