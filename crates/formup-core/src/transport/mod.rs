//! One HTTP exchange, behind a trait so the client can run against libcurl
//! in production and a recording mock in tests.
//!
//! Implementations are blocking; the client calls them from `spawn_blocking`.
//! They report the status as-is and leave 2xx checking to the caller.

mod libcurl;

pub use libcurl::CurlTransport;

use crate::error::UploadError;
use crate::form::MultipartBody;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    /// POST with a `multipart/form-data` body.
    PostForm(MultipartBody),
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::PostForm(_) => "POST",
        }
    }
}

/// Fully resolved request: absolute URL plus headers in send order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    /// First header named `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn form(&self) -> Option<&MultipartBody> {
        match &self.method {
            Method::PostForm(body) => Some(body),
            Method::Get => None,
        }
    }
}

/// One `Set-Cookie` value and the host of the response (hop) that sent it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HopCookie {
    pub host: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u32,
    /// Raw header lines of the final response, status line included.
    pub headers: Vec<String>,
    pub body: Vec<u8>,
    /// `Set-Cookie` values from every hop, redirects included, in arrival order.
    pub set_cookies: Vec<HopCookie>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Value of the first header line named `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find_map(|line| {
            let (k, v) = line.split_once(':')?;
            k.trim().eq_ignore_ascii_case(name).then(|| v.trim())
        })
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Performs one blocking HTTP exchange.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, UploadError>;
}
