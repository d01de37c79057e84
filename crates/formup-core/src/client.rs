//! Shared upload client.
//!
//! [`UploadClient::upload`] turns an [`UploadRequest`] into one multipart POST.
//! The client is built explicitly and passed around (clones share the cookie
//! jar and transport). Every request carries the jar's cookies for the
//! destination host, plus the CSRF header mirrored from the CSRF cookie.

use std::sync::{Arc, Mutex, MutexGuard};

use url::Url;

use crate::config::{FormupConfig, XsrfConfig};
use crate::cookies::CookieJar;
use crate::error::UploadError;
use crate::form::{MultipartBody, UploadRequest};
use crate::transport::{CurlTransport, HttpRequest, HttpResponse, Method, Transport};

#[derive(Clone)]
pub struct UploadClient {
    base_url: Option<Url>,
    xsrf: XsrfConfig,
    transport: Arc<dyn Transport>,
    jar: Arc<Mutex<CookieJar>>,
}

impl std::fmt::Debug for UploadClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadClient")
            .field("base_url", &self.base_url.as_ref().map(Url::as_str))
            .field("xsrf", &self.xsrf)
            .finish_non_exhaustive()
    }
}

impl UploadClient {
    /// Client over an arbitrary transport. An unparseable `base_url` disables
    /// relative addresses rather than failing construction.
    pub fn new(cfg: &FormupConfig, transport: Arc<dyn Transport>) -> Self {
        let base_url = match Url::parse(&cfg.base_url) {
            Ok(u) => Some(u),
            Err(e) => {
                tracing::warn!("ignoring base_url {:?}: {}", cfg.base_url, e);
                None
            }
        };
        Self {
            base_url,
            xsrf: cfg.xsrf.clone(),
            transport,
            jar: Arc::new(Mutex::new(CookieJar::new())),
        }
    }

    /// Client over libcurl.
    pub fn from_config(cfg: &FormupConfig) -> Self {
        Self::new(cfg, Arc::new(CurlTransport::from_config(cfg)))
    }

    /// POSTs `fields` to `address` as `multipart/form-data`.
    ///
    /// Returns the response for 2xx; any other status comes back as
    /// [`UploadError::Status`] and libcurl failures as [`UploadError::Transport`].
    /// No retry and no timeout.
    pub async fn upload(
        &self,
        address: &str,
        fields: UploadRequest,
    ) -> Result<HttpResponse, UploadError> {
        let url = self.resolve(address)?;
        let body = MultipartBody::from_request(fields);
        tracing::debug!(
            "upload {} parts={} payload_bytes={}",
            url,
            body.len(),
            body.payload_len()
        );
        self.execute(url, Method::PostForm(body)).await
    }

    /// Plain GET through the same cookie/CSRF pipeline. Useful to let the server
    /// set the CSRF cookie before uploading.
    pub async fn get(&self, address: &str) -> Result<HttpResponse, UploadError> {
        let url = self.resolve(address)?;
        tracing::debug!("get {}", url);
        self.execute(url, Method::Get).await
    }

    /// Seeds a cookie for `host` (e.g. a token obtained out of band).
    pub fn set_cookie(&self, host: &str, name: &str, value: &str) {
        self.jar().set(host, name, value);
    }

    pub fn cookie(&self, host: &str, name: &str) -> Option<String> {
        self.jar().get(host, name).map(str::to_string)
    }

    /// Current CSRF token for `host`, if the jar holds one.
    pub fn csrf_token(&self, host: &str) -> Option<String> {
        self.cookie(host, &self.xsrf.cookie_name)
    }

    /// Absolute URL for `address`: used as-is when absolute, else joined onto `base_url`.
    /// Only `http` and `https` are accepted.
    pub fn resolve(&self, address: &str) -> Result<Url, UploadError> {
        let invalid = |reason: String| UploadError::InvalidUrl {
            address: address.to_string(),
            reason,
        };
        let url = match Url::parse(address) {
            Ok(u) => u,
            Err(url::ParseError::RelativeUrlWithoutBase) => match &self.base_url {
                Some(base) => base.join(address).map_err(|e| invalid(e.to_string()))?,
                None => return Err(invalid("relative address without base_url".to_string())),
            },
            Err(e) => return Err(invalid(e.to_string())),
        };
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(invalid(format!("unsupported scheme {:?}", other))),
        }
    }

    async fn execute(&self, url: Url, method: Method) -> Result<HttpResponse, UploadError> {
        let host = url.host_str().unwrap_or_default().to_string();
        let request = HttpRequest {
            method,
            headers: self.request_headers(&host),
            url: url.into(),
        };

        let transport = Arc::clone(&self.transport);
        let response = tokio::task::spawn_blocking(move || transport.send(&request)).await??;

        {
            let mut jar = self.jar();
            for cookie in &response.set_cookies {
                if jar.store_set_cookie(&cookie.host, &cookie.value) {
                    tracing::debug!("cookie update from {}", cookie.host);
                }
            }
        }

        if !response.is_success() {
            return Err(UploadError::Status {
                code: response.status,
                body: response.body,
            });
        }
        Ok(response)
    }

    fn request_headers(&self, host: &str) -> Vec<(String, String)> {
        let jar = self.jar();
        let mut headers = Vec::new();
        if let Some(cookie) = jar.header_for(host) {
            headers.push(("Cookie".to_string(), cookie));
        }
        if let Some(token) = jar.get(host, &self.xsrf.cookie_name) {
            headers.push((self.xsrf.header_name.clone(), token.to_string()));
        }
        headers
    }

    fn jar(&self) -> MutexGuard<'_, CookieJar> {
        // Poison is ignored: every jar update is a single insert or remove.
        self.jar.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
