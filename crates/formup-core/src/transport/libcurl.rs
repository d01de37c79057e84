//! libcurl transport (easy interface). Multipart encoding is done by
//! libcurl's form API; only the empty body is framed by hand, since an empty
//! form would make libcurl drop the POST.

use curl::easy::{Easy, Form, List};
use std::time::{SystemTime, UNIX_EPOCH};
use url::Url;

use super::{HopCookie, HttpRequest, HttpResponse, Method, Transport};
use crate::config::FormupConfig;
use crate::error::UploadError;
use crate::form::{MultipartBody, PartContent};

/// Blocking libcurl transport. One `Easy` handle per request; no timeouts are set.
#[derive(Debug, Clone, Default)]
pub struct CurlTransport {
    user_agent: Option<String>,
    follow_redirects: bool,
}

impl CurlTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(cfg: &FormupConfig) -> Self {
        Self {
            user_agent: cfg.user_agent.clone(),
            follow_redirects: cfg.follow_redirects.unwrap_or(false),
        }
    }
}

impl Transport for CurlTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, UploadError> {
        let mut easy = Easy::new();
        easy.url(&request.url)?;
        if self.follow_redirects {
            easy.follow_location(true)?;
            easy.max_redirections(10)?;
        }
        if let Some(ua) = &self.user_agent {
            easy.useragent(ua)?;
        }

        let mut list = List::new();
        for (k, v) in &request.headers {
            list.append(&format!("{}: {}", k.trim(), v.trim()))?;
        }
        // No `Expect: 100-continue` round trip for large bodies.
        list.append("Expect:")?;

        match &request.method {
            Method::Get => easy.get(true)?,
            Method::PostForm(body) if body.is_empty() => {
                let boundary = empty_form_boundary();
                list.append(&format!(
                    "Content-Type: multipart/form-data; boundary={}",
                    boundary
                ))?;
                easy.post(true)?;
                easy.post_fields_copy(format!("--{}--\r\n", boundary).as_bytes())?;
            }
            Method::PostForm(body) => easy.httppost(build_form(body)?)?,
        }
        easy.http_headers(list)?;

        // One block per response: interim (100), each redirect hop, then the final one.
        let mut blocks: Vec<Vec<String>> = Vec::new();
        let mut body: Vec<u8> = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                push_header_line(&mut blocks, data);
                true
            })?;
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let status = easy.response_code()?;
        let effective_url = easy.effective_url()?.map(str::to_string);
        let (headers, set_cookies) = collect_hops(&request.url, effective_url.as_deref(), blocks);
        Ok(HttpResponse {
            status,
            headers,
            body,
            set_cookies,
        })
    }
}

/// Appends one raw header line, starting a new block at each status line.
/// Non-UTF-8 bytes (e.g. Latin-1 cookie values) are replaced, not dropped.
fn push_header_line(blocks: &mut Vec<Vec<String>>, data: &[u8]) {
    let raw = String::from_utf8_lossy(data);
    let line = raw.trim_end();
    if line.starts_with("HTTP/") || blocks.is_empty() {
        blocks.push(Vec::new());
    }
    if !line.is_empty() {
        if let Some(block) = blocks.last_mut() {
            block.push(line.to_string());
        }
    }
}

/// Walks the header blocks of one transfer, following `Location` from 3xx
/// hops to know which host sent each `Set-Cookie`. The last block is
/// attributed to libcurl's effective URL. Returns the final block's lines and
/// every cookie in arrival order.
fn collect_hops(
    request_url: &str,
    effective_url: Option<&str>,
    blocks: Vec<Vec<String>>,
) -> (Vec<String>, Vec<HopCookie>) {
    let mut current = Url::parse(request_url).ok();
    let last = blocks.len().saturating_sub(1);
    let mut cookies = Vec::new();
    let mut final_headers = Vec::new();

    for (i, block) in blocks.into_iter().enumerate() {
        if i == last {
            if let Some(u) = effective_url.and_then(|u| Url::parse(u).ok()) {
                current = Some(u);
            }
        }
        let host = current
            .as_ref()
            .and_then(|u| u.host_str())
            .unwrap_or_default()
            .to_string();
        for value in block.iter().filter_map(|l| header_value(l, "set-cookie")) {
            cookies.push(HopCookie {
                host: host.clone(),
                value: value.to_string(),
            });
        }

        if i == last {
            final_headers = block;
            break;
        }
        let redirected = block
            .first()
            .and_then(|l| l.split_whitespace().nth(1))
            .and_then(|code| code.parse::<u32>().ok())
            .is_some_and(|code| (300..400).contains(&code));
        if redirected {
            let next = block
                .iter()
                .find_map(|l| header_value(l, "location"))
                .and_then(|loc| current.as_ref()?.join(loc).ok());
            if next.is_some() {
                current = next;
            }
        }
    }

    (final_headers, cookies)
}

fn header_value<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let (k, v) = line.split_once(':')?;
    k.trim().eq_ignore_ascii_case(name).then(|| v.trim())
}

fn build_form(body: &MultipartBody) -> Result<Form, UploadError> {
    let mut form = Form::new();
    for part in body.parts() {
        match &part.content {
            PartContent::Text(text) => form.part(&part.name).contents(text.as_bytes()).add()?,
            PartContent::File {
                filename,
                content_type,
                bytes,
            } => form
                .part(&part.name)
                .buffer(filename, bytes.clone())
                .content_type(content_type)
                .add()?,
        }
    }
    Ok(form)
}

fn empty_form_boundary() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    format!("------------------------formup{:x}", nanos)
}
