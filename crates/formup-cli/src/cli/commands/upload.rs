//! `formup upload <address>` – build fields from arguments and POST them.

use anyhow::{bail, Context, Result};
use formup_core::config::FormupConfig;
use formup_core::{Blob, UploadClient, UploadRequest};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct UploadArgs {
    pub address: String,
    pub fields: Vec<String>,
    pub files: Vec<String>,
    pub json: Option<PathBuf>,
    pub cookies: Vec<String>,
    pub prime: Option<String>,
}

pub async fn run_upload(cfg: &FormupConfig, args: &UploadArgs) -> Result<()> {
    let request = build_request(args)?;
    let client = UploadClient::from_config(cfg);

    let url = client.resolve(&args.address)?;
    let host = url.host_str().unwrap_or_default();
    for raw in &args.cookies {
        let (name, value) = split_pair(raw, "--cookie")?;
        client.set_cookie(host, name, value);
    }

    if let Some(prime) = &args.prime {
        client
            .get(prime)
            .await
            .with_context(|| format!("prime GET {}", prime))?;
        if client.csrf_token(host).is_none() {
            tracing::warn!("prime GET {} did not set {}", prime, cfg.xsrf.cookie_name);
        }
    }

    let parts = request.len();
    let response = client
        .upload(url.as_str(), request)
        .await
        .with_context(|| format!("upload to {}", url))?;
    tracing::info!("uploaded {} field(s) to {} -> HTTP {}", parts, url, response.status);

    println!("HTTP {}", response.status);
    let text = response.text();
    if !text.is_empty() {
        println!("{}", text);
    }
    Ok(())
}

/// Assembles fields in order: JSON members, then `-f` pairs, then `-F` files.
pub fn build_request(args: &UploadArgs) -> Result<UploadRequest> {
    let mut request = match &args.json {
        Some(path) => {
            let data =
                fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
            let value: serde_json::Value =
                serde_json::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
            UploadRequest::from_json(&value)?
        }
        None => UploadRequest::new(),
    };

    for raw in &args.fields {
        let (name, value) = split_pair(raw, "--field")?;
        request.insert(name, value);
    }

    for raw in &args.files {
        let (name, value) = split_pair(raw, "--file")?;
        let Some(path) = value.strip_prefix('@') else {
            bail!("--file expects NAME=@PATH, got {:?}", raw);
        };
        request.insert(name, read_blob(Path::new(path))?);
    }

    Ok(request)
}

fn read_blob(path: &Path) -> Result<Blob> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let mut blob = Blob::new(bytes);
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        blob = blob.with_filename(name);
    }
    Ok(blob)
}

fn split_pair<'a>(raw: &'a str, flag: &str) -> Result<(&'a str, &'a str)> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name, value)),
        _ => bail!("{} expects NAME=VALUE, got {:?}", flag, raw),
    }
}
