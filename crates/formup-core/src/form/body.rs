//! Multipart form body: one part per upload field.

use super::{FieldValue, UploadRequest};

/// File name used for blob parts that do not carry one.
pub const DEFAULT_BLOB_FILENAME: &str = "blob";
/// Content type used for blob parts that do not carry one.
pub const DEFAULT_BLOB_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartContent {
    Text(String),
    File {
        filename: String,
        content_type: String,
        bytes: Vec<u8>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    pub name: String,
    pub content: PartContent,
}

/// Ordered parts of a `multipart/form-data` body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartBody {
    parts: Vec<FormPart>,
}

impl MultipartBody {
    /// Builds the body from `request`, consuming it. Parts follow the request's insertion order.
    pub fn from_request(request: UploadRequest) -> Self {
        let parts = request
            .into_iter()
            .map(|(name, value)| {
                let content = match value {
                    FieldValue::Text(s) => PartContent::Text(s),
                    FieldValue::Number(n) => PartContent::Text(render_number(&n)),
                    FieldValue::Blob(b) => PartContent::File {
                        filename: b
                            .filename
                            .unwrap_or_else(|| DEFAULT_BLOB_FILENAME.to_string()),
                        content_type: b
                            .content_type
                            .unwrap_or_else(|| DEFAULT_BLOB_CONTENT_TYPE.to_string()),
                        bytes: b.bytes,
                    },
                };
                FormPart { name, content }
            })
            .collect();
        Self { parts }
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Field names in body order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|p| p.name.as_str())
    }

    /// Total payload bytes across parts (excluding multipart framing).
    pub fn payload_len(&self) -> usize {
        self.parts
            .iter()
            .map(|p| match &p.content {
                PartContent::Text(s) => s.len(),
                PartContent::File { bytes, .. } => bytes.len(),
            })
            .sum()
    }
}

/// Renders a number the way a browser form stringifies it: integral floats
/// drop the fraction (`1.0` -> `1`, `1.5e3` -> `1500`), `-0` becomes `0`.
fn render_number(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f == 0.0 => "0".to_string(),
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => format!("{:.0}", f),
        _ => n.to_string(),
    }
}
