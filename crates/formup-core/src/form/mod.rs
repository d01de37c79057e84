//! Upload request fields and the multipart body built from them.
//!
//! An [`UploadRequest`] is an insertion-ordered map from field name to
//! [`FieldValue`]. [`MultipartBody::from_request`] turns it into one
//! [`FormPart`] per key, in the same order.

mod body;
mod json;

pub use body::{FormPart, MultipartBody, PartContent, DEFAULT_BLOB_CONTENT_TYPE, DEFAULT_BLOB_FILENAME};

use indexmap::IndexMap;

/// Binary field value, sent as a file part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub bytes: Vec<u8>,
    /// File name reported in `Content-Disposition`; `"blob"` when absent.
    pub filename: Option<String>,
    /// Part content type; `application/octet-stream` when absent.
    pub content_type: Option<String>,
}

impl Blob {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            filename: None,
            content_type: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(serde_json::Number),
    Blob(Blob),
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n.into())
    }
}

impl From<u64> for FieldValue {
    fn from(n: u64) -> Self {
        FieldValue::Number(n.into())
    }
}

impl From<Blob> for FieldValue {
    fn from(b: Blob) -> Self {
        FieldValue::Blob(b)
    }
}

/// Fields of one upload, keyed by name, iterated in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadRequest {
    fields: IndexMap<String, FieldValue>,
}

impl UploadRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` to `value`. An existing key keeps its position and gets the new value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> &mut Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for UploadRequest
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut req = UploadRequest::new();
        for (k, v) in iter {
            req.insert(k, v);
        }
        req
    }
}

impl IntoIterator for UploadRequest {
    type Item = (String, FieldValue);
    type IntoIter = indexmap::map::IntoIter<String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}
