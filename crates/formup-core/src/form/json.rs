//! Build an upload request from a JSON object.

use serde_json::Value;

use super::{FieldValue, UploadRequest};
use crate::error::UploadError;

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl UploadRequest {
    /// Converts a JSON object into fields, keeping the object's key order.
    ///
    /// Strings and numbers map directly; booleans become `"true"`/`"false"`.
    /// Nested objects, arrays and `null` have no form encoding and are rejected.
    pub fn from_json(value: &Value) -> Result<Self, UploadError> {
        let object = value.as_object().ok_or_else(|| UploadError::UnsupportedValue {
            field: String::new(),
            kind: kind_of(value),
        })?;
        let mut req = UploadRequest::new();
        for (name, v) in object {
            let field = match v {
                Value::String(s) => FieldValue::Text(s.clone()),
                Value::Number(n) => FieldValue::Number(n.clone()),
                Value::Bool(b) => FieldValue::Text(b.to_string()),
                Value::Null | Value::Array(_) | Value::Object(_) => {
                    return Err(UploadError::UnsupportedValue {
                        field: name.clone(),
                        kind: kind_of(v),
                    })
                }
            };
            req.insert(name.clone(), field);
        }
        Ok(req)
    }
}
