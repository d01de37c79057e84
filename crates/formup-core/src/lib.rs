pub mod config;
pub mod logging;

pub mod client;
pub mod cookies;
pub mod error;
pub mod form;
pub mod transport;

pub use client::UploadClient;
pub use error::UploadError;
pub use form::{Blob, FieldValue, MultipartBody, UploadRequest};
pub use transport::{HopCookie, HttpRequest, HttpResponse, Method, Transport};
