//! ipresent-client: HTTP submission to the recognition backend.
//!
//! Implements [`ipresent_core::Submitter`] with a single multipart
//! `POST {base}/upload` and a typed parse of the `recognized_faces` roster.

pub mod http;
pub mod wire;

pub use http::{HttpSubmitter, DEFAULT_TIMEOUT};
pub use wire::{RecognizedFace, UploadForm, UploadResponse};
