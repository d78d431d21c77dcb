//! Seam between the workflow and the recognition backend.

use crate::slots::PhotoSlotStore;
use crate::types::{AttendanceRecord, EncodedImage, SessionInfo};
use thiserror::Error;

/// Why a submission did not produce a roster. The user sees one generic
/// message for all of these; the kind is for logs and tests.
#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server responded with {status}")]
    Server { status: u16 },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl SubmissionError {
    pub fn kind(&self) -> &'static str {
        match self {
            SubmissionError::Network(_) => "network",
            SubmissionError::Server { .. } => "server",
            SubmissionError::MalformedResponse(_) => "malformed_response",
        }
    }
}

/// One photo ready for upload, with its deterministic file name.
#[derive(Debug, Clone, Copy)]
pub struct PhotoPart<'a> {
    pub index: usize,
    pub image: &'a EncodedImage,
}

impl PhotoPart<'_> {
    /// `photo1.jpg` for slot 0 through `photo4.jpg` for slot 3.
    pub fn file_name(&self) -> String {
        format!("photo{}.jpg", self.index + 1)
    }

    /// Occupied slots in index order.
    pub fn from_slots(slots: &PhotoSlotStore) -> Vec<PhotoPart<'_>> {
        slots
            .occupied()
            .map(|(index, image)| PhotoPart { index, image })
            .collect()
    }
}

/// Sends a session's photos and metadata to the recognition backend.
#[allow(async_fn_in_trait)]
pub trait Submitter {
    async fn submit(
        &self,
        info: &SessionInfo,
        photos: &[PhotoPart<'_>],
    ) -> Result<Vec<AttendanceRecord>, SubmissionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names_are_one_based() {
        let image = EncodedImage::new(vec![1], 1, 1);
        let names: Vec<String> = (0..4)
            .map(|index| PhotoPart { index, image: &image }.file_name())
            .collect();
        assert_eq!(names, ["photo1.jpg", "photo2.jpg", "photo3.jpg", "photo4.jpg"]);
    }

    #[test]
    fn test_from_slots_skips_empty() {
        let mut slots = PhotoSlotStore::new();
        slots.set_slot(2, EncodedImage::new(vec![1], 1, 1)).unwrap();
        let parts = PhotoPart::from_slots(&slots);
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].file_name(), "photo3.jpg");
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(SubmissionError::Network("x".into()).kind(), "network");
        assert_eq!(SubmissionError::Server { status: 500 }.kind(), "server");
        assert_eq!(
            SubmissionError::MalformedResponse("x".into()).kind(),
            "malformed_response"
        );
    }
}
