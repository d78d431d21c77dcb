//! Request and response shapes of the `/upload` endpoint.

use ipresent_core::{AttendanceRecord, PhotoPart, SessionInfo, SubmissionError};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Deserializer};

const IMAGE_FIELD: &str = "images";
const IMAGE_MIME: &str = "image/jpeg";

/// Multipart body: two text fields and one `images` part per photo.
#[derive(Debug)]
pub struct UploadForm<'a> {
    pub name: &'a str,
    pub subject_name: &'a str,
    pub photos: &'a [PhotoPart<'a>],
}

impl<'a> UploadForm<'a> {
    pub fn new(info: &'a SessionInfo, photos: &'a [PhotoPart<'a>]) -> Self {
        Self {
            name: &info.operator_name,
            subject_name: &info.subject_name,
            photos,
        }
    }

    pub fn into_multipart(self) -> Result<Form, SubmissionError> {
        let mut form = Form::new()
            .text("name", self.name.to_string())
            .text("subject_name", self.subject_name.to_string());

        for photo in self.photos {
            let part = Part::bytes(photo.image.bytes().to_vec())
                .file_name(photo.file_name())
                .mime_str(IMAGE_MIME)
                .map_err(|e| SubmissionError::Network(format!("building multipart body: {e}")))?;
            form = form.part(IMAGE_FIELD, part);
        }
        Ok(form)
    }
}

/// Successful response body.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub recognized_faces: Vec<RecognizedFace>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecognizedFace {
    pub name: String,
    #[serde(deserialize_with = "string_or_number")]
    pub uin: String,
    /// A string, the `"NaN"` sentinel, `null`, or absent.
    #[serde(default)]
    pub parent_email: Option<String>,
}

impl From<RecognizedFace> for AttendanceRecord {
    fn from(face: RecognizedFace) -> Self {
        AttendanceRecord {
            name: face.name,
            uin: face.uin,
            parent_email: face.parent_email,
            present: true,
        }
    }
}

impl UploadResponse {
    pub fn parse(body: &[u8]) -> Result<Self, SubmissionError> {
        serde_json::from_slice(body).map_err(|e| SubmissionError::MalformedResponse(e.to_string()))
    }

    pub fn into_records(self) -> Vec<AttendanceRecord> {
        self.recognized_faces.into_iter().map(Into::into).collect()
    }
}

/// Some rosters store the UIN as a numeric spreadsheet column.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Uin {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Uin::deserialize(deserializer)? {
        Uin::Text(s) => s,
        Uin::Number(n) => n.to_string(),
    })
}
