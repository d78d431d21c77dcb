use ipresent_hw::Frame;
use serde::{Deserialize, Serialize};

/// Operator-entered metadata for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub operator_name: String,
    pub subject_name: String,
}

impl SessionInfo {
    /// Both fields are required before a submission may start. Names are
    /// taken as typed, so whitespace counts as content.
    pub fn is_complete(&self) -> bool {
        !self.operator_name.is_empty() && !self.subject_name.is_empty()
    }

    pub fn clear(&mut self) {
        self.operator_name.clear();
        self.subject_name.clear();
    }
}

/// One recognized individual returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub name: String,
    pub uin: String,
    /// Raw value from the backend; may be empty or the `"NaN"` sentinel.
    pub parent_email: Option<String>,
    pub present: bool,
}

/// A canonical JPEG image produced by [`crate::normalize`].
///
/// Only the normalizer constructs this type, so a value always holds
/// non-empty JPEG bytes of the recorded dimensions.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedImage {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
}

impl EncodedImage {
    pub(crate) fn new(bytes: Vec<u8>, width: u32, height: u32) -> Self {
        debug_assert!(!bytes.is_empty());
        Self {
            bytes,
            width,
            height,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Anything the user can place into a slot.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Raw RGB bitmap straight from the camera.
    Frame(Frame),
    /// Bytes of a file chosen by the user, in any format the decoder knows.
    File(Vec<u8>),
    /// An image that has already been through normalization.
    Encoded(EncodedImage),
}

impl ImageSource {
    pub fn kind(&self) -> &'static str {
        match self {
            ImageSource::Frame(_) => "frame",
            ImageSource::File(_) => "file",
            ImageSource::Encoded(_) => "encoded",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_info_requires_both_fields() {
        let mut info = SessionInfo::default();
        assert!(!info.is_complete());
        info.operator_name = "Dr. Rao".into();
        assert!(!info.is_complete());
        info.subject_name = "Physics".into();
        assert!(info.is_complete());
    }

    #[test]
    fn test_session_info_whitespace_counts_as_entered() {
        let info = SessionInfo {
            operator_name: " ".into(),
            subject_name: "Physics".into(),
        };
        assert!(info.is_complete());
    }

    #[test]
    fn test_attendance_record_json_shape() {
        let record = AttendanceRecord {
            name: "Alice".into(),
            uin: "U1".into(),
            parent_email: None,
            present: true,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "name": "Alice",
                "uin": "U1",
                "parent_email": null,
                "present": true,
            })
        );
        let back: AttendanceRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_session_info_clear() {
        let mut info = SessionInfo {
            operator_name: "a".into(),
            subject_name: "b".into(),
        };
        info.clear();
        assert_eq!(info, SessionInfo::default());
    }
}
