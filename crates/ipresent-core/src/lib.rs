//! ipresent-core: capture workflow for the attendance client.
//!
//! Four photo slots are filled from uploads or camera frames, every image is
//! re-encoded to canonical JPEG, session metadata is collected, and the
//! bundle is handed to a [`Submitter`] whose roster is projected for display.

pub mod normalizer;
pub mod roster;
pub mod slots;
pub mod submission;
pub mod types;
pub mod workflow;

pub use normalizer::{normalize, NormalizeError, JPEG_QUALITY};
pub use roster::{Roster, RosterRow, UNKNOWN_PLACEHOLDER};
pub use slots::{PhotoSlotStore, SlotError, SLOT_COUNT};
pub use submission::{PhotoPart, SubmissionError, Submitter};
pub use types::{AttendanceRecord, EncodedImage, ImageSource, SessionInfo};
pub use workflow::{
    InputMode, SessionState, WorkflowController, WorkflowError, WorkflowState,
    MISSING_INFO_MESSAGE, SUBMISSION_FAILED_MESSAGE,
};
