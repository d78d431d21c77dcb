//! Session state machine: capture → metadata → submission → results.
//!
//! ```text
//! Capturing ──(4 photos)──▶ CollectingInfo ──(names ok)──▶ Submitting
//!     ▲                        │     ▲                         │    │
//!     └────────(back)──────────┘     └────────(failure)────────┘    │
//!     ▲                                                             ▼
//!     └──────────────────────(reset)───────────────────────── ShowingResults
//! ```
//!
//! The controller owns all session data. Presentation code reads it through
//! [`WorkflowController::session`] and changes it only through the
//! operations below, each of which checks the current state first.

use crate::normalizer::{normalize, NormalizeError};
use crate::slots::{PhotoSlotStore, SlotError};
use crate::submission::{PhotoPart, SubmissionError, Submitter};
use crate::types::{AttendanceRecord, ImageSource, SessionInfo};
use ipresent_hw::{CaptureError, DeviceOpener, MediaCaptureAdapter};
use thiserror::Error;
use uuid::Uuid;

/// Shown when submission is attempted without both names.
pub const MISSING_INFO_MESSAGE: &str = "Please enter both name and subject";
/// Shown for every kind of submission failure.
pub const SUBMISSION_FAILED_MESSAGE: &str = "Failed to process images. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Capturing,
    CollectingInfo,
    Submitting,
    ShowingResults,
}

/// Where new photos come from while capturing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Upload,
    Camera,
}

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("{action} is not available while {state:?}")]
    InvalidState {
        action: &'static str,
        state: WorkflowState,
    },
    #[error(transparent)]
    Slot(#[from] SlotError),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error("camera is not active")]
    CameraInactive,
    #[error("operator and subject name are required")]
    MissingInfo,
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

/// Everything one session knows. Created empty, cleared on reset.
#[derive(Debug)]
pub struct SessionState {
    id: Uuid,
    slots: PhotoSlotStore,
    info: SessionInfo,
    state: WorkflowState,
    last_error: Option<String>,
    records: Vec<AttendanceRecord>,
    input_mode: InputMode,
    camera_error: Option<String>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            slots: PhotoSlotStore::new(),
            info: SessionInfo::default(),
            state: WorkflowState::Capturing,
            last_error: None,
            records: Vec::new(),
            input_mode: InputMode::default(),
            camera_error: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn slots(&self) -> &PhotoSlotStore {
        &self.slots
    }

    pub fn info(&self) -> &SessionInfo {
        &self.info
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    /// User-facing error for the metadata screen.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn records(&self) -> &[AttendanceRecord] {
        &self.records
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    /// Set when camera mode was requested but the device could not be opened.
    pub fn camera_error(&self) -> Option<&str> {
        self.camera_error.as_deref()
    }
}

/// Drives one [`SessionState`] through the workflow.
pub struct WorkflowController<S: Submitter, O: DeviceOpener> {
    session: SessionState,
    submitter: S,
    camera: MediaCaptureAdapter<O>,
}

impl<S: Submitter, O: DeviceOpener> WorkflowController<S, O> {
    pub fn new(submitter: S, opener: O) -> Self {
        let session = SessionState::new();
        tracing::info!(session = %session.id, "session started");
        Self {
            session,
            submitter,
            camera: MediaCaptureAdapter::new(opener),
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn state(&self) -> WorkflowState {
        self.session.state
    }

    pub fn camera_active(&self) -> bool {
        self.camera.is_active()
    }

    /// Switch between upload and camera input.
    ///
    /// Entering camera mode opens the device. If that fails the mode stays
    /// `Camera` with the camera disabled and `camera_error` set; uploads keep
    /// working. Leaving camera mode releases the device.
    pub async fn set_input_mode(&mut self, mode: InputMode) -> Result<(), WorkflowError> {
        self.require(WorkflowState::Capturing, "switching input mode")?;
        self.session.input_mode = mode;

        match mode {
            InputMode::Upload => {
                self.camera.deactivate();
                self.session.camera_error = None;
                Ok(())
            }
            InputMode::Camera => match self.camera.activate().await {
                Ok(()) => {
                    self.session.camera_error = None;
                    Ok(())
                }
                Err(e) => {
                    tracing::warn!(session = %self.session.id, error = %e, "camera disabled");
                    self.session.camera_error = Some(e.to_string());
                    Err(e.into())
                }
            },
        }
    }

    /// Retry opening the camera after a failed or released activation.
    pub async fn enable_camera(&mut self) -> Result<(), WorkflowError> {
        self.set_input_mode(InputMode::Camera).await
    }

    /// Point the next capture or upload at `index`.
    pub fn select_slot(&mut self, index: usize) -> Result<(), WorkflowError> {
        self.require(WorkflowState::Capturing, "selecting a slot")?;
        self.session.slots.set_focus(index)?;
        Ok(())
    }

    /// Normalize `source` into the focused slot and return that slot's index.
    /// On any error the slots are left untouched.
    pub fn place_photo(&mut self, source: ImageSource) -> Result<usize, WorkflowError> {
        self.require(WorkflowState::Capturing, "adding a photo")?;
        let image = normalize(&source).map_err(|e| {
            tracing::warn!(session = %self.session.id, source = source.kind(), error = %e, "photo rejected");
            e
        })?;

        let index = self.session.slots.focus();
        self.session.slots.set_slot(index, image)?;
        tracing::info!(
            session = %self.session.id,
            slot = index,
            source = source.kind(),
            completed = self.session.slots.completed_count(),
            "photo stored"
        );
        Ok(index)
    }

    /// Place the bytes of a user-chosen file into the focused slot.
    pub fn upload(&mut self, bytes: Vec<u8>) -> Result<usize, WorkflowError> {
        self.place_photo(ImageSource::File(bytes))
    }

    /// Grab a frame from the live camera into the focused slot.
    pub fn capture_photo(&mut self) -> Result<usize, WorkflowError> {
        self.require(WorkflowState::Capturing, "capturing a photo")?;
        if !self.camera.is_active() {
            return Err(WorkflowError::CameraInactive);
        }
        let frame = self.camera.capture_frame()?;
        self.place_photo(ImageSource::Frame(frame))
    }

    pub fn remove_photo(&mut self, index: usize) -> Result<(), WorkflowError> {
        self.require(WorkflowState::Capturing, "removing a photo")?;
        if self.session.slots.clear_slot(index)?.is_some() {
            tracing::info!(session = %self.session.id, slot = index, "photo removed");
        }
        Ok(())
    }

    /// Move on to metadata entry. Does nothing unless all four slots are
    /// filled. Returns whether the transition happened.
    pub fn proceed_to_info(&mut self) -> bool {
        if self.session.state != WorkflowState::Capturing || !self.session.slots.is_complete() {
            return false;
        }
        self.camera.deactivate();
        self.transition(WorkflowState::CollectingInfo);
        true
    }

    /// Return from metadata entry to capturing without clearing anything.
    pub fn back(&mut self) -> bool {
        if self.session.state != WorkflowState::CollectingInfo {
            return false;
        }
        self.transition(WorkflowState::Capturing);
        true
    }

    pub fn set_operator_name(&mut self, name: impl Into<String>) -> Result<(), WorkflowError> {
        self.require_editable("editing the operator name")?;
        self.session.info.operator_name = name.into();
        Ok(())
    }

    pub fn set_subject_name(&mut self, name: impl Into<String>) -> Result<(), WorkflowError> {
        self.require_editable("editing the subject name")?;
        self.session.info.subject_name = name.into();
        Ok(())
    }

    /// Validate metadata and send the session to the backend.
    ///
    /// Only valid from `CollectingInfo`, and `&mut self` keeps a second
    /// submission from starting while one is in flight. Any failure returns
    /// to `CollectingInfo` with photos and names intact. If the returned
    /// future is dropped before completion the session also falls back to
    /// `CollectingInfo`.
    pub async fn submit(&mut self) -> Result<(), WorkflowError> {
        self.require(WorkflowState::CollectingInfo, "submitting")?;

        if !self.session.info.is_complete() {
            self.session.last_error = Some(MISSING_INFO_MESSAGE.to_string());
            return Err(WorkflowError::MissingInfo);
        }

        let info = self.session.info.clone();
        let slots = self.session.slots.clone();
        let photos = PhotoPart::from_slots(&slots);

        self.session.last_error = None;
        self.transition(WorkflowState::Submitting);
        tracing::info!(
            session = %self.session.id,
            photos = photos.len(),
            subject = %info.subject_name,
            "submitting session"
        );

        let mut guard = InFlight {
            session: &mut self.session,
            settled: false,
        };
        let result = self.submitter.submit(&info, &photos).await;
        guard.settled = true;
        let session = &mut *guard.session;

        match result {
            Ok(records) => {
                tracing::info!(session = %session.id, recognized = records.len(), "submission succeeded");
                session.records = records;
                session.state = WorkflowState::ShowingResults;
                Ok(())
            }
            Err(e) => {
                tracing::error!(session = %session.id, kind = e.kind(), error = %e, "submission failed");
                session.last_error = Some(SUBMISSION_FAILED_MESSAGE.to_string());
                session.state = WorkflowState::CollectingInfo;
                Err(e.into())
            }
        }
    }

    /// Start a new session from the results screen.
    pub fn reset(&mut self) -> bool {
        if self.session.state != WorkflowState::ShowingResults {
            return false;
        }
        let input_mode = self.session.input_mode;
        self.session = SessionState {
            input_mode,
            ..SessionState::new()
        };
        tracing::info!(session = %self.session.id, "session reset");
        true
    }

    /// Release the camera ahead of dropping the controller.
    pub fn shutdown(&mut self) {
        self.camera.deactivate();
    }

    fn transition(&mut self, to: WorkflowState) {
        tracing::debug!(session = %self.session.id, from = ?self.session.state, to = ?to, "transition");
        self.session.state = to;
    }

    fn require(&self, state: WorkflowState, action: &'static str) -> Result<(), WorkflowError> {
        if self.session.state == state {
            Ok(())
        } else {
            Err(WorkflowError::InvalidState {
                action,
                state: self.session.state,
            })
        }
    }

    fn require_editable(&self, action: &'static str) -> Result<(), WorkflowError> {
        match self.session.state {
            WorkflowState::Capturing | WorkflowState::CollectingInfo => Ok(()),
            state => Err(WorkflowError::InvalidState { action, state }),
        }
    }
}

/// Restores `CollectingInfo` if a submission future is dropped mid-flight.
struct InFlight<'a> {
    session: &'a mut SessionState,
    settled: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!(session = %self.session.id, "submission abandoned");
            self.session.state = WorkflowState::CollectingInfo;
            self.session.last_error = Some(SUBMISSION_FAILED_MESSAGE.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slots::SLOT_COUNT;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use ipresent_hw::{CameraError, CaptureDevice, Frame};
    use std::cell::RefCell;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    enum Outcome {
        Records(Vec<AttendanceRecord>),
        Status(u16),
        Hang,
    }

    struct FakeSubmitter {
        outcome: Outcome,
        calls: RefCell<Vec<(SessionInfo, Vec<String>)>>,
    }

    impl FakeSubmitter {
        fn new(outcome: Outcome) -> Self {
            Self {
                outcome,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl Submitter for FakeSubmitter {
        async fn submit(
            &self,
            info: &SessionInfo,
            photos: &[PhotoPart<'_>],
        ) -> Result<Vec<AttendanceRecord>, SubmissionError> {
            let names = photos.iter().map(PhotoPart::file_name).collect();
            self.calls.borrow_mut().push((info.clone(), names));
            match &self.outcome {
                Outcome::Records(records) => Ok(records.clone()),
                Outcome::Status(status) => Err(SubmissionError::Server { status: *status }),
                Outcome::Hang => std::future::pending().await,
            }
        }
    }

    struct FakeCamera {
        released: Arc<AtomicUsize>,
    }

    impl CaptureDevice for FakeCamera {
        fn capture(&mut self) -> Result<Frame, CameraError> {
            Ok(Frame {
                data: vec![90; 8 * 6 * 3],
                width: 8,
                height: 6,
                timestamp: std::time::Instant::now(),
                sequence: 0,
            })
        }
    }

    impl Drop for FakeCamera {
        fn drop(&mut self) {
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct FakeOpener {
        available: bool,
        released: Arc<AtomicUsize>,
    }

    impl DeviceOpener for FakeOpener {
        type Device = FakeCamera;

        fn open(&self) -> Result<FakeCamera, CameraError> {
            if !self.available {
                return Err(CameraError::AccessDenied("/dev/video0".into()));
            }
            Ok(FakeCamera {
                released: Arc::clone(&self.released),
            })
        }
    }

    type Controller = WorkflowController<FakeSubmitter, FakeOpener>;

    fn controller(outcome: Outcome) -> Controller {
        controller_with_camera(outcome, true).0
    }

    fn controller_with_camera(outcome: Outcome, available: bool) -> (Controller, Arc<AtomicUsize>) {
        let released = Arc::new(AtomicUsize::new(0));
        let opener = FakeOpener {
            available,
            released: Arc::clone(&released),
        };
        (WorkflowController::new(FakeSubmitter::new(outcome), opener), released)
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([200, 100, 50]));
        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut cursor, ImageFormat::Png)
            .unwrap();
        cursor.into_inner()
    }

    fn fill_all(c: &mut Controller) {
        for _ in 0..SLOT_COUNT {
            c.upload(png(12, 10)).unwrap();
        }
    }

    fn ready_to_submit(outcome: Outcome) -> Controller {
        let mut c = controller(outcome);
        fill_all(&mut c);
        assert!(c.proceed_to_info());
        c.set_operator_name("Dr. Rao").unwrap();
        c.set_subject_name("Physics").unwrap();
        c
    }

    fn alice() -> AttendanceRecord {
        AttendanceRecord {
            name: "Alice".into(),
            uin: "U1".into(),
            parent_email: Some("NaN".into()),
            present: true,
        }
    }

    #[test]
    fn test_starts_empty_in_capturing() {
        let c = controller(Outcome::Hang);
        let s = c.session();
        assert_eq!(s.state(), WorkflowState::Capturing);
        assert_eq!(s.slots().completed_count(), 0);
        assert_eq!(s.info(), &SessionInfo::default());
        assert!(s.last_error().is_none());
        assert_eq!(s.input_mode(), InputMode::Upload);
    }

    #[test]
    fn test_proceed_blocked_until_complete() {
        let mut c = controller(Outcome::Hang);
        for _ in 0..SLOT_COUNT - 1 {
            c.upload(png(4, 4)).unwrap();
            assert!(!c.proceed_to_info());
            assert_eq!(c.state(), WorkflowState::Capturing);
        }
        c.upload(png(4, 4)).unwrap();
        assert!(c.proceed_to_info());
        assert_eq!(c.state(), WorkflowState::CollectingInfo);
    }

    #[test]
    fn test_uploads_fill_slots_in_focus_order() {
        let mut c = controller(Outcome::Hang);
        assert_eq!(c.upload(png(4, 4)).unwrap(), 0);
        assert_eq!(c.upload(png(4, 4)).unwrap(), 1);
        c.select_slot(3).unwrap();
        assert_eq!(c.upload(png(4, 4)).unwrap(), 3);
        assert_eq!(c.session().slots().completed_count(), 3);
    }

    #[test]
    fn test_invalid_upload_leaves_slots_untouched() {
        let mut c = controller(Outcome::Hang);
        c.upload(png(4, 4)).unwrap();
        let err = c.upload(b"not an image".to_vec()).unwrap_err();
        assert!(matches!(err, WorkflowError::Normalize(NormalizeError::InvalidImage(_))));
        assert_eq!(c.session().slots().completed_count(), 1);
        assert_eq!(c.session().slots().focus(), 1);
        assert!(c.session().slots().get(1).is_none());
    }

    #[test]
    fn test_remove_photo_blocks_proceed() {
        let mut c = controller(Outcome::Hang);
        fill_all(&mut c);
        c.remove_photo(2).unwrap();
        assert!(!c.proceed_to_info());
        assert_eq!(c.session().slots().completed_count(), 3);
    }

    #[tokio::test]
    async fn test_missing_info_sets_error_and_stays() {
        let mut c = controller(Outcome::Records(vec![]));
        fill_all(&mut c);
        c.proceed_to_info();
        c.set_operator_name("Dr. Rao").unwrap();

        let err = c.submit().await.unwrap_err();
        assert!(matches!(err, WorkflowError::MissingInfo));
        assert_eq!(c.state(), WorkflowState::CollectingInfo);
        assert_eq!(c.session().last_error(), Some(MISSING_INFO_MESSAGE));
        assert!(c.submitter.calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_whitespace_name_is_submitted_as_typed() {
        let mut c = ready_to_submit(Outcome::Records(vec![]));
        c.set_operator_name(" ").unwrap();

        c.submit().await.unwrap();
        assert_eq!(c.state(), WorkflowState::ShowingResults);
        assert!(c.session().last_error().is_none());
        let calls = c.submitter.calls.borrow();
        assert_eq!(calls[0].0.operator_name, " ");
    }

    #[tokio::test]
    async fn test_successful_submission_shows_results() {
        let mut c = ready_to_submit(Outcome::Records(vec![alice()]));
        c.submit().await.unwrap();

        assert_eq!(c.state(), WorkflowState::ShowingResults);
        assert_eq!(c.session().records(), &[alice()]);
        assert!(c.session().last_error().is_none());

        let calls = c.submitter.calls.borrow();
        assert_eq!(calls.len(), 1);
        let (info, names) = &calls[0];
        assert_eq!(info.operator_name, "Dr. Rao");
        assert_eq!(info.subject_name, "Physics");
        assert_eq!(names, &["photo1.jpg", "photo2.jpg", "photo3.jpg", "photo4.jpg"]);
    }

    #[tokio::test]
    async fn test_error_cleared_on_valid_submission() {
        let mut c = ready_to_submit(Outcome::Records(vec![]));
        c.set_subject_name("").unwrap();
        assert!(c.submit().await.is_err());
        assert!(c.session().last_error().is_some());

        c.set_subject_name("Physics").unwrap();
        c.submit().await.unwrap();
        assert!(c.session().last_error().is_none());
        assert!(c.session().records().is_empty());
    }

    #[tokio::test]
    async fn test_server_error_preserves_session() {
        let mut c = ready_to_submit(Outcome::Status(500));
        let before: Vec<Vec<u8>> = c
            .session()
            .slots()
            .occupied()
            .map(|(_, img)| img.bytes().to_vec())
            .collect();

        let err = c.submit().await.unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Submission(SubmissionError::Server { status: 500 })
        ));

        let s = c.session();
        assert_eq!(s.state(), WorkflowState::CollectingInfo);
        assert_eq!(s.last_error(), Some(SUBMISSION_FAILED_MESSAGE));
        assert_eq!(s.slots().completed_count(), SLOT_COUNT);
        let after: Vec<Vec<u8>> = s.slots().occupied().map(|(_, img)| img.bytes().to_vec()).collect();
        assert_eq!(before, after);
        assert_eq!(s.info().operator_name, "Dr. Rao");
        assert_eq!(s.info().subject_name, "Physics");
    }

    #[tokio::test]
    async fn test_dropped_submission_returns_to_info() {
        let mut c = ready_to_submit(Outcome::Hang);
        let timed_out = tokio::time::timeout(Duration::from_millis(20), c.submit()).await;
        assert!(timed_out.is_err());
        assert_eq!(c.state(), WorkflowState::CollectingInfo);
        assert_eq!(c.session().slots().completed_count(), SLOT_COUNT);
        assert_eq!(c.session().last_error(), Some(SUBMISSION_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn test_submit_cannot_skip_info_step() {
        let mut c = controller(Outcome::Records(vec![]));
        fill_all(&mut c);
        let err = c.submit().await.unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState { .. }));
        assert_eq!(c.state(), WorkflowState::Capturing);
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let mut c = ready_to_submit(Outcome::Records(vec![alice()]));
        let old_id = c.session().id();
        c.submit().await.unwrap();
        assert!(c.reset());

        let s = c.session();
        assert_eq!(s.state(), WorkflowState::Capturing);
        assert_eq!(s.slots().completed_count(), 0);
        assert_eq!(s.slots().focus(), 0);
        assert_eq!(s.info().operator_name, "");
        assert_eq!(s.info().subject_name, "");
        assert!(s.records().is_empty());
        assert!(s.last_error().is_none());
        assert_ne!(s.id(), old_id);
    }

    #[test]
    fn test_reset_only_from_results() {
        let mut c = controller(Outcome::Hang);
        c.upload(png(4, 4)).unwrap();
        assert!(!c.reset());
        assert_eq!(c.session().slots().completed_count(), 1);
    }

    #[test]
    fn test_back_keeps_data() {
        let mut c = controller(Outcome::Hang);
        fill_all(&mut c);
        c.proceed_to_info();
        c.set_operator_name("Dr. Rao").unwrap();
        assert!(c.back());
        assert_eq!(c.state(), WorkflowState::Capturing);
        assert_eq!(c.session().slots().completed_count(), SLOT_COUNT);
        assert_eq!(c.session().info().operator_name, "Dr. Rao");
        assert!(!c.back());
    }

    #[test]
    fn test_slot_edits_rejected_outside_capturing() {
        let mut c = controller(Outcome::Hang);
        fill_all(&mut c);
        c.proceed_to_info();
        assert!(matches!(c.remove_photo(0), Err(WorkflowError::InvalidState { .. })));
        assert!(matches!(c.upload(png(4, 4)), Err(WorkflowError::InvalidState { .. })));
        assert!(matches!(c.select_slot(1), Err(WorkflowError::InvalidState { .. })));
        assert_eq!(c.session().slots().completed_count(), SLOT_COUNT);
    }

    #[tokio::test]
    async fn test_camera_capture_and_release_on_proceed() {
        let (mut c, released) = controller_with_camera(Outcome::Hang, true);
        c.set_input_mode(InputMode::Camera).await.unwrap();
        assert!(c.camera_active());

        for expected in 0..SLOT_COUNT {
            assert_eq!(c.capture_photo().unwrap(), expected);
        }
        let stored = c.session().slots().get(0).unwrap();
        assert_eq!((stored.width(), stored.height()), (8, 6));

        assert!(c.proceed_to_info());
        assert!(!c.camera_active());
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_switching_to_upload_releases_camera() {
        let (mut c, released) = controller_with_camera(Outcome::Hang, true);
        c.set_input_mode(InputMode::Camera).await.unwrap();
        c.set_input_mode(InputMode::Upload).await.unwrap();
        assert!(!c.camera_active());
        assert_eq!(released.load(Ordering::SeqCst), 1);
        assert!(matches!(c.capture_photo(), Err(WorkflowError::CameraInactive)));
    }

    #[tokio::test]
    async fn test_camera_denied_falls_back_to_disabled() {
        let (mut c, _) = controller_with_camera(Outcome::Hang, false);
        let err = c.set_input_mode(InputMode::Camera).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Capture(CaptureError::DeviceAccess(_))));

        assert_eq!(c.session().input_mode(), InputMode::Camera);
        assert!(!c.camera_active());
        assert!(c.session().camera_error().is_some());
        assert!(matches!(c.capture_photo(), Err(WorkflowError::CameraInactive)));

        // Uploads still work with the camera disabled.
        assert_eq!(c.upload(png(4, 4)).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_drop_releases_camera() {
        let (mut c, released) = controller_with_camera(Outcome::Hang, true);
        c.enable_camera().await.unwrap();
        drop(c);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }
}
