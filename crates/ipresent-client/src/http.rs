use crate::wire::{UploadForm, UploadResponse};
use ipresent_core::{AttendanceRecord, PhotoPart, SessionInfo, SubmissionError, Submitter};
use std::time::Duration;

/// Upper bound on one submission. Recognition over four photos can take a
/// while; beyond this the request fails as a network error so the user can
/// retry instead of waiting on a hung backend.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

const USER_AGENT: &str = concat!("ipresent/", env!("CARGO_PKG_VERSION"));

/// Recognition backend reached over HTTP.
pub struct HttpSubmitter {
    http: reqwest::Client,
    upload_url: String,
}

impl HttpSubmitter {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SubmissionError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| SubmissionError::Network(e.to_string()))?;

        Ok(Self {
            http,
            upload_url: upload_url(base_url),
        })
    }

    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }
}

fn upload_url(base_url: &str) -> String {
    format!("{}/upload", base_url.trim_end_matches('/'))
}

impl Submitter for HttpSubmitter {
    async fn submit(
        &self,
        info: &SessionInfo,
        photos: &[PhotoPart<'_>],
    ) -> Result<Vec<AttendanceRecord>, SubmissionError> {
        let form = UploadForm::new(info, photos).into_multipart()?;

        tracing::debug!(url = %self.upload_url, photos = photos.len(), "posting upload");

        let response = self
            .http
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SubmissionError::Network(format!("request timed out: {e}"))
                } else {
                    SubmissionError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SubmissionError::Server {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SubmissionError::Network(format!("reading response body: {e}")))?;

        let records = UploadResponse::parse(&body)?.into_records();
        tracing::info!(recognized = records.len(), "backend returned roster");
        Ok(records)
    }
}
