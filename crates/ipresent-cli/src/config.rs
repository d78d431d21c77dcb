use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Client configuration: defaults, then an optional TOML file, then
/// `IPRESENT_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Recognition backend base URL; uploads go to `{backend_url}/upload`.
    pub backend_url: String,
    /// V4L2 device path used in camera mode.
    pub camera_device: String,
    /// Timeout in seconds for one submission.
    pub submit_timeout_secs: u64,
    /// Frames discarded after the camera opens (auto-exposure settling).
    pub warmup_frames: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8000".to_string(),
            camera_device: "/dev/video0".to_string(),
            submit_timeout_secs: ipresent_client::DEFAULT_TIMEOUT.as_secs(),
            warmup_frames: 4,
        }
    }
}

impl Config {
    /// Load from `path` if given, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                Self::from_toml(&text)
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
            None => Self::default(),
        };
        config.apply_vars(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Override fields from `IPRESENT_*` variables returned by `lookup`.
    /// Unparseable numbers are ignored.
    pub fn apply_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("IPRESENT_BACKEND_URL") {
            self.backend_url = url;
        }
        if let Some(device) = lookup("IPRESENT_CAMERA_DEVICE") {
            self.camera_device = device;
        }
        if let Some(secs) = lookup("IPRESENT_SUBMIT_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.submit_timeout_secs = secs;
        }
        if let Some(frames) = lookup("IPRESENT_WARMUP_FRAMES").and_then(|v| v.parse().ok()) {
            self.warmup_frames = frames;
        }
    }

    pub fn submit_timeout(&self) -> Duration {
        Duration::from_secs(self.submit_timeout_secs)
    }
}
