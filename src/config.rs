//! Application configuration
//!
//! Loaded once at startup from the environment (with `.env` support) and
//! treated as immutable for the process lifetime. The validation endpoint,
//! auth token, location and entrance identifiers are required; everything
//! else has a default suitable for a gate camera.

use crate::error::{Error, Result};
use std::time::Duration;

/// Largest auth token accepted for the `PARKSPLUS_AUTH` header.
///
/// Tokens beyond this length would previously have been silently truncated
/// into a corrupted header; they are rejected at startup instead.
pub const MAX_AUTH_LEN: usize = 240;

/// How the validation request is sent to the endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadMethod {
    /// Query-parameter GET (`park_abbr`, `entrance`, `scandata`)
    Get,
    /// JSON POST with `PARKSPLUS_AUTH` header
    Post,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Validation endpoint URL
    pub endpoint: String,
    /// Auth token for the POST variant
    pub auth: String,
    /// Location identifier (park abbreviation)
    pub location: String,
    /// Entrance / device identifier
    pub entrance: String,
    /// Request variant
    pub upload_method: UploadMethod,
    /// Detection loop tick period
    pub poll_interval: Duration,
    /// Suppression window armed after a detection
    pub debounce_window: Duration,
    /// Transport timeout for validation requests
    pub http_timeout: Duration,
    /// V4L2 device path
    pub video_device: String,
    /// Requested capture width
    pub frame_width: u32,
    /// Requested capture height
    pub frame_height: u32,
    /// Requested capture rate (frames per second)
    pub frame_rate: u32,
}

impl AppConfig {
    /// Load configuration from the process environment
    ///
    /// Missing required keys are fatal: the caller is expected to abort.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through a key lookup function
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key).ok_or_else(|| Error::Config(format!("missing required parameter {key}")))
        };

        let upload_method = match lookup("UPLOAD_METHOD").as_deref() {
            None => UploadMethod::Get,
            Some(v) if v.eq_ignore_ascii_case("get") => UploadMethod::Get,
            Some(v) if v.eq_ignore_ascii_case("post") => UploadMethod::Post,
            Some(v) => {
                return Err(Error::Config(format!(
                    "UPLOAD_METHOD must be 'get' or 'post', got '{v}'"
                )))
            }
        };

        let parse_u64 = |key: &str, default: u64| -> Result<u64> {
            match lookup(key) {
                None => Ok(default),
                Some(v) => v
                    .parse()
                    .map_err(|_| Error::Config(format!("{key} is not a number: '{v}'"))),
            }
        };

        let auth = required("AUTH")?;
        if upload_method == UploadMethod::Post && auth.len() > MAX_AUTH_LEN {
            return Err(Error::Config(format!(
                "AUTH token is {} bytes, limit is {MAX_AUTH_LEN}",
                auth.len()
            )));
        }

        Ok(Self {
            endpoint: required("ENDPOINT")?,
            auth,
            location: required("LOCATION")?,
            entrance: required("ENTRANCE")?,
            upload_method,
            poll_interval: Duration::from_millis(parse_u64("POLL_INTERVAL_MS", 10)?),
            debounce_window: Duration::from_millis(parse_u64("DEBOUNCE_MS", 3000)?),
            http_timeout: Duration::from_secs(parse_u64("HTTP_TIMEOUT_SECS", 10)?),
            video_device: lookup("VIDEO_DEVICE").unwrap_or_else(|| "/dev/video0".to_string()),
            frame_width: parse_u64("FRAME_WIDTH", 1280)? as u32,
            frame_height: parse_u64("FRAME_HEIGHT", 720)? as u32,
            frame_rate: parse_u64("FRAME_RATE", 30)? as u32,
        })
    }
}
