//! UploadClient - Pass Validation Adapter
//!
//! ## Responsibilities
//!
//! - Submit decoded payloads to the validation endpoint
//! - Parse the flat response body and classify it into an [`OutcomeCode`]
//! - Absorb transport failures (the loop never sees an HTTP error)
//!
//! Classification is deliberately string-vocabulary based and the body
//! parser is a substring search, not a JSON parser: the server contract
//! predates this implementation and malformed-input behavior must stay
//! bit-compatible with it.

use crate::config::{AppConfig, UploadMethod, MAX_AUTH_LEN};
use crate::error::{Error, Result};
use reqwest::header::HeaderValue;
use serde_json::json;
use std::time::Duration;

/// Validation request built from one decoded symbol
///
/// Immutable once constructed; lives for a single loop iteration.
#[derive(Debug, Clone)]
pub struct ValidationRequest {
    /// Decoded symbol payload
    pub payload: String,
    /// Location identifier
    pub location: String,
    /// Entrance / device identifier
    pub entrance: String,
}

/// Closed classification of a validation response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeCode {
    /// Transport failure, timeout or non-200 status
    TransportOrServerError,
    /// Pass found and checked in
    Success,
    /// Pass not found
    NotFound,
    /// Payload not in a recognizable format
    InvalidFormat,
    /// Pass found but check-in failed
    CheckinFailed,
    /// Pass expired
    Expired,
    /// Server answered 200 with an unrecognized message
    Unknown,
}

impl OutcomeCode {
    /// Integer value carried on the event channel
    pub fn event_value(self) -> i32 {
        match self {
            OutcomeCode::TransportOrServerError => 0,
            OutcomeCode::Success => 1,
            OutcomeCode::NotFound => 2,
            OutcomeCode::InvalidFormat => 3,
            OutcomeCode::CheckinFailed => 4,
            OutcomeCode::Expired => 5,
            OutcomeCode::Unknown => 6,
        }
    }

    /// Whether the scan checked a visitor in
    pub fn is_success(self) -> bool {
        self == OutcomeCode::Success
    }
}

/// Extract a string field from a flat JSON-like body
///
/// Finds the literal `"<key>":"` and takes everything up to the next `"`.
/// Returns an empty string when the key is absent or the value is
/// unterminated. Values with embedded escaped quotes mis-parse; that is the
/// contract, not a defect to fix here.
pub fn extract_value(body: &str, key: &str) -> String {
    let needle = format!("\"{key}\":\"");
    let Some(start) = body.find(&needle) else {
        return String::new();
    };
    let rest = &body[start + needle.len()..];
    match rest.find('"') {
        Some(end) => rest[..end].to_string(),
        None => String::new(),
    }
}

/// Classify a validation response
///
/// Reproduces the server vocabulary exactly, case-insensitively on both
/// `result` and `message`.
pub fn classify(status: u16, body: &str) -> OutcomeCode {
    if status != 200 {
        tracing::warn!(status = status, "Validation upload failed");
        return OutcomeCode::TransportOrServerError;
    }

    let result = extract_value(body, "result").to_lowercase();
    let message = extract_value(body, "message").to_lowercase();

    if result == "success" || message == "pass found" {
        let checkin = extract_value(body, "checkin");
        tracing::info!(
            result = %result,
            message = %message,
            checkin = %checkin,
            "Pass validated"
        );
        return OutcomeCode::Success;
    }

    let outcome = match message.as_str() {
        "pass not found" => OutcomeCode::NotFound,
        "invalid format" => OutcomeCode::InvalidFormat,
        "checkin failed" => OutcomeCode::CheckinFailed,
        "pass expired" => OutcomeCode::Expired,
        _ => OutcomeCode::Unknown,
    };
    tracing::info!(
        result = %result,
        message = %message,
        outcome = ?outcome,
        "Pass rejected"
    );
    outcome
}

/// Validation endpoint client
pub struct UploadClient {
    client: reqwest::Client,
    endpoint: String,
    method: UploadMethod,
    auth_header: Option<HeaderValue>,
}

/// Transport with the redirect cap the endpoint contract requires
fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()?)
}

impl UploadClient {
    /// Build a client from configuration
    ///
    /// The auth header is constructed once here; an oversized token is a
    /// hard configuration error, never a truncated header.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let auth_header = match config.upload_method {
            UploadMethod::Get => None,
            UploadMethod::Post => {
                if config.auth.len() > MAX_AUTH_LEN {
                    return Err(Error::Config(format!(
                        "AUTH token is {} bytes, limit is {MAX_AUTH_LEN}",
                        config.auth.len()
                    )));
                }
                Some(HeaderValue::from_str(&config.auth).map_err(|_| {
                    Error::Config("AUTH token contains invalid header bytes".into())
                })?)
            }
        };

        let client = build_http_client(config.http_timeout)?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            method: config.upload_method,
            auth_header,
        })
    }

    /// Override the transport timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = build_http_client(timeout)?;
        Ok(self)
    }

    /// Validate one decoded payload
    ///
    /// Never fails at the call site: transport and server problems classify
    /// as [`OutcomeCode::TransportOrServerError`]. No retry is performed;
    /// the next physical scan naturally re-triggers an attempt.
    pub async fn validate(&self, request: &ValidationRequest) -> OutcomeCode {
        match self.send(request).await {
            Ok((status, body)) => classify(status, &body),
            Err(e) => {
                tracing::warn!(error = %e, "Validation upload failed");
                OutcomeCode::TransportOrServerError
            }
        }
    }

    async fn send(&self, request: &ValidationRequest) -> Result<(u16, String)> {
        let builder = match self.method {
            UploadMethod::Get => self.client.get(&self.endpoint).query(&[
                ("park_abbr", request.location.as_str()),
                ("entrance", request.entrance.as_str()),
                ("scandata", request.payload.as_str()),
            ]),
            UploadMethod::Post => {
                let mut builder = self.client.post(&self.endpoint).json(&json!({
                    "location": request.location,
                    "device_id": request.entrance,
                    "data": request.payload,
                }));
                if let Some(ref auth) = self.auth_header {
                    builder = builder.header("PARKSPLUS_AUTH", auth.clone());
                }
                builder
            }
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok((status, body))
    }
}
