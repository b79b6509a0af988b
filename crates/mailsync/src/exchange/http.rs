//! HTTP transport
//!
//! Posts JSON envelopes to a single service endpoint.
//! Uses synchronous HTTP (ureq) so folder workers can block on it directly.

use log::{debug, error, trace};
use std::time::Duration;

use super::Transport;
use super::api::{RequestBody, RequestEnvelope, ResponseBody, ResponseEnvelope};
use crate::error::{Result, SyncError};

/// Transport that talks to the server over HTTP
pub struct HttpTransport {
    endpoint: String,
    agent: ureq::Agent,
}

impl HttpTransport {
    /// Applied to each request as a whole, connect through last body byte
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_timeout(endpoint, Self::DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Self {
        // Status codes are interpreted by decode_response, not by ureq
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            endpoint: endpoint.into(),
            agent,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &RequestBody, user: &str) -> Result<ResponseBody> {
        let envelope = RequestEnvelope::impersonating(user, request.clone());
        trace!("Sending request to {}: {:?}", self.endpoint, envelope);

        let mut response = self
            .agent
            .post(&self.endpoint)
            .send_json(&envelope)
            .map_err(|e| SyncError::connection(format!("failed to send request to {}: {}", self.endpoint, e)))?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(|e| SyncError::connection(format!("error reading from the response stream: {e}")))?;

        decode_response(status, &body)
    }
}

/// Turn a raw HTTP status and body into a response body or a typed error
pub fn decode_response(status: u16, body: &[u8]) -> Result<ResponseBody> {
    if status != 200 {
        error!("Server responded with HTTP error code {}", status);
        if !body.is_empty() {
            debug!("Error response body: {}", String::from_utf8_lossy(body));
        }
        return Err(SyncError::http_status(status));
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        error!("HTTP response was successful, but has no data");
        return Err(SyncError::EmptyResponse);
    }

    let envelope: ResponseEnvelope = serde_json::from_slice(body).map_err(|e| {
        error!("Error parsing response: {}", e);
        debug!("Response body: {}", String::from_utf8_lossy(body));
        SyncError::protocol(format!("error parsing response: {e}"))
    })?;
    trace!("Response received: {:?}", envelope);

    envelope.body.ok_or_else(|| {
        error!("Response envelope did not contain a body");
        SyncError::protocol("response did not contain a body")
    })
}
