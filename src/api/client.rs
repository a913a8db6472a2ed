/// HTTP client for the analysis backend
///
/// One `/analyze` upload per user action, no retries: every failure is
/// mapped to a single user-facing message and reported back to the caller
/// exactly once.

use std::time::Duration;

use thiserror::Error;

use super::models::{AnalysisResponse, ErrorBody, HealthResponse};

const USER_AGENT: &str = concat!("image-to-music/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client errors, grouped by what the user can do about them
///
/// The `Display` strings are shown verbatim in the error banner.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
    /// The server answered with an error status; its own message wins
    #[error("{0}")]
    Server(String),
    /// The request went out but nothing came back
    #[error("No response from server. Please check your internet connection.")]
    Connection,
    /// The request could not be built or sent at all
    #[error("Error sending request: {0}")]
    Request(String),
    /// The server answered 2xx but the body made no sense
    #[error("Failed to analyze image. Please try again.")]
    Unexpected,
}

impl Error {
    fn from_send(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Error::Request(err.to_string())
        } else {
            // Timeouts, refused connections, DNS failures: no response
            Error::Connection
        }
    }
}

/// Client for the image analysis backend
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    http: reqwest::Client,
    base_url: String,
}

impl AnalysisClient {
    pub fn new(base_url: String) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Request(e.to_string()))?;

        Ok(Self { http, base_url })
    }

    /// Upload image bytes and return the recommendations for them
    ///
    /// `POST {base_url}/analyze` with a multipart field `image`.
    pub async fn analyze(
        &self,
        file_name: String,
        mime: String,
        bytes: Vec<u8>,
    ) -> Result<AnalysisResponse, Error> {
        let url = format!("{}/analyze", self.base_url);
        tracing::debug!(url = %url, size = bytes.len(), "Uploading image for analysis");

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(&mime)
            .map_err(|e| Error::Request(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("image", part);

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(Error::from_send)?;

        let status = response.status();
        if !status.is_success() {
            // The backend puts its message in an `error` field when it can
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| "Server error occurred".to_string());
            tracing::warn!(status = status.as_u16(), message = %message, "Analysis request failed");
            return Err(Error::Server(message));
        }

        let payload: AnalysisResponse =
            response.json().await.map_err(|_| Error::Unexpected)?;

        tracing::info!(
            tracks = payload.recommendations.len(),
            labels = payload.image_features.labels.len(),
            "Analysis complete"
        );

        Ok(payload)
    }

    /// Probe `GET {base_url}/health`; true only for a 2xx `{"status": "ok"}`
    pub async fn check_health(&self) -> bool {
        let url = format!("{}/health", self.base_url);

        let response = match self.http.get(&url).send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(url = %url, error = %err, "Health check failed");
                return false;
            }
        };

        if !response.status().is_success() {
            return false;
        }

        response
            .json::<HealthResponse>()
            .await
            .map(|body| body.is_ok())
            .unwrap_or(false)
    }

    /// Fetch raw bytes from an absolute URL (artwork, audio previews)
    pub async fn fetch_bytes(&self, url: String) -> Result<Vec<u8>, Error> {
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(Error::from_send)?;

        if !response.status().is_success() {
            return Err(Error::Server(format!(
                "Server error occurred ({})",
                response.status().as_u16()
            )));
        }

        response
            .bytes()
            .await
            .map(|bytes| bytes.to_vec())
            .map_err(|_| Error::Unexpected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_are_user_facing() {
        assert_eq!(
            Error::Server("No image provided".to_string()).to_string(),
            "No image provided"
        );
        assert_eq!(
            Error::Connection.to_string(),
            "No response from server. Please check your internet connection."
        );
        assert_eq!(
            Error::Request("invalid mime".to_string()).to_string(),
            "Error sending request: invalid mime"
        );
        assert_eq!(
            Error::Unexpected.to_string(),
            "Failed to analyze image. Please try again."
        );
    }

    #[test]
    fn test_client_construction() {
        let client = AnalysisClient::new("http://localhost:5000/api".to_string()).unwrap();
        assert_eq!(client.base_url, "http://localhost:5000/api");
    }
}
