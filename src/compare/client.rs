//! HTTP client for the external image comparison service.
//!
//! One comparison is one `POST /api/methods/?method=<id>` carrying the two
//! image paths as JSON. There is no retry: a failed request is reported to
//! the caller, who decides whether to try again.

use crate::compare::method::ComparisonMethod;
use crate::compare::response::{decode_images, error_message, ComparisonResult};
use crate::config::ClientConfig;
use crate::error::CompareError;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// JSON body of a comparison request.
///
/// The service reads both images from its own file system, so these must be
/// paths the service can see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonRequest {
    pub img1_path: String,
    pub img2_path: String,
}

impl ComparisonRequest {
    pub fn new(img1: &Path, img2: &Path) -> Self {
        Self {
            img1_path: img1.to_string_lossy().into_owned(),
            img2_path: img2.to_string_lossy().into_owned(),
        }
    }
}

/// Client for the comparison service.
#[derive(Debug, Clone)]
pub struct ComparisonClient {
    http: reqwest::Client,
    base_url: String,
    timeout_secs: Option<u64>,
}

impl ComparisonClient {
    pub fn new(config: &ClientConfig) -> Result<Self, CompareError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| CompareError::Internal(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            timeout_secs: config.timeout_secs,
        })
    }

    /// Full URL for `method`.
    pub fn endpoint(&self, method: ComparisonMethod) -> String {
        format!("{}/api/methods/?method={}", self.base_url, method.id())
    }

    /// Ask the service to compare two images.
    ///
    /// Returns the decoded images on HTTP 200. Any other status becomes
    /// [`CompareError::Service`] when the body carries `{"error": ...}` and
    /// [`CompareError::Communication`] otherwise.
    pub async fn compare(
        &self,
        img1: &Path,
        img2: &Path,
        method: ComparisonMethod,
    ) -> Result<ComparisonResult, CompareError> {
        self.send(&ComparisonRequest::new(img1, img2), method).await
    }

    /// Send a prepared request.
    pub async fn send(
        &self,
        request: &ComparisonRequest,
        method: ComparisonMethod,
    ) -> Result<ComparisonResult, CompareError> {
        let url = self.endpoint(method);
        info!("Comparing with '{}' via {}", method.id(), url);
        debug!("Payload: {:?}", request);

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.transport_error(e))?;

        if status == StatusCode::OK {
            let result = decode_images(&body)?;
            info!("Service returned {} image(s)", result.len());
            return Ok(result);
        }

        match error_message(&body) {
            Some(message) => {
                warn!("Service rejected comparison (HTTP {}): {}", status, message);
                Err(CompareError::Service {
                    status: status.as_u16(),
                    message,
                })
            }
            None => {
                warn!("Service answered HTTP {} without an error message", status);
                Err(CompareError::Communication(format!(
                    "unexpected HTTP {} from the server",
                    status
                )))
            }
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> CompareError {
        match self.timeout_secs {
            Some(secs) if e.is_timeout() => CompareError::Timeout { secs },
            _ => CompareError::Communication(e.to_string()),
        }
    }
}
