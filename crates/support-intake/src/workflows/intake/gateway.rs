use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::domain::ApplicationForm;

/// Path the acceptance endpoint listens on, relative to its base URL.
pub const SUBMISSION_PATH: &str = "/api/applications";
pub const DEFAULT_SUBMISSION_TIMEOUT: Duration = Duration::from_secs(30);

pub const ACCEPTED_MESSAGE: &str =
    "Your application has been submitted successfully. You will receive a confirmation email shortly.";
const GENERIC_FAILURE: &str = "Failed to submit application. Please try again.";

/// Response contract shared by every gateway implementation and the acceptance endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubmissionResponse {
    pub fn accepted(application_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            application_id: Some(application_id.into()),
            message: message.into(),
            error: None,
        }
    }

    pub fn rejected(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            application_id: None,
            message: message.into(),
            error: Some(error.into()),
        }
    }

    /// Text to show the applicant when the remote side declined the record.
    pub fn failure_message(&self) -> String {
        self.error
            .clone()
            .filter(|error| !error.trim().is_empty())
            .or_else(|| Some(self.message.clone()).filter(|message| !message.trim().is_empty()))
            .unwrap_or_else(|| GENERIC_FAILURE.to_string())
    }
}

/// Transport-level failures, rendered as the message the applicant sees.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("Request timed out. Please check your connection and try again.")]
    Timeout,
    #[error("Invalid application data. Please review your information and try again.")]
    BadRequest,
    #[error("Submission service authentication failed. Please try again later.")]
    Unauthorized,
    #[error("Too many submissions. Please wait a moment and try again.")]
    RateLimited,
    #[error("Server error. Please try again later.")]
    Server { status: u16 },
    #[error("{message}")]
    Remote { status: u16, message: String },
    #[error("Failed to submit application. Please try again.")]
    Network { detail: String },
}

impl TransportError {
    pub fn category(&self) -> &'static str {
        match self {
            TransportError::Timeout => "timeout",
            TransportError::BadRequest => "bad_request",
            TransportError::Unauthorized => "unauthorized",
            TransportError::RateLimited => "rate_limited",
            TransportError::Server { .. } => "server_error",
            TransportError::Remote { .. } => "remote_error",
            TransportError::Network { .. } => "network",
        }
    }

    pub fn from_status(status: u16, message: Option<String>) -> Self {
        match status {
            400 => TransportError::BadRequest,
            401 | 403 => TransportError::Unauthorized,
            429 => TransportError::RateLimited,
            500..=599 => TransportError::Server { status },
            _ => match message.filter(|text| !text.trim().is_empty()) {
                Some(message) => TransportError::Remote { status, message },
                None => TransportError::Network {
                    detail: format!("unexpected status {status}"),
                },
            },
        }
    }
}

/// Remote service accepting a completed record. Each call is a single attempt.
#[async_trait]
pub trait SubmissionGateway: Send + Sync {
    async fn submit(&self, form: &ApplicationForm) -> Result<SubmissionResponse, TransportError>;
}

/// Gateway posting the record as JSON to an acceptance endpoint.
#[derive(Debug, Clone)]
pub struct HttpSubmissionGateway {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSubmissionGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| TransportError::Network {
                detail: err.to_string(),
            })?;

        Ok(Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), SUBMISSION_PATH),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SubmissionGateway for HttpSubmissionGateway {
    async fn submit(&self, form: &ApplicationForm) -> Result<SubmissionResponse, TransportError> {
        debug!(endpoint = %self.endpoint, "posting application");
        let response = self
            .client
            .post(&self.endpoint)
            .json(form)
            .send()
            .await
            .map_err(map_client_error)?;

        let status = response.status().as_u16();
        if response.status().is_success() {
            return response.json().await.map_err(map_client_error);
        }

        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<SubmissionResponse>(&body) {
            // 422 carries a structured rejection from the endpoint's own validation.
            Ok(rejection) if status == 422 && !rejection.success => Ok(rejection),
            Ok(rejection) => Err(TransportError::from_status(status, Some(rejection.message))),
            Err(_) => {
                warn!(status, "submission endpoint returned a non-JSON error body");
                Err(TransportError::from_status(status, None))
            }
        }
    }
}

fn map_client_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if let Some(status) = err.status() {
        TransportError::from_status(status.as_u16(), None)
    } else {
        TransportError::Network {
            detail: err.to_string(),
        }
    }
}

/// Offline stand-in that accepts most submissions after a short delay.
#[derive(Debug, Clone)]
pub struct SimulatedSubmissionGateway {
    delay: Duration,
    failure_rate: f64,
}

impl Default for SimulatedSubmissionGateway {
    fn default() -> Self {
        Self::new(Duration::from_secs(2), 0.1)
    }
}

impl SimulatedSubmissionGateway {
    pub fn new(delay: Duration, failure_rate: f64) -> Self {
        let failure_rate = if failure_rate.is_finite() {
            failure_rate.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            delay,
            failure_rate,
        }
    }

    pub fn always_accept() -> Self {
        Self::new(Duration::ZERO, 0.0)
    }

    pub fn always_fail() -> Self {
        Self::new(Duration::ZERO, 1.0)
    }
}

#[async_trait]
impl SubmissionGateway for SimulatedSubmissionGateway {
    async fn submit(&self, _form: &ApplicationForm) -> Result<SubmissionResponse, TransportError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let roll: f64 = rand::random();
        if roll < self.failure_rate {
            return Ok(SubmissionResponse::rejected(
                GENERIC_FAILURE,
                "Simulated API error",
            ));
        }

        Ok(SubmissionResponse::accepted(
            generate_application_id(),
            ACCEPTED_MESSAGE,
        ))
    }
}

/// `APP-<epoch millis>-<six uppercase alphanumerics>`.
pub fn generate_application_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|byte| char::from(byte).to_ascii_uppercase())
        .collect();
    format!("APP-{}-{}", Utc::now().timestamp_millis(), suffix)
}
