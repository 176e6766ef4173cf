use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use super::domain::ApplicationForm;
use super::gateway::{generate_application_id, SubmissionResponse, ACCEPTED_MESSAGE};
use super::validation::{ValidationEngine, ValidationPolicy, ValidationReport};

/// Application accepted by the reference endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptedApplication {
    pub application_id: String,
    pub received_at: DateTime<Utc>,
    pub form: ApplicationForm,
}

impl AcceptedApplication {
    pub fn receipt(&self) -> SubmissionResponse {
        SubmissionResponse::accepted(self.application_id.clone(), ACCEPTED_MESSAGE)
    }

    pub fn status_view(&self) -> ApplicationStatusView {
        ApplicationStatusView {
            application_id: self.application_id.clone(),
            status: "received",
            received_at: self.received_at,
            applicant_name: self.form.identity.full_name.trim().to_string(),
        }
    }
}

/// What the status lookup exposes; the full record stays server side.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStatusView {
    pub application_id: String,
    pub status: &'static str,
    pub received_at: DateTime<Utc>,
    pub applicant_name: String,
}

/// Storage for accepted applications.
pub trait ApplicationLedger: Send + Sync {
    fn record(&self, application: AcceptedApplication)
        -> Result<AcceptedApplication, LedgerError>;
    fn fetch(&self, application_id: &str) -> Result<Option<AcceptedApplication>, LedgerError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("application already recorded")]
    Conflict,
    #[error("application not found")]
    NotFound,
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AcceptanceError {
    #[error("application failed validation: {}", .0.summary())]
    Invalid(ValidationReport),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Server-side counterpart of the submission gateway: re-validates and records.
pub struct AcceptanceService<L> {
    ledger: Arc<L>,
    engine: ValidationEngine,
}

impl<L> AcceptanceService<L>
where
    L: ApplicationLedger + 'static,
{
    pub fn new(ledger: Arc<L>, policy: ValidationPolicy) -> Self {
        Self {
            ledger,
            engine: ValidationEngine::new(policy),
        }
    }

    pub fn accept(&self, form: ApplicationForm) -> Result<AcceptedApplication, AcceptanceError> {
        let report = self.engine.validate_record(&form);
        if !report.valid {
            info!(
                errors = report.errors.len(),
                "rejected application failing validation"
            );
            return Err(AcceptanceError::Invalid(report));
        }

        let accepted = self.ledger.record(AcceptedApplication {
            application_id: generate_application_id(),
            received_at: Utc::now(),
            form,
        })?;
        info!(application_id = %accepted.application_id, "application accepted");
        Ok(accepted)
    }

    pub fn get(&self, application_id: &str) -> Result<AcceptedApplication, AcceptanceError> {
        let accepted = self
            .ledger
            .fetch(application_id)?
            .ok_or(LedgerError::NotFound)?;
        Ok(accepted)
    }
}
