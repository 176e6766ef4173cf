use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::domain::{ApplicationForm, Section, SectionUpdate};
use super::gateway::{SubmissionGateway, SubmissionResponse, TransportError};
use super::persistence::{SnapshotPersistence, SnapshotStore};
use super::store::{FormStore, RestoreOutcome};
use super::validation::{ValidationEngine, ValidationPolicy, ValidationReport};

/// Observable wizard state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "step", rename_all = "snake_case")]
pub enum WizardState {
    Step(Section),
    Submitting,
    Succeeded,
}

/// Acknowledgement kept once the gateway accepted the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub application_id: Option<String>,
    pub message: String,
    /// A warning here means the submitted record may still be on disk and would be
    /// offered again on the next resume.
    pub snapshot_cleared: PersistStatus,
}

/// Whether the persisted mirror caught up with the in-memory state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PersistStatus {
    Persisted,
    Warning { message: String },
}

impl PersistStatus {
    pub fn is_persisted(&self) -> bool {
        matches!(self, PersistStatus::Persisted)
    }
}

/// Result of a successful forward step. On the last step `from == to`: the section is
/// recorded as complete and the application is ready to submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepTransition {
    pub from: Section,
    pub to: Section,
    pub persist: PersistStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionFailure {
    #[error("{message}")]
    Rejected { message: String },
    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("{} field(s) need attention: {}", .0.errors.len(), .0.summary())]
    Invalid(ValidationReport),
    #[error("already on the first step")]
    NoPreviousStep,
    #[error("submission starts from step {last} (currently on step {current})")]
    NotOnFinalStep { current: u8, last: u8 },
    #[error("a submission is already in progress")]
    SubmissionInFlight,
    #[error("no submission is in progress")]
    NotSubmitting,
    #[error("the application was already submitted; restart to begin a new one")]
    AlreadySubmitted,
    #[error(transparent)]
    Submission(#[from] SubmissionFailure),
}

impl WizardError {
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            WizardError::Invalid(report) => Some(report),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
    Editing,
    Submitting,
    Succeeded(SubmissionReceipt),
}

/// Drives one applicant through the three steps: gates forward progress on validation,
/// mirrors progress to storage, and hands the finished record to the gateway.
pub struct WizardController<S, G> {
    store: FormStore<S>,
    engine: ValidationEngine,
    gateway: Arc<G>,
    phase: Phase,
}

impl<S, G> WizardController<S, G>
where
    S: SnapshotStore,
    G: SubmissionGateway,
{
    pub fn new(store: FormStore<S>, gateway: Arc<G>, policy: ValidationPolicy) -> Self {
        Self {
            store,
            engine: ValidationEngine::new(policy),
            gateway,
            phase: Phase::Editing,
        }
    }

    /// Start a session, picking up any previously saved progress.
    pub fn resume(
        persistence: SnapshotPersistence<S>,
        gateway: Arc<G>,
        policy: ValidationPolicy,
    ) -> (Self, RestoreOutcome) {
        let (store, outcome) = FormStore::restore(persistence);
        if outcome == RestoreOutcome::Restored {
            info!(
                step = store.current_step().step(),
                "previous progress restored"
            );
        }
        (Self::new(store, gateway, policy), outcome)
    }

    pub fn state(&self) -> WizardState {
        match &self.phase {
            Phase::Editing => WizardState::Step(self.store.current_step()),
            Phase::Submitting => WizardState::Submitting,
            Phase::Succeeded(_) => WizardState::Succeeded,
        }
    }

    pub fn store(&self) -> &FormStore<S> {
        &self.store
    }

    pub fn form(&self) -> &ApplicationForm {
        self.store.form()
    }

    pub fn current_step(&self) -> Section {
        self.store.current_step()
    }

    pub fn progress_percentage(&self) -> u8 {
        self.store.progress_percentage()
    }

    pub fn receipt(&self) -> Option<&SubmissionReceipt> {
        match &self.phase {
            Phase::Succeeded(receipt) => Some(receipt),
            _ => None,
        }
    }

    /// Submit control should be disabled while this is true.
    pub fn is_submitting(&self) -> bool {
        self.phase == Phase::Submitting
    }

    pub fn update(&mut self, update: SectionUpdate) -> Result<(), WizardError> {
        self.ensure_editable()?;
        self.store.update_section(update);
        Ok(())
    }

    pub fn validate_current(&self) -> ValidationReport {
        self.engine
            .validate_section(self.store.form(), self.store.current_step())
    }

    pub fn advance(&mut self) -> Result<StepTransition, WizardError> {
        self.ensure_editable()?;
        let from = self.store.current_step();
        let report = self.engine.validate_section(self.store.form(), from);
        if !report.valid {
            info!(
                step = from.step(),
                errors = report.errors.len(),
                "step validation failed"
            );
            return Err(WizardError::Invalid(report));
        }

        let to = from.next().unwrap_or(from);
        self.store.mark_step_completed(from);
        self.store.set_current_step(to);
        let persist = self.persist();
        info!(from = from.step(), to = to.step(), "step completed");

        Ok(StepTransition { from, to, persist })
    }

    /// Step back without validation.
    pub fn back(&mut self) -> Result<Section, WizardError> {
        self.ensure_editable()?;
        let previous = self
            .store
            .current_step()
            .previous()
            .ok_or(WizardError::NoPreviousStep)?;
        self.store.set_current_step(previous);
        Ok(previous)
    }

    /// Step-indicator navigation. Display only: save and submit still validate.
    pub fn jump_to(&mut self, section: Section) -> Result<(), WizardError> {
        self.ensure_editable()?;
        self.store.set_current_step(section);
        Ok(())
    }

    pub fn save(&mut self) -> Result<PersistStatus, WizardError> {
        self.ensure_editable()?;
        Ok(self.persist())
    }

    /// Validate the whole record and enter `Submitting`, returning the record to send.
    pub fn begin_submission(&mut self) -> Result<ApplicationForm, WizardError> {
        self.ensure_editable()?;
        let current = self.store.current_step();
        if !current.is_last() {
            return Err(WizardError::NotOnFinalStep {
                current: current.step(),
                last: Section::Narrative.step(),
            });
        }

        let report = self.engine.validate_record(self.store.form());
        if !report.valid {
            info!(
                errors = report.errors.len(),
                "full record validation failed; submission blocked"
            );
            return Err(WizardError::Invalid(report));
        }

        self.store.mark_step_completed(current);
        self.persist();
        self.phase = Phase::Submitting;
        info!("submitting application");
        Ok(self.store.form().clone())
    }

    /// Apply the gateway's answer to an in-flight submission.
    pub fn complete_submission(
        &mut self,
        outcome: Result<SubmissionResponse, TransportError>,
    ) -> Result<SubmissionReceipt, WizardError> {
        if self.phase != Phase::Submitting {
            return Err(WizardError::NotSubmitting);
        }

        let response = match outcome {
            Ok(response) if response.success => response,
            Ok(response) => {
                self.phase = Phase::Editing;
                let message = response.failure_message();
                warn!(error = %message, "application rejected by submission endpoint");
                return Err(SubmissionFailure::Rejected { message }.into());
            }
            Err(err) => {
                self.phase = Phase::Editing;
                warn!(category = err.category(), error = %err, "application submission failed");
                return Err(SubmissionFailure::Transport(err).into());
            }
        };

        let snapshot_cleared = self.reset_store();
        let receipt = SubmissionReceipt {
            application_id: response.application_id,
            message: response.message,
            snapshot_cleared,
        };
        info!(
            application_id = receipt.application_id.as_deref().unwrap_or("unknown"),
            "application submitted"
        );
        self.phase = Phase::Succeeded(receipt.clone());
        Ok(receipt)
    }

    /// Validate, send, and settle in one call. Never retries on its own.
    pub async fn submit(&mut self) -> Result<SubmissionReceipt, WizardError> {
        let form = self.begin_submission()?;
        let gateway = Arc::clone(&self.gateway);
        let outcome = gateway.submit(&form).await;
        self.complete_submission(outcome)
    }

    /// Back to step one with an empty record, from any state.
    pub fn restart(&mut self) -> PersistStatus {
        self.phase = Phase::Editing;
        self.reset_store()
    }

    fn ensure_editable(&self) -> Result<(), WizardError> {
        match self.phase {
            Phase::Editing => Ok(()),
            Phase::Submitting => Err(WizardError::SubmissionInFlight),
            Phase::Succeeded(_) => Err(WizardError::AlreadySubmitted),
        }
    }

    fn reset_store(&mut self) -> PersistStatus {
        match self.store.reset_all() {
            Ok(()) => PersistStatus::Persisted,
            Err(err) => PersistStatus::Warning {
                message: err.to_string(),
            },
        }
    }

    fn persist(&self) -> PersistStatus {
        match self.store.persist() {
            Ok(()) => PersistStatus::Persisted,
            Err(err) => {
                warn!(error = %err, "could not save progress; continuing with in-memory state");
                PersistStatus::Warning {
                    message: err.to_string(),
                }
            }
        }
    }
}
