//! Multi-step social support intake: the record and its progress, section validation,
//! the wizard state machine, snapshot persistence, and the submission boundary.
//!
//! One [`WizardController`] owns one applicant's session. Forward movement is gated on
//! section validation while backward and indicator navigation are free; the full record is
//! re-validated right before it is handed to a [`SubmissionGateway`].

pub mod acceptance;
pub mod domain;
pub mod gateway;
pub mod persistence;
pub mod router;
pub mod snapshot;
pub mod store;
pub mod suggestions;
pub mod validation;
pub mod wizard;

#[cfg(test)]
mod tests;

pub use acceptance::{
    AcceptanceError, AcceptanceService, AcceptedApplication, ApplicationLedger,
    ApplicationStatusView, LedgerError,
};
pub use domain::{
    ApplicationForm, EmploymentStatus, Field, Gender, HouseholdEntry, HouseholdField,
    HouseholdInfo, HousingStatus, IdentityEntry, IdentityField, IdentityInfo, MaritalStatus,
    NarrativeEntry, NarrativeField, NarrativeInfo, OptionSet, Progress, Section, SectionUpdate,
    TOTAL_STEPS,
};
pub use gateway::{
    generate_application_id, HttpSubmissionGateway, SimulatedSubmissionGateway,
    SubmissionGateway, SubmissionResponse, TransportError, DEFAULT_SUBMISSION_TIMEOUT,
    SUBMISSION_PATH,
};
pub use persistence::{
    FileSnapshotStore, MemorySnapshotStore, PersistenceError, SnapshotPersistence,
    SnapshotStore, STORAGE_KEY,
};
pub use router::acceptance_router;
pub use snapshot::{FormSnapshot, SnapshotError};
pub use store::{FormStore, RestoreOutcome};
pub use suggestions::{
    prompt_for, suggestion_service, CannedSuggestionService, OpenAiSuggestionService,
    SuggestionRequest, SuggestionResponse, SuggestionService,
};
pub use validation::{FieldViolation, ValidationEngine, ValidationPolicy, ValidationReport};
pub use wizard::{
    PersistStatus, StepTransition, SubmissionFailure, SubmissionReceipt, WizardController,
    WizardError, WizardState,
};
