use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use serde_json::Value;

use crate::workflows::intake::acceptance::{
    AcceptedApplication, ApplicationLedger, LedgerError,
};
use crate::workflows::intake::domain::{
    ApplicationForm, HouseholdEntry, HouseholdInfo, IdentityEntry, IdentityInfo, NarrativeEntry,
    NarrativeInfo, SectionUpdate,
};
use crate::workflows::intake::gateway::{SubmissionGateway, SubmissionResponse, TransportError};
use crate::workflows::intake::persistence::{
    MemorySnapshotStore, SnapshotPersistence, SnapshotStore, STORAGE_KEY,
};
use crate::workflows::intake::snapshot::FormSnapshot;
use crate::workflows::intake::store::FormStore;
use crate::workflows::intake::validation::ValidationPolicy;
use crate::workflows::intake::wizard::WizardController;
use crate::workflows::intake::{acceptance_router, AcceptanceService};

pub(super) const FINANCIAL_SITUATION: &str = "Rent and utilities now take most of our income after my hours were cut at the warehouse.";
pub(super) const EMPLOYMENT_CIRCUMSTANCES: &str = "I work part time at a warehouse and have applied for full-time roles since the spring.";
pub(super) const REASON_FOR_APPLYING: &str = "Support would cover rent for a few months while I finish a forklift certification course.";

pub(super) fn identity() -> IdentityInfo {
    IdentityInfo {
        full_name: "Mariam Haddad".to_string(),
        national_id: "784-1990-1234567-1".to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(1990, 4, 12),
        gender: "female".to_string(),
        street: "14 Al Wasl Road".to_string(),
        city: "Dubai".to_string(),
        region: "Dubai".to_string(),
        country: "United Arab Emirates".to_string(),
        phone: "+971501234567".to_string(),
        email: "mariam.haddad@example.com".to_string(),
    }
}

pub(super) fn household() -> HouseholdInfo {
    HouseholdInfo {
        marital_status: "married".to_string(),
        dependents: 2,
        employment_status: "employed".to_string(),
        monthly_income: dec!(4250.50),
        housing_status: "rented".to_string(),
    }
}

pub(super) fn narrative() -> NarrativeInfo {
    NarrativeInfo {
        current_financial_situation: FINANCIAL_SITUATION.to_string(),
        employment_circumstances: EMPLOYMENT_CIRCUMSTANCES.to_string(),
        reason_for_applying: REASON_FOR_APPLYING.to_string(),
    }
}

pub(super) fn valid_form() -> ApplicationForm {
    ApplicationForm {
        identity: identity(),
        household: household(),
        narrative: narrative(),
    }
}

pub(super) fn identity_update() -> SectionUpdate {
    let info = identity();
    SectionUpdate::Identity(vec![
        IdentityEntry::FullName(info.full_name),
        IdentityEntry::NationalId(info.national_id),
        IdentityEntry::DateOfBirth(info.date_of_birth),
        IdentityEntry::Gender(info.gender),
        IdentityEntry::Street(info.street),
        IdentityEntry::City(info.city),
        IdentityEntry::Region(info.region),
        IdentityEntry::Country(info.country),
        IdentityEntry::Phone(info.phone),
        IdentityEntry::Email(info.email),
    ])
}

pub(super) fn household_update() -> SectionUpdate {
    let info = household();
    SectionUpdate::Household(vec![
        HouseholdEntry::MaritalStatus(info.marital_status),
        HouseholdEntry::Dependents(info.dependents),
        HouseholdEntry::EmploymentStatus(info.employment_status),
        HouseholdEntry::MonthlyIncome(info.monthly_income),
        HouseholdEntry::HousingStatus(info.housing_status),
    ])
}

pub(super) fn narrative_update() -> SectionUpdate {
    SectionUpdate::Narrative(vec![
        NarrativeEntry::CurrentFinancialSituation(FINANCIAL_SITUATION.to_string()),
        NarrativeEntry::EmploymentCircumstances(EMPLOYMENT_CIRCUMSTANCES.to_string()),
        NarrativeEntry::ReasonForApplying(REASON_FOR_APPLYING.to_string()),
    ])
}

pub(super) fn memory_persistence() -> (Arc<MemorySnapshotStore>, SnapshotPersistence<MemorySnapshotStore>)
{
    let store = Arc::new(MemorySnapshotStore::default());
    let persistence = SnapshotPersistence::new(Arc::clone(&store));
    (store, persistence)
}

/// Peek at what the wizard mirrored under the fixed key.
pub(super) trait SnapshotPeek {
    fn read_snapshot(&self) -> Option<FormSnapshot>;
}

impl SnapshotPeek for MemorySnapshotStore {
    fn read_snapshot(&self) -> Option<FormSnapshot> {
        self.read(STORAGE_KEY)
            .expect("memory store readable")
            .map(|raw| FormSnapshot::from_json(&raw).expect("well-formed snapshot"))
    }
}

/// Gateway answering every call with a fixed outcome and remembering what it received.
pub(super) struct ScriptedGateway {
    outcome: Result<SubmissionResponse, TransportError>,
    received: Mutex<Vec<ApplicationForm>>,
}

impl ScriptedGateway {
    pub(super) fn new(outcome: Result<SubmissionResponse, TransportError>) -> Self {
        Self {
            outcome,
            received: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn accepting(application_id: &str) -> Self {
        Self::new(Ok(SubmissionResponse::accepted(
            application_id,
            "Application submitted successfully",
        )))
    }

    pub(super) fn rejecting(error: &str) -> Self {
        Self::new(Ok(SubmissionResponse::rejected(
            "Failed to submit application. Please try again.",
            error,
        )))
    }

    pub(super) fn calls(&self) -> usize {
        self.received.lock().expect("gateway mutex").len()
    }

    pub(super) fn last_received(&self) -> Option<ApplicationForm> {
        self.received.lock().expect("gateway mutex").last().cloned()
    }
}

#[async_trait]
impl SubmissionGateway for ScriptedGateway {
    async fn submit(&self, form: &ApplicationForm) -> Result<SubmissionResponse, TransportError> {
        self.received
            .lock()
            .expect("gateway mutex")
            .push(form.clone());
        self.outcome.clone()
    }
}

pub(super) type TestWizard = WizardController<MemorySnapshotStore, ScriptedGateway>;

pub(super) fn wizard_with(
    gateway: ScriptedGateway,
) -> (TestWizard, Arc<MemorySnapshotStore>, Arc<ScriptedGateway>) {
    let (store, persistence) = memory_persistence();
    let gateway = Arc::new(gateway);
    let wizard = WizardController::new(
        FormStore::new(persistence),
        Arc::clone(&gateway),
        ValidationPolicy::default(),
    );
    (wizard, store, gateway)
}

/// Fill every section and walk to the last step.
pub(super) fn complete_wizard(wizard: &mut TestWizard) {
    wizard.update(identity_update()).expect("identity update");
    wizard.advance().expect("identity step passes");
    wizard.update(household_update()).expect("household update");
    wizard.advance().expect("household step passes");
    wizard.update(narrative_update()).expect("narrative update");
}

#[derive(Default)]
pub(super) struct MemoryLedger {
    entries: Mutex<HashMap<String, AcceptedApplication>>,
}

impl MemoryLedger {
    pub(super) fn len(&self) -> usize {
        self.entries.lock().expect("ledger mutex").len()
    }
}

impl ApplicationLedger for MemoryLedger {
    fn record(
        &self,
        application: AcceptedApplication,
    ) -> Result<AcceptedApplication, LedgerError> {
        let mut guard = self.entries.lock().expect("ledger mutex");
        if guard.contains_key(&application.application_id) {
            return Err(LedgerError::Conflict);
        }
        guard.insert(application.application_id.clone(), application.clone());
        Ok(application)
    }

    fn fetch(&self, application_id: &str) -> Result<Option<AcceptedApplication>, LedgerError> {
        Ok(self
            .entries
            .lock()
            .expect("ledger mutex")
            .get(application_id)
            .cloned())
    }
}

pub(super) struct ConflictLedger;

impl ApplicationLedger for ConflictLedger {
    fn record(
        &self,
        _application: AcceptedApplication,
    ) -> Result<AcceptedApplication, LedgerError> {
        Err(LedgerError::Conflict)
    }

    fn fetch(&self, _application_id: &str) -> Result<Option<AcceptedApplication>, LedgerError> {
        Ok(None)
    }
}

pub(super) struct UnavailableLedger;

impl ApplicationLedger for UnavailableLedger {
    fn record(
        &self,
        _application: AcceptedApplication,
    ) -> Result<AcceptedApplication, LedgerError> {
        Err(LedgerError::Unavailable("ledger offline".to_string()))
    }

    fn fetch(&self, _application_id: &str) -> Result<Option<AcceptedApplication>, LedgerError> {
        Err(LedgerError::Unavailable("ledger offline".to_string()))
    }
}

pub(super) fn acceptance_service() -> (Arc<AcceptanceService<MemoryLedger>>, Arc<MemoryLedger>) {
    let ledger = Arc::new(MemoryLedger::default());
    let service = Arc::new(AcceptanceService::new(
        Arc::clone(&ledger),
        ValidationPolicy::default(),
    ));
    (service, ledger)
}

pub(super) fn router_with_service(service: Arc<AcceptanceService<MemoryLedger>>) -> axum::Router {
    acceptance_router(service)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("body readable");
    serde_json::from_slice(&body).expect("json body")
}
