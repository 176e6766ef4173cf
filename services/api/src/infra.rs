use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use support_intake::workflows::intake::{AcceptedApplication, ApplicationLedger, LedgerError};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local ledger; accepted applications are lost on restart.
#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationLedger {
    records: Arc<Mutex<HashMap<String, AcceptedApplication>>>,
}

impl InMemoryApplicationLedger {
    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, AcceptedApplication>>, LedgerError> {
        self.records
            .lock()
            .map_err(|_| LedgerError::Unavailable("ledger mutex poisoned".to_string()))
    }
}

impl ApplicationLedger for InMemoryApplicationLedger {
    fn record(
        &self,
        application: AcceptedApplication,
    ) -> Result<AcceptedApplication, LedgerError> {
        let mut guard = self.lock()?;
        if guard.contains_key(&application.application_id) {
            return Err(LedgerError::Conflict);
        }
        guard.insert(application.application_id.clone(), application.clone());
        Ok(application)
    }

    fn fetch(&self, application_id: &str) -> Result<Option<AcceptedApplication>, LedgerError> {
        Ok(self.lock()?.get(application_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use support_intake::workflows::intake::ApplicationForm;

    fn accepted(id: &str) -> AcceptedApplication {
        AcceptedApplication {
            application_id: id.to_string(),
            received_at: Utc::now(),
            form: ApplicationForm::default(),
        }
    }

    #[test]
    fn ledger_rejects_duplicate_ids() {
        let ledger = InMemoryApplicationLedger::default();
        ledger.record(accepted("APP-1-AAAAAA")).expect("first insert");
        assert!(matches!(
            ledger.record(accepted("APP-1-AAAAAA")),
            Err(LedgerError::Conflict)
        ));
        assert!(ledger.fetch("APP-1-AAAAAA").expect("fetch").is_some());
        assert!(ledger.fetch("APP-2-BBBBBB").expect("fetch").is_none());
    }
}
