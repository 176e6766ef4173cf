use tracing::{debug, info, warn};

use super::domain::{ApplicationForm, Progress, Section, SectionUpdate};
use super::persistence::{PersistenceError, SnapshotPersistence, SnapshotStore};
use super::snapshot::{FormSnapshot, SnapshotError};

/// How a store came to hold its initial state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    Restored,
    ColdStart,
    Discarded { reason: String },
}

/// Authoritative in-memory record and progress metadata for one wizard session.
///
/// Persistence mirrors this state on a best-effort basis; a failed write never rolls back
/// an in-memory mutation.
#[derive(Debug)]
pub struct FormStore<S> {
    form: ApplicationForm,
    progress: Progress,
    persistence: SnapshotPersistence<S>,
}

impl<S> FormStore<S>
where
    S: SnapshotStore,
{
    pub fn new(persistence: SnapshotPersistence<S>) -> Self {
        Self {
            form: ApplicationForm::default(),
            progress: Progress::default(),
            persistence,
        }
    }

    /// Open a store, resuming from the persisted snapshot when one is usable.
    pub fn restore(persistence: SnapshotPersistence<S>) -> (Self, RestoreOutcome) {
        let mut store = Self::new(persistence);
        let outcome = match store.persistence.load_checked() {
            Ok(Some(snapshot)) => match store.load_from(snapshot) {
                Ok(()) => RestoreOutcome::Restored,
                Err(err) => RestoreOutcome::Discarded {
                    reason: err.to_string(),
                },
            },
            Ok(None) => RestoreOutcome::ColdStart,
            Err(err) => {
                warn!(key = %store.persistence.key(), error = %err, "starting from an empty form");
                RestoreOutcome::Discarded {
                    reason: err.to_string(),
                }
            }
        };
        (store, outcome)
    }

    pub fn form(&self) -> &ApplicationForm {
        &self.form
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn current_step(&self) -> Section {
        self.progress.current_step()
    }

    pub fn persistence(&self) -> &SnapshotPersistence<S> {
        &self.persistence
    }

    /// Merge the given fields into one section. No validation happens here.
    pub fn update_section(&mut self, update: SectionUpdate) {
        self.form.apply(update);
    }

    /// Move the step pointer without consulting completion state.
    pub fn set_current_step(&mut self, section: Section) {
        self.progress.set_current_step(section);
    }

    pub fn mark_step_completed(&mut self, section: Section) -> bool {
        self.progress.mark_completed(section)
    }

    pub fn is_section_complete(&self, section: Section) -> bool {
        self.progress.is_completed(section)
    }

    pub fn progress_percentage(&self) -> u8 {
        self.progress.percentage()
    }

    pub fn snapshot(&self) -> FormSnapshot {
        FormSnapshot::capture(&self.form, &self.progress)
    }

    pub fn persist(&self) -> Result<(), PersistenceError> {
        self.persistence.save(&self.snapshot())
    }

    /// Return to defaults and drop the persisted snapshot. The in-memory reset always
    /// happens; a storage failure is handed back for the caller to surface.
    pub fn reset_all(&mut self) -> Result<(), PersistenceError> {
        self.form = ApplicationForm::default();
        self.progress = Progress::default();
        info!("application form reset");

        self.persistence.clear().map_err(|err| {
            warn!(key = %self.persistence.key(), error = %err, "failed to clear form snapshot");
            err
        })
    }

    /// Replace record and metadata wholesale. A malformed snapshot leaves state untouched.
    pub fn load_from(&mut self, snapshot: FormSnapshot) -> Result<(), SnapshotError> {
        let (form, progress) = snapshot.into_parts()?;
        self.form = form;
        self.progress = progress;
        debug!(
            current_step = self.progress.current_step().step(),
            completed = self.progress.completed_steps().len(),
            "form state loaded from snapshot"
        );
        Ok(())
    }

    pub fn load_from_json(&mut self, raw: &str) -> Result<(), SnapshotError> {
        let snapshot = FormSnapshot::from_json(raw)?;
        self.load_from(snapshot)
    }
}
