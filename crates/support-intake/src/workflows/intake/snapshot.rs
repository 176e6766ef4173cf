use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::domain::{
    ApplicationForm, HouseholdInfo, IdentityInfo, NarrativeInfo, Progress, Section, TOTAL_STEPS,
};

/// Serialized copy of the record plus progress metadata, as written to durable storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSnapshot {
    pub personal_info: IdentityInfo,
    pub family_financial_info: HouseholdInfo,
    pub situation_descriptions: NarrativeInfo,
    pub current_step: u8,
    pub completed_steps: Vec<u8>,
}

/// Reasons a snapshot cannot be turned back into wizard state.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot is not valid JSON for the expected shape: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("snapshot could not be encoded: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("snapshot step {found} is outside 1..={max}")]
    StepOutOfRange { found: u8, max: u8 },
}

impl FormSnapshot {
    pub fn capture(form: &ApplicationForm, progress: &Progress) -> Self {
        Self {
            personal_info: form.identity.clone(),
            family_financial_info: form.household.clone(),
            situation_descriptions: form.narrative.clone(),
            current_step: progress.current_step().step(),
            completed_steps: progress
                .completed_steps()
                .iter()
                .map(|section| section.step())
                .collect(),
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(raw).map_err(SnapshotError::Decode)?;
        snapshot.progress()?;
        Ok(snapshot)
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string(self).map_err(SnapshotError::Encode)
    }

    /// Rebuild progress metadata, rejecting step indices outside the wizard.
    pub fn progress(&self) -> Result<Progress, SnapshotError> {
        let current = section_for(self.current_step)?;
        let completed = self
            .completed_steps
            .iter()
            .map(|step| section_for(*step))
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Progress::new(current, completed))
    }

    pub fn into_parts(self) -> Result<(ApplicationForm, Progress), SnapshotError> {
        let progress = self.progress()?;
        let form = ApplicationForm {
            identity: self.personal_info,
            household: self.family_financial_info,
            narrative: self.situation_descriptions,
        };
        Ok((form, progress))
    }
}

fn section_for(step: u8) -> Result<Section, SnapshotError> {
    Section::from_step(step).ok_or(SnapshotError::StepOutOfRange {
        found: step,
        max: TOTAL_STEPS,
    })
}
