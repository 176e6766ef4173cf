mod config;
mod patterns;
mod rules;

pub use config::{ValidationPolicy, DEFAULT_MAX_DEPENDENTS, DEFAULT_NARRATIVE_MIN_CHARS};

use serde::Serialize;

use super::domain::{ApplicationForm, Field, Section};

/// One failed rule, tied to the field that failed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: Field,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Outcome of a section or full-record check. Errors keep section then declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<FieldViolation>,
}

impl ValidationReport {
    fn from_violations(errors: Vec<FieldViolation>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .map(|violation| violation.message.clone())
            .collect()
    }

    pub fn mentions(&self, field: Field) -> bool {
        self.errors.iter().any(|violation| violation.field == field)
    }

    pub fn summary(&self) -> String {
        if self.valid {
            "all fields valid".to_string()
        } else {
            self.messages().join("; ")
        }
    }
}

/// Stateless checker applying a [`ValidationPolicy`] to the record.
#[derive(Debug, Clone, Default)]
pub struct ValidationEngine {
    policy: ValidationPolicy,
}

impl ValidationEngine {
    pub fn new(policy: ValidationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    pub fn validate_section(&self, form: &ApplicationForm, section: Section) -> ValidationReport {
        ValidationReport::from_violations(self.section_violations(form, section))
    }

    /// Re-run every section's rules; used only right before submission.
    pub fn validate_record(&self, form: &ApplicationForm) -> ValidationReport {
        let errors = Section::ALL
            .into_iter()
            .flat_map(|section| self.section_violations(form, section))
            .collect();
        ValidationReport::from_violations(errors)
    }

    fn section_violations(&self, form: &ApplicationForm, section: Section) -> Vec<FieldViolation> {
        match section {
            Section::Identity => rules::identity_violations(&form.identity, &self.policy),
            Section::Household => rules::household_violations(&form.household, &self.policy),
            Section::Narrative => rules::narrative_violations(&form.narrative, &self.policy),
        }
    }
}
