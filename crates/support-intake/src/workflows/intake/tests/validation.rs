use super::common::*;
use rust_decimal_macros::dec;

use crate::workflows::intake::domain::{
    ApplicationForm, Field, HouseholdField, IdentityField, NarrativeField, Section,
};
use crate::workflows::intake::validation::{ValidationEngine, ValidationPolicy};

fn engine() -> ValidationEngine {
    ValidationEngine::default()
}

#[test]
fn complete_record_passes_every_section() {
    let form = valid_form();
    for section in Section::ALL {
        let report = engine().validate_section(&form, section);
        assert!(report.valid, "{section:?}: {}", report.summary());
        assert!(report.errors.is_empty());
    }
    assert!(engine().validate_record(&form).valid);
}

#[test]
fn empty_identity_lists_every_field_in_order() {
    let report = engine().validate_section(&ApplicationForm::default(), Section::Identity);
    assert!(!report.valid);
    let fields: Vec<_> = report.errors.iter().map(|violation| violation.field).collect();
    let expected: Vec<_> = IdentityField::ALL.into_iter().map(Field::Identity).collect();
    assert_eq!(fields, expected);
    assert_eq!(report.messages()[0], "Full name is required");
    assert_eq!(report.messages()[2], "Date of birth is required");
}

#[test]
fn whitespace_only_text_counts_as_missing() {
    let mut form = valid_form();
    form.identity.city = "   ".to_string();
    let report = engine().validate_section(&form, Section::Identity);
    assert_eq!(report.messages(), vec!["City is required".to_string()]);
}

#[test]
fn identity_minimum_lengths_apply() {
    let mut form = valid_form();
    form.identity.full_name = "M".to_string();
    form.identity.national_id = "1234".to_string();
    let report = engine().validate_section(&form, Section::Identity);
    assert_eq!(
        report.messages(),
        vec![
            "Full name must be at least 2 characters".to_string(),
            "National ID must be at least 5 characters".to_string(),
        ]
    );
}

#[test]
fn contact_formats_are_checked() {
    let mut form = valid_form();
    form.identity.phone = "0501234567".to_string();
    form.identity.email = "mariam@example".to_string();
    let report = engine().validate_section(&form, Section::Identity);
    assert!(report.mentions(Field::Identity(IdentityField::Phone)));
    assert!(report.mentions(Field::Identity(IdentityField::Email)));
    assert!(report
        .messages()
        .contains(&"Please enter a valid phone number".to_string()));
    assert!(report
        .messages()
        .contains(&"Please enter a valid email address".to_string()));

    form.identity.phone = "971501234567".to_string();
    form.identity.email = "m.h@mail.example.org".to_string();
    assert!(engine().validate_section(&form, Section::Identity).valid);
}

#[test]
fn padded_contact_details_fail_format_checks() {
    let mut form = valid_form();
    form.identity.email = " mariam@example.com".to_string();
    form.identity.phone = "+971501234567 ".to_string();

    let report = engine().validate_section(&form, Section::Identity);
    assert!(!report.valid);
    assert!(report.mentions(Field::Identity(IdentityField::Phone)));
    assert!(report.mentions(Field::Identity(IdentityField::Email)));
    assert!(report
        .messages()
        .contains(&"Please enter a valid email address".to_string()));
}

#[test]
fn unknown_option_codes_are_rejected() {
    let mut form = valid_form();
    form.identity.gender = "unknown".to_string();
    form.household.housing_status = "castle".to_string();

    let identity = engine().validate_section(&form, Section::Identity);
    assert_eq!(
        identity.messages(),
        vec!["Gender must be one of: male, female, other, prefer_not_to_say".to_string()]
    );
    let household = engine().validate_section(&form, Section::Household);
    assert!(household.mentions(Field::Household(HouseholdField::HousingStatus)));
}

#[test]
fn dependents_and_income_bounds() {
    let mut form = valid_form();
    form.household.dependents = -1;
    form.household.monthly_income = dec!(-0.01);
    let report = engine().validate_section(&form, Section::Household);
    assert_eq!(
        report.messages(),
        vec![
            "Number of dependents cannot be negative".to_string(),
            "Monthly income cannot be negative".to_string(),
        ]
    );

    form.household.dependents = 21;
    form.household.monthly_income = dec!(0);
    let report = engine().validate_section(&form, Section::Household);
    assert_eq!(
        report.messages(),
        vec!["Number of dependents cannot exceed 20".to_string()]
    );

    form.household.dependents = 20;
    assert!(engine().validate_section(&form, Section::Household).valid);
}

#[test]
fn narrative_needs_fifty_characters() {
    let mut form = valid_form();
    form.narrative.employment_circumstances = "a".repeat(49);
    let report = engine().validate_section(&form, Section::Narrative);
    assert_eq!(
        report.messages(),
        vec!["Employment circumstances description must be at least 50 characters".to_string()]
    );

    form.narrative.employment_circumstances = "a".repeat(50);
    assert!(engine().validate_section(&form, Section::Narrative).valid);
}

#[test]
fn empty_narrative_reports_required_not_length() {
    let mut form = valid_form();
    form.narrative.reason_for_applying.clear();
    let report = engine().validate_section(&form, Section::Narrative);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].message.ends_with("is required"));
    assert_eq!(
        report.errors[0].field,
        Field::Narrative(NarrativeField::ReasonForApplying)
    );
}

#[test]
fn full_record_orders_errors_by_section() {
    let mut form = valid_form();
    form.narrative.current_financial_situation.clear();
    form.household.marital_status.clear();
    form.identity.email.clear();

    let report = engine().validate_record(&form);
    let sections: Vec<_> = report
        .errors
        .iter()
        .map(|violation| violation.field.section())
        .collect();
    assert_eq!(
        sections,
        vec![Section::Identity, Section::Household, Section::Narrative]
    );
}

#[test]
fn policy_thresholds_are_configurable() {
    let engine = ValidationEngine::new(ValidationPolicy {
        narrative_min_chars: 10,
        max_dependents: 1,
        ..ValidationPolicy::default()
    });
    let mut form = valid_form();
    form.narrative.reason_for_applying = "Need rent.".to_string();
    form.household.dependents = 2;

    assert!(engine.validate_section(&form, Section::Narrative).valid);
    assert!(!engine.validate_section(&form, Section::Household).valid);
}
