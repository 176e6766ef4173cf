use rust_decimal::Decimal;

use super::super::domain::{
    EmploymentStatus, Field, Gender, HouseholdField, HouseholdInfo, HousingStatus, IdentityField,
    IdentityInfo, MaritalStatus, NarrativeField, NarrativeInfo, OptionSet,
};
use super::config::ValidationPolicy;
use super::patterns;
use super::FieldViolation;

pub(crate) fn identity_violations(
    info: &IdentityInfo,
    policy: &ValidationPolicy,
) -> Vec<FieldViolation> {
    IdentityField::ALL
        .into_iter()
        .filter_map(|field| {
            check_identity(info, field, policy)
                .map(|message| FieldViolation::new(Field::Identity(field), message))
        })
        .collect()
}

pub(crate) fn household_violations(
    info: &HouseholdInfo,
    policy: &ValidationPolicy,
) -> Vec<FieldViolation> {
    HouseholdField::ALL
        .into_iter()
        .filter_map(|field| {
            check_household(info, field, policy)
                .map(|message| FieldViolation::new(Field::Household(field), message))
        })
        .collect()
}

pub(crate) fn narrative_violations(
    info: &NarrativeInfo,
    policy: &ValidationPolicy,
) -> Vec<FieldViolation> {
    NarrativeField::ALL
        .into_iter()
        .filter_map(|field| {
            let label = field.label();
            let text = info.text(field);
            required(text, label)
                .or_else(|| min_chars(text, policy.narrative_min_chars, label))
                .map(|message| FieldViolation::new(Field::Narrative(field), message))
        })
        .collect()
}

fn check_identity(
    info: &IdentityInfo,
    field: IdentityField,
    policy: &ValidationPolicy,
) -> Option<String> {
    let label = field.label();
    match field {
        IdentityField::FullName => required(&info.full_name, label)
            .or_else(|| min_chars(&info.full_name, policy.full_name_min_chars, label)),
        IdentityField::NationalId => required(&info.national_id, label)
            .or_else(|| min_chars(&info.national_id, policy.national_id_min_chars, label)),
        IdentityField::DateOfBirth => info
            .date_of_birth
            .is_none()
            .then(|| format!("{label} is required")),
        IdentityField::Gender => choice::<Gender>(&info.gender, label),
        IdentityField::Street => required(&info.street, label),
        IdentityField::City => required(&info.city, label),
        IdentityField::Region => required(&info.region, label),
        IdentityField::Country => required(&info.country, label),
        IdentityField::Phone => required(&info.phone, label).or_else(|| {
            (!patterns::is_phone(&info.phone))
                .then(|| "Please enter a valid phone number".to_string())
        }),
        IdentityField::Email => required(&info.email, label).or_else(|| {
            (!patterns::is_email(&info.email))
                .then(|| "Please enter a valid email address".to_string())
        }),
    }
}

fn check_household(
    info: &HouseholdInfo,
    field: HouseholdField,
    policy: &ValidationPolicy,
) -> Option<String> {
    let label = field.label();
    match field {
        HouseholdField::MaritalStatus => choice::<MaritalStatus>(&info.marital_status, label),
        HouseholdField::Dependents => {
            if info.dependents < 0 {
                Some(format!("{label} cannot be negative"))
            } else if info.dependents > policy.max_dependents {
                Some(format!(
                    "{label} cannot exceed {}",
                    policy.max_dependents
                ))
            } else {
                None
            }
        }
        HouseholdField::EmploymentStatus => {
            choice::<EmploymentStatus>(&info.employment_status, label)
        }
        HouseholdField::MonthlyIncome => (info.monthly_income < Decimal::ZERO)
            .then(|| format!("{label} cannot be negative")),
        HouseholdField::HousingStatus => choice::<HousingStatus>(&info.housing_status, label),
    }
}

fn required(value: &str, label: &str) -> Option<String> {
    value
        .trim()
        .is_empty()
        .then(|| format!("{label} is required"))
}

fn min_chars(value: &str, min: usize, label: &str) -> Option<String> {
    (value.trim().chars().count() < min)
        .then(|| format!("{label} must be at least {min} characters"))
}

fn choice<T: OptionSet>(value: &str, label: &str) -> Option<String> {
    required(value, label).or_else(|| {
        T::from_code(value).is_none().then(|| {
            format!("{label} must be one of: {}", T::codes().join(", "))
        })
    })
}
