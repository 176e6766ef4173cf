use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Number of wizard steps; one per [`Section`].
pub const TOTAL_STEPS: u8 = 3;

/// Field groupings collected by the wizard, in step order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Identity,
    Household,
    Narrative,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Identity, Section::Household, Section::Narrative];

    /// One-based step index used by the wizard and the persisted snapshot.
    pub const fn step(self) -> u8 {
        match self {
            Section::Identity => 1,
            Section::Household => 2,
            Section::Narrative => 3,
        }
    }

    pub const fn from_step(step: u8) -> Option<Self> {
        match step {
            1 => Some(Section::Identity),
            2 => Some(Section::Household),
            3 => Some(Section::Narrative),
            _ => None,
        }
    }

    pub const fn next(self) -> Option<Self> {
        Self::from_step(self.step() + 1)
    }

    pub const fn previous(self) -> Option<Self> {
        Self::from_step(self.step() - 1)
    }

    pub const fn is_last(self) -> bool {
        self.step() == TOTAL_STEPS
    }

    pub const fn label(self) -> &'static str {
        match self {
            Section::Identity => "personal information",
            Section::Household => "family and financial information",
            Section::Narrative => "situation descriptions",
        }
    }
}

/// Closed option set backing a select-style field.
///
/// Records keep the raw wire code so that a value outside the set is representable and can be
/// reported by validation instead of failing at deserialization time.
pub trait OptionSet: Copy + Sized + 'static {
    const OPTIONS: &'static [Self];

    fn code(self) -> &'static str;

    fn from_code(raw: &str) -> Option<Self> {
        Self::OPTIONS
            .iter()
            .copied()
            .find(|option| option.code() == raw)
    }

    fn codes() -> Vec<&'static str> {
        Self::OPTIONS.iter().map(|option| option.code()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Other,
    PreferNotToSay,
}

impl OptionSet for Gender {
    const OPTIONS: &'static [Self] = &[
        Gender::Male,
        Gender::Female,
        Gender::Other,
        Gender::PreferNotToSay,
    ];

    fn code(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
            Gender::PreferNotToSay => "prefer_not_to_say",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaritalStatus {
    Single,
    Married,
    Divorced,
    Widowed,
}

impl OptionSet for MaritalStatus {
    const OPTIONS: &'static [Self] = &[
        MaritalStatus::Single,
        MaritalStatus::Married,
        MaritalStatus::Divorced,
        MaritalStatus::Widowed,
    ];

    fn code(self) -> &'static str {
        match self {
            MaritalStatus::Single => "single",
            MaritalStatus::Married => "married",
            MaritalStatus::Divorced => "divorced",
            MaritalStatus::Widowed => "widowed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmploymentStatus {
    Employed,
    Unemployed,
    SelfEmployed,
    Retired,
    Student,
    Disabled,
}

impl OptionSet for EmploymentStatus {
    const OPTIONS: &'static [Self] = &[
        EmploymentStatus::Employed,
        EmploymentStatus::Unemployed,
        EmploymentStatus::SelfEmployed,
        EmploymentStatus::Retired,
        EmploymentStatus::Student,
        EmploymentStatus::Disabled,
    ];

    fn code(self) -> &'static str {
        match self {
            EmploymentStatus::Employed => "employed",
            EmploymentStatus::Unemployed => "unemployed",
            EmploymentStatus::SelfEmployed => "self_employed",
            EmploymentStatus::Retired => "retired",
            EmploymentStatus::Student => "student",
            EmploymentStatus::Disabled => "disabled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HousingStatus {
    Owned,
    Rented,
    LivingWithFamily,
    Homeless,
    TemporaryHousing,
}

impl OptionSet for HousingStatus {
    const OPTIONS: &'static [Self] = &[
        HousingStatus::Owned,
        HousingStatus::Rented,
        HousingStatus::LivingWithFamily,
        HousingStatus::Homeless,
        HousingStatus::TemporaryHousing,
    ];

    fn code(self) -> &'static str {
        match self {
            HousingStatus::Owned => "owned",
            HousingStatus::Rented => "rented",
            HousingStatus::LivingWithFamily => "living_with_family",
            HousingStatus::Homeless => "homeless",
            HousingStatus::TemporaryHousing => "temporary_housing",
        }
    }
}

/// Personal details collected on step one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityInfo {
    pub full_name: String,
    pub national_id: String,
    #[serde(with = "birth_date")]
    pub date_of_birth: Option<NaiveDate>,
    pub gender: String,
    #[serde(rename = "address")]
    pub street: String,
    pub city: String,
    #[serde(rename = "state")]
    pub region: String,
    pub country: String,
    pub phone: String,
    pub email: String,
}

impl IdentityInfo {
    pub fn gender(&self) -> Option<Gender> {
        Gender::from_code(&self.gender)
    }

    pub fn apply(&mut self, entry: IdentityEntry) {
        match entry {
            IdentityEntry::FullName(value) => self.full_name = value,
            IdentityEntry::NationalId(value) => self.national_id = value,
            IdentityEntry::DateOfBirth(value) => self.date_of_birth = value,
            IdentityEntry::Gender(value) => self.gender = value,
            IdentityEntry::Street(value) => self.street = value,
            IdentityEntry::City(value) => self.city = value,
            IdentityEntry::Region(value) => self.region = value,
            IdentityEntry::Country(value) => self.country = value,
            IdentityEntry::Phone(value) => self.phone = value,
            IdentityEntry::Email(value) => self.email = value,
        }
    }
}

/// Household composition and finances collected on step two.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdInfo {
    pub marital_status: String,
    pub dependents: i32,
    pub employment_status: String,
    /// Written as an exact JSON number; a snapshot reloads the same digits it saved.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub monthly_income: Decimal,
    pub housing_status: String,
}

impl HouseholdInfo {
    pub fn marital_status(&self) -> Option<MaritalStatus> {
        MaritalStatus::from_code(&self.marital_status)
    }

    pub fn employment_status(&self) -> Option<EmploymentStatus> {
        EmploymentStatus::from_code(&self.employment_status)
    }

    pub fn housing_status(&self) -> Option<HousingStatus> {
        HousingStatus::from_code(&self.housing_status)
    }

    pub fn apply(&mut self, entry: HouseholdEntry) {
        match entry {
            HouseholdEntry::MaritalStatus(value) => self.marital_status = value,
            HouseholdEntry::Dependents(value) => self.dependents = value,
            HouseholdEntry::EmploymentStatus(value) => self.employment_status = value,
            HouseholdEntry::MonthlyIncome(value) => self.monthly_income = value,
            HouseholdEntry::HousingStatus(value) => self.housing_status = value,
        }
    }
}

/// Free-text descriptions collected on step three.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeInfo {
    pub current_financial_situation: String,
    pub employment_circumstances: String,
    pub reason_for_applying: String,
}

impl NarrativeInfo {
    pub fn text(&self, field: NarrativeField) -> &str {
        match field {
            NarrativeField::CurrentFinancialSituation => &self.current_financial_situation,
            NarrativeField::EmploymentCircumstances => &self.employment_circumstances,
            NarrativeField::ReasonForApplying => &self.reason_for_applying,
        }
    }

    pub fn apply(&mut self, entry: NarrativeEntry) {
        match entry {
            NarrativeEntry::CurrentFinancialSituation(value) => {
                self.current_financial_situation = value
            }
            NarrativeEntry::EmploymentCircumstances(value) => self.employment_circumstances = value,
            NarrativeEntry::ReasonForApplying(value) => self.reason_for_applying = value,
        }
    }
}

/// The record under edit. Serializes with the field names the submission endpoint expects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationForm {
    #[serde(rename = "personalInfo")]
    pub identity: IdentityInfo,
    #[serde(rename = "familyFinancialInfo")]
    pub household: HouseholdInfo,
    #[serde(rename = "situationDescriptions")]
    pub narrative: NarrativeInfo,
}

impl ApplicationForm {
    pub fn apply(&mut self, update: SectionUpdate) {
        match update {
            SectionUpdate::Identity(entries) => {
                entries
                    .into_iter()
                    .for_each(|entry| self.identity.apply(entry));
            }
            SectionUpdate::Household(entries) => {
                entries
                    .into_iter()
                    .for_each(|entry| self.household.apply(entry));
            }
            SectionUpdate::Narrative(entries) => {
                entries
                    .into_iter()
                    .for_each(|entry| self.narrative.apply(entry));
            }
        }
    }
}

/// Step pointer plus the set of steps that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    current_step: Section,
    completed_steps: BTreeSet<Section>,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            current_step: Section::Identity,
            completed_steps: BTreeSet::new(),
        }
    }
}

impl Progress {
    pub fn new(current_step: Section, completed_steps: BTreeSet<Section>) -> Self {
        Self {
            current_step,
            completed_steps,
        }
    }

    pub fn current_step(&self) -> Section {
        self.current_step
    }

    pub fn completed_steps(&self) -> &BTreeSet<Section> {
        &self.completed_steps
    }

    pub fn is_completed(&self, section: Section) -> bool {
        self.completed_steps.contains(&section)
    }

    pub fn set_current_step(&mut self, section: Section) {
        self.current_step = section;
    }

    /// Returns `false` when the step was already recorded.
    pub fn mark_completed(&mut self, section: Section) -> bool {
        self.completed_steps.insert(section)
    }

    pub fn percentage(&self) -> u8 {
        let ratio = self.completed_steps.len() as f64 / TOTAL_STEPS as f64;
        (ratio * 100.0).round() as u8
    }
}

/// Exhaustive field list for the identity section, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IdentityField {
    FullName,
    NationalId,
    DateOfBirth,
    Gender,
    Street,
    City,
    Region,
    Country,
    Phone,
    Email,
}

impl IdentityField {
    pub const ALL: [IdentityField; 10] = [
        IdentityField::FullName,
        IdentityField::NationalId,
        IdentityField::DateOfBirth,
        IdentityField::Gender,
        IdentityField::Street,
        IdentityField::City,
        IdentityField::Region,
        IdentityField::Country,
        IdentityField::Phone,
        IdentityField::Email,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            IdentityField::FullName => "Full name",
            IdentityField::NationalId => "National ID",
            IdentityField::DateOfBirth => "Date of birth",
            IdentityField::Gender => "Gender",
            IdentityField::Street => "Address",
            IdentityField::City => "City",
            IdentityField::Region => "State",
            IdentityField::Country => "Country",
            IdentityField::Phone => "Phone number",
            IdentityField::Email => "Email address",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HouseholdField {
    MaritalStatus,
    Dependents,
    EmploymentStatus,
    MonthlyIncome,
    HousingStatus,
}

impl HouseholdField {
    pub const ALL: [HouseholdField; 5] = [
        HouseholdField::MaritalStatus,
        HouseholdField::Dependents,
        HouseholdField::EmploymentStatus,
        HouseholdField::MonthlyIncome,
        HouseholdField::HousingStatus,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            HouseholdField::MaritalStatus => "Marital status",
            HouseholdField::Dependents => "Number of dependents",
            HouseholdField::EmploymentStatus => "Employment status",
            HouseholdField::MonthlyIncome => "Monthly income",
            HouseholdField::HousingStatus => "Housing status",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NarrativeField {
    CurrentFinancialSituation,
    EmploymentCircumstances,
    ReasonForApplying,
}

impl NarrativeField {
    pub const ALL: [NarrativeField; 3] = [
        NarrativeField::CurrentFinancialSituation,
        NarrativeField::EmploymentCircumstances,
        NarrativeField::ReasonForApplying,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            NarrativeField::CurrentFinancialSituation => "Current financial situation description",
            NarrativeField::EmploymentCircumstances => "Employment circumstances description",
            NarrativeField::ReasonForApplying => "Reason for applying description",
        }
    }
}

/// Any field of the record, tagged by section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "section", content = "field", rename_all = "snake_case")]
pub enum Field {
    Identity(IdentityField),
    Household(HouseholdField),
    Narrative(NarrativeField),
}

impl Field {
    pub const fn section(self) -> Section {
        match self {
            Field::Identity(_) => Section::Identity,
            Field::Household(_) => Section::Household,
            Field::Narrative(_) => Section::Narrative,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Field::Identity(field) => field.label(),
            Field::Household(field) => field.label(),
            Field::Narrative(field) => field.label(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Single identity field assignment issued by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityEntry {
    FullName(String),
    NationalId(String),
    DateOfBirth(Option<NaiveDate>),
    Gender(String),
    Street(String),
    City(String),
    Region(String),
    Country(String),
    Phone(String),
    Email(String),
}

impl IdentityEntry {
    pub fn field(&self) -> IdentityField {
        match self {
            IdentityEntry::FullName(_) => IdentityField::FullName,
            IdentityEntry::NationalId(_) => IdentityField::NationalId,
            IdentityEntry::DateOfBirth(_) => IdentityField::DateOfBirth,
            IdentityEntry::Gender(_) => IdentityField::Gender,
            IdentityEntry::Street(_) => IdentityField::Street,
            IdentityEntry::City(_) => IdentityField::City,
            IdentityEntry::Region(_) => IdentityField::Region,
            IdentityEntry::Country(_) => IdentityField::Country,
            IdentityEntry::Phone(_) => IdentityField::Phone,
            IdentityEntry::Email(_) => IdentityField::Email,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HouseholdEntry {
    MaritalStatus(String),
    Dependents(i32),
    EmploymentStatus(String),
    MonthlyIncome(Decimal),
    HousingStatus(String),
}

impl HouseholdEntry {
    pub fn field(&self) -> HouseholdField {
        match self {
            HouseholdEntry::MaritalStatus(_) => HouseholdField::MaritalStatus,
            HouseholdEntry::Dependents(_) => HouseholdField::Dependents,
            HouseholdEntry::EmploymentStatus(_) => HouseholdField::EmploymentStatus,
            HouseholdEntry::MonthlyIncome(_) => HouseholdField::MonthlyIncome,
            HouseholdEntry::HousingStatus(_) => HouseholdField::HousingStatus,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NarrativeEntry {
    CurrentFinancialSituation(String),
    EmploymentCircumstances(String),
    ReasonForApplying(String),
}

impl NarrativeEntry {
    pub fn new(field: NarrativeField, value: impl Into<String>) -> Self {
        let value = value.into();
        match field {
            NarrativeField::CurrentFinancialSituation => {
                NarrativeEntry::CurrentFinancialSituation(value)
            }
            NarrativeField::EmploymentCircumstances => NarrativeEntry::EmploymentCircumstances(value),
            NarrativeField::ReasonForApplying => NarrativeEntry::ReasonForApplying(value),
        }
    }

    pub fn field(&self) -> NarrativeField {
        match self {
            NarrativeEntry::CurrentFinancialSituation(_) => NarrativeField::CurrentFinancialSituation,
            NarrativeEntry::EmploymentCircumstances(_) => NarrativeField::EmploymentCircumstances,
            NarrativeEntry::ReasonForApplying(_) => NarrativeField::ReasonForApplying,
        }
    }
}

/// Partial update scoped to exactly one section; unspecified fields keep their value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionUpdate {
    Identity(Vec<IdentityEntry>),
    Household(Vec<HouseholdEntry>),
    Narrative(Vec<NarrativeEntry>),
}

impl SectionUpdate {
    pub fn section(&self) -> Section {
        match self {
            SectionUpdate::Identity(_) => Section::Identity,
            SectionUpdate::Household(_) => Section::Household,
            SectionUpdate::Narrative(_) => Section::Narrative,
        }
    }
}

/// Date inputs arrive as `YYYY-MM-DD`; an untouched date field is the empty string.
mod birth_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub(super) fn serialize<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(date) => serializer.collect_str(&date.format(FORMAT)),
            None => serializer.serialize_str(""),
        }
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        NaiveDate::parse_from_str(trimmed, FORMAT)
            .map(Some)
            .map_err(|err| {
                serde::de::Error::custom(format!(
                    "failed to parse '{raw}' as YYYY-MM-DD ({err})"
                ))
            })
    }
}
