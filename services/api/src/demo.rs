use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use support_intake::config::AppConfig;
use support_intake::error::AppError;
use support_intake::telemetry;
use support_intake::workflows::intake::{
    prompt_for, suggestion_service, ApplicationForm, FileSnapshotStore, HouseholdEntry,
    HttpSubmissionGateway, IdentityEntry, NarrativeEntry, NarrativeField, PersistStatus,
    RestoreOutcome, Section, SectionUpdate, SimulatedSubmissionGateway, SnapshotPersistence,
    SubmissionGateway, SuggestionRequest, SuggestionService, ValidationPolicy, ValidationReport,
    WizardController, WizardError, WizardState, TOTAL_STEPS,
};

const SIMULATED_LATENCY: Duration = Duration::from_millis(400);
const SIMULATED_FAILURE_RATE: f64 = 0.1;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Directory holding the wizard snapshot. Defaults to the configured data dir.
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
    /// Submit to a running acceptance endpoint instead of the simulated gateway.
    #[arg(long)]
    pub(crate) gateway_url: Option<String>,
    /// Force the simulated gateway to reject the submission.
    #[arg(long)]
    pub(crate) fail_submission: bool,
    /// Continue from the saved snapshot instead of starting a fresh application.
    #[arg(long)]
    pub(crate) resume: bool,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        data_dir,
        gateway_url,
        fail_submission,
        resume,
    } = args;

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let data_dir = data_dir.unwrap_or_else(|| config.storage.data_dir.clone());
    let persistence = SnapshotPersistence::new(Arc::new(FileSnapshotStore::new(&data_dir)));
    if !resume {
        persistence.clear()?;
    }

    println!("Social support intake demo");
    println!("  snapshot directory: {}", data_dir.display());

    let suggestions = suggestion_service(&config.suggestions);
    let gateway_url = gateway_url.or_else(|| config.gateway.endpoint.clone());

    match gateway_url {
        Some(url) if !fail_submission => {
            println!("  submission gateway: {url}");
            let gateway = HttpSubmissionGateway::new(&url, config.gateway.timeout())?;
            run_session(persistence, Arc::new(gateway), suggestions.as_ref()).await
        }
        _ => {
            let gateway = if fail_submission {
                println!("  submission gateway: simulated (always rejects)");
                SimulatedSubmissionGateway::always_fail()
            } else {
                println!("  submission gateway: simulated");
                SimulatedSubmissionGateway::new(SIMULATED_LATENCY, SIMULATED_FAILURE_RATE)
            };
            run_session(persistence, Arc::new(gateway), suggestions.as_ref()).await
        }
    }
}

async fn run_session<G>(
    persistence: SnapshotPersistence<FileSnapshotStore>,
    gateway: Arc<G>,
    suggestions: &dyn SuggestionService,
) -> Result<(), AppError>
where
    G: SubmissionGateway,
{
    let (mut wizard, outcome) =
        WizardController::resume(persistence, gateway, ValidationPolicy::default());

    match outcome {
        RestoreOutcome::Restored => println!(
            "\nResumed saved application at step {} ({}% complete)",
            wizard.current_step().step(),
            wizard.progress_percentage()
        ),
        RestoreOutcome::ColdStart => println!("\nStarting a new application"),
        RestoreOutcome::Discarded { reason } => {
            println!("\nSaved application was unusable ({reason}); starting over")
        }
    }

    if wizard.current_step() == Section::Identity && wizard.form().identity.full_name.is_empty() {
        println!("\nTrying to continue with an empty first step");
        match wizard.advance() {
            Err(WizardError::Invalid(report)) => render_report(&report),
            Ok(_) => println!("  unexpectedly advanced"),
            Err(other) => return Err(other.into()),
        }
    }

    loop {
        let section = wizard.current_step();
        println!("\nStep {} of {TOTAL_STEPS}: {}", section.step(), section.label());

        let update = match section {
            Section::Identity => identity_update(),
            Section::Household => household_update(),
            Section::Narrative => narrative_update(suggestions, wizard.form()).await,
        };
        wizard.update(update)?;

        if section.is_last() {
            break;
        }

        let transition = wizard.advance()?;
        println!(
            "  step {} complete -> step {} ({}% complete, {})",
            transition.from.step(),
            transition.to.step(),
            wizard.progress_percentage(),
            if transition.persist.is_persisted() {
                "saved"
            } else {
                "not saved"
            }
        );
    }

    println!("\nSubmitting application");
    match wizard.submit().await {
        Ok(receipt) => {
            println!("  {}", receipt.message);
            if let Some(id) = receipt.application_id {
                println!("  application id: {id}");
            }
            if let PersistStatus::Warning { message } = receipt.snapshot_cleared {
                println!("  warning: saved answers could not be removed ({message})");
            }
        }
        Err(WizardError::Invalid(report)) => render_report(&report),
        Err(WizardError::Submission(failure)) => {
            println!("  submission failed: {failure}");
            println!(
                "  your answers were kept at step {}; run again with --resume to retry",
                wizard.current_step().step()
            );
        }
        Err(other) => return Err(other.into()),
    }

    if wizard.state() == WizardState::Succeeded {
        println!("  progress reset for the next applicant");
    }

    Ok(())
}

fn render_report(report: &ValidationReport) {
    println!("  blocked: {} field(s) need attention", report.errors.len());
    for message in report.messages() {
        println!("    - {message}");
    }
}

async fn narrative_update(
    suggestions: &dyn SuggestionService,
    form: &ApplicationForm,
) -> SectionUpdate {
    let mut entries = Vec::with_capacity(NarrativeField::ALL.len());
    for field in NarrativeField::ALL {
        let existing = form.narrative.text(field);
        let request = SuggestionRequest {
            prompt: prompt_for(field, Some(existing)),
            context: None,
        };
        let response = suggestions.suggest(&request).await;
        let text = if response.success {
            println!("  drafted {} with writing assistance", field.label());
            response.suggestion
        } else {
            println!(
                "  writing assistance unavailable for {} ({}); using prepared text",
                field.label(),
                response.error.unwrap_or_default()
            );
            prepared_narrative(field).to_string()
        };
        entries.push(NarrativeEntry::new(field, text));
    }
    SectionUpdate::Narrative(entries)
}

fn prepared_narrative(field: NarrativeField) -> &'static str {
    match field {
        NarrativeField::CurrentFinancialSituation => {
            "My household income no longer covers rent, school fees, and utilities, and our savings are exhausted."
        }
        NarrativeField::EmploymentCircumstances => {
            "I was laid off from my warehouse position in March and have applied to over twenty roles since then."
        }
        NarrativeField::ReasonForApplying => {
            "Temporary support would keep us housed while I complete a certified logistics course and return to work."
        }
    }
}

fn identity_update() -> SectionUpdate {
    SectionUpdate::Identity(vec![
        IdentityEntry::FullName("Mariam Al Nuaimi".to_string()),
        IdentityEntry::NationalId("784-1988-5521034-2".to_string()),
        IdentityEntry::DateOfBirth(NaiveDate::from_ymd_opt(1988, 4, 17)),
        IdentityEntry::Gender("female".to_string()),
        IdentityEntry::Street("22 Corniche Road".to_string()),
        IdentityEntry::City("Sharjah".to_string()),
        IdentityEntry::Region("Sharjah".to_string()),
        IdentityEntry::Country("United Arab Emirates".to_string()),
        IdentityEntry::Phone("+971501234567".to_string()),
        IdentityEntry::Email("mariam.nuaimi@example.org".to_string()),
    ])
}

fn household_update() -> SectionUpdate {
    SectionUpdate::Household(vec![
        HouseholdEntry::MaritalStatus("married".to_string()),
        HouseholdEntry::Dependents(2),
        HouseholdEntry::EmploymentStatus("unemployed".to_string()),
        HouseholdEntry::MonthlyIncome(Decimal::new(315000, 2)),
        HouseholdEntry::HousingStatus("rented".to_string()),
    ])
}

/// A complete record built from the demo applicant's answers.
#[cfg(test)]
pub(crate) fn sample_form() -> ApplicationForm {
    let mut form = ApplicationForm::default();
    form.apply(identity_update());
    form.apply(household_update());
    form.apply(SectionUpdate::Narrative(
        NarrativeField::ALL
            .into_iter()
            .map(|field| NarrativeEntry::new(field, prepared_narrative(field)))
            .collect(),
    ));
    form
}
