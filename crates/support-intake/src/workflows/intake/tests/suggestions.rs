use crate::config::SuggestionConfig;
use crate::workflows::intake::domain::NarrativeField;
use crate::workflows::intake::suggestions::{
    prompt_for, suggestion_service, CannedSuggestionService, SuggestionRequest, SuggestionService,
};

#[test]
fn prompts_quote_existing_draft() {
    let prompt = prompt_for(
        NarrativeField::EmploymentCircumstances,
        Some("  I lost my job in March.  "),
    );
    assert!(prompt.contains("employment circumstances"));
    assert!(prompt.ends_with("Current text: \"I lost my job in March.\""));
}

#[test]
fn prompts_without_draft_ask_for_a_fresh_description() {
    let prompt = prompt_for(NarrativeField::ReasonForApplying, Some("   "));
    assert!(prompt.ends_with("Please provide a compelling, honest explanation."));
    assert!(!prompt.contains("Current text"));
}

#[tokio::test]
async fn canned_service_matches_prompt_topic() {
    let service = CannedSuggestionService::default();

    let financial = service
        .suggest(&SuggestionRequest {
            prompt: prompt_for(NarrativeField::CurrentFinancialSituation, None),
            context: None,
        })
        .await;
    assert!(financial.success);
    assert!(financial.suggestion.contains("financial"));

    let employment = service
        .suggest(&SuggestionRequest {
            prompt: prompt_for(NarrativeField::EmploymentCircumstances, None),
            context: None,
        })
        .await;
    assert!(employment.success);
    assert!(
        employment.suggestion.contains("employ") || employment.suggestion.contains("job"),
        "{}",
        employment.suggestion
    );

    let reason = service
        .suggest(&SuggestionRequest {
            prompt: prompt_for(NarrativeField::ReasonForApplying, None),
            context: None,
        })
        .await;
    assert!(reason.success);
    assert!(reason.suggestion.contains("assistance") || reason.suggestion.contains("support"));
}

#[tokio::test]
async fn canned_service_rotates_through_responses() {
    let service = CannedSuggestionService::default();
    let request = SuggestionRequest {
        prompt: "Tell me about my job search".to_string(),
        context: None,
    };

    let first = service.suggest(&request).await.suggestion;
    let second = service.suggest(&request).await.suggestion;
    assert_ne!(first, second);
}

#[tokio::test]
async fn missing_credential_falls_back_to_canned_mode() {
    let service = suggestion_service(&SuggestionConfig::default());
    let response = service
        .suggest(&SuggestionRequest {
            prompt: prompt_for(NarrativeField::CurrentFinancialSituation, None),
            context: Some("two children".to_string()),
        })
        .await;
    assert!(response.success);
    assert!(response.error.is_none());
    assert!(!response.suggestion.is_empty());
}

#[test]
fn suggestion_contract_omits_absent_fields() {
    let value = serde_json::to_value(SuggestionRequest {
        prompt: "Help".to_string(),
        context: None,
    })
    .expect("json");
    assert!(value.get("context").is_none());
}
