//! Writing-assistance contract for the narrative fields.
//!
//! The text generator itself is an external service. This module owns the request and
//! response shapes, the per-field prompts, and a canned fallback used whenever no credential
//! is configured.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use super::domain::NarrativeField;
use crate::config::SuggestionConfig;

const SYSTEM_PROMPT: &str = "You are a helpful assistant that helps people write clear, professional descriptions for government social support applications. Provide empathetic, honest, and factual responses that help applicants express their situations clearly while maintaining dignity.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionRequest {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionResponse {
    pub suggestion: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SuggestionResponse {
    fn ok(suggestion: impl Into<String>) -> Self {
        Self {
            suggestion: suggestion.into(),
            success: true,
            error: None,
        }
    }

    fn failed(error: impl Into<String>) -> Self {
        Self {
            suggestion: String::new(),
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Build the assistance prompt for a narrative field, quoting any draft text.
pub fn prompt_for(field: NarrativeField, existing_text: Option<&str>) -> String {
    let draft = existing_text.map(str::trim).filter(|text| !text.is_empty());
    let (ask, fallback) = match field {
        NarrativeField::CurrentFinancialSituation => (
            "Help me describe my current financial situation for a government assistance application. I need to explain my income, expenses, and any financial hardships I'm facing.",
            "Please provide a clear, honest description.",
        ),
        NarrativeField::EmploymentCircumstances => (
            "Help me describe my employment circumstances for a government assistance application. I need to explain my job status, work history, and any employment challenges I'm facing.",
            "Please provide a clear, professional description.",
        ),
        NarrativeField::ReasonForApplying => (
            "Help me explain why I am applying for government financial assistance and how it would help my situation. I need to clearly articulate my need for support.",
            "Please provide a compelling, honest explanation.",
        ),
    };

    match draft {
        Some(text) => format!("{ask} Current text: \"{text}\""),
        None => format!("{ask} {fallback}"),
    }
}

/// Opaque text generator answering a single suggestion request.
#[async_trait]
pub trait SuggestionService: Send + Sync {
    async fn suggest(&self, request: &SuggestionRequest) -> SuggestionResponse;
}

/// Pick the configured service; a missing credential degrades to canned suggestions.
pub fn suggestion_service(config: &SuggestionConfig) -> Box<dyn SuggestionService> {
    match config.api_key.as_deref() {
        Some(key) => match OpenAiSuggestionService::new(key, config) {
            Ok(service) => Box::new(service),
            Err(err) => {
                warn!(error = %err, "suggestion client unavailable; using canned suggestions");
                Box::new(CannedSuggestionService::default())
            }
        },
        None => {
            info!("no suggestion credential configured; using canned suggestions");
            Box::new(CannedSuggestionService::default())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptCategory {
    Financial,
    Employment,
    Reason,
}

impl PromptCategory {
    fn classify(prompt: &str) -> Self {
        let lowered = prompt.to_lowercase();
        let mentions = |words: &[&str]| words.iter().any(|word| lowered.contains(word));
        if mentions(&["financial situation"]) {
            PromptCategory::Financial
        } else if mentions(&["employment", "work", "job"]) {
            PromptCategory::Employment
        } else if mentions(&["reason", "applying", "assistance"]) {
            PromptCategory::Reason
        } else {
            PromptCategory::Financial
        }
    }

    fn responses(self) -> &'static [&'static str] {
        match self {
            PromptCategory::Financial => &[
                "I am currently facing significant financial hardship due to unexpected medical expenses and reduced income. My monthly expenses exceed my current income, making it difficult to afford basic necessities like food, utilities, and housing. I have exhausted my savings and am struggling to maintain stable living conditions for my family.",
                "My family's financial situation has become increasingly challenging following a job loss three months ago. Our household expenses, including rent, utilities, and childcare, continue to accumulate while our income has dropped significantly.",
                "A severe decline in my small business revenue has left me unable to meet basic business expenses and personal financial obligations, putting my family's livelihood at risk.",
            ],
            PromptCategory::Employment => &[
                "I have been unemployed for the past six months after my previous employer downsized operations. Despite submitting numerous applications and attending interviews, I have not secured employment that provides adequate income for my family's needs.",
                "As a single parent, I face challenges in maintaining steady employment due to childcare responsibilities and a lack of flexible work arrangements. My previous part-time positions did not provide sufficient income or benefits.",
                "I was recently laid off from my manufacturing job due to company restructuring. Despite many years of experience in the industry, the shift to new technologies has made it difficult to find comparable work.",
            ],
            PromptCategory::Reason => &[
                "I am applying for financial assistance to bridge the gap between my current income and essential living expenses while I work towards financial stability. This support would help me maintain housing and provide adequate nutrition for my family.",
                "The financial assistance would provide crucial support during this transitional period, allowing me to focus on job searching and skills development without compromising my family's basic needs.",
                "I am seeking financial assistance to cover immediate necessities while I rebuild my financial foundation, preventing further debt and giving me the stability to pursue long-term solutions.",
            ],
        }
    }
}

/// Offline suggestions rotating through fixed paragraphs per topic.
#[derive(Debug, Default)]
pub struct CannedSuggestionService {
    cursor: AtomicUsize,
}

#[async_trait]
impl SuggestionService for CannedSuggestionService {
    async fn suggest(&self, request: &SuggestionRequest) -> SuggestionResponse {
        let responses = PromptCategory::classify(&request.prompt).responses();
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % responses.len();
        SuggestionResponse::ok(responses[index])
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SuggestionClientError {
    #[error("failed to build suggestion client: {0}")]
    Client(String),
}

/// Chat-completions backed suggestions.
#[derive(Debug, Clone)]
pub struct OpenAiSuggestionService {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl OpenAiSuggestionService {
    pub fn new(api_key: &str, config: &SuggestionConfig) -> Result<Self, SuggestionClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| SuggestionClientError::Client(err.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
        })
    }

    async fn request_completion(&self, request: &SuggestionRequest) -> Result<String, String> {
        let content = match &request.context {
            Some(context) if !context.trim().is_empty() => {
                format!("{} Context: {}", request.prompt, context)
            }
            _ => request.prompt.clone(),
        };

        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": content },
            ],
            "max_tokens": 300,
            "temperature": 0.7,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    "Request timed out. Please try again.".to_string()
                } else {
                    "Failed to generate suggestion. Please try again.".to_string()
                }
            })?;

        let status = response.status().as_u16();
        match status {
            200..=299 => {}
            401 => return Err("API authentication failed. Please check your API key.".to_string()),
            429 => {
                return Err("Rate limit exceeded. Please wait a moment and try again.".to_string())
            }
            500..=599 => {
                return Err(
                    "AI service is temporarily unavailable. Please try again later.".to_string(),
                )
            }
            _ => return Err("Failed to generate suggestion. Please try again.".to_string()),
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|_| "Failed to generate suggestion. Please try again.".to_string())?;

        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .ok_or_else(|| "No suggestion received from AI service".to_string())
    }
}

#[async_trait]
impl SuggestionService for OpenAiSuggestionService {
    async fn suggest(&self, request: &SuggestionRequest) -> SuggestionResponse {
        match self.request_completion(request).await {
            Ok(suggestion) => SuggestionResponse::ok(suggestion),
            Err(message) => {
                warn!(error = %message, "suggestion request failed");
                SuggestionResponse::failed(message)
            }
        }
    }
}
