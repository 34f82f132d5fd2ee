use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::{
    errors::AnalysisError,
    food_db::relevant_foods,
    macros::MacroNutrients,
    parse::{parse_ai_response, RawAnalysis},
    prompt::{system_prompt, user_prompt},
    usda::UsdaClient,
};
use crate::config::GeminiConfig;

const USDA_CONTEXT_RESULTS: u8 = 3;
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Produces a raw macro estimate for a meal description.
#[async_trait]
pub trait Estimator: Send + Sync {
    async fn estimate(
        &self,
        description: &str,
        previous: Option<&MacroNutrients>,
    ) -> Result<RawAnalysis, AnalysisError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    response_mime_type: &'static str,
}

impl GenerationConfig {
    fn deterministic() -> Self {
        Self {
            temperature: 0.0,
            top_k: 1,
            top_p: 1.0,
            response_mime_type: "application/json",
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Debug, Deserialize)]
struct PartResponse {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GeminiEstimator {
    api_key: Option<String>,
    model: String,
    base_url: String,
    client: Client,
    usda: Option<UsdaClient>,
}

impl GeminiEstimator {
    pub fn new(config: &GeminiConfig, usda: Option<UsdaClient>) -> Self {
        Self {
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            model: config.model.clone(),
            base_url: config.base_url.clone(),
            client: Client::new(),
            usda,
        }
    }

    async fn food_context(&self, description: &str) -> Vec<String> {
        let mut lines: Vec<String> = relevant_foods(description)
            .into_iter()
            .map(|item| item.context_line())
            .collect();
        if let Some(usda) = &self.usda {
            match usda.search(description, USDA_CONTEXT_RESULTS).await {
                Ok(foods) => lines.extend(foods.iter().map(|f| f.context_line())),
                Err(e) => warn!(error = %e, "usda lookup failed; continuing without it"),
            }
        }
        lines
    }

    async fn generate(&self, api_key: &str, request: &GeminiRequest) -> Result<String, AnalysisError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                error!(error = %e, "gemini request failed");
                AnalysisError::Transport(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, body = %body, "gemini returned error");
            return Err(classify_upstream_error(status, body));
        }

        let parsed: GeminiResponse = response.json().await.map_err(|e| {
            let e = e.without_url();
            error!(error = %e, "gemini response body was not the expected shape");
            AnalysisError::Transport(e)
        })?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().find_map(|p| p.text))
            .filter(|t| !t.trim().is_empty())
            .ok_or(AnalysisError::EmptyResponse)
    }
}

fn classify_upstream_error(status: StatusCode, body: String) -> AnalysisError {
    let mentions_key = {
        let lowered = body.to_lowercase();
        lowered.contains("api key") || lowered.contains("api_key")
    };
    if status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
        || (status == StatusCode::BAD_REQUEST && mentions_key)
    {
        AnalysisError::UpstreamAuth(body)
    } else {
        AnalysisError::Upstream {
            status: status.as_u16(),
            body,
        }
    }
}

#[async_trait]
impl Estimator for GeminiEstimator {
    async fn estimate(
        &self,
        description: &str,
        previous: Option<&MacroNutrients>,
    ) -> Result<RawAnalysis, AnalysisError> {
        let Some(api_key) = self.api_key.as_deref() else {
            error!("GEMINI_API_KEY missing; cannot estimate");
            return Err(AnalysisError::MissingApiKey);
        };

        let context = self.food_context(description).await;
        let request = GeminiRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: system_prompt(&context),
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part {
                    text: user_prompt(description, previous),
                }],
            }],
            generation_config: GenerationConfig::deterministic(),
        };

        info!(
            model = %self.model,
            context_items = context.len(),
            recalculation = previous.is_some(),
            "requesting macro estimate"
        );
        let text = self.generate(api_key, &request).await?;
        parse_ai_response(&text)
    }
}
