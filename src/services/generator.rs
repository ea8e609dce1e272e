use async_trait::async_trait;
use chrono::Utc;
#[cfg(test)]
use mockall::automock;
use once_cell::sync::Lazy;
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::{
    config::Config,
    constants::prompts::build_generation_prompt,
    errors::{AppError, AppResult},
    models::{AnswerOption, Question},
};

/// Source of new candidate questions. The production implementation calls an
/// external text-generation endpoint; tests mock this seam.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait QuestionSource: Send + Sync {
    async fn generate(&self, count: usize) -> AppResult<Vec<Question>>;
}

pub struct GeminiGenerator {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: SecretString,
}

impl GeminiGenerator {
    pub fn new(config: &Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http,
            base_url: config.gemini_base_url.clone(),
            model: config.gemini_model.clone(),
            api_key: config.gemini_api_key.clone(),
        }
    }
}

#[async_trait]
impl QuestionSource for GeminiGenerator {
    async fn generate(&self, count: usize) -> AppResult<Vec<Question>> {
        if self.api_key.expose_secret().is_empty() {
            return Err(AppError::Generation(
                "GEMINI_API_KEY is not configured".to_string(),
            ));
        }

        // Ask for a few extra so the pool grows even when the round is small.
        let batch_size = count.max(6);
        let prompt = build_generation_prompt(batch_size);

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url,
            self.model,
            self.api_key.expose_secret()
        );

        let body = json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [{ "text": prompt }],
                }
            ],
            "generationConfig": {
                "response_mime_type": "application/json",
                "response_schema": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "text": { "type": "STRING" },
                            "options": {
                                "type": "ARRAY",
                                "items": {
                                    "type": "OBJECT",
                                    "properties": {
                                        "text": { "type": "STRING" },
                                        "isCorrect": { "type": "BOOLEAN" }
                                    },
                                    "required": ["text"]
                                }
                            }
                        },
                        "required": ["text", "options"]
                    },
                    "minItems": 1,
                    "maxItems": batch_size
                }
            }
        });

        let response = self.http.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::Generation(format!(
                "generation endpoint returned {}: {}",
                status, detail
            )));
        }

        let payload: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AppError::Generation(format!("unreadable response body: {}", e)))?;

        let text = extract_response_text(&payload)?;
        let raw = parse_candidates(&text)?;
        let questions = normalize_candidates(raw);

        if questions.is_empty() {
            return Err(AppError::Generation(
                "no valid questions in the response".to_string(),
            ));
        }

        log::info!("Generated {} valid questions", questions.len());
        Ok(questions)
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: String,
}

/// Unvalidated candidate as emitted by the model.
#[derive(Debug, Deserialize)]
pub(crate) struct RawQuestion {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub options: Vec<RawOption>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawOption {
    #[serde(default)]
    pub text: String,
    #[serde(default, rename = "isCorrect")]
    pub is_correct: bool,
}

fn extract_response_text(payload: &GenerateContentResponse) -> AppResult<String> {
    payload
        .candidates
        .first()
        .and_then(|c| c.content.parts.first())
        .map(|p| p.text.trim().to_string())
        .ok_or_else(|| AppError::Generation("no content parts in response".to_string()))
}

// Models occasionally wrap the JSON array in prose despite the schema hint.
static JSON_ARRAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\[\s*\{.*\}\s*\]").expect("static regex must compile"));

fn parse_candidates(text: &str) -> AppResult<Vec<RawQuestion>> {
    if let Ok(parsed) = serde_json::from_str::<Vec<RawQuestion>>(text) {
        return Ok(parsed);
    }

    let extracted = JSON_ARRAY
        .find(text)
        .ok_or_else(|| AppError::Generation("response contains no JSON array".to_string()))?;

    serde_json::from_str(extracted.as_str())
        .map_err(|e| AppError::Generation(format!("invalid JSON in response: {}", e)))
}

/// Drops candidates that fail validation (empty text, option count != 4, not
/// exactly one correct option) and assigns batch-unique ids with lettered
/// option suffixes. The letter suffix is what the scan router matches on.
pub(crate) fn normalize_candidates(raw: Vec<RawQuestion>) -> Vec<Question> {
    let batch_stamp = to_base36(Utc::now().timestamp_millis() as u64);
    let stamp = &batch_stamp[batch_stamp.len().saturating_sub(4)..];

    raw.into_iter()
        .filter(|q| {
            !q.text.trim().is_empty()
                && q.options.len() == 4
                && q.options.iter().filter(|o| o.is_correct).count() == 1
        })
        .enumerate()
        .map(|(index, q)| {
            let question_id = format!("gq{}_{}", stamp, index);
            let options = q
                .options
                .into_iter()
                .enumerate()
                .map(|(opt_index, o)| AnswerOption {
                    id: format!("{}_{}", question_id, (b'A' + opt_index as u8) as char),
                    text: o.text,
                    is_correct: o.is_correct,
                })
                .collect();

            Question {
                id: question_id,
                text: q.text,
                options,
                is_demo: false,
            }
        })
        .collect()
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
