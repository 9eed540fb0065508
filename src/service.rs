//! Client for the external text generation service.
//!
//! [`ContentService`] is the seam between the pipeline and the network.  The
//! production implementation, [`GeminiClient`], calls the Gemini
//! `generateContent` REST endpoint with a blocking HTTP client: one request per
//! prompt, no streaming, no retries.

use log::debug;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::ServiceConfig;
use crate::error::ServiceError;

/// Something that turns a prompt into generated text.
pub trait ContentService {
    /// Sends `prompt` and blocks until the complete response text is available.
    fn generate(&self, prompt: &str) -> Result<String, ServiceError>;
}

impl<S: ContentService + ?Sized> ContentService for &S {
    fn generate(&self, prompt: &str) -> Result<String, ServiceError> {
        (**self).generate(prompt)
    }
}

impl<S: ContentService + ?Sized> ContentService for Box<S> {
    fn generate(&self, prompt: &str) -> Result<String, ServiceError> {
        (**self).generate(prompt)
    }
}

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Blocking client for the Gemini `generateContent` API.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    endpoint: String,
    api_key: String,
    client: Client,
}

impl GeminiClient {
    /// Creates a client for the configured model.
    pub fn new(config: &ServiceConfig) -> Result<Self, ServiceError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            endpoint: endpoint_url(&config.base_url, &config.model),
            api_key: config.api_key.clone(),
            client: builder.build()?,
        })
    }

    /// Returns the URL requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ContentService for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String, ServiceError> {
        debug!("Sending {} byte prompt to {}", prompt.len(), self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&GenerateContentRequest::from_prompt(prompt))
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)?;
        let text = parsed.into_text()?;
        debug!("Received {} bytes of generated text", text.len());
        Ok(text)
    }
}

/// Joins the base URL and model identifier into a `generateContent` URL.
///
/// Bare model names are prefixed with `models/`.
pub fn endpoint_url(base_url: &str, model: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let model = model.trim_start_matches('/');
    if model.starts_with("models/") {
        format!("{base}/{model}:generateContent")
    } else {
        format!("{base}/models/{model}:generateContent")
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

impl<'a> GenerateContentRequest<'a> {
    fn from_prompt(prompt: &'a str) -> Self {
        Self {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenates the text parts of the first candidate.
    fn into_text(self) -> Result<String, ServiceError> {
        let block_reason = self.prompt_feedback.and_then(|feedback| feedback.block_reason);
        let Some(candidate) = self.candidates.into_iter().next() else {
            return Err(ServiceError::EmptyResponse { block_reason });
        };

        let text: String = candidate
            .content
            .map(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|part| part.text)
            .collect();

        if text.is_empty() {
            return Err(ServiceError::EmptyResponse {
                block_reason: block_reason.or(candidate.finish_reason),
            });
        }

        Ok(text)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Extracts the service's error message, falling back to the raw body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) if body.trim().is_empty() => "no response body".to_owned(),
        Err(_) => body.trim().to_owned(),
    }
}
