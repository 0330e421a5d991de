use anyhow::{Context, Result, anyhow, bail};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::model::Reply;
use crate::providers::http_errors::gemini_request_error;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    system_instruction: Content,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<TextPart>,
}

#[derive(Debug, Serialize)]
struct TextPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

impl Content {
    fn text(text: &str) -> Self {
        Self {
            parts: vec![TextPart {
                text: text.to_string(),
            }],
        }
    }
}

impl GenerateContentRequest {
    pub(crate) fn new(prompt: &str, system_instruction: &str, web_search: bool) -> Self {
        let tools = if web_search {
            vec![Tool {
                google_search: GoogleSearch {},
            }]
        } else {
            Vec::new()
        };

        Self {
            contents: vec![Content::text(prompt)],
            tools,
            system_instruction: Content::text(system_instruction),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

/// Only the first part of the first candidate is considered.
fn extract_reply(response: GenerateContentResponse) -> Reply {
    let block_reason = response
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason);
    let Some(candidate) = response.candidates.into_iter().next() else {
        warn!(
            block_reason = block_reason.as_deref().unwrap_or("none"),
            "gemini returned no candidates"
        );
        return Reply::NoUsableResponse;
    };

    let text = candidate
        .content
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text);

    match text {
        Some(text) => Reply::Text(text),
        None => {
            warn!(
                finish_reason = candidate.finish_reason.as_deref().unwrap_or("none"),
                "gemini candidate carried no text part"
            );
            Reply::NoUsableResponse
        }
    }
}

pub async fn generate(client: &Client, cfg: &Config, prompt: &str) -> Result<Reply> {
    if prompt.trim().is_empty() {
        bail!("Refusing to send an empty prompt");
    }

    let api_url = cfg.redacted_endpoint();
    let body = GenerateContentRequest::new(prompt, &cfg.system_instruction, cfg.web_search);
    debug!(
        api_url = %api_url,
        model = %cfg.model,
        prompt_len = prompt.len(),
        web_search = cfg.web_search,
        "sending gemini generateContent request"
    );

    let response = client
        .post(cfg.endpoint.clone())
        .json(&body)
        .send()
        .await
        .map_err(|err| {
            let mapped = gemini_request_error(err, &api_url, cfg.model_timeout_secs);
            warn!(
                api_url = %api_url,
                model = %cfg.model,
                error = %mapped,
                "gemini request failed"
            );
            mapped
        })?;

    if !response.status().is_success() {
        let status = response.status();
        let response_body = response
            .text()
            .await
            .unwrap_or_else(|_| "<failed to read response body>".to_string());
        warn!(
            api_url = %api_url,
            model = %cfg.model,
            status = %status,
            response_body_len = response_body.len(),
            "gemini returned non-success status"
        );
        return Err(anyhow!(
            "Gemini API request failed with status {}: {}",
            status,
            response_body.trim()
        ));
    }

    let parsed: GenerateContentResponse = response
        .json()
        .await
        .context("Failed to parse Gemini response")?;
    debug!(
        model = %cfg.model,
        candidate_count = parsed.candidates.len(),
        "received gemini response"
    );
    Ok(extract_reply(parsed))
}
