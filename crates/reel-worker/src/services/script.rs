//! Script generation through the OpenAI chat completions API.

use std::time::Duration;

use async_trait::async_trait;
use reel_models::{Scene, Script};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::ScriptGenerator;
use crate::error::{WorkerError, WorkerResult};

/// Instructions for turning an article into a short-form video script.
pub const SCRIPT_SYSTEM_PROMPT: &str = r#"You analyze news articles and write scripts for vertical short-form videos (YouTube Shorts, Reels).

Rules:
- Produce between 5 and 8 scenes that together tell the story of the article in under a minute.
- Each scene's "text" is exactly one spoken sentence of narration, factual and taken from the article. No hashtags, emojis or stage directions.
- The first scene hooks the viewer; the last scene wraps up the story.
- Each scene's "image_prompt" describes a single photorealistic vertical image illustrating that scene. Describe subjects, setting and lighting. Never ask for text, captions, logos or real people's faces.
- "timeframe" is the suggested duration of the scene in whole seconds.
- "scene_number" starts at 1 and increases by one per scene.

Respond with JSON only, in this shape:
{"scenes": [{"scene_number": 1, "text": "...", "image_prompt": "...", "timeframe": 5}]}"#;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Parse the model's reply into validated scenes.
pub(crate) fn parse_script(content: &str) -> WorkerResult<Vec<Scene>> {
    let json = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let script: Script = serde_json::from_str(json)
        .map_err(|e| WorkerError::script(format!("unparsable script: {}", e)))?;
    script
        .into_scenes()
        .map_err(|e| WorkerError::script(e.to_string()))
}

/// [`ScriptGenerator`] backed by an OpenAI-compatible chat endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiScriptGenerator {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiScriptGenerator {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> WorkerResult<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }
}

#[async_trait]
impl ScriptGenerator for OpenAiScriptGenerator {
    async fn generate(&self, article: &str) -> WorkerResult<Vec<Scene>> {
        if article.trim().is_empty() {
            return Err(WorkerError::script("article text is empty"));
        }

        info!(model = %self.model, article_chars = article.len(), "Generating script");

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SCRIPT_SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: article,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
            temperature: 0.7,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(WorkerError::script(format!("API returned {}: {}", status, body)));
        }

        let reply: ChatResponse = response.json().await?;
        let content = reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| WorkerError::script("response has no message content"))?;
        debug!("Script reply: {}", content);

        let scenes = parse_script(&content)?;
        info!(scenes = scenes.len(), "Script generated");
        Ok(scenes)
    }
}
