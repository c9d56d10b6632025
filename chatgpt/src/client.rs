use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use slidegen_common::{ConfigError, DeckConfig, LayoutTag, Outline, SlideBounds};

/// What the user asked for: a topic and how many slides it should span.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlineRequest {
    pub prompt: String,
    pub bounds: SlideBounds,
}

impl OutlineRequest {
    pub fn new(prompt: impl Into<String>, bounds: SlideBounds) -> Self {
        Self {
            prompt: prompt.into(),
            bounds,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Chat Completions client that asks the model for a presentation outline.
///
/// One request per outline: no streaming, no retry, no backoff.
pub struct ChatGptClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl ChatGptClient {
    pub fn new(api_key: String) -> Self {
        let defaults = DeckConfig::default();
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: defaults.text_base_url,
            model: defaults.model,
            max_tokens: defaults.max_tokens,
            temperature: defaults.temperature,
        }
    }

    pub fn from_config(config: &DeckConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            http: reqwest::Client::new(),
            api_key: config.text_api_key()?.to_string(),
            base_url: config.text_base_url.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Request body for a single JSON-mode chat completion.
    pub fn request_body(&self, request: &OutlineRequest) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_prompt(request.bounds)},
                {"role": "user", "content": request.prompt},
            ],
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "response_format": {"type": "json_object"},
        })
    }

    /// Raw message content of the model's reply.
    pub async fn complete(&self, request: &OutlineRequest) -> Result<Option<String>> {
        let body = self.request_body(request);
        tracing::debug!(
            "Request Body: {}",
            serde_json::to_string_pretty(&body).unwrap_or_default()
        );

        let resp = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| anyhow!(e))?;

        let status = resp.status();
        tracing::debug!("Response Status: {status}");

        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(anyhow!("chat completion http {status}: {text}"));
        }

        let text = resp.text().await?;
        match serde_json::from_str::<ChatCompletionResponse>(&text) {
            Ok(parsed) => Ok(parsed
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)),
            Err(e) => {
                tracing::error!("Error parsing chat completion envelope: {e}");
                tracing::error!("Raw response: {text}");
                Ok(None)
            }
        }
    }

    /// Ask for an outline. `Ok(None)` means the model answered with something
    /// that is not a usable outline; the raw reply has been logged.
    pub async fn generate_outline(&self, request: &OutlineRequest) -> Result<Option<Outline>> {
        tracing::info!(
            "Requesting outline from {} ({} to {} slides)",
            self.model,
            request.bounds.min(),
            request.bounds.max()
        );

        let Some(content) = self.complete(request).await? else {
            tracing::error!("Chat completion returned no message content");
            return Ok(None);
        };

        let outline = parse_outline(&content);
        if let Some(outline) = &outline {
            if !request.bounds.contains(outline.slide_count()) {
                tracing::warn!(
                    "Model returned {} slides, outside the requested {}..={}",
                    outline.slide_count(),
                    request.bounds.min(),
                    request.bounds.max()
                );
            }
        }
        Ok(outline)
    }
}

/// Parse the model's message content as an [`Outline`], logging the raw
/// content when it doesn't fit.
pub fn parse_outline(content: &str) -> Option<Outline> {
    match serde_json::from_str::<Outline>(content) {
        Ok(outline) => Some(outline),
        Err(e) => {
            tracing::error!("Error parsing JSON from API response: {e}");
            tracing::error!("Raw response: {content}");
            None
        }
    }
}

/// System instruction describing the output shape and the slide range.
pub fn system_prompt(bounds: SlideBounds) -> String {
    let layouts = LayoutTag::KNOWN
        .iter()
        .map(LayoutTag::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"You are an expert in creating presentations.
For each slide, include:
- title
- content (a list of bullet points)
- image_query for a stock photo search
  - Use a single string for regular slides
  - Use a list of strings for 3_BLOCK_LAYOUT (3 strings) or 4_BLOCK_LAYOUT (4 strings)
- layout (choose from: {layouts})
Return JSON like this:
{{
  "title": "Presentation Title",
  "slides": [
    {{
      "title": "Slide 1 Title",
      "content": ["Point A", "Point B"],
      "image_query": "A futuristic city skyline at sunset",
      "layout": "2/3RD_IMAGE_RIGHT"
    }}
  ]
}}
For 3_BLOCK_LAYOUT or 4_BLOCK_LAYOUT, "image_query" is ["query1", "query2", "query3"] or ["query1", "query2", "query3", "query4"] and "content" has one entry per block.
Limit the presentation to between {min} and {max} slides."#,
        min = bounds.min(),
        max = bounds.max(),
    )
}
