//! Perplexity AI suggestion provider
//!
//! Sends the wardrobe to the chat completions endpoint with a stylist prompt
//! and asks for a JSON array of outfits. The model's reply is free text, so the
//! array is located inside it before parsing.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{Category, Occasion, RawSuggestion, WardrobeItem},
    services::providers::SuggestionProvider,
};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::fmt::Write as _;

const SUGGESTION_CACHE_TTL: u64 = 3600; // 1 hour
const SAMPLING_TEMPERATURE: f64 = 0.2;
const MAX_TOKENS: u32 = 1500;

const SYSTEM_PROMPT: &str = "You are a personal stylist. Your task is to put together 3 appropriate \
outfits from the client's existing wardrobe. Use what you know about color pairing, formality and \
style. For office wear prefer classic combinations.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Clone)]
pub struct PerplexityProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
    cache: Option<Cache>,
}

impl PerplexityProvider {
    pub fn new(api_key: String, api_url: String, model: String, cache: Option<Cache>) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            model,
            cache,
        }
    }

    /// Calls the chat completions endpoint and parses the outfits out of the reply
    async fn request_suggestions(
        &self,
        items: &[WardrobeItem],
        occasion: Occasion,
        temperature: Option<f64>,
    ) -> AppResult<Vec<RawSuggestion>> {
        let url = format!("{}/chat/completions", self.api_url);

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: build_prompt(items, occasion, temperature),
                },
            ],
            temperature: SAMPLING_TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Perplexity API returned status {}: {}",
                status, body
            )));
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| {
                AppError::ExternalApi("Perplexity API returned an empty response".to_string())
            })?;

        let suggestions = parse_suggestions(&content)?;

        tracing::info!(
            occasion = %occasion,
            suggestions = suggestions.len(),
            "Received outfit suggestions from Perplexity"
        );

        Ok(suggestions)
    }
}

#[async_trait::async_trait]
impl SuggestionProvider for PerplexityProvider {
    async fn suggest(
        &self,
        items: &[WardrobeItem],
        occasion: Occasion,
        temperature: Option<f64>,
    ) -> AppResult<Vec<RawSuggestion>> {
        let Some(cache) = &self.cache else {
            return self.request_suggestions(items, occasion, temperature).await;
        };

        let key = CacheKey::Suggestions(wardrobe_fingerprint(items, occasion, temperature));
        cached!(
            cache,
            key,
            SUGGESTION_CACHE_TTL,
            self.request_suggestions(items, occasion, temperature)
        )
    }

    fn name(&self) -> &'static str {
        "perplexity"
    }
}

/// Builds the user prompt listing the wardrobe by category
pub fn build_prompt(items: &[WardrobeItem], occasion: Occasion, temperature: Option<f64>) -> String {
    let weather = match temperature {
        Some(temp) => format!("Temperature: {}°C. Take the weather into account.", temp),
        None => "Temperature is not specified.".to_string(),
    };

    let event = match occasion {
        Occasion::Work => "office work",
        Occasion::Date => "a date or meeting",
        Occasion::Sport => "a sports event",
    };

    format!(
        "{weather}\nOccasion: {event}\n\nAvailable wardrobe items:\n{wardrobe}\n\
Pick the 3 best outfits. For each outfit give:\n\
1. the top ID\n\
2. the bottom ID\n\
3. the shoes ID\n\
4. accessory IDs (optional)\n\
5. a short explanation of the choice (1-2 sentences)\n\n\
Answer strictly as a JSON array:\n\
[\n  {{\n    \"topId\": \"top id\",\n    \"bottomId\": \"bottom id\",\n    \"shoesId\": \"shoes id\",\n    \
\"accessoryIds\": [\"id1\"],\n    \"reasoning\": \"why this outfit works\"\n  }}\n]",
        wardrobe = describe_wardrobe(items),
    )
}

fn describe_wardrobe(items: &[WardrobeItem]) -> String {
    let sections = [
        (Category::Top, "Tops"),
        (Category::Bottom, "Bottoms"),
        (Category::Shoes, "Shoes"),
        (Category::Accessory, "Accessories"),
    ];

    let mut context = String::new();
    for (category, heading) in sections {
        let group: Vec<&WardrobeItem> = items.iter().filter(|i| i.category == category).collect();
        if group.is_empty() {
            continue;
        }

        if !context.is_empty() {
            context.push('\n');
        }
        let _ = writeln!(context, "{} ({}):", heading, category);
        for item in group {
            let color = item.color.as_deref().unwrap_or("not specified");
            if category == Category::Accessory {
                let _ = writeln!(context, "- ID: {}, color: {}", item.id, color);
            } else {
                let formality = item
                    .formality
                    .map(|f| f.to_string())
                    .unwrap_or_else(|| "not specified".to_string());
                let _ = writeln!(
                    context,
                    "- ID: {}, color: {}, formality: {}",
                    item.id, color, formality
                );
            }
        }
    }

    context
}

/// Extracts the outermost JSON array from a model reply (which may wrap it in prose or a code fence)
pub fn parse_suggestions(content: &str) -> AppResult<Vec<RawSuggestion>> {
    let json = match (content.find('['), content.rfind(']')) {
        (Some(start), Some(end)) if start < end => &content[start..=end],
        _ => {
            return Err(AppError::ExternalApi(
                "No JSON array found in provider response".to_string(),
            ))
        }
    };

    serde_json::from_str(json)
        .map_err(|e| AppError::ExternalApi(format!("Invalid suggestion JSON: {}", e)))
}

/// SHA-256 over a canonical JSON rendering of the request and wardrobe
///
/// Used as the cache key for provider replies, so it must not change between
/// builds for the same input.
pub fn wardrobe_fingerprint(
    items: &[WardrobeItem],
    occasion: Occasion,
    temperature: Option<f64>,
) -> String {
    let wardrobe: Vec<serde_json::Value> = items
        .iter()
        .map(|item| {
            json!([
                item.id,
                item.user_id,
                item.category,
                item.color,
                item.season,
                item.formality
            ])
        })
        .collect();
    let canonical = json!({
        "items": wardrobe,
        "occasion": occasion,
        "temperature": temperature,
    });

    let mut hasher = Sha256::new();
    hasher.update(canonical.to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}
