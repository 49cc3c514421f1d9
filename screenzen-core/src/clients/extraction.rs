// screenzen-core/src/clients/extraction.rs
//
// Screen-time extraction from a screenshot via the multimodal model API.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, info};

use crate::models::UsageRecord;
use crate::Error;

const EXTRACTION_PROMPT: &str = r#"Analyze this screen time screenshot and extract the following information in JSON format:
{
  "technology_hours": <total hours spent on technology/productivity apps>,
  "social_media_hours": <hours on social media apps like Instagram, TikTok, Facebook, etc.>,
  "gaming_hours": <hours on gaming apps>,
  "screen_time_hours": <total screen time in hours>,
  "sleep_hours": <if sleep data is visible, otherwise estimate 7>,
  "physical_activity_hours": <if activity data is visible, otherwise estimate 0.5>
}

Extract exact numbers from the image. If any value is not visible, provide a reasonable estimate.
Return ONLY valid JSON, no other text."#;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExtractionClient: Send + Sync {
    /// Extract the six usage fields from a base64-encoded screenshot.
    async fn extract(&self, image_base64: &str, mime_type: &str) -> Result<UsageRecord, Error>;
}

/// Extraction client backed by the Gemini `generateContent` endpoint.
pub struct GeminiExtractionClient {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl GeminiExtractionClient {
    pub fn new(client: Client, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

#[async_trait]
impl ExtractionClient for GeminiExtractionClient {
    async fn extract(&self, image_base64: &str, mime_type: &str) -> Result<UsageRecord, Error> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.api_base, self.model, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .json(&json!({
                "contents": [{
                    "parts": [
                        {
                            "inline_data": {
                                "mime_type": mime_type,
                                "data": image_base64,
                            }
                        },
                        { "text": EXTRACTION_PROMPT },
                    ]
                }]
            }))
            .send()
            .await
            .map_err(|e| Error::Extraction(format!("model call failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Extraction(format!(
                "model call returned {}: {}",
                status, body
            )));
        }

        let data = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| Error::Extraction(format!("unreadable model response: {}", e)))?;

        let text = data["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| Error::Extraction("no text in model response".to_string()))?;

        debug!("raw model response: {}", text);
        let record = parse_usage_record(text)?;
        info!("extracted usage data: {:?}", record);
        Ok(record)
    }
}

/// Locate the JSON object embedded in the model's free-text response: the
/// span from the first `{` to the last `}`.
pub fn extract_json_object(text: &str) -> Result<&str, Error> {
    let start = text
        .find('{')
        .ok_or_else(|| Error::Extraction(format!("no JSON object in model response: {}", text)))?;
    let end = text
        .rfind('}')
        .filter(|&end| end > start)
        .ok_or_else(|| Error::Extraction(format!("no JSON object in model response: {}", text)))?;
    Ok(&text[start..=end])
}

fn parse_usage_record(text: &str) -> Result<UsageRecord, Error> {
    let span = extract_json_object(text)?;
    serde_json::from_str(span)
        .map_err(|e| Error::Extraction(format!("could not parse extracted JSON: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_surrounded_by_prose() {
        let text = "Here is the data: {\"technology_hours\":5,\"social_media_hours\":2,\"gaming_hours\":1,\"screen_time_hours\":8,\"sleep_hours\":7,\"physical_activity_hours\":0.5} Hope this helps!";
        let record = parse_usage_record(text).unwrap();
        assert_eq!(record.technology_hours, 5.0);
        assert_eq!(record.social_media_hours, 2.0);
        assert_eq!(record.gaming_hours, 1.0);
        assert_eq!(record.screen_time_hours, 8.0);
        assert_eq!(record.sleep_hours, 7.0);
        assert_eq!(record.physical_activity_hours, 0.5);
    }

    #[test]
    fn fails_when_no_braces_present() {
        let err = parse_usage_record("Sorry, I can't read that screenshot.").unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
    }

    #[test]
    fn fails_on_open_brace_without_close() {
        let err = extract_json_object("{\"technology_hours\": 5").unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
    }

    #[test]
    fn span_is_greedy_to_the_last_close_brace() {
        let text = "x {\"a\": {\"b\": 1}} y";
        assert_eq!(extract_json_object(text).unwrap(), "{\"a\": {\"b\": 1}}");
    }

    #[test]
    fn fails_on_unparseable_span() {
        let err = parse_usage_record("{not json}").unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
    }
}
