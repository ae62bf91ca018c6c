//! Vision service: image tagging and content moderation.
//!
//! Thin client for a cognitive-vision HTTP API. The service is optional;
//! when it is not configured the upload pipeline simply skips analysis.

use photoshare_common::config::VisionSettings;
use photoshare_common::{AppError, AppResult};
use serde::Deserialize;

/// Result of analyzing an image.
#[derive(Debug, Clone, Default)]
pub struct ImageAnalysis {
    /// Generated tags, lowercased, confidence-filtered, capped.
    pub tags: Vec<String>,
    /// Generated one-line caption, if any.
    pub description: Option<String>,
    /// Category names.
    pub categories: Vec<String>,
    /// Adult-content verdict, if the API returned one.
    pub adult: Option<AdultVerdict>,
}

/// Adult-content classification for an image.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdultVerdict {
    /// Image is classified as adult content.
    pub is_adult_content: bool,
    /// Image is classified as racy.
    pub is_racy_content: bool,
    /// Image is classified as gory.
    pub is_gory_content: bool,
    /// Adult classification score.
    #[serde(default)]
    pub adult_score: f64,
    /// Racy classification score.
    #[serde(default)]
    pub racy_score: f64,
}

impl AdultVerdict {
    /// Whether the image must be rejected outright.
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        self.is_adult_content || self.is_gory_content
    }
}

/// Client for the image analysis API.
#[derive(Clone)]
pub struct VisionService {
    endpoint: String,
    api_key: String,
    tag_confidence: f64,
    max_tags: usize,
    http_client: reqwest::Client,
}

impl VisionService {
    /// Build a client from settings. Returns `None` when analysis is
    /// disabled or incompletely configured.
    #[must_use]
    pub fn from_settings(settings: &VisionSettings) -> Option<Self> {
        if !settings.enabled {
            return None;
        }

        let (Some(endpoint), Some(api_key)) = (&settings.endpoint, &settings.api_key) else {
            tracing::warn!("Vision analysis enabled but endpoint or api_key is missing");
            return None;
        };

        Some(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.clone(),
            tag_confidence: settings.tag_confidence,
            max_tags: settings.max_tags,
            http_client: reqwest::Client::new(),
        })
    }

    /// Analyze an image by URL: tags, caption, categories and adult verdict.
    pub async fn analyze(&self, image_url: &str) -> AppResult<ImageAnalysis> {
        let url = format!(
            "{}/vision/v3.2/analyze?visualFeatures=Categories,Tags,Description,Adult",
            self.endpoint
        );

        let response = self
            .http_client
            .post(&url)
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .json(&serde_json::json!({ "url": image_url }))
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Vision request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "Vision API error: {status} - {body}"
            )));
        }

        let analysis: AnalyzeResponse = response.json().await.map_err(|e| {
            AppError::ExternalService(format!("Failed to parse vision response: {e}"))
        })?;

        Ok(self.post_process(analysis))
    }

    fn post_process(&self, raw: AnalyzeResponse) -> ImageAnalysis {
        let tags = raw
            .tags
            .into_iter()
            .filter(|t| t.confidence > self.tag_confidence)
            .map(|t| t.name.to_lowercase())
            .take(self.max_tags)
            .collect();

        let description = raw
            .description
            .and_then(|d| d.captions.into_iter().next())
            .map(|c| c.text);

        let categories = raw
            .categories
            .into_iter()
            .map(|c| c.name.replace('_', " ").trim().to_string())
            .collect();

        ImageAnalysis {
            tags,
            description,
            categories,
            adult: raw.adult,
        }
    }
}

// Wire format of the analyze endpoint.

#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    #[serde(default)]
    tags: Vec<ScoredTag>,
    #[serde(default)]
    description: Option<DescriptionBlock>,
    #[serde(default)]
    categories: Vec<CategoryBlock>,
    #[serde(default)]
    adult: Option<AdultVerdict>,
}

#[derive(Debug, Deserialize)]
struct ScoredTag {
    name: String,
    confidence: f64,
}

#[derive(Debug, Deserialize)]
struct DescriptionBlock {
    #[serde(default)]
    captions: Vec<Caption>,
}

#[derive(Debug, Deserialize)]
struct Caption {
    text: String,
}

#[derive(Debug, Deserialize)]
struct CategoryBlock {
    name: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn service() -> VisionService {
        VisionService {
            endpoint: "https://vision.example.com".to_string(),
            api_key: "key".to_string(),
            tag_confidence: 0.5,
            max_tags: 3,
            http_client: reqwest::Client::new(),
        }
    }

    #[test]
    fn test_from_settings_disabled() {
        let settings = VisionSettings::default();
        assert!(VisionService::from_settings(&settings).is_none());
    }

    #[test]
    fn test_from_settings_missing_key() {
        let settings = VisionSettings {
            enabled: true,
            endpoint: Some("https://vision.example.com".to_string()),
            api_key: None,
            tag_confidence: 0.5,
            max_tags: 10,
        };
        assert!(VisionService::from_settings(&settings).is_none());
    }

    #[test]
    fn test_post_process_filters_and_caps_tags() {
        let raw: AnalyzeResponse = serde_json::from_value(serde_json::json!({
            "tags": [
                {"name": "Outdoor", "confidence": 0.99},
                {"name": "Tree", "confidence": 0.8},
                {"name": "Maybe", "confidence": 0.3},
                {"name": "Sky", "confidence": 0.7},
                {"name": "Water", "confidence": 0.6},
            ],
            "description": {"captions": [{"text": "a tree by a lake"}]},
            "categories": [{"name": "outdoor_water"}],
        }))
        .unwrap();

        let analysis = service().post_process(raw);
        // Low-confidence tag dropped, capped at three, lowercased
        assert_eq!(analysis.tags, vec!["outdoor", "tree", "sky"]);
        assert_eq!(analysis.description.as_deref(), Some("a tree by a lake"));
        assert_eq!(analysis.categories, vec!["outdoor water"]);
        assert!(analysis.adult.is_none());
    }

    #[test]
    fn test_adult_verdict_parsing() {
        let raw: AnalyzeResponse = serde_json::from_value(serde_json::json!({
            "adult": {
                "isAdultContent": false,
                "isRacyContent": true,
                "isGoryContent": false,
                "adultScore": 0.1,
                "racyScore": 0.9,
            }
        }))
        .unwrap();

        let verdict = raw.adult.unwrap();
        assert!(verdict.is_racy_content);
        assert!(!verdict.is_blocked());
    }
}
