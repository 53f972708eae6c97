//! HTTP client for the AgriBot backend.

use crate::config::{endpoint, AgribotConfig};
use crate::error::{Error, Result};
use crate::models::{DetectionResult, NewsArticle, Telemetry, WeatherNewsArticle};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const AGRI_NEWS_PATH: &str = "/api/agri-news";
pub const WEATHER_NEWS_PATH: &str = "/api/weather-news";
pub const BOTS_PATH: &str = "/api/bots";
pub const DETECT_ANIMAL_PATH: &str = "/api/animal/detect-animal";

/// Weather feed is capped client-side.
pub const WEATHER_ARTICLE_LIMIT: usize = 8;

/// The one accepted shape of `/api/weather-news`.
#[derive(Debug, Deserialize)]
struct WeatherNewsEnvelope {
    status: String,
    #[serde(default)]
    articles: Option<Vec<WeatherNewsArticle>>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Serialize)]
struct DetectAnimalRequest<'a> {
    image_base64: &'a str,
}

#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &AgribotConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("agribot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.backend_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_text(&self, path: &str) -> Result<String> {
        let url = endpoint(&self.base_url, path);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::warn!("GET {} failed with {}", url, status);
            return Err(Error::Status {
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))
    }

    pub async fn fetch_agri_news(&self) -> Result<Vec<NewsArticle>> {
        let body = self.get_text(AGRI_NEWS_PATH).await?;
        parse_agri_news(&body)
    }

    pub async fn fetch_weather_news(&self) -> Result<Vec<WeatherNewsArticle>> {
        let body = self.get_text(WEATHER_NEWS_PATH).await?;
        parse_weather_news(&body)
    }

    pub async fn fetch_bot_telemetry(&self) -> Result<Telemetry> {
        let body = self.get_text(BOTS_PATH).await?;
        parse_telemetry(&body)
    }

    /// Posts an encoded image. The backend answers failures with an `error`
    /// body and a 4xx/5xx status, so the body is read regardless of status.
    pub async fn detect_animal(&self, image_base64: &str) -> Result<DetectionResult> {
        let url = endpoint(&self.base_url, DETECT_ANIMAL_PATH);
        tracing::debug!("POST {} ({} bytes)", url, image_base64.len());

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&DetectAnimalRequest { image_base64 })
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        match parse_detection(&body) {
            Ok(result) => Ok(result),
            Err(_) if !status.is_success() => Err(Error::Status {
                status: status.as_u16(),
            }),
            Err(e) => Err(e),
        }
    }

    /// Reachability check used by `agribot doctor`.
    pub async fn ping(&self) -> Result<()> {
        self.get_text(BOTS_PATH).await.map(|_| ())
    }
}

pub fn parse_agri_news(body: &str) -> Result<Vec<NewsArticle>> {
    serde_json::from_str(body).map_err(|e| Error::shape(AGRI_NEWS_PATH, e.to_string()))
}

pub fn parse_weather_news(body: &str) -> Result<Vec<WeatherNewsArticle>> {
    let envelope: WeatherNewsEnvelope = serde_json::from_str(body)
        .map_err(|e| Error::shape(WEATHER_NEWS_PATH, e.to_string()))?;

    if envelope.status != "success" {
        return Err(Error::Backend(
            envelope
                .message
                .unwrap_or_else(|| "Failed to fetch weather news data".to_string()),
        ));
    }

    let mut articles = envelope
        .articles
        .ok_or_else(|| Error::shape(WEATHER_NEWS_PATH, "missing `articles` array"))?;
    articles.truncate(WEATHER_ARTICLE_LIMIT);
    Ok(articles)
}

pub fn parse_telemetry(body: &str) -> Result<Telemetry> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| Error::shape(BOTS_PATH, e.to_string()))?;
    if !(value.is_array() || value.is_object()) {
        return Err(Error::shape(BOTS_PATH, "expected an array or an object"));
    }
    serde_json::from_value(value).map_err(|e| Error::shape(BOTS_PATH, e.to_string()))
}

pub fn parse_detection(body: &str) -> Result<DetectionResult> {
    serde_json::from_str(body).map_err(|e| Error::shape(DETECT_ANIMAL_PATH, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weather_news_success_is_capped() {
        let articles: Vec<String> = (0..12)
            .map(|i| format!(r#"{{"title":"t{i}","link":"https://x/{i}","pubDate":"2025-09-23 10:00:00"}}"#))
            .collect();
        let body = format!(r#"{{"status":"success","articles":[{}]}}"#, articles.join(","));
        let parsed = parse_weather_news(&body).unwrap();
        assert_eq!(parsed.len(), WEATHER_ARTICLE_LIMIT);
        assert_eq!(parsed[0].title, "t0");
    }

    #[test]
    fn weather_news_legacy_results_shape_is_rejected() {
        let body = r#"{"status":"success","results":[{"title":"a","link":"b","pubDate":"c"}]}"#;
        let err = parse_weather_news(body).unwrap_err();
        assert!(matches!(err, Error::Shape { .. }));
        assert!(err.to_string().contains("articles"));
    }

    #[test]
    fn weather_news_error_status_surfaces_message() {
        let body = r#"{"status":"error","message":"Failed with status 429"}"#;
        let err = parse_weather_news(body).unwrap_err();
        assert_eq!(err.to_string(), "Failed with status 429");
    }

    #[test]
    fn agri_news_accepts_sparse_articles() {
        let body = r#"[{"title":"Revolutionary AI-Powered Crop Monitoring","category":"Technology","image":"/api/placeholder/400/200"}]"#;
        let parsed = parse_agri_news(body).unwrap();
        assert_eq!(parsed[0].category.as_deref(), Some("Technology"));
        assert_eq!(parsed[0].url, "");
    }

    #[test]
    fn agri_news_object_is_a_shape_error() {
        assert!(matches!(
            parse_agri_news(r#"{"articles":[]}"#),
            Err(Error::Shape { .. })
        ));
    }

    #[test]
    fn telemetry_scalar_is_a_shape_error() {
        assert!(matches!(parse_telemetry("42"), Err(Error::Shape { .. })));
    }

    #[test]
    fn detection_threat_response() {
        let body = r#"{"success":true,"threat_detected":true,"animal_type":"cow","confidence":92,
                      "message":"cow detected with 92% confidence!"}"#;
        let result = parse_detection(body).unwrap();
        assert!(result.threat_detected);
        assert_eq!(result.animal_type.as_deref(), Some("cow"));
        assert_eq!(result.confidence, Some(92.0));
    }

    #[test]
    fn detection_bad_request_body_keeps_error_text() {
        for text in ["No image provided", "Invalid image format"] {
            let body = format!(r#"{{"error": "{}"}}"#, text);
            let result = parse_detection(&body).unwrap();
            assert!(!result.success);
            assert_eq!(
                crate::detect::interpret(&result),
                crate::detect::Outcome::Failed {
                    message: text.to_string()
                }
            );
        }
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_network_error() {
        let config = AgribotConfig {
            backend_url: "http://127.0.0.1:9".to_string(),
            request_timeout_secs: 2,
            ..AgribotConfig::default()
        };
        let client = ApiClient::new(&config).unwrap();
        let err = client.fetch_agri_news().await.unwrap_err();
        assert!(err.is_connectivity(), "unexpected error: {err}");
    }
}
