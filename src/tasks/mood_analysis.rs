use std::sync::Arc;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tokio_retry::RetryIf;
use tokio_retry::strategy::FixedInterval;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::TaskError;
use crate::models::{Mood, MoodResult};

/// Classifies prompt polarity via the sentiment endpoint.
pub struct MoodAnalyzer {
    client: Client,
    config: Arc<AppConfig>,
}

#[derive(Debug, Deserialize)]
struct SentimentScore {
    label: String,
    score: f64,
}

const NEUTRAL_FALLBACK: MoodResult = MoodResult {
    mood: Mood::Neutral,
    intensity: 50,
};

impl MoodAnalyzer {
    pub fn new(client: Client, config: Arc<AppConfig>) -> Self {
        Self { client, config }
    }

    /// Classify the prompt, retrying only on a 503 from the endpoint.
    /// Any other failure, or retry exhaustion, degrades to Neutral/50.
    pub async fn analyze(&self, prompt: &str) -> MoodResult {
        let retries = self.config.sentiment_max_attempts.saturating_sub(1);
        let strategy = FixedInterval::new(self.config.sentiment_retry_delay).take(retries);

        match RetryIf::spawn(strategy, || self.classify(prompt), TaskError::is_service_busy).await
        {
            Ok(result) => {
                info!(mood = %result.mood, intensity = result.intensity, "mood analyzed");
                result
            }
            Err(e) => {
                warn!(error = %e, "mood analysis failed, using neutral fallback");
                NEUTRAL_FALLBACK
            }
        }
    }

    async fn classify(&self, prompt: &str) -> Result<MoodResult, TaskError> {
        let response = self
            .client
            .post(&self.config.sentiment_url)
            .bearer_auth(&self.config.hf_api_token)
            .json(&json!({ "inputs": prompt }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TaskError::Api { status });
        }

        // The endpoint wraps the label/score pairs in an outer single-element array.
        let body: Vec<Vec<SentimentScore>> = response.json().await?;
        let scores = body
            .into_iter()
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                TaskError::InvalidResponse("empty sentiment sequence".to_string())
            })?;

        Ok(pick_winner(&scores))
    }
}

/// Max-score pair wins; ties go to the first occurrence.
fn pick_winner(scores: &[SentimentScore]) -> MoodResult {
    let mut best = &scores[0];
    for candidate in &scores[1..] {
        if candidate.score > best.score {
            best = candidate;
        }
    }
    let mood = if best.label == "POSITIVE" {
        Mood::Positive
    } else {
        Mood::Negative
    };
    MoodResult {
        mood,
        intensity: (best.score * 100.0).round() as u8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(sentiment_url: String) -> Arc<AppConfig> {
        Arc::new(AppConfig {
            port: 0,
            allowed_origin: "http://localhost:3000".into(),
            images_dir: "images".into(),
            variant: crate::config::Variant::Basic,
            hf_api_token: "test-token".into(),
            sentiment_url,
            text_gen_url: String::new(),
            horde_api_key: String::new(),
            horde_base_url: String::new(),
            unsplash_access_key: String::new(),
            unsplash_base_url: String::new(),
            sentiment_max_attempts: 3,
            sentiment_retry_delay: Duration::from_millis(50),
            poll_interval: Duration::from_millis(5),
            poll_ceiling: 3,
        })
    }

    #[test]
    fn winner_is_max_score_with_positive_mapping() {
        let scores = vec![
            SentimentScore {
                label: "POSITIVE".into(),
                score: 0.9,
            },
            SentimentScore {
                label: "NEGATIVE".into(),
                score: 0.1,
            },
        ];
        let result = pick_winner(&scores);
        assert_eq!(result.mood, Mood::Positive);
        assert_eq!(result.intensity, 90);
    }

    #[test]
    fn non_positive_labels_map_to_negative() {
        let scores = vec![SentimentScore {
            label: "NEGATIVE".into(),
            score: 0.75,
        }];
        let result = pick_winner(&scores);
        assert_eq!(result.mood, Mood::Negative);
        assert_eq!(result.intensity, 75);
    }

    #[test]
    fn ties_break_to_first_occurrence() {
        let scores = vec![
            SentimentScore {
                label: "NEGATIVE".into(),
                score: 0.5,
            },
            SentimentScore {
                label: "POSITIVE".into(),
                score: 0.5,
            },
        ];
        assert_eq!(pick_winner(&scores).mood, Mood::Negative);
    }

    #[tokio::test]
    async fn classifies_winning_sentiment() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([[
                { "label": "POSITIVE", "score": 0.9 },
                { "label": "NEGATIVE", "score": 0.1 }
            ]])))
            .mount(&server)
            .await;

        let analyzer = MoodAnalyzer::new(Client::new(), test_config(server.uri()));
        let result = analyzer.analyze("sunny day at the beach").await;
        assert_eq!(result.mood, Mood::Positive);
        assert_eq!(result.intensity, 90);
    }

    #[tokio::test]
    async fn three_busy_responses_degrade_to_neutral_after_three_attempts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let config = test_config(server.uri());
        let analyzer = MoodAnalyzer::new(Client::new(), config.clone());

        let start = Instant::now();
        let result = analyzer.analyze("anything").await;
        let elapsed = start.elapsed();

        assert_eq!(result, NEUTRAL_FALLBACK);
        // Two inter-attempt delays at minimum.
        assert!(elapsed >= config.sentiment_retry_delay * 2);
        server.verify().await;
    }

    #[tokio::test]
    async fn non_busy_failure_degrades_without_retrying() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let analyzer = MoodAnalyzer::new(Client::new(), test_config(server.uri()));
        assert_eq!(analyzer.analyze("anything").await, NEUTRAL_FALLBACK);
        server.verify().await;
    }

    #[tokio::test]
    async fn empty_sentiment_sequence_degrades_to_neutral() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([[]])))
            .mount(&server)
            .await;

        let analyzer = MoodAnalyzer::new(Client::new(), test_config(server.uri()));
        assert_eq!(analyzer.analyze("anything").await, NEUTRAL_FALLBACK);
    }
}
