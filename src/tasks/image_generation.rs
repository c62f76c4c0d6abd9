use std::sync::Arc;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::TaskError;
use crate::models::Mood;

/// Served when generation fails or the poll ceiling is reached.
pub const FALLBACK_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1504608524841-42fe6f032b4b";

/// Lifecycle of one generation job. Driven by `advance` once per status
/// check, so the poll loop itself stays trivial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Submitted,
    Polling { checks: u32 },
    Completed,
    TimedOut,
}

impl PollState {
    /// Transition after one status check reporting `done`. Terminal states
    /// are absorbing.
    pub fn advance(self, done: bool, ceiling: u32) -> PollState {
        let checks = match self {
            PollState::Submitted => 1,
            PollState::Polling { checks } => checks + 1,
            terminal => return terminal,
        };
        if done {
            PollState::Completed
        } else if checks >= ceiling {
            PollState::TimedOut
        } else {
            PollState::Polling { checks }
        }
    }
}

/// Submits an async generation job and polls it to completion.
pub struct ImageRequester {
    client: Client,
    config: Arc<AppConfig>,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CheckResponse {
    done: bool,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    generations: Vec<Generation>,
}

#[derive(Debug, Deserialize)]
struct Generation {
    img: String,
}

impl ImageRequester {
    pub fn new(client: Client, config: Arc<AppConfig>) -> Self {
        Self { client, config }
    }

    /// Always yields a URL: the first generated image, or the fixed
    /// fallback on timeout or any provider error.
    pub async fn request(&self, prompt: &str, mood: Mood) -> String {
        match self.generate(prompt, mood).await {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "image generation failed, using fallback image");
                FALLBACK_IMAGE_URL.to_string()
            }
        }
    }

    async fn generate(&self, prompt: &str, mood: Mood) -> Result<String, TaskError> {
        let full_prompt = format!("{prompt}, {mood} mood");
        let job_id = self.submit(&full_prompt).await?;
        info!(%job_id, "image generation job submitted");

        let mut state = PollState::Submitted;
        loop {
            tokio::time::sleep(self.config.poll_interval).await;
            let done = self.check(&job_id).await?;
            state = state.advance(done, self.config.poll_ceiling);
            debug!(%job_id, ?state, "image generation status checked");
            match state {
                PollState::Completed => return self.fetch_result(&job_id).await,
                PollState::TimedOut => {
                    return Err(TaskError::PollTimeout {
                        checks: self.config.poll_ceiling,
                    });
                }
                _ => {}
            }
        }
    }

    async fn submit(&self, prompt: &str) -> Result<String, TaskError> {
        let response = self
            .client
            .post(format!("{}/generate/async", self.config.horde_base_url))
            .header("apikey", &self.config.horde_api_key)
            .json(&json!({
                "prompt": prompt,
                "params": {
                    "sampler_name": "k_euler_a",
                    "steps": 20,
                    "cfg_scale": 7.5,
                    "width": 512,
                    "height": 512,
                },
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TaskError::Api { status });
        }
        let body: SubmitResponse = response.json().await?;
        Ok(body.id)
    }

    async fn check(&self, job_id: &str) -> Result<bool, TaskError> {
        let response = self
            .client
            .get(format!(
                "{}/generate/check/{job_id}",
                self.config.horde_base_url
            ))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TaskError::Api { status });
        }
        let body: CheckResponse = response.json().await?;
        Ok(body.done)
    }

    async fn fetch_result(&self, job_id: &str) -> Result<String, TaskError> {
        let response = self
            .client
            .get(format!(
                "{}/generate/status/{job_id}",
                self.config.horde_base_url
            ))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TaskError::Api { status });
        }
        let body: StatusResponse = response.json().await?;
        body.generations
            .into_iter()
            .next()
            .map(|g| g.img)
            .ok_or_else(|| TaskError::InvalidResponse("no generations in result".to_string()))
    }
}
