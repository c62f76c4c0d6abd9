use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

const DEFAULT_SENTIMENT_URL: &str =
    "https://api-inference.huggingface.co/models/distilbert-base-uncased-finetuned-sst-2-english";
const DEFAULT_TEXT_GEN_URL: &str =
    "https://api-inference.huggingface.co/models/mistralai/Mistral-7B-Instruct-v0.2";
const DEFAULT_HORDE_BASE_URL: &str = "https://stablehorde.net/api/v2";
const DEFAULT_UNSPLASH_BASE_URL: &str = "https://api.unsplash.com";

/// Which recommendation schema the text-generation prompt asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Basic,
    Extended,
}

impl Variant {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "basic" => Some(Variant::Basic),
            "extended" => Some(Variant::Extended),
            _ => None,
        }
    }
}

/// Process-wide configuration, built once at startup and shared read-only.
///
/// Base URLs are part of the config so tests can point every task at a mock
/// server; the retry/poll knobs exist for the same reason.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub allowed_origin: String,
    pub images_dir: PathBuf,
    pub variant: Variant,

    pub hf_api_token: String,
    pub sentiment_url: String,
    pub text_gen_url: String,
    pub horde_api_key: String,
    pub horde_base_url: String,
    pub unsplash_access_key: String,
    pub unsplash_base_url: String,

    pub sentiment_max_attempts: usize,
    pub sentiment_retry_delay: Duration,
    pub poll_interval: Duration,
    pub poll_ceiling: u32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5001);

        let variant = std::env::var("VARIANT")
            .ok()
            .and_then(|v| Variant::parse(&v))
            .unwrap_or(Variant::Extended);

        let hf_api_token = env_or_default("HF_API_TOKEN", "");
        let horde_api_key = env_or_default("AI_HORDE_API_KEY", "");
        let unsplash_access_key = env_or_default("UNSPLASH_ACCESS_KEY", "");

        if hf_api_token.is_empty() {
            warn!("HF_API_TOKEN not set; sentiment and text generation will degrade to fallbacks");
        }
        if horde_api_key.is_empty() {
            warn!("AI_HORDE_API_KEY not set; image generation will degrade to the fallback image");
        }
        if variant == Variant::Extended && unsplash_access_key.is_empty() {
            warn!("UNSPLASH_ACCESS_KEY not set; recommendation images will use the fallback photo");
        }

        Self {
            port,
            allowed_origin: env_or_default("ALLOWED_ORIGIN", "http://localhost:3000"),
            images_dir: PathBuf::from(env_or_default("IMAGES_DIR", "images")),
            variant,
            hf_api_token,
            sentiment_url: env_or_default("SENTIMENT_URL", DEFAULT_SENTIMENT_URL),
            text_gen_url: env_or_default("TEXT_GEN_URL", DEFAULT_TEXT_GEN_URL),
            horde_api_key,
            horde_base_url: env_or_default("AI_HORDE_BASE_URL", DEFAULT_HORDE_BASE_URL),
            unsplash_access_key,
            unsplash_base_url: env_or_default("UNSPLASH_BASE_URL", DEFAULT_UNSPLASH_BASE_URL),
            sentiment_max_attempts: 3,
            sentiment_retry_delay: Duration::from_secs(1),
            poll_interval: Duration::from_secs(1),
            poll_ceiling: 60,
        }
    }
}

fn env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
