use std::sync::Arc;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::config::{AppConfig, Variant};
use crate::error::TaskError;
use crate::models::{
    BasicBundle, ExtendedBundle, LocalEvent, Mood, Quote, Recommendation, RecommendationBundle,
};
use crate::tasks::photo_search::{FALLBACK_PHOTO_URL, PhotoSearch};

const BASIC_MAX_LENGTH: u32 = 250;
const EXTENDED_MAX_LENGTH: u32 = 600;
const MAX_LOCAL_EVENTS: usize = 3;

/// Asks the text-generation endpoint for a lifestyle bundle and enriches it.
pub struct RecommendationGenerator {
    client: Client,
    config: Arc<AppConfig>,
    photos: PhotoSearch,
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: String,
}

impl RecommendationGenerator {
    pub fn new(client: Client, config: Arc<AppConfig>) -> Self {
        let photos = PhotoSearch::new(client.clone(), config.clone());
        Self {
            client,
            config,
            photos,
        }
    }

    /// Produce the configured variant's bundle; any generation or parse
    /// failure substitutes the fixed fallback bundle wholesale.
    pub async fn generate(
        &self,
        prompt: &str,
        mood: Mood,
        city: Option<&str>,
    ) -> RecommendationBundle {
        match self.config.variant {
            Variant::Basic => match self.generate_basic(prompt, mood).await {
                Ok(bundle) => RecommendationBundle::Basic(bundle),
                Err(e) => {
                    warn!(error = %e, "recommendation generation failed, using fallback bundle");
                    RecommendationBundle::Basic(basic_fallback())
                }
            },
            Variant::Extended => match self.generate_extended(prompt, mood, city).await {
                Ok(bundle) => RecommendationBundle::Extended(bundle),
                Err(e) => {
                    warn!(error = %e, "recommendation generation failed, using fallback bundle");
                    RecommendationBundle::Extended(extended_fallback(city))
                }
            },
        }
    }

    async fn generate_basic(&self, prompt: &str, mood: Mood) -> Result<BasicBundle, TaskError> {
        let text = self
            .complete(&build_basic_prompt(prompt, mood), BASIC_MAX_LENGTH)
            .await?;
        let bundle: BasicBundle = serde_json::from_str(strip_code_fences(&text))?;
        info!("recommendation bundle parsed");
        Ok(bundle)
    }

    async fn generate_extended(
        &self,
        prompt: &str,
        mood: Mood,
        city: Option<&str>,
    ) -> Result<ExtendedBundle, TaskError> {
        let text = self
            .complete(&build_extended_prompt(prompt, mood, city), EXTENDED_MAX_LENGTH)
            .await?;
        let mut bundle: ExtendedBundle = serde_json::from_str(strip_code_fences(&text))?;
        bundle.local_events.truncate(MAX_LOCAL_EVENTS);
        info!("recommendation bundle parsed, attaching photos");
        self.attach_photos(&mut bundle).await;
        Ok(bundle)
    }

    /// One photo lookup per category; quote, moodExplanation and localEvents
    /// carry no image.
    async fn attach_photos(&self, bundle: &mut ExtendedBundle) {
        for rec in [
            &mut bundle.music,
            &mut bundle.book,
            &mut bundle.movie,
            &mut bundle.tv,
            &mut bundle.podcast,
            &mut bundle.food,
            &mut bundle.activity,
            &mut bundle.game,
        ] {
            rec.image_url = Some(self.photos.search(&rec.value).await);
        }
    }

    async fn complete(&self, instruction: &str, max_length: u32) -> Result<String, TaskError> {
        let response = self
            .client
            .post(&self.config.text_gen_url)
            .bearer_auth(&self.config.hf_api_token)
            .json(&json!({
                "inputs": instruction,
                "parameters": {
                    "max_length": max_length,
                    "temperature": 0.7,
                    "return_full_text": false,
                },
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TaskError::Api { status });
        }
        let body: Vec<GeneratedText> = response.json().await?;
        body.into_iter()
            .next()
            .map(|g| g.generated_text.trim().to_string())
            .ok_or_else(|| TaskError::InvalidResponse("no generated text".to_string()))
    }
}

fn build_basic_prompt(prompt: &str, mood: Mood) -> String {
    format!(
        r#"[INST] Return only a valid JSON object for "{prompt}" with a {mood} mood: a soothing soundtrack (YouTube URL like https://www.youtube.com/watch?v=...), a book, a TV show, a podcast, a food item, and a short mood explanation (20-30 words). Format: {{"music": "", "book": "", "tv": "", "podcast": "", "food": "", "moodExplanation": ""}} [/INST]"#
    )
}

fn build_extended_prompt(prompt: &str, mood: Mood, city: Option<&str>) -> String {
    let area = city.unwrap_or("your area");
    format!(
        r#"[INST] Return only a valid JSON object for "{prompt}" with a {mood} mood. Include music (a soothing soundtrack with a YouTube link), book, movie, tv, podcast, food, activity and game, each as {{"value": "", "link": ""}}; a quote as {{"value": "", "author": ""}}; a short mood explanation (20-30 words) as moodExplanation; and up to 3 local events near {area} as localEvents, each {{"name": "", "date": "", "link": ""}}. Do not add any text outside the JSON. [/INST]"#
    )
}

/// Remove a surrounding markdown code fence, if the model added one.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    trimmed.strip_suffix("```").unwrap_or(trimmed).trim()
}

pub fn basic_fallback() -> BasicBundle {
    BasicBundle {
        music: "https://www.youtube.com/watch?v=CvFH_6DNRCY".to_string(),
        book: "The Great Gatsby by F. Scott Fitzgerald".to_string(),
        tv: "Top Gear".to_string(),
        podcast: "The Car Show".to_string(),
        food: "Caviar".to_string(),
        mood_explanation: "Spotting Lambos sparks a chill thrill—luxury vibes and smooth tunes."
            .to_string(),
    }
}

pub fn extended_fallback(city: Option<&str>) -> ExtendedBundle {
    fn rec(value: &str, link: &str) -> Recommendation {
        Recommendation {
            value: value.to_string(),
            link: Some(link.to_string()),
            image_url: Some(FALLBACK_PHOTO_URL.to_string()),
        }
    }

    let local_events = match city {
        Some(city) => vec![
            LocalEvent {
                name: format!("{city} Open-Air Concert"),
                date: "This Saturday".to_string(),
                link: "https://www.eventbrite.com".to_string(),
            },
            LocalEvent {
                name: format!("{city} Farmers Market"),
                date: "This Sunday".to_string(),
                link: "https://www.eventbrite.com".to_string(),
            },
            LocalEvent {
                name: format!("Art Walk in {city}"),
                date: "Next Friday".to_string(),
                link: "https://www.eventbrite.com".to_string(),
            },
        ],
        None => vec![
            LocalEvent {
                name: "Local Open-Air Concert".to_string(),
                date: "This Saturday".to_string(),
                link: "https://www.eventbrite.com".to_string(),
            },
            LocalEvent {
                name: "Neighborhood Farmers Market".to_string(),
                date: "This Sunday".to_string(),
                link: "https://www.eventbrite.com".to_string(),
            },
            LocalEvent {
                name: "Downtown Art Walk".to_string(),
                date: "Next Friday".to_string(),
                link: "https://www.eventbrite.com".to_string(),
            },
        ],
    };

    ExtendedBundle {
        music: rec(
            "Weightless by Marconi Union",
            "https://www.youtube.com/watch?v=UfcAVejslrU",
        ),
        book: rec(
            "The Midnight Library by Matt Haig",
            "https://www.goodreads.com/book/show/52578297-the-midnight-library",
        ),
        movie: rec("Amélie", "https://www.imdb.com/title/tt0211915/"),
        tv: rec(
            "The Great British Bake Off",
            "https://www.imdb.com/title/tt1877368/",
        ),
        podcast: rec("Radiolab", "https://radiolab.org"),
        food: rec(
            "Margherita pizza",
            "https://www.allrecipes.com/recipe/240376/homemade-margherita-pizza/",
        ),
        activity: rec(
            "A slow walk through a botanical garden",
            "https://www.alltrails.com",
        ),
        game: rec("Stardew Valley", "https://www.stardewvalley.net"),
        quote: Quote::default(),
        mood_explanation:
            "A steady set of familiar favorites to carry the tone of your day, whatever it brings."
                .to_string(),
        local_events,
    }
}
