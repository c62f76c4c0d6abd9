pub mod image_generation;
pub mod mood_analysis;
pub mod photo_search;
pub mod recommendations;

pub use image_generation::ImageRequester;
pub use mood_analysis::MoodAnalyzer;
pub use photo_search::PhotoSearch;
pub use recommendations::RecommendationGenerator;
