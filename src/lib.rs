pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod tasks;

pub use config::{AppConfig, Variant};
pub use models::*;
pub use service::{AppState, create_app};
