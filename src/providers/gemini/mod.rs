//! Gemini Developer API provider.

pub mod client;
pub mod types;

pub use client::{GeminiProvider, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
