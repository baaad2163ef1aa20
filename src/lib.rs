//! Quadratic equations learning tool.
//!
//! Sends one of three fixed prompts to Gemini, then derives readability
//! scores, "why" questions or keyword counts, and an example parabola from
//! the generated text. The presentation layer (terminal REPL, one-shot CLI)
//! only consumes the plain [`Report`] the controller produces.

pub mod accumulator;
pub mod analyzer;
pub mod catalog;
pub mod chart;
pub mod cli;
pub mod controller;
pub mod display;
pub mod error;
pub mod provider;
pub mod providers;
pub mod repl;
pub mod response;
pub mod session;
pub mod settings;
pub mod sse_stream;
pub mod types;

// Re-export core types for easy usage
pub use analyzer::{analyze, Analysis, Extraction, ReadabilityMetrics};
pub use catalog::{Category, QuadraticSpec};
pub use chart::{render, Chart, Quadratic};
pub use cli::Cli;
pub use controller::{DisplayOptions, InteractionController, Report};
pub use display::{ConsoleFormatter, OutputFormat};
pub use error::Error;
pub use provider::LLMProvider;
pub use providers::*;
pub use repl::TutorRepl;
pub use response::*;
pub use session::{ChatSession, GenerationClient, SessionSettings};
pub use settings::{AppConfig, ConfigLoader};
pub use sse_stream::SseEvent;
pub use types::*;
