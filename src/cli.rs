//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

use crate::catalog::Category;
use crate::display::OutputFormat;

/// CLI arguments for quadratic-tutor
#[derive(Parser, Debug)]
#[command(name = "quadratic-tutor")]
#[command(author, version, about = "Quadratic equations learning tool powered by Gemini")]
#[command(long_about = r#"
Generates explanations, practice problems, or real-world applications of
quadratic equations, then shows readability scores, extracted "why"
questions or counts, and an example parabola.

Without --category an interactive session starts and asks for the API key.

Configuration files are loaded from (in priority order):
1. --config <path>                           Explicit config file
2. ./quadratic-tutor.toml                    Project-level config
3. ~/.config/quadratic-tutor/config.toml     Global config
TUTOR_* environment variables override all files.

Example:
  quadratic-tutor
  quadratic-tutor --category practice --no-graph
  GEMINI_API_KEY=... quadratic-tutor -c applications -o json
"#)]
pub struct Cli {
    /// Generate once for this category and exit
    #[arg(short, long, value_enum)]
    pub category: Option<Category>,

    /// Gemini API key (prompted for when missing)
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model name, overriding the config file
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Leave out the example graph
    #[arg(long)]
    pub no_graph: bool,

    /// Leave out readability scores
    #[arg(long)]
    pub no_readability: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}
