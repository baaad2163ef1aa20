//! One end-to-end generate cycle: prompt lookup, generation, analysis, chart.

use serde::Serialize;
use tracing::{info, warn};

use crate::analyzer::{self, Extraction, ReadabilityMetrics};
use crate::catalog::Category;
use crate::chart::{self, Chart};
use crate::session::{ChatSession, GenerationClient, SessionSettings};
use crate::Error;

/// Which optional sections a report carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayOptions {
    pub show_readability: bool,
    pub show_graph: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            show_readability: true,
            show_graph: true,
        }
    }
}

/// A chart plus the heading it is shown under.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSection {
    pub heading: String,
    pub chart: Chart,
}

/// Everything produced by one generate cycle, ready for a display sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub category: Category,
    pub heading: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readability: Option<ReadabilityMetrics>,
    pub extraction: Extraction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartSection>,
}

/// Controller state.
pub enum State {
    AwaitingCredential,
    Ready(ChatSession),
}

/// Drives generate cycles for a single interaction.
pub struct InteractionController {
    settings: SessionSettings,
    options: DisplayOptions,
    state: State,
}

impl InteractionController {
    pub fn new(settings: SessionSettings, options: DisplayOptions) -> Self {
        Self {
            settings,
            options,
            state: State::AwaitingCredential,
        }
    }

    /// Start in `Ready` with an existing session.
    pub fn with_session(mut self, session: ChatSession) -> Self {
        self.state = State::Ready(session);
        self
    }

    /// Open a session for `credential`, replacing any previous one.
    ///
    /// On failure the controller is left awaiting a credential.
    pub fn supply_credential(&mut self, credential: &str) -> Result<(), Error> {
        match GenerationClient::initialize(credential, &self.settings) {
            Ok(session) => {
                self.state = State::Ready(session);
                info!("credential accepted, ready to generate");
                Ok(())
            }
            Err(e) => {
                self.state = State::AwaitingCredential;
                Err(e)
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, State::Ready(_))
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn options(&self) -> DisplayOptions {
        self.options
    }

    /// Clear the conversation history, keeping the credential.
    pub fn reset_conversation(&mut self) {
        if let State::Ready(session) = &mut self.state {
            session.reset();
        }
    }

    /// Run one cycle for `category`; the chart is included when both the
    /// caller asks for it and the options allow it.
    ///
    /// Errors are scoped to this cycle. A key the service rejects sends the
    /// controller back to awaiting a credential; any other failure leaves it
    /// ready, with no turn recorded for the failed cycle.
    pub async fn generate(
        &mut self,
        category: Category,
        include_graph: bool,
    ) -> Result<Report, Error> {
        let State::Ready(session) = &mut self.state else {
            return Err(Error::authentication("no API key supplied yet"));
        };

        info!(%category, include_graph, "generating content");

        let text = match session.send(category.prompt()).await {
            Ok(text) => text,
            Err(e @ Error::Authentication(_)) => {
                warn!(%category, error = %e, "API key rejected, awaiting a new one");
                self.state = State::AwaitingCredential;
                return Err(e);
            }
            Err(e) => {
                warn!(%category, error = %e, "generation failed");
                return Err(e);
            }
        };

        build_report(&text, category, self.options, include_graph).inspect_err(|e| {
            warn!(%category, error = %e, "generated text could not be analyzed");
            session.discard_last_turn();
        })
    }
}

/// Analyze `text` and assemble the report sections enabled by `options`.
pub fn build_report(
    text: &str,
    category: Category,
    options: DisplayOptions,
    include_graph: bool,
) -> Result<Report, Error> {
    let analysis = analyzer::analyze(text, category)?;

    let chart = if include_graph && options.show_graph {
        let chart = chart::render(category.quadratic())?;
        let chart = match category.chart_title() {
            Some(title) => chart.with_title(title),
            None => chart,
        };
        Some(ChartSection {
            heading: category.chart_heading().to_string(),
            chart,
        })
    } else {
        None
    };

    Ok(Report {
        category,
        heading: format!("Response for {category}:"),
        text: text.to_string(),
        readability: options.show_readability.then_some(analysis.readability),
        extraction: analysis.extraction,
        follow_up: category.follow_up().map(str::to_string),
        chart,
    })
}
