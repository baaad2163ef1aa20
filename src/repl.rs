//! Interactive terminal session: ask for the key, then generate on demand.

use colored::Colorize;
use rustyline::config::Configurer;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::history::DefaultHistory;
use rustyline::{ColorMode, Completer, DefaultEditor, Editor, Helper, Hinter, Validator};
use std::borrow::Cow::{self, Borrowed, Owned};
use tracing::debug;

use crate::catalog::Category;
use crate::controller::InteractionController;
use crate::display::{ConsoleFormatter, OutputFormat};

/// Hides typed characters while the API key is entered.
#[derive(Completer, Helper, Hinter, Validator)]
struct MaskingHighlighter {
    masking: bool,
}

impl Highlighter for MaskingHighlighter {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if self.masking {
            Owned("*".repeat(line.chars().count()))
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        self.masking
    }
}

/// A parsed line of REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Generate(Category),
    Graph(bool),
    Reset,
    Key,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Command {
        let line = line.trim();
        match line {
            "1" => return Command::Generate(Category::Explanation),
            "2" => return Command::Generate(Category::Practice),
            "3" => return Command::Generate(Category::Applications),
            "/reset" => return Command::Reset,
            "/key" => return Command::Key,
            "/help" | "/?" => return Command::Help,
            "/quit" | "/exit" | "/q" => return Command::Quit,
            _ => {}
        }

        if let Some(arg) = line.strip_prefix("/graph") {
            return match arg.trim() {
                "on" => Command::Graph(true),
                "off" => Command::Graph(false),
                _ => Command::Unknown(line.to_string()),
            };
        }

        line.parse()
            .map(Command::Generate)
            .unwrap_or_else(|_| Command::Unknown(line.to_string()))
    }
}

/// Interactive read-generate-print loop.
pub struct TutorRepl {
    controller: InteractionController,
    include_graph: bool,
    format: OutputFormat,
}

impl TutorRepl {
    pub fn new(controller: InteractionController, format: OutputFormat) -> Self {
        let include_graph = controller.options().show_graph;
        Self {
            controller,
            include_graph,
            format,
        }
    }

    /// Run until `/quit` or end of input.
    pub async fn run(&mut self, initial_key: Option<String>) -> rustyline::Result<()> {
        self.print_welcome();

        if let Some(key) = initial_key {
            if let Err(e) = self.controller.supply_credential(&key) {
                eprintln!("{} {e}", "Error:".red().bold());
            }
        }
        if !self.controller.is_ready() && !self.prompt_for_key()? {
            return Ok(());
        }

        let mut rl = DefaultEditor::new()?;

        loop {
            let prompt = format!("[graph {}] >>> ", if self.include_graph { "on" } else { "off" });
            let line = match rl.readline(&prompt) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => return Err(err),
            };

            if line.trim().is_empty() {
                continue;
            }
            if let Err(e) = rl.add_history_entry(line.as_str()) {
                debug!(error = %e, "could not record history entry");
            }

            match Command::parse(&line) {
                Command::Generate(category) => {
                    if !self.generate(category).await? {
                        break;
                    }
                }
                Command::Graph(on) => {
                    self.include_graph = on;
                    if on && !self.controller.options().show_graph {
                        println!("Graphs are disabled by configuration (show_graph = false).");
                    }
                }
                Command::Reset => {
                    self.controller.reset_conversation();
                    println!("Conversation history cleared.");
                }
                Command::Key => {
                    if !self.prompt_for_key()? {
                        break;
                    }
                }
                Command::Help => self.print_help(),
                Command::Quit => {
                    println!("Bye!");
                    break;
                }
                Command::Unknown(input) => {
                    println!("Unknown input '{input}'. Type /help for commands.");
                }
            }
        }

        Ok(())
    }

    /// Run one cycle and print the outcome; `false` when the session should end.
    async fn generate(&mut self, category: Category) -> rustyline::Result<bool> {
        println!("{}", "Generating content...".dimmed());
        let result = self.controller.generate(category, self.include_graph).await;

        match result.and_then(|report| ConsoleFormatter::format(&report, self.format)) {
            Ok(output) => println!("\n{output}"),
            Err(e) => {
                eprintln!("{} {e}", "Error:".red().bold());
                if !e.is_recoverable() {
                    return Ok(false);
                }
                if !self.controller.is_ready() {
                    return self.prompt_for_key();
                }
            }
        }

        Ok(true)
    }

    /// Ask for a key until one is accepted; `false` when input ends first.
    fn prompt_for_key(&mut self) -> rustyline::Result<bool> {
        let mut rl: Editor<MaskingHighlighter, DefaultHistory> = Editor::new()?;
        rl.set_helper(Some(MaskingHighlighter { masking: true }));
        rl.set_color_mode(ColorMode::Forced);
        rl.set_auto_add_history(false);

        loop {
            let key = match rl.readline("Enter your Gemini API Key: ") {
                Ok(key) => key,
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => return Ok(false),
                Err(err) => return Err(err),
            };

            match self.controller.supply_credential(&key) {
                Ok(()) => {
                    debug!("interactive credential accepted");
                    return Ok(true);
                }
                Err(e) => eprintln!("{} {e}", "Error:".red().bold()),
            }
        }
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", "Quadratic Equations Learning Tool".bold());
        println!();
        self.print_help();
    }

    fn print_help(&self) {
        println!("Select content type:");
        for (i, category) in Category::ALL.iter().enumerate() {
            println!("  {}. {category}", i + 1);
        }
        println!();
        println!("Commands:");
        println!("  /graph on|off   Include graph/diagram");
        println!("  /reset          Clear the conversation history");
        println!("  /key            Enter a different API key");
        println!("  /help           Show this help");
        println!("  /quit           Exit");
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_categories() {
        assert_eq!(
            Command::parse("practice"),
            Command::Generate(Category::Practice)
        );
        assert_eq!(
            Command::parse(" Explanation "),
            Command::Generate(Category::Explanation)
        );
        assert_eq!(Command::parse("3"), Command::Generate(Category::Applications));
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/graph off"), Command::Graph(false));
        assert_eq!(Command::parse("/graph  on"), Command::Graph(true));
        assert_eq!(Command::parse("/reset"), Command::Reset);
        assert_eq!(Command::parse("/key"), Command::Key);
        assert_eq!(Command::parse("/exit"), Command::Quit);
        assert_eq!(
            Command::parse("/graph maybe"),
            Command::Unknown("/graph maybe".to_string())
        );
        assert_eq!(
            Command::parse("geometry"),
            Command::Unknown("geometry".to_string())
        );
    }
}
