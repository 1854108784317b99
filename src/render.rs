//! Rendering of chat output
//!
//! The [`Renderer`] trait is the seam between the chat session and whatever
//! shows the conversation. A renderer owns the visible message area and the
//! input control: the session tells it when to show user text, stream
//! response fragments, surface errors, and disable or re-enable input.
//!
//! Response text is kept raw in a [`ResponseView`]; the displayed form is
//! re-derived from the whole raw buffer on every append, so the
//! [`Formatter`] can be swapped without touching the stream reader.

use std::io::Write;

use colored::Colorize;

use crate::config::{RenderConfig, RenderFormat};

/// Turns accumulated raw response text into its displayed form
pub trait Formatter: Send + Sync + std::fmt::Debug {
    /// Format the full raw text received so far
    fn format(&self, raw: &str) -> String;
}

/// Shows text exactly as received
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainFormatter;

impl Formatter for PlainFormatter {
    fn format(&self, raw: &str) -> String {
        raw.to_string()
    }
}

/// Converts newlines to `<br>` tags
#[derive(Debug, Clone, Copy, Default)]
pub struct LineBreakFormatter;

impl Formatter for LineBreakFormatter {
    fn format(&self, raw: &str) -> String {
        raw.replace('\n', "<br>")
    }
}

/// Build the formatter for a configured render format
pub fn formatter_for(format: RenderFormat) -> Box<dyn Formatter> {
    match format {
        RenderFormat::Plain => Box::new(PlainFormatter),
        RenderFormat::LineBreak => Box::new(LineBreakFormatter),
    }
}

/// Raw response text plus its current formatted rendition
#[derive(Debug)]
pub struct ResponseView {
    raw: String,
    rendered: String,
    formatter: Box<dyn Formatter>,
}

impl ResponseView {
    /// Create an empty view using `formatter`
    pub fn new(formatter: Box<dyn Formatter>) -> Self {
        Self {
            raw: String::new(),
            rendered: String::new(),
            formatter,
        }
    }

    /// Append a fragment and re-derive the displayed text
    ///
    /// # Examples
    ///
    /// ```
    /// use chatai::render::{LineBreakFormatter, ResponseView};
    ///
    /// let mut view = ResponseView::new(Box::new(LineBreakFormatter));
    /// view.append("Hello\n");
    /// assert_eq!(view.append("World"), "Hello<br>World");
    /// assert_eq!(view.raw(), "Hello\nWorld");
    /// ```
    pub fn append(&mut self, fragment: &str) -> &str {
        self.raw.push_str(fragment);
        self.rendered = self.formatter.format(&self.raw);
        &self.rendered
    }

    /// Accumulated raw text
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Displayed text for the current raw buffer
    pub fn rendered(&self) -> &str {
        &self.rendered
    }

    /// Drop all accumulated text
    pub fn clear(&mut self) {
        self.raw.clear();
        self.rendered.clear();
    }
}

/// Output target of a chat session
///
/// Methods are called in session order: `user_message`, `set_input_enabled(false)`,
/// `begin_response`, any number of `append`/`error`, `end_response`,
/// `set_input_enabled(true)`, `focus_input`.
pub trait Renderer {
    /// Show the welcome message of an empty chat
    fn welcome(&mut self) {}

    /// Show the prompt the user just sent
    fn user_message(&mut self, text: &str);

    /// A response is about to stream in
    fn begin_response(&mut self);

    /// Append a decoded response fragment
    fn append(&mut self, fragment: &str);

    /// Show an inline error indicator
    fn error(&mut self, message: &str);

    /// Bring the newest output into view
    fn scroll_to_bottom(&mut self) {}

    /// The response has finished, by any path
    fn end_response(&mut self) {}

    /// Enable or disable the input control
    fn set_input_enabled(&mut self, enabled: bool);

    /// Move focus back to the input control
    fn focus_input(&mut self) {}

    /// Remove all messages
    fn clear(&mut self) {}
}

/// Renders the chat to a terminal (or any writer)
#[derive(Debug)]
pub struct TerminalRenderer<W: Write> {
    out: W,
    view: ResponseView,
    format: RenderFormat,
    /// Formatted text already written for the current response
    shown: String,
    typing_indicator: bool,
    indicator_visible: bool,
    input_enabled: bool,
}

impl TerminalRenderer<std::io::Stdout> {
    /// Create a renderer writing to stdout
    pub fn stdout(config: &RenderConfig) -> Self {
        Self::new(std::io::stdout(), config)
    }
}

impl<W: Write> TerminalRenderer<W> {
    /// Create a renderer writing to `out`
    pub fn new(out: W, config: &RenderConfig) -> Self {
        Self {
            out,
            view: ResponseView::new(formatter_for(config.format)),
            format: config.format,
            shown: String::new(),
            typing_indicator: config.typing_indicator,
            indicator_visible: false,
            input_enabled: true,
        }
    }

    /// Whether the input control is currently enabled
    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    /// Raw text of the current (or last) response
    pub fn response_text(&self) -> &str {
        self.view.raw()
    }

    /// Consume the renderer and return its writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        if let Err(e) = self.out.write_all(text.as_bytes()) {
            tracing::debug!("Failed to write chat output: {}", e);
        }
    }

    fn clear_indicator(&mut self) {
        if self.indicator_visible {
            self.emit("\r\x1b[2K");
            self.indicator_visible = false;
            let label = format!("{} ", "AI:".cyan().bold());
            self.emit(&label);
        }
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn welcome(&mut self) {
        let banner = format!(
            "{}\n{}\n{}\n\n",
            "Chat AI".bold(),
            "Type a question and press Enter to send it.".dimmed(),
            "Commands: /new starts a new chat, /help lists all commands.".dimmed()
        );
        self.emit(&banner);
    }

    fn user_message(&mut self, text: &str) {
        let line = format!("{} {}\n", "You:".green().bold(), text);
        self.emit(&line);
    }

    fn begin_response(&mut self) {
        self.view = ResponseView::new(formatter_for(self.format));
        self.shown.clear();
        if self.typing_indicator {
            let line = format!("{} {}", "AI:".cyan().bold(), "AI is thinking...".dimmed());
            self.emit(&line);
            self.indicator_visible = true;
        } else {
            let label = format!("{} ", "AI:".cyan().bold());
            self.emit(&label);
        }
    }

    fn append(&mut self, fragment: &str) {
        self.clear_indicator();
        let rendered = self.view.append(fragment).to_string();
        if let Some(delta) = rendered.strip_prefix(self.shown.as_str()) {
            let delta = delta.to_string();
            self.emit(&delta);
        } else {
            // Formatting changed earlier output; re-render the whole response.
            self.emit("\n");
            self.emit(&rendered);
        }
        self.shown = rendered;
    }

    fn error(&mut self, message: &str) {
        self.clear_indicator();
        let line = format!("\n{} {}", "[error]".red().bold(), message.red());
        self.emit(&line);
    }

    fn scroll_to_bottom(&mut self) {
        if let Err(e) = self.out.flush() {
            tracing::debug!("Failed to flush chat output: {}", e);
        }
    }

    fn end_response(&mut self) {
        self.clear_indicator();
        self.emit("\n\n");
        self.scroll_to_bottom();
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
    }

    fn clear(&mut self) {
        self.view.clear();
        self.shown.clear();
        self.indicator_visible = false;
        // ANSI: clear screen, cursor home.
        self.emit("\x1b[2J\x1b[H");
    }
}

/// One observable renderer call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderEvent {
    /// Welcome message shown
    Welcome,
    /// User prompt shown
    User(String),
    /// Response started
    Begin,
    /// Fragment appended
    Append(String),
    /// Inline error shown
    Error(String),
    /// Scroll requested
    Scroll,
    /// Response finished
    End,
    /// Input enabled or disabled
    InputEnabled(bool),
    /// Input focused
    Focus,
    /// Messages cleared
    Clear,
}

/// Headless renderer that records every call
///
/// Useful for embedding the session without a terminal, and for tests.
#[derive(Debug, Clone)]
pub struct RecordingRenderer {
    /// Calls in the order they were made
    pub events: Vec<RenderEvent>,
    /// Current input control state
    pub input_enabled: bool,
}

impl RecordingRenderer {
    /// Create a renderer with input enabled
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            input_enabled: true,
        }
    }

    /// Concatenation of all appended fragments
    pub fn text(&self) -> String {
        self.events
            .iter()
            .filter_map(|e| match e {
                RenderEvent::Append(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Messages passed to `error`
    pub fn errors(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RenderEvent::Error(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Number of times `event` was recorded
    pub fn count(&self, event: &RenderEvent) -> usize {
        self.events.iter().filter(|e| *e == event).count()
    }
}

impl Default for RecordingRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for RecordingRenderer {
    fn welcome(&mut self) {
        self.events.push(RenderEvent::Welcome);
    }

    fn user_message(&mut self, text: &str) {
        self.events.push(RenderEvent::User(text.to_string()));
    }

    fn begin_response(&mut self) {
        self.events.push(RenderEvent::Begin);
    }

    fn append(&mut self, fragment: &str) {
        self.events.push(RenderEvent::Append(fragment.to_string()));
    }

    fn error(&mut self, message: &str) {
        self.events.push(RenderEvent::Error(message.to_string()));
    }

    fn scroll_to_bottom(&mut self) {
        self.events.push(RenderEvent::Scroll);
    }

    fn end_response(&mut self) {
        self.events.push(RenderEvent::End);
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
        self.events.push(RenderEvent::InputEnabled(enabled));
    }

    fn focus_input(&mut self) {
        self.events.push(RenderEvent::Focus);
    }

    fn clear(&mut self) {
        self.events.push(RenderEvent::Clear);
    }
}
