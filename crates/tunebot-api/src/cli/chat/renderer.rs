//! Terminal rendering of transcript entries.
//!
//! `ChatRenderer` combines `termimad` for prose and `syntect` for fenced code
//! segments. Entries are split by [`tunebot_core::transcript::render_entry`].

use console::style;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Style, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::as_24_bit_terminal_escaped;
use termimad::MadSkin;

use tunebot_core::transcript::{RenderedEntry, Segment, render_entry};

const THEME: &str = "base16-ocean.dark";

/// Terminal renderer with syntax highlighting.
pub struct ChatRenderer {
    skin: MadSkin,
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl Default for ChatRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatRenderer {
    pub fn new() -> Self {
        let mut skin = MadSkin::default_dark();
        skin.inline_code
            .set_fg(termimad::crossterm::style::Color::Yellow);
        skin.bold.set_fg(termimad::crossterm::style::Color::Cyan);

        Self {
            skin,
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
        }
    }

    /// Render one transcript entry: user entries as a highlighted line, all
    /// others as prose and code segments in order.
    pub fn render(&self, entry: &str) -> String {
        match render_entry(entry) {
            RenderedEntry::User(text) => format!("  {}\n", style(text).green().bold()),
            RenderedEntry::Agent(segments) => {
                let mut output = String::new();
                for segment in segments {
                    match segment {
                        Segment::Prose(text) => {
                            output.push_str(&format!("{}", self.skin.term_text(&text)));
                        }
                        Segment::Code { language, code } => {
                            output.push_str(&self.highlight_code(&code, &language));
                        }
                    }
                }
                output
            }
        }
    }

    /// Render the persistent error banner.
    pub fn render_error(&self, message: &str) -> String {
        format!("  {} {}\n", style("!").red().bold(), style(message).red())
    }

    /// Render a dimmed status note.
    pub fn render_note(&self, message: &str) -> String {
        format!("  {}\n", style(message).dim())
    }

    fn highlight_code(&self, code: &str, lang: &str) -> String {
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let mut output = String::new();
        output.push_str(&format!("  {}\n", style(format!("--- {lang} ---")).dim()));

        let Some(theme) = self.theme_set.themes.get(THEME) else {
            for line in code.lines() {
                output.push_str(&format!("  {line}\n"));
            }
            return output;
        };

        let mut h = HighlightLines::new(syntax, theme);
        for line in code.lines() {
            let ranges: Vec<(Style, &str)> = h
                .highlight_line(line, &self.syntax_set)
                .unwrap_or_default();
            let escaped = as_24_bit_terminal_escaped(&ranges[..], false);
            output.push_str(&format!("  {escaped}\x1b[0m\n"));
        }

        output
    }
}
