//! Splitting transcript entries into display segments.

use super::AGENT_PREFIX;

const FENCE: &str = "```";
const DEFAULT_LANGUAGE: &str = "text";

/// One piece of an agent entry, in original order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Prose(String),
    Code { language: String, code: String },
}

/// How a transcript entry should be displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedEntry {
    /// A user entry, shown verbatim.
    User(String),
    /// Anything else, with the agent marker removed and fences split out.
    Agent(Vec<Segment>),
}

/// Classify an entry and split agent bodies into prose and code segments.
pub fn render_entry(entry: &str) -> RenderedEntry {
    if entry.starts_with("You:") {
        return RenderedEntry::User(entry.to_string());
    }
    let body = entry.strip_prefix(AGENT_PREFIX).unwrap_or(entry);
    RenderedEntry::Agent(split_segments(body))
}

/// Split `body` on ```` ```lang ```` fences.
///
/// An opening fence without a matching close is left as prose.
pub fn split_segments(body: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut rest = body;

    while let Some(open) = rest.find(FENCE) {
        let after_open = &rest[open + FENCE.len()..];
        let Some(newline) = after_open.find('\n') else {
            break;
        };
        let language = after_open[..newline].trim();
        let code_start = &after_open[newline + 1..];
        let Some(close) = code_start.find(FENCE) else {
            break;
        };

        push_prose(&mut segments, &rest[..open]);

        let code = &code_start[..close];
        let code = code.strip_suffix('\n').unwrap_or(code);
        let code = code.strip_suffix('\r').unwrap_or(code);
        segments.push(Segment::Code {
            language: if language.is_empty() {
                DEFAULT_LANGUAGE.to_string()
            } else {
                language.to_string()
            },
            code: code.to_string(),
        });

        rest = &code_start[close + FENCE.len()..];
    }

    push_prose(&mut segments, rest);
    segments
}

fn push_prose(segments: &mut Vec<Segment>, text: &str) {
    let text = text.trim_matches(|c| c == '\n' || c == '\r');
    if !text.trim().is_empty() {
        segments.push(Segment::Prose(text.to_string()));
    }
}
