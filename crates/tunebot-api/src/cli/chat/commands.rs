//! Slash commands for the interactive client.

use console::style;

/// In-chat controls.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Clear the terminal screen.
    Clear,
    /// Exit the client.
    Exit,
    /// Start auto mode; the transcript is reset.
    Auto,
    /// Stop auto mode.
    Stop,
    /// Re-render the whole transcript.
    History,
    /// Unknown command.
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let cmd = trimmed
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_lowercase();

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(ChatCommand::Help),
        "/clear" | "/cls" => Some(ChatCommand::Clear),
        "/exit" | "/quit" | "/q" => Some(ChatCommand::Exit),
        "/auto" => Some(ChatCommand::Auto),
        "/stop" => Some(ChatCommand::Stop),
        "/history" => Some(ChatCommand::History),
        other => Some(ChatCommand::Unknown(other.to_string())),
    }
}

/// Help text listing all commands.
pub fn help_text() -> String {
    let rows = [
        ("/help", "Show this help message"),
        ("/auto", "Start auto mode (clears the transcript)"),
        ("/stop", "Stop auto mode"),
        ("/history", "Show the transcript again"),
        ("/clear", "Clear the screen"),
        ("/exit", "Quit"),
    ];

    let mut out = format!("\n  {}\n\n", style("Available commands:").bold());
    for (cmd, desc) in rows {
        out.push_str(&format!("  {} {desc}\n", style(format!("{cmd:<10}")).cyan()));
    }
    out.push_str(&format!(
        "\n  {}\n",
        style("Ctrl+C stops auto mode, Ctrl+D exits").dim()
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exit() {
        assert_eq!(parse("/exit"), Some(ChatCommand::Exit));
        assert_eq!(parse("/quit"), Some(ChatCommand::Exit));
        assert_eq!(parse("/q"), Some(ChatCommand::Exit));
    }

    #[test]
    fn test_parse_auto_and_stop() {
        assert_eq!(parse("/auto"), Some(ChatCommand::Auto));
        assert_eq!(parse("  /STOP "), Some(ChatCommand::Stop));
    }

    #[test]
    fn test_parse_not_command() {
        assert_eq!(parse("mint my single as an NFT"), None);
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(parse("/foo bar"), Some(ChatCommand::Unknown("/foo".to_string())));
    }

    #[test]
    fn test_help_lists_commands() {
        let help = console::strip_ansi_codes(&help_text()).into_owned();
        assert!(help.contains("/auto"));
        assert!(help.contains("/stop"));
    }
}
