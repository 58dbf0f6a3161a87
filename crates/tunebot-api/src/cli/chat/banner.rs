//! Welcome banner for the interactive client.

use console::style;

/// Banner shown when the interactive client starts.
pub fn welcome_banner(endpoint: &str) -> String {
    format!(
        "\n  {} {}\n  {}\n\n  {}  {}\n\n  {}\n  {}\n\n",
        "\u{266a}",
        style("tunebot").cyan().bold(),
        style("Onchain assistant for musicians").dim(),
        style("Server:").bold(),
        style(endpoint).dim(),
        style("Type /help for commands, Ctrl+D to exit").dim(),
        style("---").dim(),
    )
}
