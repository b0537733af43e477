//! Toasts and confirmation prompts on the terminal.

use crate::output::Formatter;
use relovetree_domain::traits::{Interaction, Toast};
use std::io::{self, BufRead, Write};

/// Prints toasts and asks yes/no questions on stdin.
pub struct TerminalInteraction {
    formatter: Formatter,
    assume_yes: bool,
}

impl TerminalInteraction {
    /// Create an interaction; `assume_yes` answers every prompt with yes.
    pub fn new(formatter: Formatter, assume_yes: bool) -> Self {
        Self {
            formatter,
            assume_yes,
        }
    }
}

impl Interaction for TerminalInteraction {
    fn toast(&self, toast: Toast) {
        let line = self.formatter.toast(&toast);
        // stdout carries json/quiet output
        if self.formatter.is_table() {
            println!("{}", line);
        } else {
            eprintln!("{}", line);
        }
    }

    fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        eprint!("{} [y/N] ", message);
        if io::stderr().flush().is_err() {
            return false;
        }

        let mut response = String::new();
        match io::stdin().lock().read_line(&mut response) {
            Ok(_) => is_yes(&response),
            Err(e) => {
                tracing::warn!("Could not read confirmation: {}", e);
                false
            }
        }
    }
}

/// Whether a prompt answer means yes.
pub fn is_yes(response: &str) -> bool {
    matches!(response.trim().to_lowercase().as_str(), "y" | "yes" | "예" | "네")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(is_yes("네"));
        assert!(!is_yes(""));
        assert!(!is_yes("n"));
        assert!(!is_yes("yes please"));
    }

    #[test]
    fn test_assume_yes_skips_prompt() {
        let interaction = TerminalInteraction::new(Formatter::new(OutputFormat::Table, false), true);
        assert!(interaction.confirm("Overwrite?"));
    }
}
