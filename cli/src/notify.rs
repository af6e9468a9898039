use crossterm::style::{style, Stylize};
use millrun_core::{Notifier, Severity};

/// Prints notifications to stderr so table output stays clean.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn show_toast(&self, message: &str, severity: Severity) {
        let line = match severity {
            Severity::Success => style(format!("✓ {}", message)).green(),
            Severity::Info => style(format!("i {}", message)).cyan(),
            Severity::Warning => style(format!("! {}", message)).yellow(),
            Severity::Error => style(format!("✗ {}", message)).red().bold(),
        };
        eprintln!("{}", line);
    }
}
