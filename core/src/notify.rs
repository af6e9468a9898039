use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Success => "success",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(s)
    }
}

/// Fire-and-forget user notification sink.
pub trait Notifier {
    fn show_toast(&self, message: &str, severity: Severity);
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn show_toast(&self, message: &str, severity: Severity) {
        (**self).show_toast(message, severity)
    }
}

/// Sends notifications to the log only.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn show_toast(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Error => error!(target: "millrun::toast", "{}", message),
            Severity::Warning => warn!(target: "millrun::toast", "{}", message),
            Severity::Success | Severity::Info => info!(target: "millrun::toast", %severity, "{}", message),
        }
    }
}
