//! Output formatting utilities for the CLI.

use serde::Serialize;

use crate::domain::errors::{FetchError, EXIT_CONFIG};
use crate::infrastructure::logging::scrub_secrets;

pub trait CommandOutput: Serialize {
    fn to_human(&self) -> String;
    fn to_json(&self) -> serde_json::Value;
}

pub fn output<T: CommandOutput>(result: &T, json_mode: bool) {
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&result.to_json()).unwrap_or_default());
    } else {
        println!("{}", result.to_human());
    }
}

/// A failed command, as reported to the user.
#[derive(Debug, Serialize)]
pub struct ErrorOutput {
    pub error: String,
    pub kind: &'static str,
    pub exit_code: i32,
}

impl ErrorOutput {
    pub fn from_error(err: &anyhow::Error) -> Self {
        let (kind, exit_code) = match err.downcast_ref::<FetchError>() {
            Some(fetch_err) => (fetch_err.kind(), fetch_err.exit_code()),
            None => ("config", EXIT_CONFIG),
        };
        Self {
            error: scrub_secrets(&format!("{err:#}")),
            kind,
            exit_code,
        }
    }
}

impl CommandOutput for ErrorOutput {
    fn to_human(&self) -> String {
        format!("Error: {}", self.error)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Log and report `err`, returning the process exit code.
///
/// In JSON mode the error object goes to stdout like any other result;
/// otherwise the message goes to stderr.
pub fn handle_error(err: &anyhow::Error, json_mode: bool) -> i32 {
    let report = ErrorOutput::from_error(err);
    tracing::error!(kind = report.kind, exit_code = report.exit_code, "{}", report.error);

    if json_mode {
        output(&report, true);
    } else {
        eprintln!("{}", report.to_human());
    }
    report.exit_code
}
