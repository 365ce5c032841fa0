use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Redacts credentials from connection strings and error messages
#[derive(Clone)]
pub struct SecretScrubber {
    url_userinfo_pattern: Regex,
    password_pattern: Regex,
}

impl SecretScrubber {
    /// Create a new secret scrubber
    pub fn new() -> Self {
        Self {
            // Match `scheme://user:password@`
            url_userinfo_pattern: Regex::new(
                r"(?P<prefix>[A-Za-z][A-Za-z0-9+.\-]*://[^:/@\s]*:)[^@\s]+@",
            )
            .expect("url userinfo pattern is valid"),
            // Match password fields in key=value and JSON form
            password_pattern: Regex::new(
                r#"(?i)(?P<field>["']?password["']?\s*[:=]\s*)["']?[^"'\s,}&]+["']?"#,
            )
            .expect("password pattern is valid"),
        }
    }

    /// Scrub a message of credentials
    pub fn scrub_message(&self, message: &str) -> String {
        let scrubbed = self
            .url_userinfo_pattern
            .replace_all(message, "${prefix}[REDACTED]@");
        self.password_pattern
            .replace_all(&scrubbed, "${field}[REDACTED]")
            .into_owned()
    }
}

impl Default for SecretScrubber {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SecretScrubber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretScrubber").finish()
    }
}

/// Scrub `message` with a process-wide scrubber.
pub fn scrub_secrets(message: &str) -> String {
    static SCRUBBER: OnceLock<SecretScrubber> = OnceLock::new();
    SCRUBBER.get_or_init(SecretScrubber::new).scrub_message(message)
}
