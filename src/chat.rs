use std::time::{SystemTime, UNIX_EPOCH};

/// A line for the chat display, stamped when it reached this player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    pub name: String,
    pub text: String,
    /// Milliseconds since the epoch.
    pub timestamp: u64,
}

impl ChatLine {
    pub fn new(name: &str, text: &str) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or_default();
        Self {
            name: name.to_string(),
            text: text.to_string(),
            timestamp,
        }
    }
}
