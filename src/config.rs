use crate::{SessionError, round::ROUND_SECS};
use std::time::Duration;

/// Everything needed to open or join a room.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Display name, which is also the player's identity.
    pub name: String,
    /// Port the host listens on, or the host's port when joining. 0 picks any free port.
    pub port: u16,
    /// Address of the host. `None` when this process is the host.
    pub host_addr: Option<String>,
    /// Ticks per round.
    pub round_secs: u32,
    /// Length of one countdown tick.
    pub tick: Duration,
    /// Longest a single write to a peer may take before the peer is dropped.
    pub write_timeout: Duration,
    /// Frames queued per connection before the peer counts as stalled.
    pub outbox_capacity: usize,
}

impl SessionConfig {
    pub fn host(name: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            port,
            host_addr: None,
            round_secs: ROUND_SECS,
            tick: Duration::from_secs(1),
            write_timeout: Duration::from_secs(5),
            outbox_capacity: 256,
        }
    }

    pub fn peer(name: impl Into<String>, host_addr: impl Into<String>, port: u16) -> Self {
        Self {
            host_addr: Some(host_addr.into()),
            ..Self::host(name, port)
        }
    }

    pub fn with_round_secs(mut self, round_secs: u32) -> Self {
        self.round_secs = round_secs;
        self
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn with_write_timeout(mut self, write_timeout: Duration) -> Self {
        self.write_timeout = write_timeout;
        self
    }

    pub fn with_outbox_capacity(mut self, outbox_capacity: usize) -> Self {
        self.outbox_capacity = outbox_capacity.max(1);
        self
    }

    /// Trim the name and refuse to go on without one, or with a round that could never end.
    pub fn validate(mut self) -> Result<Self, SessionError> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(SessionError::EmptyName);
        }
        if self.round_secs == 0 {
            return Err(SessionError::ZeroRoundLength);
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_name_is_rejected() {
        let err = SessionConfig::host("   ", 0).validate().unwrap_err();
        assert!(matches!(err, SessionError::EmptyName));
    }

    #[test]
    fn name_is_trimmed() {
        let config = SessionConfig::peer(" Ana ", "127.0.0.1", 5000).validate().unwrap();
        assert_eq!(config.name, "Ana");
        assert_eq!(config.round_secs, 60);
        assert_eq!(config.host_addr.as_deref(), Some("127.0.0.1"));
    }

    #[test]
    fn zero_length_round_is_rejected() {
        let err = SessionConfig::host("Ana", 0)
            .with_round_secs(0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, SessionError::ZeroRoundLength));
        assert!(SessionConfig::host("Ana", 0).with_round_secs(1).validate().is_ok());
    }

    #[test]
    fn outbox_holds_at_least_one_frame() {
        let config = SessionConfig::host("Ana", 0).with_outbox_capacity(0);
        assert_eq!(config.outbox_capacity, 1);
    }
}
