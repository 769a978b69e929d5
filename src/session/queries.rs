use super::{Command, Role, Session};
use crate::{RoundState, ScoreLedger};
use anyhow::Result;
use std::net::SocketAddr;

impl Session {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_host(&self) -> bool {
        self.role == Role::Host
    }

    /// Host: the address peers connect to. Peer: our end of the link to the host.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Current scores as this player sees them.
    pub async fn scores(&self) -> Result<ScoreLedger> {
        self.request(Command::Scores).await
    }

    /// Current round as this player sees it.
    pub async fn round(&self) -> Result<RoundState> {
        self.request(Command::Round).await
    }

    /// Open connections: one per peer on the host, the upstream link on a peer.
    pub async fn peer_count(&self) -> Result<usize> {
        self.request(Command::PeerCount).await
    }
}
