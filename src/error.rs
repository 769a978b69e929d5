use std::io;
use thiserror::Error;

/// Failures surfaced to the local player.
///
/// Transport and decode failures never show up here: a broken connection is
/// dropped from the session and a malformed frame is discarded.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("a player name is required")]
    EmptyName,
    #[error("a round must last at least one tick")]
    ZeroRoundLength,
    #[error("only the host can do that")]
    NotHost,
    #[error("at least 2 players are needed to start a round, found {found}")]
    NotEnoughPlayers { found: usize },
    #[error("only the current drawer can draw")]
    NotDrawer,
    #[error("no round is in progress")]
    RoundInactive,
    #[error("could not open the room on port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: io::Error,
    },
    #[error("could not connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("the session has been shut down")]
    Closed,
}
