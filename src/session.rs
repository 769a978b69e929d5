//! Game Session

mod actions;
mod connection;
mod events;
mod fanout;
mod queries;
mod router;
mod timer;

use crate::{Message, RoundStart, RoundState, ScoreLedger, Segment, SessionConfig, SessionError, codec};
use anyhow::{Result, anyhow};
use std::{fmt::Display, net::SocketAddr};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::info;

pub use events::GameEvent;
pub use router::ChatOutcome;

const INBOX_CAPACITY: usize = 1024;
const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Owns the listening socket and has the final word on rounds and scores.
    Host,
    /// Connected to the host and nobody else.
    Peer,
}

/// Identifies one connection within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ConnId(u64);

impl ConnId {
    /// The peer's only connection, the one to the host.
    pub(crate) const UPSTREAM: ConnId = ConnId(0);
}

impl Display for ConnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything the session actor reacts to.
pub(crate) enum Input {
    Command(Command),
    Connected(connection::PeerHandle),
    Received { from: ConnId, message: Message },
    Disconnected(ConnId),
    Tick { generation: u64 },
}

/// Requests from the `Session` handle.
pub(crate) enum Command {
    StartRound(oneshot::Sender<Result<RoundStart, SessionError>>),
    EndRound(oneshot::Sender<Result<(), SessionError>>),
    Chat(String, oneshot::Sender<ChatOutcome>),
    Draw(Segment, oneshot::Sender<Result<(), SessionError>>),
    Clear(oneshot::Sender<Result<(), SessionError>>),
    Scores(oneshot::Sender<ScoreLedger>),
    Round(oneshot::Sender<RoundState>),
    PeerCount(oneshot::Sender<usize>),
}

/// One player's running game: either the host or a peer connected to it.
///
/// Dropping the session closes every socket and stops every task it started.
pub struct Session {
    name: String,
    role: Role,
    local_addr: SocketAddr,
    inbox: mpsc::Sender<Input>,
    cancel: CancellationToken,
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl Session {
    /// Open a room and wait for peers.
    pub async fn host(config: SessionConfig) -> Result<(Self, mpsc::Receiver<GameEvent>)> {
        let config = config.validate()?;
        let listener = connection::listen(config.port).await?;
        let local_addr = listener.local_addr()?;
        info!(name = %config.name, %local_addr, "room open");

        let (session, events) = Self::start(Role::Host, &config, local_addr);
        tokio::spawn(connection::accept_loop(
            listener,
            session.inbox.clone(),
            session.cancel.clone(),
            config,
        ));
        Ok((session, events))
    }

    /// Connect to a host and announce ourselves.
    pub async fn join(config: SessionConfig) -> Result<(Self, mpsc::Receiver<GameEvent>)> {
        let config = config.validate()?;
        let host = config
            .host_addr
            .clone()
            .ok_or_else(|| anyhow!("a host address is needed to join a room"))?;
        let stream = connection::connect(&host, config.port).await?;
        let local_addr = stream.local_addr()?;
        let host_addr = stream.peer_addr()?;
        info!(name = %config.name, %host_addr, "joining room");

        let (session, events) = Self::start(Role::Peer, &config, local_addr);
        let upstream = connection::attach(
            stream,
            host_addr,
            ConnId::UPSTREAM,
            &session.inbox,
            &session.cancel,
            &config,
        )
        .await?;
        let join = codec::encode(&Message::Join {
            name: config.name.clone(),
        })?;
        if !upstream.send(join) {
            return Err(SessionError::Closed.into());
        }
        Ok((session, events))
    }

    fn start(
        role: Role,
        config: &SessionConfig,
        local_addr: SocketAddr,
    ) -> (Self, mpsc::Receiver<GameEvent>) {
        let cancel = CancellationToken::new();
        let (inbox, inbox_rx) = mpsc::channel(INBOX_CAPACITY);
        let (events_tx, events) = mpsc::channel(EVENT_CAPACITY);
        let actor = events::Actor::new(role, config, inbox.clone(), events_tx, cancel.clone());
        tokio::spawn(actor.run(inbox_rx));
        let session = Self {
            name: config.name.clone(),
            role,
            local_addr,
            inbox,
            cancel,
        };
        (session, events)
    }

    /// Close every connection and stop the session's tasks.
    pub fn shutdown(&self) {
        info!(name = %self.name, "shutting down");
        self.cancel.cancel();
    }

    /// Ask the actor something and wait for the answer.
    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply, answer) = oneshot::channel();
        self.inbox
            .send(Input::Command(make(reply)))
            .await
            .map_err(|_| SessionError::Closed)?;
        Ok(answer.await.map_err(|_| SessionError::Closed)?)
    }
}
