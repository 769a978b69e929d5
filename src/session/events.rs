use super::{
    Command, ConnId, Input, Role,
    connection::PeerHandle,
    fanout::Fanout,
    router::{Effects, Origin, Outbound, Router, TimerChange},
    timer::RoundTimer,
};
use crate::{ChatLine, ScoreLedger, Segment, SessionConfig, SessionError, WordDisplay};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Events for the local display.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// The ledger changed. Carries the whole thing.
    PlayersUpdated(ScoreLedger),
    RoundStarted {
        round: u32,
        drawer: String,
        display: WordDisplay,
    },
    /// A stroke drawn by someone else.
    Stroke(Segment),
    CanvasCleared,
    Chat(ChatLine),
    /// A system line for the chat display.
    Notice(String),
    /// Seconds left in the round.
    Tick { remaining: u32 },
    /// The round is over and the word can be shown to everyone.
    RoundEnded { word: String },
    /// Peer only: the host went away. Nothing more will arrive.
    HostDisconnected,
}

/// Sole owner of the ledger, the round and the connection set.
///
/// Receive loops, the acceptor, the round timer and the `Session` handle all
/// reach it through one inbox, so every change is applied in arrival order.
pub(crate) struct Actor {
    role: Role,
    router: Router,
    links: Fanout,
    upstream: Option<ConnId>,
    timer: RoundTimer,
    inbox: mpsc::Sender<Input>,
    events: mpsc::Sender<GameEvent>,
    cancel: CancellationToken,
}

impl Actor {
    pub fn new(
        role: Role,
        config: &SessionConfig,
        inbox: mpsc::Sender<Input>,
        events: mpsc::Sender<GameEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            role,
            router: Router::new(role, &config.name, config.round_secs),
            links: Fanout::default(),
            upstream: None,
            timer: RoundTimer::new(config.tick),
            inbox,
            events,
            cancel,
        }
    }

    pub async fn run(mut self, mut inbox: mpsc::Receiver<Input>) {
        if self.role == Role::Host {
            self.emit(GameEvent::PlayersUpdated(self.router.ledger.clone()));
        }
        loop {
            let input = tokio::select! {
                _ = self.cancel.cancelled() => break,
                input = inbox.recv() => match input {
                    Some(input) => input,
                    None => break,
                },
            };
            self.handle(input);
        }
        self.timer.stop();
        self.links.close_all();
        debug!("session stopped");
    }

    fn handle(&mut self, input: Input) {
        let fx = match input {
            Input::Command(command) => return self.command(command),
            Input::Connected(handle) => self.connected(handle),
            Input::Received { from, message } => {
                // Frames still in flight from a connection that was already dropped.
                if !self.links.contains(from) {
                    return;
                }
                self.router.route(Origin::Remote(from), message)
            }
            Input::Disconnected(id) => self.drop_link(id),
            Input::Tick { generation } => {
                if !self.timer.is_current(generation) {
                    return;
                }
                self.router.tick()
            }
        };
        self.apply(fx);
    }

    fn command(&mut self, command: Command) {
        match command {
            Command::StartRound(reply) => match self.router.start_round() {
                Ok((start, fx)) => {
                    self.apply(fx);
                    let _ = reply.send(Ok(start));
                }
                Err(e) => {
                    let _ = reply.send(Err(e));
                }
            },
            Command::EndRound(reply) => {
                let result = self.router.end_round();
                let _ = reply.send(self.settle(result));
            }
            Command::Chat(text, reply) => {
                let (outcome, fx) = self.router.chat(&text);
                self.apply(fx);
                let _ = reply.send(outcome);
            }
            Command::Draw(segment, reply) => {
                let result = self.router.draw(segment);
                let _ = reply.send(self.settle(result));
            }
            Command::Clear(reply) => {
                let result = self.router.clear();
                let _ = reply.send(self.settle(result));
            }
            Command::Scores(reply) => {
                let _ = reply.send(self.router.ledger.clone());
            }
            Command::Round(reply) => {
                let _ = reply.send(self.router.round.clone());
            }
            Command::PeerCount(reply) => {
                let _ = reply.send(self.links.len());
            }
        }
    }

    fn settle(&mut self, result: Result<Effects, SessionError>) -> Result<(), SessionError> {
        self.apply(result?);
        Ok(())
    }

    fn connected(&mut self, handle: PeerHandle) -> Effects {
        let mut fx = Effects::default();
        match self.role {
            Role::Host => {
                info!(conn = %handle.id, addr = %handle.addr, "peer connected");
                fx.events
                    .push(GameEvent::Notice(format!("New connection from {}", handle.addr)));
            }
            Role::Peer => {
                info!(addr = %handle.addr, "connected to host");
                fx.events
                    .push(GameEvent::Notice(format!("Connected to the host at {}", handle.addr)));
                self.upstream = Some(handle.id);
            }
        }
        self.links.insert(handle);
        fx
    }

    /// Forget a connection. Only the first report for a given id has any effect.
    fn drop_link(&mut self, id: ConnId) -> Effects {
        if self.links.remove(id).is_none() {
            return Effects::default();
        }
        if self.upstream == Some(id) {
            self.upstream = None;
        }
        self.router.disconnected(id)
    }

    fn apply(&mut self, mut fx: Effects) {
        match fx.timer {
            Some(TimerChange::Start) => self.timer.restart(self.inbox.clone(), &self.cancel),
            Some(TimerChange::Stop) => self.timer.stop(),
            None => {}
        }

        let mut dropped = Vec::new();
        for outbound in fx.outbound.drain(..) {
            match outbound {
                Outbound::Broadcast { message, except } => {
                    dropped.extend(self.links.broadcast(&message, except));
                }
                Outbound::Reply { to, message } => {
                    dropped.extend(self.links.send_to(to, &message));
                }
                Outbound::Upstream(message) => match self.upstream {
                    Some(host) => dropped.extend(self.links.send_to(host, &message)),
                    None => debug!(kind = message.kind(), "no host to send to"),
                },
            }
        }
        for id in dropped {
            if self.upstream == Some(id) {
                self.upstream = None;
            }
            fx.merge(self.router.disconnected(id));
        }

        for event in fx.events {
            self.emit(event);
        }
    }

    /// Hand an event to the display without ever waiting on it.
    ///
    /// A display that falls behind loses events rather than stalling every peer.
    fn emit(&self, event: GameEvent) {
        match self.events.try_send(event) {
            Ok(()) | Err(TrySendError::Closed(_)) => {}
            Err(TrySendError::Full(event)) => {
                warn!(?event, "display is not keeping up, dropping event");
            }
        }
    }
}
