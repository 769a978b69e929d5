//! Every message, local or remote, is applied here.
//!
//! The router mutates the ledger and the round and says what should happen
//! next: which events the display gets and which frames go out. It never
//! touches a socket. Whether an outgoing frame is broadcast or sent upstream
//! depends only on the role of this process.

use super::{ConnId, GameEvent, Role};
use crate::{
    ChatLine, Message, RoundStart, RoundState, ScoreLedger, Segment, SessionError,
    round::{GUESS_POINTS, Guess, MIN_PLAYERS, Tick},
};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Where a message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Origin {
    /// Built by this process.
    Local,
    /// Read off the given connection.
    Remote(ConnId),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Outbound {
    /// To every peer except `except`.
    Broadcast {
        message: Message,
        except: Option<ConnId>,
    },
    /// To a single peer.
    Reply { to: ConnId, message: Message },
    /// To the host.
    Upstream(Message),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimerChange {
    Start,
    Stop,
}

/// What applying a message asks of the session.
#[derive(Debug, Default)]
pub(crate) struct Effects {
    pub events: Vec<GameEvent>,
    pub outbound: Vec<Outbound>,
    pub timer: Option<TimerChange>,
}

impl Effects {
    fn event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    fn notice(&mut self, text: impl Into<String>) {
        self.events.push(GameEvent::Notice(text.into()));
    }

    fn send(&mut self, outbound: Option<Outbound>) {
        self.outbound.extend(outbound);
    }

    pub fn merge(&mut self, other: Effects) {
        self.events.extend(other.events);
        self.outbound.extend(other.outbound);
        if other.timer.is_some() {
            self.timer = other.timer;
        }
    }
}

/// What became of a line typed into the chat box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatOutcome {
    /// Sent as an ordinary chat line.
    Sent,
    /// It was the word. Points were credited and the guess announced.
    CorrectGuess,
    /// It was the word, but this player already scored this round.
    AlreadyGuessed,
    /// Nothing but whitespace.
    Ignored,
}

pub(crate) struct Router {
    role: Role,
    me: String,
    round_secs: u32,
    pub ledger: ScoreLedger,
    pub round: RoundState,
    /// Host only: the name each connection joined with.
    names: HashMap<ConnId, String>,
}

impl Router {
    pub fn new(role: Role, me: &str, round_secs: u32) -> Self {
        let mut ledger = ScoreLedger::default();
        if role == Role::Host {
            ledger.register(me);
        }
        Self {
            role,
            me: me.to_string(),
            round_secs,
            ledger,
            round: RoundState::default(),
            names: HashMap::new(),
        }
    }

    /// Apply one message and work out what it triggers.
    pub fn route(&mut self, origin: Origin, message: Message) -> Effects {
        let mut fx = Effects::default();
        if self.role == Role::Host && origin != Origin::Local && host_authored(&message) {
            warn!(?origin, kind = message.kind(), "dropping host-only message from a peer");
            return fx;
        }
        if message.kind() != "draw" {
            debug!(?origin, kind = message.kind(), "routing");
        }

        match message {
            Message::Join { name } => {
                self.ledger.register(&name);
                fx.notice(format!("{name} joined the game"));
                fx.event(GameEvent::PlayersUpdated(self.ledger.clone()));
                if let (Role::Host, Origin::Remote(conn)) = (self.role, origin) {
                    info!(%conn, %name, "player joined");
                    self.names.insert(conn, name);
                    let players = self.player_list();
                    fx.send(Some(Outbound::Reply {
                        to: conn,
                        message: players.clone(),
                    }));
                    fx.send(Some(Outbound::Broadcast {
                        message: players,
                        except: Some(conn),
                    }));
                }
            }
            Message::PlayerList { players } => {
                self.ledger.replace(players);
                fx.event(GameEvent::PlayersUpdated(self.ledger.clone()));
            }
            Message::StartGame {
                round,
                drawer,
                word,
            } => {
                self.round.begin(round, &drawer, &word, self.round_secs);
                info!(round, %drawer, "round started");
                fx.event(GameEvent::CanvasCleared);
                fx.event(GameEvent::RoundStarted {
                    round,
                    drawer: drawer.clone(),
                    display: self.round.display_for(&self.me),
                });
                fx.event(GameEvent::Tick {
                    remaining: self.round.remaining,
                });
                fx.notice(format!("Round {round}: {drawer} is drawing"));
                fx.timer = Some(TimerChange::Start);
                fx.send(self.authored(
                    origin,
                    Message::StartGame {
                        round,
                        drawer,
                        word,
                    },
                ));
            }
            Message::Draw(segment) => {
                if !self.round.is_drawer(&self.me) {
                    fx.event(GameEvent::Stroke(segment.clone()));
                }
                fx.send(self.relay(origin, Message::Draw(segment)));
            }
            Message::Clear => {
                if !self.round.is_drawer(&self.me) {
                    fx.event(GameEvent::CanvasCleared);
                }
                fx.send(self.relay(origin, Message::Clear));
            }
            Message::Chat { name, text } => {
                fx.event(GameEvent::Chat(ChatLine::new(&name, &text)));
                fx.send(self.relay(origin, Message::Chat { name, text }));
            }
            Message::CorrectGuess { name, scores } => {
                self.settle_guess(&name, scores);
                fx.event(GameEvent::PlayersUpdated(self.ledger.clone()));
                match (self.role, origin) {
                    (_, Origin::Local) => {
                        fx.notice("You guessed the word!");
                        fx.send(self.relay(
                            origin,
                            Message::CorrectGuess {
                                name,
                                scores: Some(self.ledger.clone()),
                            },
                        ));
                    }
                    (Role::Host, Origin::Remote(_)) => {
                        info!(%name, "correct guess");
                        fx.notice(format!("{name} guessed the word!"));
                        fx.send(Some(Outbound::Broadcast {
                            message: Message::CorrectGuess {
                                name,
                                scores: Some(self.ledger.clone()),
                            },
                            except: None,
                        }));
                    }
                    (Role::Peer, Origin::Remote(_)) => {
                        if name != self.me {
                            fx.notice(format!("{name} guessed the word!"));
                        }
                    }
                }
            }
            Message::EndRound { word } => {
                self.round.end();
                info!(round = self.round.round, %word, "round over");
                fx.event(GameEvent::RoundEnded { word: word.clone() });
                fx.notice(format!("Round over. The word was: {word}"));
                fx.timer = Some(TimerChange::Stop);
                fx.send(self.authored(origin, Message::EndRound { word }));
            }
        }
        fx
    }

    /// Host: choose a drawer and a word and start the round everywhere.
    pub fn start_round(&mut self) -> Result<(RoundStart, Effects), SessionError> {
        if self.role != Role::Host {
            return Err(SessionError::NotHost);
        }
        if self.ledger.len() < MIN_PLAYERS {
            return Err(SessionError::NotEnoughPlayers {
                found: self.ledger.len(),
            });
        }
        let start = self
            .round
            .next(&self.ledger)
            .ok_or(SessionError::NotEnoughPlayers { found: 0 })?;
        let fx = self.route(
            Origin::Local,
            Message::StartGame {
                round: start.round,
                drawer: start.drawer.clone(),
                word: start.word.clone(),
            },
        );
        Ok((start, fx))
    }

    /// Host: stop the running round and reveal the word.
    pub fn end_round(&mut self) -> Result<Effects, SessionError> {
        if self.role != Role::Host {
            return Err(SessionError::NotHost);
        }
        if !self.round.active {
            return Err(SessionError::RoundInactive);
        }
        let word = self.round.word.clone();
        Ok(self.route(Origin::Local, Message::EndRound { word }))
    }

    /// A line typed by the local player: a guess if it matches the word, chat otherwise.
    pub fn chat(&mut self, text: &str) -> (ChatOutcome, Effects) {
        let text = text.trim();
        if text.is_empty() {
            return (ChatOutcome::Ignored, Effects::default());
        }
        match self.round.check_guess(&self.me, text) {
            Guess::Correct => {
                self.round.record_guess(&self.me);
                self.ledger.credit(&self.me, GUESS_POINTS);
                let guess = Message::CorrectGuess {
                    name: self.me.clone(),
                    scores: Some(self.ledger.clone()),
                };
                (ChatOutcome::CorrectGuess, self.route(Origin::Local, guess))
            }
            Guess::Repeat => {
                let mut fx = Effects::default();
                fx.notice("You already guessed this round's word");
                (ChatOutcome::AlreadyGuessed, fx)
            }
            Guess::Miss => {
                let line = Message::Chat {
                    name: self.me.clone(),
                    text: text.to_string(),
                };
                (ChatOutcome::Sent, self.route(Origin::Local, line))
            }
        }
    }

    /// A stroke from the local drawer, already rendered on this screen.
    pub fn draw(&mut self, segment: Segment) -> Result<Effects, SessionError> {
        self.ensure_drawing()?;
        Ok(self.route(Origin::Local, Message::Draw(segment)))
    }

    pub fn clear(&mut self) -> Result<Effects, SessionError> {
        self.ensure_drawing()?;
        Ok(self.route(Origin::Local, Message::Clear))
    }

    /// One tick of the round countdown.
    pub fn tick(&mut self) -> Effects {
        let mut fx = Effects::default();
        match self.round.tick() {
            Tick::Idle => fx.timer = Some(TimerChange::Stop),
            Tick::Running { remaining } => fx.event(GameEvent::Tick { remaining }),
            Tick::Expired => {
                fx.event(GameEvent::Tick { remaining: 0 });
                fx.timer = Some(TimerChange::Stop);
                if self.role == Role::Host {
                    let word = self.round.word.clone();
                    fx.notice("Time is up!");
                    fx.merge(self.route(Origin::Local, Message::EndRound { word }));
                }
            }
        }
        fx
    }

    /// A connection went away, cleanly or not.
    pub fn disconnected(&mut self, conn: ConnId) -> Effects {
        let mut fx = Effects::default();
        match self.role {
            Role::Host => {
                if let Some(name) = self.names.remove(&conn) {
                    info!(%conn, %name, "player left");
                    fx.notice(format!("{name} left the game"));
                }
            }
            Role::Peer => {
                warn!(%conn, "lost the connection to the host");
                fx.notice("Disconnected from the host");
                fx.event(GameEvent::HostDisconnected);
            }
        }
        fx
    }

    fn ensure_drawing(&self) -> Result<(), SessionError> {
        if !self.round.active {
            return Err(SessionError::RoundInactive);
        }
        if !self.round.is_drawer(&self.me) {
            return Err(SessionError::NotDrawer);
        }
        Ok(())
    }

    /// Adopt a guesser's snapshot, or credit them once if there is none.
    fn settle_guess(&mut self, name: &str, scores: Option<ScoreLedger>) {
        let first = self.round.record_guess(name);
        match scores {
            Some(scores) if !scores.is_empty() => self.ledger.replace(scores),
            _ if first => {
                self.ledger.credit(name, GUESS_POINTS);
            }
            _ => debug!(%name, "ignoring repeat guess"),
        }
    }

    fn player_list(&self) -> Message {
        Message::PlayerList {
            players: self.ledger.clone(),
        }
    }

    /// Host-authored messages only go out when this host wrote them.
    fn authored(&self, origin: Origin, message: Message) -> Option<Outbound> {
        match (self.role, origin) {
            (Role::Host, Origin::Local) => Some(Outbound::Broadcast {
                message,
                except: None,
            }),
            _ => None,
        }
    }

    /// Player-authored messages: sent on when local, passed along by the host when remote.
    fn relay(&self, origin: Origin, message: Message) -> Option<Outbound> {
        match (self.role, origin) {
            (Role::Host, Origin::Local) => Some(Outbound::Broadcast {
                message,
                except: None,
            }),
            (Role::Host, Origin::Remote(conn)) => Some(Outbound::Broadcast {
                message,
                except: Some(conn),
            }),
            (Role::Peer, Origin::Local) => Some(Outbound::Upstream(message)),
            (Role::Peer, Origin::Remote(_)) => None,
        }
    }
}

fn host_authored(message: &Message) -> bool {
    matches!(
        message,
        Message::PlayerList { .. } | Message::StartGame { .. } | Message::EndRound { .. }
    )
}
