//! Round bookkeeping: who draws, what the word is, and how long is left.

use crate::ScoreLedger;
use rand::seq::IndexedRandom;
use std::collections::HashSet;
use std::fmt::Display;

/// Length of a round, in ticks.
pub const ROUND_SECS: u32 = 60;
/// Points for guessing the word.
pub const GUESS_POINTS: u32 = 10;
/// Players needed before the host may start a round.
pub const MIN_PLAYERS: usize = 2;
/// Declared round limit. Nothing compares the round number against it.
pub const MAX_ROUNDS: u32 = 3;

pub const WORD_BANK: [&str; 20] = [
    "casa",
    "perro",
    "árbol",
    "carro",
    "sol",
    "luna",
    "estrella",
    "computadora",
    "teléfono",
    "libro",
    "lápiz",
    "montaña",
    "río",
    "avión",
    "barco",
    "pizza",
    "helado",
    "guitarra",
    "piano",
    "reloj",
];

/// What a player is shown of the secret word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordDisplay {
    /// The drawer sees the word.
    Draw(String),
    /// Everyone else sees one underscore per letter.
    Guess(String),
}

impl WordDisplay {
    pub fn for_player(word: &str, is_drawer: bool) -> Self {
        if is_drawer {
            WordDisplay::Draw(word.to_string())
        } else {
            WordDisplay::Guess("_".repeat(word.chars().count()))
        }
    }
}

impl Display for WordDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WordDisplay::Draw(word) => write!(f, "Draw: {word}"),
            WordDisplay::Guess(hint) => write!(f, "Guess: {hint}"),
        }
    }
}

/// Result of advancing the countdown by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// No round is running.
    Idle,
    Running { remaining: u32 },
    /// The countdown just hit zero and the round is now over.
    Expired,
}

/// How a guess typed by the local player was judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guess {
    /// Not a guess at all: no round, the player is drawing, or the text is wrong.
    Miss,
    Correct,
    /// Right word, but this player has already scored this round.
    Repeat,
}

/// The host's choice for a new round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundStart {
    pub round: u32,
    pub drawer: String,
    pub word: String,
}

/// Round state as seen by one player.
///
/// The word is kept in full by every player, drawer or not, so a guess can be
/// checked without asking the host. A curious guesser can read it out of
/// memory; only the display hides it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundState {
    pub round: u32,
    pub drawer: Option<String>,
    pub word: String,
    pub remaining: u32,
    pub active: bool,
    guessed: HashSet<String>,
}

impl RoundState {
    /// Host side: pick the next drawer and word.
    pub fn next(&self, players: &ScoreLedger) -> Option<RoundStart> {
        let names = players.names();
        let mut rng = rand::rng();
        let drawer = names.choose(&mut rng)?.clone();
        let word = WORD_BANK.choose(&mut rng)?.to_string();
        Some(RoundStart {
            round: self.round + 1,
            drawer,
            word,
        })
    }

    /// Apply a `start_game`, replacing whatever round was running.
    pub fn begin(&mut self, round: u32, drawer: &str, word: &str, duration: u32) {
        self.round = round;
        self.drawer = Some(drawer.to_string());
        self.word = word.to_string();
        self.remaining = duration;
        self.active = true;
        self.guessed.clear();
    }

    /// Stop the round. The word stays around so it can be revealed.
    pub fn end(&mut self) {
        self.active = false;
    }

    pub fn tick(&mut self) -> Tick {
        if !self.active || self.remaining == 0 {
            return Tick::Idle;
        }
        self.remaining -= 1;
        if self.remaining == 0 {
            self.active = false;
            Tick::Expired
        } else {
            Tick::Running {
                remaining: self.remaining,
            }
        }
    }

    pub fn is_drawer(&self, name: &str) -> bool {
        self.drawer.as_deref() == Some(name)
    }

    pub fn display_for(&self, name: &str) -> WordDisplay {
        WordDisplay::for_player(&self.word, self.is_drawer(name))
    }

    /// Judge a line typed by `name`.
    pub fn check_guess(&self, name: &str, text: &str) -> Guess {
        if !self.active || self.is_drawer(name) || self.word.is_empty() {
            return Guess::Miss;
        }
        if text.trim().to_lowercase() != self.word.to_lowercase() {
            return Guess::Miss;
        }
        if self.guessed.contains(name) {
            Guess::Repeat
        } else {
            Guess::Correct
        }
    }

    /// Remember that `name` scored this round. Returns false if they already had.
    pub fn record_guess(&mut self, name: &str) -> bool {
        self.guessed.insert(name.to_string())
    }

    pub fn has_guessed(&self, name: &str) -> bool {
        self.guessed.contains(name)
    }
}
