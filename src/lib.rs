mod brush;
mod chat;
pub mod codec;
mod config;
mod error;
mod ledger;
mod message;
pub mod round;
mod session;

pub use brush::Brush;
pub use chat::ChatLine;
pub use config::SessionConfig;
pub use error::SessionError;
pub use ledger::ScoreLedger;
pub use message::{Message, Segment};
pub use round::{RoundStart, RoundState, WordDisplay};
pub use session::{ChatOutcome, GameEvent, Role, Session};
