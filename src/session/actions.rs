use super::{ChatOutcome, Command, Session};
use crate::{RoundStart, Segment};
use anyhow::Result;

impl Session {
    /// (HOST-ONLY) Pick a drawer and a word and start a round for everyone.
    ///
    /// Needs at least two known players. Any round already running is replaced.
    pub async fn start_round(&self) -> Result<RoundStart> {
        Ok(self.request(Command::StartRound).await??)
    }

    /// (HOST-ONLY) End the running round now and reveal the word.
    pub async fn end_round(&self) -> Result<()> {
        Ok(self.request(Command::EndRound).await??)
    }

    /// Send a line typed into the chat box.
    ///
    /// While a round runs, a guesser typing the word scores instead, and the
    /// line never goes out as chat.
    pub async fn send_chat(&self, text: &str) -> Result<ChatOutcome> {
        let text = text.to_string();
        self.request(|reply| Command::Chat(text, reply)).await
    }

    /// Share a stroke the local drawer has already put on screen.
    pub async fn draw(&self, segment: Segment) -> Result<()> {
        Ok(self.request(|reply| Command::Draw(segment, reply)).await??)
    }

    /// Wipe everyone else's canvas.
    pub async fn clear(&self) -> Result<()> {
        Ok(self.request(Command::Clear).await??)
    }
}
