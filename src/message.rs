//! Messages exchanged between the host and its peers.

use crate::ScoreLedger;
use serde::{Deserialize, Serialize};

/// One stroke of the drawer's brush, from one pointer position to the next.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Segment {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub color: String,
    #[serde(alias = "size")]
    pub width: u32,
}

/// The tagged union carried on the wire, one per line.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    Join {
        name: String,
    },
    PlayerList {
        players: ScoreLedger,
    },
    StartGame {
        round: u32,
        drawer: String,
        word: String,
    },
    Draw(Segment),
    Clear,
    Chat {
        name: String,
        text: String,
    },
    CorrectGuess {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scores: Option<ScoreLedger>,
    },
    EndRound {
        word: String,
    },
}

impl Message {
    /// Tag used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Join { .. } => "join",
            Message::PlayerList { .. } => "player_list",
            Message::StartGame { .. } => "start_game",
            Message::Draw(_) => "draw",
            Message::Clear => "clear",
            Message::Chat { .. } => "chat",
            Message::CorrectGuess { .. } => "correct_guess",
            Message::EndRound { .. } => "end_round",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_is_flattened_under_its_tag() {
        let msg = Message::Draw(Segment {
            x1: 1.0,
            y1: 2.0,
            x2: 3.0,
            y2: 4.0,
            color: "#ff0000".into(),
            width: 5,
        });
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "draw");
        assert_eq!(json["x2"], 3.0);
        assert_eq!(json["width"], 5);
    }

    #[test]
    fn draw_accepts_size_for_width() {
        let line = r##"{"type":"draw","x1":0,"y1":0,"x2":10,"y2":10,"color":"#000000","size":3}"##;
        let Message::Draw(seg) = serde_json::from_str(line).unwrap() else {
            panic!("expected a draw message");
        };
        assert_eq!(seg.width, 3);
        assert_eq!(seg.x2, 10.0);
    }

    #[test]
    fn correct_guess_without_scores() {
        let msg: Message = serde_json::from_str(r#"{"type":"correct_guess","name":"A"}"#).unwrap();
        assert_eq!(
            msg,
            Message::CorrectGuess {
                name: "A".into(),
                scores: None
            }
        );
    }

    #[test]
    fn clear_is_a_bare_tag() {
        assert_eq!(serde_json::to_string(&Message::Clear).unwrap(), r#"{"type":"clear"}"#);
    }
}
