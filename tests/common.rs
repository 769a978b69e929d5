#![allow(dead_code)]

use anyhow::anyhow;
use p2p_sketch_game::*;
use std::time::Duration;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines},
    net::{
        TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    sync::mpsc,
};

/// A tick short enough for a whole round to run inside a test.
pub const FAST_TICK: Duration = Duration::from_millis(10);

pub async fn await_event(events: &mut mpsc::Receiver<GameEvent>) -> anyhow::Result<GameEvent> {
    let duration = Duration::from_secs(2);
    tokio::time::timeout(duration, events.recv())
        .await?
        .ok_or_else(|| anyhow!("Event channel closed"))
}

/// Skip events until `pick` accepts one.
pub async fn await_matching<T>(
    events: &mut mpsc::Receiver<GameEvent>,
    mut pick: impl FnMut(&GameEvent) -> Option<T>,
) -> anyhow::Result<T> {
    loop {
        let event = await_event(events).await?;
        if let Some(found) = pick(&event) {
            return Ok(found);
        }
    }
}

/// Wait for a ledger update listing exactly `count` players.
pub async fn await_players(
    events: &mut mpsc::Receiver<GameEvent>,
    count: usize,
) -> anyhow::Result<ScoreLedger> {
    await_matching(events, |event| match event {
        GameEvent::PlayersUpdated(players) if players.len() == count => Some(players.clone()),
        _ => None,
    })
    .await
}

pub async fn await_notice(events: &mut mpsc::Receiver<GameEvent>, text: &str) -> anyhow::Result<()> {
    await_matching(events, |event| match event {
        GameEvent::Notice(notice) if notice == text => Some(()),
        _ => None,
    })
    .await
}

pub fn ledger(entries: &[(&str, u32)]) -> ScoreLedger {
    entries.iter().map(|(name, score)| (*name, *score)).collect()
}

pub fn segment() -> Segment {
    Segment {
        x1: 10.0,
        y1: 10.0,
        x2: 42.0,
        y2: 17.0,
        color: "#3498db".to_string(),
        width: 4,
    }
}

pub async fn setup_host(
    config: SessionConfig,
) -> anyhow::Result<(Session, u16, mpsc::Receiver<GameEvent>)> {
    println!("Setting up Host {}", config.name);
    let (host, mut events) = Session::host(config).await?;
    let port = host.local_addr().port();

    let players = await_players(&mut events, 1).await?;
    assert!(players.contains_key(host.name()));
    Ok((host, port, events))
}

pub async fn join_host(
    name: &str,
    port: u16,
) -> anyhow::Result<(Session, mpsc::Receiver<GameEvent>)> {
    println!("Joining as {name}");
    Session::join(SessionConfig::peer(name, "127.0.0.1", port)).await
}

/// A bare socket speaking the wire format, standing in for a peer.
pub struct RawPeer {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl RawPeer {
    pub async fn connect(port: u16) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(("127.0.0.1", port)).await?;
        let (reader, writer) = stream.into_split();
        Ok(Self {
            lines: BufReader::new(reader).lines(),
            writer,
        })
    }

    pub async fn send_raw(&mut self, bytes: &[u8]) -> anyhow::Result<()> {
        self.writer.write_all(bytes).await?;
        self.writer.flush().await?;
        Ok(())
    }

    pub async fn send(&mut self, message: &Message) -> anyhow::Result<()> {
        self.send_raw(&codec::encode(message)?).await
    }

    pub async fn next_message_within(&mut self, duration: Duration) -> anyhow::Result<Message> {
        let line = tokio::time::timeout(duration, self.lines.next_line())
            .await??
            .ok_or_else(|| anyhow!("Connection closed"))?;
        Ok(serde_json::from_str(&line)?)
    }

    pub async fn next_message(&mut self) -> anyhow::Result<Message> {
        self.next_message_within(Duration::from_secs(2)).await
    }

    /// Skip messages until `pick` accepts one.
    pub async fn await_message<T>(
        &mut self,
        mut pick: impl FnMut(&Message) -> Option<T>,
    ) -> anyhow::Result<T> {
        loop {
            let message = self.next_message().await?;
            if let Some(found) = pick(&message) {
                return Ok(found);
            }
        }
    }
}
