mod common;
use common::*;

use p2p_sketch_game::*;
use std::time::Duration;

fn fast_host(round_secs: u32) -> SessionConfig {
    SessionConfig::host("Host", 0)
        .with_round_secs(round_secs)
        .with_tick(FAST_TICK)
}

fn is_end_round(message: &Message) -> bool {
    matches!(message, Message::EndRound { .. })
}

#[tokio::test]
async fn test_round_expires() -> anyhow::Result<()> {
    let (host, port, mut host_events) = setup_host(fast_host(5)).await?;
    let (_peer, mut peer_events) = join_host("Alice", port).await?;
    let mut raw = RawPeer::connect(port).await?;
    raw.send(&Message::Join { name: "Rae".into() }).await?;
    await_players(&mut host_events, 3).await?;

    let start = host.start_round().await?;

    let mut remaining = Vec::new();
    let word = loop {
        match await_event(&mut host_events).await? {
            GameEvent::Tick { remaining: left } => remaining.push(left),
            GameEvent::RoundEnded { word } => break word,
            _ => {}
        }
    };
    assert_eq!(word, start.word);
    assert_eq!(remaining, vec![5, 4, 3, 2, 1, 0]);
    assert!(!host.round().await?.active);

    let word = await_matching(&mut peer_events, |event| match event {
        GameEvent::RoundEnded { word } => Some(word.clone()),
        _ => None,
    })
    .await?;
    assert_eq!(word, start.word);

    let ended = raw
        .await_message(|message| match message {
            Message::EndRound { word } => Some(word.clone()),
            _ => None,
        })
        .await?;
    assert_eq!(ended, start.word);

    // Exactly one end_round goes out per expiry.
    let quiet = raw.next_message_within(Duration::from_millis(200)).await;
    assert!(quiet.map(|message| !is_end_round(&message)).unwrap_or(true));
    Ok(())
}

#[tokio::test]
async fn test_new_round_restarts_timer() -> anyhow::Result<()> {
    let (host, port, mut host_events) = setup_host(fast_host(10)).await?;
    let mut raw = RawPeer::connect(port).await?;
    raw.send(&Message::Join { name: "Rae".into() }).await?;
    await_players(&mut host_events, 2).await?;

    host.start_round().await?;
    await_matching(&mut host_events, |event| match event {
        GameEvent::Tick { remaining: 7 } => Some(()),
        _ => None,
    })
    .await?;

    let second = host.start_round().await?;
    assert_eq!(second.round, 2);
    let round = host.round().await?;
    assert_eq!(round.round, 2);
    assert!(round.remaining > 7);

    let ended = raw
        .await_message(|message| match message {
            Message::EndRound { word } => Some(word.clone()),
            _ => None,
        })
        .await?;
    assert_eq!(ended, second.word);

    let quiet = raw.next_message_within(Duration::from_millis(200)).await;
    assert!(quiet.map(|message| !is_end_round(&message)).unwrap_or(true));
    Ok(())
}

#[tokio::test]
async fn test_correct_guess_reaches_raw_peer_with_scores() -> anyhow::Result<()> {
    let (host, port, mut host_events) = setup_host(fast_host(60)).await?;
    let mut raw = RawPeer::connect(port).await?;
    raw.send(&Message::Join { name: "Rae".into() }).await?;
    await_players(&mut host_events, 2).await?;

    let start = host.start_round().await?;
    let guesser = if start.drawer == "Host" { "Rae" } else { "Host" };
    if guesser == "Rae" {
        raw.send(&Message::CorrectGuess {
            name: "Rae".into(),
            scores: None,
        })
        .await?;
    } else {
        host.send_chat(&start.word).await?;
    }

    let (name, scores) = raw
        .await_message(|message| match message {
            Message::CorrectGuess { name, scores } => Some((name.clone(), scores.clone())),
            _ => None,
        })
        .await?;
    assert_eq!(name, guesser);
    let scores = scores.ok_or_else(|| anyhow::anyhow!("the host always sends its ledger"))?;
    assert_eq!(scores.score(guesser), Some(10));
    assert_eq!(scores, host.scores().await?);
    Ok(())
}
