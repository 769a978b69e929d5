//! # Terminal sketch game
//!
//! Host a room or join one from the CLI. The drawing surface is the prompt:
//! pointer drags are typed as coordinates and everything else is chat.
//!
//! ## Host a game
//!
//! ```sh
//! cargo run --example terminal host --name Ana
//! ```
//!
//! ## Join a game
//!
//! ```sh
//! cargo run --example terminal join --name Bo --addr 127.0.0.1
//! ```

use anyhow::Result;
use clap::Parser;
use futures::StreamExt;
use p2p_sketch_game::{Brush, GameEvent, Segment, Session, SessionConfig};
use std::io::{self, Write};
use tokio_util::codec::{FramedRead, LinesCodec};
use tracing_subscriber::EnvFilter;

// --- CLI Setup ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Host a new room
    Host {
        #[arg(long)]
        name: String,
        #[arg(long, default_value_t = 5000)]
        port: u16,
    },
    /// Join an existing room
    Join {
        #[arg(long)]
        name: String,
        #[arg(long)]
        addr: String,
        #[arg(long, default_value_t = 5000)]
        port: u16,
    },
}

const HELP: &str = "\
/start              start a round (host)
/end                end the round early (host)
/drag <x> <y>       move the pen with the button held
/up                 lift the pen
/color <c>          pen color
/width <n>          pen width
/clear              clear the canvas
/scores             show the standings
anything else       chat, or guess the word";

/// The canvas: one line per segment, ours and everyone else's.
fn print_stroke(s: &Segment) {
    println!("[canvas] ({}, {}) -> ({}, {}) {} {}px", s.x1, s.y1, s.x2, s.y2, s.color, s.width);
}

async fn handle_line(session: &Session, brush: &mut Brush, line: &str) -> Result<()> {
    let mut words = line.split_whitespace();
    match words.next() {
        Some("/help") => println!("{HELP}"),
        Some("/start") => {
            let start = session.start_round().await?;
            println!("Round {} started, {} is drawing", start.round, start.drawer);
        }
        Some("/end") => session.end_round().await?,
        Some("/drag") => {
            let x: f32 = words.next().unwrap_or_default().parse()?;
            let y: f32 = words.next().unwrap_or_default().parse()?;
            if let Some(segment) = brush.drag(x, y) {
                session.draw(segment.clone()).await?;
                print_stroke(&segment);
            }
        }
        Some("/up") => brush.release(),
        Some("/color") => brush.set_color(words.next().unwrap_or("black")),
        Some("/width") => brush.set_width(words.next().unwrap_or_default().parse()?),
        Some("/clear") => {
            session.clear().await?;
            println!("[canvas] cleared");
        }
        Some("/scores") => {
            for (name, score) in session.scores().await?.standings() {
                println!("  {name}: {score} pts");
            }
        }
        _ => {
            session.send_chat(line).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();
    let cli = Cli::parse();

    // --- Setup Session ---
    let (session, mut events) = match cli.command {
        Commands::Host { name, port } => {
            let (session, events) = Session::host(SessionConfig::host(name, port)).await?;
            println!("Room open on {}", session.local_addr());
            println!("Type /start once someone has joined. /help lists commands.");
            (session, events)
        }
        Commands::Join { name, addr, port } => {
            let (session, events) = Session::join(SessionConfig::peer(name, addr, port)).await?;
            println!("Joined! Waiting for the host to start a round. /help lists commands.");
            (session, events)
        }
    };

    // --- Event Loop ---
    let mut stdin = FramedRead::new(tokio::io::stdin(), LinesCodec::new());
    let mut brush = Brush::default();

    loop {
        print!("> ");
        io::stdout().flush()?;

        tokio::select! {
            Some(Ok(line)) = stdin.next() => {
                let line = line.trim();
                if line.is_empty() { continue; }
                if let Err(e) = handle_line(&session, &mut brush, line).await {
                    eprintln!("{e}");
                }
            }

            Some(event) = events.recv() => {
                match event {
                    GameEvent::PlayersUpdated(players) => print!("\n{players}"),
                    GameEvent::RoundStarted { round, drawer, display } => {
                        brush.release();
                        println!("\nRound {round}, drawn by {drawer}. {display}");
                    }
                    GameEvent::Stroke(segment) => {
                        println!();
                        print_stroke(&segment);
                    }
                    GameEvent::CanvasCleared => println!("\n[canvas] cleared"),
                    GameEvent::Chat(line) => println!("\n{}: {}", line.name, line.text),
                    GameEvent::Notice(text) => println!("\n* {text}"),
                    GameEvent::Tick { remaining } => {
                        if remaining % 10 == 0 || remaining <= 5 {
                            println!("\n[{remaining}s]");
                        }
                    }
                    GameEvent::RoundEnded { word } => println!("\nThe word was: {word}"),
                    GameEvent::HostDisconnected => {
                        println!("\nThe host left. The game is over.");
                        break;
                    }
                }
            }

            else => break,
        }
    }
    session.shutdown();
    Ok(())
}
