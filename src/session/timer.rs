use super::Input;
use std::time::Duration;
use tokio::{sync::mpsc, time::sleep};
use tokio_util::sync::CancellationToken;

/// Drives the round countdown by posting a tick to the actor every `tick`.
///
/// The countdown itself lives in `RoundState::tick`; this only keeps time.
/// At most one ticker runs at a time. Ticks from a ticker that has since been
/// replaced carry an old generation and are ignored.
pub(crate) struct RoundTimer {
    tick: Duration,
    generation: u64,
    running: Option<CancellationToken>,
}

impl RoundTimer {
    pub fn new(tick: Duration) -> Self {
        Self {
            tick,
            generation: 0,
            running: None,
        }
    }

    pub fn restart(&mut self, inbox: mpsc::Sender<Input>, parent: &CancellationToken) {
        self.stop();
        self.generation += 1;
        let cancel = parent.child_token();
        tokio::spawn(run(self.generation, self.tick, inbox, cancel.clone()));
        self.running = Some(cancel);
    }

    pub fn stop(&mut self) {
        if let Some(cancel) = self.running.take() {
            cancel.cancel();
        }
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.running.is_some() && generation == self.generation
    }
}

async fn run(generation: u64, tick: Duration, inbox: mpsc::Sender<Input>, cancel: CancellationToken) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = sleep(tick) => {
                if inbox.send(Input::Tick { generation }).await.is_err() {
                    break;
                }
            }
        }
    }
}
