//! Sockets: the host's listener, the peer's single upstream link, and the
//! pair of tasks that serve every connection.

use super::{ConnId, Input};
use crate::{SessionConfig, SessionError, codec::LineCodec};
use bytes::Bytes;
use futures::StreamExt;
use std::{net::SocketAddr, time::Duration};
use tokio::{
    io::AsyncWriteExt,
    net::{
        TcpListener, TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    sync::mpsc,
    time::{sleep, timeout},
};
use tokio_util::{codec::FramedRead, sync::CancellationToken};
use tracing::{debug, info, warn};

/// Write side of a connection, held by the session actor.
#[derive(Debug, Clone)]
pub(crate) struct PeerHandle {
    pub id: ConnId,
    pub addr: SocketAddr,
    outbox: mpsc::Sender<Bytes>,
    cancel: CancellationToken,
}

impl PeerHandle {
    /// Queue an encoded frame without waiting. False if the peer is stalled or gone.
    pub fn send(&self, frame: Bytes) -> bool {
        !self.cancel.is_cancelled() && self.outbox.try_send(frame).is_ok()
    }

    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// A handle with no socket behind it. The caller reads the outbox.
    #[cfg(test)]
    pub fn detached(id: u64, capacity: usize) -> (Self, mpsc::Receiver<Bytes>) {
        let (outbox, queue) = mpsc::channel(capacity);
        let handle = Self {
            id: ConnId(id),
            addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            outbox,
            cancel: CancellationToken::new(),
        };
        (handle, queue)
    }
}

pub(crate) async fn listen(port: u16) -> Result<TcpListener, SessionError> {
    TcpListener::bind(("0.0.0.0", port))
        .await
        .map_err(|source| SessionError::Bind { port, source })
}

pub(crate) async fn connect(host: &str, port: u16) -> Result<TcpStream, SessionError> {
    TcpStream::connect((host, port))
        .await
        .map_err(|source| SessionError::Connect {
            addr: format!("{host}:{port}"),
            source,
        })
}

/// Host: take connections until the session stops.
pub(crate) async fn accept_loop(
    listener: TcpListener,
    inbox: mpsc::Sender<Input>,
    cancel: CancellationToken,
    config: SessionConfig,
) {
    let mut next_id = ConnId::UPSTREAM.0 + 1;
    loop {
        let (stream, addr) = tokio::select! {
            _ = cancel.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!(error = %e, "accept failed");
                    sleep(Duration::from_millis(100)).await;
                    continue;
                }
            },
        };
        let id = ConnId(next_id);
        next_id += 1;
        info!(conn = %id, %addr, "new connection");
        if attach(stream, addr, id, &inbox, &cancel, &config).await.is_err() {
            break;
        }
    }
    debug!("no longer accepting connections");
}

/// Register a fresh connection with the actor, then start serving it.
///
/// The actor hears about the connection before any message read from it.
pub(crate) async fn attach(
    stream: TcpStream,
    addr: SocketAddr,
    id: ConnId,
    inbox: &mpsc::Sender<Input>,
    parent: &CancellationToken,
    config: &SessionConfig,
) -> Result<PeerHandle, SessionError> {
    if let Err(e) = stream.set_nodelay(true) {
        debug!(conn = %id, error = %e, "could not set TCP_NODELAY");
    }
    let (reader, writer) = stream.into_split();
    let cancel = parent.child_token();
    let (outbox, queue) = mpsc::channel(config.outbox_capacity);
    let handle = PeerHandle {
        id,
        addr,
        outbox,
        cancel: cancel.clone(),
    };
    inbox
        .send(Input::Connected(handle.clone()))
        .await
        .map_err(|_| SessionError::Closed)?;

    tokio::spawn(write_loop(id, writer, queue, cancel.clone(), config.write_timeout));
    tokio::spawn(receive_loop(id, reader, inbox.clone(), cancel));
    Ok(handle)
}

async fn receive_loop(
    id: ConnId,
    reader: OwnedReadHalf,
    inbox: mpsc::Sender<Input>,
    cancel: CancellationToken,
) {
    let mut frames = FramedRead::new(reader, LineCodec::default());
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            frame = frames.next() => match frame {
                Some(Ok(message)) => {
                    if inbox.send(Input::Received { from: id, message }).await.is_err() {
                        break;
                    }
                }
                Some(Err(e)) => {
                    debug!(conn = %id, error = %e, "read failed");
                    break;
                }
                None => {
                    debug!(conn = %id, "closed by the other end");
                    break;
                }
            },
        }
    }
    cancel.cancel();
    let _ = inbox.send(Input::Disconnected(id)).await;
}

async fn write_loop(
    id: ConnId,
    mut writer: OwnedWriteHalf,
    mut queue: mpsc::Receiver<Bytes>,
    cancel: CancellationToken,
    write_timeout: Duration,
) {
    loop {
        let frame = tokio::select! {
            _ = cancel.cancelled() => break,
            frame = queue.recv() => match frame {
                Some(frame) => frame,
                None => break,
            },
        };
        match timeout(write_timeout, writer.write_all(&frame)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                debug!(conn = %id, error = %e, "write failed");
                break;
            }
            Err(_) => {
                warn!(conn = %id, "write timed out");
                break;
            }
        }
    }
    cancel.cancel();
    let _ = timeout(write_timeout, writer.shutdown()).await;
}
