use super::{ConnId, connection::PeerHandle};
use crate::{Message, codec};
use std::collections::HashMap;
use tracing::{debug, error, warn};

/// The connections this process can write to.
///
/// A host holds one entry per peer. A peer holds just the host.
#[derive(Default)]
pub(crate) struct Fanout {
    links: HashMap<ConnId, PeerHandle>,
}

impl Fanout {
    pub fn insert(&mut self, handle: PeerHandle) {
        self.links.insert(handle.id, handle);
    }

    pub fn contains(&self, id: ConnId) -> bool {
        self.links.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Forget a connection and close its socket.
    pub fn remove(&mut self, id: ConnId) -> Option<PeerHandle> {
        let handle = self.links.remove(&id)?;
        handle.close();
        Some(handle)
    }

    /// Queue a frame for every connection but `except`.
    ///
    /// A connection whose queue is full or closed is removed on the spot.
    /// Returns the ids removed that way.
    pub fn broadcast(&mut self, message: &Message, except: Option<ConnId>) -> Vec<ConnId> {
        let Some(frame) = encode(message) else {
            return Vec::new();
        };
        let targets: Vec<&PeerHandle> = self
            .links
            .values()
            .filter(|handle| Some(handle.id) != except)
            .collect();
        debug!(kind = message.kind(), peers = targets.len(), "broadcast");

        let failed: Vec<ConnId> = targets
            .into_iter()
            .filter(|handle| !handle.send(frame.clone()))
            .map(|handle| handle.id)
            .collect();
        for id in &failed {
            warn!(conn = %id, "send failed, dropping peer");
            self.remove(*id);
        }
        failed
    }

    /// Queue a frame for one connection. Returns the id if it had to be dropped.
    pub fn send_to(&mut self, id: ConnId, message: &Message) -> Option<ConnId> {
        let frame = encode(message)?;
        let handle = self.links.get(&id)?;
        if handle.send(frame) {
            return None;
        }
        warn!(conn = %id, "send failed, dropping peer");
        self.remove(id);
        Some(id)
    }

    pub fn close_all(&mut self) {
        for (_, handle) in self.links.drain() {
            handle.close();
        }
    }
}

fn encode(message: &Message) -> Option<bytes::Bytes> {
    match codec::encode(message) {
        Ok(frame) => Some(frame),
        Err(e) => {
            error!(kind = message.kind(), error = %e, "could not encode message");
            None
        }
    }
}
