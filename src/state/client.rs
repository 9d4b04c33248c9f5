//! Attached downstream client state.

use std::collections::HashSet;
use tokio::sync::mpsc;
use tracing::trace;

/// One downstream connection to a real end-user IRC client.
///
/// A `Client` exists only while its connection does; the transport
/// collaborator destroys it on disconnect. Delivery is fire-and-forget via
/// an unbounded channel drained by the connection's writer task.
#[derive(Debug)]
pub struct Client {
    capabilities: HashSet<String>,
    tx: mpsc::UnboundedSender<String>,
}

impl Client {
    /// Create a client with no negotiated capabilities.
    pub fn new(tx: mpsc::UnboundedSender<String>) -> Self {
        Self {
            capabilities: HashSet::new(),
            tx,
        }
    }

    /// Create a client with an already-negotiated capability set.
    pub fn with_caps(tx: mpsc::UnboundedSender<String>, capabilities: HashSet<String>) -> Self {
        Self { capabilities, tx }
    }

    /// Whether this client negotiated the given capability.
    pub fn has_cap(&self, cap: &str) -> bool {
        self.capabilities.contains(cap)
    }

    /// The negotiated capability set (for CAP REQ updates).
    pub fn capabilities_mut(&mut self) -> &mut HashSet<String> {
        &mut self.capabilities
    }

    /// Queue one line for delivery. Fire-and-forget: a closed channel means
    /// the connection is tearing down and the line is dropped.
    pub fn put_client(&self, line: impl Into<String>) {
        if self.tx.send(line.into()).is_err() {
            trace!("client channel closed; dropping line");
        }
    }
}
