//! Brokered tunnel sessions and the process-wide session registry.

use crate::broker::ListenerHandle;
use crate::error::BrokerError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// What a brokered session is tunneling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TunnelKind {
    /// A direct chat connection.
    Chat,
    /// A file transfer.
    File {
        /// Offered filename.
        name: String,
        /// Advertised file size in bytes.
        size: u64,
    },
}

/// Bookkeeping for one brokered direct connection.
///
/// Created when a CHAT or SEND request is brokered; looked up (never
/// re-created) on RESUME/ACCEPT. The underlying socket lifecycle belongs to
/// the transport collaborator; dropping the session releases only the
/// correlation entry and its endpoint guard.
pub struct TunnelSession {
    /// The broker-local listening port (registry key, unique among live
    /// sessions).
    pub local_port: u16,
    /// The externally-visible port from the original request, used for
    /// RESUME/ACCEPT correlation.
    pub user_port: u16,
    /// The requesting peer's nick.
    pub nick: String,
    /// The bouncer user the request was directed at.
    pub user: String,
    /// The peer's advertised address, host-long form.
    pub remote_address: u32,
    /// Chat or file transfer.
    pub kind: TunnelKind,
    /// Keeps the allocated endpoint alive for the session's lifetime.
    #[allow(dead_code)]
    pub(crate) handle: ListenerHandle,
}

impl std::fmt::Debug for TunnelSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TunnelSession")
            .field("local_port", &self.local_port)
            .field("user_port", &self.user_port)
            .field("nick", &self.nick)
            .field("user", &self.user)
            .field("kind", &self.kind)
            .finish()
    }
}

#[derive(Default)]
struct RegistryInner {
    by_local: HashMap<u16, Arc<TunnelSession>>,
    // user_port -> local ports; ports may collide across sessions, and
    // ACCEPT forwards to every match.
    by_user: HashMap<u16, Vec<u16>>,
}

/// Process-wide table of live brokered sessions.
///
/// Keyed by the broker-local listening port. RESUME/ACCEPT lookups race
/// against CHAT/SEND insertions and session teardown, so all access goes
/// through one lock.
#[derive(Default)]
pub struct SessionRegistry {
    inner: RwLock<RegistryInner>,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new session.
    ///
    /// Fails when a live session already holds the same local port.
    pub fn insert(&self, session: TunnelSession) -> Result<Arc<TunnelSession>, BrokerError> {
        let mut inner = self.inner.write();
        if inner.by_local.contains_key(&session.local_port) {
            return Err(BrokerError::DuplicatePort(session.local_port));
        }
        let session = Arc::new(session);
        inner
            .by_user
            .entry(session.user_port)
            .or_default()
            .push(session.local_port);
        inner.by_local.insert(session.local_port, session.clone());
        Ok(session)
    }

    /// Remove a session on connection teardown.
    pub fn remove(&self, local_port: u16) -> Option<Arc<TunnelSession>> {
        let mut inner = self.inner.write();
        let session = inner.by_local.remove(&local_port)?;
        if let Some(ports) = inner.by_user.get_mut(&session.user_port) {
            ports.retain(|p| *p != local_port);
            if ports.is_empty() {
                inner.by_user.remove(&session.user_port);
            }
        }
        Some(session)
    }

    /// Look up one session by its broker-local port (RESUME correlation).
    pub fn by_local_port(&self, port: u16) -> Option<Arc<TunnelSession>> {
        self.inner.read().by_local.get(&port).cloned()
    }

    /// All sessions whose externally-visible port matches (ACCEPT
    /// correlation; forwards to every match).
    pub fn by_user_port(&self, port: u16) -> Vec<Arc<TunnelSession>> {
        let inner = self.inner.read();
        inner
            .by_user
            .get(&port)
            .into_iter()
            .flatten()
            .filter_map(|local| inner.by_local.get(local).cloned())
            .collect()
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.inner.read().by_local.len()
    }

    /// Whether no sessions are live.
    pub fn is_empty(&self) -> bool {
        self.inner.read().by_local.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullGuard;
    impl crate::broker::EndpointGuard for NullGuard {}

    fn session(local_port: u16, user_port: u16) -> TunnelSession {
        TunnelSession {
            local_port,
            user_port,
            nick: "bob".to_string(),
            user: "alice".to_string(),
            remote_address: 0,
            kind: TunnelKind::Chat,
            handle: Box::new(NullGuard),
        }
    }

    #[test]
    fn insert_and_lookup_by_local_port() {
        let registry = SessionRegistry::new();
        registry.insert(session(5000, 4000)).unwrap();

        let found = registry.by_local_port(5000).unwrap();
        assert_eq!(found.user_port, 4000);
        assert!(registry.by_local_port(9999).is_none());
    }

    #[test]
    fn duplicate_local_port_rejected() {
        let registry = SessionRegistry::new();
        registry.insert(session(5000, 4000)).unwrap();
        assert!(matches!(
            registry.insert(session(5000, 4001)),
            Err(BrokerError::DuplicatePort(5000))
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn user_port_index_returns_all_matches() {
        let registry = SessionRegistry::new();
        registry.insert(session(5000, 4000)).unwrap();
        registry.insert(session(5001, 4000)).unwrap();
        registry.insert(session(5002, 7777)).unwrap();

        let mut locals: Vec<u16> = registry
            .by_user_port(4000)
            .iter()
            .map(|s| s.local_port)
            .collect();
        locals.sort_unstable();
        assert_eq!(locals, [5000, 5001]);
    }

    #[test]
    fn remove_cleans_both_indices() {
        let registry = SessionRegistry::new();
        registry.insert(session(5000, 4000)).unwrap();
        registry.insert(session(5001, 4000)).unwrap();

        assert!(registry.remove(5000).is_some());
        assert!(registry.by_local_port(5000).is_none());
        assert_eq!(registry.by_user_port(4000).len(), 1);

        assert!(registry.remove(5000).is_none());
        registry.remove(5001);
        assert!(registry.is_empty());
    }
}
