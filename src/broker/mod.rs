//! DCC tunnel broker.
//!
//! Brokers the four direct-connection control operations (CHAT, SEND,
//! RESUME, ACCEPT) embedded in CTCP payloads. CHAT and SEND allocate a new
//! broker-local listening endpoint and rewrite the request's address/port
//! fields so the receiving client dials the bouncer; RESUME and ACCEPT
//! correlate follow-up messages to an existing session by port number.
//!
//! Every failure mode here degrades to "message not delivered": allocation
//! failures and unresolvable session lookups drop the one operation and
//! nothing else.

mod session;

pub use session::{SessionRegistry, TunnelKind, TunnelSession};

use crate::config::BrokerConfig;
use crate::error::BrokerError;
use crate::relay::{RelayOutcome, fanout};
use crate::state::User;
use std::sync::Arc;
use tether_proto::dcc::{self, DccControl, DccOp};
use tether_proto::envelope::wrap_ctcp;
use tether_proto::Nick;
use tracing::{debug, warn};

/// Drop guard for an allocated broker listening endpoint.
///
/// The transport collaborator owns socket I/O; the broker only holds the
/// guard so the endpoint lives as long as its session's correlation entry.
pub trait EndpointGuard: Send + Sync {}

/// An owned endpoint guard.
pub type ListenerHandle = Box<dyn EndpointGuard>;

/// Allocation seam to the transport collaborator.
///
/// `listen` binds a fresh endpoint on the broker's address and must fail
/// fast; it never retries or suspends beyond the bind itself.
pub trait TunnelTransport: Send + Sync {
    /// Allocate a new listening endpoint, returning its local port.
    fn listen(&self) -> Result<(u16, ListenerHandle), BrokerError>;
}

/// The tunnel broker: parses nothing itself, operates on already-parsed
/// [`DccControl`] messages handed over by the relay.
pub struct TunnelBroker {
    config: BrokerConfig,
    registry: Arc<SessionRegistry>,
    transport: Arc<dyn TunnelTransport>,
}

impl TunnelBroker {
    /// Create a broker over a shared registry and transport.
    pub fn new(
        config: BrokerConfig,
        registry: Arc<SessionRegistry>,
        transport: Arc<dyn TunnelTransport>,
    ) -> Self {
        Self {
            config,
            registry,
            transport,
        }
    }

    /// Whether brokering is enabled at all.
    pub fn enabled(&self) -> bool {
        self.config.enabled
    }

    /// Broker one control message directed at `user`, forwarding rewritten
    /// copies through the fan-out router.
    ///
    /// Each operation is handled atomically; there is no broker-wide state
    /// machine beyond the session registry.
    pub fn bounce(
        &self,
        user: &User,
        nick: &Nick,
        ctrl: DccControl,
        sign: char,
    ) -> RelayOutcome {
        let prefix = format!(":{} PRIVMSG {} :", nick.mask(), user.current_nick());
        match ctrl.op {
            DccOp::Chat | DccOp::Send => self.open_tunnel(user, nick, ctrl, sign, &prefix),
            DccOp::Resume => self.resume(user, ctrl, sign, &prefix),
            DccOp::Accept => self.accept(user, ctrl, sign, &prefix),
        }
    }

    /// CHAT/SEND: allocate, register, rewrite, forward.
    fn open_tunnel(
        &self,
        user: &User,
        nick: &Nick,
        ctrl: DccControl,
        sign: char,
        prefix: &str,
    ) -> RelayOutcome {
        let (local_port, handle) = match self.transport.listen() {
            Ok(endpoint) => endpoint,
            Err(e) => {
                warn!(
                    user = %user.name(),
                    error = %e,
                    code = e.error_code(),
                    "endpoint allocation failed; dropping control message"
                );
                return RelayOutcome::Dropped;
            }
        };

        let kind = match ctrl.op {
            DccOp::Send => TunnelKind::File {
                name: ctrl.file.clone(),
                size: ctrl.size,
            },
            _ => TunnelKind::Chat,
        };
        let session = TunnelSession {
            local_port,
            user_port: ctrl.port,
            nick: nick.nick().to_string(),
            user: user.name().to_string(),
            remote_address: ctrl.address,
            kind,
            handle,
        };
        if let Err(e) = self.registry.insert(session) {
            warn!(
                user = %user.name(),
                error = %e,
                code = e.error_code(),
                "session registration failed; dropping control message"
            );
            return RelayOutcome::Dropped;
        }
        debug!(
            user = %user.name(),
            peer = %nick.nick(),
            op = %ctrl.op,
            local_port,
            remote_port = ctrl.port,
            "brokered new tunnel"
        );

        let mut out = ctrl;
        out.address = dcc::ip_to_long(self.config.advertise_address);
        out.port = local_port;
        fanout::put(user, prefix, &wrap_ctcp(&out.to_wire()), sign);
        RelayOutcome::Brokered
    }

    /// RESUME: correlate by broker-local port, rewrite to the
    /// externally-visible port, forward. Never allocates.
    fn resume(&self, user: &User, ctrl: DccControl, sign: char, prefix: &str) -> RelayOutcome {
        match self.registry.by_local_port(ctrl.port) {
            Some(session) => {
                let mut out = ctrl;
                out.port = session.user_port;
                fanout::put(user, prefix, &wrap_ctcp(&out.to_wire()), sign);
                RelayOutcome::Brokered
            }
            None => {
                debug!(port = ctrl.port, "RESUME for unknown session; dropping");
                RelayOutcome::Dropped
            }
        }
    }

    /// ACCEPT: scan by externally-visible port and forward a rewritten copy
    /// for every match. Port collisions across sessions are legitimate.
    fn accept(&self, user: &User, ctrl: DccControl, sign: char, prefix: &str) -> RelayOutcome {
        let matches = self.registry.by_user_port(ctrl.port);
        if matches.is_empty() {
            debug!(port = ctrl.port, "ACCEPT for unknown session; dropping");
            return RelayOutcome::Dropped;
        }
        for session in matches {
            let mut out = ctrl.clone();
            out.port = session.local_port;
            fanout::put(user, prefix, &wrap_ctcp(&out.to_wire()), sign);
        }
        RelayOutcome::Brokered
    }
}
