//! Bouncer user (identity) state.

use crate::config::RelayConfig;
use crate::relay::hooks::{HookEvent, HookKind, RelayHook, Verdict};
use crate::state::{Channel, Client};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tether_proto::Nick;

/// One bouncer identity: the upstream connection's negotiated state, the
/// attached clients sharing it, joined channels, and per-peer query buffers.
///
/// A user has exactly one upstream connection at a time; the clients list
/// may be empty (fully detached). Channel keys are lowercased.
pub struct User {
    name: String,
    current_nick: String,
    server_caps: HashSet<String>,
    clients: Vec<Client>,
    channels: HashMap<String, Channel>,
    query_buffers: HashMap<String, Vec<String>>,
    bounce_dccs: bool,
    hooks: Vec<Arc<dyn RelayHook>>,
    relay_config: RelayConfig,
}

impl User {
    /// Create a user whose nick starts out equal to its account name.
    pub fn new(name: impl Into<String>, relay_config: RelayConfig) -> Self {
        let name = name.into();
        Self {
            current_nick: name.clone(),
            name,
            server_caps: HashSet::new(),
            clients: Vec::new(),
            channels: HashMap::new(),
            query_buffers: HashMap::new(),
            bounce_dccs: true,
            hooks: Vec::new(),
            relay_config,
        }
    }

    /// The bouncer account name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The nick currently held on the upstream connection.
    pub fn current_nick(&self) -> &str {
        &self.current_nick
    }

    /// Update the nick after an upstream NICK change.
    pub fn set_current_nick(&mut self, nick: impl Into<String>) {
        self.current_nick = nick.into();
    }

    /// Capabilities accepted on the upstream connection.
    pub fn server_caps(&self) -> &HashSet<String> {
        &self.server_caps
    }

    /// Mutable upstream capability set (CAP negotiation collaborator).
    pub fn server_caps_mut(&mut self) -> &mut HashSet<String> {
        &mut self.server_caps
    }

    /// Whether any client is currently attached.
    pub fn is_attached(&self) -> bool {
        !self.clients.is_empty()
    }

    /// The attached clients.
    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    /// Attach a new client connection.
    pub fn attach_client(&mut self, client: Client) {
        self.clients.push(client);
    }

    /// Detach all clients (connection teardown collaborator).
    pub fn detach_all(&mut self) {
        self.clients.clear();
    }

    /// Whether DCC bouncing is enabled for this user.
    pub fn bounce_dccs(&self) -> bool {
        self.bounce_dccs
    }

    /// Toggle DCC bouncing.
    pub fn set_bounce_dccs(&mut self, bounce: bool) {
        self.bounce_dccs = bounce;
    }

    /// Register a joined channel.
    pub fn add_channel(&mut self, channel: Channel) {
        self.channels
            .insert(channel.name().to_ascii_lowercase(), channel);
    }

    /// Look up a channel by name, case-insensitively.
    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.get(&name.to_ascii_lowercase())
    }

    /// Mutable channel lookup.
    pub fn channel_mut(&mut self, name: &str) -> Option<&mut Channel> {
        self.channels.get_mut(&name.to_ascii_lowercase())
    }

    /// Append an interception hook to this user's chain.
    pub fn add_hook(&mut self, hook: Arc<dyn RelayHook>) {
        self.hooks.push(hook);
    }

    /// Run the interception chain over a canonical (sign-free) message.
    ///
    /// Hooks may mutate the text in place; the first halt wins and
    /// suppresses all further delivery.
    pub(crate) fn run_hooks(
        &self,
        kind: HookKind,
        nick: &Nick,
        channel: Option<&str>,
        message: &mut String,
    ) -> Verdict {
        for hook in &self.hooks {
            let mut event = HookEvent {
                kind,
                nick,
                channel,
                message,
            };
            if hook.intercept(&mut event) == Verdict::Halt {
                return Verdict::Halt;
            }
        }
        Verdict::Continue
    }

    /// Append a formatted line to the query buffer for a remote peer.
    pub fn add_query_buffer(&mut self, peer: &str, line: String) {
        self.query_buffers
            .entry(peer.to_ascii_lowercase())
            .or_default()
            .push(line);
    }

    /// The query backlog for a peer, oldest first.
    pub fn query_buffer(&self, peer: &str) -> &[String] {
        self.query_buffers
            .get(&peer.to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Drain a peer's query backlog for replay on re-attach.
    pub fn take_query_buffer(&mut self, peer: &str) -> Vec<String> {
        self.query_buffers
            .remove(&peer.to_ascii_lowercase())
            .unwrap_or_default()
    }

    /// Apply the configured timestamp to a line headed for a buffer.
    pub fn add_timestamp(&self, text: &str) -> String {
        let cfg = &self.relay_config;
        if !cfg.prepend_timestamps && !cfg.append_timestamps {
            return text.to_string();
        }
        let stamp = chrono::Local::now()
            .format(&cfg.timestamp_format)
            .to_string();
        let mut out = String::with_capacity(text.len() + stamp.len() + 2);
        if cfg.prepend_timestamps {
            out.push_str(&stamp);
            out.push(' ');
        }
        out.push_str(text);
        if cfg.append_timestamps {
            out.push(' ');
            out.push_str(&stamp);
        }
        out
    }
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("name", &self.name)
            .field("current_nick", &self.current_nick)
            .field("clients", &self.clients.len())
            .field("channels", &self.channels.len())
            .field("bounce_dccs", &self.bounce_dccs)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}
