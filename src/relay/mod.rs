//! The capability-aware message relay.
//!
//! One inbound upstream message flows through, in order: envelope decode
//! (sign byte stripped only when the upstream connection negotiated
//! `identify-msg`), CTCP detection, the per-user interception chain on the
//! canonical sign-free text, DCC dispatch to the tunnel broker, then
//! capability-aware fan-out and buffering. A message is processed to
//! completion before the next one for the same user, which preserves
//! upstream delivery order per client.

pub mod fanout;
pub mod hooks;

use crate::broker::{SessionRegistry, TunnelBroker, TunnelTransport};
use crate::caps;
use crate::config::Config;
use crate::state::User;
use hooks::{HookKind, Verdict};
use std::sync::Arc;
use tether_proto::dcc::{DccControl, NumericPolicy};
use tether_proto::envelope::{self, Envelope, wrap_ctcp};
use tether_proto::Nick;
use tracing::{debug, warn};

/// The wire command an inbound message arrived as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// PRIVMSG traffic (including CTCP requests).
    Privmsg,
    /// NOTICE traffic (including CTCP replies).
    Notice,
}

impl MessageKind {
    fn command(self) -> &'static str {
        match self {
            Self::Privmsg => "PRIVMSG",
            Self::Notice => "NOTICE",
        }
    }
}

/// Where an inbound message was addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    /// Addressed to the bouncer user directly.
    Private,
    /// Addressed to a channel the user has joined.
    Channel(&'a str),
}

impl<'a> Target<'a> {
    fn channel_name(&self) -> Option<&'a str> {
        match self {
            Self::Channel(name) => Some(name),
            Self::Private => None,
        }
    }
}

/// What became of one relayed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Formatted and fanned out (and/or buffered) normally.
    Delivered,
    /// An interception hook vetoed delivery.
    Halted,
    /// Handed to the tunnel broker, which forwarded rewritten copies.
    Brokered,
    /// Silently dropped (allocation failure, unknown session, or strict
    /// validation failure).
    Dropped,
}

/// The relay core: everything needed to process one user's inbound traffic.
pub struct RelayCore {
    broker: TunnelBroker,
    policy: NumericPolicy,
}

impl RelayCore {
    /// Build the relay over a shared session registry and tunnel transport.
    pub fn new(
        config: &Config,
        registry: Arc<SessionRegistry>,
        transport: Arc<dyn TunnelTransport>,
    ) -> Self {
        let policy = if config.broker.strict_numerics {
            NumericPolicy::Strict
        } else {
            NumericPolicy::Lenient
        };
        Self {
            broker: TunnelBroker::new(config.broker.clone(), registry, transport),
            policy,
        }
    }

    /// Relay one inbound message to a user's attached clients and buffers.
    pub fn relay(
        &self,
        user: &mut User,
        kind: MessageKind,
        target: Target<'_>,
        nick: &Nick,
        raw: &str,
    ) -> RelayOutcome {
        let signed = caps::is_enabled(user.server_caps(), caps::IDENTIFY_MSG);
        let env = if signed {
            Envelope::strip(raw)
        } else {
            Envelope::unsigned(raw)
        };

        // CTCP unwrapping applies to PRIVMSG everywhere but only to private
        // NOTICEs; channel notices carry CTCP-looking bodies verbatim.
        let ctcp = match (kind, target) {
            (MessageKind::Privmsg, _) | (MessageKind::Notice, Target::Private) => {
                envelope::unwrap_ctcp(&env.text).map(str::to_string)
            }
            _ => None,
        };

        match (ctcp, kind) {
            (Some(inner), MessageKind::Privmsg) => {
                self.relay_ctcp(user, target, nick, &env, inner)
            }
            (Some(inner), MessageKind::Notice) => self.relay_ctcp_reply(user, nick, &env, inner),
            (None, _) => self.relay_plain(user, kind, target, nick, &env),
        }
    }

    /// Plain PRIVMSG/NOTICE: intercept, fan out, buffer.
    fn relay_plain(
        &self,
        user: &mut User,
        kind: MessageKind,
        target: Target<'_>,
        nick: &Nick,
        env: &Envelope,
    ) -> RelayOutcome {
        let mut text = env.text.clone();
        let hook_kind = match kind {
            MessageKind::Privmsg => HookKind::Message,
            MessageKind::Notice => HookKind::Notice,
        };
        if user.run_hooks(hook_kind, nick, target.channel_name(), &mut text) == Verdict::Halt {
            debug!(user = %user.name(), "interception halted message");
            return RelayOutcome::Halted;
        }

        let cmd = kind.command();
        match target {
            Target::Private => {
                let prefix = format!(":{} {} {} :", nick.mask(), cmd, user.current_nick());
                fanout::put(user, &prefix, &text, env.sign);
                if !user.is_attached() {
                    let body = user.add_timestamp(&env.restore_text(&text));
                    let line =
                        format!(":{} {} {} :{}", nick.mask(), cmd, user.current_nick(), body);
                    user.add_query_buffer(nick.nick(), line);
                }
            }
            Target::Channel(name) => {
                let (detached, keep) = self.channel_flags(user, name);
                if !detached {
                    let prefix = format!(":{} {} {} :", nick.mask(), cmd, name);
                    fanout::put(user, &prefix, &text, env.sign);
                }
                if keep || !user.is_attached() || detached {
                    let body = user.add_timestamp(&env.restore_text(&text));
                    let line = format!(":{} {} {} :{}", nick.mask(), cmd, name, body);
                    if let Some(chan) = user.channel_mut(name) {
                        chan.add_buffer(line);
                    }
                }
            }
        }
        RelayOutcome::Delivered
    }

    /// A CTCP reply (private NOTICE): intercept and fan out; never buffered.
    fn relay_ctcp_reply(
        &self,
        user: &mut User,
        nick: &Nick,
        env: &Envelope,
        mut inner: String,
    ) -> RelayOutcome {
        if user.run_hooks(HookKind::CtcpReply, nick, None, &mut inner) == Verdict::Halt {
            debug!(user = %user.name(), "interception halted CTCP reply");
            return RelayOutcome::Halted;
        }
        let prefix = format!(":{} NOTICE {} :", nick.mask(), user.current_nick());
        fanout::put(user, &prefix, &wrap_ctcp(&inner), env.sign);
        RelayOutcome::Delivered
    }

    /// A CTCP request (PRIVMSG): intercept, handle ACTION buffering, divert
    /// direct-connection requests to the broker, else fan out.
    fn relay_ctcp(
        &self,
        user: &mut User,
        target: Target<'_>,
        nick: &Nick,
        env: &Envelope,
        mut inner: String,
    ) -> RelayOutcome {
        let channel = target.channel_name();
        if user.run_hooks(HookKind::Ctcp, nick, channel, &mut inner) == Verdict::Halt {
            debug!(user = %user.name(), "interception halted CTCP request");
            return RelayOutcome::Halted;
        }

        let action = inner.strip_prefix("ACTION ").map(str::to_string);
        if let Some(mut action_text) = action {
            if user.run_hooks(HookKind::Action, nick, channel, &mut action_text) == Verdict::Halt
            {
                debug!(user = %user.name(), "interception halted action");
                return RelayOutcome::Halted;
            }
            self.buffer_action(user, target, nick, env, &action_text);
            inner = format!("ACTION {action_text}");
        } else if target == Target::Private
            && self.broker.enabled()
            && user.bounce_dccs()
            && user.is_attached()
        {
            match DccControl::parse(&inner, self.policy) {
                Ok(Some(ctrl)) => return self.broker.bounce(user, nick, ctrl, env.sign),
                Ok(None) => {}
                Err(e) => {
                    warn!(
                        user = %user.name(),
                        peer = %nick.nick(),
                        error = %e,
                        "dropping malformed control message"
                    );
                    return RelayOutcome::Dropped;
                }
            }
        }

        match target {
            Target::Private => {
                let prefix = format!(":{} PRIVMSG {} :", nick.mask(), user.current_nick());
                fanout::put(user, &prefix, &wrap_ctcp(&inner), env.sign);
            }
            Target::Channel(name) => {
                let (detached, _) = self.channel_flags(user, name);
                if !detached {
                    let prefix = format!(":{} PRIVMSG {} :", nick.mask(), name);
                    fanout::put(user, &prefix, &wrap_ctcp(&inner), env.sign);
                }
            }
        }
        RelayOutcome::Delivered
    }

    /// ACTION backlog entries, under the same predicates as plain messages.
    fn buffer_action(
        &self,
        user: &mut User,
        target: Target<'_>,
        nick: &Nick,
        env: &Envelope,
        action_text: &str,
    ) {
        match target {
            Target::Private => {
                if !user.is_attached() {
                    let body = user.add_timestamp(&env.restore_text(action_text));
                    let line = format!(
                        ":{} PRIVMSG {} :\u{1}ACTION {}\u{1}",
                        nick.mask(),
                        user.current_nick(),
                        body
                    );
                    user.add_query_buffer(nick.nick(), line);
                }
            }
            Target::Channel(name) => {
                let (detached, keep) = self.channel_flags(user, name);
                if keep || !user.is_attached() || detached {
                    let body = user.add_timestamp(&env.restore_text(action_text));
                    let line =
                        format!(":{} PRIVMSG {} :\u{1}ACTION {}\u{1}", nick.mask(), name, body);
                    if let Some(chan) = user.channel_mut(name) {
                        chan.add_buffer(line);
                    }
                }
            }
        }
    }

    fn channel_flags(&self, user: &User, name: &str) -> (bool, bool) {
        match user.channel(name) {
            Some(chan) => (chan.is_detached(), chan.keep_buffer()),
            None => {
                warn!(user = %user.name(), channel = name, "message for unknown channel");
                (false, false)
            }
        }
    }
}
