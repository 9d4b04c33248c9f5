//! Generic per-user interception chain.
//!
//! Before a message is formatted for delivery, it is offered to every hook
//! registered on the target user, in canonical form: the sign byte stripped
//! and CTCP delimiters removed. Hooks may rewrite the text in place; the
//! mutated text is what gets delivered and buffered. A halt verdict
//! suppresses all further delivery, including buffering.

use tether_proto::Nick;

/// The kind of message event offered to a hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    /// A PRIVMSG body.
    Message,
    /// A NOTICE body.
    Notice,
    /// A CTCP reply (NOTICE-carried CTCP).
    CtcpReply,
    /// A CTCP request (PRIVMSG-carried CTCP), delimiters removed.
    Ctcp,
    /// A CTCP ACTION, with the `ACTION ` prefix removed.
    Action,
}

/// Hook verdict: continue down the chain or stop all delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Offer the message to the next hook, then deliver.
    Continue,
    /// Suppress delivery entirely (no fan-out, no buffering).
    Halt,
}

/// One inbound message as seen by the interception chain.
#[derive(Debug)]
pub struct HookEvent<'a> {
    /// What kind of message this is.
    pub kind: HookKind,
    /// The remote sender.
    pub nick: &'a Nick,
    /// The target channel, or `None` for private traffic.
    pub channel: Option<&'a str>,
    /// The canonical message text; mutations propagate downstream.
    pub message: &'a mut String,
}

/// A per-user message extension.
pub trait RelayHook: Send + Sync {
    /// Inspect (and optionally rewrite) one inbound message.
    fn intercept(&self, event: &mut HookEvent<'_>) -> Verdict;
}
