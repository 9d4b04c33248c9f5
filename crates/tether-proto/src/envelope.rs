//! Identify-msg envelope codec and CTCP delimiter handling.
//!
//! Servers that negotiated the `identify-msg` capability prepend a single
//! sign byte to every PRIVMSG/NOTICE body: `+` when the sender is identified
//! to services, `-` when it is not. The bouncer strips that byte on the way
//! in, processes the plain text, and re-attaches it per downstream client.
//!
//! # Reference
//! - IRCv3 `identify-msg` (deprecated but still deployed)
//! - CTCP: a payload wrapped in a `\x01` byte at both ends

/// The CTCP delimiter byte, present at both ends of an auxiliary payload.
pub const CTCP_DELIM: char = '\u{1}';

/// Sign used when no sign byte was present on the wire.
pub const DEFAULT_SIGN: char = '-';

/// A message body decoded from its wire envelope.
///
/// `sign` and `text` are recomputed per message and never persisted.
/// `was_signed` records whether the sign byte was actually on the wire,
/// which controls whether [`Envelope::restore`] re-attaches it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// The sign byte, [`DEFAULT_SIGN`] when none was present.
    pub sign: char,
    /// Whether the sign byte was present on the wire.
    pub was_signed: bool,
    /// The message body with the sign removed.
    pub text: String,
}

impl Envelope {
    /// Decode a message that carries a leading sign byte.
    ///
    /// The first character becomes the sign and the remainder the text.
    /// An empty message yields [`DEFAULT_SIGN`] and is left unchanged.
    pub fn strip(message: &str) -> Self {
        let mut chars = message.chars();
        match chars.next() {
            Some(sign) => Self {
                sign,
                was_signed: true,
                text: chars.as_str().to_string(),
            },
            None => Self {
                sign: DEFAULT_SIGN,
                was_signed: false,
                text: String::new(),
            },
        }
    }

    /// Wrap a message that never had a sign byte (capability not negotiated
    /// upstream). The sign defaults to [`DEFAULT_SIGN`].
    pub fn unsigned(message: &str) -> Self {
        Self {
            sign: DEFAULT_SIGN,
            was_signed: false,
            text: message.to_string(),
        }
    }

    /// Reconstruct the wire form: the sign is prepended iff it was present
    /// on the wire. Inverse of [`Envelope::strip`].
    pub fn restore(&self) -> String {
        self.restore_text(&self.text)
    }

    /// Like [`Envelope::restore`], but over replacement text.
    ///
    /// Used when interception hooks have rewritten the body and the signed
    /// wire form of the *mutated* text is needed (e.g. for buffering).
    pub fn restore_text(&self, text: &str) -> String {
        if self.was_signed {
            let mut out = String::with_capacity(text.len() + self.sign.len_utf8());
            out.push(self.sign);
            out.push_str(text);
            out
        } else {
            text.to_string()
        }
    }
}

/// Check whether a message body is a delimiter-wrapped CTCP payload.
///
/// Requires the delimiter at both ends and a minimum length of two bytes.
pub fn is_ctcp(message: &str) -> bool {
    message.len() >= 2 && message.starts_with(CTCP_DELIM) && message.ends_with(CTCP_DELIM)
}

/// Strip one delimiter byte from each end of a CTCP payload.
///
/// Returns `None` when the message is not CTCP-wrapped.
pub fn unwrap_ctcp(message: &str) -> Option<&str> {
    if is_ctcp(message) {
        Some(&message[1..message.len() - 1])
    } else {
        None
    }
}

/// Wrap a payload in the CTCP delimiter.
pub fn wrap_ctcp(payload: &str) -> String {
    format!("{CTCP_DELIM}{payload}{CTCP_DELIM}")
}
