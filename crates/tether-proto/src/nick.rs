//! Sender identity (hostmask) handling.
//!
//! A `Nick` is the transient value form of a message prefix,
//! `nick!user@host`. It is recomputed per message and never stored.

use std::fmt;

/// A remote sender's identity, parsed from a `nick!user@host` mask.
///
/// Missing components are empty strings; a bare nick is a valid mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nick {
    mask: String,
    bang: Option<usize>,
    at: Option<usize>,
}

impl Nick {
    /// Parse a hostmask. Never fails; component accessors degrade to empty
    /// strings when the separator is absent.
    pub fn parse(mask: &str) -> Self {
        let bang = mask.find('!');
        let at = match bang {
            Some(b) => mask[b..].find('@').map(|i| b + i),
            None => mask.find('@'),
        };
        Self {
            mask: mask.to_string(),
            bang,
            at,
        }
    }

    /// The full `nick!user@host` mask as received.
    pub fn mask(&self) -> &str {
        &self.mask
    }

    /// The nick portion of the mask.
    pub fn nick(&self) -> &str {
        match (self.bang, self.at) {
            (Some(b), _) => &self.mask[..b],
            (None, Some(a)) => &self.mask[..a],
            (None, None) => &self.mask,
        }
    }

    /// The user (ident) portion of the mask, or "" when absent.
    pub fn user(&self) -> &str {
        match (self.bang, self.at) {
            (Some(b), Some(a)) => &self.mask[b + 1..a],
            (Some(b), None) => &self.mask[b + 1..],
            _ => "",
        }
    }

    /// The host portion of the mask, or "" when absent.
    pub fn host(&self) -> &str {
        match self.at {
            Some(a) => &self.mask[a + 1..],
            None => "",
        }
    }
}

impl fmt::Display for Nick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_mask() {
        let n = Nick::parse("alice!ident@example.net");
        assert_eq!(n.nick(), "alice");
        assert_eq!(n.user(), "ident");
        assert_eq!(n.host(), "example.net");
        assert_eq!(n.mask(), "alice!ident@example.net");
    }

    #[test]
    fn bare_nick() {
        let n = Nick::parse("alice");
        assert_eq!(n.nick(), "alice");
        assert_eq!(n.user(), "");
        assert_eq!(n.host(), "");
    }

    #[test]
    fn nick_and_host_only() {
        let n = Nick::parse("alice@example.net");
        assert_eq!(n.nick(), "alice");
        assert_eq!(n.host(), "example.net");
        assert_eq!(n.user(), "");
    }

    #[test]
    fn display_is_the_mask() {
        let n = Nick::parse("bob!b@h");
        assert_eq!(n.to_string(), "bob!b@h");
    }
}
