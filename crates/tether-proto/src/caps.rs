//! Capability negotiation helpers for the identify-msg envelope.
//!
//! The bouncer supports exactly one capability token. These helpers supply
//! the predicates used during CAP LS / CAP REQ exchanges; the accepted-token
//! set itself lives on each connection object.

use std::collections::HashSet;

/// The identity-tag capability token.
pub const IDENTIFY_MSG: &str = "identify-msg";

/// Whether a capability token is one this system supports.
pub fn is_supported(cap: &str) -> bool {
    cap == IDENTIFY_MSG
}

/// Add the supported token to an advertisement set (CAP LS).
pub fn advertise(caps: &mut HashSet<String>) {
    caps.insert(IDENTIFY_MSG.to_string());
}

/// Whether a connection's accepted-token set has the given capability.
pub fn is_enabled(caps: &HashSet<String>, cap: &str) -> bool {
    caps.contains(cap)
}

/// Outcome of one CAP REQ line: which tokens to ACK and which to NAK.
///
/// ACKed removal requests keep their `-` marker so [`apply_changes`] can
/// replay them against the connection's accepted set.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CapRequest {
    /// Tokens to acknowledge, removal markers preserved.
    pub ack: Vec<String>,
    /// Tokens to reject.
    pub nak: Vec<String>,
}

/// Split a CAP REQ line into ACK and NAK sets.
///
/// Each whitespace-separated token may carry a `-` removal marker and a
/// `=value` suffix; the suffix is discarded before matching.
pub fn parse_request(requested: &str) -> CapRequest {
    let mut req = CapRequest::default();
    for token in requested.split_whitespace() {
        let (removal, name) = match token.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, token),
        };
        let base = name.split('=').next().unwrap_or(name);
        if !is_supported(base) {
            req.nak.push(base.to_string());
        } else if removal {
            req.ack.push(format!("-{base}"));
        } else {
            req.ack.push(base.to_string());
        }
    }
    req
}

/// Replay ACKed changes against a connection's accepted-token set.
///
/// Tokens with a `-` marker are removed, the rest inserted. Returns whether
/// the set actually changed.
pub fn apply_changes(caps: &mut HashSet<String>, changes: &[String]) -> bool {
    changes.iter().fold(false, |modified, change| {
        let changed = match change.strip_prefix('-') {
            Some(name) => caps.remove(name),
            None => caps.insert(change.clone()),
        };
        modified || changed
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_identify_msg_is_supported() {
        assert!(is_supported("identify-msg"));
        assert!(!is_supported("multi-prefix"));
        assert!(!is_supported("sasl"));
    }

    #[test]
    fn advertise_inserts_token() {
        let mut caps = HashSet::new();
        advertise(&mut caps);
        assert!(is_enabled(&caps, IDENTIFY_MSG));
    }

    #[test]
    fn request_splits_ack_from_nak() {
        let req = parse_request("identify-msg sasl unknown-cap");
        assert_eq!(req.ack, ["identify-msg"]);
        assert_eq!(req.nak, ["sasl", "unknown-cap"]);
    }

    #[test]
    fn request_keeps_removal_marker_and_drops_value_suffix() {
        let req = parse_request("-identify-msg=foo");
        assert_eq!(req.ack, ["-identify-msg"]);
        assert!(req.nak.is_empty());
    }

    #[test]
    fn apply_changes_adds_and_removes() {
        let mut caps = HashSet::new();

        assert!(apply_changes(&mut caps, &[IDENTIFY_MSG.to_string()]));
        assert!(caps.contains(IDENTIFY_MSG));

        let removal = vec![format!("-{IDENTIFY_MSG}")];
        assert!(apply_changes(&mut caps, &removal));
        assert!(!caps.contains(IDENTIFY_MSG));

        // Removing an absent cap is a no-op
        assert!(!apply_changes(&mut caps, &removal));
    }
}
