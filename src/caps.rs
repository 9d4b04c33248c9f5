//! Capability negotiation entry points.
//!
//! The negotiation exchange itself is driven by the connection collaborator;
//! this module only supplies the predicates: what we advertise to clients,
//! what we accept from the server, and whether a given connection finished
//! negotiating the identity-tag token.

use std::collections::HashSet;
use tether_proto::caps;

pub use tether_proto::IDENTIFY_MSG;

/// Accept predicate for capabilities the upstream server advertises.
pub fn on_server_cap_available(cap: &str) -> bool {
    caps::is_supported(cap)
}

/// Add our token to the set advertised to a downstream client (CAP LS).
pub fn on_client_cap_ls(caps: &mut HashSet<String>) {
    caps::advertise(caps);
}

/// Accept predicate for a downstream client's CAP REQ.
pub fn is_client_cap_supported(cap: &str) -> bool {
    caps::is_supported(cap)
}

/// Handle one downstream CAP REQ line.
///
/// Supported tokens (including removals) are applied to the client's
/// accepted set in place; the returned split tells the connection what to
/// ACK and what to NAK.
pub fn on_client_cap_req(accepted: &mut HashSet<String>, requested: &str) -> caps::CapRequest {
    let req = caps::parse_request(requested);
    caps::apply_changes(accepted, &req.ack);
    req
}

/// Whether a connection completed negotiation of the given token.
///
/// The accepted-token set is owned by the connection object; this is the
/// boolean query the relay uses to pick the envelope form.
pub fn is_enabled(accepted: &HashSet<String>, cap: &str) -> bool {
    caps::is_enabled(accepted, cap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicates_accept_exactly_one_token() {
        assert!(on_server_cap_available("identify-msg"));
        assert!(!on_server_cap_available("server-time"));
        assert!(is_client_cap_supported("identify-msg"));
        assert!(!is_client_cap_supported("sasl"));
    }

    #[test]
    fn advertise_then_query() {
        let mut caps = HashSet::new();
        on_client_cap_ls(&mut caps);
        assert!(is_enabled(&caps, IDENTIFY_MSG));
        assert!(!is_enabled(&HashSet::new(), IDENTIFY_MSG));
    }

    #[test]
    fn cap_req_updates_the_accepted_set() {
        let mut accepted = HashSet::new();

        let req = on_client_cap_req(&mut accepted, "identify-msg sasl");
        assert_eq!(req.ack, ["identify-msg"]);
        assert_eq!(req.nak, ["sasl"]);
        assert!(is_enabled(&accepted, IDENTIFY_MSG));

        let req = on_client_cap_req(&mut accepted, "-identify-msg");
        assert_eq!(req.ack, ["-identify-msg"]);
        assert!(!is_enabled(&accepted, IDENTIFY_MSG));
    }
}
