//! Capability-aware fan-out to attached clients.

use crate::caps;
use crate::state::User;

/// Deliver one formatted message to every attached client of a user.
///
/// Clients that negotiated `identify-msg` receive `prefix + sign + body`;
/// all others receive `prefix + body` and never see the sign byte. Each
/// client receives exactly one copy; an empty client list delivers nothing.
pub fn put(user: &User, prefix: &str, body: &str, sign: char) {
    for client in user.clients() {
        if client.has_cap(caps::IDENTIFY_MSG) {
            client.put_client(format!("{prefix}{sign}{body}"));
        } else {
            client.put_client(format!("{prefix}{body}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RelayConfig;
    use crate::state::Client;
    use std::collections::HashSet;
    use tokio::sync::mpsc;

    #[test]
    fn sign_inclusion_is_per_client() {
        let mut user = User::new("alice", RelayConfig::default());

        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let mut caps_a = HashSet::new();
        caps_a.insert(caps::IDENTIFY_MSG.to_string());
        user.attach_client(Client::with_caps(tx_a, caps_a));

        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        user.attach_client(Client::new(tx_b));

        put(&user, ":bob!b@h PRIVMSG alice :", "hello", '+');

        assert_eq!(rx_a.try_recv().unwrap(), ":bob!b@h PRIVMSG alice :+hello");
        assert_eq!(rx_b.try_recv().unwrap(), ":bob!b@h PRIVMSG alice :hello");

        // Exactly once each
        assert!(rx_a.try_recv().is_err());
        assert!(rx_b.try_recv().is_err());
    }

    #[test]
    fn empty_client_list_delivers_nothing() {
        let user = User::new("alice", RelayConfig::default());
        put(&user, ":x PRIVMSG alice :", "hello", '-');
    }
}
