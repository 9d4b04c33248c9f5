//! DCC direct-connection control-message grammar.
//!
//! DCC requests travel inside CTCP payloads as space-separated ASCII:
//!
//! ```text
//! DCC CHAT chat <longip> <port>
//! DCC SEND <file> <longip> <port> <size>
//! DCC RESUME <file> <longip> <port> <size>
//! DCC ACCEPT <file> <longip> <port> <size>
//! ```
//!
//! Addresses are 32-bit integers in host-long form ("long IP"). On RESUME
//! and ACCEPT only the port field matters for session correlation; the
//! address field is carried but ignored.

use std::fmt;
use std::net::Ipv4Addr;
use thiserror::Error;

/// The fixed token that opens every brokered control payload.
pub const DCC_TOKEN: &str = "DCC";

/// The four brokered control operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DccOp {
    /// Open a direct chat connection.
    Chat,
    /// Offer a file for transfer.
    Send,
    /// Request resumption of a partial transfer.
    Resume,
    /// Acknowledge a resumption request.
    Accept,
}

impl DccOp {
    /// Parse an operation token, case-insensitively.
    ///
    /// Returns `None` for any token outside the brokered subset; such
    /// payloads pass through un-brokered.
    pub fn parse(token: &str) -> Option<Self> {
        if token.eq_ignore_ascii_case("CHAT") {
            Some(Self::Chat)
        } else if token.eq_ignore_ascii_case("SEND") {
            Some(Self::Send)
        } else if token.eq_ignore_ascii_case("RESUME") {
            Some(Self::Resume)
        } else if token.eq_ignore_ascii_case("ACCEPT") {
            Some(Self::Accept)
        } else {
            None
        }
    }

    /// The canonical wire spelling of the operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "CHAT",
            Self::Send => "SEND",
            Self::Resume => "RESUME",
            Self::Accept => "ACCEPT",
        }
    }
}

impl fmt::Display for DccOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How malformed numeric fields in control messages are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NumericPolicy {
    /// Degrade unparseable numerics to zero. This can yield a degenerate
    /// session with port or size 0, but never fails.
    #[default]
    Lenient,
    /// Reject the control message outright.
    Strict,
}

/// Error raised for malformed control messages under [`NumericPolicy::Strict`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DccParseError {
    /// A numeric field did not parse.
    #[error("malformed numeric field {field:?}: {value:?}")]
    BadNumeric {
        /// The field name ("address", "port", or "size").
        field: &'static str,
        /// The offending token.
        value: String,
    },
}

/// A parsed DCC control message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DccControl {
    /// The brokered operation.
    pub op: DccOp,
    /// Filename field; `"chat"` by convention for CHAT.
    pub file: String,
    /// Advertised address as a host-long integer.
    pub address: u32,
    /// Advertised (or correlated) port.
    pub port: u16,
    /// File size; zero when absent (CHAT carries none).
    pub size: u64,
}

impl DccControl {
    /// Parse a CTCP payload into a control message.
    ///
    /// Returns `Ok(None)` when the payload is not a DCC request at all, or
    /// when the operation token is outside the brokered subset; those
    /// payloads are forwarded as ordinary CTCP traffic. Numeric fields obey
    /// the given [`NumericPolicy`]: absent fields are always zero, but
    /// non-numeric tokens are an error under `Strict`.
    pub fn parse(payload: &str, policy: NumericPolicy) -> Result<Option<Self>, DccParseError> {
        let mut tokens = payload.split_whitespace();
        match tokens.next() {
            Some(t) if t.eq_ignore_ascii_case(DCC_TOKEN) => {}
            _ => return Ok(None),
        }

        let op = match tokens.next().and_then(DccOp::parse) {
            Some(op) => op,
            None => return Ok(None),
        };

        let file = tokens.next().unwrap_or_default().to_string();
        let address = parse_numeric(tokens.next(), "address", policy)?;
        let port = parse_numeric(tokens.next(), "port", policy)?;
        let size = parse_numeric(tokens.next(), "size", policy)?;

        Ok(Some(Self {
            op,
            file,
            address,
            port,
            size,
        }))
    }

    /// Serialize back to the wire payload (without CTCP delimiters).
    ///
    /// CHAT carries no size field; the other operations carry all five.
    pub fn to_wire(&self) -> String {
        match self.op {
            DccOp::Chat => format!("DCC CHAT chat {} {}", self.address, self.port),
            _ => format!(
                "DCC {} {} {} {} {}",
                self.op, self.file, self.address, self.port, self.size
            ),
        }
    }
}

fn parse_numeric<T: std::str::FromStr + Default>(
    token: Option<&str>,
    field: &'static str,
    policy: NumericPolicy,
) -> Result<T, DccParseError> {
    match token {
        None | Some("") => Ok(T::default()),
        Some(value) => match value.parse() {
            Ok(n) => Ok(n),
            Err(_) => match policy {
                NumericPolicy::Lenient => Ok(T::default()),
                NumericPolicy::Strict => Err(DccParseError::BadNumeric {
                    field,
                    value: value.to_string(),
                }),
            },
        },
    }
}

/// Convert a host-long address to its dotted-quad form.
pub fn long_to_ip(address: u32) -> Ipv4Addr {
    Ipv4Addr::from(address)
}

/// Convert a dotted-quad address to its host-long form.
pub fn ip_to_long(address: Ipv4Addr) -> u32 {
    u32::from(address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_chat() {
        let ctrl = DccControl::parse("DCC CHAT chat 2130706433 4000", NumericPolicy::Lenient)
            .unwrap()
            .unwrap();
        assert_eq!(ctrl.op, DccOp::Chat);
        assert_eq!(ctrl.file, "chat");
        assert_eq!(ctrl.address, 2130706433);
        assert_eq!(ctrl.port, 4000);
        assert_eq!(ctrl.size, 0);
    }

    #[test]
    fn parse_send() {
        let ctrl = DccControl::parse(
            "DCC SEND readme.txt 403120438 5550 1104",
            NumericPolicy::Lenient,
        )
        .unwrap()
        .unwrap();
        assert_eq!(ctrl.op, DccOp::Send);
        assert_eq!(ctrl.file, "readme.txt");
        assert_eq!(ctrl.port, 5550);
        assert_eq!(ctrl.size, 1104);
    }

    #[test]
    fn parse_is_case_insensitive() {
        let ctrl = DccControl::parse("dcc resume file 0 5000 0", NumericPolicy::Lenient)
            .unwrap()
            .unwrap();
        assert_eq!(ctrl.op, DccOp::Resume);
    }

    #[test]
    fn non_dcc_payload_passes_through() {
        assert_eq!(
            DccControl::parse("VERSION", NumericPolicy::Lenient).unwrap(),
            None
        );
        assert_eq!(
            DccControl::parse("", NumericPolicy::Strict).unwrap(),
            None
        );
    }

    #[test]
    fn unknown_op_passes_through() {
        assert_eq!(
            DccControl::parse("DCC XMIT file 0 5000 0", NumericPolicy::Strict).unwrap(),
            None
        );
    }

    #[test]
    fn lenient_degrades_bad_numerics_to_zero() {
        let ctrl = DccControl::parse("DCC CHAT chat notanip notaport", NumericPolicy::Lenient)
            .unwrap()
            .unwrap();
        assert_eq!(ctrl.address, 0);
        assert_eq!(ctrl.port, 0);
    }

    #[test]
    fn strict_rejects_bad_numerics() {
        let err = DccControl::parse("DCC CHAT chat notanip 4000", NumericPolicy::Strict)
            .unwrap_err();
        assert_eq!(
            err,
            DccParseError::BadNumeric {
                field: "address",
                value: "notanip".to_string(),
            }
        );
    }

    #[test]
    fn absent_fields_are_zero_even_under_strict() {
        // "DCC CHAT chat <addr> <port>" legitimately has no size token.
        let ctrl = DccControl::parse("DCC CHAT chat 2130706433 4000", NumericPolicy::Strict)
            .unwrap()
            .unwrap();
        assert_eq!(ctrl.size, 0);
    }

    #[test]
    fn wire_round_trip() {
        for payload in [
            "DCC CHAT chat 2130706433 4000",
            "DCC SEND readme.txt 403120438 5550 1104",
            "DCC RESUME readme.txt 0 5550 1104",
            "DCC ACCEPT readme.txt 0 5000 1104",
        ] {
            let ctrl = DccControl::parse(payload, NumericPolicy::Strict)
                .unwrap()
                .unwrap();
            assert_eq!(ctrl.to_wire(), payload);
        }
    }

    #[test]
    fn long_ip_round_trip() {
        let localhost = Ipv4Addr::new(127, 0, 0, 1);
        assert_eq!(ip_to_long(localhost), 2130706433);
        assert_eq!(long_to_ip(2130706433), localhost);
    }
}
