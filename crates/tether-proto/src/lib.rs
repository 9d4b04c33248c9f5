//! # tether-proto
//!
//! Wire-level types for the Tether IRC bouncer: the identify-msg envelope
//! codec, CTCP delimiter handling, capability negotiation helpers, and the
//! DCC direct-connection control-message grammar.
//!
//! ## Quick Start
//!
//! ```rust
//! use tether_proto::envelope::{self, Envelope};
//!
//! // Strip the identify-msg sign byte from a tagged message
//! let env = Envelope::strip("+hello");
//! assert_eq!(env.sign, '+');
//! assert_eq!(env.text, "hello");
//!
//! // CTCP payloads are wrapped in a single \x01 byte at both ends
//! assert!(envelope::is_ctcp("\u{1}VERSION\u{1}"));
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod caps;
pub mod dcc;
pub mod envelope;
pub mod nick;

pub use caps::{CapRequest, IDENTIFY_MSG};
pub use dcc::{DccControl, DccOp, NumericPolicy};
pub use envelope::Envelope;
pub use nick::Nick;
