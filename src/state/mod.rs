//! In-memory bouncer state: users, their attached clients, and channels.
//!
//! Ownership follows the data model: a [`User`] owns its [`Client`]s and
//! [`Channel`]s exclusively. Each user's traffic is processed one message at
//! a time, so none of these types carry their own locking; the only state
//! shared across users is the broker's session registry.

mod channel;
mod client;
mod user;

pub use channel::Channel;
pub use client::Client;
pub use user::User;
