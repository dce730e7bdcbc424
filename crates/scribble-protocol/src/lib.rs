//! Wire protocol for Scribble.
//!
//! This crate defines what participants and the server say to each other:
//!
//! - **Types** ([`ClientMessage`], [`ServerMessage`], [`Recipient`], etc.) —
//!   the messages that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages
//!   are converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes) → Protocol (ClientMessage) → Game (round engine)
//! Game (ServerMessage, Recipient) → Protocol (bytes) → Transport
//! ```
//!
//! The protocol layer does not know who the painter is or what the secret
//! word is. It only knows the shapes of the messages.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientMessage, ParticipantId, RankedEntry, Recipient, RosterEntry,
    ServerMessage, StrokePoint, StrokeStyle, SYSTEM_USER,
};
