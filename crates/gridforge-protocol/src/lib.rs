//! Message schemas for Gridforge.
//!
//! This crate defines the "language" the core speaks with its external
//! collaborators:
//!
//! - **Identity types** ([`Identity`], [`SessionId`]): who is playing,
//!   and in which session.
//! - **Requests / replies** ([`Request`], [`Reply`]): the synchronous
//!   operations (join, submit move, disconnect, reconnect) and their results.
//! - **Notifications** ([`Notification`], [`Event`]): timestamped events
//!   pushed to participants and to the analytics stream.
//! - **Archive records** ([`ArchiveRecord`]): what the persistence
//!   collaborator receives when a session terminates.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages are
//!   converted to/from bytes.
//!
//! Every message is an explicit tagged enum or struct; no loosely-shaped
//! payloads.
//!
//! ```text
//! Transport (external) → Protocol (Request/Reply) → Matchmaking / Session
//! ```

mod codec;
mod error;
mod messages;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use messages::{ArchiveRecord, Event, Notification, Reply, Request};
pub use types::{
    unix_millis, Identity, ParticipantInfo, ResultTag, SessionId,
    SessionSnapshot, SessionStatus,
};
