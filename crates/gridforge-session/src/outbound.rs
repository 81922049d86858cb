//! Channels carrying notifications and archive records out of the core.

use gridforge_protocol::{ArchiveRecord, Notification};
use tokio::sync::mpsc;

/// Something the core hands to an external collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// A timestamped event for the analytics stream.
    Notify(Notification),
    /// A finished session for the persistence collaborator.
    Archive(ArchiveRecord),
}

/// Sender half of the global outbound stream.
pub type OutboundSender = mpsc::UnboundedSender<Outbound>;

/// Receiver half of the global outbound stream.
pub type OutboundReceiver = mpsc::UnboundedReceiver<Outbound>;

/// Per-participant channel for notifications about their session.
pub type PlayerSender = mpsc::UnboundedSender<Notification>;
