//! Requests, replies, notifications, and archive records.
//!
//! All enums use `#[serde(tag = "type")]` ("internally tagged"), so a
//! request looks like `{ "type": "submit_move", "session_id": "…", … }`
//! rather than `{ "SubmitMove": { … } }`.

use gridforge_rules::{Grid, Mark};
use serde::{Deserialize, Serialize};

use crate::{unix_millis, Identity, ProtocolError, ResultTag, SessionId, SessionSnapshot};

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// A synchronous request consumed by the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// "Find me an opponent."
    Join { identity: Identity },

    /// "Take me out of the wait queue."
    LeaveQueue { identity: Identity },

    /// "Drop my mark into this column."
    SubmitMove {
        session_id: SessionId,
        identity: Identity,
        column: usize,
    },

    /// "My connection dropped." Starts the grace window.
    Disconnect {
        session_id: SessionId,
        identity: Identity,
    },

    /// "I'm back." Must arrive before the grace deadline.
    Reconnect {
        session_id: SessionId,
        identity: Identity,
    },
}

impl Request {
    /// The identity this request acts on behalf of.
    pub fn identity(&self) -> &Identity {
        match self {
            Self::Join { identity }
            | Self::LeaveQueue { identity }
            | Self::SubmitMove { identity, .. }
            | Self::Disconnect { identity, .. }
            | Self::Reconnect { identity, .. } => identity,
        }
    }

    /// Checks rules that serde can't express.
    ///
    /// # Errors
    /// [`ProtocolError::InvalidMessage`] for an empty identity.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.identity().as_str().trim().is_empty() {
            return Err(ProtocolError::InvalidMessage(
                "identity must not be empty".into(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Reply
// ---------------------------------------------------------------------------

/// The synchronous result of a [`Request`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reply {
    /// Join: no opponent waiting; the wait window has started.
    Queued,

    /// Join: paired immediately with a waiting participant.
    Paired {
        session_id: SessionId,
        opponent: Identity,
    },

    /// LeaveQueue succeeded.
    LeftQueue,

    /// SubmitMove: legal, non-terminal move.
    MoveAccepted { landing_row: usize, turn: Mark },

    /// SubmitMove: the move ended the game.
    GameOver {
        landing_row: usize,
        result: ResultTag,
        winner: Option<Identity>,
    },

    /// Disconnect acknowledged; the grace window is running.
    Acknowledged,

    /// Reconnect succeeded; full state for restoration.
    Snapshot { snapshot: SessionSnapshot },

    /// The request failed. `code` is a stable machine-readable string
    /// such as `"COLUMN_FULL"`.
    Error { code: String, message: String },
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// Something that happened inside the core, for external delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SessionStarted {
        session_id: SessionId,
        /// Seat A first, seat B second.
        participants: [Identity; 2],
        synthetic_opponent: bool,
    },

    MoveApplied {
        session_id: SessionId,
        column: usize,
        row: usize,
        mark: Mark,
        by: Identity,
    },

    SessionEnded {
        session_id: SessionId,
        result: ResultTag,
        winner: Option<Identity>,
        duration_ms: u64,
        move_count: usize,
    },

    ParticipantDropped {
        session_id: SessionId,
        identity: Identity,
    },

    ParticipantReconnected {
        session_id: SessionId,
        identity: Identity,
    },
}

impl Event {
    /// The session this event belongs to.
    pub fn session_id(&self) -> &SessionId {
        match self {
            Self::SessionStarted { session_id, .. }
            | Self::MoveApplied { session_id, .. }
            | Self::SessionEnded { session_id, .. }
            | Self::ParticipantDropped { session_id, .. }
            | Self::ParticipantReconnected { session_id, .. } => session_id,
        }
    }
}

/// A timestamped [`Event`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
    pub event: Event,
}

impl Notification {
    /// Stamps `event` with the current wall-clock time.
    pub fn now(event: Event) -> Self {
        Self {
            timestamp_ms: unix_millis(),
            event,
        }
    }
}

// ---------------------------------------------------------------------------
// ArchiveRecord
// ---------------------------------------------------------------------------

/// The record handed to the persistence collaborator when a session ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveRecord {
    pub session_id: SessionId,
    /// Seat A first, seat B second.
    pub participants: [Identity; 2],
    /// `true` if seat B was the synthetic opponent.
    pub synthetic_opponent: bool,
    pub result: ResultTag,
    pub winner: Option<Identity>,
    pub duration_ms: u64,
    pub move_count: usize,
    pub final_board: Grid,
    pub started_at_ms: u64,
    pub ended_at_ms: u64,
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The JSON shapes here are what external collaborators parse, so we
    //! pin the tag names and field names.

    use super::*;

    #[test]
    fn test_request_submit_move_json_format() {
        let req = Request::SubmitMove {
            session_id: SessionId::new("abc"),
            identity: Identity::new("alice"),
            column: 3,
        };
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json["type"], "submit_move");
        assert_eq!(json["session_id"], "abc");
        assert_eq!(json["identity"], "alice");
        assert_eq!(json["column"], 3);
    }

    #[test]
    fn test_request_parses_from_client_json() {
        let raw = r#"{"type":"reconnect","session_id":"s9","identity":"bob"}"#;
        let req: Request = serde_json::from_str(raw).unwrap();

        assert_eq!(
            req,
            Request::Reconnect {
                session_id: SessionId::new("s9"),
                identity: Identity::new("bob"),
            }
        );
    }

    #[test]
    fn test_request_unknown_type_fails_to_parse() {
        let raw = r#"{"type":"resign","identity":"bob"}"#;
        assert!(serde_json::from_str::<Request>(raw).is_err());
    }

    #[test]
    fn test_request_validate_rejects_blank_identity() {
        let req = Request::Join { identity: Identity::new("  ") };
        assert!(matches!(req.validate(), Err(ProtocolError::InvalidMessage(_))));

        let ok = Request::Join { identity: Identity::new("carol") };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_reply_error_json_format() {
        let reply = Reply::Error {
            code: "COLUMN_FULL".into(),
            message: "column 2 is full".into(),
        };
        let json = serde_json::to_value(&reply).unwrap();

        assert_eq!(json["type"], "error");
        assert_eq!(json["code"], "COLUMN_FULL");
    }

    #[test]
    fn test_reply_game_over_without_winner_is_null() {
        let reply = Reply::GameOver {
            landing_row: 0,
            result: ResultTag::Draw,
            winner: None,
        };
        let json = serde_json::to_value(&reply).unwrap();

        assert_eq!(json["type"], "game_over");
        assert_eq!(json["result"], "draw");
        assert!(json["winner"].is_null());
    }

    #[test]
    fn test_notification_nests_tagged_event() {
        let n = Notification {
            timestamp_ms: 1234,
            event: Event::ParticipantDropped {
                session_id: SessionId::new("s1"),
                identity: Identity::new("alice"),
            },
        };
        let json = serde_json::to_value(&n).unwrap();

        assert_eq!(json["timestamp_ms"], 1234);
        assert_eq!(json["event"]["type"], "participant_dropped");
        assert_eq!(json["event"]["identity"], "alice");
    }

    #[test]
    fn test_event_session_id_accessor() {
        let event = Event::MoveApplied {
            session_id: SessionId::new("s2"),
            column: 1,
            row: 5,
            mark: Mark::B,
            by: Identity::synthetic(),
        };
        assert_eq!(event.session_id(), &SessionId::new("s2"));
    }

    #[test]
    fn test_archive_record_round_trip() {
        let record = ArchiveRecord {
            session_id: SessionId::new("s3"),
            participants: [Identity::new("alice"), Identity::synthetic()],
            synthetic_opponent: true,
            result: ResultTag::Forfeit,
            winner: Some(Identity::synthetic()),
            duration_ms: 31_000,
            move_count: 4,
            final_board: Grid::default(),
            started_at_ms: 1_000,
            ended_at_ms: 32_000,
        };
        let bytes = serde_json::to_vec(&record).unwrap();
        let decoded: ArchiveRecord = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(record, decoded);
    }
}
