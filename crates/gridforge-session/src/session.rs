//! Session actor: an isolated Tokio task that owns one game.
//!
//! The actor owns the board, both seats and every timer guarding them.
//! Timers never touch that state directly; they send a command carrying
//! their [`TimerId`] back through the actor's channel, and the actor drops
//! it if the id no longer matches what it holds.

use gridforge_protocol::{
    unix_millis, ArchiveRecord, Event, Identity, Notification, ResultTag, SessionId,
    SessionSnapshot, SessionStatus,
};
use gridforge_rules::{choose_column, Board, Mark, Terminal};
use gridforge_timer::{TimerHandle, TimerId};
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::participant::{Connectivity, Seat};
use crate::registry::WeakRegistry;
use crate::{LifecycleConfig, Outbound, OutboundSender, PlayerSender, SessionError};

/// The result of an accepted move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The game goes on; `turn` is the mark to move next.
    Continue { landing_row: usize, turn: Mark },

    /// The move ended the game (win or draw).
    Finished {
        landing_row: usize,
        result: ResultTag,
        winner: Option<Identity>,
    },
}

/// Commands sent to a session actor through its channel.
pub(crate) enum SessionCommand {
    SubmitMove {
        identity: Identity,
        column: usize,
        reply: oneshot::Sender<Result<MoveOutcome, SessionError>>,
    },

    Disconnect {
        identity: Identity,
        reply: oneshot::Sender<Result<(), SessionError>>,
    },

    Reconnect {
        identity: Identity,
        sender: Option<PlayerSender>,
        reply: oneshot::Sender<Result<SessionSnapshot, SessionError>>,
    },

    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },

    /// Delivered by a participant's grace timer.
    GraceExpired { identity: Identity, timer: TimerId },

    /// Delivered by the synthetic opponent's think timer.
    SyntheticMove { timer: TimerId },
}

/// Handle to a running session actor.
///
/// Cheap to clone. Once the session has ended the actor stops, and every
/// call returns [`SessionError::SessionNotFound`].
#[derive(Clone)]
pub struct SessionHandle {
    session_id: SessionId,
    sender: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    /// The session's id.
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// `true` once the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Submits `identity`'s move into `column`.
    pub async fn submit_move(
        &self,
        identity: Identity,
        column: usize,
    ) -> Result<MoveOutcome, SessionError> {
        self.request(|reply| SessionCommand::SubmitMove {
            identity,
            column,
            reply,
        })
        .await?
    }

    /// Reports that `identity`'s connection dropped.
    pub async fn disconnect(&self, identity: Identity) -> Result<(), SessionError> {
        self.request(|reply| SessionCommand::Disconnect { identity, reply })
            .await?
    }

    /// Resumes `identity` and returns the full session state.
    pub async fn reconnect(
        &self,
        identity: Identity,
        sender: Option<PlayerSender>,
    ) -> Result<SessionSnapshot, SessionError> {
        self.request(|reply| SessionCommand::Reconnect {
            identity,
            sender,
            reply,
        })
        .await?
    }

    /// Reads the current session state.
    pub async fn snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        self.request(|reply| SessionCommand::Snapshot { reply }).await
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> SessionCommand,
    ) -> Result<T, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(command(reply_tx))
            .await
            .map_err(|_| SessionError::SessionNotFound(self.session_id.clone()))?;
        reply_rx
            .await
            .map_err(|_| SessionError::SessionNotFound(self.session_id.clone()))
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("session_id", &self.session_id)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Index of the seat playing `mark`. Seat A is always index 0.
fn seat_index(mark: Mark) -> usize {
    match mark {
        Mark::A => 0,
        Mark::B => 1,
    }
}

/// The internal session actor state. Runs inside a Tokio task.
struct SessionActor {
    session_id: SessionId,
    seats: [Seat; 2],
    board: Board,
    turn: Mark,
    status: SessionStatus,
    /// Pending synthetic reply, if the synthetic opponent is "thinking".
    synthetic_timer: Option<TimerHandle>,
    config: LifecycleConfig,
    started_at: Instant,
    started_at_ms: u64,
    receiver: mpsc::Receiver<SessionCommand>,
    /// Weak so that timers don't keep the channel open after the
    /// registry lets go of the session.
    commands: mpsc::WeakSender<SessionCommand>,
    registry: WeakRegistry,
    outbound: OutboundSender,
}

impl SessionActor {
    /// Runs the actor loop until the session ends or the registry that
    /// owns it is dropped.
    async fn run(mut self) {
        info!(session_id = %self.session_id, "session actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                SessionCommand::SubmitMove {
                    identity,
                    column,
                    reply,
                } => {
                    let result = self.handle_move(identity, column).await;
                    let _ = reply.send(result);
                }
                SessionCommand::Disconnect { identity, reply } => {
                    let result = self.handle_disconnect(identity);
                    let _ = reply.send(result);
                }
                SessionCommand::Reconnect {
                    identity,
                    sender,
                    reply,
                } => {
                    let result = self.handle_reconnect(identity, sender).await;
                    let _ = reply.send(result);
                }
                SessionCommand::Snapshot { reply } => {
                    let _ = reply.send(self.snapshot());
                }
                SessionCommand::GraceExpired { identity, timer } => {
                    self.handle_grace_expired(identity, timer).await;
                }
                SessionCommand::SyntheticMove { timer } => {
                    self.handle_synthetic_move(timer).await;
                }
            }

            if self.status == SessionStatus::Ended {
                break;
            }
        }

        if self.status != SessionStatus::Ended {
            self.cancel_timers();
            warn!(session_id = %self.session_id, "registry dropped, session abandoned");
        }
        info!(session_id = %self.session_id, "session actor stopped");
    }

    // -- Commands ---------------------------------------------------------

    async fn handle_move(
        &mut self,
        identity: Identity,
        column: usize,
    ) -> Result<MoveOutcome, SessionError> {
        let idx = self.human_seat(&identity)?;
        if self.seats[idx].mark != self.turn {
            debug!(
                session_id = %self.session_id,
                %identity,
                column,
                awaiting_synthetic = self.synthetic_timer.is_some(),
                "move rejected: not your turn"
            );
            return Err(SessionError::NotYourTurn);
        }

        self.play(idx, column).await.inspect_err(|err| {
            debug!(
                session_id = %self.session_id,
                %identity,
                column,
                error = %err,
                "move rejected"
            );
        })
    }

    fn handle_disconnect(&mut self, identity: Identity) -> Result<(), SessionError> {
        let idx = self.human_seat(&identity)?;
        if !self.seats[idx].is_connected() {
            debug!(
                session_id = %self.session_id,
                %identity,
                "already disconnected, keeping original deadline"
            );
            return Ok(());
        }

        let commands = self.commands.clone();
        let expiring = identity.clone();
        let timer = gridforge_timer::schedule(self.config.grace_window, move |timer| async move {
            if let Some(tx) = commands.upgrade() {
                let _ = tx
                    .send(SessionCommand::GraceExpired {
                        identity: expiring,
                        timer,
                    })
                    .await;
            }
        });

        let deadline = timer.deadline();
        let seat = &mut self.seats[idx];
        seat.connectivity = Connectivity::Disconnected { deadline, timer };
        seat.sender = None;

        info!(
            session_id = %self.session_id,
            %identity,
            grace_ms = self.config.grace_window.as_millis() as u64,
            "participant dropped, grace window started"
        );
        self.emit(Event::ParticipantDropped {
            session_id: self.session_id.clone(),
            identity,
        });
        Ok(())
    }

    async fn handle_reconnect(
        &mut self,
        identity: Identity,
        sender: Option<PlayerSender>,
    ) -> Result<SessionSnapshot, SessionError> {
        let idx = self.human_seat(&identity)?;

        if self.seats[idx].is_connected() {
            if sender.is_some() {
                self.seats[idx].sender = sender;
            }
            debug!(
                session_id = %self.session_id,
                %identity,
                "reconnect while connected"
            );
            return Ok(self.snapshot());
        }

        // Deadline is judged now, not when the timer task gets polled.
        let expired = match &self.seats[idx].connectivity {
            Connectivity::Disconnected { deadline, .. } => Instant::now() >= *deadline,
            _ => true,
        };
        if expired {
            self.forfeit(idx).await;
            return Err(SessionError::GraceWindowExpired {
                identity,
                session_id: self.session_id.clone(),
            });
        }

        self.seats[idx].cancel_timer();
        let seat = &mut self.seats[idx];
        seat.connectivity = Connectivity::Connected;
        seat.sender = sender;

        info!(session_id = %self.session_id, %identity, "participant reconnected");
        self.emit(Event::ParticipantReconnected {
            session_id: self.session_id.clone(),
            identity,
        });
        Ok(self.snapshot())
    }

    async fn handle_grace_expired(&mut self, identity: Identity, timer: TimerId) {
        let Some(idx) = self
            .seats
            .iter()
            .position(|seat| seat.identity == identity && !seat.synthetic)
        else {
            return;
        };

        let current = matches!(
            &self.seats[idx].connectivity,
            Connectivity::Disconnected { timer: held, .. } if held.id() == timer
        );
        if current {
            self.forfeit(idx).await;
        } else {
            debug!(session_id = %self.session_id, %identity, %timer, "stale grace timer ignored");
        }
    }

    async fn handle_synthetic_move(&mut self, timer: TimerId) {
        if !matches!(&self.synthetic_timer, Some(held) if held.id() == timer) {
            debug!(session_id = %self.session_id, %timer, "stale think timer ignored");
            return;
        }
        self.synthetic_timer = None;

        let idx = seat_index(self.turn);
        if !self.seats[idx].synthetic {
            return;
        }

        let Some(column) = choose_column(&self.board, self.turn) else {
            warn!(session_id = %self.session_id, "synthetic opponent has no legal column");
            return;
        };

        if let Err(err) = self.play(idx, column).await {
            warn!(
                session_id = %self.session_id,
                column,
                error = %err,
                "synthetic move rejected"
            );
        }
    }

    // -- Game flow --------------------------------------------------------

    /// Applies a move for the seat at `idx`. Legality, mutation, win/draw
    /// check and turn switch happen here as one step.
    async fn play(&mut self, idx: usize, column: usize) -> Result<MoveOutcome, SessionError> {
        let mark = self.seats[idx].mark;
        let placement = self.board.apply_move(column, mark)?;
        let by = self.seats[idx].identity.clone();

        trace!(
            session_id = %self.session_id,
            %by,
            column,
            row = placement.row,
            seq = self.board.move_count(),
            "move applied"
        );
        self.emit(Event::MoveApplied {
            session_id: self.session_id.clone(),
            column,
            row: placement.row,
            mark,
            by: by.clone(),
        });

        let landing_row = placement.row;
        match placement.terminal {
            Some(Terminal::Win) => {
                self.finish(ResultTag::Win, Some(by.clone()), None).await;
                Ok(MoveOutcome::Finished {
                    landing_row,
                    result: ResultTag::Win,
                    winner: Some(by),
                })
            }
            Some(Terminal::Draw) => {
                self.finish(ResultTag::Draw, None, None).await;
                Ok(MoveOutcome::Finished {
                    landing_row,
                    result: ResultTag::Draw,
                    winner: None,
                })
            }
            None => {
                self.turn = mark.other();
                if self.seats[seat_index(self.turn)].synthetic {
                    self.schedule_synthetic();
                }
                Ok(MoveOutcome::Continue {
                    landing_row,
                    turn: self.turn,
                })
            }
        }
    }

    fn schedule_synthetic(&mut self) {
        let commands = self.commands.clone();
        let timer = gridforge_timer::schedule(
            self.config.synthetic_think_delay,
            move |timer| async move {
                if let Some(tx) = commands.upgrade() {
                    let _ = tx.send(SessionCommand::SyntheticMove { timer }).await;
                }
            },
        );
        self.synthetic_timer = Some(timer);
    }

    /// Ends the session with the other seat as winner. Runs at most once.
    async fn forfeit(&mut self, idx: usize) {
        if self.status == SessionStatus::Ended {
            return;
        }
        self.seats[idx].cancel_timer();
        self.seats[idx].connectivity = Connectivity::Forfeited;

        let loser = self.seats[idx].identity.clone();
        let winner = self.seats[1 - idx].identity.clone();
        info!(
            session_id = %self.session_id,
            %loser,
            %winner,
            "grace window expired, session forfeited"
        );
        self.finish(ResultTag::Forfeit, Some(winner), Some(loser)).await;
    }

    async fn finish(
        &mut self,
        result: ResultTag,
        winner: Option<Identity>,
        forfeiter: Option<Identity>,
    ) {
        self.status = SessionStatus::Ended;
        self.cancel_timers();

        let duration_ms = self.started_at.elapsed().as_millis() as u64;
        let move_count = self.board.move_count();
        let participants = self.participants();

        info!(
            session_id = %self.session_id,
            %result,
            winner = winner.as_ref().map(Identity::as_str).unwrap_or("-"),
            duration_ms,
            move_count,
            "session ended"
        );
        self.emit(Event::SessionEnded {
            session_id: self.session_id.clone(),
            result,
            winner: winner.clone(),
            duration_ms,
            move_count,
        });

        let record = ArchiveRecord {
            session_id: self.session_id.clone(),
            participants: participants.clone(),
            synthetic_opponent: self.seats.iter().any(|seat| seat.synthetic),
            result,
            winner,
            duration_ms,
            move_count,
            final_board: *self.board.grid(),
            started_at_ms: self.started_at_ms,
            ended_at_ms: unix_millis(),
        };
        if self.outbound.send(Outbound::Archive(record)).is_err() {
            warn!(session_id = %self.session_id, "outbound stream closed, archive record dropped");
        }

        if let Some(registry) = self.registry.upgrade() {
            registry
                .retire(&self.session_id, &participants, forfeiter)
                .await;
        }
    }

    fn cancel_timers(&mut self) {
        if let Some(timer) = self.synthetic_timer.take() {
            timer.cancel();
        }
        for seat in &self.seats {
            seat.cancel_timer();
        }
    }

    // -- Helpers ----------------------------------------------------------

    /// Finds the human seat for `identity`. The synthetic opponent only
    /// moves through its own timer.
    fn human_seat(&self, identity: &Identity) -> Result<usize, SessionError> {
        self.seats
            .iter()
            .position(|seat| &seat.identity == identity && !seat.synthetic)
            .ok_or_else(|| SessionError::IdentityMismatch {
                identity: identity.clone(),
                session_id: self.session_id.clone(),
            })
    }

    fn participants(&self) -> [Identity; 2] {
        [self.seats[0].identity.clone(), self.seats[1].identity.clone()]
    }

    /// Sends an event to both participants and the outbound stream.
    fn emit(&self, event: Event) {
        let notification = Notification::now(event);
        for seat in &self.seats {
            seat.deliver(&notification);
        }
        if self.outbound.send(Outbound::Notify(notification)).is_err() {
            warn!(session_id = %self.session_id, "outbound stream closed, notification dropped");
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id.clone(),
            participants: [self.seats[0].info(), self.seats[1].info()],
            board: self.board.clone(),
            turn: self.turn,
            status: self.status,
            awaiting_synthetic: self.synthetic_timer.is_some(),
        }
    }
}

/// Spawns a session actor and returns a handle to it.
///
/// `SessionStarted` is emitted before the task starts, so it precedes
/// every other event of the session.
pub(crate) fn spawn_session(
    session_id: SessionId,
    seats: [Seat; 2],
    config: LifecycleConfig,
    registry: WeakRegistry,
    outbound: OutboundSender,
) -> SessionHandle {
    let (tx, rx) = mpsc::channel(config.command_channel_size);

    let actor = SessionActor {
        session_id: session_id.clone(),
        seats,
        board: Board::new(),
        turn: Mark::A,
        status: SessionStatus::InProgress,
        synthetic_timer: None,
        config,
        started_at: Instant::now(),
        started_at_ms: unix_millis(),
        receiver: rx,
        commands: tx.downgrade(),
        registry,
        outbound,
    };

    actor.emit(Event::SessionStarted {
        session_id: session_id.clone(),
        participants: actor.participants(),
        synthetic_opponent: actor.seats.iter().any(|seat| seat.synthetic),
    });

    tokio::spawn(actor.run());

    SessionHandle {
        session_id,
        sender: tx,
    }
}
