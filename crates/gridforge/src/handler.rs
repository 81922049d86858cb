//! Request dispatch: maps the tagged [`Request`] schema onto the
//! [`GameServer`] operations and their results onto [`Reply`].
//!
//! Requests handled here carry no participant channel; transports that
//! push notifications per participant call [`GameServer::join`] and
//! [`GameServer::reconnect`] directly.

use gridforge_matchmaking::JoinOutcome;
use gridforge_protocol::{Codec, Reply, Request};
use gridforge_session::MoveOutcome;

use crate::{GameServer, GridforgeError};

impl GameServer {
    /// Executes one request. Failures become [`Reply::Error`].
    pub async fn handle(&self, request: Request) -> Reply {
        match self.dispatch(request).await {
            Ok(reply) => reply,
            Err(err) => {
                tracing::debug!(code = err.code(), error = %err, "request failed");
                error_reply(&err)
            }
        }
    }

    /// Decodes a request with `codec`, executes it, and encodes the reply.
    ///
    /// Undecodable input yields an encoded `PROTOCOL` error reply.
    ///
    /// # Errors
    /// Only if the reply itself can't be encoded.
    pub async fn handle_encoded<C: Codec>(
        &self,
        codec: &C,
        data: &[u8],
    ) -> Result<Vec<u8>, GridforgeError> {
        let reply = match codec.decode::<Request>(data) {
            Ok(request) => self.handle(request).await,
            Err(err) => {
                tracing::debug!(error = %err, "failed to decode request");
                error_reply(&GridforgeError::from(err))
            }
        };
        Ok(codec.encode(&reply)?)
    }

    async fn dispatch(&self, request: Request) -> Result<Reply, GridforgeError> {
        request.validate()?;

        match request {
            Request::Join { identity } => {
                let reply = match self.join(identity, None).await? {
                    JoinOutcome::Queued => Reply::Queued,
                    JoinOutcome::Paired {
                        session_id,
                        opponent,
                    } => Reply::Paired {
                        session_id,
                        opponent,
                    },
                };
                Ok(reply)
            }
            Request::LeaveQueue { identity } => {
                self.leave_queue(&identity).await?;
                Ok(Reply::LeftQueue)
            }
            Request::SubmitMove {
                session_id,
                identity,
                column,
            } => {
                let reply = match self.submit_move(&session_id, &identity, column).await? {
                    MoveOutcome::Continue { landing_row, turn } => {
                        Reply::MoveAccepted { landing_row, turn }
                    }
                    MoveOutcome::Finished {
                        landing_row,
                        result,
                        winner,
                    } => Reply::GameOver {
                        landing_row,
                        result,
                        winner,
                    },
                };
                Ok(reply)
            }
            Request::Disconnect {
                session_id,
                identity,
            } => {
                self.disconnect(&session_id, &identity).await?;
                Ok(Reply::Acknowledged)
            }
            Request::Reconnect {
                session_id,
                identity,
            } => {
                let snapshot = self.reconnect(&session_id, &identity, None).await?;
                Ok(Reply::Snapshot { snapshot })
            }
        }
    }
}

fn error_reply(err: &GridforgeError) -> Reply {
    Reply::Error {
        code: err.code().to_string(),
        message: err.to_string(),
    }
}
