//! One participant against the synthetic opponent, end to end.
//!
//! Run with `RUST_LOG=debug cargo run -p bot-match` to see the timers.

use std::time::Duration;

use gridforge::prelude::*;
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// A very naive participant
// ---------------------------------------------------------------------------

/// Walks the legal columns round-robin. Good enough to lose to the
/// synthetic opponent most of the time.
async fn play_turn(
    server: &GameServer,
    session_id: &SessionId,
    identity: &Identity,
    turn: &mut usize,
) -> Result<(), GridforgeError> {
    let snapshot = server.snapshot(session_id).await?;
    let legal: Vec<usize> = snapshot.board.legal_columns().collect();
    if legal.is_empty() {
        return Ok(());
    }

    let column = legal[*turn % legal.len()];
    *turn += 1;
    server.submit_move(session_id, identity, column).await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    gridforge::init_tracing();

    let (server, mut outbound) = GameServer::builder()
        .wait_window(Duration::from_millis(500))
        .synthetic_think_delay(Duration::from_millis(100))
        .build();

    let alice = Identity::new("alice");
    let (tx, mut rx) = mpsc::unbounded_channel();
    server.join(alice.clone(), Some(tx)).await?;
    tracing::info!(%alice, "waiting for an opponent");

    let mut turn = 0;
    while let Some(notification) = rx.recv().await {
        println!("{}", serde_json::to_string(&notification)?);

        match &notification.event {
            Event::SessionStarted { session_id, .. } => {
                play_turn(&server, session_id, &alice, &mut turn).await?;
            }
            Event::MoveApplied { session_id, by, .. } if *by != alice => {
                // The reply may have ended the game; SessionEnded follows.
                if let Err(err) = play_turn(&server, session_id, &alice, &mut turn).await {
                    tracing::debug!(code = err.code(), "no move played");
                }
            }
            Event::SessionEnded { .. } => break,
            _ => {}
        }
    }

    let archive = tokio::time::timeout(Duration::from_secs(1), async {
        while let Some(item) = outbound.recv().await {
            if let Outbound::Archive(record) = item {
                return Some(record);
            }
        }
        None
    })
    .await?;

    if let Some(record) = archive {
        println!("{}", render_archive(&record.final_board, &record.winner));
        println!("{}", serde_json::to_string_pretty(&record)?);
    }
    Ok(())
}

fn render_archive(board: &Grid, winner: &Option<Identity>) -> String {
    let outcome = match winner {
        Some(identity) => format!("winner: {identity}"),
        None => "draw".to_string(),
    };
    format!("{board}{outcome}")
}
