//! Per-connection handler: join, then relay frames both ways.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Receive `join` within the join timeout, or reply `error` and close
//!   2. Register with the game actor and arm the leave guard
//!   3. Loop: decode inbound frames for the actor, encode outbound
//!      messages for the socket

use std::sync::Arc;

use scribble_game::GameHandle;
use scribble_protocol::{
    ClientMessage, Codec, ParticipantId, ProtocolError, ServerMessage,
};
use scribble_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::ScribbleError;
use crate::server::ServerState;

/// Drop guard that removes the participant from the game when the handler
/// exits, however it exits. `Drop` is synchronous, so the leave is sent
/// from a spawned task.
struct LeaveGuard {
    participant_id: ParticipantId,
    game: GameHandle,
}

impl Drop for LeaveGuard {
    fn drop(&mut self) {
        let participant_id = self.participant_id;
        let game = self.game.clone();
        tokio::spawn(async move {
            let _ = game.leave(participant_id).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), ScribbleError> {
    let conn_id = conn.id();
    let participant_id = ParticipantId::from(conn_id);
    tracing::debug!(%conn_id, "handling new connection");

    let Some(name) = await_join(&conn, &state).await? else {
        tracing::debug!(%conn_id, "closed before joining");
        return Ok(());
    };

    let (tx, mut outbound) = mpsc::unbounded_channel();
    state.game.join(participant_id, name, tx).await?;
    let _guard = LeaveGuard {
        participant_id,
        game: state.game.clone(),
    };
    tracing::info!(%conn_id, %participant_id, "participant connected");

    loop {
        tokio::select! {
            inbound = conn.recv() => match inbound {
                Ok(Some(data)) => {
                    handle_frame(&conn, &state, participant_id, &data).await?;
                }
                Ok(None) => {
                    tracing::info!(%participant_id, "connection closed cleanly");
                    break;
                }
                Err(e) => {
                    tracing::debug!(%participant_id, error = %e, "recv error");
                    break;
                }
            },
            msg = outbound.recv() => match msg {
                Some(msg) => send_message(&conn, &state.codec, &msg).await?,
                None => {
                    tracing::info!(%participant_id, "game closed the connection");
                    let _ = conn.close().await;
                    break;
                }
            },
        }
    }

    // _guard drops here → leave is posted to the game.
    Ok(())
}

/// Waits for the first frame, which must be `join`. Returns the requested
/// name, or `None` if the client hung up first.
async fn await_join<C: Codec>(
    conn: &WebSocketConnection,
    state: &ServerState<C>,
) -> Result<Option<String>, ScribbleError> {
    let data = match tokio::time::timeout(state.join_timeout, conn.recv()).await
    {
        Ok(Ok(Some(data))) => data,
        Ok(Ok(None)) => return Ok(None),
        Ok(Err(e)) => return Err(e.into()),
        Err(_) => {
            reject(conn, &state.codec, "join timed out").await?;
            return Err(ProtocolError::InvalidMessage("join timed out".into()).into());
        }
    };

    match state.codec.decode::<ClientMessage>(&data) {
        Ok(ClientMessage::Join { name }) => Ok(Some(name)),
        _ => {
            reject(conn, &state.codec, "first message must be join").await?;
            Err(ProtocolError::InvalidMessage(
                "first message must be join".into(),
            )
            .into())
        }
    }
}

/// Forwards one inbound frame to the game. Frames that don't decode get an
/// `error` reply and are otherwise ignored.
async fn handle_frame<C: Codec>(
    conn: &WebSocketConnection,
    state: &ServerState<C>,
    participant_id: ParticipantId,
    data: &[u8],
) -> Result<(), ScribbleError> {
    match state.codec.decode::<ClientMessage>(data) {
        Ok(msg) => state.game.submit(participant_id, msg).await?,
        Err(e) => {
            tracing::debug!(%participant_id, error = %e, "undecodable frame");
            send_error(conn, &state.codec, 400, &format!("invalid message: {e}"))
                .await?;
        }
    }
    Ok(())
}

/// Sends an `error` (400) and closes the socket.
async fn reject(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    reason: &str,
) -> Result<(), ScribbleError> {
    send_error(conn, codec, 400, reason).await?;
    conn.close().await?;
    Ok(())
}

async fn send_error(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    code: u16,
    message: &str,
) -> Result<(), ScribbleError> {
    let msg = ServerMessage::Error {
        code,
        message: message.to_string(),
    };
    send_message(conn, codec, &msg).await
}

async fn send_message(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    msg: &ServerMessage,
) -> Result<(), ScribbleError> {
    let bytes = codec.encode(msg)?;
    conn.send(&bytes).await?;
    Ok(())
}
