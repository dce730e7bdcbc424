//! Game actor: one Tokio task that owns the [`RoundEngine`].
//!
//! Every mutation reaches the engine as a [`GameCommand`] on a single mpsc
//! channel, so joins, leaves, guesses, strokes, word refreshes and deferred
//! round starts are applied one after another and never interleave.

use std::collections::HashMap;

use scribble_protocol::{
    ClientMessage, ParticipantId, Recipient, RosterEntry, ServerMessage,
};
use scribble_words::{RefreshOutcome, WordBank};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::engine::{DeferredStart, Dispatch, InboundEvent, RoundEngine};
use crate::{GameConfig, GameError};

/// Command channel capacity. Senders wait when it is full.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Delivers server messages to one participant's connection handler.
pub type ParticipantSender = mpsc::UnboundedSender<ServerMessage>;

pub(crate) enum GameCommand {
    Join {
        id: ParticipantId,
        name: String,
        sender: ParticipantSender,
        reply: oneshot::Sender<Result<(), GameError>>,
    },
    Leave {
        id: ParticipantId,
    },
    Message {
        id: ParticipantId,
        msg: ClientMessage,
    },
    RefreshWords {
        raw: String,
    },
    /// Posted by the timer behind a [`DeferredStart`].
    DeferredStart {
        epoch: u64,
    },
    Snapshot {
        reply: oneshot::Sender<GameSnapshot>,
    },
    Shutdown,
}

/// A read-only view of the game, for tests and diagnostics.
#[derive(Debug, Clone)]
pub struct GameSnapshot {
    /// [`Phase::name`](crate::Phase::name) of the current phase.
    pub phase: &'static str,
    pub painter: Option<ParticipantId>,
    /// Participants in turn order.
    pub roster: Vec<RosterEntry>,
    /// Size of the current vocabulary.
    pub words: usize,
    /// `false` while still on the built-in vocabulary.
    pub words_from_source: bool,
}

/// Handle to the running game actor. Cheap to clone.
#[derive(Clone)]
pub struct GameHandle {
    sender: mpsc::Sender<GameCommand>,
}

impl GameHandle {
    /// Adds a participant. Their messages, starting with `welcome`, arrive
    /// on `sender`.
    ///
    /// # Errors
    /// [`GameError::AlreadyJoined`] if `id` is already in the game,
    /// [`GameError::Unavailable`] if the actor has stopped.
    pub async fn join(
        &self,
        id: ParticipantId,
        name: impl Into<String>,
        sender: ParticipantSender,
    ) -> Result<(), GameError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(GameCommand::Join {
            id,
            name: name.into(),
            sender,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| GameError::Unavailable)?
    }

    /// Removes a participant. Unknown ids are ignored by the actor.
    pub async fn leave(&self, id: ParticipantId) -> Result<(), GameError> {
        self.send(GameCommand::Leave { id }).await
    }

    /// Delivers a client frame from `id` (fire-and-forget). A repeated
    /// `join` is ignored.
    pub async fn submit(
        &self,
        id: ParticipantId,
        msg: ClientMessage,
    ) -> Result<(), GameError> {
        self.send(GameCommand::Message { id, msg }).await
    }

    /// Hands a fetched word list to the actor, which applies it between
    /// events.
    pub async fn refresh_words(
        &self,
        raw: impl Into<String>,
    ) -> Result<(), GameError> {
        self.send(GameCommand::RefreshWords { raw: raw.into() }).await
    }

    pub async fn snapshot(&self) -> Result<GameSnapshot, GameError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(GameCommand::Snapshot { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| GameError::Unavailable)
    }

    /// Stops the actor. Every participant channel is closed.
    pub async fn shutdown(&self) -> Result<(), GameError> {
        self.send(GameCommand::Shutdown).await
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    async fn send(&self, cmd: GameCommand) -> Result<(), GameError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| GameError::Unavailable)
    }
}

struct GameActor {
    engine: RoundEngine,
    senders: HashMap<ParticipantId, ParticipantSender>,
    receiver: mpsc::Receiver<GameCommand>,
    /// Lets deferred-start timers post back without keeping the actor
    /// alive after every handle is gone.
    timer_sender: mpsc::WeakSender<GameCommand>,
}

impl GameActor {
    async fn run(mut self) {
        info!("game actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                GameCommand::Join {
                    id,
                    name,
                    sender,
                    reply,
                } => {
                    let result = self.handle_join(id, name, sender);
                    let _ = reply.send(result);
                }
                GameCommand::Leave { id } => self.handle_leave(id),
                GameCommand::Message { id, msg } => self.handle_message(id, msg),
                GameCommand::RefreshWords { raw } => self.handle_refresh(&raw),
                GameCommand::DeferredStart { epoch } => {
                    let out = self.engine.fire_deferred(epoch);
                    self.dispatch(out);
                }
                GameCommand::Snapshot { reply } => {
                    let _ = reply.send(self.snapshot());
                }
                GameCommand::Shutdown => {
                    info!("game shutting down");
                    break;
                }
            }
        }

        info!("game actor stopped");
    }

    fn handle_join(
        &mut self,
        id: ParticipantId,
        name: String,
        sender: ParticipantSender,
    ) -> Result<(), GameError> {
        if self.senders.contains_key(&id) {
            return Err(GameError::AlreadyJoined(id));
        }
        self.senders.insert(id, sender);
        let out = self.engine.handle(InboundEvent::Join { id, name });
        self.dispatch(out);
        Ok(())
    }

    fn handle_leave(&mut self, id: ParticipantId) {
        if self.senders.remove(&id).is_none() {
            return;
        }
        let out = self.engine.handle(InboundEvent::Leave { id });
        self.dispatch(out);
    }

    fn handle_message(&mut self, id: ParticipantId, msg: ClientMessage) {
        if !self.senders.contains_key(&id) {
            debug!(participant_id = %id, "message from non-member, ignoring");
            return;
        }
        if matches!(msg, ClientMessage::Join { .. }) {
            debug!(participant_id = %id, "repeated join ignored");
            return;
        }
        let out = self.engine.handle(InboundEvent::from_client(id, msg));
        self.dispatch(out);
    }

    fn handle_refresh(&mut self, raw: &str) {
        match self.engine.refresh_words(raw) {
            Ok(RefreshOutcome::Replaced { words }) => {
                debug!(words, "applied refreshed word list");
            }
            Ok(RefreshOutcome::Unchanged) => {}
            Err(e) => {
                warn!(error = %e, "refreshed word list rejected, keeping current words");
            }
        }
    }

    /// Fans messages out in turn order and arms any deferred start.
    fn dispatch(&self, out: Dispatch) {
        for (recipient, msg) in out.messages {
            match recipient {
                Recipient::Participant(id) => self.send_to(id, msg),
                Recipient::All | Recipient::AllExcept(_) => {
                    for id in self.engine.roster().ids() {
                        if recipient.includes(*id) {
                            self.send_to(*id, msg.clone());
                        }
                    }
                }
            }
        }
        if let Some(deferred) = out.deferred {
            self.schedule(deferred);
        }
    }

    /// Drops silently if the participant's handler is gone; its leave is
    /// already on the way.
    fn send_to(&self, id: ParticipantId, msg: ServerMessage) {
        if let Some(sender) = self.senders.get(&id) {
            let _ = sender.send(msg);
        }
    }

    fn schedule(&self, deferred: DeferredStart) {
        let weak = self.timer_sender.clone();
        debug!(
            epoch = deferred.epoch,
            delay_ms = deferred.delay.as_millis() as u64,
            "next round scheduled"
        );
        tokio::spawn(async move {
            tokio::time::sleep(deferred.delay).await;
            if let Some(tx) = weak.upgrade() {
                let _ = tx
                    .send(GameCommand::DeferredStart {
                        epoch: deferred.epoch,
                    })
                    .await;
            }
        });
    }

    fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            phase: self.engine.phase().name(),
            painter: self.engine.painter(),
            roster: self.engine.roster().snapshot(),
            words: self.engine.words().words().len(),
            words_from_source: self.engine.words().is_from_source(),
        }
    }
}

/// Spawns the game actor and returns a handle to it.
///
/// The actor runs until [`GameHandle::shutdown`] or until every handle has
/// been dropped.
pub fn spawn_game(config: GameConfig, words: WordBank) -> GameHandle {
    let (tx, rx) = mpsc::channel(DEFAULT_CHANNEL_SIZE);

    let actor = GameActor {
        engine: RoundEngine::new(config, words),
        senders: HashMap::new(),
        receiver: rx,
        timer_sender: tx.downgrade(),
    };

    tokio::spawn(actor.run());

    GameHandle { sender: tx }
}
