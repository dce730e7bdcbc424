//! The round state machine.
//!
//! [`RoundEngine`] is synchronous and owns no channels. Every inbound event
//! goes through [`RoundEngine::handle`], which mutates the roster, bank and
//! phase and returns the messages to send. The game actor does the
//! delivery and the timers, so everything here can be tested without a
//! runtime.

use std::time::Duration;

use scribble_protocol::{
    ClientMessage, ParticipantId, Recipient, SYSTEM_USER, ServerMessage,
    StrokePoint, StrokeStyle,
};
use scribble_words::{RefreshOutcome, WordBank, WordsError};
use tracing::{debug, info};

use crate::config::{GameConfig, Phase, Round, Scoreboard};
use crate::roster::Roster;

// ---------------------------------------------------------------------------
// Events in, dispatch out
// ---------------------------------------------------------------------------

/// Painter pen input.
#[derive(Debug, Clone, PartialEq)]
pub enum StrokeEvent {
    Start {
        point: StrokePoint,
        style: StrokeStyle,
    },
    Continue {
        points: Vec<StrokePoint>,
    },
    End,
}

/// Everything that can happen to a game.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    Join { id: ParticipantId, name: String },
    Leave { id: ParticipantId },
    Stroke { id: ParticipantId, stroke: StrokeEvent },
    /// A chat line. Judged as a guess first.
    Guess { id: ParticipantId, text: String },
    Clear { id: ParticipantId },
}

impl InboundEvent {
    /// Maps a decoded client frame sent by `id` onto an event.
    pub fn from_client(id: ParticipantId, msg: ClientMessage) -> Self {
        match msg {
            ClientMessage::Join { name } => Self::Join { id, name },
            ClientMessage::StrokeStart { point, style } => Self::Stroke {
                id,
                stroke: StrokeEvent::Start { point, style },
            },
            ClientMessage::StrokeContinue { points } => Self::Stroke {
                id,
                stroke: StrokeEvent::Continue { points },
            },
            ClientMessage::StrokeEnd => Self::Stroke {
                id,
                stroke: StrokeEvent::End,
            },
            ClientMessage::ClearCanvas => Self::Clear { id },
            ClientMessage::Chat { text } => Self::Guess { id, text },
        }
    }
}

/// A round start the caller must schedule.
///
/// After `delay`, call [`RoundEngine::fire_deferred`] with `epoch`. A
/// window that has been superseded is ignored at that point, so callers
/// never need to cancel anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeferredStart {
    pub epoch: u64,
    pub delay: Duration,
}

/// The result of one transition.
#[derive(Debug, Default)]
pub struct Dispatch {
    /// Messages in emission order.
    pub messages: Vec<(Recipient, ServerMessage)>,
    pub deferred: Option<DeferredStart>,
}

impl Dispatch {
    fn push(&mut self, to: Recipient, msg: ServerMessage) {
        self.messages.push((to, msg));
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.deferred.is_none()
    }

    /// What `id` would receive, in order.
    pub fn messages_for(
        &self,
        id: ParticipantId,
    ) -> impl Iterator<Item = &ServerMessage> {
        self.messages
            .iter()
            .filter(move |(to, _)| to.includes(id))
            .map(|(_, msg)| msg)
    }
}

// ---------------------------------------------------------------------------
// RoundEngine
// ---------------------------------------------------------------------------

/// Decides who paints, what the word is, and when rounds change.
pub struct RoundEngine {
    config: GameConfig,
    roster: Roster,
    words: WordBank,
    phase: Phase,
    /// Bumped whenever a deferred start is scheduled or invalidated.
    epoch: u64,
}

impl RoundEngine {
    /// Creates an idle engine. The bank's exhaustion policy is replaced by
    /// the one in `config`.
    pub fn new(config: GameConfig, mut words: WordBank) -> Self {
        let config = config.validated();
        words.set_policy(config.exhaustion_policy);
        let roster =
            Roster::new(config.max_name_length, config.default_name.clone());
        Self {
            config,
            roster,
            words,
            phase: Phase::Idle,
            epoch: 0,
        }
    }

    /// Applies one event.
    pub fn handle(&mut self, event: InboundEvent) -> Dispatch {
        let mut out = Dispatch::default();
        match event {
            InboundEvent::Join { id, name } => self.on_join(id, &name, &mut out),
            InboundEvent::Leave { id } => self.on_leave(id, &mut out),
            InboundEvent::Stroke { id, stroke } => {
                self.on_stroke(id, stroke, &mut out)
            }
            InboundEvent::Guess { id, text } => self.on_guess(id, &text, &mut out),
            InboundEvent::Clear { id } => self.on_clear(id, &mut out),
        }
        out
    }

    /// Runs a scheduled round start. Superseded windows do nothing.
    pub fn fire_deferred(&mut self, epoch: u64) -> Dispatch {
        let mut out = Dispatch::default();
        if epoch != self.epoch || self.phase != Phase::Intermission {
            debug!(
                epoch,
                current = self.epoch,
                phase = %self.phase,
                "ignoring stale deferred start"
            );
            return out;
        }
        self.start_round(&mut out);
        out
    }

    /// Applies a freshly fetched word list. The word of the round in
    /// progress is not affected.
    pub fn refresh_words(
        &mut self,
        raw: &str,
    ) -> Result<RefreshOutcome, WordsError> {
        self.words.refresh(raw)
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn painter(&self) -> Option<ParticipantId> {
        self.phase.painter()
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn words(&self) -> &WordBank {
        &self.words
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    // -- transitions --------------------------------------------------------

    fn on_join(&mut self, id: ParticipantId, name: &str, out: &mut Dispatch) {
        let Some(participant) = self.roster.join(id, name) else {
            debug!(participant_id = %id, "duplicate join ignored");
            return;
        };
        let name = participant.name.clone();
        info!(
            participant_id = %id,
            %name,
            participants = self.roster.len(),
            "participant joined"
        );
        out.push(
            Recipient::Participant(id),
            ServerMessage::Welcome {
                participant_id: id,
                name,
            },
        );

        if self.roster.len() == 1 {
            self.start_round(out);
            return;
        }

        match &self.phase {
            Phase::Drawing(round) => out.push(
                Recipient::Participant(id),
                ServerMessage::RoundStarted {
                    painter: round.painter,
                },
            ),
            Phase::GameOver(board) => {
                out.push(Recipient::Participant(id), game_over_message(board))
            }
            Phase::Idle | Phase::Intermission => {}
        }
        out.push(Recipient::All, self.roster_message());
    }

    fn on_leave(&mut self, id: ParticipantId, out: &mut Dispatch) {
        let Some(departure) = self.roster.leave(id) else {
            return;
        };
        info!(
            participant_id = %id,
            participants = self.roster.len(),
            "participant left"
        );

        if self.roster.is_empty() {
            self.words.reset_cycle();
            self.phase = Phase::Idle;
            self.epoch += 1;
            self.roster.reset_turn();
            info!("roster empty, game reset");
            return;
        }

        // The cursor has already moved on during intermission.
        if departure.was_current && self.phase.is_drawing() {
            out.push(
                Recipient::All,
                system_chat(format!(
                    "{} left, starting a new round",
                    departure.participant.name
                )),
            );
            self.start_round(out);
        } else {
            out.push(Recipient::All, self.roster_message());
        }
    }

    fn on_stroke(
        &mut self,
        id: ParticipantId,
        stroke: StrokeEvent,
        out: &mut Dispatch,
    ) {
        if self.phase.painter() != Some(id) {
            debug!(participant_id = %id, "stroke from non-painter dropped");
            return;
        }
        let msg = match stroke {
            StrokeEvent::Start { point, style } => {
                ServerMessage::StrokeStart { point, style }
            }
            StrokeEvent::Continue { points } => {
                ServerMessage::StrokeContinue { points }
            }
            StrokeEvent::End => ServerMessage::StrokeEnd,
        };
        out.push(Recipient::AllExcept(id), msg);
    }

    fn on_clear(&mut self, id: ParticipantId, out: &mut Dispatch) {
        if self.phase.painter() != Some(id) {
            debug!(participant_id = %id, "clear from non-painter dropped");
            return;
        }
        out.push(Recipient::All, ServerMessage::CanvasCleared);
    }

    fn on_guess(&mut self, id: ParticipantId, text: &str, out: &mut Dispatch) {
        let Some(name) = self.roster.name(id).map(str::to_owned) else {
            return;
        };
        let text = self.canonicalize(text);
        if text.is_empty() {
            return;
        }

        if let Phase::Drawing(round) = &self.phase {
            if round.painter != id && self.is_match(&round.word, &text) {
                let word = round.word.clone();
                self.on_correct_guess(id, &name, &word, out);
                return;
            }
        }

        out.push(Recipient::All, ServerMessage::Chat { user: name, text });
    }

    fn on_correct_guess(
        &mut self,
        id: ParticipantId,
        name: &str,
        word: &str,
        out: &mut Dispatch,
    ) {
        self.roster
            .award_points(id, self.config.points_per_correct_guess);
        info!(participant_id = %id, %name, "word guessed");
        out.push(
            Recipient::All,
            system_chat(format!("Correct! The word was [{word}] (guessed by {name})")),
        );
        self.roster.advance_turn();

        let delay = self.config.next_round_delay;
        if delay.is_zero() {
            self.start_round(out);
            return;
        }
        self.epoch += 1;
        self.phase = Phase::Intermission;
        out.push(Recipient::All, self.roster_message());
        out.deferred = Some(DeferredStart {
            epoch: self.epoch,
            delay,
        });
    }

    fn start_round(&mut self, out: &mut Dispatch) {
        if self.phase.is_game_over() {
            return;
        }
        let Some(painter) = self.roster.current_painter() else {
            self.phase = Phase::Idle;
            return;
        };
        let Some(word) = self.words.draw() else {
            self.end_game(out);
            return;
        };

        info!(%painter, cycle = self.words.cycle(), "round started");
        debug!(%painter, %word, "secret word drawn");
        out.push(Recipient::All, ServerMessage::RoundStarted { painter });
        out.push(
            Recipient::Participant(painter),
            ServerMessage::SecretWord { word: word.clone() },
        );
        out.push(Recipient::All, self.roster_message());
        self.phase = Phase::Drawing(Round { painter, word });
    }

    fn end_game(&mut self, out: &mut Dispatch) {
        let ranking = self.roster.ranked();
        let board = Scoreboard {
            winner: ranking.first().cloned(),
            ranking,
        };
        info!(
            winner = ?board.winner.as_ref().map(|w| w.participant_id),
            "game over"
        );
        out.push(Recipient::All, game_over_message(&board));
        self.phase = Phase::GameOver(board);
    }

    // -- helpers ------------------------------------------------------------

    /// Trim, then cut to `max_chat_length` characters.
    fn canonicalize(&self, text: &str) -> String {
        let cut: String = text
            .trim()
            .chars()
            .take(self.config.max_chat_length)
            .collect();
        cut.trim_end().to_string()
    }

    fn is_match(&self, secret: &str, guess: &str) -> bool {
        let matching = self.config.guess_matching;
        matching.normalize(&self.canonicalize(secret)) == matching.normalize(guess)
    }

    fn roster_message(&self) -> ServerMessage {
        ServerMessage::Roster {
            participants: self.roster.snapshot(),
        }
    }
}

fn system_chat(text: String) -> ServerMessage {
    ServerMessage::Chat {
        user: SYSTEM_USER.to_string(),
        text,
    }
}

fn game_over_message(board: &Scoreboard) -> ServerMessage {
    ServerMessage::GameOver {
        winner: board.winner.clone(),
        ranking: board.ranking.clone(),
    }
}

// =========================================================================
// Tests
// =========================================================================
