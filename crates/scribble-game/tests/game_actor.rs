//! Integration tests for the game actor.
//!
//! Every command goes through the same channel, so awaiting a snapshot
//! guarantees everything sent before it has been applied. Tests drain the
//! participant channels after that barrier.

use std::time::Duration;

use scribble_game::{GameConfig, GameError, GameHandle, spawn_game};
use scribble_protocol::{ClientMessage, ParticipantId, ServerMessage};
use scribble_words::{ExhaustionPolicy, WordBank};
use tokio::sync::mpsc;

// =========================================================================
// Helpers
// =========================================================================

type Inbox = mpsc::UnboundedReceiver<ServerMessage>;

fn pid(id: u64) -> ParticipantId {
    ParticipantId(id)
}

fn bank(words: &[&str], policy: ExhaustionPolicy) -> WordBank {
    WordBank::with_words(words.iter().copied(), policy)
        .unwrap()
        .seeded(11)
}

fn apple_game() -> GameHandle {
    spawn_game(GameConfig::default(), bank(&["apple"], ExhaustionPolicy::Refill))
}

async fn join(handle: &GameHandle, id: u64, name: &str) -> Inbox {
    let (tx, rx) = mpsc::unbounded_channel();
    handle.join(pid(id), name, tx).await.unwrap();
    rx
}

async fn chat(handle: &GameHandle, id: u64, text: &str) {
    handle
        .submit(pid(id), ClientMessage::Chat { text: text.into() })
        .await
        .unwrap();
}

/// Waits for the actor to catch up, then returns what `inbox` holds.
async fn drain(handle: &GameHandle, inbox: &mut Inbox) -> Vec<ServerMessage> {
    handle.snapshot().await.unwrap();
    let mut out = Vec::new();
    while let Ok(msg) = inbox.try_recv() {
        out.push(msg);
    }
    out
}

fn secret_of(msgs: &[ServerMessage]) -> Option<&str> {
    msgs.iter().find_map(|m| match m {
        ServerMessage::SecretWord { word } => Some(word.as_str()),
        _ => None,
    })
}

fn round_painters(msgs: &[ServerMessage]) -> Vec<ParticipantId> {
    msgs.iter()
        .filter_map(|m| match m {
            ServerMessage::RoundStarted { painter } => Some(*painter),
            _ => None,
        })
        .collect()
}

// =========================================================================
// Join / leave
// =========================================================================

#[tokio::test]
async fn test_first_joiner_gets_welcome_and_secret() {
    let game = apple_game();
    let mut a = join(&game, 1, "alice").await;

    let msgs = drain(&game, &mut a).await;
    assert_eq!(
        msgs[0],
        ServerMessage::Welcome {
            participant_id: pid(1),
            name: "alice".into()
        }
    );
    assert_eq!(round_painters(&msgs), vec![pid(1)]);
    assert_eq!(secret_of(&msgs), Some("apple"));
}

#[tokio::test]
async fn test_duplicate_join_is_rejected() {
    let game = apple_game();
    let _a = join(&game, 1, "alice").await;

    let (tx, _rx) = mpsc::unbounded_channel();
    let result = game.join(pid(1), "again", tx).await;
    assert!(matches!(result, Err(GameError::AlreadyJoined(id)) if id == pid(1)));
}

#[tokio::test]
async fn test_late_joiner_never_receives_secret() {
    let game = apple_game();
    let _a = join(&game, 1, "alice").await;
    let mut b = join(&game, 2, "bob").await;

    let msgs = drain(&game, &mut b).await;
    assert_eq!(round_painters(&msgs), vec![pid(1)]);
    assert_eq!(secret_of(&msgs), None);
}

#[tokio::test]
async fn test_snapshot_reports_roster_in_join_order() {
    let game = apple_game();
    let _a = join(&game, 3, "c").await;
    let _b = join(&game, 1, "a").await;

    let snap = game.snapshot().await.unwrap();
    assert_eq!(snap.phase, "Drawing");
    assert_eq!(snap.painter, Some(pid(3)));
    let ids: Vec<_> = snap.roster.iter().map(|e| e.participant_id).collect();
    assert_eq!(ids, vec![pid(3), pid(1)]);
    assert!(snap.words_from_source);
}

#[tokio::test]
async fn test_last_leave_returns_to_idle() {
    let game = apple_game();
    let _a = join(&game, 1, "alice").await;
    game.leave(pid(1)).await.unwrap();

    let snap = game.snapshot().await.unwrap();
    assert_eq!(snap.phase, "Idle");
    assert_eq!(snap.painter, None);
    assert!(snap.roster.is_empty());
}

#[tokio::test]
async fn test_leave_unknown_id_is_ignored() {
    let game = apple_game();
    let _a = join(&game, 1, "alice").await;
    game.leave(pid(42)).await.unwrap();
    assert_eq!(game.snapshot().await.unwrap().roster.len(), 1);
}

// =========================================================================
// Strokes
// =========================================================================

#[tokio::test]
async fn test_painter_strokes_reach_others_but_not_painter() {
    let game = apple_game();
    let mut a = join(&game, 1, "alice").await;
    let mut b = join(&game, 2, "bob").await;
    drain(&game, &mut a).await;
    drain(&game, &mut b).await;

    game.submit(pid(1), ClientMessage::StrokeEnd).await.unwrap();

    assert_eq!(drain(&game, &mut b).await, vec![ServerMessage::StrokeEnd]);
    assert!(drain(&game, &mut a).await.is_empty());
}

#[tokio::test]
async fn test_non_painter_strokes_reach_nobody() {
    let game = apple_game();
    let mut a = join(&game, 1, "alice").await;
    let mut b = join(&game, 2, "bob").await;
    let mut c = join(&game, 3, "carol").await;
    for inbox in [&mut a, &mut b, &mut c] {
        drain(&game, inbox).await;
    }

    game.submit(pid(2), ClientMessage::StrokeEnd).await.unwrap();
    game.submit(pid(2), ClientMessage::ClearCanvas).await.unwrap();

    for inbox in [&mut a, &mut b, &mut c] {
        assert!(drain(&game, inbox).await.is_empty());
    }
}

#[tokio::test]
async fn test_painter_clear_reaches_everyone_including_painter() {
    let game = apple_game();
    let mut a = join(&game, 1, "alice").await;
    let mut b = join(&game, 2, "bob").await;
    drain(&game, &mut a).await;
    drain(&game, &mut b).await;

    game.submit(pid(1), ClientMessage::ClearCanvas).await.unwrap();

    assert_eq!(drain(&game, &mut a).await, vec![ServerMessage::CanvasCleared]);
    assert_eq!(drain(&game, &mut b).await, vec![ServerMessage::CanvasCleared]);
}

// =========================================================================
// Rounds
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_abc_scenario_correct_guess_hands_turn_to_b() {
    let game = apple_game();
    let mut a = join(&game, 1, "A").await;
    let mut b = join(&game, 2, "B").await;
    let mut c = join(&game, 3, "C").await;
    for inbox in [&mut a, &mut b, &mut c] {
        drain(&game, inbox).await;
    }

    chat(&game, 3, "apple").await;
    let reveal = drain(&game, &mut a).await;
    assert!(reveal.contains(&ServerMessage::Chat {
        user: "System".into(),
        text: "Correct! The word was [apple] (guessed by C)".into(),
    }));
    assert_eq!(game.snapshot().await.unwrap().phase, "Intermission");

    // Other events are still processed during the pause.
    chat(&game, 2, "nice").await;
    assert!(drain(&game, &mut a).await.contains(&ServerMessage::Chat {
        user: "B".into(),
        text: "nice".into()
    }));

    tokio::time::sleep(Duration::from_millis(1600)).await;

    let b_msgs = drain(&game, &mut b).await;
    assert_eq!(round_painters(&b_msgs), vec![pid(2)]);
    assert_eq!(secret_of(&b_msgs), Some("apple"));
    assert_eq!(secret_of(&drain(&game, &mut c).await), None);

    let snap = game.snapshot().await.unwrap();
    assert_eq!(snap.painter, Some(pid(2)));
    let c_score = snap
        .roster
        .iter()
        .find(|e| e.participant_id == pid(3))
        .unwrap()
        .score;
    assert_eq!(c_score, 10);
}

#[tokio::test(start_paused = true)]
async fn test_leave_during_intermission_still_starts_exactly_one_round() {
    let game = apple_game();
    let mut a = join(&game, 1, "A").await;
    let _b = join(&game, 2, "B").await;
    let mut c = join(&game, 3, "C").await;
    chat(&game, 3, "apple").await;
    // B holds the next turn and leaves before it starts.
    game.leave(pid(2)).await.unwrap();
    drain(&game, &mut a).await;
    drain(&game, &mut c).await;

    tokio::time::sleep(Duration::from_secs(5)).await;

    let a_msgs = drain(&game, &mut a).await;
    assert_eq!(round_painters(&a_msgs), vec![pid(3)]);
    assert_eq!(secret_of(&drain(&game, &mut c).await), Some("apple"));
}

#[tokio::test]
async fn test_painter_disconnect_starts_round_for_next_seat() {
    let game = apple_game();
    let mut a = join(&game, 1, "A").await;
    let mut b = join(&game, 2, "B").await;
    let mut c = join(&game, 3, "C").await;
    for inbox in [&mut b, &mut c] {
        drain(&game, inbox).await;
    }

    game.leave(pid(1)).await.unwrap();

    let b_msgs = drain(&game, &mut b).await;
    assert_eq!(round_painters(&b_msgs), vec![pid(2)]);
    assert_eq!(secret_of(&b_msgs), Some("apple"));
    assert_eq!(secret_of(&drain(&game, &mut c).await), None);
    // The old painter's channel is no longer fed.
    let _ = drain(&game, &mut a).await;
    game.submit(pid(2), ClientMessage::StrokeEnd).await.unwrap();
    assert!(drain(&game, &mut a).await.is_empty());
}

#[tokio::test]
async fn test_end_game_policy_broadcasts_game_over() {
    let config = GameConfig {
        next_round_delay: Duration::ZERO,
        exhaustion_policy: ExhaustionPolicy::EndGame,
        ..GameConfig::default()
    };
    let game = spawn_game(config, bank(&["x"], ExhaustionPolicy::EndGame));
    let mut a = join(&game, 1, "A").await;
    let mut b = join(&game, 2, "B").await;
    let word = secret_of(&drain(&game, &mut a).await).unwrap().to_string();
    drain(&game, &mut b).await;

    chat(&game, 2, &word).await;

    let msgs = drain(&game, &mut b).await;
    let Some(ServerMessage::GameOver { winner, ranking }) = msgs
        .iter()
        .find(|m| matches!(m, ServerMessage::GameOver { .. }))
    else {
        panic!("expected game_over in {msgs:?}");
    };
    assert_eq!(winner.as_ref().unwrap().participant_id, pid(2));
    assert_eq!(ranking.len(), 2);
    assert_eq!(game.snapshot().await.unwrap().phase, "GameOver");
}

// =========================================================================
// Word refresh
// =========================================================================

#[tokio::test]
async fn test_refresh_words_replaces_vocabulary() {
    let game = apple_game();
    game.refresh_words("sun\nmoon\nstar").await.unwrap();
    assert_eq!(game.snapshot().await.unwrap().words, 3);
}

#[tokio::test]
async fn test_refresh_with_empty_list_keeps_vocabulary() {
    let game = apple_game();
    game.refresh_words(" \n , ").await.unwrap();
    assert_eq!(game.snapshot().await.unwrap().words, 1);
}

// =========================================================================
// Shutdown
// =========================================================================

#[tokio::test]
async fn test_shutdown_closes_participant_channels() {
    let game = apple_game();
    let mut a = join(&game, 1, "alice").await;
    game.shutdown().await.unwrap();

    // Buffered messages drain first, then the channel reports closed.
    while a.recv().await.is_some() {}
    assert!(matches!(game.snapshot().await, Err(GameError::Unavailable)));
}
