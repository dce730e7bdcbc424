//! Who is connected, what they're called, and whose turn it is.
//!
//! Turn order always comes from [`TurnOrder`]'s explicit sequence, never
//! from map iteration order.

use std::collections::HashMap;

use scribble_protocol::{ParticipantId, RankedEntry, RosterEntry};

use crate::config::{DEFAULT_NAME, MAX_NAME_LENGTH};

/// Trims `raw` and cuts it to `max_len` characters. Blank names become
/// `default`.
pub fn sanitize_name(raw: &str, max_len: usize, default: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return default.to_string();
    }
    let cut: String = trimmed.chars().take(max_len).collect();
    // Cutting can leave trailing whitespace from the middle of the name.
    let cut = cut.trim_end();
    if cut.is_empty() {
        default.to_string()
    } else {
        cut.to_string()
    }
}

// ---------------------------------------------------------------------------
// TurnOrder
// ---------------------------------------------------------------------------

/// Join-ordered seats plus the index of the current turn.
///
/// The cursor is a valid index whenever there is at least one seat, and 0
/// when there are none.
#[derive(Debug, Clone, Default)]
pub struct TurnOrder {
    seats: Vec<ParticipantId>,
    cursor: usize,
}

impl TurnOrder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a seat at the end of the order.
    pub fn push(&mut self, id: ParticipantId) {
        self.seats.push(id);
    }

    /// Removes `id`'s seat and returns the index it had.
    ///
    /// A seat removed before the cursor shifts the cursor back by one so
    /// it keeps pointing at the same participant. Removing the seat *at*
    /// the cursor leaves the cursor where it is, which hands the turn to
    /// whoever slid into that slot (wrapping to the front past the end).
    pub fn remove(&mut self, id: ParticipantId) -> Option<usize> {
        let index = self.seats.iter().position(|seat| *seat == id)?;
        self.seats.remove(index);
        if index < self.cursor {
            self.cursor -= 1;
        }
        if self.cursor >= self.seats.len() {
            self.cursor = 0;
        }
        Some(index)
    }

    /// Whose turn it is, or `None` with no seats.
    pub fn current(&self) -> Option<ParticipantId> {
        self.seats.get(self.cursor).copied()
    }

    /// Moves the turn to the next seat, wrapping around. No-op when empty.
    pub fn advance(&mut self) {
        if !self.seats.is_empty() {
            self.cursor = (self.cursor + 1) % self.seats.len();
        }
    }

    /// Puts the cursor back on the first seat.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn seats(&self) -> &[ParticipantId] {
        &self.seats
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// A connected participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub score: u32,
}

/// What [`Roster::leave`] removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    pub participant: Participant,
    /// The participant held the turn when they left.
    pub was_current: bool,
}

/// Connected participants and their turn order.
#[derive(Debug, Clone)]
pub struct Roster {
    participants: HashMap<ParticipantId, Participant>,
    order: TurnOrder,
    max_name_length: usize,
    default_name: String,
}

impl Default for Roster {
    fn default() -> Self {
        Self::new(MAX_NAME_LENGTH, DEFAULT_NAME)
    }
}

impl Roster {
    pub fn new(max_name_length: usize, default_name: impl Into<String>) -> Self {
        Self {
            participants: HashMap::new(),
            order: TurnOrder::new(),
            max_name_length,
            default_name: default_name.into(),
        }
    }

    /// Registers `id` with score 0 and a sanitized name, at the end of the
    /// turn order.
    ///
    /// Returns `None` if `id` is already present; the existing entry is
    /// left untouched.
    pub fn join(
        &mut self,
        id: ParticipantId,
        requested_name: &str,
    ) -> Option<&Participant> {
        if self.participants.contains_key(&id) {
            return None;
        }
        let name =
            sanitize_name(requested_name, self.max_name_length, &self.default_name);
        self.order.push(id);
        self.participants.insert(id, Participant { id, name, score: 0 });
        self.participants.get(&id)
    }

    /// Removes `id`. Unknown ids return `None`.
    pub fn leave(&mut self, id: ParticipantId) -> Option<Departure> {
        let participant = self.participants.remove(&id)?;
        let was_current = self.order.current() == Some(id);
        self.order.remove(id);
        Some(Departure {
            participant,
            was_current,
        })
    }

    pub fn current_painter(&self) -> Option<ParticipantId> {
        self.order.current()
    }

    pub fn advance_turn(&mut self) {
        self.order.advance();
    }

    pub fn reset_turn(&mut self) {
        self.order.reset();
    }

    /// Adds `amount` to `id`'s score. Returns `false` for unknown ids.
    pub fn award_points(&mut self, id: ParticipantId, amount: u32) -> bool {
        match self.participants.get_mut(&id) {
            Some(p) => {
                p.score = p.score.saturating_add(amount);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.get(&id)
    }

    pub fn name(&self, id: ParticipantId) -> Option<&str> {
        self.participants.get(&id).map(|p| p.name.as_str())
    }

    pub fn contains(&self, id: ParticipantId) -> bool {
        self.participants.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Participant ids in turn order.
    pub fn ids(&self) -> &[ParticipantId] {
        self.order.seats()
    }

    pub fn turn_order(&self) -> &TurnOrder {
        &self.order
    }

    /// Everyone in turn order, as sent in `roster` messages.
    pub fn snapshot(&self) -> Vec<RosterEntry> {
        self.in_order()
            .map(|p| RosterEntry {
                participant_id: p.id,
                name: p.name.clone(),
                score: p.score,
            })
            .collect()
    }

    /// Everyone by descending score. Ties keep turn order.
    pub fn ranked(&self) -> Vec<RankedEntry> {
        let mut by_score: Vec<&Participant> = self.in_order().collect();
        by_score.sort_by(|a, b| b.score.cmp(&a.score));
        by_score
            .into_iter()
            .enumerate()
            .map(|(i, p)| RankedEntry {
                rank: i + 1,
                participant_id: p.id,
                name: p.name.clone(),
                score: p.score,
            })
            .collect()
    }

    fn in_order(&self) -> impl Iterator<Item = &Participant> {
        self.order
            .seats()
            .iter()
            .filter_map(|id| self.participants.get(id))
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(id: u64) -> ParticipantId {
        ParticipantId(id)
    }

    fn roster_of(ids: &[u64]) -> Roster {
        let mut roster = Roster::default();
        for id in ids {
            roster.join(pid(*id), &format!("p{id}"));
        }
        roster
    }

    // =====================================================================
    // sanitize_name
    // =====================================================================

    #[test]
    fn test_sanitize_name_trims_whitespace() {
        assert_eq!(sanitize_name("  alice \n", 10, "Player"), "alice");
    }

    #[test]
    fn test_sanitize_name_blank_uses_default() {
        assert_eq!(sanitize_name("", 10, "Player"), "Player");
        assert_eq!(sanitize_name(" \t ", 10, "Player"), "Player");
    }

    #[test]
    fn test_sanitize_name_truncates_by_characters() {
        assert_eq!(sanitize_name("abcdefghijklmno", 10, "Player"), "abcdefghij");
        // Multi-byte characters count once each.
        assert_eq!(
            sanitize_name("가나다라마바사아자차카타", 10, "Player"),
            "가나다라마바사아자차"
        );
    }

    #[test]
    fn test_sanitize_name_truncation_drops_trailing_space() {
        assert_eq!(sanitize_name("alex      bell", 10, "Player"), "alex");
    }

    // =====================================================================
    // TurnOrder
    // =====================================================================

    #[test]
    fn test_turn_order_empty_has_no_current() {
        let order = TurnOrder::new();
        assert_eq!(order.current(), None);
        assert_eq!(order.cursor(), 0);
    }

    #[test]
    fn test_turn_order_advance_wraps() {
        let mut order = TurnOrder::new();
        for id in 1..=3 {
            order.push(pid(id));
        }
        order.advance();
        order.advance();
        assert_eq!(order.current(), Some(pid(3)));
        order.advance();
        assert_eq!(order.current(), Some(pid(1)));
    }

    #[test]
    fn test_turn_order_remove_before_cursor_keeps_current() {
        let mut order = TurnOrder::new();
        for id in 1..=3 {
            order.push(pid(id));
        }
        order.advance(); // current = 2
        assert_eq!(order.remove(pid(1)), Some(0));
        assert_eq!(order.current(), Some(pid(2)));
        assert_eq!(order.cursor(), 0);
    }

    #[test]
    fn test_turn_order_remove_after_cursor_keeps_current() {
        let mut order = TurnOrder::new();
        for id in 1..=3 {
            order.push(pid(id));
        }
        order.remove(pid(3));
        assert_eq!(order.current(), Some(pid(1)));
    }

    #[test]
    fn test_turn_order_remove_at_cursor_hands_turn_to_next_seat() {
        let mut order = TurnOrder::new();
        for id in 1..=3 {
            order.push(pid(id));
        }
        order.advance(); // current = 2
        order.remove(pid(2));
        assert_eq!(order.current(), Some(pid(3)));
    }

    #[test]
    fn test_turn_order_remove_last_seat_at_cursor_wraps_to_front() {
        let mut order = TurnOrder::new();
        for id in 1..=3 {
            order.push(pid(id));
        }
        order.advance();
        order.advance(); // current = 3
        order.remove(pid(3));
        assert_eq!(order.current(), Some(pid(1)));
    }

    #[test]
    fn test_turn_order_remove_unknown_is_none() {
        let mut order = TurnOrder::new();
        order.push(pid(1));
        assert_eq!(order.remove(pid(9)), None);
        assert_eq!(order.len(), 1);
    }

    #[test]
    fn test_turn_order_cursor_valid_through_churn() {
        let mut order = TurnOrder::new();
        let mut next = 1;
        for step in 0..200u64 {
            match step % 5 {
                0 | 1 => {
                    order.push(pid(next));
                    next += 1;
                }
                2 => order.advance(),
                _ => {
                    if let Some(&first) = order.seats().get((step as usize) % 3) {
                        order.remove(first);
                    }
                }
            }
            if order.is_empty() {
                assert_eq!(order.current(), None);
            } else {
                assert!(order.cursor() < order.len());
                let current = order.current().unwrap();
                assert!(order.seats().contains(&current));
            }
        }
    }

    // =====================================================================
    // Roster
    // =====================================================================

    #[test]
    fn test_join_starts_at_zero_with_sanitized_name() {
        let mut roster = Roster::default();
        let p = roster.join(pid(1), "   ").unwrap();
        assert_eq!(p.name, "Player");
        assert_eq!(p.score, 0);
    }

    #[test]
    fn test_join_duplicate_id_is_rejected() {
        let mut roster = Roster::default();
        roster.join(pid(1), "alice");
        assert!(roster.join(pid(1), "mallory").is_none());
        assert_eq!(roster.name(pid(1)), Some("alice"));
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_first_joiner_is_painter() {
        let roster = roster_of(&[1, 2, 3]);
        assert_eq!(roster.current_painter(), Some(pid(1)));
        assert_eq!(roster.ids(), [pid(1), pid(2), pid(3)]);
    }

    #[test]
    fn test_leave_reports_whether_participant_was_current() {
        let mut roster = roster_of(&[1, 2]);
        let gone = roster.leave(pid(2)).unwrap();
        assert!(!gone.was_current);
        let gone = roster.leave(pid(1)).unwrap();
        assert!(gone.was_current);
        assert_eq!(gone.participant.name, "p1");
    }

    #[test]
    fn test_leave_unknown_is_none() {
        let mut roster = roster_of(&[1]);
        assert!(roster.leave(pid(7)).is_none());
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_leave_non_current_never_changes_painter() {
        let mut roster = roster_of(&[1, 2, 3, 4]);
        roster.advance_turn(); // painter = 2
        roster.leave(pid(1));
        assert_eq!(roster.current_painter(), Some(pid(2)));
        roster.leave(pid(4));
        assert_eq!(roster.current_painter(), Some(pid(2)));
    }

    #[test]
    fn test_leave_everyone_resets_cursor() {
        let mut roster = roster_of(&[1, 2]);
        roster.advance_turn();
        roster.leave(pid(1));
        roster.leave(pid(2));
        assert!(roster.is_empty());
        assert_eq!(roster.current_painter(), None);
        assert_eq!(roster.turn_order().cursor(), 0);
    }

    #[test]
    fn test_award_points_adds_to_score() {
        let mut roster = roster_of(&[1]);
        assert!(roster.award_points(pid(1), 10));
        assert!(roster.award_points(pid(1), 10));
        assert_eq!(roster.get(pid(1)).unwrap().score, 20);
    }

    #[test]
    fn test_award_points_unknown_is_false() {
        let mut roster = roster_of(&[1]);
        assert!(!roster.award_points(pid(2), 10));
    }

    #[test]
    fn test_snapshot_follows_turn_order() {
        let roster = roster_of(&[5, 3, 9]);
        let ids: Vec<_> = roster
            .snapshot()
            .iter()
            .map(|e| e.participant_id)
            .collect();
        assert_eq!(ids, vec![pid(5), pid(3), pid(9)]);
    }

    #[test]
    fn test_ranked_sorts_by_score_with_stable_ties() {
        let mut roster = roster_of(&[1, 2, 3]);
        roster.award_points(pid(2), 10);
        roster.award_points(pid(3), 10);
        let ranked = roster.ranked();
        let order: Vec<_> = ranked.iter().map(|e| e.participant_id).collect();
        assert_eq!(order, vec![pid(2), pid(3), pid(1)]);
        let ranks: Vec<_> = ranked.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }
}
