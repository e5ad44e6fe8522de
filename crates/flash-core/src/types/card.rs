// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::BTreeMap;

use chrono::TimeDelta;

use crate::types::aliases::FactKey;
use crate::types::aliases::StyleName;
use crate::types::aliases::UnitName;
use crate::types::card_hash::CardHash;
use crate::types::card_hash::Hasher;
use crate::types::timestamp::Timestamp;

/// How long a card waits before it can be shown again.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timeouts {
    /// Wait after a correct answer.
    pub right: TimeDelta,
    /// Wait after an incorrect answer.
    pub wrong: TimeDelta,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            right: TimeDelta::minutes(10),
            wrong: TimeDelta::minutes(1),
        }
    }
}

/// What a single answered turn did to a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReviewAction {
    /// First correct answer in a row. The card waits out the right timeout.
    Correct,
    /// Incorrect answer. The card waits out the wrong timeout.
    Incorrect,
    /// Second correct answer in a row. The card leaves the session.
    Done,
}

impl ReviewAction {
    pub fn as_str(&self) -> &str {
        match self {
            ReviewAction::Correct => "correct",
            ReviewAction::Incorrect => "incorrect",
            ReviewAction::Done => "done",
        }
    }

    pub fn is_correct(&self) -> bool {
        !matches!(self, ReviewAction::Incorrect)
    }
}

/// Record of an answered turn: enough to put the card back exactly as it
/// was before the answer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Turn {
    pub action: ReviewAction,
    prior_last_turn: bool,
    prior_deadline: Option<Timestamp>,
}

/// A flashcard built from one note and one side-ordering style, together
/// with its review state for the current session.
#[derive(Clone, Debug, PartialEq)]
pub struct Card {
    unit: UnitName,
    style: StyleName,
    sides: Vec<Vec<FactKey>>,
    facts: BTreeMap<FactKey, String>,
    turn_count: usize,
    first_turn: bool,
    last_turn: bool,
    is_done: bool,
    deadline: Option<Timestamp>,
}

impl Card {
    pub fn new(
        unit: UnitName,
        style: StyleName,
        sides: Vec<Vec<FactKey>>,
        facts: BTreeMap<FactKey, String>,
    ) -> Self {
        Self {
            unit,
            style,
            sides,
            facts,
            turn_count: 0,
            first_turn: true,
            last_turn: false,
            is_done: false,
            deadline: None,
        }
    }

    pub fn unit(&self) -> &UnitName {
        &self.unit
    }

    pub fn style(&self) -> &StyleName {
        &self.style
    }

    pub fn sides(&self) -> &[Vec<FactKey>] {
        &self.sides
    }

    pub fn fact(&self, key: &str) -> Option<&str> {
        self.facts.get(key).map(String::as_str)
    }

    /// The facts of one side, in display order. Keys without a fact are
    /// skipped.
    pub fn side_facts(&self, side: usize) -> Vec<(&str, &str)> {
        self.sides
            .get(side)
            .map(|keys| {
                keys.iter()
                    .filter_map(|key| self.fact(key).map(|text| (key.as_str(), text)))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn turn_count(&self) -> usize {
        self.turn_count
    }

    pub fn is_first_turn(&self) -> bool {
        self.first_turn
    }

    pub fn is_last_turn(&self) -> bool {
        self.last_turn
    }

    pub fn is_done(&self) -> bool {
        self.is_done
    }

    pub fn deadline(&self) -> Option<Timestamp> {
        self.deadline
    }

    /// Whether the card's wait has run out. Cards that never waited are
    /// always eligible.
    pub fn is_eligible(&self, now: Timestamp) -> bool {
        match self.deadline {
            None => true,
            Some(deadline) => now > deadline,
        }
    }

    pub fn hash(&self) -> CardHash {
        let mut hasher = Hasher::new();
        hasher.field(&self.style);
        for side in &self.sides {
            hasher.field(&side.len().to_string());
            for key in side {
                hasher.field(key);
            }
        }
        for (key, text) in &self.facts {
            hasher.field(key);
            hasher.field(text);
        }
        hasher.finalize()
    }

    /// Record a correct answer. A card that was already answered correctly
    /// on its previous turn is done.
    pub fn record_correct(&mut self, now: Timestamp, timeouts: &Timeouts) -> Turn {
        let turn = self.turn(ReviewAction::Correct);
        self.turn_count += 1;
        if self.last_turn {
            self.is_done = true;
            Turn {
                action: ReviewAction::Done,
                ..turn
            }
        } else {
            self.last_turn = true;
            self.first_turn = false;
            self.deadline = Some(now.plus(timeouts.right));
            turn
        }
    }

    /// Record an incorrect answer. Resets the correct streak.
    pub fn record_incorrect(&mut self, now: Timestamp, timeouts: &Timeouts) -> Turn {
        let turn = self.turn(ReviewAction::Incorrect);
        self.turn_count += 1;
        self.last_turn = false;
        self.first_turn = false;
        self.deadline = Some(now.plus(timeouts.wrong));
        turn
    }

    /// Undo the answer recorded as `turn`. Must be the most recent turn of
    /// this card.
    pub fn rewind(&mut self, turn: &Turn) {
        self.turn_count = self.turn_count.saturating_sub(1);
        if self.turn_count == 0 {
            self.first_turn = true;
        }
        match turn.action {
            ReviewAction::Done => self.is_done = false,
            ReviewAction::Correct => self.last_turn = false,
            ReviewAction::Incorrect => self.last_turn = turn.prior_last_turn,
        }
        self.deadline = turn.prior_deadline;
    }

    fn turn(&self, action: ReviewAction) -> Turn {
        Turn {
            action,
            prior_last_turn: self.last_turn,
            prior_deadline: self.deadline,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::NaiveDateTime;

    use super::*;

    pub(crate) fn make_timestamp(s: &str) -> Timestamp {
        let ndt = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.3f").unwrap();
        Timestamp::new(ndt)
    }

    pub(crate) fn make_card(name: &str) -> Card {
        let mut facts = BTreeMap::new();
        facts.insert("front".to_string(), name.to_string());
        facts.insert("back".to_string(), name.to_uppercase());
        Card::new(
            "unit".to_string(),
            "forward".to_string(),
            vec![vec!["front".to_string()], vec!["back".to_string()]],
            facts,
        )
    }

    /// The fields undo must restore.
    fn state(card: &Card) -> (usize, bool, bool, bool, Option<Timestamp>) {
        (
            card.turn_count(),
            card.is_first_turn(),
            card.is_last_turn(),
            card.is_done(),
            card.deadline(),
        )
    }

    #[test]
    fn test_new_card() {
        let card = make_card("a");
        assert_eq!(card.turn_count(), 0);
        assert!(card.is_first_turn());
        assert!(!card.is_last_turn());
        assert!(!card.is_done());
        assert!(card.deadline().is_none());
        assert!(card.is_eligible(make_timestamp("2024-01-01T12:00:00.000")));
    }

    #[test]
    fn test_correct_sets_deadline() {
        let now = make_timestamp("2024-01-01T12:00:00.000");
        let mut card = make_card("a");
        let turn = card.record_correct(now, &Timeouts::default());
        assert_eq!(turn.action, ReviewAction::Correct);
        assert_eq!(card.turn_count(), 1);
        assert!(!card.is_first_turn());
        assert!(card.is_last_turn());
        assert!(!card.is_done());
        assert_eq!(
            card.deadline(),
            Some(make_timestamp("2024-01-01T12:10:00.000"))
        );
        assert!(!card.is_eligible(make_timestamp("2024-01-01T12:10:00.000")));
        assert!(card.is_eligible(make_timestamp("2024-01-01T12:10:00.001")));
    }

    #[test]
    fn test_incorrect_sets_deadline() {
        let now = make_timestamp("2024-01-01T12:00:00.000");
        let mut card = make_card("a");
        let turn = card.record_incorrect(now, &Timeouts::default());
        assert_eq!(turn.action, ReviewAction::Incorrect);
        assert_eq!(card.turn_count(), 1);
        assert!(!card.is_first_turn());
        assert!(!card.is_last_turn());
        assert_eq!(
            card.deadline(),
            Some(make_timestamp("2024-01-01T12:01:00.000"))
        );
    }

    #[test]
    fn test_two_correct_in_a_row_is_done() {
        let now = make_timestamp("2024-01-01T12:00:00.000");
        let timeouts = Timeouts::default();
        let mut card = make_card("a");
        card.record_correct(now, &timeouts);
        assert!(!card.is_done());
        let turn = card.record_correct(now, &timeouts);
        assert_eq!(turn.action, ReviewAction::Done);
        assert!(card.is_done());
        assert_eq!(card.turn_count(), 2);
    }

    #[test]
    fn test_incorrect_breaks_streak() {
        let now = make_timestamp("2024-01-01T12:00:00.000");
        let timeouts = Timeouts::default();
        let mut card = make_card("a");
        card.record_correct(now, &timeouts);
        card.record_incorrect(now, &timeouts);
        card.record_correct(now, &timeouts);
        assert!(!card.is_done());
        card.record_correct(now, &timeouts);
        assert!(card.is_done());
        assert_eq!(card.turn_count(), 4);
    }

    #[test]
    fn test_rewind_round_trip() {
        let timeouts = Timeouts::default();
        // Every answer sequence up to length four, rewinding after each step.
        for mask in 0..16u32 {
            for len in 0..=4 {
                let mut card = make_card("a");
                let mut now = make_timestamp("2024-01-01T12:00:00.000");
                for i in 0..len {
                    if card.is_done() {
                        break;
                    }
                    now = now.plus(TimeDelta::minutes(15));
                    let before = state(&card);
                    let turn = if mask & (1 << i) != 0 {
                        card.record_correct(now, &timeouts)
                    } else {
                        card.record_incorrect(now, &timeouts)
                    };
                    let after = state(&card);
                    card.rewind(&turn);
                    assert_eq!(state(&card), before);
                    // Re-apply so the next step starts from the advanced state.
                    let again = if turn.action.is_correct() {
                        card.record_correct(now, &timeouts)
                    } else {
                        card.record_incorrect(now, &timeouts)
                    };
                    assert_eq!(again, turn);
                    assert_eq!(state(&card), after);
                }
            }
        }
    }

    #[test]
    fn test_rewind_first_turn() {
        let now = make_timestamp("2024-01-01T12:00:00.000");
        let mut card = make_card("a");
        let turn = card.record_incorrect(now, &Timeouts::default());
        card.rewind(&turn);
        assert_eq!(card.turn_count(), 0);
        assert!(card.is_first_turn());
        assert!(card.deadline().is_none());
    }

    #[test]
    fn test_side_facts() {
        let card = make_card("a");
        assert_eq!(card.side_facts(0), vec![("front", "a")]);
        assert_eq!(card.side_facts(1), vec![("back", "A")]);
        assert!(card.side_facts(2).is_empty());
    }

    #[test]
    fn test_hash_ignores_review_state() {
        let mut a = make_card("a");
        let b = make_card("a");
        a.record_incorrect(make_timestamp("2024-01-01T12:00:00.000"), &Timeouts::default());
        assert_eq!(a.hash(), b.hash());
        assert_ne!(a.hash(), make_card("b").hash());
    }
}
