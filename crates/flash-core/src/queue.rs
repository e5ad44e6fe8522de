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

//! The review queue: which card comes next, where an answered card goes,
//! and how answers are undone.
//!
//! Cards live in an arena and are referred to by [`CardId`]. Every card is
//! at all times in exactly one of: pending (ready now), waiting (serving a
//! timeout), done, the suspended slot, or in flight (being presented).

use std::mem::take;

use crate::rng::RandomSource;
use crate::types::card::Card;
use crate::types::card::ReviewAction;
use crate::types::card::Timeouts;
use crate::types::card::Turn;
use crate::types::card_id::CardId;
use crate::types::timestamp::Timestamp;

/// How many of the most recent reviews a card must not appear in to be
/// picked while other cards are ready.
pub const CLUSTER_WINDOW: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QueueConfig {
    pub timeouts: Timeouts,
    pub cluster_window: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            timeouts: Timeouts::default(),
            cluster_window: CLUSTER_WINDOW,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Answer {
    Correct,
    Incorrect,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Location {
    Pending,
    Waiting,
    Done,
    Suspended,
    InFlight,
}

/// An entry in the review log.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReviewRecord {
    pub card: CardId,
    pub turn: Turn,
}

/// Card counts for display. Suspended cards count as waiting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Stats {
    pub pending: usize,
    pub waiting: usize,
    pub done: usize,
}

pub struct ReviewQueue {
    cards: Vec<Card>,
    pending: Vec<CardId>,
    waiting: Vec<CardId>,
    done: Vec<CardId>,
    suspended: Option<CardId>,
    in_flight: Option<CardId>,
    log: Vec<ReviewRecord>,
    config: QueueConfig,
}

impl ReviewQueue {
    pub fn new(cards: Vec<Card>, config: QueueConfig) -> Self {
        let mut pending = Vec::new();
        let mut done = Vec::new();
        for (index, card) in cards.iter().enumerate() {
            if card.is_done() {
                done.push(CardId::new(index));
            } else {
                pending.push(CardId::new(index));
            }
        }
        Self {
            cards,
            pending,
            waiting: Vec::new(),
            done,
            suspended: None,
            in_flight: None,
            log: Vec::new(),
            config,
        }
    }

    /// The card with this id. `None` for ids from another queue.
    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.get(id.index())
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// The card being presented, if any.
    pub fn current(&self) -> Option<CardId> {
        self.in_flight
    }

    pub fn log(&self) -> &[ReviewRecord] {
        &self.log
    }

    pub fn stats(&self) -> Stats {
        Stats {
            pending: self.pending.len(),
            waiting: self.waiting.len() + usize::from(self.suspended.is_some()),
            done: self.done.len(),
        }
    }

    /// True when there is nothing left to review.
    pub fn is_finished(&self) -> bool {
        self.in_flight.is_none()
            && self.suspended.is_none()
            && self.pending.is_empty()
            && self.waiting.is_empty()
    }

    pub fn location(&self, id: CardId) -> Option<Location> {
        if self.in_flight == Some(id) {
            Some(Location::InFlight)
        } else if self.suspended == Some(id) {
            Some(Location::Suspended)
        } else if self.pending.contains(&id) {
            Some(Location::Pending)
        } else if self.waiting.contains(&id) {
            Some(Location::Waiting)
        } else if self.done.contains(&id) {
            Some(Location::Done)
        } else {
            None
        }
    }

    /// Choose the card to present and put it in flight. If a card is
    /// already in flight (it was not answered), it is chosen again. Returns
    /// `None` once every card is done.
    pub fn next(&mut self, now: Timestamp, rng: &mut impl RandomSource) -> Option<CardId> {
        if let Some(id) = self.in_flight {
            return Some(id);
        }
        if let Some(id) = self.suspended.take() {
            log::debug!("Releasing suspended card {id}.");
            self.waiting.push(id);
        }
        self.promote_expired(now);
        self.force_promote();
        let id = self.select(rng)?;
        self.in_flight = Some(id);
        Some(id)
    }

    /// Apply an answer to the card in flight. Returns what the answer did,
    /// or `None` if no card is in flight.
    pub fn answer(&mut self, answer: Answer, now: Timestamp) -> Option<ReviewAction> {
        let id = self.in_flight.take()?;
        let card = &mut self.cards[id.index()];
        let turn = match answer {
            Answer::Correct => card.record_correct(now, &self.config.timeouts),
            Answer::Incorrect => card.record_incorrect(now, &self.config.timeouts),
        };
        match turn.action {
            ReviewAction::Done => self.done.push(id),
            ReviewAction::Correct | ReviewAction::Incorrect => self.waiting.push(id),
        }
        self.log.push(ReviewRecord { card: id, turn });
        log::debug!("Card {id} answered: {}.", turn.action.as_str());
        Some(turn.action)
    }

    /// Undo the most recent answer. The card in flight goes back to
    /// pending. Returns the card that was rewound, or `None` if there is
    /// nothing to undo, in which case nothing changes.
    pub fn undo(&mut self) -> Option<CardId> {
        let record = self.log.pop()?;
        if let Some(current) = self.in_flight.take() {
            self.pending.push(current);
        }
        let id = record.card;
        self.detach(id);
        let card = &mut self.cards[id.index()];
        card.rewind(&record.turn);
        if card.is_first_turn() {
            self.pending.push(id);
        } else {
            self.waiting.push(id);
        }
        log::debug!("Undid {} on card {id}.", record.turn.action.as_str());
        Some(id)
    }

    fn promote_expired(&mut self, now: Timestamp) {
        let cards = &self.cards;
        let (ready, still_waiting): (Vec<CardId>, Vec<CardId>) = take(&mut self.waiting)
            .into_iter()
            .partition(|id| cards[id.index()].is_eligible(now));
        if !ready.is_empty() {
            log::debug!("Promoting {} expired card(s).", ready.len());
        }
        self.waiting = still_waiting;
        self.pending.extend(ready);
    }

    /// With nothing ready, promote the card whose wait ends first rather
    /// than stall. Ties go to the card that started waiting first.
    fn force_promote(&mut self) {
        if !self.pending.is_empty() {
            return;
        }
        let earliest = self
            .waiting
            .iter()
            .enumerate()
            .min_by_key(|(_, id)| self.cards[id.index()].deadline())
            .map(|(pos, _)| pos);
        if let Some(pos) = earliest {
            let id = self.waiting.remove(pos);
            log::debug!("Nothing ready, promoting card {id} early.");
            self.pending.push(id);
        }
    }

    fn select(&mut self, rng: &mut impl RandomSource) -> Option<CardId> {
        loop {
            if self.pending.is_empty() {
                return None;
            }
            let pos = rng.pick(self.pending.len());
            let candidate = self.pending.remove(pos);
            // A lone candidate is taken even if it was just reviewed.
            if self.pending.is_empty() || !self.recently_reviewed(candidate) {
                return Some(candidate);
            }
            log::debug!("Card {candidate} was reviewed recently, suspending it.");
            if let Some(previous) = self.suspended.replace(candidate) {
                self.waiting.push(previous);
            }
        }
    }

    fn recently_reviewed(&self, id: CardId) -> bool {
        let window = self.config.cluster_window;
        self.log.len() >= window
            && self
                .log
                .iter()
                .rev()
                .take(window)
                .any(|record| record.card == id)
    }

    fn detach(&mut self, id: CardId) {
        if self.suspended == Some(id) {
            self.suspended = None;
        }
        self.pending.retain(|&other| other != id);
        self.waiting.retain(|&other| other != id);
        self.done.retain(|&other| other != id);
    }
}
