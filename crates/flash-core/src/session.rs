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

//! The review loop. Pulls cards from the queue, shows them through a
//! [`Presenter`], and feeds the replies back into the queue.

use crate::clock::Clock;
use crate::error::Fallible;
use crate::error::fail;
use crate::queue::Answer;
use crate::queue::QueueConfig;
use crate::queue::ReviewQueue;
use crate::queue::Stats;
use crate::rng::RandomSource;
use crate::types::card::Card;
use crate::types::card_id::CardId;

/// What the user did at a prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reply {
    /// Any key without a meaning of its own. Reveals the next side; at the
    /// final prompt it counts as incorrect.
    Continue,
    Correct,
    Incorrect,
    Undo,
    Help,
    Quit,
    /// The user asked to suspend the process.
    Pause,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prompt {
    /// Waiting for a key to reveal the next side.
    Reveal,
    /// Waiting for the user to grade their answer.
    Outcome,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Every card is done.
    Completed,
    /// The user quit before finishing.
    Quit,
}

/// Everything needed to draw a card on screen.
pub struct CardView<'a> {
    pub card: &'a Card,
    /// How many sides are visible, starting from the first.
    pub revealed: usize,
    pub stats: Stats,
    /// Whether the previous answer was correct. `None` at the start of the
    /// session and after an undo.
    pub previous: Option<bool>,
}

pub trait Presenter {
    fn render(&mut self, view: &CardView) -> Fallible<()>;

    /// Block until the user replies.
    fn read(&mut self, prompt: Prompt) -> Fallible<Reply>;

    fn help(&mut self) -> Fallible<()>;

    /// Hand control to the host to suspend the process. Returns once the
    /// process is resumed.
    fn pause(&mut self) -> Fallible<()>;
}

pub struct Session {
    queue: ReviewQueue,
    previous: Option<bool>,
}

impl Session {
    pub fn new(cards: Vec<Card>, config: QueueConfig) -> Self {
        Self {
            queue: ReviewQueue::new(cards, config),
            previous: None,
        }
    }

    pub fn queue(&self) -> &ReviewQueue {
        &self.queue
    }

    pub fn run(
        &mut self,
        presenter: &mut impl Presenter,
        clock: &impl Clock,
        rng: &mut impl RandomSource,
    ) -> Fallible<SessionOutcome> {
        // An unanswered card stays in flight, so `next` presents it again
        // after help, pause, or an undo with nothing to undo.
        while let Some(id) = self.queue.next(clock.now(), rng) {
            match self.present(id, presenter)? {
                Reply::Correct => self.answer(Answer::Correct, clock),
                Reply::Incorrect | Reply::Continue => self.answer(Answer::Incorrect, clock),
                Reply::Undo => {
                    if self.queue.undo().is_some() {
                        self.previous = None;
                    }
                }
                Reply::Help => presenter.help()?,
                Reply::Pause => presenter.pause()?,
                Reply::Quit => {
                    log::debug!("Session quit with {:?} remaining.", self.queue.stats());
                    return Ok(SessionOutcome::Quit);
                }
            }
        }
        log::debug!("Session completed after {} reviews.", self.queue.log().len());
        Ok(SessionOutcome::Completed)
    }

    /// Show the card side by side, then ask for the outcome. Returns early
    /// if the user does anything other than reveal between sides.
    fn present(&self, id: CardId, presenter: &mut impl Presenter) -> Fallible<Reply> {
        let Some(card) = self.queue.card(id) else {
            return fail(format!("card {id} is not in this session"));
        };
        let total = card.sides().len().max(1);
        for revealed in 1..total {
            presenter.render(&self.view(card, revealed))?;
            match presenter.read(Prompt::Reveal)? {
                Reply::Continue | Reply::Correct | Reply::Incorrect => {}
                other => return Ok(other),
            }
        }
        presenter.render(&self.view(card, total))?;
        presenter.read(Prompt::Outcome)
    }

    fn view<'a>(&self, card: &'a Card, revealed: usize) -> CardView<'a> {
        CardView {
            card,
            revealed,
            stats: self.queue.stats(),
            previous: self.previous,
        }
    }

    fn answer(&mut self, answer: Answer, clock: &impl Clock) {
        if let Some(action) = self.queue.answer(answer, clock.now()) {
            self.previous = Some(action.is_correct());
        }
    }
}
