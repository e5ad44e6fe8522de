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

//! flash-core: review scheduling for terminal flashcards.
//!
//! This library has no terminal or filesystem access. It provides:
//! - Card review state and the two-correct-answers-in-a-row rule
//! - The review queue: selection, timeouts, and undo
//! - The session loop, driving an abstract presenter
//! - Decks and queries, from which cards are built

pub mod clock;
pub mod deck;
pub mod error;
pub mod query;
pub mod queue;
pub mod rng;
pub mod session;
pub mod types;

// Re-exports for convenience
pub use deck::{Deck, DeckFormat, select_cards};
pub use error::{ErrorReport, Fallible, fail};
pub use query::{Query, QueryAtom};
pub use queue::{QueueConfig, ReviewQueue, Stats};
pub use session::{CardView, Presenter, Prompt, Reply, Session, SessionOutcome};
pub use types::card::{Card, ReviewAction, Timeouts};
pub use types::card_id::CardId;
pub use types::timestamp::Timestamp;
