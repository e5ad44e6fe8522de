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

mod terminal;

use std::path::Path;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use flash_core::clock::SystemClock;
use flash_core::error::Fallible;
use flash_core::query::Query;
use flash_core::rng::TinyRng;
use flash_core::session::Session;
use flash_core::session::SessionOutcome;

use crate::cmd::review::terminal::TerminalPresenter;
use crate::collection::Collection;
use crate::config::Settings;

pub struct ReviewConfig {
    pub path: String,
    pub query: Vec<String>,
    /// Explicit settings file. Falls back to the one next to the deck.
    pub settings_path: Option<String>,
    /// Settings given on the command line.
    pub overrides: Settings,
    pub seed: Option<u64>,
}

pub fn review(config: ReviewConfig) -> Fallible<()> {
    let path = Path::new(&config.path);
    let collection = Collection::load(path)?;
    let query = Query::parse(&config.query.join(" "))?;
    let cards = collection.select(&query)?;
    if cards.is_empty() {
        println!("No cards to review.");
        return Ok(());
    }

    let settings =
        Settings::find(config.settings_path.as_deref(), path)?.merge(config.overrides);
    let queue_config = settings.queue_config();
    let seed = config.seed.unwrap_or_else(seed_from_clock);
    log::debug!(
        "Reviewing {} cards with {queue_config:?} and seed {seed}.",
        cards.len()
    );

    let mut session = Session::new(cards, queue_config);
    let mut rng = TinyRng::from_seed(seed);
    let outcome = {
        let mut presenter = TerminalPresenter::new()?;
        session.run(&mut presenter, &SystemClock, &mut rng)?
    };
    match outcome {
        SessionOutcome::Completed => println!("\n\n  Review done!\n"),
        SessionOutcome::Quit => println!("\n  Quit!\n"),
    }
    Ok(())
}

fn seed_from_clock() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}
