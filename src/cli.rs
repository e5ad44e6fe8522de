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

use clap::Parser;
use flash_core::error::Fallible;

use crate::cmd::check::check_collection;
use crate::cmd::review::ReviewConfig;
use crate::cmd::review::review;
use crate::config::Settings;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Review cards in the terminal.
    Review {
        /// Path to a deck file, or to a directory of deck files.
        path: String,
        /// What to review: `unit` or `unit[tag1,tag2]`, any number of times. By default, every unit is reviewed.
        query: Vec<String>,
        /// Minutes a card waits after a correct answer. Default is 10.
        #[arg(long)]
        right_timeout: Option<u32>,
        /// Minutes a card waits after an incorrect answer. Default is 1.
        #[arg(long)]
        wrong_timeout: Option<u32>,
        /// How many recent reviews a card is kept out of while others are ready. Default is 5.
        #[arg(long)]
        cluster_window: Option<usize>,
        /// Path to a TOML settings file. By default, `flash.toml` next to the deck is used if it exists.
        #[arg(long)]
        config: Option<String>,
        /// Seed for picking cards. By default, the seed is taken from the clock.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Check that a deck loads, and print its size.
    Check {
        /// Path to a deck file, or to a directory of deck files.
        path: String,
    },
}

pub fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Review {
            path,
            query,
            right_timeout,
            wrong_timeout,
            cluster_window,
            config,
            seed,
        } => {
            let config = ReviewConfig {
                path,
                query,
                settings_path: config,
                overrides: Settings {
                    right_timeout,
                    wrong_timeout,
                    cluster_window,
                },
                seed,
            };
            review(config)
        }
        Command::Check { path } => check_collection(&path),
    }
}
