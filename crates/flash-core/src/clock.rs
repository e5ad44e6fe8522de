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

use std::cell::Cell;

use chrono::TimeDelta;

use crate::types::timestamp::Timestamp;

/// Where the session reads wall-clock time from.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// The local system clock.
#[cfg(feature = "clock")]
pub struct SystemClock;

#[cfg(feature = "clock")]
impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock that only moves when told to.
pub struct ManualClock {
    now: Cell<Timestamp>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn advance(&self, delta: TimeDelta) {
        self.now.set(self.now.get().plus(delta));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fallible;

    #[test]
    fn test_manual_clock_advances() -> Fallible<()> {
        let clock = ManualClock::new(Timestamp::try_from("2024-01-01T12:00:00.000")?);
        clock.advance(TimeDelta::seconds(90));
        assert_eq!(clock.now().to_string(), "2024-01-01T12:01:30.000");
        Ok(())
    }
}
