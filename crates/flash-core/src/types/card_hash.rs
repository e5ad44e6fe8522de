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

use std::fmt::Display;
use std::fmt::Formatter;

/// Content fingerprint of a card. Cards with the same hash are duplicates.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct CardHash {
    inner: blake3::Hash,
}

impl Display for CardHash {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.inner.to_hex())
    }
}

pub struct Hasher {
    inner: blake3::Hasher,
}

impl Hasher {
    pub fn new() -> Self {
        Self {
            inner: blake3::Hasher::new(),
        }
    }

    /// Feed a length-prefixed field, so that `("ab", "c")` and `("a", "bc")`
    /// hash differently.
    pub fn field(&mut self, data: &str) {
        self.inner.update(&(data.len() as u64).to_le_bytes());
        self.inner.update(data.as_bytes());
    }

    pub fn finalize(self) -> CardHash {
        CardHash {
            inner: self.inner.finalize(),
        }
    }
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_boundaries() {
        let mut a = Hasher::new();
        a.field("ab");
        a.field("c");
        let mut b = Hasher::new();
        b.field("a");
        b.field("bc");
        assert_ne!(a.finalize(), b.finalize());
    }

    #[test]
    fn test_deterministic() {
        let mut a = Hasher::new();
        a.field("front");
        let mut b = Hasher::new();
        b.field("front");
        let (a, b) = (a.finalize(), b.finalize());
        assert_eq!(a, b);
        assert_eq!(a.to_string().len(), 64);
    }
}
