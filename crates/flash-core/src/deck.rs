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

//! Decks: a definition of card styles plus the notes cards are built from.
//!
//! Two layouts are accepted, in any of the supported formats:
//!
//! ```yaml
//! definition:
//!   forward: [[word], [meaning]]
//! notes:
//!   unit1:
//!     - { word: chat, meaning: cat, tags: [noun] }
//! ```
//!
//! and the legacy layout, where `Definition` sits next to the units:
//!
//! ```yaml
//! Definition:
//!   forward: [[word], [meaning]]
//! unit1:
//!   - { word: chat, meaning: cat }
//! ```

use std::collections::BTreeMap;
use std::collections::HashSet;

use serde_json::Map;
use serde_json::Value;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::query::Query;
use crate::query::QueryAtom;
use crate::types::aliases::FactKey;
use crate::types::aliases::StyleName;
use crate::types::aliases::UnitName;
use crate::types::card::Card;

/// Style name to sides, each side a list of fact keys shown together.
pub type Definition = BTreeMap<StyleName, Vec<Vec<FactKey>>>;

/// The on-disk formats a deck can be written in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeckFormat {
    Json,
    Yaml,
    Toml,
}

impl DeckFormat {
    /// Guess the format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(DeckFormat::Json),
            "yaml" | "yml" => Some(DeckFormat::Yaml),
            "toml" => Some(DeckFormat::Toml),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct Note {
    facts: BTreeMap<FactKey, String>,
    tags: Vec<String>,
}

impl Note {
    pub fn new(facts: BTreeMap<FactKey, String>, tags: Vec<String>) -> Self {
        Self { facts, tags }
    }

    pub fn facts(&self) -> &BTreeMap<FactKey, String> {
        &self.facts
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    fn from_map(map: Map<String, Value>) -> Fallible<Self> {
        let mut facts = BTreeMap::new();
        let mut tags = Vec::new();
        for (key, value) in map {
            if key == "tags" {
                tags = serde_json::from_value(value)
                    .map_err(|_| ErrorReport::new("tags must be a list of strings"))?;
                continue;
            }
            let text = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => continue,
                Value::Array(_) | Value::Object(_) => {
                    return fail(format!("fact '{key}' must be text"));
                }
            };
            facts.insert(key, text);
        }
        Ok(Self { facts, tags })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Deck {
    definition: Definition,
    notes: BTreeMap<UnitName, Vec<Note>>,
}

impl Deck {
    /// Build a deck, checking that every style is usable and that every
    /// note has every fact the styles show.
    pub fn new(definition: Definition, notes: BTreeMap<UnitName, Vec<Note>>) -> Fallible<Self> {
        if definition.is_empty() {
            return fail("deck definition has no styles");
        }
        for (style, sides) in &definition {
            if sides.is_empty() || sides.iter().any(|side| side.is_empty()) {
                return fail(format!("style '{style}' has an empty side"));
            }
        }
        let keys: HashSet<&FactKey> = definition.values().flatten().flatten().collect();
        for (unit, unit_notes) in &notes {
            for (index, note) in unit_notes.iter().enumerate() {
                let mut missing: Vec<&&FactKey> =
                    keys.iter().filter(|key| !note.facts.contains_key(**key)).collect();
                missing.sort();
                if let Some(key) = missing.first() {
                    return fail(format!(
                        "note {} in unit '{unit}' is missing fact '{key}'",
                        index + 1
                    ));
                }
            }
        }
        Ok(Self { definition, notes })
    }

    pub fn parse(text: &str, format: DeckFormat) -> Fallible<Self> {
        let value: Value = match format {
            DeckFormat::Json => serde_json::from_str(text)?,
            DeckFormat::Yaml => serde_yaml::from_str(text)?,
            DeckFormat::Toml => toml::from_str(text)?,
        };
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Fallible<Self> {
        let Value::Object(mut map) = value else {
            return fail("deck must be a mapping");
        };
        let (definition, notes) = if let Some(definition) = map.remove("definition") {
            let notes = map
                .remove("notes")
                .unwrap_or_else(|| Value::Object(Map::new()));
            (definition, notes)
        } else {
            let definition = map
                .remove("Definition")
                .ok_or_else(|| ErrorReport::new("deck has no definition"))?;
            (definition, Value::Object(map))
        };
        let definition: Definition = serde_json::from_value(definition)?;
        let raw: BTreeMap<UnitName, Vec<Map<String, Value>>> = serde_json::from_value(notes)?;
        let mut notes = BTreeMap::new();
        for (unit, raw_notes) in raw {
            let unit_notes = raw_notes
                .into_iter()
                .map(Note::from_map)
                .collect::<Fallible<Vec<_>>>()
                .map_err(|e| ErrorReport::new(format!("in unit '{unit}': {}", e.message())))?;
            notes.insert(unit, unit_notes);
        }
        Self::new(definition, notes)
    }

    pub fn definition(&self) -> &Definition {
        &self.definition
    }

    pub fn units(&self) -> impl Iterator<Item = (&UnitName, &[Note])> {
        self.notes
            .iter()
            .map(|(unit, notes)| (unit, notes.as_slice()))
    }

    pub fn note_count(&self) -> usize {
        self.notes.values().map(Vec::len).sum()
    }

    pub fn has_unit(&self, unit: &str) -> bool {
        self.notes.contains_key(unit)
    }

    /// One card per selected note per style. Empty if the unit is not in
    /// this deck.
    pub fn cards_for(&self, atom: &QueryAtom) -> Vec<Card> {
        let Some(notes) = self.notes.get(&atom.unit) else {
            return Vec::new();
        };
        notes
            .iter()
            .filter(|note| atom.matches(&note.tags))
            .flat_map(|note| {
                self.definition.iter().map(|(style, sides)| {
                    Card::new(
                        atom.unit.clone(),
                        style.clone(),
                        sides.clone(),
                        note.facts.clone(),
                    )
                })
            })
            .collect()
    }

    pub fn select(&self, query: &Query) -> Fallible<Vec<Card>> {
        select_cards(std::slice::from_ref(self), query)
    }
}

/// Build the cards a query selects across several decks. An empty query
/// selects everything. Duplicate cards are dropped.
pub fn select_cards(decks: &[Deck], query: &Query) -> Fallible<Vec<Card>> {
    let atoms: Vec<QueryAtom> = if query.is_empty() {
        let mut units: Vec<&UnitName> = decks
            .iter()
            .flat_map(|deck| deck.notes.keys())
            .collect();
        units.sort();
        units.dedup();
        units
            .into_iter()
            .map(|unit| QueryAtom::unit(unit.clone()))
            .collect()
    } else {
        query.atoms().to_vec()
    };
    let mut cards = Vec::new();
    for atom in &atoms {
        if !decks.iter().any(|deck| deck.has_unit(&atom.unit)) {
            return fail(format!("unknown unit: '{}'", atom.unit));
        }
        for deck in decks {
            cards.extend(deck.cards_for(atom));
        }
    }
    Ok(dedup_cards(cards))
}

/// Remove cards with the same content as an earlier card.
pub fn dedup_cards(cards: Vec<Card>) -> Vec<Card> {
    let mut seen = HashSet::new();
    cards
        .into_iter()
        .filter(|card| {
            let hash = card.hash();
            let fresh = seen.insert(hash);
            if !fresh {
                log::debug!("Dropping duplicate card {hash} from unit '{}'.", card.unit());
            }
            fresh
        })
        .collect()
}
