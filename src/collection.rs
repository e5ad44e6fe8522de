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

use std::fs::read_to_string;
use std::path::Path;
use std::path::PathBuf;

use flash_core::deck::Deck;
use flash_core::deck::DeckFormat;
use flash_core::deck::select_cards;
use flash_core::error::ErrorReport;
use flash_core::error::Fallible;
use flash_core::error::fail;
use flash_core::query::Query;
use flash_core::types::card::Card;
use walkdir::WalkDir;

use crate::config::SETTINGS_FILE;

/// The decks found at a path: either a single deck file, or every deck
/// file under a directory.
pub struct Collection {
    paths: Vec<PathBuf>,
    decks: Vec<Deck>,
}

impl Collection {
    pub fn load(path: &Path) -> Fallible<Self> {
        if !path.exists() {
            return fail("path does not exist.");
        }
        let mut collection = Collection {
            paths: Vec::new(),
            decks: Vec::new(),
        };
        if path.is_file() {
            let format = deck_format(path).ok_or_else(|| {
                ErrorReport::new(format!(
                    "unsupported deck file '{}'. Expected .json, .yaml, .yml or .toml.",
                    path.display()
                ))
            })?;
            collection.add(path, format)?;
            return Ok(collection);
        }
        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry.map_err(|e| ErrorReport::new(format!("failed to walk: {e}")))?;
            let path = entry.path();
            if !entry.file_type().is_file() || entry.file_name() == SETTINGS_FILE {
                continue;
            }
            if let Some(format) = deck_format(path) {
                collection.add(path, format)?;
            }
        }
        if collection.decks.is_empty() {
            return fail("no deck files found.");
        }
        Ok(collection)
    }

    fn add(&mut self, path: &Path, format: DeckFormat) -> Fallible<()> {
        let text = read_to_string(path)?;
        let deck = Deck::parse(&text, format)
            .map_err(|e| ErrorReport::new(format!("{}: {}", path.display(), e.message())))?;
        log::debug!(
            "Loaded deck {} with {} notes.",
            path.display(),
            deck.note_count()
        );
        self.paths.push(path.to_path_buf());
        self.decks.push(deck);
        Ok(())
    }

    pub fn decks(&self) -> impl Iterator<Item = (&Path, &Deck)> {
        self.paths
            .iter()
            .map(PathBuf::as_path)
            .zip(self.decks.iter())
    }

    pub fn select(&self, query: &Query) -> Fallible<Vec<Card>> {
        select_cards(&self.decks, query)
    }
}

fn deck_format(path: &Path) -> Option<DeckFormat> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(DeckFormat::from_extension)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::fs::create_dir_all;
    use std::fs::write;

    use tempfile::TempDir;
    use tempfile::tempdir;

    use super::*;

    pub(crate) const YAML_DECK: &str = "
Definition:
  forward: [[word], [meaning]]
  backward: [[meaning], [word]]
animals:
  - word: chat
    meaning: cat
  - word: chien
    meaning: dog
";

    pub(crate) const JSON_DECK: &str = r#"{
        "definition": { "forward": [["kanji"], ["reading", "meaning"]] },
        "notes": {
            "numbers": [
                { "kanji": "一", "reading": "ichi", "meaning": "one", "tags": ["basic"] },
                { "kanji": "百", "reading": "hyaku", "meaning": "hundred" }
            ]
        }
    }"#;

    pub(crate) fn make_collection_dir() -> Fallible<TempDir> {
        let dir = tempdir()?;
        write(dir.path().join("french.yaml"), YAML_DECK)?;
        create_dir_all(dir.path().join("japanese"))?;
        write(dir.path().join("japanese").join("numbers.json"), JSON_DECK)?;
        write(dir.path().join(SETTINGS_FILE), "right_timeout = 5\n")?;
        write(dir.path().join("README.md"), "# Decks\n")?;
        Ok(dir)
    }

    #[test]
    fn test_load_directory() -> Fallible<()> {
        let dir = make_collection_dir()?;
        let collection = Collection::load(dir.path())?;
        let names: Vec<String> = collection
            .decks()
            .map(|(path, _)| path.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["french.yaml", "numbers.json"]);
        let cards = collection.select(&Query::default())?;
        // Two notes in two styles, plus two notes in one style.
        assert_eq!(cards.len(), 6);
        Ok(())
    }

    #[test]
    fn test_load_single_file() -> Fallible<()> {
        let dir = make_collection_dir()?;
        let collection = Collection::load(&dir.path().join("french.yaml"))?;
        assert_eq!(collection.decks().count(), 1);
        let cards = collection.select(&Query::parse("animals")?)?;
        assert_eq!(cards.len(), 4);
        Ok(())
    }

    #[test]
    fn test_select_with_tags() -> Fallible<()> {
        let dir = make_collection_dir()?;
        let collection = Collection::load(dir.path())?;
        let cards = collection.select(&Query::parse("numbers[basic]")?)?;
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].fact("reading"), Some("ichi"));
        Ok(())
    }

    #[test]
    fn test_nonexistent_path() {
        let result = Collection::load(Path::new("./derpherp"));
        assert_eq!(
            result.err().map(|e| e.to_string()),
            Some("error: path does not exist.".to_string())
        );
    }

    #[test]
    fn test_empty_directory() -> Fallible<()> {
        let dir = tempdir()?;
        let result = Collection::load(dir.path());
        assert_eq!(
            result.err().map(|e| e.to_string()),
            Some("error: no deck files found.".to_string())
        );
        Ok(())
    }

    #[test]
    fn test_unsupported_file() -> Fallible<()> {
        let dir = make_collection_dir()?;
        assert!(Collection::load(&dir.path().join("README.md")).is_err());
        Ok(())
    }

    #[test]
    fn test_broken_deck_names_file() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().join("broken.json");
        write(&path, "{")?;
        let err = Collection::load(dir.path()).err().unwrap();
        assert!(err.to_string().contains("broken.json: JSON error"));
        Ok(())
    }
}
