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

use std::path::Path;

use flash_core::error::Fallible;
use flash_core::query::Query;

use crate::collection::Collection;

/// Load and validate every deck at the path, and print a summary.
pub fn check_collection(path: &str) -> Fallible<()> {
    let collection = Collection::load(Path::new(path))?;
    for line in summary(&collection)? {
        println!("{line}");
    }
    Ok(())
}

fn summary(collection: &Collection) -> Fallible<Vec<String>> {
    let mut lines = Vec::new();
    let mut decks = 0;
    for (path, deck) in collection.decks() {
        decks += 1;
        let units: Vec<&str> = deck.units().map(|(unit, _)| unit.as_str()).collect();
        lines.push(format!(
            "{}: {} notes in {} units ({}), {} styles.",
            path.display(),
            deck.note_count(),
            units.len(),
            units.join(", "),
            deck.definition().len(),
        ));
    }
    let cards = collection.select(&Query::default())?;
    lines.push(format!("{decks} decks, {} unique cards.", cards.len()));
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::tests::make_collection_dir;

    #[test]
    fn test_summary() -> Fallible<()> {
        let dir = make_collection_dir()?;
        let collection = Collection::load(dir.path())?;
        let lines = summary(&collection)?;
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("french.yaml: 2 notes in 1 units (animals), 2 styles."));
        assert!(lines[1].ends_with("numbers.json: 2 notes in 1 units (numbers), 1 styles."));
        assert_eq!(lines[2], "2 decks, 6 unique cards.");
        Ok(())
    }

    #[test]
    fn test_check_collection() -> Fallible<()> {
        let dir = make_collection_dir()?;
        check_collection(&dir.path().display().to_string())
    }

    #[test]
    fn test_check_missing() {
        assert!(check_collection("./derpherp").is_err());
    }
}
