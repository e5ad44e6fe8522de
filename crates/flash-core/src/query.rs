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

//! Queries selecting which notes to review.
//!
//! A query is a whitespace-separated list of atoms:
//!
//! - `unit`: every note in the unit.
//! - `unit[tag1,tag2]`: notes in the unit with at least one of the tags.

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

use crate::types::aliases::UnitName;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryAtom {
    pub unit: UnitName,
    /// `None` selects every note in the unit.
    pub tags: Option<Vec<String>>,
}

impl QueryAtom {
    pub fn unit(unit: impl Into<UnitName>) -> Self {
        Self {
            unit: unit.into(),
            tags: None,
        }
    }

    /// Whether a note with these tags is selected.
    pub fn matches(&self, note_tags: &[String]) -> bool {
        match &self.tags {
            None => true,
            Some(tags) => tags.iter().any(|tag| note_tags.contains(tag)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Query {
    atoms: Vec<QueryAtom>,
}

impl Query {
    pub fn parse(text: &str) -> Result<Self, QueryError> {
        let atoms = text
            .split_whitespace()
            .map(QueryAtom::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { atoms })
    }

    pub fn atoms(&self) -> &[QueryAtom] {
        &self.atoms
    }

    /// An empty query selects every unit.
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }
}

impl FromStr for QueryAtom {
    type Err = QueryError;

    fn from_str(atom: &str) -> Result<Self, Self::Err> {
        let invalid = || QueryError {
            atom: atom.to_string(),
        };
        let (unit, tags) = match atom.split_once('[') {
            None => (atom, None),
            Some((unit, rest)) => {
                let inner = rest.strip_suffix(']').ok_or_else(invalid)?;
                let tags: Vec<String> = inner.split(',').map(str::to_string).collect();
                if !tags.iter().all(|tag| is_word(tag)) {
                    return Err(invalid());
                }
                (unit, Some(tags))
            }
        };
        if !is_word(unit) {
            return Err(invalid());
        }
        Ok(QueryAtom {
            unit: unit.to_string(),
            tags,
        })
    }
}

fn is_word(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_')
}

#[derive(Debug, PartialEq)]
pub struct QueryError {
    pub atom: String,
}

impl Display for QueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid query atom '{}'. Expected 'unit' or 'unit[tag1,tag2]'.",
            self.atom
        )
    }
}

impl Error for QueryError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit() -> Result<(), QueryError> {
        let atom: QueryAtom = "unit".parse()?;
        assert_eq!(atom, QueryAtom::unit("unit"));
        Ok(())
    }

    #[test]
    fn test_unit_and_single_tag() -> Result<(), QueryError> {
        let atom: QueryAtom = "unit[a]".parse()?;
        assert_eq!(atom.unit, "unit");
        assert_eq!(atom.tags, Some(vec!["a".to_string()]));
        Ok(())
    }

    #[test]
    fn test_unit_and_multiple_tags() -> Result<(), QueryError> {
        let atom: QueryAtom = "unit[a,b,c]".parse()?;
        assert_eq!(
            atom.tags,
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
        Ok(())
    }

    #[test]
    fn test_bogus_atoms() {
        for atom in ["test[", "[a]", "[a,b]", "]a&dsf[$&adsf^,ds,[]", "u[a,]", "u[]", "u[a]b"] {
            assert_eq!(
                atom.parse::<QueryAtom>(),
                Err(QueryError {
                    atom: atom.to_string()
                }),
                "{atom}"
            );
        }
    }

    #[test]
    fn test_parse_query() -> Result<(), QueryError> {
        let query = Query::parse("u1 u2[a,b,c]")?;
        assert_eq!(
            query.atoms(),
            &[
                QueryAtom::unit("u1"),
                QueryAtom {
                    unit: "u2".to_string(),
                    tags: Some(vec!["a".to_string(), "b".to_string(), "c".to_string()]),
                },
            ]
        );
        Ok(())
    }

    #[test]
    fn test_empty_query() -> Result<(), QueryError> {
        assert!(Query::parse("")?.is_empty());
        assert!(Query::parse("  \t ")?.is_empty());
        Ok(())
    }

    #[test]
    fn test_matches() {
        let all = QueryAtom::unit("u");
        let tagged = QueryAtom {
            unit: "u".to_string(),
            tags: Some(vec!["verb".to_string(), "noun".to_string()]),
        };
        let note_tags = vec!["noun".to_string()];
        assert!(all.matches(&[]));
        assert!(tagged.matches(&note_tags));
        assert!(!tagged.matches(&[]));
        assert!(!tagged.matches(&["adj".to_string()]));
    }
}
