use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::search::entry::{Entry, SourceRecord, Target};
use crate::search::error::MalformedDataError;

/// How an entry's key matched a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Prefix,
    Substring,
}

/// An entry returned from [`SearchIndex::query_ranked`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'a> {
    pub kind: MatchKind,
    pub entry: &'a Entry,
}

/// Immutable in-memory index over documentation entries
///
/// Built once by [`SearchIndex::load`] and only read afterwards, so a
/// loaded index can be shared across threads behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    entries: Vec<Entry>,
    by_key: HashMap<String, Vec<usize>>,
}

/// Trim and lower-case a key or query
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

impl SearchIndex {
    /// Build an index from decoded records, checking every entry invariant
    pub fn load<I>(records: I) -> Result<Self, MalformedDataError>
    where
        I: IntoIterator<Item = SourceRecord>,
    {
        let mut entries: Vec<Entry> = Vec::new();
        let mut by_key: HashMap<String, Vec<usize>> = HashMap::new();

        for (position, record) in records.into_iter().enumerate() {
            let key = record
                .key
                .as_deref()
                .map(normalize)
                .filter(|key| !key.is_empty())
                .ok_or(MalformedDataError::MissingKey { record: position })?;

            let label = match record.targets.first() {
                Some(first) => first.label.clone(),
                None => {
                    return Err(MalformedDataError::EmptyTargets {
                        record: position,
                        key,
                    });
                }
            };
            let targets: Vec<Target> = record.targets.into_iter().map(Target::from).collect();

            let slots = by_key.entry(key.clone()).or_default();
            if slots.iter().any(|&i| entries[i].targets == targets) {
                return Err(MalformedDataError::DuplicateEntry {
                    record: position,
                    key,
                });
            }
            slots.push(entries.len());

            entries.push(Entry {
                key,
                label,
                targets,
            });
        }

        tracing::debug!(
            "Loaded search index with {} entries ({} distinct keys)",
            entries.len(),
            by_key.len()
        );

        Ok(Self { entries, by_key })
    }

    /// Entries whose key contains `text`, exact matches first, then prefix
    /// matches, then the rest. Insertion order is kept within each group.
    pub fn query(&self, text: &str) -> Vec<&Entry> {
        self.query_ranked(text)
            .into_iter()
            .map(|m| m.entry)
            .collect()
    }

    /// Like [`query`](Self::query), but also reports how each entry matched
    pub fn query_ranked(&self, text: &str) -> Vec<Match<'_>> {
        let needle = normalize(text);

        let mut exact = Vec::new();
        let mut prefix = Vec::new();
        let mut substring = Vec::new();

        for entry in &self.entries {
            if entry.key == needle {
                exact.push(Match {
                    kind: MatchKind::Exact,
                    entry,
                });
            } else if entry.key.starts_with(&needle) {
                prefix.push(Match {
                    kind: MatchKind::Prefix,
                    entry,
                });
            } else if entry.key.contains(&needle) {
                substring.push(Match {
                    kind: MatchKind::Substring,
                    entry,
                });
            }
        }

        exact.extend(prefix);
        exact.extend(substring);
        exact
    }

    /// All entries stored under exactly this key
    pub fn lookup(&self, key: &str) -> Vec<&Entry> {
        self.by_key
            .get(&normalize(key))
            .map(|slots| slots.iter().map(|&i| &self.entries[i]).collect())
            .unwrap_or_default()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Distinct keys in first-seen order
    pub fn keys(&self) -> Vec<&str> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(i, entry)| self.by_key[&entry.key].first() == Some(i))
            .map(|(_, entry)| entry.key.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
