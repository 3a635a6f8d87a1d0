use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::keys::CanonicalKey;

/// How duplicate secondary keys are resolved while building an index.
#[derive(Debug)]
pub enum ConflictPolicy<S> {
    LastWriteWins,
    /// The first record seen for a key is kept.
    FirstWins,
    /// Keep the record with the greatest value; on equal values the first one seen stays.
    KeepGreatest(fn(&S) -> i64),
}

impl<S> Clone for ConflictPolicy<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for ConflictPolicy<S> {}

/// Result of a secondary lookup. A miss is kept as an explicit placeholder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Lookup<S> {
    Found(S),
    Unavailable,
}

impl<S> Lookup<S> {
    pub fn found(&self) -> Option<&S> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::Unavailable => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Lookup::Unavailable)
    }

    pub fn map<T>(self, f: impl FnOnce(S) -> T) -> Lookup<T> {
        match self {
            Lookup::Found(value) => Lookup::Found(f(value)),
            Lookup::Unavailable => Lookup::Unavailable,
        }
    }
}

impl<S> From<Option<S>> for Lookup<S> {
    fn from(value: Option<S>) -> Self {
        match value {
            Some(value) => Lookup::Found(value),
            None => Lookup::Unavailable,
        }
    }
}

/// A primary record with the secondary record it matched, if any.
/// `Joined` values can be fed back into [`join_indexed`] to chain more sources.
#[derive(Debug, Clone, PartialEq)]
pub struct Joined<P, S> {
    pub primary: P,
    pub secondary: Lookup<S>,
}

/// One-to-one index over a secondary collection. Records with a blank key are left out.
#[derive(Debug, Clone)]
pub struct SecondaryIndex<S> {
    entries: HashMap<CanonicalKey, S>,
}

impl<S> SecondaryIndex<S> {
    pub fn build(
        records: impl IntoIterator<Item = S>,
        key: impl Fn(&S) -> CanonicalKey,
        policy: ConflictPolicy<S>,
    ) -> Self {
        let mut entries: HashMap<CanonicalKey, S> = HashMap::new();
        for record in records {
            let k = key(&record);
            if k.is_blank() {
                continue;
            }
            match policy {
                ConflictPolicy::LastWriteWins => {
                    entries.insert(k, record);
                }
                ConflictPolicy::FirstWins => {
                    entries.entry(k).or_insert(record);
                }
                ConflictPolicy::KeepGreatest(rank) => match entries.get(&k) {
                    Some(existing) if rank(existing) >= rank(&record) => {}
                    _ => {
                        entries.insert(k, record);
                    }
                },
            }
        }
        Self { entries }
    }

    pub fn get(&self, key: &CanonicalKey) -> Lookup<&S> {
        self.entries.get(key).into()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Clone> SecondaryIndex<S> {
    pub fn get_cloned(&self, key: &CanonicalKey) -> Lookup<S> {
        self.entries.get(key).cloned().into()
    }
}

pub fn join<P, S: Clone>(
    primary: impl IntoIterator<Item = P>,
    secondary: impl IntoIterator<Item = S>,
    primary_key: impl Fn(&P) -> CanonicalKey,
    secondary_key: impl Fn(&S) -> CanonicalKey,
    policy: ConflictPolicy<S>,
) -> Vec<Joined<P, S>> {
    let index = SecondaryIndex::build(secondary, secondary_key, policy);
    join_indexed(primary, &index, primary_key)
}

pub fn join_indexed<P, S: Clone>(
    primary: impl IntoIterator<Item = P>,
    index: &SecondaryIndex<S>,
    primary_key: impl Fn(&P) -> CanonicalKey,
) -> Vec<Joined<P, S>> {
    primary
        .into_iter()
        .map(|record| {
            let secondary = index.get_cloned(&primary_key(&record));
            Joined {
                primary: record,
                secondary,
            }
        })
        .collect()
}

/// Distinct non-empty identifiers in first-seen order, ready for a batch request.
pub fn distinct_ids<'a, P: 'a, I>(
    records: impl IntoIterator<Item = &'a P>,
    extract: impl Fn(&'a P) -> I,
) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();
    for record in records {
        for id in extract(record) {
            if id.trim().is_empty() {
                continue;
            }
            if seen.insert(id) {
                out.push(id.to_string());
            }
        }
    }
    out
}

/// Display value for `id`; ids the batch response left out show as themselves.
pub fn resolve_display(names: &HashMap<String, String>, id: &str) -> String {
    names
        .get(id)
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .unwrap_or(id)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::player_key;

    #[test]
    fn keep_greatest_keeps_first_on_ties() {
        let rows: Vec<(&str, i64, &str)> = vec![("x", 2024, "first"), ("x", 2024, "second")];
        let index = SecondaryIndex::build(
            rows,
            |r| player_key(r.0),
            ConflictPolicy::KeepGreatest(|r: &(&str, i64, &str)| r.1),
        );
        assert_eq!(index.get(&player_key("x")).found().map(|r| r.2), Some("first"));
    }

    #[test]
    fn blank_keys_are_not_indexed() {
        let rows = vec![("", "orphan"), ("abc01", "kept")];
        let index = SecondaryIndex::build(rows, |r| player_key(r.0), ConflictPolicy::LastWriteWins);
        assert_eq!(index.len(), 1);
        assert!(index.get(&player_key("")).is_unavailable());
        assert!(index.get(&player_key("  ")).is_unavailable());
    }

    #[test]
    fn resolve_display_skips_blank_names() {
        let mut names = HashMap::new();
        names.insert("abc01".to_string(), "  ".to_string());
        assert_eq!(resolve_display(&names, "abc01"), "abc01");
    }
}
