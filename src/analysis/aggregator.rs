//! Value counting.
//!
//! Every "most common" statistic is the mode of a [`FrequencyTable`], which
//! remembers the order values were first seen in so that ties always resolve
//! to the earliest value.

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::hash::Hash;

/// Counts of distinct values, kept in first-seen order.
#[derive(Debug, Clone)]
pub struct FrequencyTable<K> {
    entries: Vec<(K, usize)>,
    index: HashMap<K, usize>,
}

impl<K: PartialEq> PartialEq for FrequencyTable<K> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Eq> Eq for FrequencyTable<K> {}

impl<K> Default for FrequencyTable<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> FrequencyTable<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `value`.
    pub fn insert(&mut self, value: K) {
        match self.index.get(&value) {
            Some(&i) => self.entries[i].1 += 1,
            None => {
                self.index.insert(value.clone(), self.entries.len());
                self.entries.push((value, 1));
            }
        }
    }

    /// How many times `value` was counted.
    pub fn count(&self, value: &K) -> usize {
        self.index.get(value).map_or(0, |&i| self.entries[i].1)
    }

    /// The most frequent value and its count.
    ///
    /// Ties go to the value seen first. `None` if nothing was counted.
    pub fn mode(&self) -> Option<(&K, usize)> {
        let mut best: Option<(&K, usize)> = None;
        for (value, count) in &self.entries {
            // strict comparison keeps the earliest of equal counts
            if best.map_or(true, |(_, top)| *count > top) {
                best = Some((value, *count));
            }
        }
        best
    }

    /// Entries by descending count, ties in first-seen order.
    pub fn sorted(&self) -> Vec<(&K, usize)> {
        let mut sorted: Vec<(&K, usize)> = self.entries.iter().map(|(k, c)| (k, *c)).collect();
        sorted.sort_by_key(|(_, count)| std::cmp::Reverse(*count));
        sorted
    }

    /// Number of distinct values.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }
}

impl<K: Eq + Hash + Clone> FromIterator<K> for FrequencyTable<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut table = Self::new();
        for value in iter {
            table.insert(value);
        }
        table
    }
}

#[derive(Serialize)]
struct CountEntry<'a, K> {
    value: &'a K,
    count: usize,
}

/// Serialises as a list of `{ value, count }` in descending count order.
impl<K: Eq + Hash + Clone + Serialize> Serialize for FrequencyTable<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let sorted = self.sorted();
        let mut seq = serializer.serialize_seq(Some(sorted.len()))?;
        for (value, count) in sorted {
            seq.serialize_element(&CountEntry { value, count })?;
        }
        seq.end()
    }
}

/// Mode of an iterator of values, ties to the first seen.
pub fn mode_of<K, I>(values: I) -> Option<K>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = K>,
{
    let table: FrequencyTable<K> = values.into_iter().collect();
    table.mode().map(|(value, _)| value.clone())
}
