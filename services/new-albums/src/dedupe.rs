//!
//! src/dedupe.rs  Andrew Belles  Oct 2025
//!
//! First-seen deduplication as a lazy iterator adapter
//!

use std::collections::HashSet;
use std::hash::Hash;

pub struct DedupeBy<I, F, K> {
    inner: I,
    key: F,
    seen: HashSet<K>
}

impl<I, F, K> Iterator for DedupeBy<I, F, K>
where
    I: Iterator,
    F: FnMut(&I::Item) -> K,
    K: Eq + Hash
{
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        for item in self.inner.by_ref() {
            if self.seen.insert((self.key)(&item)) {
                return Some(item);
            }
        }
        None
    }
}

/// Drops every item whose key was already yielded, keeping order
pub fn dedupe_by<I, F, K>(items: I, key: F) -> DedupeBy<I::IntoIter, F, K>
where
    I: IntoIterator,
    F: FnMut(&I::Item) -> K,
    K: Eq + Hash
{
    DedupeBy { inner: items.into_iter(), key, seen: HashSet::new() }
}
