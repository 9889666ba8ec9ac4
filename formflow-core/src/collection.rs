//! Mutation algebra for ordered collections of keyed entities
//!
//! Cart items, saved forms, and recent-search history are all ordered
//! lists whose entries are unique by key: insertion order matters for
//! display, the key matters for lookup. The operations here keep both
//! invariants - in particular, updating an existing entry never moves it.

use std::fmt::Debug;

/// An entity with a stable unique key within its collection.
pub trait Keyed {
    /// The key type (`String` ids, or the entry itself for plain strings).
    type Key: PartialEq + Clone + Debug;

    /// The entity's key.
    fn key(&self) -> &Self::Key;
}

/// An entity carrying a counter (cart quantity or similar).
pub trait Counted {
    /// Current counter value.
    fn count(&self) -> u32;

    /// Replace the counter value.
    fn set_count(&mut self, count: u32);
}

/// Insert the item, or bump the counter of the entry already holding its key.
///
/// An existing entry keeps its position and identity; only its counter is
/// incremented by 1. A new entry is appended with its counter normalized
/// to 1, whatever the caller passed in.
pub fn add_or_increment<T: Keyed + Counted>(items: &mut Vec<T>, mut item: T) {
    if let Some(existing) = items.iter_mut().find(|entry| entry.key() == item.key()) {
        existing.set_count(existing.count() + 1);
    } else {
        item.set_count(1);
        items.push(item);
    }
}

/// Remove the entry with the given key.
///
/// Idempotent: an absent key is a no-op, not an error. Returns whether
/// anything was removed.
pub fn remove_by_key<T: Keyed>(items: &mut Vec<T>, key: &T::Key) -> bool {
    let before = items.len();
    items.retain(|entry| entry.key() != key);
    items.len() != before
}

/// Set an entry's counter to exactly `count` (not additive).
///
/// `count == 0` is equivalent to [`remove_by_key`]. Returns whether the
/// collection changed; an absent key is a no-op.
pub fn set_count<T: Keyed + Counted>(items: &mut Vec<T>, key: &T::Key, count: u32) -> bool {
    if count == 0 {
        return remove_by_key(items, key);
    }
    match items.iter_mut().find(|entry| entry.key() == key) {
        Some(entry) => {
            let changed = entry.count() != count;
            entry.set_count(count);
            changed
        }
        None => false,
    }
}

/// Look up an entry by key.
pub fn find_by_key<'a, T: Keyed>(items: &'a [T], key: &T::Key) -> Option<&'a T> {
    items.iter().find(|entry| entry.key() == key)
}

/// Record an entry in a bounded most-recent-first history.
///
/// Empty and whitespace-only entries are rejected (no-op). Any equal
/// existing entry is removed before the new one is prepended, so the list
/// never holds duplicates; the list is then truncated to `cap`. Returns
/// whether the list changed.
pub fn push_recent(list: &mut Vec<String>, entry: &str, cap: usize) -> bool {
    if entry.trim().is_empty() {
        return false;
    }
    list.retain(|existing| existing != entry);
    list.insert(0, entry.to_string());
    list.truncate(cap);
    true
}

/// Outcome of an [`upsert_by_key`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Upserted {
    /// The item was appended as a new entry.
    Inserted,
    /// The item replaced an existing entry in place.
    Replaced,
}

/// Replace the entry holding the item's key, or append the item.
///
/// A replaced entry keeps its position; `on_replace` runs on the freshly
/// stored value (used to stamp an `updated_at` timestamp).
pub fn upsert_by_key<T: Keyed>(
    items: &mut Vec<T>,
    item: T,
    on_replace: impl FnOnce(&mut T),
) -> Upserted {
    match items.iter().position(|entry| entry.key() == item.key()) {
        Some(index) => {
            items[index] = item;
            on_replace(&mut items[index]);
            Upserted::Replaced
        }
        None => {
            items.push(item);
            Upserted::Inserted
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Entry {
        id: String,
        count: u32,
        label: &'static str,
    }

    impl Entry {
        fn new(id: &str, label: &'static str) -> Self {
            Self {
                id: id.to_string(),
                count: 1,
                label,
            }
        }
    }

    impl Keyed for Entry {
        type Key = String;

        fn key(&self) -> &String {
            &self.id
        }
    }

    impl Counted for Entry {
        fn count(&self) -> u32 {
            self.count
        }

        fn set_count(&mut self, count: u32) {
            self.count = count;
        }
    }

    #[test]
    fn repeated_adds_increment_in_place() {
        let mut items = Vec::new();

        add_or_increment(&mut items, Entry::new("a", "first"));
        add_or_increment(&mut items, Entry::new("b", "second"));
        add_or_increment(&mut items, Entry::new("a", "first"));
        add_or_increment(&mut items, Entry::new("a", "first"));

        // Final count equals the number of adds; position is the
        // first-insertion index.
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "a");
        assert_eq!(items[0].count, 3);
        assert_eq!(items[1].count, 1);
    }

    #[test]
    fn add_normalizes_counter_to_one() {
        let mut items = Vec::new();
        let mut entry = Entry::new("a", "first");
        entry.count = 99;

        add_or_increment(&mut items, entry);

        assert_eq!(items[0].count, 1);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut items = vec![Entry::new("a", "first")];

        assert!(remove_by_key(&mut items, &"a".to_string()));
        let snapshot = items.clone();
        assert!(!remove_by_key(&mut items, &"a".to_string()));
        assert_eq!(items, snapshot);
    }

    #[test]
    fn set_count_zero_removes() {
        let mut items = vec![Entry::new("a", "first"), Entry::new("b", "second")];

        assert!(set_count(&mut items, &"a".to_string(), 0));

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "b");
    }

    #[test]
    fn set_count_is_exact_not_additive() {
        let mut items = vec![Entry::new("a", "first")];
        items[0].count = 3;

        assert!(set_count(&mut items, &"a".to_string(), 7));
        assert_eq!(items[0].count, 7);

        // Absent key: no-op.
        assert!(!set_count(&mut items, &"missing".to_string(), 7));
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn find_by_key_borrows_entry() {
        let items = vec![Entry::new("a", "first"), Entry::new("b", "second")];

        assert_eq!(
            find_by_key(&items, &"b".to_string()).map(|e| e.label),
            Some("second")
        );
        assert!(find_by_key(&items, &"c".to_string()).is_none());
    }

    #[test]
    fn push_recent_keeps_mru_order_and_cap() {
        let mut recent = Vec::new();

        for query in ["one", "two", "three", "four", "five", "six"] {
            assert!(push_recent(&mut recent, query, 5));
        }

        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0], "six");
        assert!(!recent.contains(&"one".to_string()));
    }

    #[test]
    fn push_recent_deduplicates() {
        let mut recent = Vec::new();

        push_recent(&mut recent, "query", 5);
        push_recent(&mut recent, "other", 5);
        push_recent(&mut recent, "query", 5);

        assert_eq!(recent, vec!["query", "other"]);
    }

    #[test]
    fn push_recent_rejects_blank() {
        let mut recent = vec!["kept".to_string()];

        assert!(!push_recent(&mut recent, "", 5));
        assert!(!push_recent(&mut recent, "   ", 5));
        assert_eq!(recent, vec!["kept"]);
    }

    #[test]
    fn upsert_replaces_in_place_and_stamps() {
        let mut items = vec![Entry::new("a", "first"), Entry::new("b", "second")];

        let outcome = upsert_by_key(&mut items, Entry::new("a", "updated"), |entry| {
            entry.count = 42;
        });

        assert_eq!(outcome, Upserted::Replaced);
        assert_eq!(items[0].label, "updated");
        assert_eq!(items[0].count, 42);
        assert_eq!(items[1].label, "second");
    }

    #[test]
    fn upsert_appends_unknown_key() {
        let mut items = vec![Entry::new("a", "first")];

        let outcome = upsert_by_key(&mut items, Entry::new("c", "third"), |_| {
            panic!("on_replace must not run for inserts");
        });

        assert_eq!(outcome, Upserted::Inserted);
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].id, "c");
    }
}
