//! In-memory session storage.

use std::collections::{BTreeSet, HashMap};

use super::SessionStorage;

/// A `HashMap`-backed [`SessionStorage`] that remembers which keys changed.
///
/// Entries passed to [`MemoryStorage::from_entries`] are the baseline; every
/// later `set_item`/`remove_item` marks its key as changed until
/// [`MemoryStorage::take_changes`] drains the list.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
    changed: BTreeSet<String>,
}

impl MemoryStorage {
    /// Seed storage with existing entries without marking them changed.
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            items: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            changed: BTreeSet::new(),
        }
    }

    /// Drain the changed keys with their current values.
    ///
    /// `None` means the key was removed.
    pub fn take_changes(&mut self) -> Vec<(String, Option<String>)> {
        std::mem::take(&mut self.changed)
            .into_iter()
            .map(|key| {
                let value = self.items.get(&key).cloned();
                (key, value)
            })
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: String) {
        self.items.insert(key.to_owned(), value);
        self.changed.insert(key.to_owned());
    }

    fn remove_item(&mut self, key: &str) {
        self.items.remove(key);
        self.changed.insert(key.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_entries_are_not_changes() {
        let mut storage = MemoryStorage::from_entries([("cartItems:r1", "[]")]);
        assert_eq!(storage.get_item("cartItems:r1").as_deref(), Some("[]"));
        assert!(storage.take_changes().is_empty());
    }

    #[test]
    fn test_take_changes_reports_writes_and_removals() {
        let mut storage = MemoryStorage::from_entries([("a", "1"), ("b", "2")]);
        storage.set_item("a", "10".to_string());
        storage.remove_item("b");
        storage.set_item("c", "3".to_string());

        assert_eq!(
            storage.take_changes(),
            vec![
                ("a".to_string(), Some("10".to_string())),
                ("b".to_string(), None),
                ("c".to_string(), Some("3".to_string())),
            ]
        );
        assert!(storage.take_changes().is_empty());
        assert_eq!(storage.len(), 2);
    }

    #[test]
    fn test_overwrite_keeps_last_value() {
        let mut storage = MemoryStorage::default();
        storage.set_item("k", "first".to_string());
        storage.set_item("k", "second".to_string());

        assert_eq!(
            storage.take_changes(),
            vec![("k".to_string(), Some("second".to_string()))]
        );
    }
}
