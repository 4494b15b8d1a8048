use std::collections::BTreeSet;

/// Keys that appeared and disappeared during one [`KeySetObserver::sync`]
#[derive(Debug, PartialEq, Eq)]
pub struct KeySetChanges<K> {
    pub added: Vec<K>,
    pub removed: Vec<K>,
}

impl<K> KeySetChanges<K> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Tracks a set of live keys and reports additions and removals, in key
/// order, whenever a complete listing replaces it
pub struct KeySetObserver<K: Ord + Clone> {
    keys: BTreeSet<K>,
}

impl<K: Ord + Clone> KeySetObserver<K> {
    pub fn new() -> Self {
        Self {
            keys: BTreeSet::new(),
        }
    }

    pub fn insert(&mut self, key: K) -> bool {
        self.keys.insert(key)
    }

    pub fn remove(&mut self, key: &K) -> bool {
        self.keys.remove(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.keys.contains(key)
    }

    pub fn sync<I: IntoIterator<Item = K>>(&mut self, listing: I) -> KeySetChanges<K> {
        let next: BTreeSet<K> = listing.into_iter().collect();

        let added = next.difference(&self.keys).cloned().collect();
        let removed = self.keys.difference(&next).cloned().collect();

        self.keys = next;

        KeySetChanges { added, removed }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.keys.iter()
    }
}

impl<K: Ord + Clone> Default for KeySetObserver<K> {
    fn default() -> Self {
        Self::new()
    }
}
