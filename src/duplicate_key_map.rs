use std::borrow::Borrow;
use std::cmp::Ordering;

// ─── DuplicateKeyComparer ───────────────────────────────────────────────────

/// Ordering that never reports two keys as equal: an equal pair compares as
/// `Greater`, so a later insertion of an equal key sorts after the earlier one.
///
/// Not antisymmetric. Only [`DuplicateKeyMap`] is built on it; do not hand it
/// to a container that requires a total order.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicateKeyComparer;

impl DuplicateKeyComparer {
    #[inline]
    pub fn compare<K: Ord + ?Sized>(x: &K, y: &K) -> Ordering {
        match x.cmp(y) {
            Ordering::Equal => Ordering::Greater,
            other => other,
        }
    }
}

// ─── DuplicateKeyMap ────────────────────────────────────────────────────────

/// Sorted multimap. Keys are kept in ascending order, equal keys in the
/// order they were inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateKeyMap<K, V> {
    entries: Vec<(K, V)>,
}

impl<K, V> Default for DuplicateKeyMap<K, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K: Ord, V> DuplicateKeyMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Insert after every entry that compares less than or equal to `key`.
    pub fn insert(&mut self, key: K, value: V) {
        let pos = self.entries.partition_point(|(probe, _)| {
            DuplicateKeyComparer::compare(&key, probe) == Ordering::Greater
        });
        self.entries.insert(pos, (key, value));
    }

    /// First value stored under `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let (k, v) = self.entries.get(self.lower_bound(key))?;
        let probe: &Q = k.borrow();
        (probe == key).then_some(v)
    }

    /// Every value stored under `key`, in insertion order.
    pub fn get_all<'m, 'k, Q>(
        &'m self,
        key: &'k Q,
    ) -> impl Iterator<Item = &'m V> + use<'m, 'k, K, V, Q>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.entries[self.lower_bound(key)..]
            .iter()
            .take_while(move |(k, _)| {
                let probe: &Q = k.borrow();
                probe == key
            })
            .map(|(_, v)| v)
    }

    /// Index of the first entry whose key is not less than `key`.
    fn lower_bound<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.entries.partition_point(|(k, _)| {
            let probe: &Q = k.borrow();
            probe < key
        })
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get(key).is_some()
    }
}

impl<K, V> DuplicateKeyMap<K, V> {
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl ExactSizeIterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl ExactSizeIterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl<K, V> IntoIterator for DuplicateKeyMap<K, V> {
    type Item = (K, V);
    type IntoIter = std::vec::IntoIter<(K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for DuplicateKeyMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}
