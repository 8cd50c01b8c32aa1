//! Memoized functions keyed by value.

use std::fmt;
use std::hash::Hash;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

type Compute<K, V> = Box<dyn Fn(&K) -> V + Send + Sync>;

/// A function whose results are cached per key.
///
/// Like [`LazyValue`](super::LazyValue), computation happens outside the
/// lock. If two threads compute the same key at once, the first insertion
/// wins and both callers observe that value, so a key maps to one cached
/// result for the lifetime of the table.
pub struct MemoizedFunction<K, V> {
    table: RwLock<FxHashMap<K, V>>,
    compute: Compute<K, V>,
}

impl<K, V> MemoizedFunction<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(compute: impl Fn(&K) -> V + Send + Sync + 'static) -> Self {
        Self {
            table: RwLock::new(FxHashMap::default()),
            compute: Box::new(compute),
        }
    }

    /// Look up `key`, computing and caching the value on a miss.
    pub fn get(&self, key: &K) -> V {
        // Fast path: read lock
        if let Some(value) = self.table.read().get(key) {
            return value.clone();
        }

        let value = (self.compute)(key);

        // Slow path: keep whichever value was published first
        let mut table = self.table.write();
        table.entry(key.clone()).or_insert(value).clone()
    }

    /// Whether `key` has already been computed.
    pub fn is_computed(&self, key: &K) -> bool {
        self.table.read().contains_key(key)
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> fmt::Debug for MemoizedFunction<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoizedFunction")
            .field("cached", &self.table.read().len())
            .finish()
    }
}
