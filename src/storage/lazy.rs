//! Compute-once cells.

use std::fmt;
use std::sync::OnceLock;

/// A value computed on first access and cached forever.
///
/// The computation runs outside of any lock. When two threads race on an
/// empty cell both compute, the first to publish wins and the other result
/// is dropped. Computations must therefore be pure functions of immutable
/// inputs.
pub struct LazyValue<T> {
    cell: OnceLock<T>,
}

/// A lazily computed value that may legitimately be absent.
pub type NullableLazyValue<T> = LazyValue<Option<T>>;

impl<T> LazyValue<T> {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Return the cached value, computing it with `compute` if necessary.
    pub fn get_or_compute(&self, compute: impl FnOnce() -> T) -> &T {
        if let Some(value) = self.cell.get() {
            return value;
        }
        let value = compute();
        // Publishing a finished value never waits on another computation.
        self.cell.get_or_init(move || value)
    }

    /// The cached value, if it has been computed.
    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    pub fn is_computed(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T> Default for LazyValue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for LazyValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cell.get() {
            Some(value) => f.debug_tuple("LazyValue").field(value).finish(),
            None => f.write_str("LazyValue(<not computed>)"),
        }
    }
}
