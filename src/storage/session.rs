//! Caches invalidated by an explicit session token.

use std::fmt;

use parking_lot::RwLock;
use uuid::Uuid;

/// Identity of one analysis session (for example, one IDE application
/// instance or one project model generation).
///
/// Tokens are compared by value; a cache that sees a different token than
/// the one it was filled under recomputes.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct SessionToken(Uuid);

impl SessionToken {
    /// A token distinct from every token created before it.
    pub fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken({})", self.0.simple())
    }
}

/// A single cached value tagged with the session it was computed in.
pub struct SessionCache<V> {
    slot: RwLock<Option<(SessionToken, V)>>,
}

impl<V> Default for SessionCache<V> {
    fn default() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }
}

impl<V: Clone> SessionCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The value for `session`, recomputed if the cache holds a value from
    /// another session (or nothing).
    pub fn get(&self, session: SessionToken, compute: impl FnOnce() -> V) -> V {
        {
            let slot = self.slot.read();
            if let Some((token, value)) = slot.as_ref() {
                if *token == session {
                    return value.clone();
                }
            }
        }

        tracing::debug!(?session, "session cache: recomputing for new session");
        let value = compute();

        let mut slot = self.slot.write();
        match slot.as_ref() {
            // Another thread already filled it for this session.
            Some((token, existing)) if *token == session => existing.clone(),
            _ => {
                *slot = Some((session, value.clone()));
                value
            }
        }
    }

    /// The session the cached value belongs to, if any.
    pub fn session(&self) -> Option<SessionToken> {
        self.slot.read().as_ref().map(|(token, _)| *token)
    }
}

impl<V> fmt::Debug for SessionCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCache")
            .field("session", &self.slot.read().as_ref().map(|(token, _)| *token))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_tokens_differ() {
        assert_ne!(SessionToken::fresh(), SessionToken::fresh());
    }

    #[test]
    fn test_same_session_hits_cache() {
        let cache = SessionCache::new();
        let session = SessionToken::fresh();

        assert_eq!(cache.get(session, || 1), 1);
        assert_eq!(cache.get(session, || 2), 1);
        assert_eq!(cache.session(), Some(session));
    }

    #[test]
    fn test_new_session_invalidates() {
        let cache = SessionCache::new();
        let first = SessionToken::fresh();
        let second = SessionToken::fresh();

        assert_eq!(cache.get(first, || "old"), "old");
        assert_eq!(cache.get(second, || "new"), "new");
        assert_eq!(cache.session(), Some(second));
    }
}
