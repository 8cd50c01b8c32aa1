//! Memoization primitives.
//!
//! Every lazily computed piece of the descriptor model goes through these
//! types. None of them block while a value is being computed: racing
//! computations are allowed to run in parallel and one result is kept.

mod lazy;
mod memo;
mod session;

pub use lazy::{LazyValue, NullableLazyValue};
pub use memo::MemoizedFunction;
pub use session::{SessionCache, SessionToken};
