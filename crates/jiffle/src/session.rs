//! Named script registry.

use crate::script::Jiffle;
use std::sync::atomic::{AtomicU64, Ordering};

/// Creates [`Jiffle`] objects named `jiffle-1`, `jiffle-2`, …
///
/// The counter belongs to the session, so two sessions number their
/// scripts independently.
#[derive(Debug, Default)]
pub struct JiffleSession {
    created: AtomicU64,
}

impl JiffleSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// A script object with the next default name.
    pub fn create(&self) -> Jiffle {
        let n = self.created.fetch_add(1, Ordering::Relaxed) + 1;
        Jiffle::named(format!("jiffle-{}", n))
    }

    /// A script object with the next default name and `script` set.
    pub fn create_with_script(&self, script: impl Into<String>) -> Jiffle {
        let mut jiffle = self.create();
        jiffle.set_script(script);
        jiffle
    }

    /// Number of script objects created so far.
    pub fn created(&self) -> u64 {
        self.created.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sessions_count_independently() {
        let a = JiffleSession::new();
        let b = JiffleSession::new();
        assert_eq!(a.create().name(), "jiffle-1");
        assert_eq!(a.create_with_script("1;").name(), "jiffle-2");
        assert_eq!(b.create().name(), "jiffle-1");
        assert_eq!(a.created(), 2);
    }
}
