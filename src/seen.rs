//! The seen-set: a bounded dedup store of already-notified identifiers.
//!
//! An identifier that has been stored will never trigger another
//! notification until the set is cleared.  The bound is deliberately crude:
//! once the set grows past [`CAPACITY`] the *entire* set is dropped on the
//! next store, not trimmed.  That keeps memory flat for pennies, at the cost
//! of a possible burst of duplicate notices right after a clear.

use std::collections::HashSet;

use crate::source::Resource;

/// Stored-identifier count above which the next `store` clears everything.
pub const CAPACITY: usize = 5000;

#[derive(Debug, Default)]
pub struct SeenSet {
    guids: HashSet<String>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Order-preserving subset of `candidates` whose guid has not been
    /// stored.  Read-only: calling `diff` twice without a `store` in
    /// between returns the same records.
    pub fn diff(&self, candidates: Vec<Resource>) -> Vec<Resource> {
        candidates
            .into_iter()
            .filter(|res| !self.guids.contains(&res.guid))
            .collect()
    }

    /// Insert each record's guid.  If the set has already grown past
    /// [`CAPACITY`], everything is cleared first.
    pub fn store(&mut self, records: &[Resource]) {
        if self.guids.len() > CAPACITY {
            self.guids.clear();
        }
        for res in records {
            self.guids.insert(res.guid.clone());
        }
    }

    /// Number of stored identifiers (logged once per cycle).
    pub fn len(&self) -> usize {
        self.guids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guids.is_empty()
    }
}
