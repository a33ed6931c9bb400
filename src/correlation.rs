use std::collections::HashMap;

use crate::deferred::{Deferred, Outcome, PendingCall};

/// Request ids and the calls still waiting on them.
#[derive(Debug, Default)]
pub struct Correlation {
    last_id: u64,
    pending: HashMap<u64, Deferred>,
}

impl Correlation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next request id. Ids start at 0 and are never reused.
    pub fn allocate(&mut self) -> u64 {
        let id = self.last_id;
        self.last_id += 1;
        id
    }

    /// The id the next [`allocate`](Self::allocate) will hand out.
    pub fn last_id(&self) -> u64 {
        self.last_id
    }

    pub fn register(&mut self, id: u64) -> PendingCall {
        let (deferred, pending) = Deferred::new(id);
        self.pending.insert(id, deferred);
        pending
    }

    /// Settle and forget the call for `id`. Unknown ids are ignored.
    pub fn complete(&mut self, id: u64, outcome: Outcome) -> bool {
        match self.pending.remove(&id) {
            Some(deferred) => {
                deferred.complete(outcome);
                true
            }
            None => false,
        }
    }

    /// Forget the call for `id` without settling it; its future yields `Error::Cancelled`.
    pub fn cancel(&mut self, id: u64) -> bool {
        self.pending.remove(&id).is_some()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.pending.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
