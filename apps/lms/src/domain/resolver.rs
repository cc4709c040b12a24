//! Active-round resolution.
//!
//! Given every round currently flagged active, pick the single canonical
//! current round and report the rest as stale. Recency is decided by
//! `cycle_number` first and the round id second; insertion order is never
//! used on its own, since ids do not track recency across cycles.

/// What the resolver needs to know about a round.
pub trait ActiveCandidate {
    fn id(&self) -> i64;
    fn cycle_number(&self) -> i32;
}

/// Outcome of [`resolve`]. `stale` is ordered by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution<R> {
    pub current: Option<R>,
    pub stale: Vec<R>,
}

impl<R> Resolution<R> {
    pub fn is_consistent(&self) -> bool {
        self.stale.is_empty()
    }
}

/// Highest `cycle_number` wins; ties break on the highest id.
///
/// Side-effect free: persisting the demotion of `stale` is the caller's job.
pub fn resolve<R: ActiveCandidate>(mut active: Vec<R>) -> Resolution<R> {
    let winner = active
        .iter()
        .enumerate()
        .max_by_key(|(_, r)| (r.cycle_number(), r.id()))
        .map(|(idx, _)| idx);

    let Some(idx) = winner else {
        return Resolution {
            current: None,
            stale: Vec::new(),
        };
    };

    let current = active.swap_remove(idx);
    active.sort_by_key(|r| r.id());
    Resolution {
        current: Some(current),
        stale: active,
    }
}
