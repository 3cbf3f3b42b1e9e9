use crate::connection::{ConnectionIdx, Footpath};
use crate::network::Timestamp;

/// The reverse back-pointer stored at a stop during the sweep.
///
/// If a traveller is at this stop no later than `deadline`, following the pointer (optionally
/// walking via `footpath`, then riding from `enter` through `exit`) leads to a downstream stop
/// whose own pointers chain to the destination. A pointer with `enter = exit = None` is a
/// pure-walk terminal pointer produced during initialisation.
#[derive(Debug, Clone, Copy)]
pub struct JourneyPointer {
    pub deadline: Timestamp,
    pub enter: Option<ConnectionIdx>,
    pub exit: Option<ConnectionIdx>,
    pub footpath: Option<Footpath>,
}

impl JourneyPointer {
    pub fn terminal(deadline: Timestamp, footpath: Option<Footpath>) -> Self {
        Self { deadline, enter: None, exit: None, footpath }
    }

    pub fn boarding(deadline: Timestamp, enter: ConnectionIdx, exit: ConnectionIdx, footpath: Option<Footpath>) -> Self {
        Self { deadline, enter: Some(enter), exit: Some(exit), footpath }
    }
}

/// A bounded, deadline-descending list of [`JourneyPointer`]s attached to one stop.
///
/// Invariant: `len() <= cap` except transiently between an `append` and its matching prune. The
/// head (`data[0]`) is always the pointer with the *latest* deadline — the most forgiving option,
/// which is why the reconstructor always walks the frontier head-first.
#[derive(Debug, Clone, Default)]
pub struct PointerFrontier {
    data: Vec<JourneyPointer>,
}

impl PointerFrontier {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Inserts `p` keeping the list sorted descending by deadline. Ties are broken by inserting
    /// the new pointer *before* existing pointers with an equal deadline.
    pub fn append(&mut self, p: JourneyPointer) {
        let idx = self.data.iter().position(|existing| existing.deadline <= p.deadline).unwrap_or(self.data.len());
        self.data.insert(idx, p);
    }

    /// Drops the pointer with the smallest deadline (the tail of the list).
    pub fn remove_earliest(&mut self) {
        self.data.pop();
    }

    /// Appends `p`, then prunes the tail exactly once if the cap was exceeded.
    pub fn append_capped(&mut self, p: JourneyPointer, cap: usize) {
        self.append(p);
        if self.data.len() > cap {
            self.remove_earliest();
        }
    }

    pub fn head(&self) -> Option<&JourneyPointer> {
        self.data.first()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterates in descending-deadline order (head first), as the reconstructor requires.
    pub fn iter(&self) -> impl Iterator<Item = &JourneyPointer> {
        self.data.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ptr(deadline: i64) -> JourneyPointer {
        JourneyPointer::terminal(crate::utils::test_time(deadline), None)
    }

    #[test]
    fn append_keeps_descending_order() {
        let mut f = PointerFrontier::new();
        f.append(ptr(10));
        f.append(ptr(30));
        f.append(ptr(20));
        let deadlines: Vec<_> = f.iter().map(|p| p.deadline).collect();
        assert_eq!(deadlines, vec![crate::utils::test_time(30), crate::utils::test_time(20), crate::utils::test_time(10)]);
    }

    #[test]
    fn ties_insert_before_existing_equal_deadline() {
        let mut f = PointerFrontier::new();
        f.append(JourneyPointer::terminal(crate::utils::test_time(10), None));
        f.append(JourneyPointer::boarding(crate::utils::test_time(10), 0, 1, None));
        // The second append (a boarding pointer) must land before the first (a terminal pointer).
        assert!(f.iter().next().unwrap().enter.is_some());
    }

    #[test]
    fn cap_prunes_earliest_after_append() {
        let mut f = PointerFrontier::new();
        f.append_capped(ptr(30), 2);
        f.append_capped(ptr(20), 2);
        f.append_capped(ptr(10), 2);
        assert_eq!(f.len(), 2);
        let deadlines: Vec<_> = f.iter().map(|p| p.deadline).collect();
        assert_eq!(deadlines, vec![crate::utils::test_time(30), crate::utils::test_time(20)]);
    }
}
