use crate::guard::Minterm;
use crate::hopeful::HopefulOracle;
use crate::powerset::{Slice, SliceArena, SliceSetId, EMPTY_SLICES};
use crate::successors::{FilterPolicy, SuccessorComputer};
use rustc_hash::FxHashMap;

/// Predicate over a whole successor slice set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SliceFilter {
    #[default]
    AcceptAll,
    /// Every slice must keep a hopeful state in its powerset.
    RequireHopeful,
}

/// Lifts `SuccessorComputer` to slice sets.
pub struct SliceSuccessorComputer<'a> {
    pub succ: SuccessorComputer<'a>,
    pub slices: SliceArena,
    cache: FxHashMap<(SliceSetId, Minterm, FilterPolicy, SliceFilter), (SliceSetId, bool)>,
    pub hits: u64,
    pub misses: u64,
}

impl<'a> SliceSuccessorComputer<'a> {
    pub fn new(succ: SuccessorComputer<'a>) -> Self {
        SliceSuccessorComputer {
            succ,
            slices: SliceArena::new(),
            cache: FxHashMap::default(),
            hits: 0,
            misses: 0,
        }
    }

    /// Successor slice set of `set` under `m`, and whether the transition is
    /// valid. A slice whose powerset and breakpoint successors coincide, or a
    /// result rejected by `slice_filter`, invalidates the whole transition;
    /// the returned set is then meaningless.
    pub fn successors_of_slices(
        &mut self,
        set: SliceSetId,
        m: Minterm,
        filter: FilterPolicy,
        slice_filter: SliceFilter,
        hopeful: &mut HopefulOracle<'_>,
    ) -> (SliceSetId, bool) {
        let key = (set, m, filter, slice_filter);
        if let Some(&hit) = self.cache.get(&key) {
            self.hits += 1;
            return hit;
        }
        self.misses += 1;

        let result = self.compute(set, m, filter, slice_filter, hopeful);
        self.cache.insert(key, result);
        result
    }

    fn compute(
        &mut self,
        set: SliceSetId,
        m: Minterm,
        filter: FilterPolicy,
        slice_filter: SliceFilter,
        hopeful: &mut HopefulOracle<'_>,
    ) -> (SliceSetId, bool) {
        let members: Vec<Slice> = self.slices.get(set).to_vec();
        let mut next: Vec<Slice> = Vec::with_capacity(members.len());
        for (powerset, breakpoint) in members {
            let p = self.succ.successors(powerset, m, filter);
            let b = self.succ.successors(breakpoint, m, filter);
            let new_breakpoint = self.succ.arena.union(b.all, p.marked);
            if new_breakpoint == p.all {
                return (EMPTY_SLICES, false);
            }
            next.push((p.all, new_breakpoint));
        }

        let id = self.slices.intern(next);
        let valid = match slice_filter {
            SliceFilter::AcceptAll => true,
            SliceFilter::RequireHopeful => {
                let arena = &self.succ.arena;
                self.slices
                    .get(id)
                    .iter()
                    .all(|&(p, _)| hopeful.any_hopeful(arena.get(p)))
            }
        };
        (id, valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::{Acceptance, Automaton};
    use crate::guard::{Alphabet, Guard};
    use crate::powerset::EMPTY_SET;
    use crate::scc::SccInfo;

    const A: Minterm = Minterm(1);
    const NOT_A: Minterm = Minterm(0);

    /// 0 -a-> 0 accepting, 0 -!a-> 0 rejecting.
    fn inf_a() -> Automaton {
        let mut aut = Automaton::new(Alphabet::new(vec!["a".into()]), Acceptance::Buchi);
        aut.new_state();
        aut.new_edge(0, 0, Guard::Ap(0), true);
        aut.new_edge(0, 0, Guard::not(Guard::Ap(0)), false);
        aut
    }

    #[test]
    fn test_slice_invalidated_by_accepting_edge() {
        let aut = inf_a();
        let sccs = SccInfo::new(&aut);
        let mut hopeful = HopefulOracle::new(&aut, &sccs);
        let mut ssc = SliceSuccessorComputer::new(SuccessorComputer::new(&aut, &sccs));

        let zero = ssc.succ.arena.intern(vec![0]);
        let s = ssc.slices.intern(vec![(zero, EMPTY_SET)]);
        let filter = FilterPolicy::SameComponentAcceptingDestination;

        // !a keeps the obligation open
        let (next, valid) =
            ssc.successors_of_slices(s, NOT_A, filter, SliceFilter::RequireHopeful, &mut hopeful);
        assert!(valid);
        assert_eq!(next, s);

        // a reaches the whole powerset through an accepting edge
        let (_, valid) = ssc.successors_of_slices(s, A, filter, SliceFilter::AcceptAll, &mut hopeful);
        assert!(!valid);
    }

    #[test]
    fn test_empty_slice_set_is_valid() {
        let aut = inf_a();
        let sccs = SccInfo::new(&aut);
        let mut hopeful = HopefulOracle::new(&aut, &sccs);
        let mut ssc = SliceSuccessorComputer::new(SuccessorComputer::new(&aut, &sccs));

        let (next, valid) = ssc.successors_of_slices(
            EMPTY_SLICES,
            A,
            FilterPolicy::AcceptAll,
            SliceFilter::RequireHopeful,
            &mut hopeful,
        );
        assert!(valid);
        assert_eq!(next, EMPTY_SLICES);
        assert_eq!(ssc.misses, 1);
        ssc.successors_of_slices(EMPTY_SLICES, A, FilterPolicy::AcceptAll, SliceFilter::RequireHopeful, &mut hopeful);
        assert_eq!(ssc.hits, 1);
    }

    #[test]
    fn test_hopeless_slice_is_filtered() {
        // 0 -t-> 1, 1 -t-> 1 accepting: nothing is hopeful.
        let mut aut = Automaton::new(Alphabet::new(vec!["a".into()]), Acceptance::Buchi);
        aut.new_states(2);
        aut.new_edge(0, 1, Guard::True, false);
        aut.new_edge(1, 1, Guard::True, true);
        let sccs = SccInfo::new(&aut);
        let mut hopeful = HopefulOracle::new(&aut, &sccs);
        let mut ssc = SliceSuccessorComputer::new(SuccessorComputer::new(&aut, &sccs));

        let zero = ssc.succ.arena.intern(vec![0]);
        let s = ssc.slices.intern(vec![(zero, EMPTY_SET)]);
        let (_, valid) =
            ssc.successors_of_slices(s, A, FilterPolicy::AcceptAll, SliceFilter::AcceptAll, &mut hopeful);
        assert!(valid);
        let (_, valid) =
            ssc.successors_of_slices(s, A, FilterPolicy::AcceptAll, SliceFilter::RequireHopeful, &mut hopeful);
        assert!(!valid);
    }
}
