use crate::automaton::{Automaton, State};
use crate::guard::{Minterm, MintermCache};
use crate::powerset::{PowersetArena, SetId};
use crate::scc::SccInfo;
use rustc_hash::FxHashMap;
use std::rc::Rc;

/// Edge filter applied while computing successors. Part of every cache key,
/// so it is a closed set of named policies rather than a closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterPolicy {
    #[default]
    AcceptAll,
    /// Keep an edge only if it stays in its component and that component is
    /// accepting.
    SameComponentAcceptingDestination,
}

impl FilterPolicy {
    #[inline]
    pub fn allows(self, sccs: &SccInfo, src: State, dst: State) -> bool {
        match self {
            FilterPolicy::AcceptAll => true,
            FilterPolicy::SameComponentAcceptingDestination => {
                let c = sccs.component_of(dst);
                sccs.component_of(src) == c && sccs.is_accepting(c)
            }
        }
    }
}

/// Successors of a state set under one minterm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Successors {
    pub all: SetId,
    /// Subset of `all` entered through at least one accepting edge.
    pub marked: SetId,
    /// Per-source destination sets with more than one element, deduplicated.
    pub branches: Rc<[SetId]>,
}

struct StateSuccessors {
    dests: Rc<[State]>,
    marked: Rc<[State]>,
}

/// Memoized successor computation over one input automaton.
///
/// Owns the state-set arena: every `SetId` handed out by the complementation
/// comes from here.
pub struct SuccessorComputer<'a> {
    aut: &'a Automaton,
    sccs: &'a SccInfo,
    pub minterms: MintermCache,
    pub arena: PowersetArena,
    state_cache: FxHashMap<(State, Minterm, FilterPolicy), StateSuccessors>,
    set_cache: FxHashMap<(SetId, Minterm, FilterPolicy), Successors>,

    pub state_hits: u64,
    pub state_misses: u64,
    pub set_hits: u64,
    pub set_misses: u64,
}

impl<'a> SuccessorComputer<'a> {
    pub fn new(aut: &'a Automaton, sccs: &'a SccInfo) -> Self {
        SuccessorComputer {
            aut,
            sccs,
            minterms: MintermCache::new(aut.alphabet().clone()),
            arena: PowersetArena::new(),
            state_cache: FxHashMap::default(),
            set_cache: FxHashMap::default(),
            state_hits: 0,
            state_misses: 0,
            set_hits: 0,
            set_misses: 0,
        }
    }

    fn state_successors(&mut self, s: State, m: Minterm, filter: FilterPolicy) -> &StateSuccessors {
        let key = (s, m, filter);
        if self.state_cache.contains_key(&key) {
            self.state_hits += 1;
        } else {
            self.state_misses += 1;
            let mut dests = Vec::new();
            let mut marked = Vec::new();
            for e in self.aut.out(s) {
                if !filter.allows(self.sccs, e.src, e.dst) || !self.minterms.contains(&e.guard, m) {
                    continue;
                }
                dests.push(e.dst);
                if e.accepting {
                    marked.push(e.dst);
                }
            }
            dests.sort_unstable();
            dests.dedup();
            marked.sort_unstable();
            marked.dedup();
            self.state_cache.insert(
                key,
                StateSuccessors {
                    dests: dests.into(),
                    marked: marked.into(),
                },
            );
        }
        &self.state_cache[&key]
    }

    /// `successors(states, m, filter) -> (allSucc, markedSucc, branches)`.
    pub fn successors(&mut self, states: SetId, m: Minterm, filter: FilterPolicy) -> Successors {
        if let Some(hit) = self.set_cache.get(&(states, m, filter)) {
            self.set_hits += 1;
            return hit.clone();
        }
        self.set_misses += 1;

        let members = self.arena.get(states).to_vec();
        let mut all: Vec<State> = Vec::new();
        let mut marked: Vec<State> = Vec::new();
        let mut branch_sets: Vec<Vec<State>> = Vec::new();
        for s in members {
            let succ = self.state_successors(s, m, filter);
            all.extend(succ.dests.iter().copied());
            marked.extend(succ.marked.iter().copied());
            if succ.dests.len() > 1 {
                branch_sets.push(succ.dests.to_vec());
            }
        }

        let mut branches: Vec<SetId> = branch_sets
            .into_iter()
            .map(|set| self.arena.intern(set))
            .collect();
        branches.sort_unstable();
        branches.dedup();

        let result = Successors {
            all: self.arena.intern_iter(all),
            marked: self.arena.intern_iter(marked),
            branches: branches.into(),
        };
        self.set_cache.insert((states, m, filter), result.clone());
        result
    }
}
