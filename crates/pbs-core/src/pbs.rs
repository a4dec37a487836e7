use crate::automaton::{Acceptance, Automaton, State};
use crate::error::ComplementError;
use crate::guard::{Guard, Minterm, MAX_APS};
use crate::hopeful::HopefulOracle;
use crate::powerset::{PowersetArena, SetId, SliceSetId, EMPTY_SET, EMPTY_SLICES};
use crate::scc::SccInfo;
use crate::slices::{SliceFilter, SliceSuccessorComputer};
use crate::successors::{FilterPolicy, SuccessorComputer};
use itertools::Itertools;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Instant;
use tracing::{debug, info};

/// Switches for the three independent pruning optimizations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Track breakpoint and slice runs only inside accepting components.
    pub use_scc: bool,
    /// Drop non-hopeful states from retirement and require hopeful slices.
    pub use_hopeful: bool,
    /// When the breakpoint step both marks states and branches, retire only
    /// the marked or branching states, except right after a reseed.
    pub restrict_retirement: bool,
    /// Abort once this many output states exist.
    pub max_states: Option<usize>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            use_scc: true,
            use_hopeful: true,
            restrict_retirement: true,
            max_states: None,
        }
    }
}

/// Profiling statistics for a `complement()` call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ComplementStats {
    pub total_ms: f64,
    pub init_ms: f64,
    pub explore_ms: f64,
    pub finish_ms: f64,

    pub input_states: u32,
    pub minterms: usize,

    // output
    pub states: u32,
    pub edges_emitted: u64,
    pub accepting_edges: u64,
    pub edges_merged: usize,
    pub invalid_minterms: u64,

    // composite state sizes
    pub max_powerset_size: usize,
    pub max_slices: usize,

    // caches
    pub successor_hits: u64,
    pub successor_misses: u64,
    pub state_successor_hits: u64,
    pub state_successor_misses: u64,
    pub slice_hits: u64,
    pub slice_misses: u64,
    pub minterm_hits: u64,
    pub minterm_misses: u64,
    pub hopeful_queries: u64,
    pub hopeful_graphs: u64,
}

/// Complement automaton plus profiling stats.
pub struct ComplementResult {
    pub automaton: Automaton,
    pub stats: ComplementStats,
}

/// (P, B, S) triple: one output state.
type Composite = (SetId, SetId, SliceSetId);

/// Build a Büchi automaton accepting exactly the words `aut` rejects.
///
/// Fails without producing any output if `aut` is not a Büchi automaton.
pub fn complement(aut: &Automaton, opts: &Options) -> Result<ComplementResult, ComplementError> {
    if !aut.is_buchi() {
        return Err(ComplementError::NotBuchi {
            acceptance: aut.acceptance().to_string(),
        });
    }
    let num_aps = aut.alphabet().num_aps();
    if num_aps > MAX_APS {
        return Err(ComplementError::TooManyPropositions {
            count: num_aps,
            max: MAX_APS,
        });
    }

    let t0 = Instant::now();
    let sccs = SccInfo::new(aut);
    let mut pbs = Complementer::new(aut, &sccs, *opts);
    pbs.stats.init_ms = t0.elapsed().as_secs_f64() * 1000.0;

    let t = Instant::now();
    pbs.explore()?;
    pbs.stats.explore_ms = t.elapsed().as_secs_f64() * 1000.0;

    let t = Instant::now();
    let (automaton, mut stats) = pbs.finish();
    stats.finish_ms = t.elapsed().as_secs_f64() * 1000.0;
    stats.total_ms = t0.elapsed().as_secs_f64() * 1000.0;

    info!(
        input_states = stats.input_states,
        states = stats.states,
        edges = stats.edges_merged,
        invalid_minterms = stats.invalid_minterms,
        total_ms = stats.total_ms,
        "complement built"
    );
    Ok(ComplementResult { automaton, stats })
}

struct Complementer<'a> {
    aut: &'a Automaton,
    sccs: &'a SccInfo,
    opts: Options,
    filter: FilterPolicy,
    slice_filter: SliceFilter,
    slices: SliceSuccessorComputer<'a>,
    hopeful: HopefulOracle<'a>,
    minterms: Vec<Minterm>,

    index: FxHashMap<Composite, State>,
    triples: Vec<Composite>,
    worklist: VecDeque<State>,
    out: Automaton,
    stats: ComplementStats,
}

impl<'a> Complementer<'a> {
    fn new(aut: &'a Automaton, sccs: &'a SccInfo, opts: Options) -> Self {
        let filter = if opts.use_scc {
            FilterPolicy::SameComponentAcceptingDestination
        } else {
            FilterPolicy::AcceptAll
        };
        let slice_filter = if opts.use_hopeful {
            SliceFilter::RequireHopeful
        } else {
            SliceFilter::AcceptAll
        };
        let minterms: Vec<Minterm> = aut.alphabet().all_minterms().collect();
        let mut out = Automaton::new(aut.alphabet().clone(), Acceptance::Buchi);
        out.name = aut.name.as_ref().map(|n| format!("complement of {n}"));

        Complementer {
            aut,
            sccs,
            opts,
            filter,
            slice_filter,
            slices: SliceSuccessorComputer::new(SuccessorComputer::new(aut, sccs)),
            hopeful: HopefulOracle::new(aut, sccs),
            stats: ComplementStats {
                input_states: aut.num_states(),
                minterms: minterms.len(),
                ..ComplementStats::default()
            },
            minterms,
            index: FxHashMap::default(),
            triples: Vec::new(),
            worklist: VecDeque::new(),
            out,
        }
    }

    fn arena(&mut self) -> &mut PowersetArena {
        &mut self.slices.succ.arena
    }

    fn explore(&mut self) -> Result<(), ComplementError> {
        let init_set = if self.aut.num_states() == 0 {
            EMPTY_SET
        } else {
            let init = self.aut.init();
            self.arena().intern(vec![init])
        };
        let init = self.intern_state((init_set, EMPTY_SET, EMPTY_SLICES))?;
        self.out.set_init(init);

        while let Some(cur) = self.worklist.pop_front() {
            if cur % 1000 == 0 {
                debug!(state = cur, pending = self.worklist.len(), "exploring");
            }
            for k in 0..self.minterms.len() {
                let m = self.minterms[k];
                self.expand(cur, m)?;
            }
        }
        Ok(())
    }

    /// All successors of output state `cur` under minterm `m`.
    fn expand(&mut self, cur: State, m: Minterm) -> Result<(), ComplementError> {
        let (p, b, s) = self.triples[cur as usize];
        let (filter, slice_filter) = (self.filter, self.slice_filter);

        let new_p = self.slices.succ.successors(p, m, FilterPolicy::AcceptAll).all;
        let new_b = self.slices.succ.successors(b, m, filter);
        let (new_s, valid) =
            self.slices
                .successors_of_slices(s, m, filter, slice_filter, &mut self.hopeful);
        if !valid {
            self.stats.invalid_minterms += 1;
            return Ok(());
        }

        let pool = if self.opts.restrict_retirement
            && new_b.marked != EMPTY_SET
            && !new_b.branches.is_empty()
        {
            let flat: Vec<State> = new_b
                .branches
                .iter()
                .flat_map(|&set| self.slices.succ.arena.get(set).iter().copied())
                .collect();
            let flat = self.arena().intern_iter(flat);
            self.arena().union(new_b.marked, flat)
        } else {
            new_b.all
        };

        for left in self.retirement_options(pool) {
            let s_ext = self.add_singletons(new_s, left);
            let remaining = self.remove_states(new_b.all, left);
            let possible_b = self.trim(remaining, s_ext);
            if possible_b != EMPTY_SET {
                self.emit(cur, (new_p, possible_b, s_ext), m, false)?;
                continue;
            }

            // Breakpoint emptied: accepting transition, reseed from the powerset.
            let reseed = if self.opts.use_scc {
                let sccs = self.sccs;
                self.arena()
                    .difference(new_p, |q| !sccs.is_accepting(sccs.component_of(q)))
            } else {
                new_p
            };
            let reseed = self.trim(reseed, s_ext);
            if !self.opts.restrict_retirement {
                self.emit(cur, (new_p, reseed, s_ext), m, true)?;
                continue;
            }

            // Second and last retirement stage, over any subset of the reseeded B.
            for left2 in self.retirement_options(reseed) {
                let s2 = self.add_singletons(s_ext, left2);
                let b2 = self.remove_states(reseed, left2);
                self.emit(cur, (new_p, b2, s2), m, true)?;
            }
        }
        Ok(())
    }

    /// Subsets of `pool` that may retire from B into fresh singleton slices,
    /// deduplicated, smallest first. Under the hopeful optimization only
    /// hopeful states retire.
    fn retirement_options(&mut self, pool: SetId) -> Vec<SetId> {
        let mut candidates: Vec<State> = self.slices.succ.arena.get(pool).to_vec();
        if self.opts.use_hopeful {
            candidates.retain(|&q| self.hopeful.is_hopeful(q));
        }

        let mut seen: FxHashSet<SetId> = FxHashSet::default();
        let mut options = Vec::new();
        for subset in candidates.into_iter().powerset() {
            let id = self.arena().intern(subset);
            if seen.insert(id) {
                options.push(id);
            }
        }
        options
    }

    fn add_singletons(&mut self, s: SliceSetId, left: SetId) -> SliceSetId {
        if left == EMPTY_SET {
            return s;
        }
        let left_states = self.arena().get(left).to_vec();
        let mut slices = self.slices.slices.get(s).to_vec();
        for q in left_states {
            let single = self.arena().intern(vec![q]);
            slices.push((single, EMPTY_SET));
        }
        self.slices.slices.intern(slices)
    }

    fn remove_states(&mut self, from: SetId, remove: SetId) -> SetId {
        if remove == EMPTY_SET {
            return from;
        }
        let removed = self.arena().get(remove).to_vec();
        self.arena()
            .difference(from, |q| removed.binary_search(&q).is_ok())
    }

    /// Drop from `b` every state tracked in `s` as a singleton slice with an
    /// empty breakpoint.
    fn trim(&mut self, b: SetId, s: SliceSetId) -> SetId {
        let arena = &self.slices.succ.arena;
        let mut singles: Vec<State> = self
            .slices
            .slices
            .get(s)
            .iter()
            .filter(|&&(p, bp)| bp == EMPTY_SET && arena.get(p).len() == 1)
            .map(|&(p, _)| arena.get(p)[0])
            .collect();
        if singles.is_empty() {
            return b;
        }
        singles.sort_unstable();
        self.arena()
            .difference(b, |q| singles.binary_search(&q).is_ok())
    }

    fn intern_state(&mut self, triple: Composite) -> Result<State, ComplementError> {
        if let Some(&id) = self.index.get(&triple) {
            return Ok(id);
        }
        if let Some(limit) = self.opts.max_states {
            if self.index.len() >= limit {
                return Err(ComplementError::StateBudgetExceeded { limit });
            }
        }

        let id = self.out.new_state();
        self.index.insert(triple, id);
        self.triples.push(triple);
        self.worklist.push_back(id);

        let (p, _, s) = triple;
        self.stats.max_powerset_size = self.stats.max_powerset_size.max(self.slices.succ.arena.get(p).len());
        self.stats.max_slices = self.stats.max_slices.max(self.slices.slices.get(s).len());
        Ok(id)
    }

    fn emit(&mut self, cur: State, triple: Composite, m: Minterm, accepting: bool) -> Result<(), ComplementError> {
        let dst = self.intern_state(triple)?;
        let guard = Guard::minterm(m, self.aut.alphabet().num_aps());
        self.out.new_edge(cur, dst, guard, accepting);
        self.stats.edges_emitted += 1;
        if accepting {
            self.stats.accepting_edges += 1;
        }
        Ok(())
    }

    fn label(&self, (p, b, s): Composite) -> String {
        let arena = &self.slices.succ.arena;
        let set = |id: SetId| format!("{{{}}}", arena.get(id).iter().join(","));
        let slices = self
            .slices
            .slices
            .get(s)
            .iter()
            .map(|&(sp, sb)| format!("({}, {})", set(sp), set(sb)))
            .join(", ");
        format!("({}, {}, {{{}}})", set(p), set(b), slices)
    }

    fn finish(mut self) -> (Automaton, ComplementStats) {
        let names: Vec<String> = self.triples.iter().map(|&t| self.label(t)).collect();
        self.out.set_state_names(names);
        self.out.merge_edges();

        let mut stats = self.stats;
        stats.states = self.out.num_states();
        stats.edges_merged = self.out.num_edges();
        let succ = &self.slices.succ;
        stats.successor_hits = succ.set_hits;
        stats.successor_misses = succ.set_misses;
        stats.state_successor_hits = succ.state_hits;
        stats.state_successor_misses = succ.state_misses;
        stats.minterm_hits = succ.minterms.hits;
        stats.minterm_misses = succ.minterms.misses;
        stats.slice_hits = self.slices.hits;
        stats.slice_misses = self.slices.misses;
        stats.hopeful_queries = self.hopeful.queries;
        stats.hopeful_graphs = self.hopeful.graphs_built;
        (self.out, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emptiness::is_empty;
    use crate::guard::Alphabet;
    use crate::lasso::{accepts, Lasso};

    const A: Minterm = Minterm(1);
    const NOT_A: Minterm = Minterm(0);

    fn word(prefix: Vec<Minterm>, cycle: Vec<Minterm>) -> Lasso {
        Lasso::new(prefix, cycle).unwrap()
    }

    fn one_ap() -> Alphabet {
        Alphabet::new(vec!["a".into()])
    }

    fn all_options() -> Vec<Options> {
        (0..8)
            .map(|bits| Options {
                use_scc: bits & 1 != 0,
                use_hopeful: bits & 2 != 0,
                restrict_retirement: bits & 4 != 0,
                max_states: None,
            })
            .collect()
    }

    /// Single state with an accepting self-loop on `t`: accepts everything.
    fn universal() -> Automaton {
        let mut aut = Automaton::new(one_ap(), Acceptance::Buchi);
        aut.new_state();
        aut.new_edge(0, 0, Guard::True, true);
        aut
    }

    /// 0 -a-> 0, 0 -!a-> 1, 1 -t-> 1 accepting: words with at least one `!a`.
    fn eventually_not_a() -> Automaton {
        let mut aut = Automaton::new(one_ap(), Acceptance::Buchi);
        aut.new_states(2);
        aut.new_edge(0, 0, Guard::Ap(0), false);
        aut.new_edge(0, 1, Guard::not(Guard::Ap(0)), false);
        aut.new_edge(1, 1, Guard::True, true);
        aut
    }

    fn two_aps() -> Alphabet {
        Alphabet::new(vec!["a".into(), "b".into()])
    }

    /// 0 -a-> 0, 0 -b-> 1, 1 -t-> 1 accepting: `a` until `b`.
    fn a_until_b() -> Automaton {
        let mut aut = Automaton::new(two_aps(), Acceptance::Buchi);
        aut.new_states(2);
        aut.new_edge(0, 0, Guard::Ap(0), false);
        aut.new_edge(0, 1, Guard::Ap(1), false);
        aut.new_edge(1, 1, Guard::True, true);
        aut
    }

    /// 0 -p1-> 2 -p0&p1-> 1 -t-> 1, no accepting edge: the empty language.
    /// B is deterministic with nothing marked when it first reaches 1.
    fn unmarked_deterministic_breakpoint() -> Automaton {
        let mut aut = Automaton::new(
            Alphabet::new(vec!["p0".into(), "p1".into()]),
            Acceptance::Buchi,
        );
        aut.new_states(3);
        aut.new_edge(0, 2, Guard::Ap(1), false);
        aut.new_edge(2, 1, Guard::and(vec![Guard::Ap(0), Guard::Ap(1)]), false);
        aut.new_edge(1, 1, Guard::True, false);
        aut
    }

    /// The unique edge leaving `src` on `m`, as (destination, accepting).
    fn step(c: &Automaton, src: State, m: Minterm) -> (State, bool) {
        let hits: Vec<_> = c.out(src).filter(|e| e.guard.eval(m)).collect();
        assert_eq!(hits.len(), 1, "state {src} on {m:?}");
        (hits[0].dst, hits[0].accepting)
    }

    #[test]
    fn test_universal_complement_is_empty() {
        for opts in all_options() {
            let res = complement(&universal(), &opts).unwrap();
            assert!(is_empty(&res.automaton), "{opts:?}");
        }
    }

    #[test]
    fn test_universal_trace() {
        let res = complement(&universal(), &Options::default()).unwrap();
        let c = res.automaton;
        // ({0}, {}, {}) -t-> ({0}, {0}, {}) accepting, then a rejecting loop.
        assert_eq!(c.num_states(), 2);
        assert_eq!(c.state_name(0), Some("({0}, {}, {})"));
        assert_eq!(c.state_name(1), Some("({0}, {0}, {})"));
        let edges = c.edges();
        assert_eq!(edges.len(), 2);
        assert_eq!((edges[0].src, edges[0].dst, edges[0].accepting), (0, 1, true));
        assert_eq!(edges[0].guard, Guard::True);
        assert_eq!((edges[1].src, edges[1].dst, edges[1].accepting), (1, 1, false));
    }

    #[test]
    fn test_eventually_not_a_trace() {
        let res = complement(&eventually_not_a(), &Options::default()).unwrap();
        let c = res.automaton;
        assert_eq!(c.init(), 0);
        assert_eq!(c.num_states(), 2);
        assert_eq!(c.state_name(0), Some("({0}, {}, {})"));
        assert_eq!(c.state_name(1), Some("({1}, {1}, {})"));

        let edges = c.edges();
        assert_eq!(edges.len(), 3);
        // !a leaves for the accepting sink of the input: B reseeded with {1}.
        assert_eq!((edges[0].src, edges[0].dst, edges[0].accepting), (0, 0, true));
        assert_eq!(edges[0].guard, Guard::Ap(0));
        assert_eq!((edges[1].src, edges[1].dst, edges[1].accepting), (0, 1, true));
        assert_eq!(edges[1].guard, Guard::not(Guard::Ap(0)));
        assert_eq!((edges[2].src, edges[2].dst, edges[2].accepting), (1, 1, false));
        assert_eq!(edges[2].guard, Guard::True);
    }

    #[test]
    fn test_a_until_b_trace() {
        let (a, b, none, both) = (Minterm(0b01), Minterm(0b10), Minterm(0b00), Minterm(0b11));
        let c = complement(&a_until_b(), &Options::default()).unwrap().automaton;
        assert_eq!(c.num_states(), 4);
        assert_eq!(c.state_name(0), Some("({0}, {}, {})"));
        assert_eq!(c.state_name(1), Some("({}, {}, {})"));
        assert_eq!(c.state_name(2), Some("({1}, {1}, {})"));
        assert_eq!(c.state_name(3), Some("({0,1}, {1}, {})"));

        // a b t t ...: reseed on `b` into the accepting sink, then stuck in B.
        assert_eq!(step(&c, 0, a), (0, true));
        assert_eq!(step(&c, 0, b), (2, true));
        for m in [none, a, b, both] {
            assert_eq!(step(&c, 2, m), (2, false));
        }

        assert_eq!(step(&c, 0, none), (1, true));
        assert_eq!(step(&c, 0, both), (3, true));
        for m in [none, a, b, both] {
            assert_eq!(step(&c, 1, m), (1, true));
        }
        assert_eq!(step(&c, 3, none), (2, false));
        assert_eq!(step(&c, 3, a), (3, false));
        assert_eq!(step(&c, 3, b), (2, false));
        assert_eq!(step(&c, 3, both), (3, false));

        assert!(!accepts(&c, &word(vec![a, b], vec![none])));
        assert!(accepts(&c, &word(vec![], vec![a])));
        assert!(accepts(&c, &word(vec![none], vec![b])));
    }

    #[test]
    fn test_retires_from_unmarked_deterministic_breakpoint() {
        let aut = unmarked_deterministic_breakpoint();
        let w = word(vec![Minterm(0b10), Minterm(0b11)], vec![Minterm(0b00)]);
        assert!(!accepts(&aut, &w));
        let opts = Options {
            use_scc: false,
            use_hopeful: true,
            restrict_retirement: true,
            max_states: None,
        };
        let c = complement(&aut, &opts).unwrap().automaton;
        assert!(accepts(&c, &w));
        for opts in all_options() {
            let c = complement(&aut, &opts).unwrap().automaton;
            assert!(accepts(&c, &w), "{opts:?}");
        }
    }

    #[test]
    fn test_eventually_not_a_without_hopeful() {
        let opts = Options {
            use_hopeful: false,
            ..Options::default()
        };
        let res = complement(&eventually_not_a(), &opts).unwrap();
        let c = res.automaton;
        assert_eq!(c.num_states(), 3);
        assert_eq!(c.state_name(2), Some("({1}, {}, {({1}, {})})"));
        // the retired singleton is caught by the accepting loop at once
        assert_eq!(c.out(2).count(), 0);
        assert!(res.stats.invalid_minterms >= 2);
    }

    #[test]
    fn test_eventually_not_a_language() {
        let words = [
            (word(vec![], vec![A]), true),
            (word(vec![A, A], vec![A]), true),
            (word(vec![], vec![NOT_A]), false),
            (word(vec![A], vec![A, NOT_A]), false),
            (word(vec![NOT_A], vec![A]), false),
        ];
        for opts in all_options() {
            let c = complement(&eventually_not_a(), &opts).unwrap().automaton;
            for (w, expected) in &words {
                assert_eq!(accepts(&c, w), *expected, "{opts:?} {w:?}");
            }
        }
    }

    #[test]
    fn test_finitely_many_a() {
        // Infinitely many `a`; the complement is "finitely many a".
        let mut aut = Automaton::new(one_ap(), Acceptance::Buchi);
        aut.new_state();
        aut.new_edge(0, 0, Guard::Ap(0), true);
        aut.new_edge(0, 0, Guard::not(Guard::Ap(0)), false);

        for opts in all_options() {
            let c = complement(&aut, &opts).unwrap().automaton;
            assert!(accepts(&c, &word(vec![A, NOT_A, A], vec![NOT_A])), "{opts:?}");
            assert!(!accepts(&c, &word(vec![NOT_A], vec![NOT_A, A])), "{opts:?}");
            assert!(!accepts(&c, &word(vec![], vec![A])), "{opts:?}");
        }
    }

    #[test]
    fn test_rejects_non_buchi() {
        let aut = Automaton::new(
            one_ap(),
            Acceptance::Other {
                num_sets: 2,
                condition: "Inf(0) & Inf(1)".into(),
            },
        );
        let err = complement(&aut, &Options::default()).err();
        assert_eq!(
            err,
            Some(ComplementError::NotBuchi {
                acceptance: "2 Inf(0) & Inf(1)".into()
            })
        );
    }

    #[test]
    fn test_state_budget() {
        let opts = Options {
            use_hopeful: false,
            max_states: Some(2),
            ..Options::default()
        };
        let err = complement(&eventually_not_a(), &opts).err();
        assert_eq!(err, Some(ComplementError::StateBudgetExceeded { limit: 2 }));
    }

    #[test]
    fn test_empty_input_complement_is_universal() {
        let mut aut = Automaton::new(one_ap(), Acceptance::Buchi);
        aut.new_state();
        let c = complement(&aut, &Options::default()).unwrap().automaton;
        assert!(accepts(&c, &word(vec![], vec![A])));
        assert!(accepts(&c, &word(vec![A], vec![NOT_A, A])));
    }

    #[test]
    fn test_triples_are_unique() {
        let aut = eventually_not_a();
        let sccs = SccInfo::new(&aut);
        let mut pbs = Complementer::new(&aut, &sccs, Options { use_hopeful: false, ..Options::default() });
        pbs.explore().unwrap();
        let distinct: FxHashSet<Composite> = pbs.triples.iter().copied().collect();
        assert_eq!(distinct.len(), pbs.triples.len());
        assert_eq!(pbs.index.len(), pbs.out.num_states() as usize);
    }

    /// Single-states tracked in `s` as `({q}, {})`.
    fn singletons(pbs: &Complementer<'_>, s: SliceSetId) -> Vec<State> {
        let arena = &pbs.slices.succ.arena;
        pbs.slices
            .slices
            .get(s)
            .iter()
            .filter(|&&(p, b)| b == EMPTY_SET && arena.get(p).len() == 1)
            .map(|&(p, _)| arena.get(p)[0])
            .collect()
    }

    fn sample_automata() -> Vec<Automaton> {
        vec![
            universal(),
            eventually_not_a(),
            a_until_b(),
            unmarked_deterministic_breakpoint(),
        ]
    }

    #[test]
    fn test_invalid_slice_transitions_have_no_edges() {
        let mut invalid_pairs = 0;
        for aut in sample_automata() {
            let sccs = SccInfo::new(&aut);
            for opts in all_options() {
                let mut pbs = Complementer::new(&aut, &sccs, opts);
                pbs.explore().unwrap();
                for (id, &(_, _, s)) in pbs.triples.clone().iter().enumerate() {
                    for m in pbs.minterms.clone() {
                        let (_, valid) = pbs.slices.successors_of_slices(
                            s,
                            m,
                            pbs.filter,
                            pbs.slice_filter,
                            &mut pbs.hopeful,
                        );
                        if !valid {
                            invalid_pairs += 1;
                            let src = id as State;
                            assert!(
                                !pbs.out.out(src).any(|e| e.guard.eval(m)),
                                "{opts:?}: edge out of {src} on {m:?}"
                            );
                        }
                    }
                }
            }
        }
        assert!(invalid_pairs > 0);
    }

    #[test]
    fn test_accepting_iff_breakpoint_emptied() {
        for aut in sample_automata() {
            let sccs = SccInfo::new(&aut);
            for opts in all_options() {
                let mut pbs = Complementer::new(&aut, &sccs, opts);
                pbs.explore().unwrap();
                let edges = pbs.out.edges().to_vec();
                for e in edges {
                    let m = pbs
                        .minterms
                        .iter()
                        .copied()
                        .find(|&m| e.guard.eval(m))
                        .unwrap();
                    let (_, b, _) = pbs.triples[e.src as usize];
                    let (p2, b2, s2) = pbs.triples[e.dst as usize];
                    let new_b = pbs.slices.succ.successors(b, m, pbs.filter).all;
                    let new_b = pbs.slices.succ.arena.get(new_b).to_vec();
                    let retired = singletons(&pbs, s2);
                    let arena = &pbs.slices.succ.arena;

                    let emptied = new_b.iter().all(|q| retired.contains(q));
                    assert_eq!(e.accepting, emptied, "{opts:?}: {e:?}");
                    assert!(arena.get(b2).iter().all(|q| arena.get(p2).contains(q)));
                    if !e.accepting {
                        assert_ne!(b2, EMPTY_SET);
                        assert!(arena.get(b2).iter().all(|q| new_b.contains(q)));
                        assert!(arena.get(b2).iter().all(|q| !retired.contains(q)));
                    }
                }
            }
        }
    }
}
