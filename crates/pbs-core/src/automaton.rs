use crate::guard::{Alphabet, Guard, Minterm};
use crate::scc::SccInfo;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use std::fmt;

pub type State = u32;

/// Acceptance condition of an automaton. Only `Buchi` is accepted as input
/// to complementation; `All` is the "every infinite run accepts" condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acceptance {
    Buchi,
    All,
    Other { num_sets: u32, condition: String },
}

impl fmt::Display for Acceptance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Acceptance::Buchi => write!(f, "1 Inf(0)"),
            Acceptance::All => write!(f, "0 t"),
            Acceptance::Other { num_sets, condition } => write!(f, "{num_sets} {condition}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub src: State,
    pub dst: State,
    pub guard: Guard,
    /// Member of the Büchi acceptance set.
    pub accepting: bool,
}

/// Edge-labelled automaton with transition-based acceptance.
///
/// Doubles as the output builder of the complementation: states and edges are
/// only ever appended until `merge_edges` rewrites the edge list.
#[derive(Debug, Clone)]
pub struct Automaton {
    pub name: Option<String>,
    alphabet: Alphabet,
    acceptance: Acceptance,
    init: State,
    edges: Vec<Edge>,
    // out[state] = indices into `edges`
    out: Vec<Vec<u32>>,
    state_names: Option<Vec<String>>,
}

impl Automaton {
    pub fn new(alphabet: Alphabet, acceptance: Acceptance) -> Self {
        Automaton {
            name: None,
            alphabet,
            acceptance,
            init: 0,
            edges: Vec::new(),
            out: Vec::new(),
            state_names: None,
        }
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn acceptance(&self) -> &Acceptance {
        &self.acceptance
    }

    pub fn is_buchi(&self) -> bool {
        self.acceptance == Acceptance::Buchi
    }

    pub fn num_states(&self) -> u32 {
        self.out.len() as u32
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn init(&self) -> State {
        self.init
    }

    pub fn set_init(&mut self, state: State) {
        self.init = state;
    }

    pub fn new_state(&mut self) -> State {
        let id = self.out.len() as State;
        self.out.push(Vec::new());
        id
    }

    /// Add `n` states, returning the first new id.
    pub fn new_states(&mut self, n: u32) -> State {
        let first = self.out.len() as State;
        self.out.resize_with(self.out.len() + n as usize, Vec::new);
        first
    }

    pub fn new_edge(&mut self, src: State, dst: State, guard: Guard, accepting: bool) {
        let idx = self.edges.len() as u32;
        self.edges.push(Edge { src, dst, guard, accepting });
        self.out[src as usize].push(idx);
    }

    pub fn out(&self, state: State) -> impl Iterator<Item = &Edge> + '_ {
        self.out[state as usize]
            .iter()
            .map(move |&i| &self.edges[i as usize])
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn state_name(&self, state: State) -> Option<&str> {
        self.state_names
            .as_ref()
            .and_then(|names| names.get(state as usize))
            .map(String::as_str)
    }

    pub fn set_state_names(&mut self, names: Vec<String>) {
        self.state_names = Some(names);
    }

    /// Merge parallel edges with equal source, destination and acceptance
    /// into one edge over the union of their minterms. Edges with an
    /// unsatisfiable guard disappear. Edges end up sorted by
    /// `(src, dst, accepting)`.
    pub fn merge_edges(&mut self) {
        let mut groups: FxHashMap<(State, State, bool), Vec<Minterm>> = FxHashMap::default();
        for e in &self.edges {
            groups
                .entry((e.src, e.dst, e.accepting))
                .or_default()
                .extend(self.alphabet.minterms_of(&e.guard));
        }

        let mut keys: Vec<(State, State, bool)> = groups.keys().copied().collect();
        keys.sort_unstable();

        self.edges.clear();
        for out in &mut self.out {
            out.clear();
        }
        for key in keys {
            let minterms = &groups[&key];
            if minterms.is_empty() {
                continue;
            }
            let (src, dst, accepting) = key;
            let guard = self.alphabet.guard_of(minterms);
            self.new_edge(src, dst, guard, accepting);
        }
    }

    /// Per-state flag: reachable from the initial state over satisfiable edges.
    pub fn reachable(&self) -> Vec<bool> {
        let n = self.num_states() as usize;
        let mut seen = vec![false; n];
        if n == 0 {
            return seen;
        }
        let mut queue: VecDeque<State> = VecDeque::new();
        seen[self.init as usize] = true;
        queue.push_back(self.init);
        while let Some(s) = queue.pop_front() {
            for e in self.out(s) {
                if !seen[e.dst as usize] && self.alphabet.is_satisfiable(&e.guard) {
                    seen[e.dst as usize] = true;
                    queue.push_back(e.dst);
                }
            }
        }
        seen
    }

    /// Remove states that are unreachable or cannot reach an accepting cycle.
    /// The initial state is always kept. States are renumbered contiguously
    /// in their original order.
    pub fn purge_useless(&self) -> Automaton {
        let n = self.num_states() as usize;
        if n == 0 {
            return self.clone();
        }

        let fwd_reach = self.reachable();
        let sccs = SccInfo::new(self);

        // Backward BFS from states of accepting components.
        let mut rev: Vec<Vec<State>> = vec![vec![]; n];
        for e in &self.edges {
            if self.alphabet.is_satisfiable(&e.guard) {
                rev[e.dst as usize].push(e.src);
            }
        }
        let mut bwd_reach = vec![false; n];
        let mut queue: VecDeque<State> = VecDeque::new();
        for s in 0..n as State {
            if sccs.is_accepting(sccs.component_of(s)) {
                bwd_reach[s as usize] = true;
                queue.push_back(s);
            }
        }
        while let Some(s) = queue.pop_front() {
            for &p in &rev[s as usize] {
                if !bwd_reach[p as usize] {
                    bwd_reach[p as usize] = true;
                    queue.push_back(p);
                }
            }
        }

        let mut old_to_new = vec![u32::MAX; n];
        let mut out = Automaton::new(self.alphabet.clone(), self.acceptance.clone());
        out.name = self.name.clone();
        for s in 0..n {
            if s == self.init as usize || (fwd_reach[s] && bwd_reach[s]) {
                old_to_new[s] = out.new_state();
            }
        }
        out.set_init(old_to_new[self.init as usize]);

        for e in &self.edges {
            let (s, d) = (old_to_new[e.src as usize], old_to_new[e.dst as usize]);
            if s != u32::MAX && d != u32::MAX && bwd_reach[e.dst as usize] {
                out.new_edge(s, d, e.guard.clone(), e.accepting);
            }
        }

        if let Some(names) = &self.state_names {
            let kept = names
                .iter()
                .enumerate()
                .filter(|(s, _)| old_to_new[*s] != u32::MAX)
                .map(|(_, name)| name.clone())
                .collect();
            out.set_state_names(kept);
        }

        out
    }
}
