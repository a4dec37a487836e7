use crate::automaton::{Automaton, State};
use crate::emptiness::has_cycle_from;
use crate::scc::SccInfo;
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

/// Decides, per input state, whether a rejecting cycle is still reachable
/// inside the state's own component.
pub struct HopefulOracle<'a> {
    aut: &'a Automaton,
    sccs: &'a SccInfo,
    cache: FxHashMap<State, bool>,
    pub queries: u64,
    pub graphs_built: u64,
}

impl<'a> HopefulOracle<'a> {
    pub fn new(aut: &'a Automaton, sccs: &'a SccInfo) -> Self {
        HopefulOracle {
            aut,
            sccs,
            cache: FxHashMap::default(),
            queries: 0,
            graphs_built: 0,
        }
    }

    pub fn is_hopeful(&mut self, s: State) -> bool {
        self.queries += 1;
        if let Some(&h) = self.cache.get(&s) {
            return h;
        }
        let h = self.sccs.has_rejecting_cycle(self.sccs.component_of(s)) && self.rejecting_cycle_reachable(s);
        self.cache.insert(s, h);
        h
    }

    pub fn any_hopeful(&mut self, states: &[State]) -> bool {
        states.iter().any(|&s| self.is_hopeful(s))
    }

    /// Build the graph of non-accepting edges inside `s`'s component,
    /// restricted to what `s` reaches, and ask whether it has a cycle.
    fn rejecting_cycle_reachable(&mut self, s: State) -> bool {
        self.graphs_built += 1;
        let comp = self.sccs.component_of(s);

        let mut graph: DiGraph<State, ()> = DiGraph::new();
        let mut node_of: FxHashMap<State, NodeIndex> = FxHashMap::default();
        let mut worklist: VecDeque<State> = VecDeque::new();

        let root = graph.add_node(s);
        node_of.insert(s, root);
        worklist.push_back(s);

        while let Some(q) = worklist.pop_front() {
            let src = node_of[&q];
            for e in self.aut.out(q) {
                if e.accepting
                    || self.sccs.component_of(e.dst) != comp
                    || !self.aut.alphabet().is_satisfiable(&e.guard)
                {
                    continue;
                }
                let dst = *node_of.entry(e.dst).or_insert_with(|| {
                    worklist.push_back(e.dst);
                    graph.add_node(e.dst)
                });
                graph.add_edge(src, dst, ());
            }
        }

        has_cycle_from(&graph, root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::Acceptance;
    use crate::guard::{Alphabet, Guard};

    #[test]
    fn test_hopeful_states() {
        // Component {0, 1, 2}: 0 -> 1 non-accepting, 1 -> 1 non-accepting,
        // 1 -> 2 accepting, 2 -> 0 accepting. Component {3}: accepting loop.
        let mut aut = Automaton::new(Alphabet::new(vec!["a".into()]), Acceptance::Buchi);
        aut.new_states(4);
        aut.new_edge(0, 1, Guard::True, false);
        aut.new_edge(1, 1, Guard::Ap(0), false);
        aut.new_edge(1, 2, Guard::True, true);
        aut.new_edge(2, 0, Guard::True, true);
        aut.new_edge(2, 3, Guard::True, false);
        aut.new_edge(3, 3, Guard::True, true);

        let sccs = SccInfo::new(&aut);
        let mut oracle = HopefulOracle::new(&aut, &sccs);
        assert!(oracle.is_hopeful(0));
        assert!(oracle.is_hopeful(1));
        // only accepting edges leave 2 inside its component
        assert!(!oracle.is_hopeful(2));
        // no rejecting cycle in {3}: answered without building a graph
        assert!(!oracle.is_hopeful(3));
        assert_eq!(oracle.graphs_built, 3);

        assert!(oracle.is_hopeful(0));
        assert_eq!(oracle.graphs_built, 3);
        assert!(oracle.any_hopeful(&[2, 3, 1]));
        assert!(!oracle.any_hopeful(&[2, 3]));
    }
}
