use crate::automaton::{Automaton, State};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

/// Strongly-connected components of an automaton, with the two
/// classifications the complementation needs.
///
/// Edges whose guard is unsatisfiable are ignored.
pub struct SccInfo {
    comp: Vec<u32>,
    // indexed by component id
    accepting: Vec<bool>,
    rejecting_cycle: Vec<bool>,
}

impl SccInfo {
    pub fn new(aut: &Automaton) -> Self {
        let n = aut.num_states() as usize;
        let live: Vec<bool> = aut
            .edges()
            .iter()
            .map(|e| aut.alphabet().is_satisfiable(&e.guard))
            .collect();

        let mut graph: DiGraph<(), ()> = DiGraph::with_capacity(n, aut.num_edges());
        for _ in 0..n {
            graph.add_node(());
        }
        for (e, &l) in aut.edges().iter().zip(&live) {
            if !l {
                continue;
            }
            graph.add_edge(NodeIndex::new(e.src as usize), NodeIndex::new(e.dst as usize), ());
        }

        let mut comp = vec![0u32; n];
        let components = tarjan_scc(&graph);
        for (id, members) in components.iter().enumerate() {
            for node in members {
                comp[node.index()] = id as u32;
            }
        }

        let num = components.len();
        let mut accepting = vec![false; num];
        // Sub-graph of internal, non-accepting edges: a cycle there is a
        // rejecting cycle of the enclosing component.
        let mut rejecting: DiGraph<(), ()> = DiGraph::with_capacity(n, aut.num_edges());
        for _ in 0..n {
            rejecting.add_node(());
        }
        for (e, &l) in aut.edges().iter().zip(&live) {
            if !l || comp[e.src as usize] != comp[e.dst as usize] {
                continue;
            }
            if e.accepting {
                accepting[comp[e.src as usize] as usize] = true;
            } else {
                rejecting.add_edge(NodeIndex::new(e.src as usize), NodeIndex::new(e.dst as usize), ());
            }
        }

        let mut rejecting_cycle = vec![false; num];
        for members in tarjan_scc(&rejecting) {
            let cyclic = members.len() > 1
                || rejecting.contains_edge(members[0], members[0]);
            if cyclic {
                rejecting_cycle[comp[members[0].index()] as usize] = true;
            }
        }

        SccInfo {
            comp,
            accepting,
            rejecting_cycle,
        }
    }

    #[inline]
    pub fn component_of(&self, state: State) -> u32 {
        self.comp[state as usize]
    }

    /// Contains a cycle through an accepting edge.
    #[inline]
    pub fn is_accepting(&self, component: u32) -> bool {
        self.accepting[component as usize]
    }

    /// Contains a cycle made only of non-accepting edges.
    #[inline]
    pub fn has_rejecting_cycle(&self, component: u32) -> bool {
        self.rejecting_cycle[component as usize]
    }
}
