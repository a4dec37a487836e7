use crate::automaton::{Acceptance, Automaton};
use crate::scc::SccInfo;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;

/// Non-emptiness of `graph` read as an automaton where every infinite run
/// accepts, started at `root`: is some cycle reachable from `root`?
pub fn has_cycle_from<N, E>(graph: &DiGraph<N, E>, root: NodeIndex) -> bool {
    let mut reach = vec![false; graph.node_count()];
    let mut dfs = Dfs::new(graph, root);
    while let Some(node) = dfs.next(graph) {
        reach[node.index()] = true;
    }

    tarjan_scc(graph).iter().any(|members| {
        let cyclic = members.len() > 1 || graph.contains_edge(members[0], members[0]);
        cyclic && reach[members[0].index()]
    })
}

/// Does the automaton accept no infinite word?
///
/// Edges flagged `accepting` form the single Büchi set; under
/// `Acceptance::All` any reachable cycle is an accepting run.
pub fn is_empty(aut: &Automaton) -> bool {
    if aut.num_states() == 0 {
        return true;
    }
    let reach = aut.reachable();
    let sccs = SccInfo::new(aut);
    let all = *aut.acceptance() == Acceptance::All;

    !(0..aut.num_states()).any(|s| {
        let c = sccs.component_of(s);
        reach[s as usize] && (sccs.is_accepting(c) || (all && sccs.has_rejecting_cycle(c)))
    })
}
