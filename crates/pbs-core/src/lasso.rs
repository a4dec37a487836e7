use crate::automaton::{Acceptance, Automaton, State};
use crate::guard::Minterm;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

/// Ultimately periodic word `prefix · cycle^ω`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lasso {
    pub prefix: Vec<Minterm>,
    pub cycle: Vec<Minterm>,
}

impl Lasso {
    /// None when `cycle` is empty: such a word is finite.
    pub fn new(prefix: Vec<Minterm>, cycle: Vec<Minterm>) -> Option<Self> {
        if cycle.is_empty() {
            return None;
        }
        Some(Lasso { prefix, cycle })
    }

    fn len(&self) -> usize {
        self.prefix.len() + self.cycle.len()
    }

    fn letter(&self, pos: usize) -> Minterm {
        if pos < self.prefix.len() {
            self.prefix[pos]
        } else {
            self.cycle[pos - self.prefix.len()]
        }
    }

    fn next(&self, pos: usize) -> usize {
        if pos + 1 < self.len() {
            pos + 1
        } else {
            self.prefix.len()
        }
    }
}

/// Membership of a lasso word, decided on the product of the automaton with
/// the word's positions: accepted iff the product has a reachable cycle
/// through an accepting edge (any cycle under `Acceptance::All`).
pub fn accepts(aut: &Automaton, word: &Lasso) -> bool {
    if aut.num_states() == 0 {
        return false;
    }
    let all = *aut.acceptance() == Acceptance::All;

    let mut product: DiGraph<(), bool> = DiGraph::new();
    let mut index: FxHashMap<(State, usize), NodeIndex> = FxHashMap::default();
    let mut worklist: VecDeque<(State, usize)> = VecDeque::new();

    let start = (aut.init(), 0usize);
    index.insert(start, product.add_node(()));
    worklist.push_back(start);

    while let Some((q, pos)) = worklist.pop_front() {
        let src = index[&(q, pos)];
        let letter = word.letter(pos);
        let next = word.next(pos);
        for e in aut.out(q) {
            if !e.guard.eval(letter) {
                continue;
            }
            let key = (e.dst, next);
            let dst = match index.get(&key) {
                Some(&d) => d,
                None => {
                    let d = product.add_node(());
                    index.insert(key, d);
                    worklist.push_back(key);
                    d
                }
            };
            product.add_edge(src, dst, e.accepting || all);
        }
    }

    let mut comp = vec![usize::MAX; product.node_count()];
    for (id, members) in tarjan_scc(&product).iter().enumerate() {
        for node in members {
            comp[node.index()] = id;
        }
    }
    product
        .raw_edges()
        .iter()
        .any(|e| e.weight && comp[e.source().index()] == comp[e.target().index()])
}
