use biodivine_lib_bdd::{Bdd, BddPartialValuation, BddValuation, BddVariable, BddVariableSet};
use rustc_hash::FxHashMap;
use std::fmt;
use std::rc::Rc;

/// Largest number of atomic propositions: a `Minterm` is a `u32` bitmask.
pub const MAX_APS: usize = 32;

/// One valuation of the atomic propositions: bit `i` is the value of AP `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Minterm(pub u32);

impl Minterm {
    #[inline]
    pub fn value(self, ap: u32) -> bool {
        self.0 >> ap & 1 == 1
    }
}

/// Boolean edge label over atomic proposition indices, as written in HOA.
/// Semantic questions (satisfiability, minterms) go through `Alphabet`,
/// which compiles the label to a BDD.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Guard {
    True,
    False,
    Ap(u32),
    Not(Box<Guard>),
    And(Vec<Guard>),
    Or(Vec<Guard>),
}

impl Guard {
    pub fn not(g: Guard) -> Guard {
        match g {
            Guard::True => Guard::False,
            Guard::False => Guard::True,
            Guard::Not(inner) => *inner,
            other => Guard::Not(Box::new(other)),
        }
    }

    pub fn and(parts: Vec<Guard>) -> Guard {
        let mut out = Vec::with_capacity(parts.len());
        for p in parts {
            match p {
                Guard::True => {}
                Guard::False => return Guard::False,
                Guard::And(inner) => out.extend(inner),
                other => out.push(other),
            }
        }
        match out.len() {
            0 => Guard::True,
            1 => out.pop().unwrap_or(Guard::True),
            _ => Guard::And(out),
        }
    }

    pub fn or(parts: Vec<Guard>) -> Guard {
        let mut out = Vec::with_capacity(parts.len());
        for p in parts {
            match p {
                Guard::False => {}
                Guard::True => return Guard::True,
                Guard::Or(inner) => out.extend(inner),
                other => out.push(other),
            }
        }
        match out.len() {
            0 => Guard::False,
            1 => out.pop().unwrap_or(Guard::False),
            _ => Guard::Or(out),
        }
    }

    /// Direct evaluation on one valuation, without building a BDD.
    pub fn eval(&self, m: Minterm) -> bool {
        match self {
            Guard::True => true,
            Guard::False => false,
            Guard::Ap(i) => m.value(*i),
            Guard::Not(g) => !g.eval(m),
            Guard::And(gs) => gs.iter().all(|g| g.eval(m)),
            Guard::Or(gs) => gs.iter().any(|g| g.eval(m)),
        }
    }

    /// The guard satisfied by exactly `m`.
    pub fn minterm(m: Minterm, num_aps: usize) -> Guard {
        let care = if num_aps == 0 { 0 } else { u32::MAX >> (32 - num_aps) };
        cube(care, m.0 & care, num_aps)
    }

    fn precedence(&self) -> u8 {
        match self {
            Guard::Or(_) => 0,
            Guard::And(_) => 1,
            _ => 2,
        }
    }

    fn fmt_child(&self, child: &Guard, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if child.precedence() <= self.precedence() && child.precedence() < 2 {
            write!(f, "({child})")
        } else {
            write!(f, "{child}")
        }
    }
}

impl fmt::Display for Guard {
    /// HOA label syntax.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Guard::True => write!(f, "t"),
            Guard::False => write!(f, "f"),
            Guard::Ap(i) => write!(f, "{i}"),
            Guard::Not(g) => {
                write!(f, "!")?;
                self.fmt_child(g, f)
            }
            Guard::And(gs) | Guard::Or(gs) => {
                let sep = if matches!(self, Guard::And(_)) { " & " } else { " | " };
                for (k, g) in gs.iter().enumerate() {
                    if k > 0 {
                        write!(f, "{sep}")?;
                    }
                    self.fmt_child(g, f)?;
                }
                Ok(())
            }
        }
    }
}

/// Conjunction of literals: `care` selects the APs that appear, `value`
/// gives their polarity.
fn cube(care: u32, value: u32, num_aps: usize) -> Guard {
    let lits = (0..num_aps as u32)
        .filter(|i| care >> i & 1 == 1)
        .map(|i| {
            if value >> i & 1 == 1 {
                Guard::Ap(i)
            } else {
                Guard::Not(Box::new(Guard::Ap(i)))
            }
        })
        .collect();
    Guard::and(lits)
}

/// Named atomic propositions of an automaton, with one BDD variable per
/// proposition.
#[derive(Clone)]
pub struct Alphabet {
    names: Vec<String>,
    vars: BddVariableSet,
    // indexed by AP
    ap_vars: Vec<BddVariable>,
}

impl fmt::Debug for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Alphabet").field("names", &self.names).finish()
    }
}

impl PartialEq for Alphabet {
    fn eq(&self, other: &Self) -> bool {
        self.names == other.names
    }
}

impl Eq for Alphabet {}

impl Alphabet {
    pub fn new(names: Vec<String>) -> Self {
        // HOA allows repeated proposition names, so the variables stay anonymous.
        let vars = BddVariableSet::new_anonymous(names.len() as u16);
        let ap_vars = vars.variables();
        Alphabet { names, vars, ap_vars }
    }

    pub fn num_aps(&self) -> usize {
        self.names.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Minterms of `t`, in increasing valuation order.
    pub fn all_minterms(&self) -> impl Iterator<Item = Minterm> {
        (0..1u64 << self.names.len()).map(|v| Minterm(v as u32))
    }

    pub fn bdd(&self, guard: &Guard) -> Bdd {
        match guard {
            Guard::True => self.vars.mk_true(),
            Guard::False => self.vars.mk_false(),
            Guard::Ap(i) => self.vars.mk_var(self.ap_vars[*i as usize]),
            Guard::Not(g) => self.bdd(g).not(),
            Guard::And(gs) => gs
                .iter()
                .fold(self.vars.mk_true(), |acc, g| acc.and(&self.bdd(g))),
            Guard::Or(gs) => gs
                .iter()
                .fold(self.vars.mk_false(), |acc, g| acc.or(&self.bdd(g))),
        }
    }

    pub fn is_satisfiable(&self, guard: &Guard) -> bool {
        !self.bdd(guard).is_false()
    }

    /// Sorted minterms of `guard`.
    pub fn minterms_of(&self, guard: &Guard) -> Vec<Minterm> {
        if self.ap_vars.is_empty() {
            return if guard.eval(Minterm(0)) { vec![Minterm(0)] } else { Vec::new() };
        }
        let mut out: Vec<Minterm> = self
            .bdd(guard)
            .sat_valuations()
            .map(|v| self.minterm_of(&v))
            .collect();
        out.sort_unstable();
        out
    }

    fn minterm_of(&self, valuation: &BddValuation) -> Minterm {
        let bits = valuation
            .as_vector()
            .iter()
            .enumerate()
            .fold(0u32, |acc, (i, &b)| if b { acc | 1 << i } else { acc });
        Minterm(bits)
    }

    fn minterm_bdd(&self, m: Minterm) -> Bdd {
        self.ap_vars
            .iter()
            .enumerate()
            .fold(self.vars.mk_true(), |acc, (i, &var)| {
                let lit = if m.value(i as u32) {
                    self.vars.mk_var(var)
                } else {
                    self.vars.mk_not_var(var)
                };
                acc.and(&lit)
            })
    }

    fn care_value(&self, clause: &BddPartialValuation) -> (u32, u32) {
        let mut care = 0u32;
        let mut value = 0u32;
        for (i, &var) in self.ap_vars.iter().enumerate() {
            if let Some(b) = clause.get_value(var) {
                care |= 1 << i;
                if b {
                    value |= 1 << i;
                }
            }
        }
        (care, value)
    }

    /// Sum-of-cubes guard covering exactly `minterms`, read off the
    /// optimized DNF of their BDD.
    ///
    /// The result depends only on the set of minterms, so building a guard,
    /// enumerating its minterms, and building again is a fixpoint.
    pub fn guard_of(&self, minterms: &[Minterm]) -> Guard {
        let mut set: Vec<Minterm> = minterms.to_vec();
        set.sort_unstable();
        set.dedup();
        let bdd = set
            .iter()
            .fold(self.vars.mk_false(), |acc, &m| acc.or(&self.minterm_bdd(m)));
        if bdd.is_false() {
            return Guard::False;
        }
        if bdd.is_true() {
            return Guard::True;
        }

        let mut cubes: Vec<(u32, u32)> = bdd
            .to_optimized_dnf()
            .iter()
            .map(|clause| self.care_value(clause))
            .collect();
        cubes.sort_unstable_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));
        cubes.dedup();
        let n = self.num_aps();
        Guard::or(cubes.into_iter().map(|(care, value)| cube(care, value, n)).collect())
    }
}

/// Memoizes `Alphabet::minterms_of` per guard.
pub struct MintermCache {
    alphabet: Alphabet,
    cache: FxHashMap<Guard, Rc<[Minterm]>>,
    pub hits: u64,
    pub misses: u64,
}

impl MintermCache {
    pub fn new(alphabet: Alphabet) -> Self {
        MintermCache {
            alphabet,
            cache: FxHashMap::default(),
            hits: 0,
            misses: 0,
        }
    }

    /// Sorted minterms of `guard`.
    pub fn minterms_of(&mut self, guard: &Guard) -> Rc<[Minterm]> {
        if let Some(ms) = self.cache.get(guard) {
            self.hits += 1;
            return Rc::clone(ms);
        }
        self.misses += 1;
        let ms: Rc<[Minterm]> = self.alphabet.minterms_of(guard).into();
        self.cache.insert(guard.clone(), Rc::clone(&ms));
        ms
    }

    pub fn contains(&mut self, guard: &Guard, m: Minterm) -> bool {
        self.minterms_of(guard).binary_search(&m).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ab() -> Alphabet {
        Alphabet::new(vec!["a".into(), "b".into()])
    }

    #[test]
    fn test_minterms_partition() {
        let alpha = ab();
        let a = Guard::Ap(0);
        let not_a = Guard::not(Guard::Ap(0));
        let mut both = alpha.minterms_of(&a);
        both.extend(alpha.minterms_of(&not_a));
        both.sort();
        assert_eq!(both, alpha.all_minterms().collect::<Vec<_>>());
        assert_eq!(alpha.minterms_of(&Guard::True).len(), 4);
        assert!(alpha.minterms_of(&Guard::False).is_empty());
        assert_eq!(alpha.minterms_of(&Guard::Ap(1)), vec![Minterm(0b10), Minterm(0b11)]);
    }

    #[test]
    fn test_bdd_agrees_with_eval() {
        let alpha = Alphabet::new(vec!["a".into(), "b".into(), "c".into()]);
        let g = Guard::or(vec![
            Guard::and(vec![Guard::Ap(0), Guard::not(Guard::Ap(2))]),
            Guard::not(Guard::or(vec![Guard::Ap(1), Guard::Ap(2)])),
        ]);
        let expected: Vec<Minterm> = alpha.all_minterms().filter(|&m| g.eval(m)).collect();
        assert_eq!(alpha.minterms_of(&g), expected);
    }

    #[test]
    fn test_satisfiability() {
        let alpha = ab();
        let contradiction = Guard::and(vec![Guard::Ap(0), Guard::not(Guard::Ap(0))]);
        assert!(!alpha.is_satisfiable(&contradiction));
        assert!(alpha.is_satisfiable(&Guard::not(Guard::Ap(1))));
        assert!(!alpha.is_satisfiable(&Guard::False));
    }

    #[test]
    fn test_guard_of_simplifies() {
        let alpha = ab();
        // a&b | a&!b == a
        assert_eq!(alpha.guard_of(&[Minterm(0b01), Minterm(0b11)]), Guard::Ap(0));
        assert_eq!(alpha.guard_of(&[]), Guard::False);
        let all: Vec<_> = alpha.all_minterms().collect();
        assert_eq!(alpha.guard_of(&all), Guard::True);
    }

    #[test]
    fn test_guard_of_is_canonical() {
        let alpha = ab();
        let sets: [&[Minterm]; 3] = [
            &[Minterm(0), Minterm(3)],
            &[Minterm(1), Minterm(2), Minterm(3)],
            &[Minterm(2)],
        ];
        for set in sets {
            let g = alpha.guard_of(set);
            assert_eq!(alpha.minterms_of(&g), set.to_vec());
            let again = alpha.guard_of(&alpha.minterms_of(&g));
            assert_eq!(g, again);
        }
    }

    #[test]
    fn test_display() {
        let g = Guard::and(vec![
            Guard::Ap(0),
            Guard::or(vec![Guard::not(Guard::Ap(1)), Guard::Ap(2)]),
        ]);
        assert_eq!(g.to_string(), "0 & (!1 | 2)");
        assert_eq!(Guard::minterm(Minterm(0b10), 2).to_string(), "!0 & 1");
        assert_eq!(Guard::minterm(Minterm(0), 0), Guard::True);
    }

    #[test]
    fn test_cache_counts() {
        let mut cache = MintermCache::new(ab());
        let g = Guard::Ap(1);
        assert!(cache.contains(&g, Minterm(0b10)));
        assert!(!cache.contains(&g, Minterm(0b01)));
        assert_eq!(cache.misses, 1);
        assert_eq!(cache.hits, 1);
    }
}
