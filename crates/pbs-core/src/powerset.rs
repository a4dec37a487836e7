use crate::automaton::State;
use itertools::Itertools;
use rustc_hash::FxHashMap;

pub type SetId = u32;
pub type SliceSetId = u32;

/// (powerset, breakpoint) pair of interned state sets.
pub type Slice = (SetId, SetId);

/// Id of the empty state set in every `PowersetArena`.
pub const EMPTY_SET: SetId = 0;
/// Id of the empty slice set in every `SliceArena`.
pub const EMPTY_SLICES: SliceSetId = 0;

/// Interns sorted `Vec<State>` sets as `u32` IDs.
/// After interning, set equality, hashing and cache keys are plain u32 work.
pub struct PowersetArena {
    map: FxHashMap<Vec<State>, SetId>,
    /// Fast path for single-element sets, which dominate slice powersets.
    /// Avoids hashing a Vec when the set contains exactly one element.
    single_map: FxHashMap<State, SetId>,
    pub sets: Vec<Vec<State>>,
}

impl PowersetArena {
    pub fn new() -> Self {
        let mut arena = PowersetArena {
            map: FxHashMap::default(),
            single_map: FxHashMap::default(),
            sets: Vec::new(),
        };
        arena.intern(Vec::new());
        arena
    }

    /// Intern a sorted, deduplicated set of states. Returns the u32 ID.
    pub fn intern(&mut self, sorted_set: Vec<State>) -> SetId {
        debug_assert!(sorted_set.windows(2).all(|w| w[0] < w[1]));
        if sorted_set.len() == 1 {
            // Single-element set: hash a u32 instead of a Vec
            let key = sorted_set[0];
            if let Some(&id) = self.single_map.get(&key) {
                return id;
            }
            let id = self.sets.len() as SetId;
            self.sets.push(sorted_set);
            self.single_map.insert(key, id);
            return id;
        }

        if let Some(&id) = self.map.get(&sorted_set) {
            return id;
        }
        let id = self.sets.len() as SetId;
        self.sets.push(sorted_set.clone());
        self.map.insert(sorted_set, id);
        id
    }

    /// Intern an arbitrary collection of states.
    pub fn intern_iter(&mut self, states: impl IntoIterator<Item = State>) -> SetId {
        let mut v: Vec<State> = states.into_iter().collect();
        v.sort_unstable();
        v.dedup();
        self.intern(v)
    }

    #[inline]
    pub fn get(&self, id: SetId) -> &[State] {
        &self.sets[id as usize]
    }

    pub fn union(&mut self, a: SetId, b: SetId) -> SetId {
        if a == b || b == EMPTY_SET {
            return a;
        }
        if a == EMPTY_SET {
            return b;
        }
        let merged: Vec<State> = self
            .get(a)
            .iter()
            .merge(self.get(b).iter())
            .dedup()
            .copied()
            .collect();
        self.intern(merged)
    }

    pub fn difference(&mut self, a: SetId, remove: impl Fn(State) -> bool) -> SetId {
        let kept: Vec<State> = self.get(a).iter().copied().filter(|&s| !remove(s)).collect();
        if kept.len() == self.get(a).len() {
            return a;
        }
        self.intern(kept)
    }
}

impl Default for PowersetArena {
    fn default() -> Self {
        Self::new()
    }
}

/// Interns sorted sets of slices as `u32` IDs.
pub struct SliceArena {
    map: FxHashMap<Vec<Slice>, SliceSetId>,
    pub sets: Vec<Vec<Slice>>,
}

impl SliceArena {
    pub fn new() -> Self {
        let mut arena = SliceArena {
            map: FxHashMap::default(),
            sets: Vec::new(),
        };
        arena.intern(Vec::new());
        arena
    }

    /// Intern an arbitrary collection of slices.
    pub fn intern(&mut self, mut slices: Vec<Slice>) -> SliceSetId {
        slices.sort_unstable();
        slices.dedup();
        if let Some(&id) = self.map.get(&slices) {
            return id;
        }
        let id = self.sets.len() as SliceSetId;
        self.sets.push(slices.clone());
        self.map.insert(slices, id);
        id
    }

    #[inline]
    pub fn get(&self, id: SliceSetId) -> &[Slice] {
        &self.sets[id as usize]
    }
}

impl Default for SliceArena {
    fn default() -> Self {
        Self::new()
    }
}
