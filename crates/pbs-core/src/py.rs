use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use crate::automaton::Automaton;
use crate::guard::Minterm;
use crate::lasso::{self, Lasso};
use crate::pbs::{self, ComplementStats, Options};
use crate::{emptiness, hoa};
use std::time::Instant;

fn value_error(e: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// Python-visible automaton. Constructed from HOA text.
#[pyclass]
pub struct RustAutomaton {
    pub(crate) inner: Automaton,
}

#[pymethods]
impl RustAutomaton {
    #[new]
    #[pyo3(signature = (text))]
    fn new(text: &str) -> PyResult<Self> {
        let inner = hoa::parse(text).map_err(value_error)?;
        Ok(RustAutomaton { inner })
    }

    fn num_states(&self) -> u32 {
        self.inner.num_states()
    }

    fn num_edges(&self) -> usize {
        self.inner.num_edges()
    }

    fn is_empty(&self) -> bool {
        emptiness::is_empty(&self.inner)
    }

    /// Membership of the word `prefix · cycle^ω`, letters given as
    /// valuation bitmasks.
    fn accepts(&self, prefix: Vec<u32>, cycle: Vec<u32>) -> PyResult<bool> {
        let word = Lasso::new(
            prefix.into_iter().map(Minterm).collect(),
            cycle.into_iter().map(Minterm).collect(),
        )
        .ok_or_else(|| PyValueError::new_err("cycle must be non-empty"))?;
        Ok(lasso::accepts(&self.inner, &word))
    }

    fn to_hoa(&self) -> String {
        hoa::to_hoa(&self.inner)
    }
}

/// Python-visible profiling stats.
#[pyclass]
pub struct RustComplementStats {
    #[pyo3(get)]
    pub total_ms: f64,
    #[pyo3(get)]
    pub init_ms: f64,
    #[pyo3(get)]
    pub explore_ms: f64,
    #[pyo3(get)]
    pub finish_ms: f64,
    #[pyo3(get)]
    pub trim_ms: f64,
    #[pyo3(get)]
    pub input_states: u32,
    #[pyo3(get)]
    pub states: u32,
    #[pyo3(get)]
    pub edges_emitted: u64,
    #[pyo3(get)]
    pub edges_merged: usize,
    #[pyo3(get)]
    pub accepting_edges: u64,
    #[pyo3(get)]
    pub invalid_minterms: u64,
    #[pyo3(get)]
    pub max_powerset_size: usize,
    #[pyo3(get)]
    pub max_slices: usize,
    #[pyo3(get)]
    pub successor_hits: u64,
    #[pyo3(get)]
    pub successor_misses: u64,
    #[pyo3(get)]
    pub slice_hits: u64,
    #[pyo3(get)]
    pub slice_misses: u64,
    #[pyo3(get)]
    pub hopeful_queries: u64,
    #[pyo3(get)]
    pub hopeful_graphs: u64,
}

impl RustComplementStats {
    fn from_stats(s: &ComplementStats, trim_ms: f64) -> Self {
        RustComplementStats {
            total_ms: s.total_ms,
            init_ms: s.init_ms,
            explore_ms: s.explore_ms,
            finish_ms: s.finish_ms,
            trim_ms,
            input_states: s.input_states,
            states: s.states,
            edges_emitted: s.edges_emitted,
            edges_merged: s.edges_merged,
            accepting_edges: s.accepting_edges,
            invalid_minterms: s.invalid_minterms,
            max_powerset_size: s.max_powerset_size,
            max_slices: s.max_slices,
            successor_hits: s.successor_hits,
            successor_misses: s.successor_misses,
            slice_hits: s.slice_hits,
            slice_misses: s.slice_misses,
            hopeful_queries: s.hopeful_queries,
            hopeful_graphs: s.hopeful_graphs,
        }
    }
}

#[pymethods]
impl RustComplementStats {
    fn __repr__(&self) -> String {
        format!(
            "ComplementStats(\n\
             \x20 total={:.1}ms, init={:.1}ms, explore={:.1}ms, finish={:.1}ms, trim={:.1}ms\n\
             \x20 input_states={}, states={}, edges={} ({} emitted, {} accepting)\n\
             \x20 invalid_minterms={}, powerset: max={}, slices: max={}\n\
             \x20 successors: {} hits, {} misses ({:.1}% hit rate)\n\
             \x20 slices: {} hits, {} misses\n\
             \x20 hopeful: {} queries, {} graphs\n\
             )",
            self.total_ms, self.init_ms, self.explore_ms, self.finish_ms, self.trim_ms,
            self.input_states, self.states, self.edges_merged, self.edges_emitted, self.accepting_edges,
            self.invalid_minterms, self.max_powerset_size, self.max_slices,
            self.successor_hits, self.successor_misses,
            if self.successor_hits + self.successor_misses > 0 {
                self.successor_hits as f64 / (self.successor_hits + self.successor_misses) as f64 * 100.0
            } else {
                0.0
            },
            self.slice_hits, self.slice_misses,
            self.hopeful_queries, self.hopeful_graphs,
        )
    }
}

/// Python-visible complementation result.
#[pyclass]
pub struct ComplementResult {
    #[pyo3(get)]
    automaton: Py<RustAutomaton>,
    #[pyo3(get)]
    stats: Py<RustComplementStats>,
}

#[pymethods]
impl ComplementResult {
    fn to_hoa(&self, py: Python<'_>) -> String {
        hoa::to_hoa(&self.automaton.borrow(py).inner)
    }
}

/// Complement the Büchi automaton given as HOA text.
#[pyfunction]
#[pyo3(signature = (text, use_scc=true, use_hopeful=true, restrict_retirement=true, trim=false, max_states=None))]
pub fn complement_hoa(
    py: Python<'_>,
    text: &str,
    use_scc: bool,
    use_hopeful: bool,
    restrict_retirement: bool,
    trim: bool,
    max_states: Option<usize>,
) -> PyResult<ComplementResult> {
    let input = hoa::parse(text).map_err(value_error)?;
    let opts = Options { use_scc, use_hopeful, restrict_retirement, max_states };
    let result = pbs::complement(&input, &opts).map_err(value_error)?;

    let mut trim_ms = 0.0f64;
    let automaton = if trim {
        let t = Instant::now();
        let trimmed = result.automaton.purge_useless();
        trim_ms = t.elapsed().as_secs_f64() * 1000.0;
        trimmed
    } else {
        result.automaton
    };

    Ok(ComplementResult {
        automaton: Py::new(py, RustAutomaton { inner: automaton })?,
        stats: Py::new(py, RustComplementStats::from_stats(&result.stats, trim_ms))?,
    })
}
