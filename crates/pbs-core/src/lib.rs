pub mod error;
pub mod guard;
pub mod automaton;
pub mod scc;
pub mod emptiness;
pub mod lasso;
pub mod hoa;
pub mod powerset;
pub mod successors;
pub mod hopeful;
pub mod slices;
pub mod pbs;
#[cfg(feature = "python")]
pub mod py;

pub use automaton::{Acceptance, Automaton, Edge, State};
pub use error::{ComplementError, HoaError};
pub use guard::{Alphabet, Guard, Minterm};
pub use pbs::{complement, ComplementResult, ComplementStats, Options};

#[cfg(feature = "python")]
use pyo3::prelude::*;

#[cfg(feature = "python")]
#[pymodule]
fn pbs_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<py::RustAutomaton>()?;
    m.add_class::<py::RustComplementStats>()?;
    m.add_class::<py::ComplementResult>()?;
    m.add_function(wrap_pyfunction!(py::complement_hoa, m)?)?;
    Ok(())
}
