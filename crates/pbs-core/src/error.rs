use thiserror::Error;

/// Errors raised by the complementation entry points.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ComplementError {
    #[error("input automaton must use a single Büchi condition, found `{acceptance}`")]
    NotBuchi { acceptance: String },

    #[error("input automaton uses {count} atomic propositions, at most {max} are supported")]
    TooManyPropositions { count: usize, max: usize },

    #[error("exploration exceeded the budget of {limit} states")]
    StateBudgetExceeded { limit: usize },
}

/// Errors raised while reading HOA text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HoaError {
    #[error("line {line}: expected {expected}, found {found}")]
    UnexpectedToken {
        line: usize,
        expected: String,
        found: String,
    },

    #[error("line {line}: unterminated string")]
    UnterminatedString { line: usize },

    #[error("missing `{header}` header")]
    MissingHeader { header: &'static str },

    #[error("line {line}: {feature} is not supported")]
    Unsupported { line: usize, feature: String },

    #[error("line {line}: state {state} is out of range (automaton has {num_states} states)")]
    StateOutOfRange {
        line: usize,
        state: u32,
        num_states: u32,
    },

    #[error("line {line}: proposition {ap} is out of range (automaton has {num_aps} propositions)")]
    PropositionOutOfRange { line: usize, ap: u32, num_aps: usize },
}

pub type HoaResult<T> = Result<T, HoaError>;
