//! Error types used in the library.
//!
//! - Configuration errors, such as an unconnected pin or an unsupported cell, abort the current attempt and name the offending node, tag, and timeframe.
//! - Precondition errors, such as reading an unset container, are programming errors in the use of the library.
//! - Outcomes of a solve (satisfiable, unsatisfiable, unknown) are never errors. See [SolverResult](crate::solver::SolverResult).
//!
//! Names of the error enums mostly overlap with the structures they relate to.
//  As such, throughout the library err::{self} is often used to prefix use of the types with `err::`.

use crate::{
    circuit::{CellType, PortType},
    generator::{tag::Tag, AttemptState, Phase},
};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Circuit(CircuitError),
    Configuration(ConfigurationError),
    Precondition(PreconditionError),
    Solver(SolverError),
    State(StateError),
}

/// Errors noted when building a circuit.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CircuitError {
    /// A node reads from a node which has not (yet) been added.
    /// As nodes are added in topological order, this also covers cycles.
    DanglingReference { node: usize, input: usize },

    /// A node was given more or fewer inputs than its cell type requires.
    InputCount {
        node: usize,
        cell: CellType,
        count: usize,
    },

    /// Two nodes share a name.
    DuplicateName(String),

    /// A secondary input or output is missing its partner, or is paired twice.
    Pairing { node: usize },
}

impl From<CircuitError> for ErrorKind {
    fn from(e: CircuitError) -> Self {
        ErrorKind::Circuit(e)
    }
}

/// Errors in the configuration of an attempt.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConfigurationError {
    /// A required input pin of a node has no driver.
    UnconnectedPin {
        node: usize,
        port: usize,
        tag: Tag,
        timeframe: usize,
    },

    /// No encoding is known for the cell type of a node.
    UnsupportedCell {
        node: usize,
        cell: CellType,
        tag: Tag,
        timeframe: usize,
    },

    /// A model (sequential, set/reset, fault) is not supported for the node.
    UnsupportedModel { node: usize, model: &'static str },

    /// A module was registered with a phase earlier than a previously registered module.
    ModuleOrder {
        module: &'static str,
        phase: Phase,
        previous: Phase,
    },

    /// A secondary input or output has no partner.
    MissingSecondaryPair { node: usize },

    /// A secondary input reads the value stored by its pair on the previous timeframe, and no value was stored.
    MissingNextState {
        node: usize,
        tag: Tag,
        timeframe: usize,
    },

    /// A fault refers to a pin the node does not have.
    InvalidFaultLocation {
        node: usize,
        port_type: PortType,
        port: usize,
    },
}

impl From<ConfigurationError> for ErrorKind {
    fn from(e: ConfigurationError) -> Self {
        ErrorKind::Configuration(e)
    }
}

/// Violations of the preconditions of some operation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PreconditionError {
    /// A container was read before anything was written to it.
    UnsetContainer {
        node: usize,
        tag: Tag,
        timeframe: usize,
    },

    /// An operation requiring timeframes was called before any were allocated.
    NoTimeframes,

    /// A timeframe index beyond the allocated timeframes.
    TimeframeOutOfRange { timeframe: usize, count: usize },

    /// A node index beyond the circuit.
    NodeOutOfRange { node: usize },

    /// Values were read from an attempt which is not satisfiable.
    UnsolvedAttempt { state: AttemptState },
}

impl From<PreconditionError> for ErrorKind {
    fn from(e: PreconditionError) -> Self {
        ErrorKind::Precondition(e)
    }
}

/// Errors from a solver back end.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SolverError {
    /// A literal was used before being allocated by the solver.
    UnknownVariable(u32),

    /// A timeframe clause refers to a timeframe other than 0 or 1, or to a non-latch in timeframe 1.
    InvalidTimeframeClause { variable: u32, timeframe: usize },

    /// The operation is only available on a bounded model checking back end.
    NotBmc,
}

impl From<SolverError> for ErrorKind {
    fn from(e: SolverError) -> Self {
        ErrorKind::Solver(e)
    }
}

/// Errors in the state of an attempt.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StateError {
    /// A transition not permitted by the state machine of an attempt.
    InvalidTransition { from: AttemptState, to: AttemptState },
}

impl From<StateError> for ErrorKind {
    fn from(e: StateError) -> Self {
        ErrorKind::State(e)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Circuit(e) => write!(f, "circuit error: {e:?}"),
            Self::Solver(e) => write!(f, "solver error: {e:?}"),
            Self::State(e) => write!(f, "state error: {e:?}"),

            Self::Configuration(ConfigurationError::UnconnectedPin {
                node,
                port,
                tag,
                timeframe,
            }) => write!(
                f,
                "input {port} of node {node} is unconnected (tag {tag}, timeframe {timeframe})"
            ),
            Self::Configuration(ConfigurationError::UnsupportedCell {
                node,
                cell,
                tag,
                timeframe,
            }) => write!(
                f,
                "node {node} has unsupported cell {cell:?} (tag {tag}, timeframe {timeframe})"
            ),
            Self::Configuration(ConfigurationError::MissingNextState { node, tag, timeframe }) => write!(
                f,
                "no value is stored for secondary input {node} (tag {tag}, timeframe {timeframe})"
            ),
            Self::Configuration(e) => write!(f, "configuration error: {e:?}"),

            Self::Precondition(PreconditionError::UnsetContainer {
                node,
                tag,
                timeframe,
            }) => write!(
                f,
                "container of node {node} is unset (tag {tag}, timeframe {timeframe})"
            ),
            Self::Precondition(e) => write!(f, "precondition error: {e:?}"),
        }
    }
}

impl std::error::Error for ErrorKind {}
