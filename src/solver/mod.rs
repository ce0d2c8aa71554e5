/*!
Solver back ends, through which an encoding is solved.

An encoding never inspects a solver beyond the [SolverProxy] trait:
- Literals are allocated by the solver, with [new_literal](SolverProxy::new_literal).
- Clauses are handed to the solver, with [commit_clause](SolverProxy::commit_clause).
- After a satisfiable [solve](SolverProxy::solve), the value of a literal is read with [literal_value](SolverProxy::literal_value).

Each proxy reserves variable `1` as the constant true variable, on [reset](SolverProxy::reset).
So, the constant literals of [literal](crate::structures::literal) are valid for every solver.

Two back ends are distinguished, as a [Backend]:
- A satisfiability solver, which solves a single formula covering every timeframe.
  The library provides a [reference solver](sat::SatSolver), though any [SolverProxy] may be used.
- A [bounded model checker](bmc::BmcSolverProxy), which receives a transition system over a single timeframe, and searches for a reachable target by unrolling the system.

The choice is made once, when a [generator context](crate::generator::GeneratorContext) is built, and modules which encode different constraints for the two back ends branch on the [kind](BackendKind) of the back end.
*/

pub mod bmc;
pub mod sat;

use crate::{config::Config, structures::literal::Literal, types::err::SolverError};

/// The result of a solve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SolverResult {
    Satisfiable,
    Unsatisfiable,

    /// No result was reached, e.g. due to a time limit.
    /// Never to be read as unsatisfiable.
    Unknown,
}

impl std::fmt::Display for SolverResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Satisfiable => write!(f, "Satisfiable"),
            Self::Unsatisfiable => write!(f, "Unsatisfiable"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// The value of a literal after a solve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Value {
    Positive,
    Negative,

    /// The literal may take either value.
    DontCare,

    /// There is no value, e.g. as the last solve was not satisfiable.
    Invalid,
}

/// The capabilities of a solver used by an encoding.
pub trait SolverProxy {
    /// Removes all variables and clauses, and reserves the constant true variable.
    fn reset(&mut self);

    /// A literal of a fresh variable.
    fn new_literal(&mut self) -> Literal;

    /// Adds the disjunction of `clause` to the formula.
    fn commit_clause(&mut self, clause: &[Literal]) -> Result<(), SolverError>;

    fn solve(&mut self) -> SolverResult {
        self.solve_with(&[])
    }

    /// Solves, with each literal of `assumptions` assumed for this solve only.
    fn solve_with(&mut self, assumptions: &[Literal]) -> SolverResult;

    /// The value of `literal` from the last solve.
    fn literal_value(&self, literal: Literal) -> Value;

    /// The time limit of each solve, if any.
    fn set_timeout(&mut self, timeout: Option<std::time::Duration>);

    fn variable_count(&self) -> usize;

    fn clause_count(&self) -> usize;
}

/// The kinds of back end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BackendKind {
    Sat,
    Bmc,
}

/// A solver back end, owned by an [encoder](crate::encoder::LogicEncoder).
pub enum Backend {
    Sat(Box<dyn SolverProxy>),
    Bmc(bmc::BmcSolverProxy),
}

impl Backend {
    /// A back end of the given kind using the [reference solver](sat::SatSolver).
    pub fn from_config(kind: BackendKind, config: &Config) -> Self {
        match kind {
            BackendKind::Sat => Backend::Sat(Box::new(sat::SatSolver::from_config(config))),
            BackendKind::Bmc => Backend::Bmc(bmc::BmcSolverProxy::from_config(config)),
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Sat(_) => BackendKind::Sat,
            Backend::Bmc(_) => BackendKind::Bmc,
        }
    }

    pub fn proxy(&self) -> &dyn SolverProxy {
        match self {
            Backend::Sat(solver) => solver.as_ref(),
            Backend::Bmc(solver) => solver,
        }
    }

    pub fn proxy_mut(&mut self) -> &mut dyn SolverProxy {
        match self {
            Backend::Sat(solver) => solver.as_mut(),
            Backend::Bmc(solver) => solver,
        }
    }

    pub fn as_bmc(&self) -> Option<&bmc::BmcSolverProxy> {
        match self {
            Backend::Bmc(solver) => Some(solver),
            Backend::Sat(_) => None,
        }
    }

    pub fn as_bmc_mut(&mut self) -> Option<&mut bmc::BmcSolverProxy> {
        match self {
            Backend::Bmc(solver) => Some(solver),
            Backend::Sat(_) => None,
        }
    }
}
