/*!
A reference satisfiability solver.

The solver is a plain DPLL procedure, and is intended to exercise encodings rather than to compete with industrial solvers:
- [Propagation](crate::solver::sat::bcp) over two watched literals per clause.
- [Decisions](crate::solver::sat::decision) on the lowest unassigned variable, with a polarity drawn from a seeded [MinimalPCG32].
- [Chronological backjumping](crate::solver::sat::backjump) on conflict, flipping the most recent decision.
- [Solves](crate::solver::sat::solve) under assumptions, with optional time and conflict limits.

Clauses of length one are kept apart as units, and an empty clause is noted by a flag.
Each solve starts from an empty valuation, so clauses may be added between solves.

# Example

```rust
# use tpg_logic::solver::{sat::SatSolver, SolverProxy, SolverResult, Value};
let mut solver = SatSolver::default();
let p = solver.new_literal();
let q = solver.new_literal();

solver.commit_clause(&[p, q]).unwrap();
solver.commit_clause(&[-p]).unwrap();

assert_eq!(solver.solve(), SolverResult::Satisfiable);
assert_eq!(solver.literal_value(q), Value::Positive);
assert_eq!(solver.solve_with(&[-q]), SolverResult::Unsatisfiable);
```
*/

pub mod backjump;
pub mod bcp;
pub mod decision;
pub mod solve;

use rand_core::SeedableRng;

use crate::{
    config::{Config, PolarityLean},
    generic::minimal_pcg::MinimalPCG32,
    misc::log::targets::{self},
    solver::{SolverProxy, SolverResult, Value},
    structures::literal::{Literal, Variable, POSITIVE},
    types::err::SolverError,
};

/// Index to a (long) clause of the solver.
pub type ClauseKey = usize;

/// How a level of the valuation was entered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelKind {
    /// A free choice, which may be flipped on conflict.
    Decision,

    /// A decision which has been flipped, and so may not be flipped again.
    Flipped,

    /// An assumption of the current solve.
    Assumption,
}

/// A level of the valuation, from the literal at `start` on the trail.
#[derive(Clone, Copy, Debug)]
pub struct Level {
    pub kind: LevelKind,
    pub start: usize,
}

/// The reference solver.
pub struct SatSolver {
    /// The value of each variable, indexed by variable.
    assignment: Vec<Option<bool>>,

    /// Clauses of length at least two, with the watched literals at index 0 and 1.
    clauses: Vec<Vec<Literal>>,

    /// Clauses of length one.
    units: Vec<Literal>,

    /// Whether the empty clause has been added.
    empty_clause: bool,

    /// For each literal (by id), the keys of clauses watching the literal.
    watches: Vec<Vec<ClauseKey>>,

    /// Literals assigned, in order of assignment.
    trail: Vec<Literal>,

    /// Index on the trail of the next literal to propagate.
    queue_head: usize,

    levels: Vec<Level>,

    /// The result of the last solve.
    status: Option<SolverResult>,

    conflicts: usize,

    polarity_lean: PolarityLean,
    time_limit: Option<std::time::Duration>,
    conflict_limit: Option<usize>,
    rng: MinimalPCG32,
}

impl Default for SatSolver {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl SatSolver {
    pub fn from_config(config: &Config) -> Self {
        let mut solver = SatSolver {
            assignment: Vec::default(),
            clauses: Vec::default(),
            units: Vec::default(),
            empty_clause: false,
            watches: Vec::default(),
            trail: Vec::default(),
            queue_head: 0,
            levels: Vec::default(),
            status: None,
            conflicts: 0,
            polarity_lean: config.polarity_lean(),
            time_limit: config.time_limit(),
            conflict_limit: config.conflict_limit(),
            rng: MinimalPCG32::seed_from_u64(config.random_seed.value),
        };
        solver.reset();
        solver
    }

    /// The value of `literal` on the current valuation.
    pub fn value_of(&self, literal: Literal) -> Option<bool> {
        literal_value_in(&self.assignment, literal)
    }

    /// The number of conflicts during the last solve.
    pub fn conflicts(&self) -> usize {
        self.conflicts
    }

    pub fn set_conflict_limit(&mut self, limit: Option<usize>) {
        self.conflict_limit = limit;
    }

    fn check_literal(&self, literal: Literal) -> Result<(), SolverError> {
        match literal.is_set() && (literal.variable() as usize) < self.assignment.len() {
            true => Ok(()),
            false => Err(SolverError::UnknownVariable(literal.variable())),
        }
    }

    /// Adds a clause of length at least two, watching the first two literals.
    fn store_clause(&mut self, clause: Vec<Literal>) {
        let key = self.clauses.len();
        self.watches[clause[0].id() as usize].push(key);
        self.watches[clause[1].id() as usize].push(key);
        self.clauses.push(clause);
    }
}

/// The value of `literal` on `assignment`, without borrowing the whole solver.
pub(super) fn literal_value_in(assignment: &[Option<bool>], literal: Literal) -> Option<bool> {
    assignment[literal.variable() as usize].map(|value| value != literal.is_negated())
}

impl SolverProxy for SatSolver {
    fn reset(&mut self) {
        self.assignment = vec![None; 2];
        self.clauses.clear();
        self.units.clear();
        self.empty_clause = false;
        self.watches = vec![Vec::default(); 4];
        self.trail.clear();
        self.queue_head = 0;
        self.levels.clear();
        self.status = None;
        self.conflicts = 0;

        self.units.push(POSITIVE);
    }

    fn new_literal(&mut self) -> Literal {
        let variable = self.assignment.len() as Variable;
        self.assignment.push(None);
        self.watches.push(Vec::default());
        self.watches.push(Vec::default());
        Literal::new(variable, false)
    }

    fn commit_clause(&mut self, clause: &[Literal]) -> Result<(), SolverError> {
        for literal in clause {
            self.check_literal(*literal)?;
        }

        let mut clause = clause.to_vec();
        clause.sort_unstable();
        clause.dedup();

        // The literals of a variable are adjacent once sorted.
        if clause
            .windows(2)
            .any(|pair| pair[0].variable() == pair[1].variable())
        {
            log::trace!(target: targets::SOLVER, "Tautology skipped: {clause:?}");
            return Ok(());
        }

        match clause.len() {
            0 => {
                log::trace!(target: targets::SOLVER, "Empty clause added");
                self.empty_clause = true;
            }
            1 => self.units.push(clause[0]),
            _ => self.store_clause(clause),
        }
        Ok(())
    }

    fn solve_with(&mut self, assumptions: &[Literal]) -> SolverResult {
        let result = self.search(assumptions);
        self.status = Some(result);
        result
    }

    fn literal_value(&self, literal: Literal) -> Value {
        if self.status != Some(SolverResult::Satisfiable) || self.check_literal(literal).is_err() {
            return Value::Invalid;
        }
        match self.value_of(literal) {
            Some(true) => Value::Positive,
            Some(false) => Value::Negative,
            None => Value::DontCare,
        }
    }

    fn set_timeout(&mut self, timeout: Option<std::time::Duration>) {
        self.time_limit = timeout;
    }

    fn variable_count(&self) -> usize {
        self.assignment.len() - 1
    }

    fn clause_count(&self) -> usize {
        self.clauses.len() + self.units.len() + self.empty_clause as usize
    }
}
