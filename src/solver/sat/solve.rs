/*!
The solve procedure of the reference solver.

# Overview

```text
          +-------------------+
          | units, assumptions|
          +-------------------+
                    |
                    v
 +----------> propagate ---- conflict ---> backjump ---- no decision ---> Unsatisfiable
 |                  |                         |
 |             no conflict                    |
 |                  |                         |
 |                  v                         |
 +-------- decide on a variable <-------------+
                    |
            nothing to decide
                    |
                    v
              Satisfiable
```

Before each decision the time and conflict limits are checked, and a solve which exceeds either ends as [Unknown](SolverResult::Unknown).
*/

use crate::{
    misc::log::targets::{self},
    solver::{
        sat::{LevelKind, SatSolver},
        SolverResult,
    },
    structures::literal::Literal,
};

impl SatSolver {
    /// Clears the valuation from any previous solve.
    fn clear_valuation(&mut self) {
        self.assignment.iter_mut().for_each(|value| *value = None);
        self.trail.clear();
        self.levels.clear();
        self.queue_head = 0;
        self.conflicts = 0;
    }

    pub(super) fn search(&mut self, assumptions: &[Literal]) -> SolverResult {
        self.clear_valuation();

        if self.empty_clause {
            return SolverResult::Unsatisfiable;
        }

        let start = std::time::Instant::now();

        for index in 0..self.units.len() {
            let unit = self.units[index];
            match self.value_of(unit) {
                Some(true) => {}
                Some(false) => return SolverResult::Unsatisfiable,
                None => self.assign(unit),
            }
        }
        if self.bcp().is_err() {
            return SolverResult::Unsatisfiable;
        }

        for assumption in assumptions {
            if !assumption.is_set() || assumption.variable() as usize >= self.assignment.len() {
                log::warn!(target: targets::SOLVER, "Assumption of unknown literal {assumption} ignored");
                continue;
            }
            match self.value_of(*assumption) {
                Some(true) => {}
                Some(false) => return SolverResult::Unsatisfiable,
                None => {
                    self.push_level(LevelKind::Assumption, *assumption);
                    if self.bcp().is_err() {
                        return SolverResult::Unsatisfiable;
                    }
                }
            }
        }

        loop {
            if let Some(limit) = self.time_limit {
                if start.elapsed() > limit {
                    log::info!(target: targets::SOLVER, "Time limit reached");
                    return SolverResult::Unknown;
                }
            }
            if let Some(limit) = self.conflict_limit {
                if self.conflicts > limit {
                    log::info!(target: targets::SOLVER, "Conflict limit reached");
                    return SolverResult::Unknown;
                }
            }

            match self.make_decision() {
                None => {
                    log::trace!(target: targets::SOLVER, "Satisfiable after {} conflicts", self.conflicts);
                    return SolverResult::Satisfiable;
                }
                Some(decision) => self.push_level(LevelKind::Decision, decision),
            }

            while self.bcp().is_err() {
                self.conflicts += 1;
                if !self.backjump() {
                    log::trace!(target: targets::SOLVER, "Unsatisfiable after {} conflicts", self.conflicts);
                    return SolverResult::Unsatisfiable;
                }
            }
        }
    }
}
