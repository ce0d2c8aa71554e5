/*!
Boolean constraint propagation, over two watched literals.

# Overview
Each clause of length at least two watches the literals at index 0 and 1.
So long as neither watched literal is false, the clause can neither be unit nor conflict with the valuation.

When a literal is assigned, clauses watching the negation of the literal are examined:
- If the other watch is true, the clause is satisfied and nothing is to be done.
- Else, if some unwatched literal is not false it replaces the falsified watch.
- Else, the clause is unit on the other watch, which is assigned, or every literal is false and the clause conflicts with the valuation.

Propagation continues from the [queue head](SatSolver) until every assigned literal has been examined, or a conflict is found.

# Complications
The watch list of the falsified literal is taken from the solver while examined, and restored after.
No clause moves a watch to the falsified literal, as the literal has a value, so the restored list misses no clause.
*/

use crate::{
    misc::log::targets::{self},
    solver::sat::{literal_value_in, ClauseKey, SatSolver},
    structures::literal::Literal,
};

impl SatSolver {
    /// Assigns `literal` true, and queues the literal for propagation.
    pub(super) fn assign(&mut self, literal: Literal) {
        self.assignment[literal.variable() as usize] = Some(!literal.is_negated());
        self.trail.push(literal);
    }

    /// Propagates every queued literal, returning the key of a conflicting clause, if any.
    pub(super) fn bcp(&mut self) -> Result<(), ClauseKey> {
        while self.queue_head < self.trail.len() {
            let falsified = -self.trail[self.queue_head];
            self.queue_head += 1;

            let mut watchers = std::mem::take(&mut self.watches[falsified.id() as usize]);
            let mut conflict = None;
            let mut index = 0;

            'watch_loop: while index < watchers.len() {
                let key = watchers[index];

                let clause = &mut self.clauses[key];
                if clause[0] == falsified {
                    clause.swap(0, 1);
                }
                let other = clause[0];
                let other_value = literal_value_in(&self.assignment, other);

                if other_value == Some(true) {
                    index += 1;
                    continue 'watch_loop;
                }

                for position in 2..clause.len() {
                    if literal_value_in(&self.assignment, clause[position]) != Some(false) {
                        clause.swap(1, position);
                        let watch = clause[1];
                        self.watches[watch.id() as usize].push(key);
                        watchers.swap_remove(index);
                        continue 'watch_loop;
                    }
                }

                match other_value {
                    None => {
                        log::trace!(target: targets::SOLVER, "Clause {key} unit on {other}");
                        self.assign(other);
                        index += 1;
                    }

                    Some(_) => {
                        conflict = Some(key);
                        break 'watch_loop;
                    }
                }
            }

            self.watches[falsified.id() as usize] = watchers;

            if let Some(key) = conflict {
                log::trace!(target: targets::SOLVER, "Conflict on clause {key}");
                return Err(key);
            }
        }
        Ok(())
    }
}
