/*!
Chronological backjumping.

On conflict, levels are removed from the top of the valuation until a [decision](crate::solver::sat::LevelKind::Decision) level is found.
The decision is then flipped, and kept as a [flipped](crate::solver::sat::LevelKind::Flipped) level, as both values of the decision now lead to a conflict under the levels below it.

If no decision level is found the conflict follows from the formula and the assumptions alone.
*/

use crate::{
    misc::log::targets::{self},
    solver::sat::{LevelKind, SatSolver},
};

impl SatSolver {
    /// Removes every assignment from trail index `start` on.
    fn unassign_from(&mut self, start: usize) {
        for literal in self.trail.drain(start..) {
            self.assignment[literal.variable() as usize] = None;
        }
        self.queue_head = start;
    }

    /// Backjumps to and flips the most recent decision, returning false if there is no decision.
    pub(super) fn backjump(&mut self) -> bool {
        while let Some(level) = self.levels.pop() {
            match level.kind {
                LevelKind::Decision => {
                    let decision = self.trail[level.start];
                    self.unassign_from(level.start);
                    log::trace!(target: targets::SOLVER, "Backjump flips {decision}");
                    self.push_level(LevelKind::Flipped, -decision);
                    return true;
                }

                LevelKind::Flipped => self.unassign_from(level.start),

                LevelKind::Assumption => {
                    self.unassign_from(level.start);
                    return false;
                }
            }
        }
        false
    }
}
