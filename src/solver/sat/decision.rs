/*!
Decisions on the value of some variable.

The variable decided on is the lowest unassigned variable.
As encodings allocate variables roughly from inputs to outputs, this tends to decide on inputs before the gates they drive.

The polarity of a decision is drawn from the [rng](crate::generic::minimal_pcg::MinimalPCG32) of the solver, leaning towards true by the configured polarity lean.
With the default lean of zero, every decision is false.
*/

use rand::Rng;

use crate::{
    solver::sat::{Level, LevelKind, SatSolver},
    structures::literal::{Literal, Variable},
};

impl SatSolver {
    /// The literal of a decision, if some variable is unassigned.
    pub(super) fn make_decision(&mut self) -> Option<Literal> {
        let variable = self
            .assignment
            .iter()
            .skip(1)
            .position(|value| value.is_none())?
            + 1;

        let polarity = self.rng.random_bool(self.polarity_lean);
        Some(Literal::new(variable as Variable, !polarity))
    }

    /// Opens a level of the given kind, and assigns `literal` at the level.
    pub(super) fn push_level(&mut self, kind: LevelKind, literal: Literal) {
        self.levels.push(Level {
            kind,
            start: self.trail.len(),
        });
        self.assign(literal);
    }
}
