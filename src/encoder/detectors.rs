/*!
Detectors, and constraints between containers.

A detector returns a `01` container which is true exactly when some condition on its inputs holds:
- [value_detector](LogicEncoder::value_detector), for a container having a value.
- [constraint_detector](LogicEncoder::constraint_detector), for a container satisfying a [LogicConstraint].
- [equivalence_detector](LogicEncoder::equivalence_detector), for two containers having the same value.
- [difference_01_detector](LogicEncoder::difference_01_detector), for two containers having distinct values, each zero or one.

The difference detector is the core of the difference chain: a don't-care or unknown value never differs, as nothing guarantees the values observed will differ.
*/

use crate::{
    encoder::LogicEncoder,
    structures::{
        container::{Container01, LogicContainer},
        logic::{Logic, LogicConstraint},
    },
};

fn truth(value: bool) -> Logic {
    Logic::from_bool(value)
}

fn differ(a: Logic, b: Logic) -> bool {
    a.is_known() && b.is_known() && a != b
}

impl LogicEncoder {
    pub fn value_detector<C: LogicContainer>(&mut self, container: &C, value: Logic) -> Container01 {
        self.detector(&[*container], move |values| values[0] == value)
    }

    pub fn value_detector_into<C: LogicContainer>(
        &mut self,
        container: &C,
        value: Logic,
        output: &Container01,
    ) {
        self.encode_function_into(&[*container], output, move |values| truth(values[0] == value));
    }

    pub fn constraint_detector<C: LogicContainer>(
        &mut self,
        container: &C,
        constraint: LogicConstraint,
    ) -> Container01 {
        self.detector(&[*container], move |values| constraint.allows(values[0]))
    }

    pub fn constraint_detector_into<C: LogicContainer>(
        &mut self,
        container: &C,
        constraint: LogicConstraint,
        output: &Container01,
    ) {
        self.encode_function_into(&[*container], output, move |values| {
            truth(constraint.allows(values[0]))
        });
    }

    pub fn equivalence_detector<C: LogicContainer>(&mut self, a: &C, b: &C) -> Container01 {
        if a == b {
            return self.new_constant(Logic::One);
        }
        self.detector(&[*a, *b], |values| values[0] == values[1])
    }

    pub fn equivalence_detector_into<C: LogicContainer>(&mut self, a: &C, b: &C, output: &Container01) {
        self.encode_function_into(&[*a, *b], output, |values| truth(values[0] == values[1]));
    }

    pub fn difference_01_detector<C: LogicContainer>(&mut self, a: &C, b: &C) -> Container01 {
        if a == b {
            return self.new_constant(Logic::Zero);
        }
        self.detector(&[*a, *b], |values| differ(values[0], values[1]))
    }

    pub fn difference_01_detector_into<C: LogicContainer>(
        &mut self,
        a: &C,
        b: &C,
        output: &Container01,
    ) {
        self.encode_function_into(&[*a, *b], output, |values| {
            truth(differ(values[0], values[1]))
        });
    }

    /// A `01` container true exactly when `condition` holds of the inputs, folding constant inputs.
    fn detector<C: LogicContainer, F>(&mut self, inputs: &[C], condition: F) -> Container01
    where
        F: Fn(&[Logic]) -> bool,
    {
        let constants: Option<Vec<Logic>> = inputs
            .iter()
            .map(|input| self.constant_value(input))
            .collect();
        if let Some(values) = constants {
            return self.new_constant(truth(condition(&values)));
        }

        let output = self.new_container::<Container01>();
        self.encode_function_into(inputs, &output, |values| truth(condition(values)));
        output
    }

    /// Constrains `a` and `b` to the same value.
    pub fn encode_equivalence<C: LogicContainer>(&mut self, a: &C, b: &C) {
        if a == b {
            return;
        }
        for (x, y) in a.active_literals().into_iter().zip(b.active_literals()) {
            self.commit_clause(&[-x, y]);
            self.commit_clause(&[x, -y]);
        }
    }

    /// Constrains `a` and `b` to distinct values, each zero or one.
    pub fn encode_01_difference<C: LogicContainer>(&mut self, a: &C, b: &C) {
        let difference = self.difference_01_detector(a, b);
        self.encode_value(&difference, Logic::One);
    }
}

#[cfg(test)]
mod detector_tests {
    use super::*;
    use crate::{
        config::Config,
        solver::{BackendKind, SolverResult},
        structures::container::{Container01X, ContainerU01X},
    };

    fn encoder() -> LogicEncoder {
        LogicEncoder::from_config(BackendKind::Sat, &Config::default())
    }

    #[test]
    fn dont_care_never_differs() {
        let mut encoder = encoder();
        let a: Container01X = encoder.new_container();
        let b: Container01X = encoder.new_container();
        encoder.encode_value(&a, Logic::DontCare);
        encoder.encode_01_difference(&a, &b);
        assert_eq!(encoder.solve(), SolverResult::Unsatisfiable);
    }

    #[test]
    fn difference_forces_known_values() {
        let mut encoder = encoder();
        let a: ContainerU01X = encoder.new_container();
        let b: ContainerU01X = encoder.new_container();
        encoder.encode_value(&a, Logic::Zero);
        encoder.encode_01_difference(&a, &b);
        assert_eq!(encoder.solve(), SolverResult::Satisfiable);
        assert_eq!(encoder.solved_value(&b), Logic::One);
    }

    #[test]
    fn value_detector() {
        let mut encoder = encoder();
        let a: ContainerU01X = encoder.new_container();
        let unknown = encoder.value_detector(&a, Logic::Unknown);
        encoder.encode_value(&unknown, Logic::One);
        assert_eq!(encoder.solve(), SolverResult::Satisfiable);
        assert_eq!(encoder.solved_value(&a), Logic::Unknown);
    }

    #[test]
    fn equivalence() {
        let mut encoder = encoder();
        let a: Container01X = encoder.new_container();
        let b: Container01X = encoder.new_container();
        let same = encoder.equivalence_detector(&a, &b);
        encoder.encode_equivalence(&a, &b);
        encoder.encode_value(&same, Logic::Zero);
        assert_eq!(encoder.solve(), SolverResult::Unsatisfiable);
    }
}
