/*!
A truth table generator for clauses.

Each gate or detector of the multi-valued domains is given as a function on [Logic] values.
The generator writes the function as clauses, by enumerating each combination of input values:

```text
for each combination (v₁, …, vₙ) of values of the input domains:
    premise ← the literal pattern of each vᵢ
    out ← f(v₁, …, vₙ), as represented in the output domain
    for each literal o of the output container:
        commit ¬premise ∨ o, or ¬premise ∨ ¬o, as the pattern of out requires
```

Combinations which cannot occur are skipped:
- Combinations requiring a constant literal to take the other value.
- Combinations requiring a single variable to take both values, as when a container is the input of a gate more than once.

Literals which are constant and agree with a combination are dropped from the premise.
*/

use crate::{
    encoder::LogicEncoder,
    structures::{
        container::{Domain, LogicContainer},
        literal::{Literal, NEGATIVE, POSITIVE},
        logic::Logic,
    },
};

/// A container with its domain, so containers of distinct domains may appear together in a table.
#[derive(Clone, Copy, Debug)]
pub struct Operand {
    pub domain: Domain,
    pub literals: [Literal; 2],
}

impl Operand {
    pub fn of<C: LogicContainer>(container: &C) -> Self {
        Operand {
            domain: C::DOMAIN,
            literals: container.literals(),
        }
    }

    fn active(&self) -> &[Literal] {
        &self.literals[..self.domain.width()]
    }

    /// The literals of the operand, each as required true for the operand to have `value`.
    fn pattern(&self, value: Logic) -> Option<Vec<Literal>> {
        let (l0, l1) = self.domain.encode(value)?;
        let bits = [l0, l1];
        Some(
            self.active()
                .iter()
                .enumerate()
                .map(|(index, literal)| literal.conditional(!bits[index]))
                .collect(),
        )
    }
}

/// Extends `premise` with `required`, or returns false if `required` conflicts with the premise.
fn extend_premise(premise: &mut Vec<Literal>, required: &[Literal]) -> bool {
    for literal in required {
        match *literal {
            POSITIVE => continue,
            NEGATIVE => return false,
            _ => {}
        }
        if premise.contains(&-*literal) {
            return false;
        }
        if !premise.contains(literal) {
            premise.push(*literal);
        }
    }
    true
}

impl LogicEncoder {
    /// Writes `output = function(inputs)` as clauses.
    pub fn encode_table<F>(&mut self, inputs: &[Operand], output: Operand, function: F)
    where
        F: Fn(&[Logic]) -> Logic,
    {
        let mut values = Vec::with_capacity(inputs.len());
        let mut premise = Vec::default();
        self.table_rows(inputs, &output, &function, &mut values, &mut premise);
    }

    fn table_rows<F>(
        &mut self,
        inputs: &[Operand],
        output: &Operand,
        function: &F,
        values: &mut Vec<Logic>,
        premise: &mut Vec<Literal>,
    ) where
        F: Fn(&[Logic]) -> Logic,
    {
        let Some(input) = inputs.get(values.len()) else {
            let value = output.domain.represent(function(values));
            let Some(pattern) = output.pattern(value) else {
                return;
            };
            for literal in pattern {
                let mut clause: Vec<Literal> = premise.iter().map(|p| -*p).collect();
                clause.push(literal);
                self.commit_clause(&clause);
            }
            return;
        };

        for value in input.domain.values() {
            let Some(required) = input.pattern(*value) else {
                continue;
            };
            let mark = premise.len();
            if extend_premise(premise, &required) {
                values.push(*value);
                self.table_rows(inputs, output, function, values, premise);
                values.pop();
            }
            premise.truncate(mark);
        }
    }

    /// A container for `function(inputs)`, folding to a constant when each input is constant.
    pub fn encode_function<C: LogicContainer, F>(&mut self, inputs: &[C], function: F) -> C
    where
        F: Fn(&[Logic]) -> Logic,
    {
        let constants: Option<Vec<Logic>> = inputs
            .iter()
            .map(|input| self.constant_value(input))
            .collect();
        if let Some(values) = constants {
            return self.new_constant(function(&values));
        }

        let output = self.new_container::<C>();
        self.encode_function_into(inputs, &output, function);
        output
    }

    /// Writes `output = function(inputs)` as clauses, for an existing output container.
    pub fn encode_function_into<C: LogicContainer, O: LogicContainer, F>(
        &mut self,
        inputs: &[C],
        output: &O,
        function: F,
    ) where
        F: Fn(&[Logic]) -> Logic,
    {
        let operands: Vec<Operand> = inputs.iter().map(Operand::of).collect();
        self.encode_table(&operands, Operand::of(output), function);
    }
}
