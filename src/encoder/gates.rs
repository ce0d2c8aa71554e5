/*!
Gates, as operations on containers.

Each gate returns a container for its output, and folds constants where possible:
- A forcing input decides the output, e.g. a zero input of an and gate.
- Identity inputs are dropped, e.g. a one input of an and gate, and a one input of an xor gate negates the other input.
- Equal inputs of an and (or) gate give the input.
- In the `01` domain, complementary inputs decide the output.

Constant don't-care or unknown inputs are not folded against symbolic inputs, as the value of the output then depends on the value of the symbolic input.

Gates with more than two inputs are split into a balanced tree of two input gates.
This is exact, as the extension of and, or, and xor to don't-care and unknown values is associative.

Negated gates (nand, nor, xnor) are the negation of the output container, and require no further clauses.
*/

use crate::{
    encoder::LogicEncoder,
    structures::{
        container::{Container01, Domain, LogicContainer},
        literal::Literal,
        logic::Logic,
    },
};

/// The kinds of associative gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateKind {
    And,
    Or,
    Xor,
}

impl GateKind {
    fn evaluate(&self, values: &[Logic]) -> Logic {
        match self {
            GateKind::And => Logic::and(values.iter().copied()),
            GateKind::Or => Logic::or(values.iter().copied()),
            GateKind::Xor => Logic::xor(values.iter().copied()),
        }
    }

    /// The output of the gate with no inputs.
    fn identity(&self) -> Logic {
        match self {
            GateKind::And => Logic::One,
            GateKind::Or | GateKind::Xor => Logic::Zero,
        }
    }
}

impl LogicEncoder {
    pub fn encode_buffer<C: LogicContainer>(&mut self, input: &C) -> C {
        *input
    }

    pub fn encode_inverter<C: LogicContainer>(&mut self, input: &C) -> C {
        input.negate()
    }

    /// Constrains `output` to equal `input`.
    pub fn encode_buffer_into<C: LogicContainer>(&mut self, input: &C, output: &C) {
        self.encode_equivalence(input, output);
    }

    /// Constrains `output` to equal the negation of `input`.
    pub fn encode_inverter_into<C: LogicContainer>(&mut self, input: &C, output: &C) {
        self.encode_equivalence(&input.negate(), output);
    }

    fn encode_gate<C: LogicContainer>(&mut self, kind: GateKind, inputs: &[C]) -> C {
        match inputs.len() {
            0 => self.new_constant(kind.identity()),
            1 => self.encode_buffer(&inputs[0]),
            2 => self.encode_gate2(kind, &inputs[0], &inputs[1]),
            length => {
                let (left, right) = inputs.split_at(length / 2);
                let left = self.encode_gate(kind, left);
                let right = self.encode_gate(kind, right);
                self.encode_gate2(kind, &left, &right)
            }
        }
    }

    fn encode_gate2<C: LogicContainer>(&mut self, kind: GateKind, a: &C, b: &C) -> C {
        if kind == GateKind::Or {
            let and = self.encode_gate2(GateKind::And, &a.negate(), &b.negate());
            return and.negate();
        }

        let binary = C::DOMAIN == Domain::L01;
        match (kind, self.constant_value(a), self.constant_value(b)) {
            (_, Some(x), Some(y)) => return self.new_constant(kind.evaluate(&[x, y])),

            (GateKind::And, Some(Logic::Zero), _) | (GateKind::And, _, Some(Logic::Zero)) => {
                return self.new_constant(Logic::Zero)
            }
            (GateKind::And, Some(Logic::One), _) => return *b,
            (GateKind::And, _, Some(Logic::One)) => return *a,

            (GateKind::Xor, Some(Logic::Zero), _) => return *b,
            (GateKind::Xor, _, Some(Logic::Zero)) => return *a,
            (GateKind::Xor, Some(Logic::One), _) => return b.negate(),
            (GateKind::Xor, _, Some(Logic::One)) => return a.negate(),

            _ => {}
        }

        match kind {
            GateKind::And if a == b => return *a,
            GateKind::And if binary && *a == b.negate() => return self.new_constant(Logic::Zero),
            GateKind::Xor if binary && a == b => return self.new_constant(Logic::Zero),
            GateKind::Xor if binary && *a == b.negate() => return self.new_constant(Logic::One),
            _ => {}
        }

        let output = self.new_container::<C>();
        match binary {
            true => self.tseitin(kind, a.l0(), b.l0(), output.l0()),
            false => self.encode_function_into(&[*a, *b], &output, |values| kind.evaluate(values)),
        }
        output
    }

    /// The Tseitin clauses of a two input gate in the `01` domain.
    fn tseitin(&mut self, kind: GateKind, a: Literal, b: Literal, o: Literal) {
        match kind {
            GateKind::And => {
                self.commit_clause(&[-o, a]);
                self.commit_clause(&[-o, b]);
                self.commit_clause(&[o, -a, -b]);
            }
            GateKind::Or => self.tseitin(GateKind::And, -a, -b, -o),
            GateKind::Xor => {
                self.commit_clause(&[-a, -b, -o]);
                self.commit_clause(&[a, b, -o]);
                self.commit_clause(&[a, -b, o]);
                self.commit_clause(&[-a, b, o]);
            }
        }
    }

    pub fn encode_and<C: LogicContainer>(&mut self, inputs: &[C]) -> C {
        self.encode_gate(GateKind::And, inputs)
    }

    pub fn encode_or<C: LogicContainer>(&mut self, inputs: &[C]) -> C {
        self.encode_gate(GateKind::Or, inputs)
    }

    pub fn encode_xor<C: LogicContainer>(&mut self, inputs: &[C]) -> C {
        self.encode_gate(GateKind::Xor, inputs)
    }

    pub fn encode_nand<C: LogicContainer>(&mut self, inputs: &[C]) -> C {
        self.encode_and(inputs).negate()
    }

    pub fn encode_nor<C: LogicContainer>(&mut self, inputs: &[C]) -> C {
        self.encode_or(inputs).negate()
    }

    pub fn encode_xnor<C: LogicContainer>(&mut self, inputs: &[C]) -> C {
        self.encode_xor(inputs).negate()
    }

    pub fn encode_and2<C: LogicContainer>(&mut self, a: &C, b: &C) -> C {
        self.encode_gate2(GateKind::And, a, b)
    }

    pub fn encode_or2<C: LogicContainer>(&mut self, a: &C, b: &C) -> C {
        self.encode_gate2(GateKind::Or, a, b)
    }

    pub fn encode_xor2<C: LogicContainer>(&mut self, a: &C, b: &C) -> C {
        self.encode_gate2(GateKind::Xor, a, b)
    }

    /// A tristate buffer, passing `input` when `enable` is one and floating when `enable` is zero.
    ///
    /// A don't-care enable floats, and an unknown enable gives unknown.
    pub fn encode_tristate_buffer<C: LogicContainer>(&mut self, input: &C, enable: &C) -> C {
        let floating = C::DOMAIN.floating();
        match self.constant_value(enable) {
            Some(Logic::One) => return *input,
            Some(Logic::Zero) | Some(Logic::DontCare) => return self.new_constant(floating),
            Some(Logic::Unknown) => return self.new_constant(Logic::Unknown),
            None => {}
        }
        self.encode_function(&[*input, *enable], move |values| match values[1] {
            Logic::One => values[0],
            Logic::Zero | Logic::DontCare => floating,
            Logic::Unknown => Logic::Unknown,
        })
    }

    /// A tristate inverter, as a tristate buffer of the negated input.
    pub fn encode_tristate_inverter<C: LogicContainer>(&mut self, input: &C, enable: &C) -> C {
        self.encode_tristate_buffer(&input.negate(), enable)
    }

    /// A multiplexer, selecting `input0` when `select` is zero and `input1` when `select` is one.
    pub fn encode_multiplexer<C: LogicContainer>(&mut self, input0: &C, input1: &C, select: &C) -> C {
        match self.constant_value(select) {
            Some(Logic::Zero) => return *input0,
            Some(Logic::One) => return *input1,
            Some(value) => return self.new_constant(value),
            None => {}
        }
        if input0 == input1 && C::DOMAIN == Domain::L01 {
            return *input0;
        }
        self.encode_function(&[*input0, *input1, *select], |values| match values[2] {
            Logic::Zero => values[0],
            Logic::One => values[1],
            other => other,
        })
    }

    /// An asynchronous set, forcing one when `set` is one.
    pub fn encode_set_control<C: LogicContainer>(&mut self, input: &C, set: &C) -> C {
        self.encode_control(input, set, Logic::One)
    }

    /// An asynchronous reset, forcing zero when `reset` is one.
    pub fn encode_reset_control<C: LogicContainer>(&mut self, input: &C, reset: &C) -> C {
        self.encode_control(input, reset, Logic::Zero)
    }

    fn encode_control<C: LogicContainer>(&mut self, input: &C, control: &C, forced: Logic) -> C {
        match self.constant_value(control) {
            Some(Logic::Zero) => return *input,
            Some(Logic::One) => return self.new_constant(forced),
            Some(value) => return self.new_constant(value),
            None => {}
        }
        self.encode_function(&[*input, *control], move |values| match values[1] {
            Logic::Zero => values[0],
            Logic::One => forced,
            other => other,
        })
    }

    /// Constrains `antecedent` to imply `consequent`.
    pub fn encode_implication(&mut self, antecedent: &Container01, consequent: &Container01) {
        self.commit_clause(&[-antecedent.l0, consequent.l0]);
    }
}
