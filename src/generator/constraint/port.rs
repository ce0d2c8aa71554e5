use std::marker::PhantomData;

use crate::{
    circuit::{Circuit, Port},
    generator::{
        constraint::{step_indicators, ConstraintTarget},
        tag::{ContainerTag, PinData},
        GeneratorContext, GeneratorModule, Phase,
    },
    misc::log::targets::{self},
    solver::BackendKind,
    structures::{
        container::LogicContainer,
        logic::{Logic, LogicConstraint},
    },
    types::err::ErrorKind,
};

/// The nodes whose ports are constrained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PortKind {
    /// Primary inputs and outputs.
    Primary,
    /// Secondary inputs and outputs, the two sides of sequential elements.
    Secondary,
}

/// Which ports are constrained.
///
/// Ports are numbered in the order of the circuit, with inputs before outputs when both are selected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PortSelection {
    Inputs,
    Outputs,
    InputsAndOutputs,
}

/// The constraint on each port.
///
/// A port without a constraint, such as a port past the end of a list, is free.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PortConstraint {
    /// The same constraint on every port and timeframe.
    Constant(LogicConstraint),

    /// A constraint for each port, on every timeframe.
    PerPort(Vec<LogicConstraint>),

    /// A row of constraints for each of the first timeframes, and `otherwise` on every port of later timeframes.
    PerTimeframe {
        constraints: Vec<Vec<LogicConstraint>>,
        otherwise: LogicConstraint,
    },
}

impl PortConstraint {
    /// Each port held to the value at its index on every timeframe, with don't-care values left free.
    pub fn from_values(values: &[Logic]) -> Self {
        Self::PerPort(values.iter().map(|value| pinned(*value)).collect())
    }

    /// One row of values per timeframe, with every port free after the last row.
    pub fn from_sequence(values: &[Vec<Logic>]) -> Self {
        Self::PerTimeframe {
            constraints: values
                .iter()
                .map(|row| row.iter().map(|value| pinned(*value)).collect())
                .collect(),
            otherwise: LogicConstraint::NoConstraint,
        }
    }

    /// Each port held to the value at its index on the first timeframe only.
    pub fn initial(values: &[Logic]) -> Self {
        Self::from_sequence(&[values.to_vec()])
    }

    /// The constraint on `port` in `timeframe`.
    pub fn constraint(&self, timeframe: usize, port: usize) -> LogicConstraint {
        let row = match self {
            Self::Constant(constraint) => return *constraint,
            Self::PerPort(constraints) => constraints,
            Self::PerTimeframe { constraints, otherwise } => match constraints.get(timeframe) {
                Some(row) => row,
                None => return *otherwise,
            },
        };
        row.get(port).copied().unwrap_or(LogicConstraint::NoConstraint)
    }

    /// The number of timeframes with a constraint of their own, if constraints differ between timeframes.
    fn rows(&self) -> Option<usize> {
        match self {
            Self::PerTimeframe { constraints, .. } if !constraints.is_empty() => Some(constraints.len()),
            _ => None,
        }
    }
}

fn pinned(value: Logic) -> LogicConstraint {
    match value {
        Logic::DontCare => LogicConstraint::NoConstraint,
        value => LogicConstraint::only(value),
    }
}

/// Constrains the values at the ports of a circuit, in the copy of `T`.
///
/// The container of a port is the output of its node, read through overrides as given by the [target](ConstraintTarget).
pub struct PortConstraintEncoder<T> {
    kind: PortKind,
    selection: PortSelection,
    constraint: PortConstraint,
    target: ConstraintTarget,
    tag: PhantomData<T>,
}

impl<T> PortConstraintEncoder<T> {
    pub fn new(kind: PortKind, selection: PortSelection, constraint: PortConstraint) -> Self {
        PortConstraintEncoder {
            kind,
            selection,
            constraint,
            target: ConstraintTarget::default(),
            tag: PhantomData,
        }
    }

    pub fn primary(selection: PortSelection, constraint: PortConstraint) -> Self {
        Self::new(PortKind::Primary, selection, constraint)
    }

    pub fn secondary(selection: PortSelection, constraint: PortConstraint) -> Self {
        Self::new(PortKind::Secondary, selection, constraint)
    }

    pub fn with_target(mut self, target: ConstraintTarget) -> Self {
        self.target = target;
        self
    }

    /// The constrained nodes, in port order.
    fn nodes(&self, circuit: &Circuit) -> Vec<usize> {
        let (inputs, outputs) = match self.kind {
            PortKind::Primary => (circuit.primary_inputs(), circuit.primary_outputs()),
            PortKind::Secondary => (circuit.secondary_inputs(), circuit.secondary_outputs()),
        };
        match self.selection {
            PortSelection::Inputs => inputs.to_vec(),
            PortSelection::Outputs => outputs.to_vec(),
            PortSelection::InputsAndOutputs => inputs.iter().chain(outputs).copied().collect(),
        }
    }

    fn container<P: PinData>(
        &self,
        context: &mut GeneratorContext<P>,
        timeframe: usize,
        node: usize,
    ) -> Result<Option<T::Container>, ErrorKind>
    where
        T: ContainerTag<P>,
    {
        let container = context.get_container::<T>(timeframe, node, Port::output(), self.target.allow_override())?;
        if !container.is_set() {
            log::trace!(target: targets::CONSTRAINT, "No {} container for port node {node} in timeframe {timeframe}", T::TAG);
            return Ok(None);
        }
        Ok(Some(container))
    }

    /// Guards the constraint of each step by its step indicator.
    fn constrain_steps<P: PinData>(
        &self,
        context: &mut GeneratorContext<P>,
        nodes: &[usize],
        rows: usize,
    ) -> Result<(), ErrorKind>
    where
        T: ContainerTag<P>,
    {
        let indicators = step_indicators(context, rows);
        let later = {
            let encoder = context.encoder_mut();
            encoder.encode_or(&indicators).negate()
        };

        for (port, node) in nodes.iter().enumerate() {
            let Some(container) = self.container(context, 0, *node)? else {
                continue;
            };
            let encoder = context.encoder_mut();
            for (step, indicator) in indicators.iter().enumerate() {
                let constraint = self.constraint.constraint(step, port);
                if constraint != LogicConstraint::NoConstraint {
                    let detector = encoder.constraint_detector(&container, constraint);
                    encoder.encode_implication(indicator, &detector);
                }
            }
            let otherwise = self.constraint.constraint(rows, port);
            if otherwise != LogicConstraint::NoConstraint {
                let detector = encoder.constraint_detector(&container, otherwise);
                encoder.encode_implication(&later, &detector);
            }
        }
        Ok(())
    }
}

impl<P: PinData, T: ContainerTag<P>> GeneratorModule<P> for PortConstraintEncoder<T> {
    fn name(&self) -> &'static str {
        match self.kind {
            PortKind::Primary => "port-constraint-encoder",
            PortKind::Secondary => "sequential-constraint-encoder",
        }
    }

    fn phase(&self) -> Phase {
        Phase::Constraint
    }

    fn constrain_timeframe(&self, context: &mut GeneratorContext<P>, timeframe: usize) -> Result<(), ErrorKind> {
        let circuit = context.circuit_handle();
        let nodes = self.nodes(&circuit);

        if let (BackendKind::Bmc, Some(rows)) = (context.backend_kind(), self.constraint.rows()) {
            return self.constrain_steps(context, &nodes, rows);
        }

        for (port, node) in nodes.iter().enumerate() {
            let constraint = self.constraint.constraint(timeframe, port);
            if constraint == LogicConstraint::NoConstraint {
                continue;
            }
            if let Some(container) = self.container(context, timeframe, *node)? {
                log::trace!(target: targets::CONSTRAINT, "Port {port} (node {node}) constrained to {constraint} in timeframe {timeframe}");
                context.encoder_mut().encode_constraint(&container, constraint);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod port_tests {
    use super::*;
    use crate::{
        circuit::{CellType, CircuitBuilder},
        config::Config,
        generator::{
            circuit_logic::{
                DefaultLogicEncoder, InputLogicEncoder, OutputLogicEncoder, SequentialConnectionEncoder,
                SequentialInputLogicEncoder, SequentialOutputLogicEncoder,
            },
            extract::{extract_test_pattern, InputCapture},
            tag::{GoodTag, PinDataG},
            tagger::WholeCircuitTagger,
            LogicGenerator,
        },
        solver::SolverResult,
        structures::container::Container01X,
    };

    type Data = PinDataG<Container01X>;

    const A: usize = 0;
    const B: usize = 1;
    const OUT: usize = 3;

    // a, b -> and -> out
    fn and_gate(kind: BackendKind, timeframes: usize, modules: Vec<Box<dyn GeneratorModule<Data>>>) -> LogicGenerator<Data> {
        let mut builder = CircuitBuilder::default();
        let a = builder.add_node("a", CellType::PIn, &[]).unwrap();
        let b = builder.add_node("b", CellType::PIn, &[]).unwrap();
        let and = builder.add_node("and", CellType::And, &[Some(a), Some(b)]).unwrap();
        builder.add_node("out", CellType::POut, &[Some(and)]).unwrap();

        let context = GeneratorContext::new(builder.build().unwrap(), kind, &Config::default());
        let mut generator = LogicGenerator::new(context);
        generator.set_number_of_timeframes(timeframes).unwrap();
        generator.emplace_module(Box::new(WholeCircuitTagger::<GoodTag>::default())).unwrap();
        generator.emplace_module(Box::new(InputLogicEncoder::<GoodTag>::default())).unwrap();
        generator.emplace_module(Box::new(DefaultLogicEncoder::<GoodTag>::default())).unwrap();
        generator.emplace_module(Box::new(OutputLogicEncoder::<GoodTag>::default())).unwrap();
        for module in modules {
            generator.emplace_module(module).unwrap();
        }
        generator.generate_circuit_logic().unwrap();
        generator
    }

    fn solve_with(generator: &mut LogicGenerator<Data>, timeframe: usize, node: usize, value: Logic) -> SolverResult {
        let context = generator.context_mut();
        let container = context.require_container::<GoodTag>(timeframe, node, Port::output()).unwrap();
        context.encoder_mut().encode_value(&container, value);
        context.solve().unwrap()
    }

    #[test]
    fn constraint_lookup() {
        let sequence = PortConstraint::from_sequence(&[vec![Logic::One, Logic::DontCare], vec![Logic::Zero]]);
        assert_eq!(sequence.constraint(0, 0), LogicConstraint::OnlyOne);
        assert_eq!(sequence.constraint(0, 1), LogicConstraint::NoConstraint);
        assert_eq!(sequence.constraint(1, 0), LogicConstraint::OnlyZero);
        assert_eq!(sequence.constraint(1, 1), LogicConstraint::NoConstraint);
        assert_eq!(sequence.constraint(2, 0), LogicConstraint::NoConstraint);
        assert_eq!(sequence.rows(), Some(2));

        let constant = PortConstraint::Constant(LogicConstraint::NotOne);
        assert_eq!(constant.constraint(7, 3), LogicConstraint::NotOne);
        assert_eq!(constant.rows(), None);
    }

    #[test]
    fn pinned_input_blocks_the_output() {
        let module = PortConstraintEncoder::<GoodTag>::primary(
            PortSelection::Inputs,
            PortConstraint::from_values(&[Logic::Zero]),
        );
        let mut generator = and_gate(BackendKind::Sat, 2, vec![Box::new(module)]);
        assert_eq!(solve_with(&mut generator, 1, OUT, Logic::One), SolverResult::Unsatisfiable);

        let module = PortConstraintEncoder::<GoodTag>::primary(
            PortSelection::Inputs,
            PortConstraint::from_values(&[Logic::DontCare, Logic::Zero]),
        );
        let mut generator = and_gate(BackendKind::Sat, 1, vec![Box::new(module)]);
        assert_eq!(solve_with(&mut generator, 0, A, Logic::One), SolverResult::Satisfiable);
        let b = generator.context_mut().require_container::<GoodTag>(0, B, Port::output()).unwrap();
        assert_eq!(generator.context().encoder().solved_value(&b), Logic::Zero);
    }

    #[test]
    fn output_constraint_drives_the_inputs() {
        let module = PortConstraintEncoder::<GoodTag>::primary(
            PortSelection::Outputs,
            PortConstraint::Constant(LogicConstraint::OnlyOne),
        );
        let mut generator = and_gate(BackendKind::Sat, 1, vec![Box::new(module)]);
        assert_eq!(solve_with(&mut generator, 0, A, Logic::Zero), SolverResult::Unsatisfiable);

        let module = PortConstraintEncoder::<GoodTag>::primary(
            PortSelection::Outputs,
            PortConstraint::Constant(LogicConstraint::OnlyOne),
        );
        let mut generator = and_gate(BackendKind::Sat, 1, vec![Box::new(module)]);
        assert_eq!(generator.context_mut().solve(), Ok(SolverResult::Satisfiable));
        let pattern = extract_test_pattern::<_, GoodTag>(generator.context_mut(), InputCapture::PrimaryInputsOnly).unwrap();
        assert_eq!(pattern.primary_inputs(0), &[Logic::One, Logic::One]);
    }

    #[test]
    fn inputs_and_outputs_share_the_numbering() {
        // Ports 0 and 1 are the inputs, port 2 is the output.
        let module = PortConstraintEncoder::<GoodTag>::primary(
            PortSelection::InputsAndOutputs,
            PortConstraint::from_values(&[Logic::One, Logic::DontCare, Logic::Zero]),
        );
        let mut generator = and_gate(BackendKind::Sat, 1, vec![Box::new(module)]);
        assert_eq!(generator.context_mut().solve(), Ok(SolverResult::Satisfiable));
        let pattern = extract_test_pattern::<_, GoodTag>(generator.context_mut(), InputCapture::PrimaryInputsOnly).unwrap();
        assert_eq!(pattern.primary_inputs(0), &[Logic::One, Logic::Zero]);
    }

    #[test]
    fn sequence_differs_between_timeframes() {
        let module = PortConstraintEncoder::<GoodTag>::primary(
            PortSelection::Inputs,
            PortConstraint::from_sequence(&[vec![Logic::One, Logic::One], vec![Logic::Zero]]),
        );
        let mut generator = and_gate(BackendKind::Sat, 3, vec![Box::new(module)]);
        assert_eq!(solve_with(&mut generator, 2, OUT, Logic::One), SolverResult::Satisfiable);
        let pattern = extract_test_pattern::<_, GoodTag>(generator.context_mut(), InputCapture::PrimaryInputsOnly).unwrap();
        assert_eq!(pattern.primary_inputs(0), &[Logic::One, Logic::One]);
        assert_eq!(pattern.primary_inputs(1)[0], Logic::Zero);
        assert_eq!(pattern.primary_inputs(2), &[Logic::One, Logic::One]);
    }

    #[test]
    fn bmc_sequence_follows_the_steps() {
        // The output is one on the first step, zero on the second, and free after.
        let module = PortConstraintEncoder::<GoodTag>::primary(
            PortSelection::Outputs,
            PortConstraint::from_sequence(&[vec![Logic::One], vec![Logic::Zero]]),
        );
        let mut generator = and_gate(BackendKind::Bmc, 3, vec![Box::new(module)]);
        let context = generator.context_mut();
        let a = context.require_container::<GoodTag>(0, A, Port::output()).unwrap();
        let b = context.require_container::<GoodTag>(0, B, Port::output()).unwrap();
        let encoder = context.encoder_mut();
        let both = encoder.encode_and2(&a, &b);
        encoder.encode_target_state_value(&both, Logic::One);
        assert_eq!(context.solve(), Ok(SolverResult::Satisfiable));
        assert_eq!(context.encoder().backend().as_bmc().unwrap().last_depth(), 0);

        let pattern = extract_test_pattern::<_, GoodTag>(context, InputCapture::PrimaryInputsOnly).unwrap();
        assert_eq!(pattern.primary_inputs(0), &[Logic::One, Logic::One]);
    }

    #[test]
    fn bmc_step_after_the_sequence_is_free() {
        // Both inputs one is only allowed from the third step on.
        let module = PortConstraintEncoder::<GoodTag>::primary(
            PortSelection::Outputs,
            PortConstraint::from_sequence(&[vec![Logic::Zero], vec![Logic::Zero]]),
        );
        let mut generator = and_gate(BackendKind::Bmc, 3, vec![Box::new(module)]);
        let context = generator.context_mut();
        let out = context.require_container::<GoodTag>(0, OUT, Port::output()).unwrap();
        context.encoder_mut().encode_target_state_value(&out, Logic::One);
        assert_eq!(context.solve(), Ok(SolverResult::Satisfiable));
        assert_eq!(context.encoder().backend().as_bmc().unwrap().last_depth(), 2);
    }

    // a -> d ; q -> out, with q and d a pair
    fn sequential_generator(module: PortConstraintEncoder<GoodTag>) -> LogicGenerator<Data> {
        let mut builder = CircuitBuilder::default();
        let a = builder.add_node("a", CellType::PIn, &[]).unwrap();
        let q = builder.add_node("q", CellType::SIn, &[]).unwrap();
        let d = builder.add_node("d", CellType::SOut, &[Some(a), None, None, None]).unwrap();
        builder.add_node("out", CellType::POut, &[Some(q)]).unwrap();
        builder.pair_secondary(q, d).unwrap();

        let context = GeneratorContext::new(builder.build().unwrap(), BackendKind::Sat, &Config::default());
        let mut generator = LogicGenerator::new(context);
        generator.set_number_of_timeframes(2).unwrap();
        generator.emplace_module(Box::new(WholeCircuitTagger::<GoodTag>::default())).unwrap();
        generator.emplace_module(Box::new(InputLogicEncoder::<GoodTag>::default())).unwrap();
        generator.emplace_module(Box::new(SequentialInputLogicEncoder::<GoodTag>::default())).unwrap();
        generator.emplace_module(Box::new(DefaultLogicEncoder::<GoodTag>::default())).unwrap();
        generator.emplace_module(Box::new(SequentialOutputLogicEncoder::<GoodTag>::default())).unwrap();
        generator.emplace_module(Box::new(OutputLogicEncoder::<GoodTag>::default())).unwrap();
        generator.emplace_module(Box::new(SequentialConnectionEncoder::<GoodTag>::default())).unwrap();
        generator.emplace_module(Box::new(module)).unwrap();
        generator.generate_circuit_logic().unwrap();
        generator
    }

    #[test]
    fn initial_secondary_inputs() {
        const Q: usize = 1;
        let module = PortConstraintEncoder::<GoodTag>::secondary(
            PortSelection::Inputs,
            PortConstraint::initial(&[Logic::One]),
        );
        let mut generator = sequential_generator(module);
        assert_eq!(solve_with(&mut generator, 0, OUT, Logic::Zero), SolverResult::Unsatisfiable);

        let module = PortConstraintEncoder::<GoodTag>::secondary(
            PortSelection::Inputs,
            PortConstraint::initial(&[Logic::One]),
        );
        let mut generator = sequential_generator(module);
        assert_eq!(solve_with(&mut generator, 1, Q, Logic::Zero), SolverResult::Satisfiable);
        assert_eq!(generator.modules().last().map(|module| module.name()), Some("sequential-constraint-encoder"));
    }

    #[test]
    fn secondary_outputs_follow_the_primary_inputs() {
        let module = PortConstraintEncoder::<GoodTag>::secondary(
            PortSelection::Outputs,
            PortConstraint::from_values(&[Logic::Zero]),
        );
        let mut generator = sequential_generator(module);
        assert_eq!(solve_with(&mut generator, 1, A, Logic::One), SolverResult::Unsatisfiable);
    }
}
