use std::collections::HashSet;

use tpg_logic::{
    circuit::{CellType, Circuit, CircuitBuilder, Port},
    config::Config,
    generator::{
        circuit_logic::{
            DefaultLogicEncoder, InputLogicEncoder, OutputLogicEncoder, SequentialConnectionEncoder,
            SequentialInputLogicEncoder, SequentialOutputLogicEncoder,
        },
        constraint::{PatternExclusionConstraintEncoder, PortConstraint, PortConstraintEncoder, PortSelection},
        dchain::{BackwardDChainEncoder, DChainBaseEncoder, DChainCircuitTagger, ForwardDChainConnectionEncoder},
        extract::{extract_test_pattern, InputCapture},
        fault::{
            FaultPropagationConstraintEncoder, StuckAt, StuckAtFaultCircuitTagger, StuckAtFaultEncoder, StuckAtKind,
            TaggingMode,
        },
        tag::{BadTag, ContainerTag, GoodTag, PinData, PinDataGB},
        tagger::WholeCircuitTagger,
        GeneratorContext, GeneratorModule, LogicGenerator,
    },
    solver::{bmc::ClauseKind, BackendKind, SolverResult},
    structures::{
        container::{Container01, Container01X, LogicContainer},
        literal::Variable,
        logic::Logic,
    },
};

/// Registers the logic of every kind of node, for the copy of `T`.
fn emplace_logic<P: PinData, T: ContainerTag<P>>(generator: &mut LogicGenerator<P>) {
    generator.emplace_module(Box::new(InputLogicEncoder::<T>::default())).unwrap();
    generator.emplace_module(Box::new(SequentialInputLogicEncoder::<T>::default())).unwrap();
    generator.emplace_module(Box::new(DefaultLogicEncoder::<T>::default())).unwrap();
    generator.emplace_module(Box::new(SequentialOutputLogicEncoder::<T>::default())).unwrap();
    generator.emplace_module(Box::new(OutputLogicEncoder::<T>::default())).unwrap();
    generator.emplace_module(Box::new(SequentialConnectionEncoder::<T>::default())).unwrap();
}

mod shift_register {
    use super::*;

    type Data = PinDataGB<Container01, Container01>;

    const STATES: [usize; 3] = [1, 2, 3];

    // a -> d0 ; q0 -> d1 ; q1 -> d2 ; q2 -> out
    fn circuit() -> Circuit {
        let mut builder = CircuitBuilder::default();
        let a = builder.add_node("a", CellType::PIn, &[]).unwrap();
        let q0 = builder.add_node("q0", CellType::SIn, &[]).unwrap();
        let q1 = builder.add_node("q1", CellType::SIn, &[]).unwrap();
        let q2 = builder.add_node("q2", CellType::SIn, &[]).unwrap();
        let d0 = builder.add_node("d0", CellType::SOut, &[Some(a), None, None, None]).unwrap();
        let d1 = builder.add_node("d1", CellType::SOut, &[Some(q0), None, None, None]).unwrap();
        let d2 = builder.add_node("d2", CellType::SOut, &[Some(q1), None, None, None]).unwrap();
        builder.add_node("out", CellType::POut, &[Some(q2)]).unwrap();
        builder.pair_secondary(q0, d0).unwrap();
        builder.pair_secondary(q1, d1).unwrap();
        builder.pair_secondary(q2, d2).unwrap();
        builder.build().unwrap()
    }

    fn generator(kind: BackendKind) -> LogicGenerator<Data> {
        let context = GeneratorContext::new(circuit(), kind, &Config::default());
        let mut generator = LogicGenerator::new(context);
        generator.set_number_of_timeframes(3).unwrap();
        generator.emplace_module(Box::new(WholeCircuitTagger::<GoodTag>::default())).unwrap();
        generator.emplace_module(Box::new(WholeCircuitTagger::<BadTag>::default())).unwrap();
        emplace_logic::<Data, GoodTag>(&mut generator);
        emplace_logic::<Data, BadTag>(&mut generator);
        generator.generate_circuit_logic().unwrap();
        generator
    }

    #[test]
    fn transition_clauses_link_latches() {
        let generator = generator(BackendKind::Bmc);
        let context = generator.context();

        let mut latches: HashSet<Variable> = HashSet::default();
        for state in STATES {
            let good = context.internal_container::<GoodTag>(0, state).unwrap();
            let bad = context.internal_container::<BadTag>(0, state).unwrap();
            latches.insert(good.l0().variable());
            latches.insert(bad.l0().variable());
        }
        assert_eq!(latches.len(), 6);

        let bmc = context.encoder().backend().as_bmc().unwrap();
        let linking: Vec<_> = bmc
            .clauses(ClauseKind::Transition)
            .iter()
            .filter(|clause| clause.iter().any(|(_, timeframe)| *timeframe == 1))
            .collect();
        assert_eq!(linking.len(), 12);

        let next: HashSet<Variable> = linking
            .iter()
            .flat_map(|clause| clause.iter())
            .filter(|(_, timeframe)| *timeframe == 1)
            .map(|(literal, _)| literal.variable())
            .collect();
        assert_eq!(next, latches);

        for latch in &latches {
            let uses = linking
                .iter()
                .filter(|clause| clause.iter().any(|(literal, timeframe)| *timeframe == 1 && literal.variable() == *latch))
                .count();
            assert_eq!(uses, 2, "latch {latch}");
        }
    }

    #[test]
    fn unrolled_shift() {
        // The output on the last timeframe is the first state of the first element.
        let mut generator = generator(BackendKind::Sat);
        let context = generator.context_mut();
        let first = context.require_container::<GoodTag>(0, STATES[0], Port::output()).unwrap();
        let last = context.require_container::<GoodTag>(2, 7, Port::output()).unwrap();
        context.encoder_mut().encode_value(&first, Logic::Zero);
        context.encoder_mut().encode_value(&last, Logic::One);
        assert_eq!(context.solve(), Ok(SolverResult::Unsatisfiable));
    }

    #[test]
    fn bad_copy_shares_the_initial_state() {
        let mut generator = generator(BackendKind::Sat);
        let context = generator.context_mut();
        let good = context.require_container::<GoodTag>(0, STATES[1], Port::output()).unwrap();
        let bad = context.require_container::<BadTag>(0, STATES[1], Port::output()).unwrap();
        assert_eq!(good, bad);
    }
}

mod bmc {
    use super::*;

    type Data = PinDataGB<Container01X, Container01X>;

    fn generator(fault: StuckAt) -> LogicGenerator<Data> {
        generator_with(fault, Vec::default())
    }

    // a -> d ; q -> out, with q and d a pair
    fn generator_with(fault: StuckAt, constraints: Vec<Box<dyn GeneratorModule<Data>>>) -> LogicGenerator<Data> {
        let mut builder = CircuitBuilder::default();
        let a = builder.add_node("a", CellType::PIn, &[]).unwrap();
        let q = builder.add_node("q", CellType::SIn, &[]).unwrap();
        let d = builder.add_node("d", CellType::SOut, &[Some(a), None, None, None]).unwrap();
        builder.add_node("out", CellType::POut, &[Some(q)]).unwrap();
        builder.pair_secondary(q, d).unwrap();

        let context = GeneratorContext::new(builder.build().unwrap(), BackendKind::Bmc, &Config::default());
        let mut generator = LogicGenerator::new(context);
        generator.set_number_of_timeframes(3).unwrap();
        generator
            .emplace_module(Box::new(StuckAtFaultCircuitTagger::new(vec![fault], TaggingMode::Functional)))
            .unwrap();
        generator.emplace_module(Box::new(DChainCircuitTagger)).unwrap();
        emplace_logic::<Data, GoodTag>(&mut generator);
        emplace_logic::<Data, BadTag>(&mut generator);
        generator.emplace_module(Box::new(StuckAtFaultEncoder::new(vec![fault]))).unwrap();
        generator.emplace_module(Box::new(DChainBaseEncoder)).unwrap();
        generator.emplace_module(Box::new(BackwardDChainEncoder)).unwrap();
        generator.emplace_module(Box::new(ForwardDChainConnectionEncoder)).unwrap();
        generator.emplace_module(Box::new(FaultPropagationConstraintEncoder::default())).unwrap();
        for module in constraints {
            generator.emplace_module(module).unwrap();
        }
        generator.generate_circuit_logic().unwrap();
        generator
    }

    fn solved_depth(context: &mut GeneratorContext<Data>) -> usize {
        assert_eq!(context.solve(), Ok(SolverResult::Satisfiable));
        context.encoder().backend().as_bmc().unwrap().last_depth()
    }

    #[test]
    fn fault_observed_after_a_step() {
        let mut generator = generator(StuckAt::new(0, Port::output(), StuckAtKind::One));
        let context = generator.context_mut();
        assert_eq!(context.solve(), Ok(SolverResult::Satisfiable));
        assert_eq!(context.encoder().backend().as_bmc().unwrap().last_depth(), 1);

        let pattern = extract_test_pattern::<_, GoodTag>(context, InputCapture::PrimaryInputsOnly).unwrap();
        assert_eq!(pattern.timeframes(), 2);
        assert_eq!(pattern.primary_inputs(0), &[Logic::Zero]);
    }

    #[test]
    fn functional_cone_crosses_the_pair() {
        let generator = generator(StuckAt::new(0, Port::output(), StuckAtKind::Zero));
        let bad: Vec<usize> = generator
            .context()
            .timeframe(0)
            .unwrap()
            .tagged_nodes(tpg_logic::generator::tag::Tag::Bad)
            .collect();
        assert_eq!(bad, vec![0, 1, 2, 3]);
    }

    #[test]
    fn excluded_patterns_force_a_longer_run() {
        let fault = StuckAt::new(0, Port::output(), StuckAtKind::One);
        let exclusion = |patterns: &Vec<_>| -> Vec<Box<dyn GeneratorModule<Data>>> {
            vec![Box::new(PatternExclusionConstraintEncoder::<GoodTag>::new(patterns.clone()))]
        };

        let mut excluded = Vec::default();
        for _ in 0..2 {
            let mut generator = generator_with(fault, exclusion(&excluded));
            let context = generator.context_mut();
            assert_eq!(solved_depth(context), 1);
            let pattern = extract_test_pattern::<_, GoodTag>(context, InputCapture::PrimaryInputsOnly).unwrap();
            assert_eq!(pattern.primary_inputs(0), &[Logic::Zero]);
            assert!(!excluded.contains(&pattern));
            excluded.push(pattern);
        }

        // Every run of two steps observing the fault is excluded.
        let mut generator = generator_with(fault, exclusion(&excluded));
        let context = generator.context_mut();
        assert_eq!(solved_depth(context), 2);
        let pattern = extract_test_pattern::<_, GoodTag>(context, InputCapture::PrimaryInputsOnly).unwrap();
        assert_eq!(pattern.primary_inputs(1), &[Logic::Zero]);
        assert!(!excluded.contains(&pattern));
    }

    #[test]
    fn initial_input_constraint_delays_the_observation() {
        let fault = StuckAt::new(0, Port::output(), StuckAtKind::One);
        let module = PortConstraintEncoder::<GoodTag>::primary(PortSelection::Inputs, PortConstraint::initial(&[Logic::One]));
        let mut generator = generator_with(fault, vec![Box::new(module)]);
        let context = generator.context_mut();
        assert_eq!(solved_depth(context), 2);

        let pattern = extract_test_pattern::<_, GoodTag>(context, InputCapture::PrimaryInputsOnly).unwrap();
        assert_eq!(pattern.primary_inputs(0), &[Logic::One]);
        assert_eq!(pattern.primary_inputs(1), &[Logic::Zero]);
    }
}
