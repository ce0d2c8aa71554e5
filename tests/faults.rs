use std::sync::Arc;

use tpg_logic::{
    circuit::{CellType, Circuit, CircuitBuilder, Port},
    config::Config,
    generator::{
        circuit_logic::{DefaultLogicEncoder, InputLogicEncoder, OutputLogicEncoder},
        dchain::{BackwardDChainEncoder, DChainBaseEncoder, DChainCircuitTagger},
        extract::{extract_test_pattern, InputCapture, TestPattern},
        fault::{
            FaultPropagationConstraintEncoder, SensitizationMode, StuckAt, StuckAtFaultCircuitTagger,
            StuckAtFaultEncoder, StuckAtKind, StuckAtSensitizationConstraintEncoder, TaggingMode, TimeframeMode,
            TransitionDelay, TransitionDelayFaultCircuitTagger, TransitionDelayFaultEncoder, TransitionKind,
            TransitionSensitizationConstraintEncoder,
        },
        overrides::RecordKey,
        tag::{BadTag, DiffTag, GoodTag, PinDataGB, Tag},
        AttemptState, GeneratorContext, LogicGenerator,
    },
    solver::{BackendKind, SolverResult},
    structures::{container::Container01X, logic::Logic},
};

type Data = PinDataGB<Container01X, Container01X>;

/// Registers the logic of the good and bad copies, and the difference chain.
fn emplace_circuit_logic(generator: &mut LogicGenerator<Data>) {
    generator.emplace_module(Box::new(InputLogicEncoder::<GoodTag>::default())).unwrap();
    generator.emplace_module(Box::new(InputLogicEncoder::<BadTag>::default())).unwrap();
    generator.emplace_module(Box::new(DefaultLogicEncoder::<GoodTag>::default())).unwrap();
    generator.emplace_module(Box::new(DefaultLogicEncoder::<BadTag>::default())).unwrap();
    generator.emplace_module(Box::new(OutputLogicEncoder::<GoodTag>::default())).unwrap();
    generator.emplace_module(Box::new(OutputLogicEncoder::<BadTag>::default())).unwrap();
}

/// A generator for a single stuck-at fault, observed at the primary outputs.
fn stuck_at_generator(circuit: Arc<Circuit>, fault: StuckAt) -> LogicGenerator<Data> {
    let context = GeneratorContext::new(circuit, BackendKind::Sat, &Config::default());
    let mut generator = LogicGenerator::new(context);
    generator.set_number_of_timeframes(1).unwrap();
    generator
        .emplace_module(Box::new(StuckAtFaultCircuitTagger::new(vec![fault], TaggingMode::Scan)))
        .unwrap();
    generator.emplace_module(Box::new(DChainCircuitTagger)).unwrap();
    emplace_circuit_logic(&mut generator);
    generator.emplace_module(Box::new(StuckAtFaultEncoder::new(vec![fault]))).unwrap();
    generator.emplace_module(Box::new(DChainBaseEncoder)).unwrap();
    generator.emplace_module(Box::new(BackwardDChainEncoder)).unwrap();
    generator
        .emplace_module(Box::new(StuckAtSensitizationConstraintEncoder::new(
            vec![fault],
            SensitizationMode::All,
            TimeframeMode::Any,
            false,
        )))
        .unwrap();
    generator.emplace_module(Box::new(FaultPropagationConstraintEncoder::default())).unwrap();
    generator.generate_circuit_logic().unwrap();
    generator
}

// a, b -> and -> out
fn and_gate() -> Arc<Circuit> {
    let mut builder = CircuitBuilder::default();
    let a = builder.add_node("a", CellType::PIn, &[]).unwrap();
    let b = builder.add_node("b", CellType::PIn, &[]).unwrap();
    let and = builder.add_node("and", CellType::And, &[Some(a), Some(b)]).unwrap();
    builder.add_node("out", CellType::POut, &[Some(and)]).unwrap();
    Arc::new(builder.build().unwrap())
}

/// The ISCAS-85 c17 benchmark, of six nand gates.
fn c17() -> Arc<Circuit> {
    let mut builder = CircuitBuilder::default();
    let i1 = builder.add_node("1", CellType::PIn, &[]).unwrap();
    let i2 = builder.add_node("2", CellType::PIn, &[]).unwrap();
    let i3 = builder.add_node("3", CellType::PIn, &[]).unwrap();
    let i6 = builder.add_node("6", CellType::PIn, &[]).unwrap();
    let i7 = builder.add_node("7", CellType::PIn, &[]).unwrap();
    let g10 = builder.add_node("10", CellType::Nand, &[Some(i1), Some(i3)]).unwrap();
    let g11 = builder.add_node("11", CellType::Nand, &[Some(i3), Some(i6)]).unwrap();
    let g16 = builder.add_node("16", CellType::Nand, &[Some(i2), Some(g11)]).unwrap();
    let g19 = builder.add_node("19", CellType::Nand, &[Some(g11), Some(i7)]).unwrap();
    let g22 = builder.add_node("22", CellType::Nand, &[Some(g10), Some(g16)]).unwrap();
    let g23 = builder.add_node("23", CellType::Nand, &[Some(g16), Some(g19)]).unwrap();
    builder.add_node("o22", CellType::POut, &[Some(g22)]).unwrap();
    builder.add_node("o23", CellType::POut, &[Some(g23)]).unwrap();
    Arc::new(builder.build().unwrap())
}

mod stuck_at {
    use super::*;

    #[test]
    fn and_output_stuck_at_zero() {
        let fault = StuckAt::new(2, Port::output(), StuckAtKind::Zero);
        let mut generator = stuck_at_generator(and_gate(), fault);
        let context = generator.context_mut();

        let bad_output = context.require_container::<BadTag>(0, 3, Port::output()).unwrap();
        assert_eq!(context.encoder().constant_value(&bad_output), Some(Logic::Zero));

        assert_eq!(context.solve(), Ok(SolverResult::Satisfiable));
        let difference = context.require_container::<DiffTag>(0, 2, Port::output()).unwrap();
        assert_eq!(context.encoder().solved_value(&difference), Logic::One);

        let pattern = extract_test_pattern::<_, GoodTag>(context, InputCapture::PrimaryInputsOnly).unwrap();
        assert_eq!(pattern.primary_inputs(0), &[Logic::One, Logic::One]);
    }

    #[test]
    fn input_stuck_at_one() {
        // The fault is at the first input pin of the and gate, so the pin reads one while a is zero.
        let fault = StuckAt::new(2, Port::input(0), StuckAtKind::One);
        let mut generator = stuck_at_generator(and_gate(), fault);
        let context = generator.context_mut();
        assert_eq!(context.solve(), Ok(SolverResult::Satisfiable));

        let pattern = extract_test_pattern::<_, GoodTag>(context, InputCapture::PrimaryInputsOnly).unwrap();
        assert_eq!(pattern.primary_inputs(0), &[Logic::Zero, Logic::One]);
    }

    #[test]
    fn unobservable_fault() {
        // A fault whose output cone has no output leaves nothing to observe.
        let mut builder = CircuitBuilder::default();
        let a = builder.add_node("a", CellType::PIn, &[]).unwrap();
        let b = builder.add_node("b", CellType::PIn, &[]).unwrap();
        builder.add_node("dangling", CellType::Inv, &[Some(a)]).unwrap();
        builder.add_node("out", CellType::POut, &[Some(b)]).unwrap();
        let circuit = Arc::new(builder.build().unwrap());

        let mut generator = stuck_at_generator(circuit, StuckAt::new(2, Port::output(), StuckAtKind::Zero));
        let context = generator.context_mut();
        assert!(context.is_trivially_unsatisfiable());
        assert_eq!(context.solve(), Ok(SolverResult::Unsatisfiable));
        assert_eq!(context.state(), AttemptState::Unsatisfiable);
    }

    #[test]
    fn invalid_location() {
        let context = GeneratorContext::<Data>::new(and_gate(), BackendKind::Sat, &Config::default());
        let mut generator = LogicGenerator::new(context);
        generator.set_number_of_timeframes(1).unwrap();
        let fault = StuckAt::new(2, Port::input(2), StuckAtKind::Zero);
        generator
            .emplace_module(Box::new(StuckAtFaultCircuitTagger::new(vec![fault], TaggingMode::Scan)))
            .unwrap();
        assert!(generator.generate_circuit_logic().is_err());
    }
}

mod dchain {
    use super::*;

    // x -> inv ; x, (b | inv) -> and -> out
    fn circuit(masked: bool) -> Arc<Circuit> {
        let mut builder = CircuitBuilder::default();
        let x = builder.add_node("x", CellType::PIn, &[]).unwrap();
        let b = builder.add_node("b", CellType::PIn, &[]).unwrap();
        let inv = builder.add_node("inv", CellType::Inv, &[Some(x)]).unwrap();
        let other = match masked {
            true => inv,
            false => b,
        };
        let and = builder.add_node("and", CellType::And, &[Some(x), Some(other)]).unwrap();
        builder.add_node("out", CellType::POut, &[Some(and)]).unwrap();
        Arc::new(builder.build().unwrap())
    }

    #[test]
    fn sensitized_path() {
        let mut generator = stuck_at_generator(circuit(false), StuckAt::new(0, Port::output(), StuckAtKind::One));
        assert_eq!(generator.context_mut().solve(), Ok(SolverResult::Satisfiable));
    }

    #[test]
    fn masked_path() {
        // With x stuck at one, the inverter gives zero and the and gate is zero in both copies.
        let mut generator = stuck_at_generator(circuit(true), StuckAt::new(0, Port::output(), StuckAtKind::One));
        assert_eq!(generator.context_mut().solve(), Ok(SolverResult::Unsatisfiable));
    }

    #[test]
    fn difference_outside_the_output_cone() {
        // The inverter is outside the output cone of b, so the good and bad copies share a value.
        let mut generator = stuck_at_generator(circuit(false), StuckAt::new(1, Port::output(), StuckAtKind::One));
        let context = generator.context_mut();
        assert!(!context.has_tag(0, 2, Tag::Diff));
        let difference = context.require_container::<DiffTag>(0, 2, Port::output()).unwrap();
        assert_eq!(context.encoder().constant_value(&difference), Some(Logic::Zero));
    }
}

mod transition {
    use super::*;

    // a -> buf -> out
    fn generator(kind: TransitionKind) -> LogicGenerator<Data> {
        let mut builder = CircuitBuilder::default();
        let a = builder.add_node("a", CellType::PIn, &[]).unwrap();
        let buf = builder.add_node("buf", CellType::Buf, &[Some(a)]).unwrap();
        builder.add_node("out", CellType::POut, &[Some(buf)]).unwrap();
        let faults = vec![TransitionDelay::new(a, Port::output(), kind)];

        let context = GeneratorContext::new(builder.build().unwrap(), BackendKind::Sat, &Config::default());
        let mut generator = LogicGenerator::new(context);
        generator.set_number_of_timeframes(2).unwrap();
        generator
            .emplace_module(Box::new(TransitionDelayFaultCircuitTagger::new(faults.clone(), TaggingMode::Scan)))
            .unwrap();
        generator.emplace_module(Box::new(DChainCircuitTagger)).unwrap();
        emplace_circuit_logic(&mut generator);
        generator.emplace_module(Box::new(TransitionDelayFaultEncoder::new(faults.clone()))).unwrap();
        generator.emplace_module(Box::new(DChainBaseEncoder)).unwrap();
        generator.emplace_module(Box::new(BackwardDChainEncoder)).unwrap();
        generator
            .emplace_module(Box::new(TransitionSensitizationConstraintEncoder::new(
                &faults,
                SensitizationMode::All,
                TimeframeMode::Last,
                false,
            )))
            .unwrap();
        generator.emplace_module(Box::new(FaultPropagationConstraintEncoder::default())).unwrap();
        generator.generate_circuit_logic().unwrap();
        generator
    }

    fn pattern(kind: TransitionKind) -> TestPattern {
        let mut generator = generator(kind);
        let context = generator.context_mut();
        assert_eq!(context.solve(), Ok(SolverResult::Satisfiable));
        extract_test_pattern::<_, GoodTag>(context, InputCapture::PrimaryInputsOnly).unwrap()
    }

    #[test]
    fn slow_to_rise() {
        let pattern = pattern(TransitionKind::SlowToRise);
        assert_eq!(pattern.primary_inputs(0), &[Logic::Zero]);
        assert_eq!(pattern.primary_inputs(1), &[Logic::One]);
    }

    #[test]
    fn slow_to_fall() {
        let pattern = pattern(TransitionKind::SlowToFall);
        assert_eq!(pattern.primary_inputs(0), &[Logic::One]);
        assert_eq!(pattern.primary_inputs(1), &[Logic::Zero]);
    }

    #[test]
    fn no_activation_on_the_first_timeframe() {
        let generator = generator(TransitionKind::SlowToTransition);
        let context = generator.context();
        let first = context.record_of(RecordKey::TransitionActivation { fault: 0, timeframe: 0 }).unwrap();
        assert_eq!(context.encoder().constant_value(&first), Some(Logic::Zero));
        let second = context.record_of(RecordKey::TransitionActivation { fault: 0, timeframe: 1 }).unwrap();
        assert_eq!(context.encoder().constant_value(&second), None);
    }
}

mod replay {
    use super::*;

    /// The value of each node under `inputs`, with the output of `fault.0` held at `fault.1`.
    fn simulate(circuit: &Circuit, inputs: &[Logic], fault: Option<(usize, Logic)>) -> Vec<Logic> {
        let mut values: Vec<Logic> = Vec::with_capacity(circuit.node_count());
        for node in circuit.nodes() {
            let driven = |index: usize| node.input(index).map_or(Logic::Unknown, |driver| values[driver]);
            let mut value = match node.cell_type() {
                CellType::PIn => {
                    let position = circuit.primary_inputs().iter().position(|input| *input == node.id());
                    position.map_or(Logic::Unknown, |position| inputs[position])
                }
                CellType::POut | CellType::Buf => driven(0),
                CellType::Nand => Logic::and((0..node.input_count()).map(driven)).negate(),
                other => panic!("{other:?} is not simulated"),
            };
            if let Some((site, stuck)) = fault {
                if site == node.id() {
                    value = stuck;
                }
            }
            values.push(value);
        }
        values
    }

    #[test]
    fn c17_patterns_detect_their_faults() {
        let _ = env_logger::builder().is_test(true).try_init();
        let circuit = c17();
        for node in 0..11 {
            for kind in [StuckAtKind::Zero, StuckAtKind::One] {
                let fault = StuckAt::new(node, Port::output(), kind);
                let mut generator = stuck_at_generator(circuit.clone(), fault);
                let context = generator.context_mut();
                assert_eq!(context.solve(), Ok(SolverResult::Satisfiable), "{fault}");

                let pattern = extract_test_pattern::<_, GoodTag>(context, InputCapture::PrimaryInputsOnly).unwrap();
                let stuck = match kind {
                    StuckAtKind::Zero => Logic::Zero,
                    _ => Logic::One,
                };
                let good = simulate(&circuit, pattern.primary_inputs(0), None);
                let bad = simulate(&circuit, pattern.primary_inputs(0), Some((node, stuck)));

                let detected = circuit.primary_outputs().iter().any(|output| {
                    good[*output].is_known() && bad[*output].is_known() && good[*output] != bad[*output]
                });
                assert!(detected, "{fault} with pattern {pattern}");
            }
        }
    }
}

mod cones {
    use super::*;

    /// Nodes reachable from `site` through successors, including `site`.
    fn reachable(circuit: &Circuit, site: usize) -> Vec<usize> {
        let mut seen = vec![false; circuit.node_count()];
        let mut stack = vec![site];
        while let Some(node) = stack.pop() {
            if std::mem::replace(&mut seen[node], true) {
                continue;
            }
            stack.extend(circuit.node(node).successors());
        }
        (0..circuit.node_count()).filter(|node| seen[*node]).collect()
    }

    #[test]
    fn c17_fault_cones() {
        let circuit = c17();
        for site in 0..11 {
            let generator = stuck_at_generator(circuit.clone(), StuckAt::new(site, Port::output(), StuckAtKind::Zero));
            let frame = generator.context().timeframe(0).unwrap();

            let bad: Vec<usize> = frame.tagged_nodes(Tag::Bad).collect();
            assert_eq!(bad, reachable(&circuit, site), "site {site}");

            for node in &bad {
                assert!(frame.has_tag(*node, Tag::Good));
                assert!(frame.has_tag(*node, Tag::Diff));
                for driver in circuit.node(*node).inputs().iter().flatten() {
                    assert!(frame.has_tag(*driver, Tag::Good), "driver {driver} of {node}");
                }
            }
            assert!(frame.has_tag(site, Tag::FaultLocation));
        }
    }
}
