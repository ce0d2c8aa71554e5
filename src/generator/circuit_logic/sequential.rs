use std::marker::PhantomData;

use crate::{
    circuit::{cell::secondary_port, Port},
    config::{
        sequential::{SequentialModel, SetResetModel},
        Config,
    },
    generator::{
        circuit_logic::shared_good,
        tag::{ContainerTag, PinData},
        AllowOverride, GeneratorContext, GeneratorModule, Phase,
    },
    misc::log::targets::{self},
    solver::{
        bmc::{ClauseKind, VariableKind},
        BackendKind,
    },
    structures::{container::LogicContainer, logic::LogicConstraint},
    types::err::{self, ErrorKind},
};

/// Encodes secondary inputs, the state of sequential elements.
///
/// The initial state is restricted by a constraint:
/// - With a satisfiability back end, the state on the first timeframe.
///   The state on later timeframes is fixed by a [SequentialConnectionEncoder].
/// - With a bounded model checking back end, a latch, with the constraint as an initial clause.
///
/// For tags other than good, the initial state is the good initial state.
pub struct SequentialInputLogicEncoder<T> {
    constraint: LogicConstraint,
    tag: PhantomData<T>,
}

impl<T> Default for SequentialInputLogicEncoder<T> {
    fn default() -> Self {
        Self::new(LogicConstraint::Only01)
    }
}

impl<T> SequentialInputLogicEncoder<T> {
    pub fn new(constraint: LogicConstraint) -> Self {
        SequentialInputLogicEncoder {
            constraint,
            tag: PhantomData,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.input_constraint.value)
    }
}

impl<P: PinData, T: ContainerTag<P>> GeneratorModule<P> for SequentialInputLogicEncoder<T> {
    fn name(&self) -> &'static str {
        "sequential-input-logic-encoder"
    }

    fn phase(&self) -> Phase {
        Phase::CircuitLogic
    }

    fn encode_node(&self, context: &mut GeneratorContext<P>, timeframe: usize, node: usize) -> Result<(), ErrorKind> {
        if !context.circuit().is_secondary_input(node) || !context.has_tag(timeframe, node, T::TAG) {
            return Ok(());
        }
        let constraint = self.constraint;

        let state = match context.backend_kind() {
            BackendKind::Sat if timeframe > 0 => context.encoder_mut().new_container::<T::Container>(),

            BackendKind::Sat => match shared_good::<P, T>(context, timeframe, node)? {
                Some(shared) => shared,
                None => {
                    let state = context.encoder_mut().new_container::<T::Container>();
                    context.encoder_mut().encode_constraint(&state, constraint);
                    state
                }
            },

            BackendKind::Bmc => {
                let state = context.encoder_mut().new_state_container::<T::Container>();
                match shared_good::<P, T>(context, timeframe, node)? {
                    Some(shared) => {
                        context.encoder_mut().with_bmc_target(ClauseKind::Initial, VariableKind::Auxiliary, |encoder| {
                            encoder.encode_equivalence(&state, &shared)
                        });
                    }
                    None => {
                        context.encoder_mut().with_bmc_target(ClauseKind::Initial, VariableKind::Auxiliary, |encoder| {
                            encoder.encode_constraint(&state, constraint)
                        });
                    }
                }
                state
            }
        };

        context.set_internal_container::<T>(timeframe, node, state)
    }
}

/// Encodes secondary outputs, the value to be stored by sequential elements.
///
/// The value is derived from the data input by the [sequential model](SequentialModel), and then from the set and reset inputs by the [set/reset model](SetResetModel).
/// Set and reset inputs are read only when the model uses them.
pub struct SequentialOutputLogicEncoder<T> {
    sequential_model: SequentialModel,
    set_reset_model: SetResetModel,
    tag: PhantomData<T>,
}

impl<T> Default for SequentialOutputLogicEncoder<T> {
    fn default() -> Self {
        Self::new(SequentialModel::Keep, SetResetModel::None)
    }
}

impl<T> SequentialOutputLogicEncoder<T> {
    pub fn new(sequential_model: SequentialModel, set_reset_model: SetResetModel) -> Self {
        SequentialOutputLogicEncoder {
            sequential_model,
            set_reset_model,
            tag: PhantomData,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.sequential_model.value, config.set_reset_model.value)
    }
}

impl<P: PinData, T: ContainerTag<P>> GeneratorModule<P> for SequentialOutputLogicEncoder<T> {
    fn name(&self) -> &'static str {
        "sequential-output-logic-encoder"
    }

    fn phase(&self) -> Phase {
        Phase::CircuitLogic
    }

    fn encode_node(&self, context: &mut GeneratorContext<P>, timeframe: usize, node: usize) -> Result<(), ErrorKind> {
        if !context.circuit().is_secondary_output(node) || !context.has_tag(timeframe, node, T::TAG) {
            return Ok(());
        }

        let mut value = match self.sequential_model {
            SequentialModel::Keep | SequentialModel::Unclocked => {
                context.require_container::<T>(timeframe, node, Port::input(secondary_port::DATA))?
            }

            SequentialModel::None => context.encoder_mut().new_container::<T::Container>(),

            SequentialModel::FlipFlop => {
                return Err(err::ConfigurationError::UnsupportedModel {
                    node,
                    model: "flip-flop",
                }
                .into())
            }

            SequentialModel::Latch => {
                let data = context.require_container::<T>(timeframe, node, Port::input(secondary_port::DATA))?;
                let enable = context.require_container::<T>(timeframe, node, Port::input(secondary_port::CLOCK))?;
                let Some(pair) = context.circuit().secondary_pair(node) else {
                    return Err(err::ConfigurationError::MissingSecondaryPair { node }.into());
                };
                let state = context.require_container::<T>(timeframe, pair, Port::output())?;
                context.encoder_mut().encode_multiplexer(&state, &data, &enable)
            }
        };

        let model = self.set_reset_model;
        let set = match model.uses_set() {
            true => Some(context.require_container::<T>(timeframe, node, Port::input(secondary_port::SET))?),
            false => None,
        };
        let reset = match model.uses_reset() {
            true => Some(context.require_container::<T>(timeframe, node, Port::input(secondary_port::RESET))?),
            false => None,
        };

        let encoder = context.encoder_mut();
        let with_set = |encoder: &mut crate::encoder::LogicEncoder, value: &T::Container| match &set {
            Some(set) => encoder.encode_set_control(value, set),
            None => *value,
        };
        let with_reset = |encoder: &mut crate::encoder::LogicEncoder, value: &T::Container| match &reset {
            Some(reset) => encoder.encode_reset_control(value, reset),
            None => *value,
        };
        value = match model {
            SetResetModel::None => value,
            SetResetModel::OnlySet => with_set(encoder, &value),
            SetResetModel::OnlyReset => with_reset(encoder, &value),
            SetResetModel::SetHasPriority => {
                let reset = with_reset(&mut *encoder, &value);
                with_set(encoder, &reset)
            }
            SetResetModel::ResetHasPriority => {
                let set = with_set(&mut *encoder, &value);
                with_reset(encoder, &set)
            }
        };

        log::trace!(target: targets::SEQUENTIAL, "Secondary output {node} ({}, {}): {value:?}", self.sequential_model, model);
        context.set_internal_container::<T>(timeframe, node, value)
    }
}

/// Links the secondary output of each sequential element to the secondary input of its pair on the next timeframe.
///
/// - With a satisfiability back end, the state on timeframe `t` is a buffer of the stored value on timeframe `t - 1`, for `t > 0`.
/// - With a bounded model checking back end, the state is related to the stored value through the next state relation.
///
/// A tagged secondary input whose pair stores no value is a configuration error, as the state would be unconstrained.
pub struct SequentialConnectionEncoder<T> {
    tag: PhantomData<T>,
}

impl<T> Default for SequentialConnectionEncoder<T> {
    fn default() -> Self {
        SequentialConnectionEncoder { tag: PhantomData }
    }
}

impl<P: PinData, T: ContainerTag<P>> GeneratorModule<P> for SequentialConnectionEncoder<T> {
    fn name(&self) -> &'static str {
        "sequential-connection-encoder"
    }

    fn phase(&self) -> Phase {
        Phase::Connection
    }

    fn encode_timeframe(&self, context: &mut GeneratorContext<P>, timeframe: usize) -> Result<(), ErrorKind> {
        let kind = context.backend_kind();
        // The first timeframe has no predecessor with SAT, and BMC stores only the first timeframe.
        let previous = match kind {
            BackendKind::Sat if timeframe == 0 => return Ok(()),
            BackendKind::Sat => timeframe - 1,
            BackendKind::Bmc if timeframe != 0 => return Ok(()),
            BackendKind::Bmc => 0,
        };
        let circuit = context.circuit_handle();

        for (input, output) in circuit.secondary_inputs().iter().zip(circuit.secondary_outputs()) {
            if !context.has_tag(timeframe, *input, T::TAG) {
                continue;
            }
            let state = context.require_container_with::<T>(timeframe, *input, Port::output(), AllowOverride::Disable)?;
            let next = context.get_container::<T>(previous, *output, Port::output(), AllowOverride::Enable)?;
            if !next.is_set() {
                log::error!(target: targets::SEQUENTIAL, "No {} value stored by node {output} in timeframe {previous}", T::TAG);
                return Err(err::ConfigurationError::MissingNextState {
                    node: *input,
                    tag: T::TAG,
                    timeframe,
                }
                .into());
            }

            match kind {
                BackendKind::Sat => context.encoder_mut().encode_buffer_into(&next, &state),
                BackendKind::Bmc => context.encoder_mut().encode_next_state(&state, &next),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod sequential_tests {
    use super::*;
    use crate::{
        circuit::{CellType, CircuitBuilder},
        generator::{
            circuit_logic::{DefaultLogicEncoder, InputLogicEncoder},
            tag::{GoodTag, PinDataG, Tag},
            tagger::WholeCircuitTagger,
            LogicGenerator,
        },
        solver::SolverResult,
        structures::{container::Container01X, logic::Logic},
    };

    type Data = PinDataG<Container01X>;

    // A toggle: q' = q xor en, with reset.
    fn toggle() -> (crate::circuit::Circuit, usize, usize) {
        let mut builder = CircuitBuilder::default();
        let en = builder.add_node("en", CellType::PIn, &[]).unwrap();
        let rst = builder.add_node("rst", CellType::PIn, &[]).unwrap();
        let q = builder.add_node("q", CellType::SIn, &[]).unwrap();
        let x = builder.add_node("x", CellType::Xor, &[Some(q), Some(en)]).unwrap();
        let d = builder.add_node("d", CellType::SOut, &[Some(x), None, None, Some(rst)]).unwrap();
        builder.pair_secondary(q, d).unwrap();
        (builder.build().unwrap(), q, d)
    }

    fn generator(
        kind: BackendKind,
        timeframes: usize,
        output: SequentialOutputLogicEncoder<GoodTag>,
    ) -> LogicGenerator<Data> {
        let (circuit, _, _) = toggle();
        let context = GeneratorContext::new(circuit, kind, &Config::default());
        let mut generator = LogicGenerator::new(context);
        generator.set_number_of_timeframes(timeframes).unwrap();
        generator.emplace_module(Box::new(WholeCircuitTagger::<GoodTag>::default())).unwrap();
        generator.emplace_module(Box::new(InputLogicEncoder::<GoodTag>::default())).unwrap();
        generator.emplace_module(Box::new(SequentialInputLogicEncoder::<GoodTag>::default())).unwrap();
        generator.emplace_module(Box::new(DefaultLogicEncoder::<GoodTag>::default())).unwrap();
        generator.emplace_module(Box::new(output)).unwrap();
        generator.emplace_module(Box::new(SequentialConnectionEncoder::<GoodTag>::default())).unwrap();
        generator
    }

    #[test]
    fn flip_flop_unsupported() {
        let mut generator = generator(
            BackendKind::Sat,
            1,
            SequentialOutputLogicEncoder::new(SequentialModel::FlipFlop, SetResetModel::None),
        );
        assert_eq!(
            generator.generate_circuit_logic(),
            Err(err::ConfigurationError::UnsupportedModel { node: 4, model: "flip-flop" }.into())
        );
    }

    #[test]
    fn unconnected_set() {
        let mut generator = generator(
            BackendKind::Sat,
            1,
            SequentialOutputLogicEncoder::new(SequentialModel::Keep, SetResetModel::SetHasPriority),
        );
        assert!(matches!(
            generator.generate_circuit_logic(),
            Err(ErrorKind::Configuration(err::ConfigurationError::UnconnectedPin { node: 4, port: 2, .. }))
        ));
    }

    #[test]
    fn connection_without_stored_values() {
        let (_, q, _) = toggle();
        for (kind, timeframe) in [(BackendKind::Sat, 1), (BackendKind::Bmc, 0)] {
            let (circuit, _, _) = toggle();
            let context = GeneratorContext::new(circuit, kind, &Config::default());
            let mut generator = LogicGenerator::<Data>::new(context);
            generator.set_number_of_timeframes(2).unwrap();
            generator.emplace_module(Box::new(WholeCircuitTagger::<GoodTag>::default())).unwrap();
            generator.emplace_module(Box::new(InputLogicEncoder::<GoodTag>::default())).unwrap();
            generator.emplace_module(Box::new(SequentialInputLogicEncoder::<GoodTag>::default())).unwrap();
            generator.emplace_module(Box::new(DefaultLogicEncoder::<GoodTag>::default())).unwrap();
            generator.emplace_module(Box::new(SequentialConnectionEncoder::<GoodTag>::default())).unwrap();

            assert_eq!(
                generator.generate_circuit_logic(),
                Err(err::ConfigurationError::MissingNextState {
                    node: q,
                    tag: Tag::Good,
                    timeframe,
                }
                .into()),
                "{kind:?}"
            );
        }
    }

    #[test]
    fn reset_dominates_across_timeframes() {
        let (_, q, d) = toggle();
        let mut generator = generator(
            BackendKind::Sat,
            2,
            SequentialOutputLogicEncoder::new(SequentialModel::Keep, SetResetModel::OnlyReset),
        );
        generator.generate_circuit_logic().unwrap();
        let context = generator.context_mut();

        // Reset in the first timeframe, and a one stored in the second timeframe regardless.
        let rst = context.require_container::<GoodTag>(0, 1, Port::output()).unwrap();
        let q1 = context.require_container::<GoodTag>(1, q, Port::output()).unwrap();
        let d0 = context.require_container::<GoodTag>(0, d, Port::output()).unwrap();
        context.encoder_mut().encode_value(&rst, Logic::One);
        context.encoder_mut().encode_value(&q1, Logic::One);
        assert_ne!(d0, q1);
        assert_eq!(context.solve(), Ok(SolverResult::Unsatisfiable));
    }

    #[test]
    fn bmc_state_container() {
        let (_, q, _) = toggle();
        let mut generator = generator(BackendKind::Bmc, 4, SequentialOutputLogicEncoder::default());
        generator.generate_circuit_logic().unwrap();
        let context = generator.context_mut();

        let state = context.require_container::<GoodTag>(0, q, Port::output()).unwrap();
        let bmc = context.encoder().backend().as_bmc().unwrap();
        for literal in state.active_literals() {
            assert_eq!(bmc.variable_kind(literal.variable()), Some(VariableKind::Latch));
        }
        assert!(!bmc.clauses(ClauseKind::Initial).is_empty());
    }
}
