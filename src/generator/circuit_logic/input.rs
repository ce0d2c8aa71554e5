use std::marker::PhantomData;

use crate::{
    config::Config,
    generator::{
        circuit_logic::shared_good,
        tag::{ContainerTag, PinData},
        GeneratorContext, GeneratorModule, Phase,
    },
    solver::bmc::{ClauseKind, VariableKind},
    structures::logic::LogicConstraint,
    types::err::ErrorKind,
};

/// Encodes primary inputs as fresh containers, restricted by a constraint.
pub struct InputLogicEncoder<T> {
    constraint: LogicConstraint,
    tag: PhantomData<T>,
}

impl<T> Default for InputLogicEncoder<T> {
    fn default() -> Self {
        Self::new(LogicConstraint::Only01)
    }
}

impl<T> InputLogicEncoder<T> {
    pub fn new(constraint: LogicConstraint) -> Self {
        InputLogicEncoder {
            constraint,
            tag: PhantomData,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.input_constraint.value)
    }
}

impl<P: PinData, T: ContainerTag<P>> GeneratorModule<P> for InputLogicEncoder<T> {
    fn name(&self) -> &'static str {
        "input-logic-encoder"
    }

    fn phase(&self) -> Phase {
        Phase::CircuitLogic
    }

    fn encode_node(&self, context: &mut GeneratorContext<P>, timeframe: usize, node: usize) -> Result<(), ErrorKind> {
        if !context.circuit().is_primary_input(node) || !context.has_tag(timeframe, node, T::TAG) {
            return Ok(());
        }

        let container = match shared_good::<P, T>(context, timeframe, node)? {
            Some(shared) => shared,
            None => {
                let constraint = self.constraint;
                context.encoder_mut().with_bmc_target(ClauseKind::Transition, VariableKind::Input, |encoder| {
                    let container = encoder.new_container::<T::Container>();
                    encoder.encode_constraint(&container, constraint);
                    container
                })
            }
        };

        context.set_internal_container::<T>(timeframe, node, container)
    }
}
