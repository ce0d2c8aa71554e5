use std::marker::PhantomData;

use crate::{
    circuit::Port,
    generator::{
        tag::{ContainerTag, PinData},
        GeneratorContext, GeneratorModule, Phase,
    },
    types::err::ErrorKind,
};

/// Encodes primary outputs as a buffer of their input.
pub struct OutputLogicEncoder<T> {
    tag: PhantomData<T>,
}

impl<T> Default for OutputLogicEncoder<T> {
    fn default() -> Self {
        OutputLogicEncoder { tag: PhantomData }
    }
}

impl<P: PinData, T: ContainerTag<P>> GeneratorModule<P> for OutputLogicEncoder<T> {
    fn name(&self) -> &'static str {
        "output-logic-encoder"
    }

    fn phase(&self) -> Phase {
        Phase::CircuitLogic
    }

    fn encode_node(&self, context: &mut GeneratorContext<P>, timeframe: usize, node: usize) -> Result<(), ErrorKind> {
        if !context.circuit().is_primary_output(node) || !context.has_tag(timeframe, node, T::TAG) {
            return Ok(());
        }
        let input = context.require_container::<T>(timeframe, node, Port::input(0))?;
        let output = context.encoder_mut().encode_buffer(&input);
        context.set_internal_container::<T>(timeframe, node, output)
    }
}
