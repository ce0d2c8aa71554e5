use crate::{
    generator::{tag::PinData, GeneratorContext},
    types::err::ErrorKind,
};

/// The phase of a module, fixing where the module runs relative to other modules.
///
/// Modules are registered in phase order, and within a phase run in the order registered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Tagging,
    FaultTagging,
    DifferenceTagging,
    CircuitLogic,
    FaultInjection,
    DifferenceBase,
    DifferenceChain,
    Connection,
    Constraint,
}

/// The direction in which timeframes are visited when tagging.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaggingDirection {
    /// From the first timeframe to the last.
    Forward,
    /// From the last timeframe to the first.
    Backward,
}

/// A module of a [logic generator](crate::generator::LogicGenerator).
///
/// Each hook defaults to doing nothing, and a module overrides only the hooks it needs.
/// A module holds configuration only: anything noted during generation is kept on the context.
///
/// Hooks are called in the following order, with each step taken by every module before the next step:
///
/// ```text
/// pre_tag_circuit
///   tag_timeframe(Forward)   for each timeframe, first to last
///   tag_timeframe(Backward)  for each timeframe, last to first
/// tag_circuit
/// post_tag_circuit
///
/// pre_encode_circuit
///   pre_encode_timeframe     for each timeframe
///     pre_encode_node, encode_node, post_encode_node  for each node, in id order
///   encode_timeframe
///   post_encode_timeframe
/// encode_circuit
/// post_encode_circuit
///
/// pre_constrain_circuit
///   pre_constrain_timeframe, constrain_timeframe, post_constrain_timeframe  for each timeframe
/// constrain_circuit
/// post_constrain_circuit
/// ```
///
/// Within a node, every module is called before the next node.
/// So, a module in a later phase may read the containers written for the node by a module in an earlier phase.
#[allow(unused_variables)]
pub trait GeneratorModule<P: PinData> {
    fn name(&self) -> &'static str;

    fn phase(&self) -> Phase;

    /// Clears any configuration derived for a previous attempt.
    fn reset(&mut self) {}

    fn pre_tag_circuit(&self, context: &mut GeneratorContext<P>) -> Result<(), ErrorKind> {
        Ok(())
    }

    fn tag_timeframe(
        &self,
        context: &mut GeneratorContext<P>,
        timeframe: usize,
        direction: TaggingDirection,
    ) -> Result<(), ErrorKind> {
        Ok(())
    }

    fn tag_circuit(&self, context: &mut GeneratorContext<P>) -> Result<(), ErrorKind> {
        Ok(())
    }

    fn post_tag_circuit(&self, context: &mut GeneratorContext<P>) -> Result<(), ErrorKind> {
        Ok(())
    }

    fn pre_encode_circuit(&self, context: &mut GeneratorContext<P>) -> Result<(), ErrorKind> {
        Ok(())
    }

    fn pre_encode_timeframe(&self, context: &mut GeneratorContext<P>, timeframe: usize) -> Result<(), ErrorKind> {
        Ok(())
    }

    fn pre_encode_node(&self, context: &mut GeneratorContext<P>, timeframe: usize, node: usize) -> Result<(), ErrorKind> {
        Ok(())
    }

    fn encode_node(&self, context: &mut GeneratorContext<P>, timeframe: usize, node: usize) -> Result<(), ErrorKind> {
        Ok(())
    }

    fn post_encode_node(&self, context: &mut GeneratorContext<P>, timeframe: usize, node: usize) -> Result<(), ErrorKind> {
        Ok(())
    }

    fn encode_timeframe(&self, context: &mut GeneratorContext<P>, timeframe: usize) -> Result<(), ErrorKind> {
        Ok(())
    }

    fn post_encode_timeframe(&self, context: &mut GeneratorContext<P>, timeframe: usize) -> Result<(), ErrorKind> {
        Ok(())
    }

    fn encode_circuit(&self, context: &mut GeneratorContext<P>) -> Result<(), ErrorKind> {
        Ok(())
    }

    fn post_encode_circuit(&self, context: &mut GeneratorContext<P>) -> Result<(), ErrorKind> {
        Ok(())
    }

    fn pre_constrain_circuit(&self, context: &mut GeneratorContext<P>) -> Result<(), ErrorKind> {
        Ok(())
    }

    fn pre_constrain_timeframe(&self, context: &mut GeneratorContext<P>, timeframe: usize) -> Result<(), ErrorKind> {
        Ok(())
    }

    fn constrain_timeframe(&self, context: &mut GeneratorContext<P>, timeframe: usize) -> Result<(), ErrorKind> {
        Ok(())
    }

    fn post_constrain_timeframe(&self, context: &mut GeneratorContext<P>, timeframe: usize) -> Result<(), ErrorKind> {
        Ok(())
    }

    fn constrain_circuit(&self, context: &mut GeneratorContext<P>) -> Result<(), ErrorKind> {
        Ok(())
    }

    fn post_constrain_circuit(&self, context: &mut GeneratorContext<P>) -> Result<(), ErrorKind> {
        Ok(())
    }
}
