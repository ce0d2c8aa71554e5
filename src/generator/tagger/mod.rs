/*!
Generic taggers, selecting the nodes of a copy of the circuit.

| Tagger | Direction | Nodes |
|--------|-----------|-------|
| [WholeCircuitTagger] | forward | every node |
| [FanInCircuitTagger] | backward | the input cone of some nodes |
| [FanOutCircuitTagger] | forward | the output cone of some nodes |

Cones extend across timeframes through each pair of secondary input and output.
For a satisfiability back end, a fan-in cone reaching a secondary input continues from the secondary output of the pair on the previous timeframe, and a fan-out cone reaching a secondary output continues from the secondary input of the pair on the next timeframe.
For a bounded model checking back end the single stored timeframe is extended until no pair adds a node.

For the cones of faults, see [FaultCircuitTagger](crate::generator::fault::FaultCircuitTagger).
*/

use std::marker::PhantomData;

use crate::{
    circuit::Circuit,
    generator::{
        tag::{ContainerTag, PinData, Tag},
        GenerationTarget, GeneratorContext, GeneratorModule, Phase, TaggingDirection,
    },
    misc::log::targets::{self},
    types::err::ErrorKind,
};

/// Those of `candidates` lacking `tag` on `to_timeframe` whose secondary pair has `tag` on `from_timeframe`.
pub(crate) fn pairs_to_extend<P: PinData>(
    context: &GeneratorContext<P>,
    circuit: &Circuit,
    from_timeframe: usize,
    to_timeframe: usize,
    tag: Tag,
    candidates: &[usize],
) -> Vec<usize> {
    candidates
        .iter()
        .copied()
        .filter(|node| !context.has_tag(to_timeframe, *node, tag))
        .filter(|node| {
            circuit
                .secondary_pair(*node)
                .is_some_and(|pair| context.has_tag(from_timeframe, pair, tag))
        })
        .collect()
}

/// Tags every node with the tag of `T`.
pub struct WholeCircuitTagger<T> {
    tag: PhantomData<fn() -> T>,
}

impl<T> Default for WholeCircuitTagger<T> {
    fn default() -> Self {
        WholeCircuitTagger { tag: PhantomData }
    }
}

impl<P: PinData, T: ContainerTag<P>> GeneratorModule<P> for WholeCircuitTagger<T> {
    fn name(&self) -> &'static str {
        "whole-circuit-tagger"
    }

    fn phase(&self) -> Phase {
        Phase::Tagging
    }

    fn tag_timeframe(
        &self,
        context: &mut GeneratorContext<P>,
        timeframe: usize,
        direction: TaggingDirection,
    ) -> Result<(), ErrorKind> {
        if direction != TaggingDirection::Forward {
            return Ok(());
        }
        let frame = context.timeframe_mut(timeframe)?;
        for node in 0..frame.node_count() {
            frame.add_tag(node, T::TAG);
        }
        log::trace!(target: targets::TAGGING, "Timeframe {timeframe}: every node tagged {}", T::TAG);
        Ok(())
    }
}

/// Tags the input cone of some nodes with the tag of `T`, on every timeframe.
pub struct FanInCircuitTagger<T> {
    nodes: Vec<usize>,
    tag: PhantomData<fn() -> T>,
}

impl<T> FanInCircuitTagger<T> {
    pub fn new(nodes: Vec<usize>) -> Self {
        FanInCircuitTagger { nodes, tag: PhantomData }
    }
}

impl<P: PinData, T: ContainerTag<P>> GeneratorModule<P> for FanInCircuitTagger<T> {
    fn name(&self) -> &'static str {
        "fan-in-circuit-tagger"
    }

    fn phase(&self) -> Phase {
        Phase::Tagging
    }

    /// Timeframes are visited last to first, so the next timeframe is complete.
    fn tag_timeframe(
        &self,
        context: &mut GeneratorContext<P>,
        timeframe: usize,
        direction: TaggingDirection,
    ) -> Result<(), ErrorKind> {
        if direction != TaggingDirection::Backward {
            return Ok(());
        }
        let circuit = context.circuit_handle();

        let mut seeds = self.nodes.clone();
        let next = match context.is_bmc() {
            true => None,
            false => Some(timeframe + 1).filter(|next| *next < context.number_of_timeframes(GenerationTarget::CircuitTagging)),
        };
        if let Some(next) = next {
            seeds.extend(pairs_to_extend(context, &circuit, next, timeframe, T::TAG, circuit.secondary_outputs()));
        }

        while !seeds.is_empty() {
            context.tag_input_cone(timeframe, &seeds, &[T::TAG])?;
            seeds = match context.is_bmc() {
                true => pairs_to_extend(context, &circuit, timeframe, timeframe, T::TAG, circuit.secondary_outputs()),
                false => Vec::default(),
            };
        }
        Ok(())
    }
}

/// Tags the output cone of some nodes with the tag of `T`, on every timeframe.
pub struct FanOutCircuitTagger<T> {
    nodes: Vec<usize>,
    tag: PhantomData<fn() -> T>,
}

impl<T> FanOutCircuitTagger<T> {
    pub fn new(nodes: Vec<usize>) -> Self {
        FanOutCircuitTagger { nodes, tag: PhantomData }
    }
}

impl<P: PinData, T: ContainerTag<P>> GeneratorModule<P> for FanOutCircuitTagger<T> {
    fn name(&self) -> &'static str {
        "fan-out-circuit-tagger"
    }

    fn phase(&self) -> Phase {
        Phase::Tagging
    }

    fn tag_timeframe(
        &self,
        context: &mut GeneratorContext<P>,
        timeframe: usize,
        direction: TaggingDirection,
    ) -> Result<(), ErrorKind> {
        if direction != TaggingDirection::Forward {
            return Ok(());
        }
        let circuit = context.circuit_handle();

        let mut seeds = self.nodes.clone();
        if !context.is_bmc() {
            if let Some(previous) = context.previous_timeframe(timeframe) {
                seeds.extend(pairs_to_extend(context, &circuit, previous, timeframe, T::TAG, circuit.secondary_inputs()));
            }
        }

        while !seeds.is_empty() {
            context.tag_output_cone(timeframe, &seeds, &[T::TAG])?;
            seeds = match context.is_bmc() {
                true => pairs_to_extend(context, &circuit, timeframe, timeframe, T::TAG, circuit.secondary_inputs()),
                false => Vec::default(),
            };
        }
        Ok(())
    }
}
