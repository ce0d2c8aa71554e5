/*!
The difference chain, tracking where the good and bad copies of a circuit differ.

The difference of a node is a `01` container, true when the good and bad values of the node are distinct values, each zero or one.
Four modules build the chain:
- [DChainCircuitTagger] tags the difference of every node with both a good and a bad copy.
- [DChainBaseEncoder] defines the difference of each node from its good and bad values, read without overrides.
- [BackwardDChainEncoder] constrains a difference to imply a difference at some input, read with overrides.
- [ForwardDChainConnectionEncoder] links the difference of a secondary input to the difference of its pair on the previous timeframe.

Reading the base difference without overrides while the chain reads with overrides means an injected fault is the only source of a difference the chain will follow back.
So, a difference at an output implies a path of differences back to a fault site, and the solver may prune any assignment without such a path.
*/

use crate::{
    circuit::Port,
    generator::{
        tag::{BadTag, DiffTag, GoodTag, PinData, Tag},
        AllowOverride, GeneratorContext, GeneratorModule, Phase, TaggingDirection,
    },
    misc::log::targets::{self},
    solver::{
        bmc::{ClauseKind, VariableKind},
        BackendKind,
    },
    structures::container::{Container01, LogicContainer},
    types::err::ErrorKind,
};

/// Tags the difference of every node with both the good and bad tag.
pub struct DChainCircuitTagger;

impl<P: PinData> GeneratorModule<P> for DChainCircuitTagger {
    fn name(&self) -> &'static str {
        "dchain-circuit-tagger"
    }

    fn phase(&self) -> Phase {
        Phase::DifferenceTagging
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
        let tagged: Vec<usize> = frame
            .tagged_nodes(Tag::Bad)
            .filter(|node| frame.has_tag(*node, Tag::Good))
            .collect();
        for node in &tagged {
            frame.add_tag(*node, Tag::Diff);
        }
        log::debug!(target: targets::DCHAIN, "Timeframe {timeframe}: {} nodes with a difference", tagged.len());
        Ok(())
    }
}

/// Defines the difference of each node as the difference of its good and bad values, read without overrides.
///
/// With a bounded model checking back end the difference of a secondary input is a latch, as the difference is linked across steps.
/// The latch is defined under both initial and transition clauses.
pub struct DChainBaseEncoder;

impl<P: PinData> GeneratorModule<P> for DChainBaseEncoder {
    fn name(&self) -> &'static str {
        "dchain-base-encoder"
    }

    fn phase(&self) -> Phase {
        Phase::DifferenceBase
    }

    fn encode_node(&self, context: &mut GeneratorContext<P>, timeframe: usize, node: usize) -> Result<(), ErrorKind> {
        if !context.has_tag(timeframe, node, Tag::Diff) {
            return Ok(());
        }
        let good = context.require_container_with::<GoodTag>(timeframe, node, Port::output(), AllowOverride::Disable)?;
        let bad = context.require_container_with::<BadTag>(timeframe, node, Port::output(), AllowOverride::Disable)?;
        let bad: P::Good = context.encoder_mut().convert(&bad);

        let is_state = context.circuit().is_secondary_input(node);
        let encoder = context.encoder_mut();
        let difference = match (encoder.backend_kind(), is_state) {
            (BackendKind::Bmc, true) => {
                let difference = encoder.new_state_container::<Container01>();
                for kind in [ClauseKind::Initial, ClauseKind::Transition] {
                    encoder.with_bmc_target(kind, VariableKind::Auxiliary, |encoder| {
                        encoder.difference_01_detector_into(&good, &bad, &difference)
                    });
                }
                difference
            }
            _ => encoder.difference_01_detector(&good, &bad),
        };

        context.set_internal_container::<DiffTag>(timeframe, node, difference)
    }
}

/// Constrains the difference of each node to imply a difference at one of its inputs.
///
/// Inputs are read with overrides, and so end at the differences injected at fault sites.
/// A node whose output difference is overridden is a fault site, and is left unconstrained.
pub struct BackwardDChainEncoder;

impl<P: PinData> GeneratorModule<P> for BackwardDChainEncoder {
    fn name(&self) -> &'static str {
        "backward-dchain-encoder"
    }

    fn phase(&self) -> Phase {
        Phase::DifferenceChain
    }

    fn encode_node(&self, context: &mut GeneratorContext<P>, timeframe: usize, node: usize) -> Result<(), ErrorKind> {
        if !context.has_tag(timeframe, node, Tag::Diff) {
            return Ok(());
        }
        if context.override_of::<DiffTag>(timeframe, node, Port::output()).is_some() {
            return Ok(());
        }
        let Some(difference) = context.internal_container::<DiffTag>(timeframe, node) else {
            return Ok(());
        };

        let circuit = context.circuit_handle();
        let mut predecessors: Vec<Container01> = Vec::default();
        for (index, driver) in circuit.node(node).inputs().iter().enumerate() {
            let port = Port::input(index);
            let overridden = context.override_of::<DiffTag>(timeframe, node, port).is_some();
            let tagged = driver.is_some_and(|driver| context.has_tag(timeframe, driver, Tag::Diff));
            if !overridden && !tagged {
                continue;
            }
            let predecessor = context.get_container::<DiffTag>(timeframe, node, port, AllowOverride::Enable)?;
            if predecessor.is_set() {
                predecessors.push(predecessor);
            }
        }

        if predecessors.is_empty() {
            return Ok(());
        }
        let encoder = context.encoder_mut();
        let any = encoder.encode_or(&predecessors);
        encoder.encode_implication(&difference, &any);
        Ok(())
    }
}

/// Links the difference of each secondary input to the difference of its pair on the previous timeframe.
///
/// With a satisfiability back end the two are equivalent, and with a bounded model checking back end related by the next state relation.
pub struct ForwardDChainConnectionEncoder;

impl<P: PinData> GeneratorModule<P> for ForwardDChainConnectionEncoder {
    fn name(&self) -> &'static str {
        "forward-dchain-connection-encoder"
    }

    fn phase(&self) -> Phase {
        Phase::Connection
    }

    fn encode_timeframe(&self, context: &mut GeneratorContext<P>, timeframe: usize) -> Result<(), ErrorKind> {
        let kind = context.backend_kind();
        let previous = match kind {
            BackendKind::Sat if timeframe == 0 => return Ok(()),
            BackendKind::Sat => timeframe - 1,
            BackendKind::Bmc if timeframe != 0 => return Ok(()),
            BackendKind::Bmc => 0,
        };
        let circuit = context.circuit_handle();

        for (input, output) in circuit.secondary_inputs().iter().zip(circuit.secondary_outputs()) {
            let Some(state) = context.internal_container::<DiffTag>(timeframe, *input) else {
                continue;
            };
            if !context.has_tag(timeframe, *input, Tag::Diff) || !context.has_tag(previous, *output, Tag::Diff) {
                continue;
            }
            let next = context.get_container::<DiffTag>(previous, *output, Port::output(), AllowOverride::Enable)?;
            if !next.is_set() {
                continue;
            }
            match kind {
                BackendKind::Sat => context.encoder_mut().encode_buffer_into(&next, &state),
                BackendKind::Bmc => context.encoder_mut().encode_next_state(&state, &next),
            }
        }
        Ok(())
    }
}
