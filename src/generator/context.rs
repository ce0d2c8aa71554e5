/*!
The generator context, holding everything about a single attempt.

A context owns:
- A shared handle to a [circuit](crate::circuit::Circuit).
- The [timeframes](Timeframe) of the attempt.
- The [encoder](LogicEncoder), and so the solver back end.
- [Overrides](crate::generator::overrides) and records.

# Timeframes

With a satisfiability back end each timeframe is stored, and the timeframes are linked by constraints.
With a bounded model checking back end a single timeframe is stored, which the back end unrolls as needed.
So, the number of timeframes differs by [target](GenerationTarget):
- Tagging, encoding, and constraints see the stored timeframes.
- Pattern extraction sees the requested timeframes.

Any timeframe index is accepted for a bounded model checking back end, and maps to the stored timeframe.

# Reading containers

[get_container](GeneratorContext::get_container) resolves a container for a tag, timeframe, node, and port:
1. An override for the port, if overrides are allowed.
2. For an input port, the output of the driver of the port.
   An unconnected input is an error.
3. The slot of the node, if the node has the tag.
4. A fallback, derived from other tags. See [ContainerTag::fallback].
5. Otherwise, an unset container.

# States

An attempt moves through [states](AttemptState), and an invalid transition is an error:

```text
Uninitialized -> TimeframesAllocated -> ModulesRegistered -> Encoded -> SolverInvoked -> Satisfiable
                                                                                      -> Unsatisfiable
                                                                                      -> Unknown
```
*/

use std::{collections::HashMap, sync::Arc};

use crate::{
    circuit::{Circuit, Port, PortType},
    config::Config,
    encoder::LogicEncoder,
    generator::{
        overrides::{OverrideTable, RecordKey},
        tag::{ContainerTag, PinData, Tag},
        timeframe::Timeframe,
    },
    misc::log::targets::{self},
    solver::{BackendKind, SolverResult},
    structures::container::{Container01, LogicContainer},
    types::err::{self, ErrorKind},
};

/// The state of an attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AttemptState {
    Uninitialized,
    TimeframesAllocated,
    ModulesRegistered,
    Encoded,
    SolverInvoked,
    Satisfiable,
    Unsatisfiable,
    Unknown,
}

impl AttemptState {
    fn permits(&self, to: AttemptState) -> bool {
        use AttemptState::*;
        matches!(
            (self, to),
            (Uninitialized, TimeframesAllocated)
                | (TimeframesAllocated, TimeframesAllocated)
                | (TimeframesAllocated, ModulesRegistered)
                | (ModulesRegistered, ModulesRegistered)
                | (ModulesRegistered, Encoded)
                | (Encoded, SolverInvoked)
                | (SolverInvoked, Satisfiable | Unsatisfiable | Unknown)
        )
    }
}

/// The parts of an attempt which count timeframes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GenerationTarget {
    CircuitTagging,
    CircuitEncoding,
    ConstraintEncoding,
    PatternExtraction,
}

/// Whether overrides are read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AllowOverride {
    Enable,
    Disable,
}

/// A generator context.
pub struct GeneratorContext<P: PinData> {
    circuit: Arc<Circuit>,
    config: Config,

    timeframes: Vec<Timeframe<P>>,

    /// The count of timeframes requested, which differs from the count stored for bounded model checking.
    requested_timeframes: usize,

    encoder: LogicEncoder,

    pub(super) overrides: OverrideTable<P>,

    records: HashMap<RecordKey, Container01>,

    state: AttemptState,

    /// Set when some constraint is known to be unsatisfiable without a solve.
    trivially_unsatisfiable: bool,
}

impl<P: PinData> GeneratorContext<P> {
    pub fn new(circuit: impl Into<Arc<Circuit>>, kind: BackendKind, config: &Config) -> Self {
        Self::with_encoder(circuit, LogicEncoder::from_config(kind, config), config)
    }

    /// A context using the given encoder, and so the back end of the encoder.
    pub fn with_encoder(circuit: impl Into<Arc<Circuit>>, encoder: LogicEncoder, config: &Config) -> Self {
        GeneratorContext {
            circuit: circuit.into(),
            config: config.clone(),
            timeframes: Vec::default(),
            requested_timeframes: 0,
            encoder,
            overrides: OverrideTable::default(),
            records: HashMap::default(),
            state: AttemptState::Uninitialized,
            trivially_unsatisfiable: false,
        }
    }

    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// A handle to the circuit, for use alongside mutable access to the context.
    pub fn circuit_handle(&self) -> Arc<Circuit> {
        self.circuit.clone()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn encoder(&self) -> &LogicEncoder {
        &self.encoder
    }

    pub fn encoder_mut(&mut self) -> &mut LogicEncoder {
        &mut self.encoder
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.encoder.backend_kind()
    }

    pub fn is_bmc(&self) -> bool {
        self.backend_kind() == BackendKind::Bmc
    }

    pub fn state(&self) -> AttemptState {
        self.state
    }

    /// Moves the attempt to state `to`, if the transition is permitted.
    pub fn transition(&mut self, to: AttemptState) -> Result<(), err::StateError> {
        match self.state.permits(to) {
            true => {
                log::trace!(target: targets::GENERATOR, "Attempt state {:?} -> {to:?}", self.state);
                self.state = to;
                Ok(())
            }
            false => Err(err::StateError::InvalidTransition {
                from: self.state,
                to,
            }),
        }
    }
}

/// Timeframes.
impl<P: PinData> GeneratorContext<P> {
    /// Requests `count` timeframes.
    ///
    /// With a bounded model checking back end a single timeframe is stored, and `count` bounds the depth of the unrolling.
    pub fn set_number_of_timeframes(&mut self, count: usize) -> Result<(), ErrorKind> {
        if count == 0 {
            return Err(err::PreconditionError::NoTimeframes.into());
        }
        self.transition(AttemptState::TimeframesAllocated)?;

        let stored = match self.backend_kind() {
            BackendKind::Sat => count,
            BackendKind::Bmc => 1,
        };
        let node_count = self.circuit.node_count();
        self.timeframes.truncate(stored);
        while self.timeframes.len() < stored {
            let id = self.timeframes.len();
            self.timeframes.push(Timeframe::new(id, node_count));
        }
        self.requested_timeframes = count;

        let maximum_depth = self.config.bmc_maximum_depth.value.min(count - 1);
        if let Some(bmc) = self.encoder.backend_mut().as_bmc_mut() {
            bmc.set_maximum_depth(maximum_depth);
        }

        log::info!(target: targets::GENERATOR, "Timeframes: {count} requested, {stored} stored");
        Ok(())
    }

    /// The count of timeframes seen by `target`.
    pub fn number_of_timeframes(&self, target: GenerationTarget) -> usize {
        match target {
            GenerationTarget::PatternExtraction => self.requested_timeframes,
            _ => self.timeframes.len(),
        }
    }

    /// The index of the stored timeframe for `timeframe`.
    pub fn stored_timeframe(&self, timeframe: usize) -> Result<usize, ErrorKind> {
        if self.timeframes.is_empty() {
            return Err(err::PreconditionError::NoTimeframes.into());
        }
        match self.backend_kind() {
            BackendKind::Bmc => Ok(0),
            BackendKind::Sat if timeframe < self.timeframes.len() => Ok(timeframe),
            BackendKind::Sat => Err(err::PreconditionError::TimeframeOutOfRange {
                timeframe,
                count: self.timeframes.len(),
            }
            .into()),
        }
    }

    pub fn timeframe(&self, timeframe: usize) -> Result<&Timeframe<P>, ErrorKind> {
        let index = self.stored_timeframe(timeframe)?;
        Ok(&self.timeframes[index])
    }

    pub fn timeframe_mut(&mut self, timeframe: usize) -> Result<&mut Timeframe<P>, ErrorKind> {
        let index = self.stored_timeframe(timeframe)?;
        Ok(&mut self.timeframes[index])
    }

    /// The timeframe before `timeframe` in which a secondary output drives the secondary input of its pair.
    ///
    /// With a bounded model checking back end this is the stored timeframe itself, as the back end links steps.
    pub fn previous_timeframe(&self, timeframe: usize) -> Option<usize> {
        match self.backend_kind() {
            BackendKind::Bmc => Some(0),
            BackendKind::Sat => timeframe.checked_sub(1),
        }
    }

    /// Whether `node` has `tag` in `timeframe`, false for an invalid timeframe.
    pub fn has_tag(&self, timeframe: usize, node: usize, tag: Tag) -> bool {
        self.timeframe(timeframe)
            .is_ok_and(|frame| frame.has_tag(node, tag))
    }

    pub fn add_tag(&mut self, timeframe: usize, node: usize, tag: Tag) -> Result<bool, ErrorKind> {
        self.check_node(node)?;
        Ok(self.timeframe_mut(timeframe)?.add_tag(node, tag))
    }

    pub fn remove_tag(&mut self, timeframe: usize, node: usize, tag: Tag) -> Result<(), ErrorKind> {
        self.check_node(node)?;
        self.timeframe_mut(timeframe)?.remove_tag(node, tag);
        Ok(())
    }

    /// Tags the input cone of `seeds` in `timeframe`, returning the nodes of the cone.
    pub fn tag_input_cone(&mut self, timeframe: usize, seeds: &[usize], tags: &[Tag]) -> Result<Vec<usize>, ErrorKind> {
        for seed in seeds {
            self.check_node(*seed)?;
        }
        let circuit = self.circuit.clone();
        Ok(self.timeframe_mut(timeframe)?.tag_input_cone(&circuit, seeds, tags))
    }

    /// Tags the output cone of `seeds` in `timeframe`, returning the nodes of the cone.
    pub fn tag_output_cone(&mut self, timeframe: usize, seeds: &[usize], tags: &[Tag]) -> Result<Vec<usize>, ErrorKind> {
        for seed in seeds {
            self.check_node(*seed)?;
        }
        let circuit = self.circuit.clone();
        Ok(self.timeframe_mut(timeframe)?.tag_output_cone(&circuit, seeds, tags))
    }

    fn check_node(&self, node: usize) -> Result<(), ErrorKind> {
        match node < self.circuit.node_count() {
            true => Ok(()),
            false => Err(err::PreconditionError::NodeOutOfRange { node }.into()),
        }
    }
}

/// Containers.
impl<P: PinData> GeneratorContext<P> {
    /// The container of tag `T` at a port of a node.
    ///
    /// An unset container is returned if nothing is known about the port.
    pub fn get_container<T: ContainerTag<P>>(
        &mut self,
        timeframe: usize,
        node: usize,
        port: Port,
        allow: AllowOverride,
    ) -> Result<T::Container, ErrorKind> {
        self.check_node(node)?;
        let index = self.stored_timeframe(timeframe)?;

        if allow == AllowOverride::Enable {
            if let Some(container) = T::overrides(&self.overrides).get(&(index, node, port)) {
                return Ok(*container);
            }
        }

        if port.port_type == PortType::Input {
            let Some(driver) = self.circuit.node(node).input(port.number) else {
                return Err(err::ConfigurationError::UnconnectedPin {
                    node,
                    port: port.number,
                    tag: T::TAG,
                    timeframe,
                }
                .into());
            };
            return self.get_container::<T>(timeframe, driver, Port::output(), allow);
        }

        let frame = &self.timeframes[index];
        if frame.has_tag(node, T::TAG) {
            if let Some(container) = T::slot(frame.slot(node)) {
                return Ok(*container);
            }
        }

        match T::fallback(self, index, node, allow)? {
            Some(container) => Ok(container),
            None => Ok(T::Container::default()),
        }
    }

    /// The container of tag `T` at a port of a node, reading overrides, which must be set.
    pub fn require_container<T: ContainerTag<P>>(
        &mut self,
        timeframe: usize,
        node: usize,
        port: Port,
    ) -> Result<T::Container, ErrorKind> {
        self.require_container_with::<T>(timeframe, node, port, AllowOverride::Enable)
    }

    /// As [require_container](GeneratorContext::require_container), with a choice on overrides.
    pub fn require_container_with<T: ContainerTag<P>>(
        &mut self,
        timeframe: usize,
        node: usize,
        port: Port,
        allow: AllowOverride,
    ) -> Result<T::Container, ErrorKind> {
        let container = self.get_container::<T>(timeframe, node, port, allow)?;
        match container.is_set() {
            true => Ok(container),
            false => Err(err::PreconditionError::UnsetContainer {
                node,
                tag: T::TAG,
                timeframe,
            }
            .into()),
        }
    }

    /// The container stored in the slot of a node, ignoring tags, overrides, and fallbacks.
    pub fn internal_container<T: ContainerTag<P>>(&self, timeframe: usize, node: usize) -> Option<T::Container> {
        let frame = self.timeframe(timeframe).ok()?;
        if node >= frame.node_count() {
            return None;
        }
        T::slot(frame.slot(node)).copied().filter(|container| container.is_set())
    }

    /// Mutable access to the slot of a node, for tags with a slot.
    pub fn internal_container_mut<T: ContainerTag<P>>(
        &mut self,
        timeframe: usize,
        node: usize,
    ) -> Result<Option<&mut T::Container>, ErrorKind> {
        self.check_node(node)?;
        let frame = self.timeframe_mut(timeframe)?;
        Ok(T::slot_mut(frame.slot_mut(node)))
    }

    /// Stores `container` in the slot of a node.
    pub fn set_internal_container<T: ContainerTag<P>>(
        &mut self,
        timeframe: usize,
        node: usize,
        container: T::Container,
    ) -> Result<(), ErrorKind> {
        if let Some(slot) = self.internal_container_mut::<T>(timeframe, node)? {
            *slot = container;
        } else {
            log::warn!(target: targets::GENERATOR, "Tag {} has no slot, container of node {node} dropped", T::TAG);
        }
        Ok(())
    }

    /// Overrides the container of tag `T` read at a port of a node.
    pub fn set_override<T: ContainerTag<P>>(
        &mut self,
        timeframe: usize,
        node: usize,
        port: Port,
        container: T::Container,
    ) -> Result<(), ErrorKind> {
        self.check_node(node)?;
        let index = self.stored_timeframe(timeframe)?;
        log::trace!(target: targets::GENERATOR, "Override {} at {port} of node {node}, timeframe {timeframe}", T::TAG);
        T::overrides_mut(&mut self.overrides).insert((index, node, port), container);
        Ok(())
    }

    pub fn override_of<T: ContainerTag<P>>(&self, timeframe: usize, node: usize, port: Port) -> Option<T::Container> {
        let index = self.stored_timeframe(timeframe).ok()?;
        T::overrides(&self.overrides).get(&(index, node, port)).copied()
    }

    pub fn clear_overrides(&mut self) {
        self.overrides.clear();
    }
}

/// Records and solving.
impl<P: PinData> GeneratorContext<P> {
    pub fn record(&mut self, key: RecordKey, container: Container01) {
        self.records.insert(key, container);
    }

    pub fn record_of(&self, key: RecordKey) -> Option<Container01> {
        self.records.get(&key).copied()
    }

    /// Notes the encoding as unsatisfiable, such that a solve returns without calling the back end.
    pub fn mark_unsatisfiable(&mut self, reason: &str) {
        log::info!(target: targets::GENERATOR, "Trivially unsatisfiable: {reason}");
        self.trivially_unsatisfiable = true;
    }

    pub fn is_trivially_unsatisfiable(&self) -> bool {
        self.trivially_unsatisfiable
    }

    /// Solves the encoding.
    ///
    /// An error noted by the encoder is returned in place of a result.
    pub fn solve(&mut self) -> Result<SolverResult, ErrorKind> {
        if let Some(error) = self.encoder.take_error() {
            return Err(error.into());
        }
        self.transition(AttemptState::SolverInvoked)?;

        let result = match self.trivially_unsatisfiable {
            true => SolverResult::Unsatisfiable,
            false => {
                self.encoder.set_timeout(self.config.time_limit());
                self.encoder.solve()
            }
        };

        if let Some(error) = self.encoder.take_error() {
            return Err(error.into());
        }

        self.transition(match result {
            SolverResult::Satisfiable => AttemptState::Satisfiable,
            SolverResult::Unsatisfiable => AttemptState::Unsatisfiable,
            SolverResult::Unknown => AttemptState::Unknown,
        })?;
        log::info!(target: targets::GENERATOR, "Solve: {result}");
        Ok(result)
    }
}

#[cfg(test)]
mod context_tests {
    use super::*;
    use crate::{
        circuit::{CellType, CircuitBuilder},
        generator::tag::{BadTag, DiffTag, GoodTag, PinDataGB},
        structures::{container::Container01X, logic::Logic},
    };

    type Data = PinDataGB<Container01X, Container01X>;

    fn context(kind: BackendKind) -> GeneratorContext<Data> {
        let mut builder = CircuitBuilder::default();
        let a = builder.add_node("a", CellType::PIn, &[]).unwrap();
        let buf = builder.add_node("buf", CellType::Buf, &[Some(a)]).unwrap();
        builder.add_node("out", CellType::POut, &[Some(buf)]).unwrap();
        GeneratorContext::new(builder.build().unwrap(), kind, &Config::default())
    }

    #[test]
    fn state_order() {
        let mut context = context(BackendKind::Sat);
        assert!(context.transition(AttemptState::Encoded).is_err());
        assert!(context.solve().is_err());
        context.set_number_of_timeframes(2).unwrap();
        assert_eq!(context.state(), AttemptState::TimeframesAllocated);
        assert!(context.transition(AttemptState::SolverInvoked).is_err());
    }

    #[test]
    fn timeframe_counts() {
        let mut context = context(BackendKind::Sat);
        assert_eq!(context.set_number_of_timeframes(0), Err(err::PreconditionError::NoTimeframes.into()));
        context.set_number_of_timeframes(3).unwrap();
        assert_eq!(context.number_of_timeframes(GenerationTarget::CircuitEncoding), 3);
        assert!(context.timeframe(3).is_err());

        let mut context = self::context(BackendKind::Bmc);
        context.set_number_of_timeframes(3).unwrap();
        assert_eq!(context.number_of_timeframes(GenerationTarget::CircuitEncoding), 1);
        assert_eq!(context.number_of_timeframes(GenerationTarget::PatternExtraction), 3);
        assert_eq!(context.timeframe(2).unwrap().id(), 0);
    }

    #[test]
    fn resolution_order() {
        let mut context = context(BackendKind::Sat);
        context.set_number_of_timeframes(1).unwrap();

        assert!(!context
            .get_container::<GoodTag>(0, 1, Port::output(), AllowOverride::Enable)
            .unwrap()
            .is_set());

        let a: Container01X = context.encoder_mut().new_container();
        context.add_tag(0, 0, Tag::Good).unwrap();
        context.set_internal_container::<GoodTag>(0, 0, a).unwrap();

        // Input ports follow the driver.
        let read = context.require_container::<GoodTag>(0, 1, Port::input(0)).unwrap();
        assert_eq!(read, a);

        // Overrides take priority, when allowed.
        let one: Container01X = context.encoder_mut().new_constant(Logic::One);
        context.set_override::<GoodTag>(0, 1, Port::input(0), one).unwrap();
        assert_eq!(context.require_container::<GoodTag>(0, 1, Port::input(0)).unwrap(), one);
        assert_eq!(
            context
                .require_container_with::<GoodTag>(0, 1, Port::input(0), AllowOverride::Disable)
                .unwrap(),
            a
        );

        // The bad value of a node with only the good tag is the good value.
        assert_eq!(context.require_container::<BadTag>(0, 0, Port::output()).unwrap(), a);

        // With equal good and bad values, there is no difference.
        let diff = context.require_container::<DiffTag>(0, 0, Port::output()).unwrap();
        assert_eq!(context.encoder().constant_value(&diff), Some(Logic::Zero));
    }

    #[test]
    fn unset_and_unconnected() {
        let mut builder = CircuitBuilder::default();
        builder.add_node("and", CellType::And, &[None, None]).unwrap();
        let mut context =
            GeneratorContext::<Data>::new(builder.build().unwrap(), BackendKind::Sat, &Config::default());
        context.set_number_of_timeframes(1).unwrap();

        assert_eq!(
            context.require_container::<GoodTag>(0, 0, Port::output()),
            Err(err::PreconditionError::UnsetContainer {
                node: 0,
                tag: Tag::Good,
                timeframe: 0
            }
            .into())
        );
        assert_eq!(
            context.require_container::<GoodTag>(0, 0, Port::input(1)),
            Err(err::ConfigurationError::UnconnectedPin {
                node: 0,
                port: 1,
                tag: Tag::Good,
                timeframe: 0
            }
            .into())
        );
    }
}
