use std::marker::PhantomData;

use crate::{
    circuit::Port,
    generator::{
        constraint::ConstraintTarget,
        fault::{require_condition, TimeframeMode},
        overrides::RecordKey,
        tag::{ContainerTag, PinData, Tag},
        GenerationTarget, GeneratorContext, GeneratorModule, Phase,
    },
    structures::{container::LogicContainer, logic::LogicConstraint},
    types::err::ErrorKind,
};

/// Requires the net at a port of a node to meet a constraint, in the copy of `T`, on [any or the last](TimeframeMode) timeframe.
pub struct NetSensitizationConstraintEncoder<T> {
    node: usize,
    port: Port,
    constraint: LogicConstraint,
    timeframe_mode: TimeframeMode,
    target: ConstraintTarget,
    tag: PhantomData<T>,
}

impl<T> NetSensitizationConstraintEncoder<T> {
    pub fn new(node: usize, port: Port, constraint: LogicConstraint, timeframe_mode: TimeframeMode) -> Self {
        NetSensitizationConstraintEncoder {
            node,
            port,
            constraint,
            timeframe_mode,
            target: ConstraintTarget::default(),
            tag: PhantomData,
        }
    }

    pub fn with_target(mut self, target: ConstraintTarget) -> Self {
        self.target = target;
        self
    }
}

impl<P: PinData, T: ContainerTag<P>> GeneratorModule<P> for NetSensitizationConstraintEncoder<T> {
    fn name(&self) -> &'static str {
        "net-sensitization-constraint-encoder"
    }

    fn phase(&self) -> Phase {
        Phase::Constraint
    }

    fn constrain_timeframe(&self, context: &mut GeneratorContext<P>, timeframe: usize) -> Result<(), ErrorKind> {
        let container = context.get_container::<T>(timeframe, self.node, self.port, self.target.allow_override())?;
        if !container.is_set() {
            return Ok(());
        }
        let detector = context.encoder_mut().constraint_detector(&container, self.constraint);
        context.record(self.key(T::TAG, timeframe), detector);
        Ok(())
    }

    fn constrain_circuit(&self, context: &mut GeneratorContext<P>) -> Result<(), ErrorKind> {
        let timeframes = context.number_of_timeframes(GenerationTarget::ConstraintEncoding);
        let per_timeframe = (0..timeframes)
            .map(|timeframe| context.record_of(self.key(T::TAG, timeframe)))
            .collect();
        require_condition(context, per_timeframe, self.timeframe_mode, false, "net sensitization")
    }
}

impl<T> NetSensitizationConstraintEncoder<T> {
    fn key(&self, tag: Tag, timeframe: usize) -> RecordKey {
        RecordKey::NetSensitization {
            tag,
            node: self.node,
            port: self.port,
            timeframe,
        }
    }
}
