use crate::{
    encoder::LogicEncoder,
    generator::{
        fault::{combine, model::FaultSite, require_condition, SensitizationMode, TimeframeMode, TransitionDelay, TransitionKind},
        overrides::RecordKey,
        tag::{BadTag, DiffTag, GoodTag, PinData, Tag},
        AllowOverride, GenerationTarget, GeneratorContext, GeneratorModule, Phase,
    },
    misc::log::targets::{self},
    solver::BackendKind,
    structures::{
        container::{Container01, LogicContainer},
        logic::Logic,
    },
    types::err::ErrorKind,
};

/// Injects transition delay faults.
///
/// The activation of a fault on a timeframe is the transition of the good value at the site from the previous timeframe.
/// While active, the bad value at the site keeps the value before the transition, which is the negation of the value after.
///
/// There is no previous timeframe to the first, and so no activation.
/// With a bounded model checking back end the previous good value is held in a latch, alongside a latch marking the first step.
pub struct TransitionDelayFaultEncoder {
    faults: Vec<TransitionDelay>,
}

impl TransitionDelayFaultEncoder {
    pub fn new(faults: Vec<TransitionDelay>) -> Self {
        TransitionDelayFaultEncoder { faults }
    }

    pub fn faults(&self) -> &[TransitionDelay] {
        &self.faults
    }
}

/// Detects the transition of `kind` from `previous` to `now`.
fn transition_detector<C: LogicContainer>(encoder: &mut LogicEncoder, kind: TransitionKind, previous: &C, now: &C) -> Container01 {
    let (from, to) = match kind {
        TransitionKind::SlowToRise => (Logic::Zero, Logic::One),
        TransitionKind::SlowToFall => (Logic::One, Logic::Zero),
        TransitionKind::SlowToTransition => return encoder.difference_01_detector(previous, now),
    };
    let was = encoder.value_detector(previous, from);
    let is = encoder.value_detector(now, to);
    encoder.encode_and2(&was, &is)
}

impl<P: PinData> GeneratorModule<P> for TransitionDelayFaultEncoder {
    fn name(&self) -> &'static str {
        "transition-delay-fault-encoder"
    }

    fn phase(&self) -> Phase {
        Phase::FaultInjection
    }

    fn pre_encode_circuit(&self, context: &mut GeneratorContext<P>) -> Result<(), ErrorKind> {
        for fault in &self.faults {
            fault.validate(context.circuit())?;
        }
        Ok(())
    }

    fn encode_node(&self, context: &mut GeneratorContext<P>, timeframe: usize, node: usize) -> Result<(), ErrorKind> {
        let circuit = context.circuit_handle();
        for (index, fault) in self.faults.iter().enumerate() {
            if fault.source_node(&circuit) != Some(node) || !context.has_tag(timeframe, fault.node, Tag::FaultLocation) {
                continue;
            }
            let now = context.require_container::<GoodTag>(timeframe, fault.node, fault.port)?;

            let activation = match context.backend_kind() {
                BackendKind::Sat => match timeframe.checked_sub(1) {
                    None => context.encoder_mut().new_constant::<Container01>(Logic::Zero),
                    Some(previous) => {
                        let before = context.require_container::<GoodTag>(previous, fault.node, fault.port)?;
                        transition_detector(context.encoder_mut(), fault.kind, &before, &now)
                    }
                },

                BackendKind::Bmc => {
                    let encoder = context.encoder_mut();
                    let before: P::Good = encoder.new_state_container();
                    encoder.encode_next_state(&before, &now);

                    let valid: Container01 = encoder.new_state_container();
                    encoder.encode_initial_state_value(&valid, Logic::Zero);
                    let one = encoder.new_constant(Logic::One);
                    encoder.encode_next_state(&valid, &one);

                    let detected = transition_detector(encoder, fault.kind, &before, &now);
                    encoder.encode_and2(&valid, &detected)
                }
            };
            context.record(RecordKey::TransitionActivation { fault: index, timeframe }, activation);

            let base = context.require_container_with::<BadTag>(timeframe, fault.node, fault.port, AllowOverride::Disable)?;
            let encoder = context.encoder_mut();
            let select: P::Bad = encoder.convert(&activation);
            let bad = encoder.encode_multiplexer(&base, &base.negate(), &select);
            let as_good: P::Good = encoder.convert(&bad);
            let difference = encoder.difference_01_detector(&now, &as_good);

            log::debug!(target: targets::FAULT, "Injecting {fault} in timeframe {timeframe}");
            context.set_override::<BadTag>(timeframe, fault.node, fault.port, bad)?;
            context.set_override::<DiffTag>(timeframe, fault.node, fault.port, difference)?;
        }
        Ok(())
    }
}

/// Requires the activation of transition delay faults, as recorded by a [TransitionDelayFaultEncoder] over the same faults.
pub struct TransitionSensitizationConstraintEncoder {
    faults: usize,
    mode: SensitizationMode,
    timeframe_mode: TimeframeMode,
    allow_empty: bool,
}

impl TransitionSensitizationConstraintEncoder {
    pub fn new(faults: &[TransitionDelay], mode: SensitizationMode, timeframe_mode: TimeframeMode, allow_empty: bool) -> Self {
        TransitionSensitizationConstraintEncoder {
            faults: faults.len(),
            mode,
            timeframe_mode,
            allow_empty,
        }
    }
}

impl<P: PinData> GeneratorModule<P> for TransitionSensitizationConstraintEncoder {
    fn name(&self) -> &'static str {
        "transition-sensitization-constraint-encoder"
    }

    fn phase(&self) -> Phase {
        Phase::Constraint
    }

    fn constrain_timeframe(&self, context: &mut GeneratorContext<P>, timeframe: usize) -> Result<(), ErrorKind> {
        let activations: Vec<Container01> = (0..self.faults)
            .filter_map(|fault| context.record_of(RecordKey::TransitionActivation { fault, timeframe }))
            .collect();
        if let Some(condition) = combine(context, &activations, self.mode) {
            context.record(RecordKey::Sensitization { timeframe }, condition);
        }
        Ok(())
    }

    fn constrain_circuit(&self, context: &mut GeneratorContext<P>) -> Result<(), ErrorKind> {
        let timeframes = context.number_of_timeframes(GenerationTarget::ConstraintEncoding);
        let per_timeframe = (0..timeframes)
            .map(|timeframe| context.record_of(RecordKey::Sensitization { timeframe }))
            .collect();
        require_condition(context, per_timeframe, self.timeframe_mode, self.allow_empty, "activation")
    }
}
