use crate::{
    generator::{
        fault::{combine, model::FaultSite, require_condition, SensitizationMode, StuckAt, StuckAtKind, TimeframeMode},
        overrides::RecordKey,
        tag::{BadTag, DiffTag, GoodTag, PinData, Tag},
        AllowOverride, GenerationTarget, GeneratorContext, GeneratorModule, Phase,
    },
    misc::log::targets::{self},
    structures::{
        container::Container01,
        logic::{Logic, LogicConstraint},
    },
    types::err::ErrorKind,
};

/// Injects stuck-at faults.
///
/// On each timeframe, the bad value at each fault site is overridden by the stuck value, and the difference at the site by the difference of the good value and the stuck value.
pub struct StuckAtFaultEncoder {
    faults: Vec<StuckAt>,
}

impl StuckAtFaultEncoder {
    pub fn new(faults: Vec<StuckAt>) -> Self {
        StuckAtFaultEncoder { faults }
    }

    pub fn faults(&self) -> &[StuckAt] {
        &self.faults
    }
}

impl<P: PinData> GeneratorModule<P> for StuckAtFaultEncoder {
    fn name(&self) -> &'static str {
        "stuck-at-fault-encoder"
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

    fn pre_encode_timeframe(&self, context: &mut GeneratorContext<P>, timeframe: usize) -> Result<(), ErrorKind> {
        for fault in &self.faults {
            if !context.has_tag(timeframe, fault.node, Tag::FaultLocation) {
                continue;
            }
            let stuck: P::Bad = match fault.kind.value() {
                Some(value) => context.encoder_mut().new_constant(value),
                None => context.encoder_mut().new_container(),
            };
            log::debug!(target: targets::FAULT, "Injecting {fault} in timeframe {timeframe}");
            context.set_override::<BadTag>(timeframe, fault.node, fault.port, stuck)?;
        }
        Ok(())
    }

    /// The difference at a site is set once the good value of the site is encoded, and before any reader of the site is encoded.
    fn encode_node(&self, context: &mut GeneratorContext<P>, timeframe: usize, node: usize) -> Result<(), ErrorKind> {
        let circuit = context.circuit_handle();
        for fault in &self.faults {
            if fault.source_node(&circuit) != Some(node) || !context.has_tag(timeframe, fault.node, Tag::FaultLocation) {
                continue;
            }
            let good = context.require_container::<GoodTag>(timeframe, fault.node, fault.port)?;
            let bad = context.require_container::<BadTag>(timeframe, fault.node, fault.port)?;

            let encoder = context.encoder_mut();
            let bad: P::Good = encoder.convert(&bad);
            let difference = encoder.difference_01_detector(&good, &bad);
            context.set_override::<DiffTag>(timeframe, fault.node, fault.port, difference)?;
        }
        Ok(())
    }
}

/// Requires the good value at stuck-at fault sites to differ from the stuck value.
///
/// The value at a site is the bad value read without overrides, which is the good value unless some other fault lies upstream.
///
/// | Kind | Required value |
/// |------|----------------|
/// | `Zero` | one |
/// | `One` | zero |
/// | `DontCare`, `Unknown` | zero or one |
/// | `Free` | any |
pub struct StuckAtSensitizationConstraintEncoder {
    faults: Vec<StuckAt>,
    mode: SensitizationMode,
    timeframe_mode: TimeframeMode,
    allow_empty: bool,
}

impl StuckAtSensitizationConstraintEncoder {
    pub fn new(faults: Vec<StuckAt>, mode: SensitizationMode, timeframe_mode: TimeframeMode, allow_empty: bool) -> Self {
        StuckAtSensitizationConstraintEncoder {
            faults,
            mode,
            timeframe_mode,
            allow_empty,
        }
    }
}

impl<P: PinData> GeneratorModule<P> for StuckAtSensitizationConstraintEncoder {
    fn name(&self) -> &'static str {
        "stuck-at-sensitization-constraint-encoder"
    }

    fn phase(&self) -> Phase {
        Phase::Constraint
    }

    fn constrain_timeframe(&self, context: &mut GeneratorContext<P>, timeframe: usize) -> Result<(), ErrorKind> {
        let mut conditions: Vec<Container01> = Vec::default();
        for fault in &self.faults {
            if !context.has_tag(timeframe, fault.node, Tag::FaultLocation) {
                continue;
            }
            let value = context.require_container_with::<BadTag>(timeframe, fault.node, fault.port, AllowOverride::Disable)?;
            let encoder = context.encoder_mut();
            conditions.push(match fault.kind {
                StuckAtKind::Zero => encoder.value_detector(&value, Logic::One),
                StuckAtKind::One => encoder.value_detector(&value, Logic::Zero),
                StuckAtKind::DontCare | StuckAtKind::Unknown => encoder.constraint_detector(&value, LogicConstraint::Only01),
                StuckAtKind::Free => encoder.new_constant(Logic::One),
            });
        }

        if let Some(condition) = combine(context, &conditions, self.mode) {
            context.record(RecordKey::Sensitization { timeframe }, condition);
        }
        Ok(())
    }

    fn constrain_circuit(&self, context: &mut GeneratorContext<P>) -> Result<(), ErrorKind> {
        let timeframes = context.number_of_timeframes(GenerationTarget::ConstraintEncoding);
        let per_timeframe = (0..timeframes)
            .map(|timeframe| context.record_of(RecordKey::Sensitization { timeframe }))
            .collect();
        require_condition(context, per_timeframe, self.timeframe_mode, self.allow_empty, "sensitization")
    }
}
