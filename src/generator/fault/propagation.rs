use crate::{
    circuit::Port,
    generator::{
        fault::{require_condition, TimeframeMode},
        overrides::RecordKey,
        tag::{DiffTag, PinData, Tag},
        AllowOverride, GenerationTarget, GeneratorContext, GeneratorModule, Phase,
    },
    misc::log::targets::{self},
    structures::container::{Container01, LogicContainer},
    types::err::ErrorKind,
};

/// The outputs at which a fault effect is observed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PropagationTarget {
    #[default]
    PrimaryOutputsOnly,
    /// Secondary outputs, as observed by a scan chain.
    SecondaryOutputsOnly,
    Both,
}

impl PropagationTarget {
    fn primary(&self) -> bool {
        matches!(self, Self::PrimaryOutputsOnly | Self::Both)
    }

    fn secondary(&self) -> bool {
        matches!(self, Self::SecondaryOutputsOnly | Self::Both)
    }
}

/// Requires a difference at some output of the target.
///
/// On each timeframe, the differences at the primary and secondary outputs with the difference tag are recorded separately.
/// The condition of a timeframe is the disjunction of the records of the target.
#[derive(Default)]
pub struct FaultPropagationConstraintEncoder {
    target: PropagationTarget,
    timeframe_mode: TimeframeMode,
    allow_empty: bool,
}

impl FaultPropagationConstraintEncoder {
    pub fn new(target: PropagationTarget, timeframe_mode: TimeframeMode, allow_empty: bool) -> Self {
        FaultPropagationConstraintEncoder {
            target,
            timeframe_mode,
            allow_empty,
        }
    }

    pub fn target(&self) -> PropagationTarget {
        self.target
    }
}

/// The differences at those of `outputs` with the difference tag.
fn output_differences<P: PinData>(
    context: &mut GeneratorContext<P>,
    timeframe: usize,
    outputs: &[usize],
) -> Result<Vec<Container01>, ErrorKind> {
    let mut differences = Vec::default();
    for output in outputs {
        if !context.has_tag(timeframe, *output, Tag::Diff) {
            continue;
        }
        let difference = context.get_container::<DiffTag>(timeframe, *output, Port::output(), AllowOverride::Enable)?;
        if difference.is_set() {
            differences.push(difference);
        }
    }
    Ok(differences)
}

impl<P: PinData> GeneratorModule<P> for FaultPropagationConstraintEncoder {
    fn name(&self) -> &'static str {
        "fault-propagation-constraint-encoder"
    }

    fn phase(&self) -> Phase {
        Phase::Constraint
    }

    fn constrain_timeframe(&self, context: &mut GeneratorContext<P>, timeframe: usize) -> Result<(), ErrorKind> {
        let circuit = context.circuit_handle();

        let primary = output_differences(context, timeframe, circuit.primary_outputs())?;
        if !primary.is_empty() {
            let any = context.encoder_mut().encode_or(&primary);
            context.record(RecordKey::PrimaryPropagation { timeframe }, any);
        }

        let secondary = output_differences(context, timeframe, circuit.secondary_outputs())?;
        if !secondary.is_empty() {
            let any = context.encoder_mut().encode_or(&secondary);
            context.record(RecordKey::SecondaryPropagation { timeframe }, any);
        }

        log::trace!(
            target: targets::FAULT,
            "Timeframe {timeframe}: {} primary and {} secondary outputs may differ",
            primary.len(),
            secondary.len()
        );
        Ok(())
    }

    fn constrain_circuit(&self, context: &mut GeneratorContext<P>) -> Result<(), ErrorKind> {
        let timeframes = context.number_of_timeframes(GenerationTarget::ConstraintEncoding);
        let mut per_timeframe = Vec::with_capacity(timeframes);
        for timeframe in 0..timeframes {
            let mut records = Vec::default();
            if self.target.primary() {
                records.extend(context.record_of(RecordKey::PrimaryPropagation { timeframe }));
            }
            if self.target.secondary() {
                records.extend(context.record_of(RecordKey::SecondaryPropagation { timeframe }));
            }
            per_timeframe.push(match records.is_empty() {
                true => None,
                false => Some(context.encoder_mut().encode_or(&records)),
            });
        }
        require_condition(context, per_timeframe, self.timeframe_mode, self.allow_empty, "propagation")
    }
}
