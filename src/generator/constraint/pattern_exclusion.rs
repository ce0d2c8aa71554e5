use std::marker::PhantomData;

use crate::{
    circuit::Port,
    generator::{
        constraint::step_indicators,
        extract::TestPattern,
        tag::{ContainerTag, PinData},
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

/// Requires the inputs of the copy of `T` to differ from each of a list of patterns.
///
/// A pattern matches when every input with a value of zero or one in the pattern has that value, so don't-care values match anything.
/// A pattern with no such value matches every assignment, and excluding it leaves the attempt unsatisfiable.
///
/// With a satisfiability back end, a pattern with more timeframes than the attempt is ignored.
/// With a bounded model checking back end, a mismatch on any step of the run up to the target excludes the pattern, and the steps past the end of a pattern are ignored.
pub struct PatternExclusionConstraintEncoder<T> {
    patterns: Vec<TestPattern>,
    tag: PhantomData<T>,
}

impl<T> PatternExclusionConstraintEncoder<T> {
    pub fn new(patterns: Vec<TestPattern>) -> Self {
        PatternExclusionConstraintEncoder {
            patterns,
            tag: PhantomData,
        }
    }

    pub fn patterns(&self) -> &[TestPattern] {
        &self.patterns
    }
}

/// Detectors for each value of zero or one of `pattern` on `timeframe`, read from the copy of `T` on `stored`.
fn matches<P: PinData, T: ContainerTag<P>>(
    context: &mut GeneratorContext<P>,
    pattern: &TestPattern,
    timeframe: usize,
    stored: usize,
) -> Result<Vec<Container01>, ErrorKind> {
    let circuit = context.circuit_handle();
    let inputs = circuit
        .primary_inputs()
        .iter()
        .zip(pattern.primary_inputs(timeframe))
        .chain(circuit.secondary_inputs().iter().zip(pattern.secondary_inputs(timeframe)));

    let mut detectors = Vec::default();
    for (node, value) in inputs {
        if !value.is_known() || !context.has_tag(stored, *node, T::TAG) {
            continue;
        }
        let container = context.get_container::<T>(stored, *node, Port::output(), AllowOverride::Disable)?;
        if container.is_set() {
            detectors.push(context.encoder_mut().value_detector(&container, *value));
        }
    }
    Ok(detectors)
}

impl<P: PinData, T: ContainerTag<P>> GeneratorModule<P> for PatternExclusionConstraintEncoder<T> {
    fn name(&self) -> &'static str {
        "pattern-exclusion-constraint-encoder"
    }

    fn phase(&self) -> Phase {
        Phase::Constraint
    }

    fn constrain_circuit(&self, context: &mut GeneratorContext<P>) -> Result<(), ErrorKind> {
        let requested = context.number_of_timeframes(GenerationTarget::PatternExtraction);

        for (index, pattern) in self.patterns.iter().enumerate() {
            match context.backend_kind() {
                BackendKind::Sat => {
                    if pattern.timeframes() > requested {
                        log::debug!(target: targets::CONSTRAINT, "Pattern {index} has more than {requested} timeframes, ignored");
                        continue;
                    }
                    let mut detectors = Vec::default();
                    for timeframe in 0..pattern.timeframes() {
                        detectors.extend(matches::<P, T>(context, pattern, timeframe, timeframe)?);
                    }
                    if detectors.is_empty() {
                        context.mark_unsatisfiable(&format!("pattern {index} matches every assignment"));
                        return Ok(());
                    }
                    let encoder = context.encoder_mut();
                    let matched = encoder.encode_and(&detectors);
                    encoder.encode_value(&matched, Logic::Zero);
                }

                BackendKind::Bmc => {
                    let indicators = step_indicators(context, pattern.timeframes());
                    let mut mismatches = Vec::default();
                    for (step, indicator) in indicators.iter().enumerate() {
                        let detectors = matches::<P, T>(context, pattern, step, 0)?;
                        if detectors.is_empty() {
                            continue;
                        }
                        let encoder = context.encoder_mut();
                        let matched = encoder.encode_and(&detectors);
                        mismatches.push(encoder.encode_and2(indicator, &matched.negate()));
                    }
                    if mismatches.is_empty() {
                        context.mark_unsatisfiable(&format!("pattern {index} matches every assignment"));
                        return Ok(());
                    }

                    let encoder = context.encoder_mut();
                    let mismatch = encoder.encode_or(&mismatches);
                    let differs: Container01 = encoder.new_state_container();
                    encoder.encode_initial_state_value(&differs, Logic::Zero);
                    let differs_now = encoder.encode_or2(&differs, &mismatch);
                    encoder.encode_next_state(&differs, &differs_now);
                    encoder.encode_target_state_value(&differs_now, Logic::One);
                }
            }
            log::debug!(target: targets::CONSTRAINT, "Excluded pattern {index}");
        }
        Ok(())
    }
}
