/*!
Extraction of test patterns from a satisfiable attempt.

A [TestPattern] holds a value for each primary and secondary input on each timeframe, read from one copy of the circuit.
Only the values zero and one are read from the solver, and any other value, or an input without a container, is [don't-care](Logic::DontCare).

[extract_node_values] reads the value of every node in the same way, for inspecting a solution.

With a bounded model checking back end the pattern has a timeframe for each step up to the depth at which the target was reached, and values of each step are read from the single stored timeframe.
*/

use crate::{
    circuit::{Circuit, Port},
    generator::{
        tag::{ContainerTag, PinData},
        AllowOverride, AttemptState, GenerationTarget, GeneratorContext,
    },
    misc::log::targets::{self},
    structures::{container::LogicContainer, logic::Logic},
    types::err::{self, ErrorKind},
};

/// The inputs captured in a pattern.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum InputCapture {
    #[default]
    PrimaryInputsOnly,
    SecondaryInputsOnly,
    PrimaryAndSecondaryInputs,
    /// Primary inputs on every timeframe, and secondary inputs on the first timeframe only, as for a scan load followed by functional clocks.
    PrimaryAndInitialSecondaryInputs,
}

impl InputCapture {
    fn primary(&self) -> bool {
        !matches!(self, Self::SecondaryInputsOnly)
    }

    fn secondary(&self, timeframe: usize) -> bool {
        match self {
            Self::PrimaryInputsOnly => false,
            Self::SecondaryInputsOnly | Self::PrimaryAndSecondaryInputs => true,
            Self::PrimaryAndInitialSecondaryInputs => timeframe == 0,
        }
    }
}

/// Values of inputs, per timeframe.
///
/// Inputs are indexed by their position in [primary_inputs](Circuit::primary_inputs) and [secondary_inputs](Circuit::secondary_inputs).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestPattern {
    primary: Vec<Vec<Logic>>,
    secondary: Vec<Vec<Logic>>,
}

impl TestPattern {
    /// A pattern of don't-care values.
    pub fn new(timeframes: usize, primary_inputs: usize, secondary_inputs: usize) -> Self {
        TestPattern {
            primary: vec![vec![Logic::DontCare; primary_inputs]; timeframes],
            secondary: vec![vec![Logic::DontCare; secondary_inputs]; timeframes],
        }
    }

    pub fn timeframes(&self) -> usize {
        self.primary.len()
    }

    pub fn primary_inputs(&self, timeframe: usize) -> &[Logic] {
        &self.primary[timeframe]
    }

    pub fn secondary_inputs(&self, timeframe: usize) -> &[Logic] {
        &self.secondary[timeframe]
    }

    pub fn set_primary_input(&mut self, timeframe: usize, input: usize, value: Logic) {
        self.primary[timeframe][input] = value;
    }

    pub fn set_secondary_input(&mut self, timeframe: usize, input: usize, value: Logic) {
        self.secondary[timeframe][input] = value;
    }

    /// Whether every value of the pattern is don't-care.
    pub fn is_empty(&self) -> bool {
        self.primary
            .iter()
            .chain(&self.secondary)
            .flatten()
            .all(|value| *value == Logic::DontCare)
    }
}

/// One line per timeframe, with primary then secondary inputs.
impl std::fmt::Display for TestPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (timeframe, (primary, secondary)) in self.primary.iter().zip(&self.secondary).enumerate() {
            let primary: String = primary.iter().map(|value| value.as_char()).collect();
            let secondary: String = secondary.iter().map(|value| value.as_char()).collect();
            writeln!(f, "{timeframe}: {primary} | {secondary}")?;
        }
        Ok(())
    }
}

/// The value of the output of `node` in the copy of `T`, if zero or one.
fn read_value<P: PinData, T: ContainerTag<P>>(context: &GeneratorContext<P>, timeframe: usize, node: usize) -> Logic {
    if !context.has_tag(timeframe, node, T::TAG) {
        return Logic::DontCare;
    }
    match context.internal_container::<T>(timeframe, node) {
        Some(container) => match context.encoder().solved_value(&container) {
            value @ (Logic::Zero | Logic::One) => value,
            _ => Logic::DontCare,
        },
        None => Logic::DontCare,
    }
}

fn read_timeframe<P: PinData, T: ContainerTag<P>>(
    context: &GeneratorContext<P>,
    circuit: &Circuit,
    pattern: &mut TestPattern,
    capture: InputCapture,
    timeframe: usize,
    stored: usize,
) {
    if capture.primary() {
        for (index, input) in circuit.primary_inputs().iter().enumerate() {
            pattern.set_primary_input(timeframe, index, read_value::<P, T>(context, stored, *input));
        }
    }
    if capture.secondary(timeframe) {
        for (index, input) in circuit.secondary_inputs().iter().enumerate() {
            pattern.set_secondary_input(timeframe, index, read_value::<P, T>(context, stored, *input));
        }
    }
}

/// The number of steps of the solution, capped by the requested timeframes.
fn solved_steps<P: PinData>(context: &GeneratorContext<P>) -> Result<usize, ErrorKind> {
    if context.state() != AttemptState::Satisfiable {
        return Err(err::PreconditionError::UnsolvedAttempt { state: context.state() }.into());
    }
    let requested = context.number_of_timeframes(GenerationTarget::PatternExtraction);
    Ok(match context.encoder().backend().as_bmc() {
        Some(bmc) => (bmc.last_depth() + 1).min(requested),
        None => requested,
    })
}

/// Selects `step` of the solution for reading, returning the timeframe storing the step.
fn select_step<P: PinData>(context: &mut GeneratorContext<P>, step: usize) -> usize {
    match context.encoder_mut().backend_mut().as_bmc_mut() {
        Some(bmc) => {
            bmc.set_target_timeframe(step);
            0
        }
        None => step,
    }
}

/// Extracts the inputs given by `capture` from the copy of `T`, after a satisfiable solve.
pub fn extract_test_pattern<P: PinData, T: ContainerTag<P>>(
    context: &mut GeneratorContext<P>,
    capture: InputCapture,
) -> Result<TestPattern, ErrorKind> {
    let steps = solved_steps(context)?;
    let circuit = context.circuit_handle();
    let mut pattern = TestPattern::new(steps, circuit.primary_inputs().len(), circuit.secondary_inputs().len());

    for step in 0..steps {
        let stored = select_step(context, step);
        read_timeframe::<P, T>(context, &circuit, &mut pattern, capture, step, stored);
    }
    select_step(context, 0);

    log::info!(target: targets::EXTRACTION, "Extracted a pattern of {steps} timeframes");
    log::debug!(target: targets::EXTRACTION, "Pattern:\n{pattern}");
    Ok(pattern)
}

/// The value at the output of every node in the copy of `T`, on each timeframe of a satisfiable solve.
///
/// A node with no container in the copy has no value.
/// Other values are as solved, so a value may be don't-care where the solver left a literal free.
pub fn extract_node_values<P: PinData, T: ContainerTag<P>>(
    context: &mut GeneratorContext<P>,
) -> Result<Vec<Vec<Option<Logic>>>, ErrorKind> {
    let steps = solved_steps(context)?;
    let nodes = context.circuit().node_count();
    let mut values = vec![vec![None; nodes]; steps];

    for (step, row) in values.iter_mut().enumerate() {
        let stored = select_step(context, step);
        for (node, value) in row.iter_mut().enumerate() {
            let container = context.get_container::<T>(stored, node, Port::output(), AllowOverride::Disable)?;
            if container.is_set() {
                *value = Some(context.encoder().solved_value(&container));
            }
        }
    }
    select_step(context, 0);

    log::debug!(target: targets::EXTRACTION, "Extracted the {} values of {nodes} nodes over {steps} timeframes", T::TAG);
    Ok(values)
}
