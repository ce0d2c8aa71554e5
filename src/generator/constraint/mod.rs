/*!
Constraints on ports, nets, and patterns.

| Module | Purpose |
|--------|---------|
| [PortConstraintEncoder] | holds primary or secondary ports to given values |
| [PatternExclusionConstraintEncoder] | requires the inputs to differ from each of a list of patterns |
| [NetSensitizationConstraintEncoder] | requires a net to meet a constraint on some timeframe |

Each is a module of the [constraint](crate::generator::Phase::Constraint) phase, and may be registered alongside the fault constraints.

# Constraints per step

With a satisfiability back end each timeframe has its own containers, and a constraint on a timeframe is a constraint on those containers.

A bounded model checking back end stores a single timeframe, and a constraint which differs between steps is guarded by a [step indicator](step_indicators).
The indicators form a unary counter of latches: indicator `0` is one on the initial step, and each indicator takes the value of the one before it on the next step.
So, indicator `i` is one on step `i` only, and every indicator is zero on the steps after the last indicator.
*/

mod net;
mod pattern_exclusion;
mod port;

pub use net::NetSensitizationConstraintEncoder;
pub use pattern_exclusion::PatternExclusionConstraintEncoder;
pub use port::{PortConstraint, PortConstraintEncoder, PortKind, PortSelection};

use crate::{
    generator::{overrides::RecordKey, tag::PinData, AllowOverride, GeneratorContext},
    misc::log::targets::{self},
    solver::bmc::{ClauseKind, VariableKind},
    structures::{container::Container01, logic::Logic},
};

/// The copy of the circuit a constraint reads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ConstraintTarget {
    /// The values as given by the logic of the circuit, before any fault is injected.
    PreFaultModel,
    /// The values as read through the overrides of any injected fault.
    #[default]
    PostFaultModel,
}

impl ConstraintTarget {
    pub fn allow_override(&self) -> AllowOverride {
        match self {
            Self::PreFaultModel => AllowOverride::Disable,
            Self::PostFaultModel => AllowOverride::Enable,
        }
    }
}

/// The first `steps` step indicators, encoding any not yet recorded on the context.
///
/// Only meaningful with a bounded model checking back end.
pub(crate) fn step_indicators<P: PinData>(context: &mut GeneratorContext<P>, steps: usize) -> Vec<Container01> {
    let mut indicators: Vec<Container01> = Vec::with_capacity(steps);
    for step in 0..steps {
        if let Some(indicator) = context.record_of(RecordKey::StepIndicator { step }) {
            indicators.push(indicator);
            continue;
        }

        let previous = indicators.last().copied();
        let encoder = context.encoder_mut();
        let indicator: Container01 =
            encoder.with_bmc_target(ClauseKind::Transition, VariableKind::Latch, |encoder| encoder.new_container());
        encoder.encode_initial_state_value(&indicator, Logic::from_bool(step == 0));
        let next = match previous {
            Some(previous) => previous,
            None => encoder.new_constant(Logic::Zero),
        };
        encoder.encode_next_state(&indicator, &next);

        log::trace!(target: targets::CONSTRAINT, "Step indicator {step}: {indicator:?}");
        context.record(RecordKey::StepIndicator { step }, indicator);
        indicators.push(indicator);
    }
    indicators
}

#[cfg(test)]
mod step_indicator_tests {
    use super::*;
    use crate::{
        circuit::{CellType, CircuitBuilder},
        config::Config,
        generator::tag::PinDataG,
        solver::{BackendKind, SolverResult},
        structures::container::LogicContainer,
    };

    type Data = PinDataG<Container01>;

    fn context() -> GeneratorContext<Data> {
        let mut builder = CircuitBuilder::default();
        builder.add_node("a", CellType::PIn, &[]).unwrap();
        let mut context = GeneratorContext::new(builder.build().unwrap(), BackendKind::Bmc, &Config::default());
        context.set_number_of_timeframes(4).unwrap();
        context
    }

    fn reached_depth(context: &mut GeneratorContext<Data>, target: &Container01) -> Option<usize> {
        let encoder = context.encoder_mut();
        encoder.encode_target_state_value(target, Logic::One);
        match encoder.solve() {
            SolverResult::Satisfiable => encoder.backend().as_bmc().map(|bmc| bmc.last_depth()),
            _ => None,
        }
    }

    #[test]
    fn indicator_is_one_on_its_step() {
        for step in 0..3 {
            let mut context = context();
            let indicators = step_indicators(&mut context, 3);
            assert_eq!(reached_depth(&mut context, &indicators[step]), Some(step));
        }
    }

    #[test]
    fn indicators_are_recorded_once() {
        let mut context = context();
        let first = step_indicators(&mut context, 2);
        let more = step_indicators(&mut context, 3);
        assert_eq!(first[..], more[..2]);
        assert_eq!(context.record_of(RecordKey::StepIndicator { step: 2 }), Some(more[2]));
    }

    #[test]
    fn no_indicator_after_the_last_step() {
        let mut context = context();
        let indicators = step_indicators(&mut context, 2);
        let encoder = context.encoder_mut();
        let any = encoder.encode_or(&indicators);
        let after = any.negate();
        assert_eq!(reached_depth(&mut context, &after), Some(2));
    }
}
