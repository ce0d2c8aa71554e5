/*!
Faults, and the modules injecting and constraining them.

A fault is injected by [overrides](crate::generator::overrides) at the fault site:
- The bad value read at the site is replaced by the faulty value.
- The difference read at the site is replaced by the difference of the good value and the faulty value.

The bad logic of the node at the site is left as it was, so the [difference chain](crate::generator::dchain) sees the site as the source of a difference.

| Module | Phase | Purpose |
|--------|-------|---------|
| [FaultCircuitTagger] | fault tagging | tags the cones of the fault sites |
| [StuckAtFaultEncoder] | fault injection | injects stuck-at faults |
| [TransitionDelayFaultEncoder] | fault injection | injects transition delay faults |
| [StuckAtSensitizationConstraintEncoder] | constraint | requires the good value at a stuck-at site to differ from the stuck value |
| [TransitionSensitizationConstraintEncoder] | constraint | requires the transition of a transition delay fault |
| [FaultPropagationConstraintEncoder] | constraint | requires a difference at an output |

Single and multiple fault models are both given as a list of faults.

# Circuit-level constraints

Constraint modules gather a condition for each timeframe, and then require the condition on [any](TimeframeMode::Any) or the [last](TimeframeMode::Last) timeframe.
A condition which is constant zero, or missing without the allow-empty flag, marks the attempt as unsatisfiable without a solve.

With a bounded model checking back end, a condition on any step accumulates in a latch with initial value zero, and the target is the latch (or the condition on the current step) being one.
*/

mod model;
mod propagation;
mod stuck_at;
mod tagger;
mod transition;

pub use model::{FaultSite, StuckAt, StuckAtKind, TransitionDelay, TransitionKind};
pub use propagation::{FaultPropagationConstraintEncoder, PropagationTarget};
pub use stuck_at::{StuckAtFaultEncoder, StuckAtSensitizationConstraintEncoder};
pub use tagger::{FaultCircuitTagger, StuckAtFaultCircuitTagger, TaggingMode, TransitionDelayFaultCircuitTagger};
pub use transition::{TransitionDelayFaultEncoder, TransitionSensitizationConstraintEncoder};

use crate::{
    generator::{tag::PinData, GeneratorContext},
    misc::log::targets::{self},
    solver::BackendKind,
    structures::{container::Container01, logic::Logic},
    types::err::ErrorKind,
};

/// How the conditions of multiple faults combine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SensitizationMode {
    /// Every fault.
    All,
    /// At least one fault.
    One,
}

/// The timeframes on which a condition is required.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TimeframeMode {
    #[default]
    Any,
    Last,
}

/// Combines the conditions of several faults by `mode`, or `None` if there are no conditions.
fn combine<P: PinData>(
    context: &mut GeneratorContext<P>,
    conditions: &[Container01],
    mode: SensitizationMode,
) -> Option<Container01> {
    if conditions.is_empty() {
        return None;
    }
    let encoder = context.encoder_mut();
    Some(match mode {
        SensitizationMode::All => encoder.encode_and(conditions),
        SensitizationMode::One => encoder.encode_or(conditions),
    })
}

/// Requires the condition of some timeframe, by `mode`.
///
/// `per_timeframe` holds the condition of each timeframe in order, if any.
pub(crate) fn require_condition<P: PinData>(
    context: &mut GeneratorContext<P>,
    per_timeframe: Vec<Option<Container01>>,
    mode: TimeframeMode,
    allow_empty: bool,
    name: &str,
) -> Result<(), ErrorKind> {
    let selected: Vec<Container01> = match mode {
        TimeframeMode::Any => per_timeframe.into_iter().flatten().collect(),
        TimeframeMode::Last => per_timeframe.last().copied().flatten().into_iter().collect(),
    };

    if selected.is_empty() {
        match allow_empty {
            true => log::debug!(target: targets::FAULT, "No {name} conditions, left unconstrained"),
            false => context.mark_unsatisfiable(&format!("no {name} conditions")),
        }
        return Ok(());
    }

    let encoder = context.encoder_mut();
    let condition = encoder.encode_or(&selected);
    if encoder.constant_value(&condition) == Some(Logic::Zero) {
        context.mark_unsatisfiable(&format!("{name} is impossible"));
        return Ok(());
    }

    match (encoder.backend_kind(), mode) {
        (BackendKind::Sat, _) => encoder.encode_value(&condition, Logic::One),

        (BackendKind::Bmc, TimeframeMode::Last) => encoder.encode_target_state_value(&condition, Logic::One),

        (BackendKind::Bmc, TimeframeMode::Any) => {
            let seen: Container01 = encoder.new_state_container();
            encoder.encode_initial_state_value(&seen, Logic::Zero);
            let seen_now = encoder.encode_or2(&seen, &condition);
            encoder.encode_next_state(&seen, &seen_now);
            encoder.encode_target_state_value(&seen_now, Logic::One);
        }
    }
    log::debug!(target: targets::FAULT, "Required {name} on {mode:?} timeframe");
    Ok(())
}
