/*!
Relations between states of sequential elements.

For a bounded model checking back end the state of a sequential element is a [latch](crate::solver::bmc::VariableKind::Latch) container, and the value the element takes on the next step is some container of the current step.
[encode_next_state](LogicEncoder::encode_next_state) relates the two, with the state on timeframe `1` and the next value on timeframe `0`:

| Domain | Relation |
|--------|----------|
| `01`, `01X`, `U01X` | each literal of the state equals the literal of the next value |
| `01F` | each literal of the state implies the literal of the next value, so the state is the next value or don't-care |
| `U01F` | as `01F`, and the state is unknown when the next value is unknown |

For a satisfiability back end there is a single formula over every timeframe, and the next state relation is a buffer.
*/

use crate::{
    encoder::LogicEncoder,
    misc::log::targets::{self},
    solver::{
        bmc::{ClauseKind, VariableKind},
        BackendKind,
    },
    structures::{
        container::{Domain, LogicContainer},
        logic::Logic,
    },
};

impl LogicEncoder {
    /// Relates the `state` of a sequential element on the next step to the value `next` of the current step.
    pub fn encode_next_state<C: LogicContainer>(&mut self, state: &C, next: &C) {
        if self.backend_kind() == BackendKind::Sat {
            self.encode_buffer_into(next, state);
            return;
        }

        log::trace!(target: targets::ENCODER, "Next state {state:?} from {next:?}");

        self.with_bmc_target(ClauseKind::Transition, VariableKind::Auxiliary, |encoder| {
            let states = state.active_literals();
            let nexts = next.active_literals();

            match C::DOMAIN {
                Domain::L01 | Domain::L01X | Domain::LU01X => {
                    for (s, n) in states.iter().zip(&nexts) {
                        encoder.commit_timeframe_clause(&[(-*n, 0), (*s, 1)]);
                        encoder.commit_timeframe_clause(&[(*n, 0), (-*s, 1)]);
                    }
                }

                Domain::L01F => {
                    for (s, n) in states.iter().zip(&nexts) {
                        encoder.commit_timeframe_clause(&[(*n, 0), (-*s, 1)]);
                    }
                }

                Domain::LU01F => {
                    for (s, n) in states.iter().zip(&nexts) {
                        encoder.commit_timeframe_clause(&[(-*n, 0), (*s, 1)]);
                    }
                    for s in &states {
                        encoder.commit_timeframe_clause(&[(nexts[0], 0), (nexts[1], 0), (-*s, 1)]);
                    }
                }
            }
        });
    }

    /// Constrains the value of `container` on the initial step.
    ///
    /// For a satisfiability back end, this is the value of the container.
    pub fn encode_initial_state_value<C: LogicContainer>(&mut self, container: &C, value: Logic) {
        self.with_bmc_target(ClauseKind::Initial, VariableKind::Auxiliary, |encoder| {
            encoder.encode_value(container, value)
        });
    }

    /// Constrains the value of `container` on the step to be reached.
    ///
    /// For a satisfiability back end, this is the value of the container.
    pub fn encode_target_state_value<C: LogicContainer>(&mut self, container: &C, value: Logic) {
        self.with_bmc_target(ClauseKind::Target, VariableKind::Auxiliary, |encoder| {
            encoder.encode_value(container, value)
        });
    }
}
