/*!
The encoder, through which every literal and clause of an encoding passes.

The encoder owns a [solver back end](crate::solver::Backend), and offers operations over [containers](crate::structures::container):
- Fresh and constant containers, and [conversion](LogicEncoder::convert) between domains.
- Constraints on the value of a container, such as [encode_value](LogicEncoder::encode_value).
- [Gates](crate::encoder::gates), returning a container for the output of the gate.
- [Detectors](crate::encoder::detectors), returning a `01` container which is true exactly when some condition holds.
- [Sequential](crate::encoder::sequential) relations, for a bounded model checking back end.

Gates of the multi-valued domains are all built by a single [truth table generator](crate::encoder::table), with the value of the gate given as a function on [Logic] values.
Gates of the `01` domain use the usual Tseitin clauses.

# Constants

The constant literals of a solver are used for constant containers, and operations fold constants where the value of the result follows.
Encoding a value in a domain without the value degrades the value, with a warning:
- Don't-care and unknown become zero in the `01` domain.
- Unknown becomes don't-care in the `01X` and `01F` domains.

# Clauses

Committed clauses are simplified against the constant literals: a clause with the true literal is skipped, and false literals are removed.
Errors from the back end are noted rather than returned, and are [taken](LogicEncoder::take_error) by whatever drives the encoding.
*/

pub mod detectors;
pub mod gates;
pub mod sequential;
pub mod table;

use crate::{
    config::Config,
    misc::log::targets::{self},
    solver::{
        bmc::{ClauseKind, VariableKind},
        Backend, BackendKind, SolverResult, Value,
    },
    structures::{
        container::{Domain, LogicContainer},
        literal::{Literal, NEGATIVE, POSITIVE},
        logic::{Logic, LogicConstraint},
    },
    types::err::SolverError,
};

use table::Operand;

/// The encoder.
pub struct LogicEncoder {
    backend: Backend,

    /// The first error from the back end, if any.
    error: Option<SolverError>,

    /// Count of clauses committed, after simplification.
    committed: usize,
}

impl LogicEncoder {
    pub fn new(mut backend: Backend) -> Self {
        backend.proxy_mut().reset();
        LogicEncoder {
            backend,
            error: None,
            committed: 0,
        }
    }

    /// An encoder over a back end of the given kind, using the reference solver.
    pub fn from_config(kind: BackendKind, config: &Config) -> Self {
        Self::new(Backend::from_config(kind, config))
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut Backend {
        &mut self.backend
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// The count of clauses committed to the back end.
    pub fn committed_clauses(&self) -> usize {
        self.committed
    }

    /// Takes the first error noted from the back end, if any.
    pub fn take_error(&mut self) -> Option<SolverError> {
        self.error.take()
    }

    fn note_error(&mut self, error: SolverError) {
        log::error!(target: targets::ENCODER, "Back end error: {error:?}");
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    pub fn new_literal(&mut self) -> Literal {
        self.backend.proxy_mut().new_literal()
    }

    /// Commits the disjunction of `clause`, simplified against the constant literals.
    pub fn commit_clause(&mut self, clause: &[Literal]) {
        if clause.contains(&POSITIVE) {
            return;
        }
        let simplified: Vec<Literal> = clause
            .iter()
            .copied()
            .filter(|literal| *literal != NEGATIVE)
            .collect();

        match self.backend.proxy_mut().commit_clause(&simplified) {
            Ok(()) => self.committed += 1,
            Err(e) => self.note_error(e),
        }
    }

    /// Commits a clause whose literals are paired with a timeframe, to a bounded model checking back end.
    pub fn commit_timeframe_clause(&mut self, clause: &[(Literal, usize)]) {
        if clause.iter().any(|(literal, _)| *literal == POSITIVE) {
            return;
        }
        let simplified: Vec<(Literal, usize)> = clause
            .iter()
            .copied()
            .filter(|(literal, _)| *literal != NEGATIVE)
            .collect();

        let result = match self.backend.as_bmc_mut() {
            Some(bmc) => bmc.commit_timeframe_clause(&simplified),
            None => Err(SolverError::NotBmc),
        };
        match result {
            Ok(()) => self.committed += 1,
            Err(e) => self.note_error(e),
        }
    }

    /// Sets the kind of clauses and variables for a bounded model checking back end.
    ///
    /// Does nothing for other back ends.
    pub fn set_bmc_target(&mut self, clause_kind: ClauseKind, variable_kind: VariableKind) {
        if let Some(bmc) = self.backend.as_bmc_mut() {
            bmc.set_target(clause_kind, variable_kind);
        }
    }

    /// The kinds of clauses and variables of a bounded model checking back end.
    pub fn bmc_target(&self) -> Option<(ClauseKind, VariableKind)> {
        self.backend
            .as_bmc()
            .map(|bmc| (bmc.target_clause_kind(), bmc.target_variable_kind()))
    }

    /// Calls `f` with the bounded model checking target set as given, and restores the previous target after.
    pub fn with_bmc_target<R>(
        &mut self,
        clause_kind: ClauseKind,
        variable_kind: VariableKind,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let previous = self.bmc_target();
        self.set_bmc_target(clause_kind, variable_kind);
        let result = f(self);
        if let Some((clause_kind, variable_kind)) = previous {
            self.set_bmc_target(clause_kind, variable_kind);
        }
        result
    }

    pub fn solve(&mut self) -> SolverResult {
        self.backend.proxy_mut().solve()
    }

    pub fn set_timeout(&mut self, timeout: Option<std::time::Duration>) {
        self.backend.proxy_mut().set_timeout(timeout);
    }

    pub fn literal_value(&self, literal: Literal) -> Value {
        match literal {
            POSITIVE => Value::Positive,
            NEGATIVE => Value::Negative,
            _ => self.backend.proxy().literal_value(literal),
        }
    }
}

/// Containers and their values.
impl LogicEncoder {
    /// A container of fresh literals.
    ///
    /// Containers of the `01X` domains also receive the clause excluding the invalid `11` pattern.
    pub fn new_container<C: LogicContainer>(&mut self) -> C {
        let container = match C::DOMAIN.width() {
            1 => C::from_literals([self.new_literal(), Literal::default()]),
            _ => C::from_literals([self.new_literal(), self.new_literal()]),
        };
        if matches!(C::DOMAIN, Domain::L01X | Domain::L01F) {
            self.commit_clause(&[-container.l0(), -container.l1()]);
        }
        container
    }

    /// A container for the state of a sequential element.
    ///
    /// For a bounded model checking back end the literals of the container are latches.
    pub fn new_state_container<C: LogicContainer>(&mut self) -> C {
        match self.bmc_target() {
            Some((clause_kind, _)) => {
                self.with_bmc_target(clause_kind, VariableKind::Latch, |encoder| {
                    encoder.new_container()
                })
            }
            None => self.new_container(),
        }
    }

    /// The value used for `value` in the domain of `C`, noting any degradation.
    pub(crate) fn represent<C: LogicContainer>(&self, value: Logic) -> Logic {
        let represented = C::DOMAIN.represent(value);
        if represented != value {
            log::warn!(target: targets::ENCODER, "Value {value} degraded to {represented} in domain {}", C::DOMAIN);
        }
        represented
    }

    /// A container with the constant `value`, degraded if the domain lacks the value.
    pub fn new_constant<C: LogicContainer>(&mut self, value: Logic) -> C {
        let value = self.represent::<C>(value);
        Self::constant_of::<C>(value)
    }

    /// A constant container, for a value the domain has.
    pub(crate) fn constant_of<C: LogicContainer>(value: Logic) -> C {
        let (l0, l1) = C::DOMAIN.encode(value).unwrap_or((false, false));
        let literal = |bit: bool| match bit {
            true => POSITIVE,
            false => NEGATIVE,
        };
        C::from_literals([literal(l0), literal(l1)])
    }

    /// The value of the container, if each literal is constant.
    pub fn constant_value<C: LogicContainer>(&self, container: &C) -> Option<Logic> {
        let literals = container.literals();
        let bits: Vec<bool> = literals[..C::DOMAIN.width()]
            .iter()
            .map(|literal| match *literal {
                POSITIVE => Some(true),
                NEGATIVE => Some(false),
                _ => None,
            })
            .collect::<Option<Vec<bool>>>()?;
        C::DOMAIN.decode(bits[0], bits.get(1).copied().unwrap_or(false))
    }

    /// The value of the container on the last (satisfiable) solve.
    pub fn solved_value<C: LogicContainer>(&self, container: &C) -> Logic {
        if let Some(value) = self.constant_value(container) {
            return value;
        }

        let mut bits = [false; 2];
        for (index, literal) in container.active_literals().iter().enumerate() {
            match self.literal_value(*literal) {
                Value::Positive => bits[index] = true,
                Value::Negative => bits[index] = false,
                Value::DontCare | Value::Invalid => return Logic::DontCare,
            }
        }

        match C::DOMAIN.decode(bits[0], bits[1]) {
            Some(value) => value,
            None => {
                log::warn!(target: targets::ENCODER, "Invalid solved value for {container:?}");
                Logic::DontCare
            }
        }
    }

    /// The value of `source` in the domain of `C`, degraded where needed.
    pub fn convert<C: LogicContainer, S: LogicContainer>(&mut self, source: &S) -> C {
        if let Some(value) = self.constant_value(source) {
            return self.new_constant(value);
        }

        let [s0, s1] = source.literals();
        match (family(S::DOMAIN), family(C::DOMAIN)) {
            (from, to) if from == to => C::from_literals([s0, s1]),
            (Family::Binary, _) => C::from_literals([-s0, s0]),
            (Family::DontCare, Family::Binary) => C::from_literals([s1, Literal::default()]),
            (Family::DontCare, Family::Unknown) => C::from_literals([-s1, -s0]),
            _ => {
                let output = self.new_container::<C>();
                self.encode_table(&[Operand::of(source)], Operand::of(&output), |values| values[0]);
                output
            }
        }
    }

    /// Constrains the container to `value`, degraded if the domain lacks the value.
    pub fn encode_value<C: LogicContainer>(&mut self, container: &C, value: Logic) {
        let value = self.represent::<C>(value);
        let (l0, l1) = C::DOMAIN.encode(value).unwrap_or((false, false));
        let bits = [l0, l1];
        for (index, literal) in container.active_literals().iter().enumerate() {
            self.commit_clause(&[literal.conditional(!bits[index])]);
        }
    }

    /// Constrains the container to the values allowed by `constraint`.
    pub fn encode_constraint<C: LogicContainer>(&mut self, container: &C, constraint: LogicConstraint) {
        for value in C::DOMAIN.values() {
            if constraint.allows(*value) {
                continue;
            }
            let Some((l0, l1)) = C::DOMAIN.encode(*value) else {
                continue;
            };
            let bits = [l0, l1];
            let blocking: Vec<Literal> = container
                .active_literals()
                .iter()
                .enumerate()
                .map(|(index, literal)| literal.conditional(bits[index]))
                .collect();
            self.commit_clause(&blocking);
        }
    }
}

/// Groups of domains with the same values.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Family {
    Binary,
    DontCare,
    Unknown,
}

fn family(domain: Domain) -> Family {
    match domain {
        Domain::L01 => Family::Binary,
        Domain::L01X | Domain::L01F => Family::DontCare,
        Domain::LU01X | Domain::LU01F => Family::Unknown,
    }
}
