/*!
A bounded model checking back end.

The back end receives a transition system over a single timeframe, as three sets of clauses:
- [Initial](ClauseKind::Initial) clauses, holding of the first state.
- [Transition](ClauseKind::Transition) clauses, holding of every step.
- [Target](ClauseKind::Target) clauses, to be satisfied by some reachable step.

Each literal of a clause is paired with a timeframe, either `0` for the current step or `1` for the next step.
Only [latches](VariableKind::Latch) persist from one step to the next, and so only latches may appear at timeframe `1`.

# Unrolling

A solve unrolls the system to increasing depths, from zero up to the maximum depth, into a fresh [reference solver](crate::solver::sat::SatSolver) at each depth.
At depth `d`:
- The initial clauses are placed on step `0`.
- The transition clauses are placed on each step `k` from `0` to `d`, with timeframe `1` literals on step `k + 1`.
- The target clauses are placed on step `d`, guarded by an activation literal.

If the target is satisfiable at some depth the target is [reachable](BmcResult::Reachable), and values are read from a [chosen step](BmcSolverProxy::set_target_timeframe).
If the unrolling is unsatisfiable even without the target, no run of length `d` exists, and the target is [unreachable](BmcResult::Unreachable).

The constant true variable is a latch, so the constant literals may be used at either timeframe.
*/

use std::collections::HashMap;

use crate::{
    config::Config,
    misc::log::targets::{self},
    solver::{sat::SatSolver, SolverProxy, SolverResult, Value},
    structures::literal::{Literal, Variable, POSITIVE},
    types::err::SolverError,
};

/// The part of the transition system a clause belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClauseKind {
    Initial,
    Transition,
    Target,
}

/// The role of a variable in the transition system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VariableKind {
    Input,
    Output,
    Latch,
    Auxiliary,
}

/// The result of a bounded model checking solve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BmcResult {
    Unreachable,
    Reachable,
    Timeout,
    MaxIterationsReached,
}

impl From<BmcResult> for SolverResult {
    fn from(result: BmcResult) -> Self {
        match result {
            BmcResult::Reachable => SolverResult::Satisfiable,
            BmcResult::Unreachable => SolverResult::Unsatisfiable,
            BmcResult::Timeout | BmcResult::MaxIterationsReached => SolverResult::Unknown,
        }
    }
}

/// A clause whose literals are paired with a timeframe.
pub type TimeframeClause = Vec<(Literal, usize)>;

/// A bounded model checker over the [reference solver](SatSolver).
pub struct BmcSolverProxy {
    /// The kind of each variable, indexed by variable.
    variable_kinds: Vec<VariableKind>,

    initial: Vec<TimeframeClause>,
    transition: Vec<TimeframeClause>,
    target: Vec<TimeframeClause>,

    /// The kind given to clauses committed without an explicit kind.
    target_clause_kind: ClauseKind,

    /// The kind given to fresh variables.
    target_variable_kind: VariableKind,

    maximum_depth: usize,
    time_limit: Option<std::time::Duration>,
    config: Config,

    /// The unrolling of the last solve, with the engine literal of each (step, variable).
    engine: Option<SatSolver>,
    steps: Vec<HashMap<Variable, Literal>>,

    last_result: Option<BmcResult>,
    last_depth: usize,
    target_timeframe: usize,
}

impl Default for BmcSolverProxy {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl BmcSolverProxy {
    pub fn from_config(config: &Config) -> Self {
        let mut proxy = BmcSolverProxy {
            variable_kinds: Vec::default(),
            initial: Vec::default(),
            transition: Vec::default(),
            target: Vec::default(),
            target_clause_kind: ClauseKind::Transition,
            target_variable_kind: VariableKind::Auxiliary,
            maximum_depth: config.bmc_maximum_depth.value,
            time_limit: config.time_limit(),
            config: config.clone(),
            engine: None,
            steps: Vec::default(),
            last_result: None,
            last_depth: 0,
            target_timeframe: 0,
        };
        proxy.reset();
        proxy
    }

    /// Sets the kind of clauses committed through [SolverProxy::commit_clause], and of fresh variables.
    pub fn set_target(&mut self, clause_kind: ClauseKind, variable_kind: VariableKind) {
        self.target_clause_kind = clause_kind;
        self.target_variable_kind = variable_kind;
    }

    pub fn target_clause_kind(&self) -> ClauseKind {
        self.target_clause_kind
    }

    pub fn target_variable_kind(&self) -> VariableKind {
        self.target_variable_kind
    }

    pub fn variable_kind(&self, variable: Variable) -> Option<VariableKind> {
        self.variable_kinds.get(variable as usize).copied()
    }

    pub fn maximum_depth(&self) -> usize {
        self.maximum_depth
    }

    pub fn set_maximum_depth(&mut self, depth: usize) {
        self.maximum_depth = depth;
    }

    /// The result of the last solve, if any.
    pub fn last_result(&self) -> Option<BmcResult> {
        self.last_result
    }

    /// The depth of the last unrolling.
    pub fn last_depth(&self) -> usize {
        self.last_depth
    }

    /// Selects the step of the unrolling values are read from.
    pub fn set_target_timeframe(&mut self, timeframe: usize) {
        self.target_timeframe = timeframe;
    }

    pub fn clauses(&self, kind: ClauseKind) -> &[TimeframeClause] {
        match kind {
            ClauseKind::Initial => &self.initial,
            ClauseKind::Transition => &self.transition,
            ClauseKind::Target => &self.target,
        }
    }

    /// Adds a clause of the current target kind, with each literal on the paired timeframe.
    pub fn commit_timeframe_clause(&mut self, clause: &[(Literal, usize)]) -> Result<(), SolverError> {
        for (literal, timeframe) in clause {
            let kind = self
                .variable_kind(literal.variable())
                .filter(|_| literal.is_set())
                .ok_or(SolverError::UnknownVariable(literal.variable()))?;
            let valid = match timeframe {
                0 => true,
                1 => kind == VariableKind::Latch,
                _ => false,
            };
            if !valid {
                return Err(SolverError::InvalidTimeframeClause {
                    variable: literal.variable(),
                    timeframe: *timeframe,
                });
            }
        }

        let clause = clause.to_vec();
        match self.target_clause_kind {
            ClauseKind::Initial => self.initial.push(clause),
            ClauseKind::Transition => self.transition.push(clause),
            ClauseKind::Target => self.target.push(clause),
        }
        Ok(())
    }

    /// The engine literal of `literal` on `step`, allocating an engine variable if required.
    fn unrolled(
        engine: &mut SatSolver,
        steps: &mut Vec<HashMap<Variable, Literal>>,
        literal: Literal,
        step: usize,
    ) -> Literal {
        if literal.is_constant() {
            return literal;
        }
        while steps.len() <= step {
            steps.push(HashMap::default());
        }
        let base = *steps[step]
            .entry(literal.variable())
            .or_insert_with(|| engine.new_literal());
        base.conditional(literal.is_negated())
    }

    fn place(
        engine: &mut SatSolver,
        steps: &mut Vec<HashMap<Variable, Literal>>,
        clause: &[(Literal, usize)],
        step: usize,
        guard: Option<Literal>,
    ) -> Result<(), SolverError> {
        let mut unrolled: Vec<Literal> = clause
            .iter()
            .map(|(literal, timeframe)| Self::unrolled(engine, steps, *literal, step + timeframe))
            .collect();
        if let Some(guard) = guard {
            unrolled.push(-guard);
        }
        engine.commit_clause(&unrolled)
    }

    /// Unrolls the system to `depth`, returning the engine and the activation literal of the target.
    fn unroll(&self, depth: usize) -> Result<(SatSolver, Vec<HashMap<Variable, Literal>>, Literal), SolverError> {
        let mut engine = SatSolver::from_config(&self.config);
        let mut steps = Vec::default();

        for clause in &self.initial {
            Self::place(&mut engine, &mut steps, clause, 0, None)?;
        }
        for step in 0..=depth {
            for clause in &self.transition {
                Self::place(&mut engine, &mut steps, clause, step, None)?;
            }
        }
        let activation = engine.new_literal();
        for clause in &self.target {
            Self::place(&mut engine, &mut steps, clause, depth, Some(activation))?;
        }
        Ok((engine, steps, activation))
    }

    /// Searches for a run reaching the target, of length at most the maximum depth.
    pub fn solve_bmc(&mut self, assumptions: &[Literal]) -> Result<BmcResult, SolverError> {
        let start = std::time::Instant::now();
        self.engine = None;
        self.steps.clear();

        for depth in 0..=self.maximum_depth {
            let (mut engine, mut steps, activation) = self.unroll(depth)?;

            let mut literals = vec![activation];
            for assumption in assumptions {
                literals.push(Self::unrolled(&mut engine, &mut steps, *assumption, depth));
            }

            if let Some(limit) = self.time_limit {
                match limit.checked_sub(start.elapsed()) {
                    Some(remaining) => engine.set_timeout(Some(remaining)),
                    None => return Ok(self.conclude(BmcResult::Timeout, depth)),
                }
            }

            log::trace!(target: targets::BMC, "Depth {depth}: {} variables, {} clauses", engine.variable_count(), engine.clause_count());

            match engine.solve_with(&literals) {
                SolverResult::Satisfiable => {
                    self.engine = Some(engine);
                    self.steps = steps;
                    return Ok(self.conclude(BmcResult::Reachable, depth));
                }

                SolverResult::Unknown => return Ok(self.conclude(BmcResult::Timeout, depth)),

                SolverResult::Unsatisfiable => match engine.solve() {
                    SolverResult::Unsatisfiable => {
                        return Ok(self.conclude(BmcResult::Unreachable, depth))
                    }
                    SolverResult::Unknown => return Ok(self.conclude(BmcResult::Timeout, depth)),
                    SolverResult::Satisfiable => {}
                },
            }
        }

        let depth = self.maximum_depth;
        Ok(self.conclude(BmcResult::MaxIterationsReached, depth))
    }

    fn conclude(&mut self, result: BmcResult, depth: usize) -> BmcResult {
        log::info!(target: targets::BMC, "{result:?} at depth {depth}");
        self.last_result = Some(result);
        self.last_depth = depth;
        result
    }
}

impl SolverProxy for BmcSolverProxy {
    fn reset(&mut self) {
        self.variable_kinds = vec![VariableKind::Auxiliary, VariableKind::Latch];
        self.initial = vec![vec![(POSITIVE, 0)]];
        self.transition = vec![vec![(POSITIVE, 0)]];
        self.target = vec![vec![(POSITIVE, 0)]];
        self.target_clause_kind = ClauseKind::Transition;
        self.target_variable_kind = VariableKind::Auxiliary;
        self.engine = None;
        self.steps.clear();
        self.last_result = None;
        self.last_depth = 0;
        self.target_timeframe = 0;
    }

    fn new_literal(&mut self) -> Literal {
        let variable = self.variable_kinds.len() as Variable;
        self.variable_kinds.push(self.target_variable_kind);
        Literal::new(variable, false)
    }

    fn commit_clause(&mut self, clause: &[Literal]) -> Result<(), SolverError> {
        let clause: Vec<(Literal, usize)> = clause.iter().map(|literal| (*literal, 0)).collect();
        self.commit_timeframe_clause(&clause)
    }

    fn solve_with(&mut self, assumptions: &[Literal]) -> SolverResult {
        match self.solve_bmc(assumptions) {
            Ok(result) => result.into(),
            Err(e) => {
                log::error!(target: targets::BMC, "Unrolling failed: {e:?}");
                SolverResult::Unknown
            }
        }
    }

    fn literal_value(&self, literal: Literal) -> Value {
        let Some(engine) = &self.engine else {
            return Value::Invalid;
        };
        if literal.is_constant() {
            return engine.literal_value(literal);
        }
        if self.target_timeframe > self.last_depth {
            return Value::Invalid;
        }
        match self
            .steps
            .get(self.target_timeframe)
            .and_then(|step| step.get(&literal.variable()))
        {
            Some(base) => engine.literal_value(base.conditional(literal.is_negated())),
            None => Value::DontCare,
        }
    }

    fn set_timeout(&mut self, timeout: Option<std::time::Duration>) {
        self.time_limit = timeout;
    }

    fn variable_count(&self) -> usize {
        self.variable_kinds.len() - 1
    }

    fn clause_count(&self) -> usize {
        self.initial.len() + self.transition.len() + self.target.len()
    }
}

#[cfg(test)]
mod bmc_tests {
    use super::*;

    #[test]
    fn only_latches_at_next_timeframe() {
        let mut proxy = BmcSolverProxy::default();
        let input = proxy.new_literal();
        proxy.set_target(ClauseKind::Transition, VariableKind::Latch);
        let latch = proxy.new_literal();

        assert!(proxy.commit_timeframe_clause(&[(latch, 1), (-input, 0)]).is_ok());
        assert_eq!(
            proxy.commit_timeframe_clause(&[(input, 1)]),
            Err(SolverError::InvalidTimeframeClause {
                variable: input.variable(),
                timeframe: 1
            })
        );
    }

    #[test]
    fn counter_reaches_target() {
        // A two bit shift register, fed with one, starting from zero.
        let mut proxy = BmcSolverProxy::default();
        proxy.set_target(ClauseKind::Transition, VariableKind::Latch);
        let a = proxy.new_literal();
        let b = proxy.new_literal();

        proxy.set_target(ClauseKind::Initial, VariableKind::Auxiliary);
        proxy.commit_clause(&[-a]).unwrap();
        proxy.commit_clause(&[-b]).unwrap();

        proxy.set_target(ClauseKind::Transition, VariableKind::Auxiliary);
        proxy.commit_timeframe_clause(&[(a, 1)]).unwrap();
        proxy.commit_timeframe_clause(&[(-b, 1), (a, 0)]).unwrap();
        proxy.commit_timeframe_clause(&[(b, 1), (-a, 0)]).unwrap();

        proxy.set_target(ClauseKind::Target, VariableKind::Auxiliary);
        proxy.commit_clause(&[b]).unwrap();

        assert_eq!(proxy.solve(), SolverResult::Satisfiable);
        assert_eq!(proxy.last_result(), Some(BmcResult::Reachable));
        assert_eq!(proxy.last_depth(), 2);

        proxy.set_target_timeframe(0);
        assert_eq!(proxy.literal_value(a), Value::Negative);
        proxy.set_target_timeframe(2);
        assert_eq!(proxy.literal_value(b), Value::Positive);
    }

    #[test]
    fn inconsistent_system_is_unreachable() {
        let mut proxy = BmcSolverProxy::default();
        let p = proxy.new_literal();
        proxy.set_target(ClauseKind::Initial, VariableKind::Auxiliary);
        proxy.commit_clause(&[p]).unwrap();
        proxy.set_target(ClauseKind::Transition, VariableKind::Auxiliary);
        proxy.commit_clause(&[-p]).unwrap();

        assert_eq!(proxy.solve(), SolverResult::Unsatisfiable);
        assert_eq!(proxy.last_result(), Some(BmcResult::Unreachable));
    }

    #[test]
    fn maximum_depth() {
        let mut proxy = BmcSolverProxy::default();
        proxy.set_maximum_depth(3);
        let p = proxy.new_literal();
        proxy.set_target(ClauseKind::Target, VariableKind::Auxiliary);
        proxy.commit_clause(&[p]).unwrap();
        proxy.commit_clause(&[-p]).unwrap();

        assert_eq!(proxy.solve(), SolverResult::Unknown);
        assert_eq!(proxy.last_result(), Some(BmcResult::MaxIterationsReached));
    }
}
