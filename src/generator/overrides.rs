//! Overrides, and records kept by modules on a context.
//!
//! An override replaces the container read at a pin, for a tag and timeframe.
//! Overrides are how a fault is injected: the bad value at the fault site is overridden, while the bad logic of the node itself is left as it was.
//!
//! Records are containers noted by one module for use by another, such as the per-timeframe conditions gathered before a circuit-level constraint.

use std::collections::HashMap;

use crate::{
    circuit::Port,
    generator::tag::{PinData, Tag},
    structures::container::Container01,
};

/// The key of an override: timeframe, node, and port.
pub type OverrideKey = (usize, usize, Port);

/// Overrides for each tag with a container.
pub struct OverrideTable<P: PinData> {
    pub good: HashMap<OverrideKey, P::Good>,
    pub bad: HashMap<OverrideKey, P::Bad>,
    pub diff: HashMap<OverrideKey, Container01>,
    pub ldiff: HashMap<OverrideKey, Container01>,
}

impl<P: PinData> Default for OverrideTable<P> {
    fn default() -> Self {
        OverrideTable {
            good: HashMap::default(),
            bad: HashMap::default(),
            diff: HashMap::default(),
            ldiff: HashMap::default(),
        }
    }
}

impl<P: PinData> OverrideTable<P> {
    pub fn clear(&mut self) {
        self.good.clear();
        self.bad.clear();
        self.diff.clear();
        self.ldiff.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.good.is_empty() && self.bad.is_empty() && self.diff.is_empty() && self.ldiff.is_empty()
    }
}

/// The key of a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordKey {
    /// Whether the faults are sensitized, in some timeframe.
    Sensitization { timeframe: usize },

    /// Whether a fault effect reaches a primary output, in some timeframe.
    PrimaryPropagation { timeframe: usize },

    /// Whether a fault effect reaches a secondary output, in some timeframe.
    SecondaryPropagation { timeframe: usize },

    /// Whether the transition of the fault at `fault` happens, in some timeframe.
    TransitionActivation { fault: usize, timeframe: usize },

    /// Whether the net at `port` of `node` in the copy of `tag` meets a constraint, in some timeframe.
    NetSensitization {
        tag: Tag,
        node: usize,
        port: Port,
        timeframe: usize,
    },

    /// A latch which is one on the step `step` of a bounded model checking run, and zero on every other step.
    StepIndicator { step: usize },
}
