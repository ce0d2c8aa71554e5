/*!
Configuration of a generator context.

All configuration for a context is contained within a [Config].
Some structures, such as the [reference solver](crate::solver::sat) and the modules built [from a config](crate::generator::circuit_logic::InputLogicEncoder::from_config), clone parts of the configuration.
*/

mod config_option;
pub use config_option::ConfigOption;

pub mod sequential;
use sequential::{SequentialModel, SetResetModel};

use crate::{generator::AttemptState, structures::logic::LogicConstraint};

/// Representation for the probability of choosing `true` when deciding on the value of a variable.
pub type PolarityLean = f64;

/// The primary configuration structure.
#[derive(Clone, Debug)]
pub struct Config {
    /// The probability of assigning positive polarity to a variable when freely choosing a variable.
    pub polarity_lean: ConfigOption<PolarityLean>,

    /// The seed of the source of randomness used by the reference solver.
    pub random_seed: ConfigOption<u64>,

    /// The time limit for a solve, where zero is no limit.
    pub time_limit: ConfigOption<std::time::Duration>,

    /// The conflict limit for a solve, where zero is no limit.
    pub conflict_limit: ConfigOption<usize>,

    /// The deepest unrolling a bounded model checker may try.
    pub bmc_maximum_depth: ConfigOption<usize>,

    /// The default model of sequential elements.
    pub sequential_model: ConfigOption<SequentialModel>,

    /// The default model of set and reset inputs to sequential elements.
    pub set_reset_model: ConfigOption<SetResetModel>,

    /// The default constraint placed on the value of inputs.
    pub input_constraint: ConfigOption<LogicConstraint>,
}

impl Config {
    /// The polarity lean, within the bounds of the option.
    ///
    /// The value may have been written directly, so a value out of bounds is clamped, and an undefined value is the lower bound.
    pub fn polarity_lean(&self) -> PolarityLean {
        let (min, max) = self.polarity_lean.min_max();
        let value = self.polarity_lean.value;
        match value.is_nan() {
            true => {
                log::warn!("Value for {} undefined, using {min}.", self.polarity_lean.name);
                min
            }
            false if value < min || max < value => {
                log::warn!("Value for {} outside of bounds, clamped.", self.polarity_lean.name);
                value.clamp(min, max)
            }
            false => value,
        }
    }

    /// The time limit, if some limit is set.
    pub fn time_limit(&self) -> Option<std::time::Duration> {
        match self.time_limit.value.is_zero() {
            true => None,
            false => Some(self.time_limit.value),
        }
    }

    /// The conflict limit, if some limit is set.
    pub fn conflict_limit(&self) -> Option<usize> {
        match self.conflict_limit.value {
            0 => None,
            limit => Some(limit),
        }
    }
}

impl Default for Config {
    /// The default config gives deterministic results, with inputs restricted to 0 and 1.
    fn default() -> Self {
        Config {
            polarity_lean: ConfigOption {
                name: "polarity_lean",
                min: 0.0,
                max: 1.0,
                max_state: AttemptState::Uninitialized,
                value: 0.0,
            },

            random_seed: ConfigOption {
                name: "random_seed",
                min: u64::MIN,
                max: u64::MAX,
                max_state: AttemptState::Uninitialized,
                value: 0,
            },

            time_limit: ConfigOption {
                name: "time_limit",
                min: std::time::Duration::from_secs(0),
                max: std::time::Duration::MAX,
                max_state: AttemptState::Encoded,
                value: std::time::Duration::from_secs(0),
            },

            conflict_limit: ConfigOption {
                name: "conflict_limit",
                min: 0,
                max: usize::MAX,
                max_state: AttemptState::Encoded,
                value: 0,
            },

            bmc_maximum_depth: ConfigOption {
                name: "bmc_maximum_depth",
                min: 0,
                max: usize::MAX,
                max_state: AttemptState::Encoded,
                value: 100,
            },

            sequential_model: ConfigOption {
                name: "sequential_model",
                min: SequentialModel::MIN,
                max: SequentialModel::MAX,
                max_state: AttemptState::ModulesRegistered,
                value: SequentialModel::Keep,
            },

            set_reset_model: ConfigOption {
                name: "set_reset_model",
                min: SetResetModel::MIN,
                max: SetResetModel::MAX,
                max_state: AttemptState::ModulesRegistered,
                value: SetResetModel::None,
            },

            input_constraint: ConfigOption {
                name: "input_constraint",
                min: LogicConstraint::MIN,
                max: LogicConstraint::MAX,
                max_state: AttemptState::ModulesRegistered,
                value: LogicConstraint::Only01,
            },
        }
    }
}
