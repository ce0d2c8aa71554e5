//! Models of sequential elements.

/// How the value stored by a sequential element is derived from its data and clock/enable inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SequentialModel {
    /// The stored value is the value of the data input, regardless of the clock.
    Keep,

    /// The element is not modelled, and the stored value is unconstrained.
    None,

    /// The stored value is the data input, with the clock/enable ignored.
    Unclocked,

    /// An edge triggered flip-flop.
    /// Edges cannot be observed within a single timeframe, so this model is reported as unsupported.
    FlipFlop,

    /// A level sensitive latch: the data input when enabled, and the stored state otherwise.
    Latch,
}

impl SequentialModel {
    pub const MIN: SequentialModel = SequentialModel::Keep;
    pub const MAX: SequentialModel = SequentialModel::Latch;
}

impl std::fmt::Display for SequentialModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Keep => write!(f, "keep"),
            Self::None => write!(f, "none"),
            Self::Unclocked => write!(f, "unclocked"),
            Self::FlipFlop => write!(f, "flip-flop"),
            Self::Latch => write!(f, "latch"),
        }
    }
}

/// How the asynchronous set and reset inputs of a sequential element are applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SetResetModel {
    /// Both set and reset are ignored.
    None,

    /// Only the set input is applied.
    OnlySet,

    /// Only the reset input is applied.
    OnlyReset,

    /// Both are applied, and set wins when both are active.
    SetHasPriority,

    /// Both are applied, and reset wins when both are active.
    ResetHasPriority,
}

impl SetResetModel {
    pub const MIN: SetResetModel = SetResetModel::None;
    pub const MAX: SetResetModel = SetResetModel::ResetHasPriority;

    pub fn uses_set(&self) -> bool {
        !matches!(self, Self::None | Self::OnlyReset)
    }

    pub fn uses_reset(&self) -> bool {
        !matches!(self, Self::None | Self::OnlySet)
    }
}

impl std::fmt::Display for SetResetModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::OnlySet => write!(f, "only-set"),
            Self::OnlyReset => write!(f, "only-reset"),
            Self::SetHasPriority => write!(f, "set-priority"),
            Self::ResetHasPriority => write!(f, "reset-priority"),
        }
    }
}
