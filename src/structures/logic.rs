/*!
Values of signals, and constraints on those values.

The four values:
- [Zero](Logic::Zero) and [One](Logic::One), the usual boolean values.
- [DontCare](Logic::DontCare), some value which is either zero or one, and irrelevant to the matter at hand.
- [Unknown](Logic::Unknown), some value which is not known, such as an uninitialised flip-flop.

Gates are extended to don't-care and unknown values pessimistically, with unknown dominating don't-care, except where some input forces the output.
For example, an and gate with some zero input is zero, whatever the other inputs.

```rust
# use tpg_logic::structures::logic::Logic;
assert_eq!(Logic::and([Logic::Zero, Logic::Unknown]), Logic::Zero);
assert_eq!(Logic::and([Logic::One, Logic::DontCare]), Logic::DontCare);
assert_eq!(Logic::and([Logic::DontCare, Logic::Unknown]), Logic::Unknown);
assert_eq!(Logic::xor([Logic::One, Logic::One, Logic::One]), Logic::One);
```
*/

/// A value of a signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Logic {
    Zero,
    One,
    #[default]
    DontCare,
    Unknown,
}

impl Logic {
    pub const ALL: [Logic; 4] = [Logic::Zero, Logic::One, Logic::DontCare, Logic::Unknown];

    pub fn from_bool(value: bool) -> Self {
        match value {
            true => Logic::One,
            false => Logic::Zero,
        }
    }

    /// The boolean value, if the value is zero or one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Logic::Zero => Some(false),
            Logic::One => Some(true),
            _ => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Logic::Zero | Logic::One)
    }

    pub fn negate(&self) -> Self {
        match self {
            Logic::Zero => Logic::One,
            Logic::One => Logic::Zero,
            other => *other,
        }
    }

    /// Conjunction, with zero forcing.
    pub fn and(values: impl IntoIterator<Item = Logic>) -> Self {
        let mut result = Logic::One;
        for value in values {
            match value {
                Logic::Zero => return Logic::Zero,
                Logic::One => {}
                Logic::Unknown => result = Logic::Unknown,
                Logic::DontCare => {
                    if result != Logic::Unknown {
                        result = Logic::DontCare
                    }
                }
            }
        }
        result
    }

    /// Disjunction, with one forcing.
    pub fn or(values: impl IntoIterator<Item = Logic>) -> Self {
        Logic::and(values.into_iter().map(|value| value.negate())).negate()
    }

    /// Exclusive disjunction, which no value forces.
    pub fn xor(values: impl IntoIterator<Item = Logic>) -> Self {
        let mut parity = false;
        let mut result = None;
        for value in values {
            match value {
                Logic::Zero => {}
                Logic::One => parity = !parity,
                Logic::Unknown => result = Some(Logic::Unknown),
                Logic::DontCare => {
                    if result.is_none() {
                        result = Some(Logic::DontCare)
                    }
                }
            }
        }
        result.unwrap_or(Logic::from_bool(parity))
    }

    /// The character used for the value in patterns.
    pub fn as_char(&self) -> char {
        match self {
            Logic::Zero => '0',
            Logic::One => '1',
            Logic::DontCare => 'X',
            Logic::Unknown => 'U',
        }
    }
}

impl std::fmt::Display for Logic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A constraint on the value of a signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogicConstraint {
    NoConstraint,
    OnlyOne,
    OnlyZero,
    OnlyDontCare,
    OnlyUnknown,
    NotOne,
    NotZero,
    NotDontCare,
    NotUnknown,
    Only01,
    Only01X,
}

impl LogicConstraint {
    pub const MIN: LogicConstraint = LogicConstraint::NoConstraint;
    pub const MAX: LogicConstraint = LogicConstraint::Only01X;

    /// The constraint permitting exactly `value`.
    pub fn only(value: Logic) -> Self {
        match value {
            Logic::Zero => Self::OnlyZero,
            Logic::One => Self::OnlyOne,
            Logic::DontCare => Self::OnlyDontCare,
            Logic::Unknown => Self::OnlyUnknown,
        }
    }

    /// Whether the constraint permits the value.
    pub fn allows(&self, value: Logic) -> bool {
        match self {
            Self::NoConstraint => true,
            Self::OnlyOne => value == Logic::One,
            Self::OnlyZero => value == Logic::Zero,
            Self::OnlyDontCare => value == Logic::DontCare,
            Self::OnlyUnknown => value == Logic::Unknown,
            Self::NotOne => value != Logic::One,
            Self::NotZero => value != Logic::Zero,
            Self::NotDontCare => value != Logic::DontCare,
            Self::NotUnknown => value != Logic::Unknown,
            Self::Only01 => value.is_known(),
            Self::Only01X => value != Logic::Unknown,
        }
    }
}

impl std::fmt::Display for LogicConstraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let allowed: String = Logic::ALL
            .iter()
            .filter(|value| self.allows(**value))
            .map(|value| value.as_char())
            .collect();
        write!(f, "{{{allowed}}}")
    }
}
