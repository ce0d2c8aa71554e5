/*!
Symbolic values of signals, as one or two [literals](crate::structures::literal).

A container is interpreted in one of a handful of [domains](Domain).
With `l0` and `l1` the literals of a container, written `l1 l0`:

| Domain | `00` | `01` | `10` | `11` |
|--------|------|------|------|------|
| `01`   | 0 (`l0` false) | 1 (`l0` true) | | |
| `01X`, `01F` | X | 0 | 1 | invalid |
| `U01X`, `U01F` | U | 0 | 1 | X |

So, in the two literal domains `l0` asserts the value zero and `l1` asserts the value one.
Whereas in the `01` domain the single literal `l0` asserts the value one.

Negation complements the literal of the `01` domain, and swaps the literals of the two literal domains.
In each case zero and one are exchanged, while don't-care and unknown are fixed.

The *forgetful* domains `01F` and `U01F` have the same values as `01X` and `U01X`, and differ only when used as the state of a sequential element under bounded model checking.
There, a forgetful state may decay to don't-care (or unknown) between timeframes.

A container is set when each of its literals is set.
Unset containers are the default, and must never be read by an encoding.
*/

use std::hash::Hash;

use crate::structures::{
    literal::{Literal, UNDEFINED},
    logic::Logic,
};

/// The domain of values a container represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Domain {
    L01,
    L01X,
    L01F,
    LU01X,
    LU01F,
}

impl Domain {
    /// The number of literals used by containers of the domain.
    pub const fn width(&self) -> usize {
        match self {
            Domain::L01 => 1,
            _ => 2,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Domain::L01 => "01",
            Domain::L01X => "01X",
            Domain::L01F => "01F",
            Domain::LU01X => "U01X",
            Domain::LU01F => "U01F",
        }
    }

    pub const fn is_forgetful(&self) -> bool {
        matches!(self, Domain::L01F | Domain::LU01F)
    }

    pub const fn has_dont_care(&self) -> bool {
        !matches!(self, Domain::L01)
    }

    pub const fn has_unknown(&self) -> bool {
        matches!(self, Domain::LU01X | Domain::LU01F)
    }

    /// The values of the domain.
    pub fn values(&self) -> &'static [Logic] {
        match self {
            Domain::L01 => &[Logic::Zero, Logic::One],
            Domain::L01X | Domain::L01F => &[Logic::Zero, Logic::One, Logic::DontCare],
            Domain::LU01X | Domain::LU01F => &Logic::ALL,
        }
    }

    /// The value given to a container of the domain by values of `l0` and `l1`, if valid.
    pub fn decode(&self, l0: bool, l1: bool) -> Option<Logic> {
        match (self, l1, l0) {
            (Domain::L01, _, false) => Some(Logic::Zero),
            (Domain::L01, _, true) => Some(Logic::One),

            (_, false, false) if self.has_unknown() => Some(Logic::Unknown),
            (_, false, false) => Some(Logic::DontCare),
            (_, false, true) => Some(Logic::Zero),
            (_, true, false) => Some(Logic::One),
            (_, true, true) if self.has_unknown() => Some(Logic::DontCare),
            (_, true, true) => None,
        }
    }

    /// The values of `l0` and `l1` which give a container of the domain `value`, if the domain has the value.
    ///
    /// For the `01` domain the value of `l1` is always false, and should be ignored.
    pub fn encode(&self, value: Logic) -> Option<(bool, bool)> {
        match (self, value) {
            (Domain::L01, Logic::Zero) => Some((false, false)),
            (Domain::L01, Logic::One) => Some((true, false)),
            (Domain::L01, _) => None,

            (_, Logic::Zero) => Some((true, false)),
            (_, Logic::One) => Some((false, true)),
            (_, Logic::DontCare) if self.has_unknown() => Some((true, true)),
            (_, Logic::DontCare) => Some((false, false)),
            (_, Logic::Unknown) if self.has_unknown() => Some((false, false)),
            (_, Logic::Unknown) => None,
        }
    }

    /// The value used in place of `value` in the domain.
    ///
    /// Don't-care and unknown become zero in the `01` domain, and unknown becomes don't-care in the `01X` domains.
    pub fn represent(&self, value: Logic) -> Logic {
        match (self, value) {
            (Domain::L01, Logic::DontCare | Logic::Unknown) => Logic::Zero,
            (Domain::L01X | Domain::L01F, Logic::Unknown) => Logic::DontCare,
            _ => value,
        }
    }

    /// The value of a floating (undriven) signal in the domain.
    pub fn floating(&self) -> Logic {
        self.represent(Logic::Unknown)
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Methods common to the symbolic representation of values in each domain.
pub trait LogicContainer: Copy + Default + Eq + Hash + std::fmt::Debug + 'static {
    /// The domain of the container.
    const DOMAIN: Domain;

    /// A container from literals `[l0, l1]`.
    /// For the `01` domain `l1` is ignored.
    fn from_literals(literals: [Literal; 2]) -> Self;

    /// The literals `[l0, l1]` of the container.
    /// For the `01` domain `l1` is always [UNDEFINED].
    fn literals(&self) -> [Literal; 2];

    fn l0(&self) -> Literal {
        self.literals()[0]
    }

    fn l1(&self) -> Literal {
        self.literals()[1]
    }

    /// The literals used by the container.
    fn active_literals(&self) -> Vec<Literal> {
        self.literals()[..Self::DOMAIN.width()].to_vec()
    }

    fn is_set(&self) -> bool {
        self.literals()[..Self::DOMAIN.width()]
            .iter()
            .all(|literal| literal.is_set())
    }

    /// The container representing the negated value, with no further literals or clauses required.
    fn negate(&self) -> Self;

    /// The container, negated if `negate` is true.
    fn conditional(&self, negate: bool) -> Self {
        match negate {
            true => self.negate(),
            false => *self,
        }
    }

    /// The container, negated for negative factors.
    fn multiply(&self, factor: i32) -> Self {
        self.conditional(factor < 0)
    }
}

/// A container of the `01` domain.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Container01 {
    pub l0: Literal,
}

impl Container01 {
    pub fn new(l0: Literal) -> Self {
        Container01 { l0 }
    }
}

impl LogicContainer for Container01 {
    const DOMAIN: Domain = Domain::L01;

    fn from_literals(literals: [Literal; 2]) -> Self {
        Container01 { l0: literals[0] }
    }

    fn literals(&self) -> [Literal; 2] {
        [self.l0, UNDEFINED]
    }

    fn negate(&self) -> Self {
        Container01 { l0: -self.l0 }
    }
}

impl std::fmt::Debug for Container01 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "01({})", self.l0)
    }
}

macro_rules! two_literal_container {
    ($(#[$doc:meta])* $name:ident, $domain:expr) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
        pub struct $name {
            pub l0: Literal,
            pub l1: Literal,
        }

        impl $name {
            pub fn new(l0: Literal, l1: Literal) -> Self {
                $name { l0, l1 }
            }
        }

        impl LogicContainer for $name {
            const DOMAIN: Domain = $domain;

            fn from_literals(literals: [Literal; 2]) -> Self {
                $name {
                    l0: literals[0],
                    l1: literals[1],
                }
            }

            fn literals(&self) -> [Literal; 2] {
                [self.l0, self.l1]
            }

            fn negate(&self) -> Self {
                $name {
                    l0: self.l1,
                    l1: self.l0,
                }
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({}, {})", $domain.name(), self.l1, self.l0)
            }
        }
    };
}

two_literal_container!(
    /// A container of the `01X` domain.
    Container01X,
    Domain::L01X
);

two_literal_container!(
    /// A container of the forgetful `01F` domain.
    Container01F,
    Domain::L01F
);

two_literal_container!(
    /// A container of the `U01X` domain.
    ContainerU01X,
    Domain::LU01X
);

two_literal_container!(
    /// A container of the forgetful `U01F` domain.
    ContainerU01F,
    Domain::LU01F
);
