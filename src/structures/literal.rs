/*!
Literals, as handed out by a [solver](crate::solver).

A literal is a variable together with a polarity, packed into a single integer as `variable << 1 | negated`.
So, the literals of a variable are adjacent, and negation flips the lowest bit.

Variable `0` is reserved, and [UNDEFINED] marks a literal which has not been allocated.
Variable `1` is the constant true variable of every solver, giving the [POSITIVE] (true) and [NEGATIVE] (false) literals.
These allow constants to be written into [containers](crate::structures::container) without allocating variables.

# Example

```rust
# use tpg_logic::structures::literal::{Literal, NEGATIVE, POSITIVE};
let literal = Literal::new(4, false);
assert_eq!(-literal, Literal::new(4, true));
assert_eq!(literal * -1, -literal);
assert_eq!(literal.as_int(), 4);
assert_eq!((-literal).as_int(), -4);
assert_eq!(-POSITIVE, NEGATIVE);
```
*/

/// A variable, as an index.
pub type Variable = u32;

/// A literal, as a packed variable and polarity.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Literal(u32);

/// The literal of no variable.
pub const UNDEFINED: Literal = Literal(0);

/// The literal which is always true.
pub const POSITIVE: Literal = Literal(2);

/// The literal which is always false.
pub const NEGATIVE: Literal = Literal(3);

impl Literal {
    /// The literal of `variable`, negated if `negated` is true.
    pub const fn new(variable: Variable, negated: bool) -> Self {
        Literal((variable << 1) | negated as u32)
    }

    /// The literal from its packed representation.
    pub const fn from_id(id: u32) -> Self {
        Literal(id)
    }

    /// The packed representation of the literal.
    pub const fn id(&self) -> u32 {
        self.0
    }

    pub const fn variable(&self) -> Variable {
        self.0 >> 1
    }

    pub const fn is_negated(&self) -> bool {
        self.0 & 1 == 1
    }

    /// Whether the literal refers to some (allocated) variable.
    pub const fn is_set(&self) -> bool {
        self.0 > 1
    }

    /// Whether the literal is one of the constant literals.
    pub const fn is_constant(&self) -> bool {
        self.variable() == 1
    }

    pub const fn negate(&self) -> Self {
        Literal(self.0 ^ 1)
    }

    /// The literal, negated if `negate` is true.
    pub const fn conditional(&self, negate: bool) -> Self {
        Literal(self.0 ^ negate as u32)
    }

    /// The signed integer representation of the literal, as used by DIMACS.
    pub fn as_int(&self) -> i64 {
        match self.is_negated() {
            true => -(self.variable() as i64),
            false => self.variable() as i64,
        }
    }

    /// The literal from a signed integer, as used by DIMACS.
    pub fn from_int(int: i64) -> Self {
        Literal::new(int.unsigned_abs() as Variable, int < 0)
    }
}

impl std::ops::Neg for Literal {
    type Output = Literal;

    fn neg(self) -> Self::Output {
        self.negate()
    }
}

impl std::ops::Not for Literal {
    type Output = Literal;

    fn not(self) -> Self::Output {
        self.negate()
    }
}

/// Conditional negation, negating for negative multipliers.
impl std::ops::Mul<i32> for Literal {
    type Output = Literal;

    fn mul(self, rhs: i32) -> Self::Output {
        self.conditional(rhs < 0)
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            UNDEFINED => write!(f, "undef"),
            POSITIVE => write!(f, "true"),
            NEGATIVE => write!(f, "false"),
            _ => write!(f, "{}", self.as_int()),
        }
    }
}

impl std::fmt::Debug for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}
