/*!
Abstract structures of an encoding.

- [Literals](literal), handed out by a solver.
- [Values](logic) of signals and constraints on values.
- [Containers](container) of literals, representing the value of a signal in some domain.
*/

pub mod container;
pub mod literal;
pub mod logic;
