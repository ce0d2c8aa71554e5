/*!
Miscelanous items related to [logging](log).

Calls to the log macro are made throughout the library.
These are intended to provide useful information when extending the library with new modules, or when an encoding does not behave as expected.

Note, no log implementation is provided.
For more details, see [log].
*/

/// Targets to be used within a [log]! macro.
pub mod targets {
    /// Logs related to the [encoder](crate::encoder)
    pub const ENCODER: &str = "encoder";

    /// Logs related to the [logic generator](crate::generator::LogicGenerator)
    pub const GENERATOR: &str = "generator";

    /// Logs related to tagging a circuit
    pub const TAGGING: &str = "tagging";

    /// Logs related to the [difference chain](crate::generator::dchain)
    pub const DCHAIN: &str = "dchain";

    /// Logs related to [faults](crate::generator::fault)
    pub const FAULT: &str = "fault";

    /// Logs related to [constraints](crate::generator::constraint) on ports, nets, and patterns
    pub const CONSTRAINT: &str = "constraint";

    /// Logs related to sequential elements
    pub const SEQUENTIAL: &str = "sequential";

    /// Logs related to the [reference solver](crate::solver::sat)
    pub const SOLVER: &str = "solver";

    /// Logs related to [bounded model checking](crate::solver::bmc)
    pub const BMC: &str = "bmc";

    /// Logs related to [extraction](crate::generator::extract) of test patterns
    pub const EXTRACTION: &str = "extraction";
}
