//! Cell types and categories.

/// The function of a cell, ignoring polarity and the particulars of its pins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellCategory {
    Unknown,
    Constant,
    Input,
    Output,
    Buf,
    Inv,
    Bufif,
    Notif,
    And,
    Nand,
    Or,
    Nor,
    Xor,
    Xnor,
    Mux,
}

/// The type of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellType {
    /// A cell with no known function, whose output floats.
    Undefined,

    PresetX,
    Preset1,
    Preset0,
    PresetU,

    /// A primary input.
    PIn,
    /// A primary output, reading a single input.
    POut,
    /// A secondary input, the output of a sequential element.
    SIn,
    /// A secondary output, the input of a sequential element.
    /// The inputs are data, clock (or enable), set, and reset, each but data optional.
    SOut,

    Buf,
    Inv,
    /// A tristate buffer, enabled by a one on the second input.
    Bufif1,
    /// A tristate buffer, enabled by a zero on the second input.
    Bufif0,
    /// A tristate inverter, enabled by a one on the second input.
    Notif1,
    /// A tristate inverter, enabled by a zero on the second input.
    Notif0,

    And,
    Nand,
    Or,
    Nor,
    Xor,
    Xnor,

    /// A multiplexer, where the third input selects the first (zero) or second (one) input.
    Mux,
}

/// Indicies to the inputs of a secondary output.
pub mod secondary_port {
    pub const DATA: usize = 0;
    pub const CLOCK: usize = 1;
    pub const SET: usize = 2;
    pub const RESET: usize = 3;
}

impl CellType {
    pub fn category(&self) -> CellCategory {
        match self {
            Self::Undefined => CellCategory::Unknown,
            Self::PresetX | Self::Preset1 | Self::Preset0 | Self::PresetU => CellCategory::Constant,
            Self::PIn | Self::SIn => CellCategory::Input,
            Self::POut | Self::SOut => CellCategory::Output,
            Self::Buf => CellCategory::Buf,
            Self::Inv => CellCategory::Inv,
            Self::Bufif1 | Self::Bufif0 => CellCategory::Bufif,
            Self::Notif1 | Self::Notif0 => CellCategory::Notif,
            Self::And => CellCategory::And,
            Self::Nand => CellCategory::Nand,
            Self::Or => CellCategory::Or,
            Self::Nor => CellCategory::Nor,
            Self::Xor => CellCategory::Xor,
            Self::Xnor => CellCategory::Xnor,
            Self::Mux => CellCategory::Mux,
        }
    }

    /// Whether a cell of the type may have `count` inputs.
    pub fn accepts_inputs(&self, count: usize) -> bool {
        match self.category() {
            CellCategory::Unknown => true,
            CellCategory::Constant | CellCategory::Input => count == 0,
            CellCategory::Output => match self {
                Self::SOut => count == 4,
                _ => count == 1,
            },
            CellCategory::Buf | CellCategory::Inv => count == 1,
            CellCategory::Bufif | CellCategory::Notif => count == 2,
            CellCategory::Mux => count == 3,
            _ => count >= 1,
        }
    }

    pub fn is_sequential(&self) -> bool {
        matches!(self, Self::SIn | Self::SOut)
    }
}
