use crate::circuit::cell::{CellCategory, CellType};

/// A node of a circuit, for a single cell.
#[derive(Clone, Debug)]
pub struct Node {
    pub(super) id: usize,
    pub(super) name: String,
    pub(super) cell: CellType,
    pub(super) inputs: Vec<Option<usize>>,
    pub(super) successors: Vec<usize>,
}

impl Node {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cell_type(&self) -> CellType {
        self.cell
    }

    pub fn category(&self) -> CellCategory {
        self.cell.category()
    }

    /// The driver of each input, with `None` for an unconnected input.
    pub fn inputs(&self) -> &[Option<usize>] {
        &self.inputs
    }

    pub fn input(&self, index: usize) -> Option<usize> {
        self.inputs.get(index).copied().flatten()
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    /// The nodes reading the output of the node, without duplicates.
    pub fn successors(&self) -> &[usize] {
        &self.successors
    }
}

/// The side of a node a pin is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PortType {
    Input,
    Output,
}

/// A pin of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Port {
    pub port_type: PortType,
    pub number: usize,
}

impl Port {
    /// The output of a node.
    pub const fn output() -> Self {
        Port {
            port_type: PortType::Output,
            number: 0,
        }
    }

    /// The input `number` of a node.
    pub const fn input(number: usize) -> Self {
        Port {
            port_type: PortType::Input,
            number,
        }
    }

    pub fn is_output(&self) -> bool {
        self.port_type == PortType::Output
    }
}

impl std::fmt::Display for Port {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.port_type {
            PortType::Input => write!(f, "in{}", self.number),
            PortType::Output => write!(f, "out"),
        }
    }
}
