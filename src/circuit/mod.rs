/*!
An immutable gate-level circuit.

A circuit is a directed acyclic graph of [nodes](Node), indexed in topological order, with feedback only through sequential elements.
Each sequential element is split into a pair of nodes:
- A secondary input ([SIn](CellType::SIn)), whose output is the stored value.
- A secondary output ([SOut](CellType::SOut)), whose inputs give the value to be stored.

The secondary output of a pair drives the secondary input of the pair on the following timeframe.

Circuits are built through a [CircuitBuilder], and are read but never mutated by an encoding.
*/

mod builder;
pub mod cell;
mod node;

pub use builder::CircuitBuilder;
pub use cell::{CellCategory, CellType};
pub use node::{Node, Port, PortType};

/// A circuit.
#[derive(Clone, Debug)]
pub struct Circuit {
    nodes: Vec<Node>,
    primary_inputs: Vec<usize>,
    primary_outputs: Vec<usize>,
    secondary_inputs: Vec<usize>,
    secondary_outputs: Vec<usize>,

    /// The partner of each secondary input and output, indexed by node.
    secondary_pair: Vec<Option<usize>>,
}

impl Circuit {
    pub fn node(&self, id: usize) -> &Node {
        &self.nodes[id]
    }

    pub fn get_node(&self, id: usize) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.name() == name)
    }

    pub fn primary_inputs(&self) -> &[usize] {
        &self.primary_inputs
    }

    pub fn primary_outputs(&self) -> &[usize] {
        &self.primary_outputs
    }

    /// Secondary inputs, in the order of their pairing.
    pub fn secondary_inputs(&self) -> &[usize] {
        &self.secondary_inputs
    }

    /// Secondary outputs, in the order of their pairing.
    pub fn secondary_outputs(&self) -> &[usize] {
        &self.secondary_outputs
    }

    pub fn is_primary_input(&self, id: usize) -> bool {
        self.nodes[id].cell_type() == CellType::PIn
    }

    pub fn is_primary_output(&self, id: usize) -> bool {
        self.nodes[id].cell_type() == CellType::POut
    }

    pub fn is_secondary_input(&self, id: usize) -> bool {
        self.nodes[id].cell_type() == CellType::SIn
    }

    pub fn is_secondary_output(&self, id: usize) -> bool {
        self.nodes[id].cell_type() == CellType::SOut
    }

    /// The secondary output paired with a secondary input, or the secondary input paired with a secondary output.
    pub fn secondary_pair(&self, id: usize) -> Option<usize> {
        self.secondary_pair.get(id).copied().flatten()
    }
}
