use std::collections::HashMap;

use crate::{
    circuit::{cell::CellType, node::Node, Circuit},
    types::err::CircuitError,
};

/// A builder of circuits, validating each node as it is added.
///
/// Nodes are added in topological order, so each input of a node refers to some node already added.
/// Feedback through sequential elements is expressed by [pairing](CircuitBuilder::pair_secondary) a secondary output with the secondary input it drives on the next timeframe.
#[derive(Default)]
pub struct CircuitBuilder {
    nodes: Vec<Node>,
    names: HashMap<String, usize>,
    pairs: Vec<(usize, usize)>,
}

impl CircuitBuilder {
    /// Adds a node, returning the id of the node.
    pub fn add_node(
        &mut self,
        name: &str,
        cell: CellType,
        inputs: &[Option<usize>],
    ) -> Result<usize, CircuitError> {
        let id = self.nodes.len();

        if let Some(input) = inputs.iter().flatten().find(|input| **input >= id) {
            return Err(CircuitError::DanglingReference {
                node: id,
                input: *input,
            });
        }
        if !cell.accepts_inputs(inputs.len()) {
            return Err(CircuitError::InputCount {
                node: id,
                cell,
                count: inputs.len(),
            });
        }
        if self.names.contains_key(name) {
            return Err(CircuitError::DuplicateName(name.to_string()));
        }

        self.names.insert(name.to_string(), id);
        self.nodes.push(Node {
            id,
            name: name.to_string(),
            cell,
            inputs: inputs.to_vec(),
            successors: Vec::default(),
        });
        Ok(id)
    }

    /// Pairs a secondary input with the secondary output driving it on the next timeframe.
    pub fn pair_secondary(&mut self, input: usize, output: usize) -> Result<(), CircuitError> {
        let is_type = |node: usize, cell: CellType| {
            self.nodes
                .get(node)
                .is_some_and(|node| node.cell == cell)
        };
        if !is_type(input, CellType::SIn) {
            return Err(CircuitError::Pairing { node: input });
        }
        if !is_type(output, CellType::SOut) {
            return Err(CircuitError::Pairing { node: output });
        }
        if let Some((i, o)) = self
            .pairs
            .iter()
            .find(|(i, o)| *i == input || *o == output)
        {
            let node = if *i == input { *i } else { *o };
            return Err(CircuitError::Pairing { node });
        }
        self.pairs.push((input, output));
        Ok(())
    }

    /// The circuit, if each secondary input and output is paired.
    pub fn build(mut self) -> Result<Circuit, CircuitError> {
        for id in 0..self.nodes.len() {
            let drivers: Vec<usize> = self.nodes[id].inputs.iter().flatten().copied().collect();
            for driver in drivers {
                let successors = &mut self.nodes[driver].successors;
                if !successors.contains(&id) {
                    successors.push(id);
                }
            }
        }

        let mut circuit = Circuit {
            secondary_pair: vec![None; self.nodes.len()],
            primary_inputs: Vec::default(),
            primary_outputs: Vec::default(),
            secondary_inputs: Vec::default(),
            secondary_outputs: Vec::default(),
            nodes: Vec::default(),
        };

        for node in &self.nodes {
            match node.cell {
                CellType::PIn => circuit.primary_inputs.push(node.id),
                CellType::POut => circuit.primary_outputs.push(node.id),
                CellType::SIn => circuit.secondary_inputs.push(node.id),
                CellType::SOut => circuit.secondary_outputs.push(node.id),
                _ => {}
            }
        }

        for (input, output) in &self.pairs {
            circuit.secondary_pair[*input] = Some(*output);
            circuit.secondary_pair[*output] = Some(*input);
        }

        if let Some(unpaired) = circuit
            .secondary_inputs
            .iter()
            .chain(circuit.secondary_outputs.iter())
            .find(|node| circuit.secondary_pair[**node].is_none())
        {
            return Err(CircuitError::Pairing { node: *unpaired });
        }

        // Secondary inputs and outputs are listed in pair order.
        circuit.secondary_inputs = self.pairs.iter().map(|(input, _)| *input).collect();
        circuit.secondary_outputs = self.pairs.iter().map(|(_, output)| *output).collect();

        circuit.nodes = self.nodes;
        Ok(circuit)
    }
}
