/*!
A timeframe, storing tags and containers for each node of a circuit.

Cones are tagged by a worklist over a heap of node ids:
- An input cone is explored backwards from the largest id, so each node is visited once all of its readers in the cone have been.
- An output cone is explored forwards from the smallest id.

As node ids are topological, popping the extreme id always gives a node whose place in the cone is settled, and repeated ids are skipped.
*/

use std::{cmp::Reverse, collections::BinaryHeap};

use crate::{
    circuit::Circuit,
    generator::tag::{PinData, Tag, TagSet},
    misc::log::targets::{self},
    structures::container::Container01,
};

/// The containers of a node, for each tag with a container.
pub struct PinSlot<P: PinData> {
    pub good: P::Good,
    pub bad: P::Bad,
    pub diff: Container01,
}

impl<P: PinData> Default for PinSlot<P> {
    fn default() -> Self {
        PinSlot {
            good: P::Good::default(),
            bad: P::Bad::default(),
            diff: Container01::default(),
        }
    }
}

/// A timeframe.
pub struct Timeframe<P: PinData> {
    id: usize,
    tags: Vec<TagSet>,
    slots: Vec<PinSlot<P>>,
}

impl<P: PinData> Timeframe<P> {
    pub fn new(id: usize, node_count: usize) -> Self {
        Timeframe {
            id,
            tags: vec![TagSet::default(); node_count],
            slots: (0..node_count).map(|_| PinSlot::default()).collect(),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn node_count(&self) -> usize {
        self.tags.len()
    }

    pub fn has_tag(&self, node: usize, tag: Tag) -> bool {
        self.tags.get(node).is_some_and(|tags| tags.contains(tag))
    }

    pub fn tags(&self, node: usize) -> TagSet {
        self.tags.get(node).copied().unwrap_or_default()
    }

    pub fn add_tag(&mut self, node: usize, tag: Tag) -> bool {
        self.tags[node].insert(tag)
    }

    pub fn remove_tag(&mut self, node: usize, tag: Tag) {
        self.tags[node].remove(tag)
    }

    /// The nodes with `tag`, in id order.
    pub fn tagged_nodes(&self, tag: Tag) -> impl Iterator<Item = usize> + '_ {
        self.tags
            .iter()
            .enumerate()
            .filter(move |(_, tags)| tags.contains(tag))
            .map(|(node, _)| node)
    }

    pub fn slot(&self, node: usize) -> &PinSlot<P> {
        &self.slots[node]
    }

    pub fn slot_mut(&mut self, node: usize) -> &mut PinSlot<P> {
        &mut self.slots[node]
    }

    /// Adds each of `tags` to the input cone of `seeds`, seeds included.
    ///
    /// Returns the nodes of the cone, in the order visited.
    pub fn tag_input_cone(&mut self, circuit: &Circuit, seeds: &[usize], tags: &[Tag]) -> Vec<usize> {
        let mut heap: BinaryHeap<usize> = seeds.iter().copied().collect();
        let mut cone = Vec::default();
        let mut last = None;

        while let Some(node) = heap.pop() {
            if last == Some(node) {
                continue;
            }
            last = Some(node);

            for tag in tags {
                self.tags[node].insert(*tag);
            }
            cone.push(node);
            heap.extend(circuit.node(node).inputs().iter().flatten());
        }

        log::trace!(target: targets::TAGGING, "Input cone of {seeds:?} in timeframe {}: {} nodes", self.id, cone.len());
        cone
    }

    /// Adds each of `tags` to the output cone of `seeds`, seeds included.
    ///
    /// Returns the nodes of the cone, in the order visited.
    pub fn tag_output_cone(&mut self, circuit: &Circuit, seeds: &[usize], tags: &[Tag]) -> Vec<usize> {
        let mut heap: BinaryHeap<Reverse<usize>> = seeds.iter().map(|seed| Reverse(*seed)).collect();
        let mut cone = Vec::default();
        let mut last = None;

        while let Some(Reverse(node)) = heap.pop() {
            if last == Some(node) {
                continue;
            }
            last = Some(node);

            for tag in tags {
                self.tags[node].insert(*tag);
            }
            cone.push(node);
            heap.extend(circuit.node(node).successors().iter().map(|successor| Reverse(*successor)));
        }

        log::trace!(target: targets::TAGGING, "Output cone of {seeds:?} in timeframe {}: {} nodes", self.id, cone.len());
        cone
    }
}

#[cfg(test)]
mod timeframe_tests {
    use super::*;
    use crate::{
        circuit::{CellType, CircuitBuilder},
        generator::tag::PinDataG,
        structures::container::Container01X,
    };

    type Data = PinDataG<Container01X>;

    // a, b -> and -> out0
    // b, c -> or -> out1
    fn circuit() -> Circuit {
        let mut builder = CircuitBuilder::default();
        let a = builder.add_node("a", CellType::PIn, &[]).unwrap();
        let b = builder.add_node("b", CellType::PIn, &[]).unwrap();
        let c = builder.add_node("c", CellType::PIn, &[]).unwrap();
        let and = builder.add_node("and", CellType::And, &[Some(a), Some(b)]).unwrap();
        let or = builder.add_node("or", CellType::Or, &[Some(b), Some(c)]).unwrap();
        builder.add_node("out0", CellType::POut, &[Some(and)]).unwrap();
        builder.add_node("out1", CellType::POut, &[Some(or)]).unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn input_cone() {
        let circuit = circuit();
        let mut frame = Timeframe::<Data>::new(0, circuit.node_count());
        let cone = frame.tag_input_cone(&circuit, &[5], &[Tag::Good]);
        assert_eq!(cone, vec![5, 3, 1, 0]);
        assert_eq!(frame.tagged_nodes(Tag::Good).collect::<Vec<_>>(), vec![0, 1, 3, 5]);
    }

    #[test]
    fn output_cone() {
        let circuit = circuit();
        let mut frame = Timeframe::<Data>::new(0, circuit.node_count());
        let cone = frame.tag_output_cone(&circuit, &[1], &[Tag::Bad, Tag::FaultOutputCone]);
        assert_eq!(cone, vec![1, 3, 4, 5, 6]);
        assert!(frame.has_tag(6, Tag::FaultOutputCone));
        assert!(!frame.has_tag(0, Tag::Bad));
    }

    #[test]
    fn shared_predecessors_are_visited_once() {
        let circuit = circuit();
        let mut frame = Timeframe::<Data>::new(0, circuit.node_count());
        let cone = frame.tag_input_cone(&circuit, &[5, 6, 5], &[Tag::Good]);
        assert_eq!(cone, vec![6, 5, 4, 3, 2, 1, 0]);
    }
}
