use std::marker::PhantomData;

use crate::{
    circuit::{CellCategory, CellType, Port},
    generator::{
        tag::{ContainerTag, PinData},
        GeneratorContext, GeneratorModule, Phase,
    },
    misc::log::targets::{self},
    structures::{container::LogicContainer, logic::Logic},
    types::err::{self, ErrorKind},
};

/// Encodes constants and combinational gates.
///
/// Inputs and outputs, primary or secondary, are left to dedicated modules.
///
/// | Cell | Output |
/// |------|--------|
/// | `Preset0`, `Preset1`, `PresetX`, `PresetU` | the constant, degraded to the domain |
/// | `Undefined` without inputs | the floating value of the domain |
/// | `Buf`, `Inv` | a relabelling of the input |
/// | `Bufif1`, `Notif1` | tristate, enabled by one on the second input |
/// | `Bufif0`, `Notif0` | tristate, enabled by zero on the second input |
/// | `And` .. `Xnor` | the gate over every input |
/// | `Mux` | the first or second input, as selected by the third |
///
/// An unconnected input, or an undefined cell with inputs, is an error.
pub struct DefaultLogicEncoder<T> {
    tag: PhantomData<T>,
}

impl<T> Default for DefaultLogicEncoder<T> {
    fn default() -> Self {
        DefaultLogicEncoder { tag: PhantomData }
    }
}

impl<P: PinData, T: ContainerTag<P>> GeneratorModule<P> for DefaultLogicEncoder<T> {
    fn name(&self) -> &'static str {
        "default-logic-encoder"
    }

    fn phase(&self) -> Phase {
        Phase::CircuitLogic
    }

    fn encode_node(&self, context: &mut GeneratorContext<P>, timeframe: usize, node: usize) -> Result<(), ErrorKind> {
        if !context.has_tag(timeframe, node, T::TAG) {
            return Ok(());
        }
        let (cell, input_count) = {
            let node = context.circuit().node(node);
            (node.cell_type(), node.input_count())
        };

        let output: T::Container = match cell.category() {
            CellCategory::Input | CellCategory::Output => return Ok(()),

            CellCategory::Constant => {
                let value = match cell {
                    CellType::Preset0 => Logic::Zero,
                    CellType::Preset1 => Logic::One,
                    CellType::PresetX => Logic::DontCare,
                    _ => Logic::Unknown,
                };
                context.encoder_mut().new_constant(value)
            }

            CellCategory::Unknown => {
                if input_count > 0 {
                    return Err(err::ConfigurationError::UnsupportedCell {
                        node,
                        cell,
                        tag: T::TAG,
                        timeframe,
                    }
                    .into());
                }
                let floating = T::Container::DOMAIN.floating();
                log::warn!(target: targets::GENERATOR, "Node {node} has an undefined cell, encoded as floating ({floating})");
                context.encoder_mut().new_constant(floating)
            }

            category => {
                let mut inputs: Vec<T::Container> = Vec::with_capacity(input_count);
                for index in 0..input_count {
                    inputs.push(context.require_container::<T>(timeframe, node, Port::input(index))?);
                }
                let encoder = context.encoder_mut();

                match category {
                    CellCategory::Buf => encoder.encode_buffer(&inputs[0]),
                    CellCategory::Inv => encoder.encode_inverter(&inputs[0]),

                    CellCategory::Bufif | CellCategory::Notif => {
                        let enable = match cell {
                            CellType::Bufif0 | CellType::Notif0 => inputs[1].negate(),
                            _ => inputs[1],
                        };
                        match category {
                            CellCategory::Bufif => encoder.encode_tristate_buffer(&inputs[0], &enable),
                            _ => encoder.encode_tristate_inverter(&inputs[0], &enable),
                        }
                    }

                    CellCategory::And => encoder.encode_and(&inputs),
                    CellCategory::Nand => encoder.encode_nand(&inputs),
                    CellCategory::Or => encoder.encode_or(&inputs),
                    CellCategory::Nor => encoder.encode_nor(&inputs),
                    CellCategory::Xor => encoder.encode_xor(&inputs),
                    CellCategory::Xnor => encoder.encode_xnor(&inputs),

                    CellCategory::Mux => encoder.encode_multiplexer(&inputs[0], &inputs[1], &inputs[2]),

                    CellCategory::Unknown
                    | CellCategory::Constant
                    | CellCategory::Input
                    | CellCategory::Output => unreachable!(),
                }
            }
        };

        log::trace!(target: targets::GENERATOR, "Node {node} ({cell:?}) {}: {output:?}", T::TAG);
        context.set_internal_container::<T>(timeframe, node, output)
    }
}
