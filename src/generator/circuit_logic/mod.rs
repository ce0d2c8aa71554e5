/*!
Modules encoding the logic of a copy of a circuit, selected by a tag.

Each module is generic over a [container tag](crate::generator::tag::ContainerTag), and encodes only nodes with the tag:
- [InputLogicEncoder], primary inputs.
- [DefaultLogicEncoder], constants and combinational gates.
- [OutputLogicEncoder], primary outputs.
- [SequentialInputLogicEncoder] and [SequentialOutputLogicEncoder], the two halves of each sequential element.
- [SequentialConnectionEncoder], linking the halves across timeframes.

For tags other than [Good](crate::generator::tag::Tag::Good), inputs and the initial state of sequential elements share the value of the good copy where the node also has the good tag.
So, a fault is the only source of difference between copies.
*/

mod default;
mod input;
mod output;
mod sequential;

pub use default::DefaultLogicEncoder;
pub use input::InputLogicEncoder;
pub use output::OutputLogicEncoder;
pub use sequential::{SequentialConnectionEncoder, SequentialInputLogicEncoder, SequentialOutputLogicEncoder};

use crate::{
    circuit::Port,
    generator::{
        tag::{ContainerTag, GoodTag, PinData, Tag},
        AllowOverride, GeneratorContext,
    },
    types::err::ErrorKind,
};

/// The good container of a node converted to the container of tag `T`, if `T` is not the good tag and the node has the good tag.
fn shared_good<P: PinData, T: ContainerTag<P>>(
    context: &mut GeneratorContext<P>,
    timeframe: usize,
    node: usize,
) -> Result<Option<T::Container>, ErrorKind> {
    if T::TAG == Tag::Good || !context.has_tag(timeframe, node, Tag::Good) {
        return Ok(None);
    }
    let good = context.require_container_with::<GoodTag>(timeframe, node, Port::output(), AllowOverride::Disable)?;
    Ok(Some(context.encoder_mut().convert(&good)))
}
