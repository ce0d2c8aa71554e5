/*!
Tags, selecting a copy of the circuit.

An encoding may hold several symbolic copies of a circuit at once, each selected by a [Tag]:
- [Good](Tag::Good), the fault-free circuit.
- [Bad](Tag::Bad), the faulty circuit.
- [Diff](Tag::Diff), whether the good and bad values at a node differ.
- [LDiff](Tag::LDiff), whether the good and bad values at a node are distinguishable in the weaker sense of not being equal.

Further tags mark nodes in relation to a fault, such as [FaultLocation](Tag::FaultLocation), and have no container.

The set of tags is closed.
Each tag with a container is also a (zero sized) [type](ContainerTag), which fixes the type of container for the tag, given the [PinData] of a context.
So, reads and writes of containers are checked at compile time:

```rust
# use tpg_logic::generator::tag::*;
# use tpg_logic::structures::container::*;
type Data = PinDataGB<ContainerU01X, Container01X>;

fn good_container(_: <GoodTag as ContainerTag<Data>>::Container) {}
good_container(ContainerU01X::default());

fn diff_container(_: <DiffTag as ContainerTag<Data>>::Container) {}
diff_container(Container01::default());
```
*/

use std::marker::PhantomData;

use crate::{
    circuit::Port,
    generator::{
        overrides::OverrideTable, timeframe::PinSlot, AllowOverride, GeneratorContext,
    },
    structures::container::{Container01, LogicContainer},
    types::err::ErrorKind,
};

/// A tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tag {
    Good,
    Bad,
    Diff,
    LDiff,
    FaultLocation,
    FaultOutputCone,
    FaultInputCone,
    FaultSupportOutputCone,
    FaultSupportInputCone,
}

impl Tag {
    pub const ALL: [Tag; 9] = [
        Tag::Good,
        Tag::Bad,
        Tag::Diff,
        Tag::LDiff,
        Tag::FaultLocation,
        Tag::FaultOutputCone,
        Tag::FaultInputCone,
        Tag::FaultSupportOutputCone,
        Tag::FaultSupportInputCone,
    ];

    const fn bit(&self) -> u16 {
        1 << (*self as u16)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Tag::Good => "good",
            Tag::Bad => "bad",
            Tag::Diff => "diff",
            Tag::LDiff => "ldiff",
            Tag::FaultLocation => "fault-location",
            Tag::FaultOutputCone => "fault-output-cone",
            Tag::FaultInputCone => "fault-input-cone",
            Tag::FaultSupportOutputCone => "fault-support-output-cone",
            Tag::FaultSupportInputCone => "fault-support-input-cone",
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A set of tags, as bits.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TagSet(u16);

impl TagSet {
    pub fn contains(&self, tag: Tag) -> bool {
        self.0 & tag.bit() != 0
    }

    /// Adds `tag`, returning whether the tag was new to the set.
    pub fn insert(&mut self, tag: Tag) -> bool {
        let fresh = !self.contains(tag);
        self.0 |= tag.bit();
        fresh
    }

    pub fn remove(&mut self, tag: Tag) {
        self.0 &= !tag.bit();
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Tag> + '_ {
        Tag::ALL.into_iter().filter(|tag| self.contains(*tag))
    }
}

impl std::fmt::Debug for TagSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// The containers used for the good and bad copies of a circuit.
pub trait PinData: 'static {
    type Good: LogicContainer;
    type Bad: LogicContainer;
}

/// Pin data with good containers of type `G` and bad containers of type `B`.
pub struct PinDataGB<G, B>(PhantomData<fn() -> (G, B)>);

impl<G: LogicContainer, B: LogicContainer> PinData for PinDataGB<G, B> {
    type Good = G;
    type Bad = B;
}

/// Pin data with only good containers, of type `G`.
pub type PinDataG<G> = PinDataGB<G, G>;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::GoodTag {}
    impl Sealed for super::BadTag {}
    impl Sealed for super::DiffTag {}
    impl Sealed for super::LDiffTag {}
}

/// A tag with a container.
pub trait ContainerTag<P: PinData>: sealed::Sealed + 'static {
    const TAG: Tag;
    type Container: LogicContainer;

    /// The slot of the tag within the slots of a node, if the tag has a slot.
    fn slot(slot: &PinSlot<P>) -> Option<&Self::Container>;

    fn slot_mut(slot: &mut PinSlot<P>) -> Option<&mut Self::Container>;

    fn overrides(table: &OverrideTable<P>) -> &std::collections::HashMap<(usize, usize, Port), Self::Container>;

    fn overrides_mut(
        table: &mut OverrideTable<P>,
    ) -> &mut std::collections::HashMap<(usize, usize, Port), Self::Container>;

    /// A container for the output of a node without the tag, if one can be derived from other tags.
    fn fallback(
        context: &mut GeneratorContext<P>,
        timeframe: usize,
        node: usize,
        allow: AllowOverride,
    ) -> Result<Option<Self::Container>, ErrorKind>;
}

/// The tag of the good copy.
#[derive(Clone, Copy, Debug, Default)]
pub struct GoodTag;

/// The tag of the bad copy.
#[derive(Clone, Copy, Debug, Default)]
pub struct BadTag;

/// The tag of the difference between the good and bad copy.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiffTag;

/// The tag of the local difference between the good and bad copy.
#[derive(Clone, Copy, Debug, Default)]
pub struct LDiffTag;

impl<P: PinData> ContainerTag<P> for GoodTag {
    const TAG: Tag = Tag::Good;
    type Container = P::Good;

    fn slot(slot: &PinSlot<P>) -> Option<&Self::Container> {
        Some(&slot.good)
    }

    fn slot_mut(slot: &mut PinSlot<P>) -> Option<&mut Self::Container> {
        Some(&mut slot.good)
    }

    fn overrides(table: &OverrideTable<P>) -> &std::collections::HashMap<(usize, usize, Port), Self::Container> {
        &table.good
    }

    fn overrides_mut(
        table: &mut OverrideTable<P>,
    ) -> &mut std::collections::HashMap<(usize, usize, Port), Self::Container> {
        &mut table.good
    }

    fn fallback(
        _context: &mut GeneratorContext<P>,
        _timeframe: usize,
        _node: usize,
        _allow: AllowOverride,
    ) -> Result<Option<Self::Container>, ErrorKind> {
        Ok(None)
    }
}

impl<P: PinData> ContainerTag<P> for BadTag {
    const TAG: Tag = Tag::Bad;
    type Container = P::Bad;

    fn slot(slot: &PinSlot<P>) -> Option<&Self::Container> {
        Some(&slot.bad)
    }

    fn slot_mut(slot: &mut PinSlot<P>) -> Option<&mut Self::Container> {
        Some(&mut slot.bad)
    }

    fn overrides(table: &OverrideTable<P>) -> &std::collections::HashMap<(usize, usize, Port), Self::Container> {
        &table.bad
    }

    fn overrides_mut(
        table: &mut OverrideTable<P>,
    ) -> &mut std::collections::HashMap<(usize, usize, Port), Self::Container> {
        &mut table.bad
    }

    /// Outside of the faulty copy, the bad value is the good value.
    fn fallback(
        context: &mut GeneratorContext<P>,
        timeframe: usize,
        node: usize,
        allow: AllowOverride,
    ) -> Result<Option<Self::Container>, ErrorKind> {
        if !context.has_tag(timeframe, node, Tag::Good) {
            return Ok(None);
        }
        let good = context.get_container::<GoodTag>(timeframe, node, Port::output(), allow)?;
        if !good.is_set() {
            return Ok(None);
        }
        Ok(Some(context.encoder_mut().convert(&good)))
    }
}

impl<P: PinData> ContainerTag<P> for DiffTag {
    const TAG: Tag = Tag::Diff;
    type Container = Container01;

    fn slot(slot: &PinSlot<P>) -> Option<&Self::Container> {
        Some(&slot.diff)
    }

    fn slot_mut(slot: &mut PinSlot<P>) -> Option<&mut Self::Container> {
        Some(&mut slot.diff)
    }

    fn overrides(table: &OverrideTable<P>) -> &std::collections::HashMap<(usize, usize, Port), Self::Container> {
        &table.diff
    }

    fn overrides_mut(
        table: &mut OverrideTable<P>,
    ) -> &mut std::collections::HashMap<(usize, usize, Port), Self::Container> {
        &mut table.diff
    }

    fn fallback(
        context: &mut GeneratorContext<P>,
        timeframe: usize,
        node: usize,
        allow: AllowOverride,
    ) -> Result<Option<Self::Container>, ErrorKind> {
        let Some((good, bad)) = good_and_bad(context, timeframe, node, allow)? else {
            return Ok(None);
        };
        Ok(Some(context.encoder_mut().difference_01_detector(&good, &bad)))
    }
}

impl<P: PinData> ContainerTag<P> for LDiffTag {
    const TAG: Tag = Tag::LDiff;
    type Container = Container01;

    fn slot(_slot: &PinSlot<P>) -> Option<&Self::Container> {
        None
    }

    fn slot_mut(_slot: &mut PinSlot<P>) -> Option<&mut Self::Container> {
        None
    }

    fn overrides(table: &OverrideTable<P>) -> &std::collections::HashMap<(usize, usize, Port), Self::Container> {
        &table.ldiff
    }

    fn overrides_mut(
        table: &mut OverrideTable<P>,
    ) -> &mut std::collections::HashMap<(usize, usize, Port), Self::Container> {
        &mut table.ldiff
    }

    fn fallback(
        context: &mut GeneratorContext<P>,
        timeframe: usize,
        node: usize,
        allow: AllowOverride,
    ) -> Result<Option<Self::Container>, ErrorKind> {
        let Some((good, bad)) = good_and_bad(context, timeframe, node, allow)? else {
            return Ok(None);
        };
        Ok(Some(context.encoder_mut().equivalence_detector(&good, &bad).negate()))
    }
}

/// The good and bad containers at the output of a node, with the bad container in the domain of the good container.
fn good_and_bad<P: PinData>(
    context: &mut GeneratorContext<P>,
    timeframe: usize,
    node: usize,
    allow: AllowOverride,
) -> Result<Option<(P::Good, P::Good)>, ErrorKind> {
    if !context.has_tag(timeframe, node, Tag::Good) {
        return Ok(None);
    }
    let good = context.get_container::<GoodTag>(timeframe, node, Port::output(), allow)?;
    let bad = context.get_container::<BadTag>(timeframe, node, Port::output(), allow)?;
    if !good.is_set() || !bad.is_set() {
        return Ok(None);
    }
    let bad = context.encoder_mut().convert(&bad);
    Ok(Some((good, bad)))
}
