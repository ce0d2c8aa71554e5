use crate::{
    generator::{
        fault::model::{FaultSite, StuckAt, TransitionDelay},
        tag::{PinData, Tag},
        tagger::pairs_to_extend,
        GenerationTarget, GeneratorContext, GeneratorModule, Phase, TaggingDirection,
    },
    misc::log::targets::{self},
    types::err::ErrorKind,
};

/// How sequential elements are treated when tagging the cones of a fault.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaggingMode {
    /// Cones extend across timeframes through each pair of secondary input and output.
    Functional,
    /// Sequential elements are cut, as with full scan: secondary inputs are controlled and secondary outputs observed.
    Scan,
}

/// Tags the cones of a list of faults, on every timeframe.
///
/// - Each fault site has the good, bad, and fault location tags, and its input cone the fault input cone tag.
/// - The output cone of the sites has the good, bad, and fault output cone tags.
/// - The input cone of the output cone, which supports the good values compared against, has the good and fault support input cone tags.
///
/// In [functional](TaggingMode::Functional) mode a secondary input whose pair has the bad tag on the previous timeframe extends the output cone, and a secondary output whose pair has the good tag on the next timeframe extends the support.
pub struct FaultCircuitTagger<F: FaultSite> {
    faults: Vec<F>,
    mode: TaggingMode,
}

pub type StuckAtFaultCircuitTagger = FaultCircuitTagger<StuckAt>;

pub type TransitionDelayFaultCircuitTagger = FaultCircuitTagger<TransitionDelay>;

impl<F: FaultSite> FaultCircuitTagger<F> {
    pub fn new(faults: Vec<F>, mode: TaggingMode) -> Self {
        FaultCircuitTagger { faults, mode }
    }

    fn sites(&self) -> Vec<usize> {
        self.faults.iter().map(|fault| fault.node()).collect()
    }
}

impl<P: PinData, F: FaultSite> GeneratorModule<P> for FaultCircuitTagger<F> {
    fn name(&self) -> &'static str {
        "fault-circuit-tagger"
    }

    fn phase(&self) -> Phase {
        Phase::FaultTagging
    }

    fn pre_tag_circuit(&self, context: &mut GeneratorContext<P>) -> Result<(), ErrorKind> {
        for fault in &self.faults {
            fault.validate(context.circuit())?;
        }
        Ok(())
    }

    fn tag_timeframe(
        &self,
        context: &mut GeneratorContext<P>,
        timeframe: usize,
        direction: TaggingDirection,
    ) -> Result<(), ErrorKind> {
        let circuit = context.circuit_handle();
        let functional = self.mode == TaggingMode::Functional;

        match direction {
            TaggingDirection::Forward => {
                let sites = self.sites();
                for site in &sites {
                    context.add_tag(timeframe, *site, Tag::FaultLocation)?;
                }
                context.tag_input_cone(timeframe, &sites, &[Tag::Good, Tag::FaultInputCone])?;

                let mut seeds = sites;
                if functional {
                    if let Some(previous) = context.previous_timeframe(timeframe) {
                        seeds.extend(pairs_to_extend(
                            context,
                            &circuit,
                            previous,
                            timeframe,
                            Tag::Bad,
                            circuit.secondary_inputs(),
                        ));
                    }
                }

                // With a single stored timeframe the pairs loop back, and are followed until nothing changes.
                while !seeds.is_empty() {
                    context.tag_output_cone(timeframe, &seeds, &[Tag::Good, Tag::Bad, Tag::FaultOutputCone])?;
                    seeds = match functional && context.is_bmc() {
                        true => pairs_to_extend(context, &circuit, timeframe, timeframe, Tag::Bad, circuit.secondary_inputs()),
                        false => Vec::default(),
                    };
                }

                let bad: Vec<usize> = context.timeframe(timeframe)?.tagged_nodes(Tag::Bad).collect();
                context.tag_input_cone(timeframe, &bad, &[Tag::Good, Tag::FaultSupportInputCone])?;
            }

            TaggingDirection::Backward if functional => {
                let next = match context.is_bmc() {
                    true => timeframe,
                    false => timeframe + 1,
                };
                if next >= context.number_of_timeframes(GenerationTarget::CircuitTagging) && !context.is_bmc() {
                    return Ok(());
                }
                loop {
                    let seeds = pairs_to_extend(context, &circuit, next, timeframe, Tag::Good, circuit.secondary_outputs());
                    if seeds.is_empty() {
                        break;
                    }
                    context.tag_input_cone(timeframe, &seeds, &[Tag::Good, Tag::FaultSupportInputCone])?;
                }
            }

            TaggingDirection::Backward => {}
        }

        log::debug!(target: targets::TAGGING, "Timeframe {timeframe} ({direction:?}): {} faults tagged", self.faults.len());
        Ok(())
    }
}

#[cfg(test)]
mod tagger_tests {
    use super::*;
    use crate::{
        circuit::{CellType, Circuit, CircuitBuilder, Port},
        config::Config,
        generator::{fault::StuckAtKind, tag::PinDataG, LogicGenerator},
        solver::BackendKind,
        structures::container::Container01X,
    };

    type Data = PinDataG<Container01X>;

    // a -> q (state) ; q, b -> and -> d ; and -> out
    fn circuit() -> Circuit {
        let mut builder = CircuitBuilder::default();
        let a = builder.add_node("a", CellType::PIn, &[]).unwrap();
        let b = builder.add_node("b", CellType::PIn, &[]).unwrap();
        let q = builder.add_node("q", CellType::SIn, &[]).unwrap();
        let and = builder.add_node("and", CellType::And, &[Some(q), Some(b)]).unwrap();
        builder.add_node("out", CellType::POut, &[Some(and)]).unwrap();
        let d = builder.add_node("d", CellType::SOut, &[Some(a), None, None, None]).unwrap();
        builder.pair_secondary(q, d).unwrap();
        builder.build().unwrap()
    }

    fn tagged(mode: TaggingMode, fault: StuckAt) -> GeneratorContext<Data> {
        let context = GeneratorContext::new(circuit(), BackendKind::Sat, &Config::default());
        let mut generator = LogicGenerator::new(context);
        generator.set_number_of_timeframes(2).unwrap();
        generator.emplace_module(Box::new(StuckAtFaultCircuitTagger::new(vec![fault], mode))).unwrap();
        generator.generate_circuit_logic().unwrap();
        generator.into_context()
    }

    #[test]
    fn scan_cones() {
        let context = tagged(TaggingMode::Scan, StuckAt::new(0, Port::output(), StuckAtKind::One));
        for timeframe in 0..2 {
            assert!(context.has_tag(timeframe, 0, Tag::FaultLocation));
            assert!(context.has_tag(timeframe, 5, Tag::Bad));
            assert!(!context.has_tag(timeframe, 2, Tag::Bad));
            assert!(!context.has_tag(timeframe, 4, Tag::Good));
        }
    }

    #[test]
    fn functional_cones() {
        let context = tagged(TaggingMode::Functional, StuckAt::new(0, Port::output(), StuckAtKind::One));
        assert!(!context.has_tag(0, 4, Tag::Bad));
        assert!(context.has_tag(1, 2, Tag::Bad));
        assert!(context.has_tag(1, 4, Tag::FaultOutputCone));
        // The good value compared at the and gate needs b.
        assert!(context.has_tag(1, 1, Tag::FaultSupportInputCone));
    }

    #[test]
    fn support_across_timeframes() {
        // A fault at b is observed at out through the and gate, which reads the state q.
        let context = tagged(TaggingMode::Functional, StuckAt::new(1, Port::output(), StuckAtKind::Zero));
        assert!(context.has_tag(1, 2, Tag::Good));
        assert!(context.has_tag(0, 5, Tag::Good));
        assert!(context.has_tag(0, 0, Tag::FaultSupportInputCone));
    }
}
