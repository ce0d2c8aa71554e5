/*!
The logic generator, which drives modules over a context.

A [LogicGenerator] owns a [GeneratorContext] and a list of [modules](GeneratorModule).
A module handles some part of an encoding, such as the logic of gates, a fault, or a constraint that a fault is observed.
[generate_circuit_logic](LogicGenerator::generate_circuit_logic) calls the hooks of every module in a fixed order, documented on [GeneratorModule].

Modules are registered in [phase](Phase) order, and registering a module of an earlier phase than the last registered module is an error.

# Example

A generator for the stuck-at-0 fault at the output of an and gate:

```rust
# use tpg_logic::{circuit::*, config::Config, solver::*, structures::container::*};
# use tpg_logic::generator::{*, circuit_logic::*, dchain::*, fault::*, tag::*};
let mut builder = CircuitBuilder::default();
let a = builder.add_node("a", CellType::PIn, &[]).unwrap();
let b = builder.add_node("b", CellType::PIn, &[]).unwrap();
let and = builder.add_node("and", CellType::And, &[Some(a), Some(b)]).unwrap();
builder.add_node("out", CellType::POut, &[Some(and)]).unwrap();

let fault = StuckAt::new(and, Port::output(), StuckAtKind::Zero);

type Data = PinDataGB<Container01X, Container01X>;
let context = GeneratorContext::<Data>::new(builder.build().unwrap(), BackendKind::Sat, &Config::default());
let mut generator = LogicGenerator::new(context);
generator.set_number_of_timeframes(1).unwrap();
generator.emplace_module(Box::new(StuckAtFaultCircuitTagger::new(vec![fault], TaggingMode::Scan))).unwrap();
generator.emplace_module(Box::new(DChainCircuitTagger)).unwrap();
generator.emplace_module(Box::new(InputLogicEncoder::<GoodTag>::default())).unwrap();
generator.emplace_module(Box::new(InputLogicEncoder::<BadTag>::default())).unwrap();
generator.emplace_module(Box::new(DefaultLogicEncoder::<GoodTag>::default())).unwrap();
generator.emplace_module(Box::new(DefaultLogicEncoder::<BadTag>::default())).unwrap();
generator.emplace_module(Box::new(OutputLogicEncoder::<GoodTag>::default())).unwrap();
generator.emplace_module(Box::new(OutputLogicEncoder::<BadTag>::default())).unwrap();
generator.emplace_module(Box::new(StuckAtFaultEncoder::new(vec![fault]))).unwrap();
generator.emplace_module(Box::new(DChainBaseEncoder)).unwrap();
generator.emplace_module(Box::new(BackwardDChainEncoder)).unwrap();
generator.emplace_module(Box::new(FaultPropagationConstraintEncoder::default())).unwrap();
generator.generate_circuit_logic().unwrap();

assert_eq!(generator.context_mut().solve(), Ok(SolverResult::Satisfiable));
```
*/

pub mod circuit_logic;
pub mod constraint;
pub mod dchain;
pub mod extract;
pub mod fault;
pub mod tag;
pub mod tagger;

mod context;
mod module;
pub mod overrides;
mod timeframe;

pub use context::{AllowOverride, AttemptState, GenerationTarget, GeneratorContext};
pub use module::{GeneratorModule, Phase, TaggingDirection};
pub use timeframe::{PinSlot, Timeframe};

use crate::{
    misc::log::targets::{self},
    types::err::{self, ErrorKind},
};
use tag::PinData;

/// A logic generator.
pub struct LogicGenerator<P: PinData> {
    context: GeneratorContext<P>,
    modules: Vec<Box<dyn GeneratorModule<P>>>,
}

impl<P: PinData> LogicGenerator<P> {
    pub fn new(context: GeneratorContext<P>) -> Self {
        LogicGenerator {
            context,
            modules: Vec::default(),
        }
    }

    pub fn context(&self) -> &GeneratorContext<P> {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut GeneratorContext<P> {
        &mut self.context
    }

    pub fn into_context(self) -> GeneratorContext<P> {
        self.context
    }

    pub fn set_number_of_timeframes(&mut self, count: usize) -> Result<(), ErrorKind> {
        self.context.set_number_of_timeframes(count)
    }

    /// Registers a module, after every module registered so far.
    pub fn emplace_module(&mut self, module: Box<dyn GeneratorModule<P>>) -> Result<(), ErrorKind> {
        if let Some(previous) = self.modules.last() {
            if module.phase() < previous.phase() {
                return Err(err::ConfigurationError::ModuleOrder {
                    module: module.name(),
                    phase: module.phase(),
                    previous: previous.phase(),
                }
                .into());
            }
        }
        self.context.transition(context::AttemptState::ModulesRegistered)?;

        log::debug!(target: targets::GENERATOR, "Module {} registered, phase {:?}", module.name(), module.phase());
        self.modules.push(module);
        Ok(())
    }

    pub fn modules(&self) -> impl Iterator<Item = &dyn GeneratorModule<P>> {
        self.modules.iter().map(|module| module.as_ref())
    }

    /// Calls [reset](GeneratorModule::reset) on every module.
    pub fn reset_modules(&mut self) {
        for module in &mut self.modules {
            module.reset();
        }
    }

    /// Calls `hook` on each module in registration order, stopping at the first error.
    fn each<F>(&mut self, hook: F) -> Result<(), ErrorKind>
    where
        F: Fn(&dyn GeneratorModule<P>, &mut GeneratorContext<P>) -> Result<(), ErrorKind>,
    {
        for module in &self.modules {
            if let Err(e) = hook(module.as_ref(), &mut self.context) {
                log::error!(target: targets::GENERATOR, "Module {} failed: {e}", module.name());
                return Err(e);
            }
        }
        Ok(())
    }

    /// Tags, encodes, and constrains the circuit, through each registered module.
    pub fn generate_circuit_logic(&mut self) -> Result<(), ErrorKind> {
        if self.context.state() != AttemptState::ModulesRegistered {
            return Err(err::StateError::InvalidTransition {
                from: self.context.state(),
                to: AttemptState::Encoded,
            }
            .into());
        }

        self.tag()?;
        self.encode()?;
        self.constrain()?;

        if let Some(error) = self.context.encoder_mut().take_error() {
            return Err(error.into());
        }
        self.context.transition(AttemptState::Encoded)?;

        log::info!(target: targets::GENERATOR, "Encoded with {} clauses", self.context.encoder().committed_clauses());
        Ok(())
    }

    fn tag(&mut self) -> Result<(), ErrorKind> {
        let timeframes = self.context.number_of_timeframes(GenerationTarget::CircuitTagging);

        self.each(|module, context| module.pre_tag_circuit(context))?;
        for timeframe in 0..timeframes {
            self.each(|module, context| module.tag_timeframe(context, timeframe, TaggingDirection::Forward))?;
        }
        for timeframe in (0..timeframes).rev() {
            self.each(|module, context| module.tag_timeframe(context, timeframe, TaggingDirection::Backward))?;
        }
        self.each(|module, context| module.tag_circuit(context))?;
        self.each(|module, context| module.post_tag_circuit(context))
    }

    fn encode(&mut self) -> Result<(), ErrorKind> {
        let timeframes = self.context.number_of_timeframes(GenerationTarget::CircuitEncoding);
        let nodes = self.context.circuit().node_count();

        self.each(|module, context| module.pre_encode_circuit(context))?;
        for timeframe in 0..timeframes {
            log::trace!(target: targets::GENERATOR, "Encoding timeframe {timeframe}");

            self.each(|module, context| module.pre_encode_timeframe(context, timeframe))?;
            for node in 0..nodes {
                self.each(|module, context| module.pre_encode_node(context, timeframe, node))?;
                self.each(|module, context| module.encode_node(context, timeframe, node))?;
                self.each(|module, context| module.post_encode_node(context, timeframe, node))?;
            }
            self.each(|module, context| module.encode_timeframe(context, timeframe))?;
            self.each(|module, context| module.post_encode_timeframe(context, timeframe))?;
        }
        self.each(|module, context| module.encode_circuit(context))?;
        self.each(|module, context| module.post_encode_circuit(context))
    }

    fn constrain(&mut self) -> Result<(), ErrorKind> {
        let timeframes = self.context.number_of_timeframes(GenerationTarget::ConstraintEncoding);

        self.each(|module, context| module.pre_constrain_circuit(context))?;
        for timeframe in 0..timeframes {
            self.each(|module, context| module.pre_constrain_timeframe(context, timeframe))?;
            self.each(|module, context| module.constrain_timeframe(context, timeframe))?;
            self.each(|module, context| module.post_constrain_timeframe(context, timeframe))?;
        }
        self.each(|module, context| module.constrain_circuit(context))?;
        self.each(|module, context| module.post_constrain_circuit(context))
    }
}

#[cfg(test)]
mod generator_tests {
    use super::*;
    use crate::{
        circuit::{CellType, CircuitBuilder},
        config::Config,
        generator::{
            circuit_logic::{DefaultLogicEncoder, InputLogicEncoder},
            tag::{GoodTag, PinDataG},
            tagger::WholeCircuitTagger,
        },
        solver::BackendKind,
        structures::container::{Container01, LogicContainer},
    };

    type Data = PinDataG<Container01>;

    fn generator() -> LogicGenerator<Data> {
        let mut builder = CircuitBuilder::default();
        let a = builder.add_node("a", CellType::PIn, &[]).unwrap();
        builder.add_node("inv", CellType::Inv, &[Some(a)]).unwrap();
        let context = GeneratorContext::new(builder.build().unwrap(), BackendKind::Sat, &Config::default());
        LogicGenerator::new(context)
    }

    #[test]
    fn modules_before_timeframes() {
        let mut generator = generator();
        assert!(generator
            .emplace_module(Box::new(WholeCircuitTagger::<GoodTag>::default()))
            .is_err());
    }

    #[test]
    fn phase_order() {
        let mut generator = generator();
        generator.set_number_of_timeframes(1).unwrap();
        generator
            .emplace_module(Box::new(DefaultLogicEncoder::<GoodTag>::default()))
            .unwrap();
        assert_eq!(
            generator.emplace_module(Box::new(WholeCircuitTagger::<GoodTag>::default())),
            Err(err::ConfigurationError::ModuleOrder {
                module: "whole-circuit-tagger",
                phase: Phase::Tagging,
                previous: Phase::CircuitLogic,
            }
            .into())
        );
    }

    #[test]
    fn generate_once() {
        let mut generator = generator();
        generator.set_number_of_timeframes(1).unwrap();
        generator
            .emplace_module(Box::new(WholeCircuitTagger::<GoodTag>::default()))
            .unwrap();
        generator
            .emplace_module(Box::new(InputLogicEncoder::<GoodTag>::default()))
            .unwrap();
        generator
            .emplace_module(Box::new(DefaultLogicEncoder::<GoodTag>::default()))
            .unwrap();
        generator.generate_circuit_logic().unwrap();
        assert_eq!(generator.context().state(), AttemptState::Encoded);
        assert!(generator.generate_circuit_logic().is_err());

        let a = generator
            .context_mut()
            .require_container::<GoodTag>(0, 0, crate::circuit::Port::output())
            .unwrap();
        let inv = generator
            .context_mut()
            .require_container::<GoodTag>(0, 1, crate::circuit::Port::output())
            .unwrap();
        assert_eq!(inv, a.negate());
    }
}
