//! A library for compiling gate-level circuits into constraints for automatic test pattern generation.
//!
//! tpg_logic lowers a netlist into boolean clauses for a SAT solver, or into an initial/transition/target system for a bounded model checker, such that a satisfying assignment is a test pattern exposing some fault at an observable output.
//!
//! # Orientation
//!
//! The library is designed around a [generator context](crate::generator::GeneratorContext).
//!
//! A context holds:
//! - A [circuit](crate::circuit), read but never mutated.
//! - A sequence of [timeframes](crate::generator::Timeframe), each storing a tag set and symbolic values for every node.
//! - An [encoder](crate::encoder::LogicEncoder), through which every literal and clause reaches a [solver back end](crate::solver).
//!
//! Constraints are produced by [modules](crate::generator::GeneratorModule), registered in [phase](crate::generator::Phase) order with a [logic generator](crate::generator::LogicGenerator).
//! Some modules encode gates, others inject faults, link timeframes, or ask for a fault effect to be observable.
//!
//! Signals are represented by [logic containers](crate::structures::container), made of one or two [literals](crate::structures::literal) and interpreted in one of a handful of logic domains:
//! - `01`, a plain boolean.
//! - `01X`, with a don't-care value.
//! - `U01X`, with both an unknown and a don't-care value.
//!
//! Each copy of the circuit (the fault-free copy, the faulty copy, the difference of the two) is selected by a [tag](crate::generator::tag).
//!
//! # Example
//!
//! ```rust
//! use tpg_logic::{
//!     circuit::{CellType, CircuitBuilder},
//!     config::Config,
//!     generator::{
//!         circuit_logic::{DefaultLogicEncoder, InputLogicEncoder, OutputLogicEncoder},
//!         tag::{GoodTag, PinDataGB},
//!         tagger::WholeCircuitTagger,
//!         GeneratorContext, LogicGenerator,
//!     },
//!     solver::BackendKind,
//!     structures::{container::Container01X, logic::Logic},
//! };
//!
//! let mut builder = CircuitBuilder::default();
//! let a = builder.add_node("a", CellType::PIn, &[]).unwrap();
//! let b = builder.add_node("b", CellType::PIn, &[]).unwrap();
//! let and = builder.add_node("and", CellType::And, &[Some(a), Some(b)]).unwrap();
//! builder.add_node("out", CellType::POut, &[Some(and)]).unwrap();
//! let circuit = builder.build().unwrap();
//!
//! type Data = PinDataGB<Container01X, Container01X>;
//! let context = GeneratorContext::<Data>::new(circuit, BackendKind::Sat, &Config::default());
//! let mut generator = LogicGenerator::new(context);
//! generator.set_number_of_timeframes(1).unwrap();
//! generator.emplace_module(Box::new(WholeCircuitTagger::<GoodTag>::default())).unwrap();
//! generator.emplace_module(Box::new(InputLogicEncoder::<GoodTag>::default())).unwrap();
//! generator.emplace_module(Box::new(DefaultLogicEncoder::<GoodTag>::default())).unwrap();
//! generator.emplace_module(Box::new(OutputLogicEncoder::<GoodTag>::default())).unwrap();
//! generator.generate_circuit_logic().unwrap();
//!
//! let context = generator.context_mut();
//! let output = context.require_container::<GoodTag>(0, 3, tpg_logic::circuit::Port::output()).unwrap();
//! context.encoder_mut().encode_value(&output, Logic::One);
//! assert_eq!(context.solve().unwrap(), tpg_logic::solver::SolverResult::Satisfiable);
//! ```

pub mod circuit;
pub mod config;
pub mod encoder;
pub mod generator;
pub mod solver;
pub mod structures;
pub mod types;

pub mod generic;

pub mod misc;
