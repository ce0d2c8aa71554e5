//! Generic structures, not specific to circuits or encodings.
pub mod minimal_pcg;
