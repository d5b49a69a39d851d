//! Assessment engine: model, normalizer, attempts, grading.
//!
//! This crate defines the quiz/question data model, the authoring
//! normalizer, the timed-attempt state machine, and the grading and
//! statistics logic the rest of edukit builds on.

pub mod attempt;
pub mod error;
pub mod grading;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod statistics;
pub mod traits;
