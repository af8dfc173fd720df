//! Command handlers (imperative shell)
//!
//! Each handler reads its inputs, calls into the engine and the pure
//! helpers in `logic/`, and writes through an [`Output`](crate::output::Output).

pub mod common;
pub mod earnings;
pub mod palliative;
pub mod project;
pub mod qualify;
