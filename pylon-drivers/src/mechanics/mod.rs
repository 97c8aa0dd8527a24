//! Machine geometry implementations

pub mod delta;

pub use delta::{DeltaMechanics, Unreachable};
