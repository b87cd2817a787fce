//! Report and chart-bundle generation.

pub mod generator;

pub use generator::*;
