pub mod analyzer;
pub mod indicators;

#[cfg(test)]
mod analyzer_tests;

pub use analyzer::*;
pub use indicators::*;
