//! Sample data: the built-in demo table and random table generation.

pub mod demo;
pub mod generator;
