//! The analysis engines.
//!
//! Totals feed every other engine; materiality, deviation and sensitivity
//! are independent of each other. All of them are pure functions of their
//! inputs and hold no state between calls.

pub mod deviation;
pub mod materiality;
pub mod report;
pub mod sensitivity;
pub mod totals;
