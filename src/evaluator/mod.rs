//! Rule evaluator: gate, raw payout, zeroing policy and total

mod engine;
mod gating;

pub use engine::{evaluate, Evaluation, Evaluator};
pub use gating::apply_gate;
