pub mod compare;
pub mod evaluator;

pub use compare::{evaluate_all, ModelInput, ModelOutcome};
pub use evaluator::{evaluate, evaluate_model, EvaluationReport};
