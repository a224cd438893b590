//! Multi-agent pipeline for `loom run`.

mod context_store;
mod runner;

pub use context_store::{CONTEXT_PREFIX, ContextStore, result_key};
pub use runner::{
    DEFAULT_AGENT_TEMPLATE, EXECUTION_ORDER_KEY, PipelineOptions, PipelineOutcome, StepOutcome,
    execution_order, run_pipeline,
};
