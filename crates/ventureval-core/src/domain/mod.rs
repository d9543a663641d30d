//! Domain types shared by every stage of the engine.

pub mod context;
pub mod error;
pub mod task_result;

pub use context::{Context, UPSTREAM_OUTPUTS_KEY};
pub use error::{ConfigError, ConfigResult, ContextError, EvaluatorError};
pub use task_result::{ExecutionMeta, OutputMap, TaskOutcome, TaskResult, CONFIDENCE_FIELD};
