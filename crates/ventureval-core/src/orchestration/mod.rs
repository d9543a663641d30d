//! Pipeline orchestration.
//!
//! # Module layout
//!
//! - [`executor`]: `execute_task` runs one evaluator with failures isolated
//! - [`parallel`]: `run_batch` and `gather_ordered` fan out, preserving order
//! - [`merge`]: `merge_context` layers upstream outputs onto a base context
//! - [`aggregate`]: `aggregate`, `OrchestrationResult`, `RunSummary`
//! - [`stage`]: `StageGraph`, `StageDescriptor`
//! - [`pipeline`]: `PipelineOrchestrator`

pub mod aggregate;
pub mod executor;
pub mod merge;
pub mod parallel;
pub mod pipeline;
pub mod stage;

pub use aggregate::{aggregate, OrchestrationResult, RunSummary};
pub use executor::execute_task;
pub use merge::{merge_context, upstream_entry};
pub use parallel::{gather_ordered, run_batch, TaskInvocation, UNKNOWN_TASK};
pub use pipeline::PipelineOrchestrator;
pub use stage::{StageDescriptor, StageGraph};
