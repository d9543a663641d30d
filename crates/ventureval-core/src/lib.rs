//! ventureval core library
//!
//! A deterministic evaluation pipeline: seven evaluators run in five
//! dependency-ordered stages, their outputs are reduced to a weighted score,
//! and the result is assembled into a report.

pub mod config;
pub mod domain;
pub mod evaluator;
pub mod metrics;
pub mod obs;
pub mod orchestration;
pub mod report;
pub mod response;
pub mod scoring;
pub mod service;
pub mod store;
pub mod telemetry;

pub use config::EngineConfig;
pub use domain::{
    ConfigError, ConfigResult, Context, ContextError, EvaluatorError, ExecutionMeta, OutputMap,
    TaskOutcome, TaskResult, CONFIDENCE_FIELD, UPSTREAM_OUTPUTS_KEY,
};
pub use evaluator::{Evaluator, EvaluatorKind, EvaluatorRegistry};
pub use orchestration::{
    aggregate, execute_task, gather_ordered, merge_context, run_batch, OrchestrationResult,
    PipelineOrchestrator, RunSummary, StageDescriptor, StageGraph, TaskInvocation, UNKNOWN_TASK,
};
pub use report::{build_report, render_report_md, Report, ReportSummary, RiskLabel, RiskThresholds};
pub use response::{extract_json, TextEvaluator, TextResponder};
pub use scoring::{score, ScoreComponent, ScoringConfig, ScoringResult, ScoringWeights};
pub use service::{EvaluationService, PersistenceStatus, StoredReport};
pub use store::{FsReportStore, MemoryReportStore, ReportStore, StoreError};
pub use telemetry::init_tracing;

/// Crate version, shared by every workspace member.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
