//! Stage-by-stage pipeline orchestration.
//!
//! The orchestrator walks its [`StageGraph`] in order. Stages without
//! dependencies run on the caller's base context; the others get a fresh
//! context carrying exactly their declared upstream outputs. Task failures
//! flow downstream as error markers and never stop the run.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::domain::{ConfigError, ConfigResult, Context, OutputMap, TaskResult};
use crate::evaluator::{Evaluator, EvaluatorRegistry};
use crate::metrics::METRICS;
use crate::obs;
use crate::orchestration::aggregate::{aggregate, OrchestrationResult};
use crate::orchestration::executor::execute_task;
use crate::orchestration::merge::merge_context;
use crate::orchestration::parallel::{run_batch, TaskInvocation};
use crate::orchestration::stage::{StageDescriptor, StageGraph};

/// Drives a registry of evaluators through a stage graph.
#[derive(Debug, Clone)]
pub struct PipelineOrchestrator {
    registry: EvaluatorRegistry,
    graph: StageGraph,
}

impl PipelineOrchestrator {
    /// Orchestrator over the fixed evaluation graph.
    ///
    /// Fails with [`ConfigError::MissingEvaluators`] unless all seven
    /// evaluation tasks are registered. Extra registrations are ignored.
    pub fn new(registry: EvaluatorRegistry) -> ConfigResult<Self> {
        Self::with_graph(registry, StageGraph::evaluation())
    }

    /// Orchestrator over a custom graph.
    pub fn with_graph(registry: EvaluatorRegistry, graph: StageGraph) -> ConfigResult<Self> {
        graph.validate()?;

        let missing = registry.missing(graph.task_names());
        if !missing.is_empty() {
            return Err(ConfigError::MissingEvaluators { missing });
        }

        Ok(Self { registry, graph })
    }

    pub fn graph(&self) -> &StageGraph {
        &self.graph
    }

    pub fn registry(&self) -> &EvaluatorRegistry {
        &self.registry
    }

    /// Run every stage against `base` and aggregate the outputs.
    ///
    /// Always completes; individual task failures are recorded in the
    /// returned result rather than raised. `base` is never modified.
    #[instrument(skip(self, base), fields(run_id = tracing::field::Empty))]
    pub async fn run_full_evaluation(&self, base: &Context) -> OrchestrationResult {
        let run_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("run_id", run_id.as_str());

        let started_at = Utc::now();
        obs::emit_pipeline_started(&run_id, self.graph.len(), self.graph.task_names().count());

        let mut outputs = OutputMap::new();
        for (index, stage) in self.graph.stages().iter().enumerate() {
            obs::emit_stage_started(index + 1, &stage.tasks, stage.parallel);
            let context = self.stage_context(stage, base, &outputs);

            for (name, result) in stage.tasks.iter().zip(self.run_stage(stage, &context).await) {
                outputs.insert(name.clone(), result);
            }
        }

        let result = aggregate(outputs, started_at);
        METRICS.inc_pipelines();
        obs::emit_pipeline_finished(
            &run_id,
            result.summary.total,
            result.summary.succeeded,
            result.summary.failed,
        );
        result
    }

    /// The context a stage's tasks receive.
    fn stage_context(&self, stage: &StageDescriptor, base: &Context, outputs: &OutputMap) -> Context {
        if !stage.merges_upstream() {
            return base.clone();
        }

        // Graph validation guarantees every dependency ran in an earlier stage.
        let upstream = stage
            .depends_on
            .iter()
            .filter_map(|dep| outputs.get(dep).map(|result| (dep.as_str(), result)));
        let merged = merge_context(base, upstream);
        debug!(tasks = ?stage.tasks, deps = ?stage.depends_on, "built merged stage context");
        merged
    }

    async fn run_stage(&self, stage: &StageDescriptor, context: &Context) -> Vec<TaskResult> {
        let evaluators: Vec<Arc<dyn Evaluator>> = stage
            .tasks
            .iter()
            .filter_map(|task| self.registry.get(task).cloned())
            .collect();

        if stage.parallel && evaluators.len() > 1 {
            let invocations = evaluators
                .into_iter()
                .map(|evaluator| TaskInvocation::new(evaluator, context.clone()))
                .collect();
            run_batch(invocations).await
        } else {
            let mut results = Vec::with_capacity(evaluators.len());
            for evaluator in evaluators {
                results.push(execute_task(evaluator.as_ref(), context).await);
            }
            results
        }
    }
}
