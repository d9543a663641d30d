//! Stage graph definitions.
//!
//! The evaluation pipeline is a short, fixed sequence of stages. Each stage
//! names the tasks it runs and the upstream tasks whose outputs it consumes.
//! Keeping this as data lets the orchestrator's barrier/merge logic run (and
//! be tested) against any small graph, not only the default one.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::{ConfigError, ConfigResult};
use crate::evaluator::EvaluatorKind;

/// One barrier point in the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDescriptor {
    /// Tasks run in this stage, in output order.
    pub tasks: Vec<String>,

    /// Upstream tasks merged into this stage's context. Empty means the stage
    /// runs on the caller's base context.
    pub depends_on: Vec<String>,

    /// Whether the tasks fan out concurrently.
    pub parallel: bool,
}

impl StageDescriptor {
    /// A stage running a single task.
    pub fn single(task: impl Into<String>) -> Self {
        Self {
            tasks: vec![task.into()],
            depends_on: Vec::new(),
            parallel: false,
        }
    }

    /// A stage fanning out over several independent tasks.
    pub fn parallel<I, S>(tasks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tasks: tasks.into_iter().map(Into::into).collect(),
            depends_on: Vec::new(),
            parallel: true,
        }
    }

    /// Declare the upstream tasks this stage consumes.
    pub fn after<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = deps.into_iter().map(Into::into).collect();
        self
    }

    /// Whether this stage runs on a merged context.
    pub fn merges_upstream(&self) -> bool {
        !self.depends_on.is_empty()
    }
}

/// Ordered list of stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageGraph {
    stages: Vec<StageDescriptor>,
}

impl StageGraph {
    /// Build and validate a graph.
    pub fn new(stages: Vec<StageDescriptor>) -> ConfigResult<Self> {
        let graph = Self { stages };
        graph.validate()?;
        Ok(graph)
    }

    /// The fixed evaluation graph.
    ///
    /// ```text
    /// 1: validator
    /// 2: financial, market, competition   (parallel)
    /// 3: risk          <- financial, market, competition
    /// 4: longevity     <- financial, market, risk
    /// 5: investor_fit  <- financial, risk, longevity
    /// ```
    pub fn evaluation() -> Self {
        use EvaluatorKind::*;
        Self {
            stages: vec![
                StageDescriptor::single(Validator.name()),
                StageDescriptor::parallel([Financial.name(), Market.name(), Competition.name()]),
                StageDescriptor::single(Risk.name()).after([
                    Financial.name(),
                    Market.name(),
                    Competition.name(),
                ]),
                StageDescriptor::single(Longevity.name()).after([
                    Financial.name(),
                    Market.name(),
                    Risk.name(),
                ]),
                StageDescriptor::single(InvestorFit.name()).after([
                    Financial.name(),
                    Risk.name(),
                    Longevity.name(),
                ]),
            ],
        }
    }

    pub fn stages(&self) -> &[StageDescriptor] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Every task name, in declaration order.
    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.stages
            .iter()
            .flat_map(|stage| stage.tasks.iter().map(String::as_str))
    }

    /// Check structural rules:
    /// - no empty stage;
    /// - every task declared once;
    /// - a stage only depends on tasks declared in earlier stages.
    pub fn validate(&self) -> ConfigResult<()> {
        let mut declared: HashSet<&str> = HashSet::new();

        for (index, stage) in self.stages.iter().enumerate() {
            let number = index + 1;
            if stage.tasks.is_empty() {
                return Err(ConfigError::InvalidStageGraph(format!(
                    "stage {number} declares no tasks"
                )));
            }

            for dep in &stage.depends_on {
                if !declared.contains(dep.as_str()) {
                    return Err(ConfigError::InvalidStageGraph(format!(
                        "stage {number} depends on '{dep}', which no earlier stage produces"
                    )));
                }
            }

            for task in &stage.tasks {
                if !declared.insert(task.as_str()) {
                    return Err(ConfigError::InvalidStageGraph(format!(
                        "task '{task}' is declared more than once"
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for StageGraph {
    fn default() -> Self {
        Self::evaluation()
    }
}
