//! Workflow registry and execution records.
//!
//! Triggering a workflow only records intent. Steps are run by an external
//! runner, which reports progress through [`WorkflowAutomationContract::record_step_result`]
//! and [`WorkflowAutomationContract::finish_execution`].

use memchain_primitives::{DataMap, SharedClock};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::contract::{ContractKind, ContractMeta, ContractState, SmartContract};
use crate::error::{ContractError, ContractFailure, ContractResult};
use crate::params::{into_result, object, parse, required, Outcome};

/// A registered workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    /// Registering instance
    pub owner: String,
    /// Opaque step descriptions
    pub steps: Vec<Value>,
    /// Opaque trigger descriptions
    pub triggers: Vec<Value>,
    /// Registration time, epoch micros
    pub created_at: i64,
    /// Whether the workflow can be triggered
    pub is_active: bool,
}

/// Lifecycle of an execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    /// Recorded, awaiting or under external execution
    Running,
    /// All steps done
    Completed,
    /// Aborted by the runner
    Failed,
}

/// A triggered run of a workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    /// Workflow being run
    pub workflow_id: String,
    /// Triggering instance
    pub triggered_by: String,
    /// Trigger time, epoch micros
    pub started_at: i64,
    /// Current status
    pub status: ExecutionStatus,
    /// Index of the next step to run
    pub current_step: usize,
    /// Trigger input
    pub input_data: Value,
    /// Results reported so far, one per finished step
    pub step_results: Vec<Value>,
}

#[derive(Deserialize)]
struct RegisterParams {
    #[serde(default)]
    workflow_id: Option<String>,
    #[serde(default)]
    steps: Option<Vec<Value>>,
    #[serde(default)]
    triggers: Option<Vec<Value>>,
}

#[derive(Deserialize)]
struct TriggerParams {
    #[serde(default)]
    workflow_id: Option<String>,
    #[serde(default)]
    input_data: Option<Value>,
}

#[derive(Deserialize)]
struct StatusParams {
    #[serde(default)]
    execution_id: Option<String>,
}

#[derive(Deserialize)]
struct ValidateParams {
    #[serde(default)]
    steps: Option<Vec<Value>>,
}

/// Workflow definitions and their executions.
///
/// Functions: `register_workflow`, `trigger_workflow`, `get_execution_status`.
#[derive(Debug)]
pub struct WorkflowAutomationContract {
    meta: ContractMeta,
    workflows: BTreeMap<String, WorkflowDefinition>,
    executions: BTreeMap<String, Execution>,
}

impl WorkflowAutomationContract {
    /// Create an empty registry
    pub fn new(contract_id: impl Into<String>, owner: impl Into<String>, clock: SharedClock) -> Self {
        Self {
            meta: ContractMeta::new(contract_id, owner, clock),
            workflows: BTreeMap::new(),
            executions: BTreeMap::new(),
        }
    }

    /// Look up a workflow definition
    pub fn workflow(&self, workflow_id: &str) -> Option<&WorkflowDefinition> {
        self.workflows.get(workflow_id)
    }

    /// Look up an execution record
    pub fn execution(&self, execution_id: &str) -> Option<&Execution> {
        self.executions.get(execution_id)
    }

    /// Append a finished step's result and move to the next step.
    ///
    /// The execution completes once every step has a result.
    pub fn record_step_result(&mut self, execution_id: &str, result: Value) -> Result<&Execution, ContractFailure> {
        let execution = self
            .executions
            .get_mut(execution_id)
            .ok_or(ContractFailure::NotFound("Execution not found"))?;
        if execution.status != ExecutionStatus::Running {
            return Err(ContractFailure::Validation("Execution is not running".to_string()));
        }
        let total_steps = self
            .workflows
            .get(&execution.workflow_id)
            .map(|w| w.steps.len())
            .unwrap_or(0);

        execution.step_results.push(result);
        execution.current_step += 1;
        if execution.current_step >= total_steps {
            execution.status = ExecutionStatus::Completed;
            tracing::info!("Execution {} completed", execution_id);
        }
        Ok(execution)
    }

    /// Mark a running execution as completed or failed
    pub fn finish_execution(&mut self, execution_id: &str, status: ExecutionStatus) -> Result<&Execution, ContractFailure> {
        if status == ExecutionStatus::Running {
            return Err(ContractFailure::Validation("final status must be completed or failed".to_string()));
        }
        let execution = self
            .executions
            .get_mut(execution_id)
            .ok_or(ContractFailure::NotFound("Execution not found"))?;
        if execution.status != ExecutionStatus::Running {
            return Err(ContractFailure::Validation("Execution is not running".to_string()));
        }
        execution.status = status;
        tracing::info!("Execution {} finished as {:?}", execution_id, status);
        Ok(execution)
    }

    fn register(&mut self, params: RegisterParams, caller: &str) -> Outcome {
        let (workflow_id, steps) = match (params.workflow_id, params.steps) {
            (Some(id), Some(steps)) if !id.is_empty() && !steps.is_empty() => (id, steps),
            _ => return Err(ContractFailure::Validation("workflow_id and steps required".to_string())),
        };
        self.workflows.insert(
            workflow_id.clone(),
            WorkflowDefinition {
                owner: caller.to_string(),
                steps,
                triggers: params.triggers.unwrap_or_default(),
                created_at: self.meta.now(),
                is_active: true,
            },
        );
        tracing::info!("Workflow {} registered by {}", workflow_id, caller);
        Ok(object(json!({ "workflow_id": workflow_id })))
    }

    fn trigger(&mut self, params: TriggerParams, caller: &str) -> Outcome {
        let workflow_id = required(params.workflow_id, "workflow_id required")?;
        if !self.workflows.contains_key(&workflow_id) {
            return Err(ContractFailure::NotFound("Workflow not found"));
        }

        let started_at = self.meta.now();
        // same-microsecond triggers get the next free stamp
        let mut stamp = started_at;
        let mut execution_id = format!("{}-{}", workflow_id, stamp);
        while self.executions.contains_key(&execution_id) {
            stamp += 1;
            execution_id = format!("{}-{}", workflow_id, stamp);
        }

        self.executions.insert(
            execution_id.clone(),
            Execution {
                workflow_id: workflow_id.clone(),
                triggered_by: caller.to_string(),
                started_at,
                status: ExecutionStatus::Running,
                current_step: 0,
                input_data: params.input_data.unwrap_or_else(|| Value::Object(DataMap::new())),
                step_results: Vec::new(),
            },
        );
        tracing::info!(
            "Workflow {} triggered by {}, execution: {}",
            workflow_id,
            caller,
            execution_id
        );
        Ok(object(json!({ "execution_id": execution_id })))
    }

    fn status(&self, params: StatusParams) -> Outcome {
        let execution_id = required(params.execution_id, "execution_id required")?;
        let execution = self
            .executions
            .get(&execution_id)
            .ok_or(ContractFailure::NotFound("Execution not found"))?;
        Ok(object(json!({ "execution": execution })))
    }
}

impl SmartContract for WorkflowAutomationContract {
    fn kind(&self) -> ContractKind {
        ContractKind::WorkflowAutomation
    }

    fn execute(&mut self, function: &str, params: &DataMap, caller: &str) -> ContractResult<DataMap> {
        let outcome = match function {
            "register_workflow" => self.register(parse(function, params)?, caller),
            "trigger_workflow" => self.trigger(parse(function, params)?, caller),
            "get_execution_status" => self.status(parse(function, params)?),
            _ => {
                return Err(ContractError::UnknownFunction {
                    contract: self.meta.contract_id.clone(),
                    function: function.to_string(),
                })
            }
        };
        Ok(into_result(outcome))
    }

    fn validate(&self, params: &DataMap) -> bool {
        parse::<ValidateParams>("validate", params)
            .map(|p| p.steps.is_some_and(|steps| !steps.is_empty()))
            .unwrap_or(false)
    }

    fn state(&self) -> ContractState {
        self.meta.snapshot(
            self.kind(),
            json!({
                "workflows": self.workflows,
                "executions": self.executions,
            }),
        )
    }
}
