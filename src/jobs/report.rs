// ABOUTME: Report generation job aggregating preceding task outputs
// ABOUTME: Builds the structured final report and writes it onto the owning workflow

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Map, Value};
use tracing::info;

use super::error::{JobError, Result};
use super::{Job, JobContext};
use crate::store::{Store, Task, TaskStatus};

pub struct ReportGenerationJob;

#[async_trait]
impl Job for ReportGenerationJob {
    fn task_type(&self) -> &'static str {
        "reportGeneration"
    }

    async fn run(&self, task: &mut Task, ctx: &JobContext) -> Result<Value> {
        let siblings = ctx.store.list_tasks_by_workflow(&task.workflow_id).await?;

        // Preceding tasks only; the report never describes itself.
        let preceding: Vec<&Task> = siblings
            .iter()
            .filter(|t| t.step_number < task.step_number)
            .collect();

        if let Some(pending) = preceding.iter().find(|t| t.status.is_pending()) {
            return Err(JobError::PrematureReport(pending.task_id.clone()));
        }

        let entries: Vec<Value> = preceding.iter().map(|t| task_entry(t)).collect();
        let completed = preceding
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .count();
        let failed = preceding
            .iter()
            .filter(|t| t.status == TaskStatus::Failed)
            .count();
        let generated_at = Utc::now();

        let report = json!({
            "workflowId": task.workflow_id,
            "tasks": entries,
            "finalReport": final_report_text(task, &preceding, generated_at.to_rfc3339()),
            "summary": {
                "totalTasks": preceding.len(),
                "completedTasks": completed,
                "failedTasks": failed,
                "reportGeneratedAt": generated_at.to_rfc3339(),
            }
        });

        let serialized = serde_json::to_string(&report)?;
        task.output = Some(serialized.clone());

        // The report is the workflow's final result; write it directly so it
        // survives reconciliation.
        let mut workflow = ctx
            .store
            .get_workflow(&task.workflow_id)
            .await?
            .ok_or_else(|| JobError::WorkflowNotFound(task.workflow_id.clone()))?;
        workflow.final_result = Some(serialized);
        ctx.store.update_workflow(&workflow).await?;

        info!(
            "Task {}: report generated over {} task(s) ({} completed, {} failed)",
            task.task_id,
            preceding.len(),
            completed,
            failed
        );

        Ok(report)
    }
}

/// One report entry per preceding task, with its parsed output or extracted
/// error string.
fn task_entry(task: &Task) -> Value {
    let mut entry = Map::new();
    entry.insert("taskId".to_string(), json!(task.task_id));
    entry.insert("type".to_string(), json!(task.task_type));
    entry.insert("stepNumber".to_string(), json!(task.step_number));
    entry.insert("status".to_string(), json!(task.status));

    match task.status {
        TaskStatus::Completed => {
            if let Some(output) = task.output_value() {
                entry.insert("output".to_string(), output);
            }
        }
        TaskStatus::Failed => {
            let (message, preserved) = task.failure_details();
            entry.insert("error".to_string(), json!(message));
            if let Some(raw) = preserved {
                entry.insert("output".to_string(), raw);
            }
        }
        _ => {}
    }

    Value::Object(entry)
}

/// Human-readable rendering of the report body.
fn final_report_text(report_task: &Task, preceding: &[&Task], generated_at: String) -> String {
    let completed: Vec<&&Task> = preceding
        .iter()
        .filter(|t| t.status == TaskStatus::Completed)
        .collect();
    let failed: Vec<&&Task> = preceding
        .iter()
        .filter(|t| t.status == TaskStatus::Failed)
        .collect();

    let mut lines = Vec::new();
    lines.push("Geospatial Analysis Report".to_string());
    lines.push("==========================".to_string());
    lines.push(format!("Workflow: {}", report_task.workflow_id));
    lines.push(format!(
        "Total tasks: {} | Completed: {} | Failed: {}",
        preceding.len(),
        completed.len(),
        failed.len()
    ));

    if !completed.is_empty() {
        lines.push(String::new());
        lines.push("Completed tasks:".to_string());
        for task in &completed {
            let summary = task
                .output_value()
                .map(|v| summarize_output(&v))
                .unwrap_or_else(|| "no output recorded".to_string());
            lines.push(format!(
                "- {} (Step {}): {}",
                task.task_type, task.step_number, summary
            ));
        }
    }

    if !failed.is_empty() {
        lines.push(String::new());
        lines.push("Failed tasks:".to_string());
        for task in &failed {
            let (message, _) = task.failure_details();
            lines.push(format!(
                "- {} (Step {}): {}",
                task.task_type, task.step_number, message
            ));
        }
    }

    lines.push(String::new());
    lines.push(format!("Generated at: {}", generated_at));
    lines.join("\n")
}

/// Type-aware one-line summary of a task output.
fn summarize_output(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            if let Some(area) = map.get("area").and_then(Value::as_f64) {
                let unit = map
                    .get("unit")
                    .and_then(Value::as_str)
                    .unwrap_or("square meters");
                return format!("Area calculated: {} {}", area, unit);
            }
            if let Some(country) = map.get("country") {
                let name = country
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| country.to_string());
                return format!("Location: {}", name);
            }
            map.keys().cloned().collect::<Vec<_>>().join(", ")
        }
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
