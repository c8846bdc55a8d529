//! Plan parsing from planner output.
//!
//! Parsing is two-stage: the strict schema below is tried first; if it does
//! not match exactly, a lenient reader accepts common field aliases and
//! numeric ids. Either way the result is a typed `Result<Plan, PlanningError>`:
//! a task that cannot be read is an error, never silently dropped.
//!
//! Expected schema:
//! ```json
//! {
//!   "analysis": "string",
//!   "priority": "low | normal | high | urgent (optional)",
//!   "tasks": [
//!     {
//!       "id": "T1",
//!       "capability": "contract_reviewer",
//!       "instruction": "string",
//!       "depends_on": ["T0", ...]
//!     }
//!   ]
//! }
//! ```

use super::entities::{Plan, TaskNode};
use super::value_objects::{Priority, TaskId};
use serde::Deserialize;
use thiserror::Error;

/// Errors produced while turning planner output into a [`Plan`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanningError {
    #[error("Planner returned no output")]
    EmptyOutput,

    #[error("No plan found in planner output")]
    NoPlanFound,

    #[error("Malformed plan: {0}")]
    Malformed(String),

    #[error("Plan contains no tasks")]
    NoTasks,

    #[error("Task #{index} is missing required field '{field}'")]
    MissingField { index: usize, field: &'static str },

    #[error("Task {task} names unregistered capability '{capability}'")]
    UnknownCapability { task: TaskId, capability: String },

    #[error("Planner failed: {0}")]
    Planner(String),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PlanSchema {
    analysis: String,
    #[serde(default)]
    priority: Option<Priority>,
    tasks: Vec<TaskSchema>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TaskSchema {
    id: String,
    capability: String,
    instruction: String,
    #[serde(default)]
    depends_on: Vec<String>,
}

impl TryFrom<PlanSchema> for Plan {
    type Error = PlanningError;

    fn try_from(schema: PlanSchema) -> Result<Self, Self::Error> {
        if schema.tasks.is_empty() {
            return Err(PlanningError::NoTasks);
        }

        let mut plan =
            Plan::new(schema.analysis).with_priority(schema.priority.unwrap_or_default());
        for (index, task) in schema.tasks.into_iter().enumerate() {
            if task.id.trim().is_empty() {
                return Err(PlanningError::MissingField { index, field: "id" });
            }
            if task.capability.trim().is_empty() {
                return Err(PlanningError::MissingField {
                    index,
                    field: "capability",
                });
            }
            let mut node = TaskNode::new(task.id, task.capability.trim(), task.instruction);
            for dep in task.depends_on {
                node = node.with_dependency(dep);
            }
            plan.add_node(node);
        }
        Ok(plan)
    }
}

/// Parse a plan from planner response text.
///
/// Looks for a ` ```plan ` or ` ```json ` fenced block first, then treats the
/// whole response (or its outermost `{...}` span) as JSON.
pub fn parse_plan(response: &str) -> Result<Plan, PlanningError> {
    if response.trim().is_empty() {
        return Err(PlanningError::EmptyOutput);
    }

    let mut in_block = false;
    let mut current_block = String::new();

    for line in response.lines() {
        let trimmed = line.trim();
        if !in_block && (trimmed == "```plan" || trimmed == "```json") {
            in_block = true;
            current_block.clear();
        } else if in_block && trimmed == "```" {
            in_block = false;
            if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(&current_block) {
                return parse_plan_json(&parsed);
            }
        } else if in_block {
            current_block.push_str(line);
            current_block.push('\n');
        }
    }

    let candidate = match (response.find('{'), response.rfind('}')) {
        (Some(start), Some(end)) if end > start => &response[start..=end],
        _ => return Err(PlanningError::NoPlanFound),
    };

    match serde_json::from_str::<serde_json::Value>(candidate) {
        Ok(parsed) => parse_plan_json(&parsed),
        Err(e) => Err(PlanningError::Malformed(e.to_string())),
    }
}

/// Parse a plan from a JSON value: strict schema first, lenient reader second.
pub fn parse_plan_json(json: &serde_json::Value) -> Result<Plan, PlanningError> {
    if let Ok(schema) = serde_json::from_value::<PlanSchema>(json.clone()) {
        return Plan::try_from(schema);
    }
    parse_plan_lenient(json)
}

/// Convert JSON scalars to strings (numbers are stringified, null/empty are None)
fn json_value_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn first_str<'a>(json: &'a serde_json::Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|k| json.get(*k).and_then(|v| v.as_str()))
        .filter(|s| !s.trim().is_empty())
}

fn parse_plan_lenient(json: &serde_json::Value) -> Result<Plan, PlanningError> {
    let tasks = ["tasks", "subtasks", "nodes"]
        .iter()
        .find_map(|k| json.get(*k).and_then(|v| v.as_array()))
        .ok_or_else(|| PlanningError::Malformed("missing 'tasks' array".to_string()))?;

    if tasks.is_empty() {
        return Err(PlanningError::NoTasks);
    }

    let analysis = first_str(json, &["analysis", "reasoning", "rationale"]).unwrap_or("");
    let priority = first_str(json, &["priority"])
        .and_then(|p| p.parse::<Priority>().ok())
        .unwrap_or_default();

    let mut plan = Plan::new(analysis).with_priority(priority);

    for (index, task_json) in tasks.iter().enumerate() {
        let id = task_json
            .get("id")
            .and_then(json_value_to_string)
            .unwrap_or_else(|| format!("T{}", index + 1));

        let capability = first_str(task_json, &["capability", "agent", "role", "specialist"])
            .ok_or(PlanningError::MissingField {
                index,
                field: "capability",
            })?;

        let instruction = first_str(task_json, &["instruction", "description", "task"])
            .ok_or(PlanningError::MissingField {
                index,
                field: "instruction",
            })?;

        let mut node = TaskNode::new(id, capability.trim(), instruction);

        let deps = ["depends_on", "dependencies"]
            .iter()
            .find_map(|k| task_json.get(*k).and_then(|v| v.as_array()));
        if let Some(deps) = deps {
            for dep in deps {
                if let Some(dep_id) = json_value_to_string(dep) {
                    node = node.with_dependency(dep_id);
                }
            }
        }

        plan.add_node(node);
    }

    Ok(plan)
}

/// Single-node plan routed to the generalist capability.
///
/// Used whenever planning or validation fails; the request is never rejected
/// outright.
pub fn fallback_plan(task_description: &str, generalist: &str, reason: &str) -> Plan {
    Plan::new(format!("Fallback single-step plan ({})", reason))
        .with_node(TaskNode::new("T1", generalist, task_description))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strict_plan_block() {
        let response = r#"
Here is the plan:

```plan
{
  "analysis": "Lease dispute needs contract and risk review",
  "priority": "high",
  "tasks": [
    {"id": "T1", "capability": "contract_reviewer", "instruction": "Review lease terms", "depends_on": []},
    {"id": "T2", "capability": "risk_assessor", "instruction": "Assess exposure", "depends_on": []},
    {"id": "T3", "capability": "litigation_strategist", "instruction": "Propose strategy", "depends_on": ["T1", "T2"]}
  ]
}
```
"#;

        let plan = parse_plan(response).unwrap();
        assert_eq!(plan.analysis, "Lease dispute needs contract and risk review");
        assert_eq!(plan.priority, Priority::High);
        assert_eq!(plan.nodes.len(), 3);
        assert_eq!(plan.nodes[0].capability, "contract_reviewer");
        assert_eq!(
            plan.nodes[2].depends_on,
            vec![TaskId::new("T1"), TaskId::new("T2")]
        );
    }

    #[test]
    fn test_parse_lenient_aliases_and_numeric_ids() {
        let json = serde_json::json!({
            "reasoning": "Two steps",
            "tasks": [
                {"id": 1, "agent": "legal_researcher", "description": "Find precedents"},
                {"id": 2, "role": "document_drafter", "description": "Draft letter", "dependencies": [1]}
            ]
        });

        let plan = parse_plan_json(&json).unwrap();
        assert_eq!(plan.analysis, "Two steps");
        assert_eq!(plan.nodes[0].id, TaskId::new("1"));
        assert_eq!(plan.nodes[1].capability, "document_drafter");
        assert_eq!(plan.nodes[1].depends_on, vec![TaskId::new("1")]);
    }

    #[test]
    fn test_missing_ids_get_sequential() {
        let json = serde_json::json!({
            "analysis": "x",
            "tasks": [
                {"capability": "a", "instruction": "first"},
                {"capability": "b", "instruction": "second"}
            ]
        });
        let plan = parse_plan_json(&json).unwrap();
        assert_eq!(plan.nodes[0].id, TaskId::new("T1"));
        assert_eq!(plan.nodes[1].id, TaskId::new("T2"));
    }

    #[test]
    fn test_task_without_capability_is_error_not_dropped() {
        let json = serde_json::json!({
            "analysis": "x",
            "tasks": [
                {"capability": "a", "instruction": "first"},
                {"instruction": "second"}
            ]
        });
        assert_eq!(
            parse_plan_json(&json),
            Err(PlanningError::MissingField {
                index: 1,
                field: "capability"
            })
        );
    }

    #[test]
    fn test_empty_tasks_is_error() {
        let response = r#"{"analysis": "nothing", "tasks": []}"#;
        assert_eq!(parse_plan(response), Err(PlanningError::NoTasks));
    }

    #[test]
    fn test_plain_text_has_no_plan() {
        assert_eq!(
            parse_plan("I think you should consult a lawyer."),
            Err(PlanningError::NoPlanFound)
        );
        assert_eq!(parse_plan("   "), Err(PlanningError::EmptyOutput));
    }

    #[test]
    fn test_truncated_json_is_malformed() {
        let response = r#"{"analysis": "x", "tasks": [{"id": "T1", }"#;
        assert!(matches!(
            parse_plan(response),
            Err(PlanningError::Malformed(_))
        ));
    }

    #[test]
    fn test_fallback_plan() {
        let plan = fallback_plan("Draft an NDA", "legal_advisor", "planner unavailable");
        assert_eq!(plan.nodes.len(), 1);
        assert_eq!(plan.nodes[0].capability, "legal_advisor");
        assert_eq!(plan.nodes[0].instruction, "Draft an NDA");
        assert!(plan.analysis.contains("planner unavailable"));
    }
}
