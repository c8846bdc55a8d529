//! Console output formatter for workforce results

use colored::Colorize;
use serde_json::{Value, json};
use workforce_application::{ExecutionStop, WorkforceOutcome, WorkforceReport};
use workforce_domain::{ArbitrationOutcome, NodeOutcome, NodeStatus, RequirementAnalysis};

/// Formats workforce results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format an outcome in the full layout
    pub fn format(outcome: &WorkforceOutcome) -> String {
        match outcome {
            WorkforceOutcome::Completed(report) => Self::format_report(report),
            WorkforceOutcome::NeedsClarification(analysis) => {
                Self::format_clarification(analysis)
            }
        }
    }

    /// Format a completed run: plan, per-task outcomes, arbitration, answer
    pub fn format_report(report: &WorkforceReport) -> String {
        let result = &report.final_result;
        let mut output = String::new();

        output.push_str(&Self::header("Legal Workforce Results"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n",
            "Priority:".cyan().bold(),
            result.priority
        ));
        if !result.analysis.is_empty() {
            output.push_str(&format!(
                "{} {}\n",
                "Analysis:".cyan().bold(),
                result.analysis
            ));
        }
        if let Some(reason) = &report.fallback_reason {
            output.push_str(&format!(
                "{} {}\n",
                "Fallback plan:".yellow().bold(),
                reason
            ));
        }
        if report.precedents_used > 0 {
            output.push_str(&format!(
                "{} {}\n",
                "Precedents consulted:".dimmed(),
                report.precedents_used
            ));
        }
        match report.stop {
            ExecutionStop::Completed => {}
            ExecutionStop::GlobalTimeout => {
                output.push_str(&format!("{}\n", "Stopped: global timeout".red().bold()))
            }
            ExecutionStop::Cancelled => {
                output.push_str(&format!("{}\n", "Stopped: cancelled".red().bold()))
            }
        }

        output.push_str(&Self::section_header(&format!(
            "Tasks ({} succeeded, {} failed, {} skipped)",
            result.succeeded, result.failed, result.skipped
        )));
        for node in &result.nodes {
            output.push_str(&Self::node_line(node));
        }

        if let Some(arbitration) = &result.arbitration {
            output.push_str(&Self::section_header("Arbitration"));
            output.push_str(&Self::arbitration(arbitration));
        }

        output.push_str(&Self::section_header("Answer"));
        output.push('\n');
        output.push_str(result.answer.trim());
        output.push('\n');

        if let Some(id) = &report.episode_id {
            output.push_str(&format!("\n{} {}\n", "Episode:".dimmed(), id));
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format the clarifying questions for an incomplete request
    pub fn format_clarification(analysis: &RequirementAnalysis) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{} (completeness {:.0}%)\n",
            "More information needed".yellow().bold(),
            analysis.completeness_score * 100.0
        ));

        if !analysis.missing_elements.is_empty() {
            output.push_str(&format!(
                "{} {}\n",
                "Missing:".cyan().bold(),
                analysis.missing_elements.join(", ")
            ));
        }

        for (i, question) in analysis.guidance_questions.iter().enumerate() {
            output.push_str(&format!("\n{}. {}\n", i + 1, question.question.bold()));
            for option in &question.options {
                output.push_str(&format!("   - {}\n", option));
            }
        }

        output.push_str(&format!(
            "\n{}\n",
            "Add the details to your request, or pass --skip-check to proceed anyway.".dimmed()
        ));
        output
    }

    /// Only the final answer
    pub fn format_answer(outcome: &WorkforceOutcome) -> String {
        match outcome {
            WorkforceOutcome::Completed(report) => {
                format!("{}\n", report.final_result.answer.trim())
            }
            WorkforceOutcome::NeedsClarification(analysis) => {
                Self::format_clarification(analysis)
            }
        }
    }

    /// Format as JSON
    pub fn format_json(outcome: &WorkforceOutcome) -> String {
        serde_json::to_string_pretty(&Self::to_json(outcome)).unwrap_or_else(|_| "{}".to_string())
    }

    fn to_json(outcome: &WorkforceOutcome) -> Value {
        match outcome {
            WorkforceOutcome::Completed(report) => json!({
                "status": "completed",
                "stop": report.stop.as_str(),
                "episode_id": report.episode_id,
                "fallback_reason": report.fallback_reason,
                "precedents_used": report.precedents_used,
                "requirement": report.requirement,
                "result": report.final_result,
            }),
            WorkforceOutcome::NeedsClarification(analysis) => json!({
                "status": "needs_clarification",
                "requirement": analysis,
            }),
        }
    }

    fn node_line(node: &NodeOutcome) -> String {
        let label = format!("{} ({})", node.task_id, node.capability);
        let attempts = if node.attempts > 1 {
            format!(" [{} attempts]", node.attempts)
        } else {
            String::new()
        };

        match node.status {
            NodeStatus::Succeeded => format!("  {} {}{}\n", "v".green(), label, attempts.dimmed()),
            NodeStatus::Failed => format!(
                "  {} {}{} {}\n",
                "x".red(),
                label,
                attempts.dimmed(),
                Self::failure_detail(node).red()
            ),
            _ => format!(
                "  {} {} {}\n",
                "-".yellow(),
                label,
                Self::failure_detail(node).yellow()
            ),
        }
    }

    fn failure_detail(node: &NodeOutcome) -> String {
        match (&node.failure_kind, &node.failure_message) {
            (Some(kind), Some(message)) if !message.is_empty() => {
                format!("{}: {}", kind, message)
            }
            (Some(kind), _) => kind.to_string(),
            (None, _) => node.status.to_string(),
        }
    }

    fn arbitration(outcome: &ArbitrationOutcome) -> String {
        match outcome {
            ArbitrationOutcome::Verdict(verdict) => {
                let mut output = format!(
                    "{} {}   {} {}\n",
                    "Risk:".cyan().bold(),
                    verdict.risk_level,
                    "Consensus:".cyan().bold(),
                    if verdict.is_consensus_reached {
                        "reached".green()
                    } else {
                        "not reached".yellow()
                    }
                );
                for conflict in &verdict.conflicts {
                    output.push_str(&format!(
                        "\n  {} {}\n",
                        "Conflict:".yellow().bold(),
                        conflict.point
                    ));
                    for position in &conflict.positions {
                        let marker = if position.agent == conflict.winner {
                            "*".green().to_string()
                        } else {
                            " ".to_string()
                        };
                        output.push_str(&format!(
                            "   {} {} ({:.1}): {}\n",
                            marker,
                            position.agent,
                            position.weighted_score(),
                            position.stance
                        ));
                    }
                }
                if !verdict.debate_summary.is_empty() {
                    let summary = Self::indent(&verdict.debate_summary, "  ");
                    output.push_str(&format!("\n{}\n", summary));
                }
                output
            }
            ArbitrationOutcome::RawText { .. } => {
                format!("{}\n", "Arbiter answered without a structured verdict".dimmed())
            }
            ArbitrationOutcome::Degraded {
                agent_name, reason, ..
            } => format!(
                "{} using {}'s answer ({})\n",
                "Arbiter unavailable:".yellow(),
                agent_name,
                reason
            ),
            ArbitrationOutcome::NoUsableInput => {
                format!("{}\n", "No usable specialist answers".red())
            }
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use workforce_domain::{
        AgentResponse, Complexity, FailureKind, FinalResult, NodeFailure, Plan, TaskNode,
    };

    fn report() -> WorkforceReport {
        let mut plan = Plan::new("Lease review");
        plan.add_node(TaskNode::new("T1", "contract_reviewer", "Review clause 4"));
        plan.add_node(TaskNode::new("T2", "risk_assessor", "Assess risk"));
        let answer = AgentResponse::new("contract_reviewer", "Clause 4 is void.");
        plan.nodes[0].mark_succeeded(answer, 1);
        plan.nodes[1].mark_failed(NodeFailure::new(FailureKind::Timeout, "no answer"), 3);

        let final_result = FinalResult::summarize(&plan, None);
        WorkforceReport {
            analysis: plan.analysis.clone(),
            node_results: final_result.nodes.clone(),
            final_result,
            plan,
            episode_id: None,
            requirement: None,
            precedents_used: 0,
            fallback_reason: None,
            stop: ExecutionStop::Completed,
        }
    }

    #[test]
    fn test_full_format_lists_every_task() {
        colored::control::set_override(false);
        let text = ConsoleFormatter::format_report(&report());

        assert!(text.contains("T1 (contract_reviewer)"));
        assert!(text.contains("T2 (risk_assessor)"));
        assert!(text.contains("[3 attempts]"));
        assert!(text.contains("no answer"));
        assert!(text.contains("Clause 4 is void."));
    }

    #[test]
    fn test_answer_format_is_answer_only() {
        let outcome = WorkforceOutcome::Completed(Box::new(report()));
        assert_eq!(ConsoleFormatter::format_answer(&outcome), "Clause 4 is void.\n");
    }

    #[test]
    fn test_json_format() {
        let outcome = WorkforceOutcome::Completed(Box::new(report()));
        let value: Value = serde_json::from_str(&ConsoleFormatter::format_json(&outcome)).unwrap();

        assert_eq!(value["status"], "completed");
        assert_eq!(value["stop"], "completed");
        assert_eq!(value["result"]["succeeded"], 1);
        assert_eq!(value["result"]["failed"], 1);
    }

    #[test]
    fn test_clarification_lists_questions() {
        colored::control::set_override(false);
        let analysis = RequirementAnalysis {
            is_complete: false,
            completeness_score: 0.3,
            missing_elements: vec!["jurisdiction".into(), "contract date".into()],
            guidance_questions: Vec::new(),
            suggested_capabilities: Vec::new(),
            complexity: Complexity::Simple,
        }
        .normalize();
        assert!(!analysis.guidance_questions.is_empty());
        let outcome = WorkforceOutcome::NeedsClarification(analysis.clone());
        let text = ConsoleFormatter::format(&outcome);

        assert!(text.contains("More information needed"));
        for question in &analysis.guidance_questions {
            assert!(text.contains(&question.question));
        }

        let value: Value = serde_json::from_str(&ConsoleFormatter::format_json(&outcome)).unwrap();
        assert_eq!(value["status"], "needs_clarification");
    }
}
