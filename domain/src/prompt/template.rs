//! Prompt templates for each LLM-backed role

use crate::agent::context::ExecutionContext;
use crate::memory::ScoredEpisode;
use crate::requirement::RequirementAnalysis;

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for the requirement gate
    pub fn requirement_system() -> &'static str {
        r#"You are the intake clerk of a legal assistance team.
Judge whether a client's request contains enough information for specialists to work on it.
Consider: parties involved, jurisdiction, key dates, amounts, documents, and the desired outcome.
Respond with a single JSON object and nothing else."#
    }

    /// User prompt for the requirement gate
    pub fn requirement_prompt(input: &str, has_attachments: bool) -> String {
        format!(
            r#"Client request:
{}

Attachments provided: {}

Return JSON with this shape:
{{
  "completeness_score": 0.0-1.0,
  "missing_elements": ["..."],
  "guidance_questions": [
    {{"question": "...", "options": ["...", "..."], "target": "missing element"}}
  ],
  "suggested_capabilities": ["..."],
  "complexity": "simple | moderate | complex"
}}

Guidance questions must be closed-ended: every question needs at least two concrete options."#,
            input,
            if has_attachments { "yes" } else { "no" }
        )
    }

    /// System prompt for the planner
    pub fn planner_system() -> &'static str {
        r#"You are the coordinator of a team of legal specialists.
Break the client's request into sub-tasks, assign each to exactly one registered specialist,
and declare dependencies between sub-tasks. Independent sub-tasks must not depend on each other
so they can run in parallel. Never invent specialists that are not listed."#
    }

    /// User prompt for the planner
    pub fn planner_prompt(
        task: &str,
        capabilities: &[(String, String)],
        precedents: &[ScoredEpisode],
        requirement: Option<&RequirementAnalysis>,
    ) -> String {
        let mut prompt = format!("Client request:\n{}\n\nAvailable specialists:\n", task);
        for (name, description) in capabilities {
            prompt.push_str(&format!("- {}: {}\n", name, description));
        }

        if let Some(analysis) = requirement
            && !analysis.suggested_capabilities.is_empty()
        {
            prompt.push_str(&format!(
                "\nIntake suggests involving: {} (complexity: {})\n",
                analysis.suggested_capabilities.join(", "),
                analysis.complexity
            ));
        }

        if !precedents.is_empty() {
            prompt.push_str("\nSimilar past requests and how they were planned:\n");
            for precedent in precedents {
                let steps = precedent
                    .episode
                    .plan
                    .nodes
                    .iter()
                    .map(|n| n.capability.as_str())
                    .collect::<Vec<_>>()
                    .join(" → ");
                prompt.push_str(&format!(
                    "- \"{}\" [{}] (relevance {:.2})\n",
                    crate::core::string::truncate(&precedent.episode.task_description, 120),
                    steps,
                    precedent.score
                ));
            }
        }

        prompt.push_str(
            r#"
Respond with a plan in this exact format:

```plan
{
  "analysis": "why the request is split this way",
  "priority": "low | normal | high | urgent",
  "tasks": [
    {"id": "T1", "capability": "<specialist>", "instruction": "...", "depends_on": []}
  ]
}
```"#,
        );
        prompt
    }

    /// System prompt for a specialist
    pub fn specialist_system(name: &str, description: &str) -> String {
        format!(
            r#"You are the team's {}. {}
Answer only within your specialty. Cite the statutes, cases or contract clauses you rely on.
Respond with a JSON object: {{"content": "...", "reasoning": "...", "citations": ["..."], "actions": ["..."]}}"#,
            name, description
        )
    }

    /// User prompt for a specialist
    pub fn specialist_prompt(context: &ExecutionContext) -> String {
        let mut prompt = format!(
            "Client request:\n{}\n\nYour assignment:\n{}\n",
            context.task_description, context.instruction
        );
        let upstream = context.dependents_prompt_section();
        if !upstream.is_empty() {
            prompt.push('\n');
            prompt.push_str(&upstream);
        }
        prompt
    }

    /// System prompt for the consensus arbiter
    pub fn arbiter_system() -> &'static str {
        r#"You are the senior partner arbitrating between specialists' conclusions.
Identify each point on which they disagree. For every position, score it from 0 to 10 on:
- legal_basis (weight 40%): sufficiency of the legal basis
- evidentiary_rigor (weight 30%): rigor of the evidence relied on
- risk_mitigation (weight 30%): effectiveness of the risk mitigation proposed
Declare the winner of each conflict, then give one final decision."#
    }

    /// User prompt for the consensus arbiter
    pub fn arbiter_prompt(task: &str, responses: &[(String, String)]) -> String {
        let mut prompt = format!("Client request:\n{}\n\nSpecialist conclusions:\n", task);
        for (agent, content) in responses {
            prompt.push_str(&format!("\n--- {} ---\n{}\n", agent, content));
        }
        prompt.push_str(
            r#"
Respond with JSON:
```json
{
  "conflicts": [
    {
      "point": "disputed point",
      "positions": [
        {"agent": "<specialist>", "stance": "...", "scores": {"legal_basis": 0, "evidentiary_rigor": 0, "risk_mitigation": 0}}
      ],
      "winner": "<specialist>"
    }
  ],
  "debate_summary": "...",
  "final_decision": "...",
  "risk_level": "low | medium | high | critical",
  "is_consensus_reached": true
}
```"#,
        );
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::context::DependentResult;
    use crate::plan::entities::FailureKind;

    #[test]
    fn test_planner_prompt_lists_capabilities() {
        let caps = vec![
            ("contract_reviewer".to_string(), "Reviews contracts".to_string()),
            ("legal_advisor".to_string(), "General advice".to_string()),
        ];
        let prompt = PromptTemplate::planner_prompt("Check my lease", &caps, &[], None);
        assert!(prompt.contains("- contract_reviewer: Reviews contracts"));
        assert!(prompt.contains("```plan"));
        assert!(!prompt.contains("Similar past requests"));
    }

    #[test]
    fn test_specialist_prompt_includes_omitted_dependency() {
        let ctx = ExecutionContext::new("Lease dispute", "T2", "Draft a reply").with_dependent(
            "T1",
            DependentResult::Omitted {
                reason: FailureKind::Timeout,
            },
        );
        let prompt = PromptTemplate::specialist_prompt(&ctx);
        assert!(prompt.contains("Draft a reply"));
        assert!(prompt.contains("omitted"));
    }

    #[test]
    fn test_arbiter_prompt_contains_all_responses() {
        let responses = vec![
            ("a".to_string(), "first view".to_string()),
            ("b".to_string(), "second view".to_string()),
        ];
        let prompt = PromptTemplate::arbiter_prompt("task", &responses);
        assert!(prompt.contains("--- a ---\nfirst view"));
        assert!(prompt.contains("--- b ---\nsecond view"));
    }

    #[test]
    fn test_requirement_prompt_attachments_flag() {
        let prompt = PromptTemplate::requirement_prompt("x", true);
        assert!(prompt.contains("Attachments provided: yes"));
    }
}
