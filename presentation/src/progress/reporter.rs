//! Progress reporting for plan execution

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;
use workforce_application::ports::progress::WorkforceProgress;
use workforce_domain::{FailureKind, NodeStatus, Plan, TaskId};

/// Reports progress during plan execution with one bar per wave
pub struct ProgressReporter {
    multi: MultiProgress,
    wave_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            wave_bar: Mutex::new(None),
        }
    }

    fn wave_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.wave_bar.lock()
            && let Some(pb) = guard.as_ref()
        {
            f(pb);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkforceProgress for ProgressReporter {
    fn on_plan_ready(&self, plan: &Plan, wave_count: usize) {
        let _ = self.multi.println(format!(
            "{} {} tasks in {} waves",
            "->".cyan(),
            plan.nodes.len(),
            wave_count
        ));
    }

    fn on_wave_start(&self, wave: usize, total_waves: usize, node_count: usize) {
        let pb = self.multi.add(ProgressBar::new(node_count as u64));
        pb.set_style(Self::wave_style());
        pb.set_prefix(format!("Wave {}/{}", wave + 1, total_waves));
        pb.set_message("Starting...");

        if let Ok(mut guard) = self.wave_bar.lock() {
            *guard = Some(pb);
        }
    }

    fn on_node_start(&self, task_id: &TaskId, capability: &str) {
        self.with_bar(|pb| pb.set_message(format!("{} ({})", task_id, capability)));
    }

    fn on_node_retry(&self, task_id: &TaskId, attempt: u32, reason: &str) {
        self.with_bar(|pb| {
            pb.set_message(format!(
                "{} retry {} after {}",
                task_id,
                attempt,
                reason.yellow()
            ))
        });
    }

    fn on_node_finished(&self, task_id: &TaskId, status: NodeStatus, failure: Option<FailureKind>) {
        self.with_bar(|pb| {
            let message = match (status, failure) {
                (NodeStatus::Succeeded, _) => format!("{} {}", "v".green(), task_id),
                (_, Some(kind)) => format!("{} {} ({})", "x".red(), task_id, kind),
                (status, None) => format!("{} {} ({})", "x".red(), task_id, status),
            };
            pb.set_message(message);
            pb.inc(1);
        });
    }

    fn on_wave_complete(&self, wave: usize) {
        if let Ok(mut guard) = self.wave_bar.lock()
            && let Some(pb) = guard.take()
        {
            pb.finish_with_message(format!("Wave {} complete", wave + 1).green().to_string());
        }
    }

    fn on_arbitration_start(&self, responses: usize) {
        let _ = self.multi.println(format!(
            "{} Arbitrating {} specialist answers",
            "->".cyan(),
            responses
        ));
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl WorkforceProgress for SimpleProgress {
    fn on_plan_ready(&self, plan: &Plan, wave_count: usize) {
        eprintln!(
            "{} {} ({} tasks, {} waves)",
            "->".cyan(),
            "Plan ready".bold(),
            plan.nodes.len(),
            wave_count
        );
    }

    fn on_wave_start(&self, wave: usize, total_waves: usize, node_count: usize) {
        eprintln!(
            "{} {} ({} tasks)",
            "->".cyan(),
            format!("Wave {}/{}", wave + 1, total_waves).bold(),
            node_count
        );
    }

    fn on_node_retry(&self, task_id: &TaskId, attempt: u32, reason: &str) {
        eprintln!("  {} {} retry {} ({})", "~".yellow(), task_id, attempt, reason);
    }

    fn on_node_finished(&self, task_id: &TaskId, status: NodeStatus, failure: Option<FailureKind>) {
        match (status, failure) {
            (NodeStatus::Succeeded, _) => eprintln!("  {} {}", "v".green(), task_id),
            (_, Some(kind)) => eprintln!("  {} {} ({})", "x".red(), task_id, kind),
            (status, None) => eprintln!("  {} {} ({})", "x".red(), task_id, status),
        }
    }

    fn on_arbitration_start(&self, responses: usize) {
        eprintln!("{} Arbitrating {} answers", "->".cyan(), responses);
    }
}
