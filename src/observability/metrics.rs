//! 运行指标：由决策日志派生的汇总

use serde::Serialize;

use crate::core::ToolStatus;
use crate::react::{DecisionEntry, DecisionKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunMetrics {
    pub trace_id: String,
    pub completed_steps: usize,
    pub supplement_attempts: usize,
    pub supplement_successes: usize,
    pub timeouts: usize,
    pub errors: usize,
    pub total_entries: usize,
    /// supplement_attempts / completed_steps
    pub supplement_rate: f64,
    /// timeouts / total_entries
    pub timeout_rate: f64,
}

impl RunMetrics {
    pub fn from_log(trace_id: impl Into<String>, entries: &[DecisionEntry]) -> Self {
        let mut completed_steps = 0;
        let mut supplement_attempts = 0;
        let mut supplement_successes = 0;
        let mut timeouts = 0;
        let mut errors = 0;

        for entry in entries {
            match &entry.kind {
                DecisionKind::StepComplete { .. } => completed_steps += 1,
                DecisionKind::Supplement { .. } => supplement_attempts += 1,
                DecisionKind::SupplementDone { .. } => supplement_successes += 1,
                DecisionKind::Dispatch { status: ToolStatus::Timeout, .. } => timeouts += 1,
                DecisionKind::Dispatch { status: ToolStatus::Error, .. } => errors += 1,
                _ => {}
            }
        }

        let total_entries = entries.len();
        Self {
            trace_id: trace_id.into(),
            completed_steps,
            supplement_attempts,
            supplement_successes,
            timeouts,
            errors,
            total_entries,
            supplement_rate: ratio(supplement_attempts, completed_steps),
            timeout_rate: ratio(timeouts, total_entries),
        }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}
